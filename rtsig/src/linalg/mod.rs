//! Small dense linear-algebra helpers for filter design.

mod companion;
mod poly;

pub use companion::*;
pub use poly::*;
