//! Signal processing: filter design, streaming filters, and transforms.

pub mod filter;
pub mod sampling;
pub mod sfilt;
pub mod traits;

#[cfg(feature = "std")]
pub mod transforms;
