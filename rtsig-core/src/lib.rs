//! Numeric substrate shared by the rtsig DSP engine.
//!
//! This crate carries the crate-level error vocabulary and the contiguous
//! 1D primitives (convolution, vector ops, sorted-window median) that the
//! filter and transform kernels in `rtsig` are built on.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;

mod error;
pub mod num_rs;

pub use error::{Error, Result};
