//! Real-time capable digital signal processing for one-dimensional waveforms.
//!
//! Every streaming filter in this crate runs in one of two modes selected at
//! `initialize`:
//!
//! * [`ProcessingMode::PostProcessing`](kernel::ProcessingMode) — each
//!   `apply` is an independent block run starting from the stamped initial
//!   conditions, equivalent to an offline reference.
//! * [`ProcessingMode::RealTime`](kernel::ProcessingMode) — delay-line state
//!   persists across `apply` calls, so arbitrarily chopped packets of one
//!   input concatenate to exactly the block result.
//!
//! That equivalence is the central correctness contract and what the
//! integration tests exercise hardest.
//!
//! Filter design ([`signal::filter::design`]) produces a representation
//! (ZPK, BA, SOS, or FIR taps); the representation initializes a streaming
//! filter ([`signal::sfilt`]); the streaming filter is fed packets.
//! [`signal::transforms`] adds the real-to-complex DFT plan and the
//! analytic-signal envelopes.

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

#[cfg(feature = "alloc")]
extern crate alloc;

pub mod kernel;
#[cfg(feature = "alloc")]
pub mod linalg;
#[cfg(feature = "alloc")]
pub mod signal;
pub mod special;

pub use rtsig_core::{Error, Result};
