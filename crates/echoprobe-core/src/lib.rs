//! Echoprobe Core - DSP primitives for the spatial reverb
//!
//! This crate holds the building blocks the reverb segment is assembled from,
//! designed for real-time processing with zero allocation in the audio path.
//!
//! # Core Abstractions
//!
//! ## Filters
//!
//! - [`Biquad`] - Second-order IIR filter (Direct Form I)
//! - [`BiquadCoefficients`] - RBJ cookbook lowpass/allpass coefficient sets
//!
//! ## Streaming
//!
//! - [`StreamBuffer`] - The contract a host buffer must fulfil: hand out a
//!   contiguous run of samples, then be told how many were consumed/produced
//! - [`RingBuffer`] - Fixed-capacity reference implementation
//! - [`transfer`] - Pass-through copy between two stream buffers
//!
//! ## Utilities
//!
//! - Circular math: [`wrap_angle`], [`angle_difference`], [`gaussian`]
//! - [`flush_denormal`] for feedback paths
//!
//! # no_std Support
//!
//! Disable the default `std` feature to use the primitives on embedded targets:
//!
//! ```toml
//! [dependencies]
//! echoprobe-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Example
//!
//! ```rust
//! use echoprobe_core::{RingBuffer, StreamBuffer};
//!
//! let mut buffer = RingBuffer::with_capacity(8);
//! buffer.push_slice(&[0.25, 0.5]);
//!
//! let run = buffer.request_read(usize::MAX);
//! assert_eq!(run, &[0.25, 0.5]);
//! buffer.finish_read(2);
//! assert_eq!(buffer.available_read(), 0);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod biquad;
pub mod math;
pub mod stream;

// Re-export main types at crate root
pub use biquad::{Biquad, BiquadCoefficients, MIN_CUTOFF_HZ, NYQUIST_GUARD, clamp_cutoff};
pub use math::{BUTTERWORTH_Q, angle_difference, flush_denormal, gaussian, wrap_angle};
pub use stream::{RingBuffer, StreamBuffer, transfer};
