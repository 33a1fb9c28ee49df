//! Counter-based random number generation for reproducible sampling.
//!
//! This crate provides a Rust implementation of the Philox4x32-10 generator
//! together with the adapters used by the sampling stage: a single-sample
//! adapter that hands out one 32-bit word at a time, and [`SamplingRng`],
//! whose state is fully described by its seeds and the number of draws taken.

mod adapter;
mod philox;
mod sampling;

pub use adapter::{uint32_to_float, SingleSampleAdapter};
pub use philox::{PhiloxBlock, PhiloxRandom, PHILOX_RESULT_ELEMENT_COUNT};
pub use sampling::{draw, SamplingRng};
