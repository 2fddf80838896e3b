//! Core abstractions for composing reinforcement learning losses.
//!
//! This crate defines the pieces every loss function in `telos-loss`
//! consumes: the [`Batch`] of named tensors, the capability traits for
//! function approximators ([`model`]) and action distributions ([`pd`]),
//! the error taxonomy ([`error`]) and the shared reductions ([`util`]).
//!
//! The function approximators themselves are external collaborators;
//! this crate only fixes the surface the loss layer needs from them.
pub mod batch;
pub mod error;
pub mod model;
pub mod pd;
pub mod util;

pub use batch::Batch;
pub use error::{LossError, Result};
