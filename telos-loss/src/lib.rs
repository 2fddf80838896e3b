//! Loss functions for reinforcement learning agents.
//!
//! Training algorithms are written by combining these functions. Each is
//! a pure, stateless entry point: it takes a [`Batch`] of transitions or
//! trajectories plus the model collaborators it scores, and returns one
//! or more differentiable scalars for the training loop to apply with
//! its own optimizers.
//!
//! Quantities derived from target networks, bootstrapped next-actions or
//! frozen teacher policies are explicitly detached before they enter a
//! loss term; see the individual modules for where those cuts happen.
pub mod ag;
pub mod bellman;
pub mod discrim;
pub mod distill;
pub mod dynamics;
pub mod opt;
pub mod pg;
pub mod sac;
pub mod value;

pub use telos_core::{Batch, LossError, Result};
