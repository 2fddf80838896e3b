//! Maximum-entropy actor-critic losses.
mod base;
mod config;
mod ent_coef;
pub use base::{sac, SacLosses};
pub use config::SacConfig;
pub use ent_coef::{EntCoef, EntCoefMode};
