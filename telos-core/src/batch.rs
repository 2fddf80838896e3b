//! Batches of transitions and trajectories.
use crate::error::{LossError, Result};
use candle_core::Tensor;
use std::collections::BTreeMap;

/// Well-known batch field names.
///
/// Each loss documents the subset of fields it requires.
pub mod field {
    /// Observations.
    pub const OBS: &str = "obs";
    /// Actions taken at the observations.
    pub const ACS: &str = "acs";
    /// Advantage estimates.
    pub const ADVS: &str = "advs";
    /// Discounted returns.
    pub const RETS: &str = "rets";
    /// Immediate rewards.
    pub const REWS: &str = "rews";
    /// Observations after the transition.
    pub const NEXT_OBS: &str = "next_obs";
    /// Episode-termination flags (1.0 at terminal transitions).
    pub const DONES: &str = "dones";
    /// Recurrent hidden-state masks.
    pub const H_MASKS: &str = "h_masks";
    /// Output masks marking valid, non-padded positions.
    pub const OUT_MASKS: &str = "out_masks";
    /// Value predictions recorded when the batch was collected.
    pub const VS: &str = "vs";
}

/// A set of named tensors sharing the leading time-or-sample dimension.
///
/// Masks are broadcast-compatible with the quantities they gate. The loss
/// layer never mutates a batch; it is supplied fresh per call.
#[derive(Debug, Clone, Default)]
pub struct Batch {
    fields: BTreeMap<String, Tensor>,
}

impl Batch {
    /// Creates an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field, consuming and returning the batch.
    pub fn with(mut self, name: impl Into<String>, tensor: Tensor) -> Self {
        self.fields.insert(name.into(), tensor);
        self
    }

    /// Adds a field in place.
    pub fn insert(&mut self, name: impl Into<String>, tensor: Tensor) {
        self.fields.insert(name.into(), tensor);
    }

    /// Returns a required field, failing if it is absent.
    pub fn get(&self, name: &str) -> Result<&Tensor> {
        self.fields
            .get(name)
            .ok_or_else(|| LossError::BatchField(name.to_string()))
    }

    /// Returns an optional field.
    pub fn opt(&self, name: &str) -> Option<&Tensor> {
        self.fields.get(name)
    }

    /// Whether the batch carries the given field.
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }
}
