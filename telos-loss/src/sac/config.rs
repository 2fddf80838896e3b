//! Configuration of the soft actor-critic loss.
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`sac`](super::sac).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct SacConfig {
    /// Discount factor.
    pub gamma: f64,

    /// Number of action samples for the expectation estimates.
    pub sampling: usize,

    /// Whether the policy loss differentiates through the sampled
    /// actions. When `false` the likelihood-ratio estimator is used.
    pub reparam: bool,

    /// Standardizes the likelihood-ratio weight across the batch.
    pub normalize: bool,

    /// Stabilizer added to the standard deviation when normalizing.
    pub eps: f64,
}

impl Default for SacConfig {
    fn default() -> Self {
        Self {
            gamma: 0.99,
            sampling: 1,
            reparam: true,
            normalize: false,
            eps: 1e-6,
        }
    }
}

impl SacConfig {
    /// Discount factor.
    pub fn discount_factor(mut self, v: f64) -> Self {
        self.gamma = v;
        self
    }

    /// Number of action samples.
    pub fn sampling(mut self, v: usize) -> Self {
        self.sampling = v;
        self
    }

    /// Whether to use the reparameterization trick.
    pub fn reparam(mut self, v: bool) -> Self {
        self.reparam = v;
        self
    }

    /// Whether to standardize the likelihood-ratio weight.
    pub fn normalize(mut self, v: bool) -> Self {
        self.normalize = v;
        self
    }

    /// Constructs [`SacConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`SacConfig`] as YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
