//! Regression loss for dynamics models.
use anyhow::Result as AnyResult;
use candle_core::{DType, Tensor, D};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};
use telos_core::{batch::field, model::DynamicsModel, util::masked_mean, Batch, Result};

/// Prediction target of the dynamics model.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub enum DynamicsTarget {
    /// Predict the next observation.
    NextObs,

    /// Predict the reward.
    Rews,
}

/// Configuration of [`dynamics`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct DynamicsConfig {
    /// What the model predicts.
    pub target: DynamicsTarget,

    /// With [`DynamicsTarget::NextObs`], regress on the temporal
    /// difference `next_obs - obs` instead of the absolute next state.
    pub td: bool,
}

impl Default for DynamicsConfig {
    fn default() -> Self {
        Self {
            target: DynamicsTarget::NextObs,
            td: true,
        }
    }
}

impl DynamicsConfig {
    /// Prediction target.
    pub fn target(mut self, v: DynamicsTarget) -> Self {
        self.target = v;
        self
    }

    /// Whether to regress on the temporal difference.
    pub fn td(mut self, v: bool) -> Self {
        self.td = v;
        self
    }

    /// Constructs [`DynamicsConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> AnyResult<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`DynamicsConfig`] as YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> AnyResult<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

/// Squared-error regression for dynamics models.
///
/// The per-element error is averaged over the trailing feature
/// dimension before the masked mean over the batch. Requires `obs` and
/// `acs`, plus `next_obs` or `rews` depending on the target.
pub fn dynamics<M: DynamicsModel>(dm: &M, batch: &Batch, config: &DynamicsConfig) -> Result<Tensor> {
    let obs = batch.get(field::OBS)?;
    let acs = batch.get(field::ACS)?;

    dm.reset();
    let (h_masks, out_masks) = if dm.is_recurrent() {
        (
            Some(batch.get(field::H_MASKS)?),
            batch.get(field::OUT_MASKS)?.clone(),
        )
    } else {
        (
            None,
            Tensor::ones(obs.dims()[0], DType::F32, obs.device())?,
        )
    };
    let pred = dm.forward(obs, acs, h_masks)?;

    let target = match config.target {
        DynamicsTarget::Rews => batch.get(field::REWS)?.clone(),
        DynamicsTarget::NextObs => {
            if config.td {
                (batch.get(field::NEXT_OBS)? - obs)?
            } else {
                batch.get(field::NEXT_OBS)?.clone()
            }
        }
    };

    let dm_loss = (pred - target)?.powf(2.0)?;
    let dm_loss = masked_mean(&dm_loss.mean(D::Minus1)?, &out_masks)?;
    Ok((0.5 * dm_loss)?)
}
