//! Entropy temperature of the soft actor-critic loss.
use crate::opt::{Optimizer, OptimizerConfig};
use anyhow::Result;
use candle_core::{DType, Device, Tensor};
use candle_nn::{init::Init, VarBuilder, VarMap};
use log::info;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Mode of the entropy temperature.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub enum EntCoefMode {
    /// Use a constant as alpha.
    Fix(f64),
    /// Automatic tuning with the given learning rate. The entropy target
    /// is supplied by the loss from the policy's action dimensionality.
    Auto(f64),
}

/// The entropy temperature of the soft actor-critic loss.
///
/// Owns `log_alpha`, a single learnable scalar kept in log space for
/// positivity. The loss layer only reads it; the temperature loss is
/// applied through [`backward_step`].
///
/// [`backward_step`]: Self::backward_step
pub struct EntCoef {
    varmap: VarMap,
    log_alpha: Tensor,
    opt: Option<Optimizer>,
}

impl EntCoef {
    /// Constructs an instance of `EntCoef`.
    pub fn new(mode: EntCoefMode, device: Device) -> Result<Self> {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
        let (log_alpha, opt) = match mode {
            EntCoefMode::Fix(alpha) => {
                let init = Init::Const(alpha.ln());
                let log_alpha = vb.get_with_hints(1, "log_alpha", init)?;
                (log_alpha, None)
            }
            EntCoefMode::Auto(learning_rate) => {
                let init = Init::Const(0.0);
                let log_alpha = vb.get_with_hints(1, "log_alpha", init)?;
                let opt = OptimizerConfig::default()
                    .learning_rate(learning_rate)
                    .build(varmap.all_vars())?;
                (log_alpha, Some(opt))
            }
        };

        Ok(Self {
            varmap,
            log_alpha,
            opt,
        })
    }

    /// Returns the entropy coefficient, detached from the graph.
    pub fn alpha(&self) -> telos_core::Result<Tensor> {
        Ok(self.log_alpha.detach().exp()?)
    }

    /// The learnable log-space temperature.
    pub fn log_alpha(&self) -> &Tensor {
        &self.log_alpha
    }

    /// Applies an optimization step given a temperature loss.
    ///
    /// A no-op in [`EntCoefMode::Fix`] mode.
    pub fn backward_step(&mut self, loss: &Tensor) -> Result<()> {
        if let Some(opt) = &mut self.opt {
            opt.backward_step(loss)?;
        }
        Ok(())
    }

    /// Save the parameter into a file.
    pub fn save<T: AsRef<Path>>(&self, path: T) -> Result<()> {
        self.varmap.save(&path)?;
        info!("Save entropy coefficient to {:?}", path.as_ref());
        Ok(())
    }

    /// Load the parameter from a file.
    pub fn load<T: AsRef<Path>>(&mut self, path: T) -> Result<()> {
        self.varmap.load(&path)?;
        info!("Load entropy coefficient from {:?}", path.as_ref());
        Ok(())
    }
}
