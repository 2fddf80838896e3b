//! Bootstrapped temporal-difference losses for action-value functions.
use anyhow::Result as AnyResult;
use candle_core::Tensor;
use log::trace;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};
use telos_core::{
    batch::field,
    model::{ActionValue, GreedyActionValue, StochasticPolicy},
    pd::Distribution,
    util::{binary_cross_entropy, expand_samples, CriticLoss, Reduction},
    Batch, LossError, Result,
};

/// Kind of action space the critic is defined over.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub enum ActionSpace {
    /// Continuous (vector-valued) actions.
    Continuous,

    /// Discrete actions. Not supported by [`bellman`].
    Discrete,
}

/// Configuration of [`bellman`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct BellmanConfig {
    /// Discount factor.
    pub gamma: f64,

    /// Number of next-action samples for the expectation estimate.
    pub sampling: usize,

    /// Kind of action space the critic is defined over.
    pub action_space: ActionSpace,

    /// Reduction applied to the per-element squared errors.
    pub reduction: Reduction,
}

impl Default for BellmanConfig {
    fn default() -> Self {
        Self {
            gamma: 0.99,
            sampling: 1,
            action_space: ActionSpace::Continuous,
            reduction: Reduction::Mean,
        }
    }
}

impl BellmanConfig {
    /// Discount factor.
    pub fn discount_factor(mut self, v: f64) -> Self {
        self.gamma = v;
        self
    }

    /// Number of next-action samples.
    pub fn sampling(mut self, v: usize) -> Self {
        self.sampling = v;
        self
    }

    /// Reduction of the per-element errors.
    pub fn reduction(mut self, v: Reduction) -> Self {
        self.reduction = v;
        self
    }

    /// Constructs [`BellmanConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> AnyResult<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`BellmanConfig`] as YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> AnyResult<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

/// Single-critic Bellman loss.
///
/// The bootstrap expectation is estimated by sampling `sampling`
/// next-actions from the target policy at the next observations and
/// averaging the target critic over them. The TD target is detached, so
/// no gradient reaches the target critic, the target policy or the
/// sampled actions.
///
/// Requires `obs`, `acs`, `rews`, `next_obs` and `dones`. Only
/// continuous action spaces are implemented; a discrete configuration
/// fails before any computation.
pub fn bellman<Q, P>(
    qf: &Q,
    targ_qf: &Q,
    targ_pol: &P,
    batch: &Batch,
    config: &BellmanConfig,
) -> Result<Tensor>
where
    Q: ActionValue,
    P: StochasticPolicy,
{
    if let ActionSpace::Discrete = config.action_space {
        return Err(LossError::Unsupported(
            "only Q functions with continuous action spaces are supported".to_string(),
        ));
    }

    let obs = batch.get(field::OBS)?;
    let acs = batch.get(field::ACS)?;
    let rews = batch.get(field::REWS)?;
    let next_obs = batch.get(field::NEXT_OBS)?;
    let dones = batch.get(field::DONES)?;

    targ_pol.reset();
    let pd_params = targ_pol.forward(next_obs, None)?;

    let next_acs = targ_pol.pd().sample(&pd_params, config.sampling)?;
    let sampled_next_obs = expand_samples(next_obs, config.sampling)?;
    trace!("bellman: averaging target critic over {} samples", config.sampling);
    let targ_q = targ_qf.forward(&sampled_next_obs, &next_acs)?;
    let next_q = targ_q.mean(0)?;

    let targ = (rews + ((config.gamma * next_q)? * (1f64 - dones)?)?)?.detach();
    let q = qf.forward(obs, acs)?;

    let ret = (0.5 * (q - targ)?.powf(2.0)?)?;
    match config.reduction {
        Reduction::Mean => Ok(ret.mean_all()?),
        Reduction::Sum => Ok(ret.sum_all()?),
        Reduction::Elementwise => Ok(ret),
    }
}

/// Configuration of [`clipped_double_bellman`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct ClippedDoubleBellmanConfig {
    /// Discount factor.
    pub gamma: f64,

    /// Metric comparing the prediction with the TD target. `Bce`
    /// requires probability-like Q values in [0, 1].
    pub loss_type: CriticLoss,
}

impl Default for ClippedDoubleBellmanConfig {
    fn default() -> Self {
        Self {
            gamma: 0.99,
            loss_type: CriticLoss::Bce,
        }
    }
}

impl ClippedDoubleBellmanConfig {
    /// Discount factor.
    pub fn discount_factor(mut self, v: f64) -> Self {
        self.gamma = v;
        self
    }

    /// Metric comparing the prediction with the TD target.
    pub fn loss_type(mut self, v: CriticLoss) -> Self {
        self.loss_type = v;
        self
    }

    /// Constructs [`ClippedDoubleBellmanConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> AnyResult<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`ClippedDoubleBellmanConfig`] as YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> AnyResult<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

/// Clipped double Q-learning loss.
///
/// The primary target critic picks the greedy next action; the second
/// target critic is evaluated at that action and the elementwise minimum
/// of both estimates forms the pessimistic TD target, countering
/// overestimation bias. The target is detached before the loss.
///
/// Requires `obs`, `acs`, `rews`, `next_obs` and `dones`.
pub fn clipped_double_bellman<Q, G>(
    qf: &Q,
    targ_qf1: &G,
    targ_qf2: &Q,
    batch: &Batch,
    config: &ClippedDoubleBellmanConfig,
) -> Result<Tensor>
where
    Q: ActionValue,
    G: GreedyActionValue,
{
    let obs = batch.get(field::OBS)?;
    let acs = batch.get(field::ACS)?;
    let rews = batch.get(field::REWS)?;
    let next_obs = batch.get(field::NEXT_OBS)?;
    let dones = batch.get(field::DONES)?;

    let (targ_q1, next_acs) = targ_qf1.max(next_obs)?;
    let targ_q2 = targ_qf2.forward(next_obs, &next_acs)?;
    let targ_q = targ_q1.minimum(&targ_q2)?;

    let targ = (rews + ((config.gamma * targ_q)? * (1f64 - dones)?)?)?.detach();
    let q = qf.forward(obs, acs)?;

    match config.loss_type {
        CriticLoss::Bce => binary_cross_entropy(&q, &targ),
        CriticLoss::Mse => Ok((0.5 * (q - targ)?.powf(2.0)?)?.mean_all()?),
    }
}
