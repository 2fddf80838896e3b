//! Discriminator and density-ratio losses for imitation and inverse RL.
use candle_core::Tensor;
use candle_nn::{loss::binary_cross_entropy_with_logit, ops::sigmoid};
use serde::{Deserialize, Serialize};
use telos_core::{
    batch::field,
    model::{ActionValue, Discriminator, StateValue, StochasticPolicy},
    pd::Distribution,
    util::log_sigmoid,
    Batch, Result,
};

/// Which side of the discriminator a batch comes from.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone, Copy)]
pub enum SampleSource {
    /// Expert demonstrations, labeled 1.
    Expert,

    /// Agent rollouts, labeled 0.
    Agent,
}

impl SampleSource {
    fn label(&self) -> f32 {
        match self {
            SampleSource::Expert => 1.0,
            SampleSource::Agent => 0.0,
        }
    }
}

fn constant_labels(source: SampleSource, like: &Tensor) -> Result<Tensor> {
    Ok(Tensor::full(source.label(), like.dims(), like.device())?)
}

/// Binary cross-entropy discriminator loss with an entropy bonus.
///
/// The entropy of the discriminator's implied Bernoulli distribution is
/// subtracted, regularizing against overconfident discriminators.
/// Requires `obs` and `acs`.
pub fn cross_ent<D: Discriminator>(
    discrim: &D,
    batch: &Batch,
    source: SampleSource,
    ent_beta: f64,
) -> Result<Tensor> {
    let obs = batch.get(field::OBS)?;
    let acs = batch.get(field::ACS)?;

    let logits = discrim.forward(obs, acs)?;
    let labels = constant_labels(source, &logits)?;
    let discrim_loss = binary_cross_entropy_with_logit(&logits, &labels)?;

    // Bernoulli entropy written in logit space.
    let ent = (((1f64 - sigmoid(&logits)?)? * &logits)? - log_sigmoid(&logits)?)?;
    Ok((discrim_loss - (ent_beta * ent.mean_all()?)?)?)
}

/// Density-ratio discriminator built from a reward and a shaping value
/// function.
///
/// The logits are a potential-shaped energy
/// `rews + gamma * (1 - dones) * V(next_obs) - V(obs)` minus the
/// policy's log-likelihood of the taken action. The policy only scores
/// the actions; no gradient flows into it. Requires `obs`, `acs`,
/// `next_obs` and `dones`.
pub fn density_ratio_rew_cross_ent<R, V, P>(
    rewf: &R,
    shaping_vf: &V,
    pol: &P,
    batch: &Batch,
    source: SampleSource,
    gamma: f64,
) -> Result<Tensor>
where
    R: StateValue,
    V: StateValue,
    P: StochasticPolicy,
{
    let obs = batch.get(field::OBS)?;
    let acs = batch.get(field::ACS)?;
    let next_obs = batch.get(field::NEXT_OBS)?;
    let dones = batch.get(field::DONES)?;

    let vs = shaping_vf.forward(obs, None)?;
    let rews = rewf.forward(obs, None)?;
    let next_vs = shaping_vf.forward(next_obs, None)?;
    let energies = ((rews + ((1f64 - dones)? * (gamma * next_vs)?)?)? - vs)?;

    let llhs = {
        let params = pol.forward(obs, None)?;
        pol.pd().llh(acs, &params)?.detach()
    };

    let logits = (energies - llhs)?;
    let labels = constant_labels(source, &logits)?;
    Ok(binary_cross_entropy_with_logit(&logits, &labels)?)
}

/// Density-ratio discriminator whose energy is a learned advantage
/// function.
///
/// Same pattern as [`density_ratio_rew_cross_ent`] with the advantage
/// output used as the energy directly. Requires `obs` and `acs`.
pub fn density_ratio_adv_cross_ent<A, P>(
    advf: &A,
    pol: &P,
    batch: &Batch,
    source: SampleSource,
) -> Result<Tensor>
where
    A: ActionValue,
    P: StochasticPolicy,
{
    let obs = batch.get(field::OBS)?;
    let acs = batch.get(field::ACS)?;

    let energies = advf.forward(obs, acs)?;

    let llhs = {
        let params = pol.forward(obs, None)?;
        pol.pd().llh(acs, &params)?.detach()
    };

    let logits = (energies - llhs)?;
    let labels = constant_labels(source, &logits)?;
    Ok(binary_cross_entropy_with_logit(&logits, &labels)?)
}
