//! Action-gradient loss.
use candle_core::Tensor;
use telos_core::{
    batch::field,
    model::{ActionValue, StochasticPolicy},
    pd::Distribution,
    util::expand_samples,
    Batch, Result,
};

/// DDPG-style action gradient.
///
/// Samples actions from the current policy, averages the critic over the
/// samples and minimizes the negated mean action value, propagating the
/// value gradient directly into the policy. Requires `obs`.
pub fn ag<P, Q>(pol: &P, qf: &Q, batch: &Batch, sampling: usize) -> Result<Tensor>
where
    P: StochasticPolicy,
    Q: ActionValue,
{
    let obs = batch.get(field::OBS)?;

    let pd_params = pol.forward(obs, None)?;

    let acs = pol.pd().sample(&pd_params, sampling)?;
    let q = qf.forward(&expand_samples(obs, sampling)?, &acs)?;
    let q = q.mean(0)?;

    Ok(q.mean_all()?.neg()?)
}
