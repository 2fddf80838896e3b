//! Soft actor-critic loss.
use super::{EntCoef, SacConfig};
use candle_core::Tensor;
use log::trace;
use telos_core::{
    batch::field,
    model::{ActionValue, StochasticPolicy},
    pd::Distribution,
    util::{ensemble_max, ensemble_min, expand_samples, standardize},
    Batch, Result,
};

/// The three independent scalars produced by [`sac`].
///
/// The caller applies each to its own parameter group: the policy loss
/// to the policy optimizer, each critic loss to its ensemble member, and
/// the temperature loss to the [`EntCoef`] cell.
pub struct SacLosses {
    /// Policy loss.
    pub pol_loss: Tensor,

    /// One loss per critic-ensemble member.
    pub qf_losses: Vec<Tensor>,

    /// Loss of the entropy temperature.
    pub alpha_loss: Tensor,
}

/// Soft actor-critic loss.
///
/// `qfs` and `targ_qfs` are parallel ensembles of the same length
/// (≥ 1). Expectations over actions are estimated with
/// `config.sampling` samples per observation. Requires `obs`, `acs`,
/// `rews`, `next_obs` and `dones`.
pub fn sac<P, Q>(
    pol: &P,
    qfs: &[Q],
    targ_qfs: &[Q],
    ent_coef: &EntCoef,
    batch: &Batch,
    config: &SacConfig,
) -> Result<SacLosses>
where
    P: StochasticPolicy,
    Q: ActionValue,
{
    let obs = batch.get(field::OBS)?;
    let acs = batch.get(field::ACS)?;
    let rews = batch.get(field::REWS)?;
    let next_obs = batch.get(field::NEXT_OBS)?;
    let dones = batch.get(field::DONES)?;

    // Detached temperature; log_alpha learns only from the temperature
    // loss below.
    let alpha = ent_coef.alpha()?;

    pol.reset();
    let pd_params = pol.forward(obs, None)?;
    pol.reset();
    let next_pd_params = pol.forward(next_obs, None)?;
    let pd = pol.pd();

    let sampled_obs = expand_samples(obs, config.sampling)?;
    let sampled_next_obs = expand_samples(next_obs, config.sampling)?;

    let sampled_acs = pd.sample(&pd_params, config.sampling)?;
    let sampled_next_acs = pd.sample(&next_pd_params, config.sampling)?;

    // The current-branch sample is detached only as the log-likelihood
    // argument; the sample itself stays differentiable for the
    // reparameterized policy loss. The next branch is cut off as a whole
    // when the TD target is detached.
    let sampled_llh = pd.llh(&sampled_acs.detach(), &pd_params)?;
    let sampled_next_llh = pd.llh(&sampled_next_acs, &next_pd_params)?;

    trace!("sac: evaluating {} critics", qfs.len());
    let mut sampled_qs = Vec::with_capacity(qfs.len());
    for qf in qfs {
        sampled_qs.push(qf.forward(&sampled_obs, &sampled_acs)?);
    }
    let mut sampled_next_targ_qs = Vec::with_capacity(targ_qfs.len());
    for targ_qf in targ_qfs {
        sampled_next_targ_qs.push(targ_qf.forward(&sampled_next_obs, &sampled_next_acs)?);
    }

    // Soft state value per target critic, averaged over action samples,
    // then the pessimistic minimum across the ensemble.
    let mut next_vs = Vec::with_capacity(sampled_next_targ_qs.len());
    for sampled_next_targ_q in &sampled_next_targ_qs {
        next_vs.push((sampled_next_targ_q - alpha.broadcast_mul(&sampled_next_llh)?)?.mean(0)?);
    }
    let next_v = ensemble_min(&next_vs)?;

    let q_targ = (rews + ((config.gamma * next_v)? * (1f64 - dones)?)?)?.detach();

    let mut qf_losses = Vec::with_capacity(qfs.len());
    for qf in qfs {
        let q = qf.forward(obs, acs)?;
        qf_losses.push((0.5 * (q - &q_targ)?.powf(2.0)?)?.mean_all()?);
    }

    let pol_loss = if config.reparam {
        // Maximizing over critics is the conservative policy loss,
        // mirroring the minimum used for the value target.
        let mut pol_losses = Vec::with_capacity(sampled_qs.len());
        for sampled_q in &sampled_qs {
            pol_losses.push((alpha.broadcast_mul(&sampled_llh)? - sampled_q)?.mean(0)?);
        }
        ensemble_max(&pol_losses)?.mean_all()?
    } else {
        // Likelihood-ratio mode: the per-critic quantity becomes a
        // constant weight on the sampled log-likelihood, so nothing has
        // to differentiate through the sampling operation.
        let mut pg_weights = Vec::with_capacity(sampled_qs.len());
        for sampled_q in &sampled_qs {
            pg_weights
                .push((alpha.broadcast_mul(&sampled_llh)? - sampled_q)?.mean(0)?.detach());
        }
        let mut pg_weight = ensemble_max(&pg_weights)?;
        if config.normalize {
            pg_weight = standardize(&pg_weight, config.eps)?;
        }
        (sampled_llh.mean(0)? * pg_weight)?.mean_all()?
    };

    // Adapts the temperature toward an entropy target equal to the
    // action dimensionality.
    let target_entropy = pol.action_dim() as f64;
    let alpha_loss = ent_coef
        .log_alpha()
        .broadcast_mul(&(sampled_llh - target_entropy)?.detach())?
        .mean_all()?
        .neg()?;

    Ok(SacLosses {
        pol_loss,
        qf_losses,
        alpha_loss,
    })
}
