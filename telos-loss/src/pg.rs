//! On-policy policy-gradient losses.
//!
//! All variants evaluate the policy afresh on the batch observations
//! (resetting recurrent state first) and compare against the behavior
//! recorded at collection time. The collection-time distribution
//! parameters are passed explicitly where a variant needs them.
use candle_core::Tensor;
use telos_core::{
    batch::field,
    model::StochasticPolicy,
    pd::Distribution,
    util::{masked_mean, recurrent_masks},
    Batch, Result,
};

/// Vanilla policy gradient with an entropy bonus.
///
/// Requires `obs`, `acs` and `advs`; recurrent policies additionally
/// read `h_masks` and `out_masks`.
pub fn pg<P: StochasticPolicy>(pol: &P, batch: &Batch, ent_beta: f64) -> Result<Tensor> {
    let obs = batch.get(field::OBS)?;
    let acs = batch.get(field::ACS)?;
    let advs = batch.get(field::ADVS)?;

    pol.reset();
    let (h_masks, out_masks) = recurrent_masks(pol.is_recurrent(), batch, advs)?;
    let pd_params = pol.forward(obs, h_masks)?;

    let llh = pol.pd().llh(acs, &pd_params)?;

    let pol_loss = masked_mean(&(llh * advs)?, &out_masks)?.neg()?;
    let ent = pol.pd().ent(&pd_params)?;
    Ok((pol_loss - (ent_beta * ent.mean_all()?)?)?)
}

/// Policy gradient with importance-ratio clipping.
///
/// The conservative surrogate: both the unclipped and the clipped
/// negated objective are formed and the elementwise maximum is taken,
/// so the update never profits from a ratio outside
/// `[1 - clip_param, 1 + clip_param]`.
///
/// `old_params` are the distribution parameters recorded when the batch
/// was collected.
pub fn pg_clip<P: StochasticPolicy>(
    pol: &P,
    batch: &Batch,
    old_params: &<P::Pd as Distribution>::Params,
    clip_param: f64,
    ent_beta: f64,
) -> Result<Tensor> {
    let obs = batch.get(field::OBS)?;
    let acs = batch.get(field::ACS)?;
    let advs = batch.get(field::ADVS)?;

    let (h_masks, out_masks) = recurrent_masks(pol.is_recurrent(), batch, advs)?;
    let pd = pol.pd();

    let old_llh = pd.llh(acs, old_params)?;

    pol.reset();
    let pd_params = pol.forward(obs, h_masks)?;

    let new_llh = pd.llh(acs, &pd_params)?;
    let ratio = (new_llh - old_llh)?.exp()?;
    let pol_loss1 = (&ratio * advs)?.neg()?;
    let pol_loss2 = (ratio.clamp(1.0 - clip_param, 1.0 + clip_param)? * advs)?.neg()?;
    let pol_loss = masked_mean(&pol_loss1.maximum(&pol_loss2)?, &out_masks)?;

    let ent = pd.ent(&pd_params)?;
    Ok((pol_loss - (ent_beta * ent.mean_all()?)?)?)
}

/// Policy gradient with a KL divergence penalty.
///
/// The surrogate is reduced by `kl_beta * KL(old ‖ new)` before the
/// final negation, so the returned loss grows with the divergence from
/// the collection-time policy.
pub fn pg_kl<P: StochasticPolicy>(
    pol: &P,
    batch: &Batch,
    old_params: &<P::Pd as Distribution>::Params,
    kl_beta: f64,
    ent_beta: f64,
) -> Result<Tensor> {
    let obs = batch.get(field::OBS)?;
    let acs = batch.get(field::ACS)?;
    let advs = batch.get(field::ADVS)?;

    let (h_masks, out_masks) = recurrent_masks(pol.is_recurrent(), batch, advs)?;
    let pd = pol.pd();

    let old_llh = pd.llh(acs, old_params)?;

    pol.reset();
    let pd_params = pol.forward(obs, h_masks)?;

    let new_llh = pd.llh(acs, &pd_params)?;
    let ratio = (new_llh - old_llh)?.exp()?;
    let surrogate = (ratio * advs)?.broadcast_mul(&out_masks)?;

    let kl = pd.kl_pq(old_params, &pd_params)?;
    let penalty = (kl_beta * kl.broadcast_mul(&out_masks)?)?;

    let pol_loss = (surrogate - penalty)?.mean_all()?.neg()?;

    let ent = pd.ent(&pd_params)?;
    Ok((pol_loss - (ent_beta * ent.mean_all()?)?)?)
}
