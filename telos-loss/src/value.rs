//! Regression losses for state-value functions.
use candle_core::Tensor;
use telos_core::{
    batch::field,
    model::StateValue,
    util::{masked_mean, recurrent_masks},
    Batch, Result,
};

/// Monte-Carlo regression of `V(obs)` toward the recorded returns.
///
/// With `clip` enabled the new prediction is clipped to within
/// `clip_param` of the prediction recorded in the batch's `vs` field and
/// the elementwise maximum of the clipped and unclipped squared errors
/// is taken, preventing large single-step value updates.
pub fn monte_carlo<V: StateValue>(
    vf: &V,
    batch: &Batch,
    clip_param: f64,
    clip: bool,
) -> Result<Tensor> {
    let obs = batch.get(field::OBS)?;
    let rets = batch.get(field::RETS)?;

    vf.reset();
    let (h_masks, out_masks) = recurrent_masks(vf.is_recurrent(), batch, rets)?;
    let vs = vf.forward(obs, h_masks)?;

    let vf_loss1 = (&vs - rets)?.powf(2.0)?;
    let vf_loss = if clip {
        let old_vs = batch.get(field::VS)?;
        let vpredclipped = (old_vs + (&vs - old_vs)?.clamp(-clip_param, clip_param)?)?;
        let vf_loss2 = (vpredclipped - rets)?.powf(2.0)?;
        masked_mean(&vf_loss1.maximum(&vf_loss2)?, &out_masks)?
    } else {
        masked_mean(&vf_loss1, &out_masks)?
    };
    Ok((0.5 * vf_loss)?)
}
