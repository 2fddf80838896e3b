//! Shared reductions and numerical helpers.
use crate::{
    batch::{field, Batch},
    error::Result,
};
use candle_core::Tensor;
use serde::{Deserialize, Serialize};

/// Reduction applied to a per-element loss tensor.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub enum Reduction {
    /// Mean over all elements.
    Mean,

    /// Sum over all elements.
    Sum,

    /// No reduction; the per-element tensor is returned.
    Elementwise,
}

/// Metric comparing a critic's prediction with its bootstrapped target.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub enum CriticLoss {
    /// Mean squared error.
    Mse,

    /// Binary cross entropy; predictions and targets must lie in [0, 1].
    Bce,
}

/// Mean of `loss * mask` over all elements.
///
/// Padded positions contribute zero to the numerator but still count in
/// the denominator. This is a fixed reduction policy shared by every
/// masked loss, not a mask-weighted average.
pub fn masked_mean(loss: &Tensor, mask: &Tensor) -> Result<Tensor> {
    Ok(loss.broadcast_mul(mask)?.mean_all()?)
}

/// Hidden-state and output masks for a model evaluation.
///
/// Recurrent models read both masks from the batch; non-recurrent models
/// get no hidden-state mask and an all-ones output mask shaped like
/// `like`.
pub fn recurrent_masks<'a>(
    recurrent: bool,
    batch: &'a Batch,
    like: &Tensor,
) -> Result<(Option<&'a Tensor>, Tensor)> {
    if recurrent {
        Ok((
            Some(batch.get(field::H_MASKS)?),
            batch.get(field::OUT_MASKS)?.clone(),
        ))
    } else {
        Ok((None, like.ones_like()?))
    }
}

/// Tiles a batch tensor along a new leading sampling dimension.
pub fn expand_samples(t: &Tensor, sampling: usize) -> Result<Tensor> {
    let mut dims = vec![sampling];
    dims.extend_from_slice(t.dims());
    Ok(t.broadcast_as(dims)?)
}

/// Elementwise minimum over an ensemble of tensors.
///
/// A one-member ensemble is returned unchanged.
pub fn ensemble_min(ts: &[Tensor]) -> Result<Tensor> {
    debug_assert!(!ts.is_empty());
    let mut min = ts[0].clone();
    for t in &ts[1..] {
        min = min.minimum(t)?;
    }
    Ok(min)
}

/// Elementwise maximum over an ensemble of tensors.
///
/// A one-member ensemble is returned unchanged.
pub fn ensemble_max(ts: &[Tensor]) -> Result<Tensor> {
    debug_assert!(!ts.is_empty());
    let mut max = ts[0].clone();
    for t in &ts[1..] {
        max = max.maximum(t)?;
    }
    Ok(max)
}

/// Standardizes a tensor to zero mean and unit scale across the batch.
pub fn standardize(t: &Tensor, eps: f64) -> Result<Tensor> {
    let centered = t.broadcast_sub(&t.mean_all()?)?;
    let std = centered.powf(2.0)?.mean_all()?.sqrt()?;
    Ok(centered.broadcast_div(&(std + eps)?)?)
}

/// See <https://pytorch.org/docs/stable/generated/torch.nn.BCELoss.html>.
///
/// candle-nn only ships the from-logits variant; this is the
/// probability-space form used when critics already output values in
/// [0, 1].
pub fn binary_cross_entropy(probs: &Tensor, target: &Tensor) -> Result<Tensor> {
    let pos = (target * probs.log()?)?;
    let neg = ((1f64 - target)? * (1f64 - probs)?.log()?)?;
    Ok((pos + neg)?.mean_all()?.neg()?)
}

/// See <https://pytorch.org/docs/stable/generated/torch.nn.functional.logsigmoid.html>.
///
/// Computed as `-softplus(-x)` with the max/log1p split so large
/// negative inputs do not overflow.
pub fn log_sigmoid(x: &Tensor) -> Result<Tensor> {
    let max_part = x.neg()?.relu()?;
    let log_part = (x.abs()?.neg()?.exp()? + 1f64)?.log()?;
    Ok((max_part + log_part)?.neg()?)
}
