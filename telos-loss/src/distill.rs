//! Imitation losses on policy log-likelihoods.
use candle_core::Tensor;
use telos_core::{
    batch::field,
    model::StochasticPolicy,
    pd::{Distribution, StopGrad},
    Batch, Result,
};

/// Negative mean log-likelihood of the taken actions (behavior
/// cloning). Requires `obs` and `acs`.
pub fn log_likelihood<P: StochasticPolicy>(pol: &P, batch: &Batch) -> Result<Tensor> {
    let obs = batch.get(field::OBS)?;
    let acs = batch.get(field::ACS)?;

    let pd_params = pol.forward(obs, None)?;
    let llh = pol.pd().llh(acs, &pd_params)?;
    Ok(llh.mean_all()?.neg()?)
}

/// Shannon cross-entropy for policy distillation.
///
/// `KL(teacher ‖ student) - H(teacher)`, mean-reduced. The teacher's
/// parameters are cut off from gradient flow; only the student is
/// trained. See <https://arxiv.org/abs/1902.02186>.
///
/// Requires `obs`; recurrent teachers additionally read `h_masks`.
pub fn shannon_cross_entropy<S, T>(student_pol: &S, teacher_pol: &T, batch: &Batch) -> Result<Tensor>
where
    S: StochasticPolicy,
    T: StochasticPolicy<Pd = S::Pd>,
{
    let obs = batch.get(field::OBS)?;
    let h_masks = if teacher_pol.is_recurrent() {
        Some(batch.get(field::H_MASKS)?)
    } else {
        None
    };

    let s_pd = student_pol.pd();
    student_pol.reset();
    teacher_pol.reset();
    let s_params = student_pol.forward(obs, h_masks)?;
    let t_params = teacher_pol.forward(obs, h_masks)?.stop_grad();

    let cross_entropy_loss = (s_pd.kl_pq(&t_params, &s_params)? - s_pd.ent(&t_params)?)?;
    Ok(cross_entropy_loss.mean_all()?)
}
