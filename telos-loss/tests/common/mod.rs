//! Shared test fixtures: a diagonal Gaussian distribution and linear
//! models over [`VarMap`]s, small enough that expected loss values can
//! be written out by hand.
#![allow(dead_code)]
use anyhow::Result;
use candle_core::{DType, Device, Tensor, D};
use candle_nn::{init::Init, VarBuilder, VarMap};
use telos_core::{
    model::{
        ActionValue, Discriminator, DynamicsModel, GreedyActionValue, StateValue,
        StochasticPolicy,
    },
    pd::{Distribution, StopGrad},
    Result as CoreResult,
};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn ln_2pi() -> f64 {
    (2.0 * std::f64::consts::PI).ln()
}

/// A `(n,)` tensor on the CPU.
pub fn vec_tensor(data: &[f32], device: &Device) -> Tensor {
    Tensor::from_slice(data, (data.len(),), device).unwrap()
}

/// A `(n, 1)` tensor on the CPU.
pub fn col_tensor(data: &[f32], device: &Device) -> Tensor {
    Tensor::from_slice(data, (data.len(), 1), device).unwrap()
}

/// Parameters of a diagonal Gaussian over actions.
pub struct DiagGaussianParams {
    pub mean: Tensor,
    pub log_std: Tensor,
}

impl StopGrad for DiagGaussianParams {
    fn stop_grad(&self) -> Self {
        Self {
            mean: self.mean.detach(),
            log_std: self.log_std.detach(),
        }
    }
}

/// Diagonal Gaussian distribution with reparameterized sampling.
pub struct DiagGaussian;

impl Distribution for DiagGaussian {
    type Params = DiagGaussianParams;

    fn sample(&self, params: &Self::Params, sampling: usize) -> CoreResult<Tensor> {
        let mut dims = vec![sampling];
        dims.extend_from_slice(params.mean.dims());
        let z = Tensor::randn(0f32, 1f32, dims, params.mean.device())?;
        let std = params.log_std.exp()?;
        Ok(z.broadcast_mul(&std)?.broadcast_add(&params.mean)?)
    }

    fn llh(&self, acs: &Tensor, params: &Self::Params) -> CoreResult<Tensor> {
        let std = params.log_std.exp()?;
        let diff = acs.broadcast_sub(&params.mean)?.broadcast_div(&std)?;
        let quad = (0.5 * diff.powf(2.0)?)?.sum(D::Minus1)?;
        let norm = (&params.log_std + 0.5 * ln_2pi())?.sum_all()?;
        Ok(quad.broadcast_add(&norm)?.neg()?)
    }

    fn ent(&self, params: &Self::Params) -> CoreResult<Tensor> {
        let ent = (&params.log_std + 0.5 * (1.0 + ln_2pi()))?.sum_all()?;
        Ok(ent.broadcast_as(params.mean.dims()[0])?)
    }

    fn kl_pq(&self, p: &Self::Params, q: &Self::Params) -> CoreResult<Tensor> {
        let var_p = (2.0 * &p.log_std)?.exp()?;
        let var_q = (2.0 * &q.log_std)?.exp()?;
        let log_ratio = (&q.log_std - &p.log_std)?;
        let md = p.mean.broadcast_sub(&q.mean)?;
        let quad = var_p
            .broadcast_add(&md.powf(2.0)?)?
            .broadcast_div(&(2.0 * var_q)?)?;
        Ok((quad.broadcast_add(&log_ratio)? - 0.5)?.sum(D::Minus1)?)
    }
}

/// Gaussian policy with an elementwise linear mean and a learnable,
/// state-independent log-std.
pub struct LinearGaussianPolicy {
    varmap: VarMap,
    w: Tensor,
    log_std: Tensor,
    pd: DiagGaussian,
    recurrent: bool,
}

impl LinearGaussianPolicy {
    pub fn new(dim: usize, w: f64, log_std: f64, device: &Device) -> Result<Self> {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, device);
        let w = vb.get_with_hints(dim, "w", Init::Const(w))?;
        let log_std = vb.get_with_hints(dim, "log_std", Init::Const(log_std))?;
        Ok(Self {
            varmap,
            w,
            log_std,
            pd: DiagGaussian,
            recurrent: false,
        })
    }

    pub fn recurrent(mut self, v: bool) -> Self {
        self.recurrent = v;
        self
    }

    pub fn varmap(&self) -> &VarMap {
        &self.varmap
    }
}

impl StochasticPolicy for LinearGaussianPolicy {
    type Pd = DiagGaussian;

    fn pd(&self) -> &DiagGaussian {
        &self.pd
    }

    fn reset(&self) {}

    fn is_recurrent(&self) -> bool {
        self.recurrent
    }

    fn forward(&self, obs: &Tensor, _h_masks: Option<&Tensor>) -> CoreResult<DiagGaussianParams> {
        Ok(DiagGaussianParams {
            mean: obs.broadcast_mul(&self.w)?,
            log_std: self.log_std.clone(),
        })
    }

    fn action_dim(&self) -> usize {
        self.log_std.dims()[0]
    }
}

/// `V(s) = sum(w * s)`.
pub struct LinearV {
    varmap: VarMap,
    w: Tensor,
}

impl LinearV {
    pub fn new(dim: usize, w: f64, device: &Device) -> Result<Self> {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, device);
        let w = vb.get_with_hints(dim, "w", Init::Const(w))?;
        Ok(Self { varmap, w })
    }

    pub fn varmap(&self) -> &VarMap {
        &self.varmap
    }
}

impl StateValue for LinearV {
    fn reset(&self) {}

    fn is_recurrent(&self) -> bool {
        false
    }

    fn forward(&self, obs: &Tensor, _h_masks: Option<&Tensor>) -> CoreResult<Tensor> {
        Ok(obs.broadcast_mul(&self.w)?.sum(D::Minus1)?)
    }
}

/// `Q(s, a) = sum(wo * s) + sum(wa * a)`.
///
/// Doubles as the discriminator fixture (same signature, logits out).
/// The greedy capability assumes scalar actions in `{-1, +1}`.
pub struct LinearQ {
    varmap: VarMap,
    wo: Tensor,
    wa: Tensor,
}

impl LinearQ {
    pub fn new(obs_dim: usize, ac_dim: usize, wo: f64, wa: f64, device: &Device) -> Result<Self> {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, device);
        let wo = vb.get_with_hints(obs_dim, "wo", Init::Const(wo))?;
        let wa = vb.get_with_hints(ac_dim, "wa", Init::Const(wa))?;
        Ok(Self { varmap, wo, wa })
    }

    pub fn varmap(&self) -> &VarMap {
        &self.varmap
    }
}

impl ActionValue for LinearQ {
    fn forward(&self, obs: &Tensor, acs: &Tensor) -> CoreResult<Tensor> {
        let qo = obs.broadcast_mul(&self.wo)?.sum(D::Minus1)?;
        let qa = acs.broadcast_mul(&self.wa)?.sum(D::Minus1)?;
        Ok((qo + qa)?)
    }
}

impl GreedyActionValue for LinearQ {
    fn max(&self, obs: &Tensor) -> CoreResult<(Tensor, Tensor)> {
        let n = obs.dims()[0];
        let pos = Tensor::full(1f32, (n, 1), obs.device())?;
        let neg = Tensor::full(-1f32, (n, 1), obs.device())?;
        let q_pos = ActionValue::forward(self, obs, &pos)?;
        let q_neg = ActionValue::forward(self, obs, &neg)?;
        let max_q = q_pos.maximum(&q_neg)?;
        let acs = q_pos.ge(&q_neg)?.unsqueeze(1)?.where_cond(&pos, &neg)?;
        Ok((max_q, acs))
    }
}

impl Discriminator for LinearQ {
    fn forward(&self, obs: &Tensor, acs: &Tensor) -> CoreResult<Tensor> {
        ActionValue::forward(self, obs, acs)
    }
}

/// `f(s, a) = w * s + a`, predicting in observation space.
pub struct LinearDynamics {
    varmap: VarMap,
    w: Tensor,
}

impl LinearDynamics {
    pub fn new(dim: usize, w: f64, device: &Device) -> Result<Self> {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, device);
        let w = vb.get_with_hints(dim, "w", Init::Const(w))?;
        Ok(Self { varmap, w })
    }

    pub fn varmap(&self) -> &VarMap {
        &self.varmap
    }
}

impl DynamicsModel for LinearDynamics {
    fn reset(&self) {}

    fn is_recurrent(&self) -> bool {
        false
    }

    fn forward(&self, obs: &Tensor, acs: &Tensor, _h_masks: Option<&Tensor>) -> CoreResult<Tensor> {
        Ok(obs.broadcast_mul(&self.w)?.broadcast_add(acs)?)
    }
}
