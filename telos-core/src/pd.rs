//! Action-distribution capability.
use crate::error::Result;
use candle_core::Tensor;

/// Structured values that can be cut off from gradient flow.
///
/// Distribution parameters are opaque to the loss layer, so detaching
/// them (e.g. a frozen distillation teacher) goes through this
/// capability instead of reaching into their tensors.
pub trait StopGrad {
    /// Returns a copy whose tensors are detached from the graph.
    fn stop_grad(&self) -> Self;
}

/// Probability distribution over actions.
///
/// Parameterized by the output of a policy network and consumed only
/// through this surface. All operations are batch-wise and broadcast
/// over an optional leading sampling dimension.
pub trait Distribution {
    /// Parameters of the distribution (e.g. mean and std of a Gaussian).
    type Params: StopGrad;

    /// Draws `sampling` actions per batch element.
    ///
    /// The output has a leading dimension of size `sampling` prepended to
    /// the action shape, also when `sampling == 1`.
    fn sample(&self, params: &Self::Params, sampling: usize) -> Result<Tensor>;

    /// Log likelihood of actions under the parameters.
    fn llh(&self, acs: &Tensor, params: &Self::Params) -> Result<Tensor>;

    /// Entropy per batch element.
    fn ent(&self, params: &Self::Params) -> Result<Tensor>;

    /// KL divergence `KL(p ‖ q)` per batch element.
    fn kl_pq(&self, p: &Self::Params, q: &Self::Params) -> Result<Tensor>;
}
