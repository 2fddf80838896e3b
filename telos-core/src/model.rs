//! Capability interfaces of the function approximators consumed by the
//! loss layer.
//!
//! The approximators are owned and optimized by the training loop; the
//! loss functions only evaluate them. Recurrent implementations manage
//! their hidden state internally, so `reset` takes a shared reference.
use crate::{error::Result, pd::Distribution};
use candle_core::Tensor;

/// Stochastic policy mapping observations to distribution parameters.
pub trait StochasticPolicy {
    /// Distribution over actions parameterized by this policy's output.
    type Pd: Distribution;

    /// The action distribution.
    fn pd(&self) -> &Self::Pd;

    /// Clears recurrent state before evaluating a fresh rollout.
    fn reset(&self);

    /// Whether hidden-state masks must be supplied to [`forward`].
    ///
    /// [`forward`]: Self::forward
    fn is_recurrent(&self) -> bool;

    /// Evaluates the policy on a batch of observations.
    fn forward(
        &self,
        obs: &Tensor,
        h_masks: Option<&Tensor>,
    ) -> Result<<Self::Pd as Distribution>::Params>;

    /// Number of action dimensions (product of the action-space shape).
    fn action_dim(&self) -> usize;
}

/// State-value function `V(s)`.
pub trait StateValue {
    /// Clears recurrent state before evaluating a fresh rollout.
    fn reset(&self);

    /// Whether hidden-state masks must be supplied to [`forward`].
    ///
    /// [`forward`]: Self::forward
    fn is_recurrent(&self) -> bool;

    /// Returns values with the batch dimensions of `obs`.
    fn forward(&self, obs: &Tensor, h_masks: Option<&Tensor>) -> Result<Tensor>;
}

/// Action-value function `Q(s, a)`.
///
/// The output carries the batch (and optional leading sampling)
/// dimensions of its inputs, with the trailing value dimension squeezed.
pub trait ActionValue {
    /// Returns action values for the given observation/action pairs.
    fn forward(&self, obs: &Tensor, acs: &Tensor) -> Result<Tensor>;
}

/// Action-value function that can report its greedy action.
pub trait GreedyActionValue: ActionValue {
    /// Returns `(max_a Q(s, a), argmax_a Q(s, a))`.
    fn max(&self, obs: &Tensor) -> Result<(Tensor, Tensor)>;
}

/// Dynamics model predicting next observations or rewards.
///
/// The prediction keeps a trailing feature dimension.
pub trait DynamicsModel {
    /// Clears recurrent state before evaluating a fresh rollout.
    fn reset(&self);

    /// Whether hidden-state masks must be supplied to [`forward`].
    ///
    /// [`forward`]: Self::forward
    fn is_recurrent(&self) -> bool;

    /// Predicts the regression target for the given transitions.
    fn forward(&self, obs: &Tensor, acs: &Tensor, h_masks: Option<&Tensor>) -> Result<Tensor>;
}

/// Discriminator producing classification logits for
/// observation/action pairs.
pub trait Discriminator {
    /// Returns one logit per batch element.
    fn forward(&self, obs: &Tensor, acs: &Tensor) -> Result<Tensor>;
}
