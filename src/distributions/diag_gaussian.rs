use std::f32::consts::PI;

use burn::tensor::{backend::Backend, Distribution, Tensor};

/// Multivariate normal over actions with a diagonal covariance, described by
/// a mean and a per-dimension standard deviation of shape
/// `[batch, action_dim]`.
///
/// `log_prob` and `entropy` are joint quantities, summed over the action
/// dimensions.
#[derive(Debug, Clone)]
pub struct DiagGaussian<B: Backend> {
    loc: Tensor<B, 2>,
    scale: Tensor<B, 2>,
}

impl<B: Backend> DiagGaussian<B> {
    pub fn new(loc: Tensor<B, 2>, scale: Tensor<B, 2>) -> Self {
        assert_eq!(
            loc.dims(),
            scale.dims(),
            "loc and scale must share a shape"
        );
        assert!(
            scale.clone().greater_elem(0.0).all().into_scalar(),
            "scale>0 check failed. scale: {scale}"
        );

        Self { loc, scale }
    }

    pub fn mean(&self) -> Tensor<B, 2> {
        self.loc.clone()
    }

    pub fn mode(&self) -> Tensor<B, 2> {
        self.loc.clone()
    }

    pub fn stddev(&self) -> Tensor<B, 2> {
        self.scale.clone()
    }

    pub fn variance(&self) -> Tensor<B, 2> {
        self.scale.clone().powi_scalar(2)
    }

    pub fn sample(&self) -> Tensor<B, 2> {
        self.rsample()
    }

    /// Reparameterized sample: `loc + scale * eps`, `eps ~ N(0, 1)`.
    pub fn rsample(&self) -> Tensor<B, 2> {
        let eps = Tensor::random_like(&self.loc, Distribution::Normal(0.0, 1.0));

        self.loc.clone() + self.scale.clone() * eps
    }

    /// Joint log-density of `value`, summed over the action dimensions.
    pub fn log_prob(&self, value: Tensor<B, 2>) -> Tensor<B, 1> {
        let normalised = (value - self.loc.clone()).div(self.scale.clone());
        let per_dim = normalised
            .powi_scalar(2)
            .mul_scalar(-0.5)
            .sub(self.scale.clone().log())
            .sub_scalar(0.5 * (2.0 * PI).ln());

        per_dim.sum_dim(1).squeeze(1)
    }

    /// Analytic entropy, summed over the action dimensions.
    pub fn entropy(&self) -> Tensor<B, 1> {
        let per_dim = self
            .scale
            .clone()
            .log()
            .add_scalar(0.5 + 0.5 * (2.0 * PI).ln());

        per_dim.sum_dim(1).squeeze(1)
    }
}
