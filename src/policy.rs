use burn::{
    config::Config,
    module::Module,
    nn::{Linear, LinearConfig},
    tensor::{backend::Backend, Tensor},
};

use crate::{
    distributions::DiagGaussian,
    init::{default_init, xavier_init, InitMethod, HEAD_INIT_SCALE},
    mlp::{Activation, Mlp, MlpConfig, MlpRepeatPerLayer, MlpRepeatPerLayerConfig},
};

#[derive(Config, Debug)]
pub struct NormalPolicyConfig {
    pub obs_dim: usize,
    pub hidden_dims: Vec<usize>,
    pub action_dim: usize,
    pub dropout_rate: Option<f64>,
    #[config(default = 1.0)]
    pub std: f64,
    #[config(default = 1.0)]
    pub init_scale: f64,
    #[config(default = 1.0)]
    pub output_scale: f64,
    #[config(default = "InitMethod::Default")]
    pub init_method: InitMethod,
}

/// Maps a batch of observations to a diagonal Gaussian over actions whose
/// standard deviation is a fixed constant.
///
/// The trunk activates after every layer including the last; the mean is the
/// projection-head output scaled by `output_scale`.
#[derive(Module, Debug)]
pub struct NormalPolicy<B: Backend> {
    trunk: Mlp<B>,
    head: Linear<B>,
    std: f64,
    output_scale: f64,
}

impl NormalPolicyConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> NormalPolicy<B> {
        let trunk = MlpConfig::new(self.obs_dim, self.hidden_dims.clone())
            .with_activate_final(true)
            .with_dropout_rate(self.dropout_rate)
            .with_init_scale(self.init_scale)
            .init(device);

        let latent_dim = self
            .hidden_dims
            .last()
            .copied()
            .expect("hidden_dims must not be empty");

        let head_init = match self.init_method {
            InitMethod::Xavier => {
                log::debug!(
                    "policy projection head {latent_dim}x{}, xavier init",
                    self.action_dim
                );
                xavier_init()
            }
            InitMethod::Default => default_init(HEAD_INIT_SCALE),
        };

        NormalPolicy {
            trunk,
            head: LinearConfig::new(latent_dim, self.action_dim)
                .with_initializer(head_init)
                .init(device),
            std: self.std,
            output_scale: self.output_scale,
        }
    }
}

impl<B: Backend> NormalPolicy<B> {
    pub fn forward(&self, observations: Tensor<B, 2>, training: bool) -> DiagGaussian<B> {
        let latent = self.trunk.forward(observations, training);
        let mean = self.head.forward(latent).mul_scalar(self.output_scale);
        let scale = mean.ones_like().mul_scalar(self.std);

        DiagGaussian::new(mean, scale)
    }

    /// Inference-mode action selection: the distribution mode when
    /// deterministic, otherwise a sample.
    pub fn act(&self, observations: Tensor<B, 2>, deterministic: bool) -> Tensor<B, 2> {
        let dist = self.forward(observations, false);

        if deterministic {
            dist.mode()
        } else {
            dist.sample()
        }
    }
}

#[derive(Config, Debug)]
pub struct UnitStdNormalPolicyConfig {
    pub obs_dim: usize,
    pub hidden_dims: Vec<usize>,
    pub action_dim: usize,
    pub dropout_rate: Option<f64>,
    #[config(default = true)]
    pub apply_tanh: bool,
    #[config(default = "Activation::Relu")]
    pub activation: Activation,
}

/// Maps a batch of observations to a unit-variance diagonal Gaussian whose
/// mean is optionally tanh-squashed into (-1, 1).
///
/// The trunk re-injects the observations into every hidden layer. Callers
/// relying on bounded actions must leave `apply_tanh` set; without it the
/// mean is unbounded.
#[derive(Module, Debug)]
pub struct UnitStdNormalPolicy<B: Backend> {
    trunk: MlpRepeatPerLayer<B>,
    head: Linear<B>,
    apply_tanh: bool,
}

impl UnitStdNormalPolicyConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> UnitStdNormalPolicy<B> {
        let trunk =
            MlpRepeatPerLayerConfig::new(self.obs_dim, self.obs_dim, self.hidden_dims.clone())
                .with_activation(self.activation.clone())
                .with_activate_final(true)
                .with_dropout_rate(self.dropout_rate)
                .init(device);

        let latent_dim = self
            .hidden_dims
            .last()
            .copied()
            .expect("hidden_dims must not be empty");

        UnitStdNormalPolicy {
            trunk,
            head: LinearConfig::new(latent_dim, self.action_dim)
                .with_initializer(default_init(HEAD_INIT_SCALE))
                .init(device),
            apply_tanh: self.apply_tanh,
        }
    }
}

impl<B: Backend> UnitStdNormalPolicy<B> {
    pub fn forward(&self, observations: Tensor<B, 2>, training: bool) -> DiagGaussian<B> {
        let latent = self
            .trunk
            .forward(observations.clone(), observations, training);
        let mut mean = self.head.forward(latent);

        if self.apply_tanh {
            mean = mean.tanh();
        }

        let scale = mean.ones_like();

        DiagGaussian::new(mean, scale)
    }

    pub fn act(&self, observations: Tensor<B, 2>, deterministic: bool) -> Tensor<B, 2> {
        let dist = self.forward(observations, false);

        if deterministic {
            dist.mode()
        } else {
            dist.sample()
        }
    }
}

#[cfg(test)]
mod test {
    use burn::{
        backend::{Autodiff, NdArray},
        tensor::{Distribution, Shape, Tensor},
    };

    use crate::init::InitMethod;

    use super::{NormalPolicyConfig, UnitStdNormalPolicyConfig};

    fn random_obs(batch: usize, dim: usize, std: f64) -> Tensor<NdArray, 2> {
        Tensor::random(
            Shape::new([batch, dim]),
            Distribution::Normal(0.0, std),
            &Default::default(),
        )
    }

    #[test]
    fn test_normal_policy_shapes_and_scale() {
        type Backend = NdArray;

        // hidden [32, 32], 4 actions, std 0.5, obs [8, 10]
        let policy = NormalPolicyConfig::new(10, vec![32, 32], 4)
            .with_std(0.5)
            .init::<Backend>(&Default::default());

        let dist = policy.forward(random_obs(8, 10, 1.0), false);

        assert_eq!(dist.mean().dims(), [8, 4]);
        assert_eq!(dist.stddev().dims(), [8, 4]);
        assert!(dist.stddev().equal_elem(0.5).all().into_scalar());
    }

    #[test]
    fn test_normal_policy_scale_independent_of_input() {
        type Backend = NdArray;

        let policy = NormalPolicyConfig::new(6, vec![16], 3)
            .with_std(0.7)
            .init::<Backend>(&Default::default());

        for _ in 0..3 {
            let dist = policy.forward(random_obs(5, 6, 10.0), false);
            assert!(dist.stddev().equal_elem(0.7).all().into_scalar());
        }
    }

    #[test]
    fn test_normal_policy_mean_linear_in_output_scale() {
        type Backend = NdArray;

        let policy =
            NormalPolicyConfig::new(6, vec![16, 16], 2).init::<Backend>(&Default::default());

        let mut doubled = policy.clone();
        doubled.output_scale = 2.0;

        let obs = random_obs(4, 6, 1.0);
        let mean = policy.forward(obs.clone(), false).mean();
        let mean_doubled = doubled.forward(obs, false).mean();

        let diff = (mean_doubled - mean.mul_scalar(2.0)).abs();
        assert!(diff.lower_elem(1e-6).all().into_scalar());
    }

    #[test]
    fn test_normal_policy_inference_deterministic() {
        type Backend = NdArray;

        let policy = NormalPolicyConfig::new(5, vec![16, 16], 2)
            .with_dropout_rate(Some(0.5))
            .init::<Backend>(&Default::default());

        let obs = random_obs(4, 5, 1.0);
        let a = policy.forward(obs.clone(), false).mean();
        let b = policy.forward(obs, false).mean();

        assert!(a.equal(b).all().into_scalar());
    }

    #[test]
    fn test_normal_policy_dropout_masks_in_training() {
        // burn's dropout only masks on an autodiff backend
        type Backend = Autodiff<NdArray>;

        let policy = NormalPolicyConfig::new(8, vec![64, 64], 2)
            .with_dropout_rate(Some(0.5))
            .init::<Backend>(&Default::default());

        let obs: Tensor<Backend, 2> = Tensor::random(
            Shape::new([16, 8]),
            Distribution::Normal(0.0, 1.0),
            &Default::default(),
        );

        let a = policy.forward(obs.clone(), true).mean();
        let b = policy.forward(obs, true).mean();

        assert!(!a.equal(b).all().into_scalar());
    }

    #[test]
    fn test_normal_policy_xavier_head() {
        type Backend = NdArray;

        let policy = NormalPolicyConfig::new(5, vec![16], 2)
            .with_init_method(InitMethod::Xavier)
            .init::<Backend>(&Default::default());

        let dist = policy.forward(random_obs(3, 5, 1.0), false);

        assert_eq!(dist.mean().dims(), [3, 2]);
        assert!(dist.stddev().equal_elem(1.0).all().into_scalar());
    }

    #[test]
    fn test_normal_policy_act_deterministic_is_mode() {
        type Backend = NdArray;

        let policy = NormalPolicyConfig::new(5, vec![16], 2).init::<Backend>(&Default::default());

        let obs = random_obs(4, 5, 1.0);
        let action = policy.act(obs.clone(), true);
        let mode = policy.forward(obs, false).mode();

        assert!(action.equal(mode).all().into_scalar());
    }

    #[test]
    fn test_unit_std_policy_bounded_mean_and_unit_scale() {
        type Backend = NdArray;

        let policy =
            UnitStdNormalPolicyConfig::new(6, vec![32, 32], 3).init::<Backend>(&Default::default());

        // larger inputs push the head towards saturation; the mean must stay
        // strictly inside (-1, 1)
        let dist = policy.forward(random_obs(8, 6, 5.0), false);

        assert_eq!(dist.mean().dims(), [8, 3]);
        assert!(dist.mean().abs().lower_elem(1.0).all().into_scalar());
        assert!(dist.stddev().equal_elem(1.0).all().into_scalar());
    }

    #[test]
    fn test_unit_std_policy_without_tanh() {
        type Backend = NdArray;

        let policy = UnitStdNormalPolicyConfig::new(6, vec![16], 3)
            .with_apply_tanh(false)
            .init::<Backend>(&Default::default());

        let dist = policy.forward(random_obs(4, 6, 1.0), false);

        assert_eq!(dist.mean().dims(), [4, 3]);
        assert!(dist.stddev().equal_elem(1.0).all().into_scalar());
    }

    #[test]
    fn test_unit_std_policy_inference_deterministic() {
        type Backend = NdArray;

        let policy = UnitStdNormalPolicyConfig::new(5, vec![16, 16], 2)
            .with_dropout_rate(Some(0.5))
            .init::<Backend>(&Default::default());

        let obs = random_obs(4, 5, 1.0);
        let a = policy.forward(obs.clone(), false).mean();
        let b = policy.forward(obs, false).mean();

        assert!(a.equal(b).all().into_scalar());
    }
}
