use burn::{
    config::Config,
    module::{Ignored, Module},
    nn::{Dropout, DropoutConfig, Linear, LinearConfig},
    tensor::{activation, backend::Backend, Tensor},
};

use crate::init::default_init;

/// Nonlinearity applied between (and optionally after) the layers of a stack.
#[derive(Config, Debug, PartialEq)]
pub enum Activation {
    Relu,
    Tanh,
    Gelu,
    Silu,
}

impl Activation {
    pub fn forward<B: Backend, const D: usize>(&self, x: Tensor<B, D>) -> Tensor<B, D> {
        match self {
            Activation::Relu => activation::relu(x),
            Activation::Tanh => x.tanh(),
            Activation::Gelu => activation::gelu(x),
            Activation::Silu => activation::silu(x),
        }
    }
}

#[derive(Config, Debug)]
pub struct MlpConfig {
    pub input_dim: usize,
    pub hidden_dims: Vec<usize>,
    #[config(default = "Activation::Relu")]
    pub activation: Activation,
    #[config(default = false)]
    pub activate_final: bool,
    pub dropout_rate: Option<f64>,
    #[config(default = 1.0)]
    pub init_scale: f64,
}

/// Feed-forward stack of affine layers. The output feature dimension is the
/// last hidden width; dropout masks hidden activations during training only.
#[derive(Module, Debug)]
pub struct Mlp<B: Backend> {
    layers: Vec<Linear<B>>,
    dropout: Option<Dropout>,
    activation: Ignored<Activation>,
    activate_final: bool,
}

impl MlpConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> Mlp<B> {
        assert!(
            !self.hidden_dims.is_empty(),
            "Mlp requires at least one hidden layer"
        );

        let mut layers = Vec::with_capacity(self.hidden_dims.len());
        let mut in_features = self.input_dim;

        for &width in &self.hidden_dims {
            layers.push(
                LinearConfig::new(in_features, width)
                    .with_initializer(default_init(self.init_scale))
                    .init(device),
            );
            in_features = width;
        }

        Mlp {
            layers,
            dropout: self.dropout_rate.map(|p| DropoutConfig::new(p).init()),
            activation: Ignored(self.activation.clone()),
            activate_final: self.activate_final,
        }
    }
}

impl<B: Backend> Mlp<B> {
    pub fn forward(&self, x: Tensor<B, 2>, training: bool) -> Tensor<B, 2> {
        let mut x = x;
        let last = self.layers.len() - 1;

        for (i, layer) in self.layers.iter().enumerate() {
            x = layer.forward(x);

            if i < last || self.activate_final {
                x = self.activation.forward(x);

                if training {
                    if let Some(dropout) = &self.dropout {
                        x = dropout.forward(x);
                    }
                }
            }
        }

        x
    }
}

#[derive(Config, Debug)]
pub struct MlpRepeatPerLayerConfig {
    pub input_dim: usize,
    pub aux_dim: usize,
    pub hidden_dims: Vec<usize>,
    #[config(default = "Activation::Relu")]
    pub activation: Activation,
    #[config(default = false)]
    pub activate_final: bool,
    pub dropout_rate: Option<f64>,
    #[config(default = 1.0)]
    pub init_scale: f64,
}

/// Feed-forward stack that concatenates an auxiliary tensor onto the input
/// of every layer, not only the first. The auxiliary tensor is an explicit
/// argument of the forward pass; its width is fixed at construction.
#[derive(Module, Debug)]
pub struct MlpRepeatPerLayer<B: Backend> {
    layers: Vec<Linear<B>>,
    dropout: Option<Dropout>,
    activation: Ignored<Activation>,
    activate_final: bool,
}

impl MlpRepeatPerLayerConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> MlpRepeatPerLayer<B> {
        assert!(
            !self.hidden_dims.is_empty(),
            "MlpRepeatPerLayer requires at least one hidden layer"
        );

        let mut layers = Vec::with_capacity(self.hidden_dims.len());
        let mut in_features = self.input_dim;

        for &width in &self.hidden_dims {
            layers.push(
                LinearConfig::new(in_features + self.aux_dim, width)
                    .with_initializer(default_init(self.init_scale))
                    .init(device),
            );
            in_features = width;
        }

        MlpRepeatPerLayer {
            layers,
            dropout: self.dropout_rate.map(|p| DropoutConfig::new(p).init()),
            activation: Ignored(self.activation.clone()),
            activate_final: self.activate_final,
        }
    }
}

impl<B: Backend> MlpRepeatPerLayer<B> {
    pub fn forward(&self, x: Tensor<B, 2>, aux: Tensor<B, 2>, training: bool) -> Tensor<B, 2> {
        let mut x = x;
        let last = self.layers.len() - 1;

        for (i, layer) in self.layers.iter().enumerate() {
            x = Tensor::cat(Vec::from([x, aux.clone()]), 1);
            x = layer.forward(x);

            if i < last || self.activate_final {
                x = self.activation.forward(x);

                if training {
                    if let Some(dropout) = &self.dropout {
                        x = dropout.forward(x);
                    }
                }
            }
        }

        x
    }
}
