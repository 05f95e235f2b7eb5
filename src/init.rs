use burn::config::Config;
use burn::nn::Initializer;

/// Scale factor for the small-scale projection-head initializer.
pub const HEAD_INIT_SCALE: f64 = 1e-2;

/// Weight initialization scheme for a policy's projection head.
///
/// A closed enumeration rather than a tag string, so an unrecognized
/// method is unrepresentable.
#[derive(Config, Debug, PartialEq)]
pub enum InitMethod {
    Default,
    Xavier,
}

/// Variance-scaling initializer over the average fan, drawn uniformly.
///
/// Equivalent to xavier-uniform with the variance multiplied by `scale`.
pub fn default_init(scale: f64) -> Initializer {
    Initializer::XavierUniform { gain: scale.sqrt() }
}

/// Variance-preserving fan-in/fan-out initializer, drawn from a normal.
pub fn xavier_init() -> Initializer {
    Initializer::XavierNormal { gain: 1.0 }
}
