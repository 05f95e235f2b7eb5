//! Gaussian policy heads for continuous control, built on burn.
//!
//! `NormalPolicy` maps observations through an MLP to a fixed-std diagonal
//! Gaussian; `UnitStdNormalPolicy` re-injects the observations into every
//! hidden layer and produces a unit-std Gaussian with an optionally
//! tanh-bounded mean.

pub mod distributions;
pub mod init;
pub mod mlp;
pub mod policy;
