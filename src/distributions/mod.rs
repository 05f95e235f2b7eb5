// Burn ships no probability-distribution library, so the action
// distribution the policies hand out is implemented here.

mod diag_gaussian;

pub use diag_gaussian::DiagGaussian;
