mod antecedent;
mod errors;
mod literal;
pub(crate) mod moving_averages;
mod nogood;
pub(crate) mod sequence_generators;
mod thrice_truth;
mod trail;

pub use antecedent::*;
pub use errors::*;
pub use literal::*;
pub use nogood::*;
pub use sequence_generators::SequenceGeneratorType;
pub use thrice_truth::*;
pub(crate) use trail::*;

#[cfg(test)]
pub(crate) use nogood::test_helpers;
