use thiserror::Error;

use super::Literal;

/// Errors when building a [`NoGood`](super::NoGood) with a distinguished head.
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum NoGoodError {
    /// The head of a nogood stands for a derived atom and therefore has to be negative.
    #[error("the head {0} of a nogood must be a negative literal")]
    PositiveHead(Literal),
    #[error("a nogood without literals has no head")]
    MissingHead,
}

/// Errors when rebooting the search.
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum RebootError {
    #[error("the grounder does not support rebooting")]
    Unsupported,
}
