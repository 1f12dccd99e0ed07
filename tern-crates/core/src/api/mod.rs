//! The outcomes of a search and the ways to iterate over them.
mod answer_set_iterator;

pub use answer_set_iterator::AnswerSetIterator;
pub use answer_set_iterator::IteratedAnswerSet;
