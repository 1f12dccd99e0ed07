//! Contains the structures corresponding to answer set iterations.
use std::fmt::Debug;

use crate::engine::DefaultSolver;
use crate::engine::TerminationCondition;
use crate::grounder::AnswerSet;
use crate::grounder::Grounder;

/// The outcome of looking for the next answer set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IteratedAnswerSet<A: Ord> {
    /// An answer set different from all that were found before.
    AnswerSet(AnswerSet<A>),
    /// All answer sets have been found.
    Finished,
    /// The program has no answer set at all.
    Unsatisfiable,
    /// The [`TerminationCondition`] stopped the search before the outcome was known.
    Unknown,
}

impl<A: Ord> IteratedAnswerSet<A> {
    pub fn answer_set(self) -> Option<AnswerSet<A>> {
        match self {
            IteratedAnswerSet::AnswerSet(answer_set) => Some(answer_set),
            _ => None,
        }
    }
}

/// Yields the answer sets of a [`DefaultSolver`] one by one.
///
/// The iterator ends once all answer sets are found or the search is stopped;
/// [`AnswerSetIterator::was_interrupted`] tells the two apart.
#[derive(Debug)]
pub struct AnswerSetIterator<'solver, 'termination, G: Grounder, T> {
    solver: &'solver mut DefaultSolver<G>,
    termination: &'termination mut T,
    last_outcome: Option<IteratedAnswerSet<G::Atom>>,
}

impl<'solver, 'termination, G: Grounder, T: TerminationCondition>
    AnswerSetIterator<'solver, 'termination, G, T>
{
    pub(crate) fn new(
        solver: &'solver mut DefaultSolver<G>,
        termination: &'termination mut T,
    ) -> Self {
        AnswerSetIterator {
            solver,
            termination,
            last_outcome: None,
        }
    }

    /// Looks for the next answer set; unlike [`Iterator::next`] this reports why there is none.
    pub fn next_answer_set(&mut self) -> IteratedAnswerSet<G::Atom> {
        let outcome = self.solver.next_answer_set(&mut *self.termination);
        self.last_outcome = match &outcome {
            IteratedAnswerSet::AnswerSet(_) => None,
            other => Some(other.clone()),
        };
        outcome
    }

    /// Whether the termination condition ended the iteration.
    pub fn was_interrupted(&self) -> bool {
        matches!(self.last_outcome, Some(IteratedAnswerSet::Unknown))
    }

    /// Whether the iteration ended without any answer set having been found.
    pub fn is_unsatisfiable(&self) -> bool {
        matches!(self.last_outcome, Some(IteratedAnswerSet::Unsatisfiable))
    }
}

impl<G: Grounder, T: TerminationCondition> Iterator for AnswerSetIterator<'_, '_, G, T> {
    type Item = AnswerSet<G::Atom>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.last_outcome.is_some() {
            return None;
        }
        self.next_answer_set().answer_set()
    }
}
