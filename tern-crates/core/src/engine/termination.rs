//! Conditions polled by the driver loop to give up on the search for the next answer set before
//! it has been found or ruled out.
use std::time::Duration;
use std::time::Instant;

/// Decides when the search for an answer set should be abandoned.
///
/// A search that stops yields [`IteratedAnswerSet::Unknown`](crate::api::IteratedAnswerSet) and
/// can be resumed later.
pub trait TerminationCondition {
    /// Returns `true` when the solver should stop, `false` otherwise.
    fn should_stop(&mut self) -> bool;

    /// Called for every choice the solver makes.
    fn decision_has_been_made(&mut self) {}
}

impl<T: TerminationCondition> TerminationCondition for Option<T> {
    fn should_stop(&mut self) -> bool {
        self.as_mut().is_some_and(TerminationCondition::should_stop)
    }

    fn decision_has_been_made(&mut self) {
        if let Some(condition) = self {
            condition.decision_has_been_made();
        }
    }
}

/// Never stops.
#[derive(Clone, Copy, Debug, Default)]
pub struct Indefinite;

impl TerminationCondition for Indefinite {
    fn should_stop(&mut self) -> bool {
        false
    }
}

/// Stops once a number of choices has been made.
#[derive(Clone, Copy, Debug)]
pub struct DecisionBudget {
    budget: u64,
    num_decisions: u64,
}

impl DecisionBudget {
    pub fn new(budget: u64) -> DecisionBudget {
        DecisionBudget {
            budget,
            num_decisions: 0,
        }
    }
}

impl TerminationCondition for DecisionBudget {
    fn should_stop(&mut self) -> bool {
        self.num_decisions >= self.budget
    }

    fn decision_has_been_made(&mut self) {
        self.num_decisions += 1;
    }
}

/// Stops once the wall-clock budget is used up.
#[derive(Clone, Copy, Debug)]
pub struct TimeBudget {
    started_at: Instant,
    budget: Duration,
}

impl TimeBudget {
    /// A budget measured from now on.
    pub fn starting_now(budget: Duration) -> TimeBudget {
        TimeBudget {
            started_at: Instant::now(),
            budget,
        }
    }
}

impl TerminationCondition for TimeBudget {
    fn should_stop(&mut self) -> bool {
        self.started_at.elapsed() >= self.budget
    }
}

/// Stops as soon as either of two conditions does.
#[derive(Clone, Copy, Debug)]
pub struct Combinator<T1, T2> {
    first: T1,
    second: T2,
}

impl<T1, T2> Combinator<T1, T2> {
    pub fn new(first: T1, second: T2) -> Self {
        Combinator { first, second }
    }
}

impl<T1: TerminationCondition, T2: TerminationCondition> TerminationCondition
    for Combinator<T1, T2>
{
    fn should_stop(&mut self) -> bool {
        self.first.should_stop() || self.second.should_stop()
    }

    fn decision_has_been_made(&mut self) {
        self.first.decision_has_been_made();
        self.second.decision_has_been_made();
    }
}
