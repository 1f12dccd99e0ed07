//! Contains the heuristics deciding which choice atom to guess next, and with which value.
//!
//! Heuristics are combined into a [`ChainedBranchingHeuristics`]: each member is asked in turn
//! and the first one proposing a literal wins. A [`NaiveHeuristic`] always ends the chain, so the
//! chain only runs out of choices once no choice point is active.
//!
//! Whatever the heuristic, a must-be-true atom is only ever chosen `True`.
mod berkmin;
mod chained;
mod naive;
mod phase_saving;
mod random;
mod selection_context;
mod vsids;

use std::fmt::Debug;
use std::fmt::Display;

pub use berkmin::BerkMin;
pub use chained::ChainedBranchingHeuristics;
pub use naive::NaiveHeuristic;
pub use phase_saving::VsidsWithPhaseSaving;
use rand::rngs::SmallRng;
pub use random::RandomHeuristic;
pub use selection_context::SelectionContext;
pub use vsids::Vsids;
pub use vsids::VsidsOptions;

use crate::basic_types::Atom;
use crate::basic_types::Literal;
use crate::basic_types::NoGood;
use crate::engine::conflict_analysis::ConflictAnalysisResult;
use crate::statistics::StatisticLogger;

/// Proposes the next choice, and learns from what happens during search.
pub trait BranchingHeuristic: Debug {
    /// A literal over an active choice atom, or `None` if this heuristic has no preference.
    fn choose_literal(&mut self, context: &SelectionContext) -> Option<Literal>;

    /// Called with the literals of every nogood violated during propagation.
    fn violated_nogood(&mut self, _violated: &[Literal]) {}

    /// Called once a conflict has been analysed.
    fn analyzed_conflict(&mut self, _analysis: &ConflictAnalysisResult) {}

    /// Called with the nogoods of the grounder before they are added to the store.
    fn new_nogoods(&mut self, _nogoods: &[NoGood]) {}

    /// Called for every choice atom that became active.
    fn on_choice_point_activated(&mut self, _atom: Atom) {}

    fn grow_for_max_atom_id(&mut self, _max_atom: Atom) {}

    /// Forgets everything learned so far; used when the search is rebooted.
    fn reset(&mut self) {}

    fn log_statistics(&self, _statistic_logger: StatisticLogger) {}
}

/// The heuristics a [`ChainedBranchingHeuristics`] can be made of.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum HeuristicKind {
    /// The first active choice atom, `False` unless it is must-be-true.
    Naive,
    /// The active choice atom that took part in the most recent conflicts.
    Vsids,
    /// A uniformly random active choice atom with a random value.
    Random,
    /// Like [`HeuristicKind::Vsids`], but with the value the atom had before it was backtracked.
    VsidsWithPhaseSaving,
    /// The most active open atom of the most recent undecided nogood.
    BerkMin,
}

impl Display for HeuristicKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HeuristicKind::Naive => write!(f, "naive"),
            HeuristicKind::Vsids => write!(f, "vsids"),
            HeuristicKind::Random => write!(f, "random"),
            HeuristicKind::VsidsWithPhaseSaving => write!(f, "vsids-with-phase-saving"),
            HeuristicKind::BerkMin => write!(f, "berkmin"),
        }
    }
}

impl HeuristicKind {
    pub fn create(
        self,
        vsids_options: VsidsOptions,
        random_generator: &SmallRng,
    ) -> Box<dyn BranchingHeuristic> {
        match self {
            HeuristicKind::Naive => Box::new(NaiveHeuristic),
            HeuristicKind::Vsids => Box::new(Vsids::new(vsids_options)),
            HeuristicKind::Random => Box::new(RandomHeuristic::new(random_generator.clone())),
            HeuristicKind::VsidsWithPhaseSaving => {
                Box::new(VsidsWithPhaseSaving::new(vsids_options))
            }
            HeuristicKind::BerkMin => Box::new(BerkMin::new(random_generator.clone())),
        }
    }
}
