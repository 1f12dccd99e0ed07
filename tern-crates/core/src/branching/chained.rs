use std::fmt::Display;

use itertools::Itertools;
use log::trace;
use rand::rngs::SmallRng;

use super::BranchingHeuristic;
use super::HeuristicKind;
use super::NaiveHeuristic;
use super::SelectionContext;
use super::VsidsOptions;
use crate::basic_types::Atom;
use crate::basic_types::Literal;
use crate::basic_types::NoGood;
use crate::engine::conflict_analysis::ConflictAnalysisResult;
use crate::statistics::StatisticLogger;
use crate::tern_assert_simple;

#[derive(Debug)]
struct ChainMember {
    kind: HeuristicKind,
    heuristic: Box<dyn BranchingHeuristic>,
    num_decisions: u64,
}

/// Asks its heuristics in order and takes the first literal proposed.
///
/// Every event is passed on to all members. The chain always ends with a [`NaiveHeuristic`]
/// unless it contains one already, so it only runs out of choices once no choice point is active.
#[derive(Debug)]
pub struct ChainedBranchingHeuristics {
    chain: Vec<ChainMember>,
}

impl ChainedBranchingHeuristics {
    /// Creates the heuristics of `kinds`, in order.
    ///
    /// # Panics
    /// If a kind occurs more than once.
    pub fn new(
        kinds: &[HeuristicKind],
        vsids_options: VsidsOptions,
        random_generator: &SmallRng,
    ) -> ChainedBranchingHeuristics {
        let mut chained = ChainedBranchingHeuristics { chain: Vec::new() };
        for &kind in kinds {
            chained.add(kind, kind.create(vsids_options, random_generator));
        }
        if !kinds.contains(&HeuristicKind::Naive) {
            chained.add(HeuristicKind::Naive, Box::new(NaiveHeuristic));
        }
        chained
    }

    pub fn add(&mut self, kind: HeuristicKind, heuristic: Box<dyn BranchingHeuristic>) {
        tern_assert_simple!(
            self.chain.iter().all(|member| member.kind != kind),
            "the heuristic {kind} is in the chain already"
        );
        self.chain.push(ChainMember {
            kind,
            heuristic,
            num_decisions: 0,
        });
    }

    /// The number of choices made by each member so far.
    pub fn num_decisions(&self) -> impl Iterator<Item = (HeuristicKind, u64)> + '_ {
        self.chain
            .iter()
            .map(|member| (member.kind, member.num_decisions))
    }
}

impl Display for ChainedBranchingHeuristics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            self.chain.iter().map(|member| member.kind).join(" -> ")
        )
    }
}

impl BranchingHeuristic for ChainedBranchingHeuristics {
    fn choose_literal(&mut self, context: &SelectionContext) -> Option<Literal> {
        for member in self.chain.iter_mut() {
            let Some(literal) = member.heuristic.choose_literal(context) else {
                continue;
            };
            tern_assert_simple!(
                context.is_active_choice_atom(literal.atom()),
                "{} chose {literal}, which is no active choice atom",
                member.kind
            );
            tern_assert_simple!(
                literal.is_positive() || !context.is_mbt(literal.atom()),
                "{} chose {literal} for a must-be-true atom",
                member.kind
            );
            trace!("{} chose {literal}", member.kind);
            member.num_decisions += 1;
            return Some(literal);
        }
        None
    }

    fn violated_nogood(&mut self, violated: &[Literal]) {
        for member in self.chain.iter_mut() {
            member.heuristic.violated_nogood(violated);
        }
    }

    fn analyzed_conflict(&mut self, analysis: &ConflictAnalysisResult) {
        for member in self.chain.iter_mut() {
            member.heuristic.analyzed_conflict(analysis);
        }
    }

    fn new_nogoods(&mut self, nogoods: &[NoGood]) {
        for member in self.chain.iter_mut() {
            member.heuristic.new_nogoods(nogoods);
        }
    }

    fn on_choice_point_activated(&mut self, atom: Atom) {
        for member in self.chain.iter_mut() {
            member.heuristic.on_choice_point_activated(atom);
        }
    }

    fn grow_for_max_atom_id(&mut self, max_atom: Atom) {
        for member in self.chain.iter_mut() {
            member.heuristic.grow_for_max_atom_id(max_atom);
        }
    }

    fn reset(&mut self) {
        for member in self.chain.iter_mut() {
            member.heuristic.reset();
        }
    }

    fn log_statistics(&self, statistic_logger: StatisticLogger) {
        for member in self.chain.iter() {
            let member_logger = statistic_logger.attach_to_prefix(member.kind);
            member_logger
                .attach_to_prefix("num_decisions")
                .log_statistic(member.num_decisions);
            member.heuristic.log_statistics(member_logger);
        }
    }
}
