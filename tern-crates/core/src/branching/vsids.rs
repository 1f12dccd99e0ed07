use log::debug;
use log::trace;

use super::BranchingHeuristic;
use super::SelectionContext;
use crate::basic_types::Atom;
use crate::basic_types::Literal;
use crate::basic_types::NoGood;
use crate::containers::KeyValueHeap;
use crate::containers::KeyedVec;
use crate::create_statistics_struct;
use crate::engine::conflict_analysis::ConflictAnalysisResult;
use crate::statistics::Statistic;
use crate::statistics::StatisticLogger;

const DEFAULT_DECAY_FACTOR: f64 = 0.92;
const DEFAULT_DECAY_PERIOD: u32 = 1;
const DEFAULT_MAX_THRESHOLD: f64 = 1e100;

/// How the activities of a [`Vsids`] heuristic age.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VsidsOptions {
    /// The increment is divided by this factor every `decay_period` conflicts, so older bumps
    /// weigh less than newer ones.
    pub decay_factor: f64,
    pub decay_period: u32,
    /// Once an activity exceeds this value, all activities are scaled down.
    pub max_threshold: f64,
}

impl Default for VsidsOptions {
    fn default() -> Self {
        VsidsOptions {
            decay_factor: DEFAULT_DECAY_FACTOR,
            decay_period: DEFAULT_DECAY_PERIOD,
            max_threshold: DEFAULT_MAX_THRESHOLD,
        }
    }
}

create_statistics_struct!(VsidsStatistics {
    num_choices_true: u64,
    num_choices_false: u64,
    num_normalizations: u64,
});

/// [Variable State Independent Decaying Sum](https://dl.acm.org/doi/pdf/10.1145/378239.379017)
/// over choice atoms.
///
/// Every atom has an activity; atoms met while resolving a conflict and atoms of learned nogoods
/// are bumped. The most active atom that is an active choice point is chosen. Its value follows
/// the sign balance of the atom: how often it occurred positively rather than negatively in
/// learned nogoods.
///
/// Only active choice atoms are present in the heap. An atom found inactive while choosing is
/// parked until it is reported active again.
#[derive(Debug)]
pub struct Vsids {
    heap: KeyValueHeap<Atom, f64>,
    sign_balances: KeyedVec<Atom, i64>,
    increment: f64,
    options: VsidsOptions,
    num_conflicts_since_decay: u32,
    statistics: VsidsStatistics,
}

impl Vsids {
    pub fn new(options: VsidsOptions) -> Vsids {
        Vsids {
            heap: KeyValueHeap::default(),
            sign_balances: KeyedVec::default(),
            increment: 1.0,
            options,
            num_conflicts_since_decay: 0,
            statistics: VsidsStatistics::default(),
        }
    }

    pub fn activity(&self, atom: Atom) -> f64 {
        if self.heap.contains_key(atom) {
            self.heap.get_value(atom)
        } else {
            0.0
        }
    }

    pub fn sign_balance(&self, atom: Atom) -> i64 {
        self.sign_balances.get(atom).copied().unwrap_or(0)
    }

    fn bump_activity(&mut self, atom: Atom, increment: f64) {
        self.grow_for_max_atom_id(atom);
        if self.heap.get_value(atom) + increment >= self.options.max_threshold {
            // Scale all activities down; the ordering stays the same.
            debug!("Normalizing VSIDS activities");
            self.statistics.num_normalizations += 1;
            self.heap.divide_values(self.options.max_threshold);
            self.increment /= self.options.max_threshold;
            self.heap.increment(atom, increment / self.options.max_threshold);
        } else {
            self.heap.increment(atom, increment);
        }
        trace!(
            "Activity of atom {atom} increased to {}",
            self.heap.get_value(atom)
        );
    }

    /// The most active atom that is an active choice point; inactive atoms met on the way are
    /// parked.
    pub(super) fn most_active_choice_atom(&mut self, context: &SelectionContext) -> Option<Atom> {
        loop {
            let (atom, _) = self.heap.peek_max()?;
            if context.is_active_choice_atom(atom) {
                return Some(atom);
            }
            self.heap.delete_key(atom);
        }
    }

    fn decay_if_time_has_come(&mut self) {
        self.num_conflicts_since_decay += 1;
        if self.num_conflicts_since_decay >= self.options.decay_period {
            self.increment /= self.options.decay_factor;
            self.num_conflicts_since_decay = 0;
        }
    }
}

impl Default for Vsids {
    fn default() -> Self {
        Vsids::new(VsidsOptions::default())
    }
}

impl BranchingHeuristic for Vsids {
    fn choose_literal(&mut self, context: &SelectionContext) -> Option<Literal> {
        let atom = self.most_active_choice_atom(context)?;
        let literal = context.literal(atom, self.sign_balance(atom) >= 0);
        if literal.is_positive() {
            self.statistics.num_choices_true += 1;
        } else {
            self.statistics.num_choices_false += 1;
        }
        Some(literal)
    }

    fn analyzed_conflict(&mut self, analysis: &ConflictAnalysisResult) {
        for &atom in analysis.resolution_atoms.iter() {
            self.bump_activity(atom, self.increment);
        }
        if let Some(learned_nogood) = &analysis.learned_nogood {
            for &literal in learned_nogood.literals() {
                self.grow_for_max_atom_id(literal.atom());
                self.sign_balances[literal.atom()] += if literal.is_positive() { 1 } else { -1 };
                self.bump_activity(literal.atom(), self.increment);
            }
        }
        self.decay_if_time_has_come();
    }

    fn new_nogoods(&mut self, nogoods: &[NoGood]) {
        for nogood in nogoods {
            for atom in nogood.atoms() {
                self.bump_activity(atom, self.increment);
            }
        }
    }

    fn on_choice_point_activated(&mut self, atom: Atom) {
        self.grow_for_max_atom_id(atom);
        self.heap.restore_key(atom);
    }

    fn grow_for_max_atom_id(&mut self, max_atom: Atom) {
        // New atoms are parked until they become active choice points.
        self.heap.grow_to(max_atom);
        self.sign_balances.accomodate(max_atom, 0);
    }

    fn reset(&mut self) {
        *self = Vsids {
            statistics: self.statistics,
            ..Vsids::new(self.options)
        };
    }

    fn log_statistics(&self, statistic_logger: StatisticLogger) {
        self.statistics.log(statistic_logger);
    }
}
