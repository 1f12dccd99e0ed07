//! Nogood storage and propagation.
//!
//! Propagation works on two levels. *Weak* propagation derives must-be-true and false: once all
//! but one literal of a nogood hold, the last one is made not to hold. It uses two ordinary watches
//! per nogood. *Strong* propagation derives `True`: once all body literals of a headed nogood hold
//! as `True` or `False`, the head atom is `True`. It uses one extra watch, the alpha watch, which
//! always sits on a body literal that is not strongly assigned against the nogood (or on the head
//! being `True` already).
//!
//! Unary nogoods are turned into assignments at level 0 right away, binary nogoods are kept in the
//! [`BinaryWatchList`]s of both their literals, and larger nogoods become [`WatchedNoGood`]s.
mod binary_watch_list;
mod learned_nogood_deletion;
mod nogood_counter;
mod watched_nogood;

use binary_watch_list::BinaryWatchList;
use learned_nogood_deletion::LearnedNoGoodDeletion;
use log::debug;
use log::trace;
pub use nogood_counter::NoGoodCounter;
pub(crate) use watched_nogood::WatchedNoGood;
pub use watched_nogood::WatchedNoGoodId;

use crate::basic_types::Antecedent;
use crate::basic_types::Atom;
use crate::basic_types::ConflictCause;
use crate::basic_types::Literal;
use crate::basic_types::NoGood;
use crate::basic_types::NoGoodType;
use crate::basic_types::ThriceTruth;
use crate::containers::KeyedVec;
use crate::containers::StorageKey;
use crate::create_statistics_struct;
use crate::engine::TrailAssignment;
use crate::statistics::Statistic;
use crate::statistics::StatisticLogger;
use crate::tern_assert_moderate;
use crate::tern_assert_simple;

create_statistics_struct!(NoGoodStoreStatistics {
    num_weak_propagations: u64,
    num_strong_propagations: u64,
    num_ignored_nogoods: u64,
});

/// Stores the nogoods of the search and propagates them over a [`TrailAssignment`].
#[derive(Debug, Default)]
pub struct NoGoodStore {
    nogoods: KeyedVec<WatchedNoGoodId, WatchedNoGood>,
    /// For every literal, the nogoods with an ordinary watch on it.
    watches: KeyedVec<Literal, Vec<WatchedNoGoodId>>,
    /// For every literal, the nogoods with their alpha watch on it.
    alpha_watches: KeyedVec<Literal, Vec<WatchedNoGoodId>>,
    binary_watches: KeyedVec<Literal, BinaryWatchList>,
    learned_nogood_deletion: LearnedNoGoodDeletion,
    counter: NoGoodCounter,
    statistics: NoGoodStoreStatistics,
}

/// The value that makes `literal` not hold without being stronger than needed: `False` for a
/// positive literal, must-be-true for a negative one.
fn weak_complement(literal: Literal) -> ThriceTruth {
    if literal.is_positive() {
        ThriceTruth::False
    } else {
        ThriceTruth::MustBeTrue
    }
}

/// Whether the atom of `literal` is assigned the opposite of the literal's polarity.
fn is_satisfied(literal: Literal, assignment: &TrailAssignment) -> bool {
    assignment
        .truth(literal.atom())
        .is_some_and(|truth| truth.to_boolean() != literal.is_positive())
}

/// The highest weak level among the literals other than the one at `skip`, all of which hold.
fn highest_weak_level_except(literals: &[Literal], skip: usize, assignment: &TrailAssignment) -> u32 {
    literals
        .iter()
        .enumerate()
        .filter(|&(index, _)| index != skip)
        .filter_map(|(_, literal)| assignment.weak_decision_level(literal.atom()))
        .max()
        .unwrap_or(0)
}

/// The position of the literal with the highest weak level, other than the one at `skip`.
fn highest_weak_level_position(literals: &[Literal], skip: usize, assignment: &TrailAssignment) -> usize {
    literals
        .iter()
        .enumerate()
        .filter(|&(index, _)| index != skip)
        .max_by_key(|(_, literal)| assignment.weak_decision_level(literal.atom()))
        .map(|(index, _)| index)
        .expect("a watched nogood has at least three literals")
}

impl NoGoodStore {
    /// Makes room for the watch lists of every atom up to and including `max_atom`.
    pub fn grow_for_max_atom_id(&mut self, max_atom: Atom) {
        let highest_literal = Literal::negative(max_atom);
        self.watches.accomodate(highest_literal, Vec::new());
        self.alpha_watches.accomodate(highest_literal, Vec::new());
        self.binary_watches
            .accomodate(highest_literal, BinaryWatchList::default());
    }

    /// Adds `nogood`, propagating it right away if it is unit under `assignment`.
    ///
    /// A nogood that is violated already is not stored; the conflict is reported as
    /// [`ConflictCause::Addition`]. A nogood containing both polarities of an atom can never be
    /// violated and is ignored.
    pub fn add(
        &mut self,
        nogood: &NoGood,
        assignment: &mut TrailAssignment,
    ) -> Result<(), ConflictCause> {
        self.add_with_lbd(nogood, None, assignment)
    }

    /// Adds a nogood with its literal block distance; learnt nogoods with an LBD take part in
    /// learnt nogood deletion.
    pub fn add_with_lbd(
        &mut self,
        nogood: &NoGood,
        lbd: Option<u32>,
        assignment: &mut TrailAssignment,
    ) -> Result<(), ConflictCause> {
        trace!("Adding {nogood:?}");
        if let Some(max_atom) = nogood.max_atom() {
            self.grow_for_max_atom_id(max_atom);
            assignment.grow_for_max_atom_id(max_atom);
        }
        if nogood.nogood_type() == NoGoodType::Learnt {
            self.learned_nogood_deletion.increase_conflict_counter();
        }

        match nogood.len() {
            0 => Err(ConflictCause::Addition(nogood.clone())),
            1 => self.add_unary(nogood, assignment),
            2 => self.add_binary(nogood, assignment),
            _ => self.add_watched(nogood, lbd, assignment),
        }
    }

    /// The literals of a stored nogood of size three or more.
    pub fn watched_literals(&self, id: WatchedNoGoodId) -> &[Literal] {
        self.nogoods[id].literals()
    }

    /// The plain nogood behind a stored one.
    pub fn watched_nogood(&self, id: WatchedNoGoodId) -> NoGood {
        self.nogoods[id].to_nogood()
    }

    pub fn bump_activity(&mut self, id: WatchedNoGoodId) {
        self.nogoods[id].bump_activity();
    }

    pub fn counter(&self) -> &NoGoodCounter {
        &self.counter
    }

    pub fn num_deleted_nogoods(&self) -> usize {
        self.learned_nogood_deletion.num_deleted()
    }

    /// The learnt nogoods that may still be deleted.
    pub(crate) fn learned_nogoods(&self) -> &[WatchedNoGoodId] {
        self.learned_nogood_deletion.learned()
    }

    /// Propagates every assignment the store has not seen yet.
    pub fn propagate(&mut self, assignment: &mut TrailAssignment) -> Result<(), ConflictCause> {
        while let Some(atom) = assignment.next_to_propagate() {
            let truth = assignment
                .truth(atom)
                .expect("atoms on the trail are assigned");
            let literal = Literal::new(atom, truth.to_boolean());
            trace!("Propagating {literal} ({truth})");

            if let Err(conflict) = self.propagate_weakly(literal, assignment) {
                trace!("Conflict during weak propagation: {conflict:?}");
                return Err(conflict);
            }
            if !truth.is_mbt() {
                if let Err(conflict) = self.propagate_strongly(literal, assignment) {
                    trace!("Conflict during strong propagation: {conflict:?}");
                    return Err(conflict);
                }
            }
            assignment.mark_propagated();
        }

        tern_assert_moderate!(self.debug_is_properly_watched());
        tern_assert_moderate!(self.debug_is_propagation_complete(assignment));
        Ok(())
    }

    /// Backtracks the current decision level of `assignment`.
    pub fn backtrack(&self, assignment: &mut TrailAssignment) {
        assignment.backtrack();
        tern_assert_moderate!(self.debug_is_properly_watched());
    }

    /// Runs learnt nogood deletion if enough conflicts have passed since the last run.
    pub fn cleanup_learned_nogoods(&mut self, assignment: &TrailAssignment) {
        if !self.learned_nogood_deletion.need_to_run() {
            return;
        }
        let deleted = self.learned_nogood_deletion.run(&mut self.nogoods, assignment);
        for id in deleted {
            self.unwatch(id);
            let nogood = &mut self.nogoods[id];
            nogood.mark_deleted();
            self.counter.remove(nogood.nogood_type(), nogood.len());
        }
    }

    /// Forgets every nogood; statistics are kept.
    pub fn clear(&mut self) {
        let statistics = self.statistics;
        *self = NoGoodStore {
            statistics,
            ..Default::default()
        };
        self.learned_nogood_deletion.clear();
    }

    pub fn log_statistics(&self, statistic_logger: StatisticLogger) {
        self.statistics.log(statistic_logger.clone());
        self.counter.log_statistics(statistic_logger.clone());
        statistic_logger
            .attach_to_prefix("num_deleted_nogoods")
            .log_statistic(self.num_deleted_nogoods());
    }

    fn add_unary(
        &mut self,
        nogood: &NoGood,
        assignment: &mut TrailAssignment,
    ) -> Result<(), ConflictCause> {
        let literal = nogood.literal(0);
        let truth = if nogood.has_head() {
            ThriceTruth::True
        } else {
            weak_complement(literal)
        };
        assignment.assign_at(literal.atom(), truth, Some(Antecedent::Unary(literal)), 0)?;
        self.counter.add(nogood.nogood_type(), 1);
        Ok(())
    }

    fn add_binary(
        &mut self,
        nogood: &NoGood,
        assignment: &mut TrailAssignment,
    ) -> Result<(), ConflictCause> {
        let (a, b) = (nogood.literal(0), nogood.literal(1));
        if a.atom() == b.atom() {
            debug!("Ignoring {nogood}, it can never be violated");
            self.statistics.num_ignored_nogoods += 1;
            return Ok(());
        }
        if assignment.is_violated(a) && assignment.is_violated(b) {
            return Err(ConflictCause::Addition(nogood.clone()));
        }

        // Propagate first so that a conflicting nogood leaves no watches behind.
        Self::propagate_binary_at_addition(a, b, nogood.head(), assignment)?;
        Self::propagate_binary_at_addition(b, a, nogood.head(), assignment)?;
        for (for_literal, other) in [(a, b), (b, a)] {
            if nogood.head() == Some(other) {
                self.binary_watches[for_literal].add_with_head(other);
            } else {
                self.binary_watches[for_literal].add_without_head(other);
            }
        }
        self.counter.add(nogood.nogood_type(), 2);
        Ok(())
    }

    fn propagate_binary_at_addition(
        for_literal: Literal,
        other: Literal,
        head: Option<Literal>,
        assignment: &mut TrailAssignment,
    ) -> Result<(), ConflictCause> {
        let is_headed = head == Some(other);
        if !assignment.is_violated(for_literal) {
            return Ok(());
        }
        let reason = Some(Antecedent::Binary([for_literal, other]));
        let atom = for_literal.atom();
        if let Some(weak_level) = assignment.weak_decision_level(atom) {
            assignment.assign_at(other.atom(), weak_complement(other), reason, weak_level)?;
        }
        if is_headed {
            if let Some(strong_level) = assignment.strong_decision_level(atom) {
                assignment.assign_at(other.atom(), ThriceTruth::True, reason, strong_level)?;
            }
        }
        Ok(())
    }

    fn add_watched(
        &mut self,
        nogood: &NoGood,
        lbd: Option<u32>,
        assignment: &mut TrailAssignment,
    ) -> Result<(), ConflictCause> {
        if nogood.has_complementary_literals() {
            debug!("Ignoring {nogood}, it can never be violated");
            self.statistics.num_ignored_nogoods += 1;
            return Ok(());
        }

        let head_atom = nogood.head().map(Literal::atom);
        let head_strong_level = head_atom
            .and_then(|atom| assignment.strong_decision_level(atom))
            .unwrap_or(u32::MAX);
        let is_head_true = head_atom.is_some_and(|atom| assignment.truth(atom) == Some(ThriceTruth::True));
        let strong_level_or_max =
            |atom: Atom| assignment.strong_decision_level(atom).unwrap_or(u32::MAX);

        let mut unassigned: [Option<usize>; 2] = [None, None];
        let mut satisfied: [Option<usize>; 2] = [None, None];
        let mut satisfied_weak_level = 0;
        // Position and level of the highest literal that holds (weakly / strongly).
        let mut weak_highest: Option<(usize, u32)> = None;
        let mut strong_highest: Option<(usize, u32)> = None;
        let mut potential_alpha: Option<usize> = None;

        for (index, &literal) in nogood.literals().iter().enumerate() {
            let atom = literal.atom();
            let truth = assignment.truth(atom);
            let is_complementary = truth.is_some_and(|truth| truth.to_boolean() != literal.is_positive());

            match truth {
                None => {
                    let slot = if unassigned[0].is_none() { 0 } else { 1 };
                    unassigned[slot] = Some(index);
                }
                Some(_) if is_complementary => {
                    if satisfied[0].is_none() {
                        satisfied[0] = Some(index);
                        satisfied_weak_level = assignment.weak_decision_level(atom).unwrap_or(0);
                    } else {
                        satisfied[1] = Some(index);
                    }
                }
                Some(truth) => {
                    let weak_level = assignment.weak_decision_level(atom).unwrap_or(0);
                    if weak_highest.map_or(true, |(_, level)| weak_level > level) {
                        weak_highest = Some((index, weak_level));
                    }
                    if !truth.is_mbt() && nogood.has_head() {
                        let strong_level = strong_level_or_max(atom);
                        if strong_highest.map_or(true, |(_, level)| strong_level > level) {
                            strong_highest = Some((index, strong_level));
                        }
                    }
                }
            }

            if potential_alpha.is_none() && nogood.has_head() && index != 0 {
                let strong_level = strong_level_or_max(atom);
                if (is_head_true && strong_level >= head_strong_level)
                    || is_complementary
                    || strong_level == u32::MAX
                {
                    potential_alpha = Some(index);
                }
            }
        }

        let highest_violating = || {
            weak_highest.expect("a nogood without open literals has one that holds")
        };

        // Weak unit propagation to perform once the nogood is stored: position and level.
        let mut weak_unit: Option<(usize, u32)> = None;
        let (first, second) = match (unassigned, satisfied) {
            ([Some(first), Some(second)], _) => (first, second),
            (_, [Some(first), second_satisfied]) => {
                let second = second_satisfied
                    .or(unassigned[0])
                    .unwrap_or_else(|| highest_violating().0);
                if second_satisfied.is_none() && unassigned[0].is_none() {
                    let (_, highest_level) = highest_violating();
                    if satisfied_weak_level > highest_level {
                        weak_unit = Some((first, highest_level));
                    }
                }
                (first, second)
            }
            ([Some(first), None], _) => {
                let (highest_position, highest_level) = highest_violating();
                weak_unit = Some((first, highest_level));
                (first, highest_position)
            }
            _ => {
                trace!("{nogood} is violated at addition");
                return Err(ConflictCause::Addition(nogood.clone()));
            }
        };

        // Strong unit propagation: level at which the head becomes true.
        let mut strong_unit: Option<u32> = None;
        let alpha = if nogood.has_head() {
            match potential_alpha {
                Some(alpha) => Some(alpha),
                None => {
                    let (position, level) = strong_highest
                        .expect("a strongly unit nogood has a body literal that holds");
                    strong_unit = Some(level);
                    Some(position)
                }
            }
        } else {
            None
        };

        let id = self
            .nogoods
            .push(WatchedNoGood::new(nogood, first, second, alpha, lbd));
        let reason = Some(Antecedent::Watched(id));

        if let Some((position, level)) = weak_unit {
            let literal = nogood.literal(position);
            let result = assignment.assign_at(literal.atom(), weak_complement(literal), reason, level);
            if let Err(conflict) = result {
                self.nogoods[id].mark_deleted();
                return Err(conflict);
            }
        }
        if let (Some(level), Some(atom)) = (strong_unit, head_atom) {
            if let Err(conflict) = assignment.assign_at(atom, ThriceTruth::True, reason, level) {
                self.nogoods[id].mark_deleted();
                return Err(conflict);
            }
        }

        let watched = &self.nogoods[id];
        trace!("Watching {watched} as {id}");
        self.watches[watched.literal(0)].push(id);
        self.watches[watched.literal(1)].push(id);
        if let Some(alpha_literal) = watched.alpha_literal() {
            self.alpha_watches[alpha_literal].push(id);
        }
        self.counter.add(nogood.nogood_type(), nogood.len());
        if nogood.nogood_type() == NoGoodType::Learnt {
            self.learned_nogood_deletion.record_learned(id);
        }
        Ok(())
    }

    /// Propagates from unassigned to must-be-true or false, triggered by `literal` holding.
    fn propagate_weakly(
        &mut self,
        literal: Literal,
        assignment: &mut TrailAssignment,
    ) -> Result<(), ConflictCause> {
        let weak_level = assignment
            .weak_decision_level(literal.atom())
            .expect("a propagated literal is assigned");
        for other in self.binary_watches[literal].others() {
            let reason = Some(Antecedent::Binary([literal, other]));
            assignment.assign_at(other.atom(), weak_complement(other), reason, weak_level)?;
            self.statistics.num_weak_propagations += 1;
        }

        let watchers = std::mem::take(&mut self.watches[literal]);
        for (index, &id) in watchers.iter().enumerate() {
            if let Err(conflict) = self.process_weakly_watched(literal, id, assignment) {
                // The untreated nogoods stay watched for after backtracking.
                self.watches[literal].extend_from_slice(&watchers[index..]);
                return Err(conflict);
            }
        }
        Ok(())
    }

    fn process_weakly_watched(
        &mut self,
        literal: Literal,
        id: WatchedNoGoodId,
        assignment: &mut TrailAssignment,
    ) -> Result<(), ConflictCause> {
        let nogood = &mut self.nogoods[id];
        let assigned_watch = if nogood.literal(0) == literal { 0 } else { 1 };
        tern_assert_moderate!(nogood.literal(assigned_watch) == literal);
        let other = nogood.literal(1 - assigned_watch);
        let literal_level = assignment.weak_decision_level(literal.atom());

        // A satisfied literal only keeps the nogood open as long as it is not undone before
        // `literal` is.
        let satisfied_at = |candidate: Literal| {
            is_satisfied(candidate, &*assignment)
                .then(|| assignment.weak_decision_level(candidate.atom()))
                .flatten()
        };
        if satisfied_at(other).is_some_and(|level| Some(level) <= literal_level) {
            self.watches[literal].push(id);
            return Ok(());
        }

        let mut lowest_satisfied_above: Option<(usize, u32)> = None;
        for index in 2..nogood.len() {
            let candidate = nogood.literal(index);
            let satisfied_level = satisfied_at(candidate);
            let is_replacement = !assignment.is_assigned(candidate.atom())
                || satisfied_level.is_some_and(|level| Some(level) <= literal_level);
            if is_replacement {
                nogood.swap(assigned_watch, index);
                self.watches[candidate].push(id);
                return Ok(());
            }
            if let Some(level) = satisfied_level {
                if lowest_satisfied_above.map_or(true, |(_, lowest)| level < lowest) {
                    lowest_satisfied_above = Some((index, level));
                }
            }
        }

        let other_holds = assignment.is_violated(other);
        let unit_index = match lowest_satisfied_above {
            // Two literals that do not hold are left to watch.
            Some((index, _)) if !other_holds => {
                nogood.swap(assigned_watch, index);
                self.watches[nogood.literal(assigned_watch)].push(id);
                return Ok(());
            }
            Some((index, _)) => index,
            None => 1 - assigned_watch,
        };

        let unit = nogood.literal(unit_index);
        let is_new = !assignment.is_assigned(unit.atom());
        let level = highest_weak_level_except(nogood.literals(), unit_index, assignment);
        trace!("{nogood} is unit, {unit} must not hold from level {level}");
        assignment.assign_at(
            unit.atom(),
            weak_complement(unit),
            Some(Antecedent::Watched(id)),
            level,
        )?;
        if is_new {
            self.statistics.num_weak_propagations += 1;
        }

        // Watch the literal that is undone first, so the nogood is revisited once it holds again.
        let replacement = if unit_index == 1 - assigned_watch {
            highest_weak_level_position(nogood.literals(), unit_index, assignment)
        } else {
            unit_index
        };
        nogood.swap(assigned_watch, replacement);
        self.watches[nogood.literal(assigned_watch)].push(id);
        Ok(())
    }

    /// Propagates heads to `True`, triggered by `literal` holding as `True` or `False`.
    fn propagate_strongly(
        &mut self,
        literal: Literal,
        assignment: &mut TrailAssignment,
    ) -> Result<(), ConflictCause> {
        let strong_level = assignment
            .strong_decision_level(literal.atom())
            .expect("a strongly propagated literal is true or false");
        for &head in self.binary_watches[literal].with_head() {
            let reason = Some(Antecedent::Binary([literal, head]));
            assignment.assign_at(head.atom(), ThriceTruth::True, reason, strong_level)?;
            self.statistics.num_strong_propagations += 1;
        }

        let watchers = std::mem::take(&mut self.alpha_watches[literal]);
        for (index, &id) in watchers.iter().enumerate() {
            if let Err(conflict) = self.process_strongly_watched(literal, id, assignment) {
                self.alpha_watches[literal].extend_from_slice(&watchers[index..]);
                return Err(conflict);
            }
        }
        Ok(())
    }

    fn process_strongly_watched(
        &mut self,
        literal: Literal,
        id: WatchedNoGoodId,
        assignment: &mut TrailAssignment,
    ) -> Result<(), ConflictCause> {
        let nogood = &mut self.nogoods[id];
        let (Some(head), Some(head_index)) = (nogood.head(), nogood.head_index()) else {
            panic!("the alpha watch of {id} is on a nogood without head");
        };
        let is_head_true = assignment.truth(head.atom()) == Some(ThriceTruth::True);
        if is_head_true
            && assignment.strong_decision_level(head.atom()) <= assignment.strong_decision_level(literal.atom())
        {
            self.alpha_watches[literal].push(id);
            return Ok(());
        }

        let alpha_index = nogood.alpha_index();
        for index in 0..nogood.len() {
            if Some(index) == alpha_index || index == head_index {
                continue;
            }
            let candidate = nogood.literal(index);
            let keeps_head_open = match assignment.truth(candidate.atom()) {
                None | Some(ThriceTruth::MustBeTrue) => true,
                Some(truth) => truth.to_boolean() != candidate.is_positive(),
            };
            if keeps_head_open {
                nogood.set_alpha(index);
                self.alpha_watches[candidate].push(id);
                return Ok(());
            }
        }

        let (highest, level) = nogood
            .literals()
            .iter()
            .enumerate()
            .filter(|&(index, _)| index != head_index)
            .filter_map(|(index, candidate)| {
                assignment
                    .strong_decision_level(candidate.atom())
                    .map(|level| (index, level))
            })
            .max_by_key(|&(_, level)| level)
            .expect("a strongly unit nogood has a body literal that holds");
        trace!("{nogood} is strongly unit, {} is true from level {level}", head.atom());
        assignment.assign_at(
            head.atom(),
            ThriceTruth::True,
            Some(Antecedent::Watched(id)),
            level,
        )?;
        if !is_head_true {
            self.statistics.num_strong_propagations += 1;
        }
        nogood.set_alpha(highest);
        self.alpha_watches[nogood.literal(highest)].push(id);
        Ok(())
    }

    fn unwatch(&mut self, id: WatchedNoGoodId) {
        let nogood = &self.nogoods[id];
        for position in 0..2 {
            self.watches[nogood.literal(position)].retain(|&watched| watched != id);
        }
        if let Some(alpha_literal) = nogood.alpha_literal() {
            self.alpha_watches[alpha_literal].retain(|&watched| watched != id);
        }
    }

    /// Checks that every stored nogood is in the watch lists of its watched literals, and that no
    /// deleted nogood is.
    fn debug_is_properly_watched(&self) -> bool {
        let is_watching = |lists: &KeyedVec<Literal, Vec<WatchedNoGoodId>>,
                           literal: Literal,
                           id: WatchedNoGoodId| {
            lists[literal].contains(&id)
        };

        for id in self.nogoods.keys() {
            let nogood = &self.nogoods[id];
            let alpha_watched = nogood
                .alpha_literal()
                .map(|literal| is_watching(&self.alpha_watches, literal, id));
            let watched = is_watching(&self.watches, nogood.literal(0), id)
                && is_watching(&self.watches, nogood.literal(1), id);

            if nogood.is_deleted() {
                assert!(!watched && alpha_watched != Some(true), "{id} is deleted but watched");
            } else {
                assert!(watched, "{id} {nogood} lacks an ordinary watch");
                assert!(alpha_watched != Some(false), "{id} {nogood} lacks its alpha watch");
            }
        }
        true
    }

    /// Checks, at a propagation fixpoint, that no stored nogood is unit without its consequence.
    fn debug_is_propagation_complete(&self, assignment: &TrailAssignment) -> bool {
        for nogood in self.nogoods.iter().filter(|nogood| !nogood.is_deleted()) {
            let open: Vec<Literal> = nogood
                .literals()
                .iter()
                .copied()
                .filter(|&literal| !assignment.is_violated(literal))
                .collect();
            assert!(!open.is_empty(), "{nogood} is violated at a fixpoint");
            if let [last] = open.as_slice() {
                assert!(
                    is_satisfied(*last, assignment),
                    "{nogood} is unit at a fixpoint but {last} is unassigned"
                );
            }

            if let Some(head) = nogood.head() {
                let body_strongly_holds = nogood.literals().iter().enumerate().all(|(index, &literal)| {
                    Some(index) == nogood.head_index()
                        || (assignment.is_violated(literal)
                            && assignment.strong_decision_level(literal.atom()).is_some())
                });
                if body_strongly_holds {
                    assert_eq!(
                        assignment.truth(head.atom()),
                        Some(ThriceTruth::True),
                        "{nogood} has a strongly holding body but its head is not true"
                    );
                }
            }
        }
        true
    }
}
