#![allow(clippy::double_parens, reason = "originates inside the bitfield macro")]

//! The three-valued assignment and its trail.
//!
//! Every atom carries a *weak* part (the level and reason at which it became true-or-must-be-true,
//! or false) and, once it is `True` or `False`, a *strong* part. An atom that is must-be-true has
//! only the weak part; strengthening it to `True` adds the strong part and leaves the weak one
//! untouched. Backtracking the level of the strengthening turns the atom back into must-be-true.
//!
//! Propagation may derive a value at a decision level below the current one. Such an assignment is
//! put on the trail of the current level like any other, but it is also remembered as out of order:
//! when backtracking removes it, it is re-applied at its own level.

use std::fmt::Display;
use std::fmt::Formatter;

use bitfield_struct::bitfield;
use itertools::Itertools;
use log::trace;

use crate::basic_types::Antecedent;
use crate::basic_types::Atom;
use crate::basic_types::ConflictCause;
use crate::basic_types::Literal;
use crate::basic_types::NoGood;
use crate::basic_types::ThriceTruth;
use crate::basic_types::Trail;
use crate::containers::KeyedVec;
use crate::containers::StorageKey;
use crate::tern_assert_moderate;
use crate::tern_assert_simple;

/// The weak part of the value of an atom.
#[bitfield(u32)]
struct AtomValue {
    /// See [`ThriceTruth::from_bits`]; `0` is unassigned.
    #[bits(2)]
    truth_bits: u8,
    /// Whether the atom was must-be-true before it became `True`.
    strengthened: bool,
    #[bits(29)]
    weak_level: u32,
}

impl AtomValue {
    fn truth(self) -> Option<ThriceTruth> {
        ThriceTruth::from_bits(self.truth_bits())
    }

    fn assigned(truth: ThriceTruth, level: u32) -> AtomValue {
        AtomValue::new()
            .with_truth_bits(truth.into_bits())
            .with_weak_level(level)
    }
}

/// A snapshot of everything the assignment knows about one atom.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Entry {
    pub atom: Atom,
    pub truth: ThriceTruth,
    /// The level at which the atom became true-or-must-be-true, or false.
    pub weak_decision_level: u32,
    /// The level at which the atom became `True` or `False`; absent while must-be-true.
    pub strong_decision_level: Option<u32>,
    /// The reason of the weak assignment; absent for choices.
    pub implied_by: Option<Antecedent>,
    /// The reason of the strong assignment.
    pub strong_implied_by: Option<Antecedent>,
    /// Whether the atom was must-be-true (at the weak level, for the weak reason) before it became
    /// `True`.
    pub strengthened_from_mbt: bool,
}

impl Entry {
    /// The literal that holds under this entry.
    pub fn literal(&self) -> Literal {
        Literal::new(self.atom, self.truth.to_boolean())
    }
}

#[derive(Clone, Copy, Debug)]
struct OutOfOrderAssignment {
    atom: Atom,
    truth: ThriceTruth,
    antecedent: Option<Antecedent>,
    decision_level: u32,
    /// The level whose trail holds the assignment; it is re-applied when this level is removed.
    placed_at: u32,
}

/// A three-valued assignment recorded on a trail.
#[derive(Debug, Default)]
pub struct TrailAssignment {
    values: KeyedVec<Atom, AtomValue>,
    strong_levels: KeyedVec<Atom, Option<u32>>,
    implied_by: KeyedVec<Atom, Option<Antecedent>>,
    strong_implied_by: KeyedVec<Atom, Option<Antecedent>>,
    /// The two-valued reading of the value each atom had when it was last unassigned.
    last_values: KeyedVec<Atom, bool>,
    trail: Trail<Atom>,
    /// Trail position of the next assignment the nogood store has to propagate.
    propagation_position: usize,
    out_of_order: Vec<OutOfOrderAssignment>,
    new_positive_assignments: Vec<Atom>,
    changed_atoms: Vec<Atom>,
    mbt_count: usize,
    did_change: bool,
    backtrack_buffer: Vec<Atom>,
}

impl TrailAssignment {
    pub fn decision_level(&self) -> u32 {
        self.trail.get_checkpoint() as u32
    }

    pub fn num_atoms(&self) -> usize {
        self.values.len()
    }

    /// Makes room for every atom up to and including `max_atom`.
    pub fn grow_for_max_atom_id(&mut self, max_atom: Atom) {
        self.values.accomodate(max_atom, AtomValue::new());
        self.strong_levels.accomodate(max_atom, None);
        self.implied_by.accomodate(max_atom, None);
        self.strong_implied_by.accomodate(max_atom, None);
        self.last_values.accomodate(max_atom, false);
    }

    pub fn get(&self, atom: Atom) -> Option<Entry> {
        let value = *self.values.get(atom)?;
        let truth = value.truth()?;
        Some(Entry {
            atom,
            truth,
            weak_decision_level: value.weak_level(),
            strong_decision_level: self.strong_levels[atom],
            implied_by: self.implied_by[atom],
            strong_implied_by: self.strong_implied_by[atom],
            strengthened_from_mbt: value.strengthened(),
        })
    }

    pub fn truth(&self, atom: Atom) -> Option<ThriceTruth> {
        self.values.get(atom).and_then(|value| value.truth())
    }

    pub fn is_assigned(&self, atom: Atom) -> bool {
        self.truth(atom).is_some()
    }

    pub fn weak_decision_level(&self, atom: Atom) -> Option<u32> {
        self.truth(atom).map(|_| self.values[atom].weak_level())
    }

    pub fn strong_decision_level(&self, atom: Atom) -> Option<u32> {
        self.strong_levels.get(atom).copied().flatten()
    }

    pub fn implied_by(&self, atom: Atom) -> Option<Antecedent> {
        self.implied_by.get(atom).copied().flatten()
    }

    pub fn strong_implied_by(&self, atom: Atom) -> Option<Antecedent> {
        self.strong_implied_by.get(atom).copied().flatten()
    }

    /// Whether `atom` was true or must-be-true when backtracking last unassigned it; `false` for
    /// atoms that were never unassigned.
    pub fn last_value(&self, atom: Atom) -> bool {
        self.last_values.get(atom).copied().unwrap_or(false)
    }

    /// Whether `literal` holds, i.e. whether it counts towards violating the nogoods it occurs in.
    pub fn is_violated(&self, literal: Literal) -> bool {
        self.truth(literal.atom())
            .is_some_and(|truth| truth.to_boolean() == literal.is_positive())
    }

    /// The literal of `atom` that holds, if it is assigned.
    pub fn literal_of(&self, atom: Atom) -> Option<Literal> {
        self.truth(atom)
            .map(|truth| Literal::new(atom, truth.to_boolean()))
    }

    /// The lowest level at which an out-of-order assignment of `atom` is pending.
    pub fn out_of_order_decision_level(&self, atom: Atom) -> Option<u32> {
        self.out_of_order
            .iter()
            .filter(|record| record.atom == atom)
            .map(|record| record.decision_level)
            .min()
    }

    /// The lowest level at which the current value of `atom` is known to hold.
    pub fn real_weak_decision_level(&self, atom: Atom) -> Option<u32> {
        let weak = self.weak_decision_level(atom)?;
        Some(
            self.out_of_order_decision_level(atom)
                .map_or(weak, |out_of_order| out_of_order.min(weak)),
        )
    }

    pub fn mbt_count(&self) -> usize {
        self.mbt_count
    }

    pub fn first_mbt_atom(&self) -> Option<Atom> {
        self.values
            .keys()
            .find(|&atom| self.truth(atom) == Some(ThriceTruth::MustBeTrue))
    }

    pub fn true_atoms(&self) -> impl Iterator<Item = Atom> + '_ {
        self.values
            .keys()
            .filter(|&atom| self.truth(atom) == Some(ThriceTruth::True))
    }

    /// The highest weak level among the literals of `nogood` if all of them hold; `None` if the
    /// nogood is not violated.
    pub fn minimum_conflict_level(&self, nogood: &NoGood) -> Option<u32> {
        nogood
            .literals()
            .iter()
            .map(|&literal| {
                self.is_violated(literal)
                    .then(|| self.values[literal.atom()].weak_level())
            })
            .try_fold(0, |highest, level| level.map(|level| level.max(highest)))
    }

    /// Assigns `truth` to `atom` at the current decision level.
    pub fn assign(
        &mut self,
        atom: Atom,
        truth: ThriceTruth,
        antecedent: Option<Antecedent>,
    ) -> Result<(), ConflictCause> {
        self.assign_at(atom, truth, antecedent, self.decision_level())
    }

    /// Assigns `truth` to `atom` at `decision_level`, which may lie below the current level.
    ///
    /// Fails exactly if the two-valued reading of `truth` contradicts the current value.
    /// Must-be-true over must-be-true or `True`, and `True` over must-be-true, succeed.
    pub fn assign_at(
        &mut self,
        atom: Atom,
        truth: ThriceTruth,
        antecedent: Option<Antecedent>,
        decision_level: u32,
    ) -> Result<(), ConflictCause> {
        tern_assert_simple!(decision_level <= self.decision_level());
        let value = self.values[atom];

        match value.truth() {
            None => {
                self.values[atom] = AtomValue::assigned(truth, decision_level);
                self.implied_by[atom] = antecedent;
                if truth.is_mbt() {
                    self.mbt_count += 1;
                } else {
                    self.strong_levels[atom] = Some(decision_level);
                    self.strong_implied_by[atom] = antecedent;
                }
                self.record_change(atom, truth);
            }
            Some(current) if current.to_boolean() != truth.to_boolean() => {
                trace!("Assigning {atom}={truth}@{decision_level} contradicts {current}");
                return Err(match antecedent {
                    Some(antecedent) => ConflictCause::Violated(antecedent),
                    None => ConflictCause::Choice(atom),
                });
            }
            Some(ThriceTruth::MustBeTrue) if truth == ThriceTruth::True => {
                self.values[atom] = value
                    .with_truth_bits(ThriceTruth::True.into_bits())
                    .with_strengthened(true);
                self.strong_levels[atom] = Some(decision_level);
                self.strong_implied_by[atom] = antecedent;
                self.mbt_count -= 1;
                self.record_change(atom, truth);
            }
            Some(_) => {
                // The value is known already; only a lower level is news.
                let known_level = if truth == ThriceTruth::True {
                    self.strong_levels[atom].unwrap_or(u32::MAX)
                } else {
                    value.weak_level()
                };
                if decision_level < known_level && decision_level < self.decision_level() {
                    self.record_out_of_order(atom, truth, antecedent, decision_level);
                }
                return Ok(());
            }
        }

        if decision_level < self.decision_level() {
            self.record_out_of_order(atom, truth, antecedent, decision_level);
        }
        Ok(())
    }

    /// Opens a new decision level and assigns the choice on it.
    pub fn choose(&mut self, atom: Atom, value: bool) -> Result<(), ConflictCause> {
        self.trail.new_checkpoint();
        self.assign(atom, ThriceTruth::from_boolean(value), None)
    }

    /// Undoes the current decision level.
    pub fn backtrack(&mut self) {
        let level = self.decision_level();
        tern_assert_simple!(level > 0, "there is no decision level to backtrack");

        let mut removed = std::mem::take(&mut self.backtrack_buffer);
        removed.extend(self.trail.synchronise(level as usize - 1));
        for &atom in removed.iter() {
            self.undo(atom, level);
        }
        removed.clear();
        self.backtrack_buffer = removed;

        self.propagation_position = self.propagation_position.min(self.trail.len());

        let (to_replay, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.out_of_order)
            .into_iter()
            .partition(|record| record.placed_at >= level);
        self.out_of_order = pending;
        for record in to_replay {
            let result =
                self.assign_at(record.atom, record.truth, record.antecedent, record.decision_level);
            tern_assert_simple!(
                result.is_ok(),
                "re-applying the out-of-order assignment of {} failed",
                record.atom
            );
        }
        trace!("Backtracked to decision level {}", self.decision_level());
    }

    /// Undoes every decision level above `level`.
    pub fn backjump(&mut self, level: u32) {
        tern_assert_simple!(
            level <= self.decision_level(),
            "cannot backjump upwards from {} to {level}",
            self.decision_level()
        );
        while self.decision_level() > level {
            self.backtrack();
        }
    }

    /// Assigns `False` to every atom that is still unassigned. Returns whether there was any.
    pub fn close_unassigned_atoms(&mut self) -> bool {
        let unassigned: Vec<Atom> = self
            .values
            .keys()
            .filter(|&atom| !self.is_assigned(atom))
            .collect();
        for &atom in unassigned.iter() {
            let result = self.assign(atom, ThriceTruth::False, Some(Antecedent::Closing));
            tern_assert_simple!(result.is_ok(), "closing an unassigned atom cannot conflict");
        }
        trace!("Closed {} unassigned atoms", unassigned.len());
        !unassigned.is_empty()
    }

    /// The next atom whose new value has not been propagated yet.
    pub fn next_to_propagate(&self) -> Option<Atom> {
        self.trail.get(self.propagation_position).copied()
    }

    pub fn mark_propagated(&mut self) {
        tern_assert_moderate!(self.propagation_position < self.trail.len());
        self.propagation_position += 1;
    }

    pub fn has_pending_propagations(&self) -> bool {
        self.propagation_position < self.trail.len()
    }

    /// Atoms that became true or must-be-true since the last call, and still are.
    pub fn drain_new_positive_assignments(&mut self) -> Vec<Atom> {
        let mut atoms = std::mem::take(&mut self.new_positive_assignments);
        atoms.retain(|&atom| self.truth(atom).is_some_and(ThriceTruth::to_boolean));
        atoms.into_iter().unique().collect()
    }

    /// Atoms whose value changed, by assignment or backtracking, since the last call.
    pub(crate) fn drain_changed_atoms(&mut self) -> Vec<Atom> {
        std::mem::take(&mut self.changed_atoms)
    }

    /// Whether anything was assigned since the last call.
    pub fn did_change(&mut self) -> bool {
        std::mem::take(&mut self.did_change)
    }

    /// The atoms on the trail, oldest first. An atom strengthened from must-be-true occurs twice.
    pub fn trail(&self) -> &[Atom] {
        &self.trail
    }

    /// Forgets everything; used when the search is rebooted.
    pub fn clear(&mut self) {
        *self = TrailAssignment::default();
    }

    fn undo(&mut self, atom: Atom, level: u32) {
        let value = self.values[atom];
        let Some(truth) = value.truth() else {
            // Pushed twice on this level and already undone.
            return;
        };

        if truth == ThriceTruth::True && value.strengthened() && value.weak_level() < level {
            self.values[atom] = AtomValue::assigned(ThriceTruth::MustBeTrue, value.weak_level());
            self.strong_levels[atom] = None;
            self.strong_implied_by[atom] = None;
            self.mbt_count += 1;
        } else {
            if truth.is_mbt() {
                self.mbt_count -= 1;
            }
            self.last_values[atom] = truth.to_boolean();
            self.values[atom] = AtomValue::new();
            self.strong_levels[atom] = None;
            self.implied_by[atom] = None;
            self.strong_implied_by[atom] = None;
        }
        self.changed_atoms.push(atom);
    }

    fn record_change(&mut self, atom: Atom, truth: ThriceTruth) {
        self.trail.push(atom);
        self.changed_atoms.push(atom);
        if truth.to_boolean() {
            self.new_positive_assignments.push(atom);
        }
        self.did_change = true;
    }

    fn record_out_of_order(
        &mut self,
        atom: Atom,
        truth: ThriceTruth,
        antecedent: Option<Antecedent>,
        decision_level: u32,
    ) {
        trace!("Out-of-order assignment {atom}={truth}@{decision_level}");
        self.out_of_order.push(OutOfOrderAssignment {
            atom,
            truth,
            antecedent,
            decision_level,
            placed_at: self.decision_level(),
        });
    }
}

impl Display for TrailAssignment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let assigned = self.values.keys().filter_map(|atom| self.get(atom)).map(|entry| {
            format!(
                "{}={}@{}",
                entry.atom.index(),
                entry.truth,
                entry.weak_decision_level
            )
        });
        write!(f, "[{}]", assigned.format(", "))
    }
}
