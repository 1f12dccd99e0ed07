use std::fmt::Display;

use log::trace;

use crate::basic_types::Atom;
use crate::basic_types::ThriceTruth;
use crate::containers::HashMap;
use crate::containers::SparseSet;
use crate::engine::TrailAssignment;
use crate::grounder::ChoiceAtoms;
use crate::tern_assert_advanced;
use crate::tern_assert_simple;

/// An atom the search may guess, together with the atoms controlling whether it may be guessed
/// right now.
///
/// The point is active iff the enabler is `True`, the disabler is neither `True` nor
/// must-be-true, and the atom itself is unassigned or must-be-true.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChoicePoint {
    pub atom: Atom,
    pub enabler: Atom,
    pub disabler: Atom,
}

impl ChoicePoint {
    pub fn is_active(&self, assignment: &TrailAssignment) -> bool {
        let is_enabled = assignment.truth(self.enabler) == Some(ThriceTruth::True);
        let is_disabled = assignment
            .truth(self.disabler)
            .is_some_and(ThriceTruth::to_boolean);
        let is_open = assignment
            .truth(self.atom)
            .map_or(true, ThriceTruth::is_mbt);
        is_enabled && !is_disabled && is_open
    }
}

impl Display for ChoicePoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (enabler {}, disabler {})",
            self.atom, self.enabler, self.disabler
        )
    }
}

/// Tracks which choice points are active.
///
/// Every atom occurring in a choice point influences it; whenever such an atom changes, the
/// activity of the points it influences is recomputed.
#[derive(Debug, Default)]
pub struct ChoiceInfluenceManager {
    choice_points: HashMap<Atom, ChoicePoint>,
    influenced_by: HashMap<Atom, Vec<Atom>>,
    active: SparseSet<Atom>,
    newly_activated: Vec<Atom>,
}

impl ChoiceInfluenceManager {
    /// Registers new choice points. Registering the same point again has no effect.
    pub fn add_information(&mut self, choice_atoms: &ChoiceAtoms, assignment: &TrailAssignment) {
        for &point in choice_atoms.iter() {
            if let Some(known) = self.choice_points.get(&point.atom) {
                tern_assert_simple!(
                    *known == point,
                    "choice atom {} is registered as {known} and as {point}",
                    point.atom
                );
                continue;
            }
            trace!("New choice point {point}");
            let _ = self.choice_points.insert(point.atom, point);
            for influencer in [point.atom, point.enabler, point.disabler] {
                self.influenced_by
                    .entry(influencer)
                    .or_default()
                    .push(point.atom);
            }
            self.recompute(point.atom, assignment);
        }
    }

    /// Recomputes the activity of every choice point influenced by one of `changed_atoms`.
    pub fn update<Atoms: IntoIterator<Item = Atom>>(
        &mut self,
        changed_atoms: Atoms,
        assignment: &TrailAssignment,
    ) {
        for atom in changed_atoms {
            let Some(influenced) = self.influenced_by.get(&atom) else {
                continue;
            };
            for choice_atom in influenced.clone() {
                self.recompute(choice_atom, assignment);
            }
        }
        tern_assert_advanced!(self.debug_activity_is_up_to_date(assignment));
    }

    pub fn is_active(&self, atom: Atom) -> bool {
        self.active.contains(atom)
    }

    pub fn is_choice_atom(&self, atom: Atom) -> bool {
        self.choice_points.contains_key(&atom)
    }

    pub fn choice_point(&self, atom: Atom) -> Option<ChoicePoint> {
        self.choice_points.get(&atom).copied()
    }

    pub fn next_active_atom(&self) -> Option<Atom> {
        self.active.get(0)
    }

    pub fn active_atoms(&self) -> impl Iterator<Item = Atom> + '_ {
        self.active.iter()
    }

    pub fn num_active(&self) -> usize {
        self.active.len()
    }

    /// The atoms that became active since the last call and still are.
    pub fn drain_newly_activated(&mut self) -> Vec<Atom> {
        let mut atoms = std::mem::take(&mut self.newly_activated);
        atoms.retain(|&atom| self.active.contains(atom));
        atoms
    }

    pub fn clear(&mut self) {
        *self = ChoiceInfluenceManager::default();
    }

    fn recompute(&mut self, choice_atom: Atom, assignment: &TrailAssignment) {
        let point = self.choice_points[&choice_atom];
        if point.is_active(assignment) {
            if self.active.insert(choice_atom) {
                trace!("Choice point {choice_atom} is active");
                self.newly_activated.push(choice_atom);
            }
        } else if self.active.remove(choice_atom) {
            trace!("Choice point {choice_atom} is inactive");
        }
    }

    fn debug_activity_is_up_to_date(&self, assignment: &TrailAssignment) -> bool {
        for point in self.choice_points.values() {
            assert_eq!(
                point.is_active(assignment),
                self.active.contains(point.atom),
                "the activity of choice point {point} is outdated"
            );
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn atom(id: u32) -> Atom {
        Atom::new(id)
    }

    fn setup() -> (ChoiceInfluenceManager, TrailAssignment) {
        let mut assignment = TrailAssignment::default();
        assignment.grow_for_max_atom_id(atom(5));
        let mut choice_atoms = ChoiceAtoms::default();
        choice_atoms.push(ChoicePoint {
            atom: atom(1),
            enabler: atom(2),
            disabler: atom(3),
        });
        let mut manager = ChoiceInfluenceManager::default();
        manager.add_information(&choice_atoms, &assignment);
        (manager, assignment)
    }

    #[test]
    fn choice_point_is_inactive_until_enabled() {
        let (mut manager, mut assignment) = setup();
        assert!(manager.is_choice_atom(atom(1)));
        assert!(!manager.is_active(atom(1)));

        assignment
            .assign(atom(2), ThriceTruth::True, None)
            .expect("atom 2 is unassigned");
        manager.update(assignment.drain_changed_atoms(), &assignment);

        assert!(manager.is_active(atom(1)));
        assert_eq!(manager.next_active_atom(), Some(atom(1)));
        assert_eq!(manager.drain_newly_activated(), vec![atom(1)]);
        assert!(manager.drain_newly_activated().is_empty());
    }

    #[test]
    fn must_be_true_enabler_does_not_enable() {
        let (mut manager, mut assignment) = setup();
        assignment
            .assign(atom(2), ThriceTruth::MustBeTrue, None)
            .expect("atom 2 is unassigned");
        manager.update(assignment.drain_changed_atoms(), &assignment);

        assert!(!manager.is_active(atom(1)));
    }

    #[test]
    fn disabler_and_assigned_atom_deactivate() {
        let (mut manager, mut assignment) = setup();
        assignment
            .assign(atom(2), ThriceTruth::True, None)
            .expect("atom 2 is unassigned");
        assignment
            .choose(atom(3), true)
            .expect("atom 3 is unassigned");
        manager.update(assignment.drain_changed_atoms(), &assignment);
        assert!(!manager.is_active(atom(1)));

        assignment.backtrack();
        manager.update(assignment.drain_changed_atoms(), &assignment);
        assert!(manager.is_active(atom(1)));

        assignment
            .choose(atom(1), false)
            .expect("atom 1 is unassigned");
        manager.update(assignment.drain_changed_atoms(), &assignment);
        assert!(!manager.is_active(atom(1)));
        assert_eq!(manager.num_active(), 0);
    }

    #[test]
    fn must_be_true_choice_atom_stays_active() {
        let (mut manager, mut assignment) = setup();
        assignment
            .assign(atom(2), ThriceTruth::True, None)
            .expect("atom 2 is unassigned");
        assignment
            .assign(atom(1), ThriceTruth::MustBeTrue, None)
            .expect("atom 1 is unassigned");
        manager.update(assignment.drain_changed_atoms(), &assignment);

        assert!(manager.is_active(atom(1)));
    }

    #[test]
    fn registering_a_point_twice_is_ignored() {
        let (mut manager, assignment) = setup();
        let mut again = ChoiceAtoms::default();
        again.push(ChoicePoint {
            atom: atom(1),
            enabler: atom(2),
            disabler: atom(3),
        });
        manager.add_information(&again, &assignment);

        assert_eq!(manager.choice_point(atom(1)).map(|point| point.enabler), Some(atom(2)));
    }

    #[test]
    #[should_panic]
    fn registering_a_conflicting_point_panics() {
        let (mut manager, assignment) = setup();
        let mut conflicting = ChoiceAtoms::default();
        conflicting.push(ChoicePoint {
            atom: atom(1),
            enabler: atom(4),
            disabler: atom(3),
        });
        manager.add_information(&conflicting, &assignment);
    }
}
