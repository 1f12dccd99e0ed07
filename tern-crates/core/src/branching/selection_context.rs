use crate::basic_types::Atom;
use crate::basic_types::Literal;
use crate::basic_types::ThriceTruth;
use crate::engine::choice::ChoiceManager;
use crate::engine::TrailAssignment;

/// The view of the search state a [`BranchingHeuristic`](super::BranchingHeuristic) chooses
/// from.
#[derive(Clone, Copy, Debug)]
pub struct SelectionContext<'a> {
    choice_manager: &'a ChoiceManager,
    assignment: &'a TrailAssignment,
}

impl<'a> SelectionContext<'a> {
    pub fn new(choice_manager: &'a ChoiceManager, assignment: &'a TrailAssignment) -> Self {
        SelectionContext {
            choice_manager,
            assignment,
        }
    }

    pub fn is_active_choice_atom(&self, atom: Atom) -> bool {
        self.choice_manager.is_active_choice_atom(atom)
    }

    /// The active choice atom that became active first.
    pub fn next_active_choice_atom(&self) -> Option<Atom> {
        self.choice_manager.next_active_choice_atom()
    }

    pub fn active_choice_atoms(&self) -> impl Iterator<Item = Atom> + 'a {
        self.choice_manager.active_choice_atoms()
    }

    pub fn num_active_choice_atoms(&self) -> usize {
        self.choice_manager.num_active_choice_atoms()
    }

    pub fn truth(&self, atom: Atom) -> Option<ThriceTruth> {
        self.assignment.truth(atom)
    }

    /// The value `atom` had before backtracking last unassigned it.
    pub fn last_value(&self, atom: Atom) -> bool {
        self.assignment.last_value(atom)
    }

    pub fn is_mbt(&self, atom: Atom) -> bool {
        self.truth(atom) == Some(ThriceTruth::MustBeTrue)
    }

    /// The literal choosing `atom` with `value`, unless the atom is must-be-true, in which case
    /// only `True` is possible.
    pub fn literal(&self, atom: Atom, value: bool) -> Literal {
        Literal::new(atom, value || self.is_mbt(atom))
    }
}
