//! The interface between the search and the grounder that produces its nogoods.
//!
//! The grounder works incrementally: after every propagation fixpoint the solver reports the atoms
//! that became true or must-be-true, and the grounder may answer with further nogoods and choice
//! points. Atoms are interned in an [`AtomStore`], so the solver only ever sees [`Atom`] numbers.
mod answer_set;
mod atom_store;
mod propositional;

use std::fmt::Debug;
use std::fmt::Display;
use std::hash::Hash;

pub use answer_set::AnswerSet;
pub use atom_store::AtomStore;
pub use propositional::PropositionalGrounder;

use crate::basic_types::Atom;
use crate::basic_types::Literal;
use crate::basic_types::NoGood;
use crate::basic_types::RebootError;
use crate::containers::HashMap;
use crate::containers::HashSet;
use crate::containers::StorageKey;
use crate::engine::choice::ChoicePoint;
use crate::engine::TrailAssignment;

/// The number under which a grounder knows a nogood.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NoGoodId(u32);

impl StorageKey for NoGoodId {
    fn index(&self) -> usize {
        self.0 as usize
    }

    fn create_from_index(index: usize) -> Self {
        NoGoodId(index as u32)
    }
}

impl Display for NoGoodId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Choice points handed from the grounder to the solver.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChoiceAtoms {
    points: Vec<ChoicePoint>,
}

impl ChoiceAtoms {
    pub fn push(&mut self, point: ChoicePoint) {
        self.points.push(point);
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChoicePoint> {
        self.points.iter()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl FromIterator<ChoicePoint> for ChoiceAtoms {
    fn from_iter<T: IntoIterator<Item = ChoicePoint>>(iter: T) -> Self {
        ChoiceAtoms {
            points: iter.into_iter().collect(),
        }
    }
}

/// A producer of ground nogoods.
pub trait Grounder: Debug {
    /// The grounder's own representation of an atom.
    type Atom: Clone + Eq + Hash + Display + Ord + Debug;

    fn atom_store(&self) -> &AtomStore<Self::Atom>;

    fn atom_store_mut(&mut self) -> &mut AtomStore<Self::Atom>;

    /// The nogoods that became relevant since the last call, given the current assignment.
    fn get_nogoods(&mut self, assignment: &TrailAssignment) -> Vec<(NoGoodId, NoGood)>;

    /// Reports the atoms that became true or must-be-true since the last report.
    fn update_assignment(&mut self, new_positive_atoms: &[Atom]);

    /// Assigns an id to a nogood created by the solver. Registering an equal nogood twice yields
    /// the same id.
    fn register(&mut self, nogood: &NoGood) -> NoGoodId;

    /// The choice points created since the last call.
    fn get_choice_atoms(&mut self) -> ChoiceAtoms;

    /// For every atom derived by rules with a choice point on their body, the body atoms.
    fn get_heads_to_bodies(&mut self) -> HashMap<Atom, HashSet<Atom>>;

    /// Translates the atoms that are `True` in a complete assignment into an answer set.
    fn assignment_to_answer_set(
        &self,
        true_atoms: impl IntoIterator<Item = Atom>,
    ) -> AnswerSet<Self::Atom>;

    /// Literals that currently hold and together explain why the must-be-true `atom` cannot be
    /// derived. The solver learns that `atom` must not be true together with them.
    ///
    /// `None` means that no such explanation is available.
    fn justify_atom(&self, _atom: Atom, _assignment: &TrailAssignment) -> Option<Vec<Literal>> {
        None
    }

    fn is_rebootable(&self) -> bool {
        false
    }

    /// Forgets what has been handed to the solver so that [`Grounder::get_nogoods`] and
    /// [`Grounder::get_choice_atoms`] start over. Atoms are re-interned in their original order.
    fn reboot(&mut self) -> Result<(), RebootError> {
        Err(RebootError::Unsupported)
    }
}
