use std::fmt::Display;
use std::hash::Hash;

use crate::basic_types::Atom;
use crate::basic_types::Literal;
use crate::containers::HashMap;
use crate::containers::KeyedVec;

/// Interns the grounder's atoms as dense [`Atom`] numbers, starting at `0`.
#[derive(Clone, Debug)]
pub struct AtomStore<A> {
    atoms: KeyedVec<Atom, A>,
    ids: HashMap<A, Atom>,
}

impl<A> Default for AtomStore<A> {
    fn default() -> Self {
        AtomStore {
            atoms: KeyedVec::default(),
            ids: HashMap::default(),
        }
    }
}

impl<A: Clone + Eq + Hash + Display> AtomStore<A> {
    /// The number of `atom`, interning it first if it is new.
    pub fn put_if_absent(&mut self, atom: A) -> Atom {
        if let Some(&id) = self.ids.get(&atom) {
            return id;
        }
        let id = self.atoms.push(atom.clone());
        let _ = self.ids.insert(atom, id);
        id
    }

    pub fn get(&self, id: Atom) -> Option<&A> {
        self.atoms.get(id)
    }

    pub fn id_of(&self, atom: &A) -> Option<Atom> {
        self.ids.get(atom).copied()
    }

    /// The highest number handed out so far.
    pub fn max_atom_id(&self) -> Option<Atom> {
        self.atoms.keys().last()
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// Forgets every atom.
    pub fn reset(&mut self) {
        self.atoms.clear();
        self.ids.clear();
    }

    pub fn atom_to_string(&self, id: Atom) -> String {
        self.get(id)
            .map_or_else(|| format!("?{id}"), |atom| atom.to_string())
    }

    /// Renders a literal as `+name` or `-name`.
    pub fn literal_to_string(&self, literal: Literal) -> String {
        let sign = if literal.is_positive() { '+' } else { '-' };
        format!("{sign}{}", self.atom_to_string(literal.atom()))
    }
}
