use std::collections::BTreeSet;
use std::fmt::Display;

use itertools::Itertools;

/// A stable model, given by the atoms it makes true.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AnswerSet<A: Ord> {
    atoms: BTreeSet<A>,
}

impl<A: Ord> AnswerSet<A> {
    pub fn new(atoms: impl IntoIterator<Item = A>) -> AnswerSet<A> {
        AnswerSet {
            atoms: atoms.into_iter().collect(),
        }
    }

    pub fn contains(&self, atom: &A) -> bool {
        self.atoms.contains(atom)
    }

    /// The atoms in ascending order.
    pub fn atoms(&self) -> impl Iterator<Item = &A> {
        self.atoms.iter()
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }
}

impl<A: Ord + Display> Display for AnswerSet<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.atoms.is_empty() {
            write!(f, "{{ }}")
        } else {
            write!(f, "{{ {} }}", self.atoms.iter().join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_sorted_atoms() {
        let answer_set = AnswerSet::new(["b", "a", "b"]);
        assert_eq!(answer_set.to_string(), "{ a, b }");
        assert_eq!(answer_set.len(), 2);
        assert_eq!(AnswerSet::<&str>::new([]).to_string(), "{ }");
    }
}
