use crate::basic_types::Literal;
use crate::containers::HashSet;
use crate::engine::TrailAssignment;

/// Used to compute the LBD of nogoods.
/// The type carries state that prevents the re-allocation of helper data structures.
#[derive(Clone, Debug, Default)]
pub(crate) struct Lbd {
    levels: HashSet<u32>,
}

impl Lbd {
    /// Compute the LBD of the given literals under the given assignment; every literal has to
    /// be assigned.
    pub(crate) fn compute_lbd(&mut self, literals: &[Literal], assignment: &TrailAssignment) -> u32 {
        self.levels.clear();
        for literal in literals {
            let level = assignment
                .weak_decision_level(literal.atom())
                .expect("literals of a learned nogood are assigned");
            let _ = self.levels.insert(level);
        }
        self.levels.len() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_types::Atom;
    use crate::basic_types::ThriceTruth;

    #[test]
    fn counts_distinct_levels() {
        let mut assignment = TrailAssignment::default();
        assignment.grow_for_max_atom_id(Atom::new(3));
        assignment
            .assign(Atom::new(0), ThriceTruth::True, None)
            .expect("unassigned");
        assignment.choose(Atom::new(1), true).expect("unassigned");
        assignment
            .assign(Atom::new(2), ThriceTruth::False, None)
            .expect("unassigned");

        let literals = [0, 1, 2].map(|id| Literal::positive(Atom::new(id)));
        assert_eq!(Lbd::default().compute_lbd(&literals, &assignment), 2);
    }
}
