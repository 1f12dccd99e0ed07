use rand::rngs::SmallRng;
use rand::Rng;

use super::BranchingHeuristic;
use super::SelectionContext;
use crate::basic_types::Literal;

/// Chooses a uniformly random active choice atom with a random value.
#[derive(Debug)]
pub struct RandomHeuristic {
    random_generator: SmallRng,
}

impl RandomHeuristic {
    pub fn new(random_generator: SmallRng) -> RandomHeuristic {
        RandomHeuristic { random_generator }
    }
}

impl BranchingHeuristic for RandomHeuristic {
    fn choose_literal(&mut self, context: &SelectionContext) -> Option<Literal> {
        let num_active = context.num_active_choice_atoms();
        if num_active == 0 {
            return None;
        }
        let index = self.random_generator.gen_range(0..num_active);
        let atom = context.active_choice_atoms().nth(index)?;
        let value = self.random_generator.gen_bool(0.5);
        Some(context.literal(atom, value))
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;
    use crate::basic_types::Atom;
    use crate::basic_types::ThriceTruth;
    use crate::containers::HashMap;
    use crate::engine::choice::ChoiceManager;
    use crate::engine::choice::ChoicePoint;
    use crate::engine::TrailAssignment;
    use crate::grounder::ChoiceAtoms;

    #[test]
    fn chooses_only_active_atoms() {
        let mut assignment = TrailAssignment::default();
        assignment.grow_for_max_atom_id(Atom::new(4));
        assignment
            .assign(Atom::new(0), ThriceTruth::True, None)
            .expect("unassigned");
        let choice_atoms: ChoiceAtoms = [2, 3, 4]
            .into_iter()
            .map(|id| ChoicePoint {
                atom: Atom::new(id),
                // Atom 4 is never enabled.
                enabler: if id == 4 { Atom::new(1) } else { Atom::new(0) },
                disabler: Atom::new(1),
            })
            .collect();
        let mut choice_manager = ChoiceManager::default();
        choice_manager.add_choice_information(&choice_atoms, &HashMap::default(), &assignment);

        let mut heuristic = RandomHeuristic::new(SmallRng::seed_from_u64(42));
        for _ in 0..20 {
            let literal = heuristic
                .choose_literal(&SelectionContext::new(&choice_manager, &assignment))
                .expect("two atoms are active");
            assert!([Atom::new(2), Atom::new(3)].contains(&literal.atom()));
        }
    }
}
