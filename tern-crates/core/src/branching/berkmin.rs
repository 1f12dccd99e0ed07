use log::trace;
use rand::rngs::SmallRng;
use rand::Rng;

use super::BranchingHeuristic;
use super::SelectionContext;
use crate::basic_types::Atom;
use crate::basic_types::Literal;
use crate::basic_types::NoGood;
use crate::basic_types::ThriceTruth;
use crate::containers::KeyedVec;
use crate::create_statistics_struct;
use crate::engine::conflict_analysis::ConflictAnalysisResult;
use crate::statistics::Statistic;
use crate::statistics::StatisticLogger;

const DEFAULT_DECAY_AGE: u32 = 10;
const DEFAULT_DECAY_FACTOR: f64 = 0.25;

create_statistics_struct!(BerkMinStatistics {
    num_choices_true: u64,
    num_choices_false: u64,
    num_random_signs: u64,
});

/// [BerkMin](https://doi.org/10.1016/j.dam.2006.10.007) adapted to choice atoms.
///
/// Nogoods that were violated, learned or newly added are kept on a stack. The choice is the most
/// active open choice atom of the most recent nogood that is neither satisfied nor fully assigned;
/// older nogoods are only consulted if that one has no such atom. Activities count how often an
/// atom took part in a conflict and are decayed every few conflicts.
///
/// The value is against the polarity the atom occurs with more often in nogoods, since that
/// polarity is the one that violates them. Ties are broken randomly.
#[derive(Debug)]
pub struct BerkMin {
    activities: KeyedVec<Atom, f64>,
    sign_counters: KeyedVec<Literal, u32>,
    /// The most recent nogood last.
    stack: Vec<Vec<Literal>>,
    decay_age: u32,
    decay_factor: f64,
    conflicts_since_decay: u32,
    random_generator: SmallRng,
    statistics: BerkMinStatistics,
}

impl BerkMin {
    pub fn new(random_generator: SmallRng) -> BerkMin {
        BerkMin::with_decay(DEFAULT_DECAY_AGE, DEFAULT_DECAY_FACTOR, random_generator)
    }

    /// Activities are multiplied by `decay_factor` every `decay_age` conflicts.
    pub fn with_decay(decay_age: u32, decay_factor: f64, random_generator: SmallRng) -> BerkMin {
        BerkMin {
            activities: KeyedVec::default(),
            sign_counters: KeyedVec::default(),
            stack: Vec::new(),
            decay_age,
            decay_factor,
            conflicts_since_decay: 0,
            random_generator,
            statistics: BerkMinStatistics::default(),
        }
    }

    pub fn activity(&self, atom: Atom) -> f64 {
        self.activities.get(atom).copied().unwrap_or(0.0)
    }

    fn sign_counter(&self, literal: Literal) -> u32 {
        self.sign_counters.get(literal).copied().unwrap_or(0)
    }

    fn push(&mut self, literals: &[Literal]) {
        if !literals.is_empty() {
            self.stack.push(literals.to_vec());
        }
    }

    fn count_signs(&mut self, literals: &[Literal]) {
        for &literal in literals {
            self.grow_for_max_atom_id(literal.atom());
            self.sign_counters[literal] += 1;
        }
    }

    fn bump_activity(&mut self, atom: Atom) {
        self.grow_for_max_atom_id(atom);
        self.activities[atom] += 1.0;
    }

    fn decay_if_time_has_come(&mut self) {
        self.conflicts_since_decay += 1;
        if self.conflicts_since_decay >= self.decay_age {
            trace!("Decaying BerkMin activities by {}", self.decay_factor);
            for atom in self.activities.keys().collect::<Vec<_>>() {
                self.activities[atom] *= self.decay_factor;
            }
            self.conflicts_since_decay = 0;
        }
    }

    /// Whether no literal of `literals` is satisfied and some atom could still be chosen.
    fn is_undecided(literals: &[Literal], context: &SelectionContext) -> bool {
        let mut has_open_atom = false;
        for &literal in literals {
            match context.truth(literal.atom()) {
                None => has_open_atom = true,
                Some(truth) if truth.to_boolean() != literal.is_positive() => return false,
                Some(ThriceTruth::MustBeTrue) => has_open_atom = true,
                Some(_) => {}
            }
        }
        has_open_atom
    }

    fn most_active_open_choice_atom(&self, literals: &[Literal], context: &SelectionContext) -> Option<Atom> {
        literals
            .iter()
            .map(|literal| literal.atom())
            .filter(|&atom| matches!(context.truth(atom), None | Some(ThriceTruth::MustBeTrue)))
            .filter(|&atom| context.is_active_choice_atom(atom))
            .max_by(|&a, &b| self.activity(a).total_cmp(&self.activity(b)))
    }

    fn choose_value(&mut self, atom: Atom) -> bool {
        let positive = self.sign_counter(Literal::positive(atom));
        let negative = self.sign_counter(Literal::negative(atom));
        if positive == negative {
            self.statistics.num_random_signs += 1;
            self.random_generator.gen_bool(0.5)
        } else {
            negative > positive
        }
    }
}

impl BranchingHeuristic for BerkMin {
    fn choose_literal(&mut self, context: &SelectionContext) -> Option<Literal> {
        let atom = self
            .stack
            .iter()
            .rev()
            .filter(|literals| BerkMin::is_undecided(literals, context))
            .find_map(|literals| self.most_active_open_choice_atom(literals, context))?;

        let value = self.choose_value(atom);
        let literal = context.literal(atom, value);
        if literal.is_positive() {
            self.statistics.num_choices_true += 1;
        } else {
            self.statistics.num_choices_false += 1;
        }
        Some(literal)
    }

    fn violated_nogood(&mut self, violated: &[Literal]) {
        self.push(violated);
    }

    fn analyzed_conflict(&mut self, analysis: &ConflictAnalysisResult) {
        for &atom in analysis.resolution_atoms.iter() {
            self.bump_activity(atom);
        }
        if let Some(learned_nogood) = &analysis.learned_nogood {
            self.push(learned_nogood.literals());
            self.count_signs(learned_nogood.literals());
            for &literal in learned_nogood.literals() {
                self.bump_activity(literal.atom());
            }
        }
        self.decay_if_time_has_come();
    }

    fn new_nogoods(&mut self, nogoods: &[NoGood]) {
        for nogood in nogoods {
            self.push(nogood.literals());
            self.count_signs(nogood.literals());
        }
    }

    fn grow_for_max_atom_id(&mut self, max_atom: Atom) {
        self.activities.accomodate(max_atom, 0.0);
        self.sign_counters.accomodate(Literal::negative(max_atom), 0);
    }

    fn reset(&mut self) {
        self.activities = KeyedVec::default();
        self.sign_counters = KeyedVec::default();
        self.stack.clear();
        self.conflicts_since_decay = 0;
    }

    fn log_statistics(&self, statistic_logger: StatisticLogger) {
        self.statistics.log(statistic_logger);
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;
    use crate::containers::HashMap;
    use crate::engine::choice::ChoiceManager;
    use crate::engine::choice::ChoicePoint;
    use crate::engine::TrailAssignment;
    use crate::grounder::ChoiceAtoms;

    fn atom(id: u32) -> Atom {
        Atom::new(id)
    }

    /// Atoms 2 to 5 are choice points, enabled by the true atom 0.
    fn setup() -> (ChoiceManager, TrailAssignment) {
        let mut assignment = TrailAssignment::default();
        assignment.grow_for_max_atom_id(atom(5));
        assignment
            .assign(atom(0), ThriceTruth::True, None)
            .expect("unassigned");
        let choice_atoms: ChoiceAtoms = (2..=5)
            .map(|id| ChoicePoint {
                atom: atom(id),
                enabler: atom(0),
                disabler: atom(1),
            })
            .collect();
        let mut choice_manager = ChoiceManager::default();
        choice_manager.add_choice_information(&choice_atoms, &HashMap::default(), &assignment);
        (choice_manager, assignment)
    }

    fn berkmin() -> BerkMin {
        BerkMin::new(SmallRng::seed_from_u64(42))
    }

    fn analysis(resolution_atoms: &[u32], learned: Option<&[Literal]>) -> ConflictAnalysisResult {
        ConflictAnalysisResult {
            learned_nogood: learned.map(|literals| NoGood::learnt(literals.iter().copied())),
            backjump_level: 0,
            resolution_atoms: resolution_atoms.iter().map(|&id| atom(id)).collect(),
            lbd: None,
        }
    }

    #[test]
    fn chooses_the_most_active_atom_of_the_latest_nogood() {
        let (choice_manager, assignment) = setup();
        let mut berkmin = berkmin();
        berkmin.new_nogoods(&[NoGood::new([Literal::positive(atom(2)), Literal::positive(atom(3))])]);

        berkmin.analyzed_conflict(&analysis(
            &[5],
            Some(&[Literal::positive(atom(4)), Literal::negative(atom(5))]),
        ));

        assert_eq!(berkmin.activity(atom(5)), 2.0);
        let literal = berkmin.choose_literal(&SelectionContext::new(&choice_manager, &assignment));
        assert_eq!(literal, Some(Literal::positive(atom(5))));
    }

    #[test]
    fn satisfied_nogoods_are_passed_over() {
        let (choice_manager, mut assignment) = setup();
        let mut berkmin = berkmin();
        berkmin.new_nogoods(&[NoGood::new([Literal::positive(atom(2)), Literal::positive(atom(3))])]);
        berkmin.analyzed_conflict(&analysis(
            &[2],
            Some(&[Literal::positive(atom(4)), Literal::negative(atom(5))]),
        ));

        assignment
            .assign(atom(4), ThriceTruth::False, None)
            .expect("unassigned");

        let literal = berkmin.choose_literal(&SelectionContext::new(&choice_manager, &assignment));
        assert_eq!(literal, Some(Literal::negative(atom(2))));
    }

    #[test]
    fn activities_decay_with_age() {
        let mut berkmin = BerkMin::with_decay(4, 0.5, SmallRng::seed_from_u64(42));
        for _ in 0..4 {
            berkmin.analyzed_conflict(&analysis(&[3], None));
        }

        assert_eq!(berkmin.activity(atom(3)), 2.0);
        assert_eq!(berkmin.activity(atom(2)), 0.0);
    }

    #[test]
    fn must_be_true_atoms_are_chosen_true() {
        let (choice_manager, mut assignment) = setup();
        let mut berkmin = berkmin();
        berkmin.new_nogoods(&[NoGood::new([Literal::positive(atom(2)), Literal::positive(atom(3))])]);
        berkmin.analyzed_conflict(&analysis(&[2], None));
        assignment
            .assign(atom(2), ThriceTruth::MustBeTrue, None)
            .expect("unassigned");

        let literal = berkmin.choose_literal(&SelectionContext::new(&choice_manager, &assignment));
        assert_eq!(literal, Some(Literal::positive(atom(2))));
    }

    #[test]
    fn nothing_is_proposed_without_undecided_nogoods() {
        let (choice_manager, assignment) = setup();
        let mut berkmin = berkmin();

        assert_eq!(
            berkmin.choose_literal(&SelectionContext::new(&choice_manager, &assignment)),
            None
        );
    }
}
