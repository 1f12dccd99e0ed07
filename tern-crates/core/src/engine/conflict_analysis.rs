//! Learning from conflicts by resolution over the trail.
use std::fmt::Display;

use log::trace;

use super::literal_block_distance::Lbd;
use crate::basic_types::Antecedent;
use crate::basic_types::Atom;
use crate::basic_types::ConflictCause;
use crate::basic_types::Literal;
use crate::basic_types::NoGood;
use crate::containers::HashSet;
use crate::engine::nogood_store::NoGoodStore;
use crate::engine::TrailAssignment;
use crate::tern_assert_simple;

/// The outcome of analysing a conflict.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConflictAnalysis {
    /// The conflict does not depend on any choice; there is no model.
    Unsatisfiable,
    Resolved(ConflictAnalysisResult),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConflictAnalysisResult {
    /// `None` if the analysis only determined where to backjump to.
    pub learned_nogood: Option<NoGood>,
    pub backjump_level: u32,
    /// The atoms met during resolution.
    pub resolution_atoms: Vec<Atom>,
    pub lbd: Option<u32>,
}

impl Display for ConflictAnalysisResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.learned_nogood {
            Some(nogood) => write!(f, "{nogood}@{}", self.backjump_level),
            None => write!(f, "backjump@{}", self.backjump_level),
        }
    }
}

/// Derives first-UIP nogoods from violated ground nogoods.
#[derive(Debug, Default)]
pub struct GroundConflictLearner {
    seen: HashSet<Atom>,
    processed: HashSet<Atom>,
    lbd: Lbd,
}

impl GroundConflictLearner {
    /// Resolves the violated nogood against the antecedents of the atoms assigned on the current
    /// decision level until a single literal of that level remains.
    ///
    /// Every stored nogood taking part in the resolution has its activity bumped.
    pub fn analyze_conflicting_nogood(
        &mut self,
        conflict: &ConflictCause,
        store: &mut NoGoodStore,
        assignment: &TrailAssignment,
    ) -> ConflictAnalysis {
        let current_level = assignment.decision_level();
        if current_level == 0 {
            return ConflictAnalysis::Unsatisfiable;
        }
        self.seen.clear();
        self.processed.clear();

        let violated: Vec<Literal> = conflict.reason_literals(store).to_vec();
        if let ConflictCause::Violated(antecedent) = conflict {
            bump(antecedent, store);
        }
        trace!("Analysing conflict of {violated:?} at level {current_level}");

        let mut resolution_literals: Vec<Literal> = Vec::new();
        let mut resolution_atoms: Vec<Atom> = Vec::new();
        let mut num_on_current_level = 0;
        let mut trail_position = assignment.trail().len();
        let mut reason = violated.clone();

        let uip = loop {
            for &literal in reason.iter() {
                let atom = literal.atom();
                if !self.seen.insert(atom) {
                    continue;
                }
                let level = weak_level(atom, assignment);
                if level == current_level {
                    num_on_current_level += 1;
                } else {
                    resolution_literals.push(literal);
                }
                resolution_atoms.push(atom);
            }

            if num_on_current_level == 0 {
                // Every literal was propagated out of order below the current level.
                return self.relearn_violated(violated, resolution_atoms, assignment);
            }

            let next_atom = loop {
                tern_assert_simple!(
                    trail_position > 0,
                    "walked past the start of the trail without finding the first UIP"
                );
                trail_position -= 1;
                let atom = assignment.trail()[trail_position];
                if weak_level(atom, assignment) == current_level
                    && self.seen.contains(&atom)
                    && !self.processed.contains(&atom)
                {
                    break atom;
                }
            };
            let _ = self.processed.insert(next_atom);

            if num_on_current_level == 1 {
                break next_atom;
            }
            num_on_current_level -= 1;

            reason = match assignment.implied_by(next_atom) {
                Some(antecedent) => {
                    bump(&antecedent, store);
                    antecedent.reason_literals(store).to_vec()
                }
                None => Vec::new(),
            };
        };

        let uip_literal = assignment
            .literal_of(uip)
            .expect("the first UIP is assigned");
        resolution_literals.push(uip_literal);
        let learned_nogood = NoGood::learnt(resolution_literals);
        trace!("Learned {learned_nogood} with first UIP {uip_literal}");

        let backjump_level = match self.asserting_backjump_level(&learned_nogood, assignment) {
            Some(level) => level,
            // Out-of-order literals may keep the learned nogood from being asserting.
            None => match self.compute_conflict_free_backjumping_level(&learned_nogood, assignment)
            {
                Some(level) => level,
                None => return ConflictAnalysis::Unsatisfiable,
            },
        };
        let lbd = self.lbd.compute_lbd(learned_nogood.literals(), assignment);

        ConflictAnalysis::Resolved(ConflictAnalysisResult {
            learned_nogood: Some(learned_nogood),
            backjump_level,
            resolution_atoms,
            lbd: Some(lbd),
        })
    }

    /// Computes a backjump level for a nogood that was violated when it was added; nothing is
    /// learned.
    pub fn analyze_conflict_from_adding_nogood(
        &self,
        conflict: &ConflictCause,
        store: &NoGoodStore,
        assignment: &TrailAssignment,
    ) -> ConflictAnalysis {
        let highest_level = conflict
            .reason_literals(store)
            .iter()
            .filter_map(|literal| assignment.weak_decision_level(literal.atom()))
            .max()
            .unwrap_or(0);
        if highest_level == 0 {
            return ConflictAnalysis::Unsatisfiable;
        }
        ConflictAnalysis::Resolved(ConflictAnalysisResult {
            learned_nogood: None,
            backjump_level: highest_level - 1,
            resolution_atoms: Vec::new(),
            lbd: None,
        })
    }

    /// The highest level at which the violated `nogood` is not violated anymore; `None` if it is
    /// violated at level zero.
    ///
    /// Levels are taken from [`TrailAssignment::real_weak_decision_level`], since an atom may be
    /// known at a lower level than the one it has been placed at.
    pub fn compute_conflict_free_backjumping_level(
        &self,
        nogood: &NoGood,
        assignment: &TrailAssignment,
    ) -> Option<u32> {
        let levels = nogood
            .literals()
            .iter()
            .map(|literal| assignment.real_weak_decision_level(literal.atom()).unwrap_or(0));
        let (highest, num_on_highest, second_highest) = highest_levels(levels)?;
        if highest == 0 {
            return None;
        }
        if num_on_highest == 1 {
            return Some(second_highest.unwrap_or(0));
        }
        Some(highest - 1)
    }

    /// The second highest level of the learned nogood, if exactly one of its literals is on the
    /// highest level.
    fn asserting_backjump_level(&self, learned: &NoGood, assignment: &TrailAssignment) -> Option<u32> {
        let level_of = |literal: &Literal| {
            let atom = literal.atom();
            let weak = weak_level(atom, assignment);
            assignment
                .out_of_order_decision_level(atom)
                .map_or(weak, |out_of_order| out_of_order.min(weak))
        };
        if learned.is_unary() {
            return Some(level_of(&learned.literal(0)).saturating_sub(1));
        }
        let (_, num_on_highest, second_highest) =
            highest_levels(learned.literals().iter().map(level_of))?;
        if num_on_highest != 1 {
            return None;
        }
        Some(second_highest.unwrap_or(0))
    }

    fn relearn_violated(
        &mut self,
        violated: Vec<Literal>,
        resolution_atoms: Vec<Atom>,
        assignment: &TrailAssignment,
    ) -> ConflictAnalysis {
        let learned_nogood = NoGood::learnt(violated);
        let Some(backjump_level) =
            self.compute_conflict_free_backjumping_level(&learned_nogood, assignment)
        else {
            return ConflictAnalysis::Unsatisfiable;
        };
        let lbd = self.lbd.compute_lbd(learned_nogood.literals(), assignment);
        ConflictAnalysis::Resolved(ConflictAnalysisResult {
            learned_nogood: Some(learned_nogood),
            backjump_level,
            resolution_atoms,
            lbd: Some(lbd),
        })
    }
}

fn bump(antecedent: &Antecedent, store: &mut NoGoodStore) {
    if let Antecedent::Watched(id) = antecedent {
        store.bump_activity(*id);
    }
}

fn weak_level(atom: Atom, assignment: &TrailAssignment) -> u32 {
    assignment
        .weak_decision_level(atom)
        .expect("atoms of a violated nogood are assigned")
}

/// The highest level, how often it occurs and the second highest level.
fn highest_levels(levels: impl Iterator<Item = u32>) -> Option<(u32, usize, Option<u32>)> {
    let mut highest: Option<u32> = None;
    let mut num_on_highest = 0;
    let mut second_highest: Option<u32> = None;
    for level in levels {
        match highest {
            Some(current) if level == current => num_on_highest += 1,
            Some(current) if level < current => {
                if second_highest.map_or(true, |second| level > second) {
                    second_highest = Some(level);
                }
            }
            _ => {
                second_highest = highest;
                highest = Some(level);
                num_on_highest = 1;
            }
        }
    }
    highest.map(|highest| (highest, num_on_highest, second_highest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_types::test_helpers::lit;
    use crate::basic_types::test_helpers::nogood;
    use crate::basic_types::ThriceTruth;

    fn atom(id: u32) -> Atom {
        Atom::new(id)
    }

    fn setup(max_atom: u32) -> (NoGoodStore, TrailAssignment) {
        let mut store = NoGoodStore::default();
        let mut assignment = TrailAssignment::default();
        store.grow_for_max_atom_id(atom(max_atom));
        assignment.grow_for_max_atom_id(atom(max_atom));
        (store, assignment)
    }

    fn resolved(analysis: ConflictAnalysis) -> ConflictAnalysisResult {
        match analysis {
            ConflictAnalysis::Resolved(result) => result,
            ConflictAnalysis::Unsatisfiable => panic!("expected a resolved conflict"),
        }
    }

    #[test]
    fn conflict_at_level_zero_is_unsatisfiable() {
        let (mut store, assignment) = setup(2);
        let conflict = ConflictCause::Addition(nogood(&[1, 2]));

        let analysis =
            GroundConflictLearner::default().analyze_conflicting_nogood(&conflict, &mut store, &assignment);

        assert_eq!(analysis, ConflictAnalysis::Unsatisfiable);
    }

    #[test]
    fn learns_the_first_uip() {
        let (mut store, mut assignment) = setup(6);
        for signed in [[1, -4], [2, -5], [5, 6]] {
            store
                .add(&nogood(&signed), &mut assignment)
                .expect("consistent");
        }
        store
            .add(&nogood(&[4, 5, -6]), &mut assignment)
            .expect("consistent");

        // Choosing 1 makes 4 must-be-true on level 1.
        assignment.choose(atom(1), true).expect("unassigned");
        store.propagate(&mut assignment).expect("no conflict yet");
        assert_eq!(assignment.truth(atom(4)), Some(ThriceTruth::MustBeTrue));

        // Choosing 2 makes 5 must-be-true, which forces 6 both false and must-be-true.
        assignment.choose(atom(2), true).expect("unassigned");
        let conflict = store
            .propagate(&mut assignment)
            .expect_err("6 cannot be false and must-be-true");

        let result = resolved(GroundConflictLearner::default().analyze_conflicting_nogood(
            &conflict,
            &mut store,
            &assignment,
        ));

        assert_eq!(result.learned_nogood, Some(NoGood::learnt([lit(4), lit(5)])));
        assert_eq!(result.backjump_level, 1);
        assert_eq!(result.lbd, Some(2));
        assert!(result.resolution_atoms.contains(&atom(6)));
    }

    #[test]
    fn conflict_from_adding_backjumps_below_the_highest_level() {
        let (store, mut assignment) = setup(3);
        assignment.choose(atom(1), true).expect("unassigned");
        assignment.choose(atom(2), true).expect("unassigned");

        let conflict = ConflictCause::Addition(nogood(&[1, 2]));
        let result = resolved(GroundConflictLearner::default().analyze_conflict_from_adding_nogood(
            &conflict,
            &store,
            &assignment,
        ));

        assert_eq!(result.learned_nogood, None);
        assert_eq!(result.backjump_level, 1);
    }

    #[test]
    fn conflict_free_level_of_an_asserting_nogood() {
        let (_, mut assignment) = setup(4);
        assignment.choose(atom(1), true).expect("unassigned");
        assignment.choose(atom(2), true).expect("unassigned");
        assignment.choose(atom(3), true).expect("unassigned");
        let learner = GroundConflictLearner::default();

        assert_eq!(
            learner.compute_conflict_free_backjumping_level(&nogood(&[1, 3]), &assignment),
            Some(1)
        );
        assignment
            .assign(atom(4), ThriceTruth::True, None)
            .expect("unassigned");
        assert_eq!(
            learner.compute_conflict_free_backjumping_level(&nogood(&[3, 4]), &assignment),
            Some(2)
        );
    }

    #[test]
    fn conflict_free_level_at_level_zero_does_not_exist() {
        let (_, mut assignment) = setup(2);
        assignment
            .assign(atom(1), ThriceTruth::True, None)
            .expect("unassigned");

        let learner = GroundConflictLearner::default();
        assert_eq!(
            learner.compute_conflict_free_backjumping_level(&nogood(&[1]), &assignment),
            None
        );
    }

    #[test]
    fn highest_levels_counts_ties() {
        assert_eq!(highest_levels([1, 3, 3, 2].into_iter()), Some((3, 2, Some(2))));
        assert_eq!(highest_levels([4].into_iter()), Some((4, 1, None)));
        assert_eq!(highest_levels(std::iter::empty()), None);
    }
}
