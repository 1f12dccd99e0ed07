use log::debug;

use super::Choice;
use super::ChoiceInfluenceManager;
use crate::basic_types::Atom;
use crate::basic_types::NoGood;
use crate::containers::HashMap;
use crate::containers::HashSet;
use crate::engine::assignment::Entry;
use crate::engine::nogood_store::NoGoodStore;
use crate::engine::TrailAssignment;
use crate::grounder::ChoiceAtoms;
use crate::tern_assert_simple;

/// Keeps the stack of choices in sync with the decision levels of the assignment, and knows
/// which atoms may be chosen.
///
/// Every decision level above zero was opened by exactly one choice, so the size of the stack
/// always equals the decision level.
#[derive(Debug, Default)]
pub struct ChoiceManager {
    choice_stack: Vec<Choice>,
    influence_manager: ChoiceInfluenceManager,
    heads_to_bodies: HashMap<Atom, HashSet<Atom>>,
    bodies_to_heads: HashMap<Atom, Atom>,

    num_choices: u64,
    num_backtracks: u64,
    num_backtracks_within_backjumps: u64,
    num_backjumps: u64,
}

impl ChoiceManager {
    /// Opens a new decision level with `choice`.
    ///
    /// # Panics
    /// If the choice contradicts the assignment; only active choice points may be chosen.
    pub fn choose(&mut self, choice: Choice, assignment: &mut TrailAssignment) {
        if !choice.is_backtracked() {
            self.num_choices += 1;
        }
        if let Err(conflict) = assignment.choose(choice.atom(), choice.value()) {
            panic!("choice {choice} is incompatible with the assignment: {conflict:?}");
        }
        debug!(
            "Choice {} is {choice}@{}",
            self.num_choices,
            assignment.decision_level()
        );
        self.choice_stack.push(choice);
        tern_assert_simple!(self.choice_stack.len() == assignment.decision_level() as usize);
    }

    /// Makes `choice` again if its atom is still an active choice point. Returns whether it
    /// was made.
    pub fn replay_choice(&mut self, choice: Choice, assignment: &mut TrailAssignment) -> bool {
        self.update_assignments(assignment);
        if !self.is_active_choice_atom(choice.atom()) {
            debug!("Not replaying {choice}, its atom is no active choice point");
            return false;
        }
        self.choose(choice, assignment);
        true
    }

    /// Undoes every decision level above `target`.
    pub fn backjump(
        &mut self,
        target: u32,
        store: &NoGoodStore,
        assignment: &mut TrailAssignment,
    ) {
        debug!("Backjumping to decision level {target}");
        self.num_backjumps += 1;
        while assignment.decision_level() > target {
            let choice = self.pop_choice();
            store.backtrack(assignment);
            self.num_backtracks += 1;
            self.num_backtracks_within_backjumps += 1;
            debug!("Backjumping removed choice {choice}");
        }
    }

    /// Undoes the most recent choice.
    pub fn backtrack_fast(&mut self, store: &NoGoodStore, assignment: &mut TrailAssignment) {
        let choice = self.pop_choice();
        store.backtrack(assignment);
        self.num_backtracks += 1;
        debug!(
            "Backtracked (fast) to level {} from choice {choice}",
            assignment.decision_level()
        );
    }

    /// Undoes the most recent choice and reports the choice together with the entry its atom
    /// had just before. The entry is `None` if the choice was an inverted one, since its atom
    /// has been explored with both values then.
    pub fn backtrack_slow(
        &mut self,
        store: &NoGoodStore,
        assignment: &mut TrailAssignment,
    ) -> (Choice, Option<Entry>) {
        let choice = self.pop_choice();
        let entry = assignment.get(choice.atom());
        store.backtrack(assignment);
        self.num_backtracks += 1;
        debug!(
            "Backtracked (slow) to level {} from choice {choice}",
            assignment.decision_level()
        );
        (choice, entry.filter(|_| !choice.is_backtracked()))
    }

    /// The nogood forbidding the current combination of choices; adding it rules out the model
    /// these choices led to.
    pub fn compute_enumeration(&self) -> NoGood {
        NoGood::internal(self.choice_stack.iter().map(Choice::literal))
    }

    /// Registers choice points and head-to-body relations reported by the grounder.
    pub fn add_choice_information(
        &mut self,
        choice_atoms: &ChoiceAtoms,
        heads_to_bodies: &HashMap<Atom, HashSet<Atom>>,
        assignment: &TrailAssignment,
    ) {
        self.influence_manager
            .add_information(choice_atoms, assignment);
        for (&head, bodies) in heads_to_bodies.iter() {
            self.heads_to_bodies
                .entry(head)
                .or_default()
                .extend(bodies.iter().copied());
            for &body in bodies.iter() {
                let _ = self.bodies_to_heads.insert(body, head);
            }
        }
    }

    /// Brings the activity of the choice points up to date with the assignment.
    pub fn update_assignments(&mut self, assignment: &mut TrailAssignment) {
        let changed = assignment.drain_changed_atoms();
        self.influence_manager.update(changed, assignment);
    }

    pub fn is_active_choice_atom(&self, atom: Atom) -> bool {
        self.influence_manager.is_active(atom)
    }

    pub fn next_active_choice_atom(&self) -> Option<Atom> {
        self.influence_manager.next_active_atom()
    }

    pub fn active_choice_atoms(&self) -> impl Iterator<Item = Atom> + '_ {
        self.influence_manager.active_atoms()
    }

    pub fn num_active_choice_atoms(&self) -> usize {
        self.influence_manager.num_active()
    }

    pub fn is_atom_choice(&self, atom: Atom) -> bool {
        self.influence_manager.is_choice_atom(atom)
    }

    /// The head derived by the rule body that `choice_atom` represents.
    pub fn head_derived_by_choice_atom(&self, choice_atom: Atom) -> Option<Atom> {
        self.bodies_to_heads.get(&choice_atom).copied()
    }

    pub fn bodies_of_head(&self, head: Atom) -> impl Iterator<Item = Atom> + '_ {
        self.heads_to_bodies.get(&head).into_iter().flatten().copied()
    }

    /// Choice atoms that became active since the last call.
    pub fn drain_activated_choice_atoms(&mut self) -> Vec<Atom> {
        self.influence_manager.drain_newly_activated()
    }

    pub fn choices(&self) -> &[Choice] {
        &self.choice_stack
    }

    pub fn num_choices(&self) -> u64 {
        self.num_choices
    }

    pub fn num_backtracks(&self) -> u64 {
        self.num_backtracks
    }

    pub fn num_backtracks_within_backjumps(&self) -> u64 {
        self.num_backtracks_within_backjumps
    }

    pub fn num_backjumps(&self) -> u64 {
        self.num_backjumps
    }

    /// Forgets the choices and choice points; the counters are kept.
    pub fn clear(&mut self) {
        self.choice_stack.clear();
        self.influence_manager.clear();
        self.heads_to_bodies.clear();
        self.bodies_to_heads.clear();
    }

    fn pop_choice(&mut self) -> Choice {
        self.choice_stack
            .pop()
            .expect("there is a choice to undo")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_types::Literal;
    use crate::basic_types::ThriceTruth;
    use crate::engine::choice::ChoicePoint;

    fn atom(id: u32) -> Atom {
        Atom::new(id)
    }

    /// Atoms 1 and 2 are choice points enabled by the fact 0 and disabled by 3 and 4.
    fn setup() -> (ChoiceManager, NoGoodStore, TrailAssignment) {
        let mut store = NoGoodStore::default();
        let mut assignment = TrailAssignment::default();
        assignment.grow_for_max_atom_id(atom(4));
        store.grow_for_max_atom_id(atom(4));
        store
            .add(&NoGood::fact(atom(0)), &mut assignment)
            .expect("a fact on a fresh atom is consistent");
        store
            .propagate(&mut assignment)
            .expect("nothing to propagate against");

        let mut choice_atoms = ChoiceAtoms::default();
        for (choice, disabler) in [(1, 3), (2, 4)] {
            choice_atoms.push(ChoicePoint {
                atom: atom(choice),
                enabler: atom(0),
                disabler: atom(disabler),
            });
        }
        let mut manager = ChoiceManager::default();
        manager.add_choice_information(&choice_atoms, &HashMap::default(), &assignment);
        manager.update_assignments(&mut assignment);
        (manager, store, assignment)
    }

    #[test]
    fn choices_open_decision_levels() {
        let (mut manager, _, mut assignment) = setup();
        assert!(manager.is_active_choice_atom(atom(1)));
        assert_eq!(manager.num_active_choice_atoms(), 2);

        manager.choose(Choice::new(atom(1), true, false), &mut assignment);
        manager.choose(Choice::new(atom(2), false, false), &mut assignment);

        assert_eq!(assignment.decision_level(), 2);
        assert_eq!(manager.choices().len(), 2);
        assert_eq!(manager.num_choices(), 2);

        manager.update_assignments(&mut assignment);
        assert_eq!(manager.num_active_choice_atoms(), 0);
        assert_eq!(manager.next_active_choice_atom(), None);
    }

    #[test]
    fn inverted_choices_are_not_counted() {
        let (mut manager, _, mut assignment) = setup();
        manager.choose(Choice::new(atom(1), false, true), &mut assignment);

        assert_eq!(manager.num_choices(), 0);
    }

    #[test]
    fn enumeration_nogood_consists_of_the_choices() {
        let (mut manager, _, mut assignment) = setup();
        manager.choose(Choice::new(atom(1), true, false), &mut assignment);
        manager.choose(Choice::new(atom(2), false, false), &mut assignment);

        let enumeration = manager.compute_enumeration();
        assert_eq!(
            enumeration.literals(),
            &[Literal::positive(atom(1)), Literal::negative(atom(2))]
        );
    }

    #[test]
    fn backjump_counts_every_removed_level() {
        let (mut manager, store, mut assignment) = setup();
        manager.choose(Choice::new(atom(1), true, false), &mut assignment);
        manager.choose(Choice::new(atom(2), true, false), &mut assignment);

        manager.backjump(0, &store, &mut assignment);

        assert_eq!(assignment.decision_level(), 0);
        assert!(manager.choices().is_empty());
        assert_eq!(manager.num_backjumps(), 1);
        assert_eq!(manager.num_backtracks(), 2);
        assert_eq!(manager.num_backtracks_within_backjumps(), 2);
        assert!(!assignment.is_assigned(atom(1)));
    }

    #[test]
    fn slow_backtrack_exposes_the_undone_entry() {
        let (mut manager, store, mut assignment) = setup();
        manager.choose(Choice::new(atom(1), true, false), &mut assignment);

        let (choice, entry) = manager.backtrack_slow(&store, &mut assignment);

        assert_eq!(choice.atom(), atom(1));
        let entry = entry.expect("a fresh choice exposes its entry");
        assert_eq!(entry.truth, ThriceTruth::True);
        assert_eq!(entry.weak_decision_level, 1);
        assert_eq!(assignment.decision_level(), 0);
    }

    #[test]
    fn slow_backtrack_of_an_inverted_choice_exposes_nothing() {
        let (mut manager, store, mut assignment) = setup();
        manager.choose(Choice::new(atom(1), false, true), &mut assignment);

        let (_, entry) = manager.backtrack_slow(&store, &mut assignment);

        assert!(entry.is_none());
    }

    #[test]
    fn replaying_an_inactive_choice_is_skipped() {
        let (mut manager, _, mut assignment) = setup();
        manager.choose(Choice::new(atom(1), true, false), &mut assignment);

        assert!(!manager.replay_choice(Choice::new(atom(1), true, false), &mut assignment));
        assert!(manager.replay_choice(Choice::new(atom(2), true, false), &mut assignment));
        assert_eq!(assignment.decision_level(), 2);
    }

    #[test]
    fn heads_and_bodies_are_related_both_ways() {
        let (mut manager, _, assignment) = setup();
        let mut heads_to_bodies: HashMap<Atom, HashSet<Atom>> = HashMap::default();
        let _ = heads_to_bodies
            .entry(atom(3))
            .or_default()
            .insert(atom(1));
        manager.add_choice_information(&ChoiceAtoms::default(), &heads_to_bodies, &assignment);

        assert_eq!(manager.head_derived_by_choice_atom(atom(1)), Some(atom(3)));
        assert_eq!(manager.bodies_of_head(atom(3)).collect::<Vec<_>>(), vec![atom(1)]);
        assert!(manager.is_atom_choice(atom(1)));
        assert!(!manager.is_atom_choice(atom(3)));
    }

    #[test]
    #[should_panic]
    fn choosing_against_the_assignment_panics() {
        let (mut manager, _, mut assignment) = setup();
        manager.choose(Choice::new(atom(0), false, false), &mut assignment);
    }
}
