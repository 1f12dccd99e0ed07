use log::debug;
use log::trace;

use super::AnswerSet;
use super::AtomStore;
use super::ChoiceAtoms;
use super::Grounder;
use super::NoGoodId;
use crate::basic_types::Atom;
use crate::basic_types::Literal;
use crate::basic_types::NoGood;
use crate::basic_types::RebootError;
use crate::basic_types::ThriceTruth;
use crate::containers::HashMap;
use crate::containers::HashSet;
use crate::containers::KeyGenerator;
use crate::engine::choice::ChoicePoint;
use crate::engine::TrailAssignment;
use crate::tern_assert_simple;

/// A grounder for programs that are propositional already.
///
/// Atoms are named by strings; names starting with `_` are reserved for the hidden atoms the
/// grounder introduces itself, which never show up in answer sets. A rule `h :- p, not n` is
/// translated the usual way: a hidden atom `b` represents the body, the nogood
/// `*{ -b +p -n }` derives it, `*{ -h +b }` derives the head, and `b` implies each body literal.
/// If the body has negated atoms, `b` becomes a choice point that is enabled once the positive
/// part holds and disabled as soon as a negated atom is true or must-be-true.
///
/// Every atom derived by rules only may be true if one of its bodies is; the corresponding
/// support nogoods are created once the search asks for nogoods the first time, so all rules
/// have to be added before that.
#[derive(Debug, Default)]
pub struct PropositionalGrounder {
    atom_store: AtomStore<String>,
    hidden_atoms: HashSet<Atom>,

    program: Vec<(NoGoodId, NoGood)>,
    registered: HashMap<NoGood, NoGoodId>,
    nogood_ids: KeyGenerator<NoGoodId>,
    num_handed_out: usize,

    choice_points: Vec<ChoicePoint>,
    num_choice_points_handed_out: usize,
    heads_to_bodies: HashMap<Atom, HashSet<Atom>>,
    heads_to_bodies_handed_out: bool,

    /// For every head, the atoms representing the bodies of its rules.
    rule_bodies: HashMap<Atom, Vec<Atom>>,
    /// Atoms that hold without needing a rule body: facts and guessed atoms.
    unconditional_atoms: HashSet<Atom>,
    /// For every atom, the literals of each way to derive it.
    supports: HashMap<Atom, Vec<Vec<Literal>>>,
    /// Atoms derived by nogoods added directly, so their supports are unknown.
    unexplained_atoms: HashSet<Atom>,
    supports_added: bool,

    true_atom: Option<Atom>,
    false_atom: Option<Atom>,
}

impl PropositionalGrounder {
    /// The atom called `name`, creating it if needed.
    pub fn new_atom(&mut self, name: &str) -> Atom {
        tern_assert_simple!(
            !name.starts_with('_'),
            "atom names starting with '_' are reserved"
        );
        self.atom_store.put_if_absent(name.to_owned())
    }

    /// A fresh atom that is left out of answer sets.
    pub fn new_hidden_atom(&mut self, prefix: &str) -> Atom {
        let name = format!("_{prefix}{}", self.atom_store.len());
        let atom = self.atom_store.put_if_absent(name);
        let _ = self.hidden_atoms.insert(atom);
        atom
    }

    /// Adds a nogood over existing atoms. A head it derives counts as unexplained, so it is
    /// never justified.
    pub fn add_nogood(&mut self, nogood: NoGood) -> NoGoodId {
        if let Some(head) = nogood.head() {
            let _ = self.unexplained_atoms.insert(head.atom());
        }
        self.push_nogood(nogood)
    }

    /// Makes the atom called `name` true.
    pub fn add_fact(&mut self, name: &str) -> Atom {
        let atom = self.new_atom(name);
        let _ = self.unconditional_atoms.insert(atom);
        let _ = self.push_nogood(NoGood::fact(atom));
        atom
    }

    /// Forbids that all atoms in `pos` are true while all atoms in `neg` are false.
    pub fn add_constraint(&mut self, pos: &[&str], neg: &[&str]) -> NoGoodId {
        let pos = self.atoms(pos);
        let neg = self.atoms(neg);
        self.push_nogood(NoGood::from_constraint(&pos, &neg))
    }

    /// Lets the search guess the atom called `name` freely.
    pub fn add_choice_atom(&mut self, name: &str) -> Atom {
        let atom = self.new_atom(name);
        let _ = self.unconditional_atoms.insert(atom);
        let enabler = self.true_atom();
        let disabler = self.false_atom();
        self.choice_points.push(ChoicePoint {
            atom,
            enabler,
            disabler,
        });
        atom
    }

    /// Records that `atom` can be derived whenever all `body` literals hold.
    pub fn add_support(&mut self, atom: Atom, body: Vec<Literal>) {
        self.supports.entry(atom).or_default().push(body);
    }

    /// Adds the rule `head :- pos, not neg` and returns the atom representing its body.
    ///
    /// # Panics
    /// If the search has asked for nogoods already.
    pub fn add_rule(&mut self, head: &str, pos: &[&str], neg: &[&str]) -> Atom {
        tern_assert_simple!(
            !self.supports_added,
            "rules have to be added before solving starts"
        );
        let head = self.new_atom(head);
        let pos = self.atoms(pos);
        let neg = self.atoms(neg);
        let body = self.new_hidden_atom("body");

        let _ = self.push_nogood(NoGood::from_body(&pos, &neg, body));
        for &atom in pos.iter() {
            let _ = self.push_nogood(NoGood::new([
                Literal::positive(body),
                Literal::negative(atom),
            ]));
        }
        for &atom in neg.iter() {
            let _ = self.push_nogood(NoGood::new([
                Literal::positive(body),
                Literal::positive(atom),
            ]));
        }
        let _ = self.push_nogood(NoGood::derivation(head, body));

        let body_literals = pos
            .iter()
            .map(|&atom| Literal::positive(atom))
            .chain(neg.iter().map(|&atom| Literal::negative(atom)))
            .collect();
        self.add_support(body, body_literals);
        self.add_support(head, vec![Literal::positive(body)]);
        self.rule_bodies.entry(head).or_default().push(body);

        if !neg.is_empty() {
            self.add_body_choice_point(body, &pos, &neg);
            let _ = self.heads_to_bodies.entry(head).or_default().insert(body);
        }
        body
    }

    fn add_body_choice_point(&mut self, body: Atom, pos: &[Atom], neg: &[Atom]) {
        let enabler = if pos.is_empty() {
            self.true_atom()
        } else {
            let enabler = self.new_hidden_atom("enabler");
            let _ = self.push_nogood(NoGood::from_body(pos, &[], enabler));
            self.add_support(enabler, pos.iter().map(|&atom| Literal::positive(atom)).collect());
            enabler
        };

        let disabler = self.new_hidden_atom("disabler");
        for &atom in neg.iter() {
            let _ = self.push_nogood(NoGood::derivation(disabler, atom));
            self.add_support(disabler, vec![Literal::positive(atom)]);
        }

        trace!("Body {body} is a choice point");
        self.choice_points.push(ChoicePoint {
            atom: body,
            enabler,
            disabler,
        });
    }

    fn atoms(&mut self, names: &[&str]) -> Vec<Atom> {
        names.iter().map(|name| self.new_atom(name)).collect()
    }

    /// A hidden fact.
    fn true_atom(&mut self) -> Atom {
        if let Some(atom) = self.true_atom {
            return atom;
        }
        let atom = self.new_hidden_atom("true");
        let _ = self.unconditional_atoms.insert(atom);
        let _ = self.push_nogood(NoGood::fact(atom));
        self.true_atom = Some(atom);
        atom
    }

    /// A hidden atom nothing derives.
    fn false_atom(&mut self) -> Atom {
        if let Some(atom) = self.false_atom {
            return atom;
        }
        let atom = self.new_hidden_atom("false");
        self.false_atom = Some(atom);
        atom
    }

    fn push_nogood(&mut self, nogood: NoGood) -> NoGoodId {
        if let Some(&id) = self.registered.get(&nogood) {
            return id;
        }
        let id = self.register(&nogood);
        self.program.push((id, nogood));
        id
    }

    fn add_support_nogoods(&mut self) {
        self.supports_added = true;
        let mut heads: Vec<Atom> = self.rule_bodies.keys().copied().collect();
        heads.sort();
        for head in heads {
            if self.unconditional_atoms.contains(&head) {
                continue;
            }
            let nogood = NoGood::support(head, &self.rule_bodies[&head]);
            let _ = self.push_nogood(nogood);
        }
    }
}

impl Grounder for PropositionalGrounder {
    type Atom = String;

    fn atom_store(&self) -> &AtomStore<String> {
        &self.atom_store
    }

    fn atom_store_mut(&mut self) -> &mut AtomStore<String> {
        &mut self.atom_store
    }

    fn get_nogoods(&mut self, _assignment: &TrailAssignment) -> Vec<(NoGoodId, NoGood)> {
        if !self.supports_added {
            self.add_support_nogoods();
        }
        let new_nogoods = self.program[self.num_handed_out..].to_vec();
        self.num_handed_out = self.program.len();
        trace!("Handing out {} nogoods", new_nogoods.len());
        new_nogoods
    }

    fn update_assignment(&mut self, new_positive_atoms: &[Atom]) {
        // Every nogood is known upfront, so new truths never unlock further ones.
        trace!("{} atoms became true", new_positive_atoms.len());
    }

    fn register(&mut self, nogood: &NoGood) -> NoGoodId {
        if let Some(&id) = self.registered.get(nogood) {
            return id;
        }
        let id = self.nogood_ids.next_key();
        let _ = self.registered.insert(nogood.clone(), id);
        id
    }

    fn get_choice_atoms(&mut self) -> ChoiceAtoms {
        let new_points = self.choice_points[self.num_choice_points_handed_out..]
            .iter()
            .copied()
            .collect();
        self.num_choice_points_handed_out = self.choice_points.len();
        new_points
    }

    fn get_heads_to_bodies(&mut self) -> HashMap<Atom, HashSet<Atom>> {
        if std::mem::replace(&mut self.heads_to_bodies_handed_out, true) {
            HashMap::default()
        } else {
            self.heads_to_bodies.clone()
        }
    }

    fn assignment_to_answer_set(
        &self,
        true_atoms: impl IntoIterator<Item = Atom>,
    ) -> AnswerSet<String> {
        AnswerSet::new(
            true_atoms
                .into_iter()
                .filter(|atom| !self.hidden_atoms.contains(atom))
                .filter_map(|atom| self.atom_store.get(atom).cloned()),
        )
    }

    /// Explains why `atom` cannot be derived by growing an unfounded set around it.
    ///
    /// Every body of an atom in the set is blocked, either by a literal whose negation holds, which
    /// becomes one of the reasons, or by a positive literal over an atom of the set. A body that is
    /// neither pulls one of its positive atoms into the set, as long as that atom is not true and
    /// has rules only. Given the reasons, no atom of the set can be derived, so `atom` is false.
    fn justify_atom(&self, atom: Atom, assignment: &TrailAssignment) -> Option<Vec<Literal>> {
        let is_explainable =
            |atom: &Atom| !self.unexplained_atoms.contains(atom) && !self.unconditional_atoms.contains(atom);
        if !is_explainable(&atom) {
            return None;
        }

        let mut unfounded: HashSet<Atom> = HashSet::default();
        let _ = unfounded.insert(atom);
        let mut to_explain = vec![atom];
        let mut reasons = Vec::new();

        while let Some(next) = to_explain.pop() {
            for body in self.supports.get(&next).into_iter().flatten() {
                let depends_on_unfounded = body
                    .iter()
                    .any(|literal| literal.is_positive() && unfounded.contains(&literal.atom()));
                if depends_on_unfounded {
                    continue;
                }

                let blocking = body
                    .iter()
                    .map(|&literal| literal.negated())
                    .find(|&negation| assignment.is_violated(negation));
                if let Some(blocking) = blocking {
                    if !reasons.contains(&blocking) {
                        reasons.push(blocking);
                    }
                    continue;
                }

                let dependency = body
                    .iter()
                    .filter(|literal| literal.is_positive())
                    .map(|literal| literal.atom())
                    .find(|dependency| {
                        assignment.truth(*dependency) != Some(ThriceTruth::True)
                            && is_explainable(dependency)
                    })?;
                trace!(
                    "{} joins the unfounded set of {}",
                    self.atom_store.atom_to_string(dependency),
                    self.atom_store.atom_to_string(atom)
                );
                let _ = unfounded.insert(dependency);
                to_explain.push(dependency);
            }
        }

        debug!(
            "Justified {} over {} unfounded atoms by {}",
            self.atom_store.atom_to_string(atom),
            unfounded.len(),
            reasons
                .iter()
                .map(|&literal| self.atom_store.literal_to_string(literal))
                .collect::<Vec<_>>()
                .join(" ")
        );
        Some(reasons)
    }

    fn is_rebootable(&self) -> bool {
        true
    }

    fn reboot(&mut self) -> Result<(), RebootError> {
        let names: Vec<String> = self
            .atom_store
            .max_atom_id()
            .map(|max_atom| {
                (0..=max_atom.id())
                    .map(|id| self.atom_store.atom_to_string(Atom::new(id)))
                    .collect()
            })
            .unwrap_or_default();
        self.atom_store.reset();
        for name in names {
            let _ = self.atom_store.put_if_absent(name);
        }
        self.num_handed_out = 0;
        self.num_choice_points_handed_out = 0;
        self.heads_to_bodies_handed_out = false;
        debug!("Rebooted the grounder with {} atoms", self.atom_store.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nogoods_are_handed_out_once() {
        let mut grounder = PropositionalGrounder::default();
        let _ = grounder.add_fact("a");
        let assignment = TrailAssignment::default();

        assert_eq!(grounder.get_nogoods(&assignment).len(), 1);
        assert!(grounder.get_nogoods(&assignment).is_empty());

        let _ = grounder.add_constraint(&["a"], &[]);
        assert_eq!(grounder.get_nogoods(&assignment).len(), 1);
    }

    #[test]
    fn registering_is_deduplicated() {
        let mut grounder = PropositionalGrounder::default();
        let a = grounder.new_atom("a");
        let nogood = NoGood::learnt([Literal::positive(a)]);

        let id = grounder.register(&nogood);
        assert_eq!(grounder.register(&nogood), id);
        assert_ne!(grounder.register(&NoGood::learnt([Literal::negative(a)])), id);
    }

    #[test]
    fn rule_with_negation_creates_a_choice_point() {
        let mut grounder = PropositionalGrounder::default();
        let body = grounder.add_rule("a", &[], &["b"]);
        let a = grounder.new_atom("a");

        let choice_atoms = grounder.get_choice_atoms();
        assert_eq!(choice_atoms.len(), 1);
        assert_eq!(choice_atoms.iter().next().map(|point| point.atom), Some(body));
        assert!(grounder.get_choice_atoms().is_empty());

        let heads_to_bodies = grounder.get_heads_to_bodies();
        assert!(heads_to_bodies[&a].contains(&body));
        assert!(grounder.get_heads_to_bodies().is_empty());
    }

    #[test]
    fn support_nogoods_cover_every_rule_of_a_head() {
        let mut grounder = PropositionalGrounder::default();
        let first = grounder.add_rule("a", &["b"], &[]);
        let second = grounder.add_rule("a", &["c"], &[]);
        let a = grounder.new_atom("a");

        let nogoods = grounder.get_nogoods(&TrailAssignment::default());
        let expected = NoGood::support(a, &[first, second]);
        assert!(nogoods.iter().any(|(_, nogood)| *nogood == expected));
    }

    #[test]
    fn hidden_atoms_are_not_part_of_answer_sets() {
        let mut grounder = PropositionalGrounder::default();
        let a = grounder.add_choice_atom("a");
        let hidden = grounder.new_hidden_atom("aux");

        let answer_set = grounder.assignment_to_answer_set([a, hidden]);
        assert_eq!(answer_set.to_string(), "{ a }");
    }

    #[test]
    fn justification_collects_blocking_literals() {
        let mut grounder = PropositionalGrounder::default();
        let _ = grounder.add_rule("a", &["b"], &[]);
        let _ = grounder.add_rule("a", &[], &["c"]);
        let a = grounder.new_atom("a");
        let b = grounder.new_atom("b");
        let c = grounder.new_atom("c");
        let bodies: Vec<Atom> = grounder.rule_bodies[&a].clone();

        let mut assignment = TrailAssignment::default();
        assignment.grow_for_max_atom_id(grounder.atom_store().max_atom_id().expect("atoms exist"));
        for body in bodies.iter().copied() {
            assignment
                .assign(body, ThriceTruth::False, None)
                .expect("unassigned");
        }
        assignment
            .assign(b, ThriceTruth::False, None)
            .expect("unassigned");
        assignment
            .assign(c, ThriceTruth::True, None)
            .expect("unassigned");

        let reasons = grounder
            .justify_atom(a, &assignment)
            .expect("both bodies are false");
        assert_eq!(
            reasons,
            bodies.iter().map(|&body| Literal::negative(body)).collect::<Vec<_>>()
        );
        assert_eq!(
            grounder.justify_atom(bodies[0], &assignment),
            Some(vec![Literal::negative(b)])
        );
        assert_eq!(
            grounder.justify_atom(bodies[1], &assignment),
            Some(vec![Literal::positive(c)])
        );
    }

    #[test]
    fn justification_fails_for_a_supported_atom() {
        let mut grounder = PropositionalGrounder::default();
        let b = grounder.add_choice_atom("b");
        let _ = grounder.add_rule("a", &["b"], &[]);
        let a = grounder.new_atom("a");

        let mut assignment = TrailAssignment::default();
        assignment.grow_for_max_atom_id(grounder.atom_store().max_atom_id().expect("atoms exist"));
        assignment
            .assign(b, ThriceTruth::MustBeTrue, None)
            .expect("unassigned");
        let body = grounder.rule_bodies[&a][0];
        assignment
            .assign(body, ThriceTruth::MustBeTrue, None)
            .expect("unassigned");

        assert_eq!(grounder.justify_atom(a, &assignment), None);
    }

    #[test]
    fn justification_follows_positive_loops() {
        let mut grounder = PropositionalGrounder::default();
        let x = grounder.add_choice_atom("x");
        let from_b = grounder.add_rule("a", &["b"], &[]);
        let from_a = grounder.add_rule("b", &["a"], &[]);
        let from_x = grounder.add_rule("a", &["x"], &[]);
        let a = grounder.new_atom("a");
        let b = grounder.new_atom("b");

        let mut assignment = TrailAssignment::default();
        assignment.grow_for_max_atom_id(grounder.atom_store().max_atom_id().expect("atoms exist"));
        for (atom, truth) in [
            (x, ThriceTruth::False),
            (from_x, ThriceTruth::False),
            (a, ThriceTruth::MustBeTrue),
            (b, ThriceTruth::MustBeTrue),
            (from_a, ThriceTruth::MustBeTrue),
            (from_b, ThriceTruth::MustBeTrue),
        ] {
            assignment.assign(atom, truth, None).expect("unassigned");
        }

        assert_eq!(
            grounder.justify_atom(a, &assignment),
            Some(vec![Literal::negative(from_x)])
        );
        assert_eq!(
            grounder.justify_atom(b, &assignment),
            Some(vec![Literal::negative(from_x)])
        );
    }

    #[test]
    fn loop_through_an_open_choice_is_not_justified() {
        let mut grounder = PropositionalGrounder::default();
        let _ = grounder.add_choice_atom("x");
        let _ = grounder.add_rule("a", &["b"], &[]);
        let _ = grounder.add_rule("b", &["a"], &[]);
        let _ = grounder.add_rule("a", &["x"], &[]);
        let a = grounder.new_atom("a");

        let mut assignment = TrailAssignment::default();
        assignment.grow_for_max_atom_id(grounder.atom_store().max_atom_id().expect("atoms exist"));
        assignment
            .assign(a, ThriceTruth::MustBeTrue, None)
            .expect("unassigned");

        assert_eq!(grounder.justify_atom(a, &assignment), None);
    }

    #[test]
    fn reboot_hands_out_everything_again() {
        let mut grounder = PropositionalGrounder::default();
        let a = grounder.add_choice_atom("a");
        let _ = grounder.add_rule("b", &["a"], &[]);
        let assignment = TrailAssignment::default();

        let nogoods = grounder.get_nogoods(&assignment);
        let _ = grounder.get_choice_atoms();
        grounder.reboot().expect("rebootable");

        assert_eq!(grounder.get_nogoods(&assignment), nogoods);
        assert_eq!(grounder.get_choice_atoms().len(), 1);
        assert_eq!(grounder.atom_store().id_of(&"a".to_owned()), Some(a));
    }
}
