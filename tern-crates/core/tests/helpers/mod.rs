#![allow(
    dead_code,
    reason = "it is used in other test files, but somehow compiler can't see it"
)]
#![cfg(test)]

use std::collections::BTreeSet;

use tern_core::engine::DefaultSolver;
use tern_core::engine::Indefinite;
use tern_core::engine::SolverOptions;
use tern_core::grounder::PropositionalGrounder;
use tern_core::IteratedAnswerSet;

pub(crate) type Model = BTreeSet<String>;

/// A normal rule `head :- pos, not neg`.
#[derive(Clone, Debug)]
pub(crate) struct Rule {
    pub(crate) head: &'static str,
    pub(crate) pos: Vec<&'static str>,
    pub(crate) neg: Vec<&'static str>,
}

pub(crate) fn rule(head: &'static str, pos: &[&'static str], neg: &[&'static str]) -> Rule {
    Rule {
        head,
        pos: pos.to_vec(),
        neg: neg.to_vec(),
    }
}

/// A small propositional program that can be solved both by the solver and by brute force.
#[derive(Clone, Debug, Default)]
pub(crate) struct Program {
    pub(crate) facts: Vec<&'static str>,
    pub(crate) choices: Vec<&'static str>,
    pub(crate) rules: Vec<Rule>,
    pub(crate) constraints: Vec<(Vec<&'static str>, Vec<&'static str>)>,
}

impl Program {
    pub(crate) fn grounder(&self) -> PropositionalGrounder {
        let mut grounder = PropositionalGrounder::default();
        for fact in self.facts.iter() {
            let _ = grounder.add_fact(fact);
        }
        for choice in self.choices.iter() {
            let _ = grounder.add_choice_atom(choice);
        }
        for rule in self.rules.iter() {
            let _ = grounder.add_rule(rule.head, &rule.pos, &rule.neg);
        }
        for (pos, neg) in self.constraints.iter() {
            let _ = grounder.add_constraint(pos, neg);
        }
        grounder
    }

    fn atoms(&self) -> Vec<&'static str> {
        let mut atoms: BTreeSet<&'static str> = BTreeSet::new();
        atoms.extend(self.facts.iter().copied());
        atoms.extend(self.choices.iter().copied());
        for rule in self.rules.iter() {
            let _ = atoms.insert(rule.head);
            atoms.extend(rule.pos.iter().copied());
            atoms.extend(rule.neg.iter().copied());
        }
        for (pos, neg) in self.constraints.iter() {
            atoms.extend(pos.iter().copied());
            atoms.extend(neg.iter().copied());
        }
        atoms.into_iter().collect()
    }

    /// The least model of the reduct with respect to `candidate`, with the chosen atoms of
    /// `candidate` as additional facts.
    fn least_model_of_reduct(&self, candidate: &BTreeSet<&'static str>) -> BTreeSet<&'static str> {
        let mut model: BTreeSet<&'static str> = self.facts.iter().copied().collect();
        model.extend(
            self.choices
                .iter()
                .copied()
                .filter(|choice| candidate.contains(choice)),
        );
        loop {
            let mut changed = false;
            for rule in self.rules.iter() {
                let applicable = rule.pos.iter().all(|atom| model.contains(atom))
                    && rule.neg.iter().all(|atom| !candidate.contains(atom));
                if applicable && model.insert(rule.head) {
                    changed = true;
                }
            }
            if !changed {
                return model;
            }
        }
    }

    /// Every answer set, found by checking each subset of the atoms for stability.
    pub(crate) fn brute_force_answer_sets(&self) -> BTreeSet<Model> {
        let atoms = self.atoms();
        assert!(atoms.len() < 16, "too many atoms to enumerate");

        let mut answer_sets = BTreeSet::new();
        for mask in 0..(1_u32 << atoms.len()) {
            let candidate: BTreeSet<&'static str> = atoms
                .iter()
                .enumerate()
                .filter(|(index, _)| mask & (1 << index) != 0)
                .map(|(_, &atom)| atom)
                .collect();
            if self.least_model_of_reduct(&candidate) != candidate {
                continue;
            }
            let violates_constraint = self.constraints.iter().any(|(pos, neg)| {
                pos.iter().all(|atom| candidate.contains(atom))
                    && neg.iter().all(|atom| !candidate.contains(atom))
            });
            if !violates_constraint {
                let _ = answer_sets.insert(candidate.iter().map(|atom| (*atom).to_owned()).collect());
            }
        }
        answer_sets
    }
}

pub(crate) fn model(atoms: &[&str]) -> Model {
    atoms.iter().map(|atom| (*atom).to_owned()).collect()
}

/// All answer sets the solver finds, checking that none is reported twice.
pub(crate) fn solve_all(grounder: PropositionalGrounder, options: SolverOptions) -> Vec<Model> {
    // Run with `RUST_LOG=debug` to follow the search.
    let _ = env_logger::builder().is_test(true).try_init();
    let mut solver = DefaultSolver::new(grounder, options);
    let mut termination = Indefinite;
    let mut answer_sets = Vec::new();
    loop {
        match solver.next_answer_set(&mut termination) {
            IteratedAnswerSet::AnswerSet(answer_set) => {
                let model: Model = answer_set.atoms().cloned().collect();
                assert!(
                    !answer_sets.contains(&model),
                    "answer set {answer_set} was found twice"
                );
                answer_sets.push(model);
            }
            IteratedAnswerSet::Finished => {
                assert!(!answer_sets.is_empty());
                return answer_sets;
            }
            IteratedAnswerSet::Unsatisfiable => {
                assert!(answer_sets.is_empty());
                return answer_sets;
            }
            IteratedAnswerSet::Unknown => panic!("the search cannot stop without a budget"),
        }
    }
}

/// Solves `program` and compares the answer sets with the brute-force ones.
pub(crate) fn assert_matches_brute_force(program: &Program, options: SolverOptions) {
    let found: BTreeSet<Model> = solve_all(program.grounder(), options)
        .into_iter()
        .collect();
    assert_eq!(found, program.brute_force_answer_sets());
}
