#![cfg(test)] // workaround for https://github.com/rust-lang/rust-clippy/issues/11024

mod helpers;

use helpers::*;
use tern_core::basic_types::Literal;
use tern_core::basic_types::NoGood;
use tern_core::branching::HeuristicKind;
use tern_core::engine::DecisionBudget;
use tern_core::engine::DefaultSolver;
use tern_core::engine::Indefinite;
use tern_core::engine::SolverOptions;
use tern_core::grounder::PropositionalGrounder;
use tern_core::IteratedAnswerSet;

#[test]
fn fact_with_constraint_has_one_answer_set() {
    let mut grounder = PropositionalGrounder::default();
    let _ = grounder.add_fact("b");
    let _ = grounder.add_constraint(&["a", "b"], &[]);

    assert_eq!(
        solve_all(grounder, SolverOptions::default()),
        vec![model(&["b"])]
    );
}

#[test]
fn free_choices_give_every_combination() {
    let mut grounder = PropositionalGrounder::default();
    let _ = grounder.add_choice_atom("a");
    let _ = grounder.add_choice_atom("b");

    let mut found = solve_all(grounder, SolverOptions::default());
    found.sort();

    assert_eq!(
        found,
        vec![model(&[]), model(&["a"]), model(&["a", "b"]), model(&["b"])]
    );
}

#[test]
fn violated_fact_is_unsatisfiable() {
    let mut grounder = PropositionalGrounder::default();
    let a = grounder.new_atom("a");
    let _ = grounder.add_nogood(NoGood::fact(a));
    let _ = grounder.add_nogood(NoGood::new([Literal::positive(a)]));

    let mut solver = DefaultSolver::new(grounder, SolverOptions::default());

    assert_eq!(
        solver.next_answer_set(&mut Indefinite),
        IteratedAnswerSet::Unsatisfiable
    );
}

#[test]
fn even_negative_loop_has_two_answer_sets() {
    let program = Program {
        rules: vec![rule("a", &[], &["b"]), rule("b", &[], &["a"])],
        ..Default::default()
    };

    let mut found = solve_all(program.grounder(), SolverOptions::default());
    found.sort();

    assert_eq!(found, vec![model(&["a"]), model(&["b"])]);
}

#[test]
fn odd_negative_loop_has_no_answer_set() {
    let program = Program {
        rules: vec![rule("a", &[], &["a"])],
        ..Default::default()
    };

    assert!(solve_all(program.grounder(), SolverOptions::default()).is_empty());
}

#[test]
fn rules_over_choices_match_brute_force() {
    let program = Program {
        facts: vec!["f"],
        choices: vec!["x", "y", "z"],
        rules: vec![
            rule("p", &["x", "f"], &[]),
            rule("q", &["y"], &["p"]),
            rule("r", &[], &["q", "z"]),
            rule("s", &["p", "r"], &[]),
        ],
        constraints: vec![(vec!["x", "y", "z"], vec![])],
    };

    assert_matches_brute_force(&program, SolverOptions::default());
}

#[test]
fn every_heuristic_finds_the_same_answer_sets() {
    let program = Program {
        facts: vec![],
        choices: vec!["x", "y"],
        rules: vec![
            rule("a", &[], &["b"]),
            rule("b", &[], &["a"]),
            rule("c", &["a", "x"], &[]),
            rule("d", &["b"], &["y"]),
        ],
        constraints: vec![(vec!["c", "y"], vec![]), (vec![], vec!["c", "d", "x"])],
    };

    for kinds in [
        vec![HeuristicKind::Naive],
        vec![HeuristicKind::Vsids],
        vec![HeuristicKind::Random],
        vec![HeuristicKind::Random, HeuristicKind::Vsids],
        vec![HeuristicKind::VsidsWithPhaseSaving],
        vec![HeuristicKind::BerkMin],
        vec![HeuristicKind::BerkMin, HeuristicKind::VsidsWithPhaseSaving],
    ] {
        let options = SolverOptions {
            heuristics: kinds,
            ..Default::default()
        };
        assert_matches_brute_force(&program, options);
    }
}

#[test]
fn backjumps_over_out_of_order_assignments_match_brute_force() {
    let program = Program {
        facts: vec!["d", "e"],
        choices: vec!["x", "y"],
        rules: vec![
            rule("a", &["b"], &["z"]),
            rule("e", &[], &["x", "c"]),
            rule("d", &[], &["y", "b"]),
        ],
        ..Default::default()
    };

    let options = SolverOptions {
        heuristics: vec![HeuristicKind::Naive],
        ..Default::default()
    };
    assert_matches_brute_force(&program, options);
}

#[test]
fn without_deletion_the_answer_sets_are_unchanged() {
    let program = Program {
        choices: vec!["x", "y", "z"],
        rules: vec![rule("a", &["x"], &["y"]), rule("b", &["z"], &["a"])],
        constraints: vec![(vec!["a", "b"], vec![]), (vec![], vec!["a", "b", "y"])],
        ..Default::default()
    };
    let options = SolverOptions {
        learned_nogood_deletion: false,
        ..Default::default()
    };

    assert_matches_brute_force(&program, options);
}

#[test]
fn stopped_search_resumes_with_the_remaining_answer_sets() {
    let mut grounder = PropositionalGrounder::default();
    let _ = grounder.add_choice_atom("a");
    let _ = grounder.add_choice_atom("b");
    let mut solver = DefaultSolver::new(grounder, SolverOptions::default());

    assert_eq!(
        solver.next_answer_set(&mut DecisionBudget::new(0)),
        IteratedAnswerSet::Unknown
    );

    let mut termination = Indefinite;
    let mut answer_sets = solver.answer_sets(&mut termination);
    assert_eq!(answer_sets.by_ref().count(), 4);
    assert!(!answer_sets.was_interrupted());
}
