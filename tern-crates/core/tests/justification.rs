#![cfg(test)] // workaround for https://github.com/rust-lang/rust-clippy/issues/11024

mod helpers;

use std::collections::BTreeSet;

use helpers::*;
use tern_core::engine::DefaultSolver;
use tern_core::engine::Indefinite;
use tern_core::engine::SolverOptions;

fn without_justifications() -> SolverOptions {
    SolverOptions {
        disable_justifications: true,
        ..Default::default()
    }
}

#[test]
fn requiring_an_underivable_atom_is_unsatisfiable() {
    let program = Program {
        choices: vec!["x"],
        constraints: vec![(vec![], vec!["c"])],
        ..Default::default()
    };

    assert!(solve_all(program.grounder(), SolverOptions::default()).is_empty());
    assert!(solve_all(program.grounder(), without_justifications()).is_empty());
}

#[test]
fn required_atom_is_derived_where_possible() {
    let program = Program {
        choices: vec!["x", "y"],
        rules: vec![rule("c", &["x"], &[]), rule("c", &["y"], &["x"])],
        constraints: vec![(vec![], vec!["c"])],
        ..Default::default()
    };

    let mut found = solve_all(program.grounder(), SolverOptions::default());
    found.sort();

    assert_eq!(
        found,
        vec![model(&["c", "x"]), model(&["c", "x", "y"]), model(&["c", "y"])]
    );
    assert_matches_brute_force(&program, without_justifications());
}

#[test]
fn justification_and_backtracking_agree() {
    let program = Program {
        choices: vec!["x", "y", "z"],
        rules: vec![
            rule("a", &["x"], &["b"]),
            rule("b", &["y"], &["a"]),
            rule("goal", &["a"], &["z"]),
            rule("goal", &["b", "z"], &[]),
        ],
        constraints: vec![(vec![], vec!["goal"])],
        ..Default::default()
    };

    assert_matches_brute_force(&program, SolverOptions::default());
    assert_matches_brute_force(&program, without_justifications());
}

#[test]
fn positive_loop_without_outside_support_is_justified() {
    let program = Program {
        choices: vec!["x", "y"],
        rules: vec![
            rule("a", &["b"], &[]),
            rule("b", &["a"], &[]),
            rule("a", &["x"], &[]),
            rule("c", &["a"], &[]),
        ],
        constraints: vec![(vec![], vec!["c"])],
        ..Default::default()
    };

    let mut solver = DefaultSolver::new(program.grounder(), SolverOptions::default());
    let found: BTreeSet<Model> = solver
        .answer_sets(&mut Indefinite)
        .map(|answer_set| answer_set.atoms().cloned().collect())
        .collect();

    assert_eq!(found, program.brute_force_answer_sets());
    assert!(solver.num_justification_nogoods() > 0);
}
