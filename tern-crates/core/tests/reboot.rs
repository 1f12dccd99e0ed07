#![cfg(test)] // workaround for https://github.com/rust-lang/rust-clippy/issues/11024

mod helpers;

use helpers::*;
use tern_core::basic_types::SequenceGeneratorType;
use tern_core::engine::RebootOptions;
use tern_core::engine::SolverOptions;

fn program() -> Program {
    Program {
        choices: vec!["x", "y", "z", "w"],
        rules: vec![
            rule("a", &["x"], &["b"]),
            rule("b", &[], &["a"]),
            rule("c", &["b", "y"], &[]),
            rule("d", &["z"], &["c"]),
        ],
        constraints: vec![
            (vec!["c", "z"], vec![]),
            (vec!["d", "w"], vec![]),
            (vec!["a"], vec!["w", "y"]),
        ],
        ..Default::default()
    }
}

#[test]
fn frequent_reboots_find_the_same_answer_sets() {
    let options = SolverOptions {
        reboot: Some(RebootOptions {
            strategy: SequenceGeneratorType::Constant,
            base: 1,
            multiplier: 1.0,
        }),
        ..Default::default()
    };

    assert_matches_brute_force(&program(), options);
}

#[test]
fn geometric_reboots_find_the_same_answer_sets() {
    let options = SolverOptions {
        reboot: Some(RebootOptions {
            strategy: SequenceGeneratorType::Geometric,
            base: 2,
            multiplier: 2.0,
        }),
        ..Default::default()
    };

    assert_matches_brute_force(&program(), options);
}
