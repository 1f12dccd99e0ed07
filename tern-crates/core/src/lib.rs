//! # tern-core
//! The search core of an answer set solver that grounds lazily.
//!
//! A [`Grounder`] hands the solver nogoods over its atoms whenever the assignment changes, and
//! the [`DefaultSolver`] searches for assignments that violate none of them. Atoms are `True`,
//! `False` or must-be-true (`MBT`): an atom is must-be-true if it has to hold but nothing derives
//! it yet. An answer set is a total assignment without must-be-true atoms.
//!
//! ```
//! use tern_core::engine::DefaultSolver;
//! use tern_core::engine::Indefinite;
//! use tern_core::engine::SolverOptions;
//! use tern_core::grounder::PropositionalGrounder;
//!
//! let mut grounder = PropositionalGrounder::default();
//! let _ = grounder.add_choice_atom("a");
//! let _ = grounder.add_choice_atom("b");
//! let _ = grounder.add_constraint(&["a", "b"], &[]);
//!
//! let mut solver = DefaultSolver::new(grounder, SolverOptions::default());
//! let mut termination = Indefinite;
//! let answer_sets: Vec<_> = solver.answer_sets(&mut termination).collect();
//! assert_eq!(answer_sets.len(), 3);
//! ```
#[cfg(doc)]
use crate::engine::DefaultSolver;
#[cfg(doc)]
use crate::grounder::Grounder;

#[doc(hidden)]
pub mod asserts;
pub mod basic_types;
pub mod branching;
pub mod containers;
pub mod engine;
pub mod grounder;
pub mod statistics;

// We declare a private module with public use, so that the outcomes of the search are exported
// directly from the crate.
mod api;

pub use api::*;
pub use rand;
