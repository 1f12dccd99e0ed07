//! The conflict-driven search over three-valued assignments.
pub mod assignment;
pub mod choice;
pub mod conflict_analysis;
mod default_solver;
pub(crate) mod literal_block_distance;
pub mod nogood_store;
mod reboot;
mod solver_statistics;
pub mod termination;

pub use assignment::TrailAssignment;
pub use default_solver::DefaultSolver;
pub use default_solver::SolverOptions;
pub use reboot::RebootOptions;
pub use termination::Combinator;
pub use termination::DecisionBudget;
pub use termination::Indefinite;
pub use termination::TerminationCondition;
pub use termination::TimeBudget;
