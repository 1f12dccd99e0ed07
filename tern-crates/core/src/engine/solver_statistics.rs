use crate::basic_types::moving_averages::CumulativeMovingAverage;
use crate::create_statistics_struct;
use crate::statistics::Statistic;

create_statistics_struct!(
    /// Counters of the search that the components of the solver do not keep themselves.
    SolverStatistics {
        num_conflicts: u64,
        /// Conflicts that only showed once all remaining atoms were closed to `False`.
        num_conflicts_after_closing: u64,
        /// How often the search backtracked because must-be-true atoms were left at fixpoint.
        num_mbt_backtracks: u64,
        /// How often a fixpoint with must-be-true atoms was reached.
        num_mbts_at_fixpoint: u64,
        num_learned_nogoods: u64,
        num_justification_nogoods: u64,
        num_answer_sets: u64,
        num_reboots: u64,
        average_learned_nogood_lbd: CumulativeMovingAverage,
        average_learned_nogood_length: CumulativeMovingAverage,
});
