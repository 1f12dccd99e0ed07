use super::BranchingHeuristic;
use super::SelectionContext;
use super::Vsids;
use super::VsidsOptions;
use crate::basic_types::Atom;
use crate::basic_types::Literal;
use crate::basic_types::NoGood;
use crate::create_statistics_struct;
use crate::engine::conflict_analysis::ConflictAnalysisResult;
use crate::statistics::Statistic;
use crate::statistics::StatisticLogger;

create_statistics_struct!(PhaseSavingStatistics {
    num_choices_true: u64,
    num_choices_false: u64,
});

/// [`Vsids`] for picking the atom, with the value the atom had before it was last backtracked
/// (its saved phase) instead of the sign balance.
#[derive(Debug)]
pub struct VsidsWithPhaseSaving {
    vsids: Vsids,
    statistics: PhaseSavingStatistics,
}

impl VsidsWithPhaseSaving {
    pub fn new(options: VsidsOptions) -> VsidsWithPhaseSaving {
        VsidsWithPhaseSaving {
            vsids: Vsids::new(options),
            statistics: PhaseSavingStatistics::default(),
        }
    }

    pub fn activity(&self, atom: Atom) -> f64 {
        self.vsids.activity(atom)
    }
}

impl Default for VsidsWithPhaseSaving {
    fn default() -> Self {
        VsidsWithPhaseSaving::new(VsidsOptions::default())
    }
}

impl BranchingHeuristic for VsidsWithPhaseSaving {
    fn choose_literal(&mut self, context: &SelectionContext) -> Option<Literal> {
        let atom = self.vsids.most_active_choice_atom(context)?;
        let literal = context.literal(atom, context.last_value(atom));
        if literal.is_positive() {
            self.statistics.num_choices_true += 1;
        } else {
            self.statistics.num_choices_false += 1;
        }
        Some(literal)
    }

    fn analyzed_conflict(&mut self, analysis: &ConflictAnalysisResult) {
        self.vsids.analyzed_conflict(analysis);
    }

    fn new_nogoods(&mut self, nogoods: &[NoGood]) {
        self.vsids.new_nogoods(nogoods);
    }

    fn on_choice_point_activated(&mut self, atom: Atom) {
        self.vsids.on_choice_point_activated(atom);
    }

    fn grow_for_max_atom_id(&mut self, max_atom: Atom) {
        self.vsids.grow_for_max_atom_id(max_atom);
    }

    fn reset(&mut self) {
        self.vsids.reset();
    }

    fn log_statistics(&self, statistic_logger: StatisticLogger) {
        self.statistics.log(statistic_logger);
    }
}
