use super::BranchingHeuristic;
use super::SelectionContext;
use crate::basic_types::Literal;

/// Chooses the active choice atom that became active first; `False`, unless the atom is
/// must-be-true.
#[derive(Clone, Copy, Debug, Default)]
pub struct NaiveHeuristic;

impl BranchingHeuristic for NaiveHeuristic {
    fn choose_literal(&mut self, context: &SelectionContext) -> Option<Literal> {
        context
            .next_active_choice_atom()
            .map(|atom| context.literal(atom, false))
    }
}
