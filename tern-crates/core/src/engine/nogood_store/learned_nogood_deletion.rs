use log::debug;

use super::WatchedNoGood;
use super::WatchedNoGoodId;
use crate::basic_types::Antecedent;
use crate::containers::KeyedVec;
use crate::engine::TrailAssignment;

/// The number of conflicts before the first deletion run.
pub(crate) const RUN_AFTER_AT_LEAST: usize = 2000;
/// How many conflicts every further run waits longer than the one before.
pub(crate) const GROWTH_FACTOR: usize = 100;
/// After this many runs the waiting time starts over at [`RUN_AFTER_AT_LEAST`].
pub(crate) const RESET_SEQUENCE_AFTER: usize = 20;

/// Decides when learnt nogoods are deleted and which ones.
///
/// Only learnt nogoods of size three or more are considered. A run deletes up to half of them,
/// sparing those that currently justify an assignment, those with an LBD of at most two, and
/// those more active than average.
#[derive(Clone, Debug, Default)]
pub(crate) struct LearnedNoGoodDeletion {
    learned: Vec<WatchedNoGoodId>,
    conflict_counter: usize,
    cleanup_counter: usize,
    num_deleted: usize,
}

impl LearnedNoGoodDeletion {
    pub(crate) fn record_learned(&mut self, id: WatchedNoGoodId) {
        self.learned.push(id);
    }

    pub(crate) fn increase_conflict_counter(&mut self) {
        self.conflict_counter += 1;
    }

    pub(crate) fn need_to_run(&self) -> bool {
        self.conflict_counter > RUN_AFTER_AT_LEAST + GROWTH_FACTOR * self.cleanup_counter
    }

    pub(crate) fn learned(&self) -> &[WatchedNoGoodId] {
        &self.learned
    }

    pub(crate) fn num_deleted(&self) -> usize {
        self.num_deleted
    }

    /// Selects the nogoods to delete and halves the activity of the ones that stay.
    ///
    /// The selected nogoods are only forgotten here; unwatching them is up to the caller.
    pub(crate) fn run(
        &mut self,
        nogoods: &mut KeyedVec<WatchedNoGoodId, WatchedNoGood>,
        assignment: &TrailAssignment,
    ) -> Vec<WatchedNoGoodId> {
        self.conflict_counter = 0;
        self.cleanup_counter += 1;
        if self.cleanup_counter > RESET_SEQUENCE_AFTER {
            self.cleanup_counter = 0;
        }

        let original_size = self.learned.len();
        if original_size == 0 {
            return Vec::new();
        }
        let total_activity: u64 = self
            .learned
            .iter()
            .map(|&id| u64::from(nogoods[id].activity()))
            .sum();
        let average_activity = total_activity / original_size as u64;
        let to_delete = original_size / 2;

        let mut deleted = Vec::with_capacity(to_delete);
        self.learned.retain(|&id| {
            if deleted.len() >= to_delete {
                return true;
            }
            let nogood = &nogoods[id];
            let keep = is_locked(nogood, id, assignment)
                || nogood.has_lbd_at_most_two()
                || u64::from(nogood.activity()) > average_activity;
            if !keep {
                deleted.push(id);
            }
            keep
        });

        for &id in self.learned.iter() {
            nogoods[id].decrease_activity();
        }
        self.num_deleted += deleted.len();
        debug!(
            "Deleted {} of {original_size} learnt nogoods, average activity {average_activity}",
            deleted.len()
        );
        deleted
    }

    pub(crate) fn clear(&mut self) {
        self.learned.clear();
        self.conflict_counter = 0;
        self.cleanup_counter = 0;
    }
}

/// Whether the nogood is the reason of the current value of one of its watched atoms.
fn is_locked(nogood: &WatchedNoGood, id: WatchedNoGoodId, assignment: &TrailAssignment) -> bool {
    let reason = Some(Antecedent::Watched(id));
    (0..2).any(|position| {
        let atom = nogood.literal(position).atom();
        assignment.implied_by(atom) == reason || assignment.strong_implied_by(atom) == reason
    })
}
