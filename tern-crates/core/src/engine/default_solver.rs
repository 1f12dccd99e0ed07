//! The search loop tying the assignment, the nogood store, the choice manager, conflict analysis
//! and the branching heuristics together.
use std::fmt::Debug;

use log::debug;
use log::info;
use log::trace;
use log::warn;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use super::choice::Choice;
use super::choice::ChoiceManager;
use super::conflict_analysis::ConflictAnalysis;
use super::conflict_analysis::GroundConflictLearner;
use super::nogood_store::NoGoodStore;
use super::reboot::AtomizedChoice;
use super::reboot::RebootManager;
use super::reboot::RebootOptions;
use super::solver_statistics::SolverStatistics;
use super::termination::TerminationCondition;
use super::TrailAssignment;
use crate::api::AnswerSetIterator;
use crate::api::IteratedAnswerSet;
use crate::basic_types::moving_averages::MovingAverage;
use crate::basic_types::ConflictCause;
use crate::basic_types::Literal;
use crate::basic_types::NoGood;
use crate::branching::BranchingHeuristic;
use crate::branching::ChainedBranchingHeuristics;
use crate::branching::HeuristicKind;
use crate::branching::SelectionContext;
use crate::branching::VsidsOptions;
use crate::grounder::AnswerSet;
use crate::grounder::Grounder;
use crate::grounder::NoGoodId;
use crate::statistics::log_statistic_postfix;
use crate::statistics::should_log_statistics;
use crate::statistics::Statistic;
use crate::statistics::StatisticLogger;
use crate::tern_assert_simple;

/// Options of the [`DefaultSolver`].
pub struct SolverOptions {
    /// The heuristics to ask for choices, in order; a naive heuristic is added at the end.
    pub heuristics: Vec<HeuristicKind>,
    /// Whether learned nogoods may be deleted again.
    pub learned_nogood_deletion: bool,
    /// Backtrack chronologically instead of asking the grounder why a must-be-true atom lacks
    /// support.
    pub disable_justifications: bool,
    /// Periodically restart the search; `None` disables reboots.
    pub reboot: Option<RebootOptions>,
    pub vsids: VsidsOptions,
    /// Drives the random heuristic.
    pub random_generator: SmallRng,
}

impl Default for SolverOptions {
    fn default() -> Self {
        SolverOptions {
            heuristics: vec![HeuristicKind::Vsids],
            learned_nogood_deletion: true,
            disable_justifications: false,
            reboot: None,
            vsids: VsidsOptions::default(),
            random_generator: SmallRng::seed_from_u64(42),
        }
    }
}

impl Debug for SolverOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolverOptions")
            .field("heuristics", &self.heuristics)
            .field("learned_nogood_deletion", &self.learned_nogood_deletion)
            .field("disable_justifications", &self.disable_justifications)
            .field("reboot", &self.reboot)
            .field("vsids", &self.vsids)
            .field("random_generator", &"<SmallRng>")
            .finish()
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct SearchState {
    has_been_initialized: bool,
    /// The previous call returned an answer set, which has to be excluded first.
    has_pending_answer_set: bool,
    is_search_space_completely_explored: bool,
    /// Set once the remaining unassigned atoms were closed to `False`.
    after_all_atoms_assigned: bool,
}

/// Enumerates the answer sets of the program behind a [`Grounder`].
///
/// The search is conflict-driven over a three-valued assignment. Whenever propagation reaches a
/// fixpoint the grounder is told about the new truths and may answer with new nogoods. Once no
/// choice point is active, the remaining atoms are closed to `False`; an assignment without
/// must-be-true atoms left is an answer set. Remaining must-be-true atoms lack support, and the
/// grounder is asked to justify one of them.
#[derive(Debug)]
pub struct DefaultSolver<G: Grounder> {
    grounder: G,
    assignment: TrailAssignment,
    store: NoGoodStore,
    choice_manager: ChoiceManager,
    learner: GroundConflictLearner,
    heuristic: ChainedBranchingHeuristics,
    reboot_manager: Option<RebootManager<G::Atom>>,
    learned_nogood_deletion: bool,
    disable_justifications: bool,
    state: SearchState,
    statistics: SolverStatistics,
}

impl<G: Grounder> DefaultSolver<G> {
    pub fn new(grounder: G, options: SolverOptions) -> DefaultSolver<G> {
        let heuristic = ChainedBranchingHeuristics::new(
            &options.heuristics,
            options.vsids,
            &options.random_generator,
        );
        debug!("Branching heuristics: {heuristic}");

        let reboot_manager = match options.reboot {
            Some(_) if !grounder.is_rebootable() => {
                warn!("Reboots are disabled since the grounder does not support them");
                None
            }
            Some(reboot_options) => Some(RebootManager::new(reboot_options)),
            None => None,
        };

        DefaultSolver {
            grounder,
            assignment: TrailAssignment::default(),
            store: NoGoodStore::default(),
            choice_manager: ChoiceManager::default(),
            learner: GroundConflictLearner::default(),
            heuristic,
            reboot_manager,
            learned_nogood_deletion: options.learned_nogood_deletion,
            disable_justifications: options.disable_justifications,
            state: SearchState::default(),
            statistics: SolverStatistics::default(),
        }
    }

    pub fn grounder(&self) -> &G {
        &self.grounder
    }

    pub fn assignment(&self) -> &TrailAssignment {
        &self.assignment
    }

    pub fn num_answer_sets(&self) -> u64 {
        self.statistics.num_answer_sets
    }

    pub fn num_conflicts(&self) -> u64 {
        self.statistics.num_conflicts
    }

    pub fn num_learned_nogoods(&self) -> u64 {
        self.statistics.num_learned_nogoods
    }

    /// Nogoods learned from the grounder's explanation of a must-be-true atom.
    pub fn num_justification_nogoods(&self) -> u64 {
        self.statistics.num_justification_nogoods
    }

    pub fn num_deleted_nogoods(&self) -> usize {
        self.store.num_deleted_nogoods()
    }

    pub fn num_choices(&self) -> u64 {
        self.choice_manager.num_choices()
    }

    pub fn num_backtracks(&self) -> u64 {
        self.choice_manager.num_backtracks()
    }

    pub fn num_backjumps(&self) -> u64 {
        self.choice_manager.num_backjumps()
    }

    pub fn num_reboots(&self) -> u64 {
        self.statistics.num_reboots
    }

    /// Iterates over the answer sets until there are no more or `termination` stops the search.
    pub fn answer_sets<'solver, 'termination, T: TerminationCondition>(
        &'solver mut self,
        termination: &'termination mut T,
    ) -> AnswerSetIterator<'solver, 'termination, G, T> {
        AnswerSetIterator::new(self, termination)
    }

    /// Searches for the next answer set, excluding all answer sets returned before.
    ///
    /// If `termination` stops the search, [`IteratedAnswerSet::Unknown`] is returned and a later
    /// call continues where the search left off.
    pub fn next_answer_set(
        &mut self,
        termination: &mut impl TerminationCondition,
    ) -> IteratedAnswerSet<G::Atom> {
        if !self.state.has_been_initialized {
            self.initialize_search();
        } else if self.state.has_pending_answer_set {
            self.state.has_pending_answer_set = false;
            self.prepare_for_subsequent_answer_set();
        }

        loop {
            if self.state.is_search_space_completely_explored {
                debug!("The search space has been explored completely");
                return if self.statistics.num_answer_sets == 0 {
                    IteratedAnswerSet::Unsatisfiable
                } else {
                    IteratedAnswerSet::Finished
                };
            }
            if termination.should_stop() {
                debug!("The search was stopped by its termination condition");
                return IteratedAnswerSet::Unknown;
            }

            match self.propagate() {
                Err(conflict) => {
                    debug!("Conflict encountered, analysing it");
                    self.statistics.num_conflicts += 1;
                    self.learn_from_conflict(conflict);
                }
                Ok(()) if self.assignment.did_change() => {
                    trace!("Updating the grounder with the new assignments");
                    self.sync_with_grounder();
                }
                Ok(()) if self.is_reboot_scheduled() => self.reboot(),
                Ok(()) => {
                    if self.choose() {
                        termination.decision_has_been_made();
                    } else if self.close() {
                        debug!("Closed the unassigned atoms");
                    } else if self.assignment.mbt_count() == 0 {
                        return IteratedAnswerSet::AnswerSet(self.provide_answer_set());
                    } else {
                        self.backtrack_from_mbts_remaining();
                    }
                }
            }
        }
    }

    /// Writes the statistics of the search through the statistics logging.
    pub fn log_statistics(&self) {
        if !should_log_statistics() {
            return;
        }
        let statistic_logger = StatisticLogger::default();
        self.statistics.log(statistic_logger.clone());
        for (name, value) in [
            ("num_choices", self.choice_manager.num_choices()),
            ("num_backtracks", self.choice_manager.num_backtracks()),
            ("num_backjumps", self.choice_manager.num_backjumps()),
            (
                "num_backtracks_within_backjumps",
                self.choice_manager.num_backtracks_within_backjumps(),
            ),
        ] {
            statistic_logger
                .attach_to_prefix(name)
                .log_statistic(value);
        }
        self.store
            .log_statistics(statistic_logger.attach_to_prefix("nogood_store"));
        self.heuristic
            .log_statistics(statistic_logger.attach_to_prefix("heuristics"));
        log_statistic_postfix();
    }

    fn initialize_search(&mut self) {
        self.get_nogoods_from_grounder_and_ingest();
        self.state.has_been_initialized = true;
    }

    fn prepare_for_subsequent_answer_set(&mut self) {
        self.state.after_all_atoms_assigned = false;
        if self.assignment.decision_level() == 0 {
            // No choice led to the previous answer set, so it was the only one.
            self.state.is_search_space_completely_explored = true;
            return;
        }

        let enumeration_nogood = self.choice_manager.compute_enumeration();
        let backjump_level = self
            .assignment
            .minimum_conflict_level(&enumeration_nogood)
            .expect("the enumeration nogood is violated by the answer set");
        if backjump_level == 0 {
            // Every choice was for an atom that was must-be-true at level 0 already.
            self.state.is_search_space_completely_explored = true;
            return;
        }

        self.choice_manager
            .backjump(backjump_level - 1, &self.store, &mut self.assignment);
        debug!("Adding enumeration nogood {enumeration_nogood}");
        if let Some(reboot_manager) = self.reboot_manager.as_mut() {
            reboot_manager.new_enumeration_nogood(&enumeration_nogood, self.grounder.atom_store());
        }
        let id = self.grounder.register(&enumeration_nogood);
        trace!("Registered the enumeration nogood as {id}");
        if !self.add_and_backjump_if_necessary(&enumeration_nogood, None) {
            self.state.is_search_space_completely_explored = true;
        }
    }

    fn propagate(&mut self) -> Result<(), ConflictCause> {
        let result = self.store.propagate(&mut self.assignment);
        if result.is_ok() && self.learned_nogood_deletion {
            self.store.cleanup_learned_nogoods(&self.assignment);
        }
        result
    }

    fn sync_with_grounder(&mut self) {
        let new_positive_atoms = self.assignment.drain_new_positive_assignments();
        self.grounder.update_assignment(&new_positive_atoms);
        self.get_nogoods_from_grounder_and_ingest();
    }

    fn get_nogoods_from_grounder_and_ingest(&mut self) {
        let obtained = self.grounder.get_nogoods(&self.assignment);
        if !self.ingest(obtained) {
            self.state.is_search_space_completely_explored = true;
        }
    }

    /// Adds nogoods to the store, fixing every contradiction this causes. Returns `false` if a
    /// contradiction shows that there is no further answer set.
    fn ingest(&mut self, nogoods: Vec<(NoGoodId, NoGood)>) -> bool {
        self.grow_for_max_atom_id();
        let plain: Vec<NoGood> = nogoods.iter().map(|(_, nogood)| nogood.clone()).collect();
        self.heuristic.new_nogoods(&plain);

        for (id, nogood) in nogoods {
            trace!("Ingesting nogood {id}: {nogood:?}");
            if nogood.is_empty() {
                debug!("Nogood {id} is empty and violated by every assignment");
                return false;
            }
            if let Err(conflict) = self.store.add(&nogood, &mut self.assignment) {
                if !self.fix_contradiction(&nogood, conflict) {
                    return false;
                }
            }
        }
        true
    }

    fn ingest_nogood_collection(&mut self, nogoods: Vec<NoGood>) {
        let registered = nogoods
            .into_iter()
            .map(|nogood| (self.grounder.register(&nogood), nogood))
            .collect();
        if !self.ingest(registered) {
            self.state.is_search_space_completely_explored = true;
        }
    }

    /// Backjumps below the level at which `nogood` is violated, then adds it.
    fn fix_contradiction(&mut self, nogood: &NoGood, conflict: ConflictCause) -> bool {
        debug!("Nogood {nogood} is violated upon addition");
        let analysis =
            self.learner
                .analyze_conflict_from_adding_nogood(&conflict, &self.store, &self.assignment);
        let ConflictAnalysis::Resolved(result) = analysis else {
            return false;
        };
        self.heuristic.analyzed_conflict(&result);
        tern_assert_simple!(
            result.learned_nogood.is_none(),
            "adding a violated nogood does not learn anything"
        );
        self.choice_manager
            .backjump(result.backjump_level, &self.store, &mut self.assignment);
        self.add_and_backjump_if_necessary(nogood, None)
    }

    /// Adds `nogood`, backjumping as far as needed for it not to be violated. Returns `false` if
    /// it is violated at level 0.
    fn add_and_backjump_if_necessary(&mut self, nogood: &NoGood, lbd: Option<u32>) -> bool {
        while self
            .store
            .add_with_lbd(nogood, lbd, &mut self.assignment)
            .is_err()
        {
            let Some(backjump_level) = self
                .learner
                .compute_conflict_free_backjumping_level(nogood, &self.assignment)
            else {
                return false;
            };
            self.choice_manager
                .backjump(backjump_level, &self.store, &mut self.assignment);
            if let Err(conflict) = self.propagate() {
                panic!("propagation after backjumping for {nogood} failed: {conflict:?}");
            }
        }
        true
    }

    fn learn_from_conflict(&mut self, conflict: ConflictCause) {
        let violated: Vec<Literal> = conflict.reason_literals(&self.store).to_vec();
        self.heuristic.violated_nogood(&violated);

        if self.state.after_all_atoms_assigned {
            debug!("The assignment is violated after closing the unassigned atoms");
            self.statistics.num_conflicts_after_closing += 1;
            if !self.backtrack() {
                self.state.is_search_space_completely_explored = true;
            }
            self.state.after_all_atoms_assigned = false;
        } else if !self.learn_backjump_add_from_conflict(&conflict) {
            self.state.is_search_space_completely_explored = true;
        }
    }

    fn learn_backjump_add_from_conflict(&mut self, conflict: &ConflictCause) -> bool {
        let analysis =
            self.learner
                .analyze_conflicting_nogood(conflict, &mut self.store, &self.assignment);
        let ConflictAnalysis::Resolved(result) = analysis else {
            debug!("The conflict does not depend on any choice");
            return false;
        };
        self.heuristic.analyzed_conflict(&result);
        let learned_nogood = result
            .learned_nogood
            .expect("conflict analysis above level 0 learns a nogood");

        debug!("Learned {learned_nogood}, backjumping to {}", result.backjump_level);
        self.choice_manager
            .backjump(result.backjump_level, &self.store, &mut self.assignment);

        self.statistics.num_learned_nogoods += 1;
        self.statistics
            .average_learned_nogood_length
            .add_term(learned_nogood.len() as u64);
        if let Some(lbd) = result.lbd {
            self.statistics
                .average_learned_nogood_lbd
                .add_term(u64::from(lbd));
        }
        if let Some(reboot_manager) = self.reboot_manager.as_mut() {
            reboot_manager.new_learned_nogood(&learned_nogood, self.grounder.atom_store());
        }
        let id = self.grounder.register(&learned_nogood);
        trace!("Registered the learned nogood {learned_nogood} as {id}");
        self.add_and_backjump_if_necessary(&learned_nogood, result.lbd)
    }

    fn choose(&mut self) -> bool {
        self.grow_for_max_atom_id();
        let choice_atoms = self.grounder.get_choice_atoms();
        let heads_to_bodies = self.grounder.get_heads_to_bodies();
        self.choice_manager
            .add_choice_information(&choice_atoms, &heads_to_bodies, &self.assignment);
        self.choice_manager.update_assignments(&mut self.assignment);
        for atom in self.choice_manager.drain_activated_choice_atoms() {
            self.heuristic.on_choice_point_activated(atom);
        }

        let context = SelectionContext::new(&self.choice_manager, &self.assignment);
        let Some(literal) = self.heuristic.choose_literal(&context) else {
            debug!("No choices left");
            return false;
        };
        self.choice_manager
            .choose(Choice::from_literal(literal), &mut self.assignment);
        true
    }

    fn close(&mut self) -> bool {
        self.state.after_all_atoms_assigned = true;
        self.assignment.close_unassigned_atoms()
    }

    fn provide_answer_set(&mut self) -> AnswerSet<G::Atom> {
        let answer_set = self
            .grounder
            .assignment_to_answer_set(self.assignment.true_atoms());
        self.statistics.num_answer_sets += 1;
        self.state.has_pending_answer_set = true;
        info!(
            "Answer set {}: {answer_set}",
            self.statistics.num_answer_sets
        );
        answer_set
    }

    fn backtrack_from_mbts_remaining(&mut self) {
        debug!(
            "{} atoms are must-be-true at fixpoint",
            self.assignment.mbt_count()
        );
        self.statistics.num_mbts_at_fixpoint += 1;
        // Backtracking below the closing undoes it.
        self.state.after_all_atoms_assigned = false;
        if !self.justify_mbt_and_backtrack() {
            self.state.is_search_space_completely_explored = true;
        }
    }

    /// Learns why a must-be-true atom cannot become true, falling back to chronological
    /// backtracking if the grounder has no explanation.
    fn justify_mbt_and_backtrack(&mut self) -> bool {
        if !self.disable_justifications {
            let atom = self
                .assignment
                .first_mbt_atom()
                .expect("there is a must-be-true atom to justify");
            if let Some(reasons) = self.grounder.justify_atom(atom, &self.assignment) {
                let nogood = NoGood::learnt(std::iter::once(Literal::positive(atom)).chain(reasons));
                debug!("Justification of {atom} yields {nogood}");
                self.statistics.num_justification_nogoods += 1;
                let id = self.grounder.register(&nogood);
                return self.ingest(vec![(id, nogood)]);
            }
            debug!("No justification for {atom}, backtracking");
        }
        self.statistics.num_mbt_backtracks += 1;
        self.backtrack()
    }

    /// Undoes choices until one can be inverted and inverts it. Returns `false` once every
    /// choice has been explored both ways.
    fn backtrack(&mut self) -> bool {
        while self.assignment.decision_level() != 0 {
            let (choice, entry) = self
                .choice_manager
                .backtrack_slow(&self.store, &mut self.assignment);
            let Some(entry) = entry else {
                debug!("Backtracking further, {choice} was inverted already");
                continue;
            };
            if self.assignment.is_assigned(choice.atom()) {
                // Must-be-true before it was chosen, or assigned out of order below the choice.
                debug!(
                    "Backtracking further, {} was {} before the choice and is still assigned",
                    entry.atom, entry.truth
                );
                continue;
            }
            let inverted = choice
                .inverted()
                .expect("a backtracked choice has been inverted before");
            self.choice_manager.choose(inverted, &mut self.assignment);
            return true;
        }
        false
    }

    fn is_reboot_scheduled(&self) -> bool {
        self.reboot_manager
            .as_ref()
            .is_some_and(RebootManager::is_reboot_scheduled)
    }

    /// Restarts the search from scratch with the nogoods learned so far, then replays the
    /// current choices.
    fn reboot(&mut self) {
        info!("Rebooting the search");
        let atomized_choices: Vec<AtomizedChoice<G::Atom>> = self
            .choice_manager
            .choices()
            .iter()
            .map(|choice| AtomizedChoice {
                atom: self
                    .grounder
                    .atom_store()
                    .get(choice.atom())
                    .expect("chosen atoms are known to the grounder")
                    .clone(),
                value: choice.value(),
                backtracked: choice.is_backtracked(),
            })
            .collect();
        if let Err(error) = self.grounder.reboot() {
            warn!("Reboots are disabled: {error}");
            self.reboot_manager = None;
            return;
        }

        self.store.clear();
        self.heuristic.reset();
        self.assignment.clear();
        self.choice_manager.clear();

        self.sync_with_grounder();
        let Some(reboot_manager) = self.reboot_manager.as_mut() else {
            return;
        };
        let enumeration_nogoods = reboot_manager.enumeration_nogoods(self.grounder.atom_store_mut());
        let learned_nogoods = reboot_manager.learned_nogoods(self.grounder.atom_store_mut());
        reboot_manager.reboot_performed();
        self.ingest_nogood_collection(enumeration_nogoods);
        self.ingest_nogood_collection(learned_nogoods);
        self.replay_choices(atomized_choices);

        self.statistics.num_reboots += 1;
        info!("Reboot finished");
    }

    fn replay_choices(&mut self, atomized_choices: Vec<AtomizedChoice<G::Atom>>) {
        if let Err(conflict) = self.propagate() {
            panic!("conflict while replaying the choices after a reboot: {conflict:?}");
        }
        for atomized in atomized_choices.iter() {
            let _ = self
                .grounder
                .atom_store_mut()
                .put_if_absent(atomized.atom.clone());
        }
        self.grow_for_max_atom_id();

        for atomized in atomized_choices {
            let atom = self.grounder.atom_store_mut().put_if_absent(atomized.atom);
            let choice = Choice::new(atom, atomized.value, atomized.backtracked);

            let choice_atoms = self.grounder.get_choice_atoms();
            let heads_to_bodies = self.grounder.get_heads_to_bodies();
            self.choice_manager
                .add_choice_information(&choice_atoms, &heads_to_bodies, &self.assignment);
            if !self.choice_manager.replay_choice(choice, &mut self.assignment) {
                continue;
            }
            if let Err(conflict) = self.propagate() {
                panic!("conflict while replaying {choice} after a reboot: {conflict:?}");
            }
            self.sync_with_grounder();
            if let Err(conflict) = self.propagate() {
                panic!("conflict while replaying {choice} after a reboot: {conflict:?}");
            }
        }
    }

    fn grow_for_max_atom_id(&mut self) {
        if let Some(max_atom) = self.grounder.atom_store().max_atom_id() {
            self.assignment.grow_for_max_atom_id(max_atom);
            self.store.grow_for_max_atom_id(max_atom);
            self.heuristic.grow_for_max_atom_id(max_atom);
        }
    }
}
