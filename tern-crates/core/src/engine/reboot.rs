//! Restarting the search from scratch while keeping what has been learned.
//!
//! A reboot throws away the nogood store, the assignment and the grounder state, and with them
//! every nogood the grounder produced for atoms that are irrelevant by now. Learned and
//! enumeration nogoods are kept in terms of the grounder's own atoms, since atom numbers are not
//! stable across a reboot.
use std::fmt::Debug;
use std::fmt::Display;
use std::hash::Hash;

use log::debug;

use crate::basic_types::sequence_generators::SequenceGenerator;
use crate::basic_types::Literal;
use crate::basic_types::NoGood;
use crate::basic_types::NoGoodType;
use crate::basic_types::SequenceGeneratorType;
use crate::grounder::AtomStore;
use crate::tern_assert_simple;

/// When to reboot: after a number of learned nogoods given by a sequence.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RebootOptions {
    pub strategy: SequenceGeneratorType,
    /// The first interval.
    pub base: u64,
    /// Used by the geometric strategy only.
    pub multiplier: f64,
}

impl Default for RebootOptions {
    fn default() -> Self {
        RebootOptions {
            strategy: SequenceGeneratorType::Geometric,
            base: 1000,
            multiplier: 1.5,
        }
    }
}

/// A nogood over the grounder's atoms.
#[derive(Clone, Debug, PartialEq, Eq)]
struct AtomizedNoGood<A> {
    literals: Vec<(A, bool)>,
    has_head: bool,
    nogood_type: NoGoodType,
}

impl<A: Clone + Eq + Hash + Display> AtomizedNoGood<A> {
    fn new(nogood: &NoGood, atom_store: &AtomStore<A>) -> AtomizedNoGood<A> {
        let literals = nogood
            .literals()
            .iter()
            .map(|literal| {
                let atom = atom_store
                    .get(literal.atom())
                    .expect("atoms of stored nogoods are known to the grounder")
                    .clone();
                (atom, literal.is_positive())
            })
            .collect();
        AtomizedNoGood {
            literals,
            has_head: nogood.has_head(),
            nogood_type: nogood.nogood_type(),
        }
    }

    fn deatomize(&self, atom_store: &mut AtomStore<A>) -> NoGood {
        let literals = self
            .literals
            .iter()
            .map(|(atom, is_positive)| {
                Literal::new(atom_store.put_if_absent(atom.clone()), *is_positive)
            });
        if self.has_head {
            NoGood::head_first(literals, self.nogood_type)
                .expect("a stored head stays valid")
        } else {
            NoGood::with_type(literals, self.nogood_type)
        }
    }
}

/// A choice made before a reboot, over the grounder's atoms.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct AtomizedChoice<A> {
    pub(crate) atom: A,
    pub(crate) value: bool,
    pub(crate) backtracked: bool,
}

/// Keeps what survives a reboot and decides when the next one is due.
#[derive(Debug)]
pub(crate) struct RebootManager<A> {
    enumeration_nogoods: Vec<AtomizedNoGood<A>>,
    learned_nogoods: Vec<AtomizedNoGood<A>>,
    interval: Box<dyn SequenceGenerator>,
    current_interval: u64,
    num_learned_since_reboot: u64,
}

impl<A: Clone + Eq + Hash + Display + Debug> RebootManager<A> {
    pub(crate) fn new(options: RebootOptions) -> RebootManager<A> {
        let mut interval = options.strategy.create(options.base, options.multiplier);
        let current_interval = interval.next();
        RebootManager {
            enumeration_nogoods: Vec::new(),
            learned_nogoods: Vec::new(),
            interval,
            current_interval,
            num_learned_since_reboot: 0,
        }
    }

    pub(crate) fn new_enumeration_nogood(&mut self, nogood: &NoGood, atom_store: &AtomStore<A>) {
        self.enumeration_nogoods
            .push(AtomizedNoGood::new(nogood, atom_store));
    }

    pub(crate) fn new_learned_nogood(&mut self, nogood: &NoGood, atom_store: &AtomStore<A>) {
        tern_assert_simple!(nogood.nogood_type() == NoGoodType::Learnt);
        self.learned_nogoods
            .push(AtomizedNoGood::new(nogood, atom_store));
        self.num_learned_since_reboot += 1;
    }

    pub(crate) fn is_reboot_scheduled(&self) -> bool {
        self.num_learned_since_reboot >= self.current_interval
    }

    pub(crate) fn reboot_performed(&mut self) {
        self.num_learned_since_reboot = 0;
        self.current_interval = self.interval.next();
        debug!("Next reboot after {} learned nogoods", self.current_interval);
    }

    /// The enumeration nogoods, renumbered for the current atom store.
    pub(crate) fn enumeration_nogoods(&self, atom_store: &mut AtomStore<A>) -> Vec<NoGood> {
        self.enumeration_nogoods
            .iter()
            .map(|nogood| nogood.deatomize(atom_store))
            .collect()
    }

    /// The learned nogoods, renumbered for the current atom store.
    pub(crate) fn learned_nogoods(&self, atom_store: &mut AtomStore<A>) -> Vec<NoGood> {
        self.learned_nogoods
            .iter()
            .map(|nogood| nogood.deatomize(atom_store))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_types::Atom;

    fn store(names: &[&str]) -> AtomStore<String> {
        let mut store = AtomStore::default();
        for name in names {
            let _ = store.put_if_absent((*name).to_owned());
        }
        store
    }

    #[test]
    fn nogoods_survive_renumbering() {
        let old_store = store(&["a", "b", "c"]);
        let mut manager = RebootManager::new(RebootOptions::default());
        let learned = NoGood::learnt([
            Literal::positive(Atom::new(0)),
            Literal::negative(Atom::new(2)),
        ]);
        manager.new_learned_nogood(&learned, &old_store);

        let mut new_store = store(&["c", "a"]);
        let renumbered = manager.learned_nogoods(&mut new_store);

        assert_eq!(
            renumbered,
            vec![NoGood::learnt([
                Literal::positive(Atom::new(1)),
                Literal::negative(Atom::new(0))
            ])]
        );
    }

    #[test]
    fn heads_are_kept() {
        let old_store = store(&["a", "b"]);
        let mut manager = RebootManager::new(RebootOptions::default());
        let nogood = NoGood::head_first(
            [Literal::negative(Atom::new(1)), Literal::positive(Atom::new(0))],
            NoGoodType::Internal,
        )
        .expect("negative head");
        manager.new_enumeration_nogood(&nogood, &old_store);

        let mut new_store = store(&["a", "b"]);
        assert_eq!(manager.enumeration_nogoods(&mut new_store), vec![nogood]);
    }

    #[test]
    fn reboots_follow_the_interval() {
        let atom_store = store(&["a"]);
        let mut manager: RebootManager<String> = RebootManager::new(RebootOptions {
            strategy: SequenceGeneratorType::Constant,
            base: 2,
            multiplier: 1.0,
        });
        let learned = NoGood::learnt([Literal::positive(Atom::new(0))]);

        manager.new_learned_nogood(&learned, &atom_store);
        assert!(!manager.is_reboot_scheduled());
        manager.new_learned_nogood(&learned, &atom_store);
        assert!(manager.is_reboot_scheduled());

        manager.reboot_performed();
        assert!(!manager.is_reboot_scheduled());
    }
}
