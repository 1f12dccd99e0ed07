use std::fmt::Display;
use std::fmt::Formatter;

use itertools::Itertools;

use crate::basic_types::Literal;
use crate::basic_types::NoGood;
use crate::basic_types::NoGoodType;
use crate::containers::StorageKey;
use crate::tern_assert_moderate;
use crate::tern_assert_simple;

/// Identifies a nogood of size three or more inside the [`NoGoodStore`].
///
/// [`NoGoodStore`]: super::NoGoodStore
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WatchedNoGoodId {
    id: u32,
}

impl StorageKey for WatchedNoGoodId {
    fn index(&self) -> usize {
        self.id as usize
    }

    fn create_from_index(index: usize) -> Self {
        WatchedNoGoodId { id: index as u32 }
    }
}

impl Display for WatchedNoGoodId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.id)
    }
}

/// A nogood with its two ordinary watches kept at positions 0 and 1.
///
/// Watches are moved by swapping literals, so the positions of the head and of the alpha watch are
/// updated on every swap.
#[derive(Clone, Debug)]
pub(crate) struct WatchedNoGood {
    literals: Box<[Literal]>,
    head: Option<usize>,
    alpha: Option<usize>,
    nogood_type: NoGoodType,
    /// Only present for learnt nogoods.
    lbd: Option<u32>,
    activity: u32,
    /// Set once the nogood is no longer registered in any watch list.
    is_deleted: bool,
}

impl WatchedNoGood {
    /// Creates the watched form of `nogood`, watching the literals at `first` and `second`, and
    /// with the alpha watch at `alpha` if the nogood has a head.
    pub(crate) fn new(
        nogood: &NoGood,
        first: usize,
        second: usize,
        alpha: Option<usize>,
        lbd: Option<u32>,
    ) -> WatchedNoGood {
        tern_assert_simple!(nogood.len() > 2, "binary and unary nogoods are not watched");
        tern_assert_simple!(first != second, "both watches point to literal {first}");
        tern_assert_simple!(nogood.has_head() == alpha.is_some());

        let mut watched = WatchedNoGood {
            literals: nogood.literals().into(),
            head: nogood.has_head().then_some(0),
            alpha,
            nogood_type: nogood.nogood_type(),
            lbd,
            activity: 0,
            is_deleted: false,
        };

        if second == 0 {
            watched.swap(1, first);
        } else {
            watched.swap(0, first);
            watched.swap(1, second);
        }
        watched
    }

    pub(crate) fn literals(&self) -> &[Literal] {
        &self.literals
    }

    pub(crate) fn literal(&self, index: usize) -> Literal {
        self.literals[index]
    }

    pub(crate) fn len(&self) -> usize {
        self.literals.len()
    }

    pub(crate) fn head_index(&self) -> Option<usize> {
        self.head
    }

    pub(crate) fn head(&self) -> Option<Literal> {
        self.head.map(|index| self.literals[index])
    }

    pub(crate) fn alpha_index(&self) -> Option<usize> {
        self.alpha
    }

    pub(crate) fn alpha_literal(&self) -> Option<Literal> {
        self.alpha.map(|index| self.literals[index])
    }

    pub(crate) fn set_alpha(&mut self, index: usize) {
        tern_assert_moderate!(Some(index) != self.head);
        self.alpha = Some(index);
    }

    pub(crate) fn nogood_type(&self) -> NoGoodType {
        self.nogood_type
    }

    pub(crate) fn has_lbd_at_most_two(&self) -> bool {
        self.lbd.is_some_and(|lbd| lbd <= 2)
    }

    pub(crate) fn activity(&self) -> u32 {
        self.activity
    }

    pub(crate) fn bump_activity(&mut self) {
        self.activity = self.activity.saturating_add(1);
    }

    pub(crate) fn decrease_activity(&mut self) {
        self.activity >>= 1;
    }

    pub(crate) fn is_deleted(&self) -> bool {
        self.is_deleted
    }

    pub(crate) fn mark_deleted(&mut self) {
        self.is_deleted = true;
    }

    /// Swaps two literals, keeping track of where the head and the alpha watch end up.
    pub(crate) fn swap(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        self.literals.swap(a, b);
        for position in [&mut self.head, &mut self.alpha].into_iter().flatten() {
            if *position == a {
                *position = b;
            } else if *position == b {
                *position = a;
            }
        }
    }

    /// Rebuilds the plain nogood, with the head in front again.
    pub(crate) fn to_nogood(&self) -> NoGood {
        match self.head() {
            Some(head) => {
                let body = self
                    .literals
                    .iter()
                    .enumerate()
                    .filter(|&(index, _)| Some(index) != self.head)
                    .map(|(_, &literal)| literal);
                NoGood::head_first(std::iter::once(head).chain(body), self.nogood_type)
                    .expect("a stored head is always valid")
            }
            None => NoGood::with_type(self.literals.iter().copied(), self.nogood_type),
        }
    }
}

impl Display for WatchedNoGood {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let literals = self.literals.iter().enumerate().map(|(index, literal)| {
            let mut marks = String::new();
            if index < 2 {
                marks.push('w');
            }
            if Some(index) == self.alpha {
                marks.push('a');
            }
            if Some(index) == self.head {
                marks.push('h');
            }
            if marks.is_empty() {
                format!("{literal}")
            } else {
                format!("{literal}:{marks}")
            }
        });
        write!(f, "{{ {} }}", literals.format(" "))
    }
}
