use std::fmt::Display;
use std::fmt::Formatter;
use std::ops::Not;

use crate::containers::StorageKey;

/// An atom as numbered by the grounder's atom store.
///
/// The solver never looks inside an atom; it only uses the number to index its own tables.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Atom(u32);

impl Atom {
    pub const fn new(id: u32) -> Atom {
        Atom(id)
    }

    pub fn id(self) -> u32 {
        self.0
    }
}

impl StorageKey for Atom {
    fn index(&self) -> usize {
        self.0 as usize
    }

    fn create_from_index(index: usize) -> Self {
        Atom(index as u32)
    }
}

impl Display for Atom {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An atom together with a polarity, stored as `atom * 2 + negated`.
///
/// The encoding orders a positive literal directly before its negation, which is the canonical
/// order of literals inside a nogood.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Literal {
    code: u32,
}

impl Literal {
    pub fn new(atom: Atom, is_positive: bool) -> Literal {
        Literal {
            code: (atom.0 << 1) | u32::from(!is_positive),
        }
    }

    pub fn positive(atom: Atom) -> Literal {
        Literal::new(atom, true)
    }

    pub fn negative(atom: Atom) -> Literal {
        Literal::new(atom, false)
    }

    pub fn atom(self) -> Atom {
        Atom(self.code >> 1)
    }

    pub fn is_positive(self) -> bool {
        self.code & 1 == 0
    }

    pub fn is_negative(self) -> bool {
        !self.is_positive()
    }

    /// The literal with the same atom but the opposite polarity.
    pub fn negated(self) -> Literal {
        Literal {
            code: self.code ^ 1,
        }
    }

    pub fn code(self) -> u32 {
        self.code
    }
}

impl Not for Literal {
    type Output = Literal;

    fn not(self) -> Self::Output {
        self.negated()
    }
}

impl StorageKey for Literal {
    fn index(&self) -> usize {
        self.code as usize
    }

    fn create_from_index(index: usize) -> Self {
        Literal { code: index as u32 }
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let sign = if self.is_positive() { '+' } else { '-' };
        write!(f, "{sign}{}", self.atom())
    }
}

impl std::fmt::Debug for Literal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self}")
    }
}
