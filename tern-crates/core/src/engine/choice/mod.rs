//! Bookkeeping of the guesses made during search.
mod choice_influence_manager;
mod choice_manager;

use std::fmt::Display;

pub use choice_influence_manager::ChoiceInfluenceManager;
pub use choice_influence_manager::ChoicePoint;
pub use choice_manager::ChoiceManager;

use crate::basic_types::Atom;
use crate::basic_types::Literal;

/// A guessed value for an atom.
///
/// A choice is `backtracked` if it is the inverse of a choice that has been undone before;
/// undoing it again means that both values of the atom have been explored at its level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Choice {
    atom: Atom,
    value: bool,
    backtracked: bool,
}

impl Choice {
    pub fn new(atom: Atom, value: bool, backtracked: bool) -> Choice {
        Choice {
            atom,
            value,
            backtracked,
        }
    }

    /// A fresh choice making `literal` hold.
    pub fn from_literal(literal: Literal) -> Choice {
        Choice::new(literal.atom(), literal.is_positive(), false)
    }

    pub fn atom(&self) -> Atom {
        self.atom
    }

    pub fn value(&self) -> bool {
        self.value
    }

    pub fn is_backtracked(&self) -> bool {
        self.backtracked
    }

    /// The literal that holds once the choice is made.
    pub fn literal(&self) -> Literal {
        Literal::new(self.atom, self.value)
    }

    /// The opposite choice, or `None` if this choice already is an inverted one.
    pub fn inverted(&self) -> Option<Choice> {
        (!self.backtracked).then(|| Choice::new(self.atom, !self.value, true))
    }
}

impl Display for Choice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.literal())?;
        if self.backtracked {
            write!(f, " (inverted)")?;
        }
        Ok(())
    }
}
