use super::Atom;
use super::Literal;
use super::NoGood;
use crate::engine::nogood_store::NoGoodStore;
use crate::engine::nogood_store::WatchedNoGoodId;

/// The reason an atom got its value: the nogood that became unit.
///
/// Unary and binary nogoods are not stored as objects, so their literals are carried inline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Antecedent {
    Unary(Literal),
    Binary([Literal; 2]),
    Watched(WatchedNoGoodId),
    /// The atom was set to false because nothing derived it once every other atom was assigned.
    Closing,
}

impl Antecedent {
    /// The literals of the nogood behind this antecedent.
    pub fn reason_literals<'a>(&'a self, store: &'a NoGoodStore) -> &'a [Literal] {
        match self {
            Antecedent::Unary(literal) => std::slice::from_ref(literal),
            Antecedent::Binary(literals) => literals,
            Antecedent::Watched(id) => store.watched_literals(*id),
            Antecedent::Closing => &[],
        }
    }
}

/// Why an assignment or a propagation failed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConflictCause {
    /// A nogood known to the store is violated.
    Violated(Antecedent),
    /// A nogood that was being added is violated already; it has not been stored.
    Addition(NoGood),
    /// A choice contradicted the current value of its atom.
    Choice(Atom),
}

impl ConflictCause {
    pub fn reason_literals<'a>(&'a self, store: &'a NoGoodStore) -> &'a [Literal] {
        match self {
            ConflictCause::Violated(antecedent) => antecedent.reason_literals(store),
            ConflictCause::Addition(nogood) => nogood.literals(),
            ConflictCause::Choice(atom) => {
                panic!("the choice of atom {atom} contradicts the assignment and has no reason")
            }
        }
    }
}
