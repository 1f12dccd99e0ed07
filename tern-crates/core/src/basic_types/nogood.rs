use std::fmt::Display;
use std::fmt::Formatter;

use enum_map::Enum;
use itertools::Itertools;

use super::Atom;
use super::Literal;
use super::NoGoodError;

/// The origin of a nogood, which decides how long the store keeps it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Enum)]
pub enum NoGoodType {
    /// Generated by the grounder from the program; kept forever.
    Static,
    /// Derived by conflict analysis or justification; may be deleted again.
    Learnt,
    /// Expresses that a derived atom needs a supporting rule body.
    Support,
    /// Created by the solver itself, such as the nogoods that block enumerated answer sets.
    Internal,
}

impl Display for NoGoodType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            NoGoodType::Static => write!(f, "static"),
            NoGoodType::Learnt => write!(f, "learnt"),
            NoGoodType::Support => write!(f, "support"),
            NoGoodType::Internal => write!(f, "internal"),
        }
    }
}

/// A set of literals that must never hold all at the same time.
///
/// The literals are kept sorted and free of duplicates so that equal nogoods compare equal. A
/// nogood may have a head: a negative literal at position 0 standing for an atom that the other
/// literals derive. Once all non-head literals hold, the head atom is not only must-be-true but
/// `True`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct NoGood {
    literals: Box<[Literal]>,
    has_head: bool,
    nogood_type: NoGoodType,
}

impl NoGood {
    /// A headless nogood of the given type.
    pub fn with_type(literals: impl IntoIterator<Item = Literal>, nogood_type: NoGoodType) -> NoGood {
        let literals: Vec<Literal> = literals.into_iter().sorted().dedup().collect();
        NoGood {
            literals: literals.into_boxed_slice(),
            has_head: false,
            nogood_type,
        }
    }

    /// A headless static nogood.
    pub fn new(literals: impl IntoIterator<Item = Literal>) -> NoGood {
        NoGood::with_type(literals, NoGoodType::Static)
    }

    /// A nogood whose first literal is its head.
    pub fn head_first(
        literals: impl IntoIterator<Item = Literal>,
        nogood_type: NoGoodType,
    ) -> Result<NoGood, NoGoodError> {
        let mut literals = literals.into_iter();
        let head = literals.next().ok_or(NoGoodError::MissingHead)?;
        if head.is_positive() {
            return Err(NoGoodError::PositiveHead(head));
        }

        let body = literals.filter(|&literal| literal != head).sorted().dedup();
        let literals: Vec<Literal> = std::iter::once(head).chain(body).collect();
        Ok(NoGood {
            literals: literals.into_boxed_slice(),
            has_head: true,
            nogood_type,
        })
    }

    /// The nogood `{-atom}`, which makes `atom` true.
    pub fn fact(atom: Atom) -> NoGood {
        NoGood {
            literals: vec![Literal::negative(atom)].into_boxed_slice(),
            has_head: true,
            nogood_type: NoGoodType::Static,
        }
    }

    /// The nogood `{+head, -body_1, ..., -body_n}`: `head` may only be true if one of the rule
    /// bodies deriving it is.
    pub fn support(head: Atom, body_representatives: &[Atom]) -> NoGood {
        NoGood::with_type(
            std::iter::once(Literal::positive(head))
                .chain(body_representatives.iter().map(|&body| Literal::negative(body))),
            NoGoodType::Support,
        )
    }

    /// The headed nogood `{-head, +body}`, making `head` true once the body is.
    pub fn derivation(head: Atom, body_representative: Atom) -> NoGood {
        NoGood {
            literals: vec![Literal::negative(head), Literal::positive(body_representative)]
                .into_boxed_slice(),
            has_head: true,
            nogood_type: NoGoodType::Static,
        }
    }

    /// The nogood deriving `body_representative` from a rule body with the positive atoms `pos`
    /// and the negated atoms `neg`.
    pub fn from_body(pos: &[Atom], neg: &[Atom], body_representative: Atom) -> NoGood {
        let body = pos
            .iter()
            .map(|&atom| Literal::positive(atom))
            .chain(neg.iter().map(|&atom| Literal::negative(atom)));
        NoGood::head_first(
            std::iter::once(Literal::negative(body_representative)).chain(body),
            NoGoodType::Static,
        )
        .expect("the head of a body nogood is negative")
    }

    /// An integrity constraint forbidding that all of `pos` are true while all of `neg` are
    /// false.
    pub fn from_constraint(pos: &[Atom], neg: &[Atom]) -> NoGood {
        NoGood::new(
            pos.iter()
                .map(|&atom| Literal::positive(atom))
                .chain(neg.iter().map(|&atom| Literal::negative(atom))),
        )
    }

    pub fn learnt(literals: impl IntoIterator<Item = Literal>) -> NoGood {
        NoGood::with_type(literals, NoGoodType::Learnt)
    }

    pub fn internal(literals: impl IntoIterator<Item = Literal>) -> NoGood {
        NoGood::with_type(literals, NoGoodType::Internal)
    }

    pub fn literals(&self) -> &[Literal] {
        &self.literals
    }

    pub fn literal(&self, index: usize) -> Literal {
        self.literals[index]
    }

    pub fn len(&self) -> usize {
        self.literals.len()
    }

    /// The empty nogood is violated by every assignment.
    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    pub fn is_unary(&self) -> bool {
        self.literals.len() == 1
    }

    pub fn is_binary(&self) -> bool {
        self.literals.len() == 2
    }

    pub fn has_head(&self) -> bool {
        self.has_head
    }

    pub fn head(&self) -> Option<Literal> {
        self.has_head.then(|| self.literals[0])
    }

    pub fn nogood_type(&self) -> NoGoodType {
        self.nogood_type
    }

    pub fn atoms(&self) -> impl Iterator<Item = Atom> + '_ {
        self.literals.iter().map(|literal| literal.atom())
    }

    /// Whether some atom occurs with both polarities, in which case the nogood can never be
    /// violated.
    pub fn has_complementary_literals(&self) -> bool {
        // Sorting places the two polarities of an atom next to each other; the head is the only
        // literal outside that order.
        let body_start = usize::from(self.has_head);
        let body = &self.literals[body_start..];
        let head_clashes = self
            .head()
            .is_some_and(|head| body.binary_search(&head.negated()).is_ok());
        head_clashes
            || body
                .windows(2)
                .any(|pair| pair[0].atom() == pair[1].atom())
    }

    pub fn max_atom(&self) -> Option<Atom> {
        self.atoms().max()
    }

    /// The same nogood with another type.
    pub(crate) fn retyped(&self, nogood_type: NoGoodType) -> NoGood {
        NoGood {
            literals: self.literals.clone(),
            has_head: self.has_head,
            nogood_type,
        }
    }
}

impl Display for NoGood {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.has_head {
            write!(f, "*")?;
        }
        write!(f, "{{ {} }}", self.literals.iter().join(" "))
    }
}

impl std::fmt::Debug for NoGood {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{self}", self.nogood_type)
    }
}


#[cfg(test)]
mod tests {
    use super::test_helpers::*;
    use super::*;

    #[test]
    fn literals_are_sorted_and_deduplicated() {
        let nogood = nogood(&[5, -2, 5, 1]);

        assert_eq!(nogood.literals(), &[lit(1), lit(-2), lit(5)]);
        assert_eq!(nogood, super::test_helpers::nogood(&[1, 5, -2]));
    }

    #[test]
    fn head_stays_in_front() {
        let nogood = headed(&[-9, 4, 1, -9]);

        assert_eq!(nogood.head(), Some(lit(-9)));
        assert_eq!(nogood.literals(), &[lit(-9), lit(1), lit(4)]);
    }

    #[test]
    fn positive_head_is_rejected() {
        let result = NoGood::head_first([lit(3), lit(4)], NoGoodType::Static);
        assert_eq!(result, Err(NoGoodError::PositiveHead(lit(3))));
    }

    #[test]
    fn body_nogood_puts_representative_first() {
        let nogood = NoGood::from_body(&[Atom::new(2)], &[Atom::new(1)], Atom::new(7));

        assert_eq!(nogood.head(), Some(lit(-7)));
        assert_eq!(nogood.to_string(), "*{ -7 -1 +2 }");
    }

    #[test]
    fn complementary_literals_are_detected() {
        assert!(nogood(&[1, -1]).has_complementary_literals());
        assert!(headed(&[-3, 3, 5]).has_complementary_literals());
        assert!(!nogood(&[1, -2, 3]).has_complementary_literals());
    }

    #[test]
    fn support_and_derivation_relate_head_and_bodies() {
        let support = NoGood::support(Atom::new(3), &[Atom::new(5), Atom::new(1)]);
        assert_eq!(support.nogood_type(), NoGoodType::Support);
        assert!(!support.has_head());
        assert_eq!(support.literals(), &[lit(-1), lit(3), lit(-5)]);

        let derivation = NoGood::derivation(Atom::new(3), Atom::new(5));
        assert_eq!(derivation.to_string(), "*{ -3 +5 }");
    }

    #[test]
    fn fact_is_a_unary_headed_nogood() {
        let fact = NoGood::fact(Atom::new(4));

        assert!(fact.is_unary());
        assert_eq!(fact.to_string(), "*{ -4 }");
    }
}
