use std::fmt::Display;
use std::fmt::Formatter;

/// The truth values an atom can be assigned.
///
/// `MustBeTrue` marks an atom that is derived true by the nogoods but that has not (yet) been shown
/// to be founded. It counts as true for the nogoods and may later be strengthened to `True`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ThriceTruth {
    True,
    False,
    MustBeTrue,
}

impl ThriceTruth {
    /// The two-valued reading used by the nogoods: `MustBeTrue` counts as true.
    pub fn to_boolean(self) -> bool {
        matches!(self, ThriceTruth::True | ThriceTruth::MustBeTrue)
    }

    pub fn is_mbt(self) -> bool {
        self == ThriceTruth::MustBeTrue
    }

    pub fn from_boolean(value: bool) -> ThriceTruth {
        if value {
            ThriceTruth::True
        } else {
            ThriceTruth::False
        }
    }

    pub(crate) const fn into_bits(self) -> u8 {
        match self {
            ThriceTruth::True => 1,
            ThriceTruth::False => 2,
            ThriceTruth::MustBeTrue => 3,
        }
    }

    /// Decodes the packed representation, where `0` stands for unassigned.
    pub(crate) const fn from_bits(value: u8) -> Option<ThriceTruth> {
        match value {
            0 => None,
            1 => Some(ThriceTruth::True),
            2 => Some(ThriceTruth::False),
            3 => Some(ThriceTruth::MustBeTrue),
            _ => panic!("a truth value is packed into two bits"),
        }
    }
}

impl Display for ThriceTruth {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ThriceTruth::True => write!(f, "T"),
            ThriceTruth::False => write!(f, "F"),
            ThriceTruth::MustBeTrue => write!(f, "M"),
        }
    }
}
