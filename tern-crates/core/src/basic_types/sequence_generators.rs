//! Integer sequences that schedule periodic events such as reboots.
use std::fmt::Debug;
use std::fmt::Display;

pub(crate) trait SequenceGenerator: Debug {
    fn next(&mut self) -> u64;
}

/// Which [`SequenceGenerator`] to use.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum SequenceGeneratorType {
    /// Always the base value.
    Constant,
    /// The base value, multiplied by a constant factor at every step.
    Geometric,
    /// The base value times the Luby sequence `1 1 2 1 1 2 4 ...`.
    Luby,
}

impl Display for SequenceGeneratorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SequenceGeneratorType::Constant => write!(f, "constant"),
            SequenceGeneratorType::Geometric => write!(f, "geometric"),
            SequenceGeneratorType::Luby => write!(f, "luby"),
        }
    }
}

impl SequenceGeneratorType {
    pub(crate) fn create(self, base: u64, multiplier: f64) -> Box<dyn SequenceGenerator> {
        match self {
            SequenceGeneratorType::Constant => Box::new(ConstantSequence { value: base }),
            SequenceGeneratorType::Geometric => Box::new(GeometricSequence::new(base, multiplier)),
            SequenceGeneratorType::Luby => Box::new(LubySequence::new(base)),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct ConstantSequence {
    value: u64,
}

impl SequenceGenerator for ConstantSequence {
    fn next(&mut self) -> u64 {
        self.value
    }
}

/// `f(0) = base`, `f(i) = floor(f(i - 1) * multiplier)`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct GeometricSequence {
    current_value: u64,
    multiplier: f64,
}

impl GeometricSequence {
    pub(crate) fn new(base: u64, multiplier: f64) -> GeometricSequence {
        GeometricSequence {
            current_value: base,
            multiplier,
        }
    }
}

impl SequenceGenerator for GeometricSequence {
    fn next(&mut self) -> u64 {
        let next_value = self.current_value;
        self.current_value = (self.current_value as f64 * self.multiplier) as u64;
        next_value
    }
}

// Knuth's "reluctant doubling": (u, v) walks the Luby sequence in constant time per step.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LubySequence {
    u: i64,
    v: u64,
    base: u64,
}

impl LubySequence {
    pub(crate) fn new(base: u64) -> LubySequence {
        LubySequence { u: 1, v: 1, base }
    }
}

impl SequenceGenerator for LubySequence {
    fn next(&mut self) -> u64 {
        let next_value = self.v;
        if (self.u & -self.u) as u64 == self.v {
            self.u += 1;
            self.v = 1;
        } else {
            self.v *= 2;
        }
        next_value * self.base
    }
}
