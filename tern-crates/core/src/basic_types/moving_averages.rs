//! Running averages for the solver statistics.
use std::fmt::Debug;
use std::fmt::Display;

pub(crate) trait MovingAverage: Debug {
    fn add_term(&mut self, new_term: u64);

    /// The current average; `0` while no term has been added.
    fn value(&self) -> f64;
}

/// The mean over every term seen so far.
#[derive(Default, Debug, Copy, Clone)]
pub(crate) struct CumulativeMovingAverage {
    sum: u64,
    num_terms: u64,
}

impl Display for CumulativeMovingAverage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value())
    }
}

impl MovingAverage for CumulativeMovingAverage {
    fn add_term(&mut self, new_term: u64) {
        self.sum += new_term;
        self.num_terms += 1
    }

    fn value(&self) -> f64 {
        if self.num_terms > 0 {
            (self.sum as f64) / (self.num_terms as f64)
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn average_of_nothing_is_zero() {
        assert_eq!(CumulativeMovingAverage::default().value(), 0.0);
    }

    #[test]
    fn average_follows_the_terms() {
        let mut average = CumulativeMovingAverage::default();
        average.add_term(2);
        average.add_term(4);
        assert_eq!(average.value(), 3.0);

        average.add_term(9);
        assert_eq!(average.value(), 5.0);
        assert_eq!(average.to_string(), "5");
    }
}
