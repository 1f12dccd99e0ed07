use std::fmt::Display;
use std::fmt::Formatter;

use enum_map::EnumMap;

use crate::basic_types::NoGoodType;
use crate::statistics::StatisticLogger;

/// Counts the nogoods in the store by origin and by size.
#[derive(Clone, Debug, Default)]
pub struct NoGoodCounter {
    by_type: EnumMap<NoGoodType, usize>,
    num_unary: usize,
    num_binary: usize,
    num_watched: usize,
}

impl NoGoodCounter {
    pub(crate) fn add(&mut self, nogood_type: NoGoodType, len: usize) {
        self.by_type[nogood_type] += 1;
        *self.size_class(len) += 1;
    }

    pub(crate) fn remove(&mut self, nogood_type: NoGoodType, len: usize) {
        self.by_type[nogood_type] -= 1;
        *self.size_class(len) -= 1;
    }

    pub fn num_of_type(&self, nogood_type: NoGoodType) -> usize {
        self.by_type[nogood_type]
    }

    pub fn num_unary(&self) -> usize {
        self.num_unary
    }

    pub fn num_binary(&self) -> usize {
        self.num_binary
    }

    pub fn num_watched(&self) -> usize {
        self.num_watched
    }

    pub fn total(&self) -> usize {
        self.by_type.values().sum()
    }

    pub(crate) fn log_statistics(&self, statistic_logger: StatisticLogger) {
        for (nogood_type, count) in self.by_type.iter() {
            statistic_logger
                .attach_to_prefix(format!("num_{nogood_type}"))
                .log_statistic(count);
        }
        statistic_logger
            .attach_to_prefix("num_unary")
            .log_statistic(self.num_unary);
        statistic_logger
            .attach_to_prefix("num_binary")
            .log_statistic(self.num_binary);
        statistic_logger
            .attach_to_prefix("num_watched")
            .log_statistic(self.num_watched);
    }

    fn size_class(&mut self, len: usize) -> &mut usize {
        match len {
            0 | 1 => &mut self.num_unary,
            2 => &mut self.num_binary,
            _ => &mut self.num_watched,
        }
    }
}

impl Display for NoGoodCounter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (nogood_type, count) in self.by_type.iter() {
            write!(f, "{nogood_type}: {count} ")?;
        }
        write!(
            f,
            "unary: {} binary: {} watched: {}",
            self.num_unary, self.num_binary, self.num_watched
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_by_type_and_size() {
        let mut counter = NoGoodCounter::default();
        counter.add(NoGoodType::Static, 1);
        counter.add(NoGoodType::Static, 4);
        counter.add(NoGoodType::Learnt, 3);
        counter.remove(NoGoodType::Learnt, 3);

        assert_eq!(counter.num_of_type(NoGoodType::Static), 2);
        assert_eq!(counter.num_of_type(NoGoodType::Learnt), 0);
        assert_eq!(counter.num_unary(), 1);
        assert_eq!(counter.num_watched(), 1);
        assert_eq!(counter.total(), 2);
    }
}
