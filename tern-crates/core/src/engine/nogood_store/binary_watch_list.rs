use crate::basic_types::Literal;

/// The binary nogoods containing one particular literal, stored as their other literal.
///
/// Binary nogoods never get a [`WatchedNoGood`]; both literals are watched implicitly by keeping
/// the nogood in the list of each of them.
///
/// [`WatchedNoGood`]: super::WatchedNoGood
#[derive(Clone, Debug, Default)]
pub(crate) struct BinaryWatchList {
    /// The heads of binary nogoods whose other literal is the one this list belongs to.
    with_head: Vec<Literal>,
    without_head: Vec<Literal>,
}

impl BinaryWatchList {
    pub(crate) fn add_with_head(&mut self, head: Literal) {
        self.with_head.push(head);
    }

    pub(crate) fn add_without_head(&mut self, other: Literal) {
        self.without_head.push(other);
    }

    pub(crate) fn with_head(&self) -> &[Literal] {
        &self.with_head
    }

    /// Every other literal, those of headless nogoods first.
    pub(crate) fn others(&self) -> impl Iterator<Item = Literal> + '_ {
        self.without_head
            .iter()
            .chain(self.with_head.iter())
            .copied()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.with_head.is_empty() && self.without_head.is_empty()
    }
}
