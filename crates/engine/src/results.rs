use crate::counter::{Counter, CounterKind};
use crate::order::Order;

/// Finished tally of one entry.
#[derive(Clone, Debug)]
pub struct Record {
    pub name: String,
    pub order: Order,
    pub counter: Counter,
}

impl Record {
    pub fn new(name: impl Into<String>, order: Order, counter: Counter) -> Self {
        Self {
            name: name.into(),
            order,
            counter,
        }
    }
}

/// Aggregated results of a run, kept sorted by [`Order`].
///
/// Records may be pushed in any order; iteration always follows the
/// traversal order of the inputs.
#[derive(Clone, Debug)]
pub struct ResultSet {
    kind: CounterKind,
    records: Vec<Record>,
    total: Counter,
}

impl ResultSet {
    pub fn new(kind: CounterKind) -> Self {
        Self {
            kind,
            records: Vec::new(),
            total: Counter::new(kind),
        }
    }

    pub fn push(&mut self, record: Record) {
        self.total += &record.counter;
        let at = self
            .records
            .partition_point(|existing| existing.order <= record.order);
        self.records.insert(at, record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn total(&self) -> &Counter {
        &self.total
    }

    /// Requested categories.
    pub const fn kind(&self) -> CounterKind {
        self.kind
    }

    pub fn counter(&self, name: &str) -> Option<&Counter> {
        self.records
            .iter()
            .find(|record| record.name == name)
            .map(|record| &record.counter)
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Extend<Record> for ResultSet {
    fn extend<T: IntoIterator<Item = Record>>(&mut self, iter: T) {
        for record in iter {
            self.push(record);
        }
    }
}
