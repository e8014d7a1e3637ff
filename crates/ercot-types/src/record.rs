//! Raw report records as returned by the API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One report row: positional fields in the order the API returns them.
///
/// The meaning and count of fields is report-specific and is supplied by the
/// report layout, never inferred here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct RawRecord(Vec<Value>);

impl RawRecord {
    /// Creates a record from its positional fields.
    #[must_use]
    pub const fn new(fields: Vec<Value>) -> Self {
        Self(fields)
    }

    /// Returns the number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the record has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the field at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.0.get(index)
    }

    /// Returns all fields.
    #[must_use]
    pub fn fields(&self) -> &[Value] {
        &self.0
    }
}

impl From<Vec<Value>> for RawRecord {
    fn from(fields: Vec<Value>) -> Self {
        Self(fields)
    }
}

/// All records of one logical request, concatenated across pages.
///
/// Records keep the order pages were received in, which is not necessarily
/// chronological.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawRecordSet {
    records: Vec<RawRecord>,
    pages: usize,
}

impl RawRecordSet {
    /// Creates an empty record set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            records: Vec::new(),
            pages: 0,
        }
    }

    /// Appends one page of records.
    pub fn push_page(&mut self, page: Vec<RawRecord>) {
        self.records.extend(page);
        self.pages += 1;
    }

    /// Returns the number of pages appended.
    #[must_use]
    pub const fn pages(&self) -> usize {
        self.pages
    }

    /// Returns the number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if there are no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the records as a slice.
    #[must_use]
    pub fn records(&self) -> &[RawRecord] {
        &self.records
    }

    /// Returns an iterator over the records.
    pub fn iter(&self) -> std::slice::Iter<'_, RawRecord> {
        self.records.iter()
    }
}

impl FromIterator<RawRecord> for RawRecordSet {
    fn from_iter<I: IntoIterator<Item = RawRecord>>(iter: I) -> Self {
        let mut set = Self::new();
        set.push_page(iter.into_iter().collect());
        set
    }
}

impl<'a> IntoIterator for &'a RawRecordSet {
    type Item = &'a RawRecord;
    type IntoIter = std::slice::Iter<'a, RawRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
