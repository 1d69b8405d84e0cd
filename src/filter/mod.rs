//! Filtering and sorting of in-memory record collections.
//!
//! `apply` takes a snapshot of records and a `FilterSet` and returns a freshly allocated, stably
//! sorted and filtered copy. It never fails: a record with missing or malformed fields is simply
//! treated as having empty values.

mod sort;

use crate::model::{is_unset, reference_id, value_text, Record, SortOrder};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::trace;

use sort::stable_sort;

/// The field names that `apply` needs to know about for one kind of record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct FilterFields {
    /// Fields searched by the text query.
    #[serde(default)]
    text_fields: Vec<String>,
    /// The field holding the record's date, used by the date range.
    #[serde(default = "default_date_field")]
    date_field: String,
    /// The identifier key inside linked objects, used by the reference filter.
    #[serde(default = "default_id_key")]
    reference_id_key: String,
}

fn default_date_field() -> String {
    "date".to_string()
}

fn default_id_key() -> String {
    "id".to_string()
}

impl Default for FilterFields {
    fn default() -> Self {
        Self {
            text_fields: Vec::new(),
            date_field: default_date_field(),
            reference_id_key: default_id_key(),
        }
    }
}

impl FilterFields {
    pub fn new<S, I>(text_fields: I, date_field: impl Into<String>) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = S>,
    {
        Self {
            text_fields: text_fields.into_iter().map(Into::into).collect(),
            date_field: date_field.into(),
            reference_id_key: default_id_key(),
        }
    }

    #[must_use]
    pub fn with_reference_id_key(mut self, key: impl Into<String>) -> Self {
        self.reference_id_key = key.into();
        self
    }

    pub fn text_fields(&self) -> &[String] {
        &self.text_fields
    }

    pub fn date_field(&self) -> &str {
        &self.date_field
    }

    pub fn reference_id_key(&self) -> &str {
        &self.reference_id_key
    }
}

/// Equality on the identifier of a linked object, e.g. the bank account a charge was paid from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceFilter {
    field: String,
    /// Either the identifier itself or an object that carries it.
    value: Value,
}

impl ReferenceFilter {
    pub fn new(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }
}

/// The active predicates for a view. `FilterSet::default()` filters nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct FilterSet {
    #[serde(default)]
    search: String,
    #[serde(default)]
    equals: BTreeMap<String, Value>,
    #[serde(default)]
    reference: Option<ReferenceFilter>,
    #[serde(default)]
    start_date: Option<NaiveDate>,
    #[serde(default)]
    end_date: Option<NaiveDate>,
    /// Set by the caller when the date range is invalid; suppresses the date filter.
    #[serde(default)]
    date_range_error: bool,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_search(mut self, query: impl Into<String>) -> Self {
        self.search = query.into();
        self
    }

    /// Adds an exact-match filter on `field`. Setting a field twice keeps the last value.
    #[must_use]
    pub fn with_equals(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.equals.insert(field.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_reference(mut self, reference: ReferenceFilter) -> Self {
        self.reference = Some(reference);
        self
    }

    #[must_use]
    pub fn with_date_range(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.start_date = start;
        self.end_date = end;
        self
    }

    #[must_use]
    pub const fn with_date_range_error(mut self, error: bool) -> Self {
        self.date_range_error = error;
        self
    }

    /// Restores the fixed default, filtering nothing.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        self.start_date
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        self.end_date
    }

    pub fn date_range_error(&self) -> bool {
        self.date_range_error
    }

    /// True when no predicate is active.
    pub fn is_empty(&self) -> bool {
        self.search_query().is_none()
            && self.equals.values().all(is_unset)
            && self.reference.as_ref().map_or(true, |r| is_unset(&r.value))
            && self.active_date_range().is_none()
    }

    fn search_query(&self) -> Option<String> {
        let query = self.search.trim();
        (!query.is_empty()).then(|| query.to_lowercase())
    }

    /// Both bounds, when both are present and the caller has not flagged the range as invalid.
    fn active_date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        if self.date_range_error {
            return None;
        }
        Some((self.start_date?, self.end_date?))
    }
}

/// Sorts `records` by `order_by` and keeps those that pass every active predicate in `filters`.
///
/// The steps run in a fixed order: stable sort, text search, exact-match fields, reference,
/// date range. Each unset predicate lets every record through.
pub fn apply(
    records: &[Record],
    filters: &FilterSet,
    fields: &FilterFields,
    order_by: &str,
    order: SortOrder,
) -> Vec<Record> {
    let sorted = stable_sort(records, order_by, order);
    let query = filters.search_query();
    let date_range = filters.active_date_range();
    let reference = filters.reference.as_ref().and_then(|r| {
        let id = reference_id(&r.value, fields.reference_id_key())?;
        Some((r.field.as_str(), id))
    });

    let out: Vec<Record> = sorted
        .into_iter()
        .filter(|r| query.as_deref().map_or(true, |q| matches_text(r, fields, q)))
        .filter(|r| matches_equals(r, &filters.equals))
        .filter(|r| {
            reference.as_ref().map_or(true, |(field, id)| {
                r.reference_id(field, fields.reference_id_key()).as_deref() == Some(id.as_str())
            })
        })
        .filter(|r| {
            date_range.map_or(true, |(start, end)| {
                in_date_range(r, fields.date_field(), start, end)
            })
        })
        .collect();

    trace!(
        "apply kept {} of {} records (order_by={order_by}, order={order})",
        out.len(),
        records.len()
    );
    out
}

fn matches_text(record: &Record, fields: &FilterFields, query: &str) -> bool {
    fields
        .text_fields()
        .iter()
        .any(|f| record.text(f).to_lowercase().contains(query))
}

fn matches_equals(record: &Record, equals: &BTreeMap<String, Value>) -> bool {
    equals
        .iter()
        .filter(|(_, wanted)| !is_unset(wanted))
        .all(|(field, wanted)| record.text(field) == value_text(wanted))
}

fn in_date_range(record: &Record, field: &str, start: NaiveDate, end: NaiveDate) -> bool {
    record
        .date(field)
        .map_or(false, |date| start <= date && date < end)
}
