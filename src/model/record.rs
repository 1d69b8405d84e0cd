//! A `Record` is one row of backend data: a charge, an expense, an employee.
//!
//! The backend sends records as flat JSON objects whose shape differs per entity type, so a
//! `Record` is kept as an opaque map of field name to JSON value. Reads never fail: a missing or
//! malformed field degrades to an empty string, zero, or `None`.

use crate::model::Amount;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;

/// One row of domain data, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }

    /// Looks up a field by name. If there is no field with exactly that name, a dotted name such
    /// as `bank.name` walks into nested objects.
    pub fn get(&self, field: &str) -> Option<&Value> {
        if let Some(value) = self.0.get(field) {
            return Some(value);
        }
        let mut parts = field.split('.');
        let mut current = self.0.get(parts.next()?)?;
        for part in parts {
            current = current.as_object()?.get(part)?;
        }
        Some(current)
    }

    /// The text form of a field; empty when the field is missing.
    pub fn text(&self, field: &str) -> String {
        self.get(field).map(value_text).unwrap_or_default()
    }

    /// The numeric value of a field; zero when the field is missing or not a number.
    pub fn amount(&self, field: &str) -> Decimal {
        self.get(field).map(value_amount).unwrap_or(Decimal::ZERO)
    }

    /// The calendar date of a field, if it holds something that parses as a date.
    pub fn date(&self, field: &str) -> Option<NaiveDate> {
        self.get(field).and_then(Value::as_str).and_then(parse_date)
    }

    /// The identifier of a linked entity. The field may hold a nested object, in which case
    /// `id_key` names its identifier, or a bare identifier.
    pub fn reference_id(&self, field: &str, id_key: &str) -> Option<String> {
        reference_id(self.get(field)?, id_key)
    }
}

impl From<Map<String, Value>> for Record {
    fn from(fields: Map<String, Value>) -> Self {
        Record(fields)
    }
}

/// The text form of a JSON value. Strings are returned as-is, `null` is empty and structured
/// values are rendered as compact JSON.
pub(crate) fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Coerces a JSON value into a decimal; anything that is not numeric becomes zero.
pub(crate) fn value_amount(value: &Value) -> Decimal {
    match value {
        Value::Number(n) => {
            let s = n.to_string();
            Decimal::from_str(&s)
                .or_else(|_| Decimal::from_scientific(&s))
                .ok()
                .or_else(|| n.as_f64().and_then(Decimal::from_f64))
                .unwrap_or(Decimal::ZERO)
        }
        Value::String(s) => Amount::from_str(s)
            .map(|a| a.value())
            .unwrap_or(Decimal::ZERO),
        _ => Decimal::ZERO,
    }
}

/// True for values that mean "no filter": `null`, `""`, `{}` and `[]`.
pub(crate) fn is_unset(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Object(o) => o.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

pub(crate) fn reference_id(value: &Value, id_key: &str) -> Option<String> {
    match value {
        Value::Object(o) => o.get(id_key).filter(|v| !is_unset(v)).map(value_text),
        other if is_unset(other) => None,
        other => Some(value_text(other)),
    }
}

/// Parses `YYYY-MM-DD`, RFC 3339 timestamps and `YYYY-MM-DDTHH:MM:SS[.fff]` into a date.
pub(crate) fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|dt| dt.date())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        serde_json::from_value(value).unwrap()
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_get_walks_dotted_paths() {
        let r = record(json!({"bank": {"_id": "b1", "name": "City Bank"}, "a.b": 7}));
        assert_eq!(r.text("bank.name"), "City Bank");
        assert_eq!(r.text("a.b"), "7");
        assert!(r.get("bank.branch").is_none());
        assert!(r.get("missing.name").is_none());
    }

    #[test]
    fn test_text_defaults_to_empty() {
        let r = record(json!({"type": "Rent", "note": null, "count": 3}));
        assert_eq!(r.text("type"), "Rent");
        assert_eq!(r.text("note"), "");
        assert_eq!(r.text("nothing"), "");
        assert_eq!(r.text("count"), "3");
    }

    #[test]
    fn test_amount_coerces_to_zero() {
        let r = record(json!({
            "int": 100,
            "float": 40.5,
            "string": "-$1,200.25",
            "bad": "n/a",
            "flag": true,
            "nested": {"x": 1}
        }));
        assert_eq!(r.amount("int"), dec("100"));
        assert_eq!(r.amount("float"), dec("40.5"));
        assert_eq!(r.amount("string"), dec("-1200.25"));
        assert_eq!(r.amount("bad"), Decimal::ZERO);
        assert_eq!(r.amount("flag"), Decimal::ZERO);
        assert_eq!(r.amount("nested"), Decimal::ZERO);
        assert_eq!(r.amount("missing"), Decimal::ZERO);
    }

    #[test]
    fn test_date_formats() {
        let r = record(json!({
            "plain": "2024-01-15",
            "rfc": "2024-01-15T23:30:00Z",
            "naive": "2024-01-15T08:00:00.000",
            "bad": "15/01/2024",
            "number": 20240115
        }));
        let expected = NaiveDate::from_ymd_opt(2024, 1, 15);
        assert_eq!(r.date("plain"), expected);
        assert_eq!(r.date("rfc"), expected);
        assert_eq!(r.date("naive"), expected);
        assert_eq!(r.date("bad"), None);
        assert_eq!(r.date("number"), None);
    }

    #[test]
    fn test_reference_id() {
        let r = record(json!({
            "bank": {"_id": "b1", "name": "City Bank"},
            "plain": "b2",
            "empty": {},
            "no_id": {"name": "x"}
        }));
        assert_eq!(r.reference_id("bank", "_id").as_deref(), Some("b1"));
        assert_eq!(r.reference_id("plain", "_id").as_deref(), Some("b2"));
        assert_eq!(r.reference_id("empty", "_id"), None);
        assert_eq!(r.reference_id("no_id", "_id"), None);
        assert_eq!(r.reference_id("missing", "_id"), None);
    }

    #[test]
    fn test_is_unset() {
        assert!(is_unset(&json!(null)));
        assert!(is_unset(&json!("")));
        assert!(is_unset(&json!({})));
        assert!(!is_unset(&json!(" ")));
        assert!(!is_unset(&json!(0)));
        assert!(!is_unset(&json!(false)));
    }
}
