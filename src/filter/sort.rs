use crate::model::{Record, SortOrder};
use serde_json::{Number, Value};
use std::cmp::Ordering;

/// Returns a copy of `records` sorted by `field`. Rows with equal keys keep their input order in
/// both directions.
pub(crate) fn stable_sort(records: &[Record], field: &str, order: SortOrder) -> Vec<Record> {
    let mut indexed: Vec<(usize, &Record)> = records.iter().enumerate().collect();
    indexed.sort_by(|(a_ix, a), (b_ix, b)| {
        let by_key = compare_values(a.get(field), b.get(field));
        let by_key = match order {
            SortOrder::Asc => by_key,
            SortOrder::Desc => by_key.reverse(),
        };
        by_key.then_with(|| a_ix.cmp(b_ix))
    });
    indexed.into_iter().map(|(_, r)| r.clone()).collect()
}

/// Orders two optional field values. Missing and `null` values come first, then booleans,
/// numbers, strings and finally structured values. Within a kind the natural order applies; ISO
/// dates are strings and therefore sort chronologically.
pub(crate) fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.unwrap_or(&Value::Null);
    let b = b.unwrap_or(&Value::Null);
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => match (as_integer(x), as_integer(y)) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => {
                let x = x.as_f64().unwrap_or_default();
                let y = y.as_f64().unwrap_or_default();
                x.partial_cmp(&y).unwrap_or(Ordering::Equal)
            }
        },
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

/// Integers compare exactly; `f64` loses precision above 2^53.
fn as_integer(n: &Number) -> Option<i128> {
    n.as_i64()
        .map(i128::from)
        .or_else(|| n.as_u64().map(i128::from))
}

fn rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}
