//! Grouped, signed sums over records.
//!
//! Totals screens group records by a key field (a charge's `type`, an expense's `category`) and
//! sum one or more amount fields per group. Whether an amount adds or subtracts depends on a sign
//! field such as `transaction: "credit" | "debit"`.

use crate::model::{GroupTotal, Record};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{trace, warn};

/// Describes how to group and sign the records of one view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AggregateSpec {
    /// Records are grouped by the text form of this field.
    group_field: String,
    /// These fields are summed for every record.
    amount_fields: Vec<String>,
    /// The field that decides whether a record adds or subtracts.
    sign_field: String,
    /// The `sign_field` value that adds.
    positive_value: String,
    /// The `sign_field` value that subtracts.
    negative_value: String,
}

impl AggregateSpec {
    pub fn new<S, I>(
        group_field: impl Into<String>,
        amount_fields: I,
        sign_field: impl Into<String>,
        positive_value: impl Into<String>,
        negative_value: impl Into<String>,
    ) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = S>,
    {
        Self {
            group_field: group_field.into(),
            amount_fields: amount_fields.into_iter().map(Into::into).collect(),
            sign_field: sign_field.into(),
            positive_value: positive_value.into(),
            negative_value: negative_value.into(),
        }
    }

    pub fn group_field(&self) -> &str {
        &self.group_field
    }

    pub fn amount_fields(&self) -> &[String] {
        &self.amount_fields
    }

    pub fn sign_field(&self) -> &str {
        &self.sign_field
    }

    /// The signed contribution of one record: the sum of its amount fields, negated for
    /// `negative_value` and zero when the sign field matches neither value.
    fn contribution(&self, record: &Record) -> Decimal {
        let sign = record.text(&self.sign_field);
        let sum = self
            .amount_fields
            .iter()
            .map(|f| record.amount(f))
            .fold(Decimal::ZERO, saturating_add);
        if sign == self.positive_value {
            sum
        } else if sign == self.negative_value {
            -sum
        } else {
            Decimal::ZERO
        }
    }
}

/// Groups `records` by `spec.group_field` and returns one signed total per group, in the order
/// the groups are first seen. Totals are rounded to two decimal places, halves away from zero.
pub fn aggregate(records: &[Record], spec: &AggregateSpec) -> Vec<GroupTotal> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut sums: Vec<(String, Decimal)> = Vec::new();

    for record in records {
        let key = record.text(&spec.group_field);
        let ix = match index.get(&key) {
            Some(ix) => *ix,
            None => {
                index.insert(key.clone(), sums.len());
                sums.push((key, Decimal::ZERO));
                sums.len() - 1
            }
        };
        sums[ix].1 = saturating_add(sums[ix].1, spec.contribution(record));
    }

    trace!(
        "aggregated {} records into {} groups by '{}'",
        records.len(),
        sums.len(),
        spec.group_field
    );

    sums.into_iter()
        .map(|(key, sum)| GroupTotal::new(key, round_cents(sum)))
        .collect()
}

/// The sum of all group totals.
pub fn net_total(totals: &[GroupTotal]) -> Decimal {
    round_cents(
        totals
            .iter()
            .map(GroupTotal::total)
            .fold(Decimal::ZERO, saturating_add),
    )
}

/// Adds two amounts, clamping to `Decimal::MAX` or `Decimal::MIN` when the sum is out of range.
fn saturating_add(a: Decimal, b: Decimal) -> Decimal {
    a.checked_add(b).unwrap_or_else(|| {
        warn!("The sum of {a} and {b} is out of range, clamping the total");
        if b.is_sign_negative() {
            Decimal::MIN
        } else {
            Decimal::MAX
        }
    })
}

/// Rounds to two decimal places and always carries a scale of two, so `60` becomes `60.00`.
pub(crate) fn round_cents(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    if rounded.is_zero() {
        // Drop the sign of a negative zero.
        rounded = Decimal::ZERO;
    }
    rounded.rescale(2);
    rounded
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn spec() -> AggregateSpec {
        AggregateSpec::new("type", ["amt"], "sign", "in", "out")
    }

    fn records(value: serde_json::Value) -> Vec<Record> {
        serde_json::from_value(value).unwrap()
    }

    fn pairs(totals: &[GroupTotal]) -> Vec<(String, String)> {
        totals
            .iter()
            .map(|g| (g.key().to_string(), g.total().to_string()))
            .collect()
    }

    #[test]
    fn test_aggregate_example() {
        let input = records(json!([
            {"type": "A", "amt": 100, "sign": "in"},
            {"type": "A", "amt": 40, "sign": "out"},
            {"type": "B", "amt": 10, "sign": "in"}
        ]));
        let totals = aggregate(&input, &spec());
        assert_eq!(
            pairs(&totals),
            [
                ("A".to_string(), "60.00".to_string()),
                ("B".to_string(), "10.00".to_string())
            ]
        );
        assert_eq!(net_total(&totals).to_string(), "70.00");
    }

    #[test]
    fn test_aggregate_empty() {
        assert!(aggregate(&[], &spec()).is_empty());
        assert_eq!(net_total(&[]).to_string(), "0.00");
    }

    #[test]
    fn test_single_group_alternating_sign() {
        let input = records(json!([
            {"type": "X", "amt": "10.005", "sign": "in"},
            {"type": "X", "amt": 3.3, "sign": "out"},
            {"type": "X", "amt": 7, "sign": "in"},
            {"type": "X", "amt": 0.001, "sign": "out"}
        ]));
        // 10.005 - 3.3 + 7 - 0.001 = 13.704
        let totals = aggregate(&input, &spec());
        assert_eq!(pairs(&totals), [("X".to_string(), "13.70".to_string())]);
    }

    #[test]
    fn test_groups_keep_first_seen_order() {
        let input = records(json!([
            {"type": "Zeta", "amt": 1, "sign": "in"},
            {"type": "Alpha", "amt": 1, "sign": "in"},
            {"type": "Zeta", "amt": 1, "sign": "in"},
            {"type": "Mid", "amt": 1, "sign": "in"}
        ]));
        let keys: Vec<String> = aggregate(&input, &spec())
            .iter()
            .map(|g| g.key().to_string())
            .collect();
        assert_eq!(keys, ["Zeta", "Alpha", "Mid"]);
    }

    #[test]
    fn test_multiple_amount_fields_and_bad_values() {
        let spec = AggregateSpec::new("category", ["amount", "tax"], "status", "paid", "refunded");
        let input = records(json!([
            {"category": "Travel", "amount": 100, "tax": "18.00", "status": "paid"},
            {"category": "Travel", "amount": "oops", "tax": 5, "status": "refunded"},
            {"category": "Travel", "amount": 50, "status": "pending"},
            {"amount": 20, "tax": null, "status": "paid"}
        ]));
        let totals = aggregate(&input, &spec);
        assert_eq!(
            pairs(&totals),
            [
                ("Travel".to_string(), "113.00".to_string()),
                ("".to_string(), "20.00".to_string())
            ]
        );
    }

    #[test]
    fn test_overflowing_sums_clamp() {
        let input = records(json!([
            {"type": "A", "amt": 5e28, "sign": "in"},
            {"type": "A", "amt": 5e28, "sign": "in"},
            {"type": "B", "amt": 5e28, "sign": "out"},
            {"type": "B", "amt": 5e28, "sign": "out"}
        ]));
        let totals = aggregate(&input, &spec());
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].total(), Decimal::MAX);
        assert_eq!(totals[1].total(), Decimal::MIN);
        assert_eq!(net_total(&totals), Decimal::ZERO);

        let wide = AggregateSpec::new("type", ["amt", "fee"], "sign", "in", "out");
        let input = records(json!([{"type": "C", "amt": 5e28, "fee": 5e28, "sign": "in"}]));
        assert_eq!(aggregate(&input, &wide)[0].total(), Decimal::MAX);
        assert_eq!(
            net_total(&[
                GroupTotal::new("A", Decimal::MAX),
                GroupTotal::new("B", Decimal::ONE)
            ]),
            Decimal::MAX
        );
    }

    #[test]
    fn test_round_cents() {
        assert_eq!(round_cents(dec("2.345")), dec("2.35"));
        assert_eq!(round_cents(dec("-2.345")), dec("-2.35"));
        assert_eq!(round_cents(dec("2.344")).to_string(), "2.34");
        assert_eq!(round_cents(dec("-0.001")).to_string(), "0.00");
        assert_eq!(round_cents(dec("5")).to_string(), "5.00");
    }
}
