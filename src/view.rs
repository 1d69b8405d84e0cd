//! Views describe one kind of record (charges, expenses, employees) in terms of field names.
//!
//! Every screen of the dashboard filters, sorts and totals its records the same way; only the
//! field names differ. A `ViewConfig` carries those names so that a single `filter::apply` and
//! `aggregate::aggregate` serve every entity type.

use crate::aggregate::AggregateSpec;
use crate::filter::FilterFields;
use crate::model::SortOrder;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Field-name configuration for one entity type.
///
/// Example, as it appears in `config.json`:
/// ```json
/// {
///   "entity": "charge",
///   "key_field": "id",
///   "text_fields": ["type", "category", "description"],
///   "date_field": "date",
///   "reference_id_key": "id",
///   "order_by": "date",
///   "order": "desc",
///   "columns": ["date", "type", "category", "amount", "transaction"],
///   "aggregate": {
///     "group_field": "type",
///     "amount_fields": ["amount"],
///     "sign_field": "transaction",
///     "positive_value": "credit",
///     "negative_value": "debit"
///   }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ViewConfig {
    /// The backend path segment for this entity, as in `GET /{company}/{entity}`.
    entity: String,
    /// The field that uniquely identifies a record.
    #[serde(default = "default_key_field")]
    key_field: String,
    #[serde(flatten)]
    fields: FilterFields,
    /// The default sort field.
    #[serde(default)]
    order_by: String,
    #[serde(default)]
    order: SortOrder,
    /// Columns shown in tables and CSV, in order. Empty means every field.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    columns: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    aggregate: Option<AggregateSpec>,
}

fn default_key_field() -> String {
    "id".to_string()
}

impl ViewConfig {
    pub fn new(entity: impl Into<String>, fields: FilterFields) -> Self {
        Self {
            entity: entity.into(),
            key_field: default_key_field(),
            fields,
            order_by: String::new(),
            order: SortOrder::default(),
            columns: Vec::new(),
            aggregate: None,
        }
    }

    #[must_use]
    pub fn with_key_field(mut self, key_field: impl Into<String>) -> Self {
        self.key_field = key_field.into();
        self
    }

    #[must_use]
    pub fn with_order(mut self, order_by: impl Into<String>, order: SortOrder) -> Self {
        self.order_by = order_by.into();
        self.order = order;
        self
    }

    #[must_use]
    pub fn with_columns<S, I>(mut self, columns: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = S>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_aggregate(mut self, aggregate: AggregateSpec) -> Self {
        self.aggregate = Some(aggregate);
        self
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn key_field(&self) -> &str {
        &self.key_field
    }

    pub fn fields(&self) -> &FilterFields {
        &self.fields
    }

    pub fn order_by(&self) -> &str {
        &self.order_by
    }

    pub fn order(&self) -> SortOrder {
        self.order
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn aggregate(&self) -> Option<&AggregateSpec> {
        self.aggregate.as_ref()
    }
}

/// The views written into a fresh `config.json`.
pub fn default_views() -> BTreeMap<String, ViewConfig> {
    let charge = ViewConfig::new(
        "charge",
        FilterFields::new(["type", "category", "description"], "date"),
    )
    .with_order("date", SortOrder::Desc)
    .with_columns(["date", "type", "category", "description", "amount", "transaction"])
    .with_aggregate(AggregateSpec::new(
        "type",
        ["amount"],
        "transaction",
        "credit",
        "debit",
    ));

    let expense = ViewConfig::new(
        "expense",
        FilterFields::new(["category", "description", "vendor"], "date"),
    )
    .with_order("date", SortOrder::Desc)
    .with_columns(["date", "category", "vendor", "description", "amount", "tax", "status"])
    .with_aggregate(AggregateSpec::new(
        "category",
        ["amount", "tax"],
        "status",
        "paid",
        "refunded",
    ));

    let employee = ViewConfig::new(
        "employee",
        FilterFields::new(["name", "email", "designation"], "joining_date"),
    )
    .with_order("name", SortOrder::Asc)
    .with_columns(["name", "email", "designation", "joining_date", "salary"]);

    BTreeMap::from([
        ("charge".to_string(), charge),
        ("expense".to_string(), expense),
        ("employee".to_string(), employee),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_view_config_from_json_with_defaults() {
        let view: ViewConfig = serde_json::from_value(json!({
            "entity": "scheme",
            "text_fields": ["name"]
        }))
        .unwrap();
        assert_eq!(view.entity(), "scheme");
        assert_eq!(view.key_field(), "id");
        assert_eq!(view.fields().text_fields(), ["name"]);
        assert_eq!(view.fields().date_field(), "date");
        assert_eq!(view.fields().reference_id_key(), "id");
        assert_eq!(view.order_by(), "");
        assert_eq!(view.order(), SortOrder::Asc);
        assert!(view.columns().is_empty());
        assert!(view.aggregate().is_none());
    }

    #[test]
    fn test_view_config_flattens_filter_fields() {
        let view = ViewConfig::new("charge", FilterFields::new(["type"], "paid_on"))
            .with_key_field("_id");
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["text_fields"], json!(["type"]));
        assert_eq!(json["date_field"], json!("paid_on"));
        assert_eq!(json["key_field"], json!("_id"));
        assert!(json.get("aggregate").is_none());
        let back: ViewConfig = serde_json::from_value(json).unwrap();
        assert_eq!(back, view);
    }

    #[test]
    fn test_default_views() {
        let views = default_views();
        assert_eq!(
            views.keys().map(String::as_str).collect::<Vec<_>>(),
            ["charge", "employee", "expense"]
        );
        assert!(views["charge"].aggregate().is_some());
        assert!(views["employee"].aggregate().is_none());
        assert_eq!(views["expense"].aggregate().unwrap().amount_fields(), ["amount", "tax"]);
    }
}
