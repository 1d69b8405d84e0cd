//! Types that represent the data model: `Record`, `Amount`, `GroupTotal` and `SortOrder`.
mod amount;
mod record;

pub use amount::{Amount, AmountError, AmountFormat};
pub use record::Record;
pub(crate) use record::{is_unset, reference_id, value_text};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The direction of a sort.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

serde_plain::derive_display_from_serialize!(SortOrder);
serde_plain::derive_fromstr_from_deserialize!(SortOrder);

/// The signed total of one group, produced by aggregation. The total is always carried with two
/// decimal places.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupTotal {
    key: String,
    total: Amount,
}

impl GroupTotal {
    pub fn new(key: impl Into<String>, total: Decimal) -> Self {
        Self {
            key: key.into(),
            total: Amount::new_with_format(total, AmountFormat::PLAIN),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn total(&self) -> Decimal {
        self.total.value()
    }
}
