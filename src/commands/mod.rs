//! Command handlers for the ledger CLI.
//!
//! This module contains implementations for all CLI subcommands.

mod init;
mod list;
mod output;
mod show;
mod totals;
mod views;

use crate::api::{self, Mode};
use crate::error::{ErrorType, IntoResult};
use crate::model::Record;
use crate::{Config, Result};
use serde::Serialize;
use std::fmt::Debug;
use tracing::{debug, info};

pub use init::init;
pub use list::list;
pub use output::Rows;
pub use show::show;
pub use totals::totals;
pub use views::views;

/// The output type for a command. This allows each command to return a consistent message and,
/// optionally, structured data that `main` prints.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

/// How records and totals are printed.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    serde::Serialize,
    serde::Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// A JSON array of objects.
    Json,
    /// A markdown table.
    #[default]
    Table,
    /// Comma separated values with a header row.
    Csv,
}

serde_plain::derive_display_from_serialize!(OutputFormat);
serde_plain::derive_fromstr_from_deserialize!(OutputFormat);

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the message to `info!` and the structured data (if it exists) as JSON to `debug!`.
    pub fn print(&self) {
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}

impl Out<Rows> {
    /// Print the message to `info!` (stderr) and the rows to stdout so they can be piped.
    pub fn print_rows(&self) {
        info!("{}", self.message);
        if let Some(rows) = self.structure() {
            println!("{rows}");
        }
    }
}

/// Fetches every record of `entity` from the source chosen by `config` and `mode`. Failures are
/// `Filesystem` errors when reading snapshots and `Request` errors otherwise.
pub(crate) async fn fetch_records(config: &Config, mode: Mode, entity: &str) -> Result<Vec<Record>> {
    let error_type = if api::reads_snapshots(config, mode) {
        ErrorType::Filesystem
    } else {
        ErrorType::Request
    };
    let mut source = api::source(config, mode).pub_result(error_type)?;
    let records = source.fetch(entity).await.pub_result(error_type)?;
    debug!("Fetched {} {entity} records", records.len());
    Ok(records)
}
