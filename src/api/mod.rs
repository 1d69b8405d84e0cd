//! Sources of records: the REST backend, or JSON snapshots on disk.
//!
//! Both return the whole collection for an entity in one call. Nothing is patched in place; a
//! change on the backend means fetching the collection again.

mod http;
mod snapshot;

use crate::error::Res;
use crate::model::Record;
use crate::Config;
use anyhow::Context;
use serde_json::Value;
use tracing::{debug, warn};

pub(crate) use http::HttpSource;
pub(crate) use snapshot::SnapshotSource;

/// When this environment variable is set and non-empty, records are read from the snapshot
/// directory instead of the backend.
pub const OFFLINE_ENV: &str = "LEDGER_OFFLINE";

/// The bearer token sent to the backend, if set.
pub const TOKEN_ENV: &str = "LEDGER_TOKEN";

/// Whether records come from the backend or from local snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Http,
    Offline,
}

impl Mode {
    pub fn from_env() -> Self {
        match std::env::var(OFFLINE_ENV) {
            Ok(value) if !value.is_empty() => Mode::Offline,
            _ => Mode::Http,
        }
    }
}

/// Fetches every record of one entity type for the configured company.
#[async_trait::async_trait]
pub(crate) trait Source {
    async fn fetch(&mut self, entity: &str) -> Res<Vec<Record>>;
}

/// True when records for `config` come from the snapshot directory. Without a `base_url` there
/// is nothing to talk to, so snapshots are used regardless of `mode`.
pub(crate) fn reads_snapshots(config: &Config, mode: Mode) -> bool {
    mode == Mode::Offline || config.base_url().is_none()
}

/// Chooses a `Source` for `config` and `mode`.
pub(crate) fn source(config: &Config, mode: Mode) -> Res<Box<dyn Source + Send>> {
    match config.base_url().filter(|_| !reads_snapshots(config, mode)) {
        Some(base_url) => {
            debug!("Fetching records from {base_url}");
            let token = std::env::var(TOKEN_ENV).ok().filter(|t| !t.is_empty());
            Ok(Box::new(HttpSource::new(
                base_url.clone(),
                config.company(),
                token,
                config.request_timeout(),
            )?))
        }
        None => {
            debug!("Reading records from {}", config.data_dir().display());
            Ok(Box::new(SnapshotSource::new(config.data_dir())))
        }
    }
}

/// Parses a JSON array of records. Elements that are not objects are skipped.
pub(crate) fn parse_records(body: &str) -> Res<Vec<Record>> {
    let values: Vec<Value> =
        serde_json::from_str(body).context("Expected a JSON array of records")?;
    let total = values.len();
    let records: Vec<Record> = values
        .into_iter()
        .enumerate()
        .filter_map(|(ix, value)| match value {
            Value::Object(fields) => Some(Record::new(fields)),
            other => {
                warn!("Skipping element {ix}, expected an object but found: {other}");
                None
            }
        })
        .collect();
    debug!("Parsed {} of {total} elements as records", records.len());
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_records_skips_non_objects() {
        let records = parse_records(r#"[{"id": 1}, 7, null, {"id": 2}, "x"]"#).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].text("id"), "2");
    }

    #[test]
    fn test_parse_records_empty_array() {
        assert!(parse_records("[]").unwrap().is_empty());
    }

    #[test]
    fn test_parse_records_rejects_non_array() {
        let err = parse_records(r#"{"id": 1}"#).unwrap_err();
        assert!(err.to_string().contains("JSON array"));
        assert!(parse_records("not json").is_err());
    }
}
