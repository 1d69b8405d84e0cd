//! Implements the `Source` trait by reading `{dir}/{entity}.json`.
//!
//! Snapshots have exactly the shape the backend returns, so a saved response body can be dropped
//! into the data directory and used offline.

use crate::api::{parse_records, Source};
use crate::error::Res;
use crate::model::Record;
use crate::utils;
use anyhow::Context;
use std::path::PathBuf;

pub(crate) struct SnapshotSource {
    dir: PathBuf,
}

impl SnapshotSource {
    pub(crate) fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub(crate) fn path(&self, entity: &str) -> PathBuf {
        self.dir.join(format!("{entity}.json"))
    }
}

#[async_trait::async_trait]
impl Source for SnapshotSource {
    async fn fetch(&mut self, entity: &str) -> Res<Vec<Record>> {
        let path = self.path(entity);
        let body = utils::read(&path).await?;
        parse_records(&body).with_context(|| format!("Unable to parse {}", path.display()))
    }
}
