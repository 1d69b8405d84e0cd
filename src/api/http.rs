//! Implements the `Source` trait with `GET {base_url}/{company}/{entity}`.

use crate::api::{parse_records, Source};
use crate::error::Res;
use crate::model::Record;
use anyhow::{anyhow, bail, Context};
use std::time::Duration;
use tracing::{debug, trace};
use url::Url;

pub(crate) struct HttpSource {
    client: reqwest::Client,
    base_url: Url,
    company: String,
    token: Option<String>,
}

impl HttpSource {
    pub(crate) fn new(
        base_url: Url,
        company: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> Res<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Unable to build the HTTP client")?;
        Ok(Self {
            client,
            base_url,
            company: company.into(),
            token,
        })
    }

    /// The URL of an entity's collection. Path segments are percent-encoded.
    pub(crate) fn endpoint(&self, entity: &str) -> Res<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("The base URL '{}' cannot have a path", self.base_url))?
            .pop_if_empty()
            .push(&self.company)
            .push(entity);
        Ok(url)
    }
}

#[async_trait::async_trait]
impl Source for HttpSource {
    async fn fetch(&mut self, entity: &str) -> Res<Vec<Record>> {
        let url = self.endpoint(entity)?;
        debug!("GET {url}");

        let mut request = self.client.get(url.clone());
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let response = request
            .send()
            .await
            .with_context(|| format!("Failed to send request to {url}"))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .with_context(|| format!("Failed to read the response body from {url}"))?;
        trace!("{status} from {url}, {} bytes", body.len());

        if !status.is_success() {
            bail!("GET {url} failed with status {status}: {body}");
        }

        parse_records(&body).with_context(|| format!("Unable to parse the response from {url}"))
    }
}
