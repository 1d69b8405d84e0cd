//! Configuration file handling.
//!
//! The configuration file is stored at `$LEDGER_HOME/config.json`. It names the backend, the
//! company (branch) whose records are shown, and the views available for that backend. The
//! selected company lives here and is passed explicitly to every fetch.

use crate::error::{ErrorType, IntoResult, Res};
use crate::view::{default_views, ViewConfig};
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;
use url::Url;

const APP_NAME: &str = "ledger";
const CONFIG_VERSION: u8 = 1;
const CONFIG_JSON: &str = "config.json";
const DATA: &str = "data";
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$LEDGER_HOME` and from there it loads `$LEDGER_HOME/config.json`.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    data_dir: PathBuf,
    base_url: Option<Url>,
    config_file: ConfigFile,
}

impl Config {
    /// Creates the home directory and:
    /// - Writes an initial `config.json` with the default views
    /// - Creates `data/{company}` for offline snapshots
    ///
    /// # Arguments
    /// - `dir` - The home directory, e.g. `$HOME/ledger`
    /// - `company` - The company or branch whose records are fetched
    /// - `base_url` - The backend root URL, e.g. `https://api.example.com/v1`. Without it only
    ///   snapshots can be read.
    ///
    /// # Errors
    /// - Returns an error if `base_url` is not a URL or any file operation fails.
    pub async fn create(
        dir: impl Into<PathBuf>,
        company: &str,
        base_url: Option<&str>,
    ) -> Result<Self> {
        Self::create_inner(dir.into(), company, base_url)
            .await
            .pub_result(ErrorType::Config)
    }

    async fn create_inner(dir: PathBuf, company: &str, base_url: Option<&str>) -> Res<Self> {
        if company.trim().is_empty() {
            bail!("The company cannot be empty");
        }
        let base_url = base_url.map(parse_base_url).transpose()?;

        utils::make_dir(&dir)
            .await
            .context("Unable to create the ledger home directory")?;
        let root = utils::canonicalize(&dir).await?;

        let config_file = ConfigFile {
            company: company.to_string(),
            base_url: base_url.as_ref().map(|u| u.to_string()),
            ..ConfigFile::default()
        };
        let config_path = root.join(CONFIG_JSON);
        config_file.save(&config_path).await?;

        let data_dir = root.join(DATA).join(company);
        utils::make_dir(&data_dir).await?;

        Ok(Self {
            root,
            config_path,
            data_dir,
            base_url,
            config_file,
        })
    }

    /// This will
    /// - validate that `ledger_home` and its config file exist
    /// - load and validate the config file
    /// - return the loaded configuration object
    pub async fn load(ledger_home: impl Into<PathBuf>) -> Result<Self> {
        Self::load_inner(ledger_home.into())
            .await
            .pub_result(ErrorType::Config)
    }

    async fn load_inner(ledger_home: PathBuf) -> Res<Self> {
        let root = utils::canonicalize(&ledger_home)
            .await
            .context("The ledger home directory is missing, run `ledger init` first")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;
        let base_url = config_file
            .base_url
            .as_deref()
            .map(parse_base_url)
            .transpose()?;
        let data_dir = root.join(DATA).join(&config_file.company);
        debug!(
            "Loaded {} with {} views",
            config_path.display(),
            config_file.views.len()
        );

        Ok(Self {
            root,
            config_path,
            data_dir,
            base_url,
            config_file,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Where offline snapshots for the configured company live.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn company(&self) -> &str {
        &self.config_file.company
    }

    pub fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.config_file.request_timeout_secs)
    }

    pub fn views(&self) -> &BTreeMap<String, ViewConfig> {
        &self.config_file.views
    }

    /// Looks up a view by name.
    pub(crate) fn view(&self, name: &str) -> Res<&ViewConfig> {
        self.config_file.views.get(name).with_context(|| {
            let known: Vec<&str> = self.config_file.views.keys().map(String::as_str).collect();
            format!(
                "There is no view named '{name}', the configured views are: {}",
                known.join(", ")
            )
        })
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "ledger",
///   "config_version": 1,
///   "company": "north-branch",
///   "base_url": "https://api.example.com/v1",
///   "request_timeout_secs": 30,
///   "views": { "charge": { "entity": "charge", "text_fields": ["type"] } }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "ledger"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// The company or branch whose records are fetched
    company: String,

    /// Root URL of the backend. When absent, records are read from snapshots.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    base_url: Option<String>,

    #[serde(default = "default_request_timeout_secs")]
    request_timeout_secs: u64,

    /// Views by name. Defaults to the built-in charge, expense and employee views.
    #[serde(default = "default_views")]
    views: BTreeMap<String, ViewConfig>,
}

fn default_request_timeout_secs() -> u64 {
    REQUEST_TIMEOUT_SECS
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            company: String::new(),
            base_url: None,
            request_timeout_secs: REQUEST_TIMEOUT_SECS,
            views: default_views(),
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or names another application
    async fn load(path: impl AsRef<Path>) -> Res<Self> {
        let path = path.as_ref();
        let config: ConfigFile = utils::deserialize(path).await?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        anyhow::ensure!(
            config.config_version <= CONFIG_VERSION,
            "Config version {} is newer than this program supports ({})",
            config.config_version,
            CONFIG_VERSION
        );
        anyhow::ensure!(
            !config.company.trim().is_empty(),
            "The config file at {} does not name a company",
            path.display()
        );

        Ok(config)
    }

    async fn save(&self, path: impl AsRef<Path>) -> Res<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }
}

/// Parses the backend root URL. Only `http` and `https` are accepted.
fn parse_base_url(s: &str) -> Res<Url> {
    let url = Url::parse(s).with_context(|| format!("Invalid base URL '{s}'"))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => bail!("Unsupported scheme '{other}' in base URL '{s}'"),
    }
}
