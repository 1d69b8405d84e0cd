use crate::commands::Out;
use crate::{Config, Result};
use std::path::Path;

/// Creates the home directory, its snapshot directory and an initial `config.json` holding the
/// default views.
///
/// # Arguments
/// - `ledger_home` - The directory that will be the root of the data directory, e.g.
///   `$HOME/ledger`
/// - `company` - The company or branch whose records are fetched, e.g. `north-branch`.
/// - `base_url` - The root URL of the backend. When omitted, records are read from snapshots.
///
/// # Errors
/// - Returns an error if `base_url` is not an http(s) URL or any file operation fails.
pub async fn init(ledger_home: &Path, company: &str, base_url: Option<&str>) -> Result<Out<()>> {
    let config = Config::create(ledger_home, company, base_url).await?;
    let source = match config.base_url() {
        Some(url) => format!("records will be fetched from {url}"),
        None => format!(
            "no base URL was given, records will be read from {}",
            config.data_dir().display()
        ),
    };
    Ok(format!(
        "Created {} for company '{}', {source}",
        config.config_path().display(),
        config.company()
    )
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorType;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init_creates_config() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("ledger");
        let out = init(&home, "north", Some("https://api.example.com/v1"))
            .await
            .unwrap();
        assert!(out.message().contains("https://api.example.com/v1"));
        assert!(home.join("config.json").is_file());
        let config = Config::load(&home).await.unwrap();
        assert_eq!(config.company(), "north");
    }

    #[tokio::test]
    async fn test_init_bad_url_is_config_error() {
        let dir = TempDir::new().unwrap();
        let err = init(dir.path(), "north", Some("not a url"))
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Config);
    }
}
