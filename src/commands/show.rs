use crate::args::ShowArgs;
use crate::commands::output::{columns, render_records};
use crate::commands::{fetch_records, Out, Rows};
use crate::error::{ErrorType, IntoResult};
use crate::{Config, Mode, Result};
use anyhow::anyhow;

/// Prints the record of a view whose key field equals `key`. Keys compare by their text form, so
/// a numeric id of `7` matches the argument `7`.
pub async fn show(config: Config, mode: Mode, args: ShowArgs) -> Result<Out<Rows>> {
    let view = config.view(args.view()).pub_result(ErrorType::Input)?;
    let records = fetch_records(&config, mode, view.entity()).await?;

    let found = records
        .into_iter()
        .find(|r| r.text(view.key_field()) == args.key())
        .ok_or_else(|| {
            anyhow!(
                "No {} record has {} '{}'",
                args.view(),
                view.key_field(),
                args.key()
            )
        })
        .pub_result(ErrorType::Input)?;

    // Show every field of a single record, not just the view's list columns.
    let found = [found];
    let cols = columns(&found, &[]);
    let rows = render_records(&found, &cols, args.format()).pub_result(ErrorType::Internal)?;
    Ok(Out::new(
        format!("{} {} {}", args.view(), view.key_field(), args.key()),
        rows,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::OutputFormat;
    use crate::test::TestEnv;
    use serde_json::json;

    #[tokio::test]
    async fn test_show_finds_record_by_key() {
        let env = TestEnv::new().await;
        let args = ShowArgs::new("employee", "e2", OutputFormat::Json);
        let out = show(env.config(), Mode::Offline, args).await.unwrap();
        let Some(Rows::Json(value)) = out.structure() else {
            panic!("expected JSON");
        };
        assert_eq!(value[0]["name"], json!("Sarah Khan"));
    }

    #[tokio::test]
    async fn test_show_numeric_key_matches_text() {
        let env = TestEnv::new().await;
        let args = ShowArgs::new("expense", "3", OutputFormat::Csv);
        let out = show(env.config(), Mode::Offline, args).await.unwrap();
        let csv = out.structure().unwrap().to_string();
        assert!(csv.starts_with("id,date,category,vendor"));
        assert!(csv.contains("Ink Hub"));
    }

    #[tokio::test]
    async fn test_show_missing_key_is_input_error() {
        let env = TestEnv::new().await;
        let args = ShowArgs::new("charge", "c99", OutputFormat::Json);
        let err = show(env.config(), Mode::Offline, args).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Input);
        assert!(err.to_string().contains("c99"));
    }
}
