use crate::aggregate::{aggregate, net_total};
use crate::args::TotalsArgs;
use crate::commands::output::render_grid;
use crate::commands::{fetch_records, Out, OutputFormat, Rows};
use crate::error::{ErrorType, IntoResult};
use crate::model::{Amount, AmountFormat, GroupTotal};
use crate::{filter, Config, Mode, Result};
use anyhow::{anyhow, Context};
use serde::Serialize;

/// The label of the extra row that carries the net total in table and CSV output.
const NET_ROW: &str = "(net)";

#[derive(Debug, Serialize)]
struct Totals {
    groups: Vec<GroupTotal>,
    net_total: Amount,
}

/// Fetches the records of a view, filters them in the view's default order, and totals them per
/// group as described by the view's `aggregate` section.
pub async fn totals(config: Config, mode: Mode, args: TotalsArgs) -> Result<Out<Rows>> {
    let view = config.view(args.view()).pub_result(ErrorType::Input)?;
    let spec = view
        .aggregate()
        .ok_or_else(|| {
            anyhow!(
                "The view '{}' has no aggregate section, add one to {} to use totals",
                args.view(),
                config.config_path().display()
            )
        })
        .pub_result(ErrorType::Input)?;
    let records = fetch_records(&config, mode, view.entity()).await?;

    let filters = args.filters().to_filter_set();
    let kept = filter::apply(
        &records,
        &filters,
        view.fields(),
        view.order_by(),
        view.order(),
    );
    let groups = aggregate(&kept, spec);
    let net = net_total(&groups);

    let rows = match args.format() {
        OutputFormat::Json => serde_json::to_value(Totals {
            groups: groups.clone(),
            net_total: Amount::new_with_format(net, AmountFormat::PLAIN),
        })
        .map(Rows::Json)
        .context("Unable to serialize totals"),
        format => {
            let header = vec![spec.group_field().to_string(), "total".to_string()];
            let mut grid: Vec<Vec<String>> = groups
                .iter()
                .map(|g| vec![g.key().to_string(), g.total().to_string()])
                .collect();
            grid.push(vec![NET_ROW.to_string(), net.to_string()]);
            render_grid(&header, &grid, format)
        }
    }
    .pub_result(ErrorType::Internal)?;

    Ok(Out::new(
        format!(
            "{} {} groups from {} of {} records, net total {net}",
            groups.len(),
            args.view(),
            kept.len(),
            records.len()
        ),
        rows,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::{FieldValue, FilterArgs};
    use crate::test::TestEnv;
    use serde_json::json;

    #[tokio::test]
    async fn test_totals_json() {
        let env = TestEnv::new().await;
        let args = TotalsArgs::new("charge", FilterArgs::default(), OutputFormat::Json);
        let out = totals(env.config(), Mode::Offline, args).await.unwrap();
        assert_eq!(
            out.structure().unwrap(),
            &Rows::Json(json!({
                "groups": [
                    {"key": "Sale", "total": "405.25"},
                    {"key": "Fuel", "total": "-80.00"},
                    {"key": "Rent", "total": "-1200.00"}
                ],
                "net_total": "-874.75"
            }))
        );
        assert_eq!(
            out.message(),
            "3 charge groups from 5 of 5 records, net total -874.75"
        );
    }

    #[tokio::test]
    async fn test_totals_multiple_amount_fields_and_unmatched_sign() {
        let env = TestEnv::new().await;
        let args = TotalsArgs::new("expense", FilterArgs::default(), OutputFormat::Csv);
        let out = totals(env.config(), Mode::Offline, args).await.unwrap();
        assert_eq!(
            out.structure().unwrap().to_string(),
            "category,total\nTravel,-25.50\nSupplies,108.00\n(net),82.50\n"
        );
    }

    #[tokio::test]
    async fn test_totals_after_filtering() {
        let env = TestEnv::new().await;
        let filters = FilterArgs::new(
            None,
            vec![FieldValue::new("type", "Sale")],
            None,
            None,
            None,
        );
        let args = TotalsArgs::new("charge", filters, OutputFormat::Table);
        let out = totals(env.config(), Mode::Offline, args).await.unwrap();
        assert_eq!(
            out.structure().unwrap().to_string(),
            "| type | total |\n| --- | --- |\n| Sale | 405.25 |\n| (net) | 405.25 |"
        );
    }

    #[tokio::test]
    async fn test_totals_no_matches_is_zero() {
        let env = TestEnv::new().await;
        let filters = FilterArgs::new(Some("nothing".to_string()), Vec::new(), None, None, None);
        let args = TotalsArgs::new("charge", filters, OutputFormat::Json);
        let out = totals(env.config(), Mode::Offline, args).await.unwrap();
        assert_eq!(
            out.structure().unwrap(),
            &Rows::Json(json!({"groups": [], "net_total": "0.00"}))
        );
    }

    #[tokio::test]
    async fn test_totals_view_without_aggregate_is_input_error() {
        let env = TestEnv::new().await;
        let args = TotalsArgs::new("employee", FilterArgs::default(), OutputFormat::Json);
        let err = totals(env.config(), Mode::Offline, args).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Input);
        assert!(err.to_string().contains("no aggregate section"));
    }
}
