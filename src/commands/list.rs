use crate::args::ListArgs;
use crate::commands::output::{columns, render_records};
use crate::commands::{fetch_records, Out, Rows};
use crate::error::{ErrorType, IntoResult};
use crate::{filter, Config, Mode, Result};
use tracing::debug;

/// Fetches the records of a view, then sorts, filters and renders them.
///
/// Sorting uses `--order-by` and `--order` when given and the view's defaults otherwise.
pub async fn list(config: Config, mode: Mode, args: ListArgs) -> Result<Out<Rows>> {
    let view = config.view(args.view()).pub_result(ErrorType::Input)?;
    let records = fetch_records(&config, mode, view.entity()).await?;

    let filters = args.filters().to_filter_set();
    let order_by = args.order_by().unwrap_or(view.order_by());
    let order = args.order().unwrap_or(view.order());
    debug!("Listing {} with {filters:?}", args.view());

    let kept = filter::apply(&records, &filters, view.fields(), order_by, order);
    let cols = columns(&kept, view.columns());
    let rows = render_records(&kept, &cols, args.format()).pub_result(ErrorType::Internal)?;

    Ok(Out::new(
        format!(
            "Showing {} of {} {} records",
            kept.len(),
            records.len(),
            args.view()
        ),
        rows,
    ))
}
