use crate::args::ViewsArgs;
use crate::commands::output::render_grid;
use crate::commands::{Out, Rows};
use crate::error::{ErrorType, IntoResult};
use crate::{Config, Result};

/// Lists the configured views with their entity, searchable fields and grouping.
pub async fn views(config: Config, args: ViewsArgs) -> Result<Out<Rows>> {
    let header: Vec<String> = ["view", "entity", "text_fields", "date_field", "order", "group_by"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let rows: Vec<Vec<String>> = config
        .views()
        .iter()
        .map(|(name, view)| {
            vec![
                name.clone(),
                view.entity().to_string(),
                view.fields().text_fields().join(", "),
                view.fields().date_field().to_string(),
                format!("{} {}", view.order_by(), view.order()),
                view.aggregate()
                    .map(|a| a.group_field().to_string())
                    .unwrap_or_default(),
            ]
        })
        .collect();
    let rows_out = render_grid(&header, &rows, args.format()).pub_result(ErrorType::Internal)?;
    Ok(Out::new(
        format!("{} views configured for '{}'", rows.len(), config.company()),
        rows_out,
    ))
}
