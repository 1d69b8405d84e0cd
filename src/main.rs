use clap::Parser;
use ledger_view::args::{Args, Command};
use ledger_view::{commands, Config, Mode, Result};
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().ledger_home().path();

    // When LEDGER_OFFLINE is set and non-empty, records are read from the snapshot directory
    // instead of the backend.
    let mode = Mode::from_env();

    let _: () = match args.command() {
        Command::Init(init_args) => {
            commands::init(home, init_args.company(), init_args.base_url())
                .await?
                .print()
        }

        Command::Views(views_args) => {
            let config = Config::load(home).await?;
            commands::views(config, views_args.clone())
                .await?
                .print_rows()
        }

        Command::List(list_args) => {
            let config = Config::load(home).await?;
            commands::list(config, mode, list_args.clone())
                .await?
                .print_rows()
        }

        Command::Totals(totals_args) => {
            let config = Config::load(home).await?;
            commands::totals(config, mode, totals_args.clone())
                .await?
                .print_rows()
        }

        Command::Show(show_args) => {
            let config = Config::load(home).await?;
            commands::show(config, mode, show_args.clone())
                .await?
                .print_rows()
        }
    };
    Ok(())
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for the library and binary only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                level,
                env!("CARGO_BIN_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
