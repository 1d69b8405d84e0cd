//! These structs provide the CLI interface for the ledger CLI.

use crate::commands::OutputFormat;
use crate::filter::{FilterSet, ReferenceFilter};
use crate::model::SortOrder;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{error, warn};
use tracing_subscriber::filter::LevelFilter;

/// ledger: filter, sort and total the records of an accounting backend.
///
/// Records (charges, expenses, employees and anything else the backend serves) are fetched in
/// full for the configured company and then filtered and totalled locally. Each kind of record is
/// described by a view in `$LEDGER_HOME/config.json`, which names the fields to search, the date
/// field, and how to group and sign totals.
///
/// Set LEDGER_OFFLINE=1 to read `$LEDGER_HOME/data/<company>/<entity>.json` instead of the
/// backend. Set LEDGER_TOKEN to send a bearer token with each request.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the home directory and an initial configuration.
    ///
    /// The configuration names the company (branch) whose records are shown and, optionally, the
    /// backend URL. Records are fetched from `<base-url>/<company>/<entity>`.
    Init(InitArgs),
    /// List the configured views.
    Views(ViewsArgs),
    /// Fetch the records of a view, then filter, sort and print them.
    List(ListArgs),
    /// Fetch the records of a view, filter them, and print signed totals per group.
    Totals(TotalsArgs),
    /// Print the single record of a view with the given key.
    Show(ShowArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where configuration and snapshots are held. Defaults to ~/ledger
    #[arg(long, env = "LEDGER_HOME", default_value_t = default_ledger_home())]
    ledger_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, ledger_home: PathBuf) -> Self {
        Self {
            log_level,
            ledger_home: ledger_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn ledger_home(&self) -> &DisplayPath {
        &self.ledger_home
    }
}

/// Args for the `ledger init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// The company or branch whose records are fetched, e.g. `north-branch`.
    #[arg(long)]
    company: String,

    /// The root URL of the backend, e.g. https://api.example.com/v1
    #[arg(long)]
    base_url: Option<String>,
}

impl InitArgs {
    pub fn new(company: impl Into<String>, base_url: Option<String>) -> Self {
        Self {
            company: company.into(),
            base_url,
        }
    }

    pub fn company(&self) -> &str {
        &self.company
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }
}

/// Args for the `ledger views` command.
#[derive(Debug, Parser, Clone, Default)]
pub struct ViewsArgs {
    /// How to print the output.
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

impl ViewsArgs {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }
}

/// A `field=value` pair given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldValue {
    field: String,
    value: String,
}

impl FieldValue {
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

impl FromStr for FieldValue {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('=') {
            Some((field, value)) if !field.trim().is_empty() => {
                Ok(FieldValue::new(field.trim(), value))
            }
            _ => Err(format!("expected FIELD=VALUE, got '{s}'")),
        }
    }
}

/// Filter flags shared by `list` and `totals`.
#[derive(Debug, Parser, Clone, Default)]
pub struct FilterArgs {
    /// Case-insensitive text to look for in the view's text fields.
    #[arg(long)]
    search: Option<String>,

    /// Keep records whose FIELD equals VALUE. May be repeated.
    #[arg(long = "eq", value_name = "FIELD=VALUE")]
    equals: Vec<FieldValue>,

    /// Keep records whose linked FIELD object has the identifier ID.
    #[arg(long = "ref", value_name = "FIELD=ID")]
    reference: Option<FieldValue>,

    /// First day of the date range, YYYY-MM-DD. Needs --to.
    #[arg(long)]
    from: Option<NaiveDate>,

    /// End of the date range, YYYY-MM-DD. Records on this day are excluded. Needs --from.
    #[arg(long)]
    to: Option<NaiveDate>,
}

impl FilterArgs {
    pub fn new(
        search: Option<String>,
        equals: Vec<FieldValue>,
        reference: Option<FieldValue>,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Self {
        Self {
            search,
            equals,
            reference,
            from,
            to,
        }
    }

    /// Builds the `FilterSet`. A range that ends before it starts is flagged as an error, which
    /// disables the date filter rather than failing the command.
    pub fn to_filter_set(&self) -> FilterSet {
        let mut filters = FilterSet::new()
            .with_search(self.search.clone().unwrap_or_default())
            .with_date_range(self.from, self.to);
        for fv in &self.equals {
            filters = filters.with_equals(fv.field(), fv.value());
        }
        if let Some(fv) = &self.reference {
            filters = filters.with_reference(ReferenceFilter::new(fv.field(), fv.value()));
        }
        match (self.from, self.to) {
            (Some(from), Some(to)) if to < from => {
                warn!("The date range ends ({to}) before it starts ({from}), ignoring it");
                filters.with_date_range_error(true)
            }
            (Some(_), None) | (None, Some(_)) => {
                warn!("The date range needs both --from and --to, ignoring it");
                filters
            }
            _ => filters,
        }
    }
}

/// Args for the `ledger list` command.
#[derive(Debug, Parser, Clone)]
pub struct ListArgs {
    /// The name of the view, e.g. `charge`.
    view: String,

    #[clap(flatten)]
    filters: FilterArgs,

    /// Sort by this field instead of the view's default.
    #[arg(long)]
    order_by: Option<String>,

    /// Sort direction instead of the view's default.
    #[arg(long, value_enum)]
    order: Option<SortOrder>,

    /// How to print the output.
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

impl ListArgs {
    pub fn new(view: impl Into<String>, filters: FilterArgs, format: OutputFormat) -> Self {
        Self {
            view: view.into(),
            filters,
            order_by: None,
            order: None,
            format,
        }
    }

    #[must_use]
    pub fn with_order(mut self, order_by: impl Into<String>, order: SortOrder) -> Self {
        self.order_by = Some(order_by.into());
        self.order = Some(order);
        self
    }

    pub fn view(&self) -> &str {
        &self.view
    }

    pub fn filters(&self) -> &FilterArgs {
        &self.filters
    }

    pub fn order_by(&self) -> Option<&str> {
        self.order_by.as_deref()
    }

    pub fn order(&self) -> Option<SortOrder> {
        self.order
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }
}

/// Args for the `ledger totals` command.
#[derive(Debug, Parser, Clone)]
pub struct TotalsArgs {
    /// The name of the view, e.g. `charge`. The view needs an `aggregate` section.
    view: String,

    #[clap(flatten)]
    filters: FilterArgs,

    /// How to print the output.
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

impl TotalsArgs {
    pub fn new(view: impl Into<String>, filters: FilterArgs, format: OutputFormat) -> Self {
        Self {
            view: view.into(),
            filters,
            format,
        }
    }

    pub fn view(&self) -> &str {
        &self.view
    }

    pub fn filters(&self) -> &FilterArgs {
        &self.filters
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }
}

/// Args for the `ledger show` command.
#[derive(Debug, Parser, Clone)]
pub struct ShowArgs {
    /// The name of the view, e.g. `employee`.
    view: String,

    /// The value of the view's key field.
    key: String,

    /// How to print the output.
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,
}

impl ShowArgs {
    pub fn new(view: impl Into<String>, key: impl Into<String>, format: OutputFormat) -> Self {
        Self {
            view: view.into(),
            key: key.into(),
            format,
        }
    }

    pub fn view(&self) -> &str {
        &self.view
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }
}

fn default_ledger_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("ledger"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --ledger-home or LEDGER_HOME instead of relying on the default \
                directory.",
            );
            PathBuf::from("ledger")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}
