//! These structs provide the CLI interface for the ledger CLI.

use crate::controller::FormFields;
use crate::error::{Error, ErrorType, IntoResult};
use crate::filter::{FilterCriteria, Frequency, TypeFilter};
use crate::model::parse_date;
use crate::Result;
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// ledger: list, filter and edit the transactions stored on your ledger server.
///
/// Run `ledger init --base-url URL` once to point the program at your server, then
/// `ledger login --user-id ID` to choose whose transactions you are working with.
///
/// Set LEDGER_IN_TEST_MODE to any non-empty value to run against built-in sample data instead of
/// a server.
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
    /// Create the data directory and the configuration file.
    ///
    /// The data directory is --ledger-home, $HOME/ledger by default. The configuration file
    /// records the address of your ledger server, for example http://localhost:8080/api/v1
    Init(InitArgs),
    /// Choose the user whose transactions the other commands work with.
    Login(LoginArgs),
    /// Forget the logged-in user.
    Logout,
    /// List transactions, newest first.
    List(FilterArgs),
    /// Add a transaction.
    Add(AddArgs),
    /// Change some fields of a transaction. Fields you do not pass keep their current value.
    Edit(EditArgs),
    /// Delete a transaction.
    Delete(DeleteArgs),
    /// Show counts, turnover and category totals for the transactions matching a filter.
    Analytics(FilterArgs),
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

    /// The directory where ledger configuration is held. Defaults to ~/ledger
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

/// (Not shown): Args for the `ledger init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// The address of the ledger server. Endpoints such as transections/get-transection are
    /// resolved relative to it.
    #[arg(long)]
    base_url: String,
}

impl InitArgs {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// (Not shown): Args for the `ledger login` command.
#[derive(Debug, Parser, Clone)]
pub struct LoginArgs {
    /// The user's id as assigned by the server.
    #[arg(long)]
    user_id: String,

    #[arg(long)]
    name: Option<String>,

    #[arg(long)]
    email: Option<String>,
}

impl LoginArgs {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            name: None,
            email: None,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }
}

/// (Not shown): The filter flags shared by `ledger list` and `ledger analytics`.
#[derive(Debug, Default, Parser, Clone)]
pub struct FilterArgs {
    /// The date window: 7, 30 or 365 for the last N days, or custom together with --start and
    /// --end. With custom and no dates every transaction is included.
    #[arg(long, default_value_t = Frequency::LastWeek)]
    frequency: Frequency,

    /// First day of a custom range, YYYY-MM-DD.
    #[arg(long, requires = "end")]
    start: Option<String>,

    /// Last day of a custom range, YYYY-MM-DD.
    #[arg(long, requires = "start")]
    end: Option<String>,

    /// all, income or expense.
    #[arg(long = "type", default_value_t = TypeFilter::All)]
    type_filter: TypeFilter,
}

impl FilterArgs {
    pub fn new(frequency: Frequency, type_filter: TypeFilter) -> Self {
        Self {
            frequency,
            start: None,
            end: None,
            type_filter,
        }
    }

    pub fn with_range(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.start = Some(start.into());
        self.end = Some(end.into());
        self
    }

    /// Builds the filter snapshot. A range is only accepted together with `--frequency custom`.
    pub fn criteria(&self) -> Result<FilterCriteria> {
        let criteria = FilterCriteria::new(self.frequency, self.type_filter);
        match (&self.start, &self.end) {
            (None, None) => Ok(criteria),
            (Some(start), Some(end)) => {
                if self.frequency != Frequency::Custom {
                    return Err(Error::msg(
                        ErrorType::Validation,
                        "--start and --end can only be used with --frequency custom",
                    ));
                }
                let start = parse_date(start).pub_result(ErrorType::Validation)?;
                let end = parse_date(end).pub_result(ErrorType::Validation)?;
                Ok(criteria.set_custom_range(start, end))
            }
            _ => Err(Error::msg(
                ErrorType::Validation,
                "A custom range needs both --start and --end",
            )),
        }
    }
}

/// (Not shown): Args for the `ledger add` command.
#[derive(Debug, Parser, Clone)]
pub struct AddArgs {
    /// The amount, without a sign. A leading $ and thousands separators are allowed.
    #[arg(long, allow_hyphen_values = true)]
    amount: String,

    /// income or expense.
    #[arg(long = "type")]
    kind: String,

    /// One of salary, tip, project, food, movie, bills, medical, fee, tax.
    #[arg(long)]
    category: String,

    /// YYYY-MM-DD
    #[arg(long)]
    date: String,

    #[arg(long, default_value = "")]
    reference: String,

    #[arg(long, default_value = "")]
    description: String,
}

impl AddArgs {
    pub fn new(
        amount: impl Into<String>,
        kind: impl Into<String>,
        category: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        Self {
            amount: amount.into(),
            kind: kind.into(),
            category: category.into(),
            date: date.into(),
            reference: String::new(),
            description: String::new(),
        }
    }

    /// The form inputs, as typed.
    pub fn form_fields(&self) -> FormFields {
        FormFields {
            amount: self.amount.clone(),
            kind: self.kind.clone(),
            category: self.category.clone(),
            date: self.date.clone(),
            reference: self.reference.clone(),
            description: self.description.clone(),
        }
    }
}

/// (Not shown): Args for the `ledger edit` command.
#[derive(Debug, Parser, Clone)]
pub struct EditArgs {
    /// The id of the transaction to change.
    id: String,

    #[arg(long, allow_hyphen_values = true)]
    amount: Option<String>,

    #[arg(long = "type")]
    kind: Option<String>,

    #[arg(long)]
    category: Option<String>,

    #[arg(long)]
    date: Option<String>,

    #[arg(long)]
    reference: Option<String>,

    #[arg(long)]
    description: Option<String>,
}

impl EditArgs {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            amount: None,
            kind: None,
            category: None,
            date: None,
            reference: None,
            description: None,
        }
    }

    pub fn with_amount(mut self, amount: impl Into<String>) -> Self {
        self.amount = Some(amount.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Overwrites the inputs in `fields` that were given on the command line.
    pub fn apply(&self, fields: &mut FormFields) {
        let overrides = [
            (&self.amount, &mut fields.amount),
            (&self.kind, &mut fields.kind),
            (&self.category, &mut fields.category),
            (&self.date, &mut fields.date),
            (&self.reference, &mut fields.reference),
            (&self.description, &mut fields.description),
        ];
        for (given, field) in overrides {
            if let Some(value) = given {
                *field = value.clone();
            }
        }
    }
}

/// (Not shown): Args for the `ledger delete` command.
#[derive(Debug, Parser, Clone)]
pub struct DeleteArgs {
    /// The id of the transaction to delete.
    id: String,
}

impl DeleteArgs {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

fn default_ledger_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("ledger"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --ledger-home or LEDGER_HOME instead of relying on the default \
                ledger home directory.",
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

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}
