//! CLI argument definitions for the Tabula command-line tool.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use tabula_model::{ColumnType, Weekday};

use crate::logging::{LogFormat, LogLevel};

#[derive(Parser)]
#[command(
    name = "tabula",
    version,
    about = "Tabula - edit typed tables stored in a JSON file",
    long_about = "Edit typed tables stored in a JSON file.\n\n\
                  Cells are typed by their column: text, checkbox, dropdown, PDF upload,\n\
                  calendar weeks, weekly schedule and user dropdown."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Table file to work on (default: settings `[store] file`, then ./tabula.json).
    #[arg(long = "file", short = 'f', value_name = "PATH", global = true)]
    pub file: Option<PathBuf>,

    /// Table id or name (default: settings `[store] default_table`, or the only table).
    #[arg(long = "table", short = 't', value_name = "TABLE", global = true)]
    pub table: Option<String>,

    /// Settings file to read instead of the platform default.
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags and settings).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevel>,

    /// Log output format (pretty for humans, json for machine parsing).
    #[arg(long = "log-format", value_enum, global = true)]
    pub log_format: Option<LogFormat>,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create a new empty table.
    Init(InitArgs),

    /// Delete a table with all of its columns and cells.
    DeleteTable(DeleteTableArgs),

    /// List the tables in the file.
    Tables,

    /// Print a table's grid.
    Show(ShowArgs),

    /// List a table's columns with their types and options.
    Columns,

    /// Write one cell.
    Set(SetArgs),

    /// Reset one cell to its empty value.
    Clear(CellArgs),

    /// Delete a row; later rows move up by one.
    DeleteRow(RowArgs),

    /// Append a text column.
    AddColumn(AddColumnArgs),

    /// Change a column's type and options.
    UpdateColumn(UpdateColumnArgs),

    /// Delete a column and all of its cells.
    DeleteColumn(ColumnArgs),

    /// Inspect or edit a weekly schedule cell.
    Schedule(ScheduleArgs),

    /// Attach a PDF file to a `pdf_upload` cell.
    Attach(AttachArgs),

    /// Remove the PDF attached to a `pdf_upload` cell.
    Detach(CellArgs),

    /// Check a PDF file without attaching it.
    CheckPdf(CheckPdfArgs),

    /// List the calendar weeks of a year.
    Weeks(WeeksArgs),

    /// List or add users offered by user dropdown columns.
    Users(UsersArgs),

    /// Show the effective settings, or write a default settings file.
    Config(ConfigArgs),
}

#[derive(Args)]
pub struct InitArgs {
    /// Name of the new table.
    pub name: String,

    /// Columns to create, as `NAME` or `NAME:TYPE`.
    #[arg(long = "column", short = 'c', value_name = "NAME[:TYPE]")]
    pub columns: Vec<String>,
}

#[derive(Args)]
pub struct DeleteTableArgs {
    /// Id or name of the table to delete.
    pub table: String,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Minimum number of rows to show (overrides settings `[grid] min_rows`).
    #[arg(long = "min-rows", value_name = "N")]
    pub min_rows: Option<u32>,

    /// Print raw cell JSON instead of display text.
    #[arg(long = "raw")]
    pub raw: bool,
}

/// Address of one cell. Columns are matched by id, then name, then position.
#[derive(Args)]
pub struct CellArgs {
    /// Zero-based row index.
    pub row: u32,

    /// Column id, name or zero-based position.
    pub column: String,
}

#[derive(Args)]
pub struct SetArgs {
    #[command(flatten)]
    pub cell: CellArgs,

    /// New value, parsed according to the column type.
    ///
    /// Checkbox: true/false. Calendar weeks: KW<week>-<year>.
    /// Weekly schedule: a JSON object keyed by weekday.
    pub value: String,
}

#[derive(Args)]
pub struct RowArgs {
    /// Zero-based row index.
    pub row: u32,
}

#[derive(Args)]
pub struct ColumnArgs {
    /// Column id, name or zero-based position.
    pub column: String,
}

#[derive(Args)]
pub struct AddColumnArgs {
    /// Name of the new column.
    pub name: String,
}

#[derive(Args)]
pub struct UpdateColumnArgs {
    /// Column id, name or zero-based position.
    pub column: String,

    /// New column type (keeps the current type when omitted).
    #[arg(long = "type", value_name = "TYPE", value_parser = parse_column_type)]
    pub column_type: Option<ColumnType>,

    /// Option for dropdown, weekly schedule and user columns (repeatable).
    #[arg(long = "option", short = 'o', value_name = "VALUE")]
    pub options: Vec<String>,

    /// Picker year for calendar week columns.
    #[arg(long = "year", value_name = "YEAR")]
    pub year: Option<i32>,
}

#[derive(Args)]
pub struct ScheduleArgs {
    #[command(subcommand)]
    pub action: ScheduleAction,
}

#[derive(Subcommand)]
pub enum ScheduleAction {
    /// Print the entries and confirmed totals of a schedule cell.
    Show(CellArgs),

    /// Add a confirmed entry to a schedule cell.
    Add(ScheduleAddArgs),

    /// Change an entry of a schedule cell.
    Edit(ScheduleEditArgs),

    /// Remove an entry from a schedule cell.
    Remove(ScheduleEntryArgs),
}

#[derive(Args)]
pub struct ScheduleAddArgs {
    #[command(flatten)]
    pub cell: CellArgs,

    /// Day of the entry.
    #[arg(long = "day", value_enum)]
    pub day: DayArg,

    /// Entry text.
    #[arg(long = "text", default_value = "")]
    pub text: String,

    /// Category from the column options.
    #[arg(long = "category")]
    pub category: Option<String>,

    #[arg(long = "hours", default_value_t = 0)]
    pub hours: i64,

    #[arg(long = "minutes", default_value_t = 0)]
    pub minutes: i64,
}

#[derive(Args)]
pub struct ScheduleEntryArgs {
    #[command(flatten)]
    pub cell: CellArgs,

    /// Day of the entry.
    #[arg(long = "day", value_enum)]
    pub day: DayArg,

    /// Entry id as shown by `schedule show`.
    #[arg(long = "entry", value_name = "ID")]
    pub entry: String,
}

#[derive(Args)]
pub struct ScheduleEditArgs {
    #[command(flatten)]
    pub target: ScheduleEntryArgs,

    #[arg(long = "text")]
    pub text: Option<String>,

    #[arg(long = "category")]
    pub category: Option<String>,

    #[arg(long = "hours")]
    pub hours: Option<i64>,

    #[arg(long = "minutes")]
    pub minutes: Option<i64>,
}

#[derive(Args)]
pub struct AttachArgs {
    #[command(flatten)]
    pub cell: CellArgs,

    /// PDF file to attach.
    pub path: PathBuf,
}

#[derive(Args)]
pub struct CheckPdfArgs {
    /// File to check.
    pub path: PathBuf,
}

#[derive(Args)]
pub struct WeeksArgs {
    /// ISO year (default: the current year).
    pub year: Option<i32>,
}

#[derive(Args)]
pub struct UsersArgs {
    #[command(subcommand)]
    pub action: Option<UsersAction>,
}

#[derive(Subcommand)]
pub enum UsersAction {
    /// Add a user to the directory.
    Add {
        username: String,
        #[arg(long = "full-name")]
        full_name: Option<String>,
    },
}

#[derive(Args)]
pub struct ConfigArgs {
    /// Write the default settings file if none exists.
    #[arg(long = "init")]
    pub init: bool,
}

/// CLI weekday choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum DayArg {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl From<DayArg> for Weekday {
    fn from(day: DayArg) -> Self {
        match day {
            DayArg::Monday => Weekday::Monday,
            DayArg::Tuesday => Weekday::Tuesday,
            DayArg::Wednesday => Weekday::Wednesday,
            DayArg::Thursday => Weekday::Thursday,
            DayArg::Friday => Weekday::Friday,
        }
    }
}

fn parse_column_type(value: &str) -> Result<ColumnType, String> {
    value.parse::<ColumnType>().map_err(|_| {
        let known: Vec<&str> = ColumnType::ALL.iter().map(ColumnType::as_str).collect();
        format!("unknown column type '{value}' (expected one of: {})", known.join(", "))
    })
}
