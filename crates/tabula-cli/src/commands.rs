//! Command implementations.
//!
//! Every command opens the table file through [`FileBackend`], works on a
//! [`TableView`] the way an interactive client would, and returns the text
//! to print.

use std::fs;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context as _, Result, anyhow, bail};
use chrono::{Datelike, Utc};
use comfy_table::Table;
use serde_json::{Value, json};
use tabula_model::{
    AccessLevel, BackendError, CalendarWeek, CellValue, Column, ColumnType, Profile,
    TableBackend, TableMode, Weekday, calendar_weeks, parse_calendar_week,
};
use tabula_normalize::{PDF_MIME, normalize, sanitize_file_name, validate_pdf_upload};
use tabula_state::{
    Cell, EditOutcome, EntryField, ScheduleEditor, ScheduleSummary, TableView, cell_choices,
    user_choices,
};
use tabula_store::{FileBackend, TableInfo, TableSet};
use tracing::{debug, info};

use crate::cli::{
    AddColumnArgs, AttachArgs, CellArgs, CheckPdfArgs, Cli, ColumnArgs, Command, ConfigArgs,
    DeleteTableArgs, InitArgs, RowArgs, ScheduleAction, ScheduleAddArgs, ScheduleEditArgs,
    ScheduleEntryArgs, SetArgs, ShowArgs, UpdateColumnArgs, UsersAction, WeeksArgs,
};
use crate::render::{
    apply_table_style, columns_table, grid_table, notice_lines, schedule_table, upload_report,
    weeks_table,
};
use crate::settings::{DEFAULT_TABLE_FILE, Settings, save_to};

/// Directory next to the table file that holds attached PDFs.
const UPLOADS_DIR: &str = "uploads";

/// Owner of uploads when no identity is configured.
const LOCAL_USER: &str = "local";

/// Everything a command needs besides its own arguments.
#[derive(Debug, Clone)]
pub struct Context {
    pub file: PathBuf,
    /// Table id or name; `None` picks the only table in the file.
    pub table: Option<String>,
    pub settings: Settings,
    pub settings_path: Option<PathBuf>,
}

impl Context {
    /// Combine command-line options with settings. Flags win over settings.
    pub fn from_cli(cli: &Cli, settings: Settings, settings_path: Option<PathBuf>) -> Self {
        Self {
            file: cli
                .file
                .clone()
                .or_else(|| settings.store.file.clone())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_TABLE_FILE)),
            table: cli
                .table
                .clone()
                .or_else(|| settings.store.default_table.clone()),
            settings,
            settings_path,
        }
    }

    /// Root of the attachment store.
    pub fn uploads_dir(&self) -> PathBuf {
        self.file
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(UPLOADS_DIR)
    }

    fn open_backend(&self) -> Result<FileBackend> {
        FileBackend::open(&self.file)
            .with_context(|| format!("open table file {}", self.file.display()))
    }
}

/// Short name used in the command span.
pub fn command_name(command: &Command) -> &'static str {
    match command {
        Command::Init(_) => "init",
        Command::DeleteTable(_) => "delete-table",
        Command::Tables => "tables",
        Command::Show(_) => "show",
        Command::Columns => "columns",
        Command::Set(_) => "set",
        Command::Clear(_) => "clear",
        Command::DeleteRow(_) => "delete-row",
        Command::AddColumn(_) => "add-column",
        Command::UpdateColumn(_) => "update-column",
        Command::DeleteColumn(_) => "delete-column",
        Command::Schedule(_) => "schedule",
        Command::Attach(_) => "attach",
        Command::Detach(_) => "detach",
        Command::CheckPdf(_) => "check-pdf",
        Command::Weeks(_) => "weeks",
        Command::Users(_) => "users",
        Command::Config(_) => "config",
    }
}

/// Run one command and return its output.
pub async fn run(command: &Command, ctx: &Context) -> Result<String> {
    match command {
        Command::Init(args) => run_init(args, ctx).await,
        Command::DeleteTable(args) => run_delete_table(args, ctx).await,
        Command::Tables => run_tables(ctx),
        Command::Show(args) => run_show(args, ctx).await,
        Command::Columns => run_columns(ctx).await,
        Command::Set(args) => run_set(args, ctx).await,
        Command::Clear(args) => run_clear(args, ctx).await,
        Command::DeleteRow(args) => run_delete_row(args, ctx).await,
        Command::AddColumn(args) => run_add_column(args, ctx).await,
        Command::UpdateColumn(args) => run_update_column(args, ctx).await,
        Command::DeleteColumn(args) => run_delete_column(args, ctx).await,
        Command::Schedule(args) => match &args.action {
            ScheduleAction::Show(cell) => run_schedule_show(cell, ctx).await,
            ScheduleAction::Add(args) => run_schedule_add(args, ctx).await,
            ScheduleAction::Edit(args) => run_schedule_edit(args, ctx).await,
            ScheduleAction::Remove(args) => run_schedule_remove(args, ctx).await,
        },
        Command::Attach(args) => run_attach(args, ctx).await,
        Command::Detach(args) => run_detach(args, ctx).await,
        Command::CheckPdf(args) => run_check_pdf(args),
        Command::Weeks(args) => Ok(run_weeks(args)),
        Command::Users(args) => match &args.action {
            None => run_users(ctx).await,
            Some(UsersAction::Add {
                username,
                full_name,
            }) => run_add_user(username, full_name.as_deref(), ctx).await,
        },
        Command::Config(args) => run_config(args, ctx),
    }
}

// =========================================================================
// Table selection
// =========================================================================

fn resolve_table(tables: &TableSet, wanted: Option<&str>, file: &Path) -> Result<TableInfo> {
    if let Some(wanted) = wanted {
        return tables
            .find_table(wanted)
            .cloned()
            .ok_or_else(|| anyhow!("table '{wanted}' not found in {}", file.display()));
    }
    match tables.tables.as_slice() {
        [only] => Ok(only.clone()),
        [] => bail!(
            "no tables in {}; create one with `tabula init <NAME>`",
            file.display()
        ),
        _ => bail!(
            "{} holds several tables; pick one with --table",
            file.display()
        ),
    }
}

/// Open the backend and load the selected table in `mode`.
async fn open_view(ctx: &Context, mode: TableMode) -> Result<(FileBackend, TableView)> {
    let backend = ctx.open_backend()?;
    let table = resolve_table(&backend.snapshot(), ctx.table.as_deref(), &ctx.file)?;
    let mut view = TableView::load(
        &backend,
        &table.id,
        AccessLevel::Owner,
        ctx.settings.grid_config(),
    )
    .await
    .with_context(|| format!("load table '{}'", table.name))?;
    view.set_mode(mode)?;
    debug!(table_id = %table.id, rows = view.grid().row_count(), "Loaded table");
    Ok((backend, view))
}

/// Position of a column given by id, name or zero-based position.
fn column_position(view: &TableView, key: &str) -> Result<usize> {
    if let Some(index) = view.column_index(key) {
        return Ok(index);
    }
    let columns = view.columns();
    if let Some(index) = columns.iter().position(|column| column.name == key) {
        return Ok(index);
    }
    if let Some(index) = columns
        .iter()
        .position(|column| column.name.eq_ignore_ascii_case(key))
    {
        return Ok(index);
    }
    if let Ok(index) = key.parse::<usize>()
        && index < columns.len()
    {
        return Ok(index);
    }
    let known: Vec<&str> = columns.iter().map(|column| column.name.as_str()).collect();
    bail!("unknown column '{key}' (columns: {})", known.join(", "))
}

/// Resolve a cell address, appending one local row when `row` is the next
/// row after the grid.
fn target_cell(view: &mut TableView, args: &CellArgs) -> Result<(usize, Column, Cell)> {
    let index = column_position(view, &args.column)?;
    let row_count = view.grid().row_count();
    if args.row as usize == row_count {
        view.add_row()?;
    } else if args.row as usize > row_count {
        bail!(
            "row {} does not exist; the table has {row_count} rows (use row {row_count} to append)",
            args.row
        );
    }
    let column = view.columns()[index].clone();
    let cell = view
        .grid()
        .cell(args.row as usize, index)
        .cloned()
        .ok_or_else(|| anyhow!("cell {}:{} is outside the grid", args.row, index))?;
    Ok((index, column, cell))
}

/// Write a cell and turn the outcome into output or an error.
async fn write_cell(
    backend: &FileBackend,
    view: &mut TableView,
    row: u32,
    column: usize,
    value: CellValue,
) -> Result<String> {
    let outcome = view.update_cell(backend, row, column, value).await?;
    let notices = notice_lines(&view.drain_notices());
    match outcome {
        EditOutcome::Saved | EditOutcome::Superseded => Ok(notices),
        EditOutcome::RolledBack => Err(anyhow!(notices)),
        EditOutcome::Skipped => bail!("cell {row}:{column} no longer exists"),
    }
}

// =========================================================================
// Tables and grid
// =========================================================================

async fn run_init(args: &InitArgs, ctx: &Context) -> Result<String> {
    let backend = ctx.open_backend()?;
    if backend.snapshot().find_table(&args.name).is_some() {
        bail!("table '{}' already exists", args.name);
    }
    let specs = args
        .columns
        .iter()
        .map(|spec| parse_column_spec(spec))
        .collect::<Result<Vec<_>>>()?;

    let name = args.name.clone();
    let table = backend.write(|tables| Ok(tables.create_table(&name))).await?;
    for (column_name, column_type) in &specs {
        let column = backend.add_column(&table.id, column_name).await?;
        if *column_type != ColumnType::Text {
            backend.update_column(&column.id, *column_type, None).await?;
        }
    }
    info!(table_id = %table.id, columns = specs.len(), "Initialized table");
    Ok(format!(
        "Created table '{}' ({}) in {}",
        table.name,
        table.id,
        ctx.file.display()
    ))
}

/// `NAME` or `NAME:TYPE`. A suffix that is not a column type stays part of the name.
fn parse_column_spec(spec: &str) -> Result<(String, ColumnType)> {
    let (name, column_type) = match spec.rsplit_once(':') {
        Some((name, ty)) => match ty.parse::<ColumnType>() {
            Ok(column_type) => (name, column_type),
            Err(_) => (spec, ColumnType::Text),
        },
        None => (spec, ColumnType::Text),
    };
    let name = name.trim();
    if name.is_empty() {
        bail!("column name in '{spec}' is empty");
    }
    Ok((name.to_string(), column_type))
}

fn run_tables(ctx: &Context) -> Result<String> {
    let backend = ctx.open_backend()?;
    let tables = backend.snapshot();
    if tables.tables.is_empty() {
        return Ok(format!("No tables in {}", ctx.file.display()));
    }
    let mut table = Table::new();
    table.set_header(vec!["Name", "Columns", "Rows", "Id"]);
    apply_table_style(&mut table);
    for info in &tables.tables {
        let stats = tables.table_stats(&info.id)?;
        table.add_row(vec![
            info.name.clone(),
            stats.columns.to_string(),
            stats.rows.to_string(),
            info.id.clone(),
        ]);
    }
    Ok(table.to_string())
}

/// Delete a table, then release the files its PDF cells pointed to.
async fn run_delete_table(args: &DeleteTableArgs, ctx: &Context) -> Result<String> {
    let backend = ctx.open_backend()?;
    let snapshot = backend.snapshot();
    let table = snapshot
        .find_table(&args.table)
        .cloned()
        .ok_or_else(|| anyhow!("table '{}' not found in {}", args.table, ctx.file.display()))?;
    let pdf_columns: Vec<String> = snapshot
        .list_columns(&table.id)?
        .into_iter()
        .filter(|column| column.column_type == ColumnType::PdfUpload)
        .map(|column| column.id)
        .collect();

    let removed = backend
        .write(|tables| tables.delete_table(&table.id))
        .await?;

    let mut files = 0usize;
    for record in &removed {
        let Value::String(stored) = &record.value else {
            continue;
        };
        if pdf_columns.contains(&record.column_id) && remove_upload(ctx, stored) {
            files += 1;
        }
    }
    info!(table_id = %table.id, records = removed.len(), files, "Deleted table");
    Ok(format!(
        "Deleted table '{}' ({} cells, {files} files)",
        table.name,
        removed.len()
    ))
}

async fn run_show(args: &ShowArgs, ctx: &Context) -> Result<String> {
    let mut ctx = ctx.clone();
    if let Some(min_rows) = args.min_rows {
        ctx.settings.grid.min_rows = min_rows;
    }
    let (_backend, view) = open_view(&ctx, TableMode::View).await?;
    Ok(grid_table(view.columns(), view.grid(), args.raw).to_string())
}

async fn run_columns(ctx: &Context) -> Result<String> {
    let (_backend, view) = open_view(ctx, TableMode::View).await?;
    Ok(columns_table(view.columns()).to_string())
}

// =========================================================================
// Cell edits
// =========================================================================

async fn run_set(args: &SetArgs, ctx: &Context) -> Result<String> {
    let (backend, mut view) = open_view(ctx, TableMode::Structure).await?;
    let (index, column, cell) = target_cell(&mut view, &args.cell)?;
    let value = match column.column_type {
        ColumnType::UserDropdown => {
            let profiles = backend.list_profiles().await?;
            parse_user(&args.value, &profiles)?
        }
        _ => parse_value(&column, &cell, &args.value)?,
    };
    write_cell(&backend, &mut view, args.cell.row, index, value).await
}

async fn run_clear(args: &CellArgs, ctx: &Context) -> Result<String> {
    let (backend, mut view) = open_view(ctx, TableMode::Structure).await?;
    let (index, column, cell) = target_cell(&mut view, args)?;
    if let CellValue::PdfUpload(Some(_)) = cell.value {
        return detach(ctx, &backend, &mut view, args.row, index, &cell).await;
    }
    write_cell(
        &backend,
        &mut view,
        args.row,
        index,
        CellValue::empty(column.column_type),
    )
    .await
}

/// Parse command-line text as a value of the column's type.
fn parse_value(column: &Column, cell: &Cell, raw: &str) -> Result<CellValue> {
    let value = match column.column_type {
        ColumnType::Text => CellValue::Text(raw.to_string()),
        ColumnType::Checkbox => CellValue::Checkbox(parse_checkbox(raw)?),
        ColumnType::Select => {
            let choices = cell_choices(cell);
            if !raw.is_empty() && !choices.iter().any(|choice| choice == raw) {
                bail!(
                    "'{raw}' is not an option of column '{}' (options: {})",
                    column.name,
                    choices.join(", ")
                );
            }
            CellValue::Select(raw.to_string())
        }
        ColumnType::CalendarWeeks => CellValue::CalendarWeeks(parse_week(raw, cell.year)?),
        ColumnType::WeeklySchedule => {
            let json: Value = serde_json::from_str(raw)
                .with_context(|| format!("parse schedule JSON for column '{}'", column.name))?;
            normalize(ColumnType::WeeklySchedule, &json)
        }
        ColumnType::PdfUpload => {
            bail!("column '{}' holds PDF files; use `tabula attach`", column.name)
        }
        ColumnType::UserDropdown => {
            bail!("column '{}' holds users; they are checked against the directory", column.name)
        }
    };
    Ok(value)
}

fn parse_checkbox(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" | "x" => Ok(true),
        "false" | "no" | "off" | "0" | "" => Ok(false),
        other => bail!("'{other}' is not a checkbox value (use true or false)"),
    }
}

/// Accept `KW<week>-<year>` for an existing ISO week, in the column's year if it has one.
fn parse_week(raw: &str, column_year: Option<i32>) -> Result<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(String::new());
    }
    let Some((week, year)) = parse_calendar_week(raw) else {
        bail!("'{raw}' is not a calendar week (expected KW<week>-<year>, e.g. KW12-2024)");
    };
    if CalendarWeek::new(year, week).is_none() {
        bail!("{year} has no calendar week {week}");
    }
    if let Some(column_year) = column_year
        && column_year != year
    {
        bail!("this column offers weeks of {column_year} only");
    }
    Ok(raw.to_string())
}

fn parse_user(raw: &str, profiles: &[Profile]) -> Result<CellValue> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(CellValue::UserDropdown(String::new()));
    }
    let choices = user_choices(profiles);
    if !choices.iter().any(|name| name == raw) {
        if choices.is_empty() {
            bail!("the user directory is empty; add users with `tabula users add`");
        }
        bail!("unknown user '{raw}' (users: {})", choices.join(", "));
    }
    Ok(CellValue::UserDropdown(raw.to_string()))
}

// =========================================================================
// Structure
// =========================================================================

async fn run_delete_row(args: &RowArgs, ctx: &Context) -> Result<String> {
    let (backend, mut view) = open_view(ctx, TableMode::Structure).await?;
    view.delete_row(&backend, args.row).await?;
    Ok(notice_lines(&view.drain_notices()))
}

async fn run_add_column(args: &AddColumnArgs, ctx: &Context) -> Result<String> {
    let name = args.name.trim();
    if name.is_empty() {
        bail!("column name is empty");
    }
    let (backend, mut view) = open_view(ctx, TableMode::Structure).await?;
    view.add_column(&backend, name).await?;
    Ok(notice_lines(&view.drain_notices()))
}

async fn run_update_column(args: &UpdateColumnArgs, ctx: &Context) -> Result<String> {
    let (backend, mut view) = open_view(ctx, TableMode::Structure).await?;
    let column = view.columns()[column_position(&view, &args.column)?].clone();
    let column_type = args.column_type.unwrap_or(column.column_type);

    let raw_options = if !args.options.is_empty() {
        Some(json!(args.options))
    } else if let Some(year) = args.year {
        Some(json!({ "year": year }))
    } else {
        column.options.clone()
    };
    view.update_column(&backend, &column.id, column_type, raw_options.as_ref())
        .await?;
    Ok(notice_lines(&view.drain_notices()))
}

async fn run_delete_column(args: &ColumnArgs, ctx: &Context) -> Result<String> {
    let (backend, mut view) = open_view(ctx, TableMode::Structure).await?;
    let column_id = view.columns()[column_position(&view, &args.column)?]
        .id
        .clone();
    view.delete_column(&backend, &column_id).await?;
    Ok(notice_lines(&view.drain_notices()))
}

// =========================================================================
// Weekly schedules
// =========================================================================

/// Open the schedule editor on a `weekly_schedule` cell.
fn open_editor(ctx: &Context, column: &Column, cell: &Cell) -> Result<ScheduleEditor> {
    let CellValue::WeeklySchedule(schedule) = &cell.value else {
        bail!(
            "column '{}' is a {} column, not a weekly schedule",
            column.name,
            column.column_type
        );
    };
    Ok(ScheduleEditor::open(
        schedule.as_ref(),
        &cell_choices(cell),
        ctx.settings.identity(),
    ))
}

fn check_category(editor: &ScheduleEditor, category: &str) -> Result<()> {
    if category.trim().is_empty() || editor.categories().iter().any(|c| c == category) {
        return Ok(());
    }
    bail!(
        "'{category}' is not a category of this column (categories: {})",
        editor.categories().join(", ")
    )
}

async fn run_schedule_show(args: &CellArgs, ctx: &Context) -> Result<String> {
    let (_backend, view) = open_view(ctx, TableMode::View).await?;
    let index = column_position(&view, &args.column)?;
    let column = &view.columns()[index];
    let cell = view
        .grid()
        .cell(args.row as usize, index)
        .ok_or_else(|| anyhow!("row {} does not exist", args.row))?;
    let CellValue::WeeklySchedule(schedule) = &cell.value else {
        bail!("column '{}' is not a weekly schedule", column.name);
    };
    let Some(schedule) = schedule else {
        return Ok(ScheduleSummary::default().cell_label());
    };
    let summary = ScheduleSummary::of(schedule);
    Ok(format!("{}\n{}", schedule_table(schedule), summary.cell_label()))
}

async fn run_schedule_add(args: &ScheduleAddArgs, ctx: &Context) -> Result<String> {
    let (backend, mut view) = open_view(ctx, TableMode::Structure).await?;
    let (index, column, cell) = target_cell(&mut view, &args.cell)?;
    let mut editor = open_editor(ctx, &column, &cell)?;
    let day = Weekday::from(args.day);

    let id = editor.add_entry(day);
    if let Some(category) = &args.category {
        check_category(&editor, category)?;
        editor.update_field(day, &id, EntryField::Category(category.clone()))?;
    }
    editor.update_field(day, &id, EntryField::Text(args.text.clone()))?;
    editor.update_field(day, &id, EntryField::Hours(args.hours))?;
    editor.update_field(day, &id, EntryField::Minutes(args.minutes))?;
    editor.confirm(day, &id)?;

    let notices = write_cell(&backend, &mut view, args.cell.row, index, editor.save()).await?;
    Ok(format!("Added entry {id} on {}\n{notices}", day.label()))
}

async fn run_schedule_edit(args: &ScheduleEditArgs, ctx: &Context) -> Result<String> {
    let target = &args.target;
    let (backend, mut view) = open_view(ctx, TableMode::Structure).await?;
    let (index, column, cell) = target_cell(&mut view, &target.cell)?;
    let mut editor = open_editor(ctx, &column, &cell)?;
    let day = Weekday::from(target.day);

    editor.edit(day, &target.entry)?;
    if let Some(text) = &args.text {
        editor.update_field(day, &target.entry, EntryField::Text(text.clone()))?;
    }
    if let Some(category) = &args.category {
        check_category(&editor, category)?;
        editor.update_field(day, &target.entry, EntryField::Category(category.clone()))?;
    }
    if let Some(hours) = args.hours {
        editor.update_field(day, &target.entry, EntryField::Hours(hours))?;
    }
    if let Some(minutes) = args.minutes {
        editor.update_field(day, &target.entry, EntryField::Minutes(minutes))?;
    }
    editor.confirm(day, &target.entry)?;

    write_cell(&backend, &mut view, target.cell.row, index, editor.save()).await
}

async fn run_schedule_remove(args: &ScheduleEntryArgs, ctx: &Context) -> Result<String> {
    let (backend, mut view) = open_view(ctx, TableMode::Structure).await?;
    let (index, column, cell) = target_cell(&mut view, &args.cell)?;
    let mut editor = open_editor(ctx, &column, &cell)?;
    editor.delete(Weekday::from(args.day), &args.entry)?;
    write_cell(&backend, &mut view, args.cell.row, index, editor.save()).await
}

// =========================================================================
// PDF attachments
// =========================================================================

fn guess_mime(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("pdf") => PDF_MIME,
        _ => "application/octet-stream",
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn run_check_pdf(args: &CheckPdfArgs) -> Result<String> {
    let bytes =
        fs::read(&args.path).with_context(|| format!("read {}", args.path.display()))?;
    let name = file_name(&args.path);
    let check = validate_pdf_upload(&name, guess_mime(&args.path), &bytes);
    let mut report = upload_report(&name, &check);
    if check.is_valid() {
        report.push_str(&format!(
            "\nstored as: {}",
            sanitize_file_name(&name, Utc::now())
        ));
    }
    Ok(report)
}

async fn run_attach(args: &AttachArgs, ctx: &Context) -> Result<String> {
    let (backend, mut view) = open_view(ctx, TableMode::Structure).await?;
    let (index, column, cell) = target_cell(&mut view, &args.cell)?;
    if column.column_type != ColumnType::PdfUpload {
        bail!("column '{}' does not hold PDF files", column.name);
    }

    let bytes =
        fs::read(&args.path).with_context(|| format!("read {}", args.path.display()))?;
    let name = file_name(&args.path);
    let check = validate_pdf_upload(&name, guess_mime(&args.path), &bytes);
    if !check.is_valid() {
        bail!(upload_report(&name, &check));
    }

    let now = Utc::now();
    let owner = ctx
        .settings
        .identity()
        .map_or_else(|| LOCAL_USER.to_string(), |identity| identity.username);
    let stored = format!(
        "{owner}/{}/{}_{}_{}_{}",
        view.table_id(),
        args.cell.row,
        index,
        now.timestamp_millis(),
        sanitize_file_name(&name, now)
    );
    let Some(destination) = upload_path(ctx, &stored) else {
        bail!("cannot store '{stored}' inside {}", ctx.uploads_dir().display());
    };
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create upload directory {}", parent.display()))?;
    }
    fs::write(&destination, &bytes)
        .with_context(|| format!("store upload {}", destination.display()))?;
    info!(path = %stored, size = bytes.len(), "Stored upload");

    let previous = match cell.value {
        CellValue::PdfUpload(previous) => previous,
        _ => None,
    };
    match write_cell(
        &backend,
        &mut view,
        args.cell.row,
        index,
        CellValue::PdfUpload(Some(stored.clone())),
    )
    .await
    {
        Ok(notices) => {
            if let Some(previous) = previous {
                remove_upload(ctx, &previous);
            }
            Ok(format!("Attached {name} as {stored}\n{notices}"))
        }
        Err(error) => {
            remove_upload(ctx, &stored);
            Err(error)
        }
    }
}

async fn run_detach(args: &CellArgs, ctx: &Context) -> Result<String> {
    let (backend, mut view) = open_view(ctx, TableMode::Structure).await?;
    let (index, column, cell) = target_cell(&mut view, args)?;
    if column.column_type != ColumnType::PdfUpload {
        bail!("column '{}' does not hold PDF files", column.name);
    }
    detach(ctx, &backend, &mut view, args.row, index, &cell).await
}

async fn detach(
    ctx: &Context,
    backend: &FileBackend,
    view: &mut TableView,
    row: u32,
    index: usize,
    cell: &Cell,
) -> Result<String> {
    let CellValue::PdfUpload(Some(stored)) = &cell.value else {
        return Ok("No file attached".to_string());
    };
    let notices = write_cell(backend, view, row, index, CellValue::PdfUpload(None)).await?;
    let action = if remove_upload(ctx, stored) {
        "Removed"
    } else {
        "Detached"
    };
    Ok(format!("{action} {stored}\n{notices}"))
}

/// Location of a stored upload, if the key stays inside the uploads directory.
///
/// Keys are relative paths of plain segments. Empty keys, absolute paths and
/// `.`/`..` segments are refused, and so is anything that resolves outside
/// the directory through a link.
fn upload_path(ctx: &Context, stored: &str) -> Option<PathBuf> {
    let key = Path::new(stored);
    let plain = !stored.is_empty()
        && key
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
    if !plain {
        return None;
    }
    let root = ctx.uploads_dir();
    let path = root.join(key);
    match (root.canonicalize(), path.canonicalize()) {
        (Ok(root), Ok(resolved)) if !resolved.starts_with(&root) => None,
        _ => Some(path),
    }
}

/// Delete a stored upload and report whether a file was removed. A missing
/// file is not an error; a key outside the uploads directory is never touched.
fn remove_upload(ctx: &Context, stored: &str) -> bool {
    let Some(path) = upload_path(ctx, stored) else {
        tracing::warn!(path = %stored, "Refusing to remove upload outside the uploads directory");
        return false;
    };
    match fs::remove_file(&path) {
        Ok(()) => {
            info!(path = %stored, "Removed upload");
            true
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %stored, "Upload already gone");
            false
        }
        Err(e) => {
            tracing::warn!(path = %stored, error = %e, "Could not remove upload");
            false
        }
    }
}

// =========================================================================
// Directories and settings
// =========================================================================

fn run_weeks(args: &WeeksArgs) -> String {
    let year = args.year.unwrap_or_else(|| Utc::now().year());
    let weeks = calendar_weeks(year);
    format!("{}\n{year}: {} weeks", weeks_table(&weeks), weeks.len())
}

async fn run_users(ctx: &Context) -> Result<String> {
    let backend = ctx.open_backend()?;
    let profiles = backend.list_profiles().await?;
    let choices = user_choices(&profiles);
    if choices.is_empty() {
        return Ok("No users".to_string());
    }
    let mut table = Table::new();
    table.set_header(vec!["Username", "Name"]);
    apply_table_style(&mut table);
    for username in choices {
        let full_name = profiles
            .iter()
            .find(|profile| profile.username.as_deref().map(str::trim) == Some(username.as_str()))
            .and_then(|profile| profile.full_name.clone())
            .unwrap_or_default();
        table.add_row(vec![username, full_name]);
    }
    Ok(table.to_string())
}

async fn run_add_user(username: &str, full_name: Option<&str>, ctx: &Context) -> Result<String> {
    let username = username.trim();
    if username.is_empty() {
        bail!("username is empty");
    }
    let backend = ctx.open_backend()?;
    backend
        .write(|tables| {
            let taken = tables
                .profiles
                .iter()
                .any(|profile| profile.username.as_deref() == Some(username));
            if taken {
                return Err(BackendError::Rejected {
                    operation: "add_user",
                    message: format!("user '{username}' already exists"),
                });
            }
            let id = format!("user-{}", tables.profiles.len() + 1);
            tables.profiles.push(Profile {
                id,
                username: Some(username.to_string()),
                full_name: full_name.map(str::to_string),
            });
            Ok(())
        })
        .await?;
    Ok(format!("Added user {username}"))
}

fn run_config(args: &ConfigArgs, ctx: &Context) -> Result<String> {
    let path = ctx.settings_path.as_deref();
    if args.init {
        let Some(path) = path else {
            bail!("no settings location on this platform; pass --config");
        };
        if path.exists() {
            return Ok(format!("Settings already exist at {}", path.display()));
        }
        save_to(&Settings::default(), path)?;
        return Ok(format!("Wrote default settings to {}", path.display()));
    }
    let content = toml::to_string_pretty(&ctx.settings).context("serialize settings")?;
    let location = path.map_or_else(|| "(none)".to_string(), |p| p.display().to_string());
    Ok(format!("# {location}\n{content}"))
}
