//! Terminal rendering of grids, columns and schedules.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell as TableCell, CellAlignment, Color, ContentArrangement, Table};
use tabula_model::{
    CalendarWeek, CellValue, Column, EntryState, NO_CATEGORY, WeeklySchedule, parse_calendar_week,
};
use tabula_normalize::{UploadCheck, column_options};
use tabula_state::{Cell, Grid, Notice, ScheduleSummary, format_duration};

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn header_cell(label: &str) -> TableCell {
    TableCell::new(label).add_attribute(Attribute::Bold)
}

fn dim_cell(text: &str) -> TableCell {
    TableCell::new(text).fg(Color::DarkGrey)
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

/// Display text of one grid cell.
pub fn cell_text(cell: &Cell) -> String {
    match &cell.value {
        CellValue::Text(s) | CellValue::Select(s) | CellValue::UserDropdown(s) => s.clone(),
        CellValue::Checkbox(true) => "[x]".to_string(),
        CellValue::Checkbox(false) => "[ ]".to_string(),
        CellValue::PdfUpload(Some(path)) => path
            .rsplit('/')
            .next()
            .unwrap_or(path.as_str())
            .to_string(),
        CellValue::PdfUpload(None) => String::new(),
        CellValue::CalendarWeeks(value) => week_label(value),
        CellValue::WeeklySchedule(schedule) => schedule
            .as_ref()
            .map(ScheduleSummary::of)
            .unwrap_or_default()
            .cell_label(),
    }
}

/// Long label of a stored week, or the stored text when it does not parse.
fn week_label(value: &str) -> String {
    parse_calendar_week(value)
        .and_then(|(week, year)| CalendarWeek::new(year, week))
        .map_or_else(|| value.to_string(), |week| week.label)
}

/// The grid with a leading row-index column.
pub fn grid_table(columns: &[Column], grid: &Grid, raw: bool) -> Table {
    let mut table = Table::new();
    let mut header = vec![header_cell("#")];
    header.extend(columns.iter().map(|column| header_cell(&column.name)));
    table.set_header(header);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);

    for (index, row) in grid.rows().iter().enumerate() {
        let mut cells = vec![dim_cell(&index.to_string())];
        cells.extend(row.iter().map(|cell| {
            if raw {
                TableCell::new(cell.value.to_json().to_string())
            } else {
                TableCell::new(cell_text(cell))
            }
        }));
        table.add_row(cells);
    }
    table
}

pub fn columns_table(columns: &[Column]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("#"),
        header_cell("Name"),
        header_cell("Type"),
        header_cell("Options"),
        header_cell("Id"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);

    for (index, column) in columns.iter().enumerate() {
        let options = column_options(column);
        let options = match (options.list(), options.year()) {
            (Some(items), _) => items.join(", "),
            (None, Some(year)) => year.to_string(),
            (None, None) => String::new(),
        };
        table.add_row(vec![
            TableCell::new(index),
            TableCell::new(&column.name),
            TableCell::new(column.column_type.as_str()),
            TableCell::new(options),
            dim_cell(&column.id),
        ]);
    }
    table
}

/// Every entry of a schedule, followed by the confirmed totals per day.
pub fn schedule_table(schedule: &WeeklySchedule) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Tag"),
        header_cell("Eintrag"),
        header_cell("Text"),
        header_cell("Kategorie"),
        header_cell("Dauer"),
        header_cell("Status"),
        header_cell("Bearbeitet von"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 4, CellAlignment::Right);

    let summary = ScheduleSummary::of(schedule);
    for (day, entries) in schedule.days() {
        for entry in entries {
            let category = if entry.category == NO_CATEGORY {
                dim_cell("-")
            } else {
                TableCell::new(&entry.category)
            };
            let status = match entry.state() {
                EntryState::Confirmed => TableCell::new("bestätigt").fg(Color::Green),
                EntryState::Editing => TableCell::new("in Bearbeitung").fg(Color::Yellow),
            };
            table.add_row(vec![
                TableCell::new(day.label()),
                dim_cell(&entry.id),
                TableCell::new(&entry.text),
                category,
                TableCell::new(format_duration(entry.duration_minutes())),
                status,
                TableCell::new(entry.last_edited_by.as_deref().unwrap_or("")),
            ]);
        }
        let minutes = summary.day_minutes(day);
        if minutes > 0 {
            table.add_row(vec![
                TableCell::new(day.label()).add_attribute(Attribute::Bold),
                dim_cell(""),
                dim_cell("Summe"),
                dim_cell(""),
                TableCell::new(format_duration(minutes)).add_attribute(Attribute::Bold),
                dim_cell(""),
                dim_cell(""),
            ]);
        }
    }
    table
}

pub fn weeks_table(weeks: &[CalendarWeek]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("KW"),
        header_cell("Von"),
        header_cell("Bis"),
        header_cell("Wert"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    for week in weeks {
        table.add_row(vec![
            TableCell::new(week.week),
            TableCell::new(week.start.format("%d.%m.%Y")),
            TableCell::new(week.end.format("%d.%m.%Y")),
            TableCell::new(&week.value),
        ]);
    }
    table
}

/// One line per notice: `title: description`.
pub fn notice_lines(notices: &[Notice]) -> String {
    notices
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Result of an upload check, one line per problem.
pub fn upload_report(name: &str, check: &UploadCheck) -> String {
    if check.is_valid() {
        return format!("{name}: ok");
    }
    let mut lines = vec![format!("{name}: rejected")];
    lines.extend(check.issues.iter().map(|issue| format!("  - {issue}")));
    lines.join("\n")
}
