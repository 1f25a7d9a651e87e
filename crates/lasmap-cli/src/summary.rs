use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ColumnConstraint, ContentArrangement, Table, Width,
};

use lasmap_cli::types::{EditOutcome, PropagateResult, ScanResult, StatsResult};
use lasmap_ingest::DictionaryLoadReport;
use lasmap_map::{FileOutcome, FileReport};
use lasmap_model::DictionaryStats;

pub fn print_scan(result: &ScanResult, details: bool) {
    println!("Directory: {}", result.directory.display());
    println!("Dictionary: {}", result.dictionary.display());
    print_load_report(&result.dictionary_report);

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("File"),
        header_cell("Well"),
        header_cell("Curves"),
        header_cell("Mapped"),
        header_cell("Ignored"),
        header_cell("Unknown"),
        header_cell("Status"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 2..=5 {
        align_column(&mut table, index, CellAlignment::Right);
    }

    for report in &result.batch.files {
        table.add_row(file_row(report));
    }
    let totals = result.batch.totals();
    table.add_row(vec![
        total_cell("TOTAL"),
        total_cell(format!("{} file(s)", totals.files)),
        Cell::new(totals.mapped + totals.ignored + totals.unknown).add_attribute(Attribute::Bold),
        count_cell(totals.mapped, Color::Green),
        count_cell(totals.ignored, Color::DarkYellow),
        count_cell(totals.unknown, Color::Yellow),
        count_cell(totals.failed_files, Color::Red),
    ]);
    println!("{table}");

    if result.unknown.is_empty() {
        println!("No unknown curves.");
        return;
    }
    let mut unknown = Table::new();
    unknown.set_header(vec![header_cell("Unknown mnemonic"), header_cell("Files")]);
    apply_table_style(&mut unknown);
    align_column(&mut unknown, 1, CellAlignment::Right);
    let mut ordered: Vec<(&String, &usize)> = result.unknown.iter().collect();
    ordered.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    for (mnemonic, count) in ordered {
        unknown.add_row(vec![Cell::new(mnemonic), Cell::new(count)]);
    }
    println!();
    println!("{unknown}");

    if details {
        print_unknown_details(&result.batch.files);
    }
}

fn file_row(report: &FileReport) -> Vec<Cell> {
    let name = Cell::new(report.name())
        .fg(Color::Blue)
        .add_attribute(Attribute::Bold);
    match &report.outcome {
        FileOutcome::Classified {
            header,
            classification,
        } => vec![
            name,
            optional_cell(header.well_name.as_deref()),
            Cell::new(classification.total()),
            count_cell(classification.mapped_count(), Color::Green),
            count_cell(classification.ignored.len(), Color::DarkYellow),
            count_cell(classification.unknown.len(), Color::Yellow),
            if classification.unknown.is_empty() {
                Cell::new("ok").fg(Color::Green)
            } else {
                Cell::new("unknown").fg(Color::Yellow)
            },
        ],
        FileOutcome::Failed { message } => vec![
            name,
            dim_cell(message),
            dim_cell("-"),
            dim_cell("-"),
            dim_cell("-"),
            dim_cell("-"),
            Cell::new("failed")
                .fg(Color::Red)
                .add_attribute(Attribute::Bold),
        ],
    }
}

fn print_unknown_details(files: &[FileReport]) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("File"),
        header_cell("Mnemonic"),
        header_cell("Unit"),
        header_cell("Description"),
    ]);
    apply_table_style(&mut table);
    for report in files {
        let Some(classification) = report.classification() else {
            continue;
        };
        for unknown in &classification.unknown {
            table.add_row(vec![
                Cell::new(report.name()),
                Cell::new(&unknown.curve.mnemonic),
                optional_cell(unknown.curve.unit.as_deref()),
                optional_cell(unknown.curve.description.as_deref()),
            ]);
        }
    }
    println!();
    println!("Unknown curves:");
    println!("{table}");
}

pub fn print_stats(result: &StatsResult) {
    println!("Dictionary: {}", result.dictionary.display());
    print_load_report(&result.dictionary_report);
    println!("{}", stats_table(&result.stats));
}

pub fn print_edit(outcome: &EditOutcome) {
    println!("{}", outcome.description);
    println!("Saved: {}", outcome.dictionary.display());
    println!("{}", stats_table(&outcome.stats));
}

pub fn print_propagate(result: &PropagateResult) {
    println!("Reference: {}", result.reference);
    println!(
        "Assigned on reference: {}  Propagated: {}",
        result.assigned_rows, result.propagated_rows
    );

    if result.pending.is_empty() {
        println!("No pending changes.");
    } else {
        let mut table = Table::new();
        table.set_header(vec![
            header_cell("File"),
            header_cell("Field"),
            header_cell("Dictionary"),
            header_cell("New value"),
        ]);
        apply_table_style(&mut table);
        for change in &result.pending {
            table.add_row(vec![
                Cell::new(&change.file),
                Cell::new(&change.field).add_attribute(Attribute::Bold),
                value_cell(&change.from),
                value_cell(&change.to).fg(Color::Green),
            ]);
        }
        println!("{table}");
    }

    let summary = &result.summary;
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Files"),
        header_cell("Failed"),
        header_cell("Rows"),
        header_cell("Modified"),
        header_cell("Mapped"),
        header_cell("Ignored"),
        header_cell("Unknown"),
    ]);
    apply_table_style(&mut table);
    table.add_row(vec![
        Cell::new(summary.files),
        count_cell(summary.failed_files, Color::Red),
        Cell::new(summary.rows),
        count_cell(summary.modified, Color::Cyan),
        count_cell(summary.mapped, Color::Green),
        count_cell(summary.ignored, Color::DarkYellow),
        count_cell(summary.unknown, Color::Yellow),
    ]);
    println!("{table}");

    match &result.commit {
        None => println!("Dry run: dictionary not saved."),
        Some(report) => {
            println!(
                "Committed {} change(s), {} rejected, {} row(s) reclassified.",
                report.applied,
                report.failures.len(),
                report.reclassified
            );
            for failure in &report.failures {
                println!("  {}", failure.message());
            }
        }
    }
}

fn print_load_report(report: &DictionaryLoadReport) {
    let rejected = report.load.rejected.len();
    if rejected == 0 && report.unknown_status == 0 {
        return;
    }
    println!(
        "Skipped on load: {rejected} rejected record(s), {} unknown status row(s)",
        report.unknown_status
    );
}

fn stats_table(stats: &DictionaryStats) -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Kind"), header_cell("Count")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    table.add_row(vec![Cell::new("Base names"), Cell::new(stats.base_count)]);
    table.add_row(vec![Cell::new("Aliases"), Cell::new(stats.alias_count)]);
    table.add_row(vec![Cell::new("Ignored"), Cell::new(stats.ignored_count)]);
    table.add_row(vec![
        total_cell("TOTAL"),
        Cell::new(stats.total_fields()).add_attribute(Attribute::Bold),
    ]);
    table
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(140);
    if table.column_count() >= 7 {
        table.set_constraints(vec![
            ColumnConstraint::UpperBoundary(Width::Percentage(30)),
            ColumnConstraint::UpperBoundary(Width::Percentage(30)),
            ColumnConstraint::LowerBoundary(Width::Fixed(7)),
            ColumnConstraint::LowerBoundary(Width::Fixed(7)),
            ColumnConstraint::LowerBoundary(Width::Fixed(8)),
            ColumnConstraint::LowerBoundary(Width::Fixed(8)),
            ColumnConstraint::LowerBoundary(Width::Fixed(8)),
        ]);
    }
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn total_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

/// Empty cell values read as "(unset)".
fn value_cell(value: &str) -> Cell {
    if value.is_empty() {
        dim_cell("(unset)")
    } else {
        Cell::new(value)
    }
}

fn optional_cell(value: Option<&str>) -> Cell {
    value.map_or_else(|| dim_cell("-"), Cell::new)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
