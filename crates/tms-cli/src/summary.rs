use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use tms_cli::pipeline::{ImportOutcome, Inspection};
use tms_grading::WarningKind;
use tms_map::MappedValue;

pub fn print_summary(outcome: &ImportOutcome) {
    let report = &outcome.report;
    let test = &report.test;
    println!(
        "Short test {} ({}): {} exercise(s), {} points, {:.0}% needed",
        test.short_test_no,
        if report.created { "created" } else { "updated" },
        test.exercises.len(),
        format_points(test.total_points()),
        test.percentage_needed * 100.0
    );
    println!("Imported at: {}", report.imported_at.to_rfc3339());
    if outcome.dry_run {
        println!("Dry run: short test and gradings not written");
    }
    for path in &outcome.written {
        println!("Wrote: {}", path.display());
    }

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Student"),
        header_cell("Name"),
        header_cell("Points"),
        header_cell("Grading"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Center);
    let mut total_points = 0.0;
    for graded in &report.graded {
        total_points += graded.points;
        table.add_row(vec![
            Cell::new(graded.student_id.as_str()),
            Cell::new(&graded.name),
            Cell::new(format_points(graded.points)),
            if graded.new_grading {
                Cell::new("new").fg(Color::Green)
            } else {
                Cell::new("updated").fg(Color::Yellow)
            },
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(format!("{} student(s)", report.graded.len()))
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(format_points(total_points)).add_attribute(Attribute::Bold),
        dim_cell("-"),
    ]);
    println!("{table}");

    if report.skipped_empty_rows > 0 {
        println!(
            "Skipped {} row(s) without username",
            report.skipped_empty_rows
        );
    }
    print_unmatched(outcome);
    print_warnings(outcome);
}

fn print_unmatched(outcome: &ImportOutcome) {
    let report = &outcome.report;
    if report.unmatched_names.is_empty() && report.unmatched_students.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![header_cell("Unmatched username"), header_cell("Student without results")]);
    apply_table_style(&mut table);
    let rows = report.unmatched_names.len().max(report.unmatched_students.len());
    for index in 0..rows {
        table.add_row(vec![
            report
                .unmatched_names
                .get(index)
                .map_or_else(|| dim_cell("-"), |name| Cell::new(name).fg(Color::Yellow)),
            report
                .unmatched_students
                .get(index)
                .map_or_else(|| dim_cell("-"), |student| Cell::new(student.display_name())),
        ]);
    }
    println!();
    println!("Unmatched:");
    println!("{table}");
}

fn print_warnings(outcome: &ImportOutcome) {
    let warnings = &outcome.report.warnings;
    if warnings.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![header_cell("Row"), header_cell("Kind"), header_cell("Message")]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    for warning in warnings {
        let message = warning.to_string();
        let message = message
            .split_once(": ")
            .map_or(message.as_str(), |(_, rest)| rest);
        table.add_row(vec![
            Cell::new(warning.row_nr + 1),
            Cell::new(warning_kind(&warning.kind)).fg(Color::Yellow),
            Cell::new(message),
        ]);
    }
    println!();
    println!("Warnings:");
    println!("{table}");
}

pub fn print_inspection(inspection: &Inspection) {
    println!(
        "{} column(s), {} row(s)",
        inspection.headers.len(),
        inspection.rows
    );

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Field"),
        header_cell("Label"),
        header_cell("Required"),
        header_cell("Column"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Center);
    for field in &inspection.fields {
        let column = match &field.mapped {
            Some(MappedValue::Single(header)) => Cell::new(header).fg(Color::Green),
            Some(MappedValue::Many(headers)) => Cell::new(headers.join(", ")).fg(Color::Green),
            None if field.dynamic => dim_cell("(choose columns)"),
            None => dim_cell("-"),
        };
        table.add_row(vec![
            Cell::new(&field.name)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(&field.label),
            if field.required {
                Cell::new("yes").add_attribute(Attribute::Bold)
            } else {
                dim_cell("no")
            },
            column,
        ]);
    }
    println!("{table}");

    let mut headers = Table::new();
    headers.set_header(vec![header_cell("#"), header_cell("Header")]);
    apply_table_style(&mut headers);
    align_column(&mut headers, 0, CellAlignment::Right);
    for (index, header) in inspection.headers.iter().enumerate() {
        headers.add_row(vec![Cell::new(index + 1), Cell::new(header)]);
    }
    println!();
    println!("{headers}");
}

fn warning_kind(kind: &WarningKind) -> &'static str {
    match kind {
        WarningKind::UnmatchedUsername { .. } => "unmatched",
        WarningKind::InvalidPoints { .. } => "points",
        WarningKind::TotalMismatch { .. } => "total",
        WarningKind::DuplicateStudent { .. } => "duplicate",
    }
}

fn format_points(points: f64) -> String {
    if points.fract() == 0.0 {
        format!("{points:.0}")
    } else {
        format!("{points}")
    }
}

fn apply_table_style(table: &mut Table) {
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
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
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

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
