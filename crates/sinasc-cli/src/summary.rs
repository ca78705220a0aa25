use anyhow::Result;
use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use serde::Serialize;
use sinasc_common::format_numeric;
use sinasc_stats::{CategoryMeans, FrequencyTable, LocationSummary, SummaryStats};

use crate::commands::{CleanResult, InitConfigResult};

pub fn print_init_config(result: &InitConfigResult) {
    if result.written {
        println!("Wrote default rules to {}", result.path.display());
    } else {
        println!(
            "Kept existing rules at {} (use --force to overwrite)",
            result.path.display()
        );
    }
    let config = &result.config;
    let mut table = Table::new();
    table.set_header(vec![header_cell("Rule"), header_cell("Value")]);
    apply_table_style(&mut table);
    table.add_row(vec![
        Cell::new("Index column"),
        Cell::new(config.index_column.as_deref().unwrap_or("-")),
    ]);
    table.add_row(vec![
        Cell::new("Removed columns"),
        Cell::new(config.columns_to_remove.len()),
    ]);
    table.add_row(vec![
        Cell::new("Restricted columns"),
        Cell::new(config.restrictions.len()),
    ]);
    table.add_row(vec![
        Cell::new("Z-score columns"),
        Cell::new(config.columns_to_filter_by_zscore.len()),
    ]);
    table.add_row(vec![
        Cell::new("Z-score limit"),
        Cell::new(format_numeric(config.zscore_limit)),
    ]);
    table.add_row(vec![
        Cell::new("Chunk size"),
        Cell::new(config.chunk_size),
    ]);
    println!("{table}");
}

pub fn print_clean(result: &CleanResult) {
    println!("Input: {}", result.input.display());
    println!("Output: {}", result.output.display());
    println!("Rules: {}", result.config_path.display());
    let report = &result.report;
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Chunks"),
        header_cell("Passes"),
        header_cell("Rows read"),
        header_cell("Rows written"),
        header_cell("Rows dropped"),
        header_cell("Elapsed"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 0..6 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    let dropped = report.rows_read.saturating_sub(report.rows_written);
    table.add_row(vec![
        Cell::new(report.chunks),
        Cell::new(report.passes),
        Cell::new(report.rows_read),
        Cell::new(report.rows_written).add_attribute(Attribute::Bold),
        count_cell(dropped, Color::Yellow),
        dim_cell(format!("{:.2?}", result.elapsed)),
    ]);
    println!("{table}");
}

/// Interval labels down the side, one relative-frequency column per group.
pub fn frequency_table(tables: &[(String, FrequencyTable)]) -> Table {
    let mut table = Table::new();
    let Some((_, first)) = tables.first() else {
        return table;
    };
    let mut header = vec![header_cell(&first.column)];
    header.extend(tables.iter().map(|(group, _)| header_cell(group)));
    table.set_header(header);
    apply_table_style(&mut table);
    for index in 1..=tables.len() {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for (row, bin) in first.bins.iter().enumerate() {
        let mut cells = vec![Cell::new(&bin.label)];
        cells.extend(tables.iter().map(|(_, frequency)| {
            frequency
                .bins
                .get(row)
                .map_or_else(|| dim_cell("-"), |bin| percent_cell(bin.relative))
        }));
        table.add_row(cells);
    }
    let mut totals = vec![dim_cell("n")];
    totals.extend(
        tables
            .iter()
            .map(|(_, frequency)| dim_cell(frequency.total)),
    );
    table.add_row(totals);
    table
}

pub fn describe_table(stats: &[SummaryStats]) -> Table {
    let mut table = Table::new();
    table.set_header(
        ["Column", "Count", "Mean", "Std", "Min", "25%", "50%", "75%", "Max"]
            .into_iter()
            .map(header_cell)
            .collect::<Vec<_>>(),
    );
    apply_table_style(&mut table);
    for index in 1..9 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for s in stats {
        table.add_row(vec![
            Cell::new(&s.column).add_attribute(Attribute::Bold),
            Cell::new(s.count),
            number_cell(s.mean),
            number_cell(s.std),
            number_cell(s.min),
            number_cell(s.q25),
            number_cell(s.q50),
            number_cell(s.q75),
            number_cell(s.max),
        ]);
    }
    table
}

pub fn location_table(rows: &[LocationSummary]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Location"),
        header_cell("Total Sum"),
        header_cell("Count"),
        header_cell("Mean"),
    ]);
    apply_table_style(&mut table);
    for index in 1..4 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for row in rows {
        let label = if row.count == 0 {
            dim_cell(&row.label)
        } else {
            Cell::new(&row.label)
        };
        table.add_row(vec![
            label,
            Cell::new(format_numeric(row.total_sum)),
            Cell::new(row.count),
            number_cell(row.mean),
        ]);
    }
    table
}

/// One row per category, one column per averaged variable.
pub fn means_table(means: &[CategoryMeans]) -> Table {
    let mut table = Table::new();
    let mut header = vec![header_cell("Category")];
    if let Some(first) = means.first() {
        header.extend(first.means.iter().map(|(column, _)| header_cell(column)));
    }
    table.set_header(header);
    apply_table_style(&mut table);
    for row in means {
        let mut cells = vec![Cell::new(format!(
            "{} ({})",
            row.category.label, row.category.code
        ))];
        cells.extend(row.means.iter().map(|(_, mean)| number_cell(*mean)));
        table.add_row(cells);
    }
    table
}

pub fn print_frequency(tables: &[(String, FrequencyTable)], json: bool) -> Result<()> {
    if json {
        return print_json(&tables);
    }
    if tables.is_empty() {
        println!("No rows to tabulate.");
        return Ok(());
    }
    println!("{}", frequency_table(tables));
    Ok(())
}

pub fn print_describe(groups: &[(String, Vec<SummaryStats>)], json: bool) -> Result<()> {
    if json {
        return print_json(&groups);
    }
    for (group, stats) in groups {
        println!("{group}");
        println!("{}", describe_table(stats));
    }
    Ok(())
}

pub fn print_location_summary(rows: &[LocationSummary], json: bool) -> Result<()> {
    if json {
        return print_json(&rows);
    }
    println!("{}", location_table(rows));
    Ok(())
}

pub fn print_means(groups: &[(String, Vec<CategoryMeans>)], json: bool) -> Result<()> {
    if json {
        return print_json(&groups);
    }
    for (group, means) in groups {
        println!("{group}");
        println!("{}", means_table(means));
    }
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
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

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn number_cell(value: Option<f64>) -> Cell {
    match value {
        Some(v) => Cell::new(format_numeric((v * 1e4).round() / 1e4)),
        None => dim_cell("-"),
    }
}

fn percent_cell(relative: f64) -> Cell {
    if relative == 0.0 {
        dim_cell("0%")
    } else {
        Cell::new(format!("{:.2}%", relative * 100.0))
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).add_attribute(Attribute::Dim)
}
