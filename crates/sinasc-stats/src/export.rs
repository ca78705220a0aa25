//! `;`-delimited serialisation of aggregation results.

use std::io::Write;

use sinasc_common::format_numeric;

use crate::describe::SummaryStats;
use crate::error::Result;
use crate::frequency::FrequencyTable;
use crate::location::LocationSummary;

fn number(value: Option<f64>) -> String {
    value.map(format_numeric).unwrap_or_default()
}

fn csv_writer<W: Write>(writer: W) -> csv::Writer<W> {
    csv::WriterBuilder::new().delimiter(b';').from_writer(writer)
}

/// Write frequency tables side by side: the interval labels of the first
/// table, then one relative-frequency column per `(name, table)` pair.
///
/// Tables are expected to share bins, as the by-state tables do. A single
/// table can be written with any name.
pub fn write_frequency_csv<W: Write>(writer: W, tables: &[(String, FrequencyTable)]) -> Result<()> {
    let mut out = csv_writer(writer);
    let Some((_, first)) = tables.first() else {
        out.flush()?;
        return Ok(());
    };

    let mut header = vec![first.column.clone()];
    header.extend(tables.iter().map(|(name, _)| name.clone()));
    out.write_record(&header)?;

    for (row, bin) in first.bins.iter().enumerate() {
        let mut record = vec![bin.label.clone()];
        record.extend(
            tables
                .iter()
                .map(|(_, table)| format_numeric(table.bins.get(row).map_or(0.0, |bin| bin.relative))),
        );
        out.write_record(&record)?;
    }
    out.flush()?;
    Ok(())
}

/// Write one row per column: count, mean, std, min, quartiles, max.
pub fn write_summary_stats_csv<W: Write>(writer: W, stats: &[SummaryStats]) -> Result<()> {
    let mut out = csv_writer(writer);
    out.write_record(["column", "count", "mean", "std", "min", "25%", "50%", "75%", "max"])?;
    for s in stats {
        out.write_record([
            s.column.clone(),
            s.count.to_string(),
            number(s.mean),
            number(s.std),
            number(s.min),
            number(s.q25),
            number(s.q50),
            number(s.q75),
            number(s.max),
        ])?;
    }
    out.flush()?;
    Ok(())
}

/// Write per-location sums with the header `Label;Total Sum;Count;Mean`.
pub fn write_location_summary_csv<W: Write>(writer: W, rows: &[LocationSummary]) -> Result<()> {
    let mut out = csv_writer(writer);
    out.write_record(["Label", "Total Sum", "Count", "Mean"])?;
    for row in rows {
        out.write_record([
            row.label.clone(),
            format_numeric(row.total_sum),
            row.count.to_string(),
            number(row.mean),
        ])?;
    }
    out.flush()?;
    Ok(())
}
