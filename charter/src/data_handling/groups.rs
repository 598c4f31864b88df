use std::path::Path;

use anyhow::{bail, Context, Result};
use csv::{ReaderBuilder, StringRecord};
use log::debug;

use crate::models::{BracketValue, PValueRecord, PlotRecord};

/// Read a delimited file into groups of raw records.
///
/// The first record is a header and is discarded. A record whose first field
/// is empty separates groups and belongs to none of them. The final group
/// needs no trailing separator.
pub fn read_groups(path: &Path) -> Result<Vec<Vec<StringRecord>>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    let mut groups = Vec::new();
    let mut current = Vec::new();
    for record in reader.records() {
        let record =
            record.with_context(|| format!("malformed record in {}", path.display()))?;
        if record.get(0).unwrap_or("").is_empty() {
            groups.push(std::mem::take(&mut current));
        } else {
            current.push(record);
        }
    }
    if !current.is_empty() {
        groups.push(current);
    }

    debug!("parsed {} groups from {}", groups.len(), path.display());
    Ok(groups)
}

/// Typed view of a plot-data file: rows are `(mean, error, category, legend)`.
pub fn load_plot_groups(path: &Path) -> Result<Vec<Vec<PlotRecord>>> {
    let raw = read_groups(path)?;
    let mut groups = Vec::with_capacity(raw.len());
    for records in raw {
        let mut group = Vec::with_capacity(records.len());
        for record in records {
            let line = record_line(&record);
            if record.len() < 4 {
                bail!(
                    "line {} in {} has {} fields, expected 4",
                    line,
                    path.display(),
                    record.len()
                );
            }
            group.push(PlotRecord {
                mean: parse_f64(&record[0], path, line, "mean")?,
                err: parse_f64(&record[1], path, line, "error")?,
                category: record[2].to_string(),
                legend: record[3].to_string(),
            });
        }
        groups.push(group);
    }
    Ok(groups)
}

/// Typed view of a p-value file: rows are `(first, second, value)`. The value
/// field stays a label when it does not parse as a float.
pub fn load_pvalue_groups(path: &Path) -> Result<Vec<Vec<PValueRecord>>> {
    let raw = read_groups(path)?;
    let mut groups = Vec::with_capacity(raw.len());
    for records in raw {
        let mut group = Vec::with_capacity(records.len());
        for record in records {
            let line = record_line(&record);
            if record.len() < 3 {
                bail!(
                    "line {} in {} has {} fields, expected 3",
                    line,
                    path.display(),
                    record.len()
                );
            }
            group.push(PValueRecord {
                first: parse_index(&record[0], path, line, "first bar index")?,
                second: parse_index(&record[1], path, line, "second bar index")?,
                value: BracketValue::from_field(&record[2]),
            });
        }
        groups.push(group);
    }
    Ok(groups)
}

fn record_line(record: &StringRecord) -> u64 {
    record.position().map(|p| p.line()).unwrap_or(0)
}

fn parse_f64(field: &str, path: &Path, line: u64, what: &str) -> Result<f64> {
    field.trim().parse::<f64>().with_context(|| {
        format!(
            "{} `{}` on line {} of {} is not a number",
            what,
            field,
            line,
            path.display()
        )
    })
}

fn parse_index(field: &str, path: &Path, line: u64, what: &str) -> Result<usize> {
    field.trim().parse::<usize>().with_context(|| {
        format!(
            "{} `{}` on line {} of {} is not a bar index",
            what,
            field,
            line,
            path.display()
        )
    })
}
