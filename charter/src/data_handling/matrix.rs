use std::path::Path;

use anyhow::{Context, Result};
use csv::ReaderBuilder;

/// Numeric score matrix without the group-separator convention: the header
/// names the series (first cell is the row-label column), every following
/// row is a label plus one number per series.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreMatrix {
    pub series: Vec<String>,
    pub row_labels: Vec<String>,
    pub rows: Vec<Vec<f64>>,
}

pub fn read_matrix(path: &Path) -> Result<ScoreMatrix> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    let series: Vec<String> = reader
        .headers()
        .with_context(|| format!("missing header in {}", path.display()))?
        .iter()
        .skip(1)
        .map(|s| s.trim().to_string())
        .collect();

    let mut row_labels = Vec::new();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record =
            record.with_context(|| format!("malformed record in {}", path.display()))?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let mut row = Vec::with_capacity(series.len());
        for field in record.iter().skip(1) {
            let value: f64 = field.trim().parse().with_context(|| {
                format!(
                    "`{}` on line {} of {} is not a number",
                    field,
                    line,
                    path.display()
                )
            })?;
            row.push(value);
        }
        row_labels.push(record.get(0).unwrap_or("").trim().to_string());
        rows.push(row);
    }

    Ok(ScoreMatrix {
        series,
        row_labels,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn header_names_series_and_rows_stay_ordered() {
        let file = write_temp(
            "condition,Nausea,Oculomotor,Disorientation\n\
             Teleport,21.5,28.4,31.3\n\
             Smooth,35.2,30.1,44.6\n",
        );
        let matrix = read_matrix(file.path()).unwrap();
        assert_eq!(matrix.series, ["Nausea", "Oculomotor", "Disorientation"]);
        assert_eq!(matrix.row_labels, ["Teleport", "Smooth"]);
        assert_eq!(matrix.rows[1], vec![35.2, 30.1, 44.6]);
    }

    #[test]
    fn non_numeric_cell_is_an_error() {
        let file = write_temp("condition,Nausea\nTeleport,high\n");
        assert!(read_matrix(file.path()).is_err());
    }

    #[test]
    fn ragged_row_is_an_error() {
        let file = write_temp("condition,Nausea,Oculomotor\nTeleport,21.5\n");
        assert!(read_matrix(file.path()).is_err());
    }
}
