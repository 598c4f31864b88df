use std::path::Path;

use anyhow::Result;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters_backend::DrawingBackend;
use plotters_bitmap::BitMapBackend;
use plotters_svg::SVGBackend;
use tracing::{info, warn};

use crate::data_handling::matrix::ScoreMatrix;
use crate::style::ChartStyle;

/// Render a score matrix as one grouped bar chart: a cluster of bars per row,
/// one palette color per header-named series.
pub fn render_matrix_chart(
    matrix: &ScoreMatrix,
    y_label: &str,
    title: &str,
    path: &Path,
    style: &ChartStyle,
) -> Result<()> {
    if matrix.rows.is_empty() || matrix.series.is_empty() {
        warn!("matrix for `{}` is empty; skipping", title);
        return Ok(());
    }

    let size = (style.width, style.height);
    if style.vector {
        let root = SVGBackend::new(path, size).into_drawing_area();
        draw_matrix_chart_on(&root, matrix, y_label, title, style)?;
    } else {
        let root = BitMapBackend::new(path, size).into_drawing_area();
        draw_matrix_chart_on(&root, matrix, y_label, title, style)?;
    }

    info!("Chart saved to: {}", path.display());
    Ok(())
}

fn draw_matrix_chart_on<DB>(
    root: &DrawingArea<DB, Shift>,
    matrix: &ScoreMatrix,
    y_label: &str,
    title: &str,
    style: &ChartStyle,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let n_rows = matrix.rows.len();
    let n_series = matrix.series.len();

    let tallest = matrix
        .rows
        .iter()
        .flatten()
        .fold(0.0f64, |acc, &v| acc.max(v));
    let y_max = if tallest > 0.0 { tallest * 1.1 } else { 1.0 };

    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(root)
        .caption(title, ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(-0.6f64..(n_rows as f64 - 0.4), 0.0f64..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(0)
        .y_desc(y_label)
        .draw()?;

    // A cluster of series bars per matrix row.
    let cluster_width = 2.0 * style.bar_half_width;
    let bar_width = cluster_width / n_series as f64;
    for (row_idx, row) in matrix.rows.iter().enumerate() {
        for (series_idx, &value) in row.iter().enumerate() {
            let x0 = row_idx as f64 - cluster_width / 2.0 + series_idx as f64 * bar_width;
            chart.draw_series(std::iter::once(Rectangle::new(
                [(x0, 0.0), (x0 + bar_width, value)],
                style.color(series_idx).mix(0.5).filled(),
            )))?;
        }
    }

    // Row labels under the clusters.
    let label_font = ("sans-serif", 16)
        .into_font()
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Top));
    for (row_idx, label) in matrix.row_labels.iter().enumerate() {
        let (px, py) = chart.backend_coord(&(row_idx as f64, 0.0));
        root.draw(&Text::new(label.clone(), (px, py + 6), label_font.clone()))?;
    }

    for (series_idx, name) in matrix.series.iter().enumerate() {
        let color = style.color(series_idx);
        chart
            .draw_series(std::iter::once(Rectangle::new(
                [(-9999.0, -9999.0), (-9998.0, -9998.0)],
                color.mix(0.5).filled(),
            )))?
            .label(name.to_string())
            .legend(move |(x, y)| {
                Rectangle::new([(x, y - 5), (x + 12, y + 5)], color.mix(0.5).filled())
            });
    }
    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .position(SeriesLabelPosition::UpperRight)
        .draw()?;

    root.present()?;
    Ok(())
}
