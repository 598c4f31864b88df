use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters_backend::DrawingBackend;
use plotters_bitmap::BitMapBackend;
use plotters_svg::SVGBackend;
use tracing::{error, info, warn};

use crate::analysis::brackets::BracketLayout;
use crate::analysis::significance::significance_text;
use crate::models::{PValueGroup, PValueRecord, PlotGroup, PlotRecord};
use crate::style::ChartStyle;

struct AnnotationEntry {
    chart: String,
    first: usize,
    second: usize,
    text: String,
}

/// Render one bar chart per group and write them under `out_dir` as
/// `<prefix>_<group index>`, plus a `<prefix>_annotations.csv` summary of the
/// bracket texts. A group-count mismatch between the two inputs skips the
/// whole pass without writing anything.
pub fn render_group_charts(
    plot_groups: &[PlotGroup],
    pvalue_groups: &[PValueGroup],
    y_label: &str,
    prefix: &str,
    out_dir: &Path,
    style: &ChartStyle,
) -> Result<Vec<PathBuf>> {
    if plot_groups.len() != pvalue_groups.len() {
        error!(
            "data size does not match: {} plot groups vs {} p-value groups; skipping `{}` charts",
            plot_groups.len(),
            pvalue_groups.len(),
            prefix
        );
        return Ok(Vec::new());
    }

    let mut written = Vec::new();
    let mut annotations = Vec::new();
    for (idx, (group, pvalues)) in plot_groups.iter().zip(pvalue_groups.iter()).enumerate() {
        let title = format!("{}_{}", prefix, idx);
        if group.is_empty() {
            warn!("group {} of `{}` has no rows; skipping", idx, prefix);
            continue;
        }

        let path = out_dir.join(format!("{}.{}", title, style.image_extension()));
        draw_group_chart(group, pvalues, y_label, &title, &path, style)
            .with_context(|| format!("rendering {}", path.display()))?;
        info!("Chart saved to: {}", path.display());

        for record in pvalues {
            annotations.push(AnnotationEntry {
                chart: title.clone(),
                first: record.first,
                second: record.second,
                text: significance_text(&record.value, style.max_stars),
            });
        }
        written.push(path);
    }

    if !plot_groups.is_empty() {
        let summary_path = out_dir.join(format!("{}_annotations.csv", prefix));
        save_annotation_summary(&summary_path, &annotations)?;
    }
    Ok(written)
}

fn draw_group_chart(
    group: &[PlotRecord],
    pvalues: &[PValueRecord],
    y_label: &str,
    title: &str,
    path: &Path,
    style: &ChartStyle,
) -> Result<()> {
    // Geometry first: bracket heights depend on the y-range, so everything is
    // laid out against a provisional range before any backend exists. The
    // bitmap backend writes its buffer when dropped, so a bad bar index must
    // be caught before the output file is touched.
    let n = group.len();
    let tallest = group.iter().map(|r| r.mean + r.err).fold(0.0f64, f64::max);
    let axis_range = if tallest > 0.0 { tallest * 1.1 } else { 1.0 };

    let mut layout = BracketLayout::new(axis_range, style.offset_frac, style.step_frac);
    let mut brackets = Vec::with_capacity(pvalues.len());
    for record in pvalues {
        for &bar in &[record.first, record.second] {
            if bar >= n {
                bail!(
                    "p-value record ({}, {}) references bar {} but the group has {} bars",
                    record.first,
                    record.second,
                    bar,
                    n
                );
            }
        }
        let y = layout.place(
            record.first as f64,
            record.second as f64,
            group[record.first].mean + group[record.first].err,
            group[record.second].mean + group[record.second].err,
        );
        brackets.push((record, y));
    }

    let tick = style.tick_frac * axis_range;
    let y_max = match layout.max_height() {
        Some(top) => axis_range.max(top + 4.0 * tick),
        None => axis_range,
    };

    let size = (style.width, style.height);
    if style.vector {
        let root = SVGBackend::new(path, size).into_drawing_area();
        draw_group_chart_on(&root, group, &brackets, tick, y_max, y_label, title, style)
    } else {
        let root = BitMapBackend::new(path, size).into_drawing_area();
        draw_group_chart_on(&root, group, &brackets, tick, y_max, y_label, title, style)
    }
}

fn draw_group_chart_on<DB>(
    root: &DrawingArea<DB, Shift>,
    group: &[PlotRecord],
    brackets: &[(&PValueRecord, f64)],
    tick: f64,
    y_max: f64,
    y_label: &str,
    title: &str,
    style: &ChartStyle,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let n = group.len();

    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(root)
        .caption(title, ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(-0.6f64..(n as f64 - 0.4), 0.0f64..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(0)
        .y_desc(y_label)
        .draw()?;

    // Bars, colored per legend label in order of first appearance.
    let legends = legend_order(group);
    for (i, record) in group.iter().enumerate() {
        let color = style.color(legend_position(&legends, &record.legend));
        let x = i as f64;
        chart.draw_series(std::iter::once(Rectangle::new(
            [
                (x - style.bar_half_width, 0.0),
                (x + style.bar_half_width, record.mean),
            ],
            color.mix(0.5).filled(),
        )))?;
    }

    // Error bars: stem plus caps, clipped at the axis floor.
    for (i, record) in group.iter().enumerate() {
        if record.err <= 0.0 {
            continue;
        }
        let x = i as f64;
        let lower = (record.mean - record.err).max(0.0);
        let upper = record.mean + record.err;
        chart.draw_series(std::iter::once(PathElement::new(
            vec![(x, lower), (x, upper)],
            BLACK.stroke_width(2),
        )))?;
        for y in [lower, upper] {
            chart.draw_series(std::iter::once(PathElement::new(
                vec![(x - style.cap_half_width, y), (x + style.cap_half_width, y)],
                BLACK.stroke_width(2),
            )))?;
        }
    }

    // Category names under the bars. The mesh labels are disabled above
    // because ticks of a continuous axis do not land on the bar centers.
    let category_font = ("sans-serif", 16)
        .into_font()
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Top));
    for (i, record) in group.iter().enumerate() {
        let (px, py) = chart.backend_coord(&(i as f64, 0.0));
        root.draw(&Text::new(
            record.category.clone(),
            (px, py + 6),
            category_font.clone(),
        ))?;
    }

    // Significance brackets with centered labels.
    let bracket_font = ("sans-serif", 16)
        .into_font()
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Bottom));
    for (record, y) in brackets {
        let y = *y;
        let x1 = record.first as f64;
        let x2 = record.second as f64;
        chart.draw_series(std::iter::once(PathElement::new(
            vec![(x1, y - tick), (x1, y), (x2, y), (x2, y - tick)],
            BLACK.stroke_width(2),
        )))?;
        chart.draw_series(std::iter::once(Text::new(
            significance_text(&record.value, style.max_stars),
            ((x1 + x2) / 2.0, y + 0.5 * tick),
            bracket_font.clone(),
        )))?;
    }

    // Value labels inside the bars.
    let value_font = ("sans-serif", 15)
        .into_font()
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Center));
    for (i, record) in group.iter().enumerate() {
        chart.draw_series(std::iter::once(Text::new(
            format!("{:.2}", record.mean),
            (i as f64, record.mean * style.value_label_frac),
            value_font.clone(),
        )))?;
    }

    // Legend only when the group distinguishes more than one label.
    if legends.len() > 1 {
        for name in &legends {
            let color = style.color(legend_position(&legends, name));
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
    }

    root.present()?;
    Ok(())
}

fn legend_order(group: &[PlotRecord]) -> Vec<String> {
    let mut order: Vec<String> = Vec::new();
    for record in group {
        if !order.iter().any(|l| l == &record.legend) {
            order.push(record.legend.clone());
        }
    }
    order
}

fn legend_position(order: &[String], legend: &str) -> usize {
    order.iter().position(|l| l == legend).unwrap_or(0)
}

fn save_annotation_summary(path: &Path, entries: &[AnnotationEntry]) -> Result<()> {
    let mut file = File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;

    writeln!(file, "chart,first,second,text")?;
    for entry in entries {
        writeln!(
            file,
            "{},{},{},{}",
            entry.chart, entry.first, entry.second, entry.text
        )?;
    }

    info!("Annotation summary saved to: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BracketValue;

    fn record(mean: f64, err: f64, category: &str, legend: &str) -> PlotRecord {
        PlotRecord {
            mean,
            err,
            category: category.to_string(),
            legend: legend.to_string(),
        }
    }

    fn sample_groups() -> (Vec<PlotGroup>, Vec<PValueGroup>) {
        let plot = vec![
            vec![
                record(3.4, 0.4, "Static", "Baseline"),
                record(4.0, 0.3, "Static", "Proposed"),
                record(2.9, 0.5, "Static", "No cue"),
            ],
            vec![
                record(3.1, 0.4, "Walking", "Baseline"),
                record(4.1, 0.4, "Walking", "Proposed"),
            ],
        ];
        let pvalues = vec![
            vec![
                PValueRecord {
                    first: 0,
                    second: 1,
                    value: BracketValue::P(0.032),
                },
                PValueRecord {
                    first: 0,
                    second: 2,
                    value: BracketValue::Label("n. s.".to_string()),
                },
            ],
            vec![PValueRecord {
                first: 0,
                second: 1,
                value: BracketValue::P(0.005),
            }],
        ];
        (plot, pvalues)
    }

    #[test]
    fn mismatched_group_counts_write_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let (plot, _) = sample_groups();
        let pvalues: Vec<PValueGroup> = Vec::new();

        let written = render_group_charts(
            &plot,
            &pvalues,
            "Mean Opinion Score",
            "chart",
            dir.path(),
            &ChartStyle::default(),
        )
        .unwrap();

        assert!(written.is_empty());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn out_of_range_bar_index_fails_the_pass() {
        let dir = tempfile::tempdir().unwrap();
        let (plot, _) = sample_groups();
        let pvalues = vec![
            vec![PValueRecord {
                first: 0,
                second: 7,
                value: BracketValue::P(0.01),
            }],
            Vec::new(),
        ];

        let err = render_group_charts(
            &plot,
            &pvalues,
            "Mean Opinion Score",
            "chart",
            dir.path(),
            &ChartStyle::default(),
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("references bar 7"));
        // The bad index is caught before any backend touches the disk.
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn renders_one_image_per_group() {
        let dir = tempfile::tempdir().unwrap();
        let (plot, pvalues) = sample_groups();

        let written = render_group_charts(
            &plot,
            &pvalues,
            "Mean Opinion Score",
            "chart",
            dir.path(),
            &ChartStyle::default(),
        )
        .unwrap();

        assert_eq!(written.len(), 2);
        for (idx, path) in written.iter().enumerate() {
            assert_eq!(
                path.file_name().unwrap().to_str().unwrap(),
                format!("chart_{}.png", idx)
            );
            assert!(path.exists());
            assert!(std::fs::metadata(path).unwrap().len() > 0);
        }

        let summary =
            std::fs::read_to_string(dir.path().join("chart_annotations.csv")).unwrap();
        assert!(summary.contains("chart_0,0,1,*"));
        assert!(summary.contains("chart_0,0,2,n. s."));
        assert!(summary.contains("chart_1,0,1,**"));
    }
}
