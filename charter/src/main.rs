use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::analysis::bar_chart::render_group_charts;
use crate::analysis::matrix_chart::render_matrix_chart;
use crate::data_handling::matrix::read_matrix;
use crate::data_handling::study::Study;
use crate::helper_functions::{data_dir, figure_dir, project_root};
use crate::style::ChartStyle;

mod analysis;
mod data_handling;
mod helper_functions;
mod models;
mod style;

fn main() -> Result<()> {
    // Setup logging and project configuration
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting the study chart pipeline");

    let data = data_dir();
    let figures = figure_dir()?;
    let style = ChartStyle::load_or_default(&project_root().join("style.json"))?;

    let studies = [
        Study {
            name: "MOS",
            data_path: data.join("data_graph.csv"),
            pvalue_path: data.join("data_p_value.csv"),
            y_label: "Mean Opinion Score",
            prefix: "chart",
        },
        Study {
            name: "SSQ",
            data_path: data.join("data_ssq.csv"),
            pvalue_path: data.join("data_ssq_p_value.csv"),
            y_label: "SSQ Score",
            prefix: "ssq",
        },
    ];

    for study in &studies {
        info!("Rendering {} charts", study.name);
        let (plot_groups, pvalue_groups) = study.load()?;
        render_group_charts(
            &plot_groups,
            &pvalue_groups,
            study.y_label,
            study.prefix,
            &figures,
            &style,
        )?;
    }

    // SSQ subscale summary comes as a plain matrix, without group separators.
    let subscales = read_matrix(&data.join("ssq_subscales.csv"))?;
    let subscales_path = figures.join(format!("ssq_subscales.{}", style.image_extension()));
    render_matrix_chart(&subscales, "SSQ Score", "ssq_subscales", &subscales_path, &style)?;

    Ok(())
}
