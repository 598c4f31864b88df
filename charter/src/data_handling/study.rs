use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::data_handling::groups::{load_plot_groups, load_pvalue_groups};
use crate::models::{PValueGroup, PlotGroup};

/// One study: a plot-data file paired with a p-value file, plus the labels
/// that distinguish its charts from the other studies'.
pub struct Study {
    pub name: &'static str,
    pub data_path: PathBuf,
    pub pvalue_path: PathBuf,
    pub y_label: &'static str,
    /// Image files are named `<prefix>_<group index>`.
    pub prefix: &'static str,
}

impl Study {
    pub fn load(&self) -> Result<(Vec<PlotGroup>, Vec<PValueGroup>)> {
        let plot_groups = load_plot_groups(&self.data_path)
            .with_context(|| format!("loading {} plot data", self.name))?;
        let pvalue_groups = load_pvalue_groups(&self.pvalue_path)
            .with_context(|| format!("loading {} p-values", self.name))?;
        Ok((plot_groups, pvalue_groups))
    }
}
