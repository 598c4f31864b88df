use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use plotters::style::RGBColor;
use serde::Deserialize;
use tracing::info;

/// Chart appearance knobs. Loaded from an optional `style.json` at the
/// project root; fields missing from the file keep the defaults below.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChartStyle {
    pub width: u32,
    pub height: u32,
    /// RGB triples cycled over legend labels.
    pub palette: Vec<[u8; 3]>,
    /// Half-width of a bar, in bar-index units.
    pub bar_half_width: f64,
    /// Half-width of error-bar caps, in bar-index units.
    pub cap_half_width: f64,
    /// Bracket base offset above the taller end bar, as a fraction of the
    /// y-axis range.
    pub offset_frac: f64,
    /// Extra lift applied while a bracket would cross one already placed.
    pub step_frac: f64,
    /// Length of a bracket's end ticks, as a fraction of the y-axis range.
    pub tick_frac: f64,
    /// Height of the value label inside each bar, as a fraction of bar height.
    pub value_label_frac: f64,
    /// Upper bound on asterisks awarded to very small p-values.
    pub max_stars: usize,
    /// Write SVG instead of PNG.
    pub vector: bool,
}

impl Default for ChartStyle {
    fn default() -> Self {
        ChartStyle {
            width: 800,
            height: 600,
            palette: vec![
                [0, 119, 182],   // Blue
                [217, 72, 1],    // Orange
                [0, 153, 136],   // Teal
                [153, 0, 153],   // Purple
                [230, 159, 0],   // Yellow
                [86, 180, 233],  // Sky Blue
                [213, 94, 0],    // Vermillion
                [0, 158, 115],   // Bluish Green
                [204, 121, 167], // Reddish Purple
            ],
            bar_half_width: 0.4,
            cap_half_width: 0.12,
            offset_frac: 0.03,
            step_frac: 0.05,
            tick_frac: 0.02,
            value_label_frac: 0.5,
            max_stars: 4,
            vector: false,
        }
    }
}

impl ChartStyle {
    /// Read `path` if it exists, otherwise fall back to the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(ChartStyle::default());
        }
        let file = File::open(path)
            .with_context(|| format!("failed to open style file {}", path.display()))?;
        let style: ChartStyle = serde_json::from_reader(file)
            .with_context(|| format!("malformed style file {}", path.display()))?;
        info!("Loaded chart style from {}", path.display());
        Ok(style)
    }

    pub fn color(&self, idx: usize) -> RGBColor {
        if self.palette.is_empty() {
            return RGBColor(0, 0, 0);
        }
        let [r, g, b] = self.palette[idx % self.palette.len()];
        RGBColor(r, g, b)
    }

    pub fn image_extension(&self) -> &'static str {
        if self.vector {
            "svg"
        } else {
            "png"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn missing_file_gives_defaults() {
        let style = ChartStyle::load_or_default(Path::new("does_not_exist.json")).unwrap();
        assert_eq!(style.width, 800);
        assert_eq!(style.max_stars, 4);
        assert!(!style.vector);
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(br#"{"width": 1200, "offset_frac": 0.05}"#).unwrap();
        file.flush().unwrap();

        let style = ChartStyle::load_or_default(file.path()).unwrap();
        assert_eq!(style.width, 1200);
        assert_eq!(style.offset_frac, 0.05);
        assert_eq!(style.height, 600);
    }

    #[test]
    fn palette_cycles() {
        let style = ChartStyle::default();
        let n = style.palette.len();
        assert_eq!(style.color(0), style.color(n));
    }
}
