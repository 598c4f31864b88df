/// One bar of a chart, parsed from a `(mean, error, category, legend)` row.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotRecord {
    pub mean: f64,
    /// Error-bar magnitude (variance or squared error, depending on the study).
    pub err: f64,
    /// Tick label under the bar.
    pub category: String,
    /// Legend label; bars sharing a legend label share a color.
    pub legend: String,
}

/// Third column of a p-value row: a numeric p-value, or literal bracket text
/// that is drawn verbatim.
#[derive(Debug, Clone, PartialEq)]
pub enum BracketValue {
    P(f64),
    Label(String),
}

impl BracketValue {
    pub fn from_field(field: &str) -> Self {
        let field = field.trim();
        match field.parse::<f64>() {
            Ok(p) => BracketValue::P(p),
            Err(_) => BracketValue::Label(field.to_string()),
        }
    }
}

/// One significance bracket, spanning bars `first` and `second` of its group.
#[derive(Debug, Clone, PartialEq)]
pub struct PValueRecord {
    pub first: usize,
    pub second: usize,
    pub value: BracketValue,
}

pub type PlotGroup = Vec<PlotRecord>;
pub type PValueGroup = Vec<PValueRecord>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_field_becomes_p_value() {
        assert_eq!(BracketValue::from_field("0.032"), BracketValue::P(0.032));
        assert_eq!(BracketValue::from_field(" 1e-4 "), BracketValue::P(1e-4));
    }

    #[test]
    fn non_numeric_field_becomes_label() {
        assert_eq!(
            BracketValue::from_field("n. s."),
            BracketValue::Label("n. s.".to_string())
        );
    }
}
