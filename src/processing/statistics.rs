use serde::Serialize;

use crate::data::parser::{classify, format_number, CellKind};
use crate::state::table::Table;

/// Rows of the trailing statistics block, in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Statistic {
    Average,
    Median,
    Minimum,
    Maximum,
    Mode,
    NonNumericalDetected,
}

impl Statistic {
    pub const ALL: [Statistic; 6] = [
        Statistic::Average,
        Statistic::Median,
        Statistic::Minimum,
        Statistic::Maximum,
        Statistic::Mode,
        Statistic::NonNumericalDetected,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Statistic::Average => "Average",
            Statistic::Median => "Median",
            Statistic::Minimum => "Minimum",
            Statistic::Maximum => "Maximum",
            Statistic::Mode => "Mode",
            Statistic::NonNumericalDetected => "NonNumericalDetected",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Statistic::ALL.into_iter().find(|s| s.label() == label)
    }
}

/// Statistics for one value column. Undefined values (no numeric cells) are NaN.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnStats {
    pub column: String,
    pub count: usize,
    pub average: f64,
    pub median: f64,
    pub minimum: f64,
    pub maximum: f64,
    pub mode: f64,
    pub non_numerical_detected: bool,
}

impl ColumnStats {
    /// Compute statistics over the numeric cells of a column. Blank cells are
    /// skipped; any other non-numeric cell sets `non_numerical_detected`.
    pub fn compute<'a>(column: &str, cells: impl IntoIterator<Item = &'a str>) -> Self {
        let mut vals: Vec<f64> = Vec::new();
        let mut non_numerical_detected = false;
        for cell in cells {
            match classify(cell) {
                CellKind::Numeric(v) => vals.push(v),
                CellKind::Keyword => non_numerical_detected = true,
                CellKind::Blank => {}
            }
        }

        let count = vals.len();
        if count == 0 {
            return ColumnStats {
                column: column.to_string(),
                count,
                average: f64::NAN,
                median: f64::NAN,
                minimum: f64::NAN,
                maximum: f64::NAN,
                mode: f64::NAN,
                non_numerical_detected,
            };
        }

        let minimum = vals.iter().copied().fold(f64::INFINITY, f64::min);
        let maximum = vals.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let average = vals.iter().sum::<f64>() / count as f64;

        vals.sort_by(|a, b| a.total_cmp(b));
        let median = if count % 2 == 0 {
            (vals[count / 2 - 1] + vals[count / 2]) / 2.0
        } else {
            vals[count / 2]
        };

        ColumnStats {
            column: column.to_string(),
            count,
            average,
            median,
            minimum,
            maximum,
            mode: mode_of_sorted(&vals),
            non_numerical_detected,
        }
    }

    /// The value this column contributes to a statistics row.
    pub fn render(&self, statistic: Statistic) -> String {
        match statistic {
            Statistic::Average => format_number(self.average),
            Statistic::Median => format_number(self.median),
            Statistic::Minimum => format_number(self.minimum),
            Statistic::Maximum => format_number(self.maximum),
            Statistic::Mode => format_number(self.mode),
            Statistic::NonNumericalDetected => {
                let flag = if self.non_numerical_detected { "1" } else { "0" };
                flag.to_string()
            }
        }
    }
}

/// Most frequent value of a non-empty ascending slice. On ties the smallest
/// value wins, since runs are visited in ascending order and only a strictly
/// longer run replaces the current best.
fn mode_of_sorted(sorted: &[f64]) -> f64 {
    let mut best = sorted[0];
    let mut best_run = 0usize;
    let mut start = 0usize;
    while start < sorted.len() {
        let value = sorted[start];
        let run = sorted[start..]
            .iter()
            .take_while(|v| v.total_cmp(&value).is_eq())
            .count();
        if run > best_run {
            best_run = run;
            best = value;
        }
        start += run;
    }
    best
}

/// Per-column statistics, in the table's value-column order.
#[derive(Debug, Clone, Serialize)]
pub struct TableStats {
    pub columns: Vec<ColumnStats>,
}

impl TableStats {
    pub fn compute(table: &Table) -> Self {
        let columns = table
            .value_headers()
            .iter()
            .enumerate()
            .map(|(col, name)| ColumnStats::compute(name, table.column(col)))
            .collect();
        TableStats { columns }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn basic_statistics() {
        let stats = ColumnStats::compute("a", ["4", "1", "", "3", "1"]);
        assert_eq!(stats.count, 4);
        assert_relative_eq!(stats.average, 2.25);
        assert_relative_eq!(stats.median, 2.0);
        assert_relative_eq!(stats.minimum, 1.0);
        assert_relative_eq!(stats.maximum, 4.0);
        assert_relative_eq!(stats.mode, 1.0);
        assert!(!stats.non_numerical_detected);
    }

    #[test]
    fn odd_count_median_is_middle_element() {
        let stats = ColumnStats::compute("a", ["9", "2", "5"]);
        assert_relative_eq!(stats.median, 5.0);
    }

    #[test]
    fn mode_tie_prefers_smallest_value() {
        let stats = ColumnStats::compute("a", ["7", "3", "7", "3", "9"]);
        assert_relative_eq!(stats.mode, 3.0);

        let all_unique = ColumnStats::compute("a", ["5", "-2", "8"]);
        assert_relative_eq!(all_unique.mode, -2.0);
    }

    #[test]
    fn keyword_column_is_flagged_and_undefined() {
        let stats = ColumnStats::compute("b", ["BLOCK", "BLOCK", "BLOCK"]);
        assert!(stats.non_numerical_detected);
        assert_eq!(stats.count, 0);
        assert!(stats.average.is_nan());
        assert!(stats.median.is_nan());
        assert!(stats.minimum.is_nan());
        assert!(stats.maximum.is_nan());
        assert!(stats.mode.is_nan());
    }

    #[test]
    fn keywords_do_not_stop_collection() {
        let stats = ColumnStats::compute("b", ["2", "BLOCK", "4"]);
        assert!(stats.non_numerical_detected);
        assert_eq!(stats.count, 2);
        assert_relative_eq!(stats.average, 3.0);
    }

    #[test]
    fn blank_only_column_is_not_flagged() {
        let stats = ColumnStats::compute("c", ["", " "]);
        assert!(!stats.non_numerical_detected);
        assert!(stats.average.is_nan());
    }

    #[test]
    fn renders_rows() {
        let stats = ColumnStats::compute("a", ["10", "20", "x"]);
        assert_eq!(stats.render(Statistic::Average), "15");
        assert_eq!(stats.render(Statistic::NonNumericalDetected), "1");
        let empty = ColumnStats::compute("b", [""]);
        assert_eq!(empty.render(Statistic::Mode), "NaN");
        assert_eq!(empty.render(Statistic::NonNumericalDetected), "0");
    }

    #[test]
    fn labels_round_trip() {
        for s in Statistic::ALL {
            assert_eq!(Statistic::from_label(s.label()), Some(s));
        }
        assert_eq!(Statistic::from_label("average"), None);
    }

    #[test]
    fn undefined_values_serialise_as_null() {
        let stats = TableStats {
            columns: vec![ColumnStats::compute("b", ["BLOCK"])],
        };
        let json: serde_json::Value = serde_json::from_str(&stats.to_json().unwrap()).unwrap();
        let col = &json["columns"][0];
        assert_eq!(col["column"], "b");
        assert!(col["average"].is_null());
        assert_eq!(col["non_numerical_detected"], true);
    }
}
