//! Equal-width binning of numeric and datetime columns.

use nate_common::ToolError;

use crate::table::{Column, ColumnType};

pub const MAX_BINS: usize = 50;

#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub title: String,
    pub kind: ColumnType,
    pub bins: Vec<HistogramBin>,
    /// Non-null values counted.
    pub total: usize,
}

impl Histogram {
    /// Bin the non-null values of `column` into `bins` equal-width buckets.
    /// The last bucket is closed on the right so the maximum is counted.
    pub fn from_column(
        title: impl Into<String>,
        column: &Column,
        bins: usize,
    ) -> Result<Histogram, ToolError> {
        if !matches!(
            column.kind(),
            ColumnType::Integer | ColumnType::Number | ColumnType::DateTime
        ) {
            return Err(ToolError::InvalidArgument {
                name: "column".into(),
                reason: format!(
                    "column '{}' is {}; histograms need integer, number or datetime values",
                    column.name(),
                    column.kind()
                ),
            });
        }
        if !(1..=MAX_BINS).contains(&bins) {
            return Err(ToolError::InvalidArgument {
                name: "bins".into(),
                reason: format!("bins = {bins} is out of range [1, {MAX_BINS}]"),
            });
        }

        let values: Vec<f64> = column
            .cells()
            .iter()
            .filter_map(|c| c.as_f64())
            .filter(|v| v.is_finite())
            .collect();
        if values.is_empty() {
            return Err(ToolError::InvalidArgument {
                name: "column".into(),
                reason: format!("column '{}' has no values to plot", column.name()),
            });
        }

        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let bins = if min == max { 1 } else { bins };
        let width = (max - min) / bins as f64;

        let mut out: Vec<HistogramBin> = (0..bins)
            .map(|i| HistogramBin {
                lower: min + width * i as f64,
                upper: if i + 1 == bins {
                    max
                } else {
                    min + width * (i + 1) as f64
                },
                count: 0,
            })
            .collect();
        for v in &values {
            let slot = if width == 0.0 {
                0
            } else {
                (((v - min) / width).floor() as usize).min(bins - 1)
            };
            out[slot].count += 1;
        }

        Ok(Histogram {
            title: title.into(),
            kind: column.kind(),
            bins: out,
            total: values.len(),
        })
    }

    /// Human-readable bin edge.
    pub fn label(&self, value: f64) -> String {
        match self.kind {
            ColumnType::DateTime => chrono::DateTime::from_timestamp(value as i64, 0)
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| value.to_string()),
            _ => {
                let text = format!("{value:.2}");
                text.trim_end_matches('0').trim_end_matches('.').to_string()
            }
        }
    }

    /// Plain-text bar chart, one line per bin, bars scaled to `width` chars.
    pub fn render_text(&self, width: usize) -> String {
        let peak = self.bins.iter().map(|b| b.count).max().unwrap_or(0).max(1);
        let labels: Vec<String> = self
            .bins
            .iter()
            .map(|b| format!("{} - {}", self.label(b.lower), self.label(b.upper)))
            .collect();
        let label_width = labels.iter().map(String::len).max().unwrap_or(0);

        let mut out = format!("{} ({} values)", self.title, self.total);
        for (bin, label) in self.bins.iter().zip(&labels) {
            let bar = "#".repeat(bin.count * width / peak);
            out.push_str(&format!(
                "\n{label:<label_width$} | {bar} {count}",
                count = bin.count
            ));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{Cell, Table};
    use serde_json::json;

    fn numbers(values: &[i64]) -> Column {
        Column::new(
            "count",
            ColumnType::Integer,
            values.iter().copied().map(Cell::Integer).collect(),
        )
        .unwrap()
    }

    #[test]
    fn counts_every_value_including_maximum() {
        let hist = Histogram::from_column("count", &numbers(&[0, 1, 2, 3, 4, 10]), 5).unwrap();
        let counts: Vec<usize> = hist.bins.iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![2, 2, 1, 0, 1]);
        assert_eq!(hist.total, 6);
        assert_eq!(hist.bins[4].upper, 10.0);
    }

    #[test]
    fn constant_column_uses_one_bin() {
        let hist = Histogram::from_column("count", &numbers(&[7, 7, 7]), 10).unwrap();
        assert_eq!(hist.bins.len(), 1);
        assert_eq!(hist.bins[0].count, 3);
    }

    #[test]
    fn string_columns_are_rejected() {
        let table = Table::from_records(&[json!({"name": "toad"})]).unwrap();
        let err = Histogram::from_column("name", table.column("name").unwrap(), 5).unwrap_err();
        assert!(matches!(err, ToolError::InvalidArgument { .. }));
    }

    #[test]
    fn bin_count_is_bounded() {
        assert!(Histogram::from_column("c", &numbers(&[1, 2]), 0).is_err());
        assert!(Histogram::from_column("c", &numbers(&[1, 2]), MAX_BINS + 1).is_err());
    }

    #[test]
    fn datetime_labels_are_dates() {
        let table = Table::from_records(&[
            json!({"observed_on": "2024-01-01"}),
            json!({"observed_on": "2024-01-31"}),
        ])
        .unwrap();
        let hist =
            Histogram::from_column("observed_on", table.column("observed_on").unwrap(), 2).unwrap();
        assert_eq!(hist.label(hist.bins[0].lower), "2024-01-01");
        assert!(hist.render_text(10).contains("2024-01-31"));
    }

    #[test]
    fn render_scales_bars_to_peak() {
        let hist = Histogram::from_column("count", &numbers(&[1, 1, 2]), 2).unwrap();
        let text = hist.render_text(4);
        assert_eq!(text, "count (3 values)\n1 - 1.5 | #### 2\n1.5 - 2 | ## 1");
    }
}
