// Descriptive statistics over a subset of rows
// Renders the summary table embedded in the explanation prompt

use serde::{Deserialize, Serialize};

use crate::entities::{NumericSelection, SensorTable};

const STAT_LABELS: [&str; 8] = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnStats {
    pub name: String,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub q50: f64,
    pub q75: f64,
    pub max: f64,
}

impl ColumnStats {
    pub fn from_values(name: &str, values: &[f64]) -> Self {
        let count = values.len();
        if count == 0 {
            return Self {
                name: name.to_string(),
                count,
                mean: f64::NAN,
                std: f64::NAN,
                min: f64::NAN,
                q25: f64::NAN,
                q50: f64::NAN,
                q75: f64::NAN,
                max: f64::NAN,
            };
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let mean = sorted.iter().sum::<f64>() / count as f64;
        let std = if count > 1 {
            let variance = sorted
                .iter()
                .map(|value| (value - mean).powi(2))
                .sum::<f64>()
                / (count - 1) as f64;
            variance.sqrt()
        } else {
            f64::NAN
        };
        Self {
            name: name.to_string(),
            count,
            mean,
            std,
            min: sorted[0],
            q25: quantile_sorted(&sorted, 0.25),
            q50: quantile_sorted(&sorted, 0.5),
            q75: quantile_sorted(&sorted, 0.75),
            max: sorted[count - 1],
        }
    }

    fn values(&self) -> [f64; 8] {
        [
            self.count as f64,
            self.mean,
            self.std,
            self.min,
            self.q25,
            self.q50,
            self.q75,
            self.max,
        ]
    }
}

/// Per-column statistics over `rows`; missing readings are skipped.
pub fn describe(table: &SensorTable, selection: &NumericSelection, rows: &[usize]) -> Vec<ColumnStats> {
    selection
        .indices
        .iter()
        .filter_map(|&index| table.columns().get(index))
        .map(|column| {
            let values = rows
                .iter()
                .filter_map(|&row| column.value(row))
                .collect::<Vec<_>>();
            ColumnStats::from_values(&column.name, &values)
        })
        .collect()
}

/// Fixed-width text table: one line per statistic, one column per sensor.
pub fn render_describe(stats: &[ColumnStats]) -> String {
    let label_width = STAT_LABELS.iter().map(|label| label.len()).max().unwrap_or(0);
    let cells = stats
        .iter()
        .map(|column| column.values().map(format_stat))
        .collect::<Vec<_>>();
    let widths = stats
        .iter()
        .zip(&cells)
        .map(|(column, values)| {
            values
                .iter()
                .map(String::len)
                .chain(std::iter::once(column.name.len()))
                .max()
                .unwrap_or(0)
        })
        .collect::<Vec<_>>();

    let mut lines = Vec::with_capacity(STAT_LABELS.len() + 1);
    let mut header = " ".repeat(label_width);
    for (column, width) in stats.iter().zip(&widths) {
        header.push_str(&format!("  {:>width$}", column.name, width = *width));
    }
    lines.push(header);
    for (position, label) in STAT_LABELS.iter().enumerate() {
        let mut line = format!("{:<width$}", label, width = label_width);
        for (values, width) in cells.iter().zip(&widths) {
            line.push_str(&format!("  {:>width$}", values[position], width = *width));
        }
        lines.push(line);
    }
    lines.join("\n")
}

fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let rank = q * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    sorted[lower] + (sorted[upper] - sorted[lower]) * (rank - lower as f64)
}

fn format_stat(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else {
        format!("{:.6}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_match_hand_computed_values() {
        let stats = ColumnStats::from_values("t", &[4.0, 1.0, 3.0, 2.0]);
        assert_eq!(stats.count, 4);
        assert_eq!(stats.mean, 2.5);
        assert!((stats.std - 1.290_994_448_7).abs() < 1e-9);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.q25, 1.75);
        assert_eq!(stats.q50, 2.5);
        assert_eq!(stats.q75, 3.25);
        assert_eq!(stats.max, 4.0);
    }

    #[test]
    fn single_value_has_undefined_std() {
        let stats = ColumnStats::from_values("t", &[7.0]);
        assert!(stats.std.is_nan());
        assert_eq!(stats.q75, 7.0);
    }

    #[test]
    fn describe_uses_only_selected_rows() {
        let table = SensorTable::from_csv_bytes(b"a,b,label\n1,10,x\n2,20,y\n100,30,z\n").expect("table");
        let stats = describe(&table, &table.numeric_columns(), &[0, 2]);
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].name, "a");
        assert_eq!(stats[0].mean, 50.5);
        assert_eq!(stats[1].max, 30.0);
    }

    #[test]
    fn rendered_table_lists_every_statistic() {
        let stats = vec![ColumnStats::from_values("temperature", &[1.0, 3.0])];
        let text = render_describe(&stats);
        let lines = text.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 9);
        assert!(lines[0].trim_end().ends_with("temperature"));
        assert!(lines[1].starts_with("count"));
        assert!(lines[1].ends_with("2.000000"));
        assert!(lines[8].starts_with("max"));
        assert!(lines[8].ends_with("3.000000"));
    }
}
