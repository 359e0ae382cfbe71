// Sensor table entity
// The uploaded dataset: ordered named columns with a declared kind each

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_objects::{AnomalyLabel, ColumnKind};

pub const ANOMALY_COLUMN: &str = "anomaly";

const NA_MARKERS: &[&str] = &[
    "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "null", "NULL", "None", "#N/A", "<NA>",
];

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
    cells: Vec<Option<String>>,
    values: Vec<Option<f64>>,
}

impl Column {
    fn from_cells(name: String, cells: Vec<Option<String>>) -> Self {
        let parsed = cells
            .iter()
            .map(|cell| cell.as_deref().map(parse_reading))
            .collect::<Vec<_>>();
        let has_value = parsed.iter().any(Option::is_some);
        let all_numeric = parsed.iter().all(|value| !matches!(value, Some(None)));
        if has_value && all_numeric {
            Self {
                name,
                kind: ColumnKind::Numeric,
                cells,
                values: parsed.into_iter().map(Option::flatten).collect(),
            }
        } else {
            Self {
                name,
                kind: ColumnKind::Text,
                cells,
                values: Vec::new(),
            }
        }
    }

    pub fn cell(&self, row: usize) -> Option<&str> {
        self.cells.get(row).and_then(|cell| cell.as_deref())
    }

    pub fn value(&self, row: usize) -> Option<f64> {
        self.values.get(row).copied().flatten()
    }

    pub fn numeric_values(&self) -> &[Option<f64>] {
        &self.values
    }

    pub fn missing_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_none()).count()
    }
}

/// Column indices of the numeric part of a [`SensorTable`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumericSelection {
    pub indices: Vec<usize>,
    pub names: Vec<String>,
}

impl NumericSelection {
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }
}

/// Row-major snapshot of (part of) a table, as shown in the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableSnapshot {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SensorTable {
    columns: Vec<Column>,
    row_count: usize,
}

impl SensorTable {
    /// Parses an uploaded CSV body. The first record is the header row and every
    /// data row must carry the same number of fields.
    pub fn from_csv_bytes(bytes: &[u8]) -> Result<Self, DomainError> {
        let text = std::str::from_utf8(bytes)
            .map_err(|err| DomainError::MalformedCsv(format!("upload is not valid UTF-8: {}", err)))?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .from_reader(text.as_bytes());

        let headers = reader.headers()?.clone();
        if headers.is_empty() || headers.iter().all(|name| name.trim().is_empty()) {
            return Err(DomainError::MalformedCsv("no columns to parse".to_string()));
        }
        let names = dedupe_names(headers.iter());

        let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); names.len()];
        let mut row_count = 0;
        for record in reader.records() {
            let record = record?;
            for (index, field) in record.iter().enumerate() {
                cells[index].push(normalize_cell(field));
            }
            row_count += 1;
        }

        let columns = names
            .into_iter()
            .zip(cells)
            .map(|(name, cells)| Column::from_cells(name, cells))
            .collect();
        Ok(Self { columns, row_count })
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|column| column.name.clone()).collect()
    }

    pub fn missing_values(&self) -> usize {
        self.columns.iter().map(Column::missing_count).sum()
    }

    pub fn numeric_columns(&self) -> NumericSelection {
        let (indices, names) = self
            .columns
            .iter()
            .enumerate()
            .filter(|(_, column)| column.kind == ColumnKind::Numeric)
            .map(|(index, column)| (index, column.name.clone()))
            .unzip();
        NumericSelection { indices, names }
    }

    /// Row-major numeric matrix over the selected columns. Fails on the first
    /// column with a missing reading.
    pub fn numeric_matrix(&self, selection: &NumericSelection) -> Result<Vec<Vec<f64>>, DomainError> {
        let mut matrix = vec![Vec::with_capacity(selection.len()); self.row_count];
        for &index in &selection.indices {
            let column = &self.columns[index];
            for (row, value) in column.numeric_values().iter().enumerate() {
                match value {
                    Some(value) => matrix[row].push(*value),
                    None => {
                        return Err(DomainError::MissingReadings {
                            column: column.name.clone(),
                        })
                    }
                }
            }
        }
        Ok(matrix)
    }

    /// Adds the label column, replacing an uploaded column with the same name.
    pub fn apply_labels(&mut self, labels: &[AnomalyLabel]) -> Result<(), DomainError> {
        if labels.len() != self.row_count {
            return Err(DomainError::LabelMismatch {
                labels: labels.len(),
                rows: self.row_count,
            });
        }
        let cells = labels
            .iter()
            .map(|label| Some(label.csv_value().to_string()))
            .collect();
        let column = Column::from_cells(ANOMALY_COLUMN.to_string(), cells);
        match self.columns.iter().position(|existing| existing.name == ANOMALY_COLUMN) {
            Some(index) => self.columns[index] = column,
            None => self.columns.push(column),
        }
        Ok(())
    }

    pub fn head(&self, limit: usize) -> TableSnapshot {
        let rows = (0..self.row_count.min(limit)).collect::<Vec<_>>();
        self.snapshot(&rows)
    }

    pub fn snapshot(&self, rows: &[usize]) -> TableSnapshot {
        TableSnapshot {
            columns: self.column_names(),
            rows: rows
                .iter()
                .filter(|&&row| row < self.row_count)
                .map(|&row| {
                    self.columns
                        .iter()
                        .map(|column| column.cell(row).map(ToString::to_string))
                        .collect()
                })
                .collect(),
        }
    }

    /// Writes the table back out as CSV, header first, missing cells empty.
    pub fn to_csv_string(&self) -> Result<String, DomainError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .write_record(self.columns.iter().map(|column| column.name.as_str()))
            .map_err(|err| DomainError::CsvWrite(err.to_string()))?;
        for row in 0..self.row_count {
            writer
                .write_record(
                    self.columns
                        .iter()
                        .map(|column| column.cell(row).unwrap_or_default()),
                )
                .map_err(|err| DomainError::CsvWrite(err.to_string()))?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|err| DomainError::CsvWrite(err.to_string()))?;
        String::from_utf8(bytes).map_err(|err| DomainError::CsvWrite(err.to_string()))
    }
}

fn parse_reading(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|value| value.is_finite())
}

fn normalize_cell(field: &str) -> Option<String> {
    let trimmed = field.trim();
    if trimmed.is_empty() || NA_MARKERS.contains(&trimmed) {
        None
    } else {
        Some(field.to_string())
    }
}

fn dedupe_names<'a>(headers: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for header in headers {
        let mut candidate = header.to_string();
        let mut suffix = 1;
        while names.contains(&candidate) {
            candidate = format!("{}.{}", header, suffix);
            suffix += 1;
        }
        names.push(candidate);
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    const READINGS: &str = "timestamp,temperature,pressure,status\n\
2024-01-01T00:00,21.5,101.2,ok\n\
2024-01-01T00:01,21.7,,ok\n\
2024-01-01T00:02,22.0,101.0,NA\n";

    #[test]
    fn parse_classifies_column_kinds() {
        let table = SensorTable::from_csv_bytes(READINGS.as_bytes()).expect("table");
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.column_count(), 4);
        let kinds = table.columns().iter().map(|c| c.kind).collect::<Vec<_>>();
        assert_eq!(
            kinds,
            vec![ColumnKind::Text, ColumnKind::Numeric, ColumnKind::Numeric, ColumnKind::Text]
        );
        assert_eq!(table.numeric_columns().names, vec!["temperature", "pressure"]);
    }

    #[test]
    fn missing_values_counts_empty_and_na_cells() {
        let table = SensorTable::from_csv_bytes(READINGS.as_bytes()).expect("table");
        assert_eq!(table.missing_values(), 2);
    }

    #[test]
    fn all_missing_column_is_text() {
        let table = SensorTable::from_csv_bytes(b"a,b\n1,\n2,\n").expect("table");
        assert_eq!(table.column("b").map(|c| c.kind), Some(ColumnKind::Text));
        assert_eq!(table.numeric_columns().names, vec!["a"]);
    }

    #[test]
    fn non_finite_readings_make_a_text_column() {
        let table = SensorTable::from_csv_bytes(b"a,b\n1,inf\n2,3\n").expect("table");
        assert_eq!(table.column("b").map(|c| c.kind), Some(ColumnKind::Text));
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let err = SensorTable::from_csv_bytes(b"a,b\n1,2\n3\n").expect_err("ragged");
        assert!(matches!(err, DomainError::MalformedCsv(_)));
    }

    #[test]
    fn empty_upload_is_rejected() {
        let err = SensorTable::from_csv_bytes(b"").expect_err("empty");
        assert!(matches!(err, DomainError::MalformedCsv(_)));
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        let err = SensorTable::from_csv_bytes(&[0x61, 0x0a, 0xff, 0xfe]).expect_err("utf8");
        assert!(err.to_string().contains("UTF-8"));
    }

    #[test]
    fn duplicate_headers_get_suffixes() {
        let table = SensorTable::from_csv_bytes(b"t,t,t\n1,2,3\n").expect("table");
        assert_eq!(table.column_names(), vec!["t", "t.1", "t.2"]);
    }

    #[test]
    fn numeric_matrix_reports_missing_column() {
        let table = SensorTable::from_csv_bytes(READINGS.as_bytes()).expect("table");
        let err = table
            .numeric_matrix(&table.numeric_columns())
            .expect_err("missing pressure");
        match err {
            DomainError::MissingReadings { column } => assert_eq!(column, "pressure"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn apply_labels_replaces_existing_label_column() {
        let mut table = SensorTable::from_csv_bytes(b"x,anomaly\n1,a\n2,b\n").expect("table");
        table
            .apply_labels(&[AnomalyLabel::Anomaly, AnomalyLabel::Normal])
            .expect("labels");
        assert_eq!(table.column_names(), vec!["x", "anomaly"]);
        let label = table.column(ANOMALY_COLUMN).expect("label column");
        assert_eq!(label.cell(0), Some("-1"));
        assert_eq!(label.cell(1), Some("1"));
    }

    #[test]
    fn apply_labels_rejects_wrong_length() {
        let mut table = SensorTable::from_csv_bytes(b"x\n1\n2\n").expect("table");
        let err = table.apply_labels(&[AnomalyLabel::Normal]).expect_err("mismatch");
        assert!(matches!(err, DomainError::LabelMismatch { labels: 1, rows: 2 }));
    }

    #[test]
    fn head_and_csv_output_keep_raw_cells() {
        let table = SensorTable::from_csv_bytes(READINGS.as_bytes()).expect("table");
        let head = table.head(2);
        assert_eq!(head.rows.len(), 2);
        assert_eq!(head.rows[1][2], None);
        let csv = table.to_csv_string().expect("csv");
        assert!(csv.starts_with("timestamp,temperature,pressure,status\n"));
        assert!(csv.contains("2024-01-01T00:01,21.7,,ok\n"));
    }
}
