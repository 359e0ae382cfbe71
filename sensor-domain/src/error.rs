use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("malformed csv: {0}")]
    MalformedCsv(String),
    #[error("numeric column '{column}' has missing readings")]
    MissingReadings { column: String },
    #[error("label count {labels} does not match row count {rows}")]
    LabelMismatch { labels: usize, rows: usize },
    #[error("failed to write csv: {0}")]
    CsvWrite(String),
}

impl From<csv::Error> for DomainError {
    fn from(value: csv::Error) -> Self {
        DomainError::MalformedCsv(value.to_string())
    }
}
