use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PhenoclimError {
    #[error("Column '{column}' is missing from '{path}'")]
    MissingColumn { path: String, column: String },

    #[error("Date {0} appears more than once in the station table")]
    DuplicateDate(NaiveDate),

    #[error("At least {needed} values are needed for summary statistics, got {got}")]
    InsufficientSample { needed: usize, got: usize },

    #[error("Sample contains a non-finite value")]
    NonFiniteSample,

    #[error("Paired differences of '{0}' have zero variance")]
    ZeroVariance(String),

    #[error("Plot '{plot}' is not observed exactly once in each of {first_year} and {second_year}")]
    UnpairedPlot {
        plot: String,
        first_year: i32,
        second_year: i32,
    },

    #[error("Invalid observation for plot '{plot}' in {year}: {reason}")]
    InvalidObservation {
        plot: String,
        year: i32,
        reason: String,
    },

    #[error("Samples of unequal length: {0} and {1}")]
    LengthMismatch(usize, usize),

    #[error("Statistical distribution error: {0}")]
    Distribution(String),

    #[error("I/O error for file '{0}': {1}")]
    FileIO(String, #[source] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    JsonParsing(#[from] serde_json::Error),

    #[error("Failed to process CSV file '{0}': {1}")]
    CsvError(String, #[source] csv::Error),
}
