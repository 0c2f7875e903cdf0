//! Error taxonomy for the progress page.

use thiserror::Error;

pub type Result<T, E = ProgressError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ProgressError {
    #[error("unknown metric `{0}`")]
    UnknownMetric(String),

    #[error("unknown granularity `{0}` (expected Yearly or Monthly)")]
    UnknownGranularity(String),

    #[error("unknown chart type `{0}` (expected Bar or Line)")]
    UnknownChartType(String),

    #[error("invalid date `{value}`: {reason}")]
    InvalidDate { value: String, reason: String },

    #[error("couldn't read activity data: {0}")]
    Io(#[from] std::io::Error),

    #[error("couldn't decode activity data: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("browser storage unavailable: {0}")]
    Storage(String),

    #[error("invalid settings: {0}")]
    Settings(String),

    #[error("access code rejected")]
    InvalidAccessCode,
}

impl ProgressError {
    /// Configuration errors come from bad query parameters rather than the data source.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::UnknownMetric(_)
                | Self::UnknownGranularity(_)
                | Self::UnknownChartType(_)
                | Self::InvalidDate { .. }
        )
    }
}
