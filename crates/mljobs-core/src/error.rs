// crates/mljobs-core/src/error.rs

use plotters::drawing::DrawingAreaErrorKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars operation failed: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("required column '{0}' is missing from the dataset")]
    MissingColumn(&'static str),

    #[error("Chart rendering failed: {0}")]
    Chart(String),

    #[error("Config file could not be parsed: {0}")]
    Config(#[from] toml::de::Error),
}

impl<E> From<DrawingAreaErrorKind<E>> for ReportError
where
    E: std::error::Error + Send + Sync,
{
    fn from(err: DrawingAreaErrorKind<E>) -> Self {
        ReportError::Chart(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;
