pub mod aggregation;
pub mod charts;
pub mod config;
pub mod dates;
pub mod error;
pub mod ingestion;
pub mod report;
pub mod schema;
pub mod summary;
pub mod validation;

pub use error::{ReportError, Result};
pub use ingestion::{
    clean, load_job_postings, load_raw, read_csv_as_is, read_raw_csv, JobPostings,
};
