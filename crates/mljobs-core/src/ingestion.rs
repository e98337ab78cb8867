use std::io::Cursor;
use std::path::Path;

use chrono::NaiveDate;
use polars::prelude::*;
use tracing::{debug, info};

use crate::dates::{month_start, parse_posting_date, to_epoch_days};
use crate::error::{ReportError, Result};
use crate::schema::{
    COMPANY_NAME, INDEX_COLUMN_NAMES, JOB_TITLE, MONTH_POSTED, NON_NULL_COLUMNS, POSTED_DATE,
    REGION, REQUIRED_COLUMNS, SENIORITY_LEVEL,
};

/// In-memory table of job postings.
///
/// Always carries the five required columns, with `job_posted_date` as a polars `Date`
/// and a derived `month_posted` `Date` holding the first day of the posting month.
#[derive(Debug, Clone)]
pub struct JobPostings {
    df: DataFrame,
}

impl JobPostings {
    pub fn df(&self) -> &DataFrame {
        &self.df
    }

    pub fn into_inner(self) -> DataFrame {
        self.df
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }

    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }
}

/// Loads and cleans the dataset at `path`.
pub fn load_job_postings(path: &Path) -> Result<JobPostings> {
    clean(load_raw(path)?)
}

/// Reads the CSV at `path` and prepares it (index column dropped, dates parsed,
/// `month_posted` derived) without removing any rows.
pub fn load_raw(path: &Path) -> Result<JobPostings> {
    prepare(read_csv_as_is(path)?)
}

/// Reads the CSV at `path` exactly as written: every column kept as text, nothing
/// dropped or derived.
pub fn read_csv_as_is(path: &Path) -> Result<DataFrame> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;

    info!(path = %path.display(), rows = df.height(), "read job postings");
    Ok(df)
}

/// Same as [`load_raw`] for CSV content already in memory.
pub fn read_raw_csv(content: &[u8]) -> Result<JobPostings> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .into_reader_with_file_handle(Cursor::new(content))
        .finish()?;

    prepare(df)
}

/// Drops rows missing a company, title or seniority level.
pub fn clean(table: JobPostings) -> Result<JobPostings> {
    let before = table.height();

    let predicate = NON_NULL_COLUMNS
        .iter()
        .map(|name| col(*name).is_not_null())
        .reduce(|acc, expr| acc.and(expr))
        .unwrap_or_else(|| lit(true));

    let df = table.df.lazy().filter(predicate).collect()?;

    info!(
        kept = df.height(),
        dropped = before - df.height(),
        "cleaned job postings"
    );
    Ok(JobPostings { df })
}

fn prepare(mut df: DataFrame) -> Result<JobPostings> {
    drop_index_column(&mut df)?;

    for name in REQUIRED_COLUMNS {
        if df.column(name).is_err() {
            return Err(ReportError::MissingColumn(name));
        }
    }

    for name in [COMPANY_NAME, JOB_TITLE, SENIORITY_LEVEL, REGION] {
        let text = df.column(name)?.cast(&DataType::String)?;
        df.with_column(text)?;
    }

    let raw_dates = df.column(POSTED_DATE)?.cast(&DataType::String)?;
    let parsed: Vec<Option<NaiveDate>> = raw_dates
        .str()?
        .into_iter()
        .map(|value| value.and_then(parse_posting_date))
        .collect();

    let unparsed = parsed.iter().filter(|date| date.is_none()).count();
    if unparsed > 0 {
        debug!(unparsed, "job_posted_date values left absent");
    }

    let posted_days: Vec<Option<i32>> = parsed
        .iter()
        .map(|date| date.map(to_epoch_days))
        .collect();
    let month_days: Vec<Option<i32>> = parsed
        .iter()
        .map(|date| date.map(|d| to_epoch_days(month_start(d))))
        .collect();

    let posted = Series::new(POSTED_DATE.into(), posted_days).cast(&DataType::Date)?;
    let month = Series::new(MONTH_POSTED.into(), month_days).cast(&DataType::Date)?;
    df.with_column(posted)?;
    df.with_column(month)?;

    Ok(JobPostings { df })
}

fn drop_index_column(df: &mut DataFrame) -> Result<()> {
    let first = df
        .get_column_names()
        .first()
        .map(|name| name.to_string());

    if let Some(name) = first {
        if INDEX_COLUMN_NAMES.contains(&name.as_str()) || name.starts_with("Unnamed:") {
            df.drop_in_place(&name)?;
            debug!(column = %name, "dropped positional index column");
        }
    }
    Ok(())
}
