// crates/mljobs-core/src/validation.rs

use std::collections::HashSet;
use std::fmt;

use chrono::Datelike;
use comfy_table::Table;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::dates::from_epoch_days;
use crate::error::Result;
use crate::ingestion::JobPostings;
use crate::schema::{COMPANY_NAME, COUNT, POSTED_DATE, REGION, SENIORITY_LEVEL};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationThresholds {
    /// Row count must be strictly greater than this.
    pub min_rows: usize,
    /// Distinct company count must be strictly greater than this.
    pub min_unique_companies: usize,
    pub min_year: i32,
    pub max_year: i32,
}

impl Default for ValidationThresholds {
    fn default() -> Self {
        Self {
            min_rows: 900,
            min_unique_companies: 50,
            min_year: 2000,
            max_year: 2025,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckOutcome {
    pub name: &'static str,
    pub passed: bool,
    pub detail: String,
}

impl CheckOutcome {
    fn new(name: &'static str, passed: bool, detail: impl Into<String>) -> Self {
        Self {
            name,
            passed,
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub checks: Vec<CheckOutcome>,
}

impl ValidationReport {
    pub fn is_success(&self) -> bool {
        self.checks.iter().all(|check| check.passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &CheckOutcome> {
        self.checks.iter().filter(|check| !check.passed)
    }

    pub fn check(&self, name: &str) -> Option<&CheckOutcome> {
        self.checks.iter().find(|check| check.name == name)
    }

    pub fn to_table(&self) -> Table {
        let mut table = Table::new();
        table.set_header(vec!["check", "result", "detail"]);
        for check in &self.checks {
            let result = if check.passed { "ok" } else { "FAILED" };
            table.add_row(vec![check.name, result, check.detail.as_str()]);
        }
        table
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_table())
    }
}

/// Runs the dataset sanity checks. Expects a table that went through date parsing but
/// not through cleaning, so missing seniority levels are still visible.
pub fn validate_dataset(
    table: &JobPostings,
    thresholds: &ValidationThresholds,
) -> Result<ValidationReport> {
    let df = table.df();
    let rows = df.height();

    let mut checks = Vec::with_capacity(6);

    checks.push(CheckOutcome::new(
        "total_rows",
        rows > thresholds.min_rows,
        format!("{rows} rows (need more than {})", thresholds.min_rows),
    ));

    let companies = df.column(COMPANY_NAME)?.str()?;
    let unique = companies.into_iter().flatten().collect::<HashSet<_>>().len();
    checks.push(CheckOutcome::new(
        "unique_companies",
        unique > thresholds.min_unique_companies,
        format!(
            "{unique} distinct companies (need more than {})",
            thresholds.min_unique_companies
        ),
    ));

    checks.push(top_company_check(df)?);
    checks.push(region_distribution_check(df)?);

    let missing_seniority = df.column(SENIORITY_LEVEL)?.null_count();
    checks.push(CheckOutcome::new(
        "seniority_levels",
        missing_seniority < rows / 2,
        format!("{missing_seniority} of {rows} rows lack a seniority level"),
    ));

    checks.push(date_range_check(df, thresholds)?);

    let report = ValidationReport { checks };
    for failure in report.failures() {
        warn!(check = failure.name, detail = %failure.detail, "validation check failed");
    }
    Ok(report)
}

fn top_company_check(df: &DataFrame) -> Result<CheckOutcome> {
    let top = df
        .clone()
        .lazy()
        .filter(col(COMPANY_NAME).is_not_null())
        .group_by([col(COMPANY_NAME)])
        .agg([len().alias(COUNT)])
        .sort(
            [COUNT, COMPANY_NAME],
            SortMultipleOptions::default().with_order_descending_multi([true, false]),
        )
        .limit(1)
        .collect()?;

    let name = top
        .column(COMPANY_NAME)?
        .str()?
        .get(0)
        .map(|value| value.to_string());

    Ok(match name {
        Some(name) if !name.trim().is_empty() => {
            CheckOutcome::new("top_company", true, format!("most frequent company is '{name}'"))
        }
        Some(_) => CheckOutcome::new("top_company", false, "most frequent company is blank"),
        None => CheckOutcome::new("top_company", false, "no company names present"),
    })
}

fn region_distribution_check(df: &DataFrame) -> Result<CheckOutcome> {
    let counts = df
        .clone()
        .lazy()
        .filter(col(REGION).is_not_null())
        .group_by([col(REGION)])
        .agg([len().cast(DataType::Int64).alias(COUNT)])
        .collect()?;

    let values = counts.column(COUNT)?.i64()?;
    let all_counts = values.null_count() == 0 && values.into_iter().flatten().all(|n| n >= 0);

    Ok(CheckOutcome::new(
        "region_distribution",
        all_counts,
        format!("{} regions counted", counts.height()),
    ))
}

fn date_range_check(df: &DataFrame, thresholds: &ValidationThresholds) -> Result<CheckOutcome> {
    let days = df.column(POSTED_DATE)?.cast(&DataType::Int32)?;
    let days = days.i32()?;

    let (Some(min), Some(max)) = (
        days.min().and_then(from_epoch_days),
        days.max().and_then(from_epoch_days),
    ) else {
        return Ok(CheckOutcome::new(
            "posting_date_range",
            true,
            "no parsed posting dates",
        ));
    };

    let passed = min.year() >= thresholds.min_year && max.year() <= thresholds.max_year;
    Ok(CheckOutcome::new(
        "posting_date_range",
        passed,
        format!(
            "dates span {min} to {max} (allowed years {}-{})",
            thresholds.min_year, thresholds.max_year
        ),
    ))
}
