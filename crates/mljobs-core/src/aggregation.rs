use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::dates::{from_epoch_days, month_label};
use crate::error::Result;
use crate::ingestion::JobPostings;
use crate::schema::{COMPANY_NAME, COUNT, JOB_TITLE, MONTH_POSTED, REGION, SENIORITY_LEVEL, SENIOR_MARKERS};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelCount {
    pub label: String,
    pub count: usize,
}

impl LabelCount {
    pub fn new(label: impl Into<String>, count: usize) -> Self {
        Self {
            label: label.into(),
            count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionTitleCount {
    pub region: String,
    pub title: String,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthCount {
    /// First day of the month.
    pub month: NaiveDate,
    pub count: usize,
}

impl MonthCount {
    pub fn label(&self) -> String {
        month_label(self.month)
    }
}

/// Sizes of the top-N selections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopNLimits {
    pub top_companies: usize,
    pub titles_per_region: usize,
    pub top_senior_companies: usize,
}

impl Default for TopNLimits {
    fn default() -> Self {
        Self {
            top_companies: 10,
            titles_per_region: 5,
            top_senior_companies: 10,
        }
    }
}

/// The five views rendered by the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Aggregates {
    pub top_companies: Vec<LabelCount>,
    pub titles_by_region: Vec<RegionTitleCount>,
    pub seniority: Vec<LabelCount>,
    pub postings_over_time: Vec<MonthCount>,
    pub senior_companies: Vec<LabelCount>,
}

pub fn compute_aggregates(table: &JobPostings, limits: &TopNLimits) -> Result<Aggregates> {
    Ok(Aggregates {
        top_companies: top_companies(table, limits.top_companies)?,
        titles_by_region: top_titles_by_region(table, limits.titles_per_region)?,
        seniority: seniority_distribution(table)?,
        postings_over_time: postings_over_time(table)?,
        senior_companies: top_senior_companies(table, limits.top_senior_companies)?,
    })
}

/// Companies with the most postings, highest first. Ties resolve by name.
pub fn top_companies(table: &JobPostings, n: usize) -> Result<Vec<LabelCount>> {
    let df = count_by(table.df().clone().lazy(), COMPANY_NAME)
        .limit(row_limit(n))
        .collect()?;
    label_counts(&df, COMPANY_NAME)
}

/// Up to `n` most common titles inside each region. Regions come out in ascending
/// order; rows without a region are skipped.
pub fn top_titles_by_region(table: &JobPostings, n: usize) -> Result<Vec<RegionTitleCount>> {
    let df = table
        .df()
        .clone()
        .lazy()
        .filter(col(REGION).is_not_null().and(col(JOB_TITLE).is_not_null()))
        .group_by([col(REGION), col(JOB_TITLE)])
        .agg([len().cast(DataType::Int64).alias(COUNT)])
        .sort(
            [REGION, COUNT, JOB_TITLE],
            SortMultipleOptions::default().with_order_descending_multi([false, true, false]),
        )
        .collect()?;

    let regions = df.column(REGION)?.str()?;
    let titles = df.column(JOB_TITLE)?.str()?;
    let counts = df.column(COUNT)?.i64()?;

    let mut rows: Vec<RegionTitleCount> = Vec::new();
    let mut kept_in_region = 0usize;

    for idx in 0..df.height() {
        let (Some(region), Some(title), Some(count)) =
            (regions.get(idx), titles.get(idx), counts.get(idx))
        else {
            continue;
        };

        let same_region = rows.last().is_some_and(|last| last.region == region);
        if !same_region {
            kept_in_region = 0;
        }
        if kept_in_region >= n {
            continue;
        }

        kept_in_region += 1;
        rows.push(RegionTitleCount {
            region: region.to_string(),
            title: title.to_string(),
            count: count as usize,
        });
    }

    Ok(rows)
}

/// Postings per seniority level, most common first.
pub fn seniority_distribution(table: &JobPostings) -> Result<Vec<LabelCount>> {
    let df = count_by(table.df().clone().lazy(), SENIORITY_LEVEL).collect()?;
    label_counts(&df, SENIORITY_LEVEL)
}

/// Postings per month in ascending month order. Months without postings are not
/// emitted and undated rows are skipped.
pub fn postings_over_time(table: &JobPostings) -> Result<Vec<MonthCount>> {
    let df = table
        .df()
        .clone()
        .lazy()
        .filter(col(MONTH_POSTED).is_not_null())
        .group_by([col(MONTH_POSTED)])
        .agg([len().cast(DataType::Int64).alias(COUNT)])
        .sort([MONTH_POSTED], SortMultipleOptions::default())
        .collect()?;

    let months = df.column(MONTH_POSTED)?.cast(&DataType::Int32)?;
    let months = months.i32()?;
    let counts = df.column(COUNT)?.i64()?;

    Ok(months
        .into_iter()
        .zip(counts.into_iter())
        .filter_map(|(days, count)| {
            Some(MonthCount {
                month: from_epoch_days(days?)?,
                count: count? as usize,
            })
        })
        .collect())
}

/// Companies with the most senior, lead or director postings.
pub fn top_senior_companies(table: &JobPostings, n: usize) -> Result<Vec<LabelCount>> {
    let senior = table
        .df()
        .clone()
        .lazy()
        .filter(
            col(SENIORITY_LEVEL)
                .str()
                .contains(lit(senior_pattern()), true),
        );

    let df = count_by(senior, COMPANY_NAME)
        .limit(row_limit(n))
        .collect()?;
    label_counts(&df, COMPANY_NAME)
}

/// Saturates instead of truncating when `n` exceeds the polars index width.
fn row_limit(n: usize) -> IdxSize {
    IdxSize::try_from(n).unwrap_or(IdxSize::MAX)
}

fn senior_pattern() -> String {
    format!("(?i){}", SENIOR_MARKERS.join("|"))
}

/// Row count per non-null `key`, count descending then `key` ascending.
fn count_by(lf: LazyFrame, key: &str) -> LazyFrame {
    lf.filter(col(key).is_not_null())
        .group_by([col(key)])
        .agg([len().cast(DataType::Int64).alias(COUNT)])
        .sort(
            [COUNT, key],
            SortMultipleOptions::default().with_order_descending_multi([true, false]),
        )
}

fn label_counts(df: &DataFrame, key: &str) -> Result<Vec<LabelCount>> {
    let labels = df.column(key)?.str()?;
    let counts = df.column(COUNT)?.i64()?;

    Ok(labels
        .into_iter()
        .zip(counts.into_iter())
        .filter_map(|(label, count)| Some(LabelCount::new(label?, count? as usize)))
        .collect())
}
