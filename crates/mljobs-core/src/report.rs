use tracing::info;

use crate::aggregation::{compute_aggregates, Aggregates};
use crate::charts::{render_all, ChartPaths};
use crate::config::AppConfig;
use crate::error::Result;
use crate::ingestion::load_job_postings;

/// What a report run produced.
#[derive(Debug, Clone)]
pub struct ReportSummary {
    pub rows: usize,
    pub aggregates: Aggregates,
    pub charts: ChartPaths,
}

/// Load, clean, aggregate and render. Runs start to finish or stops at the first error.
pub fn run_report(config: &AppConfig) -> Result<ReportSummary> {
    let table = load_job_postings(&config.input_path)?;
    let aggregates = compute_aggregates(&table, &config.charts.limits())?;

    info!(
        companies = aggregates.top_companies.len(),
        regions_titles = aggregates.titles_by_region.len(),
        seniority_levels = aggregates.seniority.len(),
        months = aggregates.postings_over_time.len(),
        senior_companies = aggregates.senior_companies.len(),
        "aggregates computed"
    );

    let charts = render_all(&aggregates, &config.output_dir, &config.charts.style())?;

    Ok(ReportSummary {
        rows: table.height(),
        aggregates,
        charts,
    })
}
