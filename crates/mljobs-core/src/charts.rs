use std::fs;
use std::path::{Path, PathBuf};

use plotters::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::aggregation::{Aggregates, LabelCount, MonthCount, RegionTitleCount};
use crate::error::{ReportError, Result};

pub const TOP_COMPANIES_FILE: &str = "top_companies.png";
pub const TITLES_BY_REGION_FILE: &str = "top_titles_by_region.png";
pub const SENIORITY_FILE: &str = "seniority_distribution.png";
pub const POSTINGS_OVER_TIME_FILE: &str = "postings_over_time.png";
pub const SENIOR_COMPANIES_FILE: &str = "top_senior_companies.png";

const FONT: &str = "sans-serif";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartStyle {
    pub width: u32,
    pub height: u32,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 800,
        }
    }
}

/// Locations of the five rendered charts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartPaths {
    pub top_companies: PathBuf,
    pub titles_by_region: PathBuf,
    pub seniority: PathBuf,
    pub postings_over_time: PathBuf,
    pub senior_companies: PathBuf,
}

impl ChartPaths {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            top_companies: dir.join(TOP_COMPANIES_FILE),
            titles_by_region: dir.join(TITLES_BY_REGION_FILE),
            seniority: dir.join(SENIORITY_FILE),
            postings_over_time: dir.join(POSTINGS_OVER_TIME_FILE),
            senior_companies: dir.join(SENIOR_COMPANIES_FILE),
        }
    }

    pub fn all(&self) -> [&Path; 5] {
        [
            &self.top_companies,
            &self.titles_by_region,
            &self.seniority,
            &self.postings_over_time,
            &self.senior_companies,
        ]
    }
}

/// Renders every aggregate into `output_dir`, creating the directory when needed.
/// Charts are written one after another; files already written stay on disk if a
/// later chart fails.
pub fn render_all(
    aggregates: &Aggregates,
    output_dir: &Path,
    style: &ChartStyle,
) -> Result<ChartPaths> {
    if !font_available() {
        return Err(ReportError::Chart(format!(
            "no usable '{FONT}' font found on this system"
        )));
    }

    fs::create_dir_all(output_dir)?;
    let paths = ChartPaths::in_dir(output_dir);

    render_bar_chart(
        &paths.top_companies,
        "Top Companies Hiring",
        "Company",
        &aggregates.top_companies,
        style,
    )?;
    render_grouped_bar_chart(
        &paths.titles_by_region,
        "Top Job Titles by Region",
        &aggregates.titles_by_region,
        style,
    )?;
    render_bar_chart(
        &paths.seniority,
        "Seniority Level Distribution",
        "Seniority level",
        &aggregates.seniority,
        style,
    )?;
    render_line_chart(
        &paths.postings_over_time,
        "Job Postings Over Time",
        &aggregates.postings_over_time,
        style,
    )?;
    render_bar_chart(
        &paths.senior_companies,
        "Top Companies Hiring Senior Roles",
        "Company",
        &aggregates.senior_companies,
        style,
    )?;

    Ok(paths)
}

/// Whether the chart font resolves on this host. Text drawing fails without it.
pub fn font_available() -> bool {
    (FONT, 12).into_font().layout_box("Postings").is_ok()
}

pub fn render_bar_chart(
    path: &Path,
    title: &str,
    x_desc: &str,
    rows: &[LabelCount],
    style: &ChartStyle,
) -> Result<()> {
    let root = BitMapBackend::new(path, (style.width, style.height)).into_drawing_area();
    root.fill(&WHITE)?;

    let labels: Vec<&str> = rows.iter().map(|row| row.label.as_str()).collect();
    let slots = labels.len().max(1) as u32;
    let y_max = y_upper_bound(rows.iter().map(|row| row.count));

    let mut chart = ChartBuilder::on(&root)
        .caption(title, (FONT, 28))
        .margin(20)
        .x_label_area_size(160)
        .y_label_area_size(60)
        .build_cartesian_2d((0u32..slots).into_segmented(), 0u32..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(slots as usize)
        .x_label_formatter(&|value| {
            segment_index(value)
                .and_then(|idx| labels.get(idx as usize))
                .map(|label| label.to_string())
                .unwrap_or_default()
        })
        .x_label_style(rotated_label_style())
        .x_desc(x_desc)
        .y_desc("Postings")
        .draw()?;

    chart.draw_series(
        Histogram::vertical(&chart)
            .style(BLUE.mix(0.8).filled())
            .margin(10)
            .data(
                rows.iter()
                    .enumerate()
                    .map(|(idx, row)| (idx as u32, row.count as u32)),
            ),
    )?;

    root.present()?;
    info!(path = %path.display(), bars = rows.len(), "chart written");
    Ok(())
}

/// One cluster per region, one colour per title. Rows must be grouped by region, as
/// `top_titles_by_region` emits them.
pub fn render_grouped_bar_chart(
    path: &Path,
    title: &str,
    rows: &[RegionTitleCount],
    style: &ChartStyle,
) -> Result<()> {
    let mut regions: Vec<&str> = Vec::new();
    let mut titles: Vec<&str> = Vec::new();
    let mut widest_cluster = 0usize;
    // (title index, slot within the region's cluster, region index, count)
    let mut bars: Vec<(usize, usize, usize, usize)> = Vec::with_capacity(rows.len());
    let mut position = 0usize;

    for row in rows {
        if regions.last() != Some(&row.region.as_str()) {
            regions.push(&row.region);
            position = 0;
        }
        let title_idx = match titles.iter().position(|t| *t == row.title) {
            Some(idx) => idx,
            None => {
                titles.push(&row.title);
                titles.len() - 1
            }
        };
        bars.push((title_idx, position, regions.len() - 1, row.count));
        position += 1;
        widest_cluster = widest_cluster.max(position);
    }

    // trailing empty slot separates neighbouring clusters
    let cluster = widest_cluster.max(1) as u32 + 1;
    let slots = regions.len().max(1) as u32 * cluster;
    let y_max = y_upper_bound(rows.iter().map(|row| row.count));

    let root = BitMapBackend::new(path, (style.width, style.height)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, (FONT, 28))
        .margin(20)
        .x_label_area_size(120)
        .y_label_area_size(60)
        .build_cartesian_2d((0u32..slots).into_segmented(), 0u32..y_max)?;

    let label_slot = (cluster - 1) / 2;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(slots as usize)
        .x_label_formatter(&|value| {
            segment_index(value)
                .filter(|idx| idx % cluster == label_slot)
                .and_then(|idx| regions.get((idx / cluster) as usize))
                .map(|region| region.to_string())
                .unwrap_or_default()
        })
        .x_label_style(rotated_label_style())
        .x_desc("Region")
        .y_desc("Postings")
        .draw()?;

    for (title_idx, job_title) in titles.iter().enumerate() {
        let color = Palette99::pick(title_idx).mix(0.9);
        let points = bars
            .iter()
            .filter(|(idx, ..)| *idx == title_idx)
            .map(|&(_, slot, region_idx, count)| {
                (region_idx as u32 * cluster + slot as u32, count as u32)
            });

        chart
            .draw_series(
                Histogram::vertical(&chart)
                    .style(color.filled())
                    .margin(2)
                    .data(points),
            )?
            .label(*job_title)
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
    }

    if !titles.is_empty() {
        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .position(SeriesLabelPosition::UpperRight)
            .label_font((FONT, 12))
            .draw()?;
    }

    root.present()?;
    info!(path = %path.display(), regions = regions.len(), titles = titles.len(), "chart written");
    Ok(())
}

pub fn render_line_chart(
    path: &Path,
    title: &str,
    rows: &[MonthCount],
    style: &ChartStyle,
) -> Result<()> {
    let root = BitMapBackend::new(path, (style.width, style.height)).into_drawing_area();
    root.fill(&WHITE)?;

    let labels: Vec<String> = rows.iter().map(MonthCount::label).collect();
    let points: Vec<(i32, u32)> = rows
        .iter()
        .enumerate()
        .map(|(idx, row)| (idx as i32, row.count as u32))
        .collect();
    let x_max = rows.len().max(1) as i32;
    let y_max = y_upper_bound(rows.iter().map(|row| row.count));

    let mut chart = ChartBuilder::on(&root)
        .caption(title, (FONT, 28))
        .margin(20)
        .x_label_area_size(100)
        .y_label_area_size(60)
        .build_cartesian_2d(-1i32..x_max, 0u32..y_max)?;

    chart
        .configure_mesh()
        .x_labels(labels.len() + 2)
        .x_label_formatter(&|x| {
            usize::try_from(*x)
                .ok()
                .and_then(|idx| labels.get(idx))
                .cloned()
                .unwrap_or_default()
        })
        .x_label_style(rotated_label_style())
        .x_desc("Month")
        .y_desc("Postings")
        .draw()?;

    chart.draw_series(LineSeries::new(points.iter().copied(), &BLUE))?;
    chart.draw_series(
        points
            .iter()
            .map(|&(x, y)| Circle::new((x, y), 4, BLUE.filled())),
    )?;

    root.present()?;
    info!(path = %path.display(), months = rows.len(), "chart written");
    Ok(())
}

fn segment_index(value: &SegmentValue<u32>) -> Option<u32> {
    match value {
        SegmentValue::Exact(idx) | SegmentValue::CenterOf(idx) => Some(*idx),
        SegmentValue::Last => None,
    }
}

fn y_upper_bound(counts: impl Iterator<Item = usize>) -> u32 {
    let max = counts.max().unwrap_or(0) as u32;
    max + max / 10 + 1
}

fn rotated_label_style() -> TextStyle<'static> {
    (FONT, 13)
        .into_font()
        .transform(FontTransform::Rotate90)
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chart_paths_use_fixed_file_names() {
        let paths = ChartPaths::in_dir(Path::new("out"));
        let names: Vec<String> = paths
            .all()
            .iter()
            .map(|path| path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            [
                "top_companies.png",
                "top_titles_by_region.png",
                "seniority_distribution.png",
                "postings_over_time.png",
                "top_senior_companies.png",
            ]
        );
    }

    #[test]
    fn y_axis_always_has_headroom() {
        assert_eq!(y_upper_bound(std::iter::empty()), 1);
        assert_eq!(y_upper_bound([3usize, 7].into_iter()), 8);
        assert_eq!(y_upper_bound([100usize].into_iter()), 111);
    }

    #[test]
    fn segment_values_map_to_indices() {
        assert_eq!(segment_index(&SegmentValue::CenterOf(3)), Some(3));
        assert_eq!(segment_index(&SegmentValue::Exact(0)), Some(0));
        assert_eq!(segment_index(&SegmentValue::Last), None);
    }
}
