use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use mljobs_core::aggregation::{
    compute_aggregates, postings_over_time, seniority_distribution, top_companies,
    top_senior_companies, top_titles_by_region, LabelCount, MonthCount, TopNLimits,
};
use mljobs_core::{load_job_postings, read_raw_csv, JobPostings};

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/data")
        .join(name)
}

fn sample() -> JobPostings {
    load_job_postings(&fixture_path("postings_sample.csv")).expect("load sample fixture")
}

fn pairs(rows: &[LabelCount]) -> Vec<(&str, usize)> {
    rows.iter()
        .map(|row| (row.label.as_str(), row.count))
        .collect()
}

#[test]
fn single_posting_scenario() -> Result<()> {
    let table = load_job_postings(&fixture_path("single_posting.csv"))?;
    let aggregates = compute_aggregates(&table, &TopNLimits::default())?;

    assert_eq!(pairs(&aggregates.top_companies), [("Acme", 1)]);
    assert_eq!(pairs(&aggregates.seniority), [("Senior", 1)]);
    assert_eq!(pairs(&aggregates.senior_companies), [("Acme", 1)]);

    let months: Vec<(String, usize)> = aggregates
        .postings_over_time
        .iter()
        .map(|row| (row.label(), row.count))
        .collect();
    assert_eq!(months, [("2023-05".to_string(), 1)]);

    assert_eq!(aggregates.titles_by_region.len(), 1);
    assert_eq!(aggregates.titles_by_region[0].region, "CA");
    assert_eq!(aggregates.titles_by_region[0].title, "ML Engineer");
    Ok(())
}

#[test]
fn top_companies_breaks_ties_by_name() -> Result<()> {
    let table = sample();

    assert_eq!(
        pairs(&top_companies(&table, 10)?),
        [
            ("Acme", 3),
            ("Beta Labs", 3),
            ("Cobalt AI", 2),
            ("Delta", 1),
            ("Epsilon", 1)
        ]
    );
    assert_eq!(
        pairs(&top_companies(&table, 2)?),
        [("Acme", 3), ("Beta Labs", 3)]
    );
    Ok(())
}

#[test]
fn top_n_selection_keeps_the_largest_counts() -> Result<()> {
    let table = sample();
    let everything = top_companies(&table, usize::MAX)?;

    for n in 0..=everything.len() + 1 {
        let top = top_companies(&table, n)?;
        assert!(top.len() <= n);
        assert_eq!(top.len(), n.min(everything.len()));

        let min_kept = top.iter().map(|row| row.count).min();
        let max_dropped = everything[top.len()..].iter().map(|row| row.count).max();
        if let (Some(kept), Some(dropped)) = (min_kept, max_dropped) {
            assert!(kept >= dropped, "n={n}: kept {kept} < dropped {dropped}");
        }
    }
    Ok(())
}

#[test]
fn limits_wider_than_the_index_keep_every_row() -> Result<()> {
    let table = load_job_postings(&fixture_path("single_posting.csv"))?;

    let Ok(huge) = usize::try_from(1u64 << 32) else {
        return Ok(());
    };
    assert_eq!(pairs(&top_companies(&table, huge)?), [("Acme", 1)]);
    assert_eq!(pairs(&top_senior_companies(&table, huge)?), [("Acme", 1)]);
    Ok(())
}

#[test]
fn dropped_rows_never_reach_aggregates() -> Result<()> {
    let table = sample();
    let aggregates = compute_aggregates(&table, &TopNLimits::default())?;

    // 13 raw rows, 3 of them missing a company, title or level
    let total: usize = aggregates.seniority.iter().map(|row| row.count).sum();
    assert_eq!(total, 10);
    assert!(aggregates
        .top_companies
        .iter()
        .all(|row| !row.label.is_empty()));
    assert!(aggregates
        .seniority
        .iter()
        .all(|row| !row.label.is_empty() && row.count > 0));
    Ok(())
}

#[test]
fn seniority_distribution_orders_by_count_then_label() -> Result<()> {
    let table = sample();

    assert_eq!(
        pairs(&seniority_distribution(&table)?),
        [
            ("Senior", 3),
            ("Entry level", 2),
            ("Associate", 1),
            ("Director", 1),
            ("Internship", 1),
            ("Lead", 1),
            ("Mid-Senior level", 1),
        ]
    );
    Ok(())
}

#[test]
fn senior_roles_match_case_insensitive_markers() -> Result<()> {
    let table = sample();

    // "Mid-Senior level", "Director" and "Lead" all qualify
    assert_eq!(
        pairs(&top_senior_companies(&table, 10)?),
        [
            ("Acme", 2),
            ("Beta Labs", 2),
            ("Cobalt AI", 1),
            ("Epsilon", 1)
        ]
    );

    let mixed_case = read_raw_csv(
        b"company_name,job_title,seniority_level,company_address_region,job_posted_date\n\
          Zeta,ML Engineer,team LEAD,CA,2024-01-01\n\
          Zeta,ML Engineer,junior,CA,2024-01-01\n",
    )?;
    let mixed_case = mljobs_core::clean(mixed_case)?;
    assert_eq!(pairs(&top_senior_companies(&mixed_case, 10)?), [("Zeta", 1)]);
    Ok(())
}

#[test]
fn postings_over_time_is_strictly_increasing_and_skips_undated_rows() -> Result<()> {
    let table = sample();
    let months = postings_over_time(&table)?;

    let ymd = |y, m| NaiveDate::from_ymd_opt(y, m, 1).unwrap();
    assert_eq!(
        months,
        [
            MonthCount { month: ymd(2023, 5), count: 3 },
            MonthCount { month: ymd(2023, 6), count: 2 },
            MonthCount { month: ymd(2023, 7), count: 2 },
            MonthCount { month: ymd(2023, 8), count: 2 },
        ]
    );
    assert!(months.windows(2).all(|pair| pair[0].month < pair[1].month));

    // one of the ten cleaned rows has an unparseable date
    let dated: usize = months.iter().map(|row| row.count).sum();
    assert_eq!(dated, table.height() - 1);
    Ok(())
}

#[test]
fn short_year_dates_land_in_the_right_month() -> Result<()> {
    let csv = "company_name,job_title,seniority_level,company_address_region,job_posted_date\n\
               Acme,ML Engineer,Senior,CA,5/1/23\n\
               Acme,ML Engineer,Senior,CA,23/5/1\n";
    let table = mljobs_core::clean(read_raw_csv(csv.as_bytes())?)?;
    let months: Vec<(String, usize)> = postings_over_time(&table)?
        .iter()
        .map(|row| (row.label(), row.count))
        .collect();

    assert_eq!(months, [("2023-05".to_string(), 1)]);
    Ok(())
}

#[test]
fn titles_by_region_caps_each_region() -> Result<()> {
    let table = sample();
    let rows = top_titles_by_region(&table, 5)?;

    let flat: Vec<(&str, &str, usize)> = rows
        .iter()
        .map(|row| (row.region.as_str(), row.title.as_str(), row.count))
        .collect();
    assert_eq!(
        flat,
        [
            ("CA", "ML Engineer", 3),
            ("CA", "Data Scientist", 1),
            ("NY", "ML Engineer", 1),
            ("NY", "Research Scientist", 1),
            ("TX", "Data Scientist", 1),
            ("TX", "ML Engineer", 1),
            ("WA", "Data Engineer", 1),
        ]
    );

    let capped = top_titles_by_region(&table, 1)?;
    let regions: Vec<&str> = capped.iter().map(|row| row.region.as_str()).collect();
    assert_eq!(regions, ["CA", "NY", "TX", "WA"]);
    assert_eq!(capped[0].title, "ML Engineer");
    assert_eq!(capped[2].title, "Data Scientist");
    Ok(())
}

#[test]
fn titles_by_region_counts_are_non_increasing_within_region() -> Result<()> {
    let mut csv = String::from(
        "company_name,job_title,seniority_level,company_address_region,job_posted_date\n",
    );
    // region R1 gets seven titles with counts 7..=1, region R2 gets two
    for (title_idx, repeats) in (1..=7).rev().enumerate() {
        for _ in 0..repeats {
            csv.push_str(&format!("Acme,Title {title_idx},Senior,R1,2024-02-01\n"));
        }
    }
    csv.push_str("Acme,Solo,Senior,R2,2024-02-01\nAcme,Other,Senior,R2,2024-02-01\n");

    let table = mljobs_core::clean(read_raw_csv(csv.as_bytes())?)?;
    let rows = top_titles_by_region(&table, 5)?;

    let mut per_region: HashMap<&str, Vec<usize>> = HashMap::new();
    for row in &rows {
        per_region.entry(&row.region).or_default().push(row.count);
    }

    assert_eq!(per_region["R1"], [7, 6, 5, 4, 3]);
    assert_eq!(per_region["R2"], [1, 1]);
    for counts in per_region.values() {
        assert!(counts.len() <= 5);
        assert!(counts.windows(2).all(|pair| pair[0] >= pair[1]));
    }
    Ok(())
}
