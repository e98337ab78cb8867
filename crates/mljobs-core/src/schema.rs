pub const COMPANY_NAME: &str = "company_name";
pub const JOB_TITLE: &str = "job_title";
pub const SENIORITY_LEVEL: &str = "seniority_level";
pub const REGION: &str = "company_address_region";
pub const POSTED_DATE: &str = "job_posted_date";

/// Derived from `job_posted_date`; first day of the posting's month.
pub const MONTH_POSTED: &str = "month_posted";

/// Name given to group sizes in every aggregation frame.
pub const COUNT: &str = "count";

pub const REQUIRED_COLUMNS: [&str; 5] = [COMPANY_NAME, JOB_TITLE, SENIORITY_LEVEL, REGION, POSTED_DATE];

/// Rows missing any of these are removed during cleaning.
pub const NON_NULL_COLUMNS: [&str; 3] = [COMPANY_NAME, JOB_TITLE, SENIORITY_LEVEL];

/// Headers a leftover positional index column shows up under. The CSV reader names
/// an empty header after its position, hence `column_1`.
pub const INDEX_COLUMN_NAMES: [&str; 3] = ["", "column_1", "Unnamed: 0"];

/// Lowercase substrings that mark a seniority level as senior.
pub const SENIOR_MARKERS: [&str; 3] = ["senior", "lead", "director"];
