use std::fmt;

use comfy_table::Table;
use polars::prelude::DataFrame;

/// Shape, columns, leading rows and absent-value counts of a table as read from disk.
#[derive(Debug, Clone)]
pub struct DatasetSummary {
    pub rows: usize,
    pub columns: usize,
    pub column_names: Vec<String>,
    pub null_counts: Vec<(String, usize)>,
    pub head: DataFrame,
}

pub fn summarize(df: &DataFrame, head_rows: usize) -> DatasetSummary {
    let (rows, columns) = df.shape();

    let column_names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();

    let null_counts = df
        .get_columns()
        .iter()
        .map(|column| (column.name().to_string(), column.null_count()))
        .collect();

    DatasetSummary {
        rows,
        columns,
        column_names,
        null_counts,
        head: df.head(Some(head_rows)),
    }
}

impl DatasetSummary {
    pub fn null_count_table(&self) -> Table {
        let mut table = Table::new();
        table.set_header(vec!["column", "missing"]);
        for (name, count) in &self.null_counts {
            table.add_row(vec![name.clone(), count.to_string()]);
        }
        table
    }
}

impl fmt::Display for DatasetSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Shape: ({}, {})", self.rows, self.columns)?;
        writeln!(f, "{}", self.head)?;
        writeln!(f, "Columns: {:?}", self.column_names)?;
        write!(f, "{}", self.null_count_table())
    }
}
