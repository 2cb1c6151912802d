use chrono::{NaiveDate, NaiveDateTime};
use futures_util::TryStreamExt;
use tiberius::numeric::Numeric;
use tiberius::{QueryItem, QueryStream, Row, Uuid};

use crate::error::DriverError;
use crate::results::ResultSet;
use crate::types::RowValues;

/// One result set of a batch: column names plus raw rows.
#[derive(Debug, Default)]
pub struct RawResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<RowValues>>,
}

impl RawResult {
    #[must_use]
    pub fn first_value(&self) -> Option<&RowValues> {
        self.rows.first().and_then(|row| row.first())
    }

    #[must_use]
    pub fn into_result_set(self) -> ResultSet {
        let mut result_set = ResultSet::new(self.columns);
        for row in self.rows {
            result_set.add_row_values(row);
        }
        result_set
    }
}

/// Drain a query stream into its result sets, in order.
///
/// Result sets are delimited by metadata tokens, so a set without rows still reports its
/// columns.
///
/// # Errors
///
/// Returns the tiberius error if the stream fails.
pub async fn collect_results(mut stream: QueryStream<'_>) -> Result<Vec<RawResult>, DriverError> {
    let mut results: Vec<RawResult> = Vec::new();
    while let Some(item) = stream.try_next().await? {
        match item {
            QueryItem::Metadata(meta) => results.push(RawResult {
                columns: meta.columns().iter().map(|c| c.name().to_string()).collect(),
                rows: Vec::new(),
            }),
            QueryItem::Row(row) => {
                if results.is_empty() {
                    results.push(RawResult::default());
                }
                let values = extract_row(&row);
                if let Some(last) = results.last_mut() {
                    last.rows.push(values);
                }
            }
        }
    }
    Ok(results)
}

fn extract_row(row: &Row) -> Vec<RowValues> {
    (0..row.len()).map(|idx| extract_value(row, idx)).collect()
}

/// Extract a value from a row at a specific index
///
/// `try_get` fails on a type mismatch, so each supported Rust type is tried in turn;
/// NULL of any type and unsupported types end as `RowValues::Null`.
fn extract_value(row: &Row, idx: usize) -> RowValues {
    macro_rules! try_as {
        ($ty:ty, $map:expr) => {
            if let Ok(Some(val)) = row.try_get::<$ty, _>(idx) {
                return $map(val);
            }
        };
    }

    try_as!(u8, |v| RowValues::Int(i64::from(v)));
    try_as!(i16, |v| RowValues::Int(i64::from(v)));
    try_as!(i32, |v| RowValues::Int(i64::from(v)));
    try_as!(i64, RowValues::Int);
    try_as!(f32, |v| RowValues::Float(f64::from(v)));
    try_as!(f64, RowValues::Float);
    try_as!(Numeric, |v: Numeric| RowValues::Float(f64::from(v)));
    try_as!(bool, RowValues::Bool);
    try_as!(&str, |v: &str| RowValues::Text(v.to_string()));
    try_as!(Uuid, |v: Uuid| RowValues::Text(v.to_string()));
    try_as!(NaiveDateTime, RowValues::Timestamp);
    try_as!(NaiveDate, |v: NaiveDate| {
        v.and_hms_opt(0, 0, 0)
            .map_or(RowValues::Null, RowValues::Timestamp)
    });
    try_as!(&[u8], |v: &[u8]| RowValues::Blob(v.to_vec()));

    RowValues::Null
}
