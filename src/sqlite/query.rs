use rusqlite::Statement;
use rusqlite::types::Value;

use crate::error::DriverError;
use crate::results::ResultSet;
use crate::types::RowValues;

/// Extract a `RowValues` from a `SQLite` row.
///
/// # Errors
///
/// Returns the rusqlite error if the column cannot be read.
pub fn sqlite_extract_value(row: &rusqlite::Row<'_>, idx: usize) -> Result<RowValues, DriverError> {
    let value: Value = row.get(idx)?;
    Ok(match value {
        Value::Null => RowValues::Null,
        Value::Integer(i) => RowValues::Int(i),
        Value::Real(f) => RowValues::Float(f),
        Value::Text(s) => RowValues::Text(s),
        Value::Blob(b) => RowValues::Blob(b),
    })
}

/// Step a bound statement once and return its first column, if any.
///
/// # Errors
///
/// Returns the rusqlite error if execution fails.
pub fn first_value(stmt: &mut Statement<'_>) -> Result<Option<RowValues>, DriverError> {
    let has_columns = stmt.column_count() > 0;
    let mut rows = stmt.raw_query();
    match rows.next()? {
        Some(row) if has_columns => Ok(Some(sqlite_extract_value(row, 0)?)),
        _ => Ok(None),
    }
}

/// Collect every row of a bound statement.
///
/// Column names come from the prepared statement, so they are known even when no row
/// matches.
///
/// # Errors
///
/// Returns the rusqlite error if execution or row extraction fails.
pub fn build_result_set(stmt: &mut Statement<'_>) -> Result<ResultSet, DriverError> {
    let column_names: Vec<String> = stmt
        .column_names()
        .iter()
        .map(std::string::ToString::to_string)
        .collect();
    let col_count = column_names.len();
    let mut result_set = ResultSet::new(column_names);

    let mut rows = stmt.raw_query();
    while let Some(row) = rows.next()? {
        let mut row_values = Vec::with_capacity(col_count);
        for i in 0..col_count {
            row_values.push(sqlite_extract_value(row, i)?);
        }
        result_set.add_row_values(row_values);
    }

    Ok(result_set)
}
