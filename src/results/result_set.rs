use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Value as JsonValue};

use super::row::DataRow;
use crate::types::RowValues;

/// The table produced by a fill: dynamically discovered columns plus the matching rows.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    columns: Arc<Vec<String>>,
    index: Arc<HashMap<String, usize>>,
    rows: Vec<DataRow>,
}

impl ResultSet {
    /// Create an empty table with the given column names.
    #[must_use]
    pub fn new(column_names: Vec<String>) -> Self {
        // First occurrence wins for duplicated column names
        let mut index = HashMap::with_capacity(column_names.len());
        for (i, name) in column_names.iter().enumerate() {
            index.entry(name.clone()).or_insert(i);
        }
        Self {
            columns: Arc::new(column_names),
            index: Arc::new(index),
            rows: Vec::new(),
        }
    }

    /// Append a row. Missing trailing values are padded with NULL and extra values dropped,
    /// so every row matches the column count.
    pub fn add_row_values(&mut self, mut values: Vec<RowValues>) {
        values.resize(self.columns.len(), RowValues::Null);
        self.rows.push(DataRow {
            columns: Arc::clone(&self.columns),
            index: Arc::clone(&self.index),
            values,
        });
    }

    #[must_use]
    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn rows(&self) -> &[DataRow] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render the table as a JSON array of objects keyed by column name.
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let mut obj = Map::with_capacity(self.columns.len());
                for (name, value) in self.columns.iter().zip(&row.values) {
                    obj.insert(
                        name.clone(),
                        serde_json::to_value(value).unwrap_or(JsonValue::Null),
                    );
                }
                JsonValue::Object(obj)
            })
            .collect();
        JsonValue::Array(rows)
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a DataRow;
    type IntoIter = std::slice::Iter<'a, DataRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> ResultSet {
        let mut rs = ResultSet::new(vec!["id".into(), "Name".into()]);
        rs.add_row_values(vec![RowValues::Int(1), RowValues::Text("a".into())]);
        rs.add_row_values(vec![RowValues::Int(2)]);
        rs
    }

    #[test]
    fn rows_are_padded_and_addressable() {
        let rs = sample();
        assert_eq!(rs.len(), 2);
        assert_eq!(rs.column_count(), 2);
        assert_eq!(rs.rows()[0].get("Name"), Some(&RowValues::Text("a".into())));
        assert_eq!(rs.rows()[0].get("name"), Some(&RowValues::Text("a".into())));
        assert_eq!(rs.rows()[1].get_by_index(1), Some(&RowValues::Null));
        assert_eq!(rs.rows()[1].get("missing"), None);
    }

    #[test]
    fn renders_json() {
        assert_eq!(
            sample().to_json(),
            json!([{"id": 1, "Name": "a"}, {"id": 2, "Name": null}])
        );
    }
}
