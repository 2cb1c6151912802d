use std::collections::HashMap;
use std::sync::Arc;

use crate::types::RowValues;

/// A single row of a filled table.
///
/// Column names and the name-to-index map are shared with every other row of the same
/// [`ResultSet`](super::ResultSet).
#[derive(Debug, Clone)]
pub struct DataRow {
    pub(crate) columns: Arc<Vec<String>>,
    pub(crate) index: Arc<HashMap<String, usize>>,
    pub(crate) values: Vec<RowValues>,
}

impl DataRow {
    /// Get a value by column name.
    ///
    /// Exact matches win; otherwise the first column whose name matches ignoring ASCII case.
    #[must_use]
    pub fn get(&self, column_name: &str) -> Option<&RowValues> {
        let idx = self.index.get(column_name).copied().or_else(|| {
            self.columns
                .iter()
                .position(|col| col.eq_ignore_ascii_case(column_name))
        })?;
        self.values.get(idx)
    }

    /// Get a value by column position.
    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<&RowValues> {
        self.values.get(index)
    }

    #[must_use]
    pub fn values(&self) -> &[RowValues] {
        &self.values
    }

    #[must_use]
    pub fn column_names(&self) -> &[String] {
        &self.columns
    }
}
