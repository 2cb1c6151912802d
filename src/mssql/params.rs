use tiberius::Query;

use super::batch::Batch;
use crate::types::RowValues;

/// Build a tiberius query from `batch`, binding its values to `@P1..@Pn` in order.
#[must_use]
pub fn bind_query_params<'a>(batch: &'a Batch<'a>) -> Query<'a> {
    let mut query = Query::new(batch.sql.as_str());

    // tiberius owns the bound data, so values are cloned in
    for value in batch.values.iter().copied() {
        match value {
            RowValues::Int(i) => query.bind(*i),
            RowValues::Float(f) => query.bind(*f),
            RowValues::Text(s) => query.bind(s.clone()),
            RowValues::Bool(b) => query.bind(*b),
            RowValues::Timestamp(dt) => query.bind(*dt),
            RowValues::Null => query.bind(Option::<String>::None),
            RowValues::JSON(jsval) => query.bind(jsval.to_string()),
            RowValues::Blob(bytes) => query.bind(bytes.clone()),
        }
    }

    query
}
