use rusqlite::Statement;
use rusqlite::types::Value;

use crate::command::Command;
use crate::error::DriverError;
use crate::types::RowValues;

/// Convert a single `RowValues` to a rusqlite `Value`.
#[must_use]
pub fn row_value_to_sqlite_value(value: &RowValues) -> Value {
    match value {
        RowValues::Int(i) => Value::Integer(*i),
        RowValues::Float(f) => Value::Real(*f),
        RowValues::Text(s) => Value::Text(s.clone()),
        RowValues::Bool(b) => Value::Integer(i64::from(*b)),
        RowValues::Timestamp(dt) => Value::Text(dt.format("%F %T%.f").to_string()),
        RowValues::Null => Value::Null,
        RowValues::JSON(jval) => Value::Text(jval.to_string()),
        RowValues::Blob(bytes) => Value::Blob(bytes.clone()),
    }
}

/// Bind every parameter of `command` to `stmt` by name.
///
/// A gateway name `@v` also matches `:v` and `$v` placeholders.
///
/// # Errors
///
/// Returns `DriverError::Binding` for output parameters and for names the statement does
/// not use, or the rusqlite error if binding fails.
pub fn bind_parameters(stmt: &mut Statement<'_>, command: &Command) -> Result<(), DriverError> {
    for param in command.parameters() {
        let Some(value) = param.value().filter(|_| !param.is_output()) else {
            return Err(DriverError::Binding {
                name: param.name().to_string(),
                reason: "SQLite does not support output parameters".to_string(),
            });
        };

        let Some(index) = placeholder_index(stmt, param.name())? else {
            return Err(DriverError::Binding {
                name: param.name().to_string(),
                reason: "the statement has no placeholder with this name".to_string(),
            });
        };
        stmt.raw_bind_parameter(index, row_value_to_sqlite_value(value))?;
    }
    Ok(())
}

fn placeholder_index(stmt: &Statement<'_>, name: &str) -> Result<Option<usize>, DriverError> {
    if let Some(idx) = stmt.parameter_index(name)? {
        return Ok(Some(idx));
    }
    let bare = name.trim_start_matches('@');
    for prefix in [':', '$'] {
        if let Some(idx) = stmt.parameter_index(&format!("{prefix}{bare}"))? {
            return Ok(Some(idx));
        }
    }
    Ok(None)
}
