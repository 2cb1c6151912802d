use std::fmt::Write;

use chrono::{NaiveDate, NaiveDateTime};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Values that can be bound as parameters or read back from a result row.
///
/// The same enum is used by every backend so callers never touch driver types:
/// ```rust
/// use db_gateway::prelude::*;
///
/// let values = vec![
///     RowValues::Int(1),
///     RowValues::Text("alice".into()),
///     RowValues::Null,
/// ];
/// assert_eq!(values[0].to_text(), "1");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RowValues {
    /// Integer value (64-bit)
    Int(i64),
    /// Floating point value (64-bit)
    Float(f64),
    /// Text/string value
    Text(String),
    /// Boolean value
    Bool(bool),
    /// Timestamp value
    Timestamp(NaiveDateTime),
    /// NULL value
    Null,
    /// JSON value
    JSON(JsonValue),
    /// Binary data
    Blob(Vec<u8>),
}

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

impl RowValues {
    /// Check if this value is NULL
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_int(&self) -> Option<&i64> {
        if let RowValues::Int(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let RowValues::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            RowValues::Bool(value) => Some(*value),
            RowValues::Int(1) => Some(true),
            RowValues::Int(0) => Some(false),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            RowValues::Timestamp(value) => Some(*value),
            RowValues::Text(s) => parse_timestamp(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        if let RowValues::Float(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_blob(&self) -> Option<&[u8]> {
        if let RowValues::Blob(bytes) = self {
            Some(bytes)
        } else {
            None
        }
    }

    /// Render the value the way scalar queries report it.
    ///
    /// NULL renders as the empty string; blobs render as lowercase hex.
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            RowValues::Int(i) => i.to_string(),
            RowValues::Float(f) => f.to_string(),
            RowValues::Text(s) => s.clone(),
            RowValues::Bool(b) => b.to_string(),
            RowValues::Timestamp(dt) => dt.format(TIMESTAMP_FORMAT).to_string(),
            RowValues::Null => String::new(),
            RowValues::JSON(jsval) => jsval.to_string(),
            RowValues::Blob(bytes) => {
                let mut out = String::with_capacity(bytes.len() * 2);
                for b in bytes {
                    let _ = write!(out, "{b:02x}");
                }
                out
            }
        }
    }
}

fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    // "YYYY-MM-DD HH:MM:SS[.fff]" and the ISO "T" separator
    for fmt in [TIMESTAMP_FORMAT, "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// The database backends the gateway can talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseType {
    /// `SQLite` database
    #[cfg(feature = "sqlite")]
    Sqlite,
    /// SQL Server database
    #[cfg(feature = "mssql")]
    Mssql,
}

/// Declared type of a command parameter.
///
/// The tag decides how an input value is coerced before binding and, for SQL Server,
/// how the parameter is declared in the generated batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SqlType {
    BigInt,
    Int,
    SmallInt,
    TinyInt,
    Bit,
    Float,
    Real,
    Decimal,
    Money,
    #[default]
    NVarChar,
    VarChar,
    NChar,
    Char,
    NText,
    Text,
    Date,
    DateTime,
    DateTime2,
    VarBinary,
    Xml,
    UniqueIdentifier,
}

impl SqlType {
    /// T-SQL declaration for a variable of this type.
    ///
    /// `size` applies to the variable-length and fixed-length character and binary types;
    /// variable-length types without a size are declared `MAX`.
    #[must_use]
    pub fn declaration(self, size: Option<usize>) -> String {
        let var_len = |name: &str| match size {
            Some(n) => format!("{name}({n})"),
            None => format!("{name}(MAX)"),
        };
        match self {
            SqlType::BigInt => "BIGINT".into(),
            SqlType::Int => "INT".into(),
            SqlType::SmallInt => "SMALLINT".into(),
            SqlType::TinyInt => "TINYINT".into(),
            SqlType::Bit => "BIT".into(),
            SqlType::Float => "FLOAT".into(),
            SqlType::Real => "REAL".into(),
            SqlType::Decimal => "DECIMAL(38, 10)".into(),
            SqlType::Money => "MONEY".into(),
            SqlType::NVarChar => var_len("NVARCHAR"),
            SqlType::VarChar => var_len("VARCHAR"),
            SqlType::NChar => format!("NCHAR({})", size.unwrap_or(1)),
            SqlType::Char => format!("CHAR({})", size.unwrap_or(1)),
            SqlType::NText => "NTEXT".into(),
            SqlType::Text => "TEXT".into(),
            SqlType::Date => "DATE".into(),
            SqlType::DateTime => "DATETIME".into(),
            SqlType::DateTime2 => "DATETIME2".into(),
            SqlType::VarBinary => var_len("VARBINARY"),
            SqlType::Xml => "XML".into(),
            SqlType::UniqueIdentifier => "UNIQUEIDENTIFIER".into(),
        }
    }

    /// Coerce `value` to the storage class of this type.
    ///
    /// NULL is accepted by every type.
    ///
    /// # Errors
    ///
    /// Returns a description of the mismatch when the value cannot represent this type.
    pub fn coerce(self, value: &RowValues) -> Result<RowValues, String> {
        if value.is_null() {
            return Ok(RowValues::Null);
        }
        match self {
            SqlType::BigInt => coerce_int(value, i64::MIN, i64::MAX),
            SqlType::Int => coerce_int(value, i64::from(i32::MIN), i64::from(i32::MAX)),
            SqlType::SmallInt => coerce_int(value, i64::from(i16::MIN), i64::from(i16::MAX)),
            SqlType::TinyInt => coerce_int(value, 0, i64::from(u8::MAX)),
            SqlType::Bit => coerce_bit(value),
            SqlType::Float | SqlType::Real => coerce_float(value),
            SqlType::Decimal | SqlType::Money => coerce_decimal(value),
            SqlType::NVarChar
            | SqlType::VarChar
            | SqlType::NChar
            | SqlType::Char
            | SqlType::NText
            | SqlType::Text
            | SqlType::Xml
            | SqlType::UniqueIdentifier => match value {
                RowValues::Blob(_) => Err(format!("binary value cannot be bound as {self:?}")),
                other => Ok(RowValues::Text(other.to_text())),
            },
            SqlType::Date | SqlType::DateTime | SqlType::DateTime2 => value
                .as_timestamp()
                .map(RowValues::Timestamp)
                .ok_or_else(|| format!("{} is not a valid {self:?}", value.to_text())),
            SqlType::VarBinary => match value {
                RowValues::Blob(bytes) => Ok(RowValues::Blob(bytes.clone())),
                RowValues::Text(s) => Ok(RowValues::Blob(s.as_bytes().to_vec())),
                other => Err(format!("{other:?} cannot be bound as VarBinary")),
            },
        }
    }
}

// -2^63 and 2^63; every f64 in between converts to i64 without saturating
const I64_FLOAT_MIN: f64 = -9_223_372_036_854_775_808.0;
const I64_FLOAT_END: f64 = 9_223_372_036_854_775_808.0;

fn coerce_int(value: &RowValues, min: i64, max: i64) -> Result<RowValues, String> {
    let parsed = match value {
        RowValues::Int(i) => Some(*i),
        RowValues::Bool(b) => Some(i64::from(*b)),
        RowValues::Text(s) => s.trim().parse::<i64>().ok(),
        RowValues::Float(f) if f.fract() == 0.0 && f.is_finite() => {
            if !(I64_FLOAT_MIN..I64_FLOAT_END).contains(f) {
                return Err(format!("{f} is out of range [{min}, {max}]"));
            }
            #[allow(clippy::cast_possible_truncation)]
            Some(*f as i64)
        }
        _ => None,
    };
    match parsed {
        Some(i) if (min..=max).contains(&i) => Ok(RowValues::Int(i)),
        Some(i) => Err(format!("{i} is out of range [{min}, {max}]")),
        None => Err(format!("{} is not an integer", value.to_text())),
    }
}

fn coerce_bit(value: &RowValues) -> Result<RowValues, String> {
    match value {
        RowValues::Bool(b) => Ok(RowValues::Bool(*b)),
        RowValues::Int(i) => Ok(RowValues::Bool(*i != 0)),
        RowValues::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
            "1" | "true" => Ok(RowValues::Bool(true)),
            "0" | "false" => Ok(RowValues::Bool(false)),
            _ => Err(format!("{s} is not a bit value")),
        },
        other => Err(format!("{other:?} is not a bit value")),
    }
}

fn coerce_float(value: &RowValues) -> Result<RowValues, String> {
    match value {
        RowValues::Float(f) => Ok(RowValues::Float(*f)),
        #[allow(clippy::cast_precision_loss)]
        RowValues::Int(i) => Ok(RowValues::Float(*i as f64)),
        RowValues::Text(s) => s
            .trim()
            .parse::<f64>()
            .map(RowValues::Float)
            .map_err(|_| format!("{s} is not a number")),
        other => Err(format!("{other:?} is not a number")),
    }
}

/// Exact numerics keep their text so the server converts it without going through `f64`.
fn coerce_decimal(value: &RowValues) -> Result<RowValues, String> {
    match value {
        RowValues::Int(i) => Ok(RowValues::Int(*i)),
        RowValues::Float(f) if f.is_finite() => Ok(RowValues::Float(*f)),
        RowValues::Text(s) => {
            let trimmed = s.trim();
            if trimmed.parse::<f64>().is_ok_and(f64::is_finite) {
                Ok(RowValues::Text(trimmed.to_string()))
            } else {
                Err(format!("{s} is not a number"))
            }
        }
        other => Err(format!("{other:?} is not a number")),
    }
}
