use crate::types::{RowValues, SqlType};

/// Capacity hint for output slots that do not declare a size.
pub const DEFAULT_OUTPUT_SIZE: usize = 11;

/// How a parameter moves data between the caller and the database.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamDirection {
    /// Value supplied by the caller.
    Input(RowValues),
    /// Value populated by the database. `size` is the capacity hint for variable-length types.
    Output { size: Option<usize> },
    /// Value supplied by the caller and overwritten by the database.
    InputOutput(RowValues),
}

/// One named, typed slot of a command.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub(crate) name: String,
    pub(crate) sql_type: SqlType,
    pub(crate) direction: ParamDirection,
}

impl Parameter {
    /// An input parameter. A leading `@` is added to `name` when missing.
    #[must_use]
    pub fn input(name: impl AsRef<str>, sql_type: SqlType, value: impl Into<RowValues>) -> Self {
        Self {
            name: normalize_name(name.as_ref()),
            sql_type,
            direction: ParamDirection::Input(value.into()),
        }
    }

    /// An output parameter using [`DEFAULT_OUTPUT_SIZE`] as its capacity hint.
    #[must_use]
    pub fn output(name: impl AsRef<str>, sql_type: SqlType) -> Self {
        Self {
            name: normalize_name(name.as_ref()),
            sql_type,
            direction: ParamDirection::Output { size: None },
        }
    }

    #[must_use]
    pub fn output_sized(name: impl AsRef<str>, sql_type: SqlType, size: usize) -> Self {
        Self {
            name: normalize_name(name.as_ref()),
            sql_type,
            direction: ParamDirection::Output { size: Some(size) },
        }
    }

    #[must_use]
    pub fn input_output(
        name: impl AsRef<str>,
        sql_type: SqlType,
        value: impl Into<RowValues>,
    ) -> Self {
        Self {
            name: normalize_name(name.as_ref()),
            sql_type,
            direction: ParamDirection::InputOutput(value.into()),
        }
    }

    /// A text input parameter carrying NULL.
    #[must_use]
    pub fn null(name: impl AsRef<str>) -> Self {
        Self::input(name, SqlType::NVarChar, RowValues::Null)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn sql_type(&self) -> SqlType {
        self.sql_type
    }

    #[must_use]
    pub fn direction(&self) -> &ParamDirection {
        &self.direction
    }

    /// The caller-supplied value, `None` for pure output slots.
    #[must_use]
    pub fn value(&self) -> Option<&RowValues> {
        match &self.direction {
            ParamDirection::Input(v) | ParamDirection::InputOutput(v) => Some(v),
            ParamDirection::Output { .. } => None,
        }
    }

    /// Whether the database writes this parameter back.
    #[must_use]
    pub fn is_output(&self) -> bool {
        !matches!(self.direction, ParamDirection::Input(_))
    }

    /// Capacity hint used when declaring the parameter.
    ///
    /// Output slots fall back to [`DEFAULT_OUTPUT_SIZE`]; inputs have no hint.
    #[must_use]
    pub fn size_hint(&self) -> Option<usize> {
        match self.direction {
            ParamDirection::Output { size } => Some(size.unwrap_or(DEFAULT_OUTPUT_SIZE)),
            _ => None,
        }
    }
}

/// Build a `(name, type, value)` input parameter from a tuple.
impl<N: AsRef<str>, V: Into<RowValues>> From<(N, SqlType, V)> for Parameter {
    fn from((name, sql_type, value): (N, SqlType, V)) -> Self {
        Parameter::input(name, sql_type, value)
    }
}

/// Lazily produce a NULL text input parameter for each name, in order.
///
/// ```rust
/// use db_gateway::prelude::*;
///
/// let params: Vec<Parameter> = null_parameters(["a", "b"]).collect();
/// assert_eq!(params.len(), 2);
/// assert_eq!(params[0].name(), "@a");
/// assert_eq!(params[1].value(), Some(&RowValues::Null));
/// ```
pub fn null_parameters<I>(names: I) -> impl Iterator<Item = Parameter>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    names.into_iter().map(Parameter::null)
}

fn normalize_name(name: &str) -> String {
    let name = name.trim();
    if name.starts_with('@') {
        name.to_string()
    } else {
        format!("@{name}")
    }
}

impl From<i64> for RowValues {
    fn from(value: i64) -> Self {
        RowValues::Int(value)
    }
}

impl From<i32> for RowValues {
    fn from(value: i32) -> Self {
        RowValues::Int(i64::from(value))
    }
}

impl From<f64> for RowValues {
    fn from(value: f64) -> Self {
        RowValues::Float(value)
    }
}

impl From<bool> for RowValues {
    fn from(value: bool) -> Self {
        RowValues::Bool(value)
    }
}

impl From<&str> for RowValues {
    fn from(value: &str) -> Self {
        RowValues::Text(value.to_string())
    }
}

impl From<String> for RowValues {
    fn from(value: String) -> Self {
        RowValues::Text(value)
    }
}

impl From<Vec<u8>> for RowValues {
    fn from(value: Vec<u8>) -> Self {
        RowValues::Blob(value)
    }
}

impl From<chrono::NaiveDateTime> for RowValues {
    fn from(value: chrono::NaiveDateTime) -> Self {
        RowValues::Timestamp(value)
    }
}

impl<T: Into<RowValues>> From<Option<T>> for RowValues {
    fn from(value: Option<T>) -> Self {
        value.map_or(RowValues::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_parameters_keep_order_and_type() {
        let params: Vec<Parameter> = null_parameters(["a", "@b"]).collect();
        assert_eq!(params.len(), 2);
        assert_eq!(params[0].name(), "@a");
        assert_eq!(params[1].name(), "@b");
        for p in &params {
            assert_eq!(p.sql_type(), SqlType::NVarChar);
            assert_eq!(p.direction(), &ParamDirection::Input(RowValues::Null));
            assert!(!p.is_output());
        }
    }

    #[test]
    fn output_size_defaults_to_hint() {
        assert_eq!(
            Parameter::output("o", SqlType::NVarChar).size_hint(),
            Some(DEFAULT_OUTPUT_SIZE)
        );
        assert_eq!(
            Parameter::output_sized("o", SqlType::NVarChar, 50).size_hint(),
            Some(50)
        );
        assert_eq!(Parameter::input("i", SqlType::Int, 1).size_hint(), None);
    }

    #[test]
    fn tuples_become_inputs() {
        let p: Parameter = ("@v", SqlType::NVarChar, "5").into();
        assert_eq!(p.value(), Some(&RowValues::Text("5".into())));
        let none: Option<i64> = None;
        let p: Parameter = ("n", SqlType::Int, none).into();
        assert_eq!(p.value(), Some(&RowValues::Null));
    }
}
