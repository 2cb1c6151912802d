use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::GatewayError;
use crate::params::{ParamDirection, Parameter};

static PARAM_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^@[A-Za-z_][A-Za-z0-9_]*$").expect("parameter name pattern is valid")
});

// Positional names the SQL Server driver binds values to.
static RESERVED_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^@P[0-9]+$").expect("reserved name pattern is valid"));

/// Whether the command text is ad-hoc SQL or the name of a stored procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommandKind {
    #[default]
    Text,
    StoredProcedure,
}

impl From<bool> for CommandKind {
    /// `true` marks a stored procedure.
    fn from(is_stored_procedure: bool) -> Self {
        if is_stored_procedure {
            CommandKind::StoredProcedure
        } else {
            CommandKind::Text
        }
    }
}

/// A command with validated, type-coerced parameters, ready for a backend.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    text: String,
    kind: CommandKind,
    parameters: Vec<Parameter>,
}

impl Command {
    /// Validate parameter names and coerce every supplied value to its declared type.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::BindingError` naming the first offending parameter.
    pub fn bind<I>(text: &str, kind: CommandKind, parameters: I) -> Result<Self, GatewayError>
    where
        I: IntoIterator<Item = Parameter>,
    {
        let mut seen = HashSet::new();
        let mut bound = Vec::new();
        for mut param in parameters {
            if !PARAM_NAME.is_match(&param.name) {
                return Err(GatewayError::binding(
                    &param.name,
                    "names must be identifiers made of letters, digits and underscores",
                ));
            }
            if RESERVED_NAME.is_match(&param.name) {
                return Err(GatewayError::binding(
                    &param.name,
                    "names of the form @P<n> are reserved for positional binding",
                ));
            }
            if !seen.insert(param.name.to_ascii_lowercase()) {
                return Err(GatewayError::binding(&param.name, "duplicate parameter name"));
            }
            let sql_type = param.sql_type;
            match &mut param.direction {
                ParamDirection::Input(value) | ParamDirection::InputOutput(value) => {
                    *value = sql_type
                        .coerce(value)
                        .map_err(|reason| GatewayError::binding(&param.name, reason))?;
                }
                ParamDirection::Output { .. } => {}
            }
            bound.push(param);
        }

        Ok(Self {
            text: text.to_string(),
            kind,
            parameters: bound,
        })
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn kind(&self) -> CommandKind {
        self.kind
    }

    #[must_use]
    pub fn is_stored_procedure(&self) -> bool {
        self.kind == CommandKind::StoredProcedure
    }

    #[must_use]
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Parameters the database writes back, in declaration order.
    pub fn outputs(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.iter().filter(|p| p.is_output())
    }

    /// Reject every output-direction parameter.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::BindingError` for the first output parameter found.
    pub fn require_inputs_only(&self) -> Result<(), GatewayError> {
        match self.outputs().next() {
            Some(p) => Err(GatewayError::binding(
                &p.name,
                "output parameters are not supported when filling a table",
            )),
            None => Ok(()),
        }
    }

    /// The single output slot of a scalar query, if any.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::BindingError` when more than one output parameter is present,
    /// or when a stored procedure declares none.
    pub fn scalar_output(&self) -> Result<Option<&Parameter>, GatewayError> {
        let mut outputs = self.outputs();
        let first = outputs.next();
        if let Some(extra) = outputs.next() {
            return Err(GatewayError::binding(
                &extra.name,
                "a scalar query accepts at most one output parameter",
            ));
        }
        if first.is_none() && self.is_stored_procedure() {
            return Err(GatewayError::binding(
                &self.text,
                "a stored procedure scalar query needs one output parameter",
            ));
        }
        Ok(first)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RowValues, SqlType};

    #[test]
    fn bool_flag_maps_to_kind() {
        assert_eq!(CommandKind::from(true), CommandKind::StoredProcedure);
        assert_eq!(CommandKind::from(false), CommandKind::Text);
    }

    #[test]
    fn bind_coerces_values() {
        let cmd = Command::bind(
            "UPDATE t SET x = @x",
            CommandKind::Text,
            [Parameter::input("x", SqlType::Int, "7")],
        )
        .unwrap();
        assert_eq!(cmd.parameters()[0].value(), Some(&RowValues::Int(7)));
    }

    #[test]
    fn bind_rejects_bad_names() {
        for name in ["@", "@1abc", "@a-b", "@P1", "@p12"] {
            let err = Command::bind(
                "SELECT 1",
                CommandKind::Text,
                [Parameter::input(name, SqlType::Int, 1)],
            )
            .unwrap_err();
            assert!(
                matches!(err, GatewayError::BindingError { .. }),
                "{name} should be rejected"
            );
        }
    }

    #[test]
    fn bind_rejects_duplicates_case_insensitively() {
        let err = Command::bind(
            "SELECT @a",
            CommandKind::Text,
            [
                Parameter::input("a", SqlType::Int, 1),
                Parameter::input("A", SqlType::Int, 2),
            ],
        )
        .unwrap_err();
        match err {
            GatewayError::BindingError { name, .. } => assert_eq!(name, "@A"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn bind_reports_coercion_failure_with_name() {
        let err = Command::bind(
            "SELECT @n",
            CommandKind::Text,
            [Parameter::input("n", SqlType::Int, "abc")],
        )
        .unwrap_err();
        match err {
            GatewayError::BindingError { name, reason } => {
                assert_eq!(name, "@n");
                assert!(reason.contains("not an integer"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn scalar_output_rules() {
        let proc_without_output =
            Command::bind("dbo.GetCount", CommandKind::StoredProcedure, []).unwrap();
        assert!(proc_without_output.scalar_output().is_err());

        let text_without_output = Command::bind("SELECT 1", CommandKind::Text, []).unwrap();
        assert!(text_without_output.scalar_output().unwrap().is_none());

        let two_outputs = Command::bind(
            "dbo.Two",
            CommandKind::StoredProcedure,
            [
                Parameter::output("a", SqlType::Int),
                Parameter::input_output("b", SqlType::Int, 1),
            ],
        )
        .unwrap();
        assert!(two_outputs.scalar_output().is_err());
        assert!(two_outputs.require_inputs_only().is_err());
    }
}
