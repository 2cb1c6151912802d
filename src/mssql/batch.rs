use std::fmt::Write;

use crate::command::Command;
use crate::params::ParamDirection;
use crate::types::RowValues;

/// Whether the generated batch reads output parameters back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchMode {
    /// Output values are discarded.
    Execute,
    /// Output values are selected in a trailing result set.
    ReadOutputs,
}

/// A T-SQL batch plus the values bound to its positional `@P1..@Pn` placeholders.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch<'a> {
    pub sql: String,
    pub values: Vec<&'a RowValues>,
    /// Output parameter names, in the column order of the trailing result set.
    pub outputs: Vec<&'a str>,
}

impl Batch<'_> {
    /// Whether the last result set of the batch holds output values.
    #[must_use]
    pub fn selects_outputs(&self) -> bool {
        !self.outputs.is_empty()
    }
}

/// Generate the batch that runs `command` with its named parameters.
///
/// tiberius only binds positional values, so each parameter becomes a local variable
/// declared with its `SqlType` and initialized from its positional value:
///
/// ```text
/// DECLARE @id INT = @P1;
/// DECLARE @total NVARCHAR(11);
/// EXEC dbo.OrderTotal @id = @id, @total = @total OUTPUT;
/// SELECT @total AS [@total];
/// ```
#[must_use]
pub fn build_batch(command: &Command, mode: BatchMode) -> Batch<'_> {
    let mut sql = String::new();
    let mut values = Vec::new();
    let mut outputs = Vec::new();

    for param in command.parameters() {
        let decl = param.sql_type().declaration(param.size_hint());
        match param.direction() {
            ParamDirection::Input(value) | ParamDirection::InputOutput(value) => {
                values.push(value);
                let _ = writeln!(sql, "DECLARE {} {decl} = @P{};", param.name(), values.len());
            }
            ParamDirection::Output { .. } => {
                let _ = writeln!(sql, "DECLARE {} {decl};", param.name());
            }
        }
        if param.is_output() {
            outputs.push(param.name());
        }
    }

    if command.is_stored_procedure() {
        let args: Vec<String> = command
            .parameters()
            .iter()
            .map(|p| {
                if p.is_output() {
                    format!("{0} = {0} OUTPUT", p.name())
                } else {
                    format!("{0} = {0}", p.name())
                }
            })
            .collect();
        if args.is_empty() {
            let _ = writeln!(sql, "EXEC {};", command.text());
        } else {
            let _ = writeln!(sql, "EXEC {} {};", command.text(), args.join(", "));
        }
    } else {
        let _ = writeln!(sql, "{}", command.text());
    }

    if mode == BatchMode::Execute {
        outputs.clear();
    }
    if !outputs.is_empty() {
        let columns: Vec<String> = outputs
            .iter()
            .map(|name| format!("{name} AS [{name}]"))
            .collect();
        let _ = writeln!(sql, "SELECT {};", columns.join(", "));
    }

    Batch {
        sql,
        values,
        outputs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandKind;
    use crate::params::Parameter;
    use crate::types::SqlType;

    #[test]
    fn procedure_with_output() {
        let cmd = Command::bind(
            "dbo.OrderTotal",
            CommandKind::StoredProcedure,
            [
                Parameter::input("id", SqlType::Int, 4),
                Parameter::output("total", SqlType::NVarChar),
            ],
        )
        .unwrap();
        let batch = build_batch(&cmd, BatchMode::ReadOutputs);
        assert_eq!(
            batch.sql,
            "DECLARE @id INT = @P1;\n\
             DECLARE @total NVARCHAR(11);\n\
             EXEC dbo.OrderTotal @id = @id, @total = @total OUTPUT;\n\
             SELECT @total AS [@total];\n"
        );
        assert_eq!(batch.values, vec![&RowValues::Int(4)]);
        assert_eq!(batch.outputs, vec!["@total"]);
        assert!(batch.selects_outputs());
    }

    #[test]
    fn ad_hoc_text_keeps_command_verbatim() {
        let cmd = Command::bind(
            "UPDATE T SET x=@v",
            CommandKind::Text,
            [Parameter::input("@v", SqlType::NVarChar, "5")],
        )
        .unwrap();
        let batch = build_batch(&cmd, BatchMode::Execute);
        assert_eq!(
            batch.sql,
            "DECLARE @v NVARCHAR(MAX) = @P1;\nUPDATE T SET x=@v\n"
        );
        assert!(!batch.selects_outputs());
    }

    #[test]
    fn execute_mode_drops_output_select() {
        let cmd = Command::bind(
            "dbo.Touch",
            CommandKind::StoredProcedure,
            [Parameter::input_output("n", SqlType::BigInt, 1)],
        )
        .unwrap();
        let batch = build_batch(&cmd, BatchMode::Execute);
        assert_eq!(
            batch.sql,
            "DECLARE @n BIGINT = @P1;\nEXEC dbo.Touch @n = @n OUTPUT;\n"
        );
        assert!(batch.outputs.is_empty());
    }

    #[test]
    fn procedure_without_parameters() {
        let cmd = Command::bind("dbo.Ping", CommandKind::StoredProcedure, []).unwrap();
        assert_eq!(build_batch(&cmd, BatchMode::Execute).sql, "EXEC dbo.Ping;\n");
    }
}
