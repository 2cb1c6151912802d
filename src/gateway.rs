use std::sync::Arc;

use crate::command::{Command, CommandKind};
use crate::config::GatewayConfig;
use crate::connection::{ConnectionGuard, Connector};
use crate::error::{DriverError, GatewayError};
use crate::params::Parameter;
use crate::results::ResultSet;
use crate::types::DatabaseType;

/// Runs parameterized commands, one connection per call.
///
/// ```rust,no_run
/// use db_gateway::prelude::*;
///
/// # fn main() -> Result<(), GatewayError> {
/// let gateway = Gateway::new(GatewayConfig::sqlite("app.db"))?;
/// gateway.execute_non_query(
///     "UPDATE settings SET value = @v WHERE key = @k",
///     false,
///     [
///         Parameter::input("@v", SqlType::NVarChar, "5"),
///         Parameter::input("@k", SqlType::NVarChar, "retries"),
///     ],
/// )?;
/// let count = gateway.execute_scalar_query("SELECT COUNT(*) FROM settings", false, [])?;
/// # let _ = count;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Gateway {
    connector: Arc<dyn Connector>,
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway").finish_non_exhaustive()
    }
}

impl Gateway {
    /// Build a gateway for the backend named by `config`.
    ///
    /// No connection is opened until the first command runs.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::ConfigError` if the configuration is invalid.
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        config.validate()?;
        let connector: Arc<dyn Connector> = match config.database_type {
            #[cfg(feature = "sqlite")]
            DatabaseType::Sqlite => Arc::new(crate::sqlite::SqliteConnector::new(
                config.connection_string,
            )),
            #[cfg(feature = "mssql")]
            DatabaseType::Mssql => Arc::new(crate::mssql::MssqlConnector::new(
                &config.connection_string,
            )?),
        };
        Ok(Self { connector })
    }

    /// Build a gateway around a caller-supplied connector.
    #[must_use]
    pub fn with_connector(connector: Arc<dyn Connector>) -> Self {
        Self { connector }
    }

    /// Execute a command that returns no rows and report the affected row count.
    ///
    /// Output parameters are bound but their values are discarded.
    ///
    /// # Errors
    ///
    /// * `BindingError` if a parameter is invalid; no connection is opened in that case.
    /// * `ConnectionError` if the connection cannot be opened.
    /// * `ExecutionError` carrying `command` if execution or closing fails.
    ///
    /// On SQLite, text without parameters may hold several statements.
    pub fn execute_non_query<K, I>(
        &self,
        command: &str,
        kind: K,
        parameters: I,
    ) -> Result<usize, GatewayError>
    where
        K: Into<CommandKind>,
        I: IntoIterator<Item = Parameter>,
    {
        let command = Command::bind(command, kind.into(), parameters)?;
        tracing::debug!(
            command = command.text(),
            params = command.parameters().len(),
            "executing non-query"
        );

        let mut guard = ConnectionGuard::open(self.connector.as_ref())?;
        let affected = guard
            .connection()
            .execute(&command)
            .map_err(|e| GatewayError::execution(command.text(), e))?;
        guard.close(command.text())?;
        Ok(affected)
    }

    /// Execute a command expected to produce one value and return it as text.
    ///
    /// For a stored procedure the value is the post-execution value of its single output
    /// parameter; for ad-hoc SQL it is the first column of the first row. SQL NULL is
    /// returned as an empty string.
    ///
    /// # Errors
    ///
    /// * `BindingError` if more than one output parameter is given, or a stored procedure
    ///   has none.
    /// * `ConnectionError` if the connection cannot be opened.
    /// * `ExecutionError` if execution fails or the command yields no value.
    pub fn execute_scalar_query<K, I>(
        &self,
        command: &str,
        kind: K,
        parameters: I,
    ) -> Result<String, GatewayError>
    where
        K: Into<CommandKind>,
        I: IntoIterator<Item = Parameter>,
    {
        let command = Command::bind(command, kind.into(), parameters)?;
        let output_name = command.scalar_output()?.map(|p| p.name().to_string());
        tracing::debug!(
            command = command.text(),
            params = command.parameters().len(),
            output = output_name.as_deref(),
            "executing scalar query"
        );

        let mut guard = ConnectionGuard::open(self.connector.as_ref())?;
        let outcome = guard
            .connection()
            .execute_scalar(&command)
            .map_err(|e| GatewayError::execution(command.text(), e))?;
        guard.close(command.text())?;

        let value = match (command.is_stored_procedure(), output_name) {
            (true, Some(name)) => outcome.output(&name).cloned().ok_or_else(|| {
                GatewayError::execution(
                    command.text(),
                    DriverError::Other(format!("output parameter {name} was not returned")),
                )
            })?,
            _ => outcome.scalar.ok_or_else(|| {
                GatewayError::execution(
                    command.text(),
                    DriverError::Other("the command returned no scalar result".to_string()),
                )
            })?,
        };
        Ok(value.to_text())
    }

    /// Run a SELECT and return its rows with the columns the query produced.
    ///
    /// # Errors
    ///
    /// * `BindingError` if a parameter is invalid or has an output direction.
    /// * `ConnectionError` if the connection cannot be opened.
    /// * `ExecutionError` carrying `select_command` if the query fails.
    pub fn fill_table<I>(
        &self,
        select_command: &str,
        parameters: I,
    ) -> Result<ResultSet, GatewayError>
    where
        I: IntoIterator<Item = Parameter>,
    {
        let command = Command::bind(select_command, CommandKind::Text, parameters)?;
        command.require_inputs_only()?;
        tracing::debug!(
            command = command.text(),
            params = command.parameters().len(),
            "filling table"
        );

        let mut guard = ConnectionGuard::open(self.connector.as_ref())?;
        let table = guard
            .connection()
            .fill(&command)
            .map_err(|e| GatewayError::execution(command.text(), e))?;
        guard.close(command.text())?;
        tracing::debug!(rows = table.len(), columns = table.column_count(), "table filled");
        Ok(table)
    }
}
