use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::GatewayError;
use crate::types::DatabaseType;

/// Environment variable naming the backend (`sqlite`, `mssql`).
pub const ENV_DATABASE_TYPE: &str = "DB_GATEWAY_TYPE";
/// Environment variable holding the connection string.
pub const ENV_CONNECTION_STRING: &str = "DB_GATEWAY_CONNECTION_STRING";

/// Everything a [`Gateway`](crate::Gateway) needs to open connections.
///
/// For `SQLite` the connection string is a file path or SQLite URI; for SQL Server it is an
/// ADO.NET connection string (`server=tcp:host,1433;database=app;user=sa;password=...`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub database_type: DatabaseType,
    pub connection_string: String,
}

impl GatewayConfig {
    #[must_use]
    pub fn new(database_type: DatabaseType, connection_string: impl Into<String>) -> Self {
        Self {
            database_type,
            connection_string: connection_string.into(),
        }
    }

    #[cfg(feature = "sqlite")]
    #[must_use]
    pub fn sqlite(path: impl Into<String>) -> Self {
        Self::new(DatabaseType::Sqlite, path)
    }

    #[cfg(feature = "mssql")]
    #[must_use]
    pub fn mssql(ado_string: impl Into<String>) -> Self {
        Self::new(DatabaseType::Mssql, ado_string)
    }

    #[must_use]
    pub fn with_connection_string(mut self, connection_string: impl Into<String>) -> Self {
        self.connection_string = connection_string.into();
        self
    }

    /// Parse a JSON document such as
    /// `{"database_type": "sqlite", "connection_string": "app.db"}`.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::ConfigError` if the document is malformed or invalid.
    pub fn from_json_str(json: &str) -> Result<Self, GatewayError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| GatewayError::ConfigError(format!("invalid gateway config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Read the configuration from `DB_GATEWAY_TYPE` and `DB_GATEWAY_CONNECTION_STRING`.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::ConfigError` if a variable is missing or invalid.
    pub fn from_env() -> Result<Self, GatewayError> {
        let read = |key: &str| {
            std::env::var(key)
                .map_err(|e| GatewayError::ConfigError(format!("{key}: {e}")))
        };
        Self::from_parts(&read(ENV_DATABASE_TYPE)?, read(ENV_CONNECTION_STRING)?)
    }

    /// Build a configuration from a backend name and a connection string.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::ConfigError` for an unknown backend or an empty connection string.
    pub fn from_parts(
        database_type: &str,
        connection_string: impl Into<String>,
    ) -> Result<Self, GatewayError> {
        let database_type = DatabaseType::from_str(database_type.trim(), true).map_err(|e| {
            GatewayError::ConfigError(format!("unknown database type {database_type:?}: {e}"))
        })?;
        let config = Self::new(database_type, connection_string);
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns `GatewayError::ConfigError` if the connection string is blank.
    pub fn validate(&self) -> Result<(), GatewayError> {
        if self.connection_string.trim().is_empty() {
            return Err(GatewayError::ConfigError(
                "connection string must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
