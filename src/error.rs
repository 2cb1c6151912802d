use thiserror::Error;

/// Errors surfaced by every gateway operation.
///
/// Each variant carries the context needed to act on it: the failing command text for
/// execution failures, the parameter name for binding failures, and the original driver
/// error as the `source` wherever one exists.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Could not open a database connection: {source}")]
    ConnectionError {
        #[source]
        source: DriverError,
    },

    #[error("Could not bind parameter {name}: {reason}")]
    BindingError { name: String, reason: String },

    #[error("Could not execute the db command `{command}`: {source}")]
    ExecutionError {
        command: String,
        #[source]
        source: DriverError,
    },
}

impl GatewayError {
    pub(crate) fn binding(name: impl Into<String>, reason: impl Into<String>) -> Self {
        GatewayError::BindingError {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Wrap a driver failure raised while running `command`.
    ///
    /// Binding failures detected by the driver keep their own variant.
    pub(crate) fn execution(command: &str, source: DriverError) -> Self {
        match source {
            DriverError::Binding { name, reason } => GatewayError::BindingError { name, reason },
            source => GatewayError::ExecutionError {
                command: command.to_string(),
                source,
            },
        }
    }

    /// The command text attached to an execution failure.
    #[must_use]
    pub fn command(&self) -> Option<&str> {
        match self {
            GatewayError::ExecutionError { command, .. } => Some(command),
            _ => None,
        }
    }
}

/// The original failure reported by a backend.
#[derive(Debug, Error)]
pub enum DriverError {
    #[cfg(feature = "sqlite")]
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[cfg(feature = "mssql")]
    #[error(transparent)]
    Mssql(#[from] tiberius::error::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Unsupported by this backend: {0}")]
    Unsupported(String),

    #[error("Parameter {name} rejected by the driver: {reason}")]
    Binding { name: String, reason: String },

    #[error("Other database error: {0}")]
    Other(String),
}
