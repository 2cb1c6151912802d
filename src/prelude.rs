//! Convenient imports for common functionality.

pub use crate::command::{Command, CommandKind};
pub use crate::config::GatewayConfig;
pub use crate::connection::{Connection, Connector, ScalarOutcome};
pub use crate::error::{DriverError, GatewayError};
pub use crate::gateway::Gateway;
pub use crate::params::{DEFAULT_OUTPUT_SIZE, ParamDirection, Parameter, null_parameters};
pub use crate::results::{DataRow, ResultSet};
pub use crate::types::{DatabaseType, RowValues, SqlType};

#[cfg(feature = "sqlite")]
pub use crate::sqlite::SqliteConnector;

#[cfg(feature = "mssql")]
pub use crate::mssql::MssqlConnector;
