//! A small synchronous gateway for parameterized database commands.
//!
//! Every call opens one connection, runs one command and closes the connection again,
//! on success and on failure. Three command shapes are supported: non-queries, scalar
//! queries (returning one value as text) and table fills.
//!
//! Backends are selected with cargo features: `sqlite` (default, rusqlite) and `mssql`
//! (tiberius). Other drivers and test doubles plug in through [`Connector`].

pub mod command;
pub mod config;
pub mod connection;
pub mod error;
pub mod gateway;
pub mod params;
pub mod prelude;
pub mod results;
pub mod types;

#[cfg(feature = "mssql")]
pub mod mssql;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use command::{Command, CommandKind};
pub use config::GatewayConfig;
pub use connection::{Connection, Connector, ScalarOutcome};
pub use error::{DriverError, GatewayError};
pub use gateway::Gateway;
pub use params::{DEFAULT_OUTPUT_SIZE, ParamDirection, Parameter, null_parameters};
pub use results::{DataRow, ResultSet};
pub use types::{DatabaseType, RowValues, SqlType};
