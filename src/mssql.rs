// MSSQL backend - runs gateway commands through tiberius
//
// - batch: T-SQL batch generation for named, typed and output parameters
// - client: tiberius client creation from an ADO.NET connection string
// - connection: connector and per-call connection driving the async client
// - params: positional value binding
// - query: result set collection and value extraction

pub mod batch;
pub mod client;
pub mod connection;
pub mod params;
pub mod query;

pub use batch::{Batch, BatchMode, build_batch};
pub use client::{MssqlClient, create_mssql_client};
pub use connection::{MssqlConnection, MssqlConnector};
