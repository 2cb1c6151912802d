// SQLite backend - runs gateway commands through rusqlite
//
// - connection: connector and per-call connection
// - params: value conversion and binding by parameter name
// - query: scalar and table extraction

pub mod connection;
pub mod params;
pub mod query;

pub use connection::{SqliteConnection, SqliteConnector};
