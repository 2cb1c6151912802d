use rusqlite::Connection as RusqliteConnection;

use super::params::bind_parameters;
use super::query::{build_result_set, first_value};
use crate::command::Command;
use crate::connection::{Connection, Connector, ScalarOutcome};
use crate::error::DriverError;
use crate::results::ResultSet;

/// Opens a new rusqlite connection to the configured path for every call.
#[derive(Debug, Clone)]
pub struct SqliteConnector {
    db_path: String,
}

impl SqliteConnector {
    #[must_use]
    pub fn new(db_path: impl Into<String>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }
}

impl Connector for SqliteConnector {
    fn connect(&self) -> Result<Box<dyn Connection>, DriverError> {
        let conn = RusqliteConnection::open(&self.db_path)?;
        Ok(Box::new(SqliteConnection { conn: Some(conn) }))
    }
}

/// A single rusqlite connection; `None` once closed.
#[derive(Debug)]
pub struct SqliteConnection {
    conn: Option<RusqliteConnection>,
}

impl SqliteConnection {
    fn open_conn(&self) -> Result<&RusqliteConnection, DriverError> {
        self.conn
            .as_ref()
            .ok_or_else(|| DriverError::Other("SQLite connection is closed".to_string()))
    }
}

fn reject_procedure(command: &Command) -> Result<(), DriverError> {
    if command.is_stored_procedure() {
        return Err(DriverError::Unsupported(
            "SQLite has no stored procedures".to_string(),
        ));
    }
    Ok(())
}

impl Connection for SqliteConnection {
    fn execute(&mut self, command: &Command) -> Result<usize, DriverError> {
        reject_procedure(command)?;
        let conn = self.open_conn()?;
        if command.parameters().is_empty() {
            // Unparameterized text may hold several statements; report their combined changes
            let before = conn.total_changes();
            conn.execute_batch(command.text())?;
            let changed = conn.total_changes().saturating_sub(before);
            return usize::try_from(changed)
                .map_err(|e| DriverError::Other(format!("Invalid rows affected count: {e}")));
        }
        let mut stmt = conn.prepare(command.text())?;
        bind_parameters(&mut stmt, command)?;
        Ok(stmt.raw_execute()?)
    }

    fn execute_scalar(&mut self, command: &Command) -> Result<ScalarOutcome, DriverError> {
        reject_procedure(command)?;
        let conn = self.open_conn()?;
        let mut stmt = conn.prepare(command.text())?;
        bind_parameters(&mut stmt, command)?;
        Ok(ScalarOutcome {
            scalar: first_value(&mut stmt)?,
            outputs: Vec::new(),
        })
    }

    fn fill(&mut self, command: &Command) -> Result<ResultSet, DriverError> {
        let conn = self.open_conn()?;
        let mut stmt = conn.prepare(command.text())?;
        bind_parameters(&mut stmt, command)?;
        build_result_set(&mut stmt)
    }

    fn close(&mut self) -> Result<(), DriverError> {
        match self.conn.take() {
            Some(conn) => conn.close().map_err(|(_conn, err)| DriverError::from(err)),
            None => Ok(()),
        }
    }

    fn is_closed(&self) -> bool {
        self.conn.is_none()
    }
}
