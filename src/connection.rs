use crate::command::Command;
use crate::error::{DriverError, GatewayError};
use crate::results::ResultSet;
use crate::types::RowValues;

/// What a scalar execution produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScalarOutcome {
    /// First column of the first row of the first result set, if any.
    pub scalar: Option<RowValues>,
    /// Post-execution values of the output parameters, by parameter name.
    pub outputs: Vec<(String, RowValues)>,
}

impl ScalarOutcome {
    #[must_use]
    pub fn output(&self, name: &str) -> Option<&RowValues> {
        self.outputs
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    }
}

/// Opens a fresh backend connection for every gateway call.
///
/// Implement this to plug another driver, or a test double, into a
/// [`Gateway`](crate::Gateway).
pub trait Connector: Send + Sync {
    /// # Errors
    ///
    /// Returns the driver error when the connection cannot be established.
    fn connect(&self) -> Result<Box<dyn Connection>, DriverError>;
}

/// An open backend connection. Every method performs one blocking round trip.
pub trait Connection: Send {
    /// Execute a command and return the affected row count.
    ///
    /// # Errors
    ///
    /// Returns the driver error on failure.
    fn execute(&mut self, command: &Command) -> Result<usize, DriverError>;

    /// Execute a command, returning its scalar result and output values.
    ///
    /// # Errors
    ///
    /// Returns the driver error on failure.
    fn execute_scalar(&mut self, command: &Command) -> Result<ScalarOutcome, DriverError>;

    /// Run a SELECT and collect its first result set.
    ///
    /// # Errors
    ///
    /// Returns the driver error on failure.
    fn fill(&mut self, command: &Command) -> Result<ResultSet, DriverError>;

    /// Release the connection. Called at most once by the gateway.
    ///
    /// # Errors
    ///
    /// Returns the driver error if the backend fails to shut down cleanly.
    fn close(&mut self) -> Result<(), DriverError>;

    fn is_closed(&self) -> bool;
}

/// Scope guard closing the wrapped connection on every exit path.
pub(crate) struct ConnectionGuard {
    conn: Box<dyn Connection>,
    released: bool,
}

impl ConnectionGuard {
    pub(crate) fn open(connector: &dyn Connector) -> Result<Self, GatewayError> {
        let conn = connector
            .connect()
            .map_err(|source| GatewayError::ConnectionError { source })?;
        tracing::debug!("database connection opened");
        Ok(Self {
            conn,
            released: false,
        })
    }

    pub(crate) fn connection(&mut self) -> &mut dyn Connection {
        self.conn.as_mut()
    }

    /// Close explicitly on the success path so close failures reach the caller.
    pub(crate) fn close(mut self, command: &str) -> Result<(), GatewayError> {
        self.shutdown()
            .map_err(|source| GatewayError::execution(command, source))
    }

    // A failed close is not retried.
    fn shutdown(&mut self) -> Result<(), DriverError> {
        if self.released || self.conn.is_closed() {
            return Ok(());
        }
        self.released = true;
        self.conn.close()?;
        tracing::debug!("database connection closed");
        Ok(())
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        if let Err(err) = self.shutdown() {
            tracing::warn!(error = %err, "failed to close database connection");
        }
    }
}
