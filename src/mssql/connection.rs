use tiberius::Config;
use tokio::runtime::{Builder, Handle, Runtime};

use super::batch::{BatchMode, build_batch};
use super::client::{MssqlClient, create_mssql_client};
use super::params::bind_query_params;
use super::query::collect_results;
use crate::command::Command;
use crate::connection::{Connection, Connector, ScalarOutcome};
use crate::error::{DriverError, GatewayError};
use crate::results::ResultSet;

/// Opens a new tiberius client for every call.
#[derive(Debug, Clone)]
pub struct MssqlConnector {
    config: Config,
}

impl MssqlConnector {
    /// Parse an ADO.NET connection string.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::ConfigError` if the string cannot be parsed.
    pub fn new(ado_string: &str) -> Result<Self, GatewayError> {
        let config = Config::from_ado_string(ado_string).map_err(|e| {
            GatewayError::ConfigError(format!("invalid SQL Server connection string: {e}"))
        })?;
        Ok(Self { config })
    }

    #[must_use]
    pub fn from_config(config: Config) -> Self {
        Self { config }
    }
}

/// `Runtime::block_on` panics when nested in another runtime.
fn ensure_outside_runtime() -> Result<(), DriverError> {
    if Handle::try_current().is_ok() {
        return Err(DriverError::Unsupported(
            "the blocking SQL Server backend cannot run inside an async runtime; \
             call it from spawn_blocking or a plain thread"
                .to_string(),
        ));
    }
    Ok(())
}

impl Connector for MssqlConnector {
    fn connect(&self) -> Result<Box<dyn Connection>, DriverError> {
        ensure_outside_runtime()?;
        // The gateway API is blocking; each connection drives its client on its own runtime
        let rt = Builder::new_current_thread().enable_all().build()?;
        let client = rt.block_on(create_mssql_client(self.config.clone()))?;
        Ok(Box::new(MssqlConnection {
            rt,
            client: Some(client),
        }))
    }
}

/// A tiberius client with the runtime that drives it; `client` is `None` once closed.
pub struct MssqlConnection {
    rt: Runtime,
    client: Option<MssqlClient>,
}

impl std::fmt::Debug for MssqlConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MssqlConnection")
            .field("client", &self.client.as_ref().map(|_| "<MssqlClient>"))
            .finish_non_exhaustive()
    }
}

impl MssqlConnection {
    fn parts(&mut self) -> Result<(&Runtime, &mut MssqlClient), DriverError> {
        ensure_outside_runtime()?;
        let client = self
            .client
            .as_mut()
            .ok_or_else(|| DriverError::Other("SQL Server connection is closed".to_string()))?;
        Ok((&self.rt, client))
    }
}

impl Connection for MssqlConnection {
    fn execute(&mut self, command: &Command) -> Result<usize, DriverError> {
        let batch = build_batch(command, BatchMode::Execute);
        let (rt, client) = self.parts()?;
        let result = rt.block_on(bind_query_params(&batch).execute(client))?;
        let rows_affected: u64 = result.rows_affected().iter().sum();
        usize::try_from(rows_affected)
            .map_err(|e| DriverError::Other(format!("Invalid rows affected count: {e}")))
    }

    fn execute_scalar(&mut self, command: &Command) -> Result<ScalarOutcome, DriverError> {
        let batch = build_batch(command, BatchMode::ReadOutputs);
        let (rt, client) = self.parts()?;
        let mut results = rt.block_on(async {
            let stream = bind_query_params(&batch).query(client).await?;
            collect_results(stream).await
        })?;

        let mut outcome = ScalarOutcome::default();
        if batch.selects_outputs() {
            let output_set = results.pop().ok_or_else(|| {
                DriverError::Other("output values were not returned".to_string())
            })?;
            let row = output_set.rows.into_iter().next().unwrap_or_default();
            outcome.outputs = batch
                .outputs
                .iter()
                .map(|name| (*name).to_string())
                .zip(row)
                .collect();
        }
        outcome.scalar = results.first().and_then(|r| r.first_value()).cloned();
        Ok(outcome)
    }

    fn fill(&mut self, command: &Command) -> Result<ResultSet, DriverError> {
        let batch = build_batch(command, BatchMode::Execute);
        let (rt, client) = self.parts()?;
        let results = rt.block_on(async {
            let stream = bind_query_params(&batch).query(client).await?;
            collect_results(stream).await
        })?;
        Ok(results
            .into_iter()
            .next()
            .map(super::query::RawResult::into_result_set)
            .unwrap_or_default())
    }

    fn close(&mut self) -> Result<(), DriverError> {
        ensure_outside_runtime()?;
        match self.client.take() {
            Some(client) => Ok(self.rt.block_on(client.close())?),
            None => Ok(()),
        }
    }

    fn is_closed(&self) -> bool {
        self.client.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connector(ado: &str) -> MssqlConnector {
        MssqlConnector::new(ado).expect("valid connection string")
    }

    #[tokio::test]
    async fn connecting_inside_a_runtime_is_unsupported() {
        let connector = connector("server=tcp:127.0.0.1,1;user=sa;password=x");
        match connector.connect() {
            Err(DriverError::Unsupported(msg)) => assert!(msg.contains("async runtime")),
            Err(other) => panic!("unexpected error: {other:?}"),
            Ok(_) => panic!("connected inside a runtime"),
        }
    }

    #[test]
    fn unreachable_named_instance_is_a_driver_error() {
        let connector = connector(r"server=tcp:127.0.0.1\NOSUCHINSTANCE;user=sa;password=x");
        match connector.connect() {
            Err(DriverError::Unsupported(msg)) => panic!("unexpected: {msg}"),
            Err(_) => {}
            Ok(_) => panic!("connected to a missing instance"),
        }
    }
}
