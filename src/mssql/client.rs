use tiberius::{Client, Config, SqlBrowser};
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};

use crate::error::DriverError;

/// Type alias for SQL Server client
pub type MssqlClient = Client<Compat<TcpStream>>;

/// Connect a new SQL Server client.
///
/// Named instances are resolved through the SQL Server Browser service. Follows one
/// routing redirect, as issued by Azure SQL gateways.
///
/// # Errors
/// Returns the tiberius or socket error if the connection fails.
pub async fn create_mssql_client(config: Config) -> Result<MssqlClient, DriverError> {
    let tcp = TcpStream::connect_named(&config).await?;
    tcp.set_nodelay(true)?;

    match Client::connect(config.clone(), tcp.compat_write()).await {
        Ok(client) => Ok(client),
        Err(tiberius::error::Error::Routing { host, port }) => {
            let mut config = config;
            config.host(&host);
            config.port(port);
            tracing::debug!(%host, port, "following SQL Server routing redirect");
            let tcp = connect_tcp(config.get_addr()).await?;
            Ok(Client::connect(config, tcp.compat_write()).await?)
        }
        Err(err) => Err(err.into()),
    }
}

async fn connect_tcp(addr: String) -> Result<TcpStream, DriverError> {
    let tcp = TcpStream::connect(addr).await?;
    tcp.set_nodelay(true)?;
    Ok(tcp)
}
