#![cfg(feature = "mssql")]
// Runs against a live SQL Server only when DB_GATEWAY_MSSQL_TEST holds an ADO.NET
// connection string, e.g.
// server=tcp:localhost,1433;user=sa;password=Passw0rd!;TrustServerCertificate=true
use db_gateway::prelude::*;

fn gateway() -> Option<Gateway> {
    let Ok(conn) = std::env::var("DB_GATEWAY_MSSQL_TEST") else {
        eprintln!("DB_GATEWAY_MSSQL_TEST not set; skipping SQL Server test");
        return None;
    };
    Some(Gateway::new(GatewayConfig::mssql(conn)).expect("valid SQL Server config"))
}

#[test]
fn bad_connection_string_is_a_config_error() {
    let err = Gateway::new(GatewayConfig::mssql("server=tcp:localhost,notaport")).unwrap_err();
    assert!(matches!(err, GatewayError::ConfigError(_)));
}

#[test]
fn mssql_scalar_non_query_and_fill() -> Result<(), Box<dyn std::error::Error>> {
    let Some(gateway) = gateway() else {
        return Ok(());
    };

    assert_eq!(gateway.execute_scalar_query("SELECT 1", false, [])?, "1");

    gateway.execute_non_query(
        "IF OBJECT_ID('dbo.gateway_t', 'U') IS NOT NULL DROP TABLE dbo.gateway_t; \
         CREATE TABLE dbo.gateway_t (id INT PRIMARY KEY, x NVARCHAR(20) NULL); \
         INSERT INTO dbo.gateway_t (id, x) VALUES (1, N'old');",
        false,
        [],
    )?;
    gateway.execute_non_query(
        "UPDATE dbo.gateway_t SET x=@v",
        false,
        [Parameter::input("@v", SqlType::NVarChar, "5")],
    )?;
    assert_eq!(
        gateway.execute_scalar_query("SELECT x FROM dbo.gateway_t", false, [])?,
        "5"
    );

    let table = gateway.fill_table(
        "SELECT id, x FROM dbo.gateway_t WHERE id = @id",
        [Parameter::input("id", SqlType::Int, 1)],
    )?;
    assert_eq!(table.column_names(), ["id", "x"]);
    assert_eq!(table.rows()[0].get("x"), Some(&RowValues::Text("5".into())));

    let empty = gateway.fill_table(
        "SELECT id, x FROM dbo.gateway_t WHERE id = @id",
        [Parameter::input("id", SqlType::Int, 99)],
    )?;
    assert!(empty.is_empty());
    assert_eq!(empty.column_count(), 2);

    gateway.execute_non_query("DROP TABLE dbo.gateway_t", false, [])?;
    Ok(())
}

#[test]
fn mssql_stored_procedure_output() -> Result<(), Box<dyn std::error::Error>> {
    let Some(gateway) = gateway() else {
        return Ok(());
    };

    gateway.execute_non_query(
        "CREATE OR ALTER PROCEDURE dbo.gateway_double @n INT, @result NVARCHAR(11) OUTPUT AS \
         BEGIN SET @result = CAST(@n * 2 AS NVARCHAR(11)); END",
        false,
        [],
    )?;

    let value = gateway.execute_scalar_query(
        "dbo.gateway_double",
        true,
        [
            Parameter::input("n", SqlType::Int, 21),
            Parameter::output("result", SqlType::NVarChar),
        ],
    )?;
    assert_eq!(value, "42");

    gateway.execute_non_query("DROP PROCEDURE dbo.gateway_double", false, [])?;
    Ok(())
}

#[test]
fn mssql_failure_keeps_command_text() {
    let Some(gateway) = gateway() else {
        return;
    };
    let err = gateway
        .fill_table("SELECT * FROM dbo.gateway_missing_table", [])
        .unwrap_err();
    assert_eq!(err.command(), Some("SELECT * FROM dbo.gateway_missing_table"));
    assert!(matches!(
        err,
        GatewayError::ExecutionError {
            source: DriverError::Mssql(_),
            ..
        }
    ));
}
