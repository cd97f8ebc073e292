//! Database connection pool management
//!
//! Uses sqlx PgPool with explicit connection limits. Options are built field
//! by field from [`DbConfig`], so passwords never need URL escaping.

use std::io;
use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{Connection, PgConnection, PgPool};
use tracing::{debug, info};

use crate::config::DbConfig;
use crate::error::{Error, Result};

/// Default maximum connections for the pool.
/// A CLI invocation issues its queries one after another.
const DEFAULT_MAX_CONNECTIONS: u32 = 2;

/// Upper bound on opening a connection, for the first one and for the pool.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Translate configuration into driver connect options.
pub fn connect_options(config: &DbConfig) -> PgConnectOptions {
    let options = PgConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .username(&config.user)
        .password(&config.password)
        .database(&config.dbname)
        .application_name("pkb")
        // Transaction-mode poolers (pgbouncer, Supabase on 6543) cannot keep
        // named prepared statements between transactions.
        .statement_cache_capacity(0);

    match config.ssl_mode {
        Some(mode) => options.ssl_mode(mode),
        None => options,
    }
}

/// Create a PostgreSQL connection pool.
///
/// # Errors
///
/// Returns [`Error::Connection`] if the first connection cannot be opened.
pub async fn create_pool(config: &DbConfig) -> Result<PgPool> {
    create_pool_with_options(config, DEFAULT_MAX_CONNECTIONS).await
}

/// Create a PostgreSQL connection pool with custom options.
///
/// A first connection is opened directly so a refused or unreachable server
/// fails within [`CONNECT_TIMEOUT`] and keeps the driver's own error.
///
/// # Arguments
///
/// * `config` - Connection settings
/// * `max_connections` - Maximum number of connections in the pool
pub async fn create_pool_with_options(config: &DbConfig, max_connections: u32) -> Result<PgPool> {
    debug!(
        host = %config.host,
        port = config.port,
        dbname = %config.dbname,
        "connecting to database"
    );

    let options = connect_options(config);
    let first = open_connection(&options, CONNECT_TIMEOUT).await?;
    if let Err(e) = first.close().await {
        debug!("closing first connection: {}", e);
    }

    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(CONNECT_TIMEOUT)
        .connect_lazy_with(options);

    info!(host = %config.host, dbname = %config.dbname, "database connection established");
    Ok(pool)
}

async fn open_connection(options: &PgConnectOptions, limit: Duration) -> Result<PgConnection> {
    match tokio::time::timeout(limit, PgConnection::connect_with(options)).await {
        Ok(conn) => conn.map_err(Error::Connection),
        Err(_) => Err(Error::Connection(sqlx::Error::Io(io::Error::new(
            io::ErrorKind::TimedOut,
            format!(
                "no response from {}:{} within {:?}",
                options.get_host(),
                options.get_port(),
                limit
            ),
        )))),
    }
}

/// Round-trip a trivial query to confirm the connection works.
pub async fn ping(pool: &PgPool) -> Result<()> {
    let (one,): (i32,) = sqlx::query_as("SELECT 1").fetch_one(pool).await?;
    debug!(result = one, "database ping");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> DbConfig {
        DbConfig {
            user: "postgres.abc".into(),
            password: "p@ss/word".into(),
            host: "db.example.com".into(),
            port: 6543,
            dbname: "postgres".into(),
            ssl_mode: None,
        }
    }

    #[test]
    fn options_carry_every_field() {
        let options = connect_options(&config());
        assert_eq!(options.get_host(), "db.example.com");
        assert_eq!(options.get_port(), 6543);
        assert_eq!(options.get_username(), "postgres.abc");
        assert_eq!(options.get_database(), Some("postgres"));
    }

    #[tokio::test]
    async fn refused_connection_fails_fast_with_cause() {
        let mut config = config();
        config.host = "127.0.0.1".into();
        config.port = 1;

        let started = std::time::Instant::now();
        let err = create_pool(&config).await.unwrap_err();

        assert!(started.elapsed() < CONNECT_TIMEOUT);
        assert_eq!(err.exit_code(), 3);
        match err {
            Error::Connection(sqlx::Error::Io(io)) => {
                assert_eq!(io.kind(), io::ErrorKind::ConnectionRefused)
            }
            other => panic!("expected an I/O connection error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unanswered_connection_times_out() {
        // Accepts TCP but never speaks the protocol
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let options = PgConnectOptions::new().host("127.0.0.1").port(port);

        let err = open_connection(&options, Duration::from_millis(200))
            .await
            .unwrap_err();
        let message = match err {
            Error::Connection(source) => source.to_string(),
            other => panic!("expected a connection error, got {other:?}"),
        };
        assert!(message.contains("within 200ms"), "{message}");
        drop(listener);
    }

    // Integration tests require a real database
    // Run with: DATABASE_URL=postgres://... cargo test -p pkb-core -- --ignored

    #[tokio::test]
    #[ignore = "requires database"]
    async fn ping_round_trips() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = PgPool::connect(&url).await.expect("pool creation failed");

        ping(&pool).await.expect("ping failed");
    }
}
