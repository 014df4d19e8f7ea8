// Database Connection Management
//
// Handles PostgreSQL connection pooling using tokio-postgres and deadpool.
use anyhow::{Context, Result};
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use native_tls::TlsConnector;
use postgres_native_tls::MakeTlsConnector;
use std::str::FromStr;
use std::time::Duration;
use tokio_postgres::NoTls;
use tokio_postgres::config::{Host, SslMode};

use crate::database::store::UserStore;

/// Database configuration
#[derive(Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub dbname: String,
    pub max_size: usize,
    pub ssl: bool,
    pub timeouts: deadpool_postgres::Timeouts,
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("dbname", &self.dbname)
            .field("max_size", &self.max_size)
            .field("ssl", &self.ssl)
            .finish_non_exhaustive()
    }
}

fn default_timeouts() -> deadpool_postgres::Timeouts {
    deadpool_postgres::Timeouts {
        wait: Some(Duration::from_secs(30)),
        create: Some(Duration::from_secs(30)),
        recycle: Some(Duration::from_secs(30)),
    }
}

impl DatabaseConfig {
    /// Create configuration from database URL
    ///
    /// Credentials and database name may be percent-encoded. TLS is enabled
    /// only for `sslmode=require`.
    pub fn from_url(url: &str) -> Result<Self> {
        if !url.starts_with("postgresql://") && !url.starts_with("postgres://") {
            anyhow::bail!("Invalid database URL scheme, expected postgresql or postgres");
        }

        let parsed = tokio_postgres::Config::from_str(url)
            .context("Failed to parse database URL")?;

        let host = match parsed.get_hosts().first() {
            Some(Host::Tcp(host)) => host.clone(),
            #[cfg(unix)]
            Some(Host::Unix(path)) => path.to_string_lossy().into_owned(),
            None => "localhost".to_string(),
        };

        Ok(Self {
            host,
            port: parsed.get_ports().first().copied().unwrap_or(5432),
            user: parsed.get_user().unwrap_or_default().to_string(),
            password: parsed
                .get_password()
                .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
                .unwrap_or_default(),
            dbname: parsed.get_dbname().unwrap_or_default().to_string(),
            max_size: 16,
            ssl: parsed.get_ssl_mode() == SslMode::Require,
            timeouts: default_timeouts(),
        })
    }

    /// Create configuration from environment variables
    ///
    /// `DATABASE_MAX_CONNECTIONS` and `DATABASE_SSL` override what the URL says.
    pub fn from_env() -> Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .context("DATABASE_URL must be set in the environment")?;
        let mut config = Self::from_url(&database_url)?;

        if let Ok(raw) = std::env::var("DATABASE_MAX_CONNECTIONS") {
            config.max_size = raw.parse().context("DATABASE_MAX_CONNECTIONS must be a number")?;
        }
        if let Ok(raw) = std::env::var("DATABASE_SSL") {
            config.ssl = matches!(raw.as_str(), "1" | "true" | "TRUE" | "yes");
        }

        Ok(config)
    }
}

/// Database connection wrapper
#[derive(Debug, Clone)]
pub struct DatabaseConnection {
    pool: Pool,
}

impl DatabaseConnection {
    /// Create a new pooled connection with the provided configuration
    pub async fn new(config: DatabaseConfig) -> Result<Self> {
        let masked_host = format!("{}:{}/{}", config.host, config.port, config.dbname);
        tracing::info!("🔌 Connecting to database: {}", masked_host);

        let mut pg_config = tokio_postgres::Config::new();
        pg_config.host(&config.host);
        pg_config.port(config.port);
        pg_config.user(&config.user);
        pg_config.password(&config.password);
        pg_config.dbname(&config.dbname);

        let mgr_config = ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        };
        let mgr = if config.ssl {
            let tls_connector = TlsConnector::builder().build().context("Failed to build TLS connector")?;
            Manager::from_config(pg_config, MakeTlsConnector::new(tls_connector), mgr_config)
        } else {
            Manager::from_config(pg_config, NoTls, mgr_config)
        };

        let pool = Pool::builder(mgr)
            .max_size(config.max_size)
            .wait_timeout(config.timeouts.wait)
            .create_timeout(config.timeouts.create)
            .recycle_timeout(config.timeouts.recycle)
            .runtime(deadpool_postgres::Runtime::Tokio1)
            .build()
            .context("Failed to create database pool")?;

        let connection = Self { pool };
        UserStore::health_check(&connection)
            .await
            .context("Failed to test database connection")?;

        tracing::info!("✅ Database connection established successfully");
        Ok(connection)
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &Pool {
        &self.pool
    }
}
