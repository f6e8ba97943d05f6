//! HTTP server configuration.

use std::net::SocketAddr;

use clap::Parser;

/// Runtime configuration, read from flags or the environment.
#[derive(Debug, Clone, Parser)]
#[command(name = "backend", about = "Customer records API server")]
pub struct ServerConfig {
    /// Address to bind the HTTP listener to.
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8080")]
    pub bind_addr: SocketAddr,

    /// PostgreSQL connection string.
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: String,

    /// Maximum number of connections in the database pool.
    #[arg(long, env = "DB_POOL_SIZE", default_value_t = 10)]
    pub db_pool_size: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_only_the_url_is_given() {
        let config = ServerConfig::try_parse_from([
            "backend",
            "--database-url",
            "postgres://localhost/customers",
        ])
        .unwrap();
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.db_pool_size, 10);
    }

    #[test]
    fn missing_database_url_is_an_error() {
        // Guard against ambient DATABASE_URL satisfying the parse.
        if std::env::var_os("DATABASE_URL").is_some() {
            return;
        }
        assert!(ServerConfig::try_parse_from(["backend"]).is_err());
    }
}
