use serde::Deserialize;

/// Runtime settings, passed explicitly to the pool and router.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub max_connections: u32,
    pub cors_origin: String,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        let defaults = Self::default();
        Ok(Self {
            port: match std::env::var("PORT") {
                Ok(v) => v
                    .parse()
                    .map_err(|e| anyhow::anyhow!("invalid PORT '{}': {}", v, e))?,
                Err(_) => defaults.port,
            },
            database_url: std::env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            max_connections: match std::env::var("DB_MAX_CONNECTIONS") {
                Ok(v) => v
                    .parse()
                    .map_err(|e| anyhow::anyhow!("invalid DB_MAX_CONNECTIONS '{}': {}", v, e))?,
                Err(_) => defaults.max_connections,
            },
            cors_origin: std::env::var("CORS_ORIGIN").unwrap_or(defaults.cors_origin),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 21547,
            database_url: "sqlite:board.db".into(),
            max_connections: 5,
            cors_origin: "http://localhost:21548,http://127.0.0.1:21548".into(),
        }
    }
}
