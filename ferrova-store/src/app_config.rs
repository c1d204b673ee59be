use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// HS256 secret shared with the external identity service that
    /// issues the tokens. This service only verifies them.
    pub jwt_secret: String,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let settings = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Optional per-environment file, selected by RUN_MODE.
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            // Optional local overrides, not checked in.
            .add_source(config::File::with_name("config/local").required(false))
            // FERROVA__SERVER__PORT=8080 style environment overrides.
            .add_source(config::Environment::with_prefix("FERROVA").separator("__"))
            .build()?;

        settings.try_deserialize()
    }
}
