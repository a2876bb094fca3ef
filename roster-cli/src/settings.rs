use config::{Config, ConfigError, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub solver: SolverSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SolverSettings {
    /// Wall-clock budget per solver invocation, in seconds.
    pub time_limit_secs: u64,
    /// Upper bound on enumerated alternatives per request.
    pub max_alternatives: usize,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let environment = std::env::var("RUN_ENV").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            .set_default("solver.time_limit_secs", 30_i64)?
            .set_default("solver.max_alternatives", 10_i64)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
