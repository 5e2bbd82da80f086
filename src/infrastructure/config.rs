use crate::domain::SampleRate;
use serde::Deserialize;
use std::net::SocketAddr;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub query: QuerySettings,
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl ServerSettings {
    pub fn addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct QuerySettings {
    pub default_sample_rate: f64,
}

impl QuerySettings {
    pub fn default_sample_rate(&self) -> anyhow::Result<SampleRate> {
        Ok(SampleRate::new(self.default_sample_rate)?)
    }
}

/// Defaults, then `config/solar.{toml,yaml,json}` if present, then `SOLAR__*`
/// environment variables (e.g. `SOLAR__DATABASE__URL`).
pub fn load_config() -> anyhow::Result<AppConfig> {
    build_config(config::File::with_name("config/solar").required(false))
}

fn build_config<S>(file: S) -> anyhow::Result<AppConfig>
where
    S: config::Source + Send + Sync + 'static,
{
    let settings = config::Config::builder()
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 8080_i64)?
        .set_default("database.url", "sqlite::memory:")?
        .set_default("database.max_connections", 3_i64)?
        .set_default("query.default_sample_rate", 0.05_f64)?
        .set_default("log_level", "info")?
        .add_source(file)
        .add_source(config::Environment::with_prefix("SOLAR").separator("__"))
        .build()?;

    let config: AppConfig = settings.try_deserialize()?;
    config.query.default_sample_rate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{File, FileFormat};

    #[test]
    fn test_defaults() {
        let config = build_config(File::from_str("", FileFormat::Toml)).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.url, "sqlite::memory:");
        assert_eq!(config.database.max_connections, 3);
        assert_eq!(config.query.default_sample_rate().unwrap().value(), 0.05);
        assert_eq!(config.server.addr().unwrap().port(), 8080);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let toml = r#"
            log_level = "debug"

            [server]
            host = "127.0.0.1"
            port = 9000

            [database]
            url = "sqlite:data/solar.db"
        "#;
        let config = build_config(File::from_str(toml, FileFormat::Toml)).unwrap();
        assert_eq!(config.server.addr().unwrap().to_string(), "127.0.0.1:9000");
        assert_eq!(config.database.url, "sqlite:data/solar.db");
        assert_eq!(config.database.max_connections, 3);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_rejects_bad_default_sample_rate() {
        let toml = "[query]\ndefault_sample_rate = 2.0\n";
        assert!(build_config(File::from_str(toml, FileFormat::Toml)).is_err());
    }
}
