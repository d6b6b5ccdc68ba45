// Configuration module entry point
// Loads the server configuration and builds the runtime state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{
    CacheConfig, Config, IconConfig, LoggingConfig, PerformanceConfig, ResourceConfig, ServerConfig,
};

use crate::http::cache::{CacheControl, DEFAULT_MAX_AGE};

/// Prefix of environment overrides, e.g. `RESOURCE__SERVER__PORT=9000`
const ENV_PREFIX: &str = "RESOURCE";

impl Config {
    /// Load configuration from specified file path (without extension)
    /// Default config file is "config.toml" when no path specified
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        Self::load_with(config::File::with_name(config_path).required(false))
    }

    fn load_with<S>(source: S) -> Result<Self, config::ConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let settings = config::Config::builder()
            .add_source(source)
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("cache.max_age", i64::from(DEFAULT_MAX_AGE))?
            .set_default("site.url", "http://127.0.0.1:8080")?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }

    pub const fn cache_control(&self) -> CacheControl {
        CacheControl::new(self.cache.max_age)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{File, FileFormat};

    fn load(toml: &str) -> Config {
        Config::load_with(File::from_str(toml, FileFormat::Toml)).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = load("");
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.workers, None);
        assert_eq!(config.logging.level, "info");
        assert!(config.logging.access_log);
        assert_eq!(config.logging.access_log_format, "combined");
        assert_eq!(config.cache.max_age, DEFAULT_MAX_AGE);
        assert_eq!(config.site.url, "http://127.0.0.1:8080");
        assert_eq!(config.site.resource_url, None);
        assert!(config.resources.is_empty());
        assert!(config.icons.is_empty());
        assert_eq!(config.get_socket_addr().unwrap().port(), 8080);
    }

    #[test]
    fn test_file_values() {
        let config = load(
            r#"
            [server]
            port = 9090
            workers = 2

            [cache]
            max_age = 600

            [site]
            url = "http://example.com"
            resource_url = "http://static.example.com"

            [resources.logo]
            type = "file"
            path = "static/logo.png"

            [icons.book]
            resource = "logo"
            alt = "Book"
            width = 16
            height = 16
            "#,
        );

        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.workers, Some(2));
        assert_eq!(config.cache_control().header_value(), "public,max-age=600");
        assert_eq!(config.site.resource_url.as_deref(), Some("http://static.example.com"));
        assert_eq!(config.resources["logo"].kind(), "file");
        assert_eq!(config.icons["book"].resource, "logo");
    }

    #[test]
    fn test_invalid_address() {
        let mut config = load("");
        config.server.host = "not an address".to_string();
        assert!(config.get_socket_addr().is_err());
    }
}
