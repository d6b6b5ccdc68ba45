// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;
use std::collections::HashMap;

use crate::resource::url::StaticSite;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub cache: CacheConfig,
    pub site: StaticSite,
    /// Published resources, keyed by name
    #[serde(default)]
    pub resources: HashMap<String, ResourceConfig>,
    /// Icons rendered under `/@@icon/<name>`
    #[serde(default)]
    pub icons: HashMap<String, IconConfig>,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Minimum level written: error, warn, info or debug
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
    pub max_connections: Option<u64>,
}

/// Client cache configuration
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct CacheConfig {
    /// `max-age` of `Cache-Control` and offset of `Expires`, in seconds
    pub max_age: u32,
}

/// One published resource
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResourceConfig {
    /// A single file
    File {
        path: String,
        #[serde(default = "default_etag")]
        etag: bool,
    },
    /// Language variants of one file
    I18nFile {
        default_language: String,
        /// Language tag -> file path
        variants: HashMap<String, String>,
        #[serde(default = "default_etag")]
        etag: bool,
    },
    /// A directory tree
    Directory {
        path: String,
        #[serde(default = "default_etag")]
        etag: bool,
    },
}

#[allow(clippy::missing_const_for_fn)]
fn default_etag() -> bool {
    true
}

impl ResourceConfig {
    /// Whether the default `ETag` policy applies
    pub const fn etag(&self) -> bool {
        match self {
            Self::File { etag, .. } | Self::I18nFile { etag, .. } | Self::Directory { etag, .. } => *etag,
        }
    }

    pub const fn kind(&self) -> &'static str {
        match self {
            Self::File { .. } => "file",
            Self::I18nFile { .. } => "i18n_file",
            Self::Directory { .. } => "directory",
        }
    }
}

/// Icon configuration
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct IconConfig {
    /// Name of the image resource
    pub resource: String,
    pub alt: String,
    pub width: u32,
    pub height: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_config_from_toml() {
        let resources: HashMap<String, ResourceConfig> = toml::from_str(
            r#"
            ["test.txt"]
            type = "file"
            path = "static/test.txt"

            ["help.html"]
            type = "i18n_file"
            default_language = "en"
            etag = false
            variants = { en = "static/help-en.html", fr = "static/help-fr.html" }

            [assets]
            type = "directory"
            path = "static/assets"
            "#,
        )
        .unwrap();

        assert_eq!(
            resources["test.txt"],
            ResourceConfig::File {
                path: "static/test.txt".to_string(),
                etag: true,
            }
        );
        assert!(resources["test.txt"].etag());
        assert!(!resources["help.html"].etag());
        assert_eq!(resources["help.html"].kind(), "i18n_file");
        assert_eq!(resources["assets"].kind(), "directory");

        let ResourceConfig::I18nFile { variants, default_language, .. } = &resources["help.html"] else {
            panic!("expected i18n_file");
        };
        assert_eq!(default_language, "en");
        assert_eq!(variants["fr"], "static/help-fr.html");
    }

    #[test]
    fn test_unknown_resource_type() {
        let result: Result<HashMap<String, ResourceConfig>, _> =
            toml::from_str("[x]\ntype = \"zip\"\npath = \"a.zip\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_icon_config() {
        let icon: IconConfig =
            toml::from_str("resource = \"book.png\"\nalt = \"Book\"\nwidth = 16\nheight = 16\n").unwrap();
        assert_eq!(icon.resource, "book.png");
        assert_eq!((icon.width, icon.height), (16, 16));
    }
}
