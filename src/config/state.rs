// Application state module
// Holds everything a request needs, built once at startup

use std::collections::HashMap;
use std::sync::Arc;

use super::types::Config;
use crate::error::ResourceError;
use crate::logger;
use crate::resource::icon::IconViewFactory;
use crate::resource::{NamesChecker, ResourceRegistry, StaticSite};

/// Application state
pub struct AppState {
    pub config: Config,
    pub registry: ResourceRegistry,
    pub site: StaticSite,
    pub icons: HashMap<String, IconViewFactory>,

    // Cached config values for fast access
    pub access_log: bool,
}

impl AppState {
    /// Read every configured resource and prepare icon views
    pub fn new(config: Config) -> Result<Self, ResourceError> {
        let checker = Arc::new(NamesChecker::default());
        let registry = ResourceRegistry::from_config(&config.resources, config.cache_control(), &checker)?;

        let icons = config
            .icons
            .iter()
            .map(|(name, icon)| {
                if !registry.resolves(&icon.resource) {
                    return Err(ResourceError::UnknownIconResource {
                        icon: name.clone(),
                        resource: icon.resource.clone(),
                    });
                }
                logger::log_debug(&format!("Icon '{name}' renders resource '{}'", icon.resource));
                let factory = IconViewFactory::new(icon.resource.clone(), icon.alt.clone(), icon.width, icon.height);
                Ok((name.clone(), factory))
            })
            .collect::<Result<HashMap<_, _>, _>>()?;

        Ok(Self {
            site: config.site.clone(),
            access_log: config.logging.access_log,
            registry,
            icons,
            config,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IconConfig;

    fn config_with_icon(resource: &str) -> Config {
        let toml = r#"
            [server]
            host = "127.0.0.1"
            port = 8080

            [logging]
            level = "error"
            access_log = false

            [performance]
            keep_alive_timeout = 75
            read_timeout = 30
            write_timeout = 30

            [cache]
            max_age = 60

            [site]
            url = "http://example.com"
        "#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.icons.insert(
            "logo".to_string(),
            IconConfig {
                resource: resource.to_string(),
                alt: "Logo".to_string(),
                width: 16,
                height: 16,
            },
        );
        config
    }

    #[test]
    fn test_icon_with_unknown_resource_is_rejected() {
        let result = AppState::new(config_with_icon("logo.png"));
        match result {
            Err(ResourceError::UnknownIconResource { icon, resource }) => {
                assert_eq!(icon, "logo");
                assert_eq!(resource, "logo.png");
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("icon with unknown resource was accepted"),
        }
    }
}
