//! Resource URL composition
//!
//! Resources live under `<base>/@@/<name>`, where `<base>` is the site's
//! dedicated resource URL when one is configured and the site URL otherwise.

use serde::Deserialize;

/// Internal namespace prefix stripped from published names
pub const RESOURCE_PREFIX: &str = "++resource++";

/// Base URLs of the site resources are published on
pub trait SiteUrls {
    fn absolute_url(&self) -> String;

    /// A separate base for resources (e.g. a CDN host)
    fn resource_base_url(&self) -> Option<String> {
        None
    }
}

/// Site URLs fixed by configuration
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct StaticSite {
    pub url: String,
    #[serde(default)]
    pub resource_url: Option<String>,
}

impl StaticSite {
    pub fn new(url: impl Into<String>, resource_url: Option<String>) -> Self {
        Self {
            url: url.into(),
            resource_url,
        }
    }
}

impl SiteUrls for StaticSite {
    fn absolute_url(&self) -> String {
        self.url.clone()
    }

    fn resource_base_url(&self) -> Option<String> {
        self.resource_url.clone()
    }
}

/// A published name without the `++resource++` prefix
pub fn published_name(name: &str) -> &str {
    name.strip_prefix(RESOURCE_PREFIX).unwrap_or(name)
}

/// Absolute URL of the resource called `name`
pub fn resource_url(name: &str, site: &dyn SiteUrls) -> String {
    let base = site
        .resource_base_url()
        .unwrap_or_else(|| site.absolute_url());
    format!("{}/@@/{}", base.trim_end_matches('/'), published_name(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_published_name() {
        assert_eq!(published_name("++resource++logo.png"), "logo.png");
        assert_eq!(published_name("logo.png"), "logo.png");
        assert_eq!(published_name("dir/++resource++x"), "dir/++resource++x");
    }

    #[test]
    fn test_url_uses_site_url() {
        let site = StaticSite::new("http://127.0.0.1/site", None);
        assert_eq!(
            resource_url("++resource++test.txt", &site),
            "http://127.0.0.1/site/@@/test.txt"
        );
        assert_eq!(resource_url("test.txt", &site), "http://127.0.0.1/site/@@/test.txt");
    }

    #[test]
    fn test_url_prefers_resource_base() {
        let site = StaticSite::new(
            "http://127.0.0.1/site",
            Some("http://static.example.com/".to_string()),
        );
        assert_eq!(
            resource_url("test.txt", &site),
            "http://static.example.com/@@/test.txt"
        );
    }

    struct Custom;

    impl SiteUrls for Custom {
        fn absolute_url(&self) -> String {
            "https://example.org".to_string()
        }
    }

    #[test]
    fn test_default_resource_base() {
        assert_eq!(resource_url("a.css", &Custom), "https://example.org/@@/a.css");
    }
}
