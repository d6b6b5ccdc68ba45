//! Browser resource module
//!
//! Published files, language variants and directories, each answering
//! GET/HEAD with cache validators. A factory is built once at startup and
//! binds a fresh resource to every request.

pub mod checker;
pub mod directory;
pub mod file;
pub mod i18n;
pub mod icon;
pub mod registry;
pub mod url;

use hyper::body::Bytes;
use hyper::header::{AsHeaderName, HeaderName, HeaderValue, ACCEPT_CHARSET, ACCEPT_LANGUAGE};
use hyper::header::{IF_MODIFIED_SINCE, IF_NONE_MATCH};
use hyper::{HeaderMap, Method, StatusCode};

use crate::error::ResourceError;
use crate::http::cache::Conditional;
use crate::http::negotiation;
use crate::logger;

// Re-export commonly used types
pub use checker::{Checked, NamesChecker};
pub use directory::DirectoryResourceFactory;
pub use file::{FileRecord, FileResource, FileResourceFactory};
pub use i18n::{I18nFileResource, I18nFileResourceFactory};
pub use registry::ResourceRegistry;
pub use url::{resource_url, SiteUrls, StaticSite};

/// A published, request-bound resource
pub trait Resource: Send {
    /// Published name, possibly carrying the `++resource++` prefix
    fn name(&self) -> &str;

    /// Answer a GET, honoring conditional headers
    fn get(&self) -> ResourceResponse;

    /// Answer a HEAD: GET's headers, never conditional, no body
    fn head(&self) -> ResourceResponse;

    /// Resolve a path segment below this resource
    fn publish_traverse(&self, name: &str) -> Result<Box<dyn Resource>, ResourceError>;

    /// Absolute URL of this resource
    fn url(&self, site: &dyn SiteUrls) -> String {
        resource_url(self.name(), site)
    }
}

/// Builds a request-bound resource, wrapped in its security checker
pub trait ResourceFactory: Send + Sync {
    fn name(&self) -> &str;

    fn create(&self, request: ResourceRequest) -> Checked;
}

/// Names that are never reachable through traversal
pub fn is_private_name(name: &str) -> bool {
    name.starts_with('_') || name.starts_with('.')
}

/// The parts of an HTTP request a resource looks at
#[derive(Debug, Clone, Default)]
pub struct ResourceRequest {
    method: Method,
    headers: HeaderMap,
}

impl ResourceRequest {
    pub const fn new(method: Method, headers: HeaderMap) -> Self {
        Self { method, headers }
    }

    /// Add a header; values that are not valid header text are dropped
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: &str) -> Self {
        match HeaderValue::from_str(value) {
            Ok(v) => {
                self.headers.insert(name, v);
            }
            Err(e) => logger::log_warning(&format!("Dropping invalid {name} header: {e}")),
        }
        self
    }

    pub const fn method(&self) -> &Method {
        &self.method
    }

    pub fn header<K: AsHeaderName>(&self, name: K) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Conditional GET headers
    pub fn conditional(&self) -> Conditional<'_> {
        Conditional {
            if_modified_since: self.header(IF_MODIFIED_SINCE),
            if_none_match: self.header(IF_NONE_MATCH),
        }
    }

    pub fn preferred_languages(&self) -> Vec<String> {
        negotiation::preferred_languages(self.header(ACCEPT_LANGUAGE))
    }

    pub fn preferred_charsets(&self) -> Vec<String> {
        negotiation::preferred_charsets(self.header(ACCEPT_CHARSET))
    }
}

/// Status, headers and body produced by a resource
#[derive(Debug, Clone)]
pub struct ResourceResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl ResourceResponse {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    pub fn set_header(&mut self, name: HeaderName, value: &str) {
        match HeaderValue::from_str(value) {
            Ok(v) => {
                self.headers.insert(name, v);
            }
            Err(e) => logger::log_error(&format!("Invalid {name} header value '{value}': {e}")),
        }
    }

    pub fn set_body(&mut self, body: Bytes) {
        self.body = body;
    }

    pub const fn status(&self) -> StatusCode {
        self.status
    }

    pub fn header<K: AsHeaderName>(&self, name: K) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub const fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn into_parts(self) -> (StatusCode, HeaderMap, Bytes) {
        (self.status, self.headers, self.body)
    }
}
