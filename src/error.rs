//! Error types shared by the resource layer

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building or traversing resources
#[derive(Debug, Error)]
pub enum ResourceError {
    /// Traversal target does not exist or is not public
    #[error("not found: {name}")]
    NotFound { name: String },

    /// The security checker refused access to a name
    #[error("forbidden: {name}")]
    Forbidden { name: String },

    /// A default language was requested that no variant provides
    #[error("language '{language}' is not available (available: {available})")]
    InvalidLanguage { language: String, available: String },

    /// An icon names a resource that is not published
    #[error("icon '{icon}' refers to unknown resource '{resource}'")]
    UnknownIconResource { icon: String, resource: String },

    /// The backing file could not be read at construction time
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ResourceError {
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }

    pub fn forbidden(name: impl Into<String>) -> Self {
        Self::Forbidden { name: name.into() }
    }
}
