//! Resource registry
//!
//! Maps published names to their factories. Names are stored without the
//! `++resource++` prefix, so `++resource++logo.png` and `logo.png` resolve to
//! the same factory.

use std::collections::HashMap;
use std::sync::Arc;

use super::url::published_name;
use super::{
    DirectoryResourceFactory, FileRecord, FileResourceFactory, I18nFileResourceFactory,
    NamesChecker, ResourceFactory, ResourceRequest,
};
use crate::config::ResourceConfig;
use crate::error::ResourceError;
use crate::http::cache::{default_policy, CacheControl, SharedETagPolicy};
use crate::logger;

#[derive(Default)]
pub struct ResourceRegistry {
    factories: HashMap<String, Arc<dyn ResourceFactory>>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build every configured resource
    ///
    /// Any file that cannot be read aborts the whole registry so that a
    /// misconfigured server fails at startup rather than on first request.
    pub fn from_config(
        resources: &HashMap<String, ResourceConfig>,
        cache: CacheControl,
        checker: &Arc<NamesChecker>,
    ) -> Result<Self, ResourceError> {
        let mut registry = Self::new();

        for (name, resource) in resources {
            let policy: Option<SharedETagPolicy> = if resource.etag() { default_policy() } else { None };
            let policy = policy.as_deref();

            let factory: Arc<dyn ResourceFactory> = match resource {
                ResourceConfig::File { path, .. } => Arc::new(
                    FileResourceFactory::new(path, Arc::clone(checker), name, policy)?
                        .with_cache_control(cache),
                ),
                ResourceConfig::I18nFile {
                    default_language,
                    variants,
                    ..
                } => {
                    let mut records = HashMap::with_capacity(variants.len());
                    for (language, path) in variants {
                        records.insert(language.clone(), FileRecord::open(path, policy)?);
                    }
                    Arc::new(
                        I18nFileResourceFactory::new(records, default_language, Arc::clone(checker), name)?
                            .with_cache_control(cache),
                    )
                }
                ResourceConfig::Directory { path, .. } => Arc::new(
                    DirectoryResourceFactory::new(path, Arc::clone(checker), name, policy)?
                        .with_cache_control(cache),
                ),
            };

            logger::log_resource_registered(name, resource.kind());
            registry.register(factory);
        }

        Ok(registry)
    }

    /// Add a factory, replacing any other factory published under the same name
    pub fn register(&mut self, factory: Arc<dyn ResourceFactory>) {
        let name = published_name(factory.name()).to_string();
        if self.factories.insert(name.clone(), factory).is_some() {
            logger::log_warning(&format!("Resource '{name}' registered twice, keeping the last one"));
        }
    }

    /// Look up a factory by name, with or without the `++resource++` prefix
    pub fn get(&self, name: &str) -> Option<&Arc<dyn ResourceFactory>> {
        self.factories.get(published_name(name))
    }

    /// Whether `path` (a published name, optionally followed by `/`-separated
    /// children) reaches an existing resource
    pub fn resolves(&self, path: &str) -> bool {
        let mut segments = path.split('/').filter(|segment| !segment.is_empty());
        let Some(factory) = segments.next().and_then(|name| self.get(name)) else {
            return false;
        };
        segments
            .try_fold(factory.create(ResourceRequest::default()), |resource, segment| {
                resource.traverse(segment)
            })
            .is_ok()
    }

    /// Published names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}
