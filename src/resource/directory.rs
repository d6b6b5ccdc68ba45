//! Directory resources
//!
//! Publishes a directory tree. The whole tree is read when the factory is
//! built; traversal then only walks the in-memory snapshot. Hidden entries
//! (dot-files) and symlinked directories are never loaded and there is no
//! directory listing.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use hyper::StatusCode;

use super::file::{FileRecord, FileResource};
use super::{
    is_private_name, Checked, NamesChecker, Resource, ResourceFactory, ResourceRequest,
    ResourceResponse,
};
use crate::error::ResourceError;
use crate::http::cache::{CacheControl, ETagPolicy};
use crate::logger;

/// One entry of a scanned directory
#[derive(Debug)]
enum Entry {
    File(Arc<FileRecord>),
    Directory(Arc<DirectoryNode>),
}

/// Snapshot of a directory and everything below it
#[derive(Debug)]
pub struct DirectoryNode {
    path: PathBuf,
    entries: HashMap<String, Entry>,
}

impl DirectoryNode {
    /// Read `path` recursively
    pub fn scan(path: &Path, policy: Option<&dyn ETagPolicy>) -> Result<Self, ResourceError> {
        let io_error = |source: std::io::Error| ResourceError::Io {
            path: path.to_path_buf(),
            source,
        };

        let mut entries = HashMap::new();
        for dir_entry in fs::read_dir(path).map_err(io_error)? {
            let dir_entry = dir_entry.map_err(io_error)?;
            let Some(name) = dir_entry.file_name().to_str().map(ToString::to_string) else {
                continue;
            };
            if name.starts_with('.') {
                continue;
            }

            let file_type = dir_entry.file_type().map_err(io_error)?;
            let child = dir_entry.path();
            let entry = if file_type.is_dir() {
                Entry::Directory(Arc::new(Self::scan(&child, policy)?))
            } else if file_type.is_symlink() && child.is_dir() {
                // Linked directories may loop back into the tree
                logger::log_debug(&format!("Skipping linked directory {}", child.display()));
                continue;
            } else {
                Entry::File(Arc::new(FileRecord::open(&child, policy)?))
            };
            entries.insert(name, entry);
        }

        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Names of the direct children, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// A directory bound to one request
pub struct DirectoryResource {
    name: String,
    node: Arc<DirectoryNode>,
    request: ResourceRequest,
    cache: CacheControl,
}

impl DirectoryResource {
    /// No listings: the directory itself answers 404
    fn not_found() -> ResourceResponse {
        ResourceResponse::new(StatusCode::NOT_FOUND)
    }
}

impl Resource for DirectoryResource {
    fn name(&self) -> &str {
        &self.name
    }

    fn get(&self) -> ResourceResponse {
        Self::not_found()
    }

    fn head(&self) -> ResourceResponse {
        Self::not_found()
    }

    fn publish_traverse(&self, name: &str) -> Result<Box<dyn Resource>, ResourceError> {
        if is_private_name(name) || name.contains(['/', '\\']) {
            return Err(ResourceError::not_found(name));
        }

        let child_name = format!("{}/{name}", self.name);
        match self.node.entries.get(name) {
            Some(Entry::File(record)) => Ok(Box::new(FileResource::new(
                child_name,
                Arc::clone(record),
                self.request.clone(),
                self.cache,
            ))),
            Some(Entry::Directory(node)) => Ok(Box::new(Self {
                name: child_name,
                node: Arc::clone(node),
                request: self.request.clone(),
                cache: self.cache,
            })),
            None => Err(ResourceError::not_found(name)),
        }
    }
}

/// Publishes a directory tree under one name
pub struct DirectoryResourceFactory {
    name: String,
    node: Arc<DirectoryNode>,
    checker: Arc<NamesChecker>,
    cache: CacheControl,
}

impl DirectoryResourceFactory {
    pub fn new(
        path: impl AsRef<Path>,
        checker: Arc<NamesChecker>,
        name: &str,
        policy: Option<&dyn ETagPolicy>,
    ) -> Result<Self, ResourceError> {
        let node = DirectoryNode::scan(path.as_ref(), policy)?;
        Ok(Self {
            name: name.to_string(),
            node: Arc::new(node),
            checker,
            cache: CacheControl::default(),
        })
    }

    #[must_use]
    pub fn with_cache_control(mut self, cache: CacheControl) -> Self {
        self.cache = cache;
        self
    }

    pub fn node(&self) -> &DirectoryNode {
        &self.node
    }
}

impl ResourceFactory for DirectoryResourceFactory {
    fn name(&self) -> &str {
        &self.name
    }

    fn create(&self, request: ResourceRequest) -> Checked {
        let resource = DirectoryResource {
            name: self.name.clone(),
            node: Arc::clone(&self.node),
            request,
            cache: self.cache,
        };
        Checked::new(Box::new(resource), Arc::clone(&self.checker))
    }
}
