//! Security checker module
//!
//! Restricts which operations of a resource may be invoked from a request.

use std::collections::HashSet;
use std::sync::Arc;

use super::{Resource, ResourceResponse};
use crate::error::ResourceError;

/// Operation name for [`Checked::traverse`]
pub const TRAVERSE: &str = "publishTraverse";

/// Allow-list of externally invocable names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamesChecker {
    names: HashSet<String>,
}

impl NamesChecker {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn allows(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn check(&self, name: &str) -> Result<(), ResourceError> {
        if self.allows(name) {
            Ok(())
        } else {
            Err(ResourceError::forbidden(name))
        }
    }
}

impl Default for NamesChecker {
    /// GET, HEAD and traversal
    fn default() -> Self {
        Self::new(["GET", "HEAD", TRAVERSE])
    }
}

/// A resource behind its checker
pub struct Checked {
    resource: Box<dyn Resource>,
    checker: Arc<NamesChecker>,
}

impl Checked {
    pub fn new(resource: Box<dyn Resource>, checker: Arc<NamesChecker>) -> Self {
        Self { resource, checker }
    }

    /// The unchecked resource, for trusted callers
    pub fn resource(&self) -> &dyn Resource {
        self.resource.as_ref()
    }

    /// Invoke an operation by its published name (`GET`, `HEAD`)
    pub fn invoke(&self, name: &str) -> Result<ResourceResponse, ResourceError> {
        self.checker.check(name)?;
        match name {
            "GET" => Ok(self.resource.get()),
            "HEAD" => Ok(self.resource.head()),
            _ => Err(ResourceError::not_found(name)),
        }
    }

    /// Traverse to a child; the child keeps this checker
    pub fn traverse(&self, name: &str) -> Result<Self, ResourceError> {
        self.checker.check(TRAVERSE)?;
        let child = self.resource.publish_traverse(name)?;
        Ok(Self {
            resource: child,
            checker: Arc::clone(&self.checker),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{FileRecord, FileResourceFactory, ResourceFactory, ResourceRequest};
    use hyper::StatusCode;

    fn factory(checker: NamesChecker) -> FileResourceFactory {
        let record = FileRecord::from_parts("test.txt", &b"data"[..], Some(1), None);
        FileResourceFactory::from_record(record, Arc::new(checker), "test.txt")
    }

    #[test]
    fn test_default_allows_get_and_head() {
        let checker = NamesChecker::default();
        assert!(checker.allows("GET"));
        assert!(checker.allows("HEAD"));
        assert!(checker.allows(TRAVERSE));
        assert!(!checker.allows("POST"));
        assert!(!checker.allows("_testData"));
    }

    #[test]
    fn test_invoke() {
        let checked = factory(NamesChecker::default()).create(ResourceRequest::default());

        let response = checked.invoke("GET").unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body().as_ref(), b"data");

        let response = checked.invoke("HEAD").unwrap();
        assert!(response.body().is_empty());

        assert!(matches!(checked.invoke("DELETE"), Err(ResourceError::Forbidden { .. })));
    }

    #[test]
    fn test_allowed_but_unknown_name() {
        let checked = factory(NamesChecker::new(["GET", "render"])).create(ResourceRequest::default());
        assert!(matches!(checked.invoke("render"), Err(ResourceError::NotFound { .. })));
    }

    #[test]
    fn test_empty_checker_forbids_everything() {
        let checked = factory(NamesChecker::new(Vec::<String>::new())).create(ResourceRequest::default());
        assert!(matches!(checked.invoke("GET"), Err(ResourceError::Forbidden { .. })));
        assert!(matches!(checked.traverse("x"), Err(ResourceError::Forbidden { .. })));

        // Trusted callers still reach the resource directly
        assert_eq!(checked.resource().get().status(), StatusCode::OK);
    }

    #[test]
    fn test_traverse_into_file_fails() {
        let checked = factory(NamesChecker::default()).create(ResourceRequest::default());
        assert!(matches!(checked.traverse("_testData"), Err(ResourceError::NotFound { .. })));
    }
}
