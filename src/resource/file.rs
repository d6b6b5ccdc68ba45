//! File resources
//!
//! A [`FileRecord`] is read from disk once, when its factory is built, and
//! shared read-only by every request afterwards.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::UNIX_EPOCH;

use hyper::body::Bytes;
use hyper::header::{CACHE_CONTROL, CONTENT_LENGTH, CONTENT_TYPE, ETAG, EXPIRES, LAST_MODIFIED};
use hyper::StatusCode;

use super::{Checked, NamesChecker, Resource, ResourceFactory, ResourceRequest, ResourceResponse};
use crate::error::ResourceError;
use crate::http::cache::{self, CacheControl, ConditionalOutcome, ETagPolicy, Validators};
use crate::http::{date, mime};

/// Snapshot of one physical file
#[derive(Debug, Clone)]
pub struct FileRecord {
    path: PathBuf,
    content_type: &'static str,
    data: Bytes,
    last_modified: Option<i64>,
    last_modified_header: Option<String>,
    etag: Option<String>,
}

impl FileRecord {
    /// Read `path` from disk; its file name decides the content type
    ///
    /// A missing modification time (e.g. files unpacked from a stripped
    /// archive) only disables date validation for this file.
    pub fn open(path: impl AsRef<Path>, policy: Option<&dyn ETagPolicy>) -> Result<Self, ResourceError> {
        let path = path.as_ref();
        let data = fs::read(path).map_err(|source| ResourceError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        let mut record = Self::from_parts(file_name, data, modification_time(path), policy);
        record.path = path.to_path_buf();
        Ok(record)
    }

    /// Build a record from content already in memory; `name` decides the
    /// content type
    pub fn from_parts(
        name: &str,
        data: impl Into<Bytes>,
        last_modified: Option<i64>,
        policy: Option<&dyn ETagPolicy>,
    ) -> Self {
        let data = data.into();
        let etag = policy.and_then(|p| p.compute(last_modified, &data));

        Self {
            path: PathBuf::from(name),
            content_type: mime::guess_content_type(name),
            data,
            last_modified,
            last_modified_header: last_modified.map(date::format_http_date),
            etag,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub const fn content_type(&self) -> &'static str {
        self.content_type
    }

    pub const fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub const fn last_modified(&self) -> Option<i64> {
        self.last_modified
    }

    pub fn last_modified_header(&self) -> Option<&str> {
        self.last_modified_header.as_deref()
    }

    pub fn etag(&self) -> Option<&str> {
        self.etag.as_deref()
    }

    fn validators(&self) -> Validators<'_> {
        Validators {
            last_modified: self.last_modified,
            etag: self.etag(),
        }
    }
}

/// Modification time in whole epoch seconds, if the filesystem has one
fn modification_time(path: &Path) -> Option<i64> {
    let modified = fs::metadata(path).and_then(|m| m.modified()).ok()?;
    let secs = modified.duration_since(UNIX_EPOCH).ok()?.as_secs();
    i64::try_from(secs).ok()
}

/// A file bound to one request
pub struct FileResource {
    name: String,
    record: Arc<FileRecord>,
    request: ResourceRequest,
    cache: CacheControl,
}

impl FileResource {
    pub const fn new(
        name: String,
        record: Arc<FileRecord>,
        request: ResourceRequest,
        cache: CacheControl,
    ) -> Self {
        Self {
            name,
            record,
            request,
            cache,
        }
    }

    /// `ETag`, `Cache-Control` and `Expires`, sent on 200 and 304 alike
    fn set_cache_headers(&self, response: &mut ResourceResponse) {
        if let Some(etag) = self.record.etag() {
            response.set_header(ETAG, &cache::quote_etag(etag));
        }
        response.set_header(CACHE_CONTROL, &self.cache.header_value());
        response.set_header(EXPIRES, &self.cache.expires());
    }

    fn full_response(&self, with_body: bool) -> ResourceResponse {
        let mut response = ResourceResponse::new(StatusCode::OK);
        response.set_header(CONTENT_TYPE, self.record.content_type());
        response.set_header(CONTENT_LENGTH, &self.record.size().to_string());
        if let Some(lmh) = self.record.last_modified_header() {
            response.set_header(LAST_MODIFIED, lmh);
        }
        self.set_cache_headers(&mut response);
        if with_body {
            response.set_body(self.record.data().clone());
        }
        response
    }
}

impl Resource for FileResource {
    fn name(&self) -> &str {
        &self.name
    }

    fn get(&self) -> ResourceResponse {
        let conditional = self.request.conditional();
        match cache::evaluate(&conditional, &self.record.validators()) {
            ConditionalOutcome::NotModified => {
                let mut response = ResourceResponse::new(StatusCode::NOT_MODIFIED);
                self.set_cache_headers(&mut response);
                response
            }
            ConditionalOutcome::Full => self.full_response(true),
        }
    }

    fn head(&self) -> ResourceResponse {
        self.full_response(false)
    }

    fn publish_traverse(&self, name: &str) -> Result<Box<dyn Resource>, ResourceError> {
        Err(ResourceError::not_found(name))
    }
}

/// Publishes one file under a fixed name
pub struct FileResourceFactory {
    name: String,
    record: Arc<FileRecord>,
    checker: Arc<NamesChecker>,
    cache: CacheControl,
}

impl FileResourceFactory {
    /// Read the file now; failures are fatal for this resource only
    pub fn new(
        path: impl AsRef<Path>,
        checker: Arc<NamesChecker>,
        name: &str,
        policy: Option<&dyn ETagPolicy>,
    ) -> Result<Self, ResourceError> {
        let record = FileRecord::open(path, policy)?;
        Ok(Self::from_record(record, checker, name))
    }

    pub fn from_record(record: FileRecord, checker: Arc<NamesChecker>, name: &str) -> Self {
        Self {
            name: name.to_string(),
            record: Arc::new(record),
            checker,
            cache: CacheControl::default(),
        }
    }

    #[must_use]
    pub fn with_cache_control(mut self, cache: CacheControl) -> Self {
        self.cache = cache;
        self
    }

    /// The shared record every request is answered from
    pub const fn record(&self) -> &Arc<FileRecord> {
        &self.record
    }
}

impl ResourceFactory for FileResourceFactory {
    fn name(&self) -> &str {
        &self.name
    }

    fn create(&self, request: ResourceRequest) -> Checked {
        let resource = FileResource::new(
            self.name.clone(),
            Arc::clone(&self.record),
            request,
            self.cache,
        );
        Checked::new(Box::new(resource), Arc::clone(&self.checker))
    }
}
