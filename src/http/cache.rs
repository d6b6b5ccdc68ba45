//! HTTP cache control module
//!
//! Provides `ETag` policies, cache header values and conditional request
//! evaluation (`If-Modified-Since` / `If-None-Match`).

use std::sync::Arc;

use super::date;

/// Default freshness lifetime for published resources (one day)
pub const DEFAULT_MAX_AGE: u32 = 86_400;

/// Computes the opaque validator for a resource's content
///
/// Returning `None` means "no `ETag` for this resource"; callers treat it
/// exactly like having no policy at all.
pub trait ETagPolicy: Send + Sync {
    fn compute(&self, last_modified: Option<i64>, content: &[u8]) -> Option<String>;
}

impl<F> ETagPolicy for F
where
    F: Fn(Option<i64>, &[u8]) -> Option<String> + Send + Sync,
{
    fn compute(&self, last_modified: Option<i64>, content: &[u8]) -> Option<String> {
        self(last_modified, content)
    }
}

/// Shared, optional policy handed to resource factories
pub type SharedETagPolicy = Arc<dyn ETagPolicy>;

/// Default policy: `"<mtime>-<size>"`
///
/// # Examples
/// ```
/// use browser_resource::http::cache::{ETagPolicy, FileETag};
/// assert_eq!(FileETag.compute(Some(1234), b"abc"), Some("1234-3".to_string()));
/// assert_eq!(FileETag.compute(None, b"abc"), None);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct FileETag;

impl ETagPolicy for FileETag {
    fn compute(&self, last_modified: Option<i64>, content: &[u8]) -> Option<String> {
        last_modified.map(|mtime| format!("{mtime}-{}", content.len()))
    }
}

/// The policy used when configuration does not say otherwise
pub fn default_policy() -> Option<SharedETagPolicy> {
    Some(Arc::new(FileETag))
}

/// Wrap an opaque tag in double quotes for the `ETag` header
pub fn quote_etag(etag: &str) -> String {
    format!("\"{etag}\"")
}

/// `Cache-Control` / `Expires` settings for published resources
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheControl {
    pub max_age: u32,
}

impl CacheControl {
    pub const fn new(max_age: u32) -> Self {
        Self { max_age }
    }

    /// `Cache-Control` header value
    pub fn header_value(self) -> String {
        format!("public,max-age={}", self.max_age)
    }

    /// `Expires` header value, `max_age` seconds from now
    pub fn expires(self) -> String {
        date::expires_after(self.max_age)
    }
}

impl Default for CacheControl {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_AGE)
    }
}

/// Parse an `If-None-Match` header into the opaque tags it lists
///
/// Supports:
/// - Single `ETag`: `"abc123"`
/// - Multiple `ETags`: `"abc123", "def456"`
/// - Weak tags: `W/"abc123"`
/// - Wildcard: `*`
///
/// Unquoted garbage is skipped up to the next comma, so a malformed header
/// simply lists nothing.
pub fn parse_etags(header: &str) -> Vec<String> {
    let mut tags = Vec::new();
    let mut rest = header;

    loop {
        rest = rest.trim_start_matches(|c: char| c == ',' || c.is_whitespace());
        if rest.is_empty() {
            break;
        }

        let candidate = rest.strip_prefix("W/").unwrap_or(rest);
        if let Some(quoted) = candidate.strip_prefix('"') {
            if let Some(end) = quoted.find('"') {
                tags.push(quoted[..end].to_string());
                rest = &quoted[end + 1..];
                continue;
            }
            // Unterminated quote: nothing usable left
            break;
        }

        if let Some(after) = candidate.strip_prefix('*') {
            tags.push("*".to_string());
            rest = after;
            continue;
        }

        match rest.find(',') {
            Some(idx) => rest = &rest[idx..],
            None => break,
        }
    }

    tags
}

/// Conditional request headers, as sent by the client
#[derive(Debug, Clone, Copy, Default)]
pub struct Conditional<'a> {
    pub if_modified_since: Option<&'a str>,
    pub if_none_match: Option<&'a str>,
}

/// The server-side validators of a resource
#[derive(Debug, Clone, Copy, Default)]
pub struct Validators<'a> {
    pub last_modified: Option<i64>,
    pub etag: Option<&'a str>,
}

/// Result of evaluating a conditional GET
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionalOutcome {
    /// Send the full entity
    Full,
    /// Answer 304 with validators only
    NotModified,
}

/// Decide whether a GET may be answered with 304 Not Modified
///
/// Each present conditional header is checked on its own. The answer is
/// `NotModified` only when at least one is present and every present header
/// matches. A header the resource cannot validate (unparsable value, or no
/// mtime / no `ETag` on our side) counts as a mismatch.
///
/// `If-None-Match: *` matches any resource that has an `ETag`. Zope only
/// compares literal tags; the wildcard follows RFC 9110 instead.
pub fn evaluate(conditional: &Conditional<'_>, validators: &Validators<'_>) -> ConditionalOutcome {
    let mut can_return_304 = false;
    let mut all_checks_passed = true;

    if let Some(header) = conditional.if_modified_since {
        can_return_304 = true;
        all_checks_passed &= not_modified_since(header, validators.last_modified);
    }

    if let Some(header) = conditional.if_none_match {
        can_return_304 = true;
        all_checks_passed &= check_etag_match(header, validators.etag);
    }

    if can_return_304 && all_checks_passed {
        ConditionalOutcome::NotModified
    } else {
        ConditionalOutcome::Full
    }
}

/// `If-Modified-Since` matches when the file is not newer than the given date
fn not_modified_since(header: &str, last_modified: Option<i64>) -> bool {
    match (date::parse_http_date(header), last_modified) {
        (Some(since), Some(mtime)) => mtime <= since,
        _ => false,
    }
}

/// `If-None-Match` matches when our tag (or `*`) is listed
fn check_etag_match(header: &str, etag: Option<&str>) -> bool {
    etag.is_some_and(|etag| {
        parse_etags(header)
            .iter()
            .any(|tag| tag == etag || tag == "*")
    })
}
