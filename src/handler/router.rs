//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: method validation, matching the
//! `@@` namespaces and dispatching to resources or icon views.

use crate::config::AppState;
use crate::error::ResourceError;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use crate::resource::url::RESOURCE_PREFIX;
use crate::resource::{Checked, ResourceRequest};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{REFERER, USER_AGENT};
use hyper::{HeaderMap, Method, Request, Response, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Namespace of published resources
const RESOURCE_NAMESPACE: &str = "/@@/";
/// Namespace of icon views
const ICON_NAMESPACE: &str = "/@@icon/";

/// A request path resolved to one of the published namespaces
#[derive(Debug, PartialEq, Eq)]
pub enum Route<'a> {
    /// A resource name followed by the segments to traverse
    Resource { name: &'a str, segments: Vec<&'a str> },
    Icon(&'a str),
}

/// Match a request path against the published namespaces
///
/// `/@@/<name>/<sub>...` and `/++resource++<name>/<sub>...` address
/// resources; `/@@icon/<name>` addresses an icon view. Empty segments are
/// ignored so `/@@/dir//a.css` reaches `a.css`.
pub fn match_route(path: &str) -> Option<Route<'_>> {
    if let Some(name) = path.strip_prefix(ICON_NAMESPACE) {
        return (!name.is_empty() && !name.contains('/')).then_some(Route::Icon(name));
    }

    let rest = path
        .strip_prefix(RESOURCE_NAMESPACE)
        .or_else(|| path.strip_prefix('/').and_then(|p| p.strip_prefix(RESOURCE_PREFIX)))?;

    let mut segments = rest.split('/').filter(|s| !s.is_empty());
    let name = segments.next()?;
    Some(Route::Resource {
        name,
        segments: segments.collect(),
    })
}

/// Main entry point for HTTP request handling
pub async fn handle_request(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let start = Instant::now();
    let response = dispatch(req.method(), req.uri().path(), req.headers(), &state);

    if state.access_log {
        let mut entry = AccessLogEntry::new(
            peer_addr.ip().to_string(),
            req.method().to_string(),
            req.uri().path().to_string(),
        );
        entry.query = req.uri().query().map(ToString::to_string);
        entry.http_version = version_label(req.version()).to_string();
        entry.status = response.status().as_u16();
        entry.body_bytes = hyper::body::Body::size_hint(response.body())
            .exact()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(0);
        entry.referer = header_string(req.headers(), REFERER);
        entry.user_agent = header_string(req.headers(), USER_AGENT);
        entry.request_time_us = u64::try_from(start.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Produce the response for one request without touching the network
pub fn dispatch(
    method: &Method,
    path: &str,
    headers: &HeaderMap,
    state: &AppState,
) -> Response<Full<Bytes>> {
    if let Some(resp) = check_http_method(method) {
        return resp;
    }

    match match_route(path) {
        Some(Route::Resource { name, segments }) => {
            let request = ResourceRequest::new(method.clone(), headers.clone());
            serve_resource(name, &segments, request, state)
        }
        Some(Route::Icon(name)) => serve_icon(name, *method == Method::HEAD, state),
        None => http::build_404_response(),
    }
}

/// Check HTTP method and return appropriate response for non-GET/HEAD methods
fn check_http_method(method: &Method) -> Option<Response<Full<Bytes>>> {
    match method {
        &Method::GET | &Method::HEAD => None,
        &Method::OPTIONS => Some(http::build_options_response()),
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            Some(http::build_405_response())
        }
    }
}

/// Look up, traverse and invoke a published resource
fn serve_resource(
    name: &str,
    segments: &[&str],
    request: ResourceRequest,
    state: &AppState,
) -> Response<Full<Bytes>> {
    let Some(factory) = state.registry.get(name) else {
        return http::build_404_response();
    };

    let operation = request.method().as_str().to_string();
    let result = segments
        .iter()
        .try_fold(factory.create(request), |resource, segment| resource.traverse(segment))
        .and_then(|resource: Checked| resource.invoke(&operation));

    match result {
        Ok(answer) => http::from_resource(answer),
        Err(err) => error_response(&err),
    }
}

fn serve_icon(name: &str, is_head: bool, state: &AppState) -> Response<Full<Bytes>> {
    state.icons.get(name).map_or_else(http::build_404_response, |factory| {
        http::build_html_response(factory.create().render(&state.site), is_head)
    })
}

fn error_response(err: &ResourceError) -> Response<Full<Bytes>> {
    match err {
        ResourceError::NotFound { .. } => http::build_404_response(),
        ResourceError::Forbidden { .. } => {
            logger::log_warning(&err.to_string());
            http::build_405_response()
        }
        ResourceError::InvalidLanguage { .. }
        | ResourceError::UnknownIconResource { .. }
        | ResourceError::Io { .. } => {
            logger::log_error(&err.to_string());
            http::build_500_response()
        }
    }
}

fn header_string(headers: &HeaderMap, name: hyper::header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}
