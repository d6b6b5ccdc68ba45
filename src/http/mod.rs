//! HTTP protocol layer module
//!
//! Protocol-level building blocks shared by the resources and the request
//! handler: dates, cache validators, content types, negotiation and
//! response builders.

pub mod cache;
pub mod date;
pub mod mime;
pub mod negotiation;
pub mod response;

// Re-export commonly used types
pub use response::{
    build_404_response, build_405_response, build_500_response, build_html_response, build_options_response,
    from_resource,
};
