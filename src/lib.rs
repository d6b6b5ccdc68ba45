//! Browser resource server
//!
//! Publishes files, language-negotiated file sets and directory trees under
//! the `@@` namespace with HTTP cache validation.

pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod resource;
pub mod server;
