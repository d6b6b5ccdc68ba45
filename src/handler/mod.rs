//! Request handler module
//!
//! Routes requests into the `@@` resource namespace and the icon views.

pub mod router;

// Re-export main entry point
pub use router::{dispatch, handle_request, match_route, Route};
