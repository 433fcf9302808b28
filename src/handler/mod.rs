//! Request handler module
//!
//! Responsible for request dispatch and the cross-origin policy applied to
//! every registered route.

pub mod cors;
pub mod router;

// Re-export main entry point
pub use router::handle_request;
