//! HTTP protocol layer module
//!
//! Response builders shared by the dispatcher and the endpoint handlers,
//! decoupled from any specific route.

pub mod response;

// Re-export commonly used types
pub use response::{
    build_400_response, build_404_response, build_405_response, build_413_response,
    build_500_response, build_empty_response, build_text_response, HttpResponse,
};
