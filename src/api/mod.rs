// API module
// Demonstration endpoints: payload types, JSON response helper and handlers

mod compute;
mod files;
mod handlers;
mod response;
mod types;

pub use compute::compute;
pub use files::list_files;
pub use handlers::{greet, health, system_info};
