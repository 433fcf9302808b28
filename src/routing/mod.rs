//! Routing module
//!
//! Defines the handler contract and the static route table the dispatcher
//! resolves paths against.
//! - `table`: exact-match path → cross-origin-wrapped handler

pub mod table;

pub use table::{handler_fn, BodyMode, Handler, HandlerFuture, RouteTable};
