// crates/backend-lib/src/middleware/mod.rs

//! Middleware for the `KodBank` HTTP server.

pub mod diagnostics;
pub mod session;

pub use diagnostics::attach_diagnostics;
pub use session::require_session;
