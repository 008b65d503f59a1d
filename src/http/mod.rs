//! HTTP adapter subsystem.
//!
//! # Data Flow
//! ```text
//! Request
//!     → SetRequestId → Trace → PropagateRequestId → Timeout
//!     → middleware/tenant.rs (describe, admit, enter scope)
//!     → middleware/guard.rs (route markers against the ambient tenant)
//!     → host handlers (read context via accessors or CurrentTenant)
//! ```
//!
//! Rejections are rendered by response.rs.

pub mod handlers;
pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use handlers::demo_routes;
pub use request::{describe_request, CurrentTenant};
pub use server::{build_app, AppState, HttpServer};
