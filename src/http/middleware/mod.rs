//! Request middleware.
//!
//! Applied innermost first: `guard` runs inside the scope `tenant` installs.

pub mod guard;
pub mod tenant;

pub use guard::route_guard_middleware;
pub use tenant::tenant_context_middleware;
