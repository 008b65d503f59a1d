//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Resolver, validator, enforcer, middleware produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured fields on every admission decision (tenant id, source, reason)
//! - Request ID flows through all request spans
//! - Metrics are cheap (no-ops when no recorder is installed)

pub mod logging;
pub mod metrics;
