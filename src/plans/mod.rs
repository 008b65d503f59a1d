//! Plan catalog and enforcement subsystem.
//!
//! # Data Flow
//! ```text
//! [plans.*] config tables (or built-in defaults)
//!     → catalog.rs (tier → limits + features, total over PlanType)
//!     → enforcer.rs (allow/deny a feature or a limit)
//!     → TenancyError::{QuotaExceeded, FeatureUnavailable} on denial
//! ```
//!
//! # Design Decisions
//! - The catalog is immutable once built; a reload builds a new one
//! - `-1` is the only unlimited sentinel
//! - Current usage is always supplied by the caller; the enforcer never counts
//! - No atomicity between reading usage and acting on the decision (soft limits)

pub mod catalog;
pub mod enforcer;
pub mod types;

pub use catalog::{PlanCatalog, PlanConfig};
pub use enforcer::{PlanEnforcer, PlanSubject};
pub use types::{LimitCheckResult, PlanType, UNLIMITED};
