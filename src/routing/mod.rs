//! Route classification subsystem.
//!
//! # Data Flow
//! ```text
//! Request path
//!     → router.rs (route table lookup for declarative markers)
//!     → matcher.rs (segment-aware prefix matching)
//!     → RouteClass: TenantFree | Public | Protected
//!     → RouteRequirements: required feature / limit for the guard
//!
//! Route Compilation (at startup and on reload):
//!     RouteConfig[]
//!     → Sort by priority
//!     → Compile matchers
//!     → Freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Markers are plain data; enforcement lives in the guard middleware
//! - Deterministic: same path always yields the same class and markers
//! - First match wins (ordered by priority)

pub mod matcher;
pub mod router;

pub use matcher::PathPrefixMatcher;
pub use router::{LimitRequirement, PathClassifier, RouteClass, RouteRequirements, RouteTable};
