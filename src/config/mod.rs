//! Configuration subsystem.
//!
//! # Data Flow
//! ```text
//! tenancy.toml
//!     → loader.rs (TOML → TenancyConfig)
//!     → validation.rs (collects every semantic error)
//!     → TenantPipeline::from_config (classifier, resolver, plan catalog)
//!
//! File change:
//!     watcher.rs → loader.rs → validation.rs → server swaps pipeline
//! ```
//!
//! # Design Decisions
//! - Every field has a default, so an empty file is a valid config
//! - A rejected reload leaves the running pipeline untouched

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    LimitRequirement, ObservabilityConfig, ResolutionConfig, RouteConfig, TenancyConfig,
};
pub use validation::ValidationError;
pub use watcher::ConfigWatcher;
