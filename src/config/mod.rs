//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! devserve.toml (optional)
//!     → loader.rs (parse & deserialize, TOML table order preserved)
//!     → CLI overrides (main.rs)
//!     → validation.rs (semantic checks)
//!     → ServerConfig (validated, immutable)
//!     → rule sets compiled once by the routing layer
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no hot reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Template rule values are resolved into `RouteAction` at load time

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, read_config, ConfigError};
pub use schema::{ObservabilityConfig, RouteAction, ServerConfig, WatchConfig};
pub use validation::{validate_config, ValidationError};
