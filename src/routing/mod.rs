//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming GET/HEAD request target (path + query)
//!     → router.rs (priority: template → rewrite → default)
//!     → matcher.rs (anchored regex lookup, first match wins)
//!     → Return: rendered body, or effective target for the static layer
//!
//! Rule Compilation (at startup):
//!     template_rules / rewrite_rules (ordered maps)
//!     → Anchor each pattern
//!     → Compile regexes, keep declaration order
//!     → Freeze as immutable RequestRouter
//! ```
//!
//! # Design Decisions
//! - Rules compiled at startup, immutable at runtime
//! - Deterministic: same input always yields the same outcome
//! - First match wins (declaration order)

pub mod matcher;
pub mod router;

pub use matcher::{CompiledRule, RuleMatch, RuleSet};
pub use router::{RequestRouter, RouteOutcome};
