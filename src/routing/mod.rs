//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path, query)
//!     → router.rs (method gate, prefix lookup)
//!     → path.rs (split prefix from remainder)
//!     → Return: Target (upstream URL) or RouteRejection
//!
//! Route Compilation (at startup):
//!     [upstreams] prefix → origin
//!     → Freeze as immutable Router
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Pure function of (method, path, query, prefix map)
//! - Deterministic: same input always resolves to the same upstream

pub mod path;
pub mod router;

pub use router::{RouteRejection, Router, Target, PROXIED_METHODS};
