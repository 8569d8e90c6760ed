//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Outbound request:
//!     → headers.rs (strip client-identifying headers)
//!
//! Response to client:
//!     → cors.rs (allow-list check, Access-Control-* headers)
//! ```
//!
//! # Design Decisions
//! - Fail closed: a disallowed origin always sees 403
//! - No client identity ever reaches the upstream

pub mod cors;
pub mod headers;

pub use cors::CorsPolicy;
pub use headers::HeaderSanitizer;
