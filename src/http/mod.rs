//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, proxy handler)
//!     → request.rs (request ID)
//!     → routing (method gate, prefix lookup)
//!     → security::headers (strip identifying headers)
//!     → forward.rs (upstream call, streamed bodies)
//!     → security::cors (decorate or reject)
//!     → Send to client
//! ```

pub mod forward;
pub mod request;
pub mod server;

pub use forward::{ForwardError, Forwarder, OutboundRequest};
pub use request::X_REQUEST_ID;
pub use server::{AppState, HttpServer};
