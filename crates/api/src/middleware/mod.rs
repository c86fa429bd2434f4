//! HTTP middleware for the API.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. Panic catcher (500 plain text)
//! 3. `TraceLayer` (request span, latency and status)
//! 4. Request ID (honor or assign `x-request-id`)
//! 5. CORS
//!
//! Authentication is not a layer: gated handlers take a [`RequireUser`]
//! argument.

pub mod auth;
pub mod request_id;

pub use auth::RequireUser;
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
