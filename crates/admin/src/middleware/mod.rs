//! HTTP middleware and extractors for admin.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request tracing)
//! 3. Session layer (tower-sessions with `PostgreSQL` store)
//! 4. Extractors on catalog handlers: [`RequireAdmin`], [`NoDirectAccess`]

pub mod auth;
pub mod session;

pub use auth::{AdminAuthRejection, NoDirectAccess, RequireAdmin};
pub use session::{create_session_layer, create_session_store};
