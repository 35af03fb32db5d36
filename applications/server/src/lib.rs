//! Centrum Heights Lead Server Library
//!
//! Lead intake API with email notifications and a login-gated brochure.
//!
//! This library exposes the core components for testing purposes.

pub mod api;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

// Re-export commonly used types for convenience
pub use config::ServerConfig;
pub use error::{Result, ServerError};
pub use routes::create_router;
pub use services::{AuthService, LeadService, Notifier};
pub use state::AppState;
