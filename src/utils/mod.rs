//! Utility functions used across the application.
//!
//! - [`token_generator`] - Opaque identity token generation
//! - [`client_ip`] - Client IP extraction from HTTP headers
//! - [`user_agent`] - User-Agent classification

pub mod client_ip;
pub mod token_generator;
pub mod user_agent;
