//! HTTP layer for request/response handling.
//!
//! Translates requests into domain operations and shapes the redirect
//! response, including identity cookies.
//!
//! # Modules
//!
//! - [`dto`] - Response bodies
//! - [`handlers`] - HTTP request handlers
//! - [`middleware`] - Request tracing
//! - [`responder`] - 307 redirect with `Set-Cookie` headers

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod responder;
