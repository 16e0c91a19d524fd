//! Middleware components for HTTP request processing.
//!
//! Cross-cutting concerns layered onto the router: early request validation and
//! security/caching headers on responses.

pub mod security_headers;
pub mod validation;
