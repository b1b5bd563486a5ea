//! Infrastructure layer for external integrations.
//!
//! # Modules
//!
//! - [`persistence`] - PostgreSQL repository implementations
//! - [`geoip`] - MaxMind GeoIP lookups for click enrichment

pub mod geoip;
pub mod persistence;
