//! Core domain entities representing the attribution data model.
//!
//! Entities are plain data structures without persistence concerns.
//!
//! # Entity Types
//!
//! - [`Link`] - A short link and its campaign metadata
//! - [`Click`] - A recorded redirect with its request fingerprint
//! - [`IdentityToken`] - Visitor or session identifier carried in a cookie
//!
//! Creation inputs use separate structs (`NewClick`), mirroring the rows
//! the persistence layer inserts.

pub mod click;
pub mod identity;
pub mod link;

pub use click::{Click, Enrichment, NewClick, RequestFingerprint};
pub use identity::{IdentityKind, IdentityToken, ResolvedIdentity};
pub use link::{Link, UtmParams};
