//! Domain layer containing business entities and logic.
//!
//! Defines entities, repository interfaces, and the enrichment pipeline
//! independent of infrastructure concerns.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//! - [`enrichment_job`] - Enrichment job model and enricher contract
//! - [`enrichment_worker`] - Asynchronous enrichment worker
//!
//! # Click Processing Flow
//!
//! 1. HTTP handler records the click synchronously
//! 2. [`enrichment_job::EnrichmentJob`] is sent to a bounded queue
//! 3. [`enrichment_worker::run_enrichment_worker`] derives geo/device fields
//! 4. Fields are persisted via [`repositories::ClickRepository`]

pub mod enrichment_job;
pub mod enrichment_worker;
pub mod entities;
pub mod repositories;
