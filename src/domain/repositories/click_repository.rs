//! Repository trait for the append-only click event store.

use crate::domain::entities::{Click, Enrichment, NewClick};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for click events.
///
/// Clicks are insert-only from the redirect path. The enrichment worker is
/// the only writer allowed to touch an existing row, and only its
/// enrichment columns.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgClickRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
///
/// # Examples
///
/// See integration tests: `tests/repository_click.rs`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClickRepository: Send + Sync {
    /// Records a new click event.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Database`] if the insert fails, including when the
    /// referenced link does not exist.
    async fn record_click(&self, new_click: NewClick) -> Result<Click, AppError>;

    /// Attaches enrichment fields to a recorded click.
    ///
    /// Returns `Ok(false)` if no click with `click_id` exists.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Database`] on database errors.
    async fn apply_enrichment(&self, click_id: i64, enrichment: Enrichment)
    -> Result<bool, AppError>;

    /// Lists the most recent clicks for a link, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Database`] on database errors.
    async fn list_recent(&self, link_id: i64, limit: i64) -> Result<Vec<Click>, AppError>;
}
