//! Short link resolution service.

use std::sync::Arc;

use axum::http::HeaderValue;
use url::Url;

use crate::domain::entities::Link;
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

/// Longest short code accepted for lookup.
const MAX_CODE_LENGTH: usize = 64;

/// Message returned to clients for unknown short codes.
pub const LINK_NOT_FOUND: &str = "Link not found";

/// Service resolving short codes to their links.
///
/// Performs exactly one lookup by the unique code. No fuzzy matching and no
/// case folding.
pub struct LinkService {
    repository: Arc<dyn LinkRepository>,
}

impl LinkService {
    /// Creates a new link service.
    pub fn new(repository: Arc<dyn LinkRepository>) -> Self {
        Self { repository }
    }

    /// Resolves a short code to its link.
    ///
    /// Codes outside the short-code alphabet (`[A-Za-z0-9_-]`, 1-64 chars)
    /// can never match and are rejected without touching the store.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link matches the code.
    /// Returns [`AppError::Internal`] if the stored destination is not an
    /// absolute http(s) URL.
    /// Returns [`AppError::Database`] on database errors.
    pub async fn resolve(&self, code: &str) -> Result<Link, AppError> {
        if !is_valid_code(code) {
            return Err(AppError::not_found(LINK_NOT_FOUND));
        }

        let link = self
            .repository
            .find_by_code(code)
            .await?
            .ok_or_else(|| AppError::not_found(LINK_NOT_FOUND))?;

        validate_destination(&link.destination_url)?;

        Ok(link)
    }
}

fn is_valid_code(code: &str) -> bool {
    !code.is_empty()
        && code.len() <= MAX_CODE_LENGTH
        && code
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn validate_destination(destination: &str) -> Result<(), AppError> {
    // Url::parse strips tabs and newlines, so the raw string must also be a
    // usable Location value before any click is recorded.
    HeaderValue::from_str(destination)
        .map_err(|_| AppError::internal("Stored destination is not a valid Location header"))?;

    let url = Url::parse(destination)
        .map_err(|e| AppError::internal(format!("Stored destination is invalid: {e}")))?;

    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(AppError::internal(format!(
            "Stored destination has unsupported scheme: {scheme}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockLinkRepository;
    use chrono::Utc;

    fn create_test_link(code: &str, url: &str) -> Link {
        Link::new(1, code.to_string(), url.to_string(), Utc::now())
    }

    #[tokio::test]
    async fn test_resolve_found() {
        let mut mock_repo = MockLinkRepository::new();
        mock_repo
            .expect_find_by_code()
            .withf(|code| code == "abc123")
            .times(1)
            .returning(|_| Ok(Some(create_test_link("abc123", "https://dest.example/page"))));

        let service = LinkService::new(Arc::new(mock_repo));
        let link = service.resolve("abc123").await.unwrap();

        assert_eq!(link.destination_url, "https://dest.example/page");
    }

    #[tokio::test]
    async fn test_resolve_not_found() {
        let mut mock_repo = MockLinkRepository::new();
        mock_repo
            .expect_find_by_code()
            .times(1)
            .returning(|_| Ok(None));

        let service = LinkService::new(Arc::new(mock_repo));
        let result = service.resolve("missing").await;

        assert!(matches!(result, Err(AppError::NotFound(ref m)) if m == LINK_NOT_FOUND));
    }

    #[tokio::test]
    async fn test_resolve_is_case_sensitive() {
        let mut mock_repo = MockLinkRepository::new();
        mock_repo
            .expect_find_by_code()
            .withf(|code| code == "ABC123")
            .times(1)
            .returning(|_| Ok(None));

        let service = LinkService::new(Arc::new(mock_repo));

        assert!(service.resolve("ABC123").await.is_err());
    }

    #[tokio::test]
    async fn test_resolve_invalid_code_skips_lookup() {
        let mut mock_repo = MockLinkRepository::new();
        mock_repo.expect_find_by_code().times(0);

        let service = LinkService::new(Arc::new(mock_repo));

        for code in ["", "has space", "dot.ted", "slash/ed", &"a".repeat(65)] {
            let result = service.resolve(code).await;
            assert!(matches!(result, Err(AppError::NotFound(_))), "code: {code}");
        }
    }

    #[tokio::test]
    async fn test_resolve_rejects_bad_destination() {
        let mut mock_repo = MockLinkRepository::new();
        mock_repo
            .expect_find_by_code()
            .returning(|code| Ok(Some(create_test_link(code, "javascript:alert(1)"))));

        let service = LinkService::new(Arc::new(mock_repo));
        let result = service.resolve("evil").await;

        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[tokio::test]
    async fn test_resolve_rejects_control_characters() {
        let mut mock_repo = MockLinkRepository::new();
        mock_repo
            .expect_find_by_code()
            .returning(|code| Ok(Some(create_test_link(code, "https://dest.example/\npage"))));

        let service = LinkService::new(Arc::new(mock_repo));
        let result = service.resolve("broken").await;

        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[test]
    fn test_validate_destination_allows_non_ascii() {
        assert!(validate_destination("https://dest.example/café").is_ok());
        assert!(validate_destination("https://dest.example/\r\npage").is_err());
    }

    #[tokio::test]
    async fn test_resolve_propagates_store_error() {
        let mut mock_repo = MockLinkRepository::new();
        mock_repo
            .expect_find_by_code()
            .returning(|_| Err(AppError::internal("connection refused")));

        let service = LinkService::new(Arc::new(mock_repo));
        let result = service.resolve("abc123").await;

        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[test]
    fn test_is_valid_code() {
        assert!(is_valid_code("abc123"));
        assert!(is_valid_code("my-link_2024"));
        assert!(!is_valid_code(""));
        assert!(!is_valid_code("ünïcode"));
    }
}
