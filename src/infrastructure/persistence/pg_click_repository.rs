//! PostgreSQL implementation of click repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{Click, Enrichment, NewClick, RequestFingerprint};
use crate::domain::repositories::ClickRepository;
use crate::error::AppError;

#[derive(sqlx::FromRow)]
struct ClickRow {
    id: i64,
    link_id: i64,
    visitor_id: String,
    session_id: String,
    clicked_at: DateTime<Utc>,
    ip: Option<String>,
    user_agent: Option<String>,
    referer: Option<String>,
    accept_language: Option<String>,
    country_code: Option<String>,
    region: Option<String>,
    city: Option<String>,
    browser: Option<String>,
    os: Option<String>,
    device_category: Option<String>,
    is_bot: Option<bool>,
    enriched_at: Option<DateTime<Utc>>,
}

impl From<ClickRow> for Click {
    fn from(r: ClickRow) -> Self {
        let enrichment = r.enriched_at.map(|_| Enrichment {
            country_code: r.country_code,
            region: r.region,
            city: r.city,
            browser: r.browser,
            os: r.os,
            device_category: r.device_category,
            is_bot: r.is_bot.unwrap_or(false),
        });

        Click {
            id: r.id,
            link_id: r.link_id,
            visitor_id: r.visitor_id,
            session_id: r.session_id,
            clicked_at: r.clicked_at,
            fingerprint: RequestFingerprint {
                ip: r.ip,
                user_agent: r.user_agent,
                referer: r.referer,
                accept_language: r.accept_language,
            },
            enrichment,
            enriched_at: r.enriched_at,
        }
    }
}

/// PostgreSQL repository for the append-only click event table.
pub struct PgClickRepository {
    pool: Arc<PgPool>,
}

impl PgClickRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClickRepository for PgClickRepository {
    async fn record_click(&self, new_click: NewClick) -> Result<Click, AppError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO link_clicks
                (link_id, visitor_id, session_id, clicked_at, ip, user_agent, referer, accept_language)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(new_click.link_id)
        .bind(&new_click.visitor_id)
        .bind(&new_click.session_id)
        .bind(new_click.clicked_at)
        .bind(&new_click.fingerprint.ip)
        .bind(&new_click.fingerprint.user_agent)
        .bind(&new_click.fingerprint.referer)
        .bind(&new_click.fingerprint.accept_language)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(Click::from_new(id, new_click))
    }

    async fn apply_enrichment(
        &self,
        click_id: i64,
        enrichment: Enrichment,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE link_clicks
            SET country_code = $2,
                region = $3,
                city = $4,
                browser = $5,
                os = $6,
                device_category = $7,
                is_bot = $8,
                enriched_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(click_id)
        .bind(enrichment.country_code)
        .bind(enrichment.region)
        .bind(enrichment.city)
        .bind(enrichment.browser)
        .bind(enrichment.os)
        .bind(enrichment.device_category)
        .bind(enrichment.is_bot)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_recent(&self, link_id: i64, limit: i64) -> Result<Vec<Click>, AppError> {
        let rows = sqlx::query_as::<_, ClickRow>(
            r#"
            SELECT id, link_id, visitor_id, session_id, clicked_at,
                   ip, user_agent, referer, accept_language,
                   country_code, region, city, browser, os, device_category, is_bot,
                   enriched_at
            FROM link_clicks
            WHERE link_id = $1
            ORDER BY clicked_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(link_id)
        .bind(limit)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Click::from).collect())
    }
}
