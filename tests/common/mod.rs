#![allow(dead_code)]

use async_trait::async_trait;
use axum::{Router, extract::ConnectInfo, routing::get};
use chrono::{DateTime, Utc};
use clicktrail::api::handlers::{health_handler, redirect_handler};
use clicktrail::api::responder::RedirectResponder;
use clicktrail::application::services::{
    ClickService, IdentityService, LinkService, QueuedEnrichmentTrigger,
};
use clicktrail::domain::enrichment_job::EnrichmentJob;
use clicktrail::domain::entities::{Click, Enrichment, Link, NewClick};
use clicktrail::domain::repositories::{ClickRepository, LinkRepository};
use clicktrail::error::AppError;
use clicktrail::state::AppState;
use sqlx::PgPool;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tower::Layer;

pub const TEST_SECRET: &str = "test-identity-secret";

/// Link store kept in memory for HTTP tests.
#[derive(Default)]
pub struct InMemoryLinkRepository {
    links: Mutex<HashMap<String, Link>>,
    fail_lookups: AtomicBool,
}

impl InMemoryLinkRepository {
    pub fn with_link(code: &str, destination: &str) -> Self {
        let repo = Self::default();
        repo.insert(code, destination);
        repo
    }

    pub fn insert(&self, code: &str, destination: &str) -> i64 {
        let mut links = self.links.lock().unwrap();
        let id = links.len() as i64 + 1;
        links.insert(
            code.to_string(),
            Link::new(id, code.to_string(), destination.to_string(), Utc::now()),
        );
        id
    }

    pub fn get(&self, code: &str) -> Option<Link> {
        self.links.lock().unwrap().get(code).cloned()
    }

    pub fn fail_lookups(&self) {
        self.fail_lookups.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl LinkRepository for InMemoryLinkRepository {
    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError> {
        if self.fail_lookups.load(Ordering::SeqCst) {
            return Err(AppError::internal("connection refused"));
        }
        Ok(self.get(code))
    }

    async fn increment_click_count(
        &self,
        link_id: i64,
        clicked_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let mut links = self.links.lock().unwrap();
        let link = links
            .values_mut()
            .find(|l| l.id == link_id)
            .ok_or_else(|| AppError::not_found("Link not found"))?;

        link.click_count += 1;
        link.last_clicked_at = Some(match link.last_clicked_at {
            Some(last) if last > clicked_at => last,
            _ => clicked_at,
        });
        Ok(())
    }

    async fn count(&self) -> Result<i64, AppError> {
        if self.fail_lookups.load(Ordering::SeqCst) {
            return Err(AppError::internal("connection refused"));
        }
        Ok(self.links.lock().unwrap().len() as i64)
    }
}

/// Click event store kept in memory for HTTP tests.
#[derive(Default)]
pub struct InMemoryClickRepository {
    clicks: Mutex<Vec<Click>>,
    next_id: AtomicI64,
    fail_inserts: AtomicBool,
}

impl InMemoryClickRepository {
    pub fn all(&self) -> Vec<Click> {
        self.clicks.lock().unwrap().clone()
    }

    pub fn fail_inserts(&self) {
        self.fail_inserts.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl ClickRepository for InMemoryClickRepository {
    async fn record_click(&self, new_click: NewClick) -> Result<Click, AppError> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(AppError::internal("disk full"));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let click = Click::from_new(id, new_click);
        self.clicks.lock().unwrap().push(click.clone());
        Ok(click)
    }

    async fn apply_enrichment(&self, click_id: i64, enrichment: Enrichment) -> Result<bool, AppError> {
        let mut clicks = self.clicks.lock().unwrap();
        match clicks.iter_mut().find(|c| c.id == click_id) {
            Some(click) => {
                click.enrichment = Some(enrichment);
                click.enriched_at = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_recent(&self, link_id: i64, limit: i64) -> Result<Vec<Click>, AppError> {
        let mut clicks: Vec<Click> = self
            .clicks
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.link_id == link_id)
            .cloned()
            .collect();
        clicks.sort_by(|a, b| b.clicked_at.cmp(&a.clicked_at));
        clicks.truncate(limit.max(0) as usize);
        Ok(clicks)
    }
}

pub struct TestContext {
    pub state: AppState,
    pub links: Arc<InMemoryLinkRepository>,
    pub clicks: Arc<InMemoryClickRepository>,
    pub jobs: mpsc::Receiver<EnrichmentJob>,
}

pub fn create_test_state(links: InMemoryLinkRepository) -> TestContext {
    let links = Arc::new(links);
    let clicks = Arc::new(InMemoryClickRepository::default());
    let (tx, rx) = mpsc::channel(100);

    let identity_service = Arc::new(IdentityService::new(TEST_SECRET.to_string()));

    let state = AppState {
        identity_service: identity_service.clone(),
        link_service: Arc::new(LinkService::new(links.clone())),
        click_service: Arc::new(ClickService::new(clicks.clone(), links.clone())),
        enrichment_trigger: Arc::new(QueuedEnrichmentTrigger::new(tx)),
        responder: Arc::new(RedirectResponder::new(identity_service, false)),
        link_repository: links.clone(),
        behind_proxy: false,
    };

    TestContext {
        state,
        links,
        clicks,
        jobs: rx,
    }
}

/// Router with both public routes and a fixed peer address.
pub fn test_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/{code}", get(redirect_handler))
        .layer(MockConnectInfoLayer)
        .with_state(state)
}

#[derive(Clone)]
pub struct MockConnectInfoLayer;

impl<S> Layer<S> for MockConnectInfoLayer {
    type Service = MockConnectInfoService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MockConnectInfoService { inner }
    }
}

#[derive(Clone)]
pub struct MockConnectInfoService<S> {
    inner: S,
}

impl<S, B> tower::Service<axum::http::Request<B>> for MockConnectInfoService<S>
where
    S: tower::Service<axum::http::Request<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        let addr: SocketAddr = "127.0.0.1:12345".parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        self.inner.call(req)
    }
}

pub async fn insert_link(pool: &PgPool, code: &str, destination: &str) -> i64 {
    sqlx::query_scalar("INSERT INTO links (code, destination_url) VALUES ($1, $2) RETURNING id")
        .bind(code)
        .bind(destination)
        .fetch_one(pool)
        .await
        .unwrap()
}
