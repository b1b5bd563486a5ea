//! Background worker that enriches recorded clicks.

use std::sync::Arc;

use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::domain::enrichment_job::{ClickEnricher, EnrichmentJob};
use crate::domain::repositories::ClickRepository;

/// Consumes enrichment jobs until the queue is closed.
///
/// At most `concurrency` jobs run at once. Every failure is logged and
/// dropped; the visitor has already been redirected by the time a job runs.
/// When the sender side is dropped the worker drains in-flight jobs and
/// returns.
pub async fn run_enrichment_worker(
    mut rx: mpsc::Receiver<EnrichmentJob>,
    enricher: Arc<dyn ClickEnricher>,
    clicks: Arc<dyn ClickRepository>,
    concurrency: usize,
) {
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut in_flight = JoinSet::new();

    while let Some(job) = rx.recv().await {
        while let Some(result) = in_flight.try_join_next() {
            if let Err(e) = result {
                error!("Enrichment task panicked: {}", e);
            }
        }

        let Ok(permit) = semaphore.clone().acquire_owned().await else {
            break;
        };

        let enricher = enricher.clone();
        let clicks = clicks.clone();
        in_flight.spawn(async move {
            let _permit = permit;
            process_job(job, enricher.as_ref(), clicks.as_ref()).await;
        });
    }

    while let Some(result) = in_flight.join_next().await {
        if let Err(e) = result {
            error!("Enrichment task panicked: {}", e);
        }
    }

    info!("Enrichment worker stopped");
}

async fn process_job(job: EnrichmentJob, enricher: &dyn ClickEnricher, clicks: &dyn ClickRepository) {
    let enrichment = enricher.enrich(&job.fingerprint);

    match clicks.apply_enrichment(job.click_id, enrichment).await {
        Ok(true) => {
            metrics::counter!("clicktrail_enrichment_applied_total").increment(1);
            debug!(click_id = job.click_id, "Click enriched");
        }
        Ok(false) => {
            warn!(click_id = job.click_id, "Click vanished before enrichment");
        }
        Err(e) => {
            metrics::counter!("clicktrail_enrichment_failed_total").increment(1);
            error!(click_id = job.click_id, "Failed to store enrichment: {}", e);
        }
    }
}
