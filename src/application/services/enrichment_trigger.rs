//! Fire-and-forget dispatch of enrichment jobs.

use tokio::sync::mpsc::{self, error::TrySendError};

use crate::domain::enrichment_job::EnrichmentJob;
use crate::error::TrackingError;

/// Hands enrichment jobs to the background worker without waiting.
#[cfg_attr(test, mockall::automock)]
pub trait EnrichmentTrigger: Send + Sync {
    /// Enqueues a job and returns immediately.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingError::EnrichmentDispatch`] if the queue is full or
    /// closed. Callers ignore it.
    fn dispatch(&self, job: EnrichmentJob) -> Result<(), TrackingError>;

    /// Returns true if the consuming worker has stopped.
    fn is_closed(&self) -> bool;

    /// Free slots in the queue.
    fn capacity(&self) -> usize;
}

/// [`EnrichmentTrigger`] backed by a bounded tokio channel.
///
/// Uses `try_send`, so a full queue drops the job instead of holding the
/// request open.
pub struct QueuedEnrichmentTrigger {
    sender: mpsc::Sender<EnrichmentJob>,
}

impl QueuedEnrichmentTrigger {
    pub fn new(sender: mpsc::Sender<EnrichmentJob>) -> Self {
        Self { sender }
    }
}

impl EnrichmentTrigger for QueuedEnrichmentTrigger {
    fn dispatch(&self, job: EnrichmentJob) -> Result<(), TrackingError> {
        self.sender.try_send(job).map_err(|e| {
            metrics::counter!("clicktrail_enrichment_dropped_total").increment(1);
            match e {
                TrySendError::Full(job) => TrackingError::EnrichmentDispatch(format!(
                    "queue full, dropped job for click {}",
                    job.click_id
                )),
                TrySendError::Closed(job) => TrackingError::EnrichmentDispatch(format!(
                    "queue closed, dropped job for click {}",
                    job.click_id
                )),
            }
        })
    }

    fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    fn capacity(&self) -> usize {
        self.sender.capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::RequestFingerprint;

    fn job(click_id: i64) -> EnrichmentJob {
        EnrichmentJob::new(click_id, RequestFingerprint::default())
    }

    #[tokio::test]
    async fn test_dispatch_enqueues() {
        let (tx, mut rx) = mpsc::channel(4);
        let trigger = QueuedEnrichmentTrigger::new(tx);

        trigger.dispatch(job(1)).unwrap();

        assert_eq!(rx.recv().await.unwrap().click_id, 1);
    }

    #[test]
    fn test_dispatch_full_queue_does_not_block() {
        let (tx, _rx) = mpsc::channel(1);
        let trigger = QueuedEnrichmentTrigger::new(tx);

        trigger.dispatch(job(1)).unwrap();
        let result = trigger.dispatch(job(2));

        assert!(matches!(result, Err(TrackingError::EnrichmentDispatch(_))));
        assert_eq!(trigger.capacity(), 0);
    }

    #[test]
    fn test_dispatch_closed_queue() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let trigger = QueuedEnrichmentTrigger::new(tx);

        assert!(trigger.is_closed());
        assert!(matches!(
            trigger.dispatch(job(1)),
            Err(TrackingError::EnrichmentDispatch(_))
        ));
    }
}
