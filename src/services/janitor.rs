//! Periodic eviction of stale correlation entries.
//!
//! Listings written long ago keep their "more" buttons, but nobody presses
//! them after a while; the janitor drops entries older than the configured
//! TTL so the table does not grow forever.

use chrono::{Duration, Utc};
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::error::StoreError;
use crate::services::correlation::CorrelationStore;

/// Every day at 04:00 UTC.
const EVICTION_SCHEDULE: &str = "0 0 4 * * *";

pub struct JanitorService {
    correlations: CorrelationStore,
    ttl: Duration,
    scheduler: JobScheduler,
}

impl JanitorService {
    pub async fn new(
        correlations: CorrelationStore,
        ttl_days: i64,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let scheduler = JobScheduler::new().await?;

        Ok(Self {
            correlations,
            ttl: Duration::days(ttl_days),
            scheduler,
        })
    }

    pub async fn start(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let correlations = self.correlations.clone();
        let ttl = self.ttl;

        let eviction_job = Job::new_async(EVICTION_SCHEDULE, move |_uuid, _l| {
            let correlations = correlations.clone();
            Box::pin(async move {
                if let Err(e) = evict_stale(&correlations, ttl).await {
                    tracing::error!("Failed to evict correlation entries: {}", e);
                }
            })
        })?;

        self.scheduler.add(eviction_job).await?;
        self.scheduler.start().await?;

        tracing::info!(
            "Janitor started - evicting correlation entries older than {} days daily at 04:00 UTC",
            self.ttl.num_days()
        );
        Ok(())
    }

    pub async fn stop(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.scheduler.shutdown().await?;
        Ok(())
    }

    /// Runs one eviction pass immediately.
    pub async fn run_now(&self) -> Result<u64, StoreError> {
        evict_stale(&self.correlations, self.ttl).await
    }
}

async fn evict_stale(correlations: &CorrelationStore, ttl: Duration) -> Result<u64, StoreError> {
    let cutoff = Utc::now() - ttl;
    let evicted = correlations.evict_older_than(cutoff).await?;
    if evicted > 0 {
        tracing::info!("Evicted {} correlation entries older than {}", evicted, cutoff);
    }
    Ok(evicted)
}
