//! Record expiry sweeper background task.
//!
//! Periodically removes physically-expired meeting and attendee rows.
//! Reads never depend on the sweeper (logical expiry is part of every
//! query), so a late or failed sweep only delays space reclamation.
//!
//! # Graceful Shutdown
//!
//! The task supports graceful shutdown via a cancellation token. When the
//! token is cancelled, the task completes its current iteration and exits
//! cleanly.

use crate::errors::RcError;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Run the expiry sweeper loop.
///
/// Each tick invokes `purge_fn` and logs how many rows it removed. Exits
/// when the cancellation token is triggered.
///
/// The purge work is injected as a closure (production:
/// `PgMeetingRecordStore::purge_expired` over a cloned pool) so the loop
/// is testable without a database.
///
/// # Arguments
///
/// * `sweep_interval` - Time between sweeps
/// * `cancel_token` - Token for graceful shutdown
/// * `purge_fn` - Closure performing one sweep, returning rows removed
pub async fn run_expiry_sweeper<F, Fut>(
    sweep_interval: Duration,
    cancel_token: CancellationToken,
    purge_fn: F,
) where
    F: Fn() -> Fut + Send,
    Fut: Future<Output = Result<u64, RcError>> + Send,
{
    let mut interval = tokio::time::interval(sweep_interval);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                match purge_fn().await {
                    Ok(0) => {
                        debug!(
                            target: "rc.tasks.record_expiry",
                            "Expiry sweep found nothing to remove"
                        );
                    }
                    Ok(purged) => {
                        info!(
                            target: "rc.tasks.record_expiry",
                            purged = purged,
                            "Expiry sweep removed expired records"
                        );
                    }
                    Err(e) => {
                        warn!(
                            target: "rc.tasks.record_expiry",
                            error = %e,
                            "Expiry sweep failed"
                        );
                    }
                }
            }
            _ = cancel_token.cancelled() => {
                info!(
                    target: "rc.tasks.record_expiry",
                    "Expiry sweeper received shutdown signal, exiting"
                );
                break;
            }
        }
    }
}
