//! Driver spawns and manages the background request task

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use crate::bus::Bus;
use crate::clock::Clock;
use crate::results::ResultSet;
use crate::sensor::HuskyLens;
use crate::types::PollRate;

/// Result of spawning the driver task
pub struct DriverChannels {
    /// Receiver for committed result sets; `None` until the first cycle and
    /// again once the task stops
    pub results: watch::Receiver<Option<Arc<ResultSet>>>,
    /// Cancellation token for graceful shutdown
    pub cancel: CancellationToken,
}

/// Driver runs request cycles in a background task
///
/// The task owns the sensor. Every committed table is published on a watch
/// channel, so slow readers only ever see the latest cycle.
pub struct Driver;

impl Driver {
    /// Spawn the request task for the given sensor
    pub fn spawn<B, C>(lens: HuskyLens<B, C>, rate: PollRate) -> DriverChannels
    where
        B: Bus + 'static,
        C: Clock + 'static,
    {
        let (results_tx, results_rx) = watch::channel(None);
        let cancel = CancellationToken::new();
        let cancel_task = cancel.clone();

        tokio::spawn(async move {
            Self::request_task(lens, rate, results_tx, cancel_task).await;
        });

        DriverChannels { results: results_rx, cancel }
    }

    /// Request loop - one cycle per tick, publishing each committed table
    async fn request_task<B, C>(
        mut lens: HuskyLens<B, C>,
        rate: PollRate,
        results_tx: watch::Sender<Option<Arc<ResultSet>>>,
        cancel: CancellationToken,
    ) where
        B: Bus,
        C: Clock,
    {
        info!("Request task started ({:?})", rate.normalize());
        let max_errors = lens.config().max_consecutive_failures;
        let mut interval = rate.interval().map(|period| {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            interval
        });
        let mut cycle_count = 0u64;
        let mut error_count = 0u32;

        loop {
            // A cycle in flight always runs to completion
            if cancel.is_cancelled() {
                info!("Request task cancelled");
                break;
            }

            if let Some(interval) = interval.as_mut() {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        info!("Request task cancelled while idle");
                        break;
                    }
                    _ = interval.tick() => {}
                }
            }

            match lens.request().await {
                Ok(results) => {
                    cycle_count += 1;
                    error_count = 0;
                    trace!("Cycle {}: {} records", results.cycle(), results.record_count());

                    if results_tx.send(Some(results)).is_err() {
                        debug!("Result receiver dropped, shutting down");
                        break;
                    }
                }
                Err(e) => {
                    error_count += 1;
                    warn!("Request cycle failed ({}/{}): {}", error_count, max_errors, e);

                    if error_count >= max_errors {
                        error!("Too many failed cycles, shutting down");
                        let _ = results_tx.send(None);
                        break;
                    }

                    // Exponential backoff: 100ms, 200ms, 400ms, ... capped at 1.6s
                    let backoff = Duration::from_millis(50 * (1 << error_count.min(5)));
                    tokio::select! {
                        _ = cancel.cancelled() => {
                            info!("Request task cancelled during backoff");
                            break;
                        }
                        _ = tokio::time::sleep(backoff) => {}
                    }
                }
            }

            if interval.is_none() {
                tokio::task::yield_now().await;
            }
        }

        info!("Request task ended ({} cycles)", cycle_count);
    }
}
