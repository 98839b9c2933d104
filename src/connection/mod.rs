//! Background connection that keeps a sensor's results fresh

use futures::{Stream, StreamExt};
use std::sync::Arc;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::bus::Bus;
use crate::clock::Clock;
use crate::driver::Driver;
use crate::results::ResultSet;
use crate::sensor::HuskyLens;
use crate::types::PollRate;


/// A sensor polled by a background task.
///
/// Created from an initialised [`HuskyLens`]; the task owns it from then on.
/// Dropping the connection stops the task after the cycle in flight.
pub struct LensConnection {
    /// Result watch receiver
    results: watch::Receiver<Option<Arc<ResultSet>>>,

    /// Requested cycle rate
    rate: PollRate,

    /// Cancellation token for stopping the task
    cancel: CancellationToken,
}

impl LensConnection {
    /// Start polling. Must be called from within a tokio runtime.
    pub fn spawn<B, C>(lens: HuskyLens<B, C>, rate: PollRate) -> Self
    where
        B: Bus + 'static,
        C: Clock + 'static,
    {
        let rate = rate.normalize();
        let channels = Driver::spawn(lens, rate);
        info!("Sensor connection started ({:?})", rate);

        Self { results: channels.results, rate, cancel: channels.cancel }
    }

    /// Stream of committed result sets.
    ///
    /// Yields the current table immediately if one exists, then every newer
    /// one. Readers that fall behind skip straight to the latest table. The
    /// stream ends when the task stops.
    pub fn subscribe(&self) -> impl Stream<Item = Arc<ResultSet>> + 'static {
        // Leading None means no cycle has completed yet; a later None means
        // the task gave up.
        WatchStream::new(self.results.clone())
            .skip_while(|results| {
                let is_none = results.is_none();
                async move { is_none }
            })
            .take_while(|results| {
                let is_some = results.is_some();
                async move { is_some }
            })
            .filter_map(|results| async move { results })
    }

    /// Most recent table, if a cycle has completed and the task is alive.
    pub fn latest(&self) -> Option<Arc<ResultSet>> {
        self.results.borrow().clone()
    }

    /// Whether the background task is still polling.
    pub fn is_running(&self) -> bool {
        !self.cancel.is_cancelled() && self.results.has_changed().is_ok()
    }

    pub fn rate(&self) -> PollRate {
        self.rate
    }

    /// Ask the task to stop after the cycle in flight.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

impl Drop for LensConnection {
    fn drop(&mut self) {
        debug!("Dropping sensor connection");
        self.cancel.cancel();
    }
}
