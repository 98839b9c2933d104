//! Request/response engine for one sensor
//!
//! [`HuskyLens`] owns the transport and the last committed [`ResultSet`]. A
//! request cycle writes one request frame, waits for the info frame, then reads
//! exactly as many block/arrow frames as the info frame announced. The table
//! is replaced only when the whole cycle succeeds.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::bus::Bus;
use crate::clock::{Clock, SystemClock};
use crate::protocol::{DecoderStats, encode_command};
use crate::results::{ResultSet, Summary};
use crate::transport::Transport;
use crate::types::{Algorithm, Command, Request, ResultRecord};
use crate::{Result, SensorConfig, SensorError};

/// Handshakes the until-success loops can repeat.
#[derive(Debug, Clone, Copy)]
enum Handshake {
    Knock,
    SetAlgorithm(Algorithm),
}

/// Driver for one sensor on one bus.
#[derive(Debug)]
pub struct HuskyLens<B, C = SystemClock> {
    transport: Transport<B, C>,
    config: SensorConfig,
    results: Arc<ResultSet>,
    cycles: u64,
}

impl<B: Bus> HuskyLens<B> {
    /// Create a driver that measures wait budgets on the runtime clock.
    pub fn new(bus: B, config: SensorConfig) -> Result<Self> {
        Self::with_clock(bus, SystemClock, config)
    }
}

impl<B: Bus, C: Clock> HuskyLens<B, C> {
    pub fn with_clock(bus: B, clock: C, config: SensorConfig) -> Result<Self> {
        config.validate()?;
        debug!(
            "Sensor driver at address {:#04x}, timeout {:?}",
            config.address, config.timeout
        );

        Ok(Self {
            transport: Transport::new(bus, clock, &config),
            config,
            results: Arc::new(ResultSet::default()),
            cycles: 0,
        })
    }

    /// Run one cycle for every visible block and arrow.
    pub async fn request(&mut self) -> Result<Arc<ResultSet>> {
        self.request_with(Request::All).await
    }

    /// Run one request cycle and commit its results.
    ///
    /// On any failure the previously committed table stays in place and the
    /// error is returned.
    pub async fn request_with(&mut self, request: Request) -> Result<Arc<ResultSet>> {
        self.send(request.command(), request.payload()).await?;

        let results = match self.process_return().await {
            Ok(results) => results,
            Err(e) => {
                debug!("Request cycle {:?} failed: {}", request, e);
                return Err(e);
            }
        };

        self.cycles += 1;
        let results = Arc::new(results.with_cycle(self.cycles));
        debug!(
            "Cycle {}: {} records, {} learned",
            self.cycles,
            results.record_count(),
            results.learned_count()
        );
        self.results = Arc::clone(&results);
        Ok(results)
    }

    async fn process_return(&mut self) -> Result<ResultSet> {
        let info = self.transport.wait_for(Some(Command::ReturnInfo)).await?;
        let summary = Summary::from_frame(&info)?;

        let declared = summary.record_count as usize;
        if declared > self.config.result_capacity {
            return Err(SensorError::ResultOverflow {
                declared,
                capacity: self.config.result_capacity,
            });
        }

        let mut records = Vec::with_capacity(declared);
        for _ in 0..declared {
            let frame = self.transport.wait_for(None).await?;
            records.push(ResultRecord::from_frame(&frame)?);
        }

        Ok(ResultSet::new(summary, records))
    }

    /// The last committed table; empty until a cycle succeeds.
    pub fn results(&self) -> &ResultSet {
        &self.results
    }

    /// Shared handle to the last committed table.
    pub fn snapshot(&self) -> Arc<ResultSet> {
        Arc::clone(&self.results)
    }

    /// Check that the sensor answers, trying up to `knock_attempts` times.
    pub async fn knock(&mut self) -> Result<()> {
        let attempts = self.config.knock_attempts;
        for attempt in 1..=attempts {
            match self.exchange(Command::RequestKnock, None).await {
                Ok(()) => {
                    debug!("Sensor answered knock on attempt {}", attempt);
                    return Ok(());
                }
                Err(e) if e.is_retryable() => {
                    debug!("Knock attempt {}/{} failed: {}", attempt, attempts, e);
                }
                Err(e) => return Err(e),
            }
        }

        warn!("Sensor did not answer {} knocks", attempts);
        Err(SensorError::not_responding(attempts))
    }

    /// Switch the recognition algorithm. One attempt.
    pub async fn set_algorithm(&mut self, algorithm: Algorithm) -> Result<()> {
        self.exchange(Command::RequestAlgorithm, Some(algorithm.code())).await
    }

    /// Learn the current target under `id`. One attempt.
    pub async fn learn(&mut self, id: u16) -> Result<()> {
        self.exchange(Command::RequestLearn, Some(id)).await
    }

    /// Forget everything learned under the current algorithm. One attempt.
    pub async fn forget(&mut self) -> Result<()> {
        self.exchange(Command::RequestForget, None).await
    }

    /// Knock until the sensor answers, pausing `retry_interval` between
    /// rounds. Returns the number of rounds taken.
    ///
    /// Cancellation is observed between rounds only.
    pub async fn init_until_present(&mut self, cancel: &CancellationToken) -> Result<u32> {
        self.until_success(Handshake::Knock, cancel).await
    }

    /// Repeat [`set_algorithm`](Self::set_algorithm) until acknowledged.
    pub async fn set_algorithm_until_success(
        &mut self,
        algorithm: Algorithm,
        cancel: &CancellationToken,
    ) -> Result<u32> {
        self.until_success(Handshake::SetAlgorithm(algorithm), cancel).await
    }

    async fn until_success(&mut self, handshake: Handshake, cancel: &CancellationToken) -> Result<u32> {
        let mut attempts = 0u32;

        loop {
            if cancel.is_cancelled() {
                return Err(SensorError::Cancelled);
            }

            attempts += 1;
            let result = match handshake {
                Handshake::Knock => self.knock().await,
                Handshake::SetAlgorithm(algorithm) => self.set_algorithm(algorithm).await,
            };

            match result {
                Ok(()) => {
                    info!("{:?} succeeded after {} attempts", handshake, attempts);
                    return Ok(attempts);
                }
                Err(e) if e.is_retryable() => {
                    warn!("{:?} attempt {} failed: {}", handshake, attempts, e);
                }
                Err(e) => return Err(e),
            }

            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("{:?} cancelled after {} attempts", handshake, attempts);
                    return Err(SensorError::Cancelled);
                }
                _ = tokio::time::sleep(self.config.retry_interval) => {}
            }
        }
    }

    /// Send a command and wait for its acknowledgement.
    async fn exchange(&mut self, command: Command, value: Option<u16>) -> Result<()> {
        debug!("Sending {:?} {:?}", command, value);
        self.send(command, value).await?;
        self.transport.wait_for(Some(Command::ReturnOk)).await?;
        Ok(())
    }

    /// Every exchange starts from a clean decoder so leftovers from a timed
    /// out exchange cannot answer this one.
    async fn send(&mut self, command: Command, value: Option<u16>) -> Result<()> {
        let frame = encode_command(self.config.address, command, value)?;
        self.transport.discard_pending();
        self.transport.send(&frame).await
    }

    pub fn config(&self) -> &SensorConfig {
        &self.config
    }

    /// Frames the decoder accepted or dropped so far.
    pub fn decoder_stats(&self) -> DecoderStats {
        self.transport.decoder_stats()
    }

    pub fn bus(&self) -> &B {
        self.transport.bus()
    }

    pub fn bus_mut(&mut self) -> &mut B {
        self.transport.bus_mut()
    }

    /// Release the bus.
    pub fn into_bus(self) -> B {
        self.transport.into_bus()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::test_utils::{
        self, ScriptedBus, arrow, block, block_reply, cycle_reply, info_reply, ok_reply,
    };
    use crate::types::{ArrowField, BlockField, ResultKind};
    use std::time::Duration;

    const STEP: Duration = Duration::from_millis(10);

    fn lens(bus: ScriptedBus, clock: ManualClock) -> HuskyLens<ScriptedBus, ManualClock> {
        let config = SensorConfig::default().with_retry_interval(Duration::from_millis(1));
        HuskyLens::with_clock(bus.with_clock(clock.clone(), STEP), clock, config).unwrap()
    }

    #[tokio::test]
    async fn request_commits_a_full_cycle() {
        test_utils::init_tracing();
        let clock = ManualClock::new();
        let bus = ScriptedBus::new()
            .with_reply(cycle_reply(2, &[block(10, 20, 5, 5, 1)], &[arrow(1, 1, 2, 2, 2)]));
        let mut lens = lens(bus, clock);

        let results = lens.request().await.unwrap();

        assert_eq!(lens.bus().writes(), &[vec![0x55, 0xAA, 0x11, 0x00, 0x20, 0x30]]);
        assert_eq!(results.record_count(), 2);
        assert_eq!(results.count(ResultKind::Block), 1);
        assert_eq!(results.count(ResultKind::Arrow), 1);
        assert_eq!(results.field(0, BlockField::XCenter), Some(10));
        assert_eq!(results.field(1, ArrowField::XTarget), Some(2));
        assert_eq!(results.cycle(), 1);
        assert_eq!(lens.results(), &*results);
    }

    #[tokio::test]
    async fn stray_frames_from_an_earlier_cycle_are_not_committed() {
        let clock = ManualClock::new();
        let mut first = cycle_reply(1, &[block(10, 10, 4, 4, 1)], &[]);
        first.extend(info_reply(0, 0));
        let bus = ScriptedBus::new()
            .with_reply(first)
            .with_reply(cycle_reply(1, &[block(99, 98, 4, 4, 2)], &[]))
            .with_clock(clock.clone(), STEP);
        let config = SensorConfig::default().with_read_chunk(64);
        let mut lens = HuskyLens::with_clock(bus, clock, config).unwrap();

        lens.request().await.unwrap();
        let second = lens.request().await.unwrap();

        assert_eq!(second.record_count(), 1);
        assert_eq!(second.field(0, BlockField::XCenter), Some(99));
        assert_eq!(second.nearest_block().map(|b| b.id), Some(2));
    }

    #[tokio::test]
    async fn snapshot_shares_the_committed_table() {
        let clock = ManualClock::new();
        let bus = ScriptedBus::new().with_reply(cycle_reply(1, &[block(5, 6, 7, 8, 1)], &[]));
        let mut lens = lens(bus, clock);

        assert!(lens.snapshot().is_empty());
        let results = lens.request().await.unwrap();
        let snapshot = lens.snapshot();

        assert!(Arc::ptr_eq(&results, &snapshot));
        assert_eq!(snapshot.field(0, BlockField::Height), Some(8));
    }

    #[tokio::test]
    async fn empty_cycle_clears_the_table() {
        let clock = ManualClock::new();
        let bus = ScriptedBus::new()
            .with_reply(cycle_reply(1, &[block(1, 1, 1, 1, 1)], &[]))
            .with_reply(info_reply(0, 1));
        let mut lens = lens(bus, clock);

        lens.request().await.unwrap();
        let results = lens.request().await.unwrap();

        assert!(results.is_empty());
        assert_eq!(results.cycle(), 2);
        assert_eq!(lens.results().learned_count(), 1);
    }

    #[tokio::test]
    async fn failed_cycle_keeps_the_previous_table() {
        let clock = ManualClock::new();
        let mut truncated = info_reply(2, 1);
        truncated.extend(block_reply(block(5, 5, 5, 5, 1)));
        let bus = ScriptedBus::new()
            .with_reply(cycle_reply(1, &[block(7, 8, 9, 10, 1)], &[]))
            .with_reply(truncated);
        let mut lens = lens(bus, clock);

        let first = lens.request().await.unwrap();
        let error = lens.request().await.unwrap_err();

        assert!(matches!(error, SensorError::Timeout { .. }));
        assert_eq!(lens.results(), &*first);
        assert_eq!(lens.results().field(0, BlockField::XCenter), Some(7));
    }

    #[tokio::test]
    async fn silent_sensor_fails_the_cycle() {
        let clock = ManualClock::new();
        let mut lens = lens(ScriptedBus::new(), clock);

        let error = lens.request().await.unwrap_err();

        assert!(matches!(error, SensorError::Timeout { .. }));
        assert!(lens.results().is_empty());
        assert_eq!(lens.results().cycle(), 0);
    }

    #[tokio::test]
    async fn non_record_frame_inside_a_cycle_is_rejected() {
        let clock = ManualClock::new();
        let mut bytes = info_reply(1, 0);
        bytes.extend(ok_reply());
        let mut lens = lens(ScriptedBus::new().with_reply(bytes), clock);

        let error = lens.request().await.unwrap_err();

        assert!(matches!(error, SensorError::UnexpectedReply { found: 0x2E, .. }));
        assert!(lens.results().is_empty());
    }

    #[tokio::test]
    async fn oversized_result_sets_are_refused() {
        let clock = ManualClock::new();
        let blocks: Vec<_> = (0..11).map(|i| block(i, i, 1, 1, 1)).collect();
        let mut lens = lens(ScriptedBus::new().with_reply(cycle_reply(1, &blocks, &[])), clock);

        let error = lens.request().await.unwrap_err();

        match error {
            SensorError::ResultOverflow { declared, capacity } => {
                assert_eq!(declared, 11);
                assert_eq!(capacity, 10);
            }
            other => panic!("expected overflow, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn by_id_requests_carry_the_identifier() {
        let clock = ManualClock::new();
        let mut lens = lens(ScriptedBus::new().with_reply(info_reply(0, 0)), clock);

        lens.request_with(Request::BlocksById(3)).await.unwrap();

        assert_eq!(lens.bus().writes()[0], vec![0x55, 0xAA, 0x11, 0x02, 0x27, 0x03, 0x00, 0x3C]);
    }

    #[tokio::test]
    async fn knock_gives_up_after_the_configured_attempts() {
        let clock = ManualClock::new();
        let mut lens = lens(ScriptedBus::new(), clock);

        let error = lens.knock().await.unwrap_err();

        assert!(matches!(error, SensorError::NotResponding { attempts: 5 }));
        assert_eq!(lens.bus().writes().len(), 5);
        assert!(
            lens.bus()
                .writes()
                .iter()
                .all(|frame| frame == &vec![0x55, 0xAA, 0x11, 0x00, 0x2C, 0x3C])
        );
    }

    #[tokio::test]
    async fn knock_succeeds_on_a_later_attempt() {
        let clock = ManualClock::new();
        let bus = ScriptedBus::new().with_reply(Vec::new()).with_reply(ok_reply());
        let mut lens = lens(bus, clock);

        lens.knock().await.unwrap();
        assert_eq!(lens.bus().writes().len(), 2);
    }

    #[tokio::test]
    async fn handshakes_make_a_single_attempt() {
        let clock = ManualClock::new();
        let mut lens = lens(ScriptedBus::new(), clock);

        assert!(lens.forget().await.is_err());
        assert!(lens.set_algorithm(Algorithm::TagRecognition).await.is_err());
        assert_eq!(lens.bus().writes().len(), 2);
    }

    #[tokio::test]
    async fn learn_sends_the_identifier() {
        let clock = ManualClock::new();
        let mut lens = lens(ScriptedBus::new().with_reply(ok_reply()), clock);

        lens.learn(1).await.unwrap();

        assert_eq!(lens.bus().writes()[0], vec![0x55, 0xAA, 0x11, 0x02, 0x2F, 0x01, 0x00, 0x42]);
    }

    #[tokio::test]
    async fn init_repeats_until_the_sensor_answers() {
        let clock = ManualClock::new();
        let mut bus = ScriptedBus::new();
        for _ in 0..5 {
            bus.queue_reply(Vec::new());
        }
        bus.queue_reply(ok_reply());
        let mut lens = lens(bus, clock);

        let rounds = lens.init_until_present(&CancellationToken::new()).await.unwrap();

        assert_eq!(rounds, 2);
        assert_eq!(lens.bus().writes().len(), 6);
    }

    #[tokio::test]
    async fn cancelled_token_stops_before_any_attempt() {
        let clock = ManualClock::new();
        let mut lens = lens(ScriptedBus::new(), clock);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let error = lens.init_until_present(&cancel).await.unwrap_err();

        assert!(matches!(error, SensorError::Cancelled));
        assert!(lens.bus().writes().is_empty());
    }

    #[tokio::test]
    async fn cancellation_interrupts_the_retry_pause() {
        let clock = ManualClock::new();
        let config = SensorConfig::default().with_retry_interval(Duration::from_secs(3600));
        let bus = ScriptedBus::new().with_clock(clock.clone(), STEP);
        let mut lens = HuskyLens::with_clock(bus, clock, config).unwrap();

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let error = lens
            .set_algorithm_until_success(Algorithm::ObjectTracking, &cancel)
            .await
            .unwrap_err();

        assert!(matches!(error, SensorError::Cancelled));
        assert_eq!(lens.bus().writes().len(), 1);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = SensorConfig::default().with_knock_attempts(0);
        let result = HuskyLens::new(ScriptedBus::new(), config);
        assert!(matches!(result, Err(SensorError::InvalidConfig { .. })));
    }
}
