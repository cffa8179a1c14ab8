//! Periodic aging timer.
//!
//! The FDB has no timer of its own. This task ticks every sweep interval
//! and calls [`LearningSwitch::age_tick`] with the current time.

use lswitch_types::Timestamp;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::actuator::FlowActuator;
use crate::controller::LearningSwitch;

/// Seconds elapsed since the clock was created.
///
/// Built on `tokio::time::Instant` so tests can drive it with a paused
/// runtime clock.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    pub fn now(&self) -> Timestamp {
        Timestamp::from_secs(self.origin.elapsed().as_secs())
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AgingScheduler {
    period: Duration,
}

impl AgingScheduler {
    pub fn new(period: Duration) -> Self {
        Self { period }
    }

    /// Spawns the aging task.
    ///
    /// The task stops when `shutdown` becomes `true` or its sender is
    /// dropped, and yields the number of ticks it ran. Late ticks are
    /// skipped rather than bursted.
    pub fn spawn<A>(
        self,
        controller: Arc<LearningSwitch<A>>,
        clock: MonotonicClock,
        mut shutdown: watch::Receiver<bool>,
    ) -> JoinHandle<u64>
    where
        A: FlowActuator + 'static,
    {
        let period = self.period;
        tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut ticks = 0u64;

            info!(period_secs = period.as_secs(), "FDB aging timer started");
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        let report = controller.age_tick(clock.now());
                        ticks += 1;
                        debug!(ticks, evicted = report.evicted, "Aging tick");
                    }
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            break;
                        }
                    }
                }
            }
            info!(ticks, "FDB aging timer stopped");
            ticks
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actuator::LoggingActuator;
    use crate::config_file::LswitchConfig;
    use crate::packet::PacketIn;
    use lswitch_types::{DatapathId, MacAddress, PortNo};

    #[tokio::test(start_paused = true)]
    async fn test_clock_follows_runtime_time() {
        let clock = MonotonicClock::new();
        assert_eq!(clock.now(), Timestamp::ZERO);

        time::advance(Duration::from_secs(42)).await;
        assert_eq!(clock.now(), Timestamp::from_secs(42));
    }

    #[tokio::test(start_paused = true)]
    async fn test_scheduler_ages_out_idle_hosts() {
        let mut config = LswitchConfig::default();
        config.aging.ttl_secs = 20;
        let controller = Arc::new(LearningSwitch::new(LoggingActuator, &config));
        let clock = MonotonicClock::new();
        let dpid = DatapathId::new(1);
        let host = MacAddress::new([2, 0, 0, 0, 0, 1]);

        controller
            .packet_in(
                &PacketIn::new(dpid, PortNo::new(1), host, MacAddress::BROADCAST),
                clock.now(),
            )
            .await;

        let (tx, rx) = watch::channel(false);
        let handle = AgingScheduler::new(Duration::from_secs(5)).spawn(
            Arc::clone(&controller),
            clock,
            rx,
        );

        time::sleep(Duration::from_secs(16)).await;
        assert_eq!(controller.engine(dpid).unwrap().lookup(&host), Some(PortNo::new(1)));

        time::sleep(Duration::from_secs(5)).await;
        assert_eq!(controller.engine(dpid).unwrap().lookup(&host), None);

        tx.send(true).unwrap();
        let ticks = handle.await.unwrap();
        assert_eq!(ticks, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_scheduler_stops_when_sender_dropped() {
        let config = LswitchConfig::default();
        let controller = Arc::new(LearningSwitch::new(LoggingActuator, &config));
        let (tx, rx) = watch::channel(false);
        let handle = AgingScheduler::new(config.aging.sweep_interval()).spawn(
            controller,
            MonotonicClock::new(),
            rx,
        );

        drop(tx);
        assert_eq!(handle.await.unwrap(), 0);
    }
}
