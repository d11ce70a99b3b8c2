//! Periodic sample-evaluate-alert loop.
//!
//! The loop runs on its own tokio task. Each tick samples the feed under a
//! timeout, then evaluates against the shared level set while holding its
//! lock, so operator edits never interleave with an evaluation. A failed
//! sample skips the tick and the loop carries on.

use super::detector::CrossingDetector;
use super::levels::{self, SharedLevels};
use super::session::MonitorSession;
use crate::api::sampler::Sampler;
use crate::error::{LevelWatchError, Result};
use crate::ui::alerts::AlertSink;
use log::{debug, error, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    pub period: Duration,
    pub sample_timeout: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            period: Duration::from_secs(2),
            sample_timeout: Duration::from_millis(1500),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running,
    Stopped,
}

struct TickContext {
    sampler: Arc<dyn Sampler>,
    sink: Arc<dyn AlertSink>,
    levels: SharedLevels,
    sample_timeout: Duration,
}

impl TickContext {
    async fn tick(&self, session: &mut MonitorSession) -> Result<()> {
        let reading = match time::timeout(self.sample_timeout, self.sampler.read()).await {
            Ok(reading) => reading?,
            Err(_) => {
                return Err(LevelWatchError::SamplerUnavailable(format!(
                    "no reading within {:?}",
                    self.sample_timeout
                )))
            }
        };
        session.observe(reading);

        let evaluation = {
            let levels = levels::lock(&self.levels);
            CrossingDetector::evaluate_session(session, &levels)
        };
        let Some(evaluation) = evaluation else {
            return Ok(());
        };

        debug!(
            "Tick {}: price {} ({:?}), {} crossing(s)",
            session.ticks(),
            reading.value,
            evaluation.direction,
            evaluation.crossings.len()
        );
        self.sink.render(&evaluation.display, evaluation.direction);
        for crossing in &evaluation.crossings {
            self.sink.alert(crossing);
        }
        Ok(())
    }

    async fn run(self, period: Duration, mut shutdown: watch::Receiver<bool>) -> MonitorSession {
        let mut session = MonitorSession::new();
        let mut ticker = time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = shutdown.changed() => break,
                _ = ticker.tick() => {
                    tokio::select! {
                        biased;
                        _ = shutdown.changed() => break,
                        result = self.tick(&mut session) => {
                            if let Err(e) = result {
                                warn!("Skipping tick: {}", e);
                            }
                        }
                    }
                }
            }
        }

        session
    }
}

pub struct PollScheduler {
    sampler: Arc<dyn Sampler>,
    sink: Arc<dyn AlertSink>,
    levels: SharedLevels,
    config: SchedulerConfig,
    state: SchedulerState,
    shutdown: Option<watch::Sender<bool>>,
    task: Option<JoinHandle<MonitorSession>>,
}

impl PollScheduler {
    pub fn new(
        sampler: Arc<dyn Sampler>,
        sink: Arc<dyn AlertSink>,
        levels: SharedLevels,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            sampler,
            sink,
            levels,
            config,
            state: SchedulerState::Idle,
            shutdown: None,
            task: None,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Spawns the tick loop. Must be called from within a tokio runtime.
    /// A scheduler starts once; start a fresh one for a new session.
    pub fn start(&mut self) -> Result<()> {
        if self.state != SchedulerState::Idle {
            return Err(LevelWatchError::AlreadyStarted);
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let context = TickContext {
            sampler: Arc::clone(&self.sampler),
            sink: Arc::clone(&self.sink),
            levels: Arc::clone(&self.levels),
            sample_timeout: self.config.sample_timeout,
        };
        self.task = Some(tokio::spawn(context.run(self.config.period, shutdown_rx)));
        self.shutdown = Some(shutdown_tx);
        self.state = SchedulerState::Running;
        info!("Monitoring started, polling every {:?}", self.config.period);
        Ok(())
    }

    /// Halts the tick loop and waits for it to exit. No tick runs after this
    /// returns. Yields the final session if the loop was running.
    pub async fn stop(&mut self) -> Option<MonitorSession> {
        self.state = SchedulerState::Stopped;
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(true);
        }
        let task = self.task.take()?;
        match task.await {
            Ok(session) => {
                info!("Monitoring stopped after {} reading(s)", session.ticks());
                Some(session)
            }
            Err(e) => {
                error!("Monitoring task failed: {}", e);
                None
            }
        }
    }
}
