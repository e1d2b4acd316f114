//! The process-wide live snapshot and the state machine that keeps it fresh.
//!
//! ```text
//! Idle -> Loading -> Live <-> Degraded
//!            ^                   |
//!            +---- retry --------+
//! ```
//!
//! * `Loading`: one full snapshot fetch. Success moves on to opening the push channel (`Live`),
//!   failure substitutes the fallback dataset and starts polling (`Degraded`).
//! * `Live`: every push notification (re)arms the debounce timer, a refresh is fetched on its
//!   trailing edge.
//! * `Degraded`: entered when the push channel fails or ends. It is never reopened automatically,
//!   the snapshot is polled at a fixed interval until a manual retry or shutdown.
//!
//! A single task owns the snapshot and applies every transition, fetches are awaited inline so two
//! of them never overlap. Consumers observe [`DashboardState`] through a `watch` channel.

mod inner;
mod messages;

use crate::{
    aggregator::RawSnapshot,
    fallback,
    source::{
        HttpMetricSource,
        MetricSource,
    },
    state::DashboardState,
};
use city_pulse_config::{
    Config,
    ViewMode,
};
use eyre::Result;
use inner::SyncInner;
pub use messages::SyncCommand;
use std::{
    sync::Arc,
    time::Duration,
};
use tokio::sync::{
    mpsc::{
        unbounded_channel,
        UnboundedSender,
    },
    watch,
};
use tokio_util::sync::{
    CancellationToken,
    DropGuard,
};

#[derive(Debug, Clone, PartialEq)]
pub struct SyncSettings {
    /// Quiet period after the last push notification before refreshing.
    pub debounce: Duration,
    /// Refresh interval once degraded to polling.
    pub poll_interval: Duration,
    /// Shown when the snapshot cannot be loaded.
    pub fallback: RawSnapshot,
    pub view_mode: ViewMode,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(1000),
            poll_interval: Duration::from_secs(10),
            fallback: fallback::builtin(),
            view_mode: ViewMode::default(),
        }
    }
}

impl SyncSettings {
    pub fn from_config(config: &Config) -> Result<Self> {
        let fallback = match &config.fallback_file {
            Some(path) => fallback::load(path)?,
            None => fallback::builtin(),
        };
        Ok(Self {
            debounce: config.debounce(),
            poll_interval: config.poll_interval(),
            fallback,
            view_mode: config.view_mode,
        })
    }
}

/// Handle to the running sync task. The task stops (closing the push channel and cancelling its
/// timers) on [`SyncController::shutdown`] or when the last handle is dropped.
#[derive(Debug, Clone)]
pub struct SyncController {
    state: watch::Receiver<DashboardState>,
    cancellation: CancellationToken,
    _task_guard: Arc<DropGuard>,
    sender: UnboundedSender<SyncCommand>,
}

impl SyncController {
    pub fn spawn_with_config(config: &Config) -> Result<Self> {
        let source = HttpMetricSource::new(&config.base_url, config.request_timeout())?;
        let settings = SyncSettings::from_config(config)?;
        info!(
            base_url = %config.base_url,
            debounce = ?settings.debounce,
            poll_interval = ?settings.poll_interval,
            "Starting metric sync"
        );
        Ok(Self::spawn(source, settings))
    }

    pub fn spawn(source: impl MetricSource, settings: SyncSettings) -> Self {
        let (sender, receiver) = unbounded_channel::<SyncCommand>();
        let (state_sender, state_receiver) = watch::channel(DashboardState::new(settings.view_mode));
        let cancellation = CancellationToken::new();
        let task_guard = cancellation.clone().drop_guard();

        tokio::task::spawn({
            let cancellation = cancellation.clone();
            async move {
                tokio::select! {
                    biased;
                    _ = cancellation.cancelled() => {},

                    result = SyncInner::new(source, settings, state_sender).run(receiver) => {
                        if let Err(err) = result {
                            error!("Metric sync stopped: {err}");
                        }
                    }
                };

                debug!("Metric sync task finished");
            }
        });

        Self {
            state: state_receiver,
            cancellation,
            _task_guard: Arc::new(task_guard),
            sender,
        }
    }

    /// Latest published state.
    pub fn current(&self) -> DashboardState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.state.clone()
    }

    pub fn retry(&self) {
        self.send(SyncCommand::Retry);
    }

    pub fn set_view_mode(&self, view_mode: ViewMode) {
        self.send(SyncCommand::SetViewMode(view_mode));
    }

    pub fn toggle_view_mode(&self) {
        self.send(SyncCommand::ToggleViewMode);
    }

    pub fn send(&self, command: SyncCommand) {
        if self.sender.send(command).is_err() {
            debug!("Metric sync is not running, dropping {command}");
        }
    }

    pub fn is_running(&self) -> bool {
        !self.sender.is_closed()
    }

    /// Stops the sync task and waits until it is gone.
    pub async fn shutdown(self) {
        self.cancellation.cancel();
        self.sender.closed().await;
    }
}
