use super::{
    SyncCommand,
    SyncSettings,
};
use crate::{
    aggregator::{
        aggregate,
        RawSnapshot,
    },
    projector::project,
    source::{
        MetricSource,
        Notification,
        PushStream,
        SourceError,
    },
    state::{
        DashboardState,
        DataOrigin,
        SyncStatus,
    },
};
use chrono::Utc;
use eyre::Result;
use futures::StreamExt as _;
use std::pin::Pin;
use tokio::{
    sync::{
        mpsc::UnboundedReceiver,
        watch,
    },
    time::{
        interval_at,
        sleep,
        Instant,
        Interval,
        MissedTickBehavior,
        Sleep,
    },
};

/// What drives refreshes after the initial load.
enum Channel {
    Push(PushStream),
    Polling(Interval),
    Closed,
}

enum ChannelEvent {
    Notification(Notification),
    Failed(SourceError),
    Ended,
    PollDue,
}

impl Channel {
    async fn next(&mut self) -> ChannelEvent {
        match self {
            Channel::Push(stream) => match stream.next().await {
                Some(Ok(notification)) => ChannelEvent::Notification(notification),
                Some(Err(err)) => ChannelEvent::Failed(err),
                None => ChannelEvent::Ended,
            },
            Channel::Polling(interval) => {
                interval.tick().await;
                ChannelEvent::PollDue
            }
            Channel::Closed => std::future::pending().await,
        }
    }

    fn close(&mut self) {
        *self = Channel::Closed;
    }
}

async fn expired(timer: &mut Option<Pin<Box<Sleep>>>) {
    match timer {
        Some(timer) => timer.as_mut().await,
        None => std::future::pending().await,
    }
}

pub(super) struct SyncInner<S> {
    source: S,
    settings: SyncSettings,
    state: watch::Sender<DashboardState>,
    snapshot: RawSnapshot,
}

impl<S: MetricSource> SyncInner<S> {
    pub(super) fn new(source: S, settings: SyncSettings, state: watch::Sender<DashboardState>) -> Self {
        Self {
            source,
            settings,
            state,
            snapshot: RawSnapshot::new(),
        }
    }

    #[instrument(level = "debug", skip_all)]
    pub(super) async fn run(mut self, mut commands: UnboundedReceiver<SyncCommand>) -> Result<()> {
        let mut channel = self.load().await;
        let mut debounce: Option<Pin<Box<Sleep>>> = None;

        loop {
            tokio::select! {
                biased;

                command = commands.recv() => {
                    let Some(command) = command else {
                        debug!("All sync controller handles dropped");
                        break;
                    };
                    debug!(%command, "Handling sync command");
                    match command {
                        SyncCommand::Retry => {
                            debounce = None;
                            channel.close();
                            channel = self.load().await;
                        }
                        SyncCommand::SetViewMode(view_mode) => {
                            self.state.send_modify(|state| state.view_mode = view_mode);
                        }
                        SyncCommand::ToggleViewMode => {
                            self.state.send_modify(|state| state.view_mode = state.view_mode.toggle());
                        }
                    }
                }

                event = channel.next() => match event {
                    ChannelEvent::Notification(notification) => {
                        trace!(event = %notification.event, "Push notification, refresh debounced");
                        debounce = Some(Box::pin(sleep(self.settings.debounce)));
                    }
                    ChannelEvent::Failed(err) => {
                        warn!("Push channel failed, polling from now on: {err}");
                        debounce = None;
                        channel = self.degrade();
                    }
                    ChannelEvent::Ended => {
                        warn!("Push channel closed by the backend, polling from now on");
                        debounce = None;
                        channel = self.degrade();
                    }
                    ChannelEvent::PollDue => {
                        trace!("Polling metric snapshot");
                        self.refresh().await;
                    }
                },

                _ = expired(&mut debounce) => {
                    debounce = None;
                    self.refresh().await;
                }
            }
        }

        Ok(())
    }

    /// Full load with fallback. Ends either `Live` with an open push channel or `Degraded` polling.
    async fn load(&mut self) -> Channel {
        self.state.send_modify(|state| {
            state.loading = true;
            state.status = SyncStatus::Loading;
        });

        match self.source.fetch_snapshot().await {
            Ok(snapshot) => {
                info!(keys = snapshot.len(), "Loaded metric snapshot");
                self.apply(snapshot, DataOrigin::Backend);
                self.connect().await
            }
            Err(err) => {
                warn!("Loading the metric snapshot failed, showing fallback data: {err}");
                self.apply(self.settings.fallback.clone(), DataOrigin::Fallback);
                self.degrade()
            }
        }
    }

    async fn connect(&mut self) -> Channel {
        match self.source.subscribe().await {
            Ok(stream) => {
                info!("Push channel open, refreshing on notifications");
                self.set_status(SyncStatus::Live);
                Channel::Push(stream)
            }
            Err(err) => {
                warn!("Opening the push channel failed, polling instead: {err}");
                self.degrade()
            }
        }
    }

    /// The push channel is not retried from here, only a manual retry opens it again.
    fn degrade(&mut self) -> Channel {
        self.set_status(SyncStatus::Degraded);
        let period = self.settings.poll_interval;
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Channel::Polling(interval)
    }

    async fn refresh(&mut self) {
        match self.source.fetch_snapshot().await {
            Ok(snapshot) => self.apply(snapshot, DataOrigin::Backend),
            Err(err) => warn!("Refreshing the metric snapshot failed, keeping the previous one: {err}"),
        }
    }

    fn apply(&mut self, snapshot: RawSnapshot, origin: DataOrigin) {
        let cities = aggregate(&snapshot);
        self.snapshot = snapshot;
        self.state.send_modify(|state| {
            state.loading = false;
            state.cities = cities;
            state.origin = origin;
            state.last_updated = Some(Utc::now());
        });

        let view = project(&self.state.borrow());
        debug!(
            cities = view.city_count,
            metrics = view.metric_count,
            keys = self.snapshot.len(),
            %origin,
            "Published dashboard state"
        );
    }

    fn set_status(&self, status: SyncStatus) {
        self.state.send_modify(|state| state.status = status);
    }
}
