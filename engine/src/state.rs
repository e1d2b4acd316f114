use crate::aggregator::CityGroups;
use chrono::{
    DateTime,
    Utc,
};
use city_pulse_config::ViewMode;
use serde::Serialize;
use strum::Display;

/// Where the sync controller currently is in its lifecycle.
#[derive(Debug, Default, Clone, Copy, Display, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SyncStatus {
    #[default]
    Idle,
    /// A full snapshot fetch is outstanding (startup or manual retry).
    Loading,
    /// Refreshes are driven by the push channel.
    Live,
    /// The push channel is gone (or never came up), refreshes are polled.
    Degraded,
}

/// Provenance of the snapshot currently on display.
#[derive(Debug, Default, Clone, Copy, Display, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DataOrigin {
    #[default]
    None,
    Backend,
    /// The built-in sample dataset, shown because the backend could not be reached.
    Fallback,
}

/// Everything the presentation layer renders. Replaced wholesale on every refresh.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DashboardState {
    pub loading: bool,
    pub cities: CityGroups,
    pub view_mode: ViewMode,
    pub status: SyncStatus,
    pub origin: DataOrigin,
    pub last_updated: Option<DateTime<Utc>>,
}

impl DashboardState {
    pub fn new(view_mode: ViewMode) -> Self {
        Self {
            loading: true,
            cities: CityGroups::new(),
            view_mode,
            status: SyncStatus::Idle,
            origin: DataOrigin::None,
            last_updated: None,
        }
    }

    pub fn is_demo(&self) -> bool {
        self.origin == DataOrigin::Fallback
    }
}

impl Default for DashboardState {
    fn default() -> Self {
        Self::new(ViewMode::default())
    }
}
