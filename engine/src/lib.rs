//! Live metric synchronization and aggregation for the city dashboard.
//!
//! Metrics arrive from the backend as a flat snapshot of `<namespace>:<metric>:<city>` keys. The
//! [`SyncController`] keeps that snapshot fresh (push notifications, polling once they fail), the
//! [`aggregator`] groups it per city, the [`classifier`] assigns units, icons and severity bands,
//! and [`projector::project`] derives the summary a presentation layer needs.

#[macro_use]
extern crate tracing;

pub mod aggregator;
pub mod classifier;
pub mod fallback;
pub mod key;
pub mod projector;
pub mod source;
mod state;
pub mod sync;

pub use aggregator::{
    aggregate,
    CityGroup,
    CityGroups,
    ClassifiedMetric,
    RawSnapshot,
};
pub use classifier::Severity;
pub use key::MetricKey;
pub use projector::{
    project,
    ViewModel,
};
pub use state::{
    DashboardState,
    DataOrigin,
    SyncStatus,
};
pub use sync::{
    SyncCommand,
    SyncController,
    SyncSettings,
};
