//! Contracts with the metrics backend: a full snapshot fetch and a change notification stream.

mod http;
mod sse;

use crate::aggregator::RawSnapshot;
use futures::Stream;
pub use http::HttpMetricSource;
pub use sse::{
    SseDecoder,
    SseEvent,
};
use std::{
    future::Future,
    pin::Pin,
};

#[derive(thiserror::Error, Debug)]
pub enum SourceError {
    #[error("Request to the metrics backend failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Metrics backend responded with status {0}")]
    Status(u16),
    #[error("Metrics backend sent an invalid snapshot: {0}")]
    Body(String),
    #[error("Push channel failed: {0}")]
    Stream(String),
}

/// A refresh trigger delivered by the push channel. The payload is never interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub event: String,
}

pub type PushStream = Pin<Box<dyn Stream<Item = Result<Notification, SourceError>> + Send>>;

pub type SourceFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, SourceError>> + Send + 'a>>;

/// Where snapshots and change notifications come from.
pub trait MetricSource: Send + Sync + 'static {
    /// Fetch the complete current snapshot.
    fn fetch_snapshot(&self) -> SourceFuture<'_, RawSnapshot>;

    /// Open the push channel. The stream ending counts as a transport failure.
    fn subscribe(&self) -> SourceFuture<'_, PushStream>;
}
