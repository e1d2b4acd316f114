use super::{
    MetricSource,
    Notification,
    PushStream,
    SourceError,
    SourceFuture,
    SseDecoder,
};
use crate::aggregator::RawSnapshot;
use eyre::{
    Context as _,
    Result,
};
use futures::StreamExt as _;
use indexmap::IndexMap;
use reqwest::{
    header::ACCEPT,
    Client,
    Response,
};
use std::{
    collections::VecDeque,
    time::Duration,
};
use url::Url;

const SNAPSHOT_PATH: &str = "data/all";
const LIVE_PATH: &str = "data/live";
const EVENT_STREAM: &str = "text/event-stream";

/// Events on the push channel that trigger a refresh. `message` is what unnamed events arrive as.
const REFRESH_EVENTS: &[&str] = &["update", "message"];

/// Talks to the backend over `GET /data/all` and the `GET /data/live` event stream.
#[derive(Debug, Clone)]
pub struct HttpMetricSource {
    client: Client,
    snapshot_url: Url,
    live_url: Url,
    request_timeout: Duration,
}

impl HttpMetricSource {
    pub fn new(base_url: &Url, request_timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(request_timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Self::with_client(client, base_url, request_timeout)
    }

    pub fn with_client(client: Client, base_url: &Url, request_timeout: Duration) -> Result<Self> {
        // Without the trailing slash `join` would replace the last path segment of the base.
        let mut base_url = base_url.clone();
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }
        Ok(Self {
            client,
            snapshot_url: base_url.join(SNAPSHOT_PATH).context("Invalid snapshot URL")?,
            live_url: base_url.join(LIVE_PATH).context("Invalid live URL")?,
            request_timeout,
        })
    }

    pub fn snapshot_url(&self) -> &Url {
        &self.snapshot_url
    }

    pub fn live_url(&self) -> &Url {
        &self.live_url
    }

    async fn get_snapshot(&self) -> Result<RawSnapshot, SourceError> {
        let response = self
            .client
            .get(self.snapshot_url.clone())
            .timeout(self.request_timeout)
            .send()
            .await?;
        let response = ensure_success(response)?;
        let body = response.bytes().await?;
        parse_snapshot(&body)
    }

    async fn open_stream(&self) -> Result<PushStream, SourceError> {
        let response = self
            .client
            .get(self.live_url.clone())
            .header(ACCEPT, EVENT_STREAM)
            .send()
            .await?;
        let response = ensure_success(response)?;
        debug!(url = %self.live_url, "Push channel connected");

        let stream = futures::stream::unfold(
            (response.bytes_stream(), SseDecoder::default(), VecDeque::new()),
            |(mut body, mut decoder, mut pending)| async move {
                loop {
                    if let Some(notification) = pending.pop_front() {
                        return Some((Ok(notification), (body, decoder, pending)));
                    }
                    match body.next().await {
                        Some(Ok(chunk)) => pending.extend(
                            decoder
                                .feed(&chunk)
                                .into_iter()
                                .filter(|event| REFRESH_EVENTS.contains(&event.event.as_str()))
                                .map(|event| Notification { event: event.event }),
                        ),
                        Some(Err(err)) => return Some((Err(SourceError::Request(err)), (body, decoder, pending))),
                        None => return None,
                    }
                }
            },
        );

        Ok(Box::pin(stream))
    }
}

impl MetricSource for HttpMetricSource {
    fn fetch_snapshot(&self) -> SourceFuture<'_, RawSnapshot> {
        Box::pin(self.get_snapshot())
    }

    fn subscribe(&self) -> SourceFuture<'_, PushStream> {
        Box::pin(self.open_stream())
    }
}

fn ensure_success(response: Response) -> Result<Response, SourceError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(SourceError::Status(status.as_u16()))
    }
}

/// The backend sends string values; numbers and booleans are accepted and stringified.
fn parse_snapshot(body: &[u8]) -> Result<RawSnapshot, SourceError> {
    let values: IndexMap<String, serde_json::Value> =
        serde_json::from_slice(body).map_err(|err| SourceError::Body(err.to_string()))?;

    values
        .into_iter()
        .map(|(key, value)| {
            let value = match value {
                serde_json::Value::String(value) => value,
                serde_json::Value::Number(number) => number.to_string(),
                serde_json::Value::Bool(flag) => flag.to_string(),
                other => {
                    return Err(SourceError::Body(format!("value of {key:?} is not a scalar: {other}")));
                }
            };
            Ok((key, value))
        })
        .collect()
}
