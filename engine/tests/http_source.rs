use city_pulse_engine::{
    aggregate,
    source::{
        HttpMetricSource,
        MetricSource,
        Notification,
        SourceError,
    },
};
use futures::StreamExt as _;
use pretty_assertions::assert_eq;
use std::time::Duration;
use tokio::{
    io::{
        AsyncReadExt as _,
        AsyncWriteExt as _,
    },
    net::TcpListener,
};
use url::Url;

/// Minimal HTTP/1.1 backend: answers `GET <path>` with the canned response for that path.
async fn serve(routes: Vec<(&'static str, String)>) -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            let routes = routes.clone();
            tokio::spawn(async move {
                let mut request = Vec::new();
                let mut buffer = [0u8; 1024];
                while !request.windows(4).any(|window| window == b"\r\n\r\n") {
                    match socket.read(&mut buffer).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => request.extend_from_slice(&buffer[..n]),
                    }
                }
                let request = String::from_utf8_lossy(&request);
                let path = request.split_whitespace().nth(1).unwrap_or("/").to_string();
                let response = routes
                    .iter()
                    .find(|(route, _)| *route == path)
                    .map(|(_, response)| response.clone())
                    .unwrap_or_else(|| "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\n\r\n".to_string());
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    Url::parse(&format!("http://{address}")).unwrap()
}

fn json_response(body: &str) -> String {
    format!(
        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    )
}

fn event_stream_response(body: &str) -> String {
    format!("HTTP/1.1 200 OK\r\nContent-Type: text/event-stream\r\nConnection: close\r\n\r\n{body}")
}

fn source(base_url: &Url) -> HttpMetricSource {
    HttpMetricSource::new(base_url, Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn fetches_the_full_snapshot() {
    let base_url = serve(vec![(
        "/data/all",
        json_response(r#"{"smartcity:temperature:NewYork":"22.5","smartcity:humidity:NewYork":"65"}"#),
    )])
    .await;

    let snapshot = source(&base_url).fetch_snapshot().await.unwrap();
    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot["smartcity:temperature:NewYork"], "22.5");
    assert_eq!(snapshot["smartcity:humidity:NewYork"], "65");
}

#[tokio::test]
async fn snapshot_keeps_backend_key_order() {
    let base_url = serve(vec![(
        "/data/all",
        json_response(
            r#"{"smartcity:temperature:NewYork":"22.5","smartcity:waste_level:London":"40","smartcity:humidity:NewYork":"65","smartcity:air_quality:NewYork":"45"}"#,
        ),
    )])
    .await;

    let snapshot = source(&base_url).fetch_snapshot().await.unwrap();
    assert_eq!(
        snapshot.keys().map(String::as_str).collect::<Vec<_>>(),
        [
            "smartcity:temperature:NewYork",
            "smartcity:waste_level:London",
            "smartcity:humidity:NewYork",
            "smartcity:air_quality:NewYork",
        ]
    );

    let cities = aggregate(&snapshot);
    let names = cities["NewYork"]
        .metrics
        .iter()
        .map(|metric| metric.metric_name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(names, ["temperature", "humidity", "air_quality"]);
}

#[tokio::test]
async fn non_success_status_is_a_fetch_failure() {
    let base_url = serve(vec![(
        "/data/all",
        "HTTP/1.1 500 Internal Server Error\r\nContent-Length: 0\r\nConnection: close\r\n\r\n".to_string(),
    )])
    .await;

    let result = source(&base_url).fetch_snapshot().await;
    assert!(matches!(result, Err(SourceError::Status(500))), "{result:?}");
}

#[tokio::test]
async fn unreachable_backend_is_a_fetch_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    drop(listener);

    let base_url = Url::parse(&format!("http://{address}")).unwrap();
    let result = source(&base_url).fetch_snapshot().await;
    assert!(matches!(result, Err(SourceError::Request(_))), "{result:?}");
}

#[tokio::test]
async fn push_channel_yields_refresh_events_then_ends() {
    let base_url = serve(vec![(
        "/data/live",
        event_stream_response(
            ": connected\n\nevent: update\ndata: {\"changed\":1}\n\nevent: heartbeat\ndata: -\n\nevent: update\n\ndata: plain\n\n",
        ),
    )])
    .await;

    let source = source(&base_url);
    let stream = source.subscribe().await.unwrap();
    let events = stream.collect::<Vec<_>>().await;
    let events = events
        .into_iter()
        .map(|event| event.unwrap())
        .collect::<Vec<_>>();

    assert_eq!(
        events,
        [
            Notification {
                event: "update".to_string()
            },
            Notification {
                event: "message".to_string()
            },
        ]
    );
}

#[tokio::test]
async fn push_channel_rejects_error_status() {
    let base_url = serve(Vec::new()).await;
    let result = source(&base_url).subscribe().await;
    assert!(matches!(result, Err(SourceError::Status(404))));
}
