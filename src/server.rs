use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    convert::Infallible,
    net::SocketAddr,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};
use tokio::sync::{broadcast, Mutex};
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};
use tokio_stream::{Stream, StreamExt};
use tracing::{debug, info, warn};

use crate::api::{ApiAnalyzeRequest, ApiAnalyzeResponse, ApiExtractRequest, ApiExtractResponse};
use channel_intel::analysis::{BatchAnalyzer, CancelToken};
use channel_intel::config::AppConfig;
use channel_intel::{extract, Error, Result};

const EVENT_BUFFER: usize = 64;
const FINISHED_LINGER: Duration = Duration::from_secs(10);
const DISCONNECT_GRACE: Duration = Duration::from_secs(2);

#[derive(Clone)]
struct AppState {
    config: Arc<AppConfig>,
    progress: Arc<ProgressHub>,
}

#[derive(Debug, Clone, Serialize)]
struct StreamEvent {
    event: &'static str,
    message: String,
    percent: Option<u8>,
    timestamp_ms: i64,
}

impl StreamEvent {
    fn new(event: &'static str, message: impl Into<String>, percent: Option<u8>) -> Self {
        Self {
            event,
            message: message.into(),
            percent,
            timestamp_ms: Utc::now().timestamp_millis(),
        }
    }
}

#[derive(Deserialize)]
struct StreamQuery {
    request_id: String,
}

struct ProgressChannel {
    sender: broadcast::Sender<StreamEvent>,
    running: usize,
}

/// Progress channels keyed by request id. A channel lives while an analysis
/// runs on it or a client listens to it, and is dropped afterwards.
struct ProgressHub {
    channels: Mutex<HashMap<String, ProgressChannel>>,
    finished_linger: Duration,
    disconnect_grace: Duration,
}

impl ProgressHub {
    fn new(finished_linger: Duration, disconnect_grace: Duration) -> Self {
        Self {
            channels: Mutex::new(HashMap::new()),
            finished_linger,
            disconnect_grace,
        }
    }

    async fn subscribe(&self, request_id: &str) -> broadcast::Receiver<StreamEvent> {
        let mut channels = self.channels.lock().await;
        channel_entry(&mut channels, request_id).sender.subscribe()
    }

    /// Registers a running analysis and hands back its sender.
    async fn begin(&self, request_id: &str) -> broadcast::Sender<StreamEvent> {
        let mut channels = self.channels.lock().await;
        let channel = channel_entry(&mut channels, request_id);
        channel.running += 1;
        channel.sender.clone()
    }

    /// Ends one analysis. Listeners get the lingering window to drain the
    /// last events, then the channel goes away and their streams close.
    async fn finish(self: Arc<Self>, request_id: String) {
        {
            let mut channels = self.channels.lock().await;
            if let Some(channel) = channels.get_mut(&request_id) {
                channel.running = channel.running.saturating_sub(1);
            }
        }
        pause(self.finished_linger).await;
        self.remove_if(&request_id, |channel| channel.running == 0)
            .await;
    }

    /// Drops a channel nobody listens to and nothing runs on.
    async fn release(self: Arc<Self>, request_id: String) {
        pause(self.disconnect_grace).await;
        self.remove_if(&request_id, |channel| {
            channel.running == 0 && channel.sender.receiver_count() == 0
        })
        .await;
    }

    async fn remove_if(&self, request_id: &str, idle: impl Fn(&ProgressChannel) -> bool) {
        let mut channels = self.channels.lock().await;
        if channels.get(request_id).is_some_and(|channel| idle(channel)) {
            channels.remove(request_id);
            debug!(request_id, "progress channel removed");
        }
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.channels.lock().await.len()
    }
}

fn channel_entry<'a>(
    channels: &'a mut HashMap<String, ProgressChannel>,
    request_id: &str,
) -> &'a mut ProgressChannel {
    channels
        .entry(request_id.to_string())
        .or_insert_with(|| ProgressChannel {
            sender: broadcast::channel(EVENT_BUFFER).0,
            running: 0,
        })
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

/// Rides along inside an SSE stream and releases its channel once the
/// client goes away.
struct ListenerRelease {
    progress: Arc<ProgressHub>,
    request_id: String,
}

impl Drop for ListenerRelease {
    fn drop(&mut self) {
        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            let request_id = std::mem::take(&mut self.request_id);
            runtime.spawn(self.progress.clone().release(request_id));
        }
    }
}

static REQUEST_COUNTER: AtomicUsize = AtomicUsize::new(0);

pub async fn serve(args: crate::ServeArgs, config: AppConfig) -> Result<()> {
    let host = args.host.unwrap_or_else(|| config.server.host.clone());
    let port = args.port.unwrap_or(config.server.port);

    let state = AppState {
        config: Arc::new(config),
        progress: Arc::new(ProgressHub::new(FINISHED_LINGER, DISCONNECT_GRACE)),
    };

    let app = Router::new()
        .route("/api/health", get(health))
        .route("/api/extract", post(extract_handler))
        .route("/api/analyze", post(analyze_handler))
        .route("/api/analyze/stream", get(stream_handler))
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .map_err(|err| Error::Server(format!("invalid bind address: {}", err)))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|err| Error::Server(format!("failed to bind server: {}", err)))?;
    info!(%addr, "listening");

    axum::serve(listener, app)
        .await
        .map_err(|err| Error::Server(format!("server error: {}", err)))?;

    Ok(())
}

async fn health() -> impl IntoResponse {
    StatusCode::OK
}

async fn extract_handler(Json(request): Json<ApiExtractRequest>) -> Json<ApiExtractResponse> {
    let identifiers = extract(&request.into_text());
    Json(ApiExtractResponse::from_identifiers(identifiers))
}

async fn analyze_handler(
    State(state): State<AppState>,
    Json(request): Json<ApiAnalyzeRequest>,
) -> std::result::Result<Json<ApiAnalyzeResponse>, (StatusCode, String)> {
    let request_id = request
        .request_id
        .clone()
        .unwrap_or_else(next_request_id);
    let records = request
        .into_records()
        .map_err(|err| (StatusCode::BAD_REQUEST, err.to_string()))?;

    let sender = state.progress.begin(&request_id).await;
    let _ = sender.send(StreamEvent::new(
        "start",
        format!("Analyzing {} records", records.len()),
        None,
    ));

    let analyzer = BatchAnalyzer::from_config(&state.config);
    let progress_sender = sender.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        analyzer.run(&records, &CancelToken::new(), |event| {
            let _ = progress_sender.send(StreamEvent::new(
                "progress",
                event.message,
                Some(event.percent),
            ));
        })
    })
    .await;

    let finished = match outcome {
        Ok(report) => {
            let _ = sender.send(StreamEvent::new("done", "Analysis complete", Some(100)));
            Ok(Json(ApiAnalyzeResponse {
                request_id: request_id.clone(),
                report,
            }))
        }
        Err(err) => {
            warn!(request_id = %request_id, error = %err, "analysis task failed");
            let _ = sender.send(StreamEvent::new("error", "Analysis failed", None));
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("analysis failed: {}", err),
            ))
        }
    };

    tokio::spawn(state.progress.clone().finish(request_id));
    finished
}

async fn stream_handler(
    State(state): State<AppState>,
    Query(query): Query<StreamQuery>,
) -> Sse<impl Stream<Item = std::result::Result<Event, Infallible>>> {
    let stream = progress_stream(state.progress.clone(), query.request_id).await;
    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(8)))
}

async fn progress_stream(
    progress: Arc<ProgressHub>,
    request_id: String,
) -> impl Stream<Item = std::result::Result<Event, Infallible>> {
    let receiver = progress.subscribe(&request_id).await;
    let release = ListenerRelease {
        progress,
        request_id,
    };
    let connected = StreamEvent::new("connected", "Streaming analysis progress", None);

    tokio_stream::once(Ok::<_, BroadcastStreamRecvError>(connected))
        .chain(BroadcastStream::new(receiver))
        .filter_map(move |event| {
            let _listener = &release;
            let event = event.ok()?;
            let data = serde_json::to_string(&event).ok()?;
            Some(Ok(Event::default().data(data)))
        })
}

fn next_request_id() -> String {
    let counter = REQUEST_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("req-{}-{}", Utc::now().timestamp_millis(), counter)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hub() -> Arc<ProgressHub> {
        Arc::new(ProgressHub::new(Duration::ZERO, Duration::ZERO))
    }

    async fn settle(progress: &ProgressHub, expected: usize) -> usize {
        for _ in 0..100 {
            if progress.len().await == expected {
                break;
            }
            tokio::task::yield_now().await;
        }
        progress.len().await
    }

    #[tokio::test]
    async fn finished_analysis_drops_its_channel() {
        let progress = hub();
        let sender = progress.begin("req-a").await;
        let mut receiver = progress.subscribe("req-a").await;
        let _ = sender.send(StreamEvent::new("done", "Analysis complete", Some(100)));

        progress.clone().finish("req-a".to_string()).await;

        assert_eq!(progress.len().await, 0);
        assert_eq!(receiver.recv().await.unwrap().event, "done");
    }

    #[tokio::test]
    async fn listener_only_channel_is_released() {
        let progress = hub();
        let receiver = progress.subscribe("req-b").await;
        drop(receiver);

        progress.clone().release("req-b".to_string()).await;
        assert_eq!(progress.len().await, 0);
    }

    #[tokio::test]
    async fn release_keeps_channel_while_analysis_runs() {
        let progress = hub();
        let _sender = progress.begin("req-c").await;
        drop(progress.subscribe("req-c").await);

        progress.clone().release("req-c".to_string()).await;
        assert_eq!(progress.len().await, 1);

        progress.clone().finish("req-c".to_string()).await;
        assert_eq!(progress.len().await, 0);
    }

    #[tokio::test]
    async fn release_keeps_channel_with_live_listener() {
        let progress = hub();
        let _first = progress.subscribe("req-d").await;
        drop(progress.subscribe("req-d").await);

        progress.clone().release("req-d".to_string()).await;
        assert_eq!(progress.len().await, 1);
    }

    #[tokio::test]
    async fn dropped_stream_releases_channel() {
        let progress = hub();
        let stream = progress_stream(progress.clone(), "req-e".to_string()).await;
        assert_eq!(progress.len().await, 1);

        drop(stream);
        assert_eq!(settle(&progress, 0).await, 0);
    }

    #[tokio::test]
    async fn stream_starts_with_connected_event() {
        let progress = hub();
        let stream = progress_stream(progress.clone(), "req-f".to_string()).await;
        tokio::pin!(stream);

        assert!(stream.next().await.unwrap().is_ok());
    }
}
