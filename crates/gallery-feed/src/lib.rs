use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use gallery_core::{
    ApplyOutcome, DEFAULT_TERMINAL_PHOTO_ID, EventStream, FeedSlice, GalleryChannelError,
    GalleryCommand, GalleryCommandPort, GalleryError, GalleryErrorCategory, GalleryEventSink,
    GallerySession, PageReconciler, Photo, ReconcileRequest, RemoteFeed, gallery_channels,
};
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{debug, warn};
use url::Url;

pub const DEFAULT_FEED_URL: &str = "https://api.slingacademy.com/v1/sample-data/photos";
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const ERROR_BODY_PREVIEW_CHARS: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpFeedConfig {
    pub base_url: String,
    pub terminal_photo_id: i64,
    pub request_timeout: Duration,
}

impl HttpFeedConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            terminal_photo_id: DEFAULT_TERMINAL_PHOTO_ID,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_terminal_photo_id(mut self, terminal_photo_id: i64) -> Self {
        self.terminal_photo_id = terminal_photo_id;
        self
    }

    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }
}

impl Default for HttpFeedConfig {
    fn default() -> Self {
        Self::new(DEFAULT_FEED_URL)
    }
}

#[derive(Debug, Deserialize)]
struct FeedBody {
    photos: Vec<Photo>,
}

/// Offset/limit client for the JSON photo catalog endpoint.
#[derive(Debug, Clone)]
pub struct HttpFeedClient {
    http: Client,
    base_url: Url,
    terminal_photo_id: i64,
}

impl HttpFeedClient {
    pub fn new(config: HttpFeedConfig) -> Result<Self, GalleryError> {
        let base_url = Url::parse(&config.base_url).map_err(|err| {
            GalleryError::new(
                GalleryErrorCategory::Config,
                "invalid_feed_url",
                format!("invalid feed URL '{}': {err}", config.base_url),
            )
        })?;
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|err| {
                GalleryError::new(
                    GalleryErrorCategory::Config,
                    "client_build_error",
                    err.to_string(),
                )
            })?;

        Ok(Self {
            http,
            base_url,
            terminal_photo_id: config.terminal_photo_id,
        })
    }

    fn slice_url(&self, offset: u64, limit: u32) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("offset", &offset.to_string())
            .append_pair("limit", &limit.to_string());
        url
    }
}

#[async_trait]
impl RemoteFeed for HttpFeedClient {
    async fn fetch_slice(&self, offset: u64, limit: u32) -> Result<FeedSlice, GalleryError> {
        let url = self.slice_url(offset, limit);
        debug!(%url, "requesting feed slice");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GalleryError::network(
                "feed_http_status",
                format!("feed returned {status}: {}", preview(&body)),
            ));
        }

        let bytes = response.bytes().await.map_err(map_reqwest_error)?;
        let photos = parse_feed_body(&bytes)?;
        Ok(FeedSlice::from_photos(photos, limit, self.terminal_photo_id))
    }
}

/// Caller handle for a running gallery. The runtime stops once every clone
/// is dropped.
#[derive(Clone, Debug)]
pub struct GalleryRuntimeHandle {
    port: GalleryCommandPort,
}

impl GalleryRuntimeHandle {
    pub async fn send(&self, command: GalleryCommand) -> Result<(), GalleryChannelError> {
        self.port.send_command(command).await
    }

    pub fn subscribe(&self) -> EventStream {
        self.port.subscribe()
    }
}

/// Start the gallery runtime on the current tokio runtime.
///
/// The first page is requested immediately; the returned stream is
/// subscribed before the runtime starts, so it observes that page.
pub fn spawn_runtime<F>(feed: F, page_size: u32) -> (GalleryRuntimeHandle, EventStream)
where
    F: RemoteFeed + 'static,
{
    let (port, command_rx, sink) = gallery_channels(64, 256);
    let events = port.subscribe();
    let runtime = GalleryRuntime::new(
        sink,
        command_rx,
        PageReconciler::new(feed),
        GallerySession::new(page_size),
    );
    tokio::spawn(async move {
        runtime.run().await;
    });

    (GalleryRuntimeHandle { port }, events)
}

#[derive(Debug)]
struct CycleResult {
    generation: u64,
    result: Result<Vec<Photo>, GalleryError>,
}

struct GalleryRuntime<F> {
    events: GalleryEventSink,
    command_rx: mpsc::Receiver<GalleryCommand>,
    reconciler: Arc<PageReconciler<F>>,
    session: GallerySession,
    result_tx: mpsc::UnboundedSender<CycleResult>,
    result_rx: mpsc::UnboundedReceiver<CycleResult>,
}

impl<F: RemoteFeed + 'static> GalleryRuntime<F> {
    fn new(
        events: GalleryEventSink,
        command_rx: mpsc::Receiver<GalleryCommand>,
        reconciler: PageReconciler<F>,
        session: GallerySession,
    ) -> Self {
        let (result_tx, result_rx) = mpsc::unbounded_channel();
        Self {
            events,
            command_rx,
            reconciler: Arc::new(reconciler),
            session,
            result_tx,
            result_rx,
        }
    }

    async fn run(mut self) {
        let initial = self.session.refresh();
        self.start_cycle(initial);

        loop {
            tokio::select! {
                command = self.command_rx.recv() => {
                    let Some(command) = command else {
                        break;
                    };
                    self.handle_command(command);
                }
                Some(done) = self.result_rx.recv() => self.handle_cycle_result(done),
            }
        }
        debug!("command channel closed, gallery runtime stopping");
    }

    fn handle_command(&mut self, command: GalleryCommand) {
        debug!(?command, "handling gallery command");
        match self.session.apply(&command) {
            Ok(effect) => {
                for event in effect.events {
                    self.events.emit(event);
                }
                if let Some(request) = effect.request {
                    self.start_cycle(request);
                }
            }
            Err(err) => self.events.publish_rejection(err),
        }
    }

    // Results come back tagged with their generation; nothing is cancelled.
    fn start_cycle(&self, request: ReconcileRequest) {
        let reconciler = Arc::clone(&self.reconciler);
        let result_tx = self.result_tx.clone();
        tokio::spawn(async move {
            let result = request.run(&*reconciler).await;
            let _ = result_tx.send(CycleResult {
                generation: request.generation,
                result,
            });
        });
    }

    fn handle_cycle_result(&mut self, done: CycleResult) {
        let outcome = self.session.apply_result(done.generation, done.result);
        if let ApplyOutcome::Failed { generation, error } = &outcome {
            warn!(generation, %error, "page reconciliation failed, keeping previous page");
        }
        self.events.publish_outcome(outcome);
    }
}

fn parse_feed_body(bytes: &[u8]) -> Result<Vec<Photo>, GalleryError> {
    serde_json::from_slice::<FeedBody>(bytes)
        .map(|body| body.photos)
        .map_err(|err| GalleryError::network("feed_parse_error", err.to_string()))
}

fn map_reqwest_error(err: reqwest::Error) -> GalleryError {
    if err.is_timeout() {
        GalleryError::network("feed_timeout", err.to_string())
    } else if err.is_decode() {
        GalleryError::network("feed_parse_error", err.to_string())
    } else {
        GalleryError::network("feed_transport_error", err.to_string())
    }
}

fn preview(body: &str) -> String {
    body.chars().take(ERROR_BODY_PREVIEW_CHARS).collect()
}
