//! HTTP collector sink
//!
//! Events are serialized on the caller's thread and posted from a small
//! dedicated tokio runtime, so a slow or unreachable collector never blocks
//! sensor ingestion. Transport errors and non-success statuses are logged
//! and counted; nothing is retried.

use super::{EventSink, SinkEvent, SinkStats};
use crate::config::{parse_endpoint, SinkSettings};
use crate::error::{MotionError, Result};
use reqwest::header::CONTENT_TYPE;
use reqwest::Url;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tokio::runtime::Runtime;

/// How long dropping the sink waits for in-flight requests
const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

#[derive(Debug, Default)]
struct Counters {
    sent: AtomicU64,
    failed: AtomicU64,
    skipped: AtomicU64,
    in_flight: AtomicU64,
}

/// Posts collector events as JSON
pub struct HttpSink {
    runtime: Option<Runtime>,
    client: reqwest::Client,
    endpoint: RwLock<Option<Url>>,
    counters: Arc<Counters>,
}

impl HttpSink {
    /// Create a sink from settings
    ///
    /// A missing or unparseable URL is accepted; events are then skipped
    /// until [`set_server_url`](Self::set_server_url) provides one.
    pub fn new(settings: &SinkSettings) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("motion-sink")
            .enable_all()
            .build()
            .map_err(|e| MotionError::Network(format!("Failed to start sink runtime: {}", e)))?;

        let client = reqwest::Client::builder()
            .timeout(settings.request_timeout())
            .build()?;

        let endpoint = settings.endpoint();
        match &endpoint {
            Some(url) => tracing::info!("Collector endpoint: {}", url),
            None => tracing::info!("No collector endpoint configured, notifications disabled"),
        }

        Ok(Self {
            runtime: Some(runtime),
            client,
            endpoint: RwLock::new(endpoint),
            counters: Arc::new(Counters::default()),
        })
    }

    /// Replace the collector URL; `None` or an unusable URL disables sending
    pub fn set_server_url(&self, url: Option<&str>) {
        let endpoint = url.and_then(parse_endpoint);
        match &endpoint {
            Some(url) => tracing::info!("Collector endpoint changed to {}", url),
            None => tracing::info!("Collector endpoint cleared"),
        }
        *self
            .endpoint
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = endpoint;
    }

    /// Current collector URL
    pub fn endpoint(&self) -> Option<Url> {
        self.endpoint
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Delivery counters
    pub fn stats(&self) -> SinkStats {
        SinkStats {
            sent: self.counters.sent.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
            skipped: self.counters.skipped.load(Ordering::Relaxed),
            in_flight: self.counters.in_flight.load(Ordering::Acquire),
        }
    }

    /// Wait until no request is in flight, up to `timeout`
    ///
    /// Returns `true` if the sink became idle in time.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.counters.in_flight.load(Ordering::Acquire) > 0 {
            if Instant::now() >= deadline {
                return false;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        true
    }
}

impl EventSink for HttpSink {
    fn send(&self, event: SinkEvent) {
        let Some(url) = self.endpoint() else {
            tracing::debug!("No collector URL set, skipping {} event", event.name());
            self.counters.skipped.fetch_add(1, Ordering::Relaxed);
            return;
        };

        let Some(runtime) = self.runtime.as_ref() else {
            return;
        };

        let body = match event.to_json() {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("Failed to encode {} event: {}", event.name(), e);
                self.counters.failed.fetch_add(1, Ordering::Relaxed);
                return;
            }
        };

        let request = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body);
        let counters = Arc::clone(&self.counters);
        let name = event.name();

        counters.in_flight.fetch_add(1, Ordering::AcqRel);
        runtime.spawn(async move {
            match request.send().await {
                Ok(response) if response.status().is_success() => {
                    counters.sent.fetch_add(1, Ordering::Relaxed);
                }
                Ok(response) => {
                    tracing::warn!(
                        "Collector rejected {} event: HTTP {}",
                        name,
                        response.status()
                    );
                    counters.failed.fetch_add(1, Ordering::Relaxed);
                }
                Err(e) => {
                    tracing::warn!("Failed to send {} event: {}", name, e);
                    counters.failed.fetch_add(1, Ordering::Relaxed);
                }
            }
            counters.in_flight.fetch_sub(1, Ordering::AcqRel);
        });
    }
}

impl Drop for HttpSink {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_timeout(SHUTDOWN_GRACE);
        }
    }
}

impl std::fmt::Debug for HttpSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpSink")
            .field("endpoint", &self.endpoint())
            .field("stats", &self.stats())
            .finish()
    }
}
