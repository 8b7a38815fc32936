//! Persistence gateway: authenticated transport to the remote month service
//! plus a debounced save worker.
//!
//! # Debounce contract
//! - Every [`SaveScheduler::schedule`] call replaces the pending document and
//!   restarts the quiet window.
//! - When the window elapses, the newest pending document is sent. Older
//!   ones are never sent, and a sent document is not sent again.
//! - Saves run one at a time on the worker task and are never retried.
//! - A save outcome only updates [`SaveStatus`]; it never touches the local
//!   month.

use crate::config::Config;
use crate::errors::GatewayError;
use crate::models::{MonthDocument, RemoteMonth, SaveStatus};
use crate::reconcile::MonthKey;
use reqwest::{Client, StatusCode};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::sleep;
use tracing::{debug, info, warn};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const FLUSH_QUEUE: usize = 8;

pub trait MonthRemote: Send + Sync + 'static {
    /// `Ok(None)` means the service has no document for `key` yet.
    fn load(
        &self,
        key: MonthKey,
    ) -> impl Future<Output = Result<Option<RemoteMonth>, GatewayError>> + Send;

    fn save(
        &self,
        document: &MonthDocument,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;
}

pub struct HttpMonthRemote {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpMonthRemote {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Result<Self, GatewayError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, GatewayError> {
        Self::new(config.api_url.clone(), config.api_token.clone())
    }

    fn token(&self) -> Result<&str, GatewayError> {
        self.token.as_deref().ok_or(GatewayError::Unauthorized)
    }
}

impl MonthRemote for HttpMonthRemote {
    async fn load(&self, key: MonthKey) -> Result<Option<RemoteMonth>, GatewayError> {
        let token = self.token()?;
        let url = format!("{}/months/{}/{}", self.base_url, key.year, key.month);
        let response = self.client.get(&url).bearer_auth(token).send().await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            warn!("month service rejected credential while loading {key}");
            return Err(GatewayError::Unauthorized);
        }
        if !status.is_success() {
            debug!(%status, "no month document for {key}");
            return Ok(None);
        }

        Ok(response.json::<Option<RemoteMonth>>().await?)
    }

    async fn save(&self, document: &MonthDocument) -> Result<(), GatewayError> {
        let token = self.token()?;
        let url = format!("{}/months/save", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(document)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(GatewayError::Unauthorized);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

type FlushReply = oneshot::Sender<Result<(), GatewayError>>;

/// Handle to the debounced save worker. Dropping it stops the worker after
/// any pending document has been sent.
pub struct SaveScheduler {
    pending: Arc<watch::Sender<Option<MonthDocument>>>,
    flushes: mpsc::Sender<FlushReply>,
    status: Arc<watch::Sender<SaveStatus>>,
}

impl SaveScheduler {
    pub fn spawn<R: MonthRemote>(remote: Arc<R>, window: Duration) -> Self {
        let (pending, pending_rx) = watch::channel(None);
        let pending = Arc::new(pending);
        let (flushes, flushes_rx) = mpsc::channel(FLUSH_QUEUE);
        let (status, _) = watch::channel(SaveStatus::Idle);
        let status = Arc::new(status);

        let worker = SaveWorker {
            remote,
            window,
            slot: Arc::clone(&pending),
            pending: pending_rx,
            flushes: flushes_rx,
            status: Arc::clone(&status),
        };
        tokio::spawn(worker.run());

        Self {
            pending,
            flushes,
            status,
        }
    }

    /// Queues `document` as the newest snapshot and restarts the window.
    pub fn schedule(&self, document: MonthDocument) {
        self.pending.send_replace(Some(document));
        self.status.send_replace(SaveStatus::Pending);
    }

    /// Sends the newest pending document right away. Nothing is sent when
    /// every queued document has already gone out.
    pub async fn flush(&self) -> Result<(), GatewayError> {
        let (reply, outcome) = oneshot::channel();
        self.flushes
            .send(reply)
            .await
            .map_err(|_| GatewayError::Transport("save worker stopped".to_string()))?;
        outcome
            .await
            .map_err(|_| GatewayError::Transport("save worker stopped".to_string()))?
    }

    pub async fn save_now(&self, document: MonthDocument) -> Result<(), GatewayError> {
        self.schedule(document);
        self.flush().await
    }

    pub fn status(&self) -> SaveStatus {
        self.status.borrow().clone()
    }
}

struct SaveWorker<R> {
    remote: Arc<R>,
    window: Duration,
    slot: Arc<watch::Sender<Option<MonthDocument>>>,
    pending: watch::Receiver<Option<MonthDocument>>,
    flushes: mpsc::Receiver<FlushReply>,
    status: Arc<watch::Sender<SaveStatus>>,
}

enum Wake {
    Scheduled,
    Flush(FlushReply),
    Closed,
}

impl<R: MonthRemote> SaveWorker<R> {
    async fn run(mut self) {
        loop {
            // Pending documents first, so a closing handle still gets its
            // last snapshot sent. The worker shares the slot, so closing is
            // seen on the flush channel.
            let wake = tokio::select! {
                biased;
                changed = self.pending.changed() => match changed {
                    Ok(()) => Wake::Scheduled,
                    Err(_) => Wake::Closed,
                },
                reply = self.flushes.recv() => match reply {
                    Some(reply) => Wake::Flush(reply),
                    None => Wake::Closed,
                },
            };

            match wake {
                Wake::Scheduled => {
                    let reply = self.quiet_window().await;
                    let result = self.save_latest().await;
                    if let Some(reply) = reply {
                        let _ = reply.send(result);
                    }
                }
                Wake::Flush(reply) => {
                    let result = self.save_latest().await;
                    let _ = reply.send(result);
                }
                Wake::Closed => break,
            }
        }
        debug!("save worker stopped");
    }

    /// Waits until no request arrived for a full window. A flush request cuts
    /// the wait short and is handed back to be answered.
    async fn quiet_window(&mut self) -> Option<FlushReply> {
        loop {
            tokio::select! {
                changed = self.pending.changed() => {
                    if changed.is_err() {
                        return None;
                    }
                }
                reply = self.flushes.recv() => return reply,
                () = sleep(self.window) => return None,
            }
        }
    }

    // Empties the slot without waking the receiver.
    fn take_pending(&self) -> Option<MonthDocument> {
        let mut taken = None;
        self.slot.send_if_modified(|slot| {
            taken = slot.take();
            false
        });
        taken
    }

    async fn save_latest(&mut self) -> Result<(), GatewayError> {
        self.pending.borrow_and_update();
        let Some(document) = self.take_pending() else {
            return Ok(());
        };

        self.status.send_replace(SaveStatus::Saving);
        let result = self.remote.save(&document).await;
        match &result {
            Ok(()) => {
                info!(
                    habits = document.habits.len(),
                    "saved month {}/{}", document.year, document.month
                );
                let next = if self.pending.has_changed().unwrap_or(false) {
                    SaveStatus::Pending
                } else {
                    SaveStatus::Saved
                };
                self.status.send_replace(next);
            }
            Err(err) => {
                warn!("month save failed: {err}");
                self.status.send_replace(SaveStatus::Failed {
                    message: err.to_string(),
                });
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MonthState;
    use crate::reconcile::to_wire_format;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[derive(Default)]
    struct FakeRemote {
        saved: Mutex<Vec<MonthDocument>>,
        fail: AtomicBool,
        latency: Option<Duration>,
    }

    impl FakeRemote {
        fn titles(&self) -> Vec<String> {
            self.saved
                .lock()
                .unwrap()
                .iter()
                .map(|doc| doc.title.clone())
                .collect()
        }
    }

    impl MonthRemote for FakeRemote {
        async fn load(&self, _key: MonthKey) -> Result<Option<RemoteMonth>, GatewayError> {
            Ok(None)
        }

        async fn save(&self, document: &MonthDocument) -> Result<(), GatewayError> {
            self.saved.lock().unwrap().push(document.clone());
            if let Some(latency) = self.latency {
                sleep(latency).await;
            }
            if self.fail.load(Ordering::SeqCst) {
                Err(GatewayError::Rejected {
                    status: 500,
                    body: String::new(),
                })
            } else {
                Ok(())
            }
        }
    }

    fn document(title: &str) -> MonthDocument {
        let mut state = MonthState::empty();
        state.month_name = title.to_string();
        to_wire_format(&state, MonthKey { year: 2026, month: 10 })
    }

    fn scheduler(remote: &Arc<FakeRemote>) -> SaveScheduler {
        SaveScheduler::spawn(Arc::clone(remote), Duration::from_millis(800))
    }

    #[tokio::test(start_paused = true)]
    async fn burst_collapses_to_latest_document() {
        let remote = Arc::new(FakeRemote::default());
        let saver = scheduler(&remote);

        saver.schedule(document("a"));
        saver.schedule(document("b"));
        saver.schedule(document("c"));
        assert_eq!(saver.status(), SaveStatus::Pending);

        sleep(Duration::from_millis(900)).await;
        assert_eq!(remote.titles(), vec!["c"]);
        assert_eq!(saver.status(), SaveStatus::Saved);
    }

    #[tokio::test(start_paused = true)]
    async fn each_request_restarts_the_window() {
        let remote = Arc::new(FakeRemote::default());
        let saver = scheduler(&remote);

        saver.schedule(document("a"));
        sleep(Duration::from_millis(500)).await;
        saver.schedule(document("b"));
        sleep(Duration::from_millis(500)).await;
        assert!(remote.titles().is_empty());

        sleep(Duration::from_millis(400)).await;
        assert_eq!(remote.titles(), vec!["b"]);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_save_is_reported_and_not_retried() {
        let remote = Arc::new(FakeRemote::default());
        remote.fail.store(true, Ordering::SeqCst);
        let saver = scheduler(&remote);

        saver.schedule(document("a"));
        sleep(Duration::from_millis(900)).await;
        assert!(matches!(saver.status(), SaveStatus::Failed { .. }));

        sleep(Duration::from_secs(5)).await;
        assert_eq!(remote.titles().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn flush_skips_the_window() {
        let remote = Arc::new(FakeRemote::default());
        let saver = scheduler(&remote);

        saver.save_now(document("now")).await.unwrap();
        assert_eq!(remote.titles(), vec!["now"]);

        sleep(Duration::from_secs(2)).await;
        assert_eq!(remote.titles().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn flush_without_pending_document_sends_nothing() {
        let remote = Arc::new(FakeRemote::default());
        let saver = scheduler(&remote);

        saver.flush().await.unwrap();
        assert!(remote.titles().is_empty());
        assert_eq!(saver.status(), SaveStatus::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn flush_reports_failure() {
        let remote = Arc::new(FakeRemote::default());
        remote.fail.store(true, Ordering::SeqCst);
        let saver = scheduler(&remote);

        let err = saver.save_now(document("x")).await.unwrap_err();
        assert!(matches!(err, GatewayError::Rejected { status: 500, .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_handle_sends_pending_document() {
        let remote = Arc::new(FakeRemote::default());
        let saver = scheduler(&remote);

        saver.schedule(document("last"));
        drop(saver);
        sleep(Duration::from_secs(1)).await;
        assert_eq!(remote.titles(), vec!["last"]);
    }

    #[tokio::test(start_paused = true)]
    async fn edit_during_save_is_sent_afterwards() {
        let remote = Arc::new(FakeRemote {
            latency: Some(Duration::from_millis(500)),
            ..FakeRemote::default()
        });
        let saver = scheduler(&remote);

        saver.schedule(document("a"));
        sleep(Duration::from_millis(850)).await;
        assert_eq!(remote.titles(), vec!["a"]);
        assert_eq!(saver.status(), SaveStatus::Saving);

        saver.schedule(document("b"));
        sleep(Duration::from_millis(600)).await;
        assert_eq!(saver.status(), SaveStatus::Pending);

        sleep(Duration::from_secs(2)).await;
        assert_eq!(remote.titles(), vec!["a", "b"]);
        assert_eq!(saver.status(), SaveStatus::Saved);
    }

    #[tokio::test(start_paused = true)]
    async fn flush_after_save_sends_nothing_new() {
        let remote = Arc::new(FakeRemote::default());
        let saver = scheduler(&remote);

        saver.schedule(document("a"));
        sleep(Duration::from_secs(2)).await;
        assert_eq!(remote.titles(), vec!["a"]);

        saver.flush().await.unwrap();
        assert_eq!(remote.titles(), vec!["a"]);
        assert_eq!(saver.status(), SaveStatus::Saved);

        saver.save_now(document("a")).await.unwrap();
        assert_eq!(remote.titles(), vec!["a", "a"]);
    }
}
