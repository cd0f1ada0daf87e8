//! `InspectionStore`: the shared handle UI adapters talk to.
//!
//! The handle is cheap to clone. All clones share one [`InspectionState`]
//! behind a mutex, one readiness latch and one event bus. Network calls never
//! run while the mutex is held.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::time::Duration;

use homeinspect_backend_client::BackendClient;
use homeinspect_backend_client::ClientError;
use homeinspect_backend_client::Token;
use homeinspect_protocol::Comment;
use homeinspect_protocol::CommentId;
use homeinspect_protocol::InspectionResult;
use homeinspect_protocol::ResultId;
use homeinspect_protocol::Section;
use homeinspect_protocol::SectionId;
use homeinspect_protocol::StoreEvent;
use homeinspect_protocol::SubSection;
use homeinspect_protocol::SubSectionId;
use homeinspect_protocol::wire::Ack;
use homeinspect_protocol::wire::Credentials;
use homeinspect_protocol::wire::ResultRecord;
use homeinspect_utils_readiness::Readiness;
use homeinspect_utils_readiness::ReadinessLatch;
use homeinspect_utils_readiness::ReadinessState;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::catalog::Catalog;
use crate::config::InspectConfig;
use crate::error::LookupError;
use crate::error::Result;
use crate::error::StoreError;
use crate::state::InspectionState;

/// Entity totals, for status lines and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StoreCounts {
    pub sections: usize,
    pub subsections: usize,
    /// Includes the sentinel comment.
    pub comments: usize,
    pub live_results: usize,
}

/// A store whose bootstrap is running in the background.
#[derive(Debug)]
pub struct StartedStore {
    pub store: InspectionStore,
    pub events: broadcast::Receiver<StoreEvent>,
    pub bootstrap: JoinHandle<Result<()>>,
}

#[derive(Clone)]
pub struct InspectionStore {
    inner: Arc<Inner>,
}

struct Inner {
    state: Mutex<InspectionState>,
    readiness: ReadinessLatch,
    events: broadcast::Sender<StoreEvent>,
    client: BackendClient,
    credentials: Credentials,
    token: Mutex<Option<Token>>,
    bootstrap_timeout: Duration,
    bootstrap_started: AtomicBool,
}

impl std::fmt::Debug for InspectionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InspectionStore")
            .field("base_url", &self.inner.client.base_url())
            .field("readiness", &self.inner.readiness.state())
            .finish_non_exhaustive()
    }
}

impl InspectionStore {
    /// Build an idle store. Nothing touches the network until
    /// [`bootstrap`](Self::bootstrap) runs.
    pub fn new(config: &InspectConfig) -> Result<Self> {
        config.validate()?;
        let client = BackendClient::new(config.base_url.clone(), config.request_timeout())?;
        Ok(Self::with_client(config, client))
    }

    pub fn with_client(config: &InspectConfig, client: BackendClient) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(InspectionState::default()),
                readiness: ReadinessLatch::new(),
                events,
                client,
                credentials: config.credentials(),
                token: Mutex::new(None),
                bootstrap_timeout: config.bootstrap_timeout(),
                bootstrap_started: AtomicBool::new(false),
            }),
        }
    }

    /// Build a store and start bootstrapping it on the current tokio runtime.
    ///
    /// The returned receiver is subscribed before the bootstrap task is
    /// spawned, so it always sees `HierarchyLoaded` or `BootstrapFailed`.
    pub fn start(config: &InspectConfig) -> Result<StartedStore> {
        let store = Self::new(config)?;
        let events = store.subscribe();
        let task = store.clone();
        let bootstrap = tokio::spawn(async move { task.bootstrap().await });
        Ok(StartedStore {
            store,
            events,
            bootstrap,
        })
    }

    /// Fetch the token and hierarchy, then mark the store ready.
    ///
    /// Runs at most once per store. Later calls wait for the first run to
    /// finish (bounded by the configured bootstrap timeout) and report its
    /// outcome. A failed bootstrap is final for the life of the store.
    pub async fn bootstrap(&self) -> Result<()> {
        if self.inner.bootstrap_started.swap(true, Ordering::SeqCst) {
            return self.wait_ready(self.inner.bootstrap_timeout).await;
        }

        tracing::info!(base_url = %self.inner.client.base_url(), "bootstrapping inspection store");
        match self.load_catalog().await {
            Ok(catalog) => {
                let event = StoreEvent::HierarchyLoaded {
                    sections: catalog.section_count(),
                    subsections: catalog.subsection_count(),
                    comments: catalog.comment_count(),
                };
                *self.lock_state() = InspectionState::new(catalog);
                self.inner.readiness.mark_ready();
                tracing::info!(%event, "inspection store ready");
                self.emit(event);
                Ok(())
            }
            Err(err) => {
                let reason = err.to_string();
                tracing::warn!(code = err.code(), "bootstrap failed: {reason}");
                self.inner.readiness.mark_failed(reason.clone());
                self.emit(StoreEvent::BootstrapFailed {
                    reason: reason.clone(),
                });
                Err(StoreError::BootstrapFailed(reason))
            }
        }
    }

    async fn load_catalog(&self) -> std::result::Result<Catalog, ClientError> {
        let client = &self.inner.client;
        let token = client.request_token(&self.inner.credentials).await?;
        let payload = client.fetch_hierarchy(&token).await?;
        *self.lock_token() = Some(token);
        Ok(Catalog::from_payload(&payload))
    }

    pub fn readiness(&self) -> ReadinessState {
        self.inner.readiness.state()
    }

    pub fn is_ready(&self) -> bool {
        self.inner.readiness.is_ready()
    }

    /// Suspend until bootstrap has finished or `timeout` elapses.
    pub async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        Ok(self.inner.readiness.wait_timeout(timeout).await?)
    }

    pub async fn wait_ready_or_cancel(
        &self,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<()> {
        Ok(self.inner.readiness.wait_or_cancel(timeout, cancel).await?)
    }

    /// Receive every event emitted after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.inner.events.subscribe()
    }

    fn emit(&self, event: StoreEvent) {
        tracing::debug!(%event, "store event");
        // No subscribers is fine.
        let _ = self.inner.events.send(event);
    }

    fn lock_state(&self) -> MutexGuard<'_, InspectionState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_token(&self) -> MutexGuard<'_, Option<Token>> {
        self.inner
            .token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Lock the state, refusing while bootstrap is pending or failed.
    fn ready_state(&self) -> Result<MutexGuard<'_, InspectionState>> {
        match self.inner.readiness.state() {
            ReadinessState::Ready => Ok(self.lock_state()),
            ReadinessState::Pending => Err(StoreError::NotReady),
            ReadinessState::Failed(reason) => Err(StoreError::BootstrapFailed(reason)),
        }
    }

    fn token(&self) -> Result<Token> {
        self.lock_token().clone().ok_or(StoreError::NotReady)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────

    pub fn subsection_text(
        &self,
        section_position: usize,
        subsection_position: usize,
    ) -> Result<String> {
        Ok(self
            .ready_state()?
            .subsection_text(section_position, subsection_position))
    }

    pub fn comment_id(
        &self,
        section_position: usize,
        subsection_position: usize,
        row: usize,
    ) -> Result<Option<CommentId>> {
        Ok(self
            .ready_state()?
            .comment_id(section_position, subsection_position, row))
    }

    pub fn comment_text(&self, comment_id: CommentId) -> Result<String> {
        Ok(self.ready_state()?.comment_text(comment_id))
    }

    pub fn lookup_comment_text(&self, comment_id: CommentId) -> Result<String> {
        let state = self.ready_state()?;
        let text = state.lookup_comment_text(comment_id)?;
        Ok(text.to_string())
    }

    pub fn section_for_subsection(&self, subsection_id: SubSectionId) -> Result<SectionId> {
        Ok(self.ready_state()?.section_for_subsection(subsection_id)?)
    }

    /// Sections in display order.
    pub fn sections(&self) -> Result<Vec<Section>> {
        Ok(self.ready_state()?.catalog().sections().cloned().collect())
    }

    pub fn section_at(&self, position: usize) -> Result<Section> {
        let state = self.ready_state()?;
        let section = state
            .catalog()
            .section_at(position)
            .ok_or(LookupError::SectionPosition(position))?;
        Ok(section.clone())
    }

    pub fn section(&self, section_id: SectionId) -> Result<Section> {
        let state = self.ready_state()?;
        let section = state
            .catalog()
            .section(section_id)
            .ok_or(LookupError::Section(section_id))?;
        Ok(section.clone())
    }

    pub fn subsection(&self, subsection_id: SubSectionId) -> Result<SubSection> {
        let state = self.ready_state()?;
        let subsection = state
            .catalog()
            .subsection(subsection_id)
            .ok_or(LookupError::SubSection(subsection_id))?;
        Ok(subsection.clone())
    }

    pub fn comment(&self, comment_id: CommentId) -> Result<Comment> {
        let state = self.ready_state()?;
        let comment = state
            .catalog()
            .comment(comment_id)
            .ok_or(LookupError::Comment(comment_id))?;
        Ok(comment.clone())
    }

    pub fn result(&self, result_id: ResultId) -> Result<InspectionResult> {
        let state = self.ready_state()?;
        let result = state
            .result(result_id)
            .ok_or(LookupError::Result(result_id))?;
        Ok(result.clone())
    }

    /// Live results in id order.
    pub fn live_results(&self) -> Result<Vec<InspectionResult>> {
        Ok(self.ready_state()?.ledger().live().cloned().collect())
    }

    pub fn counts(&self) -> Result<StoreCounts> {
        let state = self.ready_state()?;
        let catalog = state.catalog();
        Ok(StoreCounts {
            sections: catalog.section_count(),
            subsections: catalog.subsection_count(),
            comments: catalog.comment_count(),
            live_results: state.ledger().live_count(),
        })
    }

    // ─────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────

    pub fn add_result(&self, comment_id: CommentId) -> Result<ResultId> {
        let result_id = self.ready_state()?.add_result(comment_id)?;
        self.emit(StoreEvent::ResultAdded {
            result_id,
            comment_id,
        });
        Ok(result_id)
    }

    /// Returns the comment the removed result was attached to.
    pub fn remove_result(&self, result_id: ResultId) -> Result<CommentId> {
        let comment_id = self.ready_state()?.remove_result(result_id)?;
        self.emit(StoreEvent::ResultRemoved {
            result_id,
            comment_id,
        });
        Ok(comment_id)
    }

    pub fn change_severity(&self, result_id: ResultId) -> Result<u8> {
        let severity = self.ready_state()?.change_severity(result_id)?;
        self.emit(StoreEvent::SeverityChanged {
            result_id,
            severity,
        });
        Ok(severity)
    }

    pub fn change_note(&self, result_id: ResultId, note: impl Into<String>) -> Result<String> {
        let note = self.ready_state()?.change_note(result_id, note.into())?;
        self.emit(StoreEvent::NoteChanged { result_id });
        Ok(note)
    }

    pub fn change_photo(
        &self,
        result_id: ResultId,
        photo_path: impl Into<String>,
    ) -> Result<String> {
        let photo_path = self
            .ready_state()?
            .change_photo(result_id, photo_path.into())?;
        self.emit(StoreEvent::PhotoChanged { result_id });
        Ok(photo_path)
    }

    pub fn change_flags(&self, result_id: ResultId, flags: Vec<i8>) -> Result<Vec<i8>> {
        let flags = self.ready_state()?.change_flags(result_id, flags)?;
        self.emit(StoreEvent::FlagsChanged { result_id });
        Ok(flags)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Backend sync
    // ─────────────────────────────────────────────────────────────────────

    /// Post one result to the backend using the bootstrap token.
    ///
    /// Emits `ResultSubmitted` whether or not the backend accepted it; the
    /// error is returned to the caller. No retries.
    pub async fn submit_result(&self, result_id: ResultId) -> Result<Ack> {
        let record = {
            let state = self.ready_state()?;
            let result = state
                .result(result_id)
                .ok_or(LookupError::Result(result_id))?;
            tracing::debug!(
                result_id,
                already_synced = result.is_synced(),
                "submitting result"
            );
            ResultRecord::from(result)
        };
        let token = self.token()?;

        let outcome = self.inner.client.submit_result(&token, &record).await;
        if let Err(err) = &outcome {
            tracing::warn!(result_id, code = err.code(), "result submission failed: {err}");
        }
        self.emit(StoreEvent::ResultSubmitted {
            result_id,
            accepted: outcome.is_ok(),
        });
        Ok(outcome?)
    }

    /// Read the results the backend already holds. Does not merge them into
    /// the local ledger.
    pub async fn fetch_remote_results(&self) -> Result<Vec<ResultRecord>> {
        drop(self.ready_state()?);
        let token = self.token()?;
        Ok(self.inner.client.fetch_results(&token).await?)
    }
}
