use std::{sync::Arc, time::Duration};

use serde_json::Value;
use tokio::{
    select,
    sync::{watch, Mutex},
};
use tracing::{debug, info, info_span, warn, Instrument};
use tokio_util::sync::CancellationToken;

use crate::{
    api::DraftStore,
    error::ApiError,
    models::{Draft, DraftKey},
    utils::Debouncer,
};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(2_000);

#[derive(Clone, Debug)]
pub struct FormModel {
    values: Arc<watch::Sender<Draft>>,
}

impl FormModel {
    pub fn new(defaults: Draft) -> FormModel {
        let (sender, _) = watch::channel(defaults);
        FormModel {
            values: Arc::new(sender),
        }
    }

    pub fn values(&self) -> Draft {
        self.values.borrow().clone()
    }

    pub fn get(&self, field: &str) -> Option<Value> {
        self.values.borrow().get(field).cloned()
    }

    pub fn set_field(&self, field: impl Into<String>, value: impl Into<Value>) {
        let field = field.into();
        let value = value.into();
        self.values.send_modify(|values| {
            values.insert(field, value);
        });
    }

    pub fn replace(&self, values: Draft) {
        self.values.send_replace(values);
    }

    pub fn subscribe(&self) -> watch::Receiver<Draft> {
        self.values.subscribe()
    }
}

/// Errors are only ever reported here, never returned or retried.
pub trait DraftSyncListener: Send + Sync {
    fn on_load_success(&self, _draft: Option<&Draft>) {}

    fn on_load_error(&self, _error: &ApiError) {}

    fn on_save_success(&self, _draft: &Draft) {}

    fn on_save_error(&self, _error: &ApiError) {}
}

impl DraftSyncListener for () {}

#[derive(Clone, Debug)]
pub struct DraftSyncOptions {
    pub key: DraftKey,
    pub debounce: Duration,
}

impl DraftSyncOptions {
    pub fn new(key: DraftKey) -> DraftSyncOptions {
        DraftSyncOptions {
            key,
            debounce: DEFAULT_DEBOUNCE,
        }
    }

    pub fn debounce(mut self, debounce: Duration) -> DraftSyncOptions {
        self.debounce = debounce;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    Unchanged,
    NotLoaded,
    Cancelled,
    Failed,
}

pub struct DraftSynchronizer {
    shared: Arc<Shared>,
    session: Option<CancellationToken>,
}

struct Shared {
    store: Arc<dyn DraftStore>,
    form: FormModel,
    listener: Arc<dyn DraftSyncListener>,
    key: DraftKey,
    debounce: Duration,
    state: Mutex<SyncState>,
}

#[derive(Debug, Default)]
struct SyncState {
    has_loaded: bool,
    last_synced: Option<String>,
}

impl DraftSynchronizer {
    pub fn new(
        store: Arc<dyn DraftStore>,
        form: FormModel,
        options: DraftSyncOptions,
        listener: Arc<dyn DraftSyncListener>,
    ) -> DraftSynchronizer {
        DraftSynchronizer {
            shared: Arc::new(Shared {
                store,
                form,
                listener,
                key: options.key,
                debounce: options.debounce,
                state: Mutex::new(SyncState::default()),
            }),
            session: None,
        }
    }

    pub fn form(&self) -> &FormModel {
        &self.shared.form
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    /// Must be called from within a tokio runtime.
    pub fn set_open(&mut self, open: bool) {
        match (open, self.session.is_some()) {
            (true, false) => self.open(),
            (false, true) => self.close(),
            _ => {}
        }
    }

    pub async fn has_loaded(&self) -> bool {
        self.shared.state.lock().await.has_loaded
    }

    pub async fn flush(&self) -> SaveOutcome {
        let values = self.shared.form.values();
        self.shared.persist(values, None).await
    }

    fn open(&mut self) {
        let key = &self.shared.key;
        if !key.is_complete() {
            debug!("Not syncing draft without both an event and a user: {key:?}");
            return;
        }

        let cancel = CancellationToken::new();
        let span = info_span!("draft_sync", event_id = %key.event_id, user_id = %key.user_id);
        tokio::spawn(run_session(self.shared.clone(), cancel.clone()).instrument(span));
        self.session = Some(cancel);
    }

    fn close(&mut self) {
        if let Some(cancel) = self.session.take() {
            cancel.cancel();
        }
    }
}

impl Drop for DraftSynchronizer {
    fn drop(&mut self) {
        self.close();
    }
}

async fn run_session(shared: Arc<Shared>, cancel: CancellationToken) {
    if shared.load(&cancel).await {
        shared.autosave(&cancel).await;
    }
}

fn snapshot(draft: &Draft) -> Result<String, ApiError> {
    Ok(serde_json::to_string(draft)?)
}

impl Shared {
    async fn load(&self, cancel: &CancellationToken) -> bool {
        let mut state = self.state.lock().await;
        state.has_loaded = false;

        let result = self.store.load_draft(&self.key).await;
        if cancel.is_cancelled() {
            debug!("Draft load finished after close, discarding it");
            return false;
        }

        let loaded = match result {
            Ok(Some(draft)) => snapshot(&draft).map(|snapshot| (Some(draft), snapshot)),
            // Without a remote draft the defaults count as synced, otherwise the first
            // debounce tick would save them right away.
            Ok(None) => snapshot(&self.form.values()).map(|snapshot| (None, snapshot)),
            Err(err) => Err(err),
        };

        match loaded {
            Ok((draft, snapshot)) => {
                if let Some(draft) = &draft {
                    self.form.replace(draft.clone());
                }
                state.last_synced = Some(snapshot);
                state.has_loaded = true;
                drop(state);

                info!("Draft loaded (found: {})", draft.is_some());
                self.listener.on_load_success(draft.as_ref());
                true
            }
            Err(err) => {
                drop(state);
                warn!("Could not load draft: {err}");
                self.listener.on_load_error(&err);
                false
            }
        }
    }

    async fn autosave(&self, cancel: &CancellationToken) {
        let mut values = self.form.subscribe();
        let mut debouncer = Debouncer::new(self.debounce);

        loop {
            select! {
                _ = cancel.cancelled() => return,

                changed = values.changed() => {
                    if changed.is_err() {
                        return;
                    }
                    debouncer.touch();
                }

                _ = debouncer.elapsed() => {
                    debouncer.reset();
                    let draft = values.borrow_and_update().clone();
                    if self.persist(draft, Some(cancel)).await == SaveOutcome::Cancelled {
                        return;
                    }
                }
            }
        }
    }

    async fn persist(&self, draft: Draft, cancel: Option<&CancellationToken>) -> SaveOutcome {
        let is_cancelled = || cancel.is_some_and(CancellationToken::is_cancelled);

        let mut state = self.state.lock().await;
        if is_cancelled() {
            return SaveOutcome::Cancelled;
        }
        if !state.has_loaded {
            debug!("Draft not loaded yet, not saving");
            return SaveOutcome::NotLoaded;
        }

        let snapshot = match snapshot(&draft) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                drop(state);
                warn!("Could not serialize draft: {err}");
                self.listener.on_save_error(&err);
                return SaveOutcome::Failed;
            }
        };

        if state.last_synced.as_deref() == Some(snapshot.as_str()) {
            debug!("Draft unchanged since last sync, not saving");
            return SaveOutcome::Unchanged;
        }

        let result = self.store.save_draft(&self.key, &draft).await;
        if is_cancelled() {
            debug!("Draft save finished after close, discarding it");
            return SaveOutcome::Cancelled;
        }

        match result {
            Ok(()) => {
                state.last_synced = Some(snapshot);
                drop(state);
                debug!("Draft saved");
                self.listener.on_save_success(&draft);
                SaveOutcome::Saved
            }
            Err(err) => {
                drop(state);
                warn!("Could not save draft: {err}");
                self.listener.on_save_error(&err);
                SaveOutcome::Failed
            }
        }
    }
}
