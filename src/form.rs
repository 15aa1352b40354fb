// Customer form orchestrator

use crate::customer::{self, ADDRESSES, EMAIL, NOTIFICATION};
use crate::sink::{FormSnapshot, SaveSink};
use crate::Result;
use intake_config::FormConfig;
use intake_forms::{
    Debouncer, FormError, GroupNode, MessageCatalog, RevalidationEngine, Status, ValueChange,
};
use intake_validation::FieldValue;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Arc, Weak};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Tree, reactions and derived messages of one form session
struct FormState {
    root: GroupNode,
    engine: RevalidationEngine,
    catalog: MessageCatalog,
    messages: BTreeMap<String, String>,
    refreshes: u64,
    /// Bumped each time the tree is rebuilt
    generation: u64,
}

impl FormState {
    fn dispatch(&mut self, changes: &[ValueChange]) -> Result<()> {
        let FormState { root, engine, .. } = self;
        engine.dispatch_all(changes, root)?;
        Ok(())
    }

    fn patch(&mut self, patch: &Value) -> Result<Vec<ValueChange>> {
        let changes = self.root.patch_value(patch)?;
        self.dispatch(&changes)?;
        Ok(changes)
    }

    fn refresh_message(&mut self, path: &str) {
        self.refreshes += 1;
        let message = match self.root.get(path) {
            Ok(node) => self.catalog.message_for(node),
            Err(e) => {
                warn!("Cannot derive message for '{}': {}", path, e);
                None
            }
        };

        match message {
            Some(message) => {
                self.messages.insert(path.to_string(), message);
            }
            None => {
                self.messages.remove(path);
            }
        }
    }
}

/// The customer intake form.
///
/// Owns the node tree behind a mutex that is never held across an await.
/// All mutation, validation and status propagation happens synchronously on
/// the caller's thread; only the one-shot prefill and the debounced email
/// message run later on the tokio runtime.
///
/// Construction spawns tasks, so it must happen inside a tokio runtime.
pub struct CustomerForm {
    state: Arc<Mutex<FormState>>,
    config: FormConfig,
    sink: Arc<dyn SaveSink>,
    prefill: Mutex<Option<JoinHandle<()>>>,
}

impl CustomerForm {
    pub fn new(config: FormConfig, sink: Arc<dyn SaveSink>) -> Self {
        Self::with_catalog(config, sink, MessageCatalog::new())
    }

    /// Build the form with custom message templates
    pub fn with_catalog(config: FormConfig, sink: Arc<dyn SaveSink>, catalog: MessageCatalog) -> Self {
        let state = Arc::new(Mutex::new(FormState {
            root: customer::customer_schema(),
            engine: RevalidationEngine::new(),
            catalog,
            messages: BTreeMap::new(),
            refreshes: 0,
            generation: 0,
        }));

        wire_reactions(&state, &config);

        let form = Self {
            state,
            config,
            sink,
            prefill: Mutex::new(None),
        };
        form.schedule_prefill();
        form
    }

    pub fn config(&self) -> &FormConfig {
        &self.config
    }

    fn schedule_prefill(&self) {
        if !self.config.prefill_enabled {
            return;
        }

        let delay = self.config.prefill_delay();
        let weak = Arc::downgrade(&self.state);
        let generation = self.state.lock().generation;
        debug!("Scheduling test data prefill in {:?}", delay);

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let Some(state) = weak.upgrade() else {
                return;
            };
            let mut state = state.lock();
            if state.generation != generation {
                debug!("Skipping prefill for a rebuilt tree");
                return;
            }
            match state.patch(&customer::test_data()) {
                Ok(changes) => info!("Prefilled {} fields with test data", changes.len()),
                Err(e) => warn!("Test data prefill failed: {}", e),
            }
        });

        if let Some(previous) = self.prefill.lock().replace(handle) {
            previous.abort();
        }
    }

    fn cancel_prefill(&self) {
        if let Some(handle) = self.prefill.lock().take() {
            handle.abort();
        }
    }

    /// Set a field by dotted path and run its reactions
    pub fn set_value(&self, path: &str, value: impl Into<FieldValue>) -> Result<()> {
        let mut state = self.state.lock();
        let change = state.root.set_value(path, value)?;
        state.dispatch(std::slice::from_ref(&change))
    }

    /// Record that the user left a control. Does not revalidate.
    pub fn mark_touched(&self, path: &str) -> Result<()> {
        self.state.lock().root.mark_touched_at(path)?;
        Ok(())
    }

    /// Merge a partial value into the form and run the reactions of every patched field
    pub fn patch_value(&self, patch: &Value) -> Result<Vec<ValueChange>> {
        self.state.lock().patch(patch)
    }

    /// Apply test data immediately
    pub fn populate_test_data(&self, patch: &Value) -> Result<()> {
        let changes = self.patch_value(patch)?;
        info!("Populated {} fields with test data", changes.len());
        Ok(())
    }

    /// Append an empty address and return its index
    pub fn append_address(&self) -> Result<usize> {
        let mut state = self.state.lock();
        let (index, change) = state.root.update_at(ADDRESSES, |node| {
            let addresses = node
                .as_collection_mut()
                .ok_or_else(|| FormError::NotACollection(ADDRESSES.to_string()))?;
            let index = addresses.append();
            Ok((index, ValueChange::new(ADDRESSES, addresses.value())))
        })?;
        state.dispatch(std::slice::from_ref(&change))?;
        debug!("Appended address {}", index);
        Ok(index)
    }

    /// Remove the address at `index`; later entries move down
    pub fn remove_address(&self, index: usize) -> Result<()> {
        let mut state = self.state.lock();
        let change = state.root.update_at(ADDRESSES, |node| {
            let addresses = node
                .as_collection_mut()
                .ok_or_else(|| FormError::NotACollection(ADDRESSES.to_string()))?;
            addresses.remove_at(index)?;
            Ok(ValueChange::new(ADDRESSES, addresses.value()))
        })?;
        state.dispatch(std::slice::from_ref(&change))?;
        debug!("Removed address {}", index);
        Ok(())
    }

    /// Rebuild the tree from the schema.
    ///
    /// A pending prefill is replaced by a fresh one counted from the rebuild.
    /// Reactions stay registered; derived messages are cleared.
    pub fn reinitialize(&self) {
        {
            let mut state = self.state.lock();
            state.root = customer::customer_schema();
            state.messages.clear();
            state.generation += 1;
        }
        info!("Customer form reinitialized");
        self.schedule_prefill();
    }

    /// Hand a snapshot of the whole form to the sink, valid or not
    pub fn save(&self) -> Result<FormSnapshot> {
        let snapshot = self.snapshot();
        self.sink.accept(&snapshot)?;
        info!(status = %snapshot.status, "Customer form saved");
        Ok(snapshot)
    }

    pub fn snapshot(&self) -> FormSnapshot {
        let state = self.state.lock();
        FormSnapshot {
            value: state.root.value(),
            status: state.root.status(),
        }
    }

    pub fn value(&self) -> Value {
        self.state.lock().root.value()
    }

    pub fn status(&self) -> Status {
        self.state.lock().root.status()
    }

    /// Last derived validation message for `path`
    pub fn message(&self, path: &str) -> Option<String> {
        self.state.lock().messages.get(path).cloned()
    }

    /// How many times a debounced message has been recomputed
    pub fn message_refreshes(&self) -> u64 {
        self.state.lock().refreshes
    }

    /// Run `f` against the current tree
    pub fn read<R>(&self, f: impl FnOnce(&GroupNode) -> R) -> R {
        f(&self.state.lock().root)
    }
}

impl Drop for CustomerForm {
    fn drop(&mut self) {
        self.cancel_prefill();
    }
}

impl std::fmt::Debug for CustomerForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut debug = f.debug_struct("CustomerForm");
        debug.field("config", &self.config);
        if let Some(state) = self.state.try_lock() {
            debug.field("status", &state.root.status());
        }
        debug.finish_non_exhaustive()
    }
}

fn wire_reactions(state: &Arc<Mutex<FormState>>, config: &FormConfig) {
    let debouncer = email_message_debouncer(Arc::downgrade(state), config);

    let mut guard = state.lock();
    guard.engine.watch(NOTIFICATION, customer::notification_reaction());
    guard.engine.watch_debounced(EMAIL, debouncer);
}

fn email_message_debouncer(state: Weak<Mutex<FormState>>, config: &FormConfig) -> Debouncer {
    Debouncer::spawn(config.message_debounce(), move || {
        if let Some(state) = state.upgrade() {
            let mut state = state.lock();
            state.refresh_message(EMAIL);
            debug!("Email message now {:?}", state.messages.get(EMAIL));
        }
    })
}
