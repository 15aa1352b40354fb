// Save boundary

use crate::customer::Customer;
use crate::Result;
use intake_forms::Status;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

/// Serialized state of the whole form at save time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSnapshot {
    pub value: Value,
    pub status: Status,
}

impl FormSnapshot {
    /// Read the value as a typed customer
    pub fn customer(&self) -> Result<Customer> {
        Ok(serde_json::from_value(self.value.clone())?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Receives saved snapshots.
///
/// Saving is not gated on validity; the snapshot carries the status so a
/// sink can decide for itself.
pub trait SaveSink: Send + Sync {
    fn accept(&self, snapshot: &FormSnapshot) -> Result<()>;
}

impl<F> SaveSink for F
where
    F: Fn(&FormSnapshot) -> Result<()> + Send + Sync,
{
    fn accept(&self, snapshot: &FormSnapshot) -> Result<()> {
        self(snapshot)
    }
}

/// Logs each snapshot as JSON at info level
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl SaveSink for TracingSink {
    fn accept(&self, snapshot: &FormSnapshot) -> Result<()> {
        let json = snapshot.to_json()?;
        info!(status = %snapshot.status, snapshot = %json, "Saved customer form");
        Ok(())
    }
}

/// Keeps every snapshot in memory
#[derive(Debug, Default)]
pub struct RecordingSink {
    saved: Mutex<Vec<FormSnapshot>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshots(&self) -> Vec<FormSnapshot> {
        self.saved.lock().clone()
    }

    pub fn last(&self) -> Option<FormSnapshot> {
        self.saved.lock().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.saved.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.saved.lock().is_empty()
    }
}

impl SaveSink for RecordingSink {
    fn accept(&self, snapshot: &FormSnapshot) -> Result<()> {
        self.saved.lock().push(snapshot.clone());
        Ok(())
    }
}
