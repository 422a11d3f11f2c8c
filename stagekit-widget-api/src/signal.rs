//! Named events from widgets and panels to host listeners
//!
//! The host installs a [`SignalHandle`]; widget code dispatches events through
//! a [`SignalDispatcher`] without knowing how the host delivers them.

use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::error::PluginError;

/// An event dispatched to the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalEvent {
    /// UUIDv7 assigned at dispatch, so events sort by creation time
    pub id: Uuid,
    /// Event name chosen by the dispatcher
    pub event_type: String,
    /// JSON payload
    pub detail: Value,
}

impl SignalEvent {
    /// Create an event with a fresh id
    #[must_use]
    pub fn new(event_type: impl Into<String>, detail: Value) -> Self {
        Self {
            id: Uuid::now_v7(),
            event_type: event_type.into(),
            detail,
        }
    }

    /// Read the payload back as a typed value
    pub fn detail_as<T: DeserializeOwned>(&self) -> Result<T, PluginError> {
        serde_json::from_value(self.detail.clone()).map_err(|e| PluginError::Json(e.to_string()))
    }
}

/// Host-side receiver of dispatched events.
///
/// Delivery order and guarantees belong to the implementation.
pub trait SignalHandle: Send + Sync {
    /// Deliver one event to the host's listeners
    fn dispatch_event(&self, event: SignalEvent);
}

/// Dispatches events to the installed [`SignalHandle`]
#[derive(Clone, Default)]
pub struct SignalDispatcher {
    handle: Option<Arc<dyn SignalHandle>>,
}

impl SignalDispatcher {
    /// Create a dispatcher with no handle installed
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: install a handle
    #[must_use]
    pub fn with_signal(mut self, handle: Arc<dyn SignalHandle>) -> Self {
        self.set_global_signal(handle);
        self
    }

    /// Install the handle, replacing any previous one
    pub fn set_global_signal(&mut self, handle: Arc<dyn SignalHandle>) {
        if self.handle.is_some() {
            tracing::warn!("Replacing installed signal handle");
        } else {
            tracing::debug!("Installed signal handle");
        }
        self.handle = Some(handle);
    }

    /// Whether a handle is installed
    pub fn is_installed(&self) -> bool {
        self.handle.is_some()
    }

    /// Serialize `detail` and deliver it as an event named `event_type`
    pub fn dispatch_event<T>(&self, event_type: &str, detail: &T) -> Result<(), PluginError>
    where
        T: Serialize + ?Sized,
    {
        let handle = self
            .handle
            .as_ref()
            .ok_or(PluginError::SignalNotInstalled)?;
        let detail = serde_json::to_value(detail).map_err(|e| PluginError::Json(e.to_string()))?;
        let event = SignalEvent::new(event_type, detail);
        tracing::trace!(event_type, id = %event.id, "Dispatching signal");
        handle.dispatch_event(event);
        Ok(())
    }
}

impl std::fmt::Debug for SignalDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalDispatcher")
            .field("installed", &self.is_installed())
            .finish()
    }
}

/// [`SignalHandle`] that fans events out over a tokio broadcast channel
pub struct BroadcastSignal {
    tx: broadcast::Sender<SignalEvent>,
}

impl BroadcastSignal {
    /// Create a handle with the given channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to events dispatched from now on
    pub fn subscribe(&self) -> broadcast::Receiver<SignalEvent> {
        self.tx.subscribe()
    }
}

impl SignalHandle for BroadcastSignal {
    fn dispatch_event(&self, event: SignalEvent) {
        // No receivers is not an error: nobody is listening yet
        if self.tx.send(event).is_err() {
            tracing::trace!("Signal dropped, no listeners");
        }
    }
}

// ─── Process-wide dispatcher ─────────────────────────────────────────

fn global() -> &'static RwLock<SignalDispatcher> {
    static GLOBAL: OnceLock<RwLock<SignalDispatcher>> = OnceLock::new();
    GLOBAL.get_or_init(|| RwLock::new(SignalDispatcher::new()))
}

/// Snapshot of the process-wide dispatcher
pub fn global_signal() -> SignalDispatcher {
    global()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Install the process-wide signal handle
pub fn set_global_signal(handle: Arc<dyn SignalHandle>) {
    global()
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .set_global_signal(handle);
}

/// Dispatch through the process-wide handle
pub fn dispatch_event<T>(event_type: &str, detail: &T) -> Result<(), PluginError>
where
    T: Serialize + ?Sized,
{
    global_signal().dispatch_event(event_type, detail)
}
