//! Panel definition and panel state context
//!
//! A library may ship one control panel. The host renders it inside a
//! [`PanelProvider`], which owns the panel's single state slot and the audio
//! asset currently selected in the host.

use std::fmt;
use std::rc::Rc;
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::element::Element;
use crate::error::PluginError;
use crate::scope::{self, ScopeStack};
use crate::types::AudioAsset;

thread_local! {
    static PANEL_SCOPES: ScopeStack<PanelProvider> = const { ScopeStack::new() };
}

// ─── Definition ──────────────────────────────────────────────────────

/// How the host presents the panel
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PanelOptions {
    /// Title shown by the host
    pub name: String,
    /// Icon identifier or URL
    #[serde(default)]
    pub icon: String,
}

impl PanelOptions {
    /// Create panel options
    pub fn new(name: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            icon: icon.into(),
        }
    }
}

type PanelFn = Arc<dyn Fn(&PanelProvider) -> Result<Element, PluginError> + Send + Sync>;
type ActionFn = Arc<dyn Fn(&str, &Value) -> Result<(), PluginError> + Send + Sync>;

/// A library's control panel: render entry point, action handler and
/// presentation options.
///
/// Rendering should only read state. Changes go through
/// [`handle_action`](Self::handle_action), which the host calls when the user
/// interacts with an element carrying an `action` prop.
#[derive(Clone)]
pub struct PanelDefinition {
    panel: PanelFn,
    action: Option<ActionFn>,
    /// Presentation options
    pub options: PanelOptions,
}

impl PanelDefinition {
    /// Create a panel definition
    pub fn new<F>(panel: F, options: PanelOptions) -> Self
    where
        F: Fn(&PanelProvider) -> Result<Element, PluginError> + Send + Sync + 'static,
    {
        Self {
            panel: Arc::new(panel),
            action: None,
            options,
        }
    }

    /// Builder: handle user actions raised from the rendered panel.
    ///
    /// The handler runs inside the provider scope, so `use_panel_state` works.
    #[must_use]
    pub fn on_action<F>(mut self, handler: F) -> Self
    where
        F: Fn(&str, &Value) -> Result<(), PluginError> + Send + Sync + 'static,
    {
        self.action = Some(Arc::new(handler));
        self
    }

    /// Render the panel inside `provider`'s scope
    pub fn render(&self, provider: &PanelProvider) -> Result<Element, PluginError> {
        provider.provide(|| (self.panel)(provider))
    }

    /// Run the action handler for `action` inside `provider`'s scope
    pub fn handle_action(
        &self,
        provider: &PanelProvider,
        action: &str,
        payload: &Value,
    ) -> Result<(), PluginError> {
        let handler = self
            .action
            .as_ref()
            .ok_or_else(|| PluginError::UnhandledAction(action.to_string()))?;
        tracing::debug!(panel = %self.options.name, action, "Handling panel action");
        provider.provide(|| handler(action, payload))
    }
}

impl fmt::Debug for PanelDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PanelDefinition")
            .field("options", &self.options)
            .field("has_action", &self.action.is_some())
            .finish_non_exhaustive()
    }
}

// ─── Provider ────────────────────────────────────────────────────────

type ChangeFn = Arc<dyn Fn() + Send + Sync>;

/// Host-owned panel scope: one state slot plus the selected speech asset.
///
/// Clones share the same state slot.
#[derive(Clone, Default)]
pub struct PanelProvider {
    state: Arc<Mutex<Option<Value>>>,
    selected_speech: Option<AudioAsset>,
    on_change: Option<ChangeFn>,
}

impl PanelProvider {
    /// Create a provider with no stored state
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: seed the stored state
    #[must_use]
    pub fn with_state(self, state: Value) -> Self {
        *self.lock() = Some(state);
        self
    }

    /// Builder: set the audio asset selected in the host
    #[must_use]
    pub fn with_selected_speech(mut self, speech: Option<AudioAsset>) -> Self {
        self.selected_speech = speech;
        self
    }

    /// Builder: called after every `set_state`, so the host can re-render
    #[must_use]
    pub fn on_change<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_change = Some(Arc::new(f));
        self
    }

    /// Replace the selected speech asset (host side)
    pub fn set_selected_speech(&mut self, speech: Option<AudioAsset>) {
        self.selected_speech = speech;
    }

    /// The selected speech asset
    pub fn selected_speech(&self) -> Option<&AudioAsset> {
        self.selected_speech.as_ref()
    }

    /// Raw stored state
    pub fn stored_state(&self) -> Option<Value> {
        self.lock().clone()
    }

    /// Typed view of the state slot.
    ///
    /// When nothing (or null) is stored, `initial` is returned in the view;
    /// the slot itself stays empty until `set_state` is called.
    pub fn state<T>(&self, initial: Option<T>) -> Result<PanelState<T>, PluginError>
    where
        T: DeserializeOwned,
    {
        let stored = match self.stored_state() {
            None | Some(Value::Null) => None,
            Some(value) => Some(
                serde_json::from_value(value).map_err(|e| PluginError::Parameters(e.to_string()))?,
            ),
        };
        Ok(PanelState {
            state: stored.or(initial),
            selected_speech: self.selected_speech.clone(),
            provider: self.clone(),
        })
    }

    /// Run `f` with this provider as the innermost panel scope
    pub fn provide<R>(&self, f: impl FnOnce() -> R) -> R {
        scope::enter(&PANEL_SCOPES, Rc::new(self.clone()), f)
    }

    fn replace(&self, next: Value) {
        *self.lock() = Some(next);
        if let Some(on_change) = &self.on_change {
            on_change();
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Value>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for PanelProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PanelProvider")
            .field("state", &self.stored_state())
            .field("selected_speech", &self.selected_speech)
            .finish_non_exhaustive()
    }
}

// ─── State view ──────────────────────────────────────────────────────

/// Snapshot of the panel state with a setter
pub struct PanelState<T> {
    /// Stored state, or the caller's initial value when nothing is stored
    pub state: Option<T>,
    /// Audio asset selected in the host
    pub selected_speech: Option<AudioAsset>,
    provider: PanelProvider,
}

impl<T: Serialize> PanelState<T> {
    /// Replace the stored state wholesale and notify the host
    pub fn set_state(&self, next: T) -> Result<(), PluginError> {
        let value =
            serde_json::to_value(next).map_err(|e| PluginError::Serialization(e.to_string()))?;
        self.provider.replace(value);
        Ok(())
    }
}

impl<T: fmt::Debug> fmt::Debug for PanelState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PanelState")
            .field("state", &self.state)
            .field("selected_speech", &self.selected_speech)
            .finish_non_exhaustive()
    }
}

/// Panel state of the innermost panel scope.
///
/// `initial` stands in for the state while nothing is stored.
pub fn use_panel_state<T>(initial: Option<T>) -> Result<PanelState<T>, PluginError>
where
    T: DeserializeOwned,
{
    let provider = scope::current(&PANEL_SCOPES).ok_or(PluginError::OutsideProvider {
        hook: "use_panel_state",
    })?;
    provider.state(initial)
}
