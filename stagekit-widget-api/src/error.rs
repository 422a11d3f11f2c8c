//! Error types for widget authors and hosts

use thiserror::Error;

use crate::methods::Method;

/// Errors raised by the widget API
#[derive(Error, Debug)]
pub enum PluginError {
    /// A context hook was called with no enclosing provider
    #[error("{hook} must be called inside its provider")]
    OutsideProvider {
        /// Name of the hook that was called
        hook: &'static str,
    },

    /// A method façade was called before the host registered it
    #[error("Method not registered: {0}")]
    NotRegistered(Method),

    /// An event was dispatched before a signal handle was installed
    #[error("Signal not installed: call set_global_signal first")]
    SignalNotInstalled,

    /// No widget is registered under the requested name
    #[error("Unknown widget: {0}")]
    UnknownWidget(String),

    /// A panel action was raised that no handler accepts
    #[error("Unhandled panel action: {0}")]
    UnhandledAction(String),

    /// Host-supplied data does not fit the requested shape
    #[error("Parameter shape mismatch: {0}")]
    Parameters(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(String),

    /// A widget or panel entry point failed
    #[error("Render failed: {0}")]
    Render(String),

    /// Custom error with message
    #[error("{0}")]
    Custom(String),
}

impl PluginError {
    /// Create a custom error with a message
    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom(message.into())
    }

    /// Create a render error
    pub fn render(message: impl Into<String>) -> Self {
        Self::Render(message.into())
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
