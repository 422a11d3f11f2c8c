//! Host-provided method implementations
//!
//! Widgets cannot interpolate, style gradients, load fonts or trigger a hot
//! update on their own. The host installs one implementation per [`Method`]
//! into a [`MethodRegistry`] and widget code calls through it.
//!
//! Hosts should build a registry at startup and pass it down. For code that
//! cannot be handed one, a process-wide registry backs the free functions
//! ([`register_interpolate`], [`interpolate`], ...).

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::PluginError;

/// Capabilities the host provides through the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    /// Map a frame onto a value range with optional easing
    Interpolate,
    /// Turn a color/gradient value into host style properties
    GetGradientStyle,
    /// Make a font family available to the renderer
    LoadFont,
    /// Ask the host to reload the widget library
    HotUpdate,
}

impl Method {
    /// Every method, in registration order
    pub const ALL: [Method; 4] = [
        Method::Interpolate,
        Method::GetGradientStyle,
        Method::LoadFont,
        Method::HotUpdate,
    ];

    /// Name used in errors and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Interpolate => "interpolate",
            Method::GetGradientStyle => "get_gradient_style",
            Method::LoadFont => "load_font",
            Method::HotUpdate => "hot_update",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Style properties produced by `get_gradient_style`
pub type StyleMap = Map<String, Value>;

/// Pending font load. The API hands it back to the caller without polling it.
pub type FontLoad = Pin<Box<dyn Future<Output = Result<(), PluginError>> + Send>>;

type InterpolateFn = Arc<dyn Fn(f64, f64, f64, Option<&str>) -> f64 + Send + Sync>;
type GradientStyleFn = Arc<dyn Fn(&Value, Option<bool>) -> StyleMap + Send + Sync>;
type LoadFontFn = Arc<dyn Fn(&str) -> FontLoad + Send + Sync>;
type HotUpdateFn = Arc<dyn Fn() + Send + Sync>;

/// One slot per [`Method`]. Registering again replaces the previous
/// implementation.
#[derive(Clone, Default)]
pub struct MethodRegistry {
    interpolate: Option<InterpolateFn>,
    gradient_style: Option<GradientStyleFn>,
    load_font: Option<LoadFontFn>,
    hot_update: Option<HotUpdateFn>,
}

fn install<T>(slot: &mut Option<T>, method: Method, implementation: T) {
    if slot.is_some() {
        tracing::warn!(method = %method, "Replacing registered method implementation");
    } else {
        tracing::debug!(method = %method, "Registered method implementation");
    }
    *slot = Some(implementation);
}

fn require<T>(slot: &Option<T>, method: Method) -> Result<&T, PluginError> {
    slot.as_ref().ok_or(PluginError::NotRegistered(method))
}

impl MethodRegistry {
    /// Create a registry with no implementations
    pub fn new() -> Self {
        Self::default()
    }

    // ─── Registration ────────────────────────────────────────────────

    /// Install the interpolation implementation
    pub fn register_interpolate<F>(&mut self, f: F)
    where
        F: Fn(f64, f64, f64, Option<&str>) -> f64 + Send + Sync + 'static,
    {
        let implementation: InterpolateFn = Arc::new(f);
        install(&mut self.interpolate, Method::Interpolate, implementation);
    }

    /// Install the gradient styling implementation
    pub fn register_get_gradient_style<F>(&mut self, f: F)
    where
        F: Fn(&Value, Option<bool>) -> StyleMap + Send + Sync + 'static,
    {
        let implementation: GradientStyleFn = Arc::new(f);
        install(&mut self.gradient_style, Method::GetGradientStyle, implementation);
    }

    /// Install the font loading implementation
    pub fn register_load_font<F>(&mut self, f: F)
    where
        F: Fn(&str) -> FontLoad + Send + Sync + 'static,
    {
        let implementation: LoadFontFn = Arc::new(f);
        install(&mut self.load_font, Method::LoadFont, implementation);
    }

    /// Install the hot update implementation
    pub fn register_hot_update<F>(&mut self, f: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        let implementation: HotUpdateFn = Arc::new(f);
        install(&mut self.hot_update, Method::HotUpdate, implementation);
    }

    // ─── Calls ───────────────────────────────────────────────────────

    /// Map `t` onto `from..to` using the host's easing
    pub fn interpolate(
        &self,
        t: f64,
        from: f64,
        to: f64,
        easing: Option<&str>,
    ) -> Result<f64, PluginError> {
        let f = require(&self.interpolate, Method::Interpolate)?;
        Ok(f(t, from, to, easing))
    }

    /// Style properties for a color or gradient value.
    ///
    /// `text_mask` asks for styles that clip the gradient to text glyphs.
    pub fn get_gradient_style(
        &self,
        color: &Value,
        text_mask: Option<bool>,
    ) -> Result<StyleMap, PluginError> {
        let f = require(&self.gradient_style, Method::GetGradientStyle)?;
        Ok(f(color, text_mask))
    }

    /// Start loading a font family. The returned future is the host's.
    pub fn load_font(&self, font: &str) -> Result<FontLoad, PluginError> {
        let f = require(&self.load_font, Method::LoadFont)?;
        Ok(f(font))
    }

    /// Ask the host to reload
    pub fn hot_update(&self) -> Result<(), PluginError> {
        let f = require(&self.hot_update, Method::HotUpdate)?;
        f();
        Ok(())
    }

    // ─── Introspection ───────────────────────────────────────────────

    /// Whether an implementation is installed for `method`
    pub fn is_registered(&self, method: Method) -> bool {
        match method {
            Method::Interpolate => self.interpolate.is_some(),
            Method::GetGradientStyle => self.gradient_style.is_some(),
            Method::LoadFont => self.load_font.is_some(),
            Method::HotUpdate => self.hot_update.is_some(),
        }
    }

    /// Methods still waiting for an implementation
    pub fn missing(&self) -> Vec<Method> {
        Method::ALL
            .into_iter()
            .filter(|m| !self.is_registered(*m))
            .collect()
    }
}

impl fmt::Debug for MethodRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registered: Vec<Method> = Method::ALL
            .into_iter()
            .filter(|m| self.is_registered(*m))
            .collect();
        f.debug_struct("MethodRegistry")
            .field("registered", &registered)
            .finish()
    }
}

// ─── Process-wide registry ───────────────────────────────────────────

fn global() -> &'static RwLock<MethodRegistry> {
    static GLOBAL: OnceLock<RwLock<MethodRegistry>> = OnceLock::new();
    GLOBAL.get_or_init(|| RwLock::new(MethodRegistry::new()))
}

fn with_global(f: impl FnOnce(&mut MethodRegistry)) {
    let mut registry = global().write().unwrap_or_else(PoisonError::into_inner);
    f(&mut registry);
}

/// Snapshot of the process-wide registry.
///
/// Implementations are reference counted, so the snapshot is cheap and calls
/// made through it do not hold the global lock.
pub fn global_methods() -> MethodRegistry {
    global()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Install the process-wide interpolation implementation
pub fn register_interpolate<F>(f: F)
where
    F: Fn(f64, f64, f64, Option<&str>) -> f64 + Send + Sync + 'static,
{
    with_global(|registry| registry.register_interpolate(f));
}

/// Interpolate through the process-wide registry
pub fn interpolate(t: f64, from: f64, to: f64, easing: Option<&str>) -> Result<f64, PluginError> {
    global_methods().interpolate(t, from, to, easing)
}

/// Install the process-wide gradient styling implementation
pub fn register_get_gradient_style<F>(f: F)
where
    F: Fn(&Value, Option<bool>) -> StyleMap + Send + Sync + 'static,
{
    with_global(|registry| registry.register_get_gradient_style(f));
}

/// Gradient style through the process-wide registry
pub fn get_gradient_style(color: &Value, text_mask: Option<bool>) -> Result<StyleMap, PluginError> {
    global_methods().get_gradient_style(color, text_mask)
}

/// Install the process-wide font loading implementation
pub fn register_load_font<F>(f: F)
where
    F: Fn(&str) -> FontLoad + Send + Sync + 'static,
{
    with_global(|registry| registry.register_load_font(f));
}

/// Load a font through the process-wide registry
pub fn load_font(font: &str) -> Result<FontLoad, PluginError> {
    global_methods().load_font(font)
}

/// Install the process-wide hot update implementation
pub fn register_hot_update<F>(f: F)
where
    F: Fn() + Send + Sync + 'static,
{
    with_global(|registry| registry.register_hot_update(f));
}

/// Hot update through the process-wide registry
pub fn hot_update() -> Result<(), PluginError> {
    global_methods().hot_update()
}
