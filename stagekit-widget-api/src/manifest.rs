//! Library manifest - discovery metadata for hosts
//!
//! A manifest is a plain-data snapshot of a [`WidgetLibrary`](crate::WidgetLibrary):
//! ids, widget names and their inspectors. Hosts use it to populate catalogs
//! and inspector UIs without running widget code.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::PluginError;
use crate::panel::PanelOptions;
use crate::schema::Inspector;

/// Discovery metadata for one widget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetManifest {
    /// Catalog key
    pub name: String,
    /// Parameter inspector
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Inspector>,
    /// Appear inspector
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appear: Option<Inspector>,
    /// Disappear inspector
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disappear: Option<Inspector>,
}

/// Discovery metadata for a whole library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryManifest {
    /// Library identifier
    pub id: String,
    /// Library version
    pub version: String,
    /// API version the library was built against
    pub api_version: u32,
    /// Panel presentation, if the library ships a panel
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub panel: Option<PanelOptions>,
    /// Widgets, ordered by name
    #[serde(default)]
    pub widgets: Vec<WidgetManifest>,
}

impl LibraryManifest {
    /// Whether this manifest was built against the host's API version
    pub fn is_compatible(&self) -> bool {
        self.api_version == crate::API_VERSION
    }

    /// Look up a widget by name
    pub fn widget(&self, name: &str) -> Option<&WidgetManifest> {
        self.widgets.iter().find(|w| w.name == name)
    }

    /// Serialize to TOML.
    ///
    /// TOML has no null, so null values inside inspector hints and defaults
    /// are left out.
    pub fn to_toml(&self) -> Result<String, PluginError> {
        let mut value = serde_json::to_value(self).map_err(|e| PluginError::Json(e.to_string()))?;
        strip_nulls(&mut value);
        toml::to_string_pretty(&value).map_err(|e| PluginError::Serialization(e.to_string()))
    }

    /// Parse from TOML
    pub fn from_toml(content: &str) -> Result<Self, PluginError> {
        toml::from_str(content).map_err(|e| PluginError::Config(e.to_string()))
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, PluginError> {
        serde_json::to_string_pretty(self).map_err(|e| PluginError::Json(e.to_string()))
    }

    /// Parse from JSON
    pub fn from_json(content: &str) -> Result<Self, PluginError> {
        serde_json::from_str(content).map_err(|e| PluginError::Json(e.to_string()))
    }

    /// Load a manifest file; `.json` files are read as JSON, anything else as TOML
    pub fn load(path: &Path) -> Result<Self, PluginError> {
        let content = std::fs::read_to_string(path)?;
        if is_json(path) {
            Self::from_json(&content)
        } else {
            Self::from_toml(&content)
        }
    }

    /// Save a manifest file, creating parent directories as needed
    pub fn save(&self, path: &Path) -> Result<(), PluginError> {
        let content = if is_json(path) {
            self.to_json()?
        } else {
            self.to_toml()?
        };

        if let Some(parent) = path.parent().filter(|p| !p.exists()) {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        tracing::debug!(library = %self.id, path = %path.display(), "Saved library manifest");
        Ok(())
    }
}

fn strip_nulls(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.retain(|_, v| !v.is_null());
            map.values_mut().for_each(strip_nulls);
        }
        Value::Array(items) => {
            items.retain(|v| !v.is_null());
            items.iter_mut().for_each(strip_nulls);
        }
        _ => {}
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "json")
}
