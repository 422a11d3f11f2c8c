//! Render output returned by widget and panel entry points
//!
//! The host owns rendering. Entry points describe what to draw as an
//! [`Element`] tree that the host maps onto its own component model.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A node in a render description
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Element {
    /// Host component kind, e.g. "text" or "box"
    pub kind: String,
    /// Component properties
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub props: Map<String, Value>,
    /// Child nodes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Element>,
}

impl Element {
    /// Create an element with no props or children
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            props: Map::new(),
            children: Vec::new(),
        }
    }

    /// Builder: set a property
    #[must_use]
    pub fn prop(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.props.insert(key.into(), value.into());
        self
    }

    /// Builder: merge a map of properties, later keys win
    #[must_use]
    pub fn props(mut self, props: Map<String, Value>) -> Self {
        self.props.extend(props);
        self
    }

    /// Builder: append a child
    #[must_use]
    pub fn child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }
}
