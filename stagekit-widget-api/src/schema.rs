//! Parameter schemas and inspector definitions
//!
//! A schema describes the shape of a widget's parameters (or animation data)
//! for the host's inspector UI. It is descriptive: the API never validates host
//! values against it. The Rust type implementing [`ParameterShape`] is what
//! widget code actually reads.

use std::collections::BTreeMap;
use std::marker::PhantomData;

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

/// Type rule for a single schema field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    String,
    Number {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
    },
    Integer {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<i64>,
    },
    Boolean,
    /// A color or gradient value, styled through `get_gradient_style`
    Color,
    /// A font family name, loaded through `load_font`
    Font,
    /// A host audio asset
    Audio,
    Enum {
        options: Vec<String>,
    },
    Object {
        schema: ObjectSchema,
    },
    Array {
        item: Box<FieldKind>,
    },
}

/// A named field in an [`ObjectSchema`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldRule {
    /// Type rule
    #[serde(flatten)]
    pub kind: FieldKind,
    /// Whether the host may omit the field
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub optional: bool,
    /// Human-readable description for the inspector
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Value the inspector starts from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl FieldRule {
    /// Create a required field with the given type rule
    pub fn new(kind: FieldKind) -> Self {
        Self {
            kind,
            optional: false,
            description: None,
            default: None,
        }
    }

    /// Builder: mark the field optional
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Builder: set the description
    #[must_use]
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Builder: set the inspector default. A null default clears it.
    #[must_use]
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into()).filter(|v| !v.is_null());
        self
    }
}

impl From<FieldKind> for FieldRule {
    fn from(kind: FieldKind) -> Self {
        Self::new(kind)
    }
}

/// Object-shaped schema: field name to type rule, ordered by name
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectSchema {
    fields: BTreeMap<String, FieldRule>,
}

impl ObjectSchema {
    /// Create an empty schema
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: add or replace a field
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, rule: impl Into<FieldRule>) -> Self {
        self.fields.insert(name.into(), rule.into());
        self
    }

    /// Look up a field rule
    pub fn get(&self, name: &str) -> Option<&FieldRule> {
        self.fields.get(name)
    }

    /// Iterate over fields in name order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldRule)> {
        self.fields.iter().map(|(name, rule)| (name.as_str(), rule))
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the schema has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A Rust type that a widget reads its parameters (or animation data) into.
///
/// The schema returned here is what the host's inspector edits; the type
/// itself is the compile-time shape widget code sees.
///
/// # Example
///
/// ```ignore
/// #[derive(Serialize, Deserialize)]
/// struct Title { text: String }
///
/// impl ParameterShape for Title {
///     fn schema() -> ObjectSchema {
///         ObjectSchema::new().field("text", FieldKind::String)
///     }
/// }
/// ```
pub trait ParameterShape: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Schema describing this type
    fn schema() -> ObjectSchema;
}

/// The empty shape, used for slots a widget does not declare
impl ParameterShape for () {
    fn schema() -> ObjectSchema {
        ObjectSchema::new()
    }
}

impl ParameterShape for Value {
    fn schema() -> ObjectSchema {
        ObjectSchema::new()
    }
}

/// Per-field UI hints (widget kind, step, label, ...) keyed by field name
pub type FieldConfig = BTreeMap<String, Value>;

/// Schema plus UI-editing metadata, without the Rust shape attached
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inspector {
    /// Shape of the edited value
    pub schema: ObjectSchema,
    /// Editing hints keyed by field name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub field_config: FieldConfig,
}

/// Pairs the schema of `T` with inspector hints for one widget slot
pub struct InspectorDefinition<T> {
    inspector: Inspector,
    _shape: PhantomData<fn() -> T>,
}

impl<T: ParameterShape> InspectorDefinition<T> {
    /// Inspector for `T` using its own schema and no hints
    pub fn new() -> Self {
        Self::with_schema(T::schema())
    }
}

impl<T: ParameterShape> Default for InspectorDefinition<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> InspectorDefinition<T> {
    /// Inspector with an explicit schema for `T`
    pub fn with_schema(schema: ObjectSchema) -> Self {
        Self {
            inspector: Inspector {
                schema,
                field_config: FieldConfig::new(),
            },
            _shape: PhantomData,
        }
    }

    /// Builder: attach a UI hint for one field. A null hint removes it.
    #[must_use]
    pub fn field_config(mut self, field: impl Into<String>, config: Value) -> Self {
        let field = field.into();
        if config.is_null() {
            self.inspector.field_config.remove(&field);
        } else {
            self.inspector.field_config.insert(field, config);
        }
        self
    }

    /// The schema
    pub fn schema(&self) -> &ObjectSchema {
        &self.inspector.schema
    }

    /// Shape-erased view for hosts
    pub fn inspector(&self) -> &Inspector {
        &self.inspector
    }
}

impl<T> Clone for InspectorDefinition<T> {
    fn clone(&self) -> Self {
        Self {
            inspector: self.inspector.clone(),
            _shape: PhantomData,
        }
    }
}

impl<T> std::fmt::Debug for InspectorDefinition<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InspectorDefinition")
            .field("shape", &std::any::type_name::<T>())
            .field("inspector", &self.inspector)
            .finish()
    }
}
