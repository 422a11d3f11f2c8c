//! stagekit-widget-api - Widget API for the stagekit host
//!
//! This crate defines the contract between a widget package and the host that
//! renders it:
//!
//! - [`WidgetLibrary`]: the catalog of [`WidgetDefinition`]s and the optional
//!   panel a package registers
//! - the widget context ([`WidgetContextProps`], [`WidgetProps`] and the
//!   `use_widget_*` hooks) carrying layout, typed parameters and appear /
//!   disappear animation progress into a render
//! - the panel state context ([`PanelProvider`], [`use_panel_state`])
//! - host-injected capabilities: [`MethodRegistry`] for interpolation, gradient
//!   styles, font loading and hot update, and [`SignalDispatcher`] for events
//!
//! # Example
//!
//! ```ignore
//! use serde::{Deserialize, Serialize};
//! use stagekit_widget_api::{
//!     Element, FieldKind, InspectorDefinition, ObjectSchema, ParameterShape,
//!     WidgetDefinition, WidgetLibrary, export_library,
//! };
//!
//! #[derive(Serialize, Deserialize)]
//! struct Title {
//!     text: String,
//! }
//!
//! impl ParameterShape for Title {
//!     fn schema() -> ObjectSchema {
//!         ObjectSchema::new().field("text", FieldKind::String)
//!     }
//! }
//!
//! pub fn library() -> WidgetLibrary {
//!     let mut library = WidgetLibrary::new("my-widgets", "0.1.0");
//!     library.register(
//!         WidgetDefinition::<Title>::new("title", |props| {
//!             Ok(Element::new("text").prop("content", props.parameters.text.clone()))
//!         })
//!         .with_parameters(InspectorDefinition::new()),
//!     );
//!     library
//! }
//!
//! export_library!(library);
//! ```

pub mod context;
pub mod element;
pub mod error;
pub mod library;
pub mod manifest;
pub mod methods;
pub mod panel;
pub mod schema;
pub mod signal;
pub mod types;

mod scope;

pub use context::{
    WidgetContextProps, WidgetProps, use_widget_appear, use_widget_context, use_widget_disappear,
    use_widget_parameters, use_widget_styles,
};
pub use element::Element;
pub use error::PluginError;
pub use library::{RegisteredWidget, WidgetDefinition, WidgetLibrary};
pub use manifest::{LibraryManifest, WidgetManifest};
pub use methods::{FontLoad, Method, MethodRegistry, StyleMap};
pub use panel::{PanelDefinition, PanelOptions, PanelProvider, PanelState, use_panel_state};
pub use schema::{
    FieldConfig, FieldKind, FieldRule, Inspector, InspectorDefinition, ObjectSchema,
    ParameterShape,
};
pub use signal::{BroadcastSignal, SignalDispatcher, SignalEvent, SignalHandle};
pub use types::*;

/// Current widget API version. Libraries must match this exactly.
/// Hosts check it before reading a dynamically loaded library.
pub const API_VERSION: u32 = 1;

/// Export a widget library for dynamic loading.
///
/// Takes a function returning the [`WidgetLibrary`] and generates the C ABI
/// entry points a host uses to load it.
///
/// # Usage
///
/// ```ignore
/// stagekit_widget_api::export_library!(library);
/// ```
///
/// # Generated Functions
///
/// - `_stagekit_library_create()`: Builds the library
/// - `_stagekit_library_api_version()`: Returns the API version
/// - `_stagekit_library_destroy()`: Drops a library built by `_stagekit_library_create`
#[macro_export]
macro_rules! export_library {
    ($constructor:path) => {
        #[unsafe(no_mangle)]
        pub extern "C" fn _stagekit_library_create() -> *mut $crate::WidgetLibrary {
            let library: $crate::WidgetLibrary = $constructor();
            Box::into_raw(Box::new(library))
        }

        #[unsafe(no_mangle)]
        pub extern "C" fn _stagekit_library_api_version() -> u32 {
            $crate::API_VERSION
        }

        #[unsafe(no_mangle)]
        pub extern "C" fn _stagekit_library_destroy(ptr: *mut $crate::WidgetLibrary) {
            if !ptr.is_null() {
                unsafe {
                    drop(Box::from_raw(ptr));
                }
            }
        }
    };
}
