//! Hello Widgets - A simple example widget library for stagekit
//!
//! This library demonstrates:
//! - Declaring parameter and animation shapes with `ParameterShape`
//! - Registering widgets with typed appear/disappear slots
//! - A control panel with persistent state and the selected speech asset
//! - Calling host methods (`interpolate`, `get_gradient_style`, `load_font`)
//!   and dispatching signals
//!
//! ## Building
//!
//! ```bash
//! cargo build --release -p hello-widgets
//! ```
//!
//! ## Installing
//!
//! ```bash
//! mkdir -p ~/.config/stagekit/libraries/hello
//! cp target/release/libhello_widgets.so ~/.config/stagekit/libraries/hello/hello.so
//! ```

use serde::{Deserialize, Serialize};
use serde_json::json;
use stagekit_widget_api::{
    Element, FieldKind, FieldRule, InspectorDefinition, ObjectSchema, PanelDefinition,
    PanelOptions, PanelProvider, ParameterShape, PluginError, WidgetDefinition, WidgetLibrary,
    WidgetProps, export_library, methods, signal, use_panel_state,
};

/// Library id reported to the host
pub const LIBRARY_ID: &str = "hello-widgets";

// ─── Greeting ────────────────────────────────────────────────────────

/// Parameters of the greeting widget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Greeting {
    /// Text to show
    pub text: String,
    /// Text color or gradient
    pub color: serde_json::Value,
    /// Font family
    pub font: String,
}

impl ParameterShape for Greeting {
    fn schema() -> ObjectSchema {
        ObjectSchema::new()
            .field("text", FieldRule::new(FieldKind::String).with_default("Hello!"))
            .field("color", FieldRule::new(FieldKind::Color).with_default("#ffffff"))
            .field("font", FieldRule::new(FieldKind::Font).with_default("Inter"))
    }
}

/// Appear data: fade in from an opacity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FadeIn {
    /// Opacity at the first frame
    pub from: f64,
}

impl ParameterShape for FadeIn {
    fn schema() -> ObjectSchema {
        ObjectSchema::new().field(
            "from",
            FieldRule::new(FieldKind::Number {
                min: Some(0.0),
                max: Some(1.0),
            })
            .with_default(0.0),
        )
    }
}

/// Disappear data: slide out horizontally
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlideOut {
    /// Horizontal distance at the last frame
    pub distance: f64,
}

impl ParameterShape for SlideOut {
    fn schema() -> ObjectSchema {
        ObjectSchema::new().field(
            "distance",
            FieldRule::new(FieldKind::Number {
                min: None,
                max: None,
            })
            .describe("Pixels to travel, negative slides left"),
        )
    }
}

fn greeting(props: &WidgetProps<Greeting, FadeIn, SlideOut>) -> Result<Element, PluginError> {
    let opacity = match &props.appear {
        Some(phase) => {
            let from = phase.data.as_ref().map_or(0.0, |fade| fade.from);
            methods::interpolate(phase.progress(), from, 1.0, Some("ease-out"))?
        }
        None => 1.0,
    };
    let x = match &props.disappear {
        Some(phase) => {
            let distance = phase.data.as_ref().map_or(0.0, |slide| slide.distance);
            methods::interpolate(phase.progress(), 0.0, distance, Some("ease-in"))?
        }
        None => 0.0,
    };

    // The host resolves the load; rendering goes ahead with a fallback font
    drop(methods::load_font(&props.parameters.font)?);
    let color = methods::get_gradient_style(&props.parameters.color, Some(true))?;

    Ok(Element::new("text")
        .prop("content", props.parameters.text.clone())
        .prop("fontFamily", props.parameters.font.clone())
        .prop("opacity", opacity)
        .prop("x", x)
        .props(color))
}

// ─── Progress bar ────────────────────────────────────────────────────

/// Parameters of the progress bar widget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    /// Filled fraction, `0.0..=1.0`
    pub value: f64,
}

impl ParameterShape for Progress {
    fn schema() -> ObjectSchema {
        ObjectSchema::new().field(
            "value",
            FieldKind::Number {
                min: Some(0.0),
                max: Some(1.0),
            },
        )
    }
}

fn progress_bar(props: &WidgetProps<Progress>) -> Result<Element, PluginError> {
    let value = props.parameters.value.clamp(0.0, 1.0);
    Ok(Element::new("box")
        .prop("width", props.styles.width)
        .prop("height", props.styles.height)
        .child(
            Element::new("box")
                .prop("width", props.styles.width * value)
                .prop("height", props.styles.height),
        ))
}

// ─── Panel ───────────────────────────────────────────────────────────

/// State kept by the control panel
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PanelSettings {
    /// Number of times the selected speech was played from the panel
    pub plays: u32,
}

/// Action raised by the panel's play button
pub const PLAY_ACTION: &str = "play";

fn control_panel(_provider: &PanelProvider) -> Result<Element, PluginError> {
    let settings = use_panel_state(Some(PanelSettings::default()))?;
    let plays = settings.state.as_ref().map_or(0, |s| s.plays);

    let Some(speech) = &settings.selected_speech else {
        return Ok(Element::new("panel").prop("message", "Select a speech clip"));
    };

    Ok(Element::new("panel")
        .prop("message", format!("Ready: {}", speech.name))
        .prop("plays", plays)
        .child(
            Element::new("button")
                .prop("label", "Play")
                .prop("action", PLAY_ACTION),
        ))
}

fn panel_action(action: &str, _payload: &serde_json::Value) -> Result<(), PluginError> {
    if action != PLAY_ACTION {
        return Err(PluginError::UnhandledAction(action.to_string()));
    }

    let settings = use_panel_state(Some(PanelSettings::default()))?;
    let speech = settings
        .selected_speech
        .as_ref()
        .ok_or_else(|| PluginError::custom("No speech clip selected"))?;
    let plays = settings.state.as_ref().map_or(0, |s| s.plays) + 1;

    signal::dispatch_event("hello:play", &json!({ "id": speech.id, "url": speech.url }))?;
    settings.set_state(PanelSettings { plays })?;
    tracing::debug!(speech = %speech.name, plays, "Played speech from panel");
    Ok(())
}

/// Build the library
pub fn library() -> WidgetLibrary {
    let mut library = WidgetLibrary::new(LIBRARY_ID, env!("CARGO_PKG_VERSION"));

    library.register(
        WidgetDefinition::new("greeting", greeting)
            .with_parameters(
                InspectorDefinition::new().field_config("text", json!({ "widget": "textarea" })),
            )
            .with_appear(InspectorDefinition::new())
            .with_disappear(InspectorDefinition::new()),
    );
    library.register(
        WidgetDefinition::new("progress-bar", progress_bar)
            .with_parameters(
                InspectorDefinition::new().field_config("value", json!({ "step": 0.01 })),
            ),
    );
    library.set_panel_definition(
        PanelDefinition::new(control_panel, PanelOptions::new("Hello", "wave"))
            .on_action(panel_action),
    );

    library
}

// This macro generates the C ABI entry points for dynamic loading
export_library!(library);
