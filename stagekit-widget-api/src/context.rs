//! Widget context - per-render styles, parameters and animation state
//!
//! The host builds a [`WidgetContextProps`] for every widget instance it
//! renders. Widget entry points receive a typed [`WidgetProps`] view of it;
//! helpers deeper in the render can reach the same data through the
//! `use_widget_*` hooks while a provider scope is open.

use std::rc::Rc;

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::error::PluginError;
use crate::scope::{self, ScopeStack};
use crate::types::{AnimationParameters, WidgetStyles};

thread_local! {
    static WIDGET_SCOPES: ScopeStack<WidgetContextProps> = const { ScopeStack::new() };
}

/// Host-side, untyped props for one widget render
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WidgetContextProps {
    /// Layout box
    pub styles: WidgetStyles,
    /// Parameter values as edited in the host inspector
    #[serde(default)]
    pub parameters: Value,
    /// Present while the widget is in its appear phase
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appear: Option<AnimationParameters<Value>>,
    /// Present while the widget is in its disappear phase
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disappear: Option<AnimationParameters<Value>>,
}

/// Widget-side, typed view of [`WidgetContextProps`]
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetProps<P, A = (), D = ()> {
    /// Layout box
    pub styles: WidgetStyles,
    /// Parameters in the widget's own shape
    pub parameters: P,
    /// Appear phase, if the widget declared one and the host is in it
    pub appear: Option<AnimationParameters<A>>,
    /// Disappear phase, if the widget declared one and the host is in it
    pub disappear: Option<AnimationParameters<D>>,
}

fn shape_error(e: serde_json::Error) -> PluginError {
    PluginError::Parameters(e.to_string())
}

fn typed_animation<T: DeserializeOwned>(
    animation: &AnimationParameters<Value>,
) -> Result<AnimationParameters<T>, PluginError> {
    let data = match &animation.data {
        None | Some(Value::Null) => None,
        Some(value) => Some(serde_json::from_value(value.clone()).map_err(shape_error)?),
    };
    Ok(AnimationParameters {
        frame: animation.frame,
        duration_in_frames: animation.duration_in_frames,
        data,
    })
}

impl WidgetContextProps {
    /// Props with the given layout, null parameters and no animation
    pub fn new(styles: WidgetStyles) -> Self {
        Self {
            styles,
            ..Default::default()
        }
    }

    /// Builder: set the parameter value
    #[must_use]
    pub fn with_parameters(mut self, parameters: Value) -> Self {
        self.parameters = parameters;
        self
    }

    /// Builder: enter the appear phase
    #[must_use]
    pub fn with_appear(mut self, appear: AnimationParameters<Value>) -> Self {
        self.appear = Some(appear);
        self
    }

    /// Builder: enter the disappear phase
    #[must_use]
    pub fn with_disappear(mut self, disappear: AnimationParameters<Value>) -> Self {
        self.disappear = Some(disappear);
        self
    }

    /// Parameters read into `P`
    pub fn parameters_as<P: DeserializeOwned>(&self) -> Result<P, PluginError> {
        serde_json::from_value(self.parameters.clone()).map_err(shape_error)
    }

    /// Appear phase with its data read into `A`
    pub fn appear_as<A: DeserializeOwned>(
        &self,
    ) -> Result<Option<AnimationParameters<A>>, PluginError> {
        self.appear.as_ref().map(typed_animation::<A>).transpose()
    }

    /// Disappear phase with its data read into `D`
    pub fn disappear_as<D: DeserializeOwned>(
        &self,
    ) -> Result<Option<AnimationParameters<D>>, PluginError> {
        self.disappear.as_ref().map(typed_animation::<D>).transpose()
    }

    /// Full typed view
    pub fn typed<P, A, D>(&self) -> Result<WidgetProps<P, A, D>, PluginError>
    where
        P: DeserializeOwned,
        A: DeserializeOwned,
        D: DeserializeOwned,
    {
        Ok(WidgetProps {
            styles: self.styles,
            parameters: self.parameters_as()?,
            appear: self.appear_as()?,
            disappear: self.disappear_as()?,
        })
    }

    /// Run `f` with these props as the innermost widget scope
    pub fn provide<R>(self, f: impl FnOnce() -> R) -> R {
        scope::enter(&WIDGET_SCOPES, Rc::new(self), f)
    }
}

// ─── Hooks ───────────────────────────────────────────────────────────

fn current(hook: &'static str) -> Result<Rc<WidgetContextProps>, PluginError> {
    scope::current(&WIDGET_SCOPES).ok_or(PluginError::OutsideProvider { hook })
}

/// The untyped props of the innermost widget scope
pub fn use_widget_context() -> Result<Rc<WidgetContextProps>, PluginError> {
    current("use_widget_context")
}

/// Layout box of the widget being rendered
pub fn use_widget_styles() -> Result<WidgetStyles, PluginError> {
    Ok(current("use_widget_styles")?.styles)
}

/// Parameters of the widget being rendered, read into `P`.
///
/// `P` should be the shape the widget was registered with. The value is
/// converted, not validated against the schema.
pub fn use_widget_parameters<P: DeserializeOwned>() -> Result<P, PluginError> {
    current("use_widget_parameters")?.parameters_as()
}

/// Appear phase of the widget being rendered; `None` outside the phase
pub fn use_widget_appear<A: DeserializeOwned>()
-> Result<Option<AnimationParameters<A>>, PluginError> {
    current("use_widget_appear")?.appear_as()
}

/// Disappear phase of the widget being rendered; `None` outside the phase
pub fn use_widget_disappear<D: DeserializeOwned>()
-> Result<Option<AnimationParameters<D>>, PluginError> {
    current("use_widget_disappear")?.disappear_as()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, PartialEq, Deserialize)]
    struct Text {
        text: String,
    }

    #[derive(Debug, PartialEq, Deserialize)]
    struct Fade {
        opacity: f64,
    }

    fn sample_props() -> WidgetContextProps {
        WidgetContextProps::new(WidgetStyles::new(100.0, 50.0))
            .with_parameters(json!({ "text": "hi" }))
            .with_appear(AnimationParameters::new(5, 30).with_data(json!({ "opacity": 0.5 })))
    }

    #[test]
    fn test_hooks_outside_provider_fail() {
        assert!(matches!(
            use_widget_styles(),
            Err(PluginError::OutsideProvider {
                hook: "use_widget_styles"
            })
        ));
        assert!(matches!(
            use_widget_parameters::<Value>(),
            Err(PluginError::OutsideProvider {
                hook: "use_widget_parameters"
            })
        ));
        assert!(matches!(
            use_widget_appear::<Value>(),
            Err(PluginError::OutsideProvider {
                hook: "use_widget_appear"
            })
        ));
        assert!(matches!(
            use_widget_disappear::<Value>(),
            Err(PluginError::OutsideProvider {
                hook: "use_widget_disappear"
            })
        ));
        assert!(use_widget_context().is_err());
    }

    #[test]
    fn test_hooks_read_provided_props() {
        let props = sample_props();
        let expected_appear = props.appear.clone();

        props.provide(|| {
            assert_eq!(
                use_widget_styles().unwrap(),
                WidgetStyles::new(100.0, 50.0)
            );
            assert_eq!(use_widget_parameters::<Value>().unwrap(), json!({ "text": "hi" }));
            assert_eq!(use_widget_appear::<Value>().unwrap(), expected_appear);
            assert_eq!(use_widget_disappear::<Value>().unwrap(), None);
        });
    }

    #[test]
    fn test_hooks_read_typed_shapes() {
        sample_props().provide(|| {
            assert_eq!(
                use_widget_parameters::<Text>().unwrap(),
                Text { text: "hi".into() }
            );

            let appear = use_widget_appear::<Fade>().unwrap().unwrap();
            assert_eq!(appear.frame, 5);
            assert_eq!(appear.duration_in_frames, 30);
            assert_eq!(appear.data, Some(Fade { opacity: 0.5 }));
        });
    }

    #[test]
    fn test_shape_mismatch_is_reported() {
        sample_props().provide(|| {
            let err = use_widget_parameters::<Fade>().unwrap_err();
            assert!(matches!(err, PluginError::Parameters(_)));
        });
    }

    #[test]
    fn test_null_animation_data_is_none() {
        let props = WidgetContextProps::default().with_disappear(AnimationParameters {
            frame: 0,
            duration_in_frames: 10,
            data: Some(Value::Null),
        });

        let disappear = props.disappear_as::<Fade>().unwrap().unwrap();
        assert_eq!(disappear.data, None);
    }

    #[test]
    fn test_nested_provider_shadows_outer() {
        let outer = WidgetContextProps::new(WidgetStyles::new(10.0, 10.0));
        let inner = WidgetContextProps::new(WidgetStyles::new(20.0, 20.0));

        outer.provide(|| {
            inner.provide(|| {
                assert_eq!(use_widget_styles().unwrap().width, 20.0);
            });
            assert_eq!(use_widget_styles().unwrap().width, 10.0);
        });
        assert!(use_widget_styles().is_err());
    }

    #[test]
    fn test_typed_view() {
        let typed = sample_props().typed::<Text, Fade, ()>().unwrap();

        assert_eq!(typed.styles.height, 50.0);
        assert_eq!(typed.parameters.text, "hi");
        assert_eq!(typed.appear.unwrap().data, Some(Fade { opacity: 0.5 }));
        assert!(typed.disappear.is_none());
    }

    #[test]
    fn test_props_json_shape() {
        let value = serde_json::to_value(sample_props()).unwrap();
        assert_eq!(value["styles"], json!({ "width": 100.0, "height": 50.0 }));
        assert_eq!(value["appear"]["durationInFrames"], 30);
        assert!(value.get("disappear").is_none());

        let parsed: WidgetContextProps = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, sample_props());
    }
}
