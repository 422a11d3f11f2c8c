//! Widget library - the catalog a widget package hands to the host
//!
//! Registration is last-write-wins by widget name, and `set_panel` replaces
//! the single panel slot. Hosts rely on this for hot reload: re-running a
//! library's registration code refreshes every entry in place. Overwrites are
//! logged at warn level so accidental duplicates show up during authoring.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::context::{WidgetContextProps, WidgetProps};
use crate::element::Element;
use crate::error::PluginError;
use crate::manifest::{LibraryManifest, WidgetManifest};
use crate::panel::{PanelDefinition, PanelOptions, PanelProvider};
use crate::schema::{Inspector, InspectorDefinition, ParameterShape};

type WidgetFn<P, A, D> =
    Arc<dyn Fn(&WidgetProps<P, A, D>) -> Result<Element, PluginError> + Send + Sync>;

/// A widget: name, render entry point and up to three inspector slots.
///
/// `P` is the parameter shape, `A` and `D` the appear and disappear data
/// shapes. Each slot is independent. An undeclared appear or disappear slot
/// makes the matching [`WidgetProps`] field `None`, whatever the host sends.
pub struct WidgetDefinition<P, A = (), D = ()> {
    /// Catalog key
    pub name: String,
    widget: WidgetFn<P, A, D>,
    /// Inspector for the parameters
    pub parameters: Option<InspectorDefinition<P>>,
    /// Inspector for the appear animation data
    pub appear: Option<InspectorDefinition<A>>,
    /// Inspector for the disappear animation data
    pub disappear: Option<InspectorDefinition<D>>,
}

impl<P, A, D> WidgetDefinition<P, A, D>
where
    P: ParameterShape,
    A: ParameterShape,
    D: ParameterShape,
{
    /// Create a definition with no inspector slots declared
    pub fn new<F>(name: impl Into<String>, widget: F) -> Self
    where
        F: Fn(&WidgetProps<P, A, D>) -> Result<Element, PluginError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            widget: Arc::new(widget),
            parameters: None,
            appear: None,
            disappear: None,
        }
    }

    /// Builder: declare the parameter inspector
    #[must_use]
    pub fn with_parameters(mut self, inspector: InspectorDefinition<P>) -> Self {
        self.parameters = Some(inspector);
        self
    }

    /// Builder: declare the appear inspector
    #[must_use]
    pub fn with_appear(mut self, inspector: InspectorDefinition<A>) -> Self {
        self.appear = Some(inspector);
        self
    }

    /// Builder: declare the disappear inspector
    #[must_use]
    pub fn with_disappear(mut self, inspector: InspectorDefinition<D>) -> Self {
        self.disappear = Some(inspector);
        self
    }

    /// Typed view of host props for this widget
    pub fn props(&self, props: &WidgetContextProps) -> Result<WidgetProps<P, A, D>, PluginError> {
        // Undeclared slots are never read, so host data cannot fail them
        let appear = match self.appear {
            Some(_) => props.appear_as()?,
            None => None,
        };
        let disappear = match self.disappear {
            Some(_) => props.disappear_as()?,
            None => None,
        };
        Ok(WidgetProps {
            styles: props.styles,
            parameters: props.parameters_as()?,
            appear,
            disappear,
        })
    }
}

impl<P, A, D> fmt::Debug for WidgetDefinition<P, A, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetDefinition")
            .field("name", &self.name)
            .field("parameters", &self.parameters)
            .field("appear", &self.appear)
            .field("disappear", &self.disappear)
            .finish_non_exhaustive()
    }
}

/// Shape-erased widget as stored in a [`WidgetLibrary`]
pub trait RegisteredWidget: Send + Sync {
    /// Catalog key
    fn name(&self) -> &str;

    /// Parameter inspector, if declared
    fn parameters(&self) -> Option<&Inspector>;

    /// Appear inspector, if declared
    fn appear(&self) -> Option<&Inspector>;

    /// Disappear inspector, if declared
    fn disappear(&self) -> Option<&Inspector>;

    /// Render with `props` as the widget scope.
    ///
    /// The entry point gets the typed props and the `use_widget_*` hooks work
    /// for anything it calls.
    fn render(&self, props: WidgetContextProps) -> Result<Element, PluginError>;

    /// Discovery metadata
    fn manifest(&self) -> WidgetManifest {
        WidgetManifest {
            name: self.name().to_string(),
            parameters: self.parameters().cloned(),
            appear: self.appear().cloned(),
            disappear: self.disappear().cloned(),
        }
    }
}

impl<P, A, D> RegisteredWidget for WidgetDefinition<P, A, D>
where
    P: ParameterShape,
    A: ParameterShape,
    D: ParameterShape,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn parameters(&self) -> Option<&Inspector> {
        self.parameters.as_ref().map(InspectorDefinition::inspector)
    }

    fn appear(&self) -> Option<&Inspector> {
        self.appear.as_ref().map(InspectorDefinition::inspector)
    }

    fn disappear(&self) -> Option<&Inspector> {
        self.disappear.as_ref().map(InspectorDefinition::inspector)
    }

    fn render(&self, mut props: WidgetContextProps) -> Result<Element, PluginError> {
        let typed = self.props(&props)?;
        // Hooks must see the same slots as the typed props
        if self.appear.is_none() {
            props.appear = None;
        }
        if self.disappear.is_none() {
            props.disappear = None;
        }
        props.provide(|| (self.widget)(&typed))
    }
}

/// Catalog of widgets plus an optional panel, tagged with an id and version
pub struct WidgetLibrary {
    id: String,
    version: String,
    widgets: BTreeMap<String, Arc<dyn RegisteredWidget>>,
    panel: Option<Arc<PanelDefinition>>,
}

impl WidgetLibrary {
    /// Create an empty library
    pub fn new(id: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            version: version.into(),
            widgets: BTreeMap::new(),
            panel: None,
        }
    }

    /// Library identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Library version
    pub fn version(&self) -> &str {
        &self.version
    }

    // ─── Registration ────────────────────────────────────────────────

    /// Add a widget, replacing any widget with the same name.
    ///
    /// Returns the stored handle.
    pub fn register<P, A, D>(
        &mut self,
        definition: WidgetDefinition<P, A, D>,
    ) -> Arc<dyn RegisteredWidget>
    where
        P: ParameterShape,
        A: ParameterShape,
        D: ParameterShape,
    {
        let widget: Arc<dyn RegisteredWidget> = Arc::new(definition);
        self.register_shared(Arc::clone(&widget));
        widget
    }

    /// Add an already shared widget, replacing any widget with the same name
    pub fn register_shared(&mut self, widget: Arc<dyn RegisteredWidget>) {
        let name = widget.name().to_string();
        if self.widgets.insert(name.clone(), widget).is_some() {
            tracing::warn!(library = %self.id, widget = %name, "Widget re-registered, replacing previous definition");
        } else {
            tracing::debug!(library = %self.id, widget = %name, "Registered widget");
        }
    }

    /// Set the panel, replacing any previous one.
    ///
    /// Without options the panel is titled after the library id.
    pub fn set_panel<F>(&mut self, panel: F, options: Option<PanelOptions>) -> Arc<PanelDefinition>
    where
        F: Fn(&PanelProvider) -> Result<Element, PluginError> + Send + Sync + 'static,
    {
        let options = options.unwrap_or_else(|| PanelOptions::new(self.id.clone(), ""));
        self.set_panel_definition(PanelDefinition::new(panel, options))
    }

    /// Set a fully built panel (e.g. one with an action handler), replacing
    /// any previous one
    pub fn set_panel_definition(&mut self, definition: PanelDefinition) -> Arc<PanelDefinition> {
        let definition = Arc::new(definition);
        if self.panel.replace(Arc::clone(&definition)).is_some() {
            tracing::warn!(library = %self.id, "Panel replaced");
        } else {
            tracing::debug!(library = %self.id, panel = %definition.options.name, "Registered panel");
        }
        definition
    }

    // ─── Discovery ───────────────────────────────────────────────────

    /// Look up a widget by name
    pub fn widget(&self, name: &str) -> Option<&Arc<dyn RegisteredWidget>> {
        self.widgets.get(name)
    }

    /// All widgets, ordered by name
    pub fn widgets(&self) -> impl Iterator<Item = &Arc<dyn RegisteredWidget>> {
        self.widgets.values()
    }

    /// Registered widget names, ordered
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.widgets.keys().map(String::as_str)
    }

    /// The panel, if one is set
    pub fn panel(&self) -> Option<&Arc<PanelDefinition>> {
        self.panel.as_ref()
    }

    /// Number of registered widgets
    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    /// Whether no widgets are registered
    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    /// Render the widget registered as `name`
    pub fn render(&self, name: &str, props: WidgetContextProps) -> Result<Element, PluginError> {
        self.widget(name)
            .ok_or_else(|| PluginError::UnknownWidget(name.to_string()))?
            .render(props)
    }

    /// Discovery metadata for the whole library
    pub fn manifest(&self) -> LibraryManifest {
        LibraryManifest {
            id: self.id.clone(),
            version: self.version.clone(),
            api_version: crate::API_VERSION,
            widgets: self.widgets().map(|w| w.manifest()).collect(),
            panel: self.panel.as_ref().map(|p| p.options.clone()),
        }
    }
}

impl fmt::Debug for WidgetLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetLibrary")
            .field("id", &self.id)
            .field("version", &self.version)
            .field("widgets", &self.names().collect::<Vec<_>>())
            .field("panel", &self.panel)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{use_widget_appear, use_widget_disappear, use_widget_parameters};
    use crate::schema::{FieldKind, ObjectSchema};
    use crate::types::{AnimationParameters, WidgetStyles};
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Title {
        text: String,
    }

    impl ParameterShape for Title {
        fn schema() -> ObjectSchema {
            ObjectSchema::new().field("text", FieldKind::String)
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Fade {
        opacity: f64,
    }

    impl ParameterShape for Fade {
        fn schema() -> ObjectSchema {
            ObjectSchema::new().field(
                "opacity",
                FieldKind::Number {
                    min: Some(0.0),
                    max: Some(1.0),
                },
            )
        }
    }

    fn title_widget(name: &str) -> WidgetDefinition<Title, Fade> {
        WidgetDefinition::new(name, |props: &WidgetProps<Title, Fade>| {
            let opacity = props
                .appear
                .as_ref()
                .and_then(|a| a.data.as_ref())
                .map_or(1.0, |fade| fade.opacity);
            Ok(Element::new("text")
                .prop("content", props.parameters.text.clone())
                .prop("opacity", opacity))
        })
        .with_parameters(InspectorDefinition::new())
        .with_appear(InspectorDefinition::new())
    }

    fn props() -> WidgetContextProps {
        WidgetContextProps::new(WidgetStyles::new(100.0, 50.0))
            .with_parameters(json!({ "text": "hi" }))
            .with_appear(AnimationParameters::new(5, 30).with_data(json!({ "opacity": 0.5 })))
    }

    #[test]
    fn test_new_library_is_empty() {
        let library = WidgetLibrary::new("acme", "1.0.0");
        assert_eq!(library.id(), "acme");
        assert_eq!(library.version(), "1.0.0");
        assert!(library.is_empty());
        assert!(library.panel().is_none());
    }

    #[test]
    fn test_register_stores_same_allocation() {
        let mut library = WidgetLibrary::new("acme", "1.0.0");
        let handle = library.register(title_widget("title"));

        let stored = library.widget("title").unwrap();
        assert!(Arc::ptr_eq(stored, &handle));
    }

    #[test]
    fn test_register_same_name_last_wins() {
        let mut library = WidgetLibrary::new("acme", "1.0.0");
        let first = library.register(title_widget("title"));
        let second = library.register(title_widget("title"));

        assert_eq!(library.len(), 1);
        let stored = library.widget("title").unwrap();
        assert!(Arc::ptr_eq(stored, &second));
        assert!(!Arc::ptr_eq(stored, &first));
    }

    #[test]
    fn test_set_panel_last_wins() {
        let mut library = WidgetLibrary::new("acme", "1.0.0");
        library.set_panel(|_| Ok(Element::new("first")), None);
        let second = library.set_panel(
            |_| Ok(Element::new("second")),
            Some(PanelOptions::new("Controls", "sliders")),
        );

        let panel = library.panel().unwrap();
        assert!(Arc::ptr_eq(panel, &second));
        assert_eq!(panel.options, PanelOptions::new("Controls", "sliders"));
        assert_eq!(
            panel.render(&PanelProvider::new()).unwrap().kind,
            "second"
        );
    }

    #[test]
    fn test_set_panel_default_options_use_library_id() {
        let mut library = WidgetLibrary::new("acme", "1.0.0");
        library.set_panel(|_| Ok(Element::new("panel")), None);
        assert_eq!(library.panel().unwrap().options.name, "acme");
    }

    #[test]
    fn test_render_passes_typed_props() {
        let mut library = WidgetLibrary::new("acme", "1.0.0");
        library.register(title_widget("title"));

        let element = library.render("title", props()).unwrap();
        assert_eq!(element.props["content"], "hi");
        assert_eq!(element.props["opacity"], 0.5);
    }

    #[test]
    fn test_render_opens_hook_scope() {
        let mut library = WidgetLibrary::new("acme", "1.0.0");
        library.register(WidgetDefinition::<Title>::new("hooked", |_| {
            let title: Title = use_widget_parameters()?;
            Ok(Element::new("text").prop("content", title.text))
        }));

        let element = library.render("hooked", props()).unwrap();
        assert_eq!(element.props["content"], "hi");
        assert!(use_widget_parameters::<Title>().is_err());
    }

    #[test]
    fn test_undeclared_animation_slot_is_none() {
        let definition = WidgetDefinition::<Title, Fade>::new("plain", |_| Ok(Element::new("x")));
        let typed = definition.props(&props()).unwrap();

        assert!(typed.appear.is_none());
        assert!(typed.disappear.is_none());
    }

    #[test]
    fn test_undeclared_slot_ignores_foreign_data() {
        let mut library = WidgetLibrary::new("acme", "1.0.0");
        library.register(WidgetDefinition::<Title>::new("static", |props| {
            Ok(Element::new("text").prop("content", props.parameters.text.clone()))
        }));

        let element = library.render("static", props()).unwrap();
        assert_eq!(element.props["content"], "hi");
    }

    #[test]
    fn test_hooks_in_undeclared_slot_widget_see_none() {
        let mut library = WidgetLibrary::new("acme", "1.0.0");
        library.register(WidgetDefinition::<Title>::new("static", |props| {
            assert!(props.appear.is_none());
            assert!(use_widget_appear::<()>()?.is_none());
            assert!(use_widget_appear::<serde_json::Value>()?.is_none());
            assert!(use_widget_disappear::<()>()?.is_none());
            Ok(Element::new("text"))
        }));

        let host_props = props()
            .with_disappear(AnimationParameters::new(1, 10).with_data(json!({ "opacity": 0.1 })));
        assert!(library.render("static", host_props).is_ok());
    }

    #[test]
    fn test_hooks_in_declared_slot_widget_see_host_data() {
        let mut library = WidgetLibrary::new("acme", "1.0.0");
        library.register(
            WidgetDefinition::<Title, Fade>::new("fading", |props| {
                let appear = use_widget_appear::<Fade>()?;
                assert_eq!(appear, props.appear);
                assert!(use_widget_disappear::<()>()?.is_none());
                Ok(Element::new("text"))
            })
            .with_appear(InspectorDefinition::new()),
        );

        let host_props = props()
            .with_disappear(AnimationParameters::new(1, 10).with_data(json!({ "opacity": 0.1 })));
        assert!(library.render("fading", host_props).is_ok());
    }

    #[test]
    fn test_declared_slot_outside_phase_is_none() {
        let definition = title_widget("title");
        let host_props = WidgetContextProps::new(WidgetStyles::new(10.0, 10.0))
            .with_parameters(json!({ "text": "idle" }));

        let typed = definition.props(&host_props).unwrap();
        assert!(typed.appear.is_none());
    }

    #[test]
    fn test_render_unknown_widget() {
        let library = WidgetLibrary::new("acme", "1.0.0");
        let err = library.render("missing", props()).unwrap_err();
        assert!(matches!(err, PluginError::UnknownWidget(name) if name == "missing"));
    }

    #[test]
    fn test_render_reports_parameter_mismatch() {
        let mut library = WidgetLibrary::new("acme", "1.0.0");
        library.register(title_widget("title"));

        let bad = WidgetContextProps::default().with_parameters(json!({ "txt": 1 }));
        assert!(matches!(
            library.render("title", bad),
            Err(PluginError::Parameters(_))
        ));
    }

    #[test]
    fn test_inspector_slots_are_independent() {
        let definition = WidgetDefinition::<Title, Fade, Fade>::new("t", |_| Ok(Element::new("x")))
            .with_disappear(InspectorDefinition::new());

        assert!(RegisteredWidget::parameters(&definition).is_none());
        assert!(RegisteredWidget::appear(&definition).is_none());
        assert_eq!(
            RegisteredWidget::disappear(&definition).unwrap().schema,
            Fade::schema()
        );
    }

    #[test]
    fn test_names_are_ordered() {
        let mut library = WidgetLibrary::new("acme", "1.0.0");
        library.register(title_widget("zeta"));
        library.register(title_widget("alpha"));

        let names: Vec<&str> = library.names().collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }
}
