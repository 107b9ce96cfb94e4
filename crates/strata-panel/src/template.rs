//! Panel templates: factories the runtime instantiates panels from.

use std::fmt;
use std::rc::Rc;

use crate::id::TemplateId;
use crate::panel::{ErasedPanel, Panel, PanelBox};
use crate::view::PanelView;

/// A freshly instantiated panel and the view it is drawn with.
pub struct PanelInstance {
    pub(crate) name: String,
    pub(crate) panel: Box<dyn ErasedPanel>,
    pub(crate) view: Box<dyn PanelView>,
}

impl PanelInstance {
    pub fn new<P: Panel>(name: impl Into<String>, panel: P, view: impl PanelView) -> Self {
        Self {
            name: name.into(),
            panel: Box::new(PanelBox::new(panel)),
            view: Box::new(view),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_name(&self) -> &'static str {
        self.panel.type_name()
    }
}

impl fmt::Debug for PanelInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PanelInstance")
            .field("name", &self.name)
            .field("type", &self.type_name())
            .finish()
    }
}

type Factory = Rc<dyn Fn() -> Option<PanelInstance>>;

/// Reusable recipe for a panel. Cheap to clone; clones share identity, and
/// identity is what the instance buffer is keyed by.
#[derive(Clone)]
pub struct PanelTemplate {
    id: TemplateId,
    name: Rc<str>,
    factory: Factory,
}

impl PanelTemplate {
    /// Template backed by a fallible factory.
    pub fn new(
        name: impl Into<String>,
        factory: impl Fn() -> Option<PanelInstance> + 'static,
    ) -> Self {
        Self {
            id: TemplateId::next(),
            name: Rc::from(name.into()),
            factory: Rc::new(factory),
        }
    }

    /// Template building a panel and its view with `build`.
    pub fn from_fn<P, V>(name: impl Into<String>, build: impl Fn() -> (P, V) + 'static) -> Self
    where
        P: Panel,
        V: PanelView,
    {
        let name: Rc<str> = Rc::from(name.into());
        let instance_name = name.clone();
        Self {
            id: TemplateId::next(),
            name,
            factory: Rc::new(move || {
                let (panel, view) = build();
                Some(PanelInstance::new(&*instance_name, panel, view))
            }),
        }
    }

    pub fn id(&self) -> TemplateId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn instantiate(&self) -> Option<PanelInstance> {
        (self.factory)()
    }
}

impl PartialEq for PanelTemplate {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for PanelTemplate {}

impl std::hash::Hash for PanelTemplate {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for PanelTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PanelTemplate")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish()
    }
}
