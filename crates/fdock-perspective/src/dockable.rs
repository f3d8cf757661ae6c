//! Dockable placeholders and their factories.
//!
//! Placeholders carry exactly what the live factories persist, so a layout
//! written from the live tree reads into a perspective and back without
//! loss. Single dockables are created on demand for any unique id; multiple
//! dockables only ever come out of their own factory.

use std::any::Any;

use fdock_layout::{
    ChildIds, ChildMap, DEFAULT_DOCKABLE_FACTORY_ID, DefaultDockableFactory, DockFactory,
    DockableLayout, LayoutError, MultipleDockableFactory, MultipleDockableLayout,
    SINGLE_DOCKABLE_FACTORY_ID, SingleDockableLayout,
};

use crate::element::PerspectiveElement;

/// Placeholder for a single dockable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleDockablePerspective {
    unique_id: String,
}

impl SingleDockablePerspective {
    pub fn new(unique_id: impl Into<String>) -> Self {
        Self {
            unique_id: unique_id.into(),
        }
    }

    #[must_use]
    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }
}

impl PerspectiveElement for SingleDockablePerspective {
    fn factory_id(&self) -> &str {
        SINGLE_DOCKABLE_FACTORY_ID
    }

    fn unique_id(&self) -> Option<&str> {
        Some(&self.unique_id)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Placeholder for one instance of a multiple dockable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipleDockablePerspective {
    factory: String,
    layout: MultipleDockableLayout,
}

impl MultipleDockablePerspective {
    pub fn new(factory: impl Into<String>, layout: MultipleDockableLayout) -> Self {
        Self {
            factory: factory.into(),
            layout,
        }
    }

    #[must_use]
    pub fn factory(&self) -> &str {
        &self.factory
    }

    #[must_use]
    pub const fn layout(&self) -> &MultipleDockableLayout {
        &self.layout
    }
}

impl PerspectiveElement for MultipleDockablePerspective {
    fn factory_id(&self) -> &str {
        &self.factory
    }

    fn unique_id(&self) -> Option<&str> {
        Some(&self.layout.unique_id)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Placeholder for a plain titled dockable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultDockablePerspective {
    title: String,
}

impl DefaultDockablePerspective {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }
}

impl PerspectiveElement for DefaultDockablePerspective {
    fn factory_id(&self) -> &str {
        DEFAULT_DOCKABLE_FACTORY_ID
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Resolves single-dockable layouts to placeholders.
#[derive(Debug, Clone, Copy, Default)]
pub struct SinglePerspectiveFactory;

impl DockFactory<dyn PerspectiveElement> for SinglePerspectiveFactory {
    type Layout = SingleDockableLayout;

    fn id(&self) -> &str {
        SINGLE_DOCKABLE_FACTORY_ID
    }

    fn layout_of(
        &self,
        element: &dyn PerspectiveElement,
        _children: &ChildIds,
    ) -> Result<SingleDockableLayout, LayoutError> {
        let dockable = element
            .as_any()
            .downcast_ref::<SingleDockablePerspective>()
            .ok_or_else(|| mismatch(SINGLE_DOCKABLE_FACTORY_ID))?;
        Ok(SingleDockableLayout {
            unique_id: dockable.unique_id.clone(),
        })
    }

    fn layout(
        &self,
        layout: &SingleDockableLayout,
        _children: Option<ChildMap<dyn PerspectiveElement>>,
    ) -> Result<Option<Box<dyn PerspectiveElement>>, LayoutError> {
        Ok(Some(Box::new(SingleDockablePerspective::new(
            layout.unique_id.clone(),
        ))))
    }
}

impl DockFactory<dyn PerspectiveElement> for MultipleDockableFactory {
    type Layout = MultipleDockableLayout;

    fn id(&self) -> &str {
        self.name()
    }

    fn layout_of(
        &self,
        element: &dyn PerspectiveElement,
        _children: &ChildIds,
    ) -> Result<MultipleDockableLayout, LayoutError> {
        element
            .as_any()
            .downcast_ref::<MultipleDockablePerspective>()
            .filter(|dockable| dockable.factory == self.name())
            .map(|dockable| dockable.layout.clone())
            .ok_or_else(|| mismatch(self.name()))
    }

    fn layout(
        &self,
        layout: &MultipleDockableLayout,
        _children: Option<ChildMap<dyn PerspectiveElement>>,
    ) -> Result<Option<Box<dyn PerspectiveElement>>, LayoutError> {
        Ok(Some(Box::new(MultipleDockablePerspective::new(
            self.name(),
            layout.clone(),
        ))))
    }
}

impl DockFactory<dyn PerspectiveElement> for DefaultDockableFactory {
    type Layout = DockableLayout;

    fn id(&self) -> &str {
        DEFAULT_DOCKABLE_FACTORY_ID
    }

    fn layout_of(
        &self,
        element: &dyn PerspectiveElement,
        _children: &ChildIds,
    ) -> Result<DockableLayout, LayoutError> {
        let dockable = element
            .as_any()
            .downcast_ref::<DefaultDockablePerspective>()
            .ok_or_else(|| mismatch(DEFAULT_DOCKABLE_FACTORY_ID))?;
        Ok(DockableLayout {
            title: dockable.title.clone(),
        })
    }

    fn layout(
        &self,
        layout: &DockableLayout,
        _children: Option<ChildMap<dyn PerspectiveElement>>,
    ) -> Result<Option<Box<dyn PerspectiveElement>>, LayoutError> {
        Ok(Some(Box::new(DefaultDockablePerspective::new(
            layout.title.clone(),
        ))))
    }
}

fn mismatch(factory: &str) -> LayoutError {
    LayoutError::ElementMismatch {
        factory: factory.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout_of<F: DockFactory<dyn PerspectiveElement>>(
        factory: &F,
        element: &dyn PerspectiveElement,
    ) -> Result<F::Layout, LayoutError> {
        factory.layout_of(element, &ChildIds::new())
    }

    #[test]
    fn any_single_id_gets_a_placeholder() {
        let built = SinglePerspectiveFactory
            .layout(&SingleDockableLayout { unique_id: "never-registered".into() }, None)
            .unwrap()
            .unwrap();
        assert_eq!(PerspectiveElement::unique_id(built.as_ref()), Some("never-registered"));
        let layout = layout_of(&SinglePerspectiveFactory, built.as_ref()).unwrap();
        assert_eq!(layout.unique_id, "never-registered");
    }

    #[test]
    fn multiple_placeholders_belong_to_their_factory() {
        let editors = MultipleDockableFactory::new("editor");
        let layout = MultipleDockableLayout {
            unique_id: "e1".into(),
            title: "main.rs".into(),
            ..MultipleDockableLayout::default()
        };
        let built = DockFactory::<dyn PerspectiveElement>::layout(&editors, &layout, None)
            .unwrap()
            .unwrap();
        assert_eq!(PerspectiveElement::factory_id(built.as_ref()), "editor");
        assert_eq!(layout_of(&editors, built.as_ref()).unwrap(), layout);

        let terminals = MultipleDockableFactory::new("terminal");
        assert!(matches!(
            layout_of(&terminals, built.as_ref()),
            Err(LayoutError::ElementMismatch { factory }) if factory == "terminal"
        ));
    }

    #[test]
    fn default_placeholder_keeps_title() {
        let element: Box<dyn PerspectiveElement> = Box::new(DefaultDockablePerspective::new("notes"));
        let layout = layout_of(&DefaultDockableFactory, element.as_ref()).unwrap();
        assert_eq!(layout.title, "notes");
        assert!(layout_of(&SinglePerspectiveFactory, element.as_ref()).is_err());
    }
}
