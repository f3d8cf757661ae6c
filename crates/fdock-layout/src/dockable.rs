//! Stock dockables of the live tree.
//!
//! - [`DefaultDockable`]: a plain titled panel, persisted by title.
//! - [`SingleDockable`]: an application-registered panel with a fixed unique
//!   id. Its layout stores only the id; the factory restores it only while
//!   the id is registered in the shared [`SingleDockableRegistry`].
//! - [`MultipleDockable`]: one of many instances made by a named factory. The
//!   factory's layout carries everything needed to recreate the instance.

use std::any::Any;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::rc::Rc;

use fdock_core::{CodecError, DataInput, DataOutput, XElement};
use serde::{Deserialize, Serialize};

use crate::composition::{ChildIds, ChildMap, LayoutData};
use crate::element::{DockElement, Dockable};
use crate::error::LayoutError;
use crate::factory::DockFactory;

pub const DEFAULT_DOCKABLE_FACTORY_ID: &str = "DefaultDockableFactory";
pub const SINGLE_DOCKABLE_FACTORY_ID: &str = "single dockable";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultDockable {
    title: String,
}

impl DefaultDockable {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }
}

impl Dockable for DefaultDockable {
    fn title(&self) -> &str {
        &self.title
    }
}

impl DockElement for DefaultDockable {
    fn factory_id(&self) -> &str {
        DEFAULT_DOCKABLE_FACTORY_ID
    }

    fn as_dockable(&self) -> Option<&dyn Dockable> {
        Some(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DockableLayout {
    pub title: String,
}

impl LayoutData for DockableLayout {
    fn write<W: Write>(&self, out: &mut DataOutput<W>) -> Result<(), CodecError> {
        out.write_utf(&self.title)
    }

    fn read<R: Read>(input: &mut DataInput<R>) -> Result<Self, CodecError> {
        Ok(Self {
            title: input.read_utf()?,
        })
    }

    fn write_xml(&self, element: &mut XElement) {
        element.add_string("title", &self.title);
    }

    fn read_xml(element: &XElement) -> Result<Self, CodecError> {
        Ok(Self {
            title: element.attr("title").unwrap_or_default().to_owned(),
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultDockableFactory;

impl DockFactory<dyn DockElement> for DefaultDockableFactory {
    type Layout = DockableLayout;

    fn id(&self) -> &str {
        DEFAULT_DOCKABLE_FACTORY_ID
    }

    fn layout_of(
        &self,
        element: &dyn DockElement,
        _children: &ChildIds,
    ) -> Result<DockableLayout, LayoutError> {
        let dockable = element
            .as_any()
            .downcast_ref::<DefaultDockable>()
            .ok_or_else(|| LayoutError::mismatch(DEFAULT_DOCKABLE_FACTORY_ID))?;
        Ok(DockableLayout {
            title: dockable.title.clone(),
        })
    }

    fn layout(
        &self,
        layout: &DockableLayout,
        _children: Option<ChildMap<dyn DockElement>>,
    ) -> Result<Option<Box<dyn DockElement>>, LayoutError> {
        Ok(Some(Box::new(DefaultDockable::new(layout.title.clone()))))
    }
}

/// A registered dockable, identified by its unique id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleDockable {
    unique_id: String,
    title: String,
}

impl SingleDockable {
    pub fn new(unique_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            unique_id: unique_id.into(),
            title: title.into(),
        }
    }

    #[must_use]
    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }
}

impl Dockable for SingleDockable {
    fn title(&self) -> &str {
        &self.title
    }

    fn unique_id(&self) -> Option<&str> {
        Some(&self.unique_id)
    }
}

impl DockElement for SingleDockable {
    fn factory_id(&self) -> &str {
        SINGLE_DOCKABLE_FACTORY_ID
    }

    fn as_dockable(&self) -> Option<&dyn Dockable> {
        Some(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SingleDockableLayout {
    pub unique_id: String,
}

impl LayoutData for SingleDockableLayout {
    fn write<W: Write>(&self, out: &mut DataOutput<W>) -> Result<(), CodecError> {
        out.write_utf(&self.unique_id)
    }

    fn read<R: Read>(input: &mut DataInput<R>) -> Result<Self, CodecError> {
        Ok(Self {
            unique_id: input.read_utf()?,
        })
    }

    fn write_xml(&self, element: &mut XElement) {
        element.add_string("id", &self.unique_id);
    }

    fn read_xml(element: &XElement) -> Result<Self, CodecError> {
        Ok(Self {
            unique_id: element.string_attr("id")?.to_owned(),
        })
    }
}

/// Titles of the registered single dockables, by unique id.
///
/// Shared between the owner that registers dockables and the factory that
/// restores them.
#[derive(Debug, Clone, Default)]
pub struct SingleDockableRegistry {
    titles: Rc<RefCell<BTreeMap<String, String>>>,
}

impl SingleDockableRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if the id was already taken.
    pub fn register(&self, unique_id: impl Into<String>, title: impl Into<String>) -> bool {
        let mut titles = self.titles.borrow_mut();
        let unique_id = unique_id.into();
        if titles.contains_key(&unique_id) {
            return false;
        }
        titles.insert(unique_id, title.into());
        true
    }

    pub fn unregister(&self, unique_id: &str) -> bool {
        self.titles.borrow_mut().remove(unique_id).is_some()
    }

    #[must_use]
    pub fn contains(&self, unique_id: &str) -> bool {
        self.titles.borrow().contains_key(unique_id)
    }

    /// A fresh element for `unique_id`, if registered.
    #[must_use]
    pub fn create(&self, unique_id: &str) -> Option<SingleDockable> {
        self.titles
            .borrow()
            .get(unique_id)
            .map(|title| SingleDockable::new(unique_id, title.clone()))
    }

    #[must_use]
    pub fn ids(&self) -> Vec<String> {
        self.titles.borrow().keys().cloned().collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct SingleDockableFactory {
    registry: SingleDockableRegistry,
}

impl SingleDockableFactory {
    #[must_use]
    pub fn new(registry: SingleDockableRegistry) -> Self {
        Self { registry }
    }
}

impl DockFactory<dyn DockElement> for SingleDockableFactory {
    type Layout = SingleDockableLayout;

    fn id(&self) -> &str {
        SINGLE_DOCKABLE_FACTORY_ID
    }

    fn layout_of(
        &self,
        element: &dyn DockElement,
        _children: &ChildIds,
    ) -> Result<SingleDockableLayout, LayoutError> {
        let dockable = element
            .as_any()
            .downcast_ref::<SingleDockable>()
            .ok_or_else(|| LayoutError::mismatch(SINGLE_DOCKABLE_FACTORY_ID))?;
        Ok(SingleDockableLayout {
            unique_id: dockable.unique_id.clone(),
        })
    }

    fn layout(
        &self,
        layout: &SingleDockableLayout,
        _children: Option<ChildMap<dyn DockElement>>,
    ) -> Result<Option<Box<dyn DockElement>>, LayoutError> {
        match self.registry.create(&layout.unique_id) {
            Some(dockable) => Ok(Some(Box::new(dockable))),
            None => {
                tracing::warn!(
                    target: "fdock.layout",
                    unique_id = %layout.unique_id,
                    "single dockable is not registered; skipped"
                );
                Ok(None)
            }
        }
    }
}

/// One instance made by a named multiple-dockable factory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipleDockable {
    factory: String,
    layout: MultipleDockableLayout,
}

impl MultipleDockable {
    pub fn new(
        factory: impl Into<String>,
        unique_id: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            factory: factory.into(),
            layout: MultipleDockableLayout {
                unique_id: unique_id.into(),
                title: title.into(),
                properties: BTreeMap::new(),
            },
        }
    }

    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.layout.properties.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn factory(&self) -> &str {
        &self.factory
    }

    #[must_use]
    pub fn property(&self, key: &str) -> Option<&str> {
        self.layout.properties.get(key).map(String::as_str)
    }

    #[must_use]
    pub const fn layout(&self) -> &MultipleDockableLayout {
        &self.layout
    }
}

impl Dockable for MultipleDockable {
    fn title(&self) -> &str {
        &self.layout.title
    }

    fn unique_id(&self) -> Option<&str> {
        Some(&self.layout.unique_id)
    }
}

impl DockElement for MultipleDockable {
    fn factory_id(&self) -> &str {
        &self.factory
    }

    fn as_dockable(&self) -> Option<&dyn Dockable> {
        Some(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Everything a multiple-dockable factory stores about one instance.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MultipleDockableLayout {
    pub unique_id: String,
    pub title: String,
    pub properties: BTreeMap<String, String>,
}

impl LayoutData for MultipleDockableLayout {
    fn write<W: Write>(&self, out: &mut DataOutput<W>) -> Result<(), CodecError> {
        out.write_utf(&self.unique_id)?;
        out.write_utf(&self.title)?;
        out.write_len(self.properties.len())?;
        for (key, value) in &self.properties {
            out.write_utf(key)?;
            out.write_utf(value)?;
        }
        Ok(())
    }

    fn read<R: Read>(input: &mut DataInput<R>) -> Result<Self, CodecError> {
        let unique_id = input.read_utf()?;
        let title = input.read_utf()?;
        let count = input.read_len()?;
        let mut properties = BTreeMap::new();
        for _ in 0..count {
            let key = input.read_utf()?;
            properties.insert(key, input.read_utf()?);
        }
        Ok(Self {
            unique_id,
            title,
            properties,
        })
    }

    fn write_xml(&self, element: &mut XElement) {
        element
            .add_string("id", &self.unique_id)
            .add_string("title", &self.title);
        for (key, value) in &self.properties {
            element
                .add_element("property")
                .add_string("key", key)
                .add_string("value", value);
        }
    }

    fn read_xml(element: &XElement) -> Result<Self, CodecError> {
        let mut properties = BTreeMap::new();
        for property in element.elements("property") {
            properties.insert(
                property.string_attr("key")?.to_owned(),
                property.attr("value").unwrap_or_default().to_owned(),
            );
        }
        Ok(Self {
            unique_id: element.string_attr("id")?.to_owned(),
            title: element.attr("title").unwrap_or_default().to_owned(),
            properties,
        })
    }
}

/// Factory for the instances of one multiple-dockable kind; its id is the
/// kind's name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipleDockableFactory {
    name: String,
}

impl MultipleDockableFactory {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl DockFactory<dyn DockElement> for MultipleDockableFactory {
    type Layout = MultipleDockableLayout;

    fn id(&self) -> &str {
        &self.name
    }

    fn layout_of(
        &self,
        element: &dyn DockElement,
        _children: &ChildIds,
    ) -> Result<MultipleDockableLayout, LayoutError> {
        element
            .as_any()
            .downcast_ref::<MultipleDockable>()
            .filter(|dockable| dockable.factory == self.name)
            .map(|dockable| dockable.layout.clone())
            .ok_or_else(|| LayoutError::mismatch(&self.name))
    }

    fn layout(
        &self,
        layout: &MultipleDockableLayout,
        _children: Option<ChildMap<dyn DockElement>>,
    ) -> Result<Option<Box<dyn DockElement>>, LayoutError> {
        Ok(Some(Box::new(MultipleDockable {
            factory: self.name.clone(),
            layout: layout.clone(),
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_factory_restores_only_registered_ids() {
        let registry = SingleDockableRegistry::new();
        assert!(registry.register("files", "Files"));
        assert!(!registry.register("files", "Other"));
        let factory = SingleDockableFactory::new(registry.clone());

        let built = factory
            .layout(&SingleDockableLayout { unique_id: "files".into() }, None)
            .unwrap()
            .unwrap();
        assert_eq!(built.as_dockable().unwrap().title(), "Files");
        assert_eq!(built.as_dockable().unwrap().unique_id(), Some("files"));

        assert!(
            factory
                .layout(&SingleDockableLayout { unique_id: "ghost".into() }, None)
                .unwrap()
                .is_none()
        );
        registry.unregister("files");
        assert!(
            factory
                .layout(&SingleDockableLayout { unique_id: "files".into() }, None)
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn multiple_factory_refuses_foreign_instances() {
        let editors = MultipleDockableFactory::new("editor");
        let other: Box<dyn DockElement> = Box::new(MultipleDockable::new("terminal", "t1", "Terminal"));
        let err = editors.layout_of(other.as_ref(), &ChildIds::new()).unwrap_err();
        assert!(matches!(err, LayoutError::ElementMismatch { factory } if factory == "editor"));
    }

    #[test]
    fn multiple_layout_keeps_properties_in_xml() {
        let dockable = MultipleDockable::new("editor", "e1", "main.rs")
            .with_property("path", "src/main.rs")
            .with_property("line", "42");
        let mut element = XElement::new("layout");
        dockable.layout().write_xml(&mut element);
        let back = MultipleDockableLayout::read_xml(&element).unwrap();
        assert_eq!(&back, dockable.layout());
        assert_eq!(back.properties.get("line").map(String::as_str), Some("42"));
    }
}
