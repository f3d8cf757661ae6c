use std::any::Any;
use std::io::{Read, Write};

use fdock_core::{CodecError, DataInput, DataOutput, XElement};
use serde::{Deserialize, Serialize};

use super::{SECURE_STACK_FACTORY_ID, STACK_FACTORY_ID, child_id_attr, read_id, write_id};
use crate::composition::{ChildIds, ChildMap, LayoutData};
use crate::element::{DockElement, Dockable, ElementTree, LayoutNode, Station};
use crate::error::LayoutError;
use crate::factory::DockFactory;
use crate::placement::Placement;

/// Tabbed station: children are shown one at a time, in order.
#[derive(Debug)]
pub struct StackStation<E: ?Sized> {
    secure: bool,
    children: Vec<Box<E>>,
    selected: Option<usize>,
}

impl<E: ?Sized> StackStation<E> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            secure: false,
            children: Vec::new(),
            selected: None,
        }
    }

    #[must_use]
    pub fn secure() -> Self {
        Self {
            secure: true,
            ..Self::new()
        }
    }

    #[must_use]
    pub const fn is_secure(&self) -> bool {
        self.secure
    }

    #[must_use]
    pub fn factory_id(&self) -> &'static str {
        if self.secure {
            SECURE_STACK_FACTORY_ID
        } else {
            STACK_FACTORY_ID
        }
    }

    #[must_use]
    pub const fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn select(&mut self, index: usize) {
        if index < self.children.len() {
            self.selected = Some(index);
        }
    }
}

impl<E: ?Sized> Clone for StackStation<E>
where
    Box<E>: Clone,
{
    fn clone(&self) -> Self {
        Self {
            secure: self.secure,
            children: self.children.clone(),
            selected: self.selected,
        }
    }
}

impl<E: ?Sized> Default for StackStation<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: ?Sized> Station<E> for StackStation<E> {
    fn dockable_count(&self) -> usize {
        self.children.len()
    }

    fn dockable(&self, index: usize) -> Option<&E> {
        self.children.get(index).map(|child| &**child)
    }

    fn dockable_mut(&mut self, index: usize) -> Option<&mut E> {
        self.children.get_mut(index).map(|child| &mut **child)
    }

    fn add(&mut self, child: Box<E>, placement: Option<&Placement>) -> Result<(), LayoutError> {
        let index = match placement {
            Some(Placement::Stack { index }) => (*index).min(self.children.len()),
            _ => self.children.len(),
        };
        self.children.insert(index, child);
        self.selected = Some(index);
        Ok(())
    }

    fn remove(&mut self, index: usize) -> Option<Box<E>> {
        if index >= self.children.len() {
            return None;
        }
        let child = self.children.remove(index);
        self.selected = match self.selected {
            _ if self.children.is_empty() => None,
            Some(selected) if selected >= index => Some(selected.saturating_sub(1)),
            other => other,
        };
        Some(child)
    }

    fn placement_of(&self, index: usize) -> Option<Placement> {
        (index < self.children.len()).then_some(Placement::Stack { index })
    }
}

impl Dockable for StackStation<dyn DockElement> {
    fn title(&self) -> &str {
        ""
    }
}

impl DockElement for StackStation<dyn DockElement> {
    fn factory_id(&self) -> &str {
        StackStation::factory_id(self)
    }

    fn as_dockable(&self) -> Option<&dyn Dockable> {
        Some(self)
    }

    fn as_station(&self) -> Option<&dyn Station<dyn DockElement>> {
        Some(self)
    }

    fn as_station_mut(&mut self) -> Option<&mut dyn Station<dyn DockElement>> {
        Some(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Child ids in tab order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StackLayout {
    pub ids: Vec<usize>,
}

impl LayoutData for StackLayout {
    fn write<W: Write>(&self, out: &mut DataOutput<W>) -> Result<(), CodecError> {
        out.write_len(self.ids.len())?;
        for id in &self.ids {
            write_id(out, *id)?;
        }
        Ok(())
    }

    fn read<R: Read>(input: &mut DataInput<R>) -> Result<Self, CodecError> {
        let count = input.read_len()?;
        let mut ids = Vec::new();
        for _ in 0..count {
            ids.push(read_id(input)?);
        }
        Ok(Self { ids })
    }

    fn write_xml(&self, element: &mut XElement) {
        for id in &self.ids {
            element.add_element("child").add_int("id", *id as i64);
        }
    }

    fn read_xml(element: &XElement) -> Result<Self, CodecError> {
        let ids = element
            .elements("child")
            .map(child_id_attr)
            .collect::<Result<_, _>>()?;
        Ok(Self { ids })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StackStationFactory {
    secure: bool,
}

impl StackStationFactory {
    #[must_use]
    pub const fn new() -> Self {
        Self { secure: false }
    }

    #[must_use]
    pub const fn secure() -> Self {
        Self { secure: true }
    }
}

impl<E: ElementTree + ?Sized> DockFactory<E> for StackStationFactory {
    type Layout = StackLayout;

    fn id(&self) -> &str {
        if self.secure {
            SECURE_STACK_FACTORY_ID
        } else {
            STACK_FACTORY_ID
        }
    }

    fn layout_of(&self, element: &E, children: &ChildIds) -> Result<StackLayout, LayoutError> {
        let station = element
            .as_any()
            .downcast_ref::<StackStation<E>>()
            .ok_or_else(|| LayoutError::mismatch(<Self as DockFactory<E>>::id(self)))?;
        let ids = (0..station.dockable_count())
            .filter_map(|index| children.id_of(index))
            .collect();
        Ok(StackLayout { ids })
    }

    fn layout(
        &self,
        layout: &StackLayout,
        children: Option<ChildMap<E>>,
    ) -> Result<Option<Box<E>>, LayoutError> {
        let mut station = if self.secure {
            StackStation::secure()
        } else {
            StackStation::new()
        };
        if let Some(mut children) = children {
            for id in &layout.ids {
                if let Some(child) = children.take(*id) {
                    station.children.push(child);
                }
            }
            if !station.children.is_empty() {
                station.selected = Some(0);
            }
        }
        Ok(Some(E::wrap_stack(station)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dockable::DefaultDockable;

    fn titled(title: &str) -> Box<dyn DockElement> {
        Box::new(DefaultDockable::new(title))
    }

    #[test]
    fn add_honours_stack_placement() {
        let mut stack: StackStation<dyn DockElement> = StackStation::new();
        stack.add(titled("a"), None).unwrap();
        stack.add(titled("c"), None).unwrap();
        stack
            .add(titled("b"), Some(&Placement::Stack { index: 1 }))
            .unwrap();
        let titles: Vec<_> = (0..3)
            .map(|i| stack.dockable(i).unwrap().as_dockable().unwrap().title().to_owned())
            .collect();
        assert_eq!(titles, vec!["a", "b", "c"]);
        assert_eq!(stack.placement_of(2), Some(Placement::Stack { index: 2 }));
        assert_eq!(stack.placement_of(3), None);
    }

    #[test]
    fn foreign_placement_appends() {
        let mut stack: StackStation<dyn DockElement> = StackStation::new();
        stack.add(titled("a"), None).unwrap();
        stack
            .add(titled("b"), Some(&Placement::Flap { index: 0, hold: true }))
            .unwrap();
        assert_eq!(
            stack.dockable(1).unwrap().as_dockable().unwrap().title(),
            "b"
        );
    }

    #[test]
    fn remove_keeps_selection_in_range() {
        let mut stack: StackStation<dyn DockElement> = StackStation::new();
        stack.add(titled("a"), None).unwrap();
        stack.add(titled("b"), None).unwrap();
        assert_eq!(stack.selected(), Some(1));
        assert!(stack.remove(1).is_some());
        assert_eq!(stack.selected(), Some(0));
        assert!(stack.remove(0).is_some());
        assert_eq!(stack.selected(), None);
        assert!(stack.remove(0).is_none());
    }

    #[test]
    fn layout_round_trips_through_xml() {
        let layout = StackLayout { ids: vec![2, 0, 1] };
        let mut element = XElement::new("layout");
        layout.write_xml(&mut element);
        assert_eq!(StackLayout::read_xml(&element).unwrap(), layout);
    }
}
