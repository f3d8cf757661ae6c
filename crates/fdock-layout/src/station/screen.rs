use std::any::Any;
use std::io::{Read, Write};

use fdock_core::{CodecError, DataInput, DataOutput, Rect, XElement};
use serde::{Deserialize, Serialize};

use super::{SCREEN_FACTORY_ID, child_id_attr, read_id, write_id};
use crate::composition::{ChildIds, ChildMap, LayoutData};
use crate::element::{DockElement, ElementTree, LayoutNode, Station};
use crate::error::LayoutError;
use crate::factory::DockFactory;
use crate::placement::{Placement, read_rect, read_rect_xml, write_rect, write_rect_xml};

/// Bounds given to a window that arrives without a screen placement.
pub const DEFAULT_WINDOW_BOUNDS: Rect = Rect::new(50, 50, 400, 300);

/// Externalized windows, each with its own bounds on screen.
///
/// Never a dockable itself: it only appears as a root.
#[derive(Debug)]
pub struct ScreenStation<E: ?Sized> {
    children: Vec<(Box<E>, Rect)>,
}

impl<E: ?Sized> ScreenStation<E> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn factory_id(&self) -> &'static str {
        SCREEN_FACTORY_ID
    }

    #[must_use]
    pub fn bounds_of(&self, index: usize) -> Option<Rect> {
        self.children.get(index).map(|(_, bounds)| *bounds)
    }

    pub fn set_bounds(&mut self, index: usize, bounds: Rect) {
        if let Some(entry) = self.children.get_mut(index) {
            entry.1 = bounds;
        }
    }
}

impl<E: ?Sized> Clone for ScreenStation<E>
where
    Box<E>: Clone,
{
    fn clone(&self) -> Self {
        Self {
            children: self.children.clone(),
        }
    }
}

impl<E: ?Sized> Default for ScreenStation<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: ?Sized> Station<E> for ScreenStation<E> {
    fn dockable_count(&self) -> usize {
        self.children.len()
    }

    fn dockable(&self, index: usize) -> Option<&E> {
        self.children.get(index).map(|(child, _)| &**child)
    }

    fn dockable_mut(&mut self, index: usize) -> Option<&mut E> {
        self.children.get_mut(index).map(|(child, _)| &mut **child)
    }

    fn add(&mut self, child: Box<E>, placement: Option<&Placement>) -> Result<(), LayoutError> {
        let bounds = match placement {
            Some(Placement::Screen { bounds }) => *bounds,
            _ => DEFAULT_WINDOW_BOUNDS,
        };
        self.children.push((child, bounds));
        Ok(())
    }

    fn remove(&mut self, index: usize) -> Option<Box<E>> {
        (index < self.children.len()).then(|| self.children.remove(index).0)
    }

    fn placement_of(&self, index: usize) -> Option<Placement> {
        self.bounds_of(index)
            .map(|bounds| Placement::Screen { bounds })
    }
}

impl DockElement for ScreenStation<dyn DockElement> {
    fn factory_id(&self) -> &str {
        ScreenStation::factory_id(self)
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

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScreenLayout {
    /// `(child id, window bounds)` in display order.
    pub entries: Vec<(usize, Rect)>,
}

impl LayoutData for ScreenLayout {
    fn write<W: Write>(&self, out: &mut DataOutput<W>) -> Result<(), CodecError> {
        out.write_len(self.entries.len())?;
        for (id, bounds) in &self.entries {
            write_id(out, *id)?;
            write_rect(out, *bounds)?;
        }
        Ok(())
    }

    fn read<R: Read>(input: &mut DataInput<R>) -> Result<Self, CodecError> {
        let count = input.read_len()?;
        let mut entries = Vec::new();
        for _ in 0..count {
            let id = read_id(input)?;
            entries.push((id, read_rect(input)?));
        }
        Ok(Self { entries })
    }

    fn write_xml(&self, element: &mut XElement) {
        for (id, bounds) in &self.entries {
            let child = element.add_element("child");
            child.add_int("id", *id as i64);
            write_rect_xml(child, *bounds);
        }
    }

    fn read_xml(element: &XElement) -> Result<Self, CodecError> {
        let entries = element
            .elements("child")
            .map(|child| Ok::<_, CodecError>((child_id_attr(child)?, read_rect_xml(child)?)))
            .collect::<Result<_, _>>()?;
        Ok(Self { entries })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ScreenStationFactory;

impl<E: ElementTree + ?Sized> DockFactory<E> for ScreenStationFactory {
    type Layout = ScreenLayout;

    fn id(&self) -> &str {
        SCREEN_FACTORY_ID
    }

    fn layout_of(&self, element: &E, children: &ChildIds) -> Result<ScreenLayout, LayoutError> {
        let station = element
            .as_any()
            .downcast_ref::<ScreenStation<E>>()
            .ok_or_else(|| LayoutError::mismatch(SCREEN_FACTORY_ID))?;
        let entries = station
            .children
            .iter()
            .enumerate()
            .filter_map(|(index, (_, bounds))| children.id_of(index).map(|id| (id, *bounds)))
            .collect();
        Ok(ScreenLayout { entries })
    }

    fn layout(
        &self,
        layout: &ScreenLayout,
        children: Option<ChildMap<E>>,
    ) -> Result<Option<Box<E>>, LayoutError> {
        let mut station = ScreenStation::new();
        if let Some(mut children) = children {
            for (id, bounds) in &layout.entries {
                if let Some(child) = children.take(*id) {
                    station.children.push((child, *bounds));
                }
            }
        }
        Ok(Some(E::wrap_screen(station)))
    }
}
