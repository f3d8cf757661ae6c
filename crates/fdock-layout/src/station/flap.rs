use std::any::Any;
use std::io::{Read, Write};

use fdock_core::{CodecError, DataInput, DataOutput, XElement};
use serde::{Deserialize, Serialize};

use super::{FLAP_FACTORY_ID, SECURE_FLAP_FACTORY_ID, child_id_attr, read_id, write_id};
use crate::composition::{ChildIds, ChildMap, LayoutData};
use crate::element::{DockElement, Dockable, ElementTree, LayoutNode, Station};
use crate::error::LayoutError;
use crate::factory::DockFactory;
use crate::placement::Placement;

/// Auto-hide station along one edge of the main area.
///
/// Each child carries a `hold` flag: a held child stays open after focus
/// leaves it.
#[derive(Debug)]
pub struct FlapStation<E: ?Sized> {
    secure: bool,
    auto: bool,
    children: Vec<(Box<E>, bool)>,
}

impl<E: ?Sized> FlapStation<E> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            secure: false,
            auto: true,
            children: Vec::new(),
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
            SECURE_FLAP_FACTORY_ID
        } else {
            FLAP_FACTORY_ID
        }
    }

    /// Whether the station closes itself when empty.
    #[must_use]
    pub const fn is_auto(&self) -> bool {
        self.auto
    }

    pub fn set_auto(&mut self, auto: bool) {
        self.auto = auto;
    }

    #[must_use]
    pub fn is_hold(&self, index: usize) -> bool {
        self.children.get(index).is_some_and(|(_, hold)| *hold)
    }

    pub fn set_hold(&mut self, index: usize, hold: bool) {
        if let Some(entry) = self.children.get_mut(index) {
            entry.1 = hold;
        }
    }
}

impl<E: ?Sized> Clone for FlapStation<E>
where
    Box<E>: Clone,
{
    fn clone(&self) -> Self {
        Self {
            secure: self.secure,
            auto: self.auto,
            children: self.children.clone(),
        }
    }
}

impl<E: ?Sized> Default for FlapStation<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: ?Sized> Station<E> for FlapStation<E> {
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
        let (index, hold) = match placement {
            Some(Placement::Flap { index, hold }) => ((*index).min(self.children.len()), *hold),
            _ => (self.children.len(), false),
        };
        self.children.insert(index, (child, hold));
        Ok(())
    }

    fn remove(&mut self, index: usize) -> Option<Box<E>> {
        (index < self.children.len()).then(|| self.children.remove(index).0)
    }

    fn placement_of(&self, index: usize) -> Option<Placement> {
        let (_, hold) = self.children.get(index)?;
        Some(Placement::Flap { index, hold: *hold })
    }
}

impl Dockable for FlapStation<dyn DockElement> {
    fn title(&self) -> &str {
        ""
    }
}

impl DockElement for FlapStation<dyn DockElement> {
    fn factory_id(&self) -> &str {
        FlapStation::factory_id(self)
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

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlapLayout {
    pub auto: bool,
    /// `(child id, hold)` in display order.
    pub entries: Vec<(usize, bool)>,
}

impl LayoutData for FlapLayout {
    fn write<W: Write>(&self, out: &mut DataOutput<W>) -> Result<(), CodecError> {
        out.write_bool(self.auto)?;
        out.write_len(self.entries.len())?;
        for (id, hold) in &self.entries {
            write_id(out, *id)?;
            out.write_bool(*hold)?;
        }
        Ok(())
    }

    fn read<R: Read>(input: &mut DataInput<R>) -> Result<Self, CodecError> {
        let auto = input.read_bool()?;
        let count = input.read_len()?;
        let mut entries = Vec::new();
        for _ in 0..count {
            let id = read_id(input)?;
            entries.push((id, input.read_bool()?));
        }
        Ok(Self { auto, entries })
    }

    fn write_xml(&self, element: &mut XElement) {
        element.add_bool("auto", self.auto);
        for (id, hold) in &self.entries {
            element
                .add_element("child")
                .add_int("id", *id as i64)
                .add_bool("hold", *hold);
        }
    }

    fn read_xml(element: &XElement) -> Result<Self, CodecError> {
        let auto = element.parsed_attr_opt("auto")?.unwrap_or(true);
        let entries = element
            .elements("child")
            .map(|child| {
                let hold = child.parsed_attr_opt("hold")?.unwrap_or(false);
                Ok::<_, CodecError>((child_id_attr(child)?, hold))
            })
            .collect::<Result<_, _>>()?;
        Ok(Self { auto, entries })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FlapStationFactory {
    secure: bool,
}

impl FlapStationFactory {
    #[must_use]
    pub const fn new() -> Self {
        Self { secure: false }
    }

    #[must_use]
    pub const fn secure() -> Self {
        Self { secure: true }
    }
}

impl<E: ElementTree + ?Sized> DockFactory<E> for FlapStationFactory {
    type Layout = FlapLayout;

    fn id(&self) -> &str {
        if self.secure {
            SECURE_FLAP_FACTORY_ID
        } else {
            FLAP_FACTORY_ID
        }
    }

    fn layout_of(&self, element: &E, children: &ChildIds) -> Result<FlapLayout, LayoutError> {
        let station = element
            .as_any()
            .downcast_ref::<FlapStation<E>>()
            .ok_or_else(|| LayoutError::mismatch(<Self as DockFactory<E>>::id(self)))?;
        let entries = station
            .children
            .iter()
            .enumerate()
            .filter_map(|(index, (_, hold))| children.id_of(index).map(|id| (id, *hold)))
            .collect();
        Ok(FlapLayout {
            auto: station.auto,
            entries,
        })
    }

    fn layout(
        &self,
        layout: &FlapLayout,
        children: Option<ChildMap<E>>,
    ) -> Result<Option<Box<E>>, LayoutError> {
        let mut station = if self.secure {
            FlapStation::secure()
        } else {
            FlapStation::new()
        };
        station.auto = layout.auto;
        if let Some(mut children) = children {
            for (id, hold) in &layout.entries {
                if let Some(child) = children.take(*id) {
                    station.children.push((child, *hold));
                }
            }
        }
        Ok(Some(E::wrap_flap(station)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dockable::DefaultDockable;

    #[test]
    fn hold_travels_with_placement() {
        let mut flap: FlapStation<dyn DockElement> = FlapStation::new();
        flap.add(Box::new(DefaultDockable::new("a")), None).unwrap();
        flap.add(
            Box::new(DefaultDockable::new("b")),
            Some(&Placement::Flap { index: 0, hold: true }),
        )
        .unwrap();
        assert!(flap.is_hold(0));
        assert!(!flap.is_hold(1));
        assert_eq!(
            flap.placement_of(0),
            Some(Placement::Flap { index: 0, hold: true })
        );
    }

    #[test]
    fn layout_skips_excluded_children() {
        let mut flap: FlapStation<dyn DockElement> = FlapStation::new();
        flap.set_auto(false);
        for title in ["a", "b", "c"] {
            flap.add(Box::new(DefaultDockable::new(title)), None).unwrap();
        }
        flap.set_hold(2, true);
        let element: &dyn DockElement = &flap;
        let ids: ChildIds = [Some(0), None, Some(1)].into_iter().collect();
        let layout =
            DockFactory::<dyn DockElement>::layout_of(&FlapStationFactory::new(), element, &ids)
                .unwrap();
        assert_eq!(
            layout,
            FlapLayout {
                auto: false,
                entries: vec![(0, false), (1, true)],
            }
        );
    }

    #[test]
    fn xml_defaults_missing_flags() {
        let element = XElement::parse(r#"<layout><child id="3"/></layout>"#).unwrap();
        let layout = FlapLayout::read_xml(&element).unwrap();
        assert!(layout.auto);
        assert_eq!(layout.entries, vec![(3, false)]);
    }
}
