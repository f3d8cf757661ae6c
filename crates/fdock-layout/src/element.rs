//! Element traits.
//!
//! Two element hierarchies share one serialization path: the live tree
//! (`dyn DockElement`) and the perspective tree defined downstream. The
//! converter only sees them through [`LayoutNode`], a small identity and
//! structure view; the stock stations are generic over the hierarchy they
//! live in and are boxed into it through [`ElementTree`].

use std::any::Any;
use std::fmt::Debug;

use crate::error::LayoutError;
use crate::placement::Placement;
use crate::station::{FlapStation, ScreenStation, SplitStation, StackStation};

/// Read-only identity and structure of an element, whatever tree it is in.
pub trait LayoutNode: 'static {
    /// Id of the factory that persists this element.
    fn factory_id(&self) -> &str;

    /// Station view when the element hosts children.
    fn station(&self) -> Option<&dyn Station<Self>>;

    fn station_mut(&mut self) -> Option<&mut dyn Station<Self>>;

    /// Whether the element may be placed as a child of a station.
    fn is_dockable(&self) -> bool;

    /// Stable key of a single dockable, if the element has one.
    fn unique_id(&self) -> Option<&str> {
        None
    }

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// A container of dockables.
///
/// Indices are display order. `placement_of` reports the station's own
/// description of where a child sits; `add` accepts such a description and
/// falls back to the station's default position when it does not fit.
pub trait Station<E: ?Sized> {
    fn dockable_count(&self) -> usize;

    fn dockable(&self, index: usize) -> Option<&E>;

    fn dockable_mut(&mut self, index: usize) -> Option<&mut E>;

    fn add(&mut self, child: Box<E>, placement: Option<&Placement>) -> Result<(), LayoutError>;

    fn remove(&mut self, index: usize) -> Option<Box<E>>;

    fn placement_of(&self, index: usize) -> Option<Placement>;
}

/// An element hierarchy the stock stations can be boxed into.
pub trait ElementTree: LayoutNode {
    fn wrap_split(station: SplitStation<Self>) -> Box<Self>;

    fn wrap_stack(station: StackStation<Self>) -> Box<Self>;

    fn wrap_flap(station: FlapStation<Self>) -> Box<Self>;

    fn wrap_screen(station: ScreenStation<Self>) -> Box<Self>;
}

/// Leaf content of the live tree.
pub trait Dockable {
    fn title(&self) -> &str;

    fn unique_id(&self) -> Option<&str> {
        None
    }
}

/// Element of the live tree: a station, a dockable, or both.
pub trait DockElement: Debug + 'static {
    fn factory_id(&self) -> &str;

    fn as_dockable(&self) -> Option<&dyn Dockable> {
        None
    }

    fn as_station(&self) -> Option<&dyn Station<dyn DockElement>> {
        None
    }

    fn as_station_mut(&mut self) -> Option<&mut dyn Station<dyn DockElement>> {
        None
    }

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl LayoutNode for dyn DockElement {
    fn factory_id(&self) -> &str {
        DockElement::factory_id(self)
    }

    fn station(&self) -> Option<&dyn Station<Self>> {
        self.as_station()
    }

    fn station_mut(&mut self) -> Option<&mut dyn Station<Self>> {
        self.as_station_mut()
    }

    fn is_dockable(&self) -> bool {
        self.as_dockable().is_some()
    }

    fn unique_id(&self) -> Option<&str> {
        self.as_dockable().and_then(Dockable::unique_id)
    }

    fn as_any(&self) -> &dyn Any {
        DockElement::as_any(self)
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        DockElement::as_any_mut(self)
    }
}

impl ElementTree for dyn DockElement {
    fn wrap_split(station: SplitStation<Self>) -> Box<Self> {
        Box::new(station)
    }

    fn wrap_stack(station: StackStation<Self>) -> Box<Self> {
        Box::new(station)
    }

    fn wrap_flap(station: FlapStation<Self>) -> Box<Self> {
        Box::new(station)
    }

    fn wrap_screen(station: ScreenStation<Self>) -> Box<Self> {
        Box::new(station)
    }
}

/// Depth-first search for the element whose [`LayoutNode::unique_id`] is
/// `key`, returning the chain of child indices from `root` to it.
pub fn find_unique<E: LayoutNode + ?Sized>(root: &E, key: &str) -> Option<Vec<usize>> {
    if root.unique_id() == Some(key) {
        return Some(Vec::new());
    }
    let station = root.station()?;
    for index in 0..station.dockable_count() {
        if let Some(mut route) = station.dockable(index).and_then(|c| find_unique(c, key)) {
            route.insert(0, index);
            return Some(route);
        }
    }
    None
}

/// Unique ids of `root` and everything below it, pre-order.
pub fn unique_ids<E: LayoutNode + ?Sized>(root: &E) -> Vec<&str> {
    let mut ids: Vec<&str> = root.unique_id().into_iter().collect();
    if let Some(station) = root.station() {
        for index in 0..station.dockable_count() {
            if let Some(child) = station.dockable(index) {
                ids.extend(unique_ids(child));
            }
        }
    }
    ids
}

/// Follow a chain of child indices from `root`.
pub fn resolve_route<'a, E: LayoutNode + ?Sized>(root: &'a E, route: &[usize]) -> Option<&'a E> {
    let mut current = root;
    for index in route {
        current = current.station()?.dockable(*index)?;
    }
    Some(current)
}

/// Mutable variant of [`resolve_route`].
pub fn resolve_route_mut<'a, E: LayoutNode + ?Sized>(
    root: &'a mut E,
    route: &[usize],
) -> Option<&'a mut E> {
    let mut current = root;
    for index in route {
        current = current.station_mut()?.dockable_mut(*index)?;
    }
    Some(current)
}
