//! The perspective element tree.
//!
//! Perspective elements mirror the live tree without any UI behind them.
//! The stock stations are reused as-is (they are generic over the hierarchy
//! they live in); dockables are replaced by the placeholders in
//! [`crate::dockable`].

use std::any::Any;
use std::fmt::Debug;

use fdock_layout::{
    ElementTree, FlapStation, LayoutNode, ScreenStation, SplitStation, StackStation, Station,
};

/// Element of a perspective: a station placeholder, a dockable placeholder,
/// or both.
pub trait PerspectiveElement: Debug + 'static {
    fn factory_id(&self) -> &str;

    fn as_station(&self) -> Option<&dyn Station<dyn PerspectiveElement>> {
        None
    }

    fn as_station_mut(&mut self) -> Option<&mut dyn Station<dyn PerspectiveElement>> {
        None
    }

    /// Whether this element can sit inside a station.
    fn is_dockable(&self) -> bool {
        true
    }

    /// Key under which location histories are kept.
    fn unique_id(&self) -> Option<&str> {
        None
    }

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl LayoutNode for dyn PerspectiveElement {
    fn factory_id(&self) -> &str {
        PerspectiveElement::factory_id(self)
    }

    fn station(&self) -> Option<&dyn Station<Self>> {
        self.as_station()
    }

    fn station_mut(&mut self) -> Option<&mut dyn Station<Self>> {
        self.as_station_mut()
    }

    fn is_dockable(&self) -> bool {
        PerspectiveElement::is_dockable(self)
    }

    fn unique_id(&self) -> Option<&str> {
        PerspectiveElement::unique_id(self)
    }

    fn as_any(&self) -> &dyn Any {
        PerspectiveElement::as_any(self)
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        PerspectiveElement::as_any_mut(self)
    }
}

impl ElementTree for dyn PerspectiveElement {
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

macro_rules! station_element {
    ($station:ident, dockable: $dockable:expr) => {
        impl PerspectiveElement for $station<dyn PerspectiveElement> {
            fn factory_id(&self) -> &str {
                $station::factory_id(self)
            }

            fn as_station(&self) -> Option<&dyn Station<dyn PerspectiveElement>> {
                Some(self)
            }

            fn as_station_mut(&mut self) -> Option<&mut dyn Station<dyn PerspectiveElement>> {
                Some(self)
            }

            fn is_dockable(&self) -> bool {
                $dockable
            }

            fn as_any(&self) -> &dyn Any {
                self
            }

            fn as_any_mut(&mut self) -> &mut dyn Any {
                self
            }
        }
    };
}

station_element!(SplitStation, dockable: true);
station_element!(StackStation, dockable: true);
station_element!(FlapStation, dockable: true);
station_element!(ScreenStation, dockable: false);
