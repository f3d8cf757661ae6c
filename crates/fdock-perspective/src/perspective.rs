//! `CPerspective`: a layout that exists only in memory.
//!
//! A perspective owns placeholder root stations by key and the mode settings
//! of its dockables. Dockables placed in a root are found by unique id; a
//! dockable with a history but no place in any root is invisible, and
//! reappears at its current location when the perspective is applied.

use std::collections::{BTreeMap, BTreeSet};

use fdock_layout::{LayoutNode, find_unique, resolve_route, resolve_route_mut, unique_ids};

use crate::element::PerspectiveElement;
use crate::error::PerspectiveError;
use crate::history::{ExtendedMode, Location, LocationHistory};
use crate::modes::ModeSettings;
use crate::setting::InvisibleEntry;

#[derive(Debug, Default)]
pub struct CPerspective {
    stations: BTreeMap<String, Box<dyn PerspectiveElement>>,
    modes: ModeSettings,
}

impl CPerspective {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `station` as the root under `key`, returning the root it
    /// replaced.
    pub fn add_station(
        &mut self,
        key: impl Into<String>,
        station: Box<dyn PerspectiveElement>,
    ) -> Result<Option<Box<dyn PerspectiveElement>>, PerspectiveError> {
        let key = key.into();
        if station.as_station().is_none() {
            return Err(PerspectiveError::NonRootStation(key));
        }
        Ok(self.stations.insert(key, station))
    }

    pub fn remove_station(&mut self, key: &str) -> Option<Box<dyn PerspectiveElement>> {
        self.stations.remove(key)
    }

    #[must_use]
    pub fn station(&self, key: &str) -> Option<&dyn PerspectiveElement> {
        self.stations.get(key).map(|station| station.as_ref())
    }

    pub fn station_mut(&mut self, key: &str) -> Option<&mut (dyn PerspectiveElement + 'static)> {
        self.stations.get_mut(key).map(|station| station.as_mut())
    }

    pub fn station_keys(&self) -> impl Iterator<Item = &str> {
        self.stations.keys().map(String::as_str)
    }

    pub fn stations(&self) -> impl Iterator<Item = (&str, &dyn PerspectiveElement)> {
        self.stations
            .iter()
            .map(|(key, station)| (key.as_str(), station.as_ref()))
    }

    /// Put `dockable` at `location` and record `mode` in its history.
    pub fn place(
        &mut self,
        dockable: Box<dyn PerspectiveElement>,
        mode: ExtendedMode,
        location: Location,
    ) -> Result<(), PerspectiveError> {
        let key = PerspectiveElement::unique_id(dockable.as_ref()).map(str::to_owned);
        let station = self
            .stations
            .get_mut(&location.root)
            .and_then(|root| root.as_station_mut())
            .ok_or_else(|| PerspectiveError::UnknownStation(location.root.clone()))?;
        station.add(dockable, location.placement.as_ref())?;
        if let Some(key) = key {
            let recorded = self.location_of(&key).unwrap_or(location);
            self.modes.record(&key, mode, recorded);
        }
        Ok(())
    }

    /// Detach the dockable with unique id `key` from whichever root holds
    /// it. Its history is kept.
    pub fn take_dockable(&mut self, key: &str) -> Option<Box<dyn PerspectiveElement>> {
        for station in self.stations.values_mut() {
            let Some(route) = find_unique(station.as_ref(), key) else {
                continue;
            };
            let (index, parent) = route.split_last()?;
            let parent = resolve_route_mut(station.as_mut(), parent)?;
            return parent.station_mut()?.remove(*index);
        }
        None
    }

    #[must_use]
    pub fn contains_dockable(&self, key: &str) -> bool {
        self.dockable(key).is_some()
    }

    #[must_use]
    pub fn dockable(&self, key: &str) -> Option<&dyn PerspectiveElement> {
        self.stations.values().find_map(|station| {
            let route = find_unique(station.as_ref(), key)?;
            resolve_route(station.as_ref(), &route)
        })
    }

    /// Root key and in-root placement of the dockable with unique id `key`.
    ///
    /// For nested dockables the placement is that of the root's child that
    /// contains them.
    #[must_use]
    pub fn location_of(&self, key: &str) -> Option<Location> {
        self.stations.iter().find_map(|(root, station)| {
            let route = find_unique(station.as_ref(), key)?;
            let first = *route.first()?;
            let placement = station.as_station()?.placement_of(first);
            Some(Location::new(root.clone(), placement))
        })
    }

    /// Unique ids of the dockables placed in some root.
    #[must_use]
    pub fn visible_keys(&self) -> BTreeSet<String> {
        self.stations
            .values()
            .flat_map(|station| unique_ids(station.as_ref()))
            .map(str::to_owned)
            .collect()
    }

    /// Every known dockable key: placed, or remembered by a history.
    #[must_use]
    pub fn dockable_keys(&self) -> BTreeSet<String> {
        let mut keys = self.visible_keys();
        keys.extend(self.modes.keys().map(str::to_owned));
        keys
    }

    /// Dockables with a history but no place in any root, at their current
    /// location.
    #[must_use]
    pub fn invisible(&self) -> Vec<InvisibleEntry> {
        let visible = self.visible_keys();
        self.modes
            .iter()
            .filter(|(key, _)| !visible.contains(*key))
            .filter_map(|(key, history)| {
                history.current().map(|(_, location)| InvisibleEntry {
                    key: key.to_owned(),
                    location: location.clone(),
                })
            })
            .collect()
    }

    #[must_use]
    pub const fn modes(&self) -> &ModeSettings {
        &self.modes
    }

    pub fn modes_mut(&mut self) -> &mut ModeSettings {
        &mut self.modes
    }

    #[must_use]
    pub fn history(&self, key: &str) -> Option<&LocationHistory> {
        self.modes.history(key)
    }

    /// Replace the mode settings, dropping locations whose root this
    /// perspective does not have.
    pub fn apply_modes(&mut self, modes: ModeSettings) {
        self.modes = modes;
        let stations = &self.stations;
        self.modes.retain_roots(|root| stations.contains_key(root));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dockable::SingleDockablePerspective;
    use fdock_layout::{FlapStation, Placement, SplitStation, StackStation, Station};

    fn perspective() -> CPerspective {
        let mut perspective = CPerspective::new();
        perspective
            .add_station("center", Box::new(SplitStation::<dyn PerspectiveElement>::new()))
            .unwrap();
        perspective
            .add_station("west", Box::new(FlapStation::<dyn PerspectiveElement>::new()))
            .unwrap();
        perspective
    }

    fn single(key: &str) -> Box<dyn PerspectiveElement> {
        Box::new(SingleDockablePerspective::new(key))
    }

    #[test]
    fn dockables_cannot_be_roots() {
        let mut perspective = CPerspective::new();
        let err = perspective.add_station("loose", single("x")).unwrap_err();
        assert!(matches!(err, PerspectiveError::NonRootStation(key) if key == "loose"));
    }

    #[test]
    fn placing_records_the_actual_location() {
        let mut perspective = perspective();
        perspective
            .place(single("files"), ExtendedMode::Minimized, Location::new("west", None))
            .unwrap();
        let history = perspective.history("files").unwrap();
        assert_eq!(history.current_mode(), Some(ExtendedMode::Minimized));
        assert_eq!(
            history.location(ExtendedMode::Minimized).unwrap().placement,
            Some(Placement::Flap { index: 0, hold: false })
        );
        assert!(perspective.contains_dockable("files"));
    }

    #[test]
    fn placing_into_a_missing_root_fails() {
        let mut perspective = perspective();
        let err = perspective
            .place(single("files"), ExtendedMode::Normalized, Location::new("north", None))
            .unwrap_err();
        assert!(matches!(err, PerspectiveError::UnknownStation(root) if root == "north"));
    }

    #[test]
    fn taken_dockables_become_invisible() {
        let mut perspective = perspective();
        let mut stack: StackStation<dyn PerspectiveElement> = StackStation::new();
        stack.add(single("files"), None).unwrap();
        perspective
            .station_mut("center")
            .and_then(|center| center.as_station_mut())
            .unwrap()
            .add(Box::new(stack), None)
            .unwrap();
        perspective
            .modes_mut()
            .record("files", ExtendedMode::Normalized, Location::new("center", None));

        assert!(perspective.invisible().is_empty());
        let taken = perspective.take_dockable("files").unwrap();
        assert_eq!(PerspectiveElement::unique_id(taken.as_ref()), Some("files"));
        assert!(!perspective.contains_dockable("files"));

        let invisible = perspective.invisible();
        assert_eq!(invisible.len(), 1);
        assert_eq!(invisible[0].key, "files");
        assert_eq!(invisible[0].location.root, "center");
        assert!(perspective.dockable_keys().contains("files"));
    }

    #[test]
    fn applied_modes_lose_unknown_roots() {
        let mut perspective = perspective();
        let mut modes = ModeSettings::new();
        modes.record("files", ExtendedMode::Normalized, Location::new("center", None));
        modes.record("files", ExtendedMode::Externalized, Location::new("external", None));
        perspective.apply_modes(modes);
        assert_eq!(
            perspective.history("files").unwrap().order(),
            &[ExtendedMode::Normalized]
        );
    }
}
