//! `Control`: the owner of the live layout.
//!
//! A control holds the root stations by key, the registry of single
//! dockables, the registered multiple-dockable factories, the mode settings
//! of every dockable, and the named layouts. It never lays anything out
//! itself: placing goes through the stations, storing through the
//! [`DockSituation`], and perspectives through the [`PerspectiveConverter`].
//!
//! Stock roots are a `"center"` split, four edge flaps, and an `"external"`
//! screen station. Further split roots can be added as working areas, whose
//! children stay out of named layouts.

use std::collections::{BTreeMap, BTreeSet};
use std::io::{Read, Write};

use fdock_core::{DataInput, DataOutput, Version, XElement};
use fdock_layout::{
    DockElement, DockSituation, FORMAT_VERSION, FlapStation, MultipleDockable,
    MultipleDockableFactory, ScreenStation, ScreenStationFactory, SingleDockableFactory,
    SingleDockableRegistry, SituationIgnore, SplitStation, StackStation, find_unique,
    resolve_route, resolve_route_mut, unique_ids,
};
use fdock_perspective::{
    CPerspective, ExtendedMode, InvisibleEntry, Location, LocationHistory, ModeSettings,
    PerspectiveConverter, PerspectiveError, RootKind, RootStation, Setting,
};

use crate::config::ControlConfig;
use crate::error::ControlError;

pub const CENTER: &str = "center";
pub const NORTH: &str = "north";
pub const SOUTH: &str = "south";
pub const EAST: &str = "east";
pub const WEST: &str = "west";
pub const EXTERNAL: &str = "external";

const STOCK_ROOTS: [(&str, RootKind); 6] = [
    (CENTER, RootKind::Split),
    (NORTH, RootKind::Flap),
    (SOUTH, RootKind::Flap),
    (EAST, RootKind::Flap),
    (WEST, RootKind::Flap),
    (EXTERNAL, RootKind::Screen),
];

/// Root a dockable goes to when entering `mode` without a remembered
/// location.
#[must_use]
pub const fn default_root(mode: ExtendedMode) -> &'static str {
    match mode {
        ExtendedMode::Normalized | ExtendedMode::Maximized => CENTER,
        ExtendedMode::Minimized => WEST,
        ExtendedMode::Externalized => EXTERNAL,
    }
}

/// Mode implied by a dockable sitting in root `key`.
#[must_use]
pub fn mode_for_root(key: &str) -> ExtendedMode {
    match key {
        NORTH | SOUTH | EAST | WEST => ExtendedMode::Minimized,
        EXTERNAL => ExtendedMode::Externalized,
        _ => ExtendedMode::Normalized,
    }
}

/// Leaves the children of live working areas out of a conversion.
#[derive(Debug, Clone, Copy, Default)]
pub struct LiveWorkingAreas;

impl SituationIgnore<dyn DockElement> for LiveWorkingAreas {
    fn ignore_children(&self, station: &dyn DockElement) -> bool {
        station
            .as_any()
            .downcast_ref::<SplitStation<dyn DockElement>>()
            .is_some_and(SplitStation::is_working_area)
    }
}

fn create_root(template: &RootStation, config: &ControlConfig) -> Box<dyn DockElement> {
    match template.kind {
        RootKind::Split => {
            let mut station: SplitStation<dyn DockElement> = if template.secure {
                SplitStation::secure()
            } else {
                SplitStation::new()
            };
            station.set_working_area(template.working_area);
            station.configure(config.divider_size, config.border_side_snap);
            Box::new(station)
        }
        RootKind::Stack if template.secure => Box::new(StackStation::<dyn DockElement>::secure()),
        RootKind::Stack => Box::new(StackStation::<dyn DockElement>::new()),
        RootKind::Flap if template.secure => Box::new(FlapStation::<dyn DockElement>::secure()),
        RootKind::Flap => Box::new(FlapStation::<dyn DockElement>::new()),
        RootKind::Screen => Box::new(ScreenStation::<dyn DockElement>::new()),
    }
}

/// Empty `element` into `hidden`: multiple dockables are kept by unique id,
/// everything else is dropped. Single dockables come back from the registry.
fn stash_dockables(
    mut element: Box<dyn DockElement>,
    hidden: &mut BTreeMap<String, Box<dyn DockElement>>,
) {
    if let Some(station) = element.as_station_mut() {
        while let Some(child) = station.remove(0) {
            stash_dockables(child, hidden);
        }
        return;
    }
    let key = element
        .as_any()
        .downcast_ref::<MultipleDockable>()
        .map(|dockable| dockable.layout().unique_id.clone());
    if let Some(key) = key {
        hidden.insert(key, element);
    }
}

#[derive(Debug)]
pub struct Control {
    config: ControlConfig,
    situation: DockSituation<dyn DockElement>,
    registry: SingleDockableRegistry,
    roots: BTreeMap<String, Box<dyn DockElement>>,
    /// Dockables taken out of the tree that cannot be recreated by a factory.
    hidden: BTreeMap<String, Box<dyn DockElement>>,
    modes: ModeSettings,
    /// Root templates and the named layouts.
    perspectives: PerspectiveConverter,
}

impl Default for Control {
    fn default() -> Self {
        Self::new(ControlConfig::default())
    }
}

impl Control {
    #[must_use]
    pub fn new(config: ControlConfig) -> Self {
        let config = config.normalized();
        let registry = SingleDockableRegistry::new();
        let mut situation = DockSituation::<dyn DockElement>::with_defaults();
        situation
            .add(ScreenStationFactory)
            .add(SingleDockableFactory::new(registry.clone()));
        situation.set_limits(config.limits());

        let mut perspectives = PerspectiveConverter::new();
        perspectives.situation_mut().set_limits(config.limits());

        let mut control = Self {
            config,
            situation,
            registry,
            roots: BTreeMap::new(),
            hidden: BTreeMap::new(),
            modes: ModeSettings::new(),
            perspectives,
        };
        let secure = control.config.restricted_environment;
        for (key, kind) in STOCK_ROOTS {
            control.install_root(key, RootStation::new(kind).secure(secure));
        }
        control
    }

    fn install_root(&mut self, key: &str, template: RootStation) {
        self.perspectives.add_root(key, template);
        self.roots
            .insert(key.to_owned(), create_root(&template, &self.config));
    }

    #[must_use]
    pub const fn config(&self) -> &ControlConfig {
        &self.config
    }

    #[must_use]
    pub const fn situation(&self) -> &DockSituation<dyn DockElement> {
        &self.situation
    }

    // ---------------------------------------------------------------------
    // Roots
    // ---------------------------------------------------------------------

    pub fn root_keys(&self) -> impl Iterator<Item = &str> {
        self.roots.keys().map(String::as_str)
    }

    #[must_use]
    pub fn root(&self, key: &str) -> Option<&dyn DockElement> {
        self.roots.get(key).map(|root| root.as_ref())
    }

    pub fn root_mut(&mut self, key: &str) -> Option<&mut (dyn DockElement + 'static)> {
        self.roots.get_mut(key).map(|root| root.as_mut())
    }

    #[must_use]
    pub fn split_root(&self, key: &str) -> Option<&SplitStation<dyn DockElement>> {
        self.roots
            .get(key)?
            .as_any()
            .downcast_ref::<SplitStation<dyn DockElement>>()
    }

    /// Add an empty split root whose children are left out of named layouts.
    pub fn add_working_area(&mut self, key: &str) -> Result<(), ControlError> {
        if self.roots.contains_key(key) {
            return Err(ControlError::DuplicateRoot(key.to_owned()));
        }
        let template = RootStation::new(RootKind::Split)
            .secure(self.config.restricted_environment)
            .working_area(true);
        self.install_root(key, template);
        tracing::debug!(target: "fdock.control", root = %key, "working area added");
        Ok(())
    }

    #[must_use]
    pub fn is_working_area(&self, key: &str) -> bool {
        self.split_root(key).is_some_and(SplitStation::is_working_area)
    }

    /// Lay out every split root in a `width` × `height` area.
    pub fn compute_bounds(&mut self, width: i32, height: i32) {
        let insets = self.config.root_insets;
        for root in self.roots.values_mut() {
            if let Some(split) = root
                .as_any_mut()
                .downcast_mut::<SplitStation<dyn DockElement>>()
            {
                split.compute_bounds(width, height, insets);
            }
        }
    }

    // ---------------------------------------------------------------------
    // Registration
    // ---------------------------------------------------------------------

    /// Make the single dockable `unique_id` known. It stays hidden until
    /// shown, or until a loaded layout places it.
    pub fn register_single(
        &mut self,
        unique_id: impl Into<String>,
        title: impl Into<String>,
    ) -> Result<(), ControlError> {
        let unique_id = unique_id.into();
        if self.is_known(&unique_id) || !self.registry.register(unique_id.clone(), title) {
            return Err(ControlError::DuplicateDockable(unique_id));
        }
        Ok(())
    }

    pub fn register_multiple_factory(&mut self, name: &str) -> Result<(), ControlError> {
        if self.situation.contains(name) {
            return Err(ControlError::DuplicateFactory(name.to_owned()));
        }
        self.situation.add(MultipleDockableFactory::new(name));
        self.perspectives
            .add_multiple_factory(MultipleDockableFactory::new(name));
        tracing::debug!(
            target: "fdock.control",
            factory = %name,
            "multiple-dockable factory registered"
        );
        Ok(())
    }

    /// Add a new instance of a multiple dockable and show it normalized.
    pub fn add_multiple(&mut self, dockable: MultipleDockable) -> Result<(), ControlError> {
        if !self.situation.contains(dockable.factory()) {
            return Err(ControlError::UnknownFactory(dockable.factory().to_owned()));
        }
        let key = dockable.layout().unique_id.clone();
        if self.is_known(&key) {
            return Err(ControlError::DuplicateDockable(key));
        }
        let mode = self.modes.current_mode(&key).unwrap_or(ExtendedMode::Normalized);
        self.place_in_mode(&key, Box::new(dockable), mode)
    }

    /// Forget the dockable `key`: take it out of the tree, drop its history,
    /// and unregister it.
    pub fn remove_dockable(&mut self, key: &str) -> Result<(), ControlError> {
        let detached = self.detach(key).is_some();
        let hidden = self.hidden.remove(key).is_some();
        let registered = self.registry.unregister(key);
        let history = self.modes.remove(key).is_some();
        if detached || hidden || registered || history {
            Ok(())
        } else {
            Err(ControlError::UnknownDockable(key.to_owned()))
        }
    }

    // ---------------------------------------------------------------------
    // Visibility and modes
    // ---------------------------------------------------------------------

    #[must_use]
    pub fn is_visible(&self, key: &str) -> bool {
        self.roots
            .values()
            .any(|root| find_unique(root.as_ref(), key).is_some())
    }

    #[must_use]
    pub fn is_known(&self, key: &str) -> bool {
        self.registry.contains(key) || self.hidden.contains_key(key) || self.is_visible(key)
    }

    #[must_use]
    pub fn dockable(&self, key: &str) -> Option<&dyn DockElement> {
        self.roots.values().find_map(|root| {
            let route = find_unique(root.as_ref(), key)?;
            resolve_route(root.as_ref(), &route)
        })
    }

    /// Unique ids of the dockables in some root.
    #[must_use]
    pub fn visible_keys(&self) -> BTreeSet<String> {
        self.roots
            .values()
            .flat_map(|root| unique_ids(root.as_ref()))
            .map(str::to_owned)
            .collect()
    }

    /// Root key and in-root placement of the visible dockable `key`.
    #[must_use]
    pub fn location_of(&self, key: &str) -> Option<Location> {
        self.roots.iter().find_map(|(name, root)| {
            let route = find_unique(root.as_ref(), key)?;
            let first = *route.first()?;
            let placement = root.as_station()?.placement_of(first);
            Some(Location::new(name.clone(), placement))
        })
    }

    /// The visible dockable in root `root` that is maximized. Entering
    /// [`ExtendedMode::Maximized`] normalizes the dockable it replaces, so
    /// there is at most one per root.
    #[must_use]
    pub fn maximized(&self, root: &str) -> Option<&str> {
        let root = self.roots.get(root)?;
        unique_ids(root.as_ref())
            .into_iter()
            .find(|key| self.modes.current_mode(key) == Some(ExtendedMode::Maximized))
    }

    #[must_use]
    pub fn mode_of(&self, key: &str) -> Option<ExtendedMode> {
        self.modes.current_mode(key)
    }

    #[must_use]
    pub fn history(&self, key: &str) -> Option<&LocationHistory> {
        self.modes.history(key)
    }

    #[must_use]
    pub const fn modes(&self) -> &ModeSettings {
        &self.modes
    }

    /// Put `key` back where its current mode last had it.
    pub fn show(&mut self, key: &str) -> Result<(), ControlError> {
        if self.is_visible(key) {
            return Ok(());
        }
        let element = self.take_hidden(key)?;
        let mode = self.modes.current_mode(key).unwrap_or(ExtendedMode::Normalized);
        self.place_in_mode(key, element, mode)
    }

    /// Take `key` out of the tree, remembering where it was.
    pub fn hide(&mut self, key: &str) -> Result<(), ControlError> {
        if !self.is_visible(key) {
            return if self.is_known(key) {
                Ok(())
            } else {
                Err(ControlError::UnknownDockable(key.to_owned()))
            };
        }
        self.remember(key);
        if let Some(element) = self.detach(key) {
            self.hidden.insert(key.to_owned(), element);
        }
        tracing::debug!(target: "fdock.control", dockable = %key, "hidden");
        Ok(())
    }

    /// Move `key` into `mode`, at the location that mode last had it.
    pub fn set_mode(&mut self, key: &str, mode: ExtendedMode) -> Result<(), ControlError> {
        let element = if self.is_visible(key) {
            if self.modes.current_mode(key) == Some(mode) {
                return Ok(());
            }
            self.remember(key);
            self.detach(key)
                .ok_or_else(|| ControlError::UnknownDockable(key.to_owned()))?
        } else {
            self.take_hidden(key)?
        };
        self.place_in_mode(key, element, mode)
    }

    /// Record the current location of the visible dockable `key` under its
    /// current mode.
    fn remember(&mut self, key: &str) {
        if let Some(location) = self.location_of(key) {
            let mode = self
                .modes
                .current_mode(key)
                .unwrap_or_else(|| mode_for_root(&location.root));
            self.modes.record(key, mode, location);
        }
    }

    fn take_hidden(&mut self, key: &str) -> Result<Box<dyn DockElement>, ControlError> {
        if let Some(element) = self.hidden.remove(key) {
            return Ok(element);
        }
        self.registry
            .create(key)
            .map(|dockable| Box::new(dockable) as Box<dyn DockElement>)
            .ok_or_else(|| ControlError::UnknownDockable(key.to_owned()))
    }

    fn place_in_mode(
        &mut self,
        key: &str,
        element: Box<dyn DockElement>,
        mode: ExtendedMode,
    ) -> Result<(), ControlError> {
        let location = self
            .modes
            .history(key)
            .and_then(|history| history.location(mode))
            .filter(|location| self.roots.contains_key(&location.root))
            .cloned()
            .unwrap_or_else(|| Location::new(default_root(mode), None));
        if mode == ExtendedMode::Maximized {
            let previous = self
                .maximized(&location.root)
                .filter(|previous| *previous != key)
                .map(str::to_owned);
            if let Some(previous) = previous {
                tracing::debug!(
                    target: "fdock.control",
                    dockable = %previous,
                    root = %location.root,
                    "maximized dockable replaced; normalizing"
                );
                self.set_mode(&previous, ExtendedMode::Normalized)?;
            }
        }
        let station = self
            .roots
            .get_mut(&location.root)
            .and_then(|root| root.as_station_mut())
            .ok_or_else(|| ControlError::UnknownRoot(location.root.clone()))?;
        station.add(element, location.placement.as_ref())?;
        let actual = self.location_of(key).unwrap_or(location);
        tracing::debug!(
            target: "fdock.control",
            dockable = %key,
            mode = %mode,
            root = %actual.root,
            "placed"
        );
        self.modes.record(key, mode, actual);
        Ok(())
    }

    fn detach(&mut self, key: &str) -> Option<Box<dyn DockElement>> {
        for root in self.roots.values_mut() {
            let Some(route) = find_unique(root.as_ref(), key) else {
                continue;
            };
            let (index, parent) = route.split_last()?;
            let parent = resolve_route_mut(root.as_mut(), parent)?;
            return parent.as_station_mut()?.remove(*index);
        }
        None
    }

    // ---------------------------------------------------------------------
    // Settings
    // ---------------------------------------------------------------------

    /// Snapshot of the live layout. Without working areas, their children
    /// are left out.
    pub fn current_setting(&self, include_working_areas: bool) -> Result<Setting, ControlError> {
        let filter = (!include_working_areas)
            .then_some(&LiveWorkingAreas as &dyn SituationIgnore<dyn DockElement>);
        let mut roots = BTreeMap::new();
        for (key, root) in &self.roots {
            if let Some(composition) = self.situation.convert_with(root.as_ref(), filter)? {
                roots.insert(key.clone(), composition);
            }
        }
        let visible = self.visible_keys();
        let invisible = self
            .modes
            .iter()
            .filter(|(key, _)| !visible.contains(*key))
            .filter_map(|(key, history)| {
                history.current().map(|(_, location)| InvisibleEntry {
                    key: key.to_owned(),
                    location: location.clone(),
                })
            })
            .collect();
        Ok(Setting {
            roots,
            invisible,
            modes: self.modes.clone(),
        })
    }

    /// Replace the live layout with `setting`.
    ///
    /// Roots the setting does not mention are emptied. A working area whose
    /// stored composition left its children out keeps its current children.
    /// Multiple dockables that drop out of the tree stay hidden.
    pub fn apply_setting(&mut self, setting: &Setting) -> Result<(), ControlError> {
        let built = self.build_setting(setting)?;
        self.commit_setting(setting, built);
        Ok(())
    }

    /// Build the roots of `setting` without touching the live tree.
    fn build_setting(
        &self,
        setting: &Setting,
    ) -> Result<BTreeMap<String, Box<dyn DockElement>>, ControlError> {
        let built = self.situation.build_roots(&setting.roots)?;
        for key in built.keys().filter(|key| !self.roots.contains_key(*key)) {
            tracing::warn!(
                target: "fdock.control",
                root = %key,
                "layout names an unknown root; dropped"
            );
        }
        Ok(built)
    }

    fn commit_setting(
        &mut self,
        setting: &Setting,
        mut built: BTreeMap<String, Box<dyn DockElement>>,
    ) {
        let _span = tracing::debug_span!(
            target: "fdock.control",
            "control.apply",
            roots = setting.roots.len()
        )
        .entered();
        let keys: Vec<String> = self.roots.keys().cloned().collect();
        for key in keys {
            let keep = self.is_working_area(&key)
                && setting
                    .roots
                    .get(&key)
                    .is_some_and(|composition| composition.ignore_children);
            if keep {
                continue;
            }
            let Some(template) = self.perspectives.root(&key).copied() else {
                continue;
            };
            let mut replacement = built
                .remove(&key)
                .unwrap_or_else(|| create_root(&template, &self.config));
            if let Some(split) = replacement
                .as_any_mut()
                .downcast_mut::<SplitStation<dyn DockElement>>()
            {
                split.set_working_area(template.working_area);
                split.configure(self.config.divider_size, self.config.border_side_snap);
            }
            if let Some(old) = self.roots.insert(key, replacement) {
                stash_dockables(old, &mut self.hidden);
            }
        }

        for key in self.visible_keys() {
            self.hidden.remove(&key);
        }

        self.modes = setting.modes.clone();
        let roots = &self.roots;
        self.modes.retain_roots(|root| roots.contains_key(root));
        for entry in &setting.invisible {
            let unplaced = self.modes.history(&entry.key).is_none();
            if unplaced && self.roots.contains_key(&entry.location.root) {
                let mode = mode_for_root(&entry.location.root);
                self.modes.record(&entry.key, mode, entry.location.clone());
            }
        }
        tracing::debug!(
            target: "fdock.control",
            visible = self.visible_keys().len(),
            hidden = self.hidden.len(),
            "layout applied"
        );
    }

    // ---------------------------------------------------------------------
    // Named layouts
    // ---------------------------------------------------------------------

    /// Store the current layout under `name`, replacing any layout there.
    pub fn save(&mut self, name: &str) -> Result<(), ControlError> {
        let setting = self.current_setting(false)?;
        self.perspectives.put_setting(name, setting);
        tracing::info!(target: "fdock.control", layout = %name, "layout saved");
        Ok(())
    }

    pub fn load(&mut self, name: &str) -> Result<(), ControlError> {
        let setting = self
            .perspectives
            .setting(name)
            .cloned()
            .ok_or_else(|| ControlError::UnknownLayout(name.to_owned()))?;
        self.apply_setting(&setting)?;
        tracing::info!(target: "fdock.control", layout = %name, "layout loaded");
        Ok(())
    }

    pub fn delete(&mut self, name: &str) -> bool {
        self.perspectives.remove(name)
    }

    /// Names of the stored layouts, sorted.
    #[must_use]
    pub fn layouts(&self) -> Vec<String> {
        self.perspectives.names().map(str::to_owned).collect()
    }

    /// Rename a stored layout, replacing anything stored under `to`.
    pub fn rename_layout(&mut self, from: &str, to: &str) -> Result<(), ControlError> {
        self.perspectives.rename(from, to).map_err(unknown_layout)
    }

    // ---------------------------------------------------------------------
    // Perspectives
    // ---------------------------------------------------------------------

    #[must_use]
    pub const fn perspectives(&self) -> &PerspectiveConverter {
        &self.perspectives
    }

    pub fn perspectives_mut(&mut self) -> &mut PerspectiveConverter {
        &mut self.perspectives
    }

    /// A perspective with every root of this control and no dockables.
    #[must_use]
    pub fn create_empty_perspective(&self) -> CPerspective {
        self.perspectives.create_empty_perspective()
    }

    /// The live layout as a perspective.
    pub fn perspective(&self) -> Result<CPerspective, ControlError> {
        let setting = self.current_setting(true)?;
        Ok(self.perspectives.from_setting(&setting)?)
    }

    /// A stored layout as a perspective.
    pub fn named_perspective(&self, name: &str) -> Result<CPerspective, ControlError> {
        self.perspectives.get(name).map_err(unknown_layout)
    }

    /// Make `perspective` the live layout.
    pub fn set_perspective(
        &mut self,
        perspective: &CPerspective,
        include_working_areas: bool,
    ) -> Result<(), ControlError> {
        let setting = self
            .perspectives
            .to_setting(perspective, include_working_areas)?;
        self.apply_setting(&setting)
    }

    // ---------------------------------------------------------------------
    // Streams
    // ---------------------------------------------------------------------

    /// `version | current setting | count × (name: utf, setting)`.
    pub fn write<W: Write>(&self, out: &mut DataOutput<W>) -> Result<(), ControlError> {
        let _span = tracing::debug_span!(target: "fdock.control", "control.write").entered();
        FORMAT_VERSION.write(out)?;
        self.current_setting(true)?.write(&self.situation, out)?;
        let named: Vec<(&str, &Setting)> = self.perspectives.settings().collect();
        out.write_len(named.len())?;
        for (name, setting) in named {
            out.write_utf(name)?;
            setting.write(&self.situation, out)?;
        }
        Ok(())
    }

    /// Replace the live layout and every named layout with the stream's.
    /// Nothing changes if the stream is malformed or its current layout
    /// cannot be built.
    pub fn read<R: Read>(&mut self, input: &mut DataInput<R>) -> Result<(), ControlError> {
        let _span = tracing::debug_span!(target: "fdock.control", "control.read").entered();
        self.situation.check_version(Version::read(input)?)?;
        let current = Setting::read(&self.situation, input)?;
        let count = input.read_len()?;
        let mut named = Vec::new();
        for _ in 0..count {
            let name = input.read_utf()?;
            named.push((name, Setting::read(&self.situation, input)?));
        }
        let built = self.build_setting(&current)?;
        self.replace_layouts(named);
        self.commit_setting(&current, built);
        Ok(())
    }

    /// Fill `element` with `<current>` and `<layouts>`.
    pub fn write_xml(&self, element: &mut XElement) -> Result<(), ControlError> {
        self.current_setting(true)?
            .write_xml(&self.situation, element.add_element("current"))?;
        let layouts = element.add_element("layouts");
        for (name, setting) in self.perspectives.settings() {
            let entry = layouts.add_element("entry");
            entry.add_string("name", name);
            setting.write_xml(&self.situation, entry)?;
        }
        Ok(())
    }

    pub fn read_xml(&mut self, element: &XElement) -> Result<(), ControlError> {
        let current = Setting::read_xml(&self.situation, element.require_element("current")?)?;
        let mut named = Vec::new();
        if let Some(layouts) = element.element("layouts") {
            for entry in layouts.elements("entry") {
                let name = entry.string_attr("name")?.to_owned();
                named.push((name, Setting::read_xml(&self.situation, entry)?));
            }
        }
        let built = self.build_setting(&current)?;
        self.replace_layouts(named);
        self.commit_setting(&current, built);
        Ok(())
    }

    fn replace_layouts(&mut self, named: Vec<(String, Setting)>) {
        self.perspectives.clear_settings();
        for (name, setting) in named {
            self.perspectives.put_setting(name, setting);
        }
    }
}

fn unknown_layout(err: PerspectiveError) -> ControlError {
    match err {
        PerspectiveError::UnknownPerspective(name) => ControlError::UnknownLayout(name),
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fdock_core::{Insets, Rect};
    use fdock_layout::{Placement, Station, edge_path};
    use fdock_split::Side;

    fn control() -> Control {
        let mut control = Control::default();
        control.register_single("files", "Files").unwrap();
        control.register_single("console", "Console").unwrap();
        control
    }

    #[test]
    fn stock_roots_exist() {
        let control = Control::default();
        assert_eq!(
            control.root_keys().collect::<Vec<_>>(),
            vec![CENTER, EAST, EXTERNAL, NORTH, SOUTH, WEST]
        );
        assert!(control.split_root(CENTER).is_some());
        assert!(!control.is_working_area(CENTER));
    }

    #[test]
    fn restricted_roots_use_secure_factories() {
        let control = Control::new(ControlConfig {
            restricted_environment: true,
            ..ControlConfig::default()
        });
        assert_eq!(
            control.root(CENTER).unwrap().factory_id(),
            fdock_layout::SECURE_SPLIT_FACTORY_ID
        );
        assert_eq!(
            control.root(WEST).unwrap().factory_id(),
            fdock_layout::SECURE_FLAP_FACTORY_ID
        );
    }

    #[test]
    fn show_goes_to_the_center_first() {
        let mut control = control();
        assert!(!control.is_visible("files"));
        control.show("files").unwrap();
        assert!(control.is_visible("files"));
        assert_eq!(control.mode_of("files"), Some(ExtendedMode::Normalized));
        assert_eq!(control.location_of("files").unwrap().root, CENTER);
    }

    #[test]
    fn hide_then_show_restores_the_location() {
        let mut control = control();
        control.show("files").unwrap();
        control.show("console").unwrap();
        let before = control.location_of("console").unwrap();

        control.hide("console").unwrap();
        assert!(!control.is_visible("console"));
        assert_eq!(control.history("console").unwrap().current().unwrap().1, &before);

        control.show("console").unwrap();
        assert_eq!(control.location_of("console"), Some(before));
    }

    #[test]
    fn set_mode_moves_between_roots_and_back() {
        let mut control = control();
        control.show("files").unwrap();
        control.show("console").unwrap();
        let normalized = control.location_of("console").unwrap();

        control.set_mode("console", ExtendedMode::Minimized).unwrap();
        assert_eq!(control.location_of("console").unwrap().root, WEST);
        assert_eq!(
            control.history("console").unwrap().order(),
            &[ExtendedMode::Normalized, ExtendedMode::Minimized]
        );

        control.set_mode("console", ExtendedMode::Normalized).unwrap();
        assert_eq!(control.location_of("console"), Some(normalized));
    }

    #[test]
    fn unknown_dockables_are_rejected() {
        let mut control = control();
        assert!(matches!(control.show("nope"), Err(ControlError::UnknownDockable(_))));
        assert!(matches!(control.hide("nope"), Err(ControlError::UnknownDockable(_))));
        assert!(matches!(
            control.register_single("files", "again"),
            Err(ControlError::DuplicateDockable(_))
        ));
    }

    #[test]
    fn multiple_factories_are_unique() {
        let mut control = control();
        control.register_multiple_factory("editor").unwrap();
        assert!(matches!(
            control.register_multiple_factory("editor"),
            Err(ControlError::DuplicateFactory(_))
        ));
        assert!(matches!(
            control.register_multiple_factory(fdock_layout::STACK_FACTORY_ID),
            Err(ControlError::DuplicateFactory(_))
        ));
        assert!(matches!(
            control.add_multiple(MultipleDockable::new("viewer", "v1", "View")),
            Err(ControlError::UnknownFactory(_))
        ));
    }

    #[test]
    fn hidden_multiples_come_back() {
        let mut control = control();
        control.register_multiple_factory("editor").unwrap();
        control
            .add_multiple(MultipleDockable::new("editor", "e1", "main.rs"))
            .unwrap();
        control.hide("e1").unwrap();
        assert!(control.is_known("e1"));
        control.show("e1").unwrap();
        assert!(control.is_visible("e1"));

        control.remove_dockable("e1").unwrap();
        assert!(!control.is_known("e1"));
        assert!(control.history("e1").is_none());
    }

    #[test]
    fn stale_locations_fall_back_to_the_default_root() {
        let mut control = control();
        control.modes.record(
            "files",
            ExtendedMode::Minimized,
            Location::new("gone", Some(Placement::Flap { index: 3, hold: true })),
        );
        control.show("files").unwrap();
        assert_eq!(control.location_of("files").unwrap().root, WEST);
    }

    #[test]
    fn explicit_placements_are_honored() {
        let mut control = control();
        control.show("files").unwrap();
        control.modes.record(
            "console",
            ExtendedMode::Normalized,
            Location::new(
                CENTER,
                Some(Placement::Split { path: edge_path(Side::Bottom, 0.25) }),
            ),
        );
        control.show("console").unwrap();
        let center = control.split_root(CENTER).unwrap();
        assert_eq!(center.dockable_count(), 2);
        let placed = control.location_of("console").unwrap();
        assert_eq!(placed.root, CENTER);
        assert!(matches!(placed.placement, Some(Placement::Split { .. })));

        control.hide("console").unwrap();
        control.show("console").unwrap();
        assert_eq!(control.location_of("console"), Some(placed));
    }

    #[test]
    fn one_dockable_is_maximized_per_root() {
        let mut control = control();
        control.show("files").unwrap();
        control.show("console").unwrap();

        control.set_mode("files", ExtendedMode::Maximized).unwrap();
        assert_eq!(control.maximized(CENTER), Some("files"));

        control.set_mode("console", ExtendedMode::Maximized).unwrap();
        assert_eq!(control.maximized(CENTER), Some("console"));
        assert_eq!(control.mode_of("files"), Some(ExtendedMode::Normalized));
        assert!(control.is_visible("files"));
        assert_eq!(control.location_of("files").unwrap().root, CENTER);

        control.hide("console").unwrap();
        assert_eq!(control.maximized(CENTER), None);
        control.show("console").unwrap();
        assert_eq!(control.maximized(CENTER), Some("console"));
        assert_eq!(control.mode_of("files"), Some(ExtendedMode::Normalized));
    }

    #[test]
    fn negative_insets_lay_out_without_overflow() {
        let mut control = Control::new(ControlConfig {
            root_insets: Insets::new(0, -1, 0, i32::MIN),
            ..ControlConfig::default()
        });
        control.register_single("files", "Files").unwrap();
        control.show("files").unwrap();
        control.compute_bounds(100, 100);
        assert_eq!(control.config().root_insets, Insets::new(0, 0, 0, 0));
        let center = control.split_root(CENTER).unwrap();
        assert_eq!(center.tree().content_bounds(), Rect::new(0, 0, 100, 100));
    }

    #[test]
    fn duplicate_working_areas_are_rejected() {
        let mut control = control();
        control.add_working_area("docs").unwrap();
        assert!(control.is_working_area("docs"));
        assert!(matches!(
            control.add_working_area("docs"),
            Err(ControlError::DuplicateRoot(_))
        ));
    }
}
