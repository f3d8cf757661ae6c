//! `PerspectiveConverter`: reads, writes, and stores perspectives.
//!
//! The converter owns a [`DockSituation`] over the perspective tree. Its
//! factories resolve stations to empty placeholders of the same kind, single
//! dockables to lazily created placeholders, and multiple dockables to
//! whatever their registered factory rebuilds. Root stations are described
//! by [`RootStation`] templates so that an empty perspective has every root
//! the owner has.
//!
//! Reading always rebuilds the element tree first and applies the mode
//! settings afterwards: a location is only kept if its root exists.

use std::collections::BTreeMap;
use std::io::{Read, Write};

use fdock_core::{DataInput, DataOutput, Version, XElement};
use fdock_layout::{
    DefaultDockableFactory, DockLayoutComposition, DockSituation, FORMAT_VERSION, FlapStation,
    MultipleDockableFactory, ScreenStation, ScreenStationFactory, SituationIgnore, SplitStation,
    StackStation,
};

use crate::dockable::SinglePerspectiveFactory;
use crate::element::PerspectiveElement;
use crate::error::PerspectiveError;
use crate::modes::ModeSettings;
use crate::perspective::CPerspective;
use crate::setting::Setting;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootKind {
    Split,
    Stack,
    Flap,
    Screen,
}

/// Template of a root station.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RootStation {
    pub kind: RootKind,
    pub secure: bool,
    /// Only meaningful for split roots.
    pub working_area: bool,
}

impl RootStation {
    #[must_use]
    pub const fn new(kind: RootKind) -> Self {
        Self {
            kind,
            secure: false,
            working_area: false,
        }
    }

    #[must_use]
    pub const fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    #[must_use]
    pub const fn working_area(mut self, working_area: bool) -> Self {
        self.working_area = working_area;
        self
    }

    /// A new empty placeholder station.
    #[must_use]
    pub fn create(&self) -> Box<dyn PerspectiveElement> {
        match (self.kind, self.secure) {
            (RootKind::Split, secure) => {
                let mut station: SplitStation<dyn PerspectiveElement> = if secure {
                    SplitStation::secure()
                } else {
                    SplitStation::new()
                };
                station.set_working_area(self.working_area);
                Box::new(station)
            }
            (RootKind::Stack, false) => Box::new(StackStation::<dyn PerspectiveElement>::new()),
            (RootKind::Stack, true) => Box::new(StackStation::<dyn PerspectiveElement>::secure()),
            (RootKind::Flap, false) => Box::new(FlapStation::<dyn PerspectiveElement>::new()),
            (RootKind::Flap, true) => Box::new(FlapStation::<dyn PerspectiveElement>::secure()),
            (RootKind::Screen, _) => Box::new(ScreenStation::<dyn PerspectiveElement>::new()),
        }
    }
}

/// Leaves the children of working areas out of a conversion.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkingAreaFilter;

impl SituationIgnore<dyn PerspectiveElement> for WorkingAreaFilter {
    fn ignore_children(&self, station: &dyn PerspectiveElement) -> bool {
        PerspectiveElement::as_any(station)
            .downcast_ref::<SplitStation<dyn PerspectiveElement>>()
            .is_some_and(SplitStation::is_working_area)
    }
}

#[derive(Debug)]
pub struct PerspectiveConverter {
    situation: DockSituation<dyn PerspectiveElement>,
    roots: BTreeMap<String, RootStation>,
    named: BTreeMap<String, Setting>,
}

impl Default for PerspectiveConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl PerspectiveConverter {
    /// A converter with the stock station factories, the screen station,
    /// and the single and default dockable placeholders.
    #[must_use]
    pub fn new() -> Self {
        let mut situation = DockSituation::<dyn PerspectiveElement>::with_stations();
        situation
            .add(ScreenStationFactory)
            .add(SinglePerspectiveFactory)
            .add(DefaultDockableFactory);
        Self {
            situation,
            roots: BTreeMap::new(),
            named: BTreeMap::new(),
        }
    }

    #[must_use]
    pub const fn situation(&self) -> &DockSituation<dyn PerspectiveElement> {
        &self.situation
    }

    pub fn situation_mut(&mut self) -> &mut DockSituation<dyn PerspectiveElement> {
        &mut self.situation
    }

    /// Declare a root every perspective starts with.
    pub fn add_root(&mut self, key: impl Into<String>, root: RootStation) {
        self.roots.insert(key.into(), root);
    }

    #[must_use]
    pub fn root(&self, key: &str) -> Option<&RootStation> {
        self.roots.get(key)
    }

    pub fn add_multiple_factory(&mut self, factory: MultipleDockableFactory) {
        self.situation.add(factory);
    }

    /// A perspective with every declared root and no dockables.
    #[must_use]
    pub fn create_empty_perspective(&self) -> CPerspective {
        let mut perspective = CPerspective::new();
        for (key, root) in &self.roots {
            if let Err(err) = perspective.add_station(key.clone(), root.create()) {
                tracing::warn!(
                    target: "fdock.perspective",
                    root = %key,
                    error = %err,
                    "root template skipped"
                );
            }
        }
        perspective
    }

    // ---------------------------------------------------------------------
    // Settings
    // ---------------------------------------------------------------------

    /// Snapshot `perspective` as a [`Setting`]. Without working areas, their
    /// children are left out.
    pub fn to_setting(
        &self,
        perspective: &CPerspective,
        include_working_areas: bool,
    ) -> Result<Setting, PerspectiveError> {
        Ok(Setting {
            roots: self.convert_roots(perspective, include_working_areas)?,
            invisible: perspective.invisible(),
            modes: perspective.modes().clone(),
        })
    }

    /// Rebuild a perspective from `setting`.
    pub fn from_setting(&self, setting: &Setting) -> Result<CPerspective, PerspectiveError> {
        self.build(&setting.roots, setting.modes.clone())
    }

    fn convert_roots(
        &self,
        perspective: &CPerspective,
        include_working_areas: bool,
    ) -> Result<BTreeMap<String, DockLayoutComposition>, PerspectiveError> {
        let filter = (!include_working_areas)
            .then_some(&WorkingAreaFilter as &dyn SituationIgnore<dyn PerspectiveElement>);
        let mut roots = BTreeMap::new();
        for (key, station) in perspective.stations() {
            if let Some(composition) = self.situation.convert_with(station, filter)? {
                roots.insert(key.to_owned(), composition);
            }
        }
        Ok(roots)
    }

    fn build(
        &self,
        roots: &BTreeMap<String, DockLayoutComposition>,
        modes: ModeSettings,
    ) -> Result<CPerspective, PerspectiveError> {
        let mut perspective = self.create_empty_perspective();
        for (key, composition) in roots {
            let Some(mut station) = self.situation.build(composition)? else {
                continue;
            };
            if station.as_station().is_none() {
                tracing::warn!(
                    target: "fdock.perspective",
                    root = %key,
                    "root is not a station; dropped"
                );
                continue;
            }
            let working_area = self.roots.get(key).is_some_and(|root| root.working_area);
            if let Some(split) = PerspectiveElement::as_any_mut(station.as_mut())
                .downcast_mut::<SplitStation<dyn PerspectiveElement>>()
            {
                split.set_working_area(working_area);
            }
            perspective.add_station(key.clone(), station)?;
        }
        perspective.apply_modes(modes);
        tracing::debug!(
            target: "fdock.perspective",
            roots = roots.len(),
            dockables = perspective.dockable_keys().len(),
            "perspective built"
        );
        Ok(perspective)
    }

    // ---------------------------------------------------------------------
    // Streams
    // ---------------------------------------------------------------------

    /// `version | compositions | modes`.
    pub fn write<W: Write>(
        &self,
        perspective: &CPerspective,
        include_working_areas: bool,
        out: &mut DataOutput<W>,
    ) -> Result<(), PerspectiveError> {
        FORMAT_VERSION.write(out)?;
        let roots = self.convert_roots(perspective, include_working_areas)?;
        self.situation.write_compositions(&roots, out)?;
        perspective.modes().write(out)?;
        Ok(())
    }

    pub fn read<R: Read>(
        &self,
        input: &mut DataInput<R>,
    ) -> Result<CPerspective, PerspectiveError> {
        self.situation.check_version(Version::read(input)?)?;
        let roots = self.situation.read_compositions(input)?;
        let modes = ModeSettings::read(input)?;
        self.build(&roots, modes)
    }

    /// Fill `root` with a `<stations>` and a `<modes>` element.
    pub fn write_xml(
        &self,
        perspective: &CPerspective,
        include_working_areas: bool,
        root: &mut XElement,
    ) -> Result<(), PerspectiveError> {
        let roots = self.convert_roots(perspective, include_working_areas)?;
        self.situation
            .write_compositions_xml(&roots, root.add_element("stations"))?;
        perspective.modes().write_xml(root.add_element("modes"));
        Ok(())
    }

    pub fn read_xml(&self, root: &XElement) -> Result<CPerspective, PerspectiveError> {
        let roots = self
            .situation
            .read_compositions_xml(root.require_element("stations")?)?;
        let modes = ModeSettings::read_xml(root.require_element("modes")?)?;
        self.build(&roots, modes)
    }

    // ---------------------------------------------------------------------
    // Named perspectives
    // ---------------------------------------------------------------------

    /// Names of the stored perspectives, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.named.keys().map(String::as_str)
    }

    pub fn get(&self, name: &str) -> Result<CPerspective, PerspectiveError> {
        let setting = self
            .named
            .get(name)
            .ok_or_else(|| PerspectiveError::UnknownPerspective(name.to_owned()))?;
        self.from_setting(setting)
    }

    /// Store `perspective` under `name`. Working areas are left out, as for
    /// every named layout.
    pub fn set(
        &mut self,
        name: impl Into<String>,
        perspective: &CPerspective,
    ) -> Result<(), PerspectiveError> {
        let setting = self.to_setting(perspective, false)?;
        self.named.insert(name.into(), setting);
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> bool {
        self.named.remove(name).is_some()
    }

    /// Move the perspective `from` to `to`, replacing anything stored there.
    pub fn rename(&mut self, from: &str, to: impl Into<String>) -> Result<(), PerspectiveError> {
        let setting = self
            .named
            .remove(from)
            .ok_or_else(|| PerspectiveError::UnknownPerspective(from.to_owned()))?;
        self.named.insert(to.into(), setting);
        Ok(())
    }

    #[must_use]
    pub fn setting(&self, name: &str) -> Option<&Setting> {
        self.named.get(name)
    }

    pub fn put_setting(&mut self, name: impl Into<String>, setting: Setting) {
        self.named.insert(name.into(), setting);
    }

    pub fn settings(&self) -> impl Iterator<Item = (&str, &Setting)> {
        self.named.iter().map(|(name, setting)| (name.as_str(), setting))
    }

    pub fn clear_settings(&mut self) {
        self.named.clear();
    }
}
