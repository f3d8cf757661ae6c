//! A complete stored layout, independent of any element tree.
//!
//! A [`Setting`] is what named layouts are kept as: the root compositions,
//! the dockables that are not part of any root together with the location
//! they would return to, and the mode settings. Both the live tree and
//! perspectives read and write it through their own [`DockSituation`].
//!
//! Binary: `version | compositions | count × invisible | modes`. XML:
//! `<stations>`, `<invisible>` and `<modes>` under the caller's element.

use std::collections::BTreeMap;
use std::io::{Read, Write};

use fdock_core::{DataInput, DataOutput, Version, XElement};
use fdock_layout::{DockLayoutComposition, DockSituation, FORMAT_VERSION, LayoutNode};

use crate::error::PerspectiveError;
use crate::history::Location;
use crate::modes::ModeSettings;

/// A dockable outside every root and where it goes when shown again.
#[derive(Debug, Clone, PartialEq)]
pub struct InvisibleEntry {
    pub key: String,
    pub location: Location,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Setting {
    pub roots: BTreeMap<String, DockLayoutComposition>,
    pub invisible: Vec<InvisibleEntry>,
    pub modes: ModeSettings,
}

impl Setting {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn invisible_location(&self, key: &str) -> Option<&Location> {
        self.invisible
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| &entry.location)
    }

    pub fn write<E, W>(
        &self,
        situation: &DockSituation<E>,
        out: &mut DataOutput<W>,
    ) -> Result<(), PerspectiveError>
    where
        E: LayoutNode + ?Sized,
        W: Write,
    {
        FORMAT_VERSION.write(out)?;
        situation.write_compositions(&self.roots, out)?;
        out.write_len(self.invisible.len())?;
        for entry in &self.invisible {
            out.write_utf(&entry.key)?;
            entry.location.write(out)?;
        }
        self.modes.write(out)?;
        Ok(())
    }

    pub fn read<E, R>(
        situation: &DockSituation<E>,
        input: &mut DataInput<R>,
    ) -> Result<Self, PerspectiveError>
    where
        E: LayoutNode + ?Sized,
        R: Read,
    {
        situation.check_version(Version::read(input)?)?;
        let roots = situation.read_compositions(input)?;
        let count = input.read_len()?;
        let mut invisible = Vec::new();
        for _ in 0..count {
            let key = input.read_utf()?;
            invisible.push(InvisibleEntry {
                key,
                location: Location::read(input)?,
            });
        }
        let modes = ModeSettings::read(input)?;
        Ok(Self {
            roots,
            invisible,
            modes,
        })
    }

    pub fn write_xml<E>(
        &self,
        situation: &DockSituation<E>,
        element: &mut XElement,
    ) -> Result<(), PerspectiveError>
    where
        E: LayoutNode + ?Sized,
    {
        situation.write_compositions_xml(&self.roots, element.add_element("stations"))?;
        let invisible = element.add_element("invisible");
        for entry in &self.invisible {
            let dockable = invisible.add_element("dockable");
            dockable.add_string("id", &entry.key);
            entry.location.write_xml(dockable);
        }
        self.modes.write_xml(element.add_element("modes"));
        Ok(())
    }

    pub fn read_xml<E>(
        situation: &DockSituation<E>,
        element: &XElement,
    ) -> Result<Self, PerspectiveError>
    where
        E: LayoutNode + ?Sized,
    {
        let roots = situation.read_compositions_xml(element.require_element("stations")?)?;
        let mut invisible = Vec::new();
        if let Some(entries) = element.element("invisible") {
            for dockable in entries.elements("dockable") {
                invisible.push(InvisibleEntry {
                    key: dockable.string_attr("id")?.to_owned(),
                    location: Location::read_xml(dockable)?,
                });
            }
        }
        let modes = ModeSettings::read_xml(element.require_element("modes")?)?;
        Ok(Self {
            roots,
            invisible,
            modes,
        })
    }
}
