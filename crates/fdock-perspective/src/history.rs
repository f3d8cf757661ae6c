//! Extended modes, locations, and per-dockable location histories.

use std::collections::BTreeMap;
use std::fmt;
use std::io::{Read, Write};
use std::str::FromStr;

use fdock_core::{CodecError, DataInput, DataOutput, XElement};
use fdock_layout::Placement;
use serde::{Deserialize, Serialize};

use crate::error::PerspectiveError;

/// Placement state of a dockable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtendedMode {
    Normalized,
    Maximized,
    Minimized,
    Externalized,
}

impl ExtendedMode {
    pub const ALL: [ExtendedMode; 4] = [
        Self::Normalized,
        Self::Maximized,
        Self::Minimized,
        Self::Externalized,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normalized => "normalized",
            Self::Maximized => "maximized",
            Self::Minimized => "minimized",
            Self::Externalized => "externalized",
        }
    }
}

impl fmt::Display for ExtendedMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExtendedMode {
    type Err = PerspectiveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| PerspectiveError::InvalidModeSettings(format!("unknown mode '{s}'")))
    }
}

/// Where a dockable sits: a root station and, optionally, the station's own
/// description of the spot. Without a placement the station picks its
/// default position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub root: String,
    pub placement: Option<Placement>,
}

impl Location {
    pub fn new(root: impl Into<String>, placement: Option<Placement>) -> Self {
        Self {
            root: root.into(),
            placement,
        }
    }

    pub fn write<W: Write>(&self, out: &mut DataOutput<W>) -> Result<(), CodecError> {
        out.write_utf(&self.root)?;
        out.write_bool(self.placement.is_some())?;
        if let Some(placement) = &self.placement {
            placement.write(out)?;
        }
        Ok(())
    }

    pub fn read<R: Read>(input: &mut DataInput<R>) -> Result<Self, CodecError> {
        let root = input.read_utf()?;
        let placement = if input.read_bool()? {
            Some(Placement::read(input)?)
        } else {
            None
        };
        Ok(Self { root, placement })
    }

    /// Write as a `root` attribute plus an optional `<placement>` child.
    pub fn write_xml(&self, element: &mut XElement) {
        element.add_string("root", &self.root);
        if let Some(placement) = &self.placement {
            placement.write_xml(element.add_element("placement"));
        }
    }

    pub fn read_xml(element: &XElement) -> Result<Self, CodecError> {
        Ok(Self {
            root: element.string_attr("root")?.to_owned(),
            placement: element
                .element("placement")
                .map(Placement::read_xml)
                .transpose()?,
        })
    }
}

/// The modes a dockable passed through, oldest first, with the location
/// it had in each.
///
/// Every mode in the order has a location, and no mode appears twice. The
/// last mode is the current one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationHistory {
    order: Vec<ExtendedMode>,
    locations: BTreeMap<ExtendedMode, Location>,
}

impl LocationHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `location` for `mode` and make `mode` current.
    pub fn record(&mut self, mode: ExtendedMode, location: Location) {
        self.order.retain(|m| *m != mode);
        self.order.push(mode);
        self.locations.insert(mode, location);
    }

    /// Forget `mode`; returns its location.
    pub fn remove(&mut self, mode: ExtendedMode) -> Option<Location> {
        self.order.retain(|m| *m != mode);
        self.locations.remove(&mode)
    }

    /// Keep only the modes whose location satisfies `keep`.
    pub fn retain(&mut self, mut keep: impl FnMut(ExtendedMode, &Location) -> bool) {
        self.locations.retain(|mode, location| keep(*mode, location));
        let locations = &self.locations;
        self.order.retain(|mode| locations.contains_key(mode));
    }

    #[must_use]
    pub fn order(&self) -> &[ExtendedMode] {
        &self.order
    }

    #[must_use]
    pub fn location(&self, mode: ExtendedMode) -> Option<&Location> {
        self.locations.get(&mode)
    }

    #[must_use]
    pub fn current_mode(&self) -> Option<ExtendedMode> {
        self.order.last().copied()
    }

    /// The current mode and its location.
    #[must_use]
    pub fn current(&self) -> Option<(ExtendedMode, &Location)> {
        let mode = self.current_mode()?;
        self.locations.get(&mode).map(|location| (mode, location))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Entries in history order.
    pub fn iter(&self) -> impl Iterator<Item = (ExtendedMode, &Location)> {
        self.order
            .iter()
            .filter_map(|mode| self.locations.get(mode).map(|location| (*mode, location)))
    }

    pub fn write<W: Write>(&self, out: &mut DataOutput<W>) -> Result<(), CodecError> {
        out.write_len(self.order.len())?;
        for (mode, location) in self.iter() {
            out.write_utf(mode.as_str())?;
            location.write(out)?;
        }
        Ok(())
    }

    pub fn read<R: Read>(input: &mut DataInput<R>) -> Result<Self, PerspectiveError> {
        let count = input.read_len()?;
        let mut history = Self::new();
        for _ in 0..count {
            let mode: ExtendedMode = input.read_utf()?.parse()?;
            let location = Location::read(input)?;
            history.push_unique(mode, location)?;
        }
        Ok(history)
    }

    /// One `<entry mode="…" root="…">` per mode, in history order.
    pub fn write_xml(&self, element: &mut XElement) {
        for (mode, location) in self.iter() {
            let entry = element.add_element("entry");
            entry.add_string("mode", mode.as_str());
            location.write_xml(entry);
        }
    }

    pub fn read_xml(element: &XElement) -> Result<Self, PerspectiveError> {
        let mut history = Self::new();
        for entry in element.elements("entry") {
            let mode: ExtendedMode = entry.string_attr("mode")?.parse()?;
            history.push_unique(mode, Location::read_xml(entry)?)?;
        }
        Ok(history)
    }

    fn push_unique(
        &mut self,
        mode: ExtendedMode,
        location: Location,
    ) -> Result<(), PerspectiveError> {
        if self.locations.contains_key(&mode) {
            return Err(PerspectiveError::InvalidModeSettings(format!(
                "mode '{mode}' recorded twice"
            )));
        }
        self.order.push(mode);
        self.locations.insert(mode, location);
        Ok(())
    }
}
