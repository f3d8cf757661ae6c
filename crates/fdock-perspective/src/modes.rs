//! Mode settings: the location history of every dockable, by key.
//!
//! Binary: `count | count × (key: utf, history)`. XML: one
//! `<dockable id="key">` per key, holding the history's `<entry>` elements.

use std::collections::BTreeMap;
use std::io::{Read, Write};

use fdock_core::{CodecError, DataInput, DataOutput, XElement};
use serde::{Deserialize, Serialize};

use crate::error::PerspectiveError;
use crate::history::{ExtendedMode, Location, LocationHistory};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModeSettings {
    histories: BTreeMap<String, LocationHistory>,
}

impl ModeSettings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `key` is now in `mode` at `location`.
    pub fn record(&mut self, key: &str, mode: ExtendedMode, location: Location) {
        self.histories
            .entry(key.to_owned())
            .or_default()
            .record(mode, location);
    }

    #[must_use]
    pub fn history(&self, key: &str) -> Option<&LocationHistory> {
        self.histories.get(key)
    }

    pub fn set_history(&mut self, key: impl Into<String>, history: LocationHistory) {
        let key = key.into();
        if history.is_empty() {
            self.histories.remove(&key);
        } else {
            self.histories.insert(key, history);
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<LocationHistory> {
        self.histories.remove(key)
    }

    #[must_use]
    pub fn current_mode(&self, key: &str) -> Option<ExtendedMode> {
        self.histories.get(key).and_then(LocationHistory::current_mode)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.histories.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &LocationHistory)> {
        self.histories.iter().map(|(key, history)| (key.as_str(), history))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.histories.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.histories.is_empty()
    }

    /// Drop every location whose root does not satisfy `exists`, and the
    /// histories left empty. Returns how many locations were dropped.
    pub fn retain_roots(&mut self, mut exists: impl FnMut(&str) -> bool) -> usize {
        let mut dropped = 0;
        for (key, history) in &mut self.histories {
            history.retain(|mode, location| {
                let keep = exists(&location.root);
                if !keep {
                    dropped += 1;
                    tracing::warn!(
                        target: "fdock.perspective",
                        dockable = %key,
                        mode = %mode,
                        root = %location.root,
                        "location references unknown station; dropped"
                    );
                }
                keep
            });
        }
        self.histories.retain(|_, history| !history.is_empty());
        dropped
    }

    pub fn write<W: Write>(&self, out: &mut DataOutput<W>) -> Result<(), CodecError> {
        out.write_len(self.histories.len())?;
        for (key, history) in &self.histories {
            out.write_utf(key)?;
            history.write(out)?;
        }
        Ok(())
    }

    pub fn read<R: Read>(input: &mut DataInput<R>) -> Result<Self, PerspectiveError> {
        let count = input.read_len()?;
        let mut settings = Self::new();
        for _ in 0..count {
            let key = input.read_utf()?;
            let history = LocationHistory::read(input)?;
            settings.set_history(key, history);
        }
        Ok(settings)
    }

    pub fn write_xml(&self, element: &mut XElement) {
        for (key, history) in &self.histories {
            let dockable = element.add_element("dockable");
            dockable.add_string("id", key);
            history.write_xml(dockable);
        }
    }

    pub fn read_xml(element: &XElement) -> Result<Self, PerspectiveError> {
        let mut settings = Self::new();
        for dockable in element.elements("dockable") {
            let key = dockable.string_attr("id")?.to_owned();
            settings.set_history(key, LocationHistory::read_xml(dockable)?);
        }
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fdock_layout::Placement;
    use tracing_test::traced_test;

    fn sample() -> ModeSettings {
        let mut settings = ModeSettings::new();
        settings.record("files", ExtendedMode::Normalized, Location::new("center", None));
        settings.record(
            "files",
            ExtendedMode::Minimized,
            Location::new("west", Some(Placement::Flap { index: 0, hold: true })),
        );
        settings.record("console", ExtendedMode::Normalized, Location::new("center", None));
        settings
    }

    #[test]
    fn settings_survive_xml() {
        let settings = sample();
        let mut element = XElement::new("modes");
        settings.write_xml(&mut element);
        let parsed = XElement::parse(&element.to_xml_string().unwrap()).unwrap();
        assert_eq!(ModeSettings::read_xml(&parsed).unwrap(), settings);
    }

    #[test]
    fn settings_survive_binary() {
        let settings = sample();
        let mut out = DataOutput::new(Vec::new());
        settings.write(&mut out).unwrap();
        let bytes = out.into_inner();
        let read = ModeSettings::read(&mut DataInput::new(bytes.as_slice())).unwrap();
        assert_eq!(read, settings);
        assert_eq!(read.current_mode("files"), Some(ExtendedMode::Minimized));
    }

    #[traced_test]
    #[test]
    fn unknown_roots_are_dropped_with_warning() {
        let mut settings = sample();
        let dropped = settings.retain_roots(|root| root == "center");
        assert_eq!(dropped, 1);
        assert_eq!(settings.current_mode("files"), Some(ExtendedMode::Normalized));
        assert!(logs_contain("location references unknown station; dropped"));

        assert_eq!(settings.retain_roots(|_| false), 2);
        assert!(settings.is_empty());
    }
}
