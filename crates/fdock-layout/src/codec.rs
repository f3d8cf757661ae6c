//! Binary and XML encodings of compositions.
//!
//! Binary node, depth-first pre-order:
//!
//! ```text
//! factory_id: utf | payload_len: i32 | payload | ignore: bool | count: i32 | count × node
//! ```
//!
//! A node whose factory is not registered keeps its framing: the payload is
//! skipped (never seeked) and the children are still read, so later siblings
//! stay readable. The payload length is checked against
//! [`CodecLimits::max_payload_len`](crate::CodecLimits) before anything is
//! consumed.
//!
//! XML node, written into a caller-provided element:
//!
//! ```text
//! <layout factory="ID">…payload…</layout>
//! <children ignore="false"><child>…node…</child>…</children>
//! ```
//!
//! Containers map root keys to nodes behind a [`Version`] tag: binary
//! `version | count | count × (key: utf, node)`, XML
//! `version="1.1.1"` plus `<element name="key">…node…</element>` per root.

use std::collections::BTreeMap;
use std::io::{Read, Write};

use fdock_core::{CodecError, DataInput, DataOutput, Version, XElement};

use crate::composition::DockLayoutComposition;
use crate::element::LayoutNode;
use crate::error::LayoutError;
use crate::situation::DockSituation;

/// Version written in front of every container.
pub const FORMAT_VERSION: Version = Version::V1_1_1;

impl<E: LayoutNode + ?Sized> DockSituation<E> {
    // ---------------------------------------------------------------------
    // Single nodes
    // ---------------------------------------------------------------------

    /// Write one node and its subtree: factory id, length-prefixed payload,
    /// then the children.
    pub fn write_composition<W: Write>(
        &self,
        composition: &DockLayoutComposition,
        out: &mut DataOutput<W>,
    ) -> Result<(), LayoutError> {
        let layout = composition
            .layout
            .as_ref()
            .ok_or_else(|| LayoutError::MissingFactory(composition.factory_id.clone()))?;
        let factory = self
            .factories
            .get(&composition.factory_id)
            .ok_or_else(|| LayoutError::MissingFactory(composition.factory_id.clone()))?;

        let mut payload = DataOutput::new(Vec::new());
        factory.write(layout, &mut payload)?;
        let payload = payload.into_inner();

        out.write_utf(&composition.factory_id)?;
        out.write_len(payload.len())?;
        out.write_bytes(&payload)?;
        out.write_bool(composition.ignore_children)?;
        out.write_len(composition.children.len())?;
        for child in &composition.children {
            self.write_composition(child, out)?;
        }
        Ok(())
    }

    /// Read one node and its subtree. A payload whose factory is not
    /// registered is skipped and read back as `None`.
    pub fn read_composition<R: Read>(
        &self,
        input: &mut DataInput<R>,
    ) -> Result<DockLayoutComposition, LayoutError> {
        self.read_node(input, 0)
    }

    fn read_node<R: Read>(
        &self,
        input: &mut DataInput<R>,
        depth: usize,
    ) -> Result<DockLayoutComposition, LayoutError> {
        if depth > self.limits.max_depth {
            return Err(CodecError::malformed(format!(
                "compositions nested deeper than {}",
                self.limits.max_depth
            ))
            .into());
        }
        let factory_id = input.read_utf()?;
        let len = input.read_bounded_len(self.limits.max_payload_len)?;
        let layout = match self.factories.get(&factory_id) {
            Some(factory) => {
                let bytes = input.read_bytes(len)?;
                let mut payload = DataInput::new(bytes.as_slice());
                Some(factory.read(&mut payload)?)
            }
            None => {
                input.skip(len)?;
                tracing::warn!(
                    target: "fdock.layout",
                    factory = %factory_id,
                    bytes = len,
                    "unknown factory; payload skipped"
                );
                None
            }
        };
        let ignore_children = input.read_bool()?;
        let count = input.read_len()?;
        let mut children = Vec::new();
        for _ in 0..count {
            children.push(self.read_node(input, depth + 1)?);
        }
        Ok(DockLayoutComposition {
            factory_id,
            layout,
            children,
            ignore_children,
        })
    }

    /// Write `composition` into `element` as a `<layout>` and a
    /// `<children>` element.
    pub fn write_composition_xml(
        &self,
        composition: &DockLayoutComposition,
        element: &mut XElement,
    ) -> Result<(), LayoutError> {
        let layout = composition
            .layout
            .as_ref()
            .ok_or_else(|| LayoutError::MissingFactory(composition.factory_id.clone()))?;
        let factory = self
            .factories
            .get(&composition.factory_id)
            .ok_or_else(|| LayoutError::MissingFactory(composition.factory_id.clone()))?;

        let payload = element.add_element("layout");
        payload.add_string("factory", &composition.factory_id);
        factory.write_xml(layout, payload)?;

        let children = element.add_element("children");
        children.add_bool("ignore", composition.ignore_children);
        for child in &composition.children {
            self.write_composition_xml(child, children.add_element("child"))?;
        }
        Ok(())
    }

    /// Inverse of [`write_composition_xml`](Self::write_composition_xml).
    pub fn read_composition_xml(
        &self,
        element: &XElement,
    ) -> Result<DockLayoutComposition, LayoutError> {
        self.read_node_xml(element, 0)
    }

    fn read_node_xml(
        &self,
        element: &XElement,
        depth: usize,
    ) -> Result<DockLayoutComposition, LayoutError> {
        if depth > self.limits.max_depth {
            return Err(CodecError::xml(format!(
                "compositions nested deeper than {}",
                self.limits.max_depth
            ))
            .into());
        }
        let payload = element.require_element("layout")?;
        let factory_id = payload.string_attr("factory")?.to_owned();
        let layout = match self.factories.get(&factory_id) {
            Some(factory) => Some(factory.read_xml(payload)?),
            None => {
                tracing::warn!(
                    target: "fdock.layout",
                    factory = %factory_id,
                    "unknown factory; layout element skipped"
                );
                None
            }
        };

        let (ignore_children, children) = match element.element("children") {
            Some(children) => {
                let ignore = children.parsed_attr_opt("ignore")?.unwrap_or(false);
                let nodes = children
                    .elements("child")
                    .map(|child| self.read_node_xml(child, depth + 1))
                    .collect::<Result<Vec<_>, _>>()?;
                (ignore, nodes)
            }
            None => (false, Vec::new()),
        };
        Ok(DockLayoutComposition {
            factory_id,
            layout,
            children,
            ignore_children,
        })
    }

    // ---------------------------------------------------------------------
    // Containers
    // ---------------------------------------------------------------------

    /// Accept `found` under the configured version policy.
    pub fn check_version(&self, found: Version) -> Result<(), LayoutError> {
        let accepted = if self.limits.strict_versions {
            found == FORMAT_VERSION
        } else {
            found.major == FORMAT_VERSION.major
        };
        if accepted {
            Ok(())
        } else {
            Err(LayoutError::UnsupportedVersion {
                found,
                expected: FORMAT_VERSION,
            })
        }
    }

    /// Write the version tag and every root composition by key.
    pub fn write_compositions<W: Write>(
        &self,
        compositions: &BTreeMap<String, DockLayoutComposition>,
        out: &mut DataOutput<W>,
    ) -> Result<(), LayoutError> {
        let _span = tracing::debug_span!(
            target: "fdock.layout",
            "layout.write",
            roots = compositions.len()
        )
        .entered();
        FORMAT_VERSION.write(out)?;
        out.write_len(compositions.len())?;
        for (key, composition) in compositions {
            out.write_utf(key)?;
            self.write_composition(composition, out)?;
        }
        Ok(())
    }

    /// Read a container written by
    /// [`write_compositions`](Self::write_compositions).
    pub fn read_compositions<R: Read>(
        &self,
        input: &mut DataInput<R>,
    ) -> Result<BTreeMap<String, DockLayoutComposition>, LayoutError> {
        let _span = tracing::debug_span!(target: "fdock.layout", "layout.read").entered();
        self.check_version(Version::read(input)?)?;
        let count = input.read_len()?;
        let mut compositions = BTreeMap::new();
        for _ in 0..count {
            let key = input.read_utf()?;
            let composition = self.read_composition(input)?;
            compositions.insert(key, composition);
        }
        tracing::debug!(target: "fdock.layout", roots = compositions.len(), "read compositions");
        Ok(compositions)
    }

    /// Fill `element` (typically `<stations>`) with the version attribute
    /// and one `<element name="…">` per root.
    pub fn write_compositions_xml(
        &self,
        compositions: &BTreeMap<String, DockLayoutComposition>,
        element: &mut XElement,
    ) -> Result<(), LayoutError> {
        let _span = tracing::debug_span!(
            target: "fdock.layout",
            "layout.write",
            roots = compositions.len()
        )
        .entered();
        element.add_string("version", &FORMAT_VERSION.to_string());
        for (key, composition) in compositions {
            let root = element.add_element("element");
            root.add_string("name", key);
            self.write_composition_xml(composition, root)?;
        }
        Ok(())
    }

    /// Inverse of [`write_compositions_xml`](Self::write_compositions_xml).
    pub fn read_compositions_xml(
        &self,
        element: &XElement,
    ) -> Result<BTreeMap<String, DockLayoutComposition>, LayoutError> {
        let _span = tracing::debug_span!(target: "fdock.layout", "layout.read").entered();
        let version = element
            .parsed_attr_opt::<Version>("version")?
            .ok_or_else(|| CodecError::MissingAttribute {
                element: element.name().into(),
                name: "version".into(),
            })?;
        self.check_version(version)?;
        let mut compositions = BTreeMap::new();
        for root in element.elements("element") {
            let key = root.string_attr("name")?.to_owned();
            compositions.insert(key, self.read_composition_xml(root)?);
        }
        Ok(compositions)
    }

    // ---------------------------------------------------------------------
    // Whole element maps
    // ---------------------------------------------------------------------

    /// Convert every root and write them as one container. Roots the ignore
    /// filter drops are left out.
    pub fn write<'a, W, I>(&self, roots: I, out: &mut DataOutput<W>) -> Result<(), LayoutError>
    where
        W: Write,
        I: IntoIterator<Item = (&'a str, &'a E)>,
    {
        let compositions = self.convert_roots(roots)?;
        self.write_compositions(&compositions, out)
    }

    /// Read a container and rebuild its roots. Roots that cannot be rebuilt,
    /// or that do not rebuild into a station, are dropped.
    pub fn read<R: Read>(
        &self,
        input: &mut DataInput<R>,
    ) -> Result<BTreeMap<String, Box<E>>, LayoutError> {
        let compositions = self.read_compositions(input)?;
        self.build_roots(&compositions)
    }

    /// XML counterpart of [`write`](Self::write).
    pub fn write_xml<'a, I>(&self, roots: I, element: &mut XElement) -> Result<(), LayoutError>
    where
        I: IntoIterator<Item = (&'a str, &'a E)>,
    {
        let compositions = self.convert_roots(roots)?;
        self.write_compositions_xml(&compositions, element)
    }

    /// XML counterpart of [`read`](Self::read).
    pub fn read_xml(&self, element: &XElement) -> Result<BTreeMap<String, Box<E>>, LayoutError> {
        let compositions = self.read_compositions_xml(element)?;
        self.build_roots(&compositions)
    }

    /// Convert each root; ignored roots are left out.
    pub fn convert_roots<'a, I>(
        &self,
        roots: I,
    ) -> Result<BTreeMap<String, DockLayoutComposition>, LayoutError>
    where
        I: IntoIterator<Item = (&'a str, &'a E)>,
    {
        let mut compositions = BTreeMap::new();
        for (key, root) in roots {
            if let Some(composition) = self.convert(root)? {
                compositions.insert(key.to_owned(), composition);
            }
        }
        Ok(compositions)
    }

    /// Build each root; only stations survive.
    pub fn build_roots(
        &self,
        compositions: &BTreeMap<String, DockLayoutComposition>,
    ) -> Result<BTreeMap<String, Box<E>>, LayoutError> {
        let mut roots = BTreeMap::new();
        for (key, composition) in compositions {
            match self.build(composition)? {
                Some(root) if root.station().is_some() => {
                    roots.insert(key.clone(), root);
                }
                Some(_) => tracing::warn!(
                    target: "fdock.layout",
                    root = %key,
                    "root is not a station; dropped"
                ),
                None => {}
            }
        }
        Ok(roots)
    }
}
