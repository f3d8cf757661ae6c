use std::any::Any;
use std::collections::BTreeMap;
use std::io::{Read, Write};

use fdock_core::{CodecError, DataInput, DataOutput, Insets, XElement};
use fdock_split::{
    DropTarget, NodeId, Orientation, PathStep, Side, SplitNodeKind, SplitPath, SplitTree,
};
use serde::{Deserialize, Serialize};

use super::{SECURE_SPLIT_FACTORY_ID, SPLIT_FACTORY_ID, child_id_attr, read_id, write_id};
use crate::composition::{ChildIds, ChildMap, LayoutData};
use crate::element::{DockElement, Dockable, ElementTree, LayoutNode, Station};
use crate::error::LayoutError;
use crate::factory::DockFactory;
use crate::placement::Placement;

/// Nesting bound for split entries read from a stream.
const MAX_ENTRY_DEPTH: usize = 512;

/// Key of a child inside one split station's geometry tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChildHandle(u64);

/// Station laying its children out in a [`SplitTree`].
///
/// Display order is the tree's pre-order.
#[derive(Debug)]
pub struct SplitStation<E: ?Sized> {
    secure: bool,
    working_area: bool,
    tree: SplitTree<ChildHandle>,
    children: BTreeMap<ChildHandle, Box<E>>,
    /// Handles in display order, refreshed after every structural edit.
    order: Vec<ChildHandle>,
    next_handle: u64,
}

impl<E: ?Sized> SplitStation<E> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            secure: false,
            working_area: false,
            tree: SplitTree::new(),
            children: BTreeMap::new(),
            order: Vec::new(),
            next_handle: 0,
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
            SECURE_SPLIT_FACTORY_ID
        } else {
            SPLIT_FACTORY_ID
        }
    }

    /// A working area keeps its children out of stored layouts; only the
    /// station itself is persisted.
    #[must_use]
    pub const fn is_working_area(&self) -> bool {
        self.working_area
    }

    pub fn set_working_area(&mut self, working_area: bool) {
        self.working_area = working_area;
    }

    /// Geometry, read-only. Structural edits go through the station so the
    /// tree and the children stay in step.
    #[must_use]
    pub const fn tree(&self) -> &SplitTree<ChildHandle> {
        &self.tree
    }

    pub fn configure(&mut self, divider_size: i32, border_side_snap: i32) {
        self.tree.set_divider_size(divider_size);
        self.tree.set_border_side_snap(border_side_snap);
    }

    pub fn compute_bounds(&mut self, width: i32, height: i32, insets: Insets) {
        self.tree.compute_bounds(width, height, insets);
    }

    pub fn set_divider(&mut self, node: NodeId, bias: f64) -> Result<(), LayoutError> {
        self.tree.set_divider(node, bias)?;
        Ok(())
    }

    /// Display index of the child whose leaf is `node`.
    #[must_use]
    pub fn index_of_leaf(&self, node: NodeId) -> Option<usize> {
        let handle = *self.tree.node(node)?.dockable()?;
        self.handles().iter().position(|h| *h == handle)
    }

    /// Leaf holding the child at display `index`.
    #[must_use]
    pub fn leaf_at(&self, index: usize) -> Option<NodeId> {
        self.tree.leaf_of(self.handles().get(index)?)
    }

    /// Drop a new child as described by `drop`.
    pub fn drop_child(&mut self, drop: DropTarget, child: Box<E>) -> Result<(), LayoutError> {
        let handle = self.alloc();
        self.tree.apply_drop(drop, handle)?;
        self.children.insert(handle, child);
        self.refresh_order();
        Ok(())
    }

    /// Move the child at display `index` as described by `drop`.
    pub fn move_child(&mut self, index: usize, drop: DropTarget) -> Result<(), LayoutError> {
        let handle = *self
            .handles()
            .get(index)
            .ok_or_else(|| LayoutError::Station(format!("no child at index {index}")))?;
        self.tree.apply_drop(drop, handle)?;
        self.refresh_order();
        Ok(())
    }

    fn alloc(&mut self) -> ChildHandle {
        let handle = ChildHandle(self.next_handle);
        self.next_handle += 1;
        handle
    }

    fn handles(&self) -> &[ChildHandle] {
        &self.order
    }

    fn refresh_order(&mut self) {
        self.order = self.tree.dockables().into_iter().copied().collect();
    }
}

impl<E: ?Sized> Clone for SplitStation<E>
where
    Box<E>: Clone,
{
    fn clone(&self) -> Self {
        Self {
            secure: self.secure,
            working_area: self.working_area,
            tree: self.tree.clone(),
            children: self.children.clone(),
            order: self.order.clone(),
            next_handle: self.next_handle,
        }
    }
}

impl<E: ?Sized> Default for SplitStation<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: ?Sized> Station<E> for SplitStation<E> {
    fn dockable_count(&self) -> usize {
        self.order.len()
    }

    fn dockable(&self, index: usize) -> Option<&E> {
        let handle = self.handles().get(index).copied()?;
        self.children.get(&handle).map(|child| &**child)
    }

    fn dockable_mut(&mut self, index: usize) -> Option<&mut E> {
        let handle = self.handles().get(index).copied()?;
        self.children.get_mut(&handle).map(|child| &mut **child)
    }

    fn add(&mut self, child: Box<E>, placement: Option<&Placement>) -> Result<(), LayoutError> {
        let handle = self.alloc();
        let placed = match placement {
            Some(Placement::Split { path }) => self.tree.insert_at_path(path, handle).is_ok(),
            _ => false,
        };
        if !placed {
            // Default position: the right half of whatever is there.
            let fallback = SplitPath::new().with_step(Side::Right, 0.5);
            self.tree.insert_at_path(&fallback, handle)?;
        }
        self.children.insert(handle, child);
        self.refresh_order();
        Ok(())
    }

    fn remove(&mut self, index: usize) -> Option<Box<E>> {
        let handle = self.handles().get(index).copied()?;
        self.tree.remove(&handle).ok()?;
        self.refresh_order();
        self.children.remove(&handle)
    }

    fn placement_of(&self, index: usize) -> Option<Placement> {
        let handle = self.handles().get(index).copied()?;
        let path = self.tree.path_of(&handle).ok()?;
        Some(Placement::Split { path })
    }
}

impl Dockable for SplitStation<dyn DockElement> {
    fn title(&self) -> &str {
        ""
    }
}

impl DockElement for SplitStation<dyn DockElement> {
    fn factory_id(&self) -> &str {
        SplitStation::factory_id(self)
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

/// Shape of a split station with child ids at the leaves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SplitEntry {
    Leaf {
        id: usize,
    },
    Node {
        orientation: Orientation,
        divider: f64,
        first: Box<SplitEntry>,
        second: Box<SplitEntry>,
    },
}

impl SplitEntry {
    fn write<W: Write>(&self, out: &mut DataOutput<W>) -> Result<(), CodecError> {
        match self {
            Self::Leaf { id } => {
                out.write_u8(0)?;
                write_id(out, *id)
            }
            Self::Node {
                orientation,
                divider,
                first,
                second,
            } => {
                out.write_u8(1)?;
                out.write_u8(orientation.to_byte())?;
                out.write_f64(*divider)?;
                first.write(out)?;
                second.write(out)
            }
        }
    }

    fn read<R: Read>(input: &mut DataInput<R>, depth: usize) -> Result<Self, CodecError> {
        if depth > MAX_ENTRY_DEPTH {
            return Err(CodecError::malformed("split layout nested too deeply"));
        }
        match input.read_u8()? {
            0 => Ok(Self::Leaf { id: read_id(input)? }),
            1 => {
                let byte = input.read_u8()?;
                let orientation = Orientation::from_byte(byte)
                    .ok_or_else(|| CodecError::malformed(format!("invalid orientation {byte}")))?;
                let divider = input.read_f64()?;
                if !divider.is_finite() {
                    return Err(CodecError::malformed(format!("invalid divider {divider}")));
                }
                let first = Box::new(Self::read(input, depth + 1)?);
                let second = Box::new(Self::read(input, depth + 1)?);
                Ok(Self::Node {
                    orientation,
                    divider,
                    first,
                    second,
                })
            }
            other => Err(CodecError::malformed(format!("invalid split entry tag {other}"))),
        }
    }

    fn write_xml(&self, parent: &mut XElement) {
        match self {
            Self::Leaf { id } => {
                parent.add_element("leaf").add_int("id", *id as i64);
            }
            Self::Node {
                orientation,
                divider,
                first,
                second,
            } => {
                let node = parent.add_element("node");
                node.add_string("orientation", orientation.as_str())
                    .add_f64("divider", *divider);
                first.write_xml(node);
                second.write_xml(node);
            }
        }
    }

    fn read_xml(element: &XElement, depth: usize) -> Result<Self, CodecError> {
        if depth > MAX_ENTRY_DEPTH {
            return Err(CodecError::xml("split layout nested too deeply"));
        }
        match element.name() {
            "leaf" => Ok(Self::Leaf {
                id: child_id_attr(element)?,
            }),
            "node" => {
                let raw = element.string_attr("orientation")?;
                let orientation =
                    Orientation::parse(raw).ok_or_else(|| CodecError::InvalidAttribute {
                        element: "node".into(),
                        name: "orientation".into(),
                        value: raw.into(),
                    })?;
                let divider = element.f64_attr("divider")?;
                if !divider.is_finite() {
                    return Err(CodecError::InvalidAttribute {
                        element: "node".into(),
                        name: "divider".into(),
                        value: divider.to_string(),
                    });
                }
                let mut entries = element
                    .children()
                    .iter()
                    .filter(|child| matches!(child.name(), "leaf" | "node"));
                let (Some(first), Some(second)) = (entries.next(), entries.next()) else {
                    return Err(CodecError::MissingElement {
                        parent: "node".into(),
                        name: "leaf|node".into(),
                    });
                };
                Ok(Self::Node {
                    orientation,
                    divider,
                    first: Box::new(Self::read_xml(first, depth + 1)?),
                    second: Box::new(Self::read_xml(second, depth + 1)?),
                })
            }
            other => Err(CodecError::xml(format!("unexpected split entry <{other}>"))),
        }
    }
}

/// Layout data of a split station: its shape, or `None` when empty.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SplitLayout {
    pub root: Option<SplitEntry>,
}

impl LayoutData for SplitLayout {
    fn write<W: Write>(&self, out: &mut DataOutput<W>) -> Result<(), CodecError> {
        out.write_bool(self.root.is_some())?;
        match &self.root {
            Some(root) => root.write(out),
            None => Ok(()),
        }
    }

    fn read<R: Read>(input: &mut DataInput<R>) -> Result<Self, CodecError> {
        let root = match input.read_bool()? {
            true => Some(SplitEntry::read(input, 0)?),
            false => None,
        };
        Ok(Self { root })
    }

    fn write_xml(&self, element: &mut XElement) {
        if let Some(root) = &self.root {
            root.write_xml(element);
        }
    }

    fn read_xml(element: &XElement) -> Result<Self, CodecError> {
        let root = element
            .children()
            .iter()
            .find(|child| matches!(child.name(), "leaf" | "node"))
            .map(|entry| SplitEntry::read_xml(entry, 0))
            .transpose()?;
        Ok(Self { root })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SplitStationFactory {
    secure: bool,
}

impl SplitStationFactory {
    #[must_use]
    pub const fn new() -> Self {
        Self { secure: false }
    }

    #[must_use]
    pub const fn secure() -> Self {
        Self { secure: true }
    }
}

impl<E: ElementTree + ?Sized> DockFactory<E> for SplitStationFactory {
    type Layout = SplitLayout;

    fn id(&self) -> &str {
        if self.secure {
            SECURE_SPLIT_FACTORY_ID
        } else {
            SPLIT_FACTORY_ID
        }
    }

    fn layout_of(&self, element: &E, children: &ChildIds) -> Result<SplitLayout, LayoutError> {
        let station = element
            .as_any()
            .downcast_ref::<SplitStation<E>>()
            .ok_or_else(|| LayoutError::mismatch(<Self as DockFactory<E>>::id(self)))?;
        let order: BTreeMap<ChildHandle, usize> = station
            .handles()
            .iter()
            .copied()
            .enumerate()
            .map(|(index, handle)| (handle, index))
            .collect();
        let root = station
            .tree
            .root_child()
            .and_then(|node| entry_of(&station.tree, node, &order, children));
        Ok(SplitLayout { root })
    }

    fn layout(
        &self,
        layout: &SplitLayout,
        children: Option<ChildMap<E>>,
    ) -> Result<Option<Box<E>>, LayoutError> {
        let mut station = if self.secure {
            SplitStation::secure()
        } else {
            SplitStation::new()
        };
        if let (Some(mut children), Some(root)) = (children, layout.root.as_ref()) {
            if let Some(node) = build_entry(&mut station, root, &mut children)? {
                station.tree.set_root_child(node)?;
                station.refresh_order();
            }
        }
        Ok(Some(E::wrap_split(station)))
    }
}

/// Entry for the subtree at `node`; leaves whose child was excluded are
/// pruned and their parent collapses into the surviving side.
fn entry_of(
    tree: &SplitTree<ChildHandle>,
    node: NodeId,
    order: &BTreeMap<ChildHandle, usize>,
    children: &ChildIds,
) -> Option<SplitEntry> {
    match tree.node(node)?.kind() {
        SplitNodeKind::Leaf { dockable } => {
            let id = children.id_of(*order.get(dockable)?)?;
            Some(SplitEntry::Leaf { id })
        }
        SplitNodeKind::Node {
            orientation,
            divider,
            first,
            second,
        } => match (
            entry_of(tree, *first, order, children),
            entry_of(tree, *second, order, children),
        ) {
            (Some(first), Some(second)) => Some(SplitEntry::Node {
                orientation: *orientation,
                divider: *divider,
                first: Box::new(first),
                second: Box::new(second),
            }),
            (Some(only), None) | (None, Some(only)) => Some(only),
            (None, None) => None,
        },
        SplitNodeKind::Root { .. } => None,
    }
}

/// Build the detached subtree for `entry`, taking children out of the map.
fn build_entry<E: ?Sized>(
    station: &mut SplitStation<E>,
    entry: &SplitEntry,
    children: &mut ChildMap<E>,
) -> Result<Option<NodeId>, LayoutError> {
    match entry {
        SplitEntry::Leaf { id } => {
            let Some(child) = children.take(*id) else {
                return Ok(None);
            };
            let handle = station.alloc();
            let leaf = station.tree.create_leaf(handle)?;
            station.children.insert(handle, child);
            Ok(Some(leaf))
        }
        SplitEntry::Node {
            orientation,
            divider,
            first,
            second,
        } => {
            let first = build_entry(station, first, children)?;
            let second = build_entry(station, second, children)?;
            match (first, second) {
                (Some(first), Some(second)) => Ok(Some(station.tree.create_node(
                    *orientation,
                    *divider,
                    first,
                    second,
                )?)),
                (Some(only), None) | (None, Some(only)) => Ok(Some(only)),
                (None, None) => Ok(None),
            }
        }
    }
}

/// Path helper for callers that place children relative to the whole
/// station: `side` of everything, taking `size` of the extent.
#[must_use]
pub fn edge_path(side: Side, size: f64) -> SplitPath {
    std::iter::once(PathStep::new(side, size)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dockable::DefaultDockable;

    fn titled(title: &str) -> Box<dyn DockElement> {
        Box::new(DefaultDockable::new(title))
    }

    fn title_at(station: &SplitStation<dyn DockElement>, index: usize) -> String {
        station
            .dockable(index)
            .and_then(|d| d.as_dockable())
            .map(|d| d.title().to_owned())
            .unwrap_or_default()
    }

    #[test]
    fn placement_restores_position() {
        let mut station: SplitStation<dyn DockElement> = SplitStation::new();
        station.add(titled("a"), None).unwrap();
        station
            .add(titled("b"), Some(&Placement::Split { path: edge_path(Side::Bottom, 0.3) }))
            .unwrap();
        station.add(titled("c"), None).unwrap();

        let placement = station.placement_of(1).unwrap();
        let removed = station.remove(1).unwrap();
        assert_eq!(station.dockable_count(), 2);
        station.add(removed, Some(&placement)).unwrap();
        assert_eq!(station.placement_of(1), Some(placement));
        assert_eq!(title_at(&station, 1), "b");
    }

    #[test]
    fn stale_placement_falls_back_to_right_edge() {
        let mut station: SplitStation<dyn DockElement> = SplitStation::new();
        station.add(titled("a"), None).unwrap();
        let stale = Placement::Split {
            path: SplitPath::new()
                .with_step(Side::Top, 0.5)
                .with_step(Side::Top, 0.5),
        };
        station.add(titled("b"), Some(&stale)).unwrap();
        assert_eq!(
            station.placement_of(1),
            Some(Placement::Split {
                path: edge_path(Side::Right, 0.5)
            })
        );
    }

    #[test]
    fn layout_prunes_excluded_children() {
        let mut station: SplitStation<dyn DockElement> = SplitStation::new();
        station.add(titled("a"), None).unwrap();
        station.add(titled("b"), None).unwrap();
        station
            .add(titled("c"), Some(&Placement::Split { path: edge_path(Side::Top, 0.5) }))
            .unwrap();

        let element: &dyn DockElement = &station;
        // Display order is c, a, b; drop "a".
        let ids: ChildIds = [Some(0), None, Some(1)].into_iter().collect();
        let layout =
            DockFactory::<dyn DockElement>::layout_of(&SplitStationFactory::new(), element, &ids)
                .unwrap();
        match layout.root {
            Some(SplitEntry::Node {
                orientation,
                first,
                second,
                ..
            }) => {
                assert_eq!(orientation, Orientation::Vertical);
                assert_eq!(*first, SplitEntry::Leaf { id: 0 });
                assert_eq!(*second, SplitEntry::Leaf { id: 1 });
            }
            other => panic!("unexpected layout {other:?}"),
        }
    }

    #[test]
    fn xml_entry_requires_two_children() {
        let element = XElement::parse(
            r#"<layout><node orientation="horizontal" divider="0.5"><leaf id="0"/></node></layout>"#,
        )
        .unwrap();
        assert!(matches!(
            SplitLayout::read_xml(&element),
            Err(CodecError::MissingElement { .. })
        ));
    }

    #[test]
    fn deep_binary_nesting_is_rejected() {
        let mut out = DataOutput::new(Vec::new());
        out.write_bool(true).unwrap();
        for _ in 0..=MAX_ENTRY_DEPTH + 1 {
            out.write_u8(1).unwrap();
            out.write_u8(0).unwrap();
            out.write_f64(0.5).unwrap();
        }
        let bytes = out.into_inner();
        let err = SplitLayout::read(&mut DataInput::new(bytes.as_slice())).unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn non_finite_dividers_are_rejected_on_read() {
        let mut out = DataOutput::new(Vec::new());
        out.write_bool(true).unwrap();
        out.write_u8(1).unwrap();
        out.write_u8(0).unwrap();
        out.write_f64(f64::NAN).unwrap();
        let bytes = out.into_inner();
        let err = SplitLayout::read(&mut DataInput::new(bytes.as_slice())).unwrap_err();
        assert!(err.is_malformed());

        let element = XElement::parse(
            r#"<layout><node orientation="vertical" divider="inf"><leaf id="0"/><leaf id="1"/></node></layout>"#,
        )
        .unwrap();
        assert!(matches!(
            SplitLayout::read_xml(&element),
            Err(CodecError::InvalidAttribute { .. })
        ));
    }

    #[test]
    fn display_order_follows_every_edit() {
        let mut station: SplitStation<dyn DockElement> = SplitStation::new();
        station.add(titled("a"), None).unwrap();
        station.add(titled("b"), None).unwrap();
        station
            .add(titled("c"), Some(&Placement::Split { path: edge_path(Side::Left, 0.2) }))
            .unwrap();
        assert_eq!(station.dockable_count(), 3);
        assert_eq!(title_at(&station, 0), "c");

        let removed = station.remove(0).unwrap();
        assert_eq!(station.dockable_count(), 2);
        assert_eq!(title_at(&station, 0), "a");
        station.add(removed, None).unwrap();
        assert_eq!(title_at(&station, 2), "c");
        assert!(station.dockable(3).is_none());
    }
}
