//! The in-memory shape of the wire format.
//!
//! A [`DockLayoutComposition`] stands in for one element: the id of the
//! factory that understands it, that factory's opaque [`DockLayout`], the
//! compositions of its children, and whether those children are to be
//! re-attached when the element is rebuilt.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt::{self, Debug};
use std::io::{Read, Write};

use fdock_core::{CodecError, DataInput, DataOutput, XElement};

/// Factory-specific layout data with its own binary and XML encoding.
pub trait LayoutData: Debug + Clone + PartialEq + 'static {
    fn write<W: Write>(&self, out: &mut DataOutput<W>) -> Result<(), CodecError>;

    fn read<R: Read>(input: &mut DataInput<R>) -> Result<Self, CodecError>;

    /// Fill the `<layout>` element (attributes and children).
    fn write_xml(&self, element: &mut XElement);

    fn read_xml(element: &XElement) -> Result<Self, CodecError>;
}

trait ErasedData: Debug {
    fn clone_box(&self) -> Box<dyn ErasedData>;
    fn eq_dyn(&self, other: &dyn ErasedData) -> bool;
    fn as_any(&self) -> &dyn Any;
}

impl<T: LayoutData> ErasedData for T {
    fn clone_box(&self) -> Box<dyn ErasedData> {
        Box::new(self.clone())
    }

    fn eq_dyn(&self, other: &dyn ErasedData) -> bool {
        other.as_any().downcast_ref::<T>() == Some(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Opaque layout data tagged with the id of the factory that produced it.
///
/// Only that factory looks inside (via [`DockLayout::downcast_ref`]).
pub struct DockLayout {
    factory_id: String,
    data: Box<dyn ErasedData>,
}

impl DockLayout {
    pub fn new<T: LayoutData>(factory_id: impl Into<String>, data: T) -> Self {
        Self {
            factory_id: factory_id.into(),
            data: Box::new(data),
        }
    }

    #[must_use]
    pub fn factory_id(&self) -> &str {
        &self.factory_id
    }

    #[must_use]
    pub fn downcast_ref<T: LayoutData>(&self) -> Option<&T> {
        self.data.as_any().downcast_ref::<T>()
    }
}

impl Clone for DockLayout {
    fn clone(&self) -> Self {
        Self {
            factory_id: self.factory_id.clone(),
            data: self.data.clone_box(),
        }
    }
}

impl PartialEq for DockLayout {
    fn eq(&self, other: &Self) -> bool {
        self.factory_id == other.factory_id && self.data.eq_dyn(other.data.as_ref())
    }
}

impl Debug for DockLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DockLayout")
            .field("factory_id", &self.factory_id)
            .field("data", &self.data)
            .finish()
    }
}

/// One node of a serializable layout tree.
#[derive(Debug, Clone, PartialEq)]
pub struct DockLayoutComposition {
    pub factory_id: String,
    /// `None` when no factory for `factory_id` was registered at read time.
    pub layout: Option<DockLayout>,
    /// In child-id order.
    pub children: Vec<DockLayoutComposition>,
    /// Children are kept for write-back but not re-attached on rebuild.
    pub ignore_children: bool,
}

impl DockLayoutComposition {
    pub fn new(
        layout: DockLayout,
        children: Vec<DockLayoutComposition>,
        ignore_children: bool,
    ) -> Self {
        Self {
            factory_id: layout.factory_id().to_owned(),
            layout: Some(layout),
            children,
            ignore_children,
        }
    }

    /// A node whose factory was unknown when it was read.
    pub fn unresolved(
        factory_id: impl Into<String>,
        children: Vec<DockLayoutComposition>,
        ignore_children: bool,
    ) -> Self {
        Self {
            factory_id: factory_id.into(),
            layout: None,
            children,
            ignore_children,
        }
    }

    /// Total number of nodes in this subtree.
    #[must_use]
    pub fn node_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(DockLayoutComposition::node_count)
            .sum::<usize>()
    }

    /// Factory ids in pre-order.
    #[must_use]
    pub fn factory_ids(&self) -> Vec<&str> {
        let mut out = vec![self.factory_id.as_str()];
        for child in &self.children {
            out.extend(child.factory_ids());
        }
        out
    }
}

/// Dense ids assigned to a station's children during conversion.
///
/// Index `i` is the child's display index; the value is the id of its
/// composition, or `None` if the child was excluded. Surviving children are
/// numbered `0, 1, 2, ...` without gaps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChildIds {
    ids: Vec<Option<usize>>,
}

impl ChildIds {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, id: Option<usize>) {
        self.ids.push(id);
    }

    #[must_use]
    pub fn id_of(&self, index: usize) -> Option<usize> {
        self.ids.get(index).copied().flatten()
    }

    /// Number of display indices covered (converted or not).
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl FromIterator<Option<usize>> for ChildIds {
    fn from_iter<I: IntoIterator<Item = Option<usize>>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

/// Rebuilt children handed to a factory, keyed by composition id.
pub struct ChildMap<E: ?Sized> {
    entries: BTreeMap<usize, Box<E>>,
}

impl<E: ?Sized> ChildMap<E> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, id: usize, child: Box<E>) {
        self.entries.insert(id, child);
    }

    /// Take the child with `id`; each child can be taken once.
    pub fn take(&mut self, id: usize) -> Option<Box<E>> {
        self.entries.remove(&id)
    }

    #[must_use]
    pub fn contains(&self, id: usize) -> bool {
        self.entries.contains_key(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remaining children in id order.
    pub fn into_children(self) -> impl Iterator<Item = (usize, Box<E>)> {
        self.entries.into_iter()
    }
}

impl<E: ?Sized> Default for ChildMap<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: ?Sized> Debug for ChildMap<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChildMap")
            .field("ids", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}
