//! Factory contract.
//!
//! A [`DockFactory`] knows one kind of element: it extracts layout data from
//! a live element, rebuilds an element from layout data plus rebuilt
//! children, and encodes its layout data in both formats. The registry stores
//! factories behind the object-safe [`ErasedFactory`] so one map can hold
//! factories with different layout types.

use fdock_core::{CodecError, DataInput, DataOutput, XElement};

use crate::composition::{ChildIds, ChildMap, DockLayout, LayoutData};
use crate::error::LayoutError;

pub trait DockFactory<E: ?Sized>: 'static {
    type Layout: LayoutData;

    /// Unique id; stored next to every layout this factory writes.
    fn id(&self) -> &str;

    /// Extract layout data from `element`. `children` maps the element's
    /// display indices to the ids its child compositions received.
    fn layout_of(&self, element: &E, children: &ChildIds) -> Result<Self::Layout, LayoutError>;

    /// Build a new element. `children` is `None` when the composition's
    /// children were ignored; otherwise it holds the rebuilt dockable
    /// children by id. Returning `Ok(None)` means the factory chose not to
    /// produce an element.
    fn layout(
        &self,
        layout: &Self::Layout,
        children: Option<ChildMap<E>>,
    ) -> Result<Option<Box<E>>, LayoutError>;

    fn write(
        &self,
        layout: &Self::Layout,
        out: &mut DataOutput<Vec<u8>>,
    ) -> Result<(), CodecError> {
        layout.write(out)
    }

    fn read(&self, input: &mut DataInput<&[u8]>) -> Result<Self::Layout, CodecError> {
        Self::Layout::read(input)
    }

    fn write_xml(&self, layout: &Self::Layout, element: &mut XElement) {
        layout.write_xml(element);
    }

    fn read_xml(&self, element: &XElement) -> Result<Self::Layout, CodecError> {
        Self::Layout::read_xml(element)
    }
}

/// Object-safe view of a [`DockFactory`] over type-erased [`DockLayout`]s.
pub trait ErasedFactory<E: ?Sized> {
    fn id(&self) -> &str;

    fn layout_of(&self, element: &E, children: &ChildIds) -> Result<DockLayout, LayoutError>;

    fn layout(
        &self,
        layout: &DockLayout,
        children: Option<ChildMap<E>>,
    ) -> Result<Option<Box<E>>, LayoutError>;

    fn write(&self, layout: &DockLayout, out: &mut DataOutput<Vec<u8>>) -> Result<(), LayoutError>;

    fn read(&self, input: &mut DataInput<&[u8]>) -> Result<DockLayout, LayoutError>;

    fn write_xml(&self, layout: &DockLayout, element: &mut XElement) -> Result<(), LayoutError>;

    fn read_xml(&self, element: &XElement) -> Result<DockLayout, LayoutError>;
}

impl<E: ?Sized, F: DockFactory<E>> ErasedFactory<E> for F {
    fn id(&self) -> &str {
        <F as DockFactory<E>>::id(self)
    }

    fn layout_of(&self, element: &E, children: &ChildIds) -> Result<DockLayout, LayoutError> {
        let data = <F as DockFactory<E>>::layout_of(self, element, children)?;
        Ok(DockLayout::new(<F as DockFactory<E>>::id(self), data))
    }

    fn layout(
        &self,
        layout: &DockLayout,
        children: Option<ChildMap<E>>,
    ) -> Result<Option<Box<E>>, LayoutError> {
        <F as DockFactory<E>>::layout(self, typed::<E, F>(self, layout)?, children)
    }

    fn write(&self, layout: &DockLayout, out: &mut DataOutput<Vec<u8>>) -> Result<(), LayoutError> {
        <F as DockFactory<E>>::write(self, typed::<E, F>(self, layout)?, out)?;
        Ok(())
    }

    fn read(&self, input: &mut DataInput<&[u8]>) -> Result<DockLayout, LayoutError> {
        let data = <F as DockFactory<E>>::read(self, input)?;
        Ok(DockLayout::new(<F as DockFactory<E>>::id(self), data))
    }

    fn write_xml(&self, layout: &DockLayout, element: &mut XElement) -> Result<(), LayoutError> {
        <F as DockFactory<E>>::write_xml(self, typed::<E, F>(self, layout)?, element);
        Ok(())
    }

    fn read_xml(&self, element: &XElement) -> Result<DockLayout, LayoutError> {
        let data = <F as DockFactory<E>>::read_xml(self, element)?;
        Ok(DockLayout::new(<F as DockFactory<E>>::id(self), data))
    }
}

fn typed<'a, E: ?Sized, F: DockFactory<E>>(
    factory: &F,
    layout: &'a DockLayout,
) -> Result<&'a F::Layout, LayoutError> {
    layout
        .downcast_ref::<F::Layout>()
        .ok_or_else(|| LayoutError::mismatch(<F as DockFactory<E>>::id(factory)))
}
