#![forbid(unsafe_code)]

//! Layout persistence for FrameDock.
//!
//! # Pipeline
//!
//! ```text
//! live tree ──convert──▶ DockLayoutComposition ──write──▶ binary | XML
//! live tree ◀──build──── DockLayoutComposition ◀──read─── binary | XML
//! ```
//!
//! - [`DockSituation`] is the factory registry and the converter. Each
//!   element names its factory by id; the factory extracts and rebuilds the
//!   element and encodes its [`DockLayout`] in both formats.
//! - Unknown factories on read are not errors: the node keeps its place in
//!   the tree with no layout, and rebuilding skips it.
//! - The stock stations ([`station`]) are generic over the element
//!   hierarchy, so the same factories serve the live tree (`dyn
//!   DockElement`) and any other hierarchy implementing [`ElementTree`].
//!
//! # Example
//!
//! ```
//! use fdock_core::{DataInput, DataOutput};
//! use fdock_layout::{DefaultDockable, DockElement, DockSituation, Station, StackStation};
//!
//! let situation = DockSituation::<dyn DockElement>::with_defaults();
//! let mut stack: StackStation<dyn DockElement> = StackStation::new();
//! stack.add(Box::new(DefaultDockable::new("files")), None).unwrap();
//!
//! let composition = situation.convert(&stack).unwrap().unwrap();
//! let mut out = DataOutput::new(Vec::new());
//! situation.write_composition(&composition, &mut out).unwrap();
//!
//! let bytes = out.into_inner();
//! let read = situation.read_composition(&mut DataInput::new(bytes.as_slice())).unwrap();
//! assert_eq!(read, composition);
//! ```

pub mod codec;
pub mod composition;
pub mod dockable;
pub mod element;
pub mod error;
pub mod factory;
pub mod placement;
pub mod situation;
pub mod station;

pub use codec::FORMAT_VERSION;
pub use composition::{ChildIds, ChildMap, DockLayout, DockLayoutComposition, LayoutData};
pub use dockable::{
    DEFAULT_DOCKABLE_FACTORY_ID, DefaultDockable, DefaultDockableFactory, DockableLayout,
    MultipleDockable, MultipleDockableFactory, MultipleDockableLayout,
    SINGLE_DOCKABLE_FACTORY_ID, SingleDockable, SingleDockableFactory, SingleDockableLayout,
    SingleDockableRegistry,
};
pub use element::{
    DockElement, Dockable, ElementTree, LayoutNode, Station, find_unique, resolve_route,
    resolve_route_mut, unique_ids,
};
pub use error::LayoutError;
pub use factory::{DockFactory, ErasedFactory};
pub use placement::Placement;
pub use situation::{
    CodecLimits, DEFAULT_MAX_DEPTH, DEFAULT_MAX_PAYLOAD_LEN, DockSituation, SituationIgnore,
};
pub use station::{
    ChildHandle, DEFAULT_WINDOW_BOUNDS, FLAP_FACTORY_ID, FlapLayout, FlapStation,
    FlapStationFactory, SCREEN_FACTORY_ID, SECURE_FLAP_FACTORY_ID, SECURE_SPLIT_FACTORY_ID,
    SECURE_STACK_FACTORY_ID, SPLIT_FACTORY_ID, STACK_FACTORY_ID, ScreenLayout, ScreenStation,
    ScreenStationFactory, SplitEntry, SplitLayout, SplitStation, SplitStationFactory, StackLayout,
    StackStation, StackStationFactory, edge_path,
};
