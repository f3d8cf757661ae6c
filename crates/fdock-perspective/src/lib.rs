#![forbid(unsafe_code)]

//! Perspectives: layouts that exist without any live UI.
//!
//! A [`CPerspective`] holds placeholder root stations and the location
//! histories of its dockables. The [`PerspectiveConverter`] reads and writes
//! perspectives in the same composition format as the live tree, converts
//! them to and from [`Setting`]s (the form named layouts are stored in), and
//! keeps the named perspectives.
//!
//! # Example
//!
//! ```
//! use fdock_perspective::{
//!     ExtendedMode, Location, PerspectiveConverter, RootKind, RootStation,
//!     SingleDockablePerspective,
//! };
//!
//! let mut converter = PerspectiveConverter::new();
//! converter.add_root("center", RootStation::new(RootKind::Split));
//!
//! let mut perspective = converter.create_empty_perspective();
//! perspective
//!     .place(
//!         Box::new(SingleDockablePerspective::new("files")),
//!         ExtendedMode::Normalized,
//!         Location::new("center", None),
//!     )
//!     .unwrap();
//!
//! converter.set("default", &perspective).unwrap();
//! let restored = converter.get("default").unwrap();
//! assert!(restored.contains_dockable("files"));
//! ```

pub mod converter;
pub mod dockable;
pub mod element;
pub mod error;
pub mod history;
pub mod modes;
pub mod perspective;
pub mod setting;

pub use converter::{PerspectiveConverter, RootKind, RootStation, WorkingAreaFilter};
pub use dockable::{
    DefaultDockablePerspective, MultipleDockablePerspective, SingleDockablePerspective,
    SinglePerspectiveFactory,
};
pub use element::PerspectiveElement;
pub use error::PerspectiveError;
pub use history::{ExtendedMode, Location, LocationHistory};
pub use modes::ModeSettings;
pub use perspective::CPerspective;
pub use setting::{InvisibleEntry, Setting};
