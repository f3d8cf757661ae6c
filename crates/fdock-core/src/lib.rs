#![forbid(unsafe_code)]

//! Core: geometry, version tags, and the stream primitives every layout codec
//! is written against.
//!
//! # Role in FrameDock
//! `fdock-core` is the bottom of the stack. It knows nothing about stations or
//! dockables; it provides:
//!
//! - **Geometry**: pixel [`Rect`]s, [`Insets`], and fractional [`RelRect`]s.
//! - **Version**: the `(major.minor.patch)` tag that prefixes stored layouts.
//! - **Data streams**: [`DataOutput`] / [`DataInput`], a big-endian framing
//!   layer over any `io::Write` / `io::Read`.
//! - **XML**: [`XElement`], a small owned element tree parsed and written with
//!   `quick-xml`.
//!
//! Higher crates (`fdock-split`, `fdock-layout`, `fdock-perspective`) build the
//! layout model on top of these.

pub mod data;
pub mod error;
pub mod geometry;
pub mod version;
pub mod xml;

pub use data::{DataInput, DataOutput};
pub use error::CodecError;
pub use geometry::{Insets, Rect, RelRect};
pub use version::Version;
pub use xml::XElement;
