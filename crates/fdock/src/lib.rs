#![forbid(unsafe_code)]

//! FrameDock public facade.
//!
//! [`Control`] owns the live root stations, shows and hides dockables by
//! unique id while recording where they were in each mode, and keeps named
//! layouts. Layouts are stored in the binary or XML format of
//! [`fdock_layout`], and can be edited offline as perspectives
//! ([`fdock_perspective`]).
//!
//! # Example
//!
//! ```
//! use fdock::prelude::*;
//!
//! let mut control = Control::default();
//! control.register_single("files", "Files").unwrap();
//! control.register_single("console", "Console").unwrap();
//! control.show("files").unwrap();
//! control.show("console").unwrap();
//! control.save("coding").unwrap();
//!
//! control.hide("console").unwrap();
//! control.load("coding").unwrap();
//! assert!(control.is_visible("console"));
//! ```
//!
//! # Logging
//!
//! Every crate emits `tracing` events under `fdock.*` targets. With the
//! `logging` feature, [`logging::init`] installs a fmt subscriber.

pub mod config;
pub mod control;
pub mod error;
#[cfg(feature = "logging")]
pub mod logging;

pub use config::ControlConfig;
pub use control::{
    CENTER, Control, EAST, EXTERNAL, LiveWorkingAreas, NORTH, SOUTH, WEST, default_root,
    mode_for_root,
};
pub use error::ControlError;

pub use fdock_core as core;
pub use fdock_layout as layout;
pub use fdock_perspective as perspective;
pub use fdock_split as split;

/// Standard result type for control APIs.
pub type Result<T> = std::result::Result<T, ControlError>;

pub mod prelude {
    pub use crate::{Control, ControlConfig, ControlError, Result};

    pub use fdock_core::{DataInput, DataOutput, Insets, XElement};
    pub use fdock_layout::{MultipleDockable, Placement};
    pub use fdock_perspective::{CPerspective, ExtendedMode, Location, Setting};
}
