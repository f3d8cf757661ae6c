//! Stock stations and their factories.
//!
//! Every station here is generic over the element hierarchy it lives in, so
//! the same station and factory code serves the live tree and the
//! perspective tree. The "secure" variants behave identically and differ only
//! in their factory id, which lets restricted environments tell them apart.

mod flap;
mod screen;
mod split;
mod stack;

pub use flap::{FlapLayout, FlapStation, FlapStationFactory};
pub use screen::{DEFAULT_WINDOW_BOUNDS, ScreenLayout, ScreenStation, ScreenStationFactory};
pub use split::{
    ChildHandle, SplitEntry, SplitLayout, SplitStation, SplitStationFactory, edge_path,
};
pub use stack::{StackLayout, StackStation, StackStationFactory};

use std::io::{Read, Write};

use fdock_core::{CodecError, DataInput, DataOutput, XElement};

use crate::placement::index_attr;

pub const SPLIT_FACTORY_ID: &str = "SplitDockStationFactory";
pub const SECURE_SPLIT_FACTORY_ID: &str = "SecureSplitDockStationFactory";
pub const STACK_FACTORY_ID: &str = "StackDockStationFactory";
pub const SECURE_STACK_FACTORY_ID: &str = "SecureStackDockStationFactory";
pub const FLAP_FACTORY_ID: &str = "FlapDockStationFactory";
pub const SECURE_FLAP_FACTORY_ID: &str = "SecureFlapDockStationFactory";
pub const SCREEN_FACTORY_ID: &str = "ScreenDockStationFactory";

/// Read a child id written with `write_len`.
fn read_id<R: Read>(input: &mut DataInput<R>) -> Result<usize, CodecError> {
    input.read_len()
}

fn write_id<W: Write>(out: &mut DataOutput<W>, id: usize) -> Result<(), CodecError> {
    out.write_len(id)
}

fn child_id_attr(element: &XElement) -> Result<usize, CodecError> {
    index_attr(element, "id")
}
