//! Format version tag for stored layouts.

use std::fmt;
use std::io::{Read, Write};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::data::{DataInput, DataOutput};
use crate::error::CodecError;

/// A `(major.minor.patch)` triple, stored as four bytes:
/// `major:u8, minor:u8, patch:u16` (big-endian).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Version {
    pub major: u8,
    pub minor: u8,
    pub patch: u16,
}

impl Version {
    /// Version of the layout container format written by this crate.
    pub const V1_1_1: Version = Version::new(1, 1, 1);

    pub const fn new(major: u8, minor: u8, patch: u16) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    pub fn write<W: Write>(self, out: &mut DataOutput<W>) -> Result<(), CodecError> {
        out.write_u8(self.major)?;
        out.write_u8(self.minor)?;
        out.write_u16(self.patch)
    }

    pub fn read<R: Read>(input: &mut DataInput<R>) -> Result<Self, CodecError> {
        let major = input.read_u8()?;
        let minor = input.read_u8()?;
        let patch = input.read_u16()?;
        Ok(Self::new(major, minor, patch))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for Version {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CodecError::malformed(format!("invalid version '{s}'"));
        let mut parts = s.trim().split('.');
        let major = parts.next().ok_or_else(invalid)?.parse().map_err(|_| invalid())?;
        let minor = parts.next().ok_or_else(invalid)?.parse().map_err(|_| invalid())?;
        let patch = parts.next().ok_or_else(invalid)?.parse().map_err(|_| invalid())?;
        if parts.next().is_some() {
            return Err(invalid());
        }
        Ok(Self::new(major, minor, patch))
    }
}
