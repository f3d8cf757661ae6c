//! Placement descriptors: where a child sits inside its station.
//!
//! A placement is opaque to everything except the station kind it belongs
//! to. Location histories store them, and stations accept them back when a
//! dockable returns to a previous spot.

use std::io::{Read, Write};

use fdock_core::{CodecError, DataInput, DataOutput, Rect, XElement};
use fdock_split::{PathStep, Side, SplitPath};
use serde::{Deserialize, Serialize};

const TAG_SPLIT: u8 = 0;
const TAG_STACK: u8 = 1;
const TAG_FLAP: u8 = 2;
const TAG_SCREEN: u8 = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Placement {
    Split { path: SplitPath },
    Stack { index: usize },
    Flap { index: usize, hold: bool },
    Screen { bounds: Rect },
}

impl Placement {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Split { .. } => "split",
            Self::Stack { .. } => "stack",
            Self::Flap { .. } => "flap",
            Self::Screen { .. } => "screen",
        }
    }

    pub fn write<W: Write>(&self, out: &mut DataOutput<W>) -> Result<(), CodecError> {
        match self {
            Self::Split { path } => {
                out.write_u8(TAG_SPLIT)?;
                out.write_len(path.len())?;
                for step in path.steps() {
                    out.write_u8(step.side.to_byte())?;
                    out.write_f64(step.size)?;
                }
            }
            Self::Stack { index } => {
                out.write_u8(TAG_STACK)?;
                out.write_len(*index)?;
            }
            Self::Flap { index, hold } => {
                out.write_u8(TAG_FLAP)?;
                out.write_len(*index)?;
                out.write_bool(*hold)?;
            }
            Self::Screen { bounds } => {
                out.write_u8(TAG_SCREEN)?;
                write_rect(out, *bounds)?;
            }
        }
        Ok(())
    }

    pub fn read<R: Read>(input: &mut DataInput<R>) -> Result<Self, CodecError> {
        match input.read_u8()? {
            TAG_SPLIT => {
                let count = input.read_len()?;
                let mut path = SplitPath::new();
                for _ in 0..count {
                    let byte = input.read_u8()?;
                    let side = Side::from_byte(byte)
                        .ok_or_else(|| CodecError::malformed(format!("invalid side {byte}")))?;
                    path.push(PathStep::new(side, input.read_f64()?));
                }
                Ok(Self::Split { path })
            }
            TAG_STACK => Ok(Self::Stack {
                index: input.read_len()?,
            }),
            TAG_FLAP => Ok(Self::Flap {
                index: input.read_len()?,
                hold: input.read_bool()?,
            }),
            TAG_SCREEN => Ok(Self::Screen {
                bounds: read_rect(input)?,
            }),
            other => Err(CodecError::malformed(format!("invalid placement tag {other}"))),
        }
    }

    /// Write into `element` (typically `<placement>`).
    pub fn write_xml(&self, element: &mut XElement) {
        element.add_string("kind", self.kind_name());
        match self {
            Self::Split { path } => {
                for step in path.steps() {
                    element
                        .add_element("step")
                        .add_string("side", step.side.as_str())
                        .add_f64("size", step.size);
                }
            }
            Self::Stack { index } => {
                element.add_int("index", *index as i64);
            }
            Self::Flap { index, hold } => {
                element
                    .add_int("index", *index as i64)
                    .add_bool("hold", *hold);
            }
            Self::Screen { bounds } => write_rect_xml(element, *bounds),
        }
    }

    pub fn read_xml(element: &XElement) -> Result<Self, CodecError> {
        match element.string_attr("kind")? {
            "split" => {
                let mut path = SplitPath::new();
                for step in element.elements("step") {
                    let raw = step.string_attr("side")?;
                    let side = Side::parse(raw).ok_or_else(|| CodecError::InvalidAttribute {
                        element: "step".into(),
                        name: "side".into(),
                        value: raw.into(),
                    })?;
                    path.push(PathStep::new(side, step.f64_attr("size")?));
                }
                Ok(Self::Split { path })
            }
            "stack" => Ok(Self::Stack {
                index: index_attr(element, "index")?,
            }),
            "flap" => Ok(Self::Flap {
                index: index_attr(element, "index")?,
                hold: element.parsed_attr_opt("hold")?.unwrap_or(false),
            }),
            "screen" => Ok(Self::Screen {
                bounds: read_rect_xml(element)?,
            }),
            other => Err(CodecError::InvalidAttribute {
                element: element.name().into(),
                name: "kind".into(),
                value: other.into(),
            }),
        }
    }
}

pub(crate) fn write_rect<W: Write>(out: &mut DataOutput<W>, rect: Rect) -> Result<(), CodecError> {
    out.write_i32(rect.x)?;
    out.write_i32(rect.y)?;
    out.write_i32(rect.width)?;
    out.write_i32(rect.height)
}

pub(crate) fn read_rect<R: Read>(input: &mut DataInput<R>) -> Result<Rect, CodecError> {
    Ok(Rect::new(
        input.read_i32()?,
        input.read_i32()?,
        input.read_i32()?,
        input.read_i32()?,
    ))
}

pub(crate) fn write_rect_xml(element: &mut XElement, rect: Rect) {
    element
        .add_int("x", i64::from(rect.x))
        .add_int("y", i64::from(rect.y))
        .add_int("width", i64::from(rect.width))
        .add_int("height", i64::from(rect.height));
}

pub(crate) fn read_rect_xml(element: &XElement) -> Result<Rect, CodecError> {
    Ok(Rect::new(
        element.parsed_attr_opt("x")?.unwrap_or(0),
        element.parsed_attr_opt("y")?.unwrap_or(0),
        element.parsed_attr_opt("width")?.unwrap_or(0),
        element.parsed_attr_opt("height")?.unwrap_or(0),
    ))
}

/// A non-negative index attribute.
pub(crate) fn index_attr(element: &XElement, name: &str) -> Result<usize, CodecError> {
    let value = element.int_attr(name)?;
    usize::try_from(value).map_err(|_| CodecError::InvalidAttribute {
        element: element.name().into(),
        name: name.into(),
        value: value.to_string(),
    })
}
