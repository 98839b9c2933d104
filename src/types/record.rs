//! Result records reported by the sensor

use serde::{Deserialize, Serialize};

use super::{Command, Frame};
use crate::{Result, SensorError};

/// The two shapes a result record can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum ResultKind {
    Block,
    Arrow,
}

impl ResultKind {
    /// Reply command that carries records of this kind.
    pub const fn command(self) -> Command {
        match self {
            ResultKind::Block => Command::ReturnBlock,
            ResultKind::Arrow => Command::ReturnArrow,
        }
    }
}

/// Bounding box around a recognised object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct Block {
    pub x_center: i16,
    pub y_center: i16,
    pub width: i16,
    pub height: i16,
    pub id: u16,
}

impl Block {
    pub fn get(&self, field: BlockField) -> i32 {
        match field {
            BlockField::XCenter => self.x_center as i32,
            BlockField::YCenter => self.y_center as i32,
            BlockField::Width => self.width as i32,
            BlockField::Height => self.height as i32,
            BlockField::Id => self.id as i32,
        }
    }
}

/// Directed segment, reported by line tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct Arrow {
    pub x_origin: i16,
    pub y_origin: i16,
    pub x_target: i16,
    pub y_target: i16,
    pub id: u16,
}

impl Arrow {
    pub fn get(&self, field: ArrowField) -> i32 {
        match field {
            ArrowField::XOrigin => self.x_origin as i32,
            ArrowField::YOrigin => self.y_origin as i32,
            ArrowField::XTarget => self.x_target as i32,
            ArrowField::YTarget => self.y_target as i32,
            ArrowField::Id => self.id as i32,
        }
    }
}

/// One entry of the result table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum ResultRecord {
    Block(Block),
    Arrow(Arrow),
}

impl ResultRecord {
    /// Decode a block or arrow reply.
    ///
    /// Both shapes carry five little-endian 16-bit fields in the same order:
    /// four coordinates then the identifier. Any other command is a protocol
    /// shape error.
    pub fn from_frame(frame: &Frame) -> Result<Self> {
        let kind = if frame.is(Command::ReturnBlock) {
            ResultKind::Block
        } else if frame.is(Command::ReturnArrow) {
            ResultKind::Arrow
        } else {
            return Err(SensorError::unexpected_reply("block or arrow reply", frame.command));
        };

        let mut reader = frame.reader();
        let a = reader.read_i16()?;
        let b = reader.read_i16()?;
        let c = reader.read_i16()?;
        let d = reader.read_i16()?;
        let id = reader.read_u16()?;

        Ok(match kind {
            ResultKind::Block => ResultRecord::Block(Block {
                x_center: a,
                y_center: b,
                width: c,
                height: d,
                id,
            }),
            ResultKind::Arrow => ResultRecord::Arrow(Arrow {
                x_origin: a,
                y_origin: b,
                x_target: c,
                y_target: d,
                id,
            }),
        })
    }

    pub fn kind(&self) -> ResultKind {
        match self {
            ResultRecord::Block(_) => ResultKind::Block,
            ResultRecord::Arrow(_) => ResultKind::Arrow,
        }
    }

    pub fn id(&self) -> u16 {
        match self {
            ResultRecord::Block(block) => block.id,
            ResultRecord::Arrow(arrow) => arrow.id,
        }
    }

    /// First coordinate pair: the center of a block, the origin of an arrow.
    pub fn anchor(&self) -> (i16, i16) {
        match self {
            ResultRecord::Block(block) => (block.x_center, block.y_center),
            ResultRecord::Arrow(arrow) => (arrow.x_origin, arrow.y_origin),
        }
    }

    pub fn as_block(&self) -> Option<&Block> {
        match self {
            ResultRecord::Block(block) => Some(block),
            ResultRecord::Arrow(_) => None,
        }
    }

    pub fn as_arrow(&self) -> Option<&Arrow> {
        match self {
            ResultRecord::Arrow(arrow) => Some(arrow),
            ResultRecord::Block(_) => None,
        }
    }

    /// Read a field, `None` when the selector belongs to the other kind.
    pub fn field(&self, field: impl Into<Field>) -> Option<i32> {
        match (self, field.into()) {
            (ResultRecord::Block(block), Field::Block(field)) => Some(block.get(field)),
            (ResultRecord::Arrow(arrow), Field::Arrow(field)) => Some(arrow.get(field)),
            _ => None,
        }
    }
}

/// Field selector for blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum BlockField {
    XCenter,
    YCenter,
    Width,
    Height,
    Id,
}

/// Field selector for arrows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum ArrowField {
    XOrigin,
    YOrigin,
    XTarget,
    YTarget,
    Id,
}

/// Field selector for either kind; the kind is implied by the variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum Field {
    Block(BlockField),
    Arrow(ArrowField),
}

impl Field {
    pub fn kind(self) -> ResultKind {
        match self {
            Field::Block(_) => ResultKind::Block,
            Field::Arrow(_) => ResultKind::Arrow,
        }
    }
}

impl From<BlockField> for Field {
    fn from(field: BlockField) -> Self {
        Field::Block(field)
    }
}

impl From<ArrowField> for Field {
    fn from(field: ArrowField) -> Self {
        Field::Arrow(field)
    }
}
