use crate::block_position::BlockPosition;

/// Error type for template construction, decoding and encoding.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("Malformed template: {0}")]
    Malformed(String),
    #[error("Invalid bounds: min {min} is greater than max {max}")]
    InvalidBounds {
        min: BlockPosition,
        max: BlockPosition,
    },
    #[error("Position {pos} lies outside the template bounds {min}..{max}")]
    OutOfBounds {
        pos: BlockPosition,
        min: BlockPosition,
        max: BlockPosition,
    },
    #[error("Entity data key {0:?} is reserved")]
    ReservedKey(String),
    #[error("Invalid identifier: {0:?}")]
    InvalidIdentifier(String),
    #[error("NBT error: {0}")]
    Nbt(#[from] quartz_nbt::io::NbtIoError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Settings error: {0}")]
    Settings(#[from] serde_json::Error),
}

impl TemplateError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        TemplateError::Malformed(message.into())
    }
}

pub type Result<T> = std::result::Result<T, TemplateError>;
