use crate::block_position::BlockPosition;
use crate::bounds::BlockBounds;
use crate::error::Result;
use crate::nbt;
use quartz_nbt::{NbtCompound, NbtTag};

/// A tagged area inside a template, such as a spawn point or a loot zone.
///
/// Markers are free-form and need not be unique. The bounds are not checked
/// against the containing template.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateRegion {
    pub marker: String,
    pub bounds: BlockBounds,
    pub data: NbtCompound,
}

impl TemplateRegion {
    pub fn new(marker: impl Into<String>, bounds: BlockBounds, data: NbtCompound) -> Self {
        TemplateRegion {
            marker: marker.into(),
            bounds,
            data,
        }
    }

    /// Copy of this region with its bounds shifted by `-by`.
    pub fn translated(&self, by: BlockPosition) -> TemplateRegion {
        TemplateRegion {
            marker: self.marker.clone(),
            bounds: self.bounds.translate(by),
            data: self.data.clone(),
        }
    }

    pub fn to_nbt(&self) -> NbtTag {
        let mut tag = NbtCompound::new();
        tag.insert("marker", NbtTag::String(self.marker.clone()));
        self.bounds.write_nbt(&mut tag);
        tag.insert("data", NbtTag::Compound(self.data.clone()));
        NbtTag::Compound(tag)
    }

    pub fn from_nbt(nbt: &NbtCompound) -> Result<Self> {
        let marker = nbt::get_str(nbt, "marker")?.to_string();
        let bounds = BlockBounds::read_nbt(nbt)?;
        let data = nbt::get_compound(nbt, "data")?.clone();
        Ok(TemplateRegion {
            marker,
            bounds,
            data,
        })
    }
}
