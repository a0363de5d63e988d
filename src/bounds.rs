use crate::block_position::BlockPosition;
use crate::error::{Result, TemplateError};
use crate::nbt;
use quartz_nbt::NbtCompound;
use serde::{Deserialize, Serialize};
use std::iter::FusedIterator;

/// An axis-aligned, inclusive cuboid of block positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockBounds {
    min: BlockPosition,
    max: BlockPosition,
}

impl BlockBounds {
    /// Creates bounds from an ordered corner pair, rejecting `min > max` on any axis.
    pub fn new(min: BlockPosition, max: BlockPosition) -> Result<Self> {
        if !min.all_le(&max) {
            return Err(TemplateError::InvalidBounds { min, max });
        }
        Ok(BlockBounds { min, max })
    }

    /// Creates bounds spanning two arbitrary corners.
    pub fn of(a: BlockPosition, b: BlockPosition) -> Self {
        BlockBounds {
            min: BlockPosition::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: BlockPosition::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    pub fn single(pos: BlockPosition) -> Self {
        BlockBounds { min: pos, max: pos }
    }

    pub fn min(&self) -> BlockPosition {
        self.min
    }

    pub fn max(&self) -> BlockPosition {
        self.max
    }

    #[inline(always)]
    pub fn contains(&self, pos: BlockPosition) -> bool {
        self.min.all_le(&pos) && pos.all_le(&self.max)
    }

    pub fn contains_bounds(&self, other: &BlockBounds) -> bool {
        self.contains(other.min) && self.contains(other.max)
    }

    pub fn intersects(&self, other: &BlockBounds) -> bool {
        self.min.all_le(&other.max) && other.min.all_le(&self.max)
    }

    /// Extent along each axis, counting both end cells.
    ///
    /// Widened to `i64`: a span over the whole `i32` range has `2^32` cells.
    pub fn size(&self) -> (i64, i64, i64) {
        (
            self.max.x as i64 - self.min.x as i64 + 1,
            self.max.y as i64 - self.min.y as i64 + 1,
            self.max.z as i64 - self.min.z as i64 + 1,
        )
    }

    /// Cell count, saturating at `u64::MAX`.
    pub fn volume(&self) -> u64 {
        let (w, h, l) = self.size();
        (w as u64)
            .saturating_mul(h as u64)
            .saturating_mul(l as u64)
    }

    pub fn center(&self) -> (f64, f64, f64) {
        (
            (self.min.x as f64 + self.max.x as f64 + 1.0) / 2.0,
            (self.min.y as f64 + self.max.y as f64 + 1.0) / 2.0,
            (self.min.z as f64 + self.max.z as f64 + 1.0) / 2.0,
        )
    }

    /// Shifts both corners by `-by`. Used for the world to local remap.
    pub fn translate(&self, by: BlockPosition) -> BlockBounds {
        BlockBounds {
            min: self.min - by,
            max: self.max - by,
        }
    }

    /// Shifts both corners by `+by`.
    pub fn offset(&self, by: BlockPosition) -> BlockBounds {
        BlockBounds {
            min: self.min + by,
            max: self.max + by,
        }
    }

    pub fn iter(&self) -> BlockBoundsIter {
        BlockBoundsIter {
            bounds: *self,
            next: Some(self.min),
            remaining: self.volume(),
        }
    }

    /// The half-open volume `[min, max + 1)` covering every cell of these bounds.
    pub fn to_volume(&self) -> BoundingVolume {
        BoundingVolume {
            min: self.min.to_f64(),
            max: (
                self.max.x as f64 + 1.0,
                self.max.y as f64 + 1.0,
                self.max.z as f64 + 1.0,
            ),
        }
    }

    pub fn write_nbt(&self, root: &mut NbtCompound) {
        root.insert("min", self.min.to_nbt());
        root.insert("max", self.max.to_nbt());
    }

    pub fn read_nbt(root: &NbtCompound) -> Result<Self> {
        let min = nbt::get_position(root, "min")?;
        let max = nbt::get_position(root, "max")?;
        BlockBounds::new(min, max).map_err(|e| TemplateError::malformed(e.to_string()))
    }
}

impl<'a> IntoIterator for &'a BlockBounds {
    type Item = BlockPosition;
    type IntoIter = BlockBoundsIter;

    fn into_iter(self) -> BlockBoundsIter {
        self.iter()
    }
}

/// Iterates every position of a [`BlockBounds`], x outermost and z innermost.
#[derive(Debug, Clone)]
pub struct BlockBoundsIter {
    bounds: BlockBounds,
    next: Option<BlockPosition>,
    remaining: u64,
}

impl Iterator for BlockBoundsIter {
    type Item = BlockPosition;

    fn next(&mut self) -> Option<BlockPosition> {
        let current = self.next?;
        let BlockBounds { min, max } = self.bounds;

        self.next = if current.z < max.z {
            Some(BlockPosition::new(current.x, current.y, current.z + 1))
        } else if current.y < max.y {
            Some(BlockPosition::new(current.x, current.y + 1, min.z))
        } else if current.x < max.x {
            Some(BlockPosition::new(current.x + 1, min.y, min.z))
        } else {
            None
        };
        self.remaining -= 1;

        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::try_from(self.remaining).unwrap_or(usize::MAX);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for BlockBoundsIter {}

impl FusedIterator for BlockBoundsIter {}

/// A floating point, half-open box used to query entities overlapping bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingVolume {
    pub min: (f64, f64, f64),
    pub max: (f64, f64, f64),
}

impl BoundingVolume {
    pub fn contains_point(&self, point: (f64, f64, f64)) -> bool {
        point.0 >= self.min.0
            && point.0 < self.max.0
            && point.1 >= self.min.1
            && point.1 < self.max.1
            && point.2 >= self.min.2
            && point.2 < self.max.2
    }

    pub fn intersects(&self, other: &BoundingVolume) -> bool {
        self.min.0 < other.max.0
            && self.max.0 > other.min.0
            && self.min.1 < other.max.1
            && self.max.1 > other.min.1
            && self.min.2 < other.max.2
            && self.max.2 > other.min.2
    }
}
