use quartz_nbt::NbtTag;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Neg, Sub};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct BlockPosition {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPosition {
    pub const ORIGIN: BlockPosition = BlockPosition { x: 0, y: 0, z: 0 };

    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        BlockPosition { x, y, z }
    }

    /// Component-wise `<=` on every axis.
    pub fn all_le(&self, other: &BlockPosition) -> bool {
        self.x <= other.x && self.y <= other.y && self.z <= other.z
    }

    pub fn to_f64(self) -> (f64, f64, f64) {
        (self.x as f64, self.y as f64, self.z as f64)
    }

    pub fn to_nbt(self) -> NbtTag {
        NbtTag::IntArray(vec![self.x, self.y, self.z])
    }

    pub fn from_int_array(values: &[i32]) -> Option<Self> {
        match values {
            [x, y, z] => Some(BlockPosition::new(*x, *y, *z)),
            _ => None,
        }
    }

    /// Compound key form used by the block and block entity maps.
    pub fn to_key(self) -> String {
        format!("{},{},{}", self.x, self.y, self.z)
    }

    pub fn from_key(key: &str) -> Option<Self> {
        let mut parts = key.split(',').map(|s| s.trim().parse::<i32>());
        let x = parts.next()?.ok()?;
        let y = parts.next()?.ok()?;
        let z = parts.next()?.ok()?;
        if parts.next().is_some() {
            return None;
        }
        Some(BlockPosition::new(x, y, z))
    }
}

impl fmt::Display for BlockPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

impl From<(i32, i32, i32)> for BlockPosition {
    fn from((x, y, z): (i32, i32, i32)) -> Self {
        BlockPosition::new(x, y, z)
    }
}

impl From<BlockPosition> for (i32, i32, i32) {
    fn from(pos: BlockPosition) -> Self {
        (pos.x, pos.y, pos.z)
    }
}

impl Add for BlockPosition {
    type Output = BlockPosition;

    fn add(self, rhs: BlockPosition) -> BlockPosition {
        BlockPosition::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for BlockPosition {
    type Output = BlockPosition;

    fn sub(self, rhs: BlockPosition) -> BlockPosition {
        BlockPosition::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Neg for BlockPosition {
    type Output = BlockPosition;

    fn neg(self) -> BlockPosition {
        BlockPosition::new(-self.x, -self.y, -self.z)
    }
}
