//! The read-only view of a live world that compilation snapshots from.
//!
//! Reads are infallible. An implementation backed by a world that is no longer
//! valid must panic instead of returning partial data, so that a compile never
//! produces a template with holes.

use crate::block_position::BlockPosition;
use crate::block_state::BlockState;
use crate::bounds::BoundingVolume;
use crate::identifier::Identifier;
use crate::nbt;
use quartz_nbt::{NbtCompound, NbtTag};
use rustc_hash::FxHashMap;

pub trait WorldEntity {
    fn position(&self) -> (f64, f64, f64);

    /// True once the entity has been killed or unloaded.
    fn is_removed(&self) -> bool;

    /// The entity's full saved state.
    fn to_nbt(&self) -> NbtCompound;
}

pub trait WorldAccess {
    type Entity: WorldEntity;

    fn block_state(&self, pos: BlockPosition) -> BlockState;

    fn block_entity(&self, pos: BlockPosition) -> Option<NbtCompound>;

    /// Entities of `entity_type` overlapping `volume` that satisfy `predicate`,
    /// in an order chosen by the implementation.
    fn entities_by_type<P>(
        &self,
        entity_type: &Identifier,
        volume: &BoundingVolume,
        predicate: P,
    ) -> Vec<&Self::Entity>
    where
        P: Fn(&Self::Entity) -> bool;
}

/// An entity stored in a [`MemoryWorld`].
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryEntity {
    pub entity_type: Identifier,
    pub position: (f64, f64, f64),
    pub removed: bool,
    pub nbt: NbtCompound,
}

impl MemoryEntity {
    pub fn new(entity_type: Identifier, position: (f64, f64, f64)) -> Self {
        MemoryEntity {
            entity_type,
            position,
            removed: false,
            nbt: NbtCompound::new(),
        }
    }

    pub fn with_nbt(mut self, key: &str, value: impl Into<NbtTag>) -> Self {
        self.nbt.insert(key, value.into());
        self
    }
}

impl WorldEntity for MemoryEntity {
    fn position(&self) -> (f64, f64, f64) {
        self.position
    }

    fn is_removed(&self) -> bool {
        self.removed
    }

    fn to_nbt(&self) -> NbtCompound {
        let mut compound = self.nbt.clone();
        compound.insert("id", NbtTag::String(self.entity_type.to_string()));
        compound.insert("Pos", nbt::vec3_to_nbt(self.position));
        compound
    }
}

/// A sparse in-memory world. Unset positions read as air.
#[derive(Debug, Clone, Default)]
pub struct MemoryWorld {
    blocks: FxHashMap<BlockPosition, BlockState>,
    block_entities: FxHashMap<BlockPosition, NbtCompound>,
    entities: Vec<MemoryEntity>,
}

impl MemoryWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_block(&mut self, pos: BlockPosition, state: BlockState) {
        if state.is_air() {
            self.blocks.remove(&pos);
        } else {
            self.blocks.insert(pos, state);
        }
    }

    pub fn set_block_entity(&mut self, pos: BlockPosition, data: NbtCompound) {
        self.block_entities.insert(pos, data);
    }

    /// Adds an entity and returns its index.
    pub fn spawn(&mut self, entity: MemoryEntity) -> usize {
        self.entities.push(entity);
        self.entities.len() - 1
    }

    /// Marks an entity removed; it stays stored but is no longer queried by compile.
    pub fn kill(&mut self, index: usize) -> bool {
        match self.entities.get_mut(index) {
            Some(entity) => {
                entity.removed = true;
                true
            }
            None => false,
        }
    }

    pub fn entities(&self) -> &[MemoryEntity] {
        &self.entities
    }
}

impl WorldAccess for MemoryWorld {
    type Entity = MemoryEntity;

    fn block_state(&self, pos: BlockPosition) -> BlockState {
        self.blocks.get(&pos).cloned().unwrap_or_default()
    }

    fn block_entity(&self, pos: BlockPosition) -> Option<NbtCompound> {
        self.block_entities.get(&pos).cloned()
    }

    fn entities_by_type<P>(
        &self,
        entity_type: &Identifier,
        volume: &BoundingVolume,
        predicate: P,
    ) -> Vec<&MemoryEntity>
    where
        P: Fn(&MemoryEntity) -> bool,
    {
        self.entities
            .iter()
            .filter(|e| &e.entity_type == entity_type)
            .filter(|e| volume.contains_point(e.position))
            .filter(|e| predicate(*e))
            .collect()
    }
}
