//! Compilation of world-backed staging map templates into portable templates.
//!
//! A [`StagingMapTemplate`] names an area of a live world and carries tagged
//! [`TemplateRegion`]s. [`StagingMapTemplate::compile`] snapshots the blocks,
//! block entities and selected entities inside that area into a
//! [`CompiledMapTemplate`] whose coordinates are relative to the area's
//! minimum corner. Both forms round-trip through NBT.

pub mod block_position;
pub mod block_state;
pub mod bounds;
pub mod compiled;
pub mod entity;
pub mod error;
pub mod format;
pub mod identifier;
pub mod manager;
mod nbt;
pub mod region;
pub mod settings;
pub mod staging;
pub mod world;

pub use block_position::BlockPosition;
pub use block_state::BlockState;
pub use bounds::{BlockBounds, BoundingVolume};
pub use compiled::CompiledMapTemplate;
pub use entity::TemplateEntity;
pub use error::{Result, TemplateError};
pub use identifier::Identifier;
pub use manager::{StagingEvent, StagingMapManager};
pub use region::TemplateRegion;
pub use settings::CompileSettings;
pub use staging::{RegionId, StagingMapTemplate};
pub use world::{MemoryEntity, MemoryWorld, WorldAccess, WorldEntity};
