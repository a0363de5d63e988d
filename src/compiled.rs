use crate::block_position::BlockPosition;
use crate::block_state::BlockState;
use crate::bounds::BlockBounds;
use crate::entity::TemplateEntity;
use crate::error::{Result, TemplateError};
use crate::nbt;
use crate::region::TemplateRegion;
use quartz_nbt::{NbtCompound, NbtList, NbtTag};
use rustc_hash::FxHashMap;

pub const FORMAT_VERSION: i32 = 1;

/// A portable, world-independent template in local coordinates.
///
/// Block and block entity maps are sparse; a position with no entry reads as
/// air. Templates produced by [`StagingMapTemplate::compile`] have an entry for
/// every position of their bounds.
///
/// [`StagingMapTemplate::compile`]: crate::staging::StagingMapTemplate::compile
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledMapTemplate {
    bounds: BlockBounds,
    block_states: FxHashMap<BlockPosition, BlockState>,
    block_entities: FxHashMap<BlockPosition, NbtCompound>,
    entities: Vec<TemplateEntity>,
    regions: Vec<TemplateRegion>,
}

impl Default for CompiledMapTemplate {
    fn default() -> Self {
        CompiledMapTemplate::empty()
    }
}

impl CompiledMapTemplate {
    pub fn empty() -> Self {
        CompiledMapTemplate::with_bounds(BlockBounds::single(BlockPosition::ORIGIN))
    }

    pub fn with_bounds(bounds: BlockBounds) -> Self {
        CompiledMapTemplate {
            bounds,
            block_states: FxHashMap::default(),
            block_entities: FxHashMap::default(),
            entities: Vec::new(),
            regions: Vec::new(),
        }
    }

    pub fn bounds(&self) -> BlockBounds {
        self.bounds
    }

    pub fn add_region(&mut self, marker: impl Into<String>, bounds: BlockBounds, data: NbtCompound) {
        self.regions.push(TemplateRegion::new(marker, bounds, data));
    }

    /// Stores `state` at `pos`, with properties in key order.
    ///
    /// Fails with [`TemplateError::OutOfBounds`] if `pos` is outside the bounds.
    pub fn set_block_state(&mut self, pos: BlockPosition, state: BlockState) -> Result<()> {
        self.check_contains(pos)?;
        self.insert_block_state(pos, state);
        Ok(())
    }

    pub fn set_block_entity(&mut self, pos: BlockPosition, data: NbtCompound) -> Result<()> {
        self.check_contains(pos)?;
        self.block_entities.insert(pos, data);
        Ok(())
    }

    /// Unchecked store for positions taken from the bounds themselves.
    pub(crate) fn insert_cell(
        &mut self,
        pos: BlockPosition,
        state: BlockState,
        block_entity: Option<NbtCompound>,
    ) {
        debug_assert!(self.bounds.contains(pos));
        self.insert_block_state(pos, state);
        if let Some(data) = block_entity {
            self.block_entities.insert(pos, data);
        }
    }

    fn insert_block_state(&mut self, pos: BlockPosition, state: BlockState) {
        let sorted = state.properties.windows(2).all(|pair| pair[0] <= pair[1]);
        let state = if sorted { state } else { state.normalized() };
        self.block_states.insert(pos, state);
    }

    fn check_contains(&self, pos: BlockPosition) -> Result<()> {
        if self.bounds.contains(pos) {
            Ok(())
        } else {
            Err(TemplateError::OutOfBounds {
                pos,
                min: self.bounds.min(),
                max: self.bounds.max(),
            })
        }
    }

    pub fn add_entity(&mut self, entity: TemplateEntity) {
        self.entities.push(entity);
    }

    pub fn get_block_state(&self, pos: BlockPosition) -> Option<&BlockState> {
        self.block_states.get(&pos)
    }

    pub fn block_state(&self, pos: BlockPosition) -> BlockState {
        self.block_states.get(&pos).cloned().unwrap_or_default()
    }

    pub fn block_entity(&self, pos: BlockPosition) -> Option<&NbtCompound> {
        self.block_entities.get(&pos)
    }

    pub fn block_states(&self) -> &FxHashMap<BlockPosition, BlockState> {
        &self.block_states
    }

    pub fn block_entities(&self) -> &FxHashMap<BlockPosition, NbtCompound> {
        &self.block_entities
    }

    pub fn entities(&self) -> &[TemplateEntity] {
        &self.entities
    }

    pub fn regions(&self) -> &[TemplateRegion] {
        &self.regions
    }

    pub fn regions_by_marker<'a>(
        &'a self,
        marker: &'a str,
    ) -> impl Iterator<Item = &'a TemplateRegion> + 'a {
        self.regions.iter().filter(move |r| r.marker == marker)
    }

    pub fn first_region(&self, marker: &str) -> Option<&TemplateRegion> {
        self.regions.iter().find(|r| r.marker == marker)
    }

    pub fn count_non_air_blocks(&self) -> usize {
        self.block_states.values().filter(|b| !b.is_air()).count()
    }

    pub fn serialize(&self, mut root: NbtCompound) -> NbtCompound {
        root.insert("Version", NbtTag::Int(FORMAT_VERSION));
        self.bounds.write_nbt(&mut root);

        // Sorted so that equal templates encode to identical palettes.
        let mut positions: Vec<&BlockPosition> = self.block_states.keys().collect();
        positions.sort();

        let mut palette: Vec<&BlockState> = Vec::new();
        let mut palette_index: FxHashMap<&BlockState, i32> = FxHashMap::default();
        let mut blocks_tag = NbtCompound::new();
        for pos in positions {
            let state = &self.block_states[pos];
            let index = *palette_index.entry(state).or_insert_with(|| {
                palette.push(state);
                (palette.len() - 1) as i32
            });
            blocks_tag.insert(pos.to_key(), NbtTag::Int(index));
        }

        let palette_list = NbtList::from(palette.iter().map(|b| b.to_nbt()).collect::<Vec<NbtTag>>());
        root.insert("Palette", NbtTag::List(palette_list));
        root.insert("Blocks", NbtTag::Compound(blocks_tag));

        let mut block_entities_tag = NbtCompound::new();
        for (pos, data) in &self.block_entities {
            block_entities_tag.insert(pos.to_key(), NbtTag::Compound(data.clone()));
        }
        root.insert("BlockEntities", NbtTag::Compound(block_entities_tag));

        let entities_list = NbtList::from(
            self.entities
                .iter()
                .map(|e| e.to_nbt())
                .collect::<Vec<NbtTag>>(),
        );
        root.insert("Entities", NbtTag::List(entities_list));

        let regions_list = NbtList::from(
            self.regions
                .iter()
                .map(|r| r.to_nbt())
                .collect::<Vec<NbtTag>>(),
        );
        root.insert("regions", NbtTag::List(regions_list));

        root
    }

    pub fn deserialize(root: &NbtCompound) -> Result<Self> {
        let version = nbt::get_int(root, "Version")?;
        if version != FORMAT_VERSION {
            return Err(TemplateError::malformed(format!(
                "Unsupported template version: {}",
                version
            )));
        }

        let bounds = BlockBounds::read_nbt(root)?;
        let mut template = CompiledMapTemplate::with_bounds(bounds);

        let palette = nbt::compounds(nbt::get_list(root, "Palette")?, "Palette")?
            .into_iter()
            .map(BlockState::from_nbt)
            .collect::<Result<Vec<BlockState>>>()?;

        let blocks_tag = nbt::get_compound(root, "Blocks")?;
        template.block_states.reserve(blocks_tag.inner().len());
        for (key, value) in blocks_tag.inner() {
            let pos = template.local_position(key, "Blocks")?;
            let index = match value {
                NbtTag::Int(index) => *index,
                _ => {
                    return Err(TemplateError::malformed(format!(
                        "Block at {} is not a palette index",
                        key
                    )))
                }
            };
            let state = usize::try_from(index)
                .ok()
                .and_then(|i| palette.get(i))
                .ok_or_else(|| {
                    TemplateError::malformed(format!(
                        "Palette index {} at {} is out of range (palette size {})",
                        index,
                        key,
                        palette.len()
                    ))
                })?;
            template.block_states.insert(pos, state.clone());
        }

        let block_entities_tag = nbt::get_compound(root, "BlockEntities")?;
        for (key, value) in block_entities_tag.inner() {
            let pos = template.local_position(key, "BlockEntities")?;
            match value {
                NbtTag::Compound(data) => {
                    template.block_entities.insert(pos, data.clone());
                }
                _ => {
                    return Err(TemplateError::malformed(format!(
                        "Block entity at {} is not a compound",
                        key
                    )))
                }
            }
        }

        for entity in nbt::compounds(nbt::get_list(root, "Entities")?, "Entities")? {
            template.entities.push(TemplateEntity::from_nbt(entity)?);
        }

        for region in nbt::compounds(nbt::get_list(root, "regions")?, "regions")? {
            template.regions.push(TemplateRegion::from_nbt(region)?);
        }

        Ok(template)
    }

    fn local_position(&self, key: &str, what: &str) -> Result<BlockPosition> {
        let pos = BlockPosition::from_key(key).ok_or_else(|| {
            TemplateError::malformed(format!("Invalid {} position key {:?}", what, key))
        })?;
        if !self.bounds.contains(pos) {
            return Err(TemplateError::malformed(format!(
                "{} position {} lies outside the template bounds",
                what, pos
            )));
        }
        Ok(pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifier::Identifier;

    fn sample() -> CompiledMapTemplate {
        let bounds = BlockBounds::new(BlockPosition::ORIGIN, BlockPosition::new(2, 1, 1)).unwrap();
        let mut template = CompiledMapTemplate::with_bounds(bounds);
        let stone = BlockState::new("minecraft:stone");
        for pos in bounds.iter() {
            if pos.y == 0 {
                template.set_block_state(pos, stone.clone()).unwrap();
            } else {
                template.set_block_state(pos, BlockState::air()).unwrap();
            }
        }

        let mut chest = NbtCompound::new();
        chest.insert("id", NbtTag::String("minecraft:chest".to_string()));
        chest.insert("LootTable", NbtTag::String("arena:chests/mid".to_string()));
        template.set_block_state(
            BlockPosition::new(1, 1, 0),
            BlockState::new("minecraft:chest").with_property("facing", "west"),
        )
        .unwrap();
        template.set_block_entity(BlockPosition::new(1, 1, 0), chest).unwrap();

        template.add_entity(TemplateEntity::new(
            Identifier::parse("minecraft:armor_stand").unwrap(),
            (0.5, 1.0, 0.5),
        ));

        let mut data = NbtCompound::new();
        data.insert("team", NbtTag::String("blue".to_string()));
        template.add_region("spawn", BlockBounds::single(BlockPosition::new(2, 1, 1)), data);
        template.add_region("spawn", BlockBounds::single(BlockPosition::new(0, 1, 1)), NbtCompound::new());
        template
    }

    #[test]
    fn test_accessors() {
        let template = sample();
        assert_eq!(template.block_states().len(), 12);
        assert_eq!(template.count_non_air_blocks(), 7);
        assert_eq!(
            template.block_state(BlockPosition::new(1, 1, 0)).name,
            "minecraft:chest"
        );
        assert!(template.block_state(BlockPosition::new(9, 9, 9)).is_air());
        assert!(template.get_block_state(BlockPosition::new(9, 9, 9)).is_none());
        assert_eq!(template.regions_by_marker("spawn").count(), 2);
        assert_eq!(
            template.first_region("spawn").unwrap().bounds.min(),
            BlockPosition::new(2, 1, 1)
        );
        assert!(template.first_region("lobby").is_none());
    }

    #[test]
    fn test_set_block_state_sorts_properties() {
        let mut template = CompiledMapTemplate::empty();
        let lever = BlockState::new("minecraft:lever")
            .with_property("powered", "false")
            .with_property("face", "floor");
        template.set_block_state(BlockPosition::ORIGIN, lever).unwrap();
        let stored = template.get_block_state(BlockPosition::ORIGIN).unwrap();
        assert_eq!(stored.properties[0].0, "face");
        assert_eq!(stored.properties[1].0, "powered");
    }

    #[test]
    fn test_mutators_reject_positions_outside_bounds() {
        let mut template = CompiledMapTemplate::empty();
        let outside = BlockPosition::new(1, 0, 0);

        assert!(matches!(
            template.set_block_state(outside, BlockState::new("minecraft:stone")),
            Err(TemplateError::OutOfBounds { .. })
        ));
        assert!(matches!(
            template.set_block_entity(outside, NbtCompound::new()),
            Err(TemplateError::OutOfBounds { .. })
        ));
        assert!(template.block_states().is_empty());
        assert!(template.block_entities().is_empty());

        template
            .set_block_state(BlockPosition::ORIGIN, BlockState::new("minecraft:stone"))
            .unwrap();
        let root = template.serialize(NbtCompound::new());
        assert_eq!(CompiledMapTemplate::deserialize(&root).unwrap(), template);
    }

    #[test]
    fn test_to_and_from_nbt() {
        let template = sample();
        let root = template.serialize(NbtCompound::new());

        assert_eq!(root.get::<_, i32>("Version").unwrap(), FORMAT_VERSION);
        assert_eq!(root.get::<_, &NbtList>("Palette").unwrap().len(), 3);

        let restored = CompiledMapTemplate::deserialize(&root).unwrap();
        assert_eq!(restored, template);
    }

    #[test]
    fn test_serialize_is_deterministic() {
        let template = sample();
        let a = template.serialize(NbtCompound::new());
        let b = template.clone().serialize(NbtCompound::new());
        assert_eq!(a, b);
    }

    #[test]
    fn test_deserialize_rejects_out_of_range_palette_index() {
        let mut root = sample().serialize(NbtCompound::new());
        let mut blocks = root.get::<_, &NbtCompound>("Blocks").unwrap().clone();
        blocks.insert("0,0,0", NbtTag::Int(42));
        root.insert("Blocks", NbtTag::Compound(blocks));

        assert!(matches!(
            CompiledMapTemplate::deserialize(&root),
            Err(TemplateError::Malformed(_))
        ));
    }

    #[test]
    fn test_deserialize_rejects_positions_outside_bounds() {
        let mut root = sample().serialize(NbtCompound::new());
        let mut blocks = root.get::<_, &NbtCompound>("Blocks").unwrap().clone();
        blocks.insert("3,0,0", NbtTag::Int(0));
        root.insert("Blocks", NbtTag::Compound(blocks));

        assert!(matches!(
            CompiledMapTemplate::deserialize(&root),
            Err(TemplateError::Malformed(_))
        ));
    }

    #[test]
    fn test_deserialize_rejects_bad_keys_and_versions() {
        let mut bad_key = sample().serialize(NbtCompound::new());
        let mut entities = NbtCompound::new();
        entities.insert("zero,0,0", NbtTag::Compound(NbtCompound::new()));
        bad_key.insert("BlockEntities", NbtTag::Compound(entities));
        assert!(CompiledMapTemplate::deserialize(&bad_key).is_err());

        let mut future = sample().serialize(NbtCompound::new());
        future.insert("Version", NbtTag::Int(FORMAT_VERSION + 1));
        assert!(CompiledMapTemplate::deserialize(&future).is_err());
    }
}
