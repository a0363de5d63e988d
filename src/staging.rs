use crate::block_position::BlockPosition;
use crate::block_state::BlockState;
use crate::bounds::BlockBounds;
use crate::compiled::CompiledMapTemplate;
use crate::entity::TemplateEntity;
use crate::error::{Result, TemplateError};
use crate::identifier::Identifier;
use crate::manager::StagingEvent;
use crate::nbt;
use crate::region::TemplateRegion;
use crate::settings;
use crate::world::{WorldAccess, WorldEntity};
use quartz_nbt::{NbtCompound, NbtList, NbtTag};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::Sender;

static NEXT_TEMPLATE_UID: AtomicU64 = AtomicU64::new(0);

/// Handle to a region of the [`StagingMapTemplate`] that issued it.
///
/// Regions are not value-unique, so removal goes through this handle rather
/// than by comparing contents. A handle only resolves on its issuing template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionId {
    owner: u64,
    index: usize,
}

/// An in-world map template that has not been compiled yet.
///
/// It only describes the area and its regions. Blocks and entities are read
/// from the world passed to [`StagingMapTemplate::compile`].
///
/// Region slots are never reused: removal leaves a hole so outstanding
/// [`RegionId`]s stay valid, and the slot list only shrinks on reload.
#[derive(Debug)]
pub struct StagingMapTemplate {
    uid: u64,
    identifier: Identifier,
    bounds: BlockBounds,
    regions: Vec<Option<TemplateRegion>>,
    live_regions: usize,
    events: Option<Sender<StagingEvent>>,
}

impl StagingMapTemplate {
    pub fn new(identifier: Identifier, bounds: BlockBounds) -> Self {
        StagingMapTemplate {
            uid: NEXT_TEMPLATE_UID.fetch_add(1, Ordering::Relaxed),
            identifier,
            bounds,
            regions: Vec::new(),
            live_regions: 0,
            events: None,
        }
    }

    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    pub fn bounds(&self) -> BlockBounds {
        self.bounds
    }

    /// Routes dirty notifications for this template to `sender`.
    pub fn attach_events(&mut self, sender: Sender<StagingEvent>) {
        self.events = Some(sender);
    }

    pub fn detach_events(&mut self) {
        self.events = None;
    }

    fn mark_dirty(&self) {
        if let Some(events) = &self.events {
            if events
                .send(StagingEvent::Dirty(self.identifier.clone()))
                .is_err()
            {
                log::trace!("Dropped dirty event for {}: no receiver", self.identifier);
            }
        }
    }

    pub fn add_region(
        &mut self,
        marker: impl Into<String>,
        bounds: BlockBounds,
        data: NbtCompound,
    ) -> RegionId {
        let region = TemplateRegion::new(marker, bounds, data);
        if !self.bounds.contains_bounds(&region.bounds) {
            log::warn!(
                "Region {:?} of {} extends outside the template bounds",
                region.marker,
                self.identifier
            );
        }

        self.mark_dirty();
        self.push_region(region)
    }

    fn push_region(&mut self, region: TemplateRegion) -> RegionId {
        self.regions.push(Some(region));
        self.live_regions += 1;
        self.region_id(self.regions.len() - 1)
    }

    fn region_id(&self, index: usize) -> RegionId {
        RegionId {
            owner: self.uid,
            index,
        }
    }

    fn slot(&self, id: RegionId) -> Option<usize> {
        (id.owner == self.uid).then_some(id.index)
    }

    /// Removes the region behind `id`. Removing twice, or with a handle issued
    /// by another template, is a no-op returning `None`.
    pub fn remove_region(&mut self, id: RegionId) -> Option<TemplateRegion> {
        let removed = self
            .slot(id)
            .and_then(|index| self.regions.get_mut(index))
            .and_then(Option::take);
        if removed.is_some() {
            self.live_regions -= 1;
        }
        self.mark_dirty();
        removed
    }

    pub fn region(&self, id: RegionId) -> Option<&TemplateRegion> {
        self.slot(id)
            .and_then(|index| self.regions.get(index))
            .and_then(Option::as_ref)
    }

    /// Live regions in insertion order.
    pub fn regions(&self) -> impl Iterator<Item = (RegionId, &TemplateRegion)> + '_ {
        self.regions
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|region| (self.region_id(index), region)))
    }

    pub fn regions_by_marker<'a>(
        &'a self,
        marker: &'a str,
    ) -> impl Iterator<Item = (RegionId, &'a TemplateRegion)> + 'a {
        self.regions().filter(move |(_, region)| region.marker == marker)
    }

    pub fn region_count(&self) -> usize {
        self.live_regions
    }

    pub fn serialize(&self, mut root: NbtCompound) -> NbtCompound {
        root.insert("identifier", NbtTag::String(self.identifier.to_string()));
        self.bounds.write_nbt(&mut root);

        let region_list = NbtList::from(
            self.regions()
                .map(|(_, region)| region.to_nbt())
                .collect::<Vec<NbtTag>>(),
        );
        root.insert("regions", NbtTag::List(region_list));

        root
    }

    pub fn deserialize(root: &NbtCompound) -> Result<Self> {
        let identifier = Identifier::parse(nbt::get_str(root, "identifier")?)
            .map_err(|e| TemplateError::malformed(e.to_string()))?;
        let bounds = BlockBounds::read_nbt(root)?;

        let mut template = StagingMapTemplate::new(identifier, bounds);
        for region in nbt::compounds(nbt::get_list(root, "regions")?, "regions")? {
            template.push_region(TemplateRegion::from_nbt(region)?);
        }

        Ok(template)
    }

    /// Compiles this template against `world`, copying the default entity types.
    pub fn compile<W: WorldAccess>(&self, world: &W) -> CompiledMapTemplate {
        self.compile_with(world, &settings::default_allow_list())
    }

    /// Compiles this template, copying only entities whose type is in `entity_types`.
    ///
    /// Every position of the bounds gets a block state entry, air included.
    /// Positions are made relative to the bounds minimum.
    pub fn compile_with<W: WorldAccess>(
        &self,
        world: &W,
        entity_types: &[Identifier],
    ) -> CompiledMapTemplate {
        let _span = tracing::debug_span!("compile", template = %self.identifier).entered();
        let origin = self.bounds.min();
        let mut map = self.begin_compile();

        for pos in self.bounds.iter() {
            let block_entity = world.block_entity(pos);
            store_cell(&mut map, origin, pos, world.block_state(pos), block_entity);
        }

        self.compile_entities(world, &mut map, entity_types);
        self.log_compiled(&map);
        map
    }

    /// [`StagingMapTemplate::compile_with`], reading block positions in parallel.
    ///
    /// Produces the same template as the sequential pass.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn compile_parallel<W>(&self, world: &W, entity_types: &[Identifier]) -> CompiledMapTemplate
    where
        W: WorldAccess + Sync,
    {
        use rayon::prelude::*;

        let _span = tracing::debug_span!("compile_parallel", template = %self.identifier).entered();
        let origin = self.bounds.min();
        let mut map = self.begin_compile();

        let positions: Vec<BlockPosition> = self.bounds.iter().collect();
        let cells: Vec<(BlockState, Option<NbtCompound>)> = positions
            .par_iter()
            .map(|&pos| (world.block_state(pos), world.block_entity(pos)))
            .collect();

        for (pos, (state, block_entity)) in positions.into_iter().zip(cells) {
            store_cell(&mut map, origin, pos, state, block_entity);
        }

        self.compile_entities(world, &mut map, entity_types);
        self.log_compiled(&map);
        map
    }

    fn begin_compile(&self) -> CompiledMapTemplate {
        let origin = self.bounds.min();
        let mut map = CompiledMapTemplate::with_bounds(self.bounds.translate(origin));
        for (_, region) in self.regions() {
            let local = region.translated(origin);
            map.add_region(local.marker, local.bounds, local.data);
        }
        map
    }

    fn compile_entities<W: WorldAccess>(
        &self,
        world: &W,
        map: &mut CompiledMapTemplate,
        entity_types: &[Identifier],
    ) {
        let origin = self.bounds.min();
        let volume = self.bounds.to_volume();
        for entity_type in entity_types {
            for entity in world.entities_by_type(entity_type, &volume, |e| !e.is_removed()) {
                map.add_entity(TemplateEntity::capture(
                    entity_type.clone(),
                    entity.position(),
                    entity.to_nbt(),
                    origin,
                ));
            }
        }
    }

    fn log_compiled(&self, map: &CompiledMapTemplate) {
        log::debug!(
            "Compiled {}: {} blocks, {} block entities, {} entities, {} regions",
            self.identifier,
            map.block_states().len(),
            map.block_entities().len(),
            map.entities().len(),
            map.regions().len()
        );
    }
}

fn store_cell(
    map: &mut CompiledMapTemplate,
    origin: BlockPosition,
    pos: BlockPosition,
    state: BlockState,
    block_entity: Option<NbtCompound>,
) {
    let block_entity = block_entity.map(|mut data| {
        nbt::localize_int_fields(&mut data, ["x", "y", "z"], origin);
        data
    });
    map.insert_cell(pos - origin, state, block_entity);
}
