use map_template::format::{read_compiled, save_compiled};
use map_template::{
    BlockBounds, BlockPosition, BlockState, CompileSettings, Identifier, MemoryEntity,
    MemoryWorld, StagingMapTemplate,
};
use quartz_nbt::{NbtCompound, NbtTag};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let out = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join("castle.nbt"));

    // A small walled courtyard at (100, 64, -20)
    let mut world = MemoryWorld::new();
    let wall = BlockState::new("minecraft:stone_bricks");
    let floor = BlockState::new("minecraft:smooth_stone");
    for x in 100..=110 {
        for z in -20..=-10 {
            world.set_block(BlockPosition::new(x, 64, z), floor.clone());
            let edge = x == 100 || x == 110 || z == -20 || z == -10;
            if edge {
                for y in 65..=67 {
                    world.set_block(BlockPosition::new(x, y, z), wall.clone());
                }
            }
        }
    }
    world.set_block(
        BlockPosition::new(105, 65, -15),
        BlockState::new("minecraft:chest").with_property("facing", "north"),
    );
    let mut chest = NbtCompound::new();
    chest.insert("id", NbtTag::String("minecraft:chest".to_string()));
    chest.insert("x", NbtTag::Int(105));
    chest.insert("y", NbtTag::Int(65));
    chest.insert("z", NbtTag::Int(-15));
    world.set_block_entity(BlockPosition::new(105, 65, -15), chest);

    let armor_stand = Identifier::parse("armor_stand").expect("Invalid entity type");
    world.spawn(MemoryEntity::new(armor_stand.clone(), (103.5, 65.0, -17.5)));
    world.spawn(MemoryEntity::new(armor_stand, (107.5, 65.0, -12.5)));

    let bounds = BlockBounds::new(
        BlockPosition::new(100, 64, -20),
        BlockPosition::new(110, 70, -10),
    )
    .expect("Invalid bounds");
    let mut staging = StagingMapTemplate::new(
        Identifier::parse("demo:courtyard").expect("Invalid identifier"),
        bounds,
    );
    let mut red = NbtCompound::new();
    red.insert("team", NbtTag::String("red".to_string()));
    staging.add_region("spawn", BlockBounds::single(BlockPosition::new(102, 65, -18)), red);
    let mut blue = NbtCompound::new();
    blue.insert("team", NbtTag::String("blue".to_string()));
    staging.add_region("spawn", BlockBounds::single(BlockPosition::new(108, 65, -12)), blue);

    let settings = CompileSettings::default();
    let allow_list = settings.entity_allow_list().expect("Invalid settings");
    let compiled = staging.compile_with(&world, &allow_list);

    println!("=== Compiled {} ===", staging.identifier());
    println!("Bounds: {:?} .. {:?}", compiled.bounds().min(), compiled.bounds().max());
    println!("Non-air blocks: {}", compiled.count_non_air_blocks());
    println!("Block entities: {}", compiled.block_entities().len());
    println!("Entities: {}", compiled.entities().len());
    for region in compiled.regions() {
        println!("  region {:<8} {:?}", region.marker, region.bounds.min());
    }

    save_compiled(&out, &compiled).expect("Failed to save template");
    let data = std::fs::read(&out).expect("Failed to read file");
    let reloaded = read_compiled(&data).expect("Failed to load template");
    println!("Wrote {} bytes to {}", data.len(), out.display());
    println!("Reload matches: {}", reloaded == compiled);
}
