use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use map_template::format::{read_compiled, write_compiled};
use map_template::{
    BlockBounds, BlockPosition, BlockState, CompileSettings, Identifier, MemoryEntity,
    MemoryWorld, StagingMapTemplate,
};
use quartz_nbt::NbtCompound;
use std::time::Duration;

fn make_world(size: i32, fill_pct: f64) -> MemoryWorld {
    let mut world = MemoryWorld::new();
    let blocks: Vec<BlockState> = [
        "minecraft:stone",
        "minecraft:dirt",
        "minecraft:oak_planks",
        "minecraft:glass",
        "minecraft:stone_bricks",
    ]
    .iter()
    .map(|n| BlockState::new(*n))
    .collect();

    let threshold = (fill_pct * u32::MAX as f64) as u32;
    // Deterministic pseudo-random fill using a simple LCG
    let mut rng: u32 = 12345;
    for x in 0..size {
        for y in 0..size {
            for z in 0..size {
                rng = rng.wrapping_mul(1664525).wrapping_add(1013904223);
                if rng < threshold {
                    world.set_block(
                        BlockPosition::new(x, y, z),
                        blocks[(rng % blocks.len() as u32) as usize].clone(),
                    );
                }
            }
        }
    }

    let armor_stand = Identifier::parse("minecraft:armor_stand").unwrap();
    for i in 0..size {
        let coord = i as f64 + 0.5;
        world.spawn(MemoryEntity::new(armor_stand.clone(), (coord, 1.0, coord)));
    }
    world
}

fn make_staging(size: i32) -> StagingMapTemplate {
    let bounds = BlockBounds::of(
        BlockPosition::ORIGIN,
        BlockPosition::new(size - 1, size - 1, size - 1),
    );
    let identifier = Identifier::parse("bench:arena").unwrap();
    let mut staging = StagingMapTemplate::new(identifier, bounds);
    for i in 0..8 {
        staging.add_region(
            "spawn",
            BlockBounds::single(BlockPosition::new(i, 1, i)),
            NbtCompound::new(),
        );
    }
    staging
}

fn bench_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile");
    group.measurement_time(Duration::from_secs(3));
    let allow_list = CompileSettings::default().entity_allow_list().unwrap();

    for &size in &[16, 32, 64] {
        let world = make_world(size, 0.5);
        let staging = make_staging(size);
        let label = format!("{}³_50pct", size);

        group.bench_with_input(BenchmarkId::new("sequential", &label), &world, |b, w| {
            b.iter(|| staging.compile_with(black_box(w), &allow_list))
        });
        group.bench_with_input(BenchmarkId::new("parallel", &label), &world, |b, w| {
            b.iter(|| staging.compile_parallel(black_box(w), &allow_list))
        });
    }

    group.finish();
}

fn bench_format(c: &mut Criterion) {
    let mut group = c.benchmark_group("format");
    group.measurement_time(Duration::from_secs(3));

    for &size in &[32, 64] {
        let compiled = make_staging(size).compile(&make_world(size, 0.5));
        let bytes = write_compiled(&compiled).unwrap();
        let label = format!("{}³_50pct", size);

        group.bench_with_input(BenchmarkId::new("write", &label), &compiled, |b, t| {
            b.iter(|| write_compiled(black_box(t)).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("read", &label), &bytes, |b, data| {
            b.iter(|| read_compiled(black_box(data)).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_compile, bench_format);
criterion_main!(benches);
