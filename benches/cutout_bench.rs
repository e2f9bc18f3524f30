use criterion::{black_box, criterion_group, criterion_main, Criterion};
use cutout_tile::cutout::{BeamGenerator, CellSampler, ForcedLocations};
use cutout_tile::{
    CutoutConfig, CutoutTiler, Entity, MapDocument, Output, Surface, SurfaceColor, TextureTable,
    TileGranularity, Vec3,
};
use std::time::Duration;

const MARKER: &str = "instances/cutout_tile.vmf";

// ── Helpers ──────────────────────────────────────────────────────────────────

/// A `size` x `size` block floor with markers on opposite corners.
fn make_floor(size: i32) -> MapDocument {
    let mut doc = MapDocument::new();
    for x in 0..size {
        for y in 0..size {
            doc.add_surface_block(
                Vec3::new(64 + 128 * x, 64 + 128 * y, 0),
                Surface::Floor,
                SurfaceColor::White,
                "tile/white_floor_tile002a",
            );
        }
    }
    let far = 64 + 128 * (size - 1);
    doc.create_ent(
        Entity::new("func_instance")
            .with_key("file", MARKER)
            .with_key("targetname", "a")
            .with_key("origin", "64 64 64")
            .with_output(Output::new("OnUse", "b", "Trigger")),
    );
    doc.create_ent(
        Entity::new("func_instance")
            .with_key("file", MARKER)
            .with_key("targetname", "b")
            .with_key("origin", Vec3::new(far, far, 64).join(" ")),
    );
    doc
}

fn make_config() -> CutoutConfig {
    CutoutConfig {
        marker_item_ids: vec![MARKER.to_string()],
        floor_tile_chance_percent: 60,
        floor_glue_chance_percent: 40,
        border_seal_template: "instances/cutout_edge.vmf".to_string(),
        ..CutoutConfig::default()
    }
}

// ── Benchmarks ───────────────────────────────────────────────────────────────

fn bench_sampler(c: &mut Criterion) {
    let mut group = c.benchmark_group("sampler");
    let sampler = CellSampler::new(60, 40);

    group.bench_function("draw", |b| {
        b.iter(|| black_box(sampler.draw(black_box(Vec3::new(-128, 512, 64)))));
    });
    for granularity in [TileGranularity::FourByFour, TileGranularity::TwoByTwo] {
        group.bench_function(&format!("sample_{}", granularity.as_str()), |b| {
            b.iter(|| {
                let mut forced = ForcedLocations::new();
                black_box(sampler.sample(Vec3::new(-128, 512, 64), granularity, &mut forced));
            });
        });
    }
    group.finish();
}

fn bench_beams(c: &mut Criterion) {
    let mut group = c.benchmark_group("beams");
    group.measurement_time(Duration::from_secs(3));

    for &blocks in &[4, 16] {
        let span = 128 * blocks;
        group.bench_function(&format!("{}x{}", blocks, blocks), |b| {
            b.iter(|| {
                let mut doc = MapDocument::new();
                let report = BeamGenerator::new("0", Surface::Floor).generate(
                    &mut doc,
                    Vec3::new(0, 0, 0),
                    Vec3::new(span, span, -8),
                );
                black_box(report);
            });
        });
    }
    group.finish();
}

fn bench_full_pass(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_pass");
    group.measurement_time(Duration::from_secs(5));
    let textures = TextureTable::with_defaults();

    for &size in &[2, 8] {
        group.bench_function(&format!("{}x{}_floor", size, size), |b| {
            b.iter_batched(
                || make_floor(size),
                |mut doc| {
                    let tiler = CutoutTiler::new(make_config(), textures.clone());
                    black_box(tiler.run(&mut doc).ok());
                },
                criterion::BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_sampler, bench_beams, bench_full_pass);
criterion_main!(benches);
