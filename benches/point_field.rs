//! Benchmarks for point field generation and the per-frame CPU work.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec2;

use particle_globe::color::{Rgb, Rgba};
use particle_globe::mask::{build_text_mask, CosmicRasterizer};
use particle_globe::projection::Viewport;
use particle_globe::raster::PixelCanvas;
use particle_globe::render::{Canvas2d, RenderPass};
use particle_globe::spawn::{field_rng, PointField};
use particle_globe::time::{Clock, ManualClock};
use particle_globe::{IntroConfig, Simulation};

/// Discards every draw call.
struct NullCanvas;

impl Canvas2d for NullCanvas {
    fn clear(&mut self, _color: Rgb) {}
    fn set_shadow(&mut self, _blur: f32, _color: Rgb) {}
    fn clear_shadow(&mut self) {}
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba) {
        black_box((center, radius, color));
    }
}

fn config(points: u32) -> IntroConfig {
    let mut config = IntroConfig::default();
    config.field.point_count = points;
    config.field.seed = Some(1);
    config
}

fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");
    let viewport = Viewport::new(1280.0, 720.0);
    let base = config(0);
    let mask = build_text_mask(&mut CosmicRasterizer::new(), &base.text).ok();

    for count in [1_000u32, 15_000, 50_000] {
        let config = config(count);
        group.bench_with_input(BenchmarkId::new("from_mask", count), &count, |b, _| {
            let mut rng = field_rng(Some(1));
            b.iter(|| black_box(PointField::from_mask(&config, viewport, mask.as_ref(), &mut rng)))
        });
    }

    group.bench_function("text_mask", |b| {
        let mut rasterizer = CosmicRasterizer::new();
        b.iter(|| black_box(build_text_mask(&mut rasterizer, &base.text).ok()))
    });

    group.finish();
}

fn bench_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame");
    let viewport = Viewport::new(1280.0, 720.0);

    for count in [1_000u32, 15_000] {
        group.bench_with_input(BenchmarkId::new("step", count), &count, |b, &count| {
            let clock = ManualClock::new();
            let mut sim =
                Simulation::new(config(count), viewport, Box::new(CosmicRasterizer::new()));
            let mut canvas = NullCanvas;
            // Time stands still, so the globe keeps spinning.
            b.iter(|| black_box(sim.step(clock.now(), &mut canvas)))
        });
    }

    group.bench_function("raster_draw/15000", |b| {
        let config = config(15_000);
        let mut rng = field_rng(Some(1));
        let field = PointField::from_mask(&config, viewport, None, &mut rng);
        let mut pass = RenderPass::new(config.render.clone());
        let mut canvas = PixelCanvas::new(viewport, 1.0);
        b.iter(|| pass.draw(black_box(&field), &mut canvas))
    });

    group.finish();
}

criterion_group!(benches, bench_generate, bench_frame);
criterion_main!(benches);
