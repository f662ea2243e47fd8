use criterion::{criterion_group, criterion_main, Criterion, black_box};

use shatter::core::config::{BackdropParams, RockSpawnParams};
use shatter::core::DVec2;
use shatter::field::{NoiseGrid, ValueField, VoronoiGrid};
use shatter::math::{PixelRect, SeedStream};
use shatter::raster::{Canvas, shader_fn};
use shatter::render::{Backdrop, BackdropRenderer, Renderer, RockRenderer};
use shatter::rock::Rock;

fn threads() -> usize {
    rayon::current_num_threads().clamp(1, 1024)
}

fn bench_backdrop_800x600(c: &mut Criterion) {
    let backdrop = Backdrop::from_params(12345, &BackdropParams::default()).unwrap();
    let mut canvas = Canvas::with_thread_count(800, 600, threads()).unwrap();

    c.bench_function("backdrop_800x600", |b| {
        b.iter(|| BackdropRenderer.render(black_box(&backdrop), &mut canvas).unwrap());
    });
}

fn bench_rock_solid(c: &mut Criterion) {
    let mut stream = SeedStream::new(7);
    let rock = Rock::roll(DVec2::new(200.0, 200.0), &mut stream, &RockSpawnParams::default(), 1.0).unwrap();
    let mut canvas = Canvas::with_thread_count(400, 400, threads()).unwrap();

    c.bench_function("rock_solid", |b| {
        b.iter(|| RockRenderer.render(black_box(&rock), &mut canvas).unwrap());
    });
}

fn bench_rock_fracturing(c: &mut Criterion) {
    let spawn = RockSpawnParams::default();
    let mut stream = SeedStream::new(7);
    let mut rock = Rock::roll(DVec2::new(200.0, 200.0), &mut stream, &spawn, 1.0).unwrap();
    rock.shape.damage(rock.shape.integrity());
    rock.advance(spawn.fracture_duration * 0.5);
    let mut canvas = Canvas::with_thread_count(400, 400, threads()).unwrap();

    c.bench_function("rock_fracturing", |b| {
        b.iter(|| RockRenderer.render(black_box(&rock), &mut canvas).unwrap());
    });
}

fn bench_rect_dispatch_single_vs_pool(c: &mut Criterion) {
    let shader = shader_fn(|context| context.pixel().add_grayscale(1));
    let rect = PixelRect::new(0, 0, 1024, 1024);
    let mut single = Canvas::with_thread_count(1024, 1024, 1).unwrap();
    let mut pooled = Canvas::with_thread_count(1024, 1024, threads()).unwrap();

    c.bench_function("rect_dispatch_1024_single", |b| {
        b.iter(|| single.run_over_rect(black_box(rect), &shader).unwrap());
    });
    c.bench_function("rect_dispatch_1024_pool", |b| {
        b.iter(|| pooled.run_over_rect(black_box(rect), &shader).unwrap());
    });
}

fn bench_noise_row_bulk_vs_point(c: &mut Criterion) {
    let noise = NoiseGrid::octaves(99, 1024.0, 0.5, 0.1875, 0.625, 10).unwrap();
    let mut values = vec![0.0f32; 800];

    c.bench_function("noise_row_bulk_800", |b| {
        b.iter(|| {
            values.fill(0.0);
            noise.values_x(black_box(-12.0), black_box(345.0), 1.0, &mut values).unwrap();
            black_box(values[799]);
        });
    });
    c.bench_function("noise_row_point_800", |b| {
        b.iter(|| {
            for (i, value) in values.iter_mut().enumerate() {
                *value = noise.value(black_box(-12.0) + i as f64, 345.0);
            }
            black_box(values[799]);
        });
    });
}

fn bench_voronoi_walk(c: &mut Criterion) {
    let grid = VoronoiGrid::new(3, 32.0, 0.75).unwrap();

    c.bench_function("voronoi_row_walk_512", |b| {
        let mut query = grid.new_query();
        b.iter(|| {
            for x in 0..512 {
                grid.nearest_seed_point(x as f64, black_box(100.5), &mut query);
            }
            black_box(query.center());
        });
    });
}

criterion_group!(
    benches,
    bench_backdrop_800x600,
    bench_rock_solid,
    bench_rock_fracturing,
    bench_rect_dispatch_single_vs_pool,
    bench_noise_row_bulk_vs_point,
    bench_voronoi_walk,
);
criterion_main!(benches);
