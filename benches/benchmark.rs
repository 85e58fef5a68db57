// Baseline timings for the two hot paths: BVH traversal and a full small
// render. Run with `cargo bench` and compare against the previous report
// before merging anything that touches the integrator or the tree build.

use criterion::{criterion_group, criterion_main, Criterion};
use lumen::camera::Camera;
use lumen::hittable::Hittable;
use lumen::math::{Interval, Point3, Ray, Vec3};
use lumen::presets::ScenePreset;
use lumen::renderer::PathTracer;

pub fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("Performance regression tests");
    group.sample_size(10);

    let showcase = ScenePreset::Showcase.build().expect("showcase scene");
    group.bench_function("BVH traversal (showcase field)", |b| {
        let ray = Ray::new(Point3::new(13.0, 2.0, 3.0), Vec3::new(-13.0, -1.8, -3.0));
        b.iter(|| {
            showcase
                .world
                .hit(&ray, Interval::new(0.001, f64::INFINITY))
                .is_some()
        })
    });

    let mut simple = ScenePreset::Simple.build().expect("simple scene");
    simple.render.width = 64;
    simple.render.samples_per_pixel = 4;
    simple.render.max_depth = 8;
    let camera = Camera::new(&simple.camera, &simple.render);
    group.bench_function("Simple scene 64px @ 4 spp", |b| {
        b.iter(|| {
            let tracer = PathTracer {
                world: &simple.world,
                lights: &simple.lights,
                camera: &camera,
                config: &simple.render,
            };
            tracer.render()
        })
    });

    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
