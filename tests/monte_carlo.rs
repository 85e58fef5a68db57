// Estimator-level checks: the Monte Carlo machinery has to reproduce known
// closed-form results before the images it produces can be trusted.

use lumen::camera::Camera;
use lumen::hittable::HitRecord;
use lumen::material::{Lambertian, Material};
use lumen::math::*;
use lumen::pdf::{CosinePdf, Pdf};
use lumen::presets::ScenePreset;
use lumen::renderer::PathTracer;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::PI;

#[test]
fn pi_estimators_converge() {
    let mut rng = SmallRng::seed_from_u64(314);
    let sqrt_n = 1000u32;
    let n = sqrt_n * sqrt_n;

    let mut in_circle = 0u32;
    let mut in_circle_stratified = 0u32;

    for i in 0..sqrt_n {
        for j in 0..sqrt_n {
            let x: f64 = rng.gen_range(-1.0..1.0);
            let y: f64 = rng.gen_range(-1.0..1.0);
            if x * x + y * y < 1.0 {
                in_circle += 1;
            }

            // One jittered sample per stratum of the same [-1,1]² domain.
            let x = 2.0 * ((i as f64 + rng.gen::<f64>()) / sqrt_n as f64) - 1.0;
            let y = 2.0 * ((j as f64 + rng.gen::<f64>()) / sqrt_n as f64) - 1.0;
            if x * x + y * y < 1.0 {
                in_circle_stratified += 1;
            }
        }
    }

    let plain = 4.0 * in_circle as f64 / n as f64;
    let stratified = 4.0 * in_circle_stratified as f64 / n as f64;

    assert!((plain - PI).abs() < 0.01, "plain estimate {plain}");
    assert!(
        (stratified - PI).abs() < 0.005,
        "stratified estimate {stratified}"
    );
}

#[test]
fn lambertian_under_uniform_hemisphere_returns_albedo() {
    // A diffuse surface lit by a uniform hemisphere of radiance L reflects
    // albedo · L. With cosine importance sampling the ratio f·L/p is constant,
    // so the estimate converges immediately and must sit within 1%.
    let albedo = Color::new(0.8, 0.6, 0.4);
    let ambient = 1.0;
    let material = Lambertian::new(albedo);
    let rec = HitRecord {
        point: Point3::zero(),
        normal: Vec3::unit_z(),
        t: 1.0,
        u: 0.0,
        v: 0.0,
        front_face: true,
        material: &material,
    };
    let incoming = Ray::new(Point3::new(0.0, 0.0, 1.0), Vec3::new(0.0, 0.0, -1.0));
    let pdf = CosinePdf::new(rec.normal);

    let mut rng = SmallRng::seed_from_u64(2718);
    let samples = 100_000u32;
    let mut estimate = Color::zero();
    for _ in 0..samples {
        let direction = pdf.generate(&mut rng);
        let scattered = Ray::new(rec.point, direction);
        let brdf = material.eval_brdf(&incoming, &rec, &scattered);
        estimate += brdf * (ambient / pdf.value(direction));
    }
    estimate /= samples as f64;

    for (got, want) in [
        (estimate.x, albedo.x),
        (estimate.y, albedo.y),
        (estimate.z, albedo.z),
    ] {
        assert!(
            (got - want).abs() < 0.01 * want.max(1.0),
            "estimated {got}, expected {want}"
        );
    }
}

#[test]
fn simple_preset_renders_a_lit_finite_image() {
    let mut scene = ScenePreset::Simple.build().expect("simple scene");
    scene.render.width = 40;
    scene.render.samples_per_pixel = 4;
    scene.render.max_depth = 8;

    let camera = Camera::new(&scene.camera, &scene.render);
    let tracer = PathTracer {
        world: &scene.world,
        lights: &scene.lights,
        camera: &camera,
        config: &scene.render,
    };
    let fb = tracer.render();

    let mut total = 0.0;
    for pixel in &fb.pixels {
        for channel in [pixel.x, pixel.y, pixel.z] {
            assert!(channel.is_finite());
            assert!(channel >= 0.0);
            total += channel;
        }
    }
    // The emitter must actually light the scene.
    assert!(total > 0.0);
}
