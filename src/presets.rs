use crate::bvh::BvhNode;
use crate::camera::CameraConfig;
use crate::hittable::{
    make_box, ConstantMedium, HittableList, Quad, RotateY, Sphere, Translate, Triangle,
};
use crate::material::{
    Dielectric, DiffuseLight, Glossy, Iridescent, Lambertian, Material, Metal,
};
use crate::math::*;
use crate::renderer::RenderConfig;
use crate::sdf::{SdfGroup, SdfSphere};
use crate::texture::{CheckerTexture, ImageTexture, NoiseTexture};
use rand::Rng;
use std::sync::Arc;

/// A complete scene bundling geometry, emitter-sampling targets, camera, and
/// render settings. Presets let users render showcase images without manual
/// configuration.
pub struct SceneDescription {
    pub name: &'static str,
    pub world: HittableList,
    pub lights: HittableList,
    pub camera: CameraConfig,
    pub render: RenderConfig,
}

/// Available built-in scene presets.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum ScenePreset {
    /// A matte sphere on a ground sphere under a small bright emitter —
    /// soft shadows via emitter importance sampling.
    Simple,
    /// The Cornell box with a rotated box and a metallic GGX sphere.
    Cornell,
    /// An iridescent glass bubble against a plain sky.
    Bubble,
    /// The classic random-spheres field with motion blur and a checker ground.
    Showcase,
    /// Cornell box filled with two constant-density smoke volumes.
    Smoke,
    /// A gallery exercising triangles, procedural noise, image textures, and
    /// the glossy/iridescent materials in one frame.
    Gallery,
    /// Smooth-blended signed-distance spheres under an area light.
    Sdf,
}

impl ScenePreset {
    /// Builds the preset. Returns `None` when the scene cannot be constructed
    /// (an acceleration structure over no objects).
    pub fn build(self) -> Option<SceneDescription> {
        match self {
            ScenePreset::Simple => Some(build_simple()),
            ScenePreset::Cornell => Some(build_cornell()),
            ScenePreset::Bubble => Some(build_bubble()),
            ScenePreset::Showcase => build_showcase(),
            ScenePreset::Smoke => Some(build_smoke()),
            ScenePreset::Gallery => Some(build_gallery()),
            ScenePreset::Sdf => Some(build_sdf()),
        }
    }
}

fn build_simple() -> SceneDescription {
    let mut world = HittableList::new();

    let floor: Arc<dyn Material> = Arc::new(Lambertian::new(Color::new(0.5, 0.5, 0.5)));
    world.add(Arc::new(Sphere::new(
        Point3::new(0.0, -1000.0, 0.0),
        1000.0,
        floor,
    )));

    let lamp: Arc<dyn Material> = Arc::new(DiffuseLight::new(Color::new(15.0, 15.0, 13.0)));
    let light_sphere = Arc::new(Sphere::new(Point3::new(-2.0, 4.0, 5.0), 1.0, lamp));
    world.add(light_sphere.clone());

    let matte: Arc<dyn Material> = Arc::new(Lambertian::new(Color::new(0.8, 0.3, 0.3)));
    world.add(Arc::new(Sphere::new(Point3::new(0.0, 1.5, 0.0), 1.5, matte)));

    let mut lights = HittableList::new();
    lights.add(light_sphere);

    SceneDescription {
        name: "Simple",
        world,
        lights,
        camera: CameraConfig {
            look_from: Point3::new(5.0, 3.0, 7.0),
            look_at: Point3::new(0.0, 1.0, 0.0),
            vup: Vec3::unit_y(),
            vfov_degrees: 45.0,
            aspect_ratio: 16.0 / 9.0,
            defocus_angle: 0.0,
            focus_dist: 10.0,
        },
        render: RenderConfig {
            width: 600,
            samples_per_pixel: 10,
            max_depth: 50,
            background: Color::zero(),
            ..RenderConfig::default()
        },
    }
}

fn build_cornell() -> SceneDescription {
    let mut world = HittableList::new();

    let red: Arc<dyn Material> = Arc::new(Lambertian::new(Color::new(0.65, 0.05, 0.05)));
    let white: Arc<dyn Material> = Arc::new(Lambertian::new(Color::new(0.73, 0.73, 0.73)));
    let green: Arc<dyn Material> = Arc::new(Lambertian::new(Color::new(0.12, 0.45, 0.15)));
    let lamp: Arc<dyn Material> = Arc::new(DiffuseLight::new(Color::new(15.0, 15.0, 15.0)));

    // Box sides
    world.add(Arc::new(Quad::new(
        Point3::new(555.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, 555.0),
        Vec3::new(0.0, 555.0, 0.0),
        green,
    )));
    world.add(Arc::new(Quad::new(
        Point3::new(0.0, 0.0, 555.0),
        Vec3::new(0.0, 0.0, -555.0),
        Vec3::new(0.0, 555.0, 0.0),
        red,
    )));
    world.add(Arc::new(Quad::new(
        Point3::new(0.0, 555.0, 0.0),
        Vec3::new(555.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, 555.0),
        white.clone(),
    )));
    world.add(Arc::new(Quad::new(
        Point3::new(0.0, 0.0, 555.0),
        Vec3::new(555.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, -555.0),
        white.clone(),
    )));
    world.add(Arc::new(Quad::new(
        Point3::new(555.0, 0.0, 555.0),
        Vec3::new(-555.0, 0.0, 0.0),
        Vec3::new(0.0, 555.0, 0.0),
        white.clone(),
    )));

    // Ceiling light
    let light_quad = Arc::new(Quad::new(
        Point3::new(213.0, 554.0, 227.0),
        Vec3::new(130.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, 105.0),
        lamp,
    ));
    world.add(light_quad.clone());

    // Tall box
    let tall_box = Arc::new(make_box(
        Point3::zero(),
        Point3::new(165.0, 330.0, 165.0),
        white,
    ));
    let tall_box = Arc::new(RotateY::new(tall_box, 15.0));
    let tall_box = Arc::new(Translate::new(tall_box, Vec3::new(265.0, 0.0, 295.0)));
    world.add(tall_box);

    // Brushed-metal GGX sphere
    let glossy: Arc<dyn Material> = Arc::new(Glossy::new(Color::new(0.8, 0.8, 0.8), 0.3, 1.0));
    let glossy_sphere = Arc::new(Sphere::new(Point3::new(190.0, 90.0, 190.0), 90.0, glossy));
    world.add(glossy_sphere.clone());

    let mut lights = HittableList::new();
    lights.add(light_quad);
    lights.add(glossy_sphere);

    SceneDescription {
        name: "Cornell Box",
        world,
        lights,
        camera: CameraConfig {
            look_from: Point3::new(278.0, 278.0, -800.0),
            look_at: Point3::new(278.0, 278.0, 0.0),
            vup: Vec3::unit_y(),
            vfov_degrees: 40.0,
            aspect_ratio: 1.0,
            defocus_angle: 0.0,
            focus_dist: 10.0,
        },
        render: RenderConfig {
            width: 600,
            samples_per_pixel: 1000,
            max_depth: 50,
            background: Color::zero(),
            ..RenderConfig::default()
        },
    }
}

fn build_bubble() -> SceneDescription {
    let mut world = HittableList::new();

    let glass: Arc<dyn Material> = Arc::new(Dielectric::new(1.5));
    let shimmering: Arc<dyn Material> = Arc::new(Iridescent::new(glass, 0.6));
    world.add(Arc::new(Sphere::new(Point3::zero(), 2.0, shimmering)));

    SceneDescription {
        name: "Bubble",
        world,
        lights: HittableList::new(),
        camera: CameraConfig {
            look_from: Point3::new(0.0, 0.0, 12.0),
            look_at: Point3::zero(),
            vup: Vec3::unit_y(),
            vfov_degrees: 20.0,
            aspect_ratio: 16.0 / 9.0,
            defocus_angle: 0.0,
            focus_dist: 10.0,
        },
        render: RenderConfig {
            width: 600,
            samples_per_pixel: 100,
            max_depth: 50,
            background: Color::new(0.47, 0.57, 0.74),
            ..RenderConfig::default()
        },
    }
}

fn build_showcase() -> Option<SceneDescription> {
    let mut objects: Vec<Arc<dyn crate::hittable::Hittable>> = Vec::new();
    let mut rng = rand::thread_rng();

    let checker = Arc::new(CheckerTexture::from_colors(
        0.32,
        Color::new(0.2, 0.3, 0.1),
        Color::new(0.9, 0.9, 0.9),
    ));
    objects.push(Arc::new(Sphere::new(
        Point3::new(0.0, -1000.0, 0.0),
        1000.0,
        Arc::new(Lambertian::from_texture(checker)),
    )));

    for a in -11..11 {
        for b in -11..11 {
            let choose_mat: f64 = rng.gen();
            let center = Point3::new(
                a as f64 + 0.9 * rng.gen::<f64>(),
                0.2,
                b as f64 + 0.9 * rng.gen::<f64>(),
            );

            if (center - Point3::new(4.0, 0.2, 0.0)).length() <= 0.9 {
                continue;
            }

            if choose_mat < 0.8 {
                let albedo = Color::new(
                    rng.gen::<f64>() * rng.gen::<f64>(),
                    rng.gen::<f64>() * rng.gen::<f64>(),
                    rng.gen::<f64>() * rng.gen::<f64>(),
                );
                let center2 = center + Vec3::new(0.0, rng.gen_range(0.0..0.5), 0.0);
                objects.push(Arc::new(Sphere::moving(
                    center,
                    center2,
                    0.2,
                    Arc::new(Lambertian::new(albedo)),
                )));
            } else if choose_mat < 0.95 {
                let albedo = Color::new(
                    rng.gen_range(0.5..1.0),
                    rng.gen_range(0.5..1.0),
                    rng.gen_range(0.5..1.0),
                );
                let fuzz = rng.gen_range(0.0..0.5);
                objects.push(Arc::new(Sphere::new(
                    center,
                    0.2,
                    Arc::new(Metal::new(albedo, fuzz)),
                )));
            } else {
                objects.push(Arc::new(Sphere::new(
                    center,
                    0.2,
                    Arc::new(Dielectric::new(1.5)),
                )));
            }
        }
    }

    objects.push(Arc::new(Sphere::new(
        Point3::new(0.0, 1.0, 0.0),
        1.0,
        Arc::new(Dielectric::new(1.5)),
    )));
    objects.push(Arc::new(Sphere::new(
        Point3::new(-4.0, 1.0, 0.0),
        1.0,
        Arc::new(Lambertian::new(Color::new(0.4, 0.2, 0.1))),
    )));
    objects.push(Arc::new(Sphere::new(
        Point3::new(4.0, 1.0, 0.0),
        1.0,
        Arc::new(Metal::new(Color::new(0.7, 0.6, 0.5), 0.0)),
    )));

    let mut world = HittableList::new();
    world.add(Arc::new(BvhNode::build(objects)?));

    Some(SceneDescription {
        name: "Showcase",
        world,
        lights: HittableList::new(),
        camera: CameraConfig {
            look_from: Point3::new(13.0, 2.0, 3.0),
            look_at: Point3::zero(),
            vup: Vec3::unit_y(),
            vfov_degrees: 20.0,
            aspect_ratio: 16.0 / 9.0,
            defocus_angle: 0.6,
            focus_dist: 10.0,
        },
        render: RenderConfig {
            width: 400,
            samples_per_pixel: 100,
            max_depth: 50,
            background: Color::new(0.70, 0.80, 1.00),
            ..RenderConfig::default()
        },
    })
}

fn build_smoke() -> SceneDescription {
    let mut world = HittableList::new();

    let red: Arc<dyn Material> = Arc::new(Lambertian::new(Color::new(0.65, 0.05, 0.05)));
    let white: Arc<dyn Material> = Arc::new(Lambertian::new(Color::new(0.73, 0.73, 0.73)));
    let green: Arc<dyn Material> = Arc::new(Lambertian::new(Color::new(0.12, 0.45, 0.15)));
    let lamp: Arc<dyn Material> = Arc::new(DiffuseLight::new(Color::new(7.0, 7.0, 7.0)));

    world.add(Arc::new(Quad::new(
        Point3::new(555.0, 0.0, 0.0),
        Vec3::new(0.0, 555.0, 0.0),
        Vec3::new(0.0, 0.0, 555.0),
        green,
    )));
    world.add(Arc::new(Quad::new(
        Point3::zero(),
        Vec3::new(0.0, 555.0, 0.0),
        Vec3::new(0.0, 0.0, 555.0),
        red,
    )));
    let light_quad = Arc::new(Quad::new(
        Point3::new(113.0, 554.0, 127.0),
        Vec3::new(330.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, 305.0),
        lamp,
    ));
    world.add(light_quad.clone());
    world.add(Arc::new(Quad::new(
        Point3::new(0.0, 555.0, 0.0),
        Vec3::new(555.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, 555.0),
        white.clone(),
    )));
    world.add(Arc::new(Quad::new(
        Point3::zero(),
        Vec3::new(555.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, 555.0),
        white.clone(),
    )));
    world.add(Arc::new(Quad::new(
        Point3::new(0.0, 0.0, 555.0),
        Vec3::new(555.0, 0.0, 0.0),
        Vec3::new(0.0, 555.0, 0.0),
        white.clone(),
    )));

    let box1 = Arc::new(make_box(
        Point3::zero(),
        Point3::new(165.0, 330.0, 165.0),
        white.clone(),
    ));
    let box1 = Arc::new(RotateY::new(box1, 15.0));
    let box1 = Arc::new(Translate::new(box1, Vec3::new(265.0, 0.0, 295.0)));
    world.add(Arc::new(ConstantMedium::new(box1, 0.01, Color::zero())));

    let box2 = Arc::new(make_box(
        Point3::zero(),
        Point3::new(165.0, 165.0, 165.0),
        white,
    ));
    let box2 = Arc::new(RotateY::new(box2, -18.0));
    let box2 = Arc::new(Translate::new(box2, Vec3::new(130.0, 0.0, 65.0)));
    world.add(Arc::new(ConstantMedium::new(box2, 0.01, Color::ones())));

    let mut lights = HittableList::new();
    lights.add(light_quad);

    SceneDescription {
        name: "Cornell Smoke",
        world,
        lights,
        camera: CameraConfig {
            look_from: Point3::new(278.0, 278.0, -800.0),
            look_at: Point3::new(278.0, 278.0, 0.0),
            vup: Vec3::unit_y(),
            vfov_degrees: 40.0,
            aspect_ratio: 1.0,
            defocus_angle: 0.0,
            focus_dist: 10.0,
        },
        render: RenderConfig {
            width: 600,
            samples_per_pixel: 200,
            max_depth: 50,
            background: Color::zero(),
            ..RenderConfig::default()
        },
    }
}

fn build_gallery() -> SceneDescription {
    let mut world = HittableList::new();
    let mut rng = rand::thread_rng();

    // Dirt ground with turbulent marble veins
    let dirt = Arc::new(NoiseTexture::new(1.0, Color::new(0.4, 0.2, 0.1), &mut rng));
    world.add(Arc::new(Quad::new(
        Point3::new(-10.0, 0.0, -10.0),
        Vec3::new(20.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, 20.0),
        Arc::new(Lambertian::from_texture(dirt)),
    )));

    // Textured globe; degrades to the fallback color without the asset.
    let earth = Arc::new(ImageTexture::load("earthmap.jpg"));
    world.add(Arc::new(Sphere::new(
        Point3::new(0.0, 1.5, -2.5),
        1.5,
        Arc::new(Lambertian::from_texture(earth)),
    )));

    // Brushed-gold GGX sphere
    world.add(Arc::new(Sphere::new(
        Point3::new(-2.8, 1.0, 0.5),
        1.0,
        Arc::new(Glossy::new(Color::new(0.85, 0.65, 0.13), 0.4, 1.0)),
    )));

    // Iridescent soap-film sphere
    let glass: Arc<dyn Material> = Arc::new(Dielectric::new(1.5));
    world.add(Arc::new(Sphere::new(
        Point3::new(0.2, 0.8, 1.2),
        0.8,
        Arc::new(Iridescent::new(glass, 0.7)),
    )));

    // A matte tetrahedron built from triangles
    let blue: Arc<dyn Material> = Arc::new(Lambertian::new(Color::new(0.1, 0.3, 0.8)));
    let base_a = Point3::new(2.0, 0.0, 0.3);
    let base_b = Point3::new(3.6, 0.0, 0.8);
    let base_c = Point3::new(2.6, 0.0, 1.9);
    let apex = Point3::new(2.7, 1.8, 1.0);
    world.add(Arc::new(Triangle::new(base_a, base_b, apex, blue.clone())));
    world.add(Arc::new(Triangle::new(base_b, base_c, apex, blue.clone())));
    world.add(Arc::new(Triangle::new(base_c, base_a, apex, blue)));

    // Key light
    let lamp: Arc<dyn Material> = Arc::new(DiffuseLight::new(Color::new(7.0, 7.0, 7.0)));
    let light_sphere = Arc::new(Sphere::new(Point3::new(6.0, 10.0, 3.0), 5.0, lamp));
    world.add(light_sphere.clone());

    let mut lights = HittableList::new();
    lights.add(light_sphere);

    SceneDescription {
        name: "Gallery",
        world,
        lights,
        camera: CameraConfig {
            look_from: Point3::new(0.0, 4.0, 15.0),
            look_at: Point3::new(0.0, 1.5, 0.0),
            vup: Vec3::unit_y(),
            vfov_degrees: 30.0,
            aspect_ratio: 16.0 / 9.0,
            defocus_angle: 0.0,
            focus_dist: 10.0,
        },
        render: RenderConfig {
            width: 600,
            samples_per_pixel: 100,
            max_depth: 50,
            background: Color::new(0.70, 0.80, 1.00),
            ..RenderConfig::default()
        },
    }
}

fn build_sdf() -> SceneDescription {
    let mut world = HittableList::new();

    world.add(Arc::new(Sphere::new(
        Point3::new(0.0, -1000.0, 0.0),
        1000.0,
        Arc::new(Lambertian::new(Color::new(0.45, 0.45, 0.5))),
    )));

    // Three blobs close enough for the smooth-min to weld them together.
    let mut group = SdfGroup::new();
    group.add(SdfSphere::new(
        Point3::new(-0.9, 0.8, 0.0),
        0.8,
        Arc::new(Lambertian::new(Color::new(0.8, 0.25, 0.2))),
    ));
    group.add(SdfSphere::new(
        Point3::new(0.0, 1.3, 0.3),
        0.7,
        Arc::new(Lambertian::new(Color::new(0.9, 0.6, 0.2))),
    ));
    group.add(SdfSphere::new(
        Point3::new(0.9, 0.8, 0.0),
        0.8,
        Arc::new(Lambertian::new(Color::new(0.25, 0.3, 0.8))),
    ));
    world.add(Arc::new(group));

    let lamp: Arc<dyn Material> = Arc::new(DiffuseLight::new(Color::new(10.0, 10.0, 10.0)));
    let light_sphere = Arc::new(Sphere::new(Point3::new(3.0, 5.0, 3.0), 1.0, lamp));
    world.add(light_sphere.clone());

    let mut lights = HittableList::new();
    lights.add(light_sphere);

    SceneDescription {
        name: "SDF Blobs",
        world,
        lights,
        camera: CameraConfig {
            look_from: Point3::new(0.0, 2.0, 6.0),
            look_at: Point3::new(0.0, 0.9, 0.0),
            vup: Vec3::unit_y(),
            vfov_degrees: 40.0,
            aspect_ratio: 16.0 / 9.0,
            defocus_angle: 0.0,
            focus_dist: 10.0,
        },
        render: RenderConfig {
            width: 400,
            samples_per_pixel: 100,
            max_depth: 50,
            background: Color::new(0.02, 0.02, 0.05),
            ..RenderConfig::default()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_preset_is_constructible() {
        for preset in [
            ScenePreset::Simple,
            ScenePreset::Cornell,
            ScenePreset::Bubble,
            ScenePreset::Showcase,
            ScenePreset::Smoke,
            ScenePreset::Gallery,
            ScenePreset::Sdf,
        ] {
            let scene = preset.build().expect("preset must construct");
            assert!(!scene.world.is_empty());
            assert!(scene.render.width > 0);
        }
    }

    #[test]
    fn bubble_has_no_sampling_targets() {
        let scene = ScenePreset::Bubble.build().unwrap();
        assert!(scene.lights.is_empty());
    }

    #[test]
    fn cornell_samples_light_and_glossy_sphere() {
        let scene = ScenePreset::Cornell.build().unwrap();
        assert_eq!(scene.lights.objects.len(), 2);
    }
}
