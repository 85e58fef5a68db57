use crate::camera::Camera;
use crate::hittable::{Hittable, HittableList};
use crate::material::Scatter;
use crate::math::*;
use crate::pdf::{HittablePdf, MixturePdf, Pdf};
use crossterm::style::{self, Stylize};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::io::{self, Write};
use std::sync::atomic::{AtomicUsize, Ordering};

// ─── Render Configuration ───────────────────────────────────────────────────

pub struct RenderConfig {
    pub width: u32,
    pub samples_per_pixel: u32,
    pub max_depth: u32,
    /// Radiance returned for rays that leave the scene.
    pub background: Color,
    /// Ratio-preserving luminance clamp on scattered radiance. Disable for an
    /// unbiased estimate at the cost of fireflies.
    pub firefly_clamp: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 400,
            samples_per_pixel: 100,
            max_depth: 50,
            background: Color::zero(),
            firefly_clamp: true,
        }
    }
}

// ─── Framebuffer ────────────────────────────────────────────────────────────

pub struct Framebuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl Framebuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::zero(); (width * height) as usize],
        }
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[(y * self.width + x) as usize]
    }

    /// Writes the image as plain PPM (P3): ASCII header followed by one
    /// whitespace-separated RGB triple per pixel, emitted in row-major order.
    pub fn write_ppm(&self, out: &mut dyn Write) -> io::Result<()> {
        write!(out, "P3\n{} {}\n255\n", self.width, self.height)?;
        for pixel in &self.pixels {
            writeln!(
                out,
                "{} {} {}",
                radiance_to_byte(pixel.x),
                radiance_to_byte(pixel.y),
                radiance_to_byte(pixel.z)
            )?;
        }
        out.flush()
    }
}

/// Radiance-to-byte encoding pipeline: NaN scrub, clamp to [0, 0.999],
/// gamma 2 (√x), then ⌊256·x⌋ quantization.
pub fn radiance_to_byte(component: f64) -> u8 {
    let x = if component.is_nan() { 0.0 } else { component };
    let x = x.clamp(0.0, 0.999);
    (256.0 * x.sqrt()) as u8
}

/// Ratio-preserving luminance clamp: radiance whose largest channel exceeds
/// `MAX_RADIANCE` is scaled down uniformly, suppressing fireflies while
/// keeping hue. Idempotent.
pub fn clamp_radiance(color: Color) -> Color {
    const MAX_RADIANCE: f64 = 0.6;
    let max_component = color.max_component();
    if max_component > MAX_RADIANCE {
        color * (MAX_RADIANCE / max_component)
    } else {
        color
    }
}

// ─── Path Tracer Integrator ─────────────────────────────────────────────────

/// Monte Carlo path tracing integrator solving the rendering equation:
///   L_o(p, ω_o) = L_e(p, ω_o) + ∫_Ω f_r(p, ω_i, ω_o) · L_i(p, ω_i) · |cos θ_i| dω_i
/// by mixture importance sampling between emitter and material distributions,
/// with Russian-roulette termination after the first three bounces.
pub struct PathTracer<'a> {
    pub world: &'a dyn Hittable,
    /// Emitter-sampling targets; may be empty, in which case paths fall back
    /// to pure material sampling.
    pub lights: &'a HittableList,
    pub camera: &'a Camera,
    pub config: &'a RenderConfig,
}

impl<'a> PathTracer<'a> {
    /// Traces a single ray recursively through the scene, accumulating
    /// radiance from emissive surfaces and scattered light.
    pub fn ray_color(&self, ray: &Ray, depth: u32, rng: &mut SmallRng) -> Color {
        if depth == 0 {
            return Color::zero();
        }

        // t_min = 0.001 prevents shadow acne caused by floating-point self-intersection
        let Some(rec) = self.world.hit(ray, Interval::new(0.001, f64::INFINITY)) else {
            return self.config.background;
        };

        let emitted = rec.material.emitted(ray, &rec);

        let Some(srec) = rec.material.scatter(ray, &rec, rng) else {
            return emitted;
        };

        match srec.kind {
            // Delta lobes carry no density: follow the fixed ray, no roulette.
            Scatter::Specular(specular_ray) => srec
                .attenuation
                .hadamard(self.ray_color(&specular_ray, depth - 1, rng)),

            Scatter::Sampled(material_pdf) => {
                let mix_lights = rec.material.use_light_sampling() && !self.lights.is_empty();

                let (scattered, pdf_value) = if mix_lights {
                    let light_pdf = HittablePdf::new(self.lights, rec.point);
                    let mixture = MixturePdf::new(&light_pdf, material_pdf.as_ref());
                    let direction = mixture.generate(rng);
                    let scattered = Ray::with_time(rec.point, direction, ray.time);
                    (scattered, mixture.value(direction))
                } else {
                    let direction = material_pdf.generate(rng);
                    let scattered = Ray::with_time(rec.point, direction, ray.time);
                    (scattered, material_pdf.value(direction))
                };

                let brdf = rec.material.eval_brdf(ray, &rec, &scattered);
                let sample_color = self.ray_color(&scattered, depth - 1, rng);

                let mut scatter_color = brdf.hadamard(sample_color) / pdf_value;
                if self.config.firefly_clamp {
                    scatter_color = clamp_radiance(scatter_color);
                }

                // Russian roulette keyed on the BRDF magnitude. The first
                // three bounces always continue; the clamp above is applied
                // before the 1/q correction.
                let q = brdf.max_component();
                if depth + 3 > self.config.max_depth {
                    emitted + scatter_color
                } else if rng.gen::<f64>() < q {
                    emitted + scatter_color / q
                } else {
                    Color::zero()
                }
            }
        }
    }

    /// Renders the full image: rows are partitioned into one contiguous chunk
    /// per hardware thread, each worker owns its accumulator cells outright,
    /// and an atomic counter drives the scanline countdown on stderr. After
    /// the join, accumulated radiance is scaled to a per-sample average.
    pub fn render(&self) -> Framebuffer {
        let width = self.camera.width() as usize;
        let height = self.camera.height() as usize;
        let sqrt_spp = self.camera.sqrt_spp();

        let mut pixels = vec![Color::zero(); width * height];
        let workers = rayon::current_num_threads().max(1);
        let chunk_rows = height.div_ceil(workers);
        let completed = AtomicUsize::new(0);

        pixels
            .par_chunks_mut(chunk_rows * width)
            .enumerate()
            .for_each(|(chunk_index, chunk)| {
                let mut rng = SmallRng::from_entropy();
                let first_row = chunk_index * chunk_rows;

                for (row_offset, row) in chunk.chunks_mut(width).enumerate() {
                    let j = (first_row + row_offset) as u32;
                    for (i, pixel) in row.iter_mut().enumerate() {
                        let mut color = Color::zero();
                        for s_i in 0..sqrt_spp {
                            for s_j in 0..sqrt_spp {
                                let ray = self.camera.get_ray(i as u32, j, s_i, s_j, &mut rng);
                                color += self.ray_color(&ray, self.config.max_depth, &mut rng);
                            }
                        }
                        *pixel = color;
                    }

                    let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                    eprint!("\rScanlines remaining: {} ", height - done);
                }
            });

        eprintln!("\rDone.                 ");

        let scale = self.camera.pixel_samples_scale();
        for pixel in &mut pixels {
            *pixel *= scale;
        }

        Framebuffer {
            width: width as u32,
            height: height as u32,
            pixels,
        }
    }
}

// ─── Terminal Preview ───────────────────────────────────────────────────────

/// Half-block preview of the framebuffer: each character cell shows two
/// vertically stacked pixels via fg/bg true-color. Runs through the same
/// byte encoding as the PPM output so the preview matches the file.
pub fn preview_framebuffer(fb: &Framebuffer, out: &mut impl Write) {
    let to_rgb = |c: Color| style::Color::Rgb {
        r: radiance_to_byte(c.x),
        g: radiance_to_byte(c.y),
        b: radiance_to_byte(c.z),
    };

    let rows = fb.height / 2;
    for row in 0..rows {
        for x in 0..fb.width {
            let top = to_rgb(fb.get(x, row * 2));
            let bottom = to_rgb(fb.get(x, row * 2 + 1));
            let _ = write!(out, "{}", "▀".with(top).on(bottom));
        }
        let _ = writeln!(out);
    }
    let _ = out.flush();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::CameraConfig;
    use crate::hittable::Sphere;
    use crate::material::{DiffuseLight, Lambertian};
    use std::sync::Arc;

    fn sphere_world() -> HittableList {
        let mut world = HittableList::new();
        world.add(Arc::new(Sphere::new(
            Point3::new(0.0, -1000.0, 0.0),
            1000.0,
            Arc::new(Lambertian::new(Color::new(0.5, 0.5, 0.5))),
        )));
        world.add(Arc::new(Sphere::new(
            Point3::new(0.0, 1.0, 0.0),
            1.0,
            Arc::new(Lambertian::new(Color::new(0.8, 0.3, 0.3))),
        )));
        world
    }

    fn small_render(world: &HittableList, lights: &HittableList, max_depth: u32) -> Framebuffer {
        let render = RenderConfig {
            width: 8,
            samples_per_pixel: 4,
            max_depth,
            background: Color::new(0.2, 0.2, 0.2),
            firefly_clamp: true,
        };
        let camera_config = CameraConfig {
            look_from: Point3::new(0.0, 2.0, 8.0),
            look_at: Point3::new(0.0, 1.0, 0.0),
            aspect_ratio: 1.0,
            ..CameraConfig::default()
        };
        let camera = Camera::new(&camera_config, &render);
        let tracer = PathTracer {
            world,
            lights,
            camera: &camera,
            config: &render,
        };
        tracer.render()
    }

    #[test]
    fn byte_encoder_anchors() {
        assert_eq!(radiance_to_byte(f64::NAN), 0);
        assert_eq!(radiance_to_byte(-2.0), 0);
        assert_eq!(radiance_to_byte(0.0), 0);
        assert_eq!(radiance_to_byte(0.25), 128); // √0.25 = 0.5 → 128
        assert_eq!(radiance_to_byte(1.0), 255); // clamped below 1 before γ
        assert_eq!(radiance_to_byte(1000.0), 255);
    }

    #[test]
    fn luminance_clamp_is_idempotent_and_hue_preserving() {
        let bright = Color::new(3.0, 1.5, 0.6);
        let once = clamp_radiance(bright);
        let twice = clamp_radiance(once);
        assert!((once - twice).length() < 1e-12);
        assert!((once.max_component() - 0.6).abs() < 1e-12);
        // Channel ratios survive the clamp.
        assert!((once.x / once.y - bright.x / bright.y).abs() < 1e-12);

        let dim = Color::new(0.1, 0.2, 0.3);
        assert_eq!(clamp_radiance(dim), dim);
    }

    #[test]
    fn ppm_header_and_row_major_payload() {
        let mut fb = Framebuffer::new(2, 1);
        fb.pixels[0] = Color::new(1.0, 0.0, 0.0);
        fb.pixels[1] = Color::new(0.0, 0.25, 0.0);
        let mut out = Vec::new();
        fb.write_ppm(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "P3\n2 1\n255\n255 0 0\n0 128 0\n");
    }

    #[test]
    fn zero_depth_gathers_no_light() {
        let world = sphere_world();
        let lights = HittableList::new();
        let fb = small_render(&world, &lights, 0);
        assert!(fb.pixels.iter().all(|p| *p == Color::zero()));
    }

    #[test]
    fn miss_returns_the_configured_background() {
        let world = sphere_world();
        let lights = HittableList::new();
        let render = RenderConfig {
            width: 8,
            samples_per_pixel: 1,
            background: Color::new(0.47, 0.57, 0.74),
            ..RenderConfig::default()
        };
        let camera_config = CameraConfig {
            look_from: Point3::new(0.0, 2.0, 8.0),
            look_at: Point3::new(0.0, 1.0, 0.0),
            ..CameraConfig::default()
        };
        let camera = Camera::new(&camera_config, &render);
        let tracer = PathTracer {
            world: &world,
            lights: &lights,
            camera: &camera,
            config: &render,
        };
        // A ray pointing straight up hits nothing.
        let mut rng = SmallRng::seed_from_u64(13);
        let up = Ray::new(Point3::new(0.0, 5.0, 8.0), Vec3::unit_y());
        assert_eq!(
            tracer.ray_color(&up, 10, &mut rng),
            Color::new(0.47, 0.57, 0.74)
        );
    }

    #[test]
    fn empty_lights_with_diffuse_world_stays_finite() {
        let world = sphere_world();
        let lights = HittableList::new();
        let fb = small_render(&world, &lights, 6);
        for pixel in &fb.pixels {
            for channel in [pixel.x, pixel.y, pixel.z] {
                assert!(channel.is_finite());
                assert!(channel >= 0.0);
            }
        }
    }

    #[test]
    fn emitter_mixture_render_stays_finite() {
        let mut world = sphere_world();
        let lamp = Arc::new(Sphere::new(
            Point3::new(-2.0, 4.0, 2.0),
            1.0,
            Arc::new(DiffuseLight::new(Color::new(15.0, 15.0, 13.0))),
        ));
        world.add(lamp.clone());
        let mut lights = HittableList::new();
        lights.add(lamp);

        let fb = small_render(&world, &lights, 6);
        for pixel in &fb.pixels {
            for channel in [pixel.x, pixel.y, pixel.z] {
                assert!(channel.is_finite());
                assert!(channel >= 0.0);
            }
        }
    }
}
