use crate::math::{Color, Interval, Point3, Vec3};
use image::RgbImage;
use rand::seq::SliceRandom;
use rand::Rng;
use std::path::Path;
use std::sync::Arc;

/// Spatially varying surface albedo, looked up by surface parameters `(u, v)`
/// and the world-space hit point.
pub trait Texture: Send + Sync {
    fn value(&self, u: f64, v: f64, p: Point3) -> Color;
}

// ─── Solid Color ────────────────────────────────────────────────────────────

pub struct SolidColor {
    albedo: Color,
}

impl SolidColor {
    pub const fn new(albedo: Color) -> Self {
        Self { albedo }
    }
}

impl Texture for SolidColor {
    fn value(&self, _u: f64, _v: f64, _p: Point3) -> Color {
        self.albedo
    }
}

// ─── Checker ────────────────────────────────────────────────────────────────

/// 3-D checker pattern: the parity of the integer lattice cell containing the
/// hit point selects between the two component textures.
pub struct CheckerTexture {
    inv_scale: f64,
    even: Arc<dyn Texture>,
    odd: Arc<dyn Texture>,
}

impl CheckerTexture {
    pub fn new(scale: f64, even: Arc<dyn Texture>, odd: Arc<dyn Texture>) -> Self {
        Self {
            inv_scale: 1.0 / scale,
            even,
            odd,
        }
    }

    pub fn from_colors(scale: f64, even: Color, odd: Color) -> Self {
        Self::new(
            scale,
            Arc::new(SolidColor::new(even)),
            Arc::new(SolidColor::new(odd)),
        )
    }
}

impl Texture for CheckerTexture {
    fn value(&self, u: f64, v: f64, p: Point3) -> Color {
        let x = (self.inv_scale * p.x).floor() as i64;
        let y = (self.inv_scale * p.y).floor() as i64;
        let z = (self.inv_scale * p.z).floor() as i64;

        if (x + y + z) % 2 == 0 {
            self.even.value(u, v, p)
        } else {
            self.odd.value(u, v, p)
        }
    }
}

// ─── Image ──────────────────────────────────────────────────────────────────

/// Texture backed by a decoded RGB image, nearest-neighbor lookup. Decoding is
/// a collaborator concern: a missing or unreadable file degrades to a loud
/// fallback color instead of failing the render.
pub struct ImageTexture {
    image: Option<RgbImage>,
}

impl ImageTexture {
    const FALLBACK: Color = Color::new(0.0, 1.0, 1.0);

    pub fn load(path: impl AsRef<Path>) -> Self {
        let image = match image::open(path.as_ref()) {
            Ok(img) => Some(img.to_rgb8()),
            Err(err) => {
                eprintln!(
                    "warning: could not load texture {}: {err}",
                    path.as_ref().display()
                );
                None
            }
        };
        Self { image }
    }
}

impl Texture for ImageTexture {
    fn value(&self, u: f64, v: f64, _p: Point3) -> Color {
        let Some(image) = &self.image else {
            return Self::FALLBACK;
        };

        let u = Interval::new(0.0, 1.0).clamp(u);
        let v = 1.0 - Interval::new(0.0, 1.0).clamp(v); // image rows run top-down

        let x = ((u * image.width() as f64) as u32).min(image.width() - 1);
        let y = ((v * image.height() as f64) as u32).min(image.height() - 1);

        let [r, g, b] = image.get_pixel(x, y).0;
        const SCALE: f64 = 1.0 / 255.0;
        Color::new(r as f64 * SCALE, g as f64 * SCALE, b as f64 * SCALE)
    }
}

// ─── Perlin Noise ───────────────────────────────────────────────────────────

const POINT_COUNT: usize = 256;

/// Lattice gradient noise: a table of random unit gradients indexed through
/// three shuffled permutations, interpolated with a Hermite cubic.
pub struct Perlin {
    rand_vec: Vec<Vec3>,
    perm_x: Vec<usize>,
    perm_y: Vec<usize>,
    perm_z: Vec<usize>,
}

impl Perlin {
    pub fn new(rng: &mut dyn rand::RngCore) -> Self {
        let rand_vec = (0..POINT_COUNT)
            .map(|_| {
                Vec3::new(
                    rng.gen_range(-1.0..1.0),
                    rng.gen_range(-1.0..1.0),
                    rng.gen_range(-1.0..1.0),
                )
                .normalized()
            })
            .collect();

        Self {
            rand_vec,
            perm_x: Self::generate_perm(rng),
            perm_y: Self::generate_perm(rng),
            perm_z: Self::generate_perm(rng),
        }
    }

    fn generate_perm(rng: &mut dyn rand::RngCore) -> Vec<usize> {
        let mut perm: Vec<usize> = (0..POINT_COUNT).collect();
        perm.shuffle(rng);
        perm
    }

    /// Noise value in [-1, 1] at `p`.
    pub fn noise(&self, p: Point3) -> f64 {
        let u = p.x - p.x.floor();
        let v = p.y - p.y.floor();
        let w = p.z - p.z.floor();

        let i = p.x.floor() as i64;
        let j = p.y.floor() as i64;
        let k = p.z.floor() as i64;

        let mut c = [[[Vec3::zero(); 2]; 2]; 2];
        for (di, plane) in c.iter_mut().enumerate() {
            for (dj, row) in plane.iter_mut().enumerate() {
                for (dk, cell) in row.iter_mut().enumerate() {
                    let idx = self.perm_x[((i + di as i64) & 255) as usize]
                        ^ self.perm_y[((j + dj as i64) & 255) as usize]
                        ^ self.perm_z[((k + dk as i64) & 255) as usize];
                    *cell = self.rand_vec[idx];
                }
            }
        }

        Self::trilinear_interp(&c, u, v, w)
    }

    /// Sum of octaves of noise with halving amplitude — the classic turbulence
    /// used to perturb the marble phase.
    pub fn turbulence(&self, p: Point3, depth: u32) -> f64 {
        let mut accum = 0.0;
        let mut temp_p = p;
        let mut weight = 1.0;

        for _ in 0..depth {
            accum += weight * self.noise(temp_p);
            weight *= 0.5;
            temp_p *= 2.0;
        }

        accum.abs()
    }

    fn trilinear_interp(c: &[[[Vec3; 2]; 2]; 2], u: f64, v: f64, w: f64) -> f64 {
        // Hermite smoothing removes the lattice-aligned banding of raw trilinear.
        let uu = u * u * (3.0 - 2.0 * u);
        let vv = v * v * (3.0 - 2.0 * v);
        let ww = w * w * (3.0 - 2.0 * w);

        let mut accum = 0.0;
        for (i, plane) in c.iter().enumerate() {
            for (j, row) in plane.iter().enumerate() {
                for (k, cell) in row.iter().enumerate() {
                    let (fi, fj, fk) = (i as f64, j as f64, k as f64);
                    let weight = Vec3::new(u - fi, v - fj, w - fk);
                    accum += (fi * uu + (1.0 - fi) * (1.0 - uu))
                        * (fj * vv + (1.0 - fj) * (1.0 - vv))
                        * (fk * ww + (1.0 - fk) * (1.0 - ww))
                        * cell.dot(weight);
                }
            }
        }
        accum
    }
}

/// Marble-like procedural texture: a sine along z whose phase is perturbed by
/// turbulence, tinted by a base color.
pub struct NoiseTexture {
    perlin: Perlin,
    scale: f64,
    tint: Color,
}

impl NoiseTexture {
    pub fn new(scale: f64, tint: Color, rng: &mut dyn rand::RngCore) -> Self {
        Self {
            perlin: Perlin::new(rng),
            scale,
            tint,
        }
    }
}

impl Texture for NoiseTexture {
    fn value(&self, _u: f64, _v: f64, p: Point3) -> Color {
        let phase = self.scale * p.z + 10.0 * self.perlin.turbulence(p, 7);
        self.tint * 0.5 * (1.0 + phase.sin())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn solid_color_ignores_coordinates() {
        let tex = SolidColor::new(Color::new(0.2, 0.4, 0.6));
        assert_eq!(tex.value(0.0, 0.0, Point3::zero()), Color::new(0.2, 0.4, 0.6));
        assert_eq!(
            tex.value(0.9, 0.1, Point3::new(5.0, -3.0, 2.0)),
            Color::new(0.2, 0.4, 0.6)
        );
    }

    #[test]
    fn checker_alternates_between_cells() {
        let black = Color::zero();
        let white = Color::ones();
        let tex = CheckerTexture::from_colors(1.0, black, white);
        let a = tex.value(0.0, 0.0, Point3::new(0.5, 0.5, 0.5));
        let b = tex.value(0.0, 0.0, Point3::new(1.5, 0.5, 0.5));
        assert_eq!(a, black);
        assert_eq!(b, white);
    }

    #[test]
    fn missing_image_degrades_to_fallback() {
        let tex = ImageTexture::load("definitely/not/a/real/file.png");
        assert_eq!(tex.value(0.5, 0.5, Point3::zero()), ImageTexture::FALLBACK);
    }

    #[test]
    fn noise_is_bounded_and_repeatable() {
        let mut rng = SmallRng::seed_from_u64(3);
        let perlin = Perlin::new(&mut rng);
        let p = Point3::new(1.3, 2.7, -0.4);
        let n1 = perlin.noise(p);
        let n2 = perlin.noise(p);
        assert_eq!(n1, n2);
        assert!(n1.abs() <= 1.0);
        assert!(perlin.turbulence(p, 7) >= 0.0);
    }
}
