use crate::hittable::Hittable;
use crate::math::{Onb, Point3, Vec3};
use rand::Rng;
use std::f64::consts::PI;

/// A probability distribution over world-space directions, with densities
/// measured per solid angle. `generate` draws a direction, `value` reports the
/// density of an arbitrary direction under the same distribution — the pair
/// the integrator needs for importance-sampled Monte Carlo estimates.
pub trait Pdf {
    fn value(&self, direction: Vec3) -> f64;
    fn generate(&self, rng: &mut dyn rand::RngCore) -> Vec3;
}

// ─── Uniform Sphere ─────────────────────────────────────────────────────────

/// Uniform over all directions: density 1/4π everywhere. The sampling
/// distribution of the isotropic phase function.
pub struct SpherePdf;

impl Pdf for SpherePdf {
    fn value(&self, _direction: Vec3) -> f64 {
        1.0 / (4.0 * PI)
    }

    fn generate(&self, rng: &mut dyn rand::RngCore) -> Vec3 {
        Vec3::random_unit_vector(rng)
    }
}

// ─── Cosine Hemisphere ──────────────────────────────────────────────────────

/// Cosine-weighted hemisphere around a surface normal: density
/// max(0, cos θ)/π. Matches the Lambertian BRDF exactly, so the ratio
/// f/p is constant for diffuse surfaces.
pub struct CosinePdf {
    uvw: Onb,
}

impl CosinePdf {
    pub fn new(normal: Vec3) -> Self {
        Self {
            uvw: Onb::new(normal),
        }
    }
}

impl Pdf for CosinePdf {
    fn value(&self, direction: Vec3) -> f64 {
        let cos_theta = direction.normalized().dot(self.uvw.w());
        (cos_theta / PI).max(0.0)
    }

    fn generate(&self, rng: &mut dyn rand::RngCore) -> Vec3 {
        self.uvw.world(Vec3::random_cosine_direction(rng))
    }
}

// ─── GGX Visible-Normal Distribution ────────────────────────────────────────

/// GGX normal distribution function with anisotropic roughness:
/// D(h) = 1 / (π αx αy ((hx/αx)² + (hy/αy)² + hz²)²), h in the local frame.
pub fn ggx_d(h: Vec3, alpha_x: f64, alpha_y: f64) -> f64 {
    let x_scale = (h.x * h.x) / (alpha_x * alpha_x);
    let y_scale = (h.y * h.y) / (alpha_y * alpha_y);
    let z_scale = h.z * h.z;

    let xyz_sq = (x_scale + y_scale + z_scale) * (x_scale + y_scale + z_scale);
    1.0 / (PI * alpha_x * alpha_y * xyz_sq)
}

/// Smith masking term G1(v) = 1/(1 + Λ(v)) with
/// Λ(v) = (-1 + √(1 + (αx²vx² + αy²vy²)/vz²)) / 2; zero below the horizon.
pub fn smith_g1(v: Vec3, alpha_x: f64, alpha_y: f64) -> f64 {
    if v.z <= 0.0 {
        return 0.0;
    }

    let term = (alpha_x * alpha_x * v.x * v.x + alpha_y * alpha_y * v.y * v.y) / (v.z * v.z);
    let lambda = (-1.0 + (1.0 + term).sqrt()) / 2.0;
    1.0 / (1.0 + lambda)
}

/// Visible-normal sampling of the GGX distribution (Heitz 2018). Half-vectors
/// are drawn proportionally to the microfacet area visible from the incoming
/// direction, then mirrored into outgoing directions.
pub struct GgxPdf {
    uvw: Onb,
    wi_local: Vec3,
    alpha_x: f64,
    alpha_y: f64,
}

impl GgxPdf {
    /// `incoming` is the ray direction (pointing toward the surface); it is
    /// negated into the outgoing view direction before the frame change.
    pub fn new(normal: Vec3, incoming: Vec3, alpha_x: f64, alpha_y: f64) -> Self {
        let uvw = Onb::new(normal);
        let wi_local = uvw.local((-incoming).normalized());
        Self {
            uvw,
            wi_local,
            alpha_x,
            alpha_y,
        }
    }

    fn sample_vndf(&self, r1: f64, r2: f64) -> Vec3 {
        // Stretch the view direction into the hemisphere configuration.
        let vh = Vec3::new(
            self.alpha_x * self.wi_local.x,
            self.alpha_y * self.wi_local.y,
            self.wi_local.z,
        )
        .normalized();

        // Orthonormal frame around Vh, with a fallback when Vh is the pole.
        let lensq = vh.x * vh.x + vh.y * vh.y;
        let t1 = if lensq > 0.0 {
            Vec3::new(-vh.y, vh.x, 0.0) / lensq.sqrt()
        } else {
            Vec3::unit_x()
        };
        let t2 = vh.cross(t1);

        // Parameterize the projected area of the visible hemisphere.
        let r = r1.sqrt();
        let phi = 2.0 * PI * r2;
        let p1 = r * phi.cos();
        let mut p2 = r * phi.sin();
        let s = 0.5 * (1.0 + vh.z);
        p2 = (1.0 - s) * (1.0 - p1 * p1).max(0.0).sqrt() + s * p2;

        // Reproject onto the hemisphere and unstretch back to the ellipsoid.
        let nh = t1 * p1 + t2 * p2 + vh * (1.0 - p1 * p1 - p2 * p2).max(0.0).sqrt();
        Vec3::new(
            self.alpha_x * nh.x,
            self.alpha_y * nh.y,
            nh.z.max(0.0),
        )
        .normalized()
    }
}

impl Pdf for GgxPdf {
    fn value(&self, direction: Vec3) -> f64 {
        let wo_local = self.uvw.local(direction.normalized());
        let h_local = (wo_local + self.wi_local).normalized();
        let wi_dot_h = self.wi_local.dot(h_local);

        let d = ggx_d(h_local, self.alpha_x, self.alpha_y);
        let g1 = smith_g1(self.wi_local, self.alpha_x, self.alpha_y);

        (d * g1 / (4.0 * wi_dot_h * wi_dot_h)).max(0.0)
    }

    fn generate(&self, rng: &mut dyn rand::RngCore) -> Vec3 {
        let h_local = self.sample_vndf(rng.gen(), rng.gen());
        let wo_local = h_local * (2.0 * self.wi_local.dot(h_local)) - self.wi_local;
        self.uvw.world(wo_local)
    }
}

// ─── Emitter Delegate ───────────────────────────────────────────────────────

/// Adapts a hittable's emitter-sampling queries to the PDF interface, anchored
/// at a shading point.
pub struct HittablePdf<'a> {
    object: &'a dyn Hittable,
    origin: Point3,
}

impl<'a> HittablePdf<'a> {
    pub fn new(object: &'a dyn Hittable, origin: Point3) -> Self {
        Self { object, origin }
    }
}

impl Pdf for HittablePdf<'_> {
    fn value(&self, direction: Vec3) -> f64 {
        self.object.pdf_value(self.origin, direction)
    }

    fn generate(&self, rng: &mut dyn rand::RngCore) -> Vec3 {
        self.object.random(self.origin, rng)
    }
}

// ─── 50/50 Mixture ──────────────────────────────────────────────────────────

/// Equal-weight mixture of two distributions — the multiple-importance
/// combination of emitter and material sampling.
pub struct MixturePdf<'a> {
    p0: &'a dyn Pdf,
    p1: &'a dyn Pdf,
}

impl<'a> MixturePdf<'a> {
    pub fn new(p0: &'a dyn Pdf, p1: &'a dyn Pdf) -> Self {
        Self { p0, p1 }
    }
}

impl Pdf for MixturePdf<'_> {
    fn value(&self, direction: Vec3) -> f64 {
        0.5 * self.p0.value(direction) + 0.5 * self.p1.value(direction)
    }

    fn generate(&self, rng: &mut dyn rand::RngCore) -> Vec3 {
        if rng.gen::<f64>() < 0.5 {
            self.p0.generate(rng)
        } else {
            self.p1.generate(rng)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hittable::Sphere;
    use crate::material::Lambertian;
    use crate::math::Color;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    /// Monte Carlo estimate of ∫ pdf.value(ω) dω over the full sphere of
    /// directions using uniform sampling.
    fn integrate_over_sphere(pdf: &dyn Pdf, samples: u32, rng: &mut SmallRng) -> f64 {
        let mut sum = 0.0;
        for _ in 0..samples {
            let dir = Vec3::random_unit_vector(rng);
            sum += pdf.value(dir) * 4.0 * PI;
        }
        sum / samples as f64
    }

    #[test]
    fn cosine_pdf_integrates_to_one() {
        let mut rng = SmallRng::seed_from_u64(42);
        let pdf = CosinePdf::new(Vec3::new(0.3, 0.8, -0.5));
        let integral = integrate_over_sphere(&pdf, 1_000_000, &mut rng);
        assert!((integral - 1.0).abs() < 0.01, "integral = {integral}");
    }

    #[test]
    fn mixture_pdf_integrates_to_one() {
        let mut rng = SmallRng::seed_from_u64(43);
        let cosine = CosinePdf::new(Vec3::unit_y());
        let uniform = SpherePdf;
        let mixture = MixturePdf::new(&cosine, &uniform);
        let integral = integrate_over_sphere(&mixture, 1_000_000, &mut rng);
        assert!((integral - 1.0).abs() < 0.01, "integral = {integral}");
    }

    #[test]
    fn emitter_pdf_integrates_to_one() {
        let mut rng = SmallRng::seed_from_u64(44);
        let sphere = Sphere::new(
            Point3::new(0.0, 0.0, -2.0),
            1.0,
            Arc::new(Lambertian::new(Color::ones())),
        );
        let pdf = HittablePdf::new(&sphere, Point3::zero());
        let integral = integrate_over_sphere(&pdf, 1_000_000, &mut rng);
        assert!((integral - 1.0).abs() < 0.02, "integral = {integral}");
    }

    #[test]
    fn cosine_pdf_vanishes_below_horizon() {
        let pdf = CosinePdf::new(Vec3::unit_y());
        assert_eq!(pdf.value(Vec3::new(0.0, -1.0, 0.0)), 0.0);
        assert!(pdf.value(Vec3::unit_y()) > 0.0);
    }

    #[test]
    fn sphere_pdf_is_uniform() {
        let mut rng = SmallRng::seed_from_u64(45);
        let pdf = SpherePdf;
        for _ in 0..100 {
            let dir = pdf.generate(&mut rng);
            assert!((pdf.value(dir) - 1.0 / (4.0 * PI)).abs() < 1e-12);
        }
    }

    #[test]
    fn mixture_value_is_average_of_components() {
        let cosine = CosinePdf::new(Vec3::unit_y());
        let uniform = SpherePdf;
        let mixture = MixturePdf::new(&cosine, &uniform);
        let dir = Vec3::new(0.2, 0.9, 0.1).normalized();
        let expected = 0.5 * cosine.value(dir) + 0.5 * uniform.value(dir);
        assert!((mixture.value(dir) - expected).abs() < 1e-12);
    }

    #[test]
    fn generated_directions_have_positive_density() {
        let mut rng = SmallRng::seed_from_u64(46);
        let incoming = Vec3::new(0.4, -0.7, 0.1).normalized();
        let pdfs: Vec<Box<dyn Pdf>> = vec![
            Box::new(SpherePdf),
            Box::new(CosinePdf::new(Vec3::unit_y())),
            Box::new(GgxPdf::new(Vec3::unit_y(), incoming, 0.09, 0.09)),
        ];
        for pdf in &pdfs {
            for _ in 0..200 {
                let dir = pdf.generate(&mut rng);
                assert!(pdf.value(dir) > 0.0);
            }
        }
    }

    #[test]
    fn smooth_ggx_collapses_to_mirror_direction() {
        let mut rng = SmallRng::seed_from_u64(47);
        let normal = Vec3::unit_y();
        let incoming = Vec3::new(1.0, -1.0, 0.0).normalized();
        let mirror = incoming.reflect(normal).normalized();

        let alpha = 1e-4;
        let pdf = GgxPdf::new(normal, incoming, alpha, alpha);
        for _ in 0..100 {
            let wo = pdf.generate(&mut rng).normalized();
            assert!(wo.dot(mirror) > 0.999, "sampled {wo} vs mirror {mirror}");
        }
    }

    #[test]
    fn ggx_masking_vanishes_below_horizon() {
        assert_eq!(smith_g1(Vec3::new(0.3, 0.2, -0.1), 0.5, 0.5), 0.0);
        assert!((smith_g1(Vec3::unit_z(), 0.5, 0.5) - 1.0).abs() < 1e-12);
    }
}
