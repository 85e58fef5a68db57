use crate::hittable::HitRecord;
use crate::math::*;
use crate::pdf::{ggx_d, smith_g1, CosinePdf, GgxPdf, Pdf, SpherePdf};
use crate::texture::{SolidColor, Texture};
use rand::Rng;
use std::f64::consts::PI;
use std::sync::Arc;

// ─── Scatter Record ─────────────────────────────────────────────────────────

/// How a surface continues a light path after a hit.
pub struct ScatterRecord {
    pub attenuation: Color,
    pub kind: Scatter,
}

pub enum Scatter {
    /// Delta lobe (perfect mirror or refraction): the continuation ray is
    /// fixed and no density is defined, so the integrator follows it directly.
    Specular(Ray),
    /// Finite lobe importance-sampled through a direction PDF.
    Sampled(Box<dyn Pdf>),
}

// ─── Material Trait ─────────────────────────────────────────────────────────

/// The surface-response abstraction. Uses `&mut dyn rand::RngCore` for
/// dyn-compatibility, enabling heterogeneous material storage via trait objects.
///
/// `eval_brdf` is only consulted on `Sampled` paths; delta materials keep the
/// default. `use_light_sampling` opts a material out of emitter mixture
/// sampling when its own lobe is the better importance estimate.
pub trait Material: Send + Sync {
    fn emitted(&self, _ray: &Ray, _rec: &HitRecord) -> Color {
        Color::zero()
    }

    fn scatter(
        &self,
        _ray: &Ray,
        _rec: &HitRecord,
        _rng: &mut dyn rand::RngCore,
    ) -> Option<ScatterRecord> {
        None
    }

    fn scattering_pdf(&self, _ray: &Ray, _rec: &HitRecord, _scattered: &Ray) -> f64 {
        0.0
    }

    fn eval_brdf(&self, _ray: &Ray, _rec: &HitRecord, _scattered: &Ray) -> Color {
        Color::zero()
    }

    fn use_light_sampling(&self) -> bool {
        true
    }
}

// ─── Lambertian (Diffuse) ───────────────────────────────────────────────────

pub struct Lambertian {
    tex: Arc<dyn Texture>,
}

impl Lambertian {
    pub fn new(albedo: Color) -> Self {
        Self {
            tex: Arc::new(SolidColor::new(albedo)),
        }
    }

    pub fn from_texture(tex: Arc<dyn Texture>) -> Self {
        Self { tex }
    }
}

impl Material for Lambertian {
    fn scatter(
        &self,
        _ray: &Ray,
        rec: &HitRecord,
        _rng: &mut dyn rand::RngCore,
    ) -> Option<ScatterRecord> {
        Some(ScatterRecord {
            attenuation: self.tex.value(rec.u, rec.v, rec.point),
            kind: Scatter::Sampled(Box::new(CosinePdf::new(rec.normal))),
        })
    }

    fn scattering_pdf(&self, _ray: &Ray, rec: &HitRecord, scattered: &Ray) -> f64 {
        let cos_theta = rec.normal.dot(scattered.direction.normalized());
        (cos_theta / PI).max(0.0)
    }

    fn eval_brdf(&self, ray: &Ray, rec: &HitRecord, scattered: &Ray) -> Color {
        self.tex.value(rec.u, rec.v, rec.point) * self.scattering_pdf(ray, rec, scattered)
    }
}

// ─── Metal (Fuzzed Mirror) ──────────────────────────────────────────────────

pub struct Metal {
    albedo: Color,
    fuzz: f64,
}

impl Metal {
    pub fn new(albedo: Color, fuzz: f64) -> Self {
        Self {
            albedo,
            fuzz: fuzz.clamp(0.0, 1.0),
        }
    }
}

impl Material for Metal {
    fn scatter(
        &self,
        ray: &Ray,
        rec: &HitRecord,
        rng: &mut dyn rand::RngCore,
    ) -> Option<ScatterRecord> {
        let reflected = ray.direction.reflect(rec.normal).normalized()
            + Vec3::random_unit_vector(rng) * self.fuzz;

        Some(ScatterRecord {
            attenuation: self.albedo,
            kind: Scatter::Specular(Ray::with_time(rec.point, reflected, ray.time)),
        })
    }
}

// ─── Dielectric (Glass) ─────────────────────────────────────────────────────

pub struct Dielectric {
    refraction_index: f64,
}

impl Dielectric {
    pub const fn new(refraction_index: f64) -> Self {
        Self { refraction_index }
    }

    /// Schlick's approximation of the Fresnel reflectance.
    fn reflectance(cosine: f64, refraction_index: f64) -> f64 {
        let r0 = ((1.0 - refraction_index) / (1.0 + refraction_index)).powi(2);
        r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
    }
}

impl Material for Dielectric {
    fn scatter(
        &self,
        ray: &Ray,
        rec: &HitRecord,
        rng: &mut dyn rand::RngCore,
    ) -> Option<ScatterRecord> {
        let ri = if rec.front_face {
            1.0 / self.refraction_index
        } else {
            self.refraction_index
        };

        let unit_direction = ray.direction.normalized();
        let cos_theta = (-unit_direction).dot(rec.normal).min(1.0);
        let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();

        let cannot_refract = ri * sin_theta > 1.0;
        let direction =
            if cannot_refract || Self::reflectance(cos_theta, ri) > rng.gen::<f64>() {
                unit_direction.reflect(rec.normal)
            } else {
                unit_direction
                    .refract(rec.normal, ri)
                    .unwrap_or_else(|| unit_direction.reflect(rec.normal))
            };

        Some(ScatterRecord {
            attenuation: Color::ones(),
            kind: Scatter::Specular(Ray::with_time(rec.point, direction, ray.time)),
        })
    }
}

// ─── Diffuse Area Light ─────────────────────────────────────────────────────

pub struct DiffuseLight {
    tex: Arc<dyn Texture>,
}

impl DiffuseLight {
    pub fn new(emit: Color) -> Self {
        Self {
            tex: Arc::new(SolidColor::new(emit)),
        }
    }

    pub fn from_texture(tex: Arc<dyn Texture>) -> Self {
        Self { tex }
    }
}

impl Material for DiffuseLight {
    fn emitted(&self, _ray: &Ray, rec: &HitRecord) -> Color {
        // One-sided emitter: the back face is dark.
        if !rec.front_face {
            return Color::zero();
        }
        self.tex.value(rec.u, rec.v, rec.point)
    }
}

// ─── Isotropic Phase Function ───────────────────────────────────────────────

pub struct Isotropic {
    tex: Arc<dyn Texture>,
}

impl Isotropic {
    pub fn new(albedo: Color) -> Self {
        Self {
            tex: Arc::new(SolidColor::new(albedo)),
        }
    }

    pub fn from_texture(tex: Arc<dyn Texture>) -> Self {
        Self { tex }
    }
}

impl Material for Isotropic {
    fn scatter(
        &self,
        _ray: &Ray,
        rec: &HitRecord,
        _rng: &mut dyn rand::RngCore,
    ) -> Option<ScatterRecord> {
        Some(ScatterRecord {
            attenuation: self.tex.value(rec.u, rec.v, rec.point),
            kind: Scatter::Sampled(Box::new(SpherePdf)),
        })
    }

    fn scattering_pdf(&self, _ray: &Ray, _rec: &HitRecord, _scattered: &Ray) -> f64 {
        1.0 / (4.0 * PI)
    }

    fn eval_brdf(&self, _ray: &Ray, rec: &HitRecord, _scattered: &Ray) -> Color {
        self.tex.value(rec.u, rec.v, rec.point) * (1.0 / (4.0 * PI))
    }
}

// ─── Iridescent Wrapper ─────────────────────────────────────────────────────

/// Thin-film interference look: delegates scattering to a base material and
/// shifts its attenuation toward a view-angle-dependent rainbow color.
pub struct Iridescent {
    base: Arc<dyn Material>,
    strength: f64,
}

impl Iridescent {
    pub fn new(base: Arc<dyn Material>, strength: f64) -> Self {
        Self { base, strength }
    }

    /// Per-channel cosine fringes, frequencies (1.0, 1.3, 1.7), six bands
    /// across the glancing-angle range.
    fn iridescent_color(cos_theta: f64) -> Color {
        let x = 1.0 - cos_theta;
        let phase = 6.0 * x;

        Color::new(
            0.5 * (1.0 + (1.0 * phase).cos()),
            0.5 * (1.0 + (1.3 * phase).cos()),
            0.5 * (1.0 + (1.7 * phase).cos()),
        )
    }

    fn blend(&self, ray: &Ray, rec: &HitRecord, base_value: Color, iri_scale: f64) -> Color {
        let view = (-ray.direction).normalized();
        let cos_theta = view.dot(rec.normal);
        let iri = Self::iridescent_color(cos_theta);
        base_value.lerp(iri * iri_scale, self.strength)
    }
}

impl Material for Iridescent {
    fn scatter(
        &self,
        ray: &Ray,
        rec: &HitRecord,
        rng: &mut dyn rand::RngCore,
    ) -> Option<ScatterRecord> {
        let mut srec = self.base.scatter(ray, rec, rng)?;
        srec.attenuation = self.blend(ray, rec, srec.attenuation, 1.0);
        Some(srec)
    }

    fn scattering_pdf(&self, ray: &Ray, rec: &HitRecord, scattered: &Ray) -> f64 {
        self.base.scattering_pdf(ray, rec, scattered)
    }

    fn eval_brdf(&self, ray: &Ray, rec: &HitRecord, scattered: &Ray) -> Color {
        // Attenuation × pdf with the attenuation shifted the same way scatter
        // shifts it, so a wrapped finite lobe keeps transporting light.
        let base_brdf = self.base.eval_brdf(ray, rec, scattered);
        self.blend(
            ray,
            rec,
            base_brdf,
            self.base.scattering_pdf(ray, rec, scattered),
        )
    }

    fn use_light_sampling(&self) -> bool {
        self.base.use_light_sampling()
    }
}

// ─── Glossy (GGX Cook–Torrance) ─────────────────────────────────────────────

pub struct Glossy {
    albedo: Color,
    alpha: f64,
    metallic: f64,
}

impl Glossy {
    pub fn new(albedo: Color, roughness: f64, metallic: f64) -> Self {
        Self {
            albedo,
            alpha: roughness * roughness,
            metallic,
        }
    }

    fn fresnel_schlick(cos_theta: f64, f0: Color) -> Color {
        f0 + (Color::ones() - f0) * (1.0 - cos_theta).powi(5)
    }

    /// Full Cook–Torrance evaluation in the local shading frame.
    fn eval_local(&self, wi: Vec3, wo: Vec3, n: Vec3) -> Color {
        let uvw = Onb::new(n);
        let wi_local = uvw.local(wi);
        let wo_local = uvw.local(wo);

        if wi_local.z <= 0.0 || wo_local.z <= 0.0 {
            return Color::zero();
        }

        let h_local = (wi_local + wo_local).normalized();
        if h_local.z <= 0.0 {
            return Color::zero();
        }

        let wi_dot_h = wi_local.dot(h_local);
        if wi_dot_h <= 0.0 {
            return Color::zero();
        }

        let d = ggx_d(h_local, self.alpha, self.alpha);
        let g = smith_g1(wi_local, self.alpha, self.alpha)
            * smith_g1(wo_local, self.alpha, self.alpha);

        let dielectric_f0 = Color::new(0.04, 0.04, 0.04);
        let f0 = dielectric_f0 * (1.0 - self.metallic) + self.albedo * self.metallic;
        let f = Self::fresnel_schlick(wi_dot_h, f0);

        const MIN_DOT: f64 = 1e-6;
        let wi_dot_n = wi_local.z.max(MIN_DOT);
        let wo_dot_n = wo_local.z.max(MIN_DOT);

        let specular = f * (d * g / (4.0 * wi_dot_n * wo_dot_n));

        if self.metallic < 1.0 {
            let kd = (Color::ones() - f) * (1.0 - self.metallic);
            specular + kd.hadamard(self.albedo) / PI
        } else {
            specular
        }
    }
}

impl Material for Glossy {
    fn scatter(
        &self,
        ray: &Ray,
        rec: &HitRecord,
        _rng: &mut dyn rand::RngCore,
    ) -> Option<ScatterRecord> {
        Some(ScatterRecord {
            attenuation: Color::ones(),
            kind: Scatter::Sampled(Box::new(GgxPdf::new(
                rec.normal,
                ray.direction,
                self.alpha,
                self.alpha,
            ))),
        })
    }

    fn scattering_pdf(&self, ray: &Ray, rec: &HitRecord, scattered: &Ray) -> f64 {
        GgxPdf::new(rec.normal, ray.direction, self.alpha, self.alpha)
            .value(scattered.direction)
    }

    fn eval_brdf(&self, ray: &Ray, rec: &HitRecord, scattered: &Ray) -> Color {
        let wi = (-ray.direction).normalized();
        let wo = scattered.direction.normalized();
        self.eval_local(wi, wo, rec.normal)
    }

    fn use_light_sampling(&self) -> bool {
        // The GGX lobe is the better importance estimate; emitter mixture
        // sampling would put half the samples where the lobe is near zero.
        false
    }
}
