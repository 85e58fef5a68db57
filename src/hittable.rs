use crate::material::{Isotropic, Material};
use crate::math::*;
use rand::Rng;
use std::f64::consts::PI;
use std::sync::Arc;

// ─── Hit Record ─────────────────────────────────────────────────────────────

pub struct HitRecord<'a> {
    pub point: Point3,
    pub normal: Vec3,
    pub t: f64,
    pub u: f64,
    pub v: f64,
    pub front_face: bool,
    pub material: &'a dyn Material,
}

impl<'a> HitRecord<'a> {
    /// Orients the stored normal against the incoming ray and records which
    /// side was hit. Afterwards `normal · ray.direction ≤ 0` always holds.
    pub fn set_face_normal(&mut self, ray: &Ray, outward_normal: Vec3) {
        self.front_face = ray.direction.dot(outward_normal) < 0.0;
        self.normal = if self.front_face {
            outward_normal
        } else {
            -outward_normal
        };
    }
}

// ─── Hittable Trait ─────────────────────────────────────────────────────────

/// Anything a ray can intersect. Emitters additionally act as samplable
/// direction distributions through `pdf_value`/`random`; the defaults make
/// every other shape a zero-probability target.
pub trait Hittable: Send + Sync {
    fn hit(&self, ray: &Ray, t_range: Interval) -> Option<HitRecord<'_>>;

    fn bounding_box(&self) -> Aabb;

    /// Solid-angle density of sampling `direction` from `origin` toward this
    /// object. Zero for shapes that are not emitter-sampling targets.
    fn pdf_value(&self, _origin: Point3, _direction: Vec3) -> f64 {
        0.0
    }

    /// A random direction from `origin` toward this object.
    fn random(&self, _origin: Point3, _rng: &mut dyn rand::RngCore) -> Vec3 {
        Vec3::unit_x()
    }
}

// ─── Hittable List ──────────────────────────────────────────────────────────

/// A flat collection of hittables. `hit` keeps the closest intersection;
/// the emitter queries treat the members as equally weighted targets.
pub struct HittableList {
    pub objects: Vec<Arc<dyn Hittable>>,
    bbox: Aabb,
}

impl HittableList {
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            bbox: Aabb::EMPTY,
        }
    }

    pub fn add(&mut self, object: Arc<dyn Hittable>) {
        self.bbox = Aabb::surrounding(&self.bbox, &object.bounding_box());
        self.objects.push(object);
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl Default for HittableList {
    fn default() -> Self {
        Self::new()
    }
}

impl Hittable for HittableList {
    fn hit(&self, ray: &Ray, t_range: Interval) -> Option<HitRecord<'_>> {
        let mut closest = t_range.max;
        let mut result = None;

        for object in &self.objects {
            if let Some(rec) = object.hit(ray, Interval::new(t_range.min, closest)) {
                closest = rec.t;
                result = Some(rec);
            }
        }
        result
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    fn pdf_value(&self, origin: Point3, direction: Vec3) -> f64 {
        if self.objects.is_empty() {
            return 0.0;
        }
        let weight = 1.0 / self.objects.len() as f64;
        self.objects
            .iter()
            .map(|object| weight * object.pdf_value(origin, direction))
            .sum()
    }

    fn random(&self, origin: Point3, rng: &mut dyn rand::RngCore) -> Vec3 {
        if self.objects.is_empty() {
            return Vec3::unit_x();
        }
        let index = rng.gen_range(0..self.objects.len());
        self.objects[index].random(origin, rng)
    }
}

// ─── Sphere ─────────────────────────────────────────────────────────────────

/// Spherical-coordinate UV of a point on the unit sphere: `u = φ/2π`,
/// `v = θ/π`, with the seam at x = -1 so that `(1,0,0)` maps to `(0.5, 0.5)`
/// and `(0,0,1)` to `(0.25, 0.5)`.
pub fn sphere_uv(p: Point3) -> (f64, f64) {
    let theta = (-p.y).acos();
    let phi = (-p.z).atan2(p.x) + PI;
    (phi / (2.0 * PI), theta / PI)
}

pub struct Sphere {
    center: Point3,
    motion: Vec3,
    radius: f64,
    material: Arc<dyn Material>,
    bbox: Aabb,
}

impl Sphere {
    /// Stationary sphere. A negative radius inverts the normals, which makes
    /// hollow glass shells possible (outer sphere + negative inner sphere).
    pub fn new(center: Point3, radius: f64, material: Arc<dyn Material>) -> Self {
        let r = Vec3::splat(radius.abs());
        Self {
            center,
            motion: Vec3::zero(),
            radius,
            material,
            bbox: Aabb::new(center - r, center + r),
        }
    }

    /// Sphere whose center moves linearly from `center1` (time 0) to `center2`
    /// (time 1) during the shutter interval.
    pub fn moving(
        center1: Point3,
        center2: Point3,
        radius: f64,
        material: Arc<dyn Material>,
    ) -> Self {
        let r = Vec3::splat(radius.abs());
        let box1 = Aabb::new(center1 - r, center1 + r);
        let box2 = Aabb::new(center2 - r, center2 + r);
        Self {
            center: center1,
            motion: center2 - center1,
            radius,
            material,
            bbox: Aabb::surrounding(&box1, &box2),
        }
    }

    #[inline]
    fn center_at(&self, time: f64) -> Point3 {
        self.center + self.motion * time
    }

    /// Uniform direction within the cone subtended by the sphere as seen from
    /// `distance_squared` away.
    fn random_to_sphere(
        radius: f64,
        distance_squared: f64,
        rng: &mut dyn rand::RngCore,
    ) -> Vec3 {
        let r1: f64 = rng.gen();
        let r2: f64 = rng.gen();

        let z = 1.0 + r2 * ((1.0 - radius * radius / distance_squared).sqrt() - 1.0);
        let phi = 2.0 * PI * r1;
        let x = phi.cos() * (1.0 - z * z).sqrt();
        let y = phi.sin() * (1.0 - z * z).sqrt();

        Vec3::new(x, y, z)
    }
}

impl Hittable for Sphere {
    fn hit(&self, ray: &Ray, t_range: Interval) -> Option<HitRecord<'_>> {
        let center = self.center_at(ray.time);
        let oc = ray.origin - center;
        let a = ray.direction.length_squared();
        let half_b = oc.dot(ray.direction);
        let c = oc.length_squared() - self.radius * self.radius;
        let discriminant = half_b * half_b - a * c;

        if discriminant < 0.0 {
            return None;
        }

        let sqrtd = discriminant.sqrt();
        let mut root = (-half_b - sqrtd) / a;
        if !t_range.surrounds(root) {
            root = (-half_b + sqrtd) / a;
            if !t_range.surrounds(root) {
                return None;
            }
        }

        let point = ray.at(root);
        let outward_normal = (point - center) / self.radius;
        let (u, v) = sphere_uv(outward_normal);
        let mut rec = HitRecord {
            point,
            normal: outward_normal,
            t: root,
            u,
            v,
            front_face: true,
            material: self.material.as_ref(),
        };
        rec.set_face_normal(ray, outward_normal);
        Some(rec)
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    fn pdf_value(&self, origin: Point3, direction: Vec3) -> f64 {
        // Only valid for stationary spheres used as emitter targets.
        if self
            .hit(&Ray::new(origin, direction), Interval::new(0.001, f64::INFINITY))
            .is_none()
        {
            return 0.0;
        }

        let distance_squared = (self.center - origin).length_squared();
        let cos_theta_max = (1.0 - self.radius * self.radius / distance_squared).sqrt();
        let solid_angle = 2.0 * PI * (1.0 - cos_theta_max);

        1.0 / solid_angle
    }

    fn random(&self, origin: Point3, rng: &mut dyn rand::RngCore) -> Vec3 {
        let direction = self.center - origin;
        let distance_squared = direction.length_squared();
        let uvw = Onb::new(direction);
        uvw.world(Self::random_to_sphere(self.radius, distance_squared, rng))
    }
}

// ─── Quad ───────────────────────────────────────────────────────────────────

/// Planar parallelogram spanned by two edge vectors from a corner point.
pub struct Quad {
    q: Point3,
    u: Vec3,
    v: Vec3,
    w: Vec3,
    normal: Vec3,
    d: f64,
    area: f64,
    material: Arc<dyn Material>,
    bbox: Aabb,
}

impl Quad {
    pub fn new(q: Point3, u: Vec3, v: Vec3, material: Arc<dyn Material>) -> Self {
        let n = u.cross(v);
        let area = n.length();

        // Parallel edge vectors span no area; such a quad can never be hit.
        let (normal, w, d) = if area < 1e-12 {
            (Vec3::unit_z(), Vec3::zero(), 0.0)
        } else {
            let normal = n / area;
            (normal, n / n.length_squared(), normal.dot(q))
        };

        let bbox = Aabb::surrounding(
            &Aabb::from_corners(q, q + u + v),
            &Aabb::from_corners(q + u, q + v),
        )
        .pad();

        Self {
            q,
            u,
            v,
            w,
            normal,
            d,
            area,
            material,
            bbox,
        }
    }
}

impl Hittable for Quad {
    fn hit(&self, ray: &Ray, t_range: Interval) -> Option<HitRecord<'_>> {
        if self.area < 1e-12 {
            return None;
        }

        let denom = self.normal.dot(ray.direction);
        if denom.abs() < 1e-8 {
            return None;
        }

        let t = (self.d - self.normal.dot(ray.origin)) / denom;
        if !t_range.contains(t) {
            return None;
        }

        let point = ray.at(t);
        let planar = point - self.q;
        let alpha = self.w.dot(planar.cross(self.v));
        let beta = self.w.dot(self.u.cross(planar));

        let unit = Interval::new(0.0, 1.0);
        if !unit.contains(alpha) || !unit.contains(beta) {
            return None;
        }

        let mut rec = HitRecord {
            point,
            normal: self.normal,
            t,
            u: alpha,
            v: beta,
            front_face: true,
            material: self.material.as_ref(),
        };
        rec.set_face_normal(ray, self.normal);
        Some(rec)
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    fn pdf_value(&self, origin: Point3, direction: Vec3) -> f64 {
        let Some(rec) = self.hit(
            &Ray::new(origin, direction),
            Interval::new(0.001, f64::INFINITY),
        ) else {
            return 0.0;
        };

        // Area density converted to a solid-angle density at the origin.
        let distance_squared = rec.t * rec.t * direction.length_squared();
        let cosine = (direction.dot(rec.normal) / direction.length()).abs();

        distance_squared / (cosine * self.area)
    }

    fn random(&self, origin: Point3, rng: &mut dyn rand::RngCore) -> Vec3 {
        let p = self.q + self.u * rng.gen::<f64>() + self.v * rng.gen::<f64>();
        p - origin
    }
}

/// Axis-aligned box spanning two opposite corners, assembled from six quads.
pub fn make_box(a: Point3, b: Point3, material: Arc<dyn Material>) -> HittableList {
    let mut sides = HittableList::new();

    let min = Point3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z));
    let max = Point3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z));

    let dx = Vec3::new(max.x - min.x, 0.0, 0.0);
    let dy = Vec3::new(0.0, max.y - min.y, 0.0);
    let dz = Vec3::new(0.0, 0.0, max.z - min.z);

    sides.add(Arc::new(Quad::new(
        Point3::new(min.x, min.y, max.z),
        dx,
        dy,
        material.clone(),
    ))); // front
    sides.add(Arc::new(Quad::new(
        Point3::new(max.x, min.y, max.z),
        -dz,
        dy,
        material.clone(),
    ))); // right
    sides.add(Arc::new(Quad::new(
        Point3::new(max.x, min.y, min.z),
        -dx,
        dy,
        material.clone(),
    ))); // back
    sides.add(Arc::new(Quad::new(
        Point3::new(min.x, min.y, min.z),
        dz,
        dy,
        material.clone(),
    ))); // left
    sides.add(Arc::new(Quad::new(
        Point3::new(min.x, max.y, max.z),
        dx,
        -dz,
        material.clone(),
    ))); // top
    sides.add(Arc::new(Quad::new(
        Point3::new(min.x, min.y, min.z),
        dx,
        dz,
        material,
    ))); // bottom

    sides
}

// ─── Triangle (Möller–Trumbore) ─────────────────────────────────────────────

pub struct Triangle {
    p1: Point3,
    e1: Vec3,
    e2: Vec3,
    t1: Point2,
    t2: Point2,
    t3: Point2,
    normal: Vec3,
    degenerate: bool,
    material: Arc<dyn Material>,
    bbox: Aabb,
}

impl Triangle {
    /// Triangle without texture coordinates: the hit reports raw barycentric
    /// `(u, v)` instead.
    pub fn new(p1: Point3, p2: Point3, p3: Point3, material: Arc<dyn Material>) -> Self {
        Self::with_uvs(p1, p2, p3, Point2::default(), Point2::default(), Point2::default(), material)
    }

    pub fn with_uvs(
        p1: Point3,
        p2: Point3,
        p3: Point3,
        t1: Point2,
        t2: Point2,
        t3: Point2,
        material: Arc<dyn Material>,
    ) -> Self {
        let e1 = p2 - p1;
        let e2 = p3 - p1;
        let n = e1.cross(e2);
        let degenerate = n.length_squared() < 1e-24;
        let normal = if degenerate { Vec3::unit_z() } else { n.normalized() };

        let min = Point3::new(
            p1.x.min(p2.x).min(p3.x),
            p1.y.min(p2.y).min(p3.y),
            p1.z.min(p2.z).min(p3.z),
        );
        let max = Point3::new(
            p1.x.max(p2.x).max(p3.x),
            p1.y.max(p2.y).max(p3.y),
            p1.z.max(p2.z).max(p3.z),
        );

        Self {
            p1,
            e1,
            e2,
            t1,
            t2,
            t3,
            normal,
            degenerate,
            material,
            bbox: Aabb::new(min, max).pad(),
        }
    }
}

impl Hittable for Triangle {
    fn hit(&self, ray: &Ray, t_range: Interval) -> Option<HitRecord<'_>> {
        if self.degenerate {
            return None;
        }

        let pvec = ray.direction.cross(self.e2);
        let det = self.e1.dot(pvec);
        if det.abs() < 1e-8 {
            return None;
        }

        let inv_det = 1.0 / det;
        let tvec = ray.origin - self.p1;
        let u = tvec.dot(pvec) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let qvec = tvec.cross(self.e1);
        let v = ray.direction.dot(qvec) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = self.e2.dot(qvec) * inv_det;
        if !t_range.contains(t) {
            return None;
        }

        let (tex_u, tex_v) = if self.t1 == self.t2 && self.t2 == self.t3 {
            (u, v)
        } else {
            let w = 1.0 - u - v;
            (
                w * self.t1.u + u * self.t2.u + v * self.t3.u,
                w * self.t1.v + u * self.t2.v + v * self.t3.v,
            )
        };

        let mut rec = HitRecord {
            point: ray.at(t),
            normal: self.normal,
            t,
            u: tex_u,
            v: tex_v,
            front_face: true,
            material: self.material.as_ref(),
        };
        rec.set_face_normal(ray, self.normal);
        Some(rec)
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}

// ─── Constant-Density Medium ────────────────────────────────────────────────

/// A participating medium of uniform density inside a boundary shape. Rays
/// scatter at an exponentially distributed free-flight distance past the
/// entry point; rays that out-travel the boundary pass through unscattered.
pub struct ConstantMedium {
    boundary: Arc<dyn Hittable>,
    neg_inv_density: f64,
    phase: Arc<dyn Material>,
}

impl ConstantMedium {
    pub fn new(boundary: Arc<dyn Hittable>, density: f64, albedo: Color) -> Self {
        Self {
            boundary,
            neg_inv_density: -1.0 / density,
            phase: Arc::new(Isotropic::new(albedo)),
        }
    }
}

impl Hittable for ConstantMedium {
    fn hit(&self, ray: &Ray, t_range: Interval) -> Option<HitRecord<'_>> {
        let rec1 = self.boundary.hit(ray, Interval::UNIVERSE)?;
        let rec2 = self
            .boundary
            .hit(ray, Interval::new(rec1.t + 0.0001, f64::INFINITY))?;

        let mut t_enter = rec1.t.max(t_range.min);
        let t_exit = rec2.t.min(t_range.max);
        if t_enter >= t_exit {
            return None;
        }
        if t_enter < 0.0 {
            t_enter = 0.0;
        }

        let ray_length = ray.direction.length();
        let distance_inside = (t_exit - t_enter) * ray_length;
        let hit_distance = self.neg_inv_density * rand::thread_rng().gen::<f64>().ln();

        if hit_distance > distance_inside {
            return None;
        }

        let t = t_enter + hit_distance / ray_length;
        Some(HitRecord {
            point: ray.at(t),
            normal: Vec3::unit_x(), // arbitrary: scattering is isotropic
            t,
            u: 0.0,
            v: 0.0,
            front_face: true,
            material: self.phase.as_ref(),
        })
    }

    fn bounding_box(&self) -> Aabb {
        self.boundary.bounding_box()
    }
}

// ─── Instance Transforms ────────────────────────────────────────────────────

/// Rigid translation implemented by moving the ray into object space instead
/// of moving the geometry.
pub struct Translate {
    object: Arc<dyn Hittable>,
    offset: Vec3,
    bbox: Aabb,
}

impl Translate {
    pub fn new(object: Arc<dyn Hittable>, offset: Vec3) -> Self {
        let bbox = object.bounding_box().offset(offset);
        Self {
            object,
            offset,
            bbox,
        }
    }
}

impl Hittable for Translate {
    fn hit(&self, ray: &Ray, t_range: Interval) -> Option<HitRecord<'_>> {
        let local_ray = Ray::with_time(ray.origin - self.offset, ray.direction, ray.time);
        let mut rec = self.object.hit(&local_ray, t_range)?;
        rec.point += self.offset;
        Some(rec)
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}

/// Rotation about the y axis, again applied to the ray rather than the shape.
pub struct RotateY {
    object: Arc<dyn Hittable>,
    sin_theta: f64,
    cos_theta: f64,
    bbox: Aabb,
}

impl RotateY {
    pub fn new(object: Arc<dyn Hittable>, degrees: f64) -> Self {
        let radians = degrees.to_radians();
        let sin_theta = radians.sin();
        let cos_theta = radians.cos();

        let inner = object.bounding_box();
        let mut min = Point3::splat(f64::INFINITY);
        let mut max = Point3::splat(f64::NEG_INFINITY);

        for i in 0..2 {
            for j in 0..2 {
                for k in 0..2 {
                    let x = if i == 0 { inner.min.x } else { inner.max.x };
                    let y = if j == 0 { inner.min.y } else { inner.max.y };
                    let z = if k == 0 { inner.min.z } else { inner.max.z };

                    let rx = cos_theta * x + sin_theta * z;
                    let rz = -sin_theta * x + cos_theta * z;

                    min.x = min.x.min(rx);
                    min.y = min.y.min(y);
                    min.z = min.z.min(rz);
                    max.x = max.x.max(rx);
                    max.y = max.y.max(y);
                    max.z = max.z.max(rz);
                }
            }
        }

        Self {
            object,
            sin_theta,
            cos_theta,
            bbox: Aabb::new(min, max),
        }
    }
}

impl Hittable for RotateY {
    fn hit(&self, ray: &Ray, t_range: Interval) -> Option<HitRecord<'_>> {
        // World → object space.
        let origin = Point3::new(
            self.cos_theta * ray.origin.x - self.sin_theta * ray.origin.z,
            ray.origin.y,
            self.sin_theta * ray.origin.x + self.cos_theta * ray.origin.z,
        );
        let direction = Vec3::new(
            self.cos_theta * ray.direction.x - self.sin_theta * ray.direction.z,
            ray.direction.y,
            self.sin_theta * ray.direction.x + self.cos_theta * ray.direction.z,
        );
        let local_ray = Ray::with_time(origin, direction, ray.time);

        let mut rec = self.object.hit(&local_ray, t_range)?;

        // Object → world space.
        rec.point = Point3::new(
            self.cos_theta * rec.point.x + self.sin_theta * rec.point.z,
            rec.point.y,
            -self.sin_theta * rec.point.x + self.cos_theta * rec.point.z,
        );
        rec.normal = Vec3::new(
            self.cos_theta * rec.normal.x + self.sin_theta * rec.normal.z,
            rec.normal.y,
            -self.sin_theta * rec.normal.x + self.cos_theta * rec.normal.z,
        );

        Some(rec)
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}
