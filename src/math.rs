use rand::Rng;
use std::fmt;
use std::ops::{Add, AddAssign, Div, DivAssign, Index, Mul, MulAssign, Neg, Sub};

/// Three doubles serving as points, directions, and RGB radiance alike. The
/// operators are overloaded so estimator code reads like the formulas it
/// implements; the geometric helpers cover the identities the tracer leans
/// on — reflection for the metal and dielectric lobes, Snell refraction,
/// per-channel products for throughput.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

pub type Point3 = Vec3;
pub type Color = Vec3;

impl Vec3 {
    #[inline]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// All three components set to `v` — radius vectors, grey colors.
    #[inline]
    pub const fn splat(v: f64) -> Self {
        Self::new(v, v, v)
    }

    #[inline]
    pub const fn zero() -> Self {
        Self::splat(0.0)
    }

    #[inline]
    pub const fn ones() -> Self {
        Self::splat(1.0)
    }

    #[inline]
    pub const fn unit_x() -> Self {
        Self::new(1.0, 0.0, 0.0)
    }

    #[inline]
    pub const fn unit_y() -> Self {
        Self::new(0.0, 1.0, 0.0)
    }

    #[inline]
    pub const fn unit_z() -> Self {
        Self::new(0.0, 0.0, 1.0)
    }

    /// Inner product. Cosine factors, plane distances, and every solid-angle
    /// density in the PDF family start from this.
    #[inline]
    pub fn dot(self, rhs: Self) -> f64 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    /// Right-handed cross product, the workhorse of basis construction: the
    /// camera frame, shading ONBs, and quad normals are all built from it.
    #[inline]
    pub fn cross(self, rhs: Self) -> Self {
        Self::new(
            self.y * rhs.z - self.z * rhs.y,
            self.z * rhs.x - self.x * rhs.z,
            self.x * rhs.y - self.y * rhs.x,
        )
    }

    /// Per-channel product: attenuation applied to incoming radiance.
    #[inline]
    pub fn hadamard(self, rhs: Self) -> Self {
        Self::new(self.x * rhs.x, self.y * rhs.y, self.z * rhs.z)
    }

    /// |v|² — enough for comparisons (rejection sampling, radius tests)
    /// where paying for the square root buys nothing.
    #[inline]
    pub fn length_squared(self) -> f64 {
        self.dot(self)
    }

    #[inline]
    pub fn length(self) -> f64 {
        self.length_squared().sqrt()
    }

    /// Scales to unit length. A zero vector here is a caller bug; debug
    /// builds trip an assertion rather than quietly minting NaNs.
    #[inline]
    pub fn normalized(self) -> Self {
        let len = self.length();
        debug_assert!(len > 1e-12, "normalizing a zero vector");
        self / len
    }

    /// Mirror `self` across the plane perpendicular to `normal`:
    /// v − 2(v·n)n. Feeds the metal lobe and the dielectric's reflect branch.
    #[inline]
    pub fn reflect(self, normal: Self) -> Self {
        self - normal * 2.0 * self.dot(normal)
    }

    /// Bend a unit direction through an interface with relative index
    /// `eta_ratio`. `None` when Snell's law has no real solution — total
    /// internal reflection, which the dielectric resolves as a mirror bounce.
    pub fn refract(self, normal: Self, eta_ratio: f64) -> Option<Self> {
        let cos_theta = (-self).dot(normal).min(1.0);
        let out_perp = (self + normal * cos_theta) * eta_ratio;
        let k = 1.0 - out_perp.length_squared();
        if k < 0.0 {
            return None;
        }
        Some(out_perp - normal * k.sqrt())
    }

    /// self·(1−t) + other·t, per channel. The iridescent wrapper blends base
    /// and fringe colors through this.
    #[inline]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        self * (1.0 - t) + other * t
    }

    /// Largest channel. Both the firefly clamp and the Russian-roulette
    /// survival probability key on it.
    #[inline]
    pub fn max_component(self) -> f64 {
        self.x.max(self.y).max(self.z)
    }

    /// Uniform random direction. Rejection-samples the cube until a point
    /// lands inside the ball (skipping points too close to the origin to
    /// normalize meaningfully), then pushes it to the surface.
    pub fn random_unit_vector(rng: &mut dyn rand::RngCore) -> Self {
        loop {
            let v = Self::new(
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
            );
            let len_sq = v.length_squared();
            if len_sq < 1.0 && len_sq > 1e-24 {
                return v / len_sq.sqrt();
            }
        }
    }

    /// Uniform point on the z = 0 unit disk, jittering camera-ray origins
    /// across the defocus aperture.
    pub fn random_in_unit_disk(rng: &mut dyn rand::RngCore) -> Self {
        loop {
            let x = rng.gen_range(-1.0..1.0);
            let y = rng.gen_range(-1.0..1.0);
            if x * x + y * y < 1.0 {
                return Self::new(x, y, 0.0);
            }
        }
    }

    /// Cosine-weighted direction in the local +z hemisphere:
    /// `(cos φ √r₂, sin φ √r₂, √(1−r₂))`. Routed through an `Onb` this is the
    /// matching importance distribution for the Lambertian lobe, so f/p is a
    /// constant for diffuse bounces.
    pub fn random_cosine_direction(rng: &mut dyn rand::RngCore) -> Self {
        let r1: f64 = rng.gen();
        let r2: f64 = rng.gen();

        let phi = 2.0 * std::f64::consts::PI * r1;
        Self::new(
            phi.cos() * r2.sqrt(),
            phi.sin() * r2.sqrt(),
            (1.0 - r2).sqrt(),
        )
    }
}

impl Neg for Vec3 {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl Add for Vec3 {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Self;
    #[inline]
    fn mul(self, t: f64) -> Self {
        Self::new(self.x * t, self.y * t, self.z * t)
    }
}

impl Mul<Vec3> for f64 {
    type Output = Vec3;
    #[inline]
    fn mul(self, v: Vec3) -> Vec3 {
        v * self
    }
}

impl Div<f64> for Vec3 {
    type Output = Self;
    #[inline]
    fn div(self, t: f64) -> Self {
        self * t.recip()
    }
}

impl AddAssign for Vec3 {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl MulAssign<f64> for Vec3 {
    #[inline]
    fn mul_assign(&mut self, t: f64) {
        *self = *self * t;
    }
}

impl DivAssign<f64> for Vec3 {
    #[inline]
    fn div_assign(&mut self, t: f64) {
        *self = *self * t.recip();
    }
}

impl Index<usize> for Vec3 {
    type Output = f64;
    fn index(&self, axis: usize) -> &f64 {
        match axis {
            0 => &self.x,
            1 => &self.y,
            2 => &self.z,
            _ => panic!("no axis {axis} on a 3-vector"),
        }
    }
}

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

// ─── Vec2 ───────────────────────────────────────────────────────────────────

/// Surface-parameter coordinates `(u, v)`, conventionally in [0,1]. Carried by
/// triangles for per-vertex texture coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    pub u: f64,
    pub v: f64,
}

pub type Point2 = Vec2;

impl Vec2 {
    #[inline]
    pub const fn new(u: f64, v: f64) -> Self {
        Self { u, v }
    }
}

// ─── Ray ────────────────────────────────────────────────────────────────────

/// A parametric ray R(t) = origin + t · direction, the fundamental geometric
/// primitive for all intersection queries in the path tracer. `time` selects
/// the shutter instant in [0,1) for motion blur; the direction need not be
/// unit length.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Point3,
    pub direction: Vec3,
    pub time: f64,
}

impl Ray {
    #[inline]
    pub const fn new(origin: Point3, direction: Vec3) -> Self {
        Self {
            origin,
            direction,
            time: 0.0,
        }
    }

    #[inline]
    pub const fn with_time(origin: Point3, direction: Vec3, time: f64) -> Self {
        Self {
            origin,
            direction,
            time,
        }
    }

    /// Evaluates the ray at parameter t. Positive t gives points ahead of the origin.
    #[inline]
    pub fn at(self, t: f64) -> Point3 {
        self.origin + self.direction * t
    }
}

// ─── Interval ───────────────────────────────────────────────────────────────

/// A closed real interval [min, max] bounding valid ray parameters. The
/// integrator always intersects with [0.001, ∞) to bias against
/// self-intersection.
#[derive(Debug, Clone, Copy)]
pub struct Interval {
    pub min: f64,
    pub max: f64,
}

impl Interval {
    pub const EMPTY: Interval = Interval::new(f64::INFINITY, f64::NEG_INFINITY);
    pub const UNIVERSE: Interval = Interval::new(f64::NEG_INFINITY, f64::INFINITY);

    #[inline]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Tightest interval containing both operands — the 1-D analogue of the
    /// AABB union used during BVH construction.
    pub fn enclosing(a: Interval, b: Interval) -> Interval {
        Interval::new(a.min.min(b.min), a.max.max(b.max))
    }

    #[inline]
    pub fn size(self) -> f64 {
        self.max - self.min
    }

    #[inline]
    pub fn contains(self, t: f64) -> bool {
        self.min <= t && t <= self.max
    }

    #[inline]
    pub fn surrounds(self, t: f64) -> bool {
        self.min < t && t < self.max
    }

    #[inline]
    pub fn clamp(self, t: f64) -> f64 {
        t.clamp(self.min, self.max)
    }

    /// Symmetric expansion by `delta`, half on each side.
    pub fn expand(self, delta: f64) -> Interval {
        let padding = delta / 2.0;
        Interval::new(self.min - padding, self.max + padding)
    }
}

// ─── Axis-Aligned Bounding Box ──────────────────────────────────────────────

/// Axis-aligned box between two corner points, the bounding volume the BVH is
/// built from. A ray hits the box when its parameter ranges across the three
/// slab pairs still overlap after intersection.
#[derive(Debug, Clone, Copy)]
pub struct Aabb {
    pub min: Point3,
    pub max: Point3,
}

impl Aabb {
    pub const EMPTY: Aabb = Aabb::new(
        Point3::splat(f64::INFINITY),
        Point3::splat(f64::NEG_INFINITY),
    );

    pub const fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    /// Box spanning two corner points regardless of their ordering.
    pub fn from_corners(a: Point3, b: Point3) -> Self {
        Aabb::new(
            Point3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            Point3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        )
    }

    /// Slab test against `t_range`. Entry and exit parameters are folded axis
    /// by axis; a negative reciprocal direction just swaps which plane is the
    /// near one, and axis-parallel rays fall out of the same arithmetic via
    /// infinities.
    pub fn hit(&self, ray: &Ray, t_range: Interval) -> bool {
        let mut t_min = t_range.min;
        let mut t_max = t_range.max;
        for axis in 0..3 {
            let inv_d = 1.0 / ray.direction[axis];
            let t0 = (self.min[axis] - ray.origin[axis]) * inv_d;
            let t1 = (self.max[axis] - ray.origin[axis]) * inv_d;
            let (near, far) = if inv_d < 0.0 { (t1, t0) } else { (t0, t1) };

            t_min = t_min.max(near);
            t_max = t_max.min(far);
            if t_max <= t_min {
                return false;
            }
        }
        true
    }

    /// Smallest box holding both operands; how the BVH grows parent volumes
    /// and how lists accumulate their bounds.
    pub fn surrounding(a: &Aabb, b: &Aabb) -> Aabb {
        Aabb::new(
            Point3::new(
                a.min.x.min(b.min.x),
                a.min.y.min(b.min.y),
                a.min.z.min(b.min.z),
            ),
            Point3::new(
                a.max.x.max(b.max.x),
                a.max.y.max(b.max.y),
                a.max.z.max(b.max.z),
            ),
        )
    }

    /// True when `other` lies entirely inside this box.
    pub fn contains_box(&self, other: &Aabb) -> bool {
        self.min.x <= other.min.x
            && self.min.y <= other.min.y
            && self.min.z <= other.min.z
            && self.max.x >= other.max.x
            && self.max.y >= other.max.y
            && self.max.z >= other.max.z
    }

    /// Edge lengths of the box along each axis.
    #[inline]
    pub fn extent(&self) -> Vec3 {
        self.max - self.min
    }

    /// Axis index (0, 1, 2) of the widest extent: the split dimension for the
    /// BVH's median partition.
    pub fn longest_axis(&self) -> usize {
        let e = self.extent();
        if e.x > e.y && e.x > e.z {
            0
        } else if e.y > e.z {
            1
        } else {
            2
        }
    }

    /// Guarantees a minimum thickness on every axis so that planar primitives
    /// (quads, triangles) still have a slab-testable volume.
    pub fn pad(&self) -> Aabb {
        const DELTA: f64 = 1e-4;
        let mut min = self.min;
        let mut max = self.max;
        if max.x - min.x < DELTA {
            min.x -= DELTA / 2.0;
            max.x += DELTA / 2.0;
        }
        if max.y - min.y < DELTA {
            min.y -= DELTA / 2.0;
            max.y += DELTA / 2.0;
        }
        if max.z - min.z < DELTA {
            min.z -= DELTA / 2.0;
            max.z += DELTA / 2.0;
        }
        Aabb::new(min, max)
    }

    /// Box translated by `offset` — supports the `Translate` instance wrapper.
    pub fn offset(&self, offset: Vec3) -> Aabb {
        Aabb::new(self.min + offset, self.max + offset)
    }
}

// ─── Orthonormal Basis ──────────────────────────────────────────────────────

/// An orthonormal basis built around a surface normal. `local` projects a
/// world-space vector into the basis (n maps to +z); `world` is its inverse.
/// The auxiliary axis avoids near-parallel degeneracy: (0,1,0) when
/// |n.x| > 0.9, else (1,0,0).
#[derive(Debug, Clone, Copy)]
pub struct Onb {
    u: Vec3,
    v: Vec3,
    w: Vec3,
}

impl Onb {
    pub fn new(n: Vec3) -> Self {
        let w = n.normalized();
        let a = if w.x.abs() > 0.9 {
            Vec3::unit_y()
        } else {
            Vec3::unit_x()
        };
        let v = w.cross(a).normalized();
        let u = w.cross(v);
        Self { u, v, w }
    }

    #[inline]
    pub fn w(&self) -> Vec3 {
        self.w
    }

    /// World → local: coordinates of `vec` in the (u, v, w) frame.
    #[inline]
    pub fn local(&self, vec: Vec3) -> Vec3 {
        Vec3::new(vec.dot(self.u), vec.dot(self.v), vec.dot(self.w))
    }

    /// Local → world: linear combination of the basis vectors.
    #[inline]
    pub fn world(&self, vec: Vec3) -> Vec3 {
        self.u * vec.x + self.v * vec.y + self.w * vec.z
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn onb_world_local_round_trip() {
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..100 {
            let n = Vec3::random_unit_vector(&mut rng);
            let uvw = Onb::new(n);
            let v = Vec3::new(
                rng.gen_range(-3.0..3.0),
                rng.gen_range(-3.0..3.0),
                rng.gen_range(-3.0..3.0),
            );
            let back = uvw.world(uvw.local(v));
            assert!((back - v).length() < 1e-12);
        }
    }

    #[test]
    fn onb_maps_normal_to_z() {
        let uvw = Onb::new(Vec3::new(0.0, 3.0, 0.0));
        let local = uvw.local(Vec3::unit_y());
        assert!((local - Vec3::unit_z()).length() < 1e-12);
    }

    #[test]
    fn reflect_mirrors_about_normal() {
        let incoming = Vec3::new(1.0, -1.0, 0.0);
        let reflected = incoming.reflect(Vec3::unit_y());
        assert!((reflected - Vec3::new(1.0, 1.0, 0.0)).length() < 1e-12);
    }

    #[test]
    fn refract_reports_total_internal_reflection() {
        // Grazing exit from glass into air: sin θ' > 1, no transmitted ray.
        let incoming = Vec3::new(0.99, -0.1, 0.0).normalized();
        assert!(incoming.refract(Vec3::unit_y(), 1.5).is_none());
        // Head-on transmission always succeeds.
        let head_on = Vec3::new(0.0, -1.0, 0.0);
        assert!(head_on.refract(Vec3::unit_y(), 1.5).is_some());
    }

    #[test]
    fn lerp_hits_both_endpoints() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(-1.0, 0.0, 5.0);
        assert!((a.lerp(b, 0.0) - a).length() < 1e-12);
        assert!((a.lerp(b, 1.0) - b).length() < 1e-12);
        assert!((a.lerp(b, 0.5) - Vec3::new(0.0, 1.0, 4.0)).length() < 1e-12);
    }

    #[test]
    fn interval_contains_and_surrounds() {
        let iv = Interval::new(0.001, 2.0);
        assert!(iv.contains(0.001));
        assert!(!iv.surrounds(0.001));
        assert!(iv.surrounds(1.0));
        assert!(!iv.contains(2.5));
        assert!(Interval::EMPTY.size() < 0.0);
    }

    #[test]
    fn aabb_union_contains_operands() {
        let a = Aabb::from_corners(Point3::new(-1.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        let b = Aabb::from_corners(Point3::new(0.0, -2.0, 0.5), Point3::new(3.0, 0.5, 0.6));
        let u = Aabb::surrounding(&a, &b);
        assert!(u.contains_box(&a));
        assert!(u.contains_box(&b));
    }

    #[test]
    fn aabb_slab_test_handles_axis_aligned_rays() {
        let bbox = Aabb::from_corners(Point3::new(-1.0, -1.0, -1.0), Point3::ones());
        let hit = Ray::new(Point3::new(0.0, 0.0, -5.0), Vec3::unit_z());
        let miss = Ray::new(Point3::new(0.0, 2.0, -5.0), Vec3::unit_z());
        assert!(bbox.hit(&hit, Interval::new(0.0, f64::INFINITY)));
        assert!(!bbox.hit(&miss, Interval::new(0.0, f64::INFINITY)));
    }

    #[test]
    fn cosine_direction_stays_in_upper_hemisphere() {
        let mut rng = SmallRng::seed_from_u64(11);
        for _ in 0..1000 {
            let d = Vec3::random_cosine_direction(&mut rng);
            assert!(d.z >= 0.0);
            assert!((d.length() - 1.0).abs() < 1e-9);
        }
    }
}
