//! # lumen
//!
//! A physically-based Monte Carlo path tracer that renders 3D scenes offline
//! and emits plain PPM (P3) images, header and pixels alike, straight to
//! standard out.
//!
//! ## Architecture
//!
//! The renderer implements a unidirectional path tracer with:
//! - **Geometric primitives**: Sphere (with motion blur), Quad, Triangle, Box,
//!   constant-density volumes, instance transforms, BVH acceleration, and a
//!   sphere-traced SDF group
//! - **Materials**: Lambertian, Metal, Dielectric (glass), DiffuseLight,
//!   Isotropic, an iridescent wrapper, and a GGX Cook–Torrance glossy surface
//! - **Sampling**: cosine, uniform-sphere, emitter, GGX visible-normal, and
//!   50/50 mixture PDFs feeding a mixture-importance-sampled estimator
//! - **Camera**: thin-lens model with defocus disk, stratified sub-pixel
//!   sampling, and per-ray shutter time
//!
//! ## Rendering equation
//!
//! The path tracer solves the rendering equation via Monte Carlo integration:
//!
//! ```text
//!   L_o(p, ω_o) = L_e(p, ω_o) + ∫_Ω f_r(p, ω_i, ω_o) · L_i(p, ω_i) · |cos θ_i| dω_i
//! ```
//!
//! Each material's `scatter` method selects a sampling distribution for its
//! BRDF lobe; where emitters are registered, the integrator mixes that
//! distribution 50/50 with direct emitter sampling, evaluates the BRDF, and
//! recursively traces the scattered ray to estimate `L_i`. Russian roulette
//! terminates deep paths; a ratio-preserving luminance clamp suppresses
//! fireflies.

pub mod bvh;
pub mod camera;
pub mod hittable;
pub mod material;
pub mod math;
pub mod pdf;
pub mod presets;
pub mod renderer;
pub mod sdf;
pub mod texture;
