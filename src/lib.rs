#![recursion_limit = "128"]
// Lints
#![deny(unused_qualifications, unused_must_use)]
#![warn(rust_2018_idioms)]
#![allow(non_snake_case)]
// Clippy config
#![allow(
    clippy::float_cmp,
    clippy::many_single_char_names,
    clippy::if_same_then_else,
    clippy::excessive_precision,
    clippy::too_many_arguments,
    clippy::suspicious_operation_groupings
)]

#[macro_use]
extern crate slog;
#[macro_use]
extern crate approx;

use std::f32;
use std::ops::{Add, Mul, Sub};

use num::{Num, One, Signed};

// stats needs to be declared first so its macros can be used by the following modules
#[macro_use]
mod stats;
pub mod bounds;
pub mod bsdf;
pub mod bvh;
pub mod camera;
pub mod error;
pub mod film;
mod geometry;
pub mod integrator;
pub mod interaction;
pub mod light;
pub mod logging;
pub mod material;
pub mod primitive;
pub mod ray;
pub mod renderer;
pub mod rng;
pub mod sampler;
pub mod sampling;
pub mod scene;
pub mod shapes;
pub mod spectrum;

pub fn init_stats() {
    // This one needs to be called first
    stats::init_stats();
    bvh::init_stats();
    integrator::init_stats();
    renderer::init_stats();
    scene::init_stats();
}

use geometry::{Normal3, Point2, Point3, Vector2, Vector3};
use spectrum::Spectrum;

pub type Vector2f = Vector2<f32>;
pub type Vector3f = Vector3<f32>;
pub type Point2f = Point2<f32>;
pub type Point2i = Point2<i32>;
pub type Point3f = Point3<f32>;
pub type Point3i = Point3<i32>;
pub type Normal3f = Normal3<f32>;

pub const INV_2_PI: f32 = 0.15915494309189533577;
pub const INV_PI: f32 = 0.31830988618379067154;
pub const MACHINE_EPSILON: f32 = f32::EPSILON * 0.5;
pub fn gamma(n: u32) -> f32 {
    (n as f32 * MACHINE_EPSILON) / (1.0 - n as f32 * MACHINE_EPSILON)
}

/// Smallest representable float strictly less than 1
pub const ONE_MINUS_EPSILON: f32 = 0.99999994f32;

/// Offset applied when spawning a secondary ray (shadow ray, bounce ray) off
/// a surface, to avoid immediate self-intersection.
pub const RAY_EPSILON: f32 = 1e-3;

/// Render-time configuration for the path integrator and the tiled driver.
///
/// This crate takes scene data and settings already assembled in memory; no
/// config-file format, CLI, or scene-description parser is part of it.
#[derive(Debug, Copy, Clone)]
pub struct RenderSettings {
    /// Worker thread count; `0` means "use `num_cpus::get()`".
    pub num_threads: u8,
    /// If true, favours a fast low-quality render (fewer samples) over a
    /// faithful one. Mirrors the quick-preview switch a DCC viewport layer
    /// would flip.
    pub quick_render: bool,
    /// Samples per pixel to accumulate before the image is "done".
    pub spp: u32,
    /// Inclusive maximum path depth (bounce count) before forced termination.
    pub max_ray_depth: u32,
    /// Russian roulette only kicks in once a path has reached this depth.
    pub rr_threshold: u32,
    /// Side length, in pixels, of a square render tile.
    pub tile_size: i32,
    /// Samples rendered per pass before the dynamic driver's barrier
    /// advances `currentSample` and the image can be displayed again.
    pub samples_per_pass: u32,
    /// Clamp each sample's radiance into `[0, 1]` before accumulating, to
    /// suppress fireflies. See the Open Questions resolution in DESIGN.md.
    pub clamp_radiance: bool,
}

impl Default for RenderSettings {
    fn default() -> RenderSettings {
        RenderSettings {
            num_threads: 0,
            quick_render: false,
            spp: 100,
            max_ray_depth: 8,
            rr_threshold: 3,
            tile_size: 32,
            samples_per_pass: 1,
            clamp_radiance: true,
        }
    }
}

/// Linear interpolation between 2 values.
///
/// This version should be generic enough to linearly interpolate between 2 Spectrums using an f32
/// parameter.
pub fn lerp<S, T>(t: S, a: T, b: T) -> T
where
    S: One,
    S: Sub<S, Output = S>,
    S: Copy,
    T: Add<T, Output = T>,
    T: Mul<S, Output = T>,
{
    let one: S = num::one();
    a * (one - t) + b * t
}

/// Return the dimension index (0, 1 or 2) that contains the largest component.
pub fn max_dimension<T>(v: &Vector3<T>) -> usize
where
    T: Num + PartialOrd,
{
    if v.x > v.y {
        if v.x > v.z {
            0
        } else {
            2
        }
    } else if v.y > v.z {
        1
    } else {
        2
    }
}

pub fn max_component(v: &Vector3f) -> f32 {
    f32::max(v.x, f32::max(v.y, v.z))
}

/// Create an orthogonal coordinate system from a single vector.
pub fn coordinate_system(v1: &Vector3f) -> (Vector3f, Vector3f) {
    let v2 = if v1.x.abs() > v1.y.abs() {
        Vector3::new(-v1.z, 0.0, v1.x) / (v1.x * v1.x + v1.z * v1.z).sqrt()
    } else {
        Vector3::new(0.0, v1.z, -v1.y) / (v1.y * v1.y + v1.z * v1.z).sqrt()
    };

    let v3 = v1.cross(&v2);

    (v2, v3)
}

pub fn find_interval<P>(size: usize, pred: P) -> usize
where
    P: Fn(usize) -> bool,
{
    let mut first = 0;
    let mut len = size;
    while len > 0 {
        let half = len >> 1;
        let middle = first + half;
        // Bisect range based on value of _pred_ at _middle_
        if pred(middle as usize) {
            first = middle + 1;
            len -= half + 1;
        } else {
            len = half;
        }
    }
    clamp(first as isize - 1, 0, size as isize - 2) as usize
}

/// Version of min() that works on `PartialOrd`, so it works for both u32 and f32.
pub fn min<T: PartialOrd + Copy>(a: T, b: T) -> T {
    if a.lt(&b) {
        a
    } else {
        b
    }
}

/// Version of max() that works on `PartialOrd`, so it works for both u32 and f32.
pub fn max<T: PartialOrd + Copy>(a: T, b: T) -> T {
    if a.gt(&b) {
        a
    } else {
        b
    }
}

pub fn clamp<T>(val: T, low: T, high: T) -> T
where
    T: PartialOrd + Copy,
{
    if val < low {
        low
    } else if val > high {
        high
    } else {
        val
    }
}

pub trait Clampable {
    fn clamp(self, min: f32, max: f32) -> Self;
}

impl Clampable for f32 {
    fn clamp(self, min: f32, max: f32) -> f32 {
        clamp(self, min, max)
    }
}

impl Clampable for Spectrum {
    fn clamp(self, min: f32, max: f32) -> Spectrum {
        Spectrum::rgb(
            Clampable::clamp(self.r, min, max),
            Clampable::clamp(self.g, min, max),
            Clampable::clamp(self.b, min, max),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_interval() {
        let a = vec![0, 1, 2, 3, 4, 5, 6, 7, 8, 9];

        // check clamping for out of range
        assert_eq!(0, find_interval(a.len(), |index| a[index] as isize <= -1));
        assert_eq!(a.len() - 2, find_interval(a.len(), |index| a[index] <= 100));

        for i in 0..a.len() - 1 {
            assert_eq!(i, find_interval(a.len(), |index| a[index] <= i));
            assert_eq!(
                i,
                find_interval(a.len(), |index| a[index] as f32 <= i as f32 + 0.5)
            );
            if i > 0 {
                assert_eq!(
                    i - 1,
                    find_interval(a.len(), |index| a[index] as f32 <= i as f32 - 0.5)
                );
            }
        }
    }

    #[test]
    fn test_gamma() {
        let g5 = gamma(5);
        let p = Point3f::new(-0.4, 0.9, 0.2);
        let v = g5 * p.abs();
        println!("gamma(5) = {}, p={:?}, v={:?}", gamma(5), p, v);
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(5, 0, 3), 3);
        assert_eq!(clamp(-1, 0, 3), 0);
        assert_eq!(clamp(2, 0, 3), 2);
    }
}
