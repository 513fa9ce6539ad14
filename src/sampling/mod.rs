use std::f32::consts;

use crate::{Point2f, Vector2f, Vector3f};

const FRAC_PI_4: f32 = consts::FRAC_PI_2 / 2.0;

pub fn cosine_sample_hemisphere(u: Point2f) -> Vector3f {
    let d = concentric_sample_disk(u);
    let z = (1.0 - d.x * d.x - d.y * d.y).max(0.0).sqrt();
    Vector3f::new(d.x, d.y, z)
}

/// Shirley-Chiu concentric mapping from the unit square to the unit disk.
/// Avoids the distortion a naive polar mapping introduces near the origin.
pub fn concentric_sample_disk(u: Point2f) -> Point2f {
    let u_offset = 2.0 * u - Vector2f::new(1.0, 1.0);

    if u_offset.x == 0.0 && u_offset.y == 0.0 {
        return Point2f::new(0.0, 0.0);
    }

    let (r, theta) = if u_offset.x.abs() > u_offset.y.abs() {
        (u_offset.x, FRAC_PI_4 * (u_offset.y / u_offset.x))
    } else {
        (
            u_offset.y,
            consts::FRAC_PI_2 - FRAC_PI_4 * (u_offset.x / u_offset.y),
        )
    };
    r * Point2f::new(theta.cos(), theta.sin())
}

/// Balance/power heuristic (beta = 2) used to combine BSDF and light
/// sampling strategies in the path integrator.
#[inline]
pub fn power_heuristic(nf: u32, f_pdf: f32, ng: u32, g_pdf: f32) -> f32 {
    let f = nf as f32 * f_pdf;
    let g = ng as f32 * g_pdf;
    (f * f) / (f * f + g * g)
}

/// Density of `uniform_sample_sphere`, constant over the whole sphere.
pub const UNIFORM_SPHERE_PDF: f32 = 1.0 / (4.0 * consts::PI);

pub fn uniform_sample_sphere(u: Point2f) -> Vector3f {
    let z = 1.0 - 2.0 * u.x;
    let r = (1.0 - z * z).max(0.0).sqrt();
    let phi = 2.0 * consts::PI * u.y;
    Vector3f::new(r * phi.cos(), r * phi.sin(), z)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disk_stays_inside_unit_circle() {
        for i in 0..10u32 {
            for j in 0..10u32 {
                let u = Point2f::new(i as f32 / 10.0, j as f32 / 10.0);
                let p = concentric_sample_disk(u);
                assert!(p.x * p.x + p.y * p.y <= 1.0001);
            }
        }
    }

    #[test]
    fn power_heuristic_sums_to_one_when_symmetric() {
        let w1 = power_heuristic(1, 2.0, 1, 2.0);
        assert!((w1 - 0.5).abs() < 1e-6);
    }
}
