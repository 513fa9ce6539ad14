mod normal;
mod point;
mod vector;

pub use self::normal::Normal3;
pub use self::point::{Point2, Point3};
pub use self::vector::{Vector2, Vector3};

use crate::Vector3f;

// Local shading-frame helpers. By convention `w` is expressed in a frame
// where `z` aligns with the shading normal, so these are cheap component
// accessors rather than general spherical-coordinate conversions.

pub fn cos_theta(w: &Vector3f) -> f32 {
    w.z
}

pub fn cos2_theta(w: &Vector3f) -> f32 {
    w.z * w.z
}

pub fn abs_cos_theta(w: &Vector3f) -> f32 {
    w.z.abs()
}

pub fn sin2_theta(w: &Vector3f) -> f32 {
    (1.0 - cos2_theta(w)).max(0.0)
}

pub fn sin_theta(w: &Vector3f) -> f32 {
    sin2_theta(w).sqrt()
}

pub fn tan_theta(w: &Vector3f) -> f32 {
    sin_theta(w) / cos_theta(w)
}

pub fn tan2_theta(w: &Vector3f) -> f32 {
    sin2_theta(w) / cos2_theta(w)
}

pub fn cos_phi(w: &Vector3f) -> f32 {
    let sin_theta = sin_theta(w);
    if sin_theta == 0.0 {
        1.0
    } else {
        (w.x / sin_theta).max(-1.0).min(1.0)
    }
}

pub fn sin_phi(w: &Vector3f) -> f32 {
    let sin_theta = sin_theta(w);
    if sin_theta == 0.0 {
        0.0
    } else {
        (w.y / sin_theta).max(-1.0).min(1.0)
    }
}

pub fn cos2_phi(w: &Vector3f) -> f32 {
    cos_phi(w) * cos_phi(w)
}

pub fn sin2_phi(w: &Vector3f) -> f32 {
    sin_phi(w) * sin_phi(w)
}

pub fn same_hemisphere(a: &Vector3f, b: &Vector3f) -> bool {
    a.z * b.z > 0.0
}

/// Reflect `wo` about the (local-frame) normal `n`. Both point away from the
/// surface.
pub fn reflect(wo: &Vector3f, n: &Vector3f) -> Vector3f {
    -*wo + 2.0 * wo.dot(n) * *n
}

/// Snell's law refraction of `wi` through a surface with local normal `n`
/// (pointing into the incident medium) and relative IOR `eta = eta_i /
/// eta_t`. Returns `None` on total internal reflection.
pub fn refract(wi: &Vector3f, n: &Vector3f, eta: f32) -> Option<Vector3f> {
    let cos_theta_i = n.dot(wi);
    let sin2_theta_i = (1.0 - cos_theta_i * cos_theta_i).max(0.0);
    let sin2_theta_t = eta * eta * sin2_theta_i;
    if sin2_theta_t >= 1.0 {
        return None;
    }
    let cos_theta_t = (1.0 - sin2_theta_t).sqrt();
    Some(-*wi * eta + (eta * cos_theta_i - cos_theta_t) * *n)
}

pub fn spherical_direction(sin_theta: f32, cos_theta: f32, phi: f32) -> Vector3f {
    Vector3f::new(sin_theta * phi.cos(), sin_theta * phi.sin(), cos_theta)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reflect_about_z_axis_flips_sign() {
        let wo = Vector3f::new(1.0, 0.0, 1.0).normalize();
        let n = Vector3f::new(0.0, 0.0, 1.0);
        let wi = reflect(&wo, &n);
        assert!((wi.z - wo.z).abs() < 1e-6);
        assert!((wi.x + wo.x).abs() < 1e-6);
    }

    #[test]
    fn refract_through_flat_interface_at_normal_incidence_is_unbent() {
        let wi = Vector3f::new(0.0, 0.0, 1.0);
        let n = Vector3f::new(0.0, 0.0, 1.0);
        let wt = refract(&wi, &n, 1.0 / 1.5).unwrap();
        assert!((wt.x).abs() < 1e-6);
        assert!((wt.y).abs() < 1e-6);
    }
}
