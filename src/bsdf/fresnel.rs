//! Fresnel reflectance kernels. All take a local-frame cosine (the angle
//! between the half-vector or normal and one of the two directions) and are
//! otherwise stateless: the BxDFs that use them own whatever IOR/tint state
//! is needed.

use crate::spectrum::Spectrum;

/// Real-IOR dielectric Fresnel reflectance for unpolarized light.
/// `cos_theta_i` may be negative (ray on the transmission side); `eta_i` and
/// `eta_t` are then swapped to keep the formula's convention intact.
pub fn fresnel_dielectric(cos_theta_i: f32, eta_i: f32, eta_t: f32) -> f32 {
    let cos_theta_i = cos_theta_i.max(-1.0).min(1.0);
    let (eta_i, eta_t, cos_theta_i) = if cos_theta_i > 0.0 {
        (eta_i, eta_t, cos_theta_i)
    } else {
        (eta_t, eta_i, -cos_theta_i)
    };

    let sin_theta_i = (1.0 - cos_theta_i * cos_theta_i).max(0.0).sqrt();
    let sin_theta_t = eta_i / eta_t * sin_theta_i;
    if sin_theta_t >= 1.0 {
        return 1.0;
    }
    let cos_theta_t = (1.0 - sin_theta_t * sin_theta_t).max(0.0).sqrt();

    let r_parl = (eta_t * cos_theta_i - eta_i * cos_theta_t) / (eta_t * cos_theta_i + eta_i * cos_theta_t);
    let r_perp = (eta_i * cos_theta_i - eta_t * cos_theta_t) / (eta_i * cos_theta_i + eta_t * cos_theta_t);
    (r_parl * r_parl + r_perp * r_perp) / 2.0
}

/// Complex-IOR Fresnel reflectance for a conductor, evaluated independently
/// on each RGB channel (`eta + i*k` given per channel).
pub fn fresnel_conductor_rgb(cos_theta_i: f32, eta: Spectrum, k: Spectrum) -> Spectrum {
    Spectrum::rgb(
        fresnel_conductor_channel(cos_theta_i, eta.r, k.r),
        fresnel_conductor_channel(cos_theta_i, eta.g, k.g),
        fresnel_conductor_channel(cos_theta_i, eta.b, k.b),
    )
}

fn fresnel_conductor_channel(cos_theta_i: f32, eta: f32, k: f32) -> f32 {
    let cos_theta_i = cos_theta_i.max(0.0).min(1.0);
    let cos2 = cos_theta_i * cos_theta_i;
    let sin2 = 1.0 - cos2;
    let eta2 = eta * eta;
    let k2 = k * k;

    let t0 = eta2 - k2 - sin2;
    let a2_plus_b2 = (t0 * t0 + 4.0 * eta2 * k2).max(0.0).sqrt();
    let t1 = a2_plus_b2 + cos2;
    let a = (0.5 * (a2_plus_b2 + t0)).max(0.0).sqrt();
    let t2 = 2.0 * a * cos_theta_i;
    let rs = (t1 - t2) / (t1 + t2);

    let t3 = cos2 * a2_plus_b2 + sin2 * sin2;
    let t4 = t2 * sin2;
    let rp = rs * (t3 - t4) / (t3 + t4);

    0.5 * (rp + rs)
}

/// Schlick's approximation: `f0 + (1 - f0) * (1 - cos_theta)^5`.
pub fn fresnel_schlick(cos_theta: f32, f0: Spectrum) -> Spectrum {
    let cos_theta = cos_theta.max(0.0).min(1.0);
    let m = (1.0 - cos_theta).powi(5);
    f0 + (Spectrum::white() - f0) * m
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dielectric_at_normal_incidence_matches_closed_form() {
        // R(0) = ((eta_t - eta_i) / (eta_t + eta_i))^2
        let r = fresnel_dielectric(1.0, 1.0, 1.5);
        let expected = ((1.5 - 1.0) / (1.5 + 1.0)).powi(2);
        assert!((r - expected).abs() < 1e-5);
    }

    #[test]
    fn dielectric_total_internal_reflection_returns_one() {
        // Going from glass (1.5) into air (1.0) at a grazing angle.
        let r = fresnel_dielectric(0.1, 1.5, 1.0);
        assert!((r - 1.0).abs() < 1e-6);
    }

    #[test]
    fn conductor_at_normal_incidence_is_between_zero_and_one() {
        let r = fresnel_conductor_channel(1.0, 0.2, 3.0);
        assert!(r > 0.0 && r < 1.0);
    }

    #[test]
    fn schlick_at_normal_incidence_returns_f0() {
        let f0 = Spectrum::grey(0.04);
        let f = fresnel_schlick(1.0, f0);
        assert!((f.r - 0.04).abs() < 1e-6);
    }

    #[test]
    fn schlick_at_grazing_angle_approaches_white() {
        let f0 = Spectrum::grey(0.04);
        let f = fresnel_schlick(0.0, f0);
        assert!((f.r - 1.0).abs() < 1e-6);
    }
}
