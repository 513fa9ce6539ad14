//! Trowbridge-Reitz (GGX) microfacet distribution, with visible-normal
//! (VNDF) importance sampling. Only the GGX distribution is carried: the
//! Beckmann distribution this was ported from is dropped since every rough
//! BxDF in this crate asks for GGX specifically.

use std::f32::consts::{self, TAU};

use crate::geometry::{
    abs_cos_theta, cos2_phi, cos2_theta, cos_phi, cos_theta, same_hemisphere, sin2_phi, sin_phi,
    tan2_theta, tan_theta,
};
use crate::{Point2f, Vector3f};

/// Karis' remapping from a perceptual `[0, 1]` roughness to the alpha used
/// by the distribution's normal/shadowing-masking terms.
pub fn roughness_to_alpha(roughness: f32) -> f32 {
    let roughness = roughness.max(1e-3);
    let x = roughness.ln();
    1.62142 + 0.819955 * x + 0.1734 * x * x + 0.0171201 * x * x * x + 0.000640711 * x * x * x * x
}

/// Normal distribution function, local shading frame (`wh.z` is the cosine
/// to the shading normal).
pub fn d(wh: &Vector3f, alpha_x: f32, alpha_y: f32) -> f32 {
    let tan2theta = tan2_theta(wh);
    if tan2theta.is_infinite() {
        return 0.0;
    }

    let cos4theta = cos2_theta(wh) * cos2_theta(wh);
    let e = (cos2_phi(wh) / (alpha_x * alpha_x) + sin2_phi(wh) / (alpha_y * alpha_y)) * tan2theta;

    1.0 / (consts::PI * alpha_x * alpha_y * cos4theta * (1.0 + e) * (1.0 + e))
}

pub fn lambda(w: &Vector3f, alpha_x: f32, alpha_y: f32) -> f32 {
    let abs_tan_theta = tan_theta(w).abs();
    if abs_tan_theta.is_infinite() {
        return 0.0;
    }

    let alpha = (cos2_phi(w) * alpha_x * alpha_x + sin2_phi(w) * alpha_y * alpha_y).sqrt();
    let alpha2tan2theta = (alpha * abs_tan_theta) * (alpha * abs_tan_theta);
    (-1.0 + (1.0 + alpha2tan2theta).sqrt()) / 2.0
}

pub fn g1(w: &Vector3f, alpha_x: f32, alpha_y: f32) -> f32 {
    1.0 / (1.0 + lambda(w, alpha_x, alpha_y))
}

pub fn g(wo: &Vector3f, wi: &Vector3f, alpha_x: f32, alpha_y: f32) -> f32 {
    1.0 / (1.0 + lambda(wo, alpha_x, alpha_y) + lambda(wi, alpha_x, alpha_y))
}

/// Density of `sample_wh`'s visible-normal sampling, with respect to solid
/// angle of `wh`.
pub fn pdf(wo: &Vector3f, wh: &Vector3f, alpha_x: f32, alpha_y: f32) -> f32 {
    d(wh, alpha_x, alpha_y) * g1(wo, alpha_x, alpha_y) * wo.dot(wh).abs() / abs_cos_theta(wo)
}

// Heitz, "Sampling the GGX Distribution of Visible Normals" (JCGT 2018).
#[allow(non_snake_case)]
fn sample11(cos_theta: f32, u1: f32, u2: f32) -> (f32, f32) {
    if cos_theta > 0.9999 {
        let r = (u1 / (1.0 - u1)).sqrt();
        let phi = TAU * u2;
        return (r * phi.cos(), r * phi.sin());
    }

    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
    let tan_theta = sin_theta / cos_theta;
    let a = 1.0 / tan_theta;
    let G1 = 2.0 / (1.0 + f32::sqrt(1.0 + 1.0 / (a * a)));

    let A = 2.0 * u1 / G1 - 1.0;
    let mut tmp = 1.0 / (A * A - 1.0);
    if tmp > 1e10 {
        tmp = 1e10;
    }
    let B = tan_theta;
    let D = (B * B * tmp * tmp - (A * A - B * B) * tmp).max(0.0).sqrt();
    let slope_x_1 = B * tmp - D;
    let slope_x_2 = B * tmp + D;
    let slope_x = if A < 0.0 || slope_x_2 > 1.0 / tan_theta {
        slope_x_1
    } else {
        slope_x_2
    };

    let (S, u2) = if u2 > 0.5 {
        (1.0, 2.0 * (u2 - 0.5))
    } else {
        (-1.0, 2.0 * (0.5 - u2))
    };
    let z = (u2 * (u2 * (u2 * 0.27385 - 0.73369) + 0.46341))
        / (u2 * (u2 * (u2 * 0.093073 + 0.309420) - 1.000000) + 0.597999);
    let slope_y = S * z * (1.0 + slope_x * slope_x).sqrt();

    (slope_x, slope_y)
}

fn sample_stretched(wi: &Vector3f, alpha_x: f32, alpha_y: f32, u1: f32, u2: f32) -> Vector3f {
    let wi_stretched = Vector3f::new(alpha_x * wi.x, alpha_y * wi.y, wi.z).normalize();

    let (mut slope_x, mut slope_y) = sample11(cos_theta(&wi_stretched), u1, u2);

    let tmp = cos_phi(&wi_stretched) * slope_x - sin_phi(&wi_stretched) * slope_y;
    slope_y = sin_phi(&wi_stretched) * slope_x + cos_phi(&wi_stretched) * slope_y;
    slope_x = tmp;

    slope_x *= alpha_x;
    slope_y *= alpha_y;

    Vector3f::new(-slope_x, -slope_y, 1.0).normalize()
}

/// Importance-sample a half-vector from the distribution of visible normals
/// seen from `wo`.
pub fn sample_wh(wo: &Vector3f, u: Point2f, alpha_x: f32, alpha_y: f32) -> Vector3f {
    let flip = wo.z < 0.0;
    let wo_upper = if flip { -*wo } else { *wo };
    let wh = sample_stretched(&wo_upper, alpha_x, alpha_y, u.x, u.y);
    if flip {
        -wh
    } else {
        wh
    }
}
