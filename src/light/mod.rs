//! Scene lights. There is no area-light variant here: emissive geometry is
//! handled by the integrator adding `beta * material.emission()` whenever a
//! path hits a surface, so `Light` only needs to model the two delta/
//! environment cases an explicit light-sampling event can choose among.

use std::f32::consts::PI;

use crate::spectrum::Spectrum;
use crate::{Point2f, Point3f, Vector3f};

/// Result of sampling a light from a shading point: `wi` points from the
/// shading point toward the light, `distance` is how far the shadow ray
/// must travel (`f32::INFINITY` for `Infinite`).
#[derive(Debug, Copy, Clone)]
pub struct LightSample {
    pub radiance: Spectrum,
    pub wi: Vector3f,
    pub distance: f32,
    pub pdf: f32,
}

#[derive(Debug, Copy, Clone)]
pub enum Light {
    Point { pos: Point3f, intensity: Spectrum, scale: f32 },
    Infinite { intensity: Spectrum, scale: f32 },
}

impl Light {
    pub fn is_delta(&self) -> bool {
        matches!(self, Light::Point { .. })
    }

    /// Sample an incident direction and radiance at `p`. `u2` drives the
    /// environment light's uniform direction sample; point lights are
    /// deterministic and ignore it.
    pub fn sample(&self, p: &Point3f, u2: Point2f) -> LightSample {
        match *self {
            Light::Point { pos, intensity, scale } => {
                let d = pos - *p;
                let distance2 = d.length_squared();
                let distance = distance2.sqrt();
                LightSample {
                    radiance: intensity * (scale / distance2),
                    wi: d / distance,
                    distance,
                    pdf: 1.0,
                }
            }
            Light::Infinite { intensity, scale } => {
                let wi = crate::sampling::uniform_sample_sphere(u2);
                LightSample {
                    radiance: intensity * scale,
                    wi,
                    distance: f32::INFINITY,
                    pdf: crate::sampling::UNIFORM_SPHERE_PDF,
                }
            }
        }
    }

    /// Density of `sample` having produced direction `wi`; always `0` for a
    /// delta light, since the BSDF branch of MIS can never hit it by chance.
    pub fn pdf(&self, _wi: &Vector3f) -> f32 {
        match *self {
            Light::Point { .. } => 0.0,
            Light::Infinite { .. } => crate::sampling::UNIFORM_SPHERE_PDF,
        }
    }

    /// Radiance contributed to a ray that escapes the scene without hitting
    /// anything, for `Infinite` lights only (a `Point` light never
    /// contributes to a miss).
    pub fn environment_radiance(&self, _dir: &Vector3f) -> Spectrum {
        match *self {
            Light::Point { .. } => Spectrum::black(),
            Light::Infinite { intensity, scale } => intensity * scale,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_light_is_delta_and_has_zero_bsdf_pdf() {
        let light = Light::Point { pos: Point3f::new(0.0, 5.0, 0.0), intensity: Spectrum::white(), scale: 1.0 };
        assert!(light.is_delta());
        assert_eq!(light.pdf(&Vector3f::new(0.0, 1.0, 0.0)), 0.0);
    }

    #[test]
    fn point_light_falls_off_with_inverse_square_distance() {
        let light = Light::Point { pos: Point3f::new(0.0, 2.0, 0.0), intensity: Spectrum::white(), scale: 1.0 };
        let sample = light.sample(&Point3f::new(0.0, 0.0, 0.0), Point2f::new(0.0, 0.0));
        assert!((sample.radiance.r - 0.25).abs() < 1e-5);
        assert!((sample.distance - 2.0).abs() < 1e-5);
    }

    #[test]
    fn infinite_light_is_not_delta_and_has_uniform_pdf() {
        let light = Light::Infinite { intensity: Spectrum::white(), scale: 1.0 };
        assert!(!light.is_delta());
        assert!((light.pdf(&Vector3f::new(0.0, 1.0, 0.0)) - 1.0 / (4.0 * PI)).abs() < 1e-6);
    }

    #[test]
    fn infinite_light_environment_radiance_is_scaled_intensity() {
        let light = Light::Infinite { intensity: Spectrum::rgb(0.5, 0.7, 1.0), scale: 2.0 };
        let radiance = light.environment_radiance(&Vector3f::new(0.0, 0.0, 1.0));
        assert_eq!(radiance, Spectrum::rgb(1.0, 1.4, 2.0));
    }
}
