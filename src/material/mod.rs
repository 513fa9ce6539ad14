//! Scene materials. A `Material` is a tagged bag of parameters; it has no
//! behaviour of its own beyond resolving itself plus a `HitRecord` into a
//! concrete [`Bxdf`](crate::bsdf::Bxdf) for the integrator to evaluate and
//! sample.

use crate::bsdf::Bxdf;
use crate::spectrum::Spectrum;

/// Index into a scene-owned flat constant table, standing in for a real
/// procedural/image texture evaluator (out of scope for this crate).
pub type TextureId = usize;

#[derive(Debug, Copy, Clone)]
pub enum Material {
    Diffuse {
        albedo: Spectrum,
        albedo_tex: Option<TextureId>,
        emission: Spectrum,
    },
    Conductor {
        eta: Spectrum,
        k: Spectrum,
        /// Perceptual roughness in `[0, 1]`; `0` is treated as a perfect
        /// mirror (`Bxdf::SmoothConductor`) to sidestep GGX's degenerate
        /// near-zero-alpha numerics.
        roughness: f32,
        emission: Spectrum,
    },
    Dielectric {
        eta: f32,
        /// Perceptual roughness in `[0, 1]`; `0` resolves to the smooth
        /// (Dirac-delta) variant, same convention as `Conductor`.
        roughness: f32,
        emission: Spectrum,
    },
    ThinDielectric {
        eta: f32,
        emission: Spectrum,
    },
    MetallicRoughness {
        base_color: Spectrum,
        base_color_tex: Option<TextureId>,
        metallic: f32,
        roughness: f32,
        metallic_roughness_tex: Option<TextureId>,
        emission: Spectrum,
    },
}

/// Below this, a rough conductor/dielectric's GGX lobe is indistinguishable
/// from a delta distribution but costs an extra microfacet sample; treat it
/// as smooth instead.
const SMOOTH_ROUGHNESS_THRESHOLD: f32 = 1e-3;

impl Material {
    pub fn emission(&self) -> Spectrum {
        match *self {
            Material::Diffuse { emission, .. }
            | Material::Conductor { emission, .. }
            | Material::Dielectric { emission, .. }
            | Material::ThinDielectric { emission, .. }
            | Material::MetallicRoughness { emission, .. } => emission,
        }
    }

    /// Resolve texture lookups (if any) and produce the local-frame `Bxdf`
    /// to evaluate/sample at this hit. `textures` is the scene's flat
    /// constant table; `u, v` are the hit's surface parameterization.
    pub fn bxdf(&self, textures: &[Spectrum], u: f32, v: f32) -> Bxdf {
        match *self {
            Material::Diffuse { albedo, albedo_tex, .. } => Bxdf::Diffuse {
                albedo: resolve_spectrum(albedo, albedo_tex, textures, u, v),
            },
            Material::Conductor { eta, k, roughness, .. } => {
                if roughness <= SMOOTH_ROUGHNESS_THRESHOLD {
                    Bxdf::SmoothConductor { eta, k }
                } else {
                    let alpha = crate::bsdf::roughness_to_alpha(roughness);
                    Bxdf::RoughConductor { eta, k, alpha_x: alpha, alpha_y: alpha }
                }
            }
            Material::Dielectric { eta, roughness, .. } => {
                if roughness <= SMOOTH_ROUGHNESS_THRESHOLD {
                    Bxdf::Dielectric { eta }
                } else {
                    let alpha = crate::bsdf::roughness_to_alpha(roughness);
                    Bxdf::RoughDielectric { eta, alpha_x: alpha, alpha_y: alpha }
                }
            }
            Material::ThinDielectric { eta, .. } => Bxdf::ThinDielectric { eta },
            Material::MetallicRoughness { base_color, base_color_tex, metallic, roughness, .. } => {
                let alpha = crate::bsdf::roughness_to_alpha(roughness);
                Bxdf::MetallicRoughness {
                    base_color: resolve_spectrum(base_color, base_color_tex, textures, u, v),
                    metallic,
                    alpha_x: alpha,
                    alpha_y: alpha,
                }
            }
        }
    }
}

fn resolve_spectrum(fallback: Spectrum, tex: Option<TextureId>, textures: &[Spectrum], _u: f32, _v: f32) -> Spectrum {
    match tex {
        Some(id) => textures[id],
        None => fallback,
    }
}
