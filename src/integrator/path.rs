//! Multiple-importance-sampled unidirectional path tracer: next-event
//! estimation against a uniformly-chosen light, combined with BSDF bounce
//! sampling, weighted by the power heuristic.

use crate::bsdf::Frame;
use crate::ray::Ray;
use crate::sampler::Sampler;
use crate::sampling::power_heuristic;
use crate::scene::Scene;
use crate::spectrum::Spectrum;
use crate::{Clampable, RenderSettings};

stat_counter!("Integrator/Camera rays traced", n_camera_rays);
stat_percent!("Integrator/Zero-radiance paths", zero_radiance_paths);

pub fn init_stats() {
    n_camera_rays::init();
    zero_radiance_paths::init();
}

/// Offset applied when spawning a secondary ray off a surface, scaled by
/// the shading normal, to dodge self-intersection without the precision
/// bookkeeping a full `EFloat` error-bound machinery would need.
const SHADOW_EPSILON: f32 = 1e-3;

/// Trace `ray` through `scene` and return the estimated incident radiance,
/// per the multiple-importance-sampled path-tracing scheme: NEE against a
/// uniformly-picked light at every bounce, combined with BSDF-sampled
/// bounces via the power heuristic, with Russian-roulette termination past
/// `settings.rr_threshold` bounces.
pub fn li(scene: &Scene, mut ray: Ray, sampler: &mut dyn Sampler, settings: &RenderSettings) -> Spectrum {
    n_camera_rays::inc();

    let mut radiance = Spectrum::black();
    let mut beta = Spectrum::white();
    let mut prev_bsdf_pdf = 0.0f32;
    let mut prev_specular = true;

    for depth in 0..=settings.max_ray_depth {
        let hit = match scene.closest_hit(&ray, 1e-4, f32::INFINITY) {
            Some(hit) => hit,
            None => {
                for light in &scene.lights {
                    let weight = if depth == 0 || prev_specular {
                        1.0
                    } else {
                        let light_pdf = light.pdf(&ray.d);
                        power_heuristic(1, prev_bsdf_pdf, 1, light_pdf)
                    };
                    radiance += beta * weight * light.environment_radiance(&ray.d);
                }
                break;
            }
        };

        let material = &scene.materials[hit.material];
        let emission = material.emission();
        if !emission.is_black() {
            // Emissive geometry is never a NEE target (`scene.lights` only holds
            // point/infinite lights), so a BSDF-sampled bounce landing on one is
            // the only way its contribution is ever gathered: no MIS weighting
            // needed, unlike the environment-miss branch below.
            radiance += beta * emission;
        }

        let frame = Frame::from_normal(hit.n);
        let wo = frame.to_local(&-ray.d);
        let bxdf = material.bxdf(&scene.textures, hit.u, hit.v);

        if !bxdf.is_specular() {
            radiance += beta * sample_direct_light(scene, &hit, &frame, &wo, &bxdf, sampler);
        }

        let uc = sampler.get_1d();
        let u2 = sampler.get_2d();
        let sample = match bxdf.sample(&wo, uc, u2) {
            Some(sample) if sample.pdf > 0.0 && !sample.f.is_black() => sample,
            _ => {
                zero_radiance_paths::inc_den();
                break;
            }
        };

        let wi_world = frame.to_world(&sample.wi);
        let cos_i = wi_world.dotn(&hit.n).abs();
        beta = beta * sample.f * (cos_i / sample.pdf);

        prev_bsdf_pdf = sample.pdf;
        prev_specular = sample.specular;

        let offset = if wi_world.dotn(&hit.n) > 0.0 { hit.n } else { -hit.n };
        ray = Ray::new(hit.p + crate::RAY_EPSILON * crate::Vector3f::from(offset), wi_world);

        if depth >= settings.rr_threshold {
            let q = (1.0 - beta.max_component_value()).max(0.0);
            if sampler.get_1d() < q {
                break;
            }
            beta = beta / (1.0 - q);
        }
    }

    if radiance.is_black() {
        zero_radiance_paths::inc_num();
    }
    zero_radiance_paths::inc_den();

    if settings.clamp_radiance {
        radiance.clamp(0.0, 1.0)
    } else {
        radiance
    }
}

/// Next-event estimation: pick a light uniformly, sample a direction
/// toward it, and weight its contribution against the BSDF's own density
/// at that direction via the power heuristic (trivially 1 for delta
/// lights, whose BSDF-sampling pdf is always 0).
fn sample_direct_light(
    scene: &Scene,
    hit: &crate::interaction::HitRecord,
    frame: &Frame,
    wo: &crate::Vector3f,
    bxdf: &crate::bsdf::Bxdf,
    sampler: &mut dyn Sampler,
) -> Spectrum {
    if scene.lights.is_empty() {
        return Spectrum::black();
    }

    let light_index =
        (sampler.get_1d() * scene.lights.len() as f32).min(scene.lights.len() as f32 - 1.0) as usize;
    let light = &scene.lights[light_index];
    let light_pdf_scale = scene.lights.len() as f32;

    let u2 = sampler.get_2d();
    let sample = light.sample(&hit.p, u2);
    if sample.pdf <= 0.0 || sample.radiance.is_black() {
        return Spectrum::black();
    }

    let cos_theta = sample.wi.dotn(&hit.n);
    if cos_theta <= 0.0 {
        return Spectrum::black();
    }

    let wi_local = frame.to_local(&sample.wi);
    let f = bxdf.evaluate(wo, &wi_local);
    if f.is_black() {
        return Spectrum::black();
    }

    let shadow_origin = hit.p + crate::RAY_EPSILON * crate::Vector3f::from(hit.n);
    let shadow_ray = Ray::segment(shadow_origin, sample.wi, sample.distance - SHADOW_EPSILON);
    if scene.any_hit(&shadow_ray, 1e-4, shadow_ray.t_max) {
        return Spectrum::black();
    }

    let light_pdf = sample.pdf * light_pdf_scale;
    let weight = if light.is_delta() {
        1.0
    } else {
        let bsdf_pdf = bxdf.pdf(wo, &wi_local);
        power_heuristic(1, light_pdf, 1, bsdf_pdf)
    };

    f * sample.radiance * (cos_theta * weight / light_pdf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::light::Light;
    use crate::material::Material;
    use crate::sampler::StratifiedSampler;
    use crate::shapes::Sphere;
    use crate::{Point2i, Point3f, Vector3f};

    fn sampler_for(pixel: (i32, i32)) -> StratifiedSampler {
        let mut s = StratifiedSampler::new(1, 1, true, 0);
        s.start_pixel_sample(Point2i::new(pixel.0, pixel.1), 0);
        s
    }

    fn lit_sphere_scene() -> Scene {
        let mut scene = Scene::empty();
        scene.materials.push(Material::Diffuse {
            albedo: Spectrum::grey(0.8),
            albedo_tex: None,
            emission: Spectrum::black(),
        });
        scene.spheres.push(Sphere::stationary(Point3f::new(0.0, 0.0, -1.0), 0.5, 0));
        scene.lights.push(Light::Point {
            pos: Point3f::new(0.0, 2.0, 0.0),
            intensity: Spectrum::white() * 10.0,
            scale: 1.0,
        });
        scene.build(4).unwrap();
        scene
    }

    #[test]
    fn miss_with_no_lights_contributes_nothing() {
        let mut scene = Scene::empty();
        scene.materials.push(Material::Diffuse { albedo: Spectrum::white(), albedo_tex: None, emission: Spectrum::black() });
        scene.spheres.push(Sphere::stationary(Point3f::new(0.0, 0.0, -100.0), 0.1, 0));
        scene.build(1).unwrap();
        let ray = Ray::new(Point3f::new(0.0, 0.0, 0.0), Vector3f::new(1.0, 0.0, 0.0));
        let mut sampler = sampler_for((0, 0));
        let radiance = li(&scene, ray, &mut sampler, &RenderSettings::default());
        assert_eq!(radiance, Spectrum::black());
    }

    #[test]
    fn lit_diffuse_sphere_returns_positive_radiance() {
        let scene = lit_sphere_scene();
        let ray = Ray::new(Point3f::new(0.0, 0.0, 0.0), Vector3f::new(0.0, 0.0, -1.0));
        let mut sampler = sampler_for((3, 3));
        let radiance = li(&scene, ray, &mut sampler, &RenderSettings::default());
        assert!(radiance.r > 0.0 || radiance.g > 0.0 || radiance.b > 0.0);
    }

    #[test]
    fn emissive_material_contributes_radiance_on_direct_hit() {
        let mut scene = Scene::empty();
        scene.materials.push(Material::Diffuse {
            albedo: Spectrum::black(),
            albedo_tex: None,
            emission: Spectrum::rgb(5.0, 5.0, 5.0),
        });
        scene.spheres.push(Sphere::stationary(Point3f::new(0.0, 0.0, -1.0), 0.5, 0));
        scene.build(1).unwrap();
        let ray = Ray::new(Point3f::new(0.0, 0.0, 0.0), Vector3f::new(0.0, 0.0, -1.0));
        let mut sampler = sampler_for((1, 1));
        let radiance = li(&scene, ray, &mut sampler, &RenderSettings::default());
        assert!(radiance.r > 0.0);
    }

    #[test]
    fn radiance_is_clamped_when_settings_request_it() {
        let mut scene = Scene::empty();
        scene.materials.push(Material::Diffuse {
            albedo: Spectrum::black(),
            albedo_tex: None,
            emission: Spectrum::rgb(1000.0, 1000.0, 1000.0),
        });
        scene.spheres.push(Sphere::stationary(Point3f::new(0.0, 0.0, -1.0), 0.5, 0));
        scene.build(1).unwrap();
        let ray = Ray::new(Point3f::new(0.0, 0.0, 0.0), Vector3f::new(0.0, 0.0, -1.0));
        let mut sampler = sampler_for((2, 2));
        let settings = RenderSettings { clamp_radiance: true, ..RenderSettings::default() };
        let radiance = li(&scene, ray, &mut sampler, &settings);
        assert!(radiance.r <= 1.0);
    }
}
