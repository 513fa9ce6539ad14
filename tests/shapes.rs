//! Reintersection robustness: a ray spawned off a surface hit, heading into
//! the hemisphere the normal points into, must never immediately
//! re-intersect the surface it was spawned from.

use rustracer_core::material::Material;
use rustracer_core::ray::Ray;
use rustracer_core::rng::Rng;
use rustracer_core::scene::Scene;
use rustracer_core::shapes::Sphere;
use rustracer_core::spectrum::Spectrum;
use rustracer_core::{sampling, Point2f, Point3f, Vector3f};

fn exponential(rng: &mut Rng, exp: f32) -> f32 {
    let logu = rng.uniform(-exp, exp);
    10f32.powf(logu)
}

fn sphere_scene(center: Point3f, radius: f32) -> Scene {
    let mut scene = Scene::empty();
    scene.materials.push(Material::Diffuse {
        albedo: Spectrum::white(),
        albedo_tex: None,
        emission: Spectrum::black(),
    });
    scene.spheres.push(Sphere::stationary(center, radius, 0));
    scene.build(1).unwrap();
    scene
}

#[test]
fn sphere_reintersection_never_finds_the_same_surface() {
    for seed in 0..200u64 {
        let mut rng = Rng::new(seed);
        let radius = exponential(&mut rng, 4.0);
        let center = Point3f::new(0.0, 0.0, 0.0);
        let scene = sphere_scene(center, radius);

        let o = Point3f::new(exponential(&mut rng, 8.0), exponential(&mut rng, 8.0), exponential(&mut rng, 8.0));
        let bounds = scene.world_bounds();
        let t = Vector3f::new(rng.uniform01(), rng.uniform01(), rng.uniform01());
        let target = bounds.p_min
            + Vector3f::new(
                t.x * (bounds.p_max.x - bounds.p_min.x),
                t.y * (bounds.p_max.y - bounds.p_min.y),
                t.z * (bounds.p_max.z - bounds.p_min.z),
            );
        let ray = Ray::new(o, target - o);

        if let Some(hit) = scene.closest_hit(&ray, 1e-4, f32::INFINITY) {
            for _ in 0..100 {
                let u = Point2f::new(rng.uniform01(), rng.uniform01());
                let mut w = sampling::uniform_sample_sphere(u);
                if w.dotn(&hit.n) < 0.0 {
                    w = -w;
                }
                let offset_origin = hit.p + 1e-3 * Vector3f::from(hit.n);
                let spawned = Ray::new(offset_origin, w);
                assert!(
                    !scene.any_hit(&spawned, 1e-4, f32::INFINITY),
                    "spawned ray re-intersected its origin surface (seed {})",
                    seed
                );
            }
        }
    }
}
