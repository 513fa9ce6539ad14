//! Scene data and acceleration structure. A caller (the asset loader named
//! in the external interface) fills the geometry/material/light/texture
//! tables directly, then calls [`Scene::build`] once before any rendering.

use crate::bounds::Bounds3f;
use crate::bvh::{Bvh, SplitMethod};
use crate::error::Result;
use crate::interaction::HitRecord;
use crate::light::Light;
use crate::material::Material;
use crate::primitive::Primitive;
use crate::ray::Ray;
use crate::spectrum::Spectrum;

stat_counter!("Intersections/Regular ray intersection tests", n_intersection_tests);
stat_counter!("Intersections/Shadow ray intersection tests", n_shadow_tests);

pub fn init_stats() {
    n_intersection_tests::init();
    n_shadow_tests::init();
}

/// All scene geometry, shading data, and lights, plus the BVH built over
/// them. Every `Primitive` is an index into `spheres`/`meshes`; every
/// material/texture reference is an index into `materials`/`textures`.
pub struct Scene {
    pub spheres: Vec<crate::shapes::Sphere>,
    pub meshes: Vec<crate::shapes::TriangleMesh>,
    pub materials: Vec<Material>,
    pub textures: Vec<Spectrum>,
    pub lights: Vec<Light>,
    bvh: Bvh<Primitive>,
}

impl Scene {
    /// An empty scene, ready to have geometry pushed onto its tables before
    /// [`Scene::build`] is called.
    pub fn empty() -> Scene {
        Scene {
            spheres: Vec::new(),
            meshes: Vec::new(),
            materials: Vec::new(),
            textures: Vec::new(),
            lights: Vec::new(),
            bvh: Bvh::build(&[], |_: &Primitive| Bounds3f::new(), 1, SplitMethod::SAH),
        }
    }

    /// Build (or rebuild) the BVH over every sphere and triangle currently
    /// in `spheres`/`meshes`. Must be called after any topology change and
    /// before the scene is rendered.
    pub fn build(&mut self, max_prims_in_leaf: usize) -> Result<()> {
        let mut primitives = Vec::with_capacity(self.spheres.len() + self.meshes.len() * 2);
        for i in 0..self.spheres.len() {
            primitives.push(Primitive::Sphere(i));
        }
        for (mesh_idx, mesh) in self.meshes.iter().enumerate() {
            for tri in 0..mesh.num_triangles() {
                primitives.push(Primitive::Triangle { mesh: mesh_idx, tri });
            }
        }

        let spheres = &self.spheres;
        let meshes = &self.meshes;
        self.bvh = Bvh::build(
            &primitives,
            |p: &Primitive| p.world_bounds(spheres, meshes),
            max_prims_in_leaf,
            SplitMethod::SAH,
        );

        Ok(())
    }

    pub fn world_bounds(&self) -> Bounds3f {
        self.bvh.world_bounds()
    }

    /// The nearest hit along `ray` within `[t_min, t_max]`, or `None`.
    pub fn closest_hit(&self, ray: &Ray, t_min: f32, t_max: f32) -> Option<HitRecord> {
        n_intersection_tests::inc();
        let spheres = &self.spheres;
        let meshes = &self.meshes;
        self.bvh
            .intersect(ray, t_min, t_max, |p: Primitive, ray, t_min, t_max| {
                p.intersect(spheres, meshes, ray, t_min, t_max)
            })
    }

    /// Whether anything blocks `ray` within `[t_min, t_max]` (a shadow-ray
    /// query; no hit details are computed).
    pub fn any_hit(&self, ray: &Ray, t_min: f32, t_max: f32) -> bool {
        n_shadow_tests::inc();
        let spheres = &self.spheres;
        let meshes = &self.meshes;
        self.bvh
            .intersect_p(ray, t_min, t_max, |p: Primitive, ray, t_min, t_max| {
                p.intersect(spheres, meshes, ray, t_min, t_max).is_some()
            })
    }
}

impl Default for Scene {
    fn default() -> Scene {
        Scene::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Point3f, Vector3f};

    fn single_sphere_scene() -> Scene {
        let mut scene = Scene::empty();
        scene.materials.push(Material::Diffuse {
            albedo: Spectrum::white(),
            albedo_tex: None,
            emission: Spectrum::black(),
        });
        scene.spheres.push(crate::shapes::Sphere::stationary(Point3f::new(0.0, 0.0, -1.0), 0.5, 0));
        scene.build(4).unwrap();
        scene
    }

    #[test]
    fn build_on_empty_scene_succeeds_with_no_hits() {
        let mut scene = Scene::empty();
        assert!(scene.build(4).is_ok());
        let ray = Ray::new(Point3f::new(0.0, 0.0, 0.0), Vector3f::new(0.0, 0.0, -1.0));
        assert!(scene.closest_hit(&ray, 0.001, f32::INFINITY).is_none());
        assert!(!scene.any_hit(&ray, 0.001, f32::INFINITY));
    }

    #[test]
    fn closest_hit_finds_sphere_through_center() {
        let scene = single_sphere_scene();
        let ray = Ray::new(Point3f::new(0.0, 0.0, 0.0), Vector3f::new(0.0, 0.0, -1.0));
        let hit = scene.closest_hit(&ray, 0.001, f32::INFINITY).unwrap();
        assert!(relative_eq!(hit.t, 0.5));
    }

    #[test]
    fn any_hit_and_closest_hit_agree_on_occlusion() {
        let scene = single_sphere_scene();
        let hitting_ray = Ray::new(Point3f::new(0.0, 0.0, 0.0), Vector3f::new(0.0, 0.0, -1.0));
        let missing_ray = Ray::new(Point3f::new(10.0, 10.0, 0.0), Vector3f::new(0.0, 0.0, -1.0));

        assert!(scene.any_hit(&hitting_ray, 0.001, f32::INFINITY));
        assert!(scene.closest_hit(&hitting_ray, 0.001, f32::INFINITY).is_some());

        assert!(!scene.any_hit(&missing_ray, 0.001, f32::INFINITY));
        assert!(scene.closest_hit(&missing_ray, 0.001, f32::INFINITY).is_none());
    }

    #[test]
    fn world_bounds_contains_the_sphere() {
        let scene = single_sphere_scene();
        let bounds = scene.world_bounds();
        assert!(bounds.p_min.x <= -0.5 && bounds.p_max.x >= 0.5);
    }

    #[test]
    fn bvh_result_is_identical_across_max_prims_in_leaf_values() {
        let center = Point3f::new(0.0, 0.0, -1.0);
        let make = |max_prims: usize| {
            let mut scene = Scene::empty();
            scene.materials.push(Material::Diffuse {
                albedo: Spectrum::white(),
                albedo_tex: None,
                emission: Spectrum::black(),
            });
            for i in 0..20 {
                scene.spheres.push(crate::shapes::Sphere::stationary(
                    center + Vector3f::new(i as f32 * 0.3, 0.0, 0.0),
                    0.1,
                    0,
                ));
            }
            scene.build(max_prims).unwrap();
            scene
        };

        let ray = Ray::new(Point3f::new(1.5, 0.0, 0.0), Vector3f::new(0.0, 0.0, -1.0));
        let a = make(1).closest_hit(&ray, 0.001, f32::INFINITY).map(|h| h.t);
        let b = make(8).closest_hit(&ray, 0.001, f32::INFINITY).map(|h| h.t);
        assert_eq!(a, b);
    }
}
