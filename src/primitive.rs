use crate::bounds::Bounds3f;
use crate::interaction::HitRecord;
use crate::ray::Ray;
use crate::shapes::{Sphere, TriangleMesh};

/// A reference to one intersectable piece of scene geometry. `Copy` so the
/// BVH can store these by value in its leaves instead of behind `Arc<dyn
/// Primitive>`; intersection and bounds queries take the scene's geometry
/// tables as context since the enum itself carries only indices.
#[derive(Debug, Copy, Clone)]
pub enum Primitive {
    Sphere(usize),
    Triangle { mesh: usize, tri: usize },
}

impl Primitive {
    pub fn world_bounds(&self, spheres: &[Sphere], meshes: &[TriangleMesh]) -> Bounds3f {
        match *self {
            Primitive::Sphere(i) => spheres[i].world_bounds(),
            Primitive::Triangle { mesh, tri } => meshes[mesh].world_bounds(tri),
        }
    }

    pub fn intersect(
        &self,
        spheres: &[Sphere],
        meshes: &[TriangleMesh],
        ray: &Ray,
        t_min: f32,
        t_max: f32,
    ) -> Option<HitRecord> {
        match *self {
            Primitive::Sphere(i) => spheres[i].intersect(ray, t_min, t_max),
            Primitive::Triangle { mesh, tri } => meshes[mesh].intersect(tri, ray, t_min, t_max),
        }
    }

    pub fn material(&self, spheres: &[Sphere], meshes: &[TriangleMesh]) -> usize {
        match *self {
            Primitive::Sphere(i) => spheres[i].material,
            Primitive::Triangle { mesh, .. } => meshes[mesh].material,
        }
    }
}
