use crate::bvh::HasT;
use crate::{Normal3f, Point3f, Vector3f};

/// Everything the integrator needs about a ray/scene hit. Unlike the
/// shading-differential-heavy `SurfaceInteraction` pbrt builds, this carries
/// just what BxDF evaluation and NEE shadow rays need: no ray
/// differentials, no arena-allocated BSDF, no dyn `Shape`/`Primitive` back
/// reference.
#[derive(Debug, Copy, Clone)]
pub struct HitRecord {
    pub p: Point3f,
    /// Shading normal, always oriented against the incoming ray (see
    /// `new`).
    pub n: Normal3f,
    pub front_face: bool,
    pub t: f32,
    pub u: f32,
    pub v: f32,
    /// Index into `Scene::materials`.
    pub material: usize,
}

impl HitRecord {
    /// Orient `outward_normal` (which a shape always returns pointing away
    /// from its interior) against the incoming ray direction, and remember
    /// which side was hit so transmissive BxDFs know whether they're
    /// entering or leaving the medium.
    pub fn new(
        p: Point3f,
        t: f32,
        ray_d: &Vector3f,
        outward_normal: Normal3f,
        u: f32,
        v: f32,
        material: usize,
    ) -> HitRecord {
        let front_face = ray_d.dotn(&outward_normal) < 0.0;
        let n = if front_face {
            outward_normal
        } else {
            -outward_normal
        };
        HitRecord {
            p,
            n,
            front_face,
            t,
            u,
            v,
            material,
        }
    }
}

impl HasT for HitRecord {
    fn t(&self) -> f32 {
        self.t
    }
}
