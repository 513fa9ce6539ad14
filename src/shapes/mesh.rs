use crate::bounds::Bounds3f;
use crate::interaction::HitRecord;
use crate::ray::Ray;
use crate::{Normal3f, Point2f, Point3f, Vector3f};

/// An indexed triangle mesh. Vertex data lives here; individual `Triangle`s
/// just carry an index into this mesh and a starting offset into `indices`.
#[derive(Debug, Clone)]
pub struct TriangleMesh {
    pub p: Vec<Point3f>,
    pub n: Option<Vec<Normal3f>>,
    pub uv: Option<Vec<Point2f>>,
    pub indices: Vec<usize>,
    pub material: usize,
}

impl TriangleMesh {
    pub fn new(
        p: Vec<Point3f>,
        n: Option<Vec<Normal3f>>,
        uv: Option<Vec<Point2f>>,
        indices: Vec<usize>,
        material: usize,
    ) -> TriangleMesh {
        debug_assert_eq!(indices.len() % 3, 0);
        TriangleMesh {
            p,
            n,
            uv,
            indices,
            material,
        }
    }

    pub fn num_triangles(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        (0..self.num_triangles()).map(move |i| Triangle { tri: i })
    }

    fn vertex(&self, tri: usize, corner: usize) -> usize {
        self.indices[tri * 3 + corner]
    }

    fn positions(&self, tri: usize) -> [Point3f; 3] {
        [
            self.p[self.vertex(tri, 0)],
            self.p[self.vertex(tri, 1)],
            self.p[self.vertex(tri, 2)],
        ]
    }

    fn uvs(&self, tri: usize) -> [Point2f; 3] {
        if let Some(ref uv) = self.uv {
            [
                uv[self.vertex(tri, 0)],
                uv[self.vertex(tri, 1)],
                uv[self.vertex(tri, 2)],
            ]
        } else {
            [
                Point2f::new(0.0, 0.0),
                Point2f::new(1.0, 0.0),
                Point2f::new(1.0, 1.0),
            ]
        }
    }

    pub fn world_bounds(&self, tri: usize) -> Bounds3f {
        let [p0, p1, p2] = self.positions(tri);
        Bounds3f::union_point(&Bounds3f::from_points(&p0, &p1), &p2)
    }

    /// Möller-Trumbore ray-triangle intersection, no precomputed edges or
    /// watertight shearing: fine for static meshes where every ray visits
    /// each triangle at most once per traversal step.
    pub fn intersect(&self, tri: usize, ray: &Ray, t_min: f32, t_max: f32) -> Option<HitRecord> {
        const EPSILON: f32 = 1e-8;

        let [p0, p1, p2] = self.positions(tri);
        let edge1 = p1 - p0;
        let edge2 = p2 - p0;
        let h = ray.d.cross(&edge2);
        let a = edge1.dot(&h);
        if a.abs() < EPSILON {
            return None;
        }

        let f = 1.0 / a;
        let s = ray.o - p0;
        let u = f * s.dot(&h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(&edge1);
        let v = f * ray.d.dot(&q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = f * edge2.dot(&q);
        if t <= t_min || t >= t_max {
            return None;
        }

        let b0 = 1.0 - u - v;
        let geometric_normal = Normal3f::from(edge1.cross(&edge2).normalize());
        let shading_normal = if let Some(ref n) = self.n {
            let ns = b0 * n[self.vertex(tri, 0)]
                + u * n[self.vertex(tri, 1)]
                + v * n[self.vertex(tri, 2)];
            if ns.dotn(&geometric_normal) < 0.0 {
                -ns.normalize()
            } else {
                ns.normalize()
            }
        } else {
            geometric_normal
        };

        let uv = self.uvs(tri);
        let uv_hit = b0 * Vector3f::new(uv[0].x, uv[0].y, 0.0)
            + u * Vector3f::new(uv[1].x, uv[1].y, 0.0)
            + v * Vector3f::new(uv[2].x, uv[2].y, 0.0);

        Some(HitRecord::new(
            ray.at(t),
            t,
            &ray.d,
            shading_normal,
            uv_hit.x,
            uv_hit.y,
            self.material,
        ))
    }
}

/// A lightweight handle into a `TriangleMesh`: just the triangle index.
#[derive(Debug, Copy, Clone)]
pub struct Triangle {
    pub tri: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_quad_mesh() -> TriangleMesh {
        let p = vec![
            Point3f::new(-1.0, -1.0, 0.0),
            Point3f::new(1.0, -1.0, 0.0),
            Point3f::new(1.0, 1.0, 0.0),
            Point3f::new(-1.0, 1.0, 0.0),
        ];
        TriangleMesh::new(p, None, None, vec![0, 1, 2, 0, 2, 3], 0)
    }

    #[test]
    fn ray_hits_triangle_through_center() {
        let mesh = unit_quad_mesh();
        let ray = Ray::new(Point3f::new(0.0, 0.0, -1.0), Vector3f::new(0.0, 0.0, 1.0));
        let hit = mesh.intersect(0, &ray, 0.001, f32::INFINITY);
        assert!(hit.is_some());
        assert!((hit.unwrap().t - 1.0).abs() < 1e-5);
    }

    #[test]
    fn ray_misses_triangle_outside_edges() {
        let mesh = unit_quad_mesh();
        let ray = Ray::new(Point3f::new(5.0, 5.0, -1.0), Vector3f::new(0.0, 0.0, 1.0));
        assert!(mesh.intersect(0, &ray, 0.001, f32::INFINITY).is_none());
        assert!(mesh.intersect(1, &ray, 0.001, f32::INFINITY).is_none());
    }

    #[test]
    fn shading_normal_interpolates_from_vertex_normals() {
        let p = vec![
            Point3f::new(-1.0, -1.0, 0.0),
            Point3f::new(1.0, -1.0, 0.0),
            Point3f::new(0.0, 1.0, 0.0),
        ];
        let n = vec![
            Normal3f::new(0.0, 0.0, 1.0),
            Normal3f::new(0.0, 0.0, 1.0),
            Normal3f::new(0.0, 0.0, 1.0),
        ];
        let mesh = TriangleMesh::new(p, Some(n), None, vec![0, 1, 2], 0);
        let ray = Ray::new(Point3f::new(0.0, -0.5, -1.0), Vector3f::new(0.0, 0.0, 1.0));
        let hit = mesh.intersect(0, &ray, 0.001, f32::INFINITY).unwrap();
        assert!((hit.n.z - 1.0).abs() < 1e-5);
    }
}
