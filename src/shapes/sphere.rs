use std::f32::consts::PI;

use crate::bounds::Bounds3f;
use crate::interaction::HitRecord;
use crate::ray::Ray;
use crate::{Normal3f, Point3f, Vector3f};

/// A sphere, optionally moving linearly between `center0` at `time0` and
/// `center1` at `time1` (a static sphere sets both centers equal).
#[derive(Debug, Copy, Clone)]
pub struct Sphere {
    center0: Point3f,
    center1: Point3f,
    time0: f32,
    time1: f32,
    pub radius: f32,
    pub material: usize,
}

impl Sphere {
    pub fn stationary(center: Point3f, radius: f32, material: usize) -> Sphere {
        Sphere {
            center0: center,
            center1: center,
            time0: 0.0,
            time1: 1.0,
            radius,
            material,
        }
    }

    pub fn moving(
        center0: Point3f,
        center1: Point3f,
        time0: f32,
        time1: f32,
        radius: f32,
        material: usize,
    ) -> Sphere {
        Sphere {
            center0,
            center1,
            time0,
            time1,
            radius,
            material,
        }
    }

    pub fn center(&self, time: f32) -> Point3f {
        if self.time1 == self.time0 {
            self.center0
        } else {
            self.center0 + ((time - self.time0) / (self.time1 - self.time0)) * (self.center1 - self.center0)
        }
    }

    pub fn object_bounds(&self) -> Bounds3f {
        let r = Vector3f::new(self.radius, self.radius, self.radius);
        Bounds3f::from_points(&(self.center0 - r), &(self.center0 + r))
    }

    pub fn world_bounds(&self) -> Bounds3f {
        let r = Vector3f::new(self.radius, self.radius, self.radius);
        let box0 = Bounds3f::from_points(&(self.center0 - r), &(self.center0 + r));
        let box1 = Bounds3f::from_points(&(self.center1 - r), &(self.center1 + r));
        Bounds3f::union(&box0, &box1)
    }

    /// `(u, v)` from a point on the unit sphere, `u` wrapping around the
    /// equator and `v` running from the south to the north pole.
    fn uv(p: &Vector3f) -> (f32, f32) {
        let theta = (-p.y).acos();
        let phi = f32::atan2(-p.z, p.x) + PI;
        (phi / (2.0 * PI), theta / PI)
    }

    pub fn intersect(&self, ray: &Ray, t_min: f32, t_max: f32) -> Option<HitRecord> {
        let center = self.center(ray.time);
        let oc = ray.o - center;
        let a = ray.d.length_squared();
        let half_b = oc.dot(&ray.d);
        let c = oc.length_squared() - self.radius * self.radius;
        let discriminant = half_b * half_b - a * c;
        if discriminant < 0.0 {
            return None;
        }
        let sqrtd = discriminant.sqrt();

        let mut root = (-half_b - sqrtd) / a;
        if root <= t_min || root >= t_max {
            root = (-half_b + sqrtd) / a;
            if root <= t_min || root >= t_max {
                return None;
            }
        }

        let p = ray.at(root);
        let outward_normal = (p - center) / self.radius;
        let (u, v) = Sphere::uv(&outward_normal);
        Some(HitRecord::new(
            p,
            root,
            &ray.d,
            Normal3f::from(outward_normal),
            u,
            v,
            self.material,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ray_through_center_hits_near_side() {
        let sphere = Sphere::stationary(Point3f::new(0.0, 0.0, -1.0), 0.5, 0);
        let ray = Ray::new(Point3f::new(0.0, 0.0, 0.0), Vector3f::new(0.0, 0.0, -1.0));
        let hit = sphere.intersect(&ray, 0.001, f32::INFINITY).unwrap();
        assert!((hit.t - 0.5).abs() < 1e-4);
        assert!(hit.front_face);
    }

    #[test]
    fn ray_missing_sphere_returns_none() {
        let sphere = Sphere::stationary(Point3f::new(0.0, 10.0, -1.0), 0.5, 0);
        let ray = Ray::new(Point3f::new(0.0, 0.0, 0.0), Vector3f::new(0.0, 0.0, -1.0));
        assert!(sphere.intersect(&ray, 0.001, f32::INFINITY).is_none());
    }

    #[test]
    fn moving_sphere_center_interpolates() {
        let sphere = Sphere::moving(
            Point3f::new(0.0, 0.0, 0.0),
            Point3f::new(0.0, 2.0, 0.0),
            0.0,
            1.0,
            0.5,
            0,
        );
        assert_eq!(sphere.center(0.5), Point3f::new(0.0, 1.0, 0.0));
    }
}
