//! Perspective camera with an optional thin-lens depth-of-field model.
//!
//! No `Transform`/raster-space matrix pipeline here: the camera basis is
//! built directly out of `lookFrom`/`lookAt`/`vup` with plain vector math,
//! and a ray is produced by jittering a point on the image plane within a
//! pixel's stratum, matching the rest of this crate's hand-rolled-geometry
//! style rather than pbrt's projective-transform camera.

use std::f32::consts::PI;

use crate::sampler::Sampler;
use crate::sampling::concentric_sample_disk;
use crate::{Point3f, Vector3f};

/// Parameters a caller may change between renders via
/// [`Camera::update_properties`] without reconstructing the camera.
#[derive(Debug, Copy, Clone)]
pub struct CameraProperties {
    pub look_from: Point3f,
    pub look_at: Point3f,
    pub up: Vector3f,
    /// Vertical field of view, in degrees.
    pub vfov: f32,
    pub aspect_ratio: f32,
    /// Angle, in degrees, subtended by the defocus disk; `0` disables depth
    /// of field (a pinhole camera).
    pub defocus_angle: f32,
    pub focus_distance: f32,
}

impl Default for CameraProperties {
    fn default() -> CameraProperties {
        CameraProperties {
            look_from: Point3f::new(0.0, 0.0, 0.0),
            look_at: Point3f::new(0.0, 0.0, -1.0),
            up: Vector3f::new(0.0, 1.0, 0.0),
            vfov: 40.0,
            aspect_ratio: 16.0 / 9.0,
            defocus_angle: 0.0,
            focus_distance: 10.0,
        }
    }
}

/// A pinhole (or thin-lens) camera producing primary rays for a
/// `xPixelSamples x yPixelSamples`-stratified pixel grid.
pub struct Camera {
    origin: Point3f,
    pixel00: Point3f,
    pixel_delta_u: Vector3f,
    pixel_delta_v: Vector3f,
    defocus_disk_u: Vector3f,
    defocus_disk_v: Vector3f,
    defocus_angle: f32,
    image_width: u32,
    image_height: u32,
    x_pixel_samples: u32,
    y_pixel_samples: u32,
}

impl Camera {
    pub fn new(props: CameraProperties, image_width: u32, x_pixel_samples: u32, y_pixel_samples: u32) -> Camera {
        let image_height = ((image_width as f32 / props.aspect_ratio) as u32).max(1);

        let theta = props.vfov.to_radians();
        let h = (theta / 2.0).tan();
        let viewport_height = 2.0 * h * props.focus_distance;
        let viewport_width = viewport_height * (image_width as f32 / image_height as f32);

        let w = (props.look_from - props.look_at).normalize();
        let u = props.up.cross(&w).normalize();
        let v = w.cross(&u);

        let viewport_u = viewport_width * u;
        let viewport_v = viewport_height * -v;

        let pixel_delta_u = viewport_u / image_width as f32;
        let pixel_delta_v = viewport_v / image_height as f32;

        let viewport_upper_left =
            props.look_from - props.focus_distance * w - viewport_u / 2.0 - viewport_v / 2.0;
        let pixel00 = viewport_upper_left + 0.5 * (pixel_delta_u + pixel_delta_v);

        let defocus_radius = props.focus_distance * (props.defocus_angle / 2.0).to_radians().tan();

        Camera {
            origin: props.look_from,
            pixel00,
            pixel_delta_u,
            pixel_delta_v,
            defocus_disk_u: u * defocus_radius,
            defocus_disk_v: v * defocus_radius,
            defocus_angle: props.defocus_angle,
            image_width,
            image_height,
            x_pixel_samples: x_pixel_samples.max(1),
            y_pixel_samples: y_pixel_samples.max(1),
        }
    }

    pub fn image_width(&self) -> u32 {
        self.image_width
    }

    pub fn image_height(&self) -> u32 {
        self.image_height
    }

    pub fn samples_per_pixel(&self) -> u32 {
        self.x_pixel_samples * self.y_pixel_samples
    }

    pub fn x_pixel_samples(&self) -> u32 {
        self.x_pixel_samples
    }

    pub fn y_pixel_samples(&self) -> u32 {
        self.y_pixel_samples
    }

    /// Rebuild the camera basis in place, e.g. after an interactive camera
    /// move; `image_width`/pixel-sample counts are kept.
    pub fn update_properties(&mut self, props: CameraProperties) {
        *self = Camera::new(props, self.image_width, self.x_pixel_samples, self.y_pixel_samples);
    }

    /// Generate the primary ray for `(col, row)`. `sampler` must already have
    /// had [`Sampler::start_pixel_sample`] called for the sample being
    /// rendered; its stratified `get_2d()` supplies the subpixel offset (and,
    /// when `defocusAngle > 0`, a second `get_2d()` jitters the ray origin
    /// over the defocus disk) instead of a raw unstratified RNG draw.
    pub fn get_ray(&self, col: u32, row: u32, sampler: &mut dyn Sampler) -> crate::ray::Ray {
        let p = sampler.get_2d();
        let px = p.x - 0.5;
        let py = p.y - 0.5;

        let pixel_sample =
            self.pixel00 + ((col as f32 + px) * self.pixel_delta_u) + ((row as f32 + py) * self.pixel_delta_v);

        let origin = if self.defocus_angle <= 0.0 {
            self.origin
        } else {
            self.defocus_disk_sample(sampler)
        };
        let direction = pixel_sample - origin;

        crate::ray::Ray::new(origin, direction)
    }

    fn defocus_disk_sample(&self, sampler: &mut dyn Sampler) -> Point3f {
        let p = concentric_sample_disk(sampler.get_2d());
        self.origin + (p.x * self.defocus_disk_u) + (p.y * self.defocus_disk_v)
    }
}

#[allow(dead_code)]
fn degrees_to_radians(deg: f32) -> f32 {
    deg * PI / 180.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::StratifiedSampler;
    use crate::Point2i;

    fn sampler_at(x_samples: u32, y_samples: u32, pixel: (i32, i32), sample_index: u32) -> StratifiedSampler {
        let mut s = StratifiedSampler::new(x_samples, y_samples, true, 0);
        s.start_pixel_sample(Point2i::new(pixel.0, pixel.1), sample_index);
        s
    }

    #[test]
    fn image_height_derives_from_aspect_ratio() {
        let camera = Camera::new(
            CameraProperties { aspect_ratio: 2.0, ..Default::default() },
            400,
            1,
            1,
        );
        assert_eq!(camera.image_height(), 200);
    }

    #[test]
    fn samples_per_pixel_is_product_of_grid_dims() {
        let camera = Camera::new(CameraProperties::default(), 100, 4, 3);
        assert_eq!(camera.samples_per_pixel(), 12);
    }

    #[test]
    fn rays_for_adjacent_pixels_diverge() {
        let camera = Camera::new(CameraProperties::default(), 200, 2, 2);
        let mut s0 = sampler_at(2, 2, (0, 0), 0);
        let mut s1 = sampler_at(2, 2, (1, 0), 0);
        let r0 = camera.get_ray(0, 0, &mut s0);
        let r1 = camera.get_ray(1, 0, &mut s1);
        assert_ne!(r0.d, r1.d);
    }

    #[test]
    fn pinhole_camera_rays_originate_at_look_from() {
        let props = CameraProperties { defocus_angle: 0.0, ..Default::default() };
        let camera = Camera::new(props, 100, 1, 1);
        let mut sampler = sampler_at(1, 1, (5, 5), 0);
        let ray = camera.get_ray(50, 50, &mut sampler);
        assert_eq!(ray.o, props.look_from);
    }
}
