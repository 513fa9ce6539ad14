//! Tiled parallel render driver: the **static** flavor, which blocks the
//! caller until `spp` samples have accumulated (or [`Renderer::terminate_render`]
//! is called from another thread). See [`dynamic`] for the persistent-worker
//! variant used by interactive callers.
//!
//! The image is divided into 32x32 tiles in row-major order; each worker
//! thread pulls the next tile off a shared atomic index until the job list
//! is drained. Per tile, every pixel is rendered at every sample before
//! moving to the next pixel, rather than running a separate barrier pass
//! per sample -- the accumulation buffer is per-pixel-atomic so there is no
//! ordering requirement between tiles or between samples within a tile.

use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use crate::camera::{Camera, CameraProperties};
use crate::film::Film;
use crate::integrator;
use crate::sampler::{Sampler, StratifiedSampler};
use crate::scene::Scene;
use crate::{Point2i, RenderSettings};

pub mod dynamic;

stat_counter!("Render driver/Tiles completed", n_tiles_completed);

pub fn init_stats() {
    n_tiles_completed::init();
}

const TILE_SIZE: u32 = 32;

#[derive(Clone, Copy)]
struct Tile {
    x0: u32,
    y0: u32,
    x1: u32,
    y1: u32,
}

fn tile_list(width: u32, height: u32) -> Vec<Tile> {
    let mut tiles = Vec::new();
    let mut y0 = 0;
    while y0 < height {
        let y1 = (y0 + TILE_SIZE).min(height);
        let mut x0 = 0;
        while x0 < width {
            let x1 = (x0 + TILE_SIZE).min(width);
            tiles.push(Tile { x0, y0, x1, y1 });
            x0 = x1;
        }
        y0 = y1;
    }
    tiles
}

/// Render `scene` through `camera` into `film`, splitting work across
/// `settings.num_threads` worker threads (or `num_cpus::get()` if `0`).
/// Blocks until every pixel has accumulated `camera.samples_per_pixel()`
/// samples, or `stop` is observed set between tiles.
pub fn render(scene: &Scene, camera: &Camera, film: &Film, settings: &RenderSettings, stop: &std::sync::atomic::AtomicBool) {
    let num_threads = if settings.num_threads == 0 {
        num_cpus::get()
    } else {
        settings.num_threads as usize
    };

    let tiles = tile_list(camera.image_width(), camera.image_height());
    let next_tile = AtomicUsize::new(0);

    info!("rendering {} tiles on {} threads", tiles.len(), num_threads);
    let pb = indicatif::ProgressBar::new(tiles.len() as u64);
    pb.set_style(
        indicatif::ProgressStyle::default_bar()
            .progress_chars("=>-")
            .template("[{elapsed_precise}] [{wide_bar}] {percent}% [{pos}/{len}] {eta}"),
    );

    crossbeam::scope(|scope| {
        for _ in 0..num_threads {
            let tiles = &tiles;
            let next_tile = &next_tile;
            let pb = &pb;
            scope.spawn(move |_| loop {
                if stop.load(Ordering::Relaxed) {
                    break;
                }
                let idx = next_tile.fetch_add(1, Ordering::Relaxed);
                let tile = match tiles.get(idx) {
                    Some(tile) => tile,
                    None => break,
                };
                render_tile(scene, camera, film, settings, tile, stop);
                n_tiles_completed::inc();
                pb.inc(1);
            });
        }
    })
    .unwrap();

    pb.finish();
    crate::stats::report_stats();
}

fn render_tile(scene: &Scene, camera: &Camera, film: &Film, settings: &RenderSettings, tile: &Tile, stop: &std::sync::atomic::AtomicBool) {
    let spp = camera.samples_per_pixel();
    let mut sampler = StratifiedSampler::new(camera.x_pixel_samples(), camera.y_pixel_samples(), true, 0);
    for row in tile.y0..tile.y1 {
        for col in tile.x0..tile.x1 {
            if stop.load(Ordering::Relaxed) {
                return;
            }
            for sample in 0..spp {
                sampler.start_pixel_sample(Point2i::new(col as i32, row as i32), sample);
                let ray = camera.get_ray(col, row, &mut sampler);
                let mut radiance = integrator::li(scene, ray, &mut sampler, settings);
                if radiance.has_nan() {
                    error!("NaN radiance at pixel ({}, {}), sample {}; using black", col, row, sample);
                    radiance = crate::spectrum::Spectrum::black();
                }
                film.add_sample(Point2i::new(col as i32, row as i32), radiance);
            }
        }
    }
}

/// Owns the scene, camera, and framebuffer across a render's lifetime, and
/// provides the blocking `render`/`terminate_render`/`resize`/`clear`/
/// `image` surface a caller drives a render through.
pub struct Renderer {
    scene: Scene,
    camera: Camera,
    film: Mutex<Film>,
    settings: RenderSettings,
    stop: std::sync::atomic::AtomicBool,
}

impl Renderer {
    pub fn new(scene: Scene, camera: Camera, settings: RenderSettings) -> Renderer {
        let film = Film::new(camera.image_width(), camera.image_height());
        Renderer {
            scene,
            camera,
            film: Mutex::new(film),
            settings,
            stop: std::sync::atomic::AtomicBool::new(false),
        }
    }

    /// Block until every pixel has accumulated its full sample count.
    pub fn render(&self) {
        self.stop.store(false, Ordering::Relaxed);
        let film = self.film.lock();
        render(&self.scene, &self.camera, &film, &self.settings, &self.stop);
    }

    /// Thread-safe; flips a flag workers check between tiles/pixels, so a
    /// concurrent call to this never blocks on the render loop.
    pub fn terminate_render(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    /// Rebuild the camera at a new resolution and clear the framebuffer.
    pub fn resize(&mut self, image_width: u32, props: CameraProperties) {
        self.camera = Camera::new(props, image_width, self.camera_x_samples(), self.camera_y_samples());
        self.film.lock().resize(self.camera.image_width(), self.camera.image_height());
    }

    /// Rebuild the camera basis in place (e.g. after an interactive camera
    /// move) without touching resolution, and clear the framebuffer.
    pub fn update_camera_properties(&mut self, props: CameraProperties) {
        self.camera.update_properties(props);
        self.clear();
    }

    pub fn clear(&mut self) {
        self.film.lock().clear();
    }

    /// The current framebuffer, 8-bit sRGB-encoded RGB, `w*h*3` bytes.
    pub fn image(&self) -> Vec<u8> {
        self.film.lock().to_srgb_bytes()
    }

    fn camera_x_samples(&self) -> u32 {
        // Only the product is tracked by `Camera`; a square-ish split is a
        // reasonable default for a resize that doesn't specify a new grid.
        (self.camera.samples_per_pixel() as f64).sqrt().round().max(1.0) as u32
    }

    fn camera_y_samples(&self) -> u32 {
        let x = self.camera_x_samples();
        (self.camera.samples_per_pixel() / x).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::CameraProperties;
    use crate::material::Material;
    use crate::shapes::Sphere;
    use crate::spectrum::Spectrum;
    use crate::Point3f;

    fn small_scene() -> Scene {
        let mut scene = Scene::empty();
        scene.materials.push(Material::Diffuse {
            albedo: Spectrum::grey(0.8),
            albedo_tex: None,
            emission: Spectrum::black(),
        });
        scene.spheres.push(Sphere::stationary(Point3f::new(0.0, 0.0, -1.0), 0.5, 0));
        scene.lights.push(crate::light::Light::Infinite { intensity: Spectrum::white(), scale: 0.5 });
        scene.build(4).unwrap();
        scene
    }

    #[test]
    fn render_is_bit_identical_regardless_of_thread_count() {
        let camera_one = Camera::new(CameraProperties::default(), 12, 2, 2);
        let settings_one = RenderSettings { num_threads: 1, ..RenderSettings::default() };
        let renderer_one = Renderer::new(small_scene(), camera_one, settings_one);
        renderer_one.render();

        let camera_many = Camera::new(CameraProperties::default(), 12, 2, 2);
        let settings_many = RenderSettings { num_threads: 4, ..RenderSettings::default() };
        let renderer_many = Renderer::new(small_scene(), camera_many, settings_many);
        renderer_many.render();

        assert_eq!(renderer_one.image(), renderer_many.image());
    }

    #[test]
    fn render_fills_every_pixel_with_a_sample() {
        let scene = small_scene();
        let camera = Camera::new(CameraProperties::default(), 8, 1, 1);
        let settings = RenderSettings { num_threads: 2, ..RenderSettings::default() };
        let renderer = Renderer::new(scene, camera, settings);
        renderer.render();
        let image = renderer.image();
        assert_eq!(image.len(), (8 * renderer.camera.image_height() * 3) as usize);
    }

    #[test]
    fn clear_resets_the_framebuffer() {
        let scene = small_scene();
        let camera = Camera::new(CameraProperties::default(), 4, 1, 1);
        let settings = RenderSettings::default();
        let mut renderer = Renderer::new(scene, camera, settings);
        renderer.render();
        renderer.clear();
        // after clear every pixel should read black before any new samples land
        assert!(renderer.film.lock().to_srgb_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn tile_list_covers_the_whole_image_without_overlap() {
        let tiles = tile_list(65, 40);
        let mut covered = vec![false; 65 * 40];
        for tile in &tiles {
            for y in tile.y0..tile.y1 {
                for x in tile.x0..tile.x1 {
                    let idx = (y * 65 + x) as usize;
                    assert!(!covered[idx], "pixel ({}, {}) covered twice", x, y);
                    covered[idx] = true;
                }
            }
        }
        assert!(covered.iter().all(|&c| c));
    }
}
