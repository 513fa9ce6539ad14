//! Persistent-worker-pool render driver: the **dynamic** flavor. Unlike
//! [`super::render`], which spawns its worker threads fresh (via
//! `crossbeam::scope`) for the duration of one blocking call, a
//! [`DynamicRenderer`] spawns its threads once and parks them on a
//! mutex+condvar pair between renders. A caller driving repeated
//! interactive re-renders -- after a camera move, say -- pays the
//! thread-spawn cost only once instead of on every redraw.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Condvar};
use std::thread::JoinHandle;

use parking_lot::{Mutex, RwLock};

use super::{render_tile, tile_list, Tile};
use crate::camera::{Camera, CameraProperties};
use crate::film::Film;
use crate::scene::Scene;
use crate::RenderSettings;

struct JobQueue {
    tiles: Vec<Tile>,
    next_index: usize,
}

struct Inner {
    scene: Scene,
    // `RwLock`, not `Mutex`: workers hold a read guard for the full tile
    // render (many path-traced samples), and `Film::add_sample`/
    // `Camera::get_ray` only need `&self` (atomics / pure math). A `Mutex`
    // here would serialize every worker onto one tile at a time, leaving
    // the persistent pool no more parallel than a single thread. Only
    // resize/clear/update_camera_properties need the write side.
    camera: RwLock<Camera>,
    film: RwLock<Film>,
    settings: RenderSettings,
    queue: Mutex<JobQueue>,
    work_available: Condvar,
    stop_threads: AtomicBool,
    /// Bumped every time `render()` restarts the job list; a worker that
    /// popped a tile under a stale generation drops it instead of rendering,
    /// since `resetRender` means the buffer has already been cleared.
    generation: AtomicU64,
}

/// Render driver whose worker pool outlives any single `render()` call.
/// Call [`DynamicRenderer::shutdown`] to join the pool; dropping without
/// shutting down first leaks the threads (they park forever on the
/// condvar), matching the teacher crate's convention of an explicit
/// shutdown over a `Drop` impl for thread pools.
pub struct DynamicRenderer {
    inner: Arc<Inner>,
    workers: Vec<JoinHandle<()>>,
}

impl DynamicRenderer {
    pub fn new(scene: Scene, camera: Camera, settings: RenderSettings, num_threads: usize) -> DynamicRenderer {
        let film = Film::new(camera.image_width(), camera.image_height());
        let inner = Arc::new(Inner {
            scene,
            camera: RwLock::new(camera),
            film: RwLock::new(film),
            settings,
            queue: Mutex::new(JobQueue { tiles: Vec::new(), next_index: 0 }),
            work_available: Condvar::new(),
            stop_threads: AtomicBool::new(false),
            generation: AtomicU64::new(0),
        });

        let num_threads = if num_threads == 0 { num_cpus::get() } else { num_threads };
        let workers = (0..num_threads)
            .map(|_| {
                let inner = Arc::clone(&inner);
                std::thread::spawn(move || worker_loop(inner))
            })
            .collect();

        DynamicRenderer { inner, workers }
    }

    /// Clear the framebuffer, rebuild the tile queue over the current
    /// camera resolution, and wake every worker. Returns immediately; poll
    /// [`DynamicRenderer::image`] to observe progress.
    pub fn render(&self) {
        let (width, height) = {
            let camera = self.inner.camera.read();
            (camera.image_width(), camera.image_height())
        };
        self.inner.film.write().resize(width, height);
        self.inner.generation.fetch_add(1, Ordering::SeqCst);
        {
            let mut queue = self.inner.queue.lock();
            queue.tiles = tile_list(width, height);
            queue.next_index = 0;
        }
        self.inner.work_available.notify_all();
    }

    /// Drop any tiles queued or in flight at the time of the call; workers
    /// observe the generation bump and abandon stale work at the next tile
    /// boundary. Thread-safe, never blocks.
    pub fn terminate_render(&self) {
        self.inner.generation.fetch_add(1, Ordering::SeqCst);
        let mut queue = self.inner.queue.lock();
        queue.next_index = queue.tiles.len();
    }

    pub fn resize(&self, image_width: u32, props: CameraProperties) {
        let (x_samples, y_samples) = {
            let camera = self.inner.camera.read();
            let spp = camera.samples_per_pixel();
            let x = (spp as f64).sqrt().round().max(1.0) as u32;
            (x, (spp / x).max(1))
        };
        *self.inner.camera.write() = Camera::new(props, image_width, x_samples, y_samples);
        self.render();
    }

    pub fn update_camera_properties(&self, props: CameraProperties) {
        self.inner.camera.write().update_properties(props);
        self.render();
    }

    pub fn clear(&self) {
        self.inner.film.write().clear();
    }

    pub fn image(&self) -> Vec<u8> {
        self.inner.film.read().to_srgb_bytes()
    }

    /// Set `stopThreads`, wake every worker so it observes the flag, and
    /// join the pool.
    pub fn shutdown(mut self) {
        self.inner.stop_threads.store(true, Ordering::SeqCst);
        self.inner.work_available.notify_all();
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

fn worker_loop(inner: Arc<Inner>) {
    loop {
        if inner.stop_threads.load(Ordering::SeqCst) {
            return;
        }

        let (tile, generation) = {
            let mut queue = inner.queue.lock();
            loop {
                if inner.stop_threads.load(Ordering::SeqCst) {
                    return;
                }
                if queue.next_index < queue.tiles.len() {
                    let idx = queue.next_index;
                    queue.next_index += 1;
                    break (queue.tiles[idx], inner.generation.load(Ordering::SeqCst));
                }
                inner.work_available.wait(&mut queue);
            }
        };

        if generation != inner.generation.load(Ordering::SeqCst) {
            continue;
        }

        let film = inner.film.read();
        let camera = inner.camera.read();
        let stop = AtomicBool::new(false);
        render_tile(&inner.scene, &camera, &film, &inner.settings, &tile, &stop);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
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
    fn render_eventually_fills_the_framebuffer() {
        let scene = small_scene();
        let camera = Camera::new(CameraProperties::default(), 8, 1, 1);
        let renderer = DynamicRenderer::new(scene, camera, RenderSettings::default(), 2);
        renderer.render();

        let mut image = renderer.image();
        for _ in 0..200 {
            if image.iter().any(|&b| b != 0) {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(10));
            image = renderer.image();
        }
        assert!(image.iter().any(|&b| b != 0));
        renderer.shutdown();
    }

    #[test]
    fn terminate_render_is_callable_without_blocking() {
        let scene = small_scene();
        let camera = Camera::new(CameraProperties::default(), 8, 1, 1);
        let renderer = DynamicRenderer::new(scene, camera, RenderSettings::default(), 1);
        renderer.render();
        renderer.terminate_render();
        renderer.shutdown();
    }
}
