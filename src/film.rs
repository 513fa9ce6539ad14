//! Accumulation-buffer framebuffer. Unlike the pixel-reconstruction-filter
//! film this crate started from, samples land on exactly one pixel (the one
//! the camera ray was shot through); resolving the image is a plain running
//! average, no filter weights involved.

use std::sync::atomic::{AtomicU32, Ordering};

use crate::spectrum::Spectrum;
use crate::{clamp, Point2i};

#[derive(Default)]
struct AtomicFloat {
    bits: AtomicU32,
}

impl AtomicFloat {
    fn new(v: f32) -> AtomicFloat {
        AtomicFloat { bits: AtomicU32::new(v.to_bits()) }
    }

    fn load(&self) -> f32 {
        f32::from_bits(self.bits.load(Ordering::Relaxed))
    }

    fn store(&self, v: f32) {
        self.bits.store(v.to_bits(), Ordering::Relaxed);
    }

    /// Atomic `self += v`, via a compare-and-swap retry loop (there's no
    /// hardware atomic float add).
    fn add(&self, v: f32) {
        let mut current = self.bits.load(Ordering::Relaxed);
        loop {
            let new = (f32::from_bits(current) + v).to_bits();
            match self.bits.compare_exchange_weak(current, new, Ordering::Relaxed, Ordering::Relaxed) {
                Ok(_) => return,
                Err(actual) => current = actual,
            }
        }
    }
}

#[derive(Default)]
struct FilmPixel {
    r: AtomicFloat,
    g: AtomicFloat,
    b: AtomicFloat,
    samples: AtomicU32,
}

/// A `width x height` grid of accumulating pixels. Disjoint tiles owned by
/// different worker threads touch disjoint pixels, so accumulation needs no
/// locking; each channel is just an atomically-added float plus a sample
/// count.
pub struct Film {
    width: u32,
    height: u32,
    pixels: Vec<FilmPixel>,
}

impl Film {
    pub fn new(width: u32, height: u32) -> Film {
        let mut pixels = Vec::with_capacity((width * height) as usize);
        pixels.resize_with((width * height) as usize, FilmPixel::default);
        Film { width, height, pixels }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Discard accumulated samples without reallocating, for a re-render at
    /// the same resolution (e.g. after a camera property change).
    pub fn clear(&mut self) {
        for p in &mut self.pixels {
            p.r.store(0.0);
            p.g.store(0.0);
            p.b.store(0.0);
            p.samples.store(0, Ordering::Relaxed);
        }
    }

    /// Reallocate for a new resolution; implicitly clears.
    pub fn resize(&mut self, width: u32, height: u32) {
        *self = Film::new(width, height);
    }

    fn index(&self, p: Point2i) -> usize {
        (p.y as u32 * self.width + p.x as u32) as usize
    }

    pub fn add_sample(&self, p: Point2i, radiance: Spectrum) {
        if radiance.has_nan() {
            warn!("sample radiance has NaNs at pixel {:?}, ignoring", p);
            return;
        }
        let idx = self.index(p);
        let pixel = &self.pixels[idx];
        pixel.r.add(radiance.r);
        pixel.g.add(radiance.g);
        pixel.b.add(radiance.b);
        pixel.samples.fetch_add(1, Ordering::Relaxed);
    }

    /// The running average at `p`; black if no samples have landed yet.
    pub fn resolve_pixel(&self, p: Point2i) -> Spectrum {
        let pixel = &self.pixels[self.index(p)];
        let n = pixel.samples.load(Ordering::Relaxed);
        if n == 0 {
            return Spectrum::black();
        }
        Spectrum::rgb(pixel.r.load(), pixel.g.load(), pixel.b.load()) / n as f32
    }

    /// The whole framebuffer, 8-bit sRGB-encoded, row-major, origin
    /// top-left, `width * height * 3` bytes. Intensities are clamped to
    /// `[0, 0.999]` before gamma encoding so `to_srgb`'s rounding never
    /// overflows into `256`.
    pub fn to_srgb_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity((self.width * self.height * 3) as usize);
        for y in 0..self.height {
            for x in 0..self.width {
                let radiance = self.resolve_pixel(Point2i::new(x as i32, y as i32));
                let clamped = Spectrum::rgb(
                    clamp(radiance.r, 0.0, 0.999),
                    clamp(radiance.g, 0.0, 0.999),
                    clamp(radiance.b, 0.0, 0.999),
                );
                out.extend_from_slice(&clamped.to_srgb());
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsampled_pixel_resolves_to_black() {
        let film = Film::new(4, 4);
        assert_eq!(film.resolve_pixel(Point2i::new(1, 1)), Spectrum::black());
    }

    #[test]
    fn accumulates_running_average() {
        let film = Film::new(2, 2);
        film.add_sample(Point2i::new(0, 0), Spectrum::white());
        film.add_sample(Point2i::new(0, 0), Spectrum::black());
        let avg = film.resolve_pixel(Point2i::new(0, 0));
        assert!(relative_eq!(avg.r, 0.5));
    }

    #[test]
    fn clear_resets_all_pixels() {
        let mut film = Film::new(2, 2);
        film.add_sample(Point2i::new(0, 0), Spectrum::white());
        film.clear();
        assert_eq!(film.resolve_pixel(Point2i::new(0, 0)), Spectrum::black());
    }

    #[test]
    fn to_srgb_bytes_has_expected_length() {
        let film = Film::new(3, 2);
        assert_eq!(film.to_srgb_bytes().len(), 3 * 2 * 3);
    }

    #[test]
    fn nan_sample_is_dropped() {
        let film = Film::new(1, 1);
        film.add_sample(Point2i::new(0, 0), Spectrum::rgb(f32::NAN, 0.0, 0.0));
        assert_eq!(film.resolve_pixel(Point2i::new(0, 0)), Spectrum::black());
    }
}
