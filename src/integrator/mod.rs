//! Integration of the rendering equation along a camera ray. A single
//! unidirectional path-tracing scheme lives here; there is no
//! `SamplerIntegrator` trait/vtable indirection since it is the only
//! estimator this crate ships.

mod path;

pub use self::path::li;

pub fn init_stats() {
    path::init_stats();
}
