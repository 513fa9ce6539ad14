//! Setup-time error taxonomy. Per-sample and per-ray failures inside the
//! hot render loop never construct one of these: a degenerate BSDF sample
//! or a zero-area triangle just makes that sample contribute nothing. Only
//! scene construction and driver setup/resize are allowed to fail loudly.

use failure::Fail;

pub type Result<T> = std::result::Result<T, RenderError>;

#[derive(Debug, Fail)]
pub enum RenderError {
    #[fail(display = "material index {} is out of range ({} materials)", index, len)]
    InvalidMaterialIndex { index: usize, len: usize },

    #[fail(display = "texture index {} is out of range ({} textures)", index, len)]
    InvalidTextureIndex { index: usize, len: usize },

    #[fail(display = "invalid image dimensions: {}x{}", width, height)]
    InvalidDimensions { width: u32, height: u32 },

    #[fail(display = "failed to build BVH: {}", _0)]
    BvhBuildFailed(String),

    #[fail(display = "render aborted: {}", _0)]
    Aborted(String),
}
