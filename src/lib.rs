//! Image to text converter using luminance lookup tables.

pub mod aspect;
pub mod convert;
pub mod lut;
pub mod registry;
pub mod render;
pub mod sequence;
pub mod width;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use aspect::{AspectModel, DEFAULT_ASPECT_CORRECTION_FACTOR};
pub use convert::{convert, text_size, AsciiImage, ConvertOptions, Converter, ImageSource, LookupMethod};
pub use lut::{linear_lut, Lut, LutDefinition};
pub use registry::{get_lut, LutRegistry};
pub use width::{EastAsianWidth, WidthClass, WidthTable};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LutsciiError {
    #[error("LUT needs one more character than bin edges (got {chars} characters, {edges} edges)")]
    InvalidShape { chars: usize, edges: usize },
    #[error("Invalid bin edges: {0}")]
    InvalidEdges(String),
    #[error("Palette has no characters")]
    EmptyPalette,
    #[error("Palette repeats character {0:?}")]
    DuplicateCharacter(char),
    #[error("Palette mixes narrow and wide characters: {0:?}")]
    MixedWidth(String),
    #[error("Unsupported character width for {0:?}")]
    UnsupportedWidth(char),
    #[error("Scale factor must be finite and positive, got {0}")]
    InvalidScale(f64),
    #[error("Output of {width}x{height} characters exceeds the {limit} cell limit")]
    OutputTooLarge { width: u32, height: u32, limit: u64 },
    #[error("Unsupported image type: {0}")]
    UnsupportedImageType(String),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Font error: {0}")]
    Font(String),
    #[error("LUT definition error: {0}")]
    Definition(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, LutsciiError>;
