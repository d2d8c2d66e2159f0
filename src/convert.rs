//! Image to text pipeline: greyscale, resize, equalize, invert, quantize.

use crate::aspect::AspectModel;
use crate::lut::Lut;
use crate::registry::{self, LutRegistry};
use crate::render;
use crate::{LutsciiError, Result};
use fontdue::Font;
use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, ImageError, RgbImage, RgbaImage};
use log::warn;
use ndarray::Array2;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Anything the pipeline can turn into a greyscale grid.
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// Image file decoded with the `image` crate.
    Path(PathBuf),
    /// Decoded bitmap of any colour type.
    Bitmap(DynamicImage),
    /// Greyscale samples, `rows x columns`.
    Grid(Array2<u8>),
    /// Interleaved 8-bit buffer with 1, 3 (RGB) or 4 (RGBA) channels.
    Raw {
        width: u32,
        height: u32,
        channels: u8,
        data: Vec<u8>,
    },
}

impl ImageSource {
    /// Normalize to a single-channel image.
    pub fn into_gray(self) -> Result<GrayImage> {
        match self {
            ImageSource::Path(path) => match image::open(&path) {
                Ok(img) => Ok(img.to_luma8()),
                Err(ImageError::Unsupported(e)) => Err(LutsciiError::UnsupportedImageType(
                    format!("{}: {}", path.display(), e),
                )),
                Err(e) => Err(e.into()),
            },
            ImageSource::Bitmap(img) => Ok(img.to_luma8()),
            ImageSource::Grid(grid) => {
                let (rows, cols) = grid.dim();
                if rows == 0 || cols == 0 {
                    return Err(LutsciiError::UnsupportedImageType(format!(
                        "empty sample grid ({rows}x{cols})"
                    )));
                }
                let samples: Vec<u8> = grid.iter().copied().collect();
                GrayImage::from_raw(cols as u32, rows as u32, samples).ok_or_else(|| {
                    LutsciiError::UnsupportedImageType("sample grid too large".into())
                })
            }
            ImageSource::Raw { width, height, channels, data } => {
                let short = || {
                    LutsciiError::UnsupportedImageType(format!(
                        "{} bytes is too short for {width}x{height}x{channels}",
                        data.len()
                    ))
                };
                let img = match channels {
                    1 => DynamicImage::ImageLuma8(
                        GrayImage::from_raw(width, height, data.clone()).ok_or_else(short)?,
                    ),
                    3 => DynamicImage::ImageRgb8(
                        RgbImage::from_raw(width, height, data.clone()).ok_or_else(short)?,
                    ),
                    4 => DynamicImage::ImageRgba8(
                        RgbaImage::from_raw(width, height, data.clone()).ok_or_else(short)?,
                    ),
                    n => {
                        return Err(LutsciiError::UnsupportedImageType(format!(
                            "{n}-channel buffer"
                        )))
                    }
                };
                if width == 0 || height == 0 {
                    return Err(LutsciiError::UnsupportedImageType("empty buffer".into()));
                }
                Ok(img.to_luma8())
            }
        }
    }
}

impl From<PathBuf> for ImageSource {
    fn from(path: PathBuf) -> Self {
        ImageSource::Path(path)
    }
}

impl From<&Path> for ImageSource {
    fn from(path: &Path) -> Self {
        ImageSource::Path(path.to_path_buf())
    }
}

impl From<DynamicImage> for ImageSource {
    fn from(img: DynamicImage) -> Self {
        ImageSource::Bitmap(img)
    }
}

impl From<GrayImage> for ImageSource {
    fn from(img: GrayImage) -> Self {
        ImageSource::Bitmap(DynamicImage::ImageLuma8(img))
    }
}

impl From<Array2<u8>> for ImageSource {
    fn from(grid: Array2<u8>) -> Self {
        ImageSource::Grid(grid)
    }
}

/// Which quantization path produces the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LookupMethod {
    /// Binary search per pixel.
    Scan,
    /// Table digitization, rows in parallel.
    #[default]
    Bulk,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConvertOptions {
    /// Characters per source pixel, before aspect correction.
    pub scale_factor: f64,
    pub invert: bool,
    pub equalize: bool,
    /// Built-in LUT name or a palette string.
    pub lut: String,
    pub lookup: LookupMethod,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            scale_factor: 0.2,
            invert: false,
            equalize: true,
            lut: "simple".to_string(),
            lookup: LookupMethod::Bulk,
        }
    }
}

impl ConvertOptions {
    pub fn with_scale(mut self, scale_factor: f64) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    pub fn with_invert(mut self, enabled: bool) -> Self {
        self.invert = enabled;
        self
    }

    pub fn with_equalize(mut self, enabled: bool) -> Self {
        self.equalize = enabled;
        self
    }

    pub fn with_lut(mut self, lut: impl Into<String>) -> Self {
        self.lut = lut.into();
        self
    }

    pub fn with_lookup(mut self, lookup: LookupMethod) -> Self {
        self.lookup = lookup;
        self
    }
}

/// Pipeline bound to one active LUT and its aspect factor.
pub struct Converter {
    options: ConvertOptions,
    lut: Arc<Lut>,
    aspect: Arc<AspectModel>,
    factor: f64,
}

impl Converter {
    /// Resolve the LUT through the process-wide registry.
    pub fn new(options: ConvertOptions) -> Result<Self> {
        Self::with_registry(options, registry::global())
    }

    pub fn with_registry(options: ConvertOptions, registry: &LutRegistry) -> Result<Self> {
        let lut = registry.get(&options.lut)?;
        let aspect = Arc::new(AspectModel::fallback());
        let factor = aspect.factor_for(&lut);
        Ok(Self { options, lut, aspect, factor })
    }

    pub fn with_aspect_model(mut self, model: AspectModel) -> Self {
        self.set_aspect_model(model);
        self
    }

    pub fn set_aspect_model(&mut self, model: AspectModel) {
        self.aspect = Arc::new(model);
        self.factor = self.aspect.factor_for(&self.lut);
    }

    pub fn set_scale(&mut self, scale_factor: f64) {
        self.options.scale_factor = scale_factor;
    }

    pub fn set_invert(&mut self, enabled: bool) {
        self.options.invert = enabled;
    }

    pub fn set_equalize(&mut self, enabled: bool) {
        self.options.equalize = enabled;
    }

    pub fn set_lookup(&mut self, lookup: LookupMethod) {
        self.options.lookup = lookup;
    }

    /// Switch to a registered LUT or palette string.
    pub fn set_lut(&mut self, name_or_palette: &str) -> Result<()> {
        self.set_lut_from(name_or_palette, registry::global())
    }

    pub fn set_lut_from(&mut self, name_or_palette: &str, registry: &LutRegistry) -> Result<()> {
        let lut = registry.get(name_or_palette)?;
        self.options.lut = name_or_palette.to_string();
        self.use_lut(lut);
        Ok(())
    }

    /// Use a LUT that is not in any registry, e.g. one loaded from a file.
    pub fn set_lut_table(&mut self, lut: Lut) {
        self.options.lut = lut.characters().iter().collect();
        self.use_lut(Arc::new(lut));
    }

    fn use_lut(&mut self, lut: Arc<Lut>) {
        self.factor = self.aspect.factor_for(&lut);
        self.lut = lut;
    }

    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    pub fn lut(&self) -> &Lut {
        &self.lut
    }

    pub fn aspect_factor(&self) -> f64 {
        self.factor
    }

    /// Text extent `(rows, columns)` for a `width x height` source.
    pub fn output_size(&self, width: u32, height: u32) -> (u32, u32) {
        let (w, h) = target_dimensions(width, height, self.options.scale_factor, self.factor);
        (h, w)
    }

    pub fn convert(&self, source: impl Into<ImageSource>) -> Result<String> {
        let gray = source.into().into_gray()?;
        self.convert_gray(&gray)
    }

    pub fn convert_gray(&self, gray: &GrayImage) -> Result<String> {
        let scale = self.options.scale_factor;
        if !scale.is_finite() || scale <= 0.0 {
            return Err(LutsciiError::InvalidScale(scale));
        }
        let (w, h) = target_dimensions(gray.width(), gray.height(), scale, self.factor);
        if w as u64 * h as u64 > MAX_OUTPUT_CELLS {
            return Err(LutsciiError::OutputTooLarge {
                width: w,
                height: h,
                limit: MAX_OUTPUT_CELLS,
            });
        }
        let mut small = imageops::resize(gray, w, h, FilterType::Triangle);
        if self.options.equalize {
            equalize(&mut small);
        }
        if self.options.invert {
            invert(&mut small);
        }

        let grid = Array2::from_shape_fn((h as usize, w as usize), |(y, x)| {
            small.get_pixel(x as u32, y as u32).0[0]
        });
        Ok(match self.options.lookup {
            LookupMethod::Scan => self.lut.quantize(grid.view()),
            LookupMethod::Bulk => self.lut.quantize_bulk(grid.view()),
        })
    }
}

/// Largest text block, in glyphs, a single conversion may produce.
pub const MAX_OUTPUT_CELLS: u64 = 1 << 26;

/// Resized `(width, height)`: truncated, never below 1.
fn target_dimensions(width: u32, height: u32, scale: f64, aspect: f64) -> (u32, u32) {
    let w = (width as f64 * scale) as u32;
    let h = (height as f64 * scale * aspect) as u32;
    if w == 0 || h == 0 {
        warn!(
            "resize of {}x{} by {} collapses to {}x{}, clamping to at least 1x1",
            width, height, scale, w, h
        );
    }
    (w.max(1), h.max(1))
}

/// Histogram equalization over the 0..=255 range.
///
/// The last occupied bin is left out of the step so the brightest level
/// maps to the top of the range.
pub fn equalize(img: &mut GrayImage) {
    let mut hist = [0u64; 256];
    for p in img.pixels() {
        hist[p.0[0] as usize] += 1;
    }

    let occupied: Vec<u64> = hist.iter().copied().filter(|&c| c > 0).collect();
    let Some(&last) = occupied.last() else {
        return;
    };
    if occupied.len() < 2 {
        return;
    }
    let step = (occupied.iter().sum::<u64>() - last) / 255;
    if step == 0 {
        return;
    }

    let mut table = [0u8; 256];
    let mut n = step / 2;
    for (i, slot) in table.iter_mut().enumerate() {
        *slot = (n / step).min(255) as u8;
        n += hist[i];
    }
    for p in img.pixels_mut() {
        p.0[0] = table[p.0[0] as usize];
    }
}

pub fn invert(img: &mut GrayImage) {
    imageops::invert(img);
}

/// Convert with the process-wide registry and no font metrics.
pub fn convert(
    source: impl Into<ImageSource>,
    scale_factor: f64,
    invert: bool,
    equalize: bool,
    lut: &str,
) -> Result<String> {
    let options = ConvertOptions::default()
        .with_scale(scale_factor)
        .with_invert(invert)
        .with_equalize(equalize)
        .with_lut(lut);
    Converter::new(options)?.convert(source)
}

/// `(rows, columns)` of a text block, counted in glyphs.
pub fn text_size(text: &str) -> (usize, usize) {
    let lines = text.lines();
    let columns = lines.clone().next().map_or(0, |l| l.chars().count());
    (lines.count(), columns)
}

/// One converted frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsciiImage {
    data: String,
}

impl AsciiImage {
    pub fn new(source: impl Into<ImageSource>, converter: &Converter) -> Result<Self> {
        Ok(Self { data: converter.convert(source)? })
    }

    pub fn data(&self) -> &str {
        &self.data
    }

    pub fn into_string(self) -> String {
        self.data
    }

    pub fn size(&self) -> (usize, usize) {
        text_size(&self.data)
    }

    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, &self.data)?;
        Ok(())
    }

    /// Draw the text with `font` and save it as an image.
    pub fn render(&self, path: impl AsRef<Path>, font: &Font, font_size: f32) -> Result<()> {
        let img = render::text_to_image(
            &self.data,
            font,
            font_size,
            render::DEFAULT_BACKGROUND,
            render::DEFAULT_FOREGROUND,
        )?;
        img.save(path)?;
        Ok(())
    }
}

impl From<String> for AsciiImage {
    fn from(data: String) -> Self {
        Self { data }
    }
}

impl fmt::Display for AsciiImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.data)
    }
}
