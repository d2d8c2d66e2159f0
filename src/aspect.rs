//! Aspect correction for non-square glyph cells.
//!
//! Glyphs are taller than wide, so an image resized to one character per
//! pixel would look vertically stretched. The correction factor is the
//! glyph's width over its line height; rows are scaled by it.

use crate::lut::Lut;
use crate::width::{self, WidthClass};
use crate::{LutsciiError, Result};
use fontdue::{Font, FontSettings};
use log::{debug, warn};
use std::path::Path;

/// Used when no font metrics are available; one narrow cell.
pub const DEFAULT_ASPECT_CORRECTION_FACTOR: f64 = 6.0 / 11.0;

/// Pixel size glyphs are measured at.
pub const REFERENCE_FONT_SIZE: f32 = 10.0;

pub struct AspectModel {
    font: Option<Font>,
}

impl AspectModel {
    /// Model without font metrics; always yields the default constant.
    pub fn fallback() -> Self {
        Self { font: None }
    }

    pub fn from_font(font: Font) -> Self {
        Self { font: Some(font) }
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let font = Font::from_bytes(data, FontSettings::default())
            .map_err(|e| LutsciiError::Font(e.to_string()))?;
        Ok(Self::from_font(font))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_bytes(&data)
    }

    /// Load `font_reference` if given, falling back to the default constant
    /// when it is absent or cannot be read.
    pub fn load(font_reference: Option<&Path>) -> Self {
        match font_reference {
            None => Self::fallback(),
            Some(path) => Self::from_path(path).unwrap_or_else(|e| {
                warn!("cannot measure glyphs with {}: {}", path.display(), e);
                Self::fallback()
            }),
        }
    }

    pub fn font(&self) -> Option<&Font> {
        self.font.as_ref()
    }

    pub fn has_metrics(&self) -> bool {
        self.font.is_some()
    }

    /// Correction factor for `exemplar`, rendered in `class` cells.
    ///
    /// Glyphs present in the font use their own advance. Missing glyphs are
    /// measured as `class.multiplier()` space advances.
    pub fn factor(&self, exemplar: char, class: WidthClass) -> f64 {
        let multiplier = class.multiplier() as f64;
        let Some(font) = &self.font else {
            return DEFAULT_ASPECT_CORRECTION_FACTOR * multiplier;
        };
        let Some(line) = font.horizontal_line_metrics(REFERENCE_FONT_SIZE) else {
            warn!("font has no horizontal line metrics, using default aspect");
            return DEFAULT_ASPECT_CORRECTION_FACTOR * multiplier;
        };
        if line.new_line_size <= 0.0 {
            return DEFAULT_ASPECT_CORRECTION_FACTOR * multiplier;
        }

        let width = if font.lookup_glyph_index(exemplar) != 0 {
            font.metrics(exemplar, REFERENCE_FONT_SIZE).advance_width
        } else {
            font.metrics(' ', REFERENCE_FONT_SIZE).advance_width * multiplier as f32
        };
        if width <= 0.0 {
            return DEFAULT_ASPECT_CORRECTION_FACTOR * multiplier;
        }

        let factor = width as f64 / line.new_line_size as f64;
        debug!("aspect for {:?}: {:.4} ({}px / {}px)", exemplar, factor, width, line.new_line_size);
        factor
    }

    pub fn factor_for(&self, lut: &Lut) -> f64 {
        self.factor(lut.exemplar(), lut.width_class())
    }
}

impl Default for AspectModel {
    fn default() -> Self {
        Self::fallback()
    }
}

/// Correction factor for a single exemplar character.
///
/// Fails only when the character has no measurable width class; an
/// unreadable font falls back to the default constant.
pub fn aspect_correction_factor(exemplar: char, font_reference: Option<&Path>) -> Result<f64> {
    let class = width::classify(exemplar)?;
    Ok(AspectModel::load(font_reference).factor(exemplar, class))
}
