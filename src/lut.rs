//! Luminance lookup tables: an ordered palette plus intensity bin edges.
//!
//! A sample `v` selects `characters[i]` where `i` is the number of edges
//! `<= v`, so a sample equal to an edge lands in the upper bin.

use crate::width::{self, EastAsianWidth, WidthClass, WidthTable};
use crate::{LutsciiError, Result};
use ndarray::{Array2, ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Serializable palette definition, e.g.
/// `{"characters": " @", "bin_edges": [128]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LutDefinition {
    pub characters: String,
    pub bin_edges: Vec<u8>,
}

impl LutDefinition {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    pub fn build(&self) -> Result<Lut> {
        Lut::new(&self.characters, &self.bin_edges)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Lut {
    chars: Vec<char>,
    edges: Vec<u8>,
    width: WidthClass,
    // glyph for every intensity, filled by a linear walk over the edges
    table: Vec<char>,
}

impl Lut {
    /// Build a LUT classified with the default East Asian Width table.
    pub fn new(characters: &str, bin_edges: &[u8]) -> Result<Self> {
        Self::with_width_table(characters, bin_edges, &EastAsianWidth)
    }

    pub fn with_width_table(
        characters: &str,
        bin_edges: &[u8],
        table: &dyn WidthTable,
    ) -> Result<Self> {
        let chars: Vec<char> = characters.chars().collect();
        if chars.len() != bin_edges.len() + 1 {
            return Err(LutsciiError::InvalidShape {
                chars: chars.len(),
                edges: bin_edges.len(),
            });
        }
        if let Some(w) = bin_edges.windows(2).find(|w| w[0] >= w[1]) {
            return Err(LutsciiError::InvalidEdges(format!(
                "edges must be strictly increasing, found {} then {}",
                w[0], w[1]
            )));
        }
        for (i, c) in chars.iter().enumerate() {
            if chars[..i].contains(c) {
                return Err(LutsciiError::DuplicateCharacter(*c));
            }
        }
        let width = width::palette_width(table, &chars)?;

        let mut lookup = Vec::with_capacity(256);
        let mut idx = 0;
        for v in 0..=255u8 {
            while idx < bin_edges.len() && bin_edges[idx] <= v {
                idx += 1;
            }
            lookup.push(chars[idx]);
        }

        Ok(Self {
            chars,
            edges: bin_edges.to_vec(),
            width,
            table: lookup,
        })
    }

    pub fn characters(&self) -> &[char] {
        &self.chars
    }

    pub fn bin_edges(&self) -> &[u8] {
        &self.edges
    }

    pub fn width_class(&self) -> WidthClass {
        self.width
    }

    /// Darkest glyph, the reference for aspect measurement.
    pub fn exemplar(&self) -> char {
        self.chars[0]
    }

    pub fn definition(&self) -> LutDefinition {
        LutDefinition {
            characters: self.chars.iter().collect(),
            bin_edges: self.edges.clone(),
        }
    }

    /// Palette index for one sample (binary search over the edges).
    pub fn index_of(&self, sample: u8) -> usize {
        self.edges.partition_point(|&e| e <= sample)
    }

    pub fn glyph(&self, sample: u8) -> char {
        self.chars[self.index_of(sample)]
    }

    /// Per-pixel scan: binary search every sample and build the text block.
    pub fn quantize(&self, grid: ArrayView2<'_, u8>) -> String {
        let (rows, cols) = grid.dim();
        let mut text = String::with_capacity(rows * (cols + 1) * self.width.multiplier() as usize);
        for row in grid.outer_iter() {
            for &v in row.iter() {
                text.push(self.glyph(v));
            }
            text.push('\n');
        }
        text
    }

    /// Bulk digitization: a character grid with one extra trailing column of
    /// newlines, so reading it row-major gives the text block.
    pub fn digitize(&self, grid: ArrayView2<'_, u8>) -> Array2<char> {
        let (rows, cols) = grid.dim();
        let mut out = Array2::from_elem((rows, cols + 1), '\n');
        out.slice_mut(ndarray::s![.., ..cols])
            .zip_mut_with(&grid, |o, &v| *o = self.table[v as usize]);
        out
    }

    /// Bulk path producing the text block; rows are digitized in parallel.
    pub fn quantize_bulk(&self, grid: ArrayView2<'_, u8>) -> String {
        let rows: Vec<ArrayView1<'_, u8>> = grid.axis_iter(Axis(0)).collect();
        let render = |row: &ArrayView1<u8>| -> String {
            let cells = row.insert_axis(Axis(0));
            self.digitize(cells).iter().collect()
        };

        #[cfg(not(target_arch = "wasm32"))]
        let lines: Vec<String> = {
            use rayon::prelude::*;
            rows.par_iter().map(render).collect()
        };
        #[cfg(target_arch = "wasm32")]
        let lines: Vec<String> = rows.iter().map(render).collect();

        lines.concat()
    }
}

/// LUT with evenly spaced edges for a dark-to-light string of distinct glyphs.
///
/// Edge `i` sits at `round((i + 0.5) * 255 / (n - 1))`, the midpoints of
/// `n - 1` equal cells over `0..=255`.
pub fn linear_lut(characters: &str) -> Result<Lut> {
    let n = characters.chars().count();
    let edges: Vec<u8> = if n < 2 {
        Vec::new()
    } else {
        let cell = 255.0 / (n - 1) as f64;
        (0..n - 1)
            .map(|i| ((i as f64 + 0.5) * cell).round().min(255.0) as u8)
            .collect()
    };
    Lut::new(characters, &edges)
}

/// One-row preview of the palette over a 0..=255 gradient.
pub fn bars(lut: &Lut, width: usize) -> String {
    let width = width.max(1);
    let gradient = Array2::from_shape_fn((1, width), |(_, x)| {
        if width == 1 {
            0
        } else {
            (x * 255 / (width - 1)) as u8
        }
    });
    lut.quantize(gradient.view())
}
