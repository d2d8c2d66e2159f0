//! Frame sequences: GIFs and decoded video frames.

use crate::convert::{Converter, ImageSource};
use crate::Result;
use image::codecs::gif::GifDecoder;
use image::{AnimationDecoder, DynamicImage};
use log::debug;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Frame delay used when the source does not carry one (15 fps).
pub const DEFAULT_FRAME_DELAY_MS: u32 = 1000 / 15;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsciiSequence {
    pub frames: Vec<String>,
    pub delay_ms: u32,
}

impl AsciiSequence {
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn fps(&self) -> f64 {
        1000.0 / self.delay_ms.max(1) as f64
    }
}

/// Convert independent frames; order is preserved.
pub fn convert_frames(converter: &Converter, frames: Vec<ImageSource>) -> Result<Vec<String>> {
    #[cfg(not(target_arch = "wasm32"))]
    let text: Result<Vec<String>> = {
        use rayon::prelude::*;
        frames
            .into_par_iter()
            .map(|frame| converter.convert(frame))
            .collect()
    };
    #[cfg(target_arch = "wasm32")]
    let text: Result<Vec<String>> = frames.into_iter().map(|frame| converter.convert(frame)).collect();
    text
}

/// Decode every frame of an animated GIF and convert it.
pub fn convert_gif(converter: &Converter, path: impl AsRef<Path>) -> Result<AsciiSequence> {
    let reader = BufReader::new(File::open(path.as_ref())?);
    let decoder = GifDecoder::new(reader)?;
    let frames = decoder.into_frames().collect_frames()?;

    let delay_ms = frames
        .first()
        .map(|f| {
            let (numer, denom) = f.delay().numer_denom_ms();
            numer / denom.max(1)
        })
        .filter(|&ms| ms > 0)
        .unwrap_or(DEFAULT_FRAME_DELAY_MS);
    debug!("{}: {} frames, {} ms each", path.as_ref().display(), frames.len(), delay_ms);

    let sources = frames
        .into_iter()
        .map(|f| ImageSource::Bitmap(DynamicImage::ImageRgba8(f.into_buffer())))
        .collect();
    Ok(AsciiSequence { frames: convert_frames(converter, sources)?, delay_ms })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::{text_size, ConvertOptions};
    use image::codecs::gif::GifEncoder;
    use image::{Delay, Frame, Rgba, RgbaImage};
    use ndarray::Array2;

    fn converter() -> Converter {
        let options = ConvertOptions::default()
            .with_scale(0.5)
            .with_equalize(false)
            .with_lut("binary");
        Converter::new(options).unwrap()
    }

    #[test]
    fn frames_keep_order() {
        let frames: Vec<ImageSource> = (0..6)
            .map(|i| {
                let v = if i % 2 == 0 { 0 } else { 255 };
                ImageSource::Grid(Array2::from_elem((44, 20), v))
            })
            .collect();
        let text = convert_frames(&converter(), frames).unwrap();
        assert_eq!(text.len(), 6);
        for (i, frame) in text.iter().enumerate() {
            let glyph = if i % 2 == 0 { ' ' } else { '@' };
            assert!(frame.lines().all(|l| l.chars().all(|c| c == glyph)));
            assert_eq!(text_size(frame).1, 10);
        }
    }

    #[test]
    fn gif_round_trip() {
        let file = tempfile::Builder::new().suffix(".gif").tempfile().unwrap();
        {
            let mut encoder = GifEncoder::new(file.reopen().unwrap());
            for v in [0u8, 255] {
                let buf = RgbaImage::from_pixel(32, 32, Rgba([v, v, v, 255]));
                let frame = Frame::from_parts(buf, 0, 0, Delay::from_numer_denom_ms(100, 1));
                encoder.encode_frame(frame).unwrap();
            }
        }
        let seq = convert_gif(&converter(), file.path()).unwrap();
        assert_eq!(seq.len(), 2);
        assert_eq!(seq.delay_ms, 100);
        assert!(seq.frames[0].lines().all(|l| l.chars().all(|c| c == ' ')));
        assert!(seq.frames[1].lines().all(|l| l.chars().all(|c| c == '@')));
    }
}
