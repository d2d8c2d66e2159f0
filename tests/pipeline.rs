use image::{GrayImage, Luma, RgbImage};
use lutscii::aspect::AspectModel;
use lutscii::registry::LutRegistry;
use lutscii::{
    convert, get_lut, text_size, ConvertOptions, Converter, ImageSource, LookupMethod, Lut,
    LutsciiError,
};
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const MONO: &[u8] = include_bytes!("../assets/DejaVuSansMono.ttf");

fn random_grid(rng: &mut StdRng, rows: usize, cols: usize) -> Array2<u8> {
    Array2::from_shape_fn((rows, cols), |_| rng.gen::<u8>())
}

#[test]
fn scan_and_bulk_quantization_agree() {
    let mut rng = StdRng::seed_from_u64(7);
    for name in ["simple", "binary", "\u{3105}\u{3106}\u{3107}"] {
        let lut = get_lut(name).unwrap();
        for (rows, cols) in [(1, 1), (3, 17), (300, 300), (64, 1)] {
            let grid = random_grid(&mut rng, rows, cols);
            assert_eq!(
                lut.quantize(grid.view()),
                lut.quantize_bulk(grid.view()),
                "{name} {rows}x{cols}"
            );
        }
    }
}

#[test]
fn every_intensity_agrees_on_both_paths() {
    let grid = Array2::from_shape_fn((1, 256), |(_, x)| x as u8);
    for name in ["simple", "binary"] {
        let lut = get_lut(name).unwrap();
        assert_eq!(lut.quantize(grid.view()), lut.quantize_bulk(grid.view()));
    }
}

#[test]
fn simple_extremes() {
    let lut = get_lut("SIMPLE").unwrap();
    let grid = ndarray::array![[0u8, 255]];
    assert_eq!(lut.quantize(grid.view()), " @\n");
}

#[test]
fn binary_boundary() {
    let lut = get_lut("binary").unwrap();
    let grid = ndarray::array![[0u8, 127, 128, 255]];
    let text = lut.quantize_bulk(grid.view());
    assert_eq!(text.chars().collect::<Vec<_>>(), vec![' ', ' ', '@', '@', '\n']);
}

#[test]
fn output_shape_matches_measurement() {
    let mut rng = StdRng::seed_from_u64(11);
    let img = random_grid(&mut rng, 480, 640);
    let fonts = [AspectModel::fallback(), AspectModel::from_bytes(MONO).unwrap()];
    for model in fonts {
        let mut converter = Converter::new(ConvertOptions::default()).unwrap();
        converter.set_aspect_model(model);
        for lut in ["simple", "binary", "\u{3105}\u{3106}\u{3107}"] {
            converter.set_lut(lut).unwrap();
            for scale in [0.5, 0.2, 0.1, 0.013, 0.0001] {
                for (invert, equalize) in [(false, false), (true, false), (false, true), (true, true)] {
                    converter.set_scale(scale);
                    converter.set_invert(invert);
                    converter.set_equalize(equalize);

                    let text = converter.convert(img.clone()).unwrap();
                    let aspect = converter.aspect_factor();
                    let rows = ((480.0 * scale * aspect) as usize).max(1);
                    let cols = ((640.0 * scale) as usize).max(1);
                    assert_eq!(text_size(&text), (rows, cols), "{lut} at {scale}");
                    assert_eq!(converter.output_size(640, 480), (rows as u32, cols as u32));
                    assert!(text.ends_with('\n'));
                    assert!(text.lines().all(|l| l.chars().count() == cols));
                }
            }
        }
    }
}

#[test]
fn wide_palette_doubles_aspect() {
    let narrow = Converter::new(ConvertOptions::default().with_lut("binary")).unwrap();
    let wide = Converter::new(ConvertOptions::default().with_lut("\u{3105}\u{3106}")).unwrap();
    assert_eq!(wide.aspect_factor(), 2.0 * narrow.aspect_factor());
}

#[test]
fn uniform_black_frame_with_binary() {
    let grid = Array2::<u8>::zeros((480, 640));
    let text = convert(grid, 0.5, false, false, "binary").unwrap();
    assert!(text.chars().all(|c| c == ' ' || c == '\n'));
    let rows = (480.0 * 0.5 * lutscii::DEFAULT_ASPECT_CORRECTION_FACTOR) as usize;
    assert_eq!(text_size(&text), (rows, 320));
}

#[test]
fn scan_lookup_matches_bulk_lookup() {
    let mut rng = StdRng::seed_from_u64(3);
    let img = random_grid(&mut rng, 120, 90);
    let options = ConvertOptions::default().with_scale(0.7);
    let scan = Converter::new(options.clone().with_lookup(LookupMethod::Scan)).unwrap();
    let bulk = Converter::new(options.with_lookup(LookupMethod::Bulk)).unwrap();
    assert_eq!(scan.convert(img.clone()).unwrap(), bulk.convert(img).unwrap());
}

#[test]
fn colour_bitmap_and_file_inputs() {
    let rgb = RgbImage::from_fn(60, 40, |x, _| {
        let v = (x * 4) as u8;
        image::Rgb([v, v, v])
    });
    let converter = Converter::new(ConvertOptions::default().with_scale(0.5)).unwrap();
    let from_bitmap = converter.convert(image::DynamicImage::ImageRgb8(rgb.clone())).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ramp.png");
    rgb.save(&path).unwrap();
    let from_file = converter.convert(path.as_path()).unwrap();
    assert_eq!(from_bitmap, from_file);
}

#[test]
fn unknown_file_type_is_unsupported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, "not an image").unwrap();
    let err = convert(path, 0.2, false, true, "simple").unwrap_err();
    assert!(matches!(err, LutsciiError::UnsupportedImageType(_)), "{err}");
}

#[test]
fn equalize_recovers_low_contrast_detail() {
    let img = GrayImage::from_fn(200, 110, |x, _| Luma([100 + (x / 25) as u8]));
    let flat = convert(img.clone(), 0.5, false, false, "simple").unwrap();
    let spread = convert(img, 0.5, false, true, "simple").unwrap();
    let distinct = |t: &str| {
        let mut glyphs: Vec<char> = t.chars().filter(|&c| c != '\n').collect();
        glyphs.sort_unstable();
        glyphs.dedup();
        glyphs.len()
    };
    assert!(distinct(&spread) > distinct(&flat));
}

#[test]
fn registry_instance_is_independent_of_global() {
    let registry = LutRegistry::new().unwrap();
    let options = ConvertOptions::default().with_lut("xyz");
    let converter = Converter::with_registry(options, &registry).unwrap();
    assert!(registry.contains("XYZ"));
    assert_eq!(converter.lut().characters(), &['x', 'y', 'z']);
}

#[test]
fn lut_definition_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lut.json");
    std::fs::write(&path, r#"{"characters": " .#", "bin_edges": [50, 200]}"#).unwrap();
    let lut: Lut = lutscii::LutDefinition::load(&path).unwrap().build().unwrap();
    let mut converter = Converter::new(ConvertOptions::default().with_equalize(false)).unwrap();
    converter.set_lut_table(lut);
    let text = converter
        .convert(ImageSource::Grid(Array2::from_elem((40, 40), 120)))
        .unwrap();
    assert!(text.lines().all(|l| l.chars().all(|c| c == '.')));
}
