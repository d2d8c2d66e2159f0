//! lutscii CLI - Convert images and GIFs to text using luminance lookup tables

use clap::Parser;
use fontdue::{Font, FontSettings};
use lutscii::aspect::AspectModel;
use lutscii::render::{self, DEFAULT_FONT_SIZE};
use lutscii::sequence;
use lutscii::{AsciiImage, ConvertOptions, Converter, LutDefinition, LutsciiError};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "lutscii", about = "Convert images and GIFs to text art")]
struct Args {
    /// Input image or GIF
    input: PathBuf,
    /// Write the text here instead of stdout
    outfile: Option<PathBuf>,
    /// Characters per pixel
    #[arg(short, long, default_value = "0.2")]
    scale: f64,
    /// Invert luminance
    #[arg(short, long)]
    invert: bool,
    /// Skip histogram equalization
    #[arg(long)]
    no_equalize: bool,
    /// Lookup table name (simple, binary) or a dark-to-light palette string
    #[arg(short, long, default_value = "simple")]
    lut: String,
    /// JSON lookup table definition, overrides --lut
    #[arg(long)]
    lut_file: Option<PathBuf>,
    /// Font used to measure glyph aspect and to render images
    #[arg(short, long)]
    font: Option<PathBuf>,
    /// Font render pixel size
    #[arg(short = 'p', long, default_value_t = DEFAULT_FONT_SIZE)]
    font_size: f32,
    /// Render the text to this image file (needs --font)
    #[arg(long)]
    render: Option<PathBuf>,
    /// Print the (rows, columns) extent to stderr
    #[arg(long)]
    size: bool,
}

fn main() -> Result<(), LutsciiError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let options = ConvertOptions::default()
        .with_scale(args.scale)
        .with_invert(args.invert)
        .with_equalize(!args.no_equalize)
        .with_lut(&args.lut);
    let mut converter =
        Converter::new(options)?.with_aspect_model(AspectModel::load(args.font.as_deref()));
    if let Some(path) = &args.lut_file {
        converter.set_lut_table(LutDefinition::load(path)?.build()?);
    }

    let is_gif = args
        .input
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gif"));
    let frames: Vec<AsciiImage> = if is_gif {
        let seq = sequence::convert_gif(&converter, &args.input)?;
        log::info!("{} frames at {:.1} fps", seq.len(), seq.fps());
        seq.frames.into_iter().map(AsciiImage::from).collect()
    } else {
        vec![AsciiImage::new(args.input.as_path(), &converter)?]
    };

    if args.size {
        if let Some(first) = frames.first() {
            let (rows, cols) = first.size();
            eprintln!("({}, {})", rows, cols);
        }
    }

    match &args.outfile {
        Some(path) => {
            let text: String = frames.iter().map(AsciiImage::data).collect::<Vec<_>>().join("\n");
            std::fs::write(path, text)?;
        }
        None => {
            for frame in &frames {
                print!("{}", frame);
            }
        }
    }

    if let Some(target) = &args.render {
        let font = load_font(args.font.as_deref())?;
        match frames.as_slice() {
            [single] => single.render(target, &font, args.font_size)?,
            many => {
                for (i, frame) in many.iter().enumerate() {
                    frame.render(numbered(target, i), &font, args.font_size)?;
                }
            }
        }
        log::info!(
            "rendered {} image(s), {:?} px each",
            frames.len(),
            frames
                .first()
                .map(|f| render::image_size(f.data(), &font, args.font_size))
                .transpose()?
        );
    }

    Ok(())
}

fn load_font(path: Option<&Path>) -> Result<Font, LutsciiError> {
    let path = path.ok_or_else(|| LutsciiError::Font("--render needs --font".into()))?;
    let data = std::fs::read(path)?;
    Font::from_bytes(data, FontSettings::default()).map_err(|e| LutsciiError::Font(e.to_string()))
}

/// `out.png` -> `out_0003.png`
fn numbered(path: &Path, index: usize) -> PathBuf {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("frame");
    let name = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{stem}_{index:04}.{ext}"),
        None => format!("{stem}_{index:04}"),
    };
    path.with_file_name(name)
}
