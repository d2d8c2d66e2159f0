//! lutbars - Preview lookup tables as gradient bars

use clap::Parser;
use lutscii::lut::{bars, Lut};
use lutscii::{get_lut, LutDefinition, LutsciiError};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "lutbars", about = "Preview lookup tables over a 0-255 gradient")]
struct Args {
    /// Lookup table names or palette strings
    #[arg(default_values_t = ["simple".to_string(), "binary".to_string()])]
    luts: Vec<String>,
    /// JSON lookup table definitions to preview as well
    #[arg(long)]
    lut_file: Vec<PathBuf>,
    /// Bar width in characters
    #[arg(short, long, default_value = "64")]
    width: usize,
    /// Bar height in rows
    #[arg(short = 'H', long, default_value = "2")]
    height: usize,
    /// Also list every bin as `lo-hi glyph`
    #[arg(short, long)]
    bins: bool,
}

fn main() -> Result<(), LutsciiError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let mut luts: Vec<(String, Arc<Lut>)> = Vec::new();
    for name in &args.luts {
        luts.push((name.clone(), get_lut(name)?));
    }
    for path in &args.lut_file {
        luts.push((path.display().to_string(), Arc::new(LutDefinition::load(path)?.build()?)));
    }

    for (name, lut) in &luts {
        println!("{} ({} glyphs, {:?})", name, lut.characters().len(), lut.width_class());
        let row = bars(lut, args.width);
        for _ in 0..args.height.max(1) {
            print!("{}", row);
        }
        if args.bins {
            for (lo, hi, glyph) in bin_ranges(lut) {
                println!("  {:>3}-{:<3} {:?}", lo, hi, glyph);
            }
        }
        println!();
    }

    Ok(())
}

/// Inclusive intensity range covered by each glyph.
fn bin_ranges(lut: &Lut) -> Vec<(u8, u8, char)> {
    let edges = lut.bin_edges();
    lut.characters()
        .iter()
        .enumerate()
        .map(|(i, &glyph)| {
            let lo = if i == 0 { 0 } else { edges[i - 1] };
            let hi = edges.get(i).map_or(255, |&e| e.saturating_sub(1));
            (lo, hi, glyph)
        })
        .collect()
}
