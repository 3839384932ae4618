use anyhow::{anyhow, Result};
use clap::Parser;
use std::path::{Path, PathBuf};

use crate::config::EncoderConfig;
use crate::converter::OutputFormat;
use crate::frames::FrameNaming;

mod config;
mod converter;
mod delta;
mod frames;
mod quantize;

/// Collects the frames in `range` under `input_dir` and encodes them into `output`.
fn build_animation(
    input_dir: impl AsRef<Path>,
    range: std::ops::Range<u32>,
    naming: &FrameNaming,
    output: impl AsRef<Path>,
    format: OutputFormat,
    config: &EncoderConfig,
) -> Result<()> {
    config.validate()?;
    if range.start > range.end {
        return Err(anyhow!("reversed frame range {}..{}", range.start, range.end));
    }

    let images = frames::collect_frames(input_dir, range, naming)?;
    converter::encode_sequence(images, format, output, config)
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Directory holding the numbered frames
    #[arg(short, long, default_value = ".")]
    input_dir: PathBuf,

    #[arg(short, long, default_value = "result.webp")]
    output: PathBuf,

    /// Inferred from the output extension when omitted
    #[arg(short, long)]
    format: Option<OutputFormat>,

    /// First candidate frame index
    #[arg(long, default_value_t = 0)]
    start: u32,

    /// One past the last candidate frame index
    #[arg(long, default_value_t = 300)]
    end: u32,

    #[arg(long, default_value = "frame_")]
    prefix: String,

    /// Zero-padding width of the frame index
    #[arg(long, default_value_t = 2)]
    pad_width: usize,

    #[arg(long, default_value = "png")]
    extension: String,

    #[arg(long, default_value_t = 24.0)]
    fps: f32,

    /// Maximum number of colors per frame
    #[arg(long, default_value_t = 64)]
    palette_size: u16,

    /// Store full frames instead of the changed region only
    #[arg(long)]
    no_subrectangles: bool,

    /// 0 loops forever
    #[arg(long, default_value_t = 0)]
    loop_count: u16,

    #[arg(long)]
    no_optimize: bool,

    /// Lossy WebP quality (0-100), lossless when omitted
    #[arg(long)]
    quality: Option<f32>,
}

impl Args {
    fn naming(&self) -> FrameNaming {
        FrameNaming {
            prefix: self.prefix.clone(),
            pad_width: self.pad_width,
            extension: self.extension.clone(),
        }
    }

    fn encoder_config(&self) -> EncoderConfig {
        EncoderConfig {
            fps: self.fps,
            palette_size: self.palette_size,
            subrectangles: !self.no_subrectangles,
            loop_count: self.loop_count,
            optimize: !self.no_optimize,
            quality: self.quality,
        }
    }

    fn output_format(&self) -> Result<OutputFormat> {
        match self.format {
            Some(format) => Ok(format),
            None => OutputFormat::from_path(&self.output),
        }
    }
}

fn main() -> Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
    let args = Args::parse();
    let format = args.output_format()?;
    build_animation(
        &args.input_dir,
        args.start..args.end,
        &args.naming(),
        &args.output,
        format,
        &args.encoder_config(),
    )
}
