use anyhow::{anyhow, Result};
use image::RgbaImage;
use std::path::Path;

use crate::config::EncoderConfig;
use crate::quantize;

mod gif;
mod webp;

pub use self::{gif::GifConverter, webp::WebpConverter};

pub trait Converter {
    fn prepare(&mut self, width: u32, height: u32) -> Result<()>;
    fn convert_frame(&mut self, image: RgbaImage, frame_id: u32) -> Result<()>;
    fn finish(&mut self) -> Result<()>;
}

#[derive(Debug, clap::ValueEnum, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Webp,
    Gif,
}

impl OutputFormat {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());
        match ext.as_deref() {
            Some("webp") => Ok(Self::Webp),
            Some("gif") => Ok(Self::Gif),
            _ => Err(anyhow!(
                "cannot infer output format from {}, pass --format",
                path.display()
            )),
        }
    }

    /// Colors left for frame pixels once the format's own entries are
    /// reserved.
    pub fn palette_limit(self, config: &EncoderConfig) -> u16 {
        match self {
            // masked GIF patches need one slot for the transparent index
            Self::Gif if config.subrectangles && config.optimize => config.palette_size.min(255),
            _ => config.palette_size,
        }
    }
}

pub fn converter_for(
    format: OutputFormat,
    output: impl AsRef<Path>,
    config: EncoderConfig,
) -> Box<dyn Converter> {
    match format {
        OutputFormat::Webp => {
            log::info!("Encoding animated WebP");
            Box::new(WebpConverter::new(output, config))
        }
        OutputFormat::Gif => {
            log::info!("Encoding animated GIF");
            Box::new(GifConverter::new(output, config))
        }
    }
}

/// Encodes `frames` in order into a single animation at `output`.
///
/// Every frame must share the first frame's dimensions. An empty sequence
/// is an error and leaves `output` untouched.
pub fn encode_sequence(
    frames: Vec<RgbaImage>,
    format: OutputFormat,
    output: impl AsRef<Path>,
    config: &EncoderConfig,
) -> Result<()> {
    config.validate()?;
    let (width, height) = frames
        .first()
        .ok_or_else(|| anyhow!("no frames to encode"))?
        .dimensions();

    let palette_size = format.palette_limit(config);
    let mut converter = converter_for(format, output, config.clone());
    converter.prepare(width, height)?;

    let frame_count = frames.len();
    for (frame_id, image) in frames.into_iter().enumerate() {
        if image.dimensions() != (width, height) {
            return Err(anyhow!(
                "frame size mismatch at position {}: expected {}x{}, got {}x{}",
                frame_id,
                width,
                height,
                image.width(),
                image.height()
            ));
        }
        let image = quantize::reduce_palette(image, palette_size);
        converter.convert_frame(image, frame_id as u32)?;
        log::debug!("Encoded {}/{} frame(s)", frame_id + 1, frame_count);
    }

    converter.finish()
}
