use anyhow::{anyhow, Context, Result};
use gif::{DisposalMethod, Encoder, Frame, Repeat};
use image::{imageops, RgbaImage};
use std::path::{Path, PathBuf};

use super::Converter;
use crate::config::EncoderConfig;
use crate::delta;

pub struct GifConverter {
    path: PathBuf,
    config: EncoderConfig,
    width: u16,
    height: u16,
    frames: Vec<Frame<'static>>,
    previous: Option<RgbaImage>,
}

impl GifConverter {
    pub fn new(path: impl AsRef<Path>, config: EncoderConfig) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            config,
            width: 0,
            height: 0,
            frames: Vec::new(),
            previous: None,
        }
    }

    fn speed(&self) -> i32 {
        if self.config.optimize {
            1
        } else {
            10
        }
    }

    fn repeat(&self) -> Repeat {
        match self.config.loop_count {
            0 => Repeat::Infinite,
            n => Repeat::Finite(n),
        }
    }

    /// Returns the patch to draw and its offset on the canvas.
    fn patch_for(&self, image: &RgbaImage) -> (u32, u32, RgbaImage) {
        let prev = match &self.previous {
            Some(prev) if self.config.subrectangles && is_opaque(prev) && is_opaque(image) => prev,
            _ => return (0, 0, image.clone()),
        };

        match delta::changed_region(prev, image) {
            Some(region) => {
                let mut patch =
                    imageops::crop_imm(image, region.left, region.top, region.width, region.height)
                        .to_image();
                if self.config.optimize {
                    // unchanged pixels inside the patch show through from the kept frame
                    for (x, y, pixel) in patch.enumerate_pixels_mut() {
                        if *prev.get_pixel(region.left + x, region.top + y) == *pixel {
                            pixel.0 = [0, 0, 0, 0];
                        }
                    }
                }
                (region.left, region.top, patch)
            }
            // a frame is still needed to hold the delay
            None => (0, 0, imageops::crop_imm(image, 0, 0, 1, 1).to_image()),
        }
    }
}

fn is_opaque(image: &RgbaImage) -> bool {
    image.pixels().all(|p| p[3] == u8::MAX)
}

impl Converter for GifConverter {
    fn prepare(&mut self, width: u32, height: u32) -> Result<()> {
        self.width = u16::try_from(width)
            .map_err(|_| anyhow!("gif width {} exceeds {}", width, u16::MAX))?;
        self.height = u16::try_from(height)
            .map_err(|_| anyhow!("gif height {} exceeds {}", height, u16::MAX))?;
        log::info!(
            "width: {}, height: {}, fps: {}, palette: {}",
            width,
            height,
            self.config.fps,
            self.config.palette_size
        );
        self.frames.clear();
        self.previous = None;
        Ok(())
    }

    fn convert_frame(&mut self, image: RgbaImage, frame_id: u32) -> Result<()> {
        let (left, top, patch) = self.patch_for(&image);
        let is_full = (patch.width(), patch.height()) == (image.width(), image.height());

        if is_full && !is_opaque(&image) {
            // clear the previous frame so its pixels don't bleed through
            if let Some(last) = self.frames.last_mut() {
                last.dispose = DisposalMethod::Background;
            }
        }

        let (patch_width, patch_height) = patch.dimensions();
        let mut pixels = patch.into_raw();
        let mut frame =
            Frame::from_rgba_speed(patch_width as u16, patch_height as u16, &mut pixels, self.speed());
        frame.left = left as u16;
        frame.top = top as u16;
        frame.delay = ((self.config.frame_duration_ms(frame_id as usize) + 5) / 10) as u16;
        frame.dispose = DisposalMethod::Keep;

        self.frames.push(frame);
        self.previous = Some(image);
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        if self.frames.is_empty() {
            return Err(anyhow!("no frames to encode"));
        }

        let mut buffer = Vec::new();
        {
            let mut encoder = Encoder::new(&mut buffer, self.width, self.height, &[])?;
            encoder.set_repeat(self.repeat())?;
            for frame in &self.frames {
                encoder.write_frame(frame)?;
            }
            // trailer is written on drop
        }

        std::fs::write(&self.path, &buffer)
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        log::info!(
            "Wrote {} frame(s) to {} ({} bytes)",
            self.frames.len(),
            self.path.display(),
            buffer.len()
        );
        Ok(())
    }
}
