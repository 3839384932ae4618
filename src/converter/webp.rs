use anyhow::{anyhow, Context, Result};
use image::RgbaImage;
use std::path::{Path, PathBuf};
use webp_animation::{AnimParams, Encoder, EncoderOptions, EncodingConfig, EncodingType};

use super::Converter;
use crate::config::EncoderConfig;

pub struct WebpConverter {
    path: PathBuf,
    config: EncoderConfig,
    encoder: Option<Encoder>,
    frame_count: usize,
}

impl WebpConverter {
    pub fn new(path: impl AsRef<Path>, config: EncoderConfig) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            config,
            encoder: None,
            frame_count: 0,
        }
    }

    fn encoding_config(&self) -> EncodingConfig {
        let mut encoding = match self.config.quality {
            Some(quality) => EncodingConfig::new_lossy(quality),
            // for lossless, quality trades encode time for size
            None => EncodingConfig {
                encoding_type: EncodingType::Lossless,
                quality: if self.config.optimize { 100.0 } else { 75.0 },
                method: 4,
            },
        };
        encoding.method = if self.config.optimize { 6 } else { 4 };
        encoding
    }

    fn encoder_options(&self) -> EncoderOptions {
        let mut options = EncoderOptions {
            anim_params: AnimParams {
                loop_count: self.config.loop_count as i32,
            },
            minimize_size: self.config.optimize,
            allow_mixed: false,
            encoding_config: Some(self.encoding_config()),
            ..Default::default()
        };
        if !self.config.subrectangles {
            // kmax == 1 makes every frame a keyframe, but minimize_size
            // disables keyframe insertion altogether
            options.minimize_size = false;
            options.kmin = 0;
            options.kmax = 1;
        }
        options
    }
}

impl Converter for WebpConverter {
    fn prepare(&mut self, width: u32, height: u32) -> Result<()> {
        let encoder = Encoder::new_with_options((width, height), self.encoder_options())
            .map_err(|e| anyhow!("failed to create webp encoder: {:?}", e))?;
        log::info!(
            "width: {}, height: {}, fps: {}, palette: {}",
            width,
            height,
            self.config.fps,
            self.config.palette_size
        );
        self.encoder = Some(encoder);
        self.frame_count = 0;
        Ok(())
    }

    fn convert_frame(&mut self, image: RgbaImage, frame_id: u32) -> Result<()> {
        let timestamp = self.config.timestamp_ms(frame_id as usize);
        match &mut self.encoder {
            Some(encoder) => {
                encoder
                    .add_frame(image.as_raw(), timestamp)
                    .map_err(|e| anyhow!("failed to add frame {}: {:?}", frame_id, e))?;
            }
            None => {
                return Err(anyhow!("Encoder not prepared"));
            }
        }
        self.frame_count += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        let encoder = self
            .encoder
            .take()
            .ok_or_else(|| anyhow!("Encoder not prepared"))?;
        let end = self.config.timestamp_ms(self.frame_count);
        let webp = encoder
            .finalize(end)
            .map_err(|e| anyhow!("failed to finalize webp: {:?}", e))?;

        let bytes: &[u8] = webp.as_ref();
        std::fs::write(&self.path, bytes)
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        log::info!(
            "Wrote {} frame(s) to {} ({} bytes)",
            self.frame_count,
            self.path.display(),
            bytes.len()
        );
        Ok(())
    }
}
