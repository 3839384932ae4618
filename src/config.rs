use anyhow::{anyhow, Result};

/// Options applied uniformly to every frame of one animation.
#[derive(Debug, Clone, PartialEq)]
pub struct EncoderConfig {
    pub fps: f32,
    /// Upper bound on distinct colors per frame.
    pub palette_size: u16,
    /// Store only the changed region of each frame.
    pub subrectangles: bool,
    /// 0 loops forever.
    pub loop_count: u16,
    pub optimize: bool,
    /// Lossy WebP quality in 0..=100; `None` encodes losslessly.
    pub quality: Option<f32>,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            fps: 24.0,
            palette_size: 64,
            subrectangles: true,
            loop_count: 0,
            optimize: true,
            quality: None,
        }
    }
}

impl EncoderConfig {
    pub const MIN_PALETTE: u16 = 4;
    pub const MAX_PALETTE: u16 = 256;

    pub fn validate(&self) -> Result<()> {
        if !self.fps.is_finite() || self.fps <= 0.0 {
            return Err(anyhow!("fps must be a positive number, got {}", self.fps));
        }
        if !(Self::MIN_PALETTE..=Self::MAX_PALETTE).contains(&self.palette_size) {
            return Err(anyhow!(
                "palette size must be within {}..={}, got {}",
                Self::MIN_PALETTE,
                Self::MAX_PALETTE,
                self.palette_size
            ));
        }
        if let Some(quality) = self.quality {
            if !(0.0..=100.0).contains(&quality) {
                return Err(anyhow!("quality must be within 0..=100, got {}", quality));
            }
        }
        Ok(())
    }

    /// Start time of frame `index` in milliseconds. `timestamp_ms(n)` for a
    /// sequence of `n` frames is the end of the animation.
    pub fn timestamp_ms(&self, index: usize) -> i32 {
        (index as f64 * 1000.0 / self.fps as f64).round() as i32
    }

    /// Display duration of frame `index` in milliseconds.
    pub fn frame_duration_ms(&self, index: usize) -> u32 {
        (self.timestamp_ms(index + 1) - self.timestamp_ms(index)).max(0) as u32
    }
}
