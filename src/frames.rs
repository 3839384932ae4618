use anyhow::{Context, Result};
use image::RgbaImage;
use std::ops::Range;
use std::path::{Path, PathBuf};

/// How frame indices map to file names, e.g. `frame_07.png`.
#[derive(Debug, Clone)]
pub struct FrameNaming {
    pub prefix: String,
    pub pad_width: usize,
    pub extension: String,
}

impl Default for FrameNaming {
    fn default() -> Self {
        Self {
            prefix: "frame_".to_string(),
            pad_width: 2,
            extension: "png".to_string(),
        }
    }
}

impl FrameNaming {
    /// Zero-pads to `pad_width` but never truncates, so index 100 at width 2
    /// gives `frame_100.png`.
    pub fn file_name(&self, index: u32) -> String {
        format!(
            "{}{:0width$}.{}",
            self.prefix,
            index,
            self.extension,
            width = self.pad_width
        )
    }

    pub fn path(&self, dir: impl AsRef<Path>, index: u32) -> PathBuf {
        dir.as_ref().join(self.file_name(index))
    }
}

/// Decodes every frame in `range` that exists under `dir`, in ascending
/// index order. Missing files are skipped; a file that exists but fails to
/// decode aborts the whole collection.
pub fn collect_frames(
    dir: impl AsRef<Path>,
    range: Range<u32>,
    naming: &FrameNaming,
) -> Result<Vec<RgbaImage>> {
    let dir = dir.as_ref();
    let mut frames = Vec::new();

    for index in range {
        let path = naming.path(dir, index);
        if !path.is_file() {
            log::debug!("skipping missing frame {}", path.display());
            continue;
        }

        let image = image::open(&path)
            .with_context(|| format!("failed to decode frame {}", path.display()))?
            .to_rgba8();
        log::debug!(
            "decoded {} ({}x{})",
            path.display(),
            image.width(),
            image.height()
        );
        frames.push(image);
    }

    log::info!("Collected {} frame(s) from {}", frames.len(), dir.display());
    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn write_frame(dir: &Path, name: &str, color: [u8; 4]) {
        let img = RgbaImage::from_pixel(4, 3, Rgba(color));
        img.save(dir.join(name)).unwrap();
    }

    #[test]
    fn file_name_is_zero_padded() {
        let naming = FrameNaming::default();
        assert_eq!(naming.file_name(0), "frame_00.png");
        assert_eq!(naming.file_name(7), "frame_07.png");
        assert_eq!(naming.file_name(42), "frame_42.png");
    }

    #[test]
    fn padding_does_not_truncate_wide_indices() {
        let naming = FrameNaming::default();
        assert_eq!(naming.file_name(100), "frame_100.png");
        assert_eq!(naming.file_name(299), "frame_299.png");
    }

    #[test]
    fn custom_naming() {
        let naming = FrameNaming {
            prefix: "shot-".to_string(),
            pad_width: 4,
            extension: "PNG".to_string(),
        };
        assert_eq!(naming.file_name(12), "shot-0012.PNG");
        assert_eq!(
            naming.path("/tmp/frames", 3),
            PathBuf::from("/tmp/frames/shot-0003.PNG")
        );
    }

    #[test]
    fn collects_sparse_frames_in_index_order() {
        let dir = tempfile::tempdir().unwrap();
        // written out of order on purpose
        write_frame(dir.path(), "frame_05.png", [0, 0, 255, 255]);
        write_frame(dir.path(), "frame_00.png", [255, 0, 0, 255]);
        write_frame(dir.path(), "frame_02.png", [0, 255, 0, 255]);

        let frames = collect_frames(dir.path(), 0..300, &FrameNaming::default()).unwrap();
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0].get_pixel(0, 0), &Rgba([255, 0, 0, 255]));
        assert_eq!(frames[1].get_pixel(0, 0), &Rgba([0, 255, 0, 255]));
        assert_eq!(frames[2].get_pixel(0, 0), &Rgba([0, 0, 255, 255]));
    }

    #[test]
    fn respects_range_bounds() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..5 {
            write_frame(dir.path(), &format!("frame_{:02}.png", i), [i * 10, 0, 0, 255]);
        }

        let frames = collect_frames(dir.path(), 1..4, &FrameNaming::default()).unwrap();
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0].get_pixel(0, 0)[0], 10);
        assert_eq!(frames[2].get_pixel(0, 0)[0], 30);
    }

    #[test]
    fn picks_up_three_digit_indices() {
        let dir = tempfile::tempdir().unwrap();
        write_frame(dir.path(), "frame_99.png", [1, 1, 1, 255]);
        write_frame(dir.path(), "frame_100.png", [2, 2, 2, 255]);

        let frames = collect_frames(dir.path(), 0..300, &FrameNaming::default()).unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[1].get_pixel(0, 0)[0], 2);
    }

    #[test]
    fn empty_directory_yields_no_frames() {
        let dir = tempfile::tempdir().unwrap();
        let frames = collect_frames(dir.path(), 0..300, &FrameNaming::default()).unwrap();
        assert!(frames.is_empty());
    }

    #[test]
    fn directories_named_like_frames_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("frame_01.png")).unwrap();
        write_frame(dir.path(), "frame_02.png", [9, 9, 9, 255]);

        let frames = collect_frames(dir.path(), 0..300, &FrameNaming::default()).unwrap();
        assert_eq!(frames.len(), 1);
    }

    #[test]
    fn corrupt_frame_fails_fast() {
        let dir = tempfile::tempdir().unwrap();
        write_frame(dir.path(), "frame_00.png", [0, 0, 0, 255]);
        std::fs::write(dir.path().join("frame_01.png"), b"not a png").unwrap();

        let err = collect_frames(dir.path(), 0..300, &FrameNaming::default()).unwrap_err();
        assert!(err.to_string().contains("frame_01.png"));
    }
}
