use color_quant::NeuQuant;
use image::RgbaImage;
use std::collections::HashSet;

// NeuQuant sampling factor, 1 is slowest and best, 30 fastest.
const SAMPLE_FACTOR: i32 = 10;

/// Number of distinct RGBA colors, counting no further than `limit + 1`.
fn distinct_colors(image: &RgbaImage, limit: usize) -> usize {
    let mut seen = HashSet::new();
    for pixel in image.pixels() {
        seen.insert(pixel.0);
        if seen.len() > limit {
            break;
        }
    }
    seen.len()
}

/// Caps `image` at `palette_size` colors. Images that already fit are
/// returned untouched so flat-colored frames keep their exact values.
/// Fully opaque images stay fully opaque.
pub fn reduce_palette(mut image: RgbaImage, palette_size: u16) -> RgbaImage {
    let palette_size = palette_size as usize;
    if distinct_colors(&image, palette_size) <= palette_size {
        return image;
    }

    let opaque = image.pixels().all(|p| p[3] == u8::MAX);
    let quant = NeuQuant::new(SAMPLE_FACTOR, palette_size, image.as_raw());
    let palette = quant.color_map_rgba();
    for pixel in image.pixels_mut() {
        let idx = quant.index_of(&pixel.0) * 4;
        pixel.0.copy_from_slice(&palette[idx..idx + 4]);
        if opaque {
            pixel[3] = u8::MAX;
        }
    }
    image
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn gradient(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x * 4) as u8, (y * 4) as u8, ((x + y) * 2) as u8, 255])
        })
    }

    #[test]
    fn flat_image_is_untouched() {
        let img = RgbaImage::from_pixel(10, 10, Rgba([255, 0, 0, 255]));
        let out = reduce_palette(img.clone(), 64);
        assert_eq!(out, img);
    }

    #[test]
    fn image_at_the_cap_is_untouched() {
        let img = RgbaImage::from_fn(8, 8, |x, y| Rgba([(x * 8 + y) as u8, 0, 0, 255]));
        assert_eq!(distinct_colors(&img, 64), 64);
        let out = reduce_palette(img.clone(), 64);
        assert_eq!(out, img);
    }

    #[test]
    fn rich_image_is_capped() {
        let img = gradient(64, 64);
        assert!(distinct_colors(&img, 64) > 64);

        let out = reduce_palette(img, 64);
        assert_eq!(out.dimensions(), (64, 64));
        assert!(distinct_colors(&out, 64) <= 64);
    }

    #[test]
    fn opaque_image_stays_opaque() {
        let out = reduce_palette(gradient(64, 64), 16);
        assert!(out.pixels().all(|p| p[3] == 255));
    }

    #[test]
    fn small_palette() {
        let out = reduce_palette(gradient(32, 32), 16);
        assert!(distinct_colors(&out, 16) <= 16);
    }

    #[test]
    fn distinct_colors_stops_early() {
        let img = gradient(64, 64);
        assert_eq!(distinct_colors(&img, 10), 11);
    }
}
