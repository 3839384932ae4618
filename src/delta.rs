use image::RgbaImage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

/// Smallest rectangle covering every pixel that differs between `prev` and
/// `cur`, or `None` when the frames are identical. Both images must share
/// dimensions.
pub fn changed_region(prev: &RgbaImage, cur: &RgbaImage) -> Option<Region> {
    debug_assert_eq!(prev.dimensions(), cur.dimensions());

    let (mut min_x, mut min_y) = (u32::MAX, u32::MAX);
    let (mut max_x, mut max_y) = (0, 0);
    let mut changed = false;

    for (x, y, pixel) in cur.enumerate_pixels() {
        if prev.get_pixel(x, y) != pixel {
            changed = true;
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
    }

    changed.then(|| Region {
        left: min_x,
        top: min_y,
        width: max_x - min_x + 1,
        height: max_y - min_y + 1,
    })
}
