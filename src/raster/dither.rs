//! Ordered dithering with a 16×16 Bayer matrix.

const SIZE_SHIFT: u32 = 4;
const MASK: i32 = 15;

/// Thresholds 0..=255, each appearing once, indexed by `(y << 4) | x`.
static BAYER: [u8; 256] = build_bayer();

const fn build_bayer() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut index = 0;
    while index < 256 {
        let (mut x, mut y) = (0usize, 0usize);
        let mut digits = index;
        let mut add = 8;
        while digits != 0 {
            match digits & 3 {
                1 => {
                    x += add;
                    y += add;
                }
                2 => y += add,
                3 => x += add,
                _ => {}
            }
            digits >>= 2;
            add >>= 1;
        }
        table[(y << SIZE_SHIFT) | x] = index as u8;
        index += 1;
    }
    table
}

#[inline]
fn index(x: i32, y: i32) -> usize {
    (((y & MASK) << SIZE_SHIFT) | (x & MASK)) as usize
}

/// Threshold in `[0, 255]`. The matrix tiles the plane.
#[inline]
pub fn bayer_u8(x: i32, y: i32) -> u8 {
    BAYER[index(x, y)]
}

/// Threshold in `[0, 1]`.
#[inline]
pub fn bayer_f32(x: i32, y: i32) -> f32 {
    BAYER[index(x, y)] as f32 / 255.0
}
