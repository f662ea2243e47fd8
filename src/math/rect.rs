//! Half-open pixel rectangle

/// Pixel rectangle covering `[min_x, max_x) × [min_y, max_y)`.
/// Coordinates may be negative or exceed a buffer until clipped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PixelRect {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl PixelRect {
    /// Create from min (inclusive) and max (exclusive) corners
    pub fn new(min_x: i32, min_y: i32, max_x: i32, max_y: i32) -> Self {
        Self { min_x, min_y, max_x, max_y }
    }

    /// Create from an origin and a size
    pub fn from_origin_size(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self::new(x, y, x.saturating_add(width), y.saturating_add(height))
    }

    pub fn width(&self) -> i32 {
        (self.max_x - self.min_x).max(0)
    }

    pub fn height(&self) -> i32 {
        (self.max_y - self.min_y).max(0)
    }

    pub fn is_empty(&self) -> bool {
        self.max_x <= self.min_x || self.max_y <= self.min_y
    }

    /// Check if a pixel is inside
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.min_x && x < self.max_x && y >= self.min_y && y < self.max_y
    }

    /// Clip to `[0, width) × [0, height)`
    pub fn clipped(&self, width: u32, height: u32) -> PixelRect {
        PixelRect {
            min_x: self.min_x.max(0),
            min_y: self.min_y.max(0),
            max_x: self.max_x.min(width.min(i32::MAX as u32) as i32),
            max_y: self.max_y.min(height.min(i32::MAX as u32) as i32),
        }
    }

    /// Number of pixels covered (0 when empty)
    pub fn area(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_and_accessors() {
        let rect = PixelRect::from_origin_size(2, 3, 10, 5);
        assert_eq!(rect, PixelRect::new(2, 3, 12, 8));
        assert_eq!(rect.width(), 10);
        assert_eq!(rect.height(), 5);
        assert_eq!(rect.area(), 50);
    }

    #[test]
    fn test_contains() {
        let rect = PixelRect::new(0, 0, 4, 4);
        assert!(rect.contains(0, 0));
        assert!(rect.contains(3, 3));
        assert!(!rect.contains(4, 0));
        assert!(!rect.contains(-1, 2));
    }

    #[test]
    fn test_clipped() {
        let rect = PixelRect::new(-5, -5, 50, 50).clipped(20, 10);
        assert_eq!(rect, PixelRect::new(0, 0, 20, 10));

        let outside = PixelRect::new(30, 0, 40, 5).clipped(20, 10);
        assert!(outside.is_empty());
        assert_eq!(outside.area(), 0);
    }
}
