use crate::{ImageError, ImageSize};

/// An axis-aligned rectangular region of an image, in pixel coordinates.
///
/// The region covers columns `x..x + width` and rows `y..y + height`.
///
/// # Examples
///
/// ```
/// use speckle_image::Roi;
///
/// let roi = Roi::from_corners([2, 3], [6, 5]);
///
/// assert_eq!(roi, Roi::new(2, 3, 4, 2));
/// assert_eq!(roi.br(), [6, 5]);
/// ```
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Roi {
    /// x-coordinate of the top-left corner.
    pub x: usize,
    /// y-coordinate of the top-left corner.
    pub y: usize,
    /// width of the region in pixels.
    pub width: usize,
    /// height of the region in pixels.
    pub height: usize,
}

impl Roi {
    /// Create a region from its top-left corner and size.
    pub fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a region from its top-left (inclusive) and bottom-right (exclusive) corners.
    ///
    /// A bottom-right corner above or left of the top-left one yields an empty region.
    pub fn from_corners(tl: [usize; 2], br: [usize; 2]) -> Self {
        Self {
            x: tl[0],
            y: tl[1],
            width: br[0].saturating_sub(tl[0]),
            height: br[1].saturating_sub(tl[1]),
        }
    }

    /// A region covering an entire image of the given size.
    pub fn full(size: ImageSize) -> Self {
        Self::new(0, 0, size.width, size.height)
    }

    /// Top-left corner as `[x, y]`.
    pub fn tl(&self) -> [usize; 2] {
        [self.x, self.y]
    }

    /// Bottom-right corner (exclusive) as `[x, y]`.
    pub fn br(&self) -> [usize; 2] {
        [self.x + self.width, self.y + self.height]
    }

    /// Size of the region.
    pub fn size(&self) -> ImageSize {
        ImageSize {
            width: self.width,
            height: self.height,
        }
    }

    /// Number of pixels covered.
    pub fn area(&self) -> usize {
        self.width * self.height
    }

    /// Returns true if the region covers no pixel.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Returns true if the region lies fully inside an image of size `size`.
    pub fn fits(&self, size: ImageSize) -> bool {
        let [bx, by] = self.br();
        bx <= size.width && by <= size.height
    }

    /// Check that the region is non-empty and lies inside an image of size `size`.
    ///
    /// # Errors
    ///
    /// [`ImageError::EmptyRoi`] for a zero-area region,
    /// [`ImageError::RoiOutOfBounds`] when it leaves the image.
    pub fn check_within(&self, size: ImageSize) -> Result<(), ImageError> {
        if self.is_empty() {
            return Err(ImageError::EmptyRoi(*self));
        }
        if !self.fits(size) {
            return Err(ImageError::RoiOutOfBounds { roi: *self, size });
        }
        Ok(())
    }

    /// Signed offset `[dx, dy]` from this region's top-left to `other`'s top-left.
    pub fn offset_to(&self, other: &Roi) -> [i64; 2] {
        [
            other.x as i64 - self.x as i64,
            other.y as i64 - self.y as i64,
        ]
    }
}

impl std::fmt::Display for Roi {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "[{} x {} from ({}, {})]",
            self.width, self.height, self.x, self.y
        )
    }
}

#[cfg(test)]
mod tests {
    use super::Roi;
    use crate::{ImageError, ImageSize};

    #[test]
    fn roi_corners() {
        let roi = Roi::from_corners([1, 2], [5, 4]);
        assert_eq!(roi.tl(), [1, 2]);
        assert_eq!(roi.br(), [5, 4]);
        assert_eq!(roi.size(), ImageSize { width: 4, height: 2 });
        assert_eq!(roi.area(), 8);
        assert!(Roi::from_corners([5, 5], [3, 9]).is_empty());
    }

    #[test]
    fn roi_bounds() {
        let size = ImageSize {
            width: 10,
            height: 8,
        };
        assert!(Roi::new(0, 0, 10, 8).check_within(size).is_ok());
        assert_eq!(
            Roi::new(1, 0, 10, 8).check_within(size),
            Err(ImageError::RoiOutOfBounds {
                roi: Roi::new(1, 0, 10, 8),
                size
            })
        );
        assert_eq!(
            Roi::new(1, 1, 0, 3).check_within(size),
            Err(ImageError::EmptyRoi(Roi::new(1, 1, 0, 3)))
        );
    }

    #[test]
    fn roi_offset_and_display() {
        let search = Roi::new(10, 20, 50, 50);
        let template = Roi::new(25, 30, 20, 20);
        assert_eq!(template.offset_to(&search), [-15, -10]);
        assert_eq!(search.to_string(), "[50 x 50 from (10, 20)]");
    }
}
