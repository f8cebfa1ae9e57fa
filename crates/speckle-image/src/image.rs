use crate::error::ImageError;

/// Image size in pixels
///
/// A struct to represent the size of an image in pixels.
///
/// # Examples
///
/// ```
/// use speckle_image::ImageSize;
///
/// let image_size = ImageSize {
///   width: 10,
///   height: 20,
/// };
///
/// assert_eq!(image_size.width, 10);
/// assert_eq!(image_size.height, 20);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct ImageSize {
    /// Width of the image in pixels
    pub width: usize,
    /// Height of the image in pixels
    pub height: usize,
}

impl ImageSize {
    /// Number of pixels covered by the size.
    pub fn area(&self) -> usize {
        self.width * self.height
    }

    /// Returns true if `other` fits inside `self` in both axes.
    pub fn contains(&self, other: &ImageSize) -> bool {
        other.width <= self.width && other.height <= self.height
    }
}

impl std::fmt::Display for ImageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl From<[usize; 2]> for ImageSize {
    fn from(size: [usize; 2]) -> Self {
        ImageSize {
            width: size[0],
            height: size[1],
        }
    }
}

/// Trait for image data types.
///
/// Send and Sync is required for the row-parallel kernels.
pub trait ImageDtype: Copy + Default + Into<f32> + Send + Sync {
    /// Convert a f32 value to the image data type.
    fn from_f32(x: f32) -> Self;
}

impl ImageDtype for f32 {
    fn from_f32(x: f32) -> Self {
        x
    }
}

impl ImageDtype for u8 {
    fn from_f32(x: f32) -> Self {
        x.round().clamp(0.0, 255.0) as u8
    }
}

impl ImageDtype for u16 {
    fn from_f32(x: f32) -> Self {
        x.round().clamp(0.0, u16::MAX as f32) as u16
    }
}

/// Represents an image with pixel data.
///
/// The pixels are stored contiguously in row-major order with interleaved
/// channels, i.e. with shape (H, W, C).
#[derive(Clone, Debug, PartialEq)]
pub struct Image<T, const CHANNELS: usize> {
    size: ImageSize,
    data: Vec<T>,
}

impl<T, const CHANNELS: usize> Image<T, CHANNELS> {
    /// Create a new image from pixel data.
    ///
    /// # Arguments
    ///
    /// * `size` - The size of the image in pixels.
    /// * `data` - The pixel data of the image.
    ///
    /// # Errors
    ///
    /// If the length of the pixel data does not match the image size, an error is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use speckle_image::{Image, ImageSize};
    ///
    /// let image = Image::<u8, 3>::new(
    ///    ImageSize {
    ///       width: 10,
    ///       height: 20,
    ///    },
    ///    vec![0u8; 10 * 20 * 3],
    /// ).unwrap();
    ///
    /// assert_eq!(image.size().width, 10);
    /// assert_eq!(image.size().height, 20);
    /// assert_eq!(image.num_channels(), 3);
    /// ```
    pub fn new(size: ImageSize, data: Vec<T>) -> Result<Self, ImageError> {
        let numel = Self::checked_numel(size)?;
        // check if the data length matches the image size
        if data.len() != numel {
            return Err(ImageError::InvalidChannelShape(data.len(), numel));
        }

        Ok(Self { size, data })
    }

    /// Create a new image with the given size and default pixel data.
    ///
    /// # Arguments
    ///
    /// * `size` - The size of the image in pixels.
    /// * `val` - The default value of the pixel data.
    ///
    /// # Examples
    ///
    /// ```
    /// use speckle_image::{Image, ImageSize};
    ///
    /// let image = Image::<u8, 1>::from_size_val(
    ///   ImageSize {
    ///     width: 10,
    ///     height: 20,
    ///   }, 0u8).unwrap();
    ///
    /// assert_eq!(image.size().width, 10);
    /// assert_eq!(image.as_slice().len(), 200);
    /// ```
    pub fn from_size_val(size: ImageSize, val: T) -> Result<Self, ImageError>
    where
        T: Clone,
    {
        let data = vec![val; Self::checked_numel(size)?];
        Image::new(size, data)
    }

    /// Number of samples of an image of `size`, if the buffer is addressable.
    fn checked_numel(size: ImageSize) -> Result<usize, ImageError> {
        size.width
            .checked_mul(size.height)
            .and_then(|n| n.checked_mul(CHANNELS))
            .filter(|&n| n <= isize::MAX as usize / std::mem::size_of::<T>().max(1))
            .ok_or(ImageError::SizeOverflow(size))
    }

    /// Create an image by evaluating `f(x, y, channel)` for every sample.
    ///
    /// # Examples
    ///
    /// ```
    /// use speckle_image::{Image, ImageSize};
    ///
    /// let ramp = Image::<f32, 1>::from_fn([3, 2].into(), |x, y, _| (x + 10 * y) as f32);
    ///
    /// assert_eq!(ramp.as_slice(), &[0.0, 1.0, 2.0, 10.0, 11.0, 12.0]);
    /// ```
    pub fn from_fn(size: ImageSize, f: impl Fn(usize, usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(size.area() * CHANNELS);
        for y in 0..size.height {
            for x in 0..size.width {
                for c in 0..CHANNELS {
                    data.push(f(x, y, c));
                }
            }
        }
        Self { size, data }
    }

    /// Convert the samples to `f32` through [`ImageDtype`].
    pub fn to_f32(&self) -> Image<f32, CHANNELS>
    where
        T: ImageDtype,
    {
        Image {
            size: self.size,
            data: self.data.iter().map(|&x| x.into()).collect(),
        }
    }

    /// Get the size of the image in pixels.
    pub fn size(&self) -> ImageSize {
        self.size
    }

    /// Get the number of columns of the image.
    pub fn cols(&self) -> usize {
        self.size.width
    }

    /// Get the number of rows of the image.
    pub fn rows(&self) -> usize {
        self.size.height
    }

    /// Get the width of the image in pixels.
    pub fn width(&self) -> usize {
        self.size.width
    }

    /// Get the height of the image in pixels.
    pub fn height(&self) -> usize {
        self.size.height
    }

    /// Get the number of channels in the image.
    pub fn num_channels(&self) -> usize {
        CHANNELS
    }

    /// Total number of samples (pixels times channels).
    pub fn numel(&self) -> usize {
        self.data.len()
    }

    /// Borrow the raw sample buffer.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Mutably borrow the raw sample buffer.
    pub fn as_slice_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Get a sample by its `[row, col, channel]` index.
    pub fn get(&self, index: [usize; 3]) -> Option<&T> {
        let [y, x, c] = index;
        if y >= self.size.height || x >= self.size.width || c >= CHANNELS {
            return None;
        }
        self.data.get((y * self.size.width + x) * CHANNELS + c)
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_size() {
        let image_size = ImageSize {
            width: 10,
            height: 20,
        };
        assert_eq!(image_size.area(), 200);
        assert!(image_size.contains(&[10, 5].into()));
        assert!(!image_size.contains(&[11, 5].into()));
        assert_eq!(image_size.to_string(), "10x20");
    }

    #[test]
    fn image_smoke() -> Result<(), ImageError> {
        let image = Image::<u8, 3>::new(
            ImageSize {
                width: 10,
                height: 20,
            },
            vec![0u8; 10 * 20 * 3],
        )?;
        assert_eq!(image.size().width, 10);
        assert_eq!(image.size().height, 20);
        assert_eq!(image.num_channels(), 3);

        Ok(())
    }

    #[test]
    fn image_wrong_length() {
        let res = Image::<u8, 1>::new([2, 2].into(), vec![0u8; 3]);
        assert_eq!(res, Err(ImageError::InvalidChannelShape(3, 4)));
    }

    #[test]
    fn image_size_overflow() {
        let size = ImageSize {
            width: usize::MAX / 2,
            height: 3,
        };
        assert_eq!(
            Image::<f32, 1>::from_size_val(size, 0.0),
            Err(ImageError::SizeOverflow(size))
        );
        assert_eq!(
            Image::<u8, 3>::new(size, vec![]),
            Err(ImageError::SizeOverflow(size))
        );
    }

    #[test]
    fn image_sample_access() -> Result<(), ImageError> {
        let image = Image::<u8, 2>::from_fn([3, 2].into(), |x, y, c| (10 * y + 2 * x + c) as u8);
        assert_eq!(image.get([1, 2, 1]), Some(&15));
        assert_eq!(image.as_slice()[5], 5);
        assert_eq!(image.get([2, 0, 0]), None);
        assert_eq!(image.get([0, 0, 2]), None);

        let filled = Image::<f32, 1>::from_size_val([3, 2].into(), 0.5)?;
        assert_eq!(filled.numel(), 6);
        assert!(filled.as_slice().iter().all(|&v| v == 0.5));

        Ok(())
    }

    #[test]
    fn image_to_f32() -> Result<(), ImageError> {
        let image = Image::<u8, 1>::new([2, 1].into(), vec![3, 250])?;
        assert_eq!(image.to_f32().as_slice(), &[3.0, 250.0]);
        Ok(())
    }
}
