use rand::Rng;
use rand_distr::{Distribution, Normal};
use speckle_image::Image;

use crate::error::SynthError;

/// Add zero-mean gaussian noise to an 8-bit image in place.
///
/// Each sample is rounded to an integer change in `[-128, 127]` and the result
/// is clamped to `[0, 255]`. A standard deviation of zero leaves the image
/// unchanged.
///
/// # Errors
///
/// [`SynthError::InvalidNoise`] if `std_dev` is negative or not finite.
pub fn add_gaussian_noise<R: Rng>(
    image: &mut Image<u8, 1>,
    std_dev: f64,
    rng: &mut R,
) -> Result<(), SynthError> {
    if !(std_dev.is_finite() && std_dev >= 0.0) {
        return Err(SynthError::InvalidNoise(std_dev));
    }
    if std_dev <= f64::EPSILON {
        return Ok(());
    }

    let normal = Normal::new(0.0, std_dev).map_err(|_| SynthError::InvalidNoise(std_dev))?;
    for pixel in image.as_slice_mut() {
        let change = normal.sample(rng).round().clamp(-128.0, 127.0) as i16;
        *pixel = (*pixel as i16 + change).clamp(0, 255) as u8;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_noise_statistics() -> Result<(), SynthError> {
        let mut image = Image::<u8, 1>::from_size_val([128, 128].into(), 128)?;
        let mut rng = StdRng::seed_from_u64(7);
        add_gaussian_noise(&mut image, 5.0, &mut rng)?;

        let n = image.numel() as f64;
        let mean = image.as_slice().iter().map(|&v| v as f64).sum::<f64>() / n;
        let var = image
            .as_slice()
            .iter()
            .map(|&v| (v as f64 - mean).powi(2))
            .sum::<f64>()
            / n;
        assert!((mean - 128.0).abs() < 0.5, "mean {mean}");
        assert!((var.sqrt() - 5.0).abs() < 0.5, "std {}", var.sqrt());
        Ok(())
    }

    #[test]
    fn test_noise_clamps() -> Result<(), SynthError> {
        let mut image = Image::<u8, 1>::new([4, 1].into(), vec![0, 0, 255, 255])?;
        let mut rng = StdRng::seed_from_u64(1);
        // large enough to saturate at both ends
        add_gaussian_noise(&mut image, 1000.0, &mut rng)?;
        let data = image.as_slice();
        assert!(data[..2].iter().all(|&v| v <= 127));
        assert!(data[2..].iter().all(|&v| v >= 127));
        Ok(())
    }

    #[test]
    fn test_zero_noise_is_identity() -> Result<(), SynthError> {
        let mut image = Image::<u8, 1>::from_fn([5, 5].into(), |x, y, _| (x * 10 + y) as u8);
        let expected = image.clone();
        let mut rng = StdRng::seed_from_u64(1);
        add_gaussian_noise(&mut image, 0.0, &mut rng)?;
        assert_eq!(image, expected);
        assert_eq!(
            add_gaussian_noise(&mut image, -2.0, &mut rng),
            Err(SynthError::InvalidNoise(-2.0))
        );
        Ok(())
    }
}
