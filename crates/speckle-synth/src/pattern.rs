use rand::{rngs::StdRng, Rng, SeedableRng};
use speckle_image::{Image, ImageDtype, ImageSize};

use crate::error::SynthError;

/// Render a random speckle pattern.
///
/// Gaussian dots of radius `radius` with random brightness are splatted on a
/// black background until their total area reaches `density` times the image
/// area. Overlapping dots saturate at 255. The result is a deterministic
/// function of the arguments.
///
/// # Arguments
///
/// * `size` - The size of the pattern.
/// * `density` - Fraction of the area covered by dots, must be positive.
/// * `radius` - Dot radius in pixels, must be positive.
/// * `seed` - Seed of the dot placement.
///
/// # Example
///
/// ```
/// use speckle_synth::speckle_pattern;
///
/// let pattern = speckle_pattern([64, 48].into(), 0.5, 2.0, 42).unwrap();
///
/// assert_eq!(pattern.size(), [64, 48].into());
/// assert_eq!(pattern, speckle_pattern([64, 48].into(), 0.5, 2.0, 42).unwrap());
/// ```
pub fn speckle_pattern(
    size: ImageSize,
    density: f64,
    radius: f64,
    seed: u64,
) -> Result<Image<u8, 1>, SynthError> {
    let valid = |v: f64| v.is_finite() && v > 0.0;
    if !valid(density) || !valid(radius) {
        return Err(SynthError::InvalidPattern { density, radius });
    }

    if size.area() == 0 {
        return Ok(Image::from_size_val(size, 0)?);
    }
    let mut canvas = Image::<f32, 1>::from_size_val(size, 0.0)?;

    let dot_area = std::f64::consts::PI * radius * radius;
    let count = ((density * size.area() as f64) / dot_area).ceil().max(1.0) as usize;
    let reach = (3.0 * radius).ceil() as i64;
    let inv_r2 = 1.0 / (radius * radius);

    let mut rng = StdRng::seed_from_u64(seed);
    let (w, h) = (size.width as i64, size.height as i64);
    let data = canvas.as_slice_mut();

    for _ in 0..count {
        let cx: f64 = rng.random_range(0.0..size.width as f64);
        let cy: f64 = rng.random_range(0.0..size.height as f64);
        let brightness: f64 = rng.random_range(0.5..1.0);

        let (x0, x1) = ((cx as i64 - reach).max(0), (cx as i64 + reach).min(w - 1));
        let (y0, y1) = ((cy as i64 - reach).max(0), (cy as i64 + reach).min(h - 1));
        for y in y0..=y1 {
            let dy = y as f64 + 0.5 - cy;
            for x in x0..=x1 {
                let dx = x as f64 + 0.5 - cx;
                let value = brightness * (-(dx * dx + dy * dy) * inv_r2).exp();
                data[(y * w + x) as usize] += value as f32;
            }
        }
    }

    log::debug!("rendered {count} speckles of radius {radius} over {size}");

    let pixels = canvas
        .as_slice()
        .iter()
        .map(|&v| u8::from_f32(255.0 * v))
        .collect();
    Ok(Image::new(size, pixels)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_has_contrast() -> Result<(), SynthError> {
        let pattern = speckle_pattern([96, 64].into(), 0.6, 2.5, 3)?;
        let data = pattern.as_slice();
        let dark = data.iter().filter(|&&v| v < 32).count();
        let bright = data.iter().filter(|&&v| v > 128).count();
        assert!(dark > data.len() / 20, "dark {dark}");
        assert!(bright > data.len() / 20, "bright {bright}");
        Ok(())
    }

    #[test]
    fn test_pattern_depends_on_seed() -> Result<(), SynthError> {
        let a = speckle_pattern([32, 32].into(), 0.5, 1.5, 1)?;
        let b = speckle_pattern([32, 32].into(), 0.5, 1.5, 2)?;
        assert_ne!(a, b);
        Ok(())
    }

    #[test]
    fn test_pattern_rejects_bad_parameters() {
        assert_eq!(
            speckle_pattern([8, 8].into(), 0.0, 1.0, 0),
            Err(SynthError::InvalidPattern {
                density: 0.0,
                radius: 1.0
            })
        );
        assert!(speckle_pattern([8, 8].into(), 0.5, f64::NAN, 0).is_err());
    }
}
