use serde::{Deserialize, Serialize};
use speckle_image::ImageSize;

use crate::error::SynthError;

/// Motion model of a synthetic sequence.
///
/// Lengths are in output pixels, angles in degrees. Missing fields take their
/// default value when deserializing.
///
/// # Examples
///
/// ```
/// use speckle_synth::MotionConfig;
///
/// let config: MotionConfig = serde_json::from_str(r#"{ "moves": 5, "precision": 0.25 }"#).unwrap();
///
/// assert_eq!(config.moves, 5);
/// assert_eq!(config.scale().unwrap(), 4);
/// assert_eq!(config.direction, [10.0, 10.0]);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// size of the generated frames.
    pub size: ImageSize,
    /// number of moves, the sequence holds `moves + 1` frames.
    pub moves: usize,
    /// mean window step per move, Euclidean axes (y up).
    pub direction: [f64; 2],
    /// maximum random deviation from `direction` per axis.
    pub deviation: [f64; 2],
    /// mean rotation per move.
    pub angle: f64,
    /// maximum random deviation from `angle`.
    pub angle_jitter: f64,
    /// standard deviation of the additive gaussian noise, in gray levels.
    pub noise: f64,
    /// requested displacement resolution, in pixels.
    pub precision: f64,
    /// seed of the random walk and of the noise.
    pub seed: u64,
    /// append the cumulative rotation to each ground-truth record.
    pub include_rotation: bool,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            size: ImageSize {
                width: 512,
                height: 512,
            },
            moves: 100,
            direction: [10.0, 10.0],
            deviation: [2.0, 2.0],
            angle: 0.0,
            angle_jitter: 0.0,
            noise: 0.0,
            precision: 0.1,
            seed: 0xFFFFFF,
            include_rotation: true,
        }
    }
}

impl MotionConfig {
    /// Integer upscale factor reaching the requested precision, `ceil(1 / precision)`.
    ///
    /// # Errors
    ///
    /// [`SynthError::InvalidPrecision`] unless `0 < precision <= 1`.
    pub fn scale(&self) -> Result<u32, SynthError> {
        if !(self.precision > 0.0 && self.precision <= 1.0) {
            return Err(SynthError::InvalidPrecision(self.precision));
        }
        let scale = (1.0 / self.precision).ceil();
        if scale > u32::MAX as f64 {
            return Err(SynthError::InvalidPrecision(self.precision));
        }
        Ok(scale as u32)
    }

    /// Check the parameters against a source image size.
    ///
    /// # Errors
    ///
    /// An error if a parameter is out of range or if the source does not
    /// exceed the output by `|direction| + |deviation|` in each axis.
    pub fn validate(&self, source: ImageSize) -> Result<(), SynthError> {
        self.scale()?;
        if self.size.area() == 0 {
            return Err(SynthError::EmptyOutput(self.size));
        }
        if !(self.noise.is_finite() && self.noise >= 0.0) {
            return Err(SynthError::InvalidNoise(self.noise));
        }
        if !(self.angle_jitter.is_finite() && self.angle_jitter >= 0.0) {
            return Err(SynthError::InvalidAngleJitter(self.angle_jitter));
        }

        let required = [
            self.direction[0].abs() + self.deviation[0].abs(),
            self.direction[1].abs() + self.deviation[1].abs(),
        ];
        let space = [
            source.width as f64 - self.size.width as f64,
            source.height as f64 - self.size.height as f64,
        ];
        if space[0] < required[0] || space[1] < required[1] {
            return Err(SynthError::SourceTooSmall {
                source_size: source,
                output: self.size,
                required,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_from_precision() -> Result<(), SynthError> {
        let with = |precision| MotionConfig {
            precision,
            ..Default::default()
        };
        assert_eq!(with(0.1).scale()?, 10);
        assert_eq!(with(0.3).scale()?, 4);
        assert_eq!(with(1.0).scale()?, 1);
        assert_eq!(with(0.0).scale(), Err(SynthError::InvalidPrecision(0.0)));
        assert_eq!(with(1.5).scale(), Err(SynthError::InvalidPrecision(1.5)));
        Ok(())
    }

    #[test]
    fn validate_source_space() {
        let config = MotionConfig {
            size: [100, 80].into(),
            direction: [3.0, -4.0],
            deviation: [1.0, 1.0],
            ..Default::default()
        };
        assert!(config.validate([104, 85].into()).is_ok());
        assert_eq!(
            config.validate([103, 90].into()),
            Err(SynthError::SourceTooSmall {
                source_size: [103, 90].into(),
                output: [100, 80].into(),
                required: [4.0, 5.0],
            })
        );
        assert!(config.validate([50, 50].into()).is_err());
    }

    #[test]
    fn validate_parameters() {
        let source = [1024, 1024].into();
        let noisy = MotionConfig {
            noise: -1.0,
            ..Default::default()
        };
        assert_eq!(noisy.validate(source), Err(SynthError::InvalidNoise(-1.0)));

        let empty = MotionConfig {
            size: [0, 10].into(),
            ..Default::default()
        };
        assert_eq!(
            empty.validate(source),
            Err(SynthError::EmptyOutput([0, 10].into()))
        );

        let jitter = MotionConfig {
            angle_jitter: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(
            jitter.validate(source),
            Err(SynthError::InvalidAngleJitter(_))
        ));
    }
}
