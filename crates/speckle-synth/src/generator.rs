use rand::{rngs::StdRng, Rng, SeedableRng};
use speckle_image::{Image, ImageDtype, ImageSize, Roi};
use speckle_imgproc::{
    crop::crop_roi,
    interpolation::InterpolationMode,
    resize::{resize_area, resize_native},
    warp::{get_rotation_matrix2d, warp_affine},
};

use crate::{
    config::MotionConfig, error::SynthError, ground_truth::GroundTruthMove,
    noise::add_gaussian_noise,
};

/// One rendered frame of a synthetic sequence.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    /// position in the sequence, 0 is the reference frame.
    pub index: usize,
    /// rendered image, of the configured output size.
    pub image: Image<u8, 1>,
    /// cumulative window position, `None` for the reference frame.
    pub motion: Option<GroundTruthMove>,
}

/// Renders a sequence of frames following a random-walk motion model.
///
/// The source is upscaled by the integer factor `scale = ceil(1 / precision)`
/// with nearest-neighbour sampling, so every move is a whole number of
/// upscaled pixels and an exact multiple of `1 / scale` output pixels. A
/// window of `scale` times the output size starts centred on the upscaled
/// source and is moved, optionally rotated, then area-downscaled to the
/// output size.
///
/// Window motion is recorded in Euclidean axes (y up). The image content
/// moves the opposite way.
///
/// # Examples
///
/// ```
/// use speckle_synth::{speckle_pattern, Generator, MotionConfig};
///
/// let source = speckle_pattern([96, 96].into(), 0.5, 2.0, 1).unwrap();
/// let config = MotionConfig {
///     size: [64, 64].into(),
///     moves: 3,
///     direction: [2.0, 1.0],
///     deviation: [0.0, 0.0],
///     precision: 1.0,
///     ..Default::default()
/// };
///
/// let frames = Generator::new(&source, config)
///     .unwrap()
///     .collect::<Result<Vec<_>, _>>()
///     .unwrap();
///
/// assert_eq!(frames.len(), 4);
/// let last = frames[3].motion.unwrap();
/// assert_eq!((last.x, last.y), (6.0, 3.0));
/// ```
#[derive(Debug)]
pub struct Generator {
    config: MotionConfig,
    scale: u32,
    upscaled: Image<f32, 1>,
    window: Roi,
    direction: [i64; 2],
    max_deviation: [i64; 2],
    position: [i64; 2],
    rotation: f64,
    rotating: bool,
    rng: StdRng,
    noise_rng: StdRng,
    next_index: usize,
}

impl Generator {
    /// Prepare a sequence over `source`.
    ///
    /// # Errors
    ///
    /// An error if the configuration is invalid for this source, see
    /// [`MotionConfig::validate`].
    pub fn new<T: ImageDtype>(source: &Image<T, 1>, config: MotionConfig) -> Result<Self, SynthError> {
        config.validate(source.size())?;
        let scale = config.scale()?;
        let s = scale as usize;

        let source = source.to_f32();
        let upscaled = if s == 1 {
            source
        } else {
            let mut upscaled = Image::from_size_val(
                ImageSize {
                    width: source.width() * s,
                    height: source.height() * s,
                },
                0.0f32,
            )?;
            resize_native(&source, &mut upscaled, InterpolationMode::Nearest)?;
            upscaled
        };

        let (win_w, win_h) = (config.size.width * s, config.size.height * s);
        let window = Roi::new(
            (upscaled.width() - win_w) / 2,
            (upscaled.height() - win_h) / 2,
            win_w,
            win_h,
        );

        let to_steps = |v: f64| (v * scale as f64).round() as i64;
        let direction = [to_steps(config.direction[0]), to_steps(config.direction[1])];
        let max_deviation = [
            to_steps(config.deviation[0].abs()),
            to_steps(config.deviation[1].abs()),
        ];

        let mut rng = StdRng::seed_from_u64(config.seed);
        let noise_rng = StdRng::seed_from_u64(rng.random());

        log::info!(
            "upscale {scale}, window {window} in {} upscaled source",
            upscaled.size()
        );

        Ok(Self {
            config,
            scale,
            upscaled,
            window,
            direction,
            max_deviation,
            position: [0, 0],
            rotation: 0.0,
            rotating: config.angle.abs() > f32::EPSILON as f64,
            rng,
            noise_rng,
            next_index: 0,
        })
    }

    /// Upscale factor, written as the first ground-truth line.
    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// Effective precision, `1 / scale` output pixels.
    pub fn precision(&self) -> f64 {
        1.0 / self.scale as f64
    }

    /// The motion model.
    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    /// Current sampling window in upscaled source coordinates.
    pub fn window(&self) -> Roi {
        self.window
    }

    /// Render the next frame, or `None` once `moves + 1` frames were produced.
    pub fn next_frame(&mut self) -> Result<Option<Frame>, SynthError> {
        let index = self.next_index;
        if index > self.config.moves {
            return Ok(None);
        }

        let motion = if index == 0 {
            None
        } else {
            self.step();
            let record = GroundTruthMove {
                x: self.position[0] as f64 * self.precision(),
                y: self.position[1] as f64 * self.precision(),
                rotation: self.config.include_rotation.then_some(self.rotation),
            };
            log::info!("{index}. {record}");
            Some(record)
        };

        let image = self.render()?;
        self.next_index += 1;

        Ok(Some(Frame {
            index,
            image,
            motion,
        }))
    }

    /// Draw the next move and update window, position and rotation.
    fn step(&mut self) {
        // image axes from here on, y down
        let mut step = [0i64; 2];
        for axis in 0..2 {
            let dev = self.max_deviation[axis];
            let jitter = if dev > 0 {
                self.rng.random_range(-dev..dev)
            } else {
                0
            };
            step[axis] = self.direction[axis] + jitter;
        }
        step[1] = -step[1];

        let tl = [self.window.x as i64, self.window.y as i64];
        let max = [
            (self.upscaled.width() - self.window.width) as i64,
            (self.upscaled.height() - self.window.height) as i64,
        ];
        for axis in 0..2 {
            let next = tl[axis] + step[axis];
            if next < 0 || next > max[axis] {
                self.direction[axis] = -self.direction[axis];
                step[axis] = -step[axis];
            }
            // a reversed step longer than the remaining room stops at the edge
            step[axis] = (tl[axis] + step[axis]).clamp(0, max[axis]) - tl[axis];
        }

        self.window.x = (tl[0] + step[0]) as usize;
        self.window.y = (tl[1] + step[1]) as usize;

        self.position[0] += step[0];
        self.position[1] -= step[1];

        if self.rotating {
            let jitter = self.config.angle_jitter;
            let extra = if jitter > 0.0 {
                self.rng.random_range(-jitter..jitter)
            } else {
                0.0
            };
            self.rotation += self.config.angle + extra;
        }
    }

    fn render(&mut self) -> Result<Image<u8, 1>, SynthError> {
        let window = if self.rotating && self.rotation != 0.0 {
            let center = (
                (self.upscaled.width() as f64 / 2.0 + self.position[0] as f64) as f32,
                (self.upscaled.height() as f64 / 2.0 - self.position[1] as f64) as f32,
            );
            let mut m = get_rotation_matrix2d(center, self.rotation as f32, 1.0);
            // warp straight into window coordinates
            m[2] -= self.window.x as f32;
            m[5] -= self.window.y as f32;

            let mut rotated = Image::from_size_val(self.window.size(), 0.0f32)?;
            warp_affine(&self.upscaled, &mut rotated, &m, InterpolationMode::Bilinear)?;
            rotated
        } else {
            crop_roi(&self.upscaled, &self.window)?
        };

        let mut shrunk = Image::from_size_val(self.config.size, 0.0f32)?;
        resize_area(&window, &mut shrunk)?;

        let pixels = shrunk.as_slice().iter().map(|&v| u8::from_f32(v)).collect();
        let mut image = Image::new(self.config.size, pixels)?;

        add_gaussian_noise(&mut image, self.config.noise, &mut self.noise_rng)?;

        Ok(image)
    }
}

impl Iterator for Generator {
    type Item = Result<Frame, SynthError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_frame().transpose()
    }
}
