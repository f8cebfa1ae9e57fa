use argh::FromArgs;
use std::path::PathBuf;

use speckle::image::ImageSize;
use speckle::io::{ground_truth::GroundTruthWriter, png, sequence};
use speckle::synth::{speckle_pattern, Generator, MotionConfig};

#[derive(FromArgs)]
/// Generate an image sequence with known sub-pixel motion and its ground-truth log
struct Args {
    /// path to the grayscale source image, a random speckle pattern is used if omitted
    #[argh(option, short = 's')]
    source: Option<PathBuf>,

    /// directory receiving the frames and moves.txt
    #[argh(option, short = 'o', default = "PathBuf::from(\"images\")")]
    output: PathBuf,

    /// JSON file with the motion model, flags override its fields
    #[argh(option)]
    config: Option<PathBuf>,

    /// side of the square output frames, in pixels
    #[argh(option)]
    size: Option<usize>,

    /// number of moves
    #[argh(option)]
    moves: Option<usize>,

    /// mean step per move on both axes
    #[argh(option)]
    direction: Option<f64>,

    /// maximum random deviation from the step on both axes
    #[argh(option)]
    deviation: Option<f64>,

    /// mean rotation per move, in degrees
    #[argh(option)]
    angle: Option<f64>,

    /// maximum random deviation from the rotation, in degrees
    #[argh(option)]
    angle_jitter: Option<f64>,

    /// standard deviation of the additive noise
    #[argh(option)]
    noise: Option<f64>,

    /// displacement resolution in pixels
    #[argh(option)]
    precision: Option<f64>,

    /// random seed
    #[argh(option)]
    seed: Option<u64>,

    /// omit the rotation column from the ground-truth log
    #[argh(switch)]
    no_rotation: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let mut config = match &args.config {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => MotionConfig::default(),
    };
    if let Some(size) = args.size {
        config.size = ImageSize {
            width: size,
            height: size,
        };
    }
    if let Some(moves) = args.moves {
        config.moves = moves;
    }
    if let Some(direction) = args.direction {
        config.direction = [direction, direction];
    }
    if let Some(deviation) = args.deviation {
        config.deviation = [deviation, deviation];
    }
    if let Some(angle) = args.angle {
        config.angle = angle;
    }
    if let Some(angle_jitter) = args.angle_jitter {
        config.angle_jitter = angle_jitter;
    }
    if let Some(noise) = args.noise {
        config.noise = noise;
    }
    if let Some(precision) = args.precision {
        config.precision = precision;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if args.no_rotation {
        config.include_rotation = false;
    }

    let source = match &args.source {
        Some(path) => png::read_image_png_mono8(path)?,
        None => {
            // leave room for a few moves in every direction before bouncing
            let margin = |axis: usize| {
                (4.0 * (config.direction[axis].abs() + config.deviation[axis].abs())).ceil() as usize
            };
            let size = ImageSize {
                width: config.size.width + margin(0),
                height: config.size.height + margin(1),
            };
            speckle_pattern(size, 0.5, 2.0, config.seed)?
        }
    };

    std::fs::create_dir_all(&args.output)?;

    let mut generator = Generator::new(&source, config)?;
    let mut writer = GroundTruthWriter::create(args.output.join("moves.txt"), generator.scale())?;

    println!("Speckle movement generator");
    println!("upscale: {}, precision: {}", generator.scale(), generator.precision());

    while let Some(frame) = generator.next_frame()? {
        if let Some(motion) = &frame.motion {
            writer.write_move(motion)?;
            println!("{}. {}", frame.index, motion);
        }
        sequence::write_frame(&args.output, frame.index, &frame.image)?;
    }
    writer.finish()?;

    log::info!("wrote {} frames to {}", config.moves + 1, args.output.display());

    Ok(())
}
