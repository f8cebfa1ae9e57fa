use argh::FromArgs;
use std::path::PathBuf;

use speckle::io::{ground_truth::read_ground_truth, sequence};
use speckle::tracking::{Domain, Metric, TemplateMatching, TemplateMatchingConfig, Trajectory};

#[derive(FromArgs)]
/// Track a generated image sequence and compare against its ground truth
struct Args {
    /// directory holding img0000.png, img0001.png, ...
    #[argh(option, short = 'i')]
    input: PathBuf,

    /// ground-truth log, defaults to moves.txt in the input directory
    #[argh(option, short = 'g')]
    ground_truth: Option<PathBuf>,

    /// JSON file with the tracker configuration, flags override its fields
    #[argh(option)]
    config: Option<PathBuf>,

    /// number of downscaled pyramid levels
    #[argh(option)]
    layers: Option<usize>,

    /// similarity domain: spatial or frequency
    #[argh(option)]
    domain: Option<Domain>,

    /// similarity metric: sad, ssd or ncc
    #[argh(option)]
    metric: Option<Metric>,

    /// integer upsampling factor applied to every frame
    #[argh(option)]
    upsample: Option<u32>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let mut config = match &args.config {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => TemplateMatchingConfig::default(),
    };
    if let Some(layers) = args.layers {
        config.layers = layers;
    }
    if let Some(domain) = args.domain {
        config.domain = domain;
    }
    if let Some(metric) = args.metric {
        config.metric = metric;
    }
    if let Some(upsample) = args.upsample {
        config.upsample = upsample;
    }

    let mut frames = sequence::read_frames(&args.input)?;
    let Some(first) = frames.next().transpose()? else {
        return Err(format!("no frames found in {}", args.input.display()).into());
    };

    let truth_path = args
        .ground_truth
        .unwrap_or_else(|| args.input.join("moves.txt"));
    let truth = if truth_path.exists() {
        Some(read_ground_truth(&truth_path)?)
    } else {
        log::warn!("no ground truth at {}", truth_path.display());
        None
    };

    let mut tracker = TemplateMatching::new(&first, config)?;
    let mut trajectory = Trajectory::new();
    let mut errors = vec![];

    println!("frame,x,y,true_x,true_y,error");
    for (i, frame) in frames.enumerate() {
        let index = i + 1;
        let frame = frame?;
        trajectory.push(tracker.estimate_displacement(&frame)?);

        // content motion in image axes, reported as window motion in Euclidean axes
        let [cx, cy] = trajectory.current();
        let (x, y) = (-cx, cy);

        match truth.as_ref().and_then(|t| t.moves.get(i)) {
            Some(record) => {
                let error = ((x - record.x).powi(2) + (y - record.y).powi(2)).sqrt();
                errors.push(error);
                println!("{index},{x},{y},{},{},{error:.4}", record.x, record.y);
            }
            None => println!("{index},{x},{y},,,"),
        }
    }

    if !errors.is_empty() {
        let mean = errors.iter().sum::<f64>() / errors.len() as f64;
        let max = errors.iter().cloned().fold(0.0, f64::max);
        println!(
            "{}: {} frames, mean error {mean:.4} px, max error {max:.4} px",
            tracker.peak_finder().name(),
            errors.len()
        );
    }

    Ok(())
}
