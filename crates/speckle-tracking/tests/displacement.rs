use speckle_synth::{speckle_pattern, Generator, MotionConfig};
use speckle_tracking::{
    Displacement, DisplacementMethod, Domain, Metric, TemplateMatching, TemplateMatchingConfig,
    Trajectory,
};

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn straight_walk(direction: [f64; 2], precision: f64, moves: usize) -> MotionConfig {
    MotionConfig {
        size: [64, 64].into(),
        moves,
        direction,
        deviation: [0.0, 0.0],
        precision,
        ..Default::default()
    }
}

#[test]
fn tracks_generated_walk() -> TestResult {
    let source = speckle_pattern([160, 160].into(), 0.5, 2.0, 11)?;
    let config = straight_walk([3.0, 2.0], 1.0, 8);

    let mut frames = Generator::new(&source, config)?;
    let first = frames.next().ok_or("empty sequence")??;

    let tracker_config = TemplateMatchingConfig {
        layers: 1,
        ..Default::default()
    };
    let mut tracker = TemplateMatching::new(&first.image, tracker_config)?;

    for frame in frames {
        let frame = frame?;
        let displacement = tracker.estimate_displacement(&frame.image)?;
        // the window walks along `direction`, the content the opposite way
        assert_eq!(displacement.to_euclidean(), [-3.0, -2.0], "frame {}", frame.index);
    }
    Ok(())
}

#[test]
fn trajectory_matches_ground_truth() -> TestResult {
    let source = speckle_pattern([160, 160].into(), 0.5, 2.0, 12)?;
    let config = MotionConfig {
        deviation: [2.0, 2.0],
        seed: 99,
        ..straight_walk([-2.0, 3.0], 1.0, 10)
    };

    let mut frames = Generator::new(&source, config)?;
    let first = frames.next().ok_or("empty sequence")??;
    let mut tracker: Box<dyn DisplacementMethod> =
        Box::new(TemplateMatching::new(&first.image, TemplateMatchingConfig::default())?);
    let mut trajectory = Trajectory::new();

    for frame in frames {
        let frame = frame?;
        trajectory.push(tracker.estimate_displacement(&frame.image)?);

        let truth = frame.motion.ok_or("missing ground truth")?;
        let [x, y] = trajectory.current();
        // content position in image axes against window position in Euclidean axes
        assert_eq!([-x, y], [truth.x, truth.y], "frame {}", frame.index);
    }
    assert_eq!(trajectory.len(), 11);
    Ok(())
}

#[test]
fn upsampling_resolves_fractional_steps() -> TestResult {
    let source = speckle_pattern([160, 160].into(), 0.5, 3.0, 13)?;
    let config = straight_walk([1.5, -0.5], 0.5, 3);

    let mut frames = Generator::new(&source, config)?;
    let first = frames.next().ok_or("empty sequence")??;

    let tracker_config = TemplateMatchingConfig {
        upsample: 2,
        domain: Domain::Frequency,
        metric: Metric::Ncc,
        ..Default::default()
    };
    let mut tracker = TemplateMatching::new(&first.image, tracker_config)?;

    for frame in frames {
        let displacement = tracker.estimate_displacement(&frame?.image)?;
        assert_eq!(displacement.scale, 2);
        assert_eq!(displacement.to_euclidean(), [-1.5, 0.5]);
    }
    Ok(())
}

#[test]
fn failed_query_keeps_reference() -> TestResult {
    let source = speckle_pattern([96, 96].into(), 0.5, 2.0, 14)?;
    let first = Generator::new(&source, straight_walk([1.0, 1.0], 1.0, 0))?
        .next()
        .ok_or("empty sequence")??;

    let mut tracker = TemplateMatching::new(&first.image, TemplateMatchingConfig::default())?;
    let wrong = speckle_pattern([48, 64].into(), 0.5, 2.0, 15)?;
    assert!(tracker.estimate_displacement(&wrong).is_err());
    assert_eq!(tracker.estimate_displacement(&first.image)?, Displacement::zero());
    Ok(())
}
