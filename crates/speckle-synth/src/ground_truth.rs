use std::fmt;

use crate::error::SynthError;

/// Cumulative window position after one move.
///
/// `x` and `y` are in output pixels, Euclidean axes (y up), rounded to the
/// generator precision. `rotation` is the cumulative angle in degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GroundTruthMove {
    /// horizontal position.
    pub x: f64,
    /// vertical position, y up.
    pub y: f64,
    /// cumulative rotation, when recorded.
    pub rotation: Option<f64>,
}

impl GroundTruthMove {
    /// Parse a `x,y` or `x,y,rotation` record.
    ///
    /// `line` is the 1-based line number reported on failure.
    pub fn parse(text: &str, line: usize) -> Result<Self, SynthError> {
        let invalid = |reason: String| SynthError::InvalidGroundTruth { line, reason };

        let fields = text
            .split(',')
            .map(|field| {
                field
                    .trim()
                    .parse::<f64>()
                    .map_err(|e| invalid(format!("{field:?}: {e}")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        match fields[..] {
            [x, y] => Ok(Self {
                x,
                y,
                rotation: None,
            }),
            [x, y, rotation] => Ok(Self {
                x,
                y,
                rotation: Some(rotation),
            }),
            _ => Err(invalid(format!("expected 2 or 3 fields, got {}", fields.len()))),
        }
    }
}

impl fmt::Display for GroundTruthMove {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)?;
        if let Some(rotation) = self.rotation {
            write!(f, ",{rotation}")?;
        }
        Ok(())
    }
}

/// A parsed ground-truth log.
///
/// The text form holds the upscale factor on its first line, then one
/// [`GroundTruthMove`] per line, one per frame after the first.
///
/// # Examples
///
/// ```
/// use speckle_synth::GroundTruth;
///
/// let truth = GroundTruth::parse("10\n1,-1.5,0\n2.1,-3,0\n").unwrap();
///
/// assert_eq!(truth.scale, 10);
/// assert_eq!(truth.moves.len(), 2);
/// assert_eq!(truth.moves[1].x, 2.1);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GroundTruth {
    /// upscale factor the sequence was generated with.
    pub scale: u32,
    /// cumulative positions, frame 1 onwards.
    pub moves: Vec<GroundTruthMove>,
}

impl GroundTruth {
    /// Effective precision of the positions, `1 / scale`.
    pub fn precision(&self) -> f64 {
        1.0 / self.scale.max(1) as f64
    }

    /// Window step between frame `index - 1` and frame `index`, Euclidean axes.
    ///
    /// Returns `None` for frame 0 or past the end of the log.
    pub fn step(&self, index: usize) -> Option<[f64; 2]> {
        let current = self.moves.get(index.checked_sub(1)?)?;
        let [px, py] = match index {
            1 => [0.0, 0.0],
            _ => {
                let prev = &self.moves[index - 2];
                [prev.x, prev.y]
            }
        };
        Some([current.x - px, current.y - py])
    }

    /// Parse the text form. Blank lines are skipped.
    pub fn parse(text: &str) -> Result<Self, SynthError> {
        let mut lines = text
            .lines()
            .enumerate()
            .map(|(i, line)| (i + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty());

        let (line, header) = lines.next().ok_or_else(|| SynthError::InvalidGroundTruth {
            line: 1,
            reason: "missing scale".to_string(),
        })?;
        let scale = header
            .parse::<u32>()
            .map_err(|e| SynthError::InvalidGroundTruth {
                line,
                reason: format!("scale {header:?}: {e}"),
            })?;

        let moves = lines
            .map(|(line, text)| GroundTruthMove::parse(text, line))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { scale, moves })
    }
}

impl fmt::Display for GroundTruth {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.scale)?;
        for record in &self.moves {
            writeln!(f, "{record}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_records() -> Result<(), SynthError> {
        let record = GroundTruthMove::parse("0.3, -1.2", 4)?;
        assert_eq!(
            record,
            GroundTruthMove {
                x: 0.3,
                y: -1.2,
                rotation: None
            }
        );
        assert_eq!(record.to_string(), "0.3,-1.2");

        let record = GroundTruthMove::parse("1,2,0.5", 1)?;
        assert_eq!(record.rotation, Some(0.5));
        assert_eq!(record.to_string(), "1,2,0.5");

        assert!(matches!(
            GroundTruthMove::parse("1", 7),
            Err(SynthError::InvalidGroundTruth { line: 7, .. })
        ));
        assert!(GroundTruthMove::parse("1,x", 1).is_err());
        Ok(())
    }

    #[test]
    fn parse_log() -> Result<(), SynthError> {
        let text = "4\n0.25,0.5,0\n\n0.5,1,0\n";
        let truth = GroundTruth::parse(text)?;
        assert_eq!(truth.scale, 4);
        assert_eq!(truth.precision(), 0.25);
        assert_eq!(truth.moves.len(), 2);
        assert_eq!(truth.to_string(), "4\n0.25,0.5,0\n0.5,1,0\n");

        assert_eq!(truth.step(0), None);
        assert_eq!(truth.step(1), Some([0.25, 0.5]));
        assert_eq!(truth.step(2), Some([0.25, 0.5]));
        assert_eq!(truth.step(3), None);

        assert!(matches!(
            GroundTruth::parse("ten\n1,1"),
            Err(SynthError::InvalidGroundTruth { line: 1, .. })
        ));
        assert!(GroundTruth::parse("").is_err());
        Ok(())
    }
}
