use serde::{Deserialize, Serialize};

/// An integer displacement between two frames, in image axes.
///
/// `x` grows to the right and `y` grows downwards. The vector measures how far
/// the image content moved: content shifted by `(dx, dy)` pixels yields
/// `(dx, dy)`. When frames were upsampled before matching, `x` and `y` are in
/// units of `1 / scale` pixels.
///
/// # Examples
///
/// ```
/// use speckle_tracking::Displacement;
///
/// let d = Displacement::with_scale(5, -3, 2);
///
/// assert_eq!(d.to_pixels(), [2.5, -1.5]);
/// assert_eq!(d.to_euclidean(), [2.5, 1.5]);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Displacement {
    /// horizontal component, in sub-pixel units.
    pub x: i64,
    /// vertical component (downwards), in sub-pixel units.
    pub y: i64,
    /// number of sub-pixel units per pixel.
    pub scale: u32,
}

impl Displacement {
    /// Create an integer-pixel displacement.
    pub fn new(x: i64, y: i64) -> Self {
        Self::with_scale(x, y, 1)
    }

    /// Create a displacement counted in `1 / scale` pixel units.
    pub fn with_scale(x: i64, y: i64, scale: u32) -> Self {
        Self { x, y, scale }
    }

    /// The zero displacement.
    pub fn zero() -> Self {
        Self::new(0, 0)
    }

    /// Returns true if no motion was measured.
    pub fn is_zero(&self) -> bool {
        self.x == 0 && self.y == 0
    }

    /// Displacement in pixels, image axes (y down).
    pub fn to_pixels(&self) -> [f64; 2] {
        let scale = self.scale.max(1) as f64;
        [self.x as f64 / scale, self.y as f64 / scale]
    }

    /// Displacement in pixels, Euclidean axes (y up).
    pub fn to_euclidean(&self) -> [f64; 2] {
        let [x, y] = self.to_pixels();
        [x, -y]
    }
}

impl Default for Displacement {
    fn default() -> Self {
        Self::zero()
    }
}

impl std::fmt::Display for Displacement {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let [x, y] = self.to_pixels();
        write!(f, "({x}, {y})")
    }
}

/// Cumulative path built from frame-to-frame displacements.
///
/// The tracker only reports motion relative to the previous frame; this type
/// sums those increments. Positions are in pixels, image axes, starting at the
/// origin for the reference frame.
///
/// # Examples
///
/// ```
/// use speckle_tracking::{Displacement, Trajectory};
///
/// let mut trajectory = Trajectory::new();
/// trajectory.push(Displacement::new(2, 1));
/// trajectory.push(Displacement::new(-1, 3));
///
/// assert_eq!(trajectory.len(), 3);
/// assert_eq!(trajectory.current(), [1.0, 4.0]);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Trajectory {
    positions: Vec<[f64; 2]>,
}

impl Trajectory {
    /// Create a trajectory holding only the origin.
    pub fn new() -> Self {
        Self {
            positions: vec![[0.0, 0.0]],
        }
    }

    /// Append the position reached after `displacement`.
    pub fn push(&mut self, displacement: Displacement) {
        let [x, y] = self.current();
        let [dx, dy] = displacement.to_pixels();
        self.positions.push([x + dx, y + dy]);
    }

    /// Latest cumulative position.
    pub fn current(&self) -> [f64; 2] {
        self.positions.last().copied().unwrap_or([0.0, 0.0])
    }

    /// Number of positions, including the origin.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Returns true if only the origin is recorded.
    pub fn is_empty(&self) -> bool {
        self.positions.len() <= 1
    }

    /// All positions from the origin onwards.
    pub fn positions(&self) -> &[[f64; 2]] {
        &self.positions
    }
}

impl Default for Trajectory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displacement_units() {
        let d = Displacement::with_scale(-7, 4, 4);
        assert_eq!(d.to_pixels(), [-1.75, 1.0]);
        assert_eq!(d.to_euclidean(), [-1.75, -1.0]);
        assert!(!d.is_zero());
        assert!(Displacement::default().is_zero());
        assert_eq!(Displacement::new(3, -2).to_string(), "(3, -2)");
    }

    #[test]
    fn trajectory_accumulates() {
        let mut trajectory = Trajectory::default();
        assert!(trajectory.is_empty());
        trajectory.push(Displacement::with_scale(1, 2, 2));
        trajectory.push(Displacement::with_scale(1, 2, 2));
        assert_eq!(trajectory.positions(), &[[0.0, 0.0], [0.5, 1.0], [1.0, 2.0]]);
    }
}
