/// Range of ray parameters, or the extent of a box along one axis.
///
/// Ray hits are accepted with [`surrounds`](Interval::surrounds), which leaves
/// out both ends, while point-in-rectangle tests use the closed
/// [`contains`](Interval::contains).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub min: f64,
    pub max: f64,
}

impl Interval {
    /// The whole real line, for queries that accept a hit at any distance.
    pub const UNIVERSE: Interval = Interval::new(f64::NEG_INFINITY, f64::INFINITY);

    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn size(&self) -> f64 {
        self.max - self.min
    }

    /// No value lies strictly between the ends. Also true when either end is NaN.
    pub fn is_empty(&self) -> bool {
        !(self.min < self.max)
    }

    /// `min <= x <= max`
    pub fn contains(&self, x: f64) -> bool {
        self.min <= x && x <= self.max
    }

    /// `min < x < max`
    pub fn surrounds(&self, x: f64) -> bool {
        self.min < x && x < self.max
    }

    /// Grow by `delta` in total, half on each side.
    pub fn expand(&self, delta: f64) -> Interval {
        let half = 0.5 * delta;
        Interval::new(self.min - half, self.max + half)
    }

    /// Shift both ends by `offset`.
    pub fn add_scalar(&self, offset: f64) -> Interval {
        Interval::new(self.min + offset, self.max + offset)
    }

    /// Hull of two intervals.
    pub fn surrounding(a: &Interval, b: &Interval) -> Interval {
        Interval::new(a.min.min(b.min), a.max.max(b.max))
    }

    /// Shared part of two intervals; check [`is_empty`](Interval::is_empty)
    /// before using it.
    pub fn overlap(a: &Interval, b: &Interval) -> Interval {
        Interval::new(a.min.max(b.min), a.max.min(b.max))
    }
}
