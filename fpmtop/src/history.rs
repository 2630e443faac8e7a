//! Fixed-size sample history rendered as a one-line sparkline.

/// Blank plus eight block heights, lowest to highest.
pub const STEPS: [char; 9] = [' ', '▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

#[derive(Debug, Clone)]
pub struct SparkRing {
    ring: Vec<f64>,
    // next slot to overwrite
    cursor: usize,
}

impl SparkRing {
    /// A ring holding `cap` samples (at least one), all zero.
    pub fn new(cap: usize) -> Self {
        Self {
            ring: vec![0.0; cap.max(1)],
            cursor: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.ring.len()
    }

    pub fn push(&mut self, value: f64) {
        self.ring[self.cursor] = value;
        self.cursor = (self.cursor + 1) % self.ring.len();
    }

    /// Most recently pushed sample (zero before the first push).
    pub fn latest(&self) -> f64 {
        let n = self.ring.len();
        self.ring[(self.cursor + n - 1) % n]
    }

    /// Largest sample in the ring. Unwritten slots count as zero.
    pub fn max(&self) -> f64 {
        self.ring.iter().copied().fold(0.0, f64::max)
    }

    /// Oldest sample on the left, newest on the right.
    pub fn render(&self) -> String {
        let n = self.ring.len();
        let max = self.max();
        let mut out = vec![STEPS[0]; n];
        if max <= 0.0 {
            return out.into_iter().collect();
        }
        let step = max / STEPS.len() as f64;
        for (i, &value) in self.ring.iter().enumerate() {
            let level = ((value / step) - 0.5).floor().clamp(0.0, (STEPS.len() - 1) as f64);
            out[(n + i - self.cursor) % n] = STEPS[level as usize];
        }
        out.into_iter().collect()
    }
}
