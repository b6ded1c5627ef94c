//! Current/target value pair advanced by exponential interpolation

/// Reference frame duration the interpolation rates are tuned for
pub const REFERENCE_FRAME_SECS: f64 = 1.0 / 60.0;

/// A value that chases a target a fixed fraction of the remaining distance per frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SmoothedValue {
    pub current: f64,
    pub target: f64,
}

impl SmoothedValue {
    pub fn new(value: f64) -> Self {
        Self {
            current: value,
            target: value,
        }
    }

    pub fn set(&mut self, target: f64) {
        self.target = target;
    }

    /// Jump straight to `value` with no animation
    pub fn reset(&mut self, value: f64) {
        self.current = value;
        self.target = value;
    }

    pub fn delta(&self) -> f64 {
        self.target - self.current
    }

    pub fn is_settled(&self, epsilon: f64) -> bool {
        self.delta().abs() < epsilon
    }

    /// Advance toward `goal` by `rate` (fraction per reference frame), scaled to `dt`.
    pub fn step_toward(&mut self, goal: f64, rate: f64, dt: f64) -> f64 {
        let alpha = frame_alpha(rate, dt);
        self.current += (goal - self.current) * alpha;
        self.current
    }

    /// Advance toward the stored target
    pub fn step(&mut self, rate: f64, dt: f64) -> f64 {
        let goal = self.target;
        self.step_toward(goal, rate, dt)
    }

    pub fn settle(&mut self) {
        self.current = self.target;
    }
}

/// Convert a per-frame rate into the fraction to apply over `dt` seconds.
///
/// At `dt == REFERENCE_FRAME_SECS` this returns `rate` unchanged.
pub fn frame_alpha(rate: f64, dt: f64) -> f64 {
    let rate = rate.clamp(0.0, 1.0);
    if dt <= 0.0 {
        return 0.0;
    }
    let frames = dt / REFERENCE_FRAME_SECS;
    1.0 - (1.0 - rate).powf(frames)
}

/// Per-frame decay factor rescaled to `dt`
pub fn frame_decay(factor: f64, dt: f64) -> f64 {
    if dt <= 0.0 {
        return 1.0;
    }
    factor.clamp(0.0, 1.0).powf(dt / REFERENCE_FRAME_SECS)
}
