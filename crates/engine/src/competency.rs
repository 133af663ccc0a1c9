use crate::lane::Lane;

/// Bounded per-lane health. Deltas clamp into `[0, max]`; hitting zero
/// signals a loss condition that the caller decides on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Competency {
    current: f32,
    max: f32,
}

impl Competency {
    pub fn new(max: f32) -> Self {
        debug_assert!(max > 0.0);
        Self { current: max, max }
    }

    pub fn apply(&mut self, delta: f32) {
        self.current = (self.current + delta).clamp(0.0, self.max);
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    pub fn fraction(&self) -> f32 {
        self.current / self.max
    }

    pub fn is_empty(&self) -> bool {
        self.current <= 0.0
    }

    pub fn refill(&mut self) {
        self.current = self.max;
    }
}

/// Applies passive competency decay once per frame. Owns the decay
/// watermark: each call charges every lane for the samples elapsed since
/// the previous call, but only while that lane has hit notes on screen.
#[derive(Clone, Copy, Debug)]
pub struct CompetencyMeter {
    sample_rate: u32,
    last_decay_sample: i64,
}

impl CompetencyMeter {
    pub fn new(sample_rate: u32) -> Self {
        debug_assert!(sample_rate > 0);
        Self {
            sample_rate,
            last_decay_sample: 0,
        }
    }

    pub fn decay(&mut self, lanes: &mut [Lane], current_sample: i64) {
        let elapsed = current_sample - self.last_decay_sample;
        if elapsed > 0 {
            for lane in lanes.iter_mut() {
                lane.decay(elapsed, self.sample_rate);
            }
        }
        self.last_decay_sample = current_sample;
    }

    pub fn reset(&mut self) {
        self.last_decay_sample = 0;
    }
}
