use crate::note::NoteKind;

/// Number of initial calibration taps discarded as warm-up noise.
const WARMUP_TAPS: usize = 2;

/// Convert a millisecond quantity into whole samples at the given rate.
pub fn samples_from_millis(millis: i64, sample_rate: u32) -> i64 {
    millis * i64::from(sample_rate) / 1000
}

/// Lead time between a note becoming active and its target sample.
/// Switch notes travel at half speed, so they spawn twice as early.
pub fn spawn_lead(kind: NoteKind, sample_rate: u32) -> i64 {
    match kind {
        NoteKind::Switch => 2 * i64::from(sample_rate),
        NoteKind::Beat | NoteKind::Hold => i64::from(sample_rate),
    }
}

/// Collects tap deltas against a metronome and averages them into a signed
/// calibration offset. The first few taps are discarded as warm-up.
#[derive(Clone, Debug, Default)]
pub struct CalibrationTaps {
    deltas_millis: Vec<i64>,
}

impl CalibrationTaps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one tap's signed distance from the nearest metronome beat,
    /// in milliseconds (negative = early).
    pub fn push(&mut self, delta_millis: i64) {
        self.deltas_millis.push(delta_millis);
    }

    pub fn len(&self) -> usize {
        self.deltas_millis.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deltas_millis.is_empty()
    }

    /// Mean of the recorded taps after the warm-up discard, or zero when
    /// nothing usable was recorded.
    pub fn offset_millis(&self) -> i64 {
        let counted = &self.deltas_millis[self.deltas_millis.len().min(WARMUP_TAPS)..];
        if counted.is_empty() {
            return 0;
        }
        counted.iter().sum::<i64>() / counted.len() as i64
    }

    pub fn offset_samples(&self, sample_rate: u32) -> i64 {
        samples_from_millis(self.offset_millis(), sample_rate)
    }
}
