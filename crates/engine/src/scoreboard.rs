use crate::judge::{JudgeOutcome, JudgmentEvent, JudgmentSink};

/// Base points for a hit inside the on-beat leniency.
pub const ON_BEAT_POINTS: u64 = 1_000;
/// Base points for a hit in the off-beat band.
pub const OFF_BEAT_POINTS: u64 = 500;

/// Combo-score thresholds at which the multiplier steps up.
const MULTIPLIER_THRESHOLDS: [u64; 3] = [10_000, 20_000, 40_000];
const MULTIPLIERS: [u64; 4] = [1, 2, 3, 5];

/// How many judgments landed in each tier over the session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OutcomeCounts {
    pub on_beat: u64,
    pub off_beat: u64,
    pub penalty: u64,
    pub miss: u64,
}

impl OutcomeCounts {
    pub fn judged(&self) -> u64 {
        self.on_beat + self.off_beat + self.penalty + self.miss
    }
}

/// Letter grade from the final score against the chart's thresholds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Grade {
    D,
    C,
    B,
    A,
    S,
}

impl Grade {
    pub fn from_score(score: u64, thresholds: [u64; 4]) -> Self {
        if score >= thresholds[3] {
            Grade::S
        } else if score >= thresholds[2] {
            Grade::A
        } else if score >= thresholds[1] {
            Grade::B
        } else if score >= thresholds[0] {
            Grade::C
        } else {
            Grade::D
        }
    }

    pub fn letter(self) -> char {
        match self {
            Grade::D => 'D',
            Grade::C => 'C',
            Grade::B => 'B',
            Grade::A => 'A',
            Grade::S => 'S',
        }
    }
}

/// Score accumulator fed by judgment events. Hits bank base points times
/// the current multiplier; the multiplier climbs with the score earned
/// inside the current combo and drops back to one the moment a penalty
/// or miss breaks it.
#[derive(Clone, Copy, Debug)]
pub struct Scoreboard {
    score: u64,
    combo: u64,
    combo_score: u64,
    counts: OutcomeCounts,
    grade_thresholds: [u64; 4],
}

impl Scoreboard {
    pub fn new(grade_thresholds: [u64; 4]) -> Self {
        Self {
            score: 0,
            combo: 0,
            combo_score: 0,
            counts: OutcomeCounts::default(),
            grade_thresholds,
        }
    }

    fn multiplier(&self) -> u64 {
        let level = MULTIPLIER_THRESHOLDS
            .iter()
            .filter(|threshold| self.combo_score >= **threshold)
            .count();
        MULTIPLIERS[level]
    }

    fn receive_hit(&mut self, base_points: u64) {
        self.combo += 1;
        self.combo_score += base_points;
        self.score += base_points * self.multiplier();
    }

    fn break_combo(&mut self) {
        self.combo = 0;
        self.combo_score = 0;
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn combo(&self) -> u64 {
        self.combo
    }

    pub fn counts(&self) -> OutcomeCounts {
        self.counts
    }

    pub fn grade(&self) -> Grade {
        Grade::from_score(self.score, self.grade_thresholds)
    }

    pub fn reset(&mut self) {
        self.score = 0;
        self.combo = 0;
        self.combo_score = 0;
        self.counts = OutcomeCounts::default();
    }
}

impl JudgmentSink for Scoreboard {
    fn on_judgment(&mut self, event: &JudgmentEvent) {
        match event.outcome {
            JudgeOutcome::OnBeat => {
                self.counts.on_beat += 1;
                self.receive_hit(ON_BEAT_POINTS);
            }
            JudgeOutcome::OffBeat => {
                self.counts.off_beat += 1;
                self.receive_hit(OFF_BEAT_POINTS);
            }
            JudgeOutcome::Penalty => {
                self.counts.penalty += 1;
                self.break_combo();
            }
            JudgeOutcome::Miss => {
                self.counts.miss += 1;
                self.break_combo();
            }
            JudgeOutcome::OutOfRange => {}
        }
    }
}
