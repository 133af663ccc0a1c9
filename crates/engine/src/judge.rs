use encore_chart::{samples_from_millis, NoteKind};

use crate::note::Note;

/// On-beat leniency in milliseconds, converted to samples per chart rate.
pub const ON_BEAT_LENIENCY_MS: i64 = 70;
/// Sample distance inside which a press still counts as a hit.
pub const HIT_WINDOW_SAMPLES: i64 = 10_000;
/// Sample distance at or beyond which no judgment occurs at all.
pub const OUTER_WINDOW_SAMPLES: i64 = 15_000;

/// How a single interaction with a note was classified. `judge` never
/// returns `Miss`; that tier is reported by the session when an unjudged
/// note passes its kill threshold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum JudgeOutcome {
    OnBeat,
    OffBeat,
    /// Pressed inside the outer window but outside the hit band: a
    /// miss-like penalty that does not destroy the note.
    Penalty,
    Miss,
    /// Too far from any window; the note is left untouched.
    OutOfRange,
}

impl JudgeOutcome {
    pub fn is_hit(self) -> bool {
        matches!(self, JudgeOutcome::OnBeat | JudgeOutcome::OffBeat)
    }
}

/// Nested timing windows: `on_beat <= penalty_floor <= outer`. The
/// two-threshold form leaves the penalty band empty, so every press inside
/// the outer window is a gain; `standard` carries the default tuning with
/// a 10 000-sample penalty floor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct JudgeWindows {
    pub on_beat: i64,
    pub penalty_floor: i64,
    pub outer: i64,
}

impl JudgeWindows {
    pub fn new(on_beat: i64, outer: i64) -> Self {
        debug_assert!(0 < on_beat && on_beat <= outer);
        Self {
            on_beat,
            penalty_floor: outer,
            outer,
        }
    }

    pub fn with_penalty_floor(mut self, floor: i64) -> Self {
        debug_assert!(self.on_beat <= floor && floor <= self.outer);
        self.penalty_floor = floor;
        self
    }

    pub fn standard(sample_rate: u32) -> Self {
        Self {
            on_beat: samples_from_millis(ON_BEAT_LENIENCY_MS, sample_rate),
            penalty_floor: HIT_WINDOW_SAMPLES,
            outer: OUTER_WINDOW_SAMPLES,
        }
    }

    /// Classify an absolute sample distance. First match wins, outermost
    /// first, so no judgment ever occurs at or beyond `outer`.
    pub fn classify(&self, distance: i64) -> JudgeOutcome {
        if distance >= self.outer {
            JudgeOutcome::OutOfRange
        } else if distance >= self.penalty_floor {
            JudgeOutcome::Penalty
        } else if distance < self.on_beat {
            JudgeOutcome::OnBeat
        } else {
            JudgeOutcome::OffBeat
        }
    }
}

/// Competency deltas per judgment tier for one class of note.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rewards {
    pub on_beat_gain: i32,
    pub off_beat_gain: i32,
    pub off_beat_loss: i32,
}

impl Rewards {
    pub const SWITCH: Rewards = Rewards {
        on_beat_gain: 8,
        off_beat_gain: 5,
        off_beat_loss: 0,
    };
    pub const BEAT: Rewards = Rewards {
        on_beat_gain: 3,
        off_beat_gain: 1,
        off_beat_loss: -1,
    };
    pub const HOLD: Rewards = Rewards {
        on_beat_gain: 4,
        off_beat_gain: 2,
        off_beat_loss: -1,
    };

    pub fn for_kind(kind: NoteKind) -> Rewards {
        match kind {
            NoteKind::Beat => Rewards::BEAT,
            NoteKind::Hold => Rewards::HOLD,
            NoteKind::Switch => Rewards::SWITCH,
        }
    }
}

/// Judge one interaction between the clock, an input edge and a note.
///
/// `lift` targets a hold note's tail instead of its head. On a hit the
/// note records the gain, starts holding (meaningful for hold heads),
/// registers its line in `line_hits` so no second note on that line can
/// consume the same edge this frame, and is destroyed iff
/// `destroy_on_hit`. A penalty records the loss without destroying; the
/// loss lands when the note later dies.
pub fn judge(
    note: &mut Note,
    current_sample: i64,
    offset_samples: i64,
    windows: &JudgeWindows,
    rewards: Rewards,
    destroy_on_hit: bool,
    line_hits: &mut [bool],
    lift: bool,
) -> JudgeOutcome {
    debug_assert!(!note.destroyed, "judging a destroyed note");
    debug_assert!(!lift || note.kind == NoteKind::Hold);

    let adjusted = current_sample - offset_samples;
    let target = if lift {
        note.tail_sample()
    } else {
        note.target_sample
    };
    let distance = (adjusted - target).abs();

    let outcome = windows.classify(distance);
    match outcome {
        JudgeOutcome::OnBeat | JudgeOutcome::OffBeat => {
            note.judgment_delta = if outcome == JudgeOutcome::OnBeat {
                rewards.on_beat_gain
            } else {
                rewards.off_beat_gain
            };
            note.holding = true;
            if let Some(line) = note.line {
                line_hits[line] = true;
            }
            note.destroyed = destroy_on_hit;
        }
        JudgeOutcome::Penalty => {
            note.judgment_delta = rewards.off_beat_loss;
        }
        JudgeOutcome::Miss | JudgeOutcome::OutOfRange => {}
    }
    outcome
}

/// One judged interaction, forwarded to external consumers (render/audio
/// cue selection, scoreboard). The core only emits the decision.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct JudgmentEvent {
    pub lane: usize,
    pub line: Option<usize>,
    pub kind: NoteKind,
    pub outcome: JudgeOutcome,
    pub delta: i32,
    pub target_sample: i64,
}

pub trait JudgmentSink {
    fn on_judgment(&mut self, event: &JudgmentEvent);
}

/// Discards every event. Useful for headless stepping and tests.
pub struct NullSink;

impl JudgmentSink for NullSink {
    fn on_judgment(&mut self, _event: &JudgmentEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use encore_chart::NoteDescriptor;

    fn beat_note(target: i64) -> Note {
        Note::from_descriptor(0, &NoteDescriptor::beat(1, target), 44_100)
    }

    fn hold_note(target: i64, duration: i64) -> Note {
        Note::from_descriptor(0, &NoteDescriptor::hold(1, target, duration), 44_100)
    }

    #[test]
    fn tier_boundaries_with_two_thresholds() {
        let windows = JudgeWindows::new(7_000, 15_000);
        assert_eq!(windows.classify(6_999), JudgeOutcome::OnBeat);
        assert_eq!(windows.classify(7_000), JudgeOutcome::OffBeat);
        assert_eq!(windows.classify(14_999), JudgeOutcome::OffBeat);
        assert_eq!(windows.classify(15_000), JudgeOutcome::OutOfRange);
    }

    #[test]
    fn standard_windows_have_a_penalty_band() {
        let windows = JudgeWindows::standard(44_100);
        assert_eq!(windows.on_beat, 3_087);
        assert_eq!(windows.classify(0), JudgeOutcome::OnBeat);
        assert_eq!(windows.classify(5_000), JudgeOutcome::OffBeat);
        assert_eq!(windows.classify(10_000), JudgeOutcome::Penalty);
        assert_eq!(windows.classify(14_999), JudgeOutcome::Penalty);
        assert_eq!(windows.classify(15_000), JudgeOutcome::OutOfRange);
    }

    #[test]
    fn exact_press_is_on_beat_and_destroys() {
        let windows = JudgeWindows::standard(44_100);
        let mut note = beat_note(44_100);
        let mut line_hits = [false; 4];
        let outcome = judge(
            &mut note,
            44_100,
            0,
            &windows,
            Rewards::BEAT,
            true,
            &mut line_hits,
            false,
        );
        assert_eq!(outcome, JudgeOutcome::OnBeat);
        assert!(note.destroyed);
        assert_eq!(note.judgment_delta, Rewards::BEAT.on_beat_gain);
        assert!(line_hits[1]);
    }

    #[test]
    fn calibration_offset_shifts_the_clock() {
        let windows = JudgeWindows::standard(44_100);
        let mut note = beat_note(44_100);
        let mut line_hits = [false; 4];
        // The raw clock is far off, but the offset corrects it exactly.
        let outcome = judge(
            &mut note,
            44_100 + 12_000,
            12_000,
            &windows,
            Rewards::BEAT,
            true,
            &mut line_hits,
            false,
        );
        assert_eq!(outcome, JudgeOutcome::OnBeat);
    }

    #[test]
    fn penalty_records_loss_without_destroying() {
        let windows = JudgeWindows::standard(44_100);
        let mut note = beat_note(44_100);
        let mut line_hits = [false; 4];
        let outcome = judge(
            &mut note,
            44_100 + 12_000,
            0,
            &windows,
            Rewards::BEAT,
            true,
            &mut line_hits,
            false,
        );
        assert_eq!(outcome, JudgeOutcome::Penalty);
        assert!(!note.destroyed);
        assert_eq!(note.judgment_delta, Rewards::BEAT.off_beat_loss);
        assert!(!line_hits[1]);
    }

    #[test]
    fn out_of_range_leaves_the_note_untouched() {
        let windows = JudgeWindows::standard(44_100);
        let mut note = beat_note(44_100);
        let mut line_hits = [false; 4];
        let outcome = judge(
            &mut note,
            44_100 + 15_000,
            0,
            &windows,
            Rewards::BEAT,
            true,
            &mut line_hits,
            false,
        );
        assert_eq!(outcome, JudgeOutcome::OutOfRange);
        assert!(!note.destroyed);
        assert_eq!(note.judgment_delta, 0);
    }

    #[test]
    fn hold_head_hit_starts_holding_without_destroying() {
        let windows = JudgeWindows::standard(44_100);
        let mut note = hold_note(44_100, 44_100);
        let mut line_hits = [false; 4];
        let outcome = judge(
            &mut note,
            44_200,
            0,
            &windows,
            Rewards::HOLD,
            false,
            &mut line_hits,
            false,
        );
        assert_eq!(outcome, JudgeOutcome::OnBeat);
        assert!(note.holding);
        assert!(!note.destroyed);
    }

    #[test]
    fn hold_lift_judges_against_the_tail() {
        let windows = JudgeWindows::standard(44_100);
        let mut note = hold_note(0, 44_100);
        note.holding = true;
        let mut line_hits = [false; 4];
        let outcome = judge(
            &mut note,
            44_150,
            0,
            &windows,
            Rewards::HOLD,
            true,
            &mut line_hits,
            true,
        );
        assert_eq!(outcome, JudgeOutcome::OnBeat);
        assert!(note.destroyed);
        assert_eq!(note.judgment_delta, Rewards::HOLD.on_beat_gain);
    }

    #[test]
    fn switch_notes_skip_line_registration() {
        let windows = JudgeWindows::standard(44_100);
        let mut note = Note::from_descriptor(2, &NoteDescriptor::switch(44_100), 44_100);
        let mut line_hits = [false; 4];
        let outcome = judge(
            &mut note,
            44_100,
            0,
            &windows,
            Rewards::SWITCH,
            true,
            &mut line_hits,
            false,
        );
        assert_eq!(outcome, JudgeOutcome::OnBeat);
        assert!(note.destroyed);
        assert!(line_hits.iter().all(|hit| !hit));
    }
}
