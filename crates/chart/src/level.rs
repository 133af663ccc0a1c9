use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ChartError;
use crate::note::{NoteDescriptor, NoteKind};

fn default_lines_per_lane() -> u32 {
    4
}

/// One band member's part: an ordered sequence of note descriptors plus
/// the lane's passive competency decay rate (points per second while hit
/// notes are on screen).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LaneChart {
    pub instrument: String,
    pub passive_loss_rate: f32,
    pub notes: Vec<NoteDescriptor>,
}

impl LaneChart {
    pub fn new(instrument: impl Into<String>, passive_loss_rate: f32) -> Self {
        Self {
            instrument: instrument.into(),
            passive_loss_rate,
            notes: Vec::new(),
        }
    }

    fn is_sorted(&self) -> bool {
        self.notes
            .windows(2)
            .all(|pair| pair[0].target_sample <= pair[1].target_sample)
    }
}

/// A full level chart. Notes arrive sorted ascending by target sample;
/// the core never re-sorts them.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LevelChart {
    pub name: String,
    pub number: u32,
    pub sample_rate: u32,
    pub bpm: u32,
    pub max_competency: f32,
    /// Total length of the backing track, in samples.
    pub track_samples: i64,
    #[serde(default = "default_lines_per_lane")]
    pub lines_per_lane: u32,
    /// Score thresholds for C/B/A/S grades.
    pub grade_thresholds: [u64; 4],
    pub lanes: Vec<LaneChart>,
}

impl LevelChart {
    /// Validate the chart, resolving configuration errors locally: notes
    /// that run past the end of the track, or holds without a line, are
    /// dropped from their lane rather than failing the load. Structural
    /// problems (no lanes, unsorted notes, bad rates) are hard errors.
    pub fn validated(mut self) -> Result<Self, ChartError> {
        if self.sample_rate == 0 {
            return Err(ChartError::validation("sample rate must be positive"));
        }
        if self.bpm == 0 {
            return Err(ChartError::validation("bpm must be positive"));
        }
        if self.max_competency <= 0.0 {
            return Err(ChartError::validation("max competency must be positive"));
        }
        if self.lines_per_lane == 0 {
            return Err(ChartError::validation("lanes need at least one line"));
        }
        if self.lanes.is_empty() {
            return Err(ChartError::validation("chart has no lanes"));
        }

        let track_samples = self.track_samples;
        let lines = self.lines_per_lane;
        for (index, lane) in self.lanes.iter_mut().enumerate() {
            if !lane.is_sorted() {
                return Err(ChartError::validation(format!(
                    "lane {index} notes are not sorted by target sample"
                )));
            }
            if lane.passive_loss_rate < 0.0 {
                return Err(ChartError::validation(format!(
                    "lane {index} has a negative passive loss rate"
                )));
            }
            lane.notes.retain(|note| {
                if note.kind.uses_line() {
                    match note.line {
                        None => {
                            warn!(lane = index, ?note.kind, "dropping note without a line");
                            return false;
                        }
                        Some(line) if line >= lines => {
                            warn!(lane = index, line, "dropping note on an unknown line");
                            return false;
                        }
                        _ => {}
                    }
                }
                if note.hold_samples < 0 {
                    warn!(lane = index, "dropping hold with negative duration");
                    return false;
                }
                if note.end_sample() > track_samples {
                    warn!(
                        lane = index,
                        target = note.target_sample,
                        "dropping note past the end of the track"
                    );
                    return false;
                }
                true
            });
        }
        Ok(self)
    }

    pub fn samples_per_beat(&self) -> f32 {
        self.sample_rate as f32 * 60.0 / self.bpm as f32
    }

    pub fn total_notes(&self) -> usize {
        self.lanes.iter().map(|lane| lane.notes.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chart_with_notes(notes: Vec<NoteDescriptor>) -> LevelChart {
        let mut lane = LaneChart::new("violin", 1.0);
        lane.notes = notes;
        LevelChart {
            name: "test".into(),
            number: 1,
            sample_rate: 44_100,
            bpm: 120,
            max_competency: 30.0,
            track_samples: 441_000,
            lines_per_lane: 4,
            grade_thresholds: [10_000, 20_000, 40_000, 80_000],
            lanes: vec![lane],
        }
    }

    #[test]
    fn drops_notes_past_track_end() {
        let chart = chart_with_notes(vec![
            NoteDescriptor::beat(0, 44_100),
            NoteDescriptor::hold(1, 430_000, 20_000),
            NoteDescriptor::beat(2, 500_000),
        ])
        .validated()
        .unwrap();
        // The hold overruns the track and the last beat starts past it.
        assert_eq!(chart.lanes[0].notes.len(), 1);
        assert_eq!(chart.lanes[0].notes[0].target_sample, 44_100);
    }

    #[test]
    fn drops_hold_without_line() {
        let mut bad = NoteDescriptor::hold(0, 1_000, 100);
        bad.line = None;
        let chart = chart_with_notes(vec![bad]).validated().unwrap();
        assert!(chart.lanes[0].notes.is_empty());
    }

    #[test]
    fn drops_note_on_unknown_line() {
        let chart = chart_with_notes(vec![NoteDescriptor::beat(7, 1_000)])
            .validated()
            .unwrap();
        assert!(chart.lanes[0].notes.is_empty());
    }

    #[test]
    fn unsorted_lane_is_an_error() {
        let result = chart_with_notes(vec![
            NoteDescriptor::beat(0, 2_000),
            NoteDescriptor::beat(0, 1_000),
        ])
        .validated();
        assert!(result.is_err());
    }

    #[test]
    fn rejects_empty_and_misconfigured_charts() {
        let mut chart = chart_with_notes(vec![]);
        chart.lanes.clear();
        assert!(chart.validated().is_err());

        let mut chart = chart_with_notes(vec![]);
        chart.sample_rate = 0;
        assert!(chart.validated().is_err());

        let mut chart = chart_with_notes(vec![]);
        chart.max_competency = 0.0;
        assert!(chart.validated().is_err());
    }

    #[test]
    fn samples_per_beat_from_bpm() {
        let chart = chart_with_notes(vec![]);
        assert_eq!(chart.samples_per_beat(), 22_050.0);
    }
}
