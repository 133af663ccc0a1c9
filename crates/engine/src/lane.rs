use std::collections::VecDeque;

use encore_chart::{LaneChart, NoteKind};
use tracing::debug;

use crate::competency::Competency;
use crate::judge::{
    judge, JudgeOutcome, JudgeWindows, JudgmentEvent, JudgmentSink, Rewards,
};
use crate::note::Note;
use crate::session::FrameInput;

/// One band member's runtime state: the not-yet-spawned queue, the two
/// active sets (hold/beat vs switch), a reusable scratch buffer for
/// stop-and-copy compaction, and the lane's competency.
///
/// A note lives in exactly one of {pending, hit set, switch set} until it
/// is destroyed and collected.
#[derive(Clone, Debug)]
pub struct Lane {
    index: usize,
    instrument: String,
    passive_loss_rate: f32,
    pending: VecDeque<Note>,
    hit_notes: Vec<Note>,
    switch_notes: Vec<Note>,
    backing: Vec<Note>,
    competency: Competency,
}

fn settle(competency: &mut Competency, note: &Note) {
    debug_assert!(note.destroyed, "settling a live note");
    competency.apply(note.judgment_delta as f32);
}

fn report(sink: &mut dyn JudgmentSink, lane: usize, note: &Note, outcome: JudgeOutcome) {
    sink.on_judgment(&JudgmentEvent {
        lane,
        line: note.line,
        kind: note.kind,
        outcome,
        delta: note.judgment_delta,
        target_sample: note.target_sample,
    });
}

impl Lane {
    pub fn from_chart(
        index: usize,
        chart: &LaneChart,
        sample_rate: u32,
        max_competency: f32,
    ) -> Self {
        Self {
            index,
            instrument: chart.instrument.clone(),
            passive_loss_rate: chart.passive_loss_rate,
            pending: chart
                .notes
                .iter()
                .map(|descriptor| Note::from_descriptor(index, descriptor, sample_rate))
                .collect(),
            hit_notes: Vec::new(),
            switch_notes: Vec::new(),
            backing: Vec::new(),
            competency: Competency::new(max_competency),
        }
    }

    /// Rebuild the pending queue from chart data and clear both active
    /// sets. Competency refills; the scratch buffer is kept.
    pub fn reset(&mut self, chart: &LaneChart, sample_rate: u32) {
        self.pending = chart
            .notes
            .iter()
            .map(|descriptor| Note::from_descriptor(self.index, descriptor, sample_rate))
            .collect();
        self.hit_notes.clear();
        self.switch_notes.clear();
        self.competency.refill();
    }

    /// Move every pending note whose spawn sample has been reached into
    /// the matching active set. The queue is chart-ordered, so one linear
    /// scan from the front suffices and no note is ever re-queued.
    pub fn spawn(&mut self, current_sample: i64) {
        while self
            .pending
            .front()
            .is_some_and(|note| note.spawn_sample <= current_sample)
        {
            if let Some(note) = self.pending.pop_front() {
                debug!(
                    lane = self.index,
                    kind = ?note.kind,
                    target = note.target_sample,
                    "note active"
                );
                match note.kind {
                    NoteKind::Switch => self.switch_notes.push(note),
                    NoteKind::Beat | NoteKind::Hold => self.hit_notes.push(note),
                }
            }
        }
    }

    /// Stop-and-copy compaction of both active sets: survivors are copied
    /// into the scratch buffer, then the buffers swap. One scratch vector
    /// serves both sets, so steady-state frames allocate nothing.
    pub fn collect_garbage(&mut self) {
        fn compact(notes: &mut Vec<Note>, backing: &mut Vec<Note>) {
            backing.extend(notes.drain(..).filter(|note| !note.destroyed));
            std::mem::swap(notes, backing);
        }
        compact(&mut self.hit_notes, &mut self.backing);
        compact(&mut self.switch_notes, &mut self.backing);
    }

    /// Charge passive decay for `elapsed` samples, but only while hit
    /// notes are on screen.
    pub(crate) fn decay(&mut self, elapsed: i64, sample_rate: u32) {
        if self.hit_notes.is_empty() {
            return;
        }
        let loss = self.passive_loss_rate * elapsed as f32 / sample_rate as f32;
        self.competency.apply(-loss);
    }

    /// Judge this frame's press/lift edges against the lane's hit notes.
    /// Deltas settle on the lane the moment a note is destroyed.
    pub(crate) fn judge_hit_notes(
        &mut self,
        current_sample: i64,
        offset_samples: i64,
        windows: &JudgeWindows,
        input: &FrameInput,
        line_hits: &mut [bool],
        sink: &mut dyn JudgmentSink,
    ) {
        let lane_index = self.index;
        let Self {
            hit_notes,
            competency,
            ..
        } = self;

        for note in hit_notes.iter_mut() {
            if note.destroyed {
                continue;
            }
            debug_assert!(note.kind != NoteKind::Switch, "switch note in the hit set");
            let Some(line) = note.line else { continue };

            match note.kind {
                NoteKind::Beat => {
                    if input.trigger_pressed(line) && !line_hits[line] {
                        let outcome = judge(
                            note,
                            current_sample,
                            offset_samples,
                            windows,
                            Rewards::BEAT,
                            true,
                            line_hits,
                            false,
                        );
                        if outcome != JudgeOutcome::OutOfRange {
                            if note.destroyed {
                                settle(competency, note);
                            }
                            report(sink, lane_index, note, outcome);
                        }
                    }
                }
                NoteKind::Hold => {
                    if input.trigger_pressed(line) && !line_hits[line] {
                        let outcome = judge(
                            note,
                            current_sample,
                            offset_samples,
                            windows,
                            Rewards::HOLD,
                            false,
                            line_hits,
                            false,
                        );
                        if outcome != JudgeOutcome::OutOfRange {
                            report(sink, lane_index, note, outcome);
                        }
                    }
                    if input.trigger_lifted(line) && note.holding {
                        let outcome = judge(
                            note,
                            current_sample,
                            offset_samples,
                            windows,
                            Rewards::HOLD,
                            true,
                            line_hits,
                            true,
                        );
                        // A lift always ends the hold, judged or not; a
                        // lift far from the tail keeps the head's gain and
                        // emits nothing.
                        note.destroyed = true;
                        note.holding = false;
                        settle(competency, note);
                        if outcome != JudgeOutcome::OutOfRange {
                            report(sink, lane_index, note, outcome);
                        }
                    }
                }
                NoteKind::Switch => {}
            }
        }
    }

    /// Judge every active switch note against the switch edge that is
    /// pulling this lane into focus.
    pub(crate) fn judge_switch_notes(
        &mut self,
        current_sample: i64,
        offset_samples: i64,
        windows: &JudgeWindows,
        sink: &mut dyn JudgmentSink,
    ) {
        let lane_index = self.index;
        let Self {
            switch_notes,
            competency,
            ..
        } = self;

        for note in switch_notes.iter_mut() {
            if note.destroyed {
                continue;
            }
            let outcome = judge(
                note,
                current_sample,
                offset_samples,
                windows,
                Rewards::SWITCH,
                true,
                &mut [],
                false,
            );
            if outcome != JudgeOutcome::OutOfRange {
                if note.destroyed {
                    settle(competency, note);
                }
                report(sink, lane_index, note, outcome);
            }
        }
    }

    /// Destroy notes that passed their kill threshold unjudged. Deltas
    /// (zero unless a penalty already landed) settle only on the active
    /// or goal lane; missed switch notes die silently with no penalty.
    /// A held note resolves once its tail passes `hold_grace` unlifted,
    /// keeping the head's gain and emitting nothing. This runs for every
    /// lane, so a hold abandoned by a lane switch still dies.
    pub(crate) fn retire_overdue(
        &mut self,
        adjusted_sample: i64,
        miss_margin: i64,
        hold_grace: i64,
        settle_delta: bool,
        sink: &mut dyn JudgmentSink,
    ) {
        let lane_index = self.index;
        let Self {
            hit_notes,
            switch_notes,
            competency,
            ..
        } = self;

        for note in hit_notes.iter_mut() {
            if note.destroyed {
                continue;
            }
            if note.holding {
                if adjusted_sample - note.tail_sample() > hold_grace {
                    note.destroyed = true;
                    note.holding = false;
                    if settle_delta {
                        settle(competency, note);
                    }
                }
                continue;
            }
            if adjusted_sample - note.target_sample > miss_margin {
                note.destroyed = true;
                if settle_delta {
                    settle(competency, note);
                    report(sink, lane_index, note, JudgeOutcome::Miss);
                }
            }
        }
        for note in switch_notes.iter_mut() {
            if note.destroyed {
                continue;
            }
            if adjusted_sample - note.target_sample > miss_margin {
                note.judgment_delta = 0;
                note.destroyed = true;
                if settle_delta {
                    settle(competency, note);
                }
            }
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn instrument(&self) -> &str {
        &self.instrument
    }

    pub fn passive_loss_rate(&self) -> f32 {
        self.passive_loss_rate
    }

    pub fn competency(&self) -> &Competency {
        &self.competency
    }

    pub fn hit_notes(&self) -> &[Note] {
        &self.hit_notes
    }

    pub fn switch_notes(&self) -> &[Note] {
        &self.switch_notes
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn has_more_notes(&self) -> bool {
        !self.pending.is_empty() || !self.hit_notes.is_empty() || !self.switch_notes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::judge::NullSink;
    use encore_chart::NoteDescriptor;

    fn lane_chart(notes: Vec<NoteDescriptor>) -> LaneChart {
        let mut chart = LaneChart::new("violin", 5.0);
        chart.notes = notes;
        chart
    }

    #[test]
    fn spawns_in_non_decreasing_spawn_order() {
        let chart = lane_chart(vec![
            NoteDescriptor::beat(0, 50_000),
            NoteDescriptor::beat(1, 60_000),
            NoteDescriptor::beat(2, 120_000),
        ]);
        let mut lane = Lane::from_chart(0, &chart, 44_100, 30.0);

        lane.spawn(4_000);
        assert!(lane.hit_notes().is_empty());
        assert_eq!(lane.pending_len(), 3);

        lane.spawn(16_000);
        let spawned: Vec<i64> = lane.hit_notes().iter().map(|n| n.spawn_sample).collect();
        assert_eq!(spawned, vec![5_900, 15_900]);
        assert_eq!(lane.pending_len(), 1);

        // Single ownership: never pending and active at once.
        assert_eq!(lane.pending_len() + lane.hit_notes().len(), 3);
    }

    #[test]
    fn switch_notes_route_to_their_own_set() {
        let chart = lane_chart(vec![
            NoteDescriptor::switch(100_000),
            NoteDescriptor::beat(0, 100_000),
        ]);
        let mut lane = Lane::from_chart(0, &chart, 44_100, 30.0);
        lane.spawn(60_000);
        assert_eq!(lane.switch_notes().len(), 1);
        assert_eq!(lane.hit_notes().len(), 1);
    }

    #[test]
    fn garbage_collection_drops_destroyed_notes_once() {
        let chart = lane_chart(vec![
            NoteDescriptor::beat(0, 50_000),
            NoteDescriptor::beat(1, 50_000),
            NoteDescriptor::beat(2, 50_000),
        ]);
        let mut lane = Lane::from_chart(0, &chart, 44_100, 30.0);
        lane.spawn(50_000);
        assert_eq!(lane.hit_notes().len(), 3);

        lane.hit_notes[1].destroyed = true;
        lane.collect_garbage();
        assert_eq!(lane.hit_notes().len(), 2);
        assert!(lane.hit_notes().iter().all(|n| !n.destroyed));

        // Idempotent once the destroyed notes are gone.
        lane.collect_garbage();
        assert_eq!(lane.hit_notes().len(), 2);
    }

    #[test]
    fn decay_requires_notes_on_screen() {
        let chart = lane_chart(vec![NoteDescriptor::beat(0, 50_000)]);
        let mut lane = Lane::from_chart(0, &chart, 44_100, 30.0);

        lane.decay(44_100, 44_100);
        assert_eq!(lane.competency().current(), 30.0);

        lane.spawn(50_000);
        lane.decay(44_100, 44_100);
        assert_eq!(lane.competency().current(), 25.0);
    }

    #[test]
    fn overdue_notes_retire_and_settle_on_the_routed_lane() {
        let chart = lane_chart(vec![NoteDescriptor::beat(0, 50_000)]);
        let mut lane = Lane::from_chart(0, &chart, 44_100, 30.0);
        lane.spawn(50_000);

        lane.hit_notes[0].judgment_delta = -1;
        lane.retire_overdue(50_000 + 15_000, 15_000, 3_087, false, &mut NullSink);
        assert!(!lane.hit_notes()[0].destroyed);

        lane.retire_overdue(50_000 + 15_001, 15_000, 3_087, true, &mut NullSink);
        assert!(lane.hit_notes()[0].destroyed);
        assert_eq!(lane.competency().current(), 29.0);
    }

    #[test]
    fn missed_switch_notes_carry_no_penalty() {
        let chart = lane_chart(vec![NoteDescriptor::switch(100_000)]);
        let mut lane = Lane::from_chart(0, &chart, 44_100, 30.0);
        lane.spawn(100_000);
        lane.switch_notes[0].judgment_delta = -5;

        lane.retire_overdue(120_000, 15_000, 3_087, true, &mut NullSink);
        assert!(lane.switch_notes()[0].destroyed);
        assert_eq!(lane.competency().current(), 30.0);
    }

    #[test]
    fn held_note_resolves_past_its_tail_on_any_lane() {
        let chart = lane_chart(vec![NoteDescriptor::hold(0, 50_000, 10_000)]);
        let mut lane = Lane::from_chart(0, &chart, 44_100, 30.0);
        lane.spawn(50_000);
        lane.hit_notes[0].holding = true;
        lane.hit_notes[0].judgment_delta = 4;
        lane.competency.apply(-10.0);

        // Inside the grace the hold survives even far past its target.
        lane.retire_overdue(60_000 + 3_087, 15_000, 3_087, true, &mut NullSink);
        assert!(!lane.hit_notes()[0].destroyed);

        lane.retire_overdue(60_000 + 3_088, 15_000, 3_087, true, &mut NullSink);
        assert!(lane.hit_notes()[0].destroyed);
        assert!(!lane.hit_notes()[0].holding);
        assert_eq!(lane.competency().current(), 24.0);
    }

    #[test]
    fn reset_rebuilds_from_chart() {
        let chart = lane_chart(vec![
            NoteDescriptor::beat(0, 50_000),
            NoteDescriptor::beat(1, 60_000),
        ]);
        let mut lane = Lane::from_chart(0, &chart, 44_100, 30.0);
        lane.spawn(60_000);
        lane.competency.apply(-10.0);
        assert!(lane.hit_notes().len() > 0);

        lane.reset(&chart, 44_100);
        assert_eq!(lane.pending_len(), 2);
        assert!(lane.hit_notes().is_empty());
        assert_eq!(lane.competency().current(), 30.0);
    }
}
