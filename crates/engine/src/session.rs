use encore_chart::LevelChart;
use tracing::{debug, info};

use crate::competency::CompetencyMeter;
use crate::judge::{JudgeWindows, JudgmentSink, OUTER_WINDOW_SAMPLES};
use crate::lane::Lane;
use crate::transition::{PlayPhase, TransitionState, DEFAULT_TRANSITION_TICKS};

/// Edge-triggered input for one frame: per-line trigger presses and
/// lifts, plus per-lane switch presses. The driver owns edge detection;
/// the session only sees edges.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameInput {
    triggers_pressed: Vec<bool>,
    triggers_lifted: Vec<bool>,
    switches_pressed: Vec<bool>,
}

impl FrameInput {
    pub fn idle(lines: usize, lanes: usize) -> Self {
        Self {
            triggers_pressed: vec![false; lines],
            triggers_lifted: vec![false; lines],
            switches_pressed: vec![false; lanes],
        }
    }

    pub fn with_press(mut self, line: usize) -> Self {
        if let Some(slot) = self.triggers_pressed.get_mut(line) {
            *slot = true;
        }
        self
    }

    pub fn with_lift(mut self, line: usize) -> Self {
        if let Some(slot) = self.triggers_lifted.get_mut(line) {
            *slot = true;
        }
        self
    }

    pub fn with_switch(mut self, lane: usize) -> Self {
        if let Some(slot) = self.switches_pressed.get_mut(lane) {
            *slot = true;
        }
        self
    }

    pub fn trigger_pressed(&self, line: usize) -> bool {
        self.triggers_pressed.get(line).copied().unwrap_or(false)
    }

    pub fn trigger_lifted(&self, line: usize) -> bool {
        self.triggers_lifted.get(line).copied().unwrap_or(false)
    }

    pub fn switch_pressed(&self, lane: usize) -> bool {
        self.switches_pressed.get(lane).copied().unwrap_or(false)
    }
}

/// Tunables the driver fixes once per session.
#[derive(Clone, Copy, Debug)]
pub struct SessionConfig {
    pub windows: JudgeWindows,
    /// Calibration offset subtracted from the raw clock before judging.
    pub offset_samples: i64,
    pub transition_ticks: u32,
    /// How many samples past its target a note survives unjudged.
    pub miss_margin: i64,
}

impl SessionConfig {
    pub fn standard(sample_rate: u32) -> Self {
        Self {
            windows: JudgeWindows::standard(sample_rate),
            offset_samples: 0,
            transition_ticks: DEFAULT_TRANSITION_TICKS,
            miss_margin: OUTER_WINDOW_SAMPLES,
        }
    }
}

/// One run through a level: the lanes, the active-lane switch state and
/// the decay watermark, stepped once per frame by the driver.
///
/// Each step runs in a fixed order: spawn, judge input, retire overdue
/// notes, passive decay, transition tick, garbage collection. Every
/// judgment is forwarded to the caller's sink.
pub struct Session {
    chart: LevelChart,
    config: SessionConfig,
    lanes: Vec<Lane>,
    transition: TransitionState,
    meter: CompetencyMeter,
    line_hits: Vec<bool>,
}

impl Session {
    pub fn new(chart: LevelChart, config: SessionConfig) -> Self {
        debug_assert!(
            chart
                .lanes
                .iter()
                .flat_map(|lane| &lane.notes)
                .all(|note| note.line.map_or(true, |line| line < chart.lines_per_lane)),
            "chart references unknown lines; load charts through LevelChart::validated"
        );
        let lanes = chart
            .lanes
            .iter()
            .enumerate()
            .map(|(index, lane)| {
                Lane::from_chart(index, lane, chart.sample_rate, chart.max_competency)
            })
            .collect();
        info!(
            level = %chart.name,
            lanes = chart.lanes.len(),
            notes = chart.total_notes(),
            "session ready"
        );
        Self {
            line_hits: vec![false; chart.lines_per_lane as usize],
            transition: TransitionState::new(config.transition_ticks),
            meter: CompetencyMeter::new(chart.sample_rate),
            lanes,
            chart,
            config,
        }
    }

    pub fn standard(chart: LevelChart) -> Self {
        let config = SessionConfig::standard(chart.sample_rate);
        Self::new(chart, config)
    }

    /// Advance the session to `current_sample`, judging this frame's
    /// input edges.
    pub fn step(&mut self, current_sample: i64, input: &FrameInput, sink: &mut dyn JudgmentSink) {
        for lane in &mut self.lanes {
            lane.spawn(current_sample);
        }

        let switched = self.handle_input(current_sample, input, sink);

        // Unjudged notes past the kill threshold die now, and holds whose
        // tail passed unlifted resolve on whichever lane holds them. Only
        // the lanes the performer is answerable for charge their deltas.
        let adjusted = current_sample - self.config.offset_samples;
        let active = self.transition.active_lane();
        let goal = self.transition.goal_lane();
        for lane in &mut self.lanes {
            let settles = lane.index() == active || lane.index() == goal;
            lane.retire_overdue(
                adjusted,
                self.config.miss_margin,
                self.config.windows.on_beat,
                settles,
                sink,
            );
        }

        self.meter.decay(&mut self.lanes, current_sample);
        // The initiating frame does not count toward the transition's
        // duration.
        if !switched {
            self.transition.advance();
        }

        for lane in &mut self.lanes {
            lane.collect_garbage();
        }
    }

    /// Returns true when a lane switch began this frame.
    fn handle_input(
        &mut self,
        current_sample: i64,
        input: &FrameInput,
        sink: &mut dyn JudgmentSink,
    ) -> bool {
        self.line_hits.iter_mut().for_each(|hit| *hit = false);

        // A switch edge toward a non-active lane judges that lane's
        // switch notes and consumes the whole frame's input. Switches are
        // ignored while one is already in flight.
        if self.transition.phase() == PlayPhase::Notes {
            let active = self.transition.active_lane();
            for index in 0..self.lanes.len() {
                if index != active && input.switch_pressed(index) {
                    debug!(from = active, to = index, "lane switch");
                    self.lanes[index].judge_switch_notes(
                        current_sample,
                        self.config.offset_samples,
                        &self.config.windows,
                        sink,
                    );
                    self.transition.begin(index);
                    return true;
                }
            }
        }

        // Hit/hold input routes to the goal lane as soon as a switch
        // starts, which in the Notes phase is the active lane itself.
        let routed = self.transition.routed_lane();
        self.lanes[routed].judge_hit_notes(
            current_sample,
            self.config.offset_samples,
            &self.config.windows,
            input,
            &mut self.line_hits,
            sink,
        );
        false
    }

    /// True once every lane has played out its chart.
    pub fn is_complete(&self) -> bool {
        self.lanes.iter().all(|lane| !lane.has_more_notes())
    }

    /// True when any lane's competency has drained to zero.
    pub fn is_failed(&self) -> bool {
        self.lanes.iter().any(|lane| lane.competency().is_empty())
    }

    /// Restart the level from the top.
    pub fn reset(&mut self) {
        for (lane, chart) in self.lanes.iter_mut().zip(&self.chart.lanes) {
            lane.reset(chart, self.chart.sample_rate);
        }
        self.transition.reset();
        self.meter.reset();
        self.line_hits.iter_mut().for_each(|hit| *hit = false);
    }

    pub fn idle_input(&self) -> FrameInput {
        FrameInput::idle(self.chart.lines_per_lane as usize, self.lanes.len())
    }

    pub fn chart(&self) -> &LevelChart {
        &self.chart
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn lanes(&self) -> &[Lane] {
        &self.lanes
    }

    pub fn transition(&self) -> &TransitionState {
        &self.transition
    }
}
