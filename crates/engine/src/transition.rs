/// Whether input judges notes on the active lane or the play area is
/// interpolating toward a new one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayPhase {
    Notes,
    Transition,
}

/// Default number of ticks a lane switch takes to complete.
pub const DEFAULT_TRANSITION_TICKS: u32 = 20;

/// Governs the switch of the active lane. In `Notes` the active and goal
/// lanes coincide; in `Transition` the progress counter climbs until the
/// configured duration, at which point the goal lane becomes active. Only
/// one transition can be in flight at a time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransitionState {
    phase: PlayPhase,
    active_lane: usize,
    goal_lane: usize,
    progress: u32,
    duration_ticks: u32,
}

impl TransitionState {
    pub fn new(duration_ticks: u32) -> Self {
        debug_assert!(duration_ticks > 0);
        Self {
            phase: PlayPhase::Notes,
            active_lane: 0,
            goal_lane: 0,
            progress: 0,
            duration_ticks,
        }
    }

    pub fn phase(&self) -> PlayPhase {
        self.phase
    }

    pub fn active_lane(&self) -> usize {
        self.active_lane
    }

    pub fn goal_lane(&self) -> usize {
        self.goal_lane
    }

    /// The lane that hit/hold input judges against: the destination lane
    /// becomes judgeable as soon as a switch starts.
    pub fn routed_lane(&self) -> usize {
        self.goal_lane
    }

    /// Interpolation fraction for the renderer, in `[0, 1]`.
    pub fn fraction(&self) -> f32 {
        match self.phase {
            PlayPhase::Notes => 1.0,
            PlayPhase::Transition => self.progress as f32 / self.duration_ticks as f32,
        }
    }

    /// Request a switch to `goal`. Ignored while a transition is already
    /// in flight or when the goal is already active.
    pub fn begin(&mut self, goal: usize) -> bool {
        if self.phase == PlayPhase::Transition || goal == self.active_lane {
            return false;
        }
        self.goal_lane = goal;
        self.progress = 0;
        self.phase = PlayPhase::Transition;
        true
    }

    /// Advance one tick. No-op in the `Notes` phase.
    pub fn advance(&mut self) {
        if self.phase != PlayPhase::Transition {
            debug_assert_eq!(self.active_lane, self.goal_lane);
            return;
        }
        self.progress += 1;
        if self.progress >= self.duration_ticks {
            self.phase = PlayPhase::Notes;
            self.active_lane = self.goal_lane;
            self.progress = 0;
        }
    }

    pub fn reset(&mut self) {
        self.phase = PlayPhase::Notes;
        self.active_lane = 0;
        self.goal_lane = 0;
        self.progress = 0;
    }
}

impl Default for TransitionState {
    fn default() -> Self {
        Self::new(DEFAULT_TRANSITION_TICKS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn switch_completes_after_duration_ticks() {
        let mut state = TransitionState::new(20);
        assert!(state.begin(2));
        assert_eq!(state.phase(), PlayPhase::Transition);
        assert_eq!(state.goal_lane(), 2);
        assert_eq!(state.active_lane(), 0);

        for _ in 0..19 {
            state.advance();
        }
        assert_eq!(state.phase(), PlayPhase::Transition);
        state.advance();
        assert_eq!(state.phase(), PlayPhase::Notes);
        assert_eq!(state.active_lane(), 2);
        assert_eq!(state.goal_lane(), 2);
    }

    #[test]
    fn only_one_transition_in_flight() {
        let mut state = TransitionState::new(20);
        assert!(state.begin(1));
        assert!(!state.begin(3));
        assert_eq!(state.goal_lane(), 1);
    }

    #[test]
    fn switching_to_the_active_lane_is_ignored() {
        let mut state = TransitionState::new(20);
        assert!(!state.begin(0));
        assert_eq!(state.phase(), PlayPhase::Notes);
    }

    #[test]
    fn fraction_tracks_progress() {
        let mut state = TransitionState::new(4);
        state.begin(1);
        assert_eq!(state.fraction(), 0.0);
        state.advance();
        assert_eq!(state.fraction(), 0.25);
        state.advance();
        assert_eq!(state.fraction(), 0.5);
    }

    #[test]
    fn routing_targets_the_goal_during_transition() {
        let mut state = TransitionState::new(20);
        assert_eq!(state.routed_lane(), 0);
        state.begin(3);
        assert_eq!(state.routed_lane(), 3);
    }
}
