/// Which performance cue a lane's character is playing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Gesture {
    Idle,
    Miss,
    LeftHand,
    RightHand,
}

/// Per-lane gesture state machine fed from the frame's judgment flags.
///
/// Each gesture span lasts one beat. A fresh press edge on either hand
/// retriggers the matching gesture; a miss preempts anything but itself;
/// a sustained press past the span's end carries the gesture into the
/// next beat until the hand lifts. When both hands land on the same
/// frame the sample parity picks the hand, so replays stay deterministic.
#[derive(Clone, Copy, Debug)]
pub struct PerformerFeedback {
    samples_per_beat: i64,
    sample: i64,
    start: i64,
    end: i64,
    gesture: Gesture,
    left_prev: bool,
    right_prev: bool,
    carried: bool,
    holding: bool,
}

impl PerformerFeedback {
    pub fn new(samples_per_beat: i64) -> Self {
        debug_assert!(samples_per_beat > 0);
        Self {
            samples_per_beat,
            sample: 0,
            start: 0,
            end: 0,
            gesture: Gesture::Idle,
            left_prev: false,
            right_prev: false,
            carried: false,
            holding: false,
        }
    }

    /// Record the frame's clock. Call before `update`.
    pub fn observe_sample(&mut self, sample: i64) {
        self.sample = sample;
    }

    fn begin(&mut self, gesture: Gesture) {
        self.start = self.sample;
        self.end = self.sample + self.samples_per_beat;
        self.carried = false;
        self.gesture = gesture;
    }

    fn pick_hand(&self) -> Gesture {
        if self.sample % 2 == 0 {
            Gesture::LeftHand
        } else {
            Gesture::RightHand
        }
    }

    /// Feed the frame's flags: a press held on the left-hand lines, a
    /// press held on the right-hand lines, and whether a miss landed.
    pub fn update(&mut self, left: bool, right: bool, miss: bool) {
        let left_edge = !self.left_prev && left;
        let right_edge = !self.right_prev && right;

        match self.gesture {
            Gesture::Idle => {
                if miss {
                    self.begin(Gesture::Miss);
                } else if left_edge && right_edge {
                    let hand = self.pick_hand();
                    self.begin(hand);
                } else if left_edge {
                    self.begin(Gesture::LeftHand);
                } else if right_edge {
                    self.begin(Gesture::RightHand);
                }
            }
            Gesture::Miss => {
                // A miss gesture always plays out its full beat.
                if self.sample >= self.end {
                    if left && right {
                        let hand = self.pick_hand();
                        self.begin(hand);
                    } else if left {
                        self.begin(Gesture::LeftHand);
                    } else if right {
                        self.begin(Gesture::RightHand);
                    } else {
                        self.gesture = Gesture::Idle;
                    }
                }
            }
            Gesture::LeftHand => {
                if miss {
                    self.begin(Gesture::Miss);
                } else if right_edge {
                    self.begin(Gesture::RightHand);
                } else if self.left_prev && !left {
                    if self.carried {
                        if right {
                            self.begin(Gesture::RightHand);
                        } else {
                            self.carried = false;
                            self.gesture = Gesture::Idle;
                        }
                    }
                } else if left_edge {
                    self.begin(Gesture::LeftHand);
                } else if self.sample >= self.end {
                    if left {
                        self.begin(Gesture::LeftHand);
                        self.carried = true;
                    } else if right {
                        self.begin(Gesture::RightHand);
                    } else {
                        self.carried = false;
                        self.gesture = Gesture::Idle;
                    }
                }
            }
            Gesture::RightHand => {
                if miss {
                    self.begin(Gesture::Miss);
                } else if left_edge {
                    self.begin(Gesture::LeftHand);
                } else if self.right_prev && !right {
                    if self.carried {
                        if left {
                            self.begin(Gesture::LeftHand);
                        } else {
                            self.carried = false;
                            self.gesture = Gesture::Idle;
                        }
                    }
                } else if right_edge {
                    self.begin(Gesture::RightHand);
                } else if self.sample >= self.end {
                    if right {
                        self.begin(Gesture::RightHand);
                        self.carried = true;
                    } else if left {
                        self.begin(Gesture::LeftHand);
                    } else {
                        self.carried = false;
                        self.gesture = Gesture::Idle;
                    }
                }
            }
        }

        self.holding = (self.left_prev && left) || (self.right_prev && right);
        self.left_prev = left;
        self.right_prev = right;
    }

    pub fn gesture(&self) -> Gesture {
        self.gesture
    }

    /// True while either hand has been down for more than one frame.
    pub fn is_holding(&self) -> bool {
        self.holding
    }

    /// Animation phase in `[0, 1)` within the current beat. Idle loops on
    /// the song clock; an active gesture loops from its start sample.
    pub fn frame_fraction(&self) -> f32 {
        let anchor = match self.gesture {
            Gesture::Idle => self.sample,
            _ => self.sample - self.start,
        };
        (anchor.rem_euclid(self.samples_per_beat)) as f32 / self.samples_per_beat as f32
    }

    pub fn reset(&mut self) {
        self.sample = 0;
        self.start = 0;
        self.end = 0;
        self.gesture = Gesture::Idle;
        self.left_prev = false;
        self.right_prev = false;
        self.carried = false;
        self.holding = false;
    }
}
