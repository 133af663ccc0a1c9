use encore_chart::{spawn_lead, NoteDescriptor, NoteKind};

/// A live judgeable note. Created from chart data at level load, activated
/// by the scheduler, mutated by the judgment engine, and removed by the
/// per-frame garbage collection pass. Once `destroyed` is set, the note
/// receives no further judgment; its `judgment_delta` lands on the lane's
/// competency exactly once, at the moment of destruction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Note {
    pub lane: usize,
    pub line: Option<usize>,
    pub kind: NoteKind,
    pub target_sample: i64,
    pub hold_samples: i64,
    pub spawn_sample: i64,
    pub judgment_delta: i32,
    pub holding: bool,
    pub destroyed: bool,
}

impl Note {
    pub fn from_descriptor(lane: usize, descriptor: &NoteDescriptor, sample_rate: u32) -> Self {
        debug_assert!(
            descriptor.kind != NoteKind::Hold || descriptor.line.is_some(),
            "hold notes always carry a line"
        );
        Self {
            lane,
            line: descriptor.line.map(|line| line as usize),
            kind: descriptor.kind,
            target_sample: descriptor.target_sample,
            hold_samples: descriptor.hold_samples,
            spawn_sample: descriptor.target_sample - spawn_lead(descriptor.kind, sample_rate),
            judgment_delta: 0,
            holding: false,
            destroyed: false,
        }
    }

    /// The sample at which a hold note's tail must be released.
    pub fn tail_sample(&self) -> i64 {
        self.target_sample + self.hold_samples
    }
}
