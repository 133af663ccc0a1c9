use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum NoteKind {
    Beat,
    Hold,
    Switch,
}

impl NoteKind {
    /// Switch notes occupy the whole lane and never carry a line index.
    pub fn uses_line(self) -> bool {
        !matches!(self, NoteKind::Switch)
    }
}

/// One judgeable event as it appears in chart data. `target_sample` is the
/// audio sample at which the note must be hit; `hold_samples` is only
/// meaningful for hold notes.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct NoteDescriptor {
    pub kind: NoteKind,
    pub line: Option<u32>,
    pub target_sample: i64,
    #[serde(default)]
    pub hold_samples: i64,
}

impl NoteDescriptor {
    pub fn beat(line: u32, target_sample: i64) -> Self {
        Self {
            kind: NoteKind::Beat,
            line: Some(line),
            target_sample,
            hold_samples: 0,
        }
    }

    pub fn hold(line: u32, target_sample: i64, hold_samples: i64) -> Self {
        Self {
            kind: NoteKind::Hold,
            line: Some(line),
            target_sample,
            hold_samples,
        }
    }

    pub fn switch(target_sample: i64) -> Self {
        Self {
            kind: NoteKind::Switch,
            line: None,
            target_sample,
            hold_samples: 0,
        }
    }

    /// The last sample this note occupies on the timeline.
    pub fn end_sample(&self) -> i64 {
        match self.kind {
            NoteKind::Hold => self.target_sample + self.hold_samples,
            _ => self.target_sample,
        }
    }
}
