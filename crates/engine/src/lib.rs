pub mod competency;
pub mod feedback;
pub mod judge;
pub mod lane;
pub mod note;
pub mod scoreboard;
pub mod session;
pub mod transition;

pub use crate::competency::{Competency, CompetencyMeter};
pub use crate::feedback::{Gesture, PerformerFeedback};
pub use crate::judge::{
    judge, JudgeOutcome, JudgeWindows, JudgmentEvent, JudgmentSink, NullSink, Rewards,
};
pub use crate::lane::Lane;
pub use crate::note::Note;
pub use crate::scoreboard::{Grade, OutcomeCounts, Scoreboard};
pub use crate::session::{FrameInput, Session, SessionConfig};
pub use crate::transition::{PlayPhase, TransitionState};
