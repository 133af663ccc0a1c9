pub mod error;
pub mod io;
pub mod level;
pub mod note;
pub mod timing;

pub use crate::error::ChartError;
pub use crate::io::{ChartExporter, ChartFormat, JsonExporter};
pub use crate::level::{LaneChart, LevelChart};
pub use crate::note::{NoteDescriptor, NoteKind};
pub use crate::timing::{samples_from_millis, spawn_lead, CalibrationTaps};
