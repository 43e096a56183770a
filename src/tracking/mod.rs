pub mod calculator;
pub mod ticker;

pub use calculator::{progress_vector, snapshot, stage_index, StageSnapshot};
pub use ticker::*;
