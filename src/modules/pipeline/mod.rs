pub mod checkpoint;
pub mod driver;
pub mod input;
pub mod pacing;
pub mod pack_pipeline;
pub mod stage;

pub use checkpoint::CheckpointStore;
pub use driver::{DriverPaths, PipelineDriver, RunSummary};
pub use input::{read_input_lines, InputLine, InputLineError};
pub use pacing::PacingPolicy;
pub use pack_pipeline::{PackOutcome, PackPipeline, PipelineSettings};
pub use stage::{Halt, SkipReason, Stage, StageOutcome};
