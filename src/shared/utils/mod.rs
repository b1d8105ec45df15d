pub mod durable;
pub mod logger;

pub use logger::{init_logger, LogFacade, MemoryLog, PipelineLog, TimedOperation};
