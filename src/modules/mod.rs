pub mod bluesky;
pub mod export;
pub mod harvest;
pub mod members;
pub mod pipeline;
