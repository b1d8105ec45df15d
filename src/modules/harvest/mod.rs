pub mod collector;

pub use collector::{
    write_input_file, Collector, DirectoryHttpSource, HarvestSummary,
    LinkExtractor, PackLink, PageSource, DEFAULT_DIRECTORY_URL,
};
