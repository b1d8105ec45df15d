pub mod exporter;
pub mod json_exporter;
pub mod rebuild;
pub mod yaml_exporter;

pub use exporter::{ExportMode, ExportSet, PackExporter};
pub use json_exporter::JsonArrayExporter;
pub use rebuild::rebuild_exports;
pub use yaml_exporter::YamlDocumentExporter;
