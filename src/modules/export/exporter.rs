use std::collections::HashSet;
use std::path::Path;

use super::json_exporter::JsonArrayExporter;
use super::yaml_exporter::YamlDocumentExporter;
use crate::log_info;
use crate::modules::members::PackSummary;
use crate::shared::errors::AppResult;

/// How an exporter treats an existing output file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportMode {
    /// Truncate and start over
    Fresh,
    /// Keep the complete entries an interrupted run wrote and continue
    /// after them
    Resume,
}

/// Writes pack summaries to one output file as they are produced.
///
/// `append_pack` returns only after the entry has reached stable storage.
pub trait PackExporter: Send {
    fn path(&self) -> &Path;

    fn append_pack(&mut self, pack: &PackSummary) -> AppResult<()>;

    /// Close the document. Calling it again is a no-op.
    fn finalize(&mut self) -> AppResult<()>;
}

/// The exporters fed by one run, appended to in lockstep
pub struct ExportSet {
    exporters: Vec<Box<dyn PackExporter>>,
    /// URLs of packs carried over from an interrupted run
    carried_over: HashSet<String>,
}

impl ExportSet {
    pub fn new(exporters: Vec<Box<dyn PackExporter>>) -> Self {
        Self {
            exporters,
            carried_over: HashSet::new(),
        }
    }

    /// Primary JSON array plus secondary YAML document stream.
    ///
    /// On resume the JSON array decides what survived: the YAML stream is
    /// rewritten to the same packs, and those packs are not appended again
    /// when their line is processed once more.
    pub fn open(json_path: &Path, yaml_path: &Path, mode: ExportMode) -> AppResult<Self> {
        let json = JsonArrayExporter::open(json_path, mode)?;
        let yaml = match mode {
            ExportMode::Fresh => YamlDocumentExporter::create(yaml_path)?,
            ExportMode::Resume => YamlDocumentExporter::restore(yaml_path, json.recovered())?,
        };
        let carried_over: HashSet<String> =
            json.recovered().iter().map(|p| p.url.clone()).collect();
        if !carried_over.is_empty() {
            log_info!(
                "Kept {} packs already exported by the interrupted run",
                carried_over.len()
            );
        }

        Ok(Self {
            exporters: vec![Box::new(json), Box::new(yaml)],
            carried_over,
        })
    }

    pub fn append_pack(&mut self, pack: &PackSummary) -> AppResult<()> {
        if self.carried_over.remove(&pack.url) {
            log_info!("Pack {} is already in the exports", pack.rkey);
            return Ok(());
        }
        for exporter in self.exporters.iter_mut() {
            exporter.append_pack(pack)?;
        }
        Ok(())
    }

    pub fn finalize(&mut self) -> AppResult<()> {
        for exporter in self.exporters.iter_mut() {
            exporter.finalize()?;
        }
        Ok(())
    }

    pub fn paths(&self) -> Vec<&Path> {
        self.exporters.iter().map(|e| e.path()).collect()
    }
}
