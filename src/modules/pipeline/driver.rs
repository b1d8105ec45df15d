use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use tokio::time::sleep;

use super::checkpoint::CheckpointStore;
use super::input::{read_input_lines, InputLine};
use super::pacing::PacingPolicy;
use super::pack_pipeline::{PackOutcome, PackPipeline};
use crate::modules::export::{ExportMode, ExportSet};
use crate::shared::errors::AppResult;
use crate::shared::utils::logger::PipelineLog;

/// Files a run reads and writes
#[derive(Debug, Clone)]
pub struct DriverPaths {
    pub input: PathBuf,
    pub checkpoint: PathBuf,
    pub json_output: PathBuf,
    pub yaml_output: PathBuf,
}

/// Counters reported at the end of a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub total_lines: usize,
    pub resumed_from: usize,
    /// Lines handled in this run, whatever their outcome
    pub processed: usize,
    pub exported: usize,
    pub skipped: usize,
    /// Lines that could not be parsed (also counted in `skipped`)
    pub invalid: usize,
}

/// Walks the input file line by line, checkpointing after each one
pub struct PipelineDriver {
    pipeline: PackPipeline,
    paths: DriverPaths,
    pacing: PacingPolicy,
    log: Arc<dyn PipelineLog>,
}

impl PipelineDriver {
    pub fn new(
        pipeline: PackPipeline,
        paths: DriverPaths,
        pacing: PacingPolicy,
        log: Arc<dyn PipelineLog>,
    ) -> Self {
        Self {
            pipeline,
            paths,
            pacing,
            log,
        }
    }

    /// Process every line not yet covered by the checkpoint, then finalize the
    /// exports and remove the checkpoint.
    ///
    /// An error leaves the checkpoint at the last completed line so the next
    /// run picks up where this one stopped.
    pub async fn run(&self) -> AppResult<RunSummary> {
        let (json, yaml) = (&self.paths.json_output, &self.paths.yaml_output);
        self.run_with(|mode| ExportSet::open(json, yaml, mode)).await
    }

    /// [`Self::run`] with the export set built by `open_exports`, which
    /// receives the mode the checkpoint calls for
    pub async fn run_with<F>(&self, open_exports: F) -> AppResult<RunSummary>
    where
        F: FnOnce(ExportMode) -> AppResult<ExportSet>,
    {
        let lines = read_input_lines(&self.paths.input)?;
        let checkpoint = CheckpointStore::new(&self.paths.checkpoint);
        let start = checkpoint.resume_index()?;

        let mode = if start > 0 {
            self.log.info(&format!("Resuming from index {}", start));
            ExportMode::Resume
        } else {
            ExportMode::Fresh
        };
        let mut exports = open_exports(mode)?;

        let mut summary = RunSummary {
            total_lines: lines.len(),
            resumed_from: start,
            ..RunSummary::default()
        };
        self.log.info(&format!(
            "Processing {} starter packs...",
            lines.len().saturating_sub(start)
        ));

        for (index, raw) in lines.iter().enumerate().skip(start) {
            match InputLine::parse(raw) {
                Ok(line) => match self.pipeline.process(&line, &mut exports).await? {
                    PackOutcome::Exported(_) => summary.exported += 1,
                    PackOutcome::Skipped { .. } => summary.skipped += 1,
                },
                Err(e) => {
                    self.log
                        .error(&format!("Line {}: {}", index + 1, e));
                    summary.invalid += 1;
                    summary.skipped += 1;
                }
            }
            summary.processed += 1;

            checkpoint.save(index)?;

            if let Some(pause) = self.pacing.pause_after(index) {
                self.log.info(&format!(
                    "Pausing {:?} after line {} to avoid rate limiting",
                    pause,
                    index + 1
                ));
                sleep(pause).await;
            }
        }

        exports.finalize()?;
        for path in exports.paths() {
            self.log.info(&format!("Exported data to {}", path.display()));
        }
        checkpoint.clear()?;

        self.log.info(&format!(
            "Run complete: {} lines, {} processed, {} exported, {} skipped ({} invalid)",
            summary.total_lines,
            summary.processed,
            summary.exported,
            summary.skipped,
            summary.invalid
        ));
        Ok(summary)
    }
}
