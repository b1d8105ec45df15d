/// Exporter that accepts a fixed number of packs and then reports a full disk
use starter_packs_lib::modules::export::PackExporter;
use starter_packs_lib::modules::members::PackSummary;
use starter_packs_lib::shared::errors::{AppError, AppResult};
use std::path::Path;

pub struct FailingExporter {
    remaining: usize,
}

impl FailingExporter {
    pub fn always() -> Self {
        Self::after(0)
    }

    pub fn after(accepted: usize) -> Self {
        Self {
            remaining: accepted,
        }
    }
}

impl PackExporter for FailingExporter {
    fn path(&self) -> &Path {
        Path::new("failing")
    }

    fn append_pack(&mut self, _pack: &PackSummary) -> AppResult<()> {
        if self.remaining == 0 {
            return Err(AppError::IoError("No space left on device".into()));
        }
        self.remaining -= 1;
        Ok(())
    }

    fn finalize(&mut self) -> AppResult<()> {
        Ok(())
    }
}
