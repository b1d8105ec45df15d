use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use super::exporter::PackExporter;
use crate::modules::members::PackSummary;
use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::durable;

/// Stream of YAML documents, one per pack, each introduced by `---`
pub struct YamlDocumentExporter {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
}

impl YamlDocumentExporter {
    /// Start an empty stream, truncating any existing file
    pub fn create(path: &Path) -> AppResult<Self> {
        Self::with_file(path, File::create(path)?)
    }

    /// Replace the file with one document per pack in `packs`, then keep
    /// appending after them.
    ///
    /// A YAML stream cut off mid-document can still parse, so an interrupted
    /// file is never extended in place.
    pub fn restore(path: &Path, packs: &[PackSummary]) -> AppResult<Self> {
        let mut content = String::new();
        for pack in packs {
            content.push_str(&document(pack)?);
        }
        durable::write_atomic(path, content.as_bytes())?;

        Self::with_file(path, OpenOptions::new().append(true).open(path)?)
    }

    fn with_file(path: &Path, file: File) -> AppResult<Self> {
        Ok(Self {
            path: path.to_path_buf(),
            writer: Some(BufWriter::new(file)),
        })
    }
}

fn document(pack: &PackSummary) -> AppResult<String> {
    Ok(format!("---\n{}", serde_yaml::to_string(pack)?))
}

impl PackExporter for YamlDocumentExporter {
    fn path(&self) -> &Path {
        &self.path
    }

    fn append_pack(&mut self, pack: &PackSummary) -> AppResult<()> {
        let document = document(pack)?;
        let writer = self.writer.as_mut().ok_or_else(|| {
            AppError::IoError(format!(
                "{} is already finalized",
                self.path.display()
            ))
        })?;

        writer.write_all(document.as_bytes())?;
        writer.flush()?;
        writer.get_ref().sync_data()?;
        Ok(())
    }

    fn finalize(&mut self) -> AppResult<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
            writer.get_ref().sync_all()?;
        }
        Ok(())
    }
}
