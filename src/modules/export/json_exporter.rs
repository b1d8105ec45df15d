use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use super::exporter::{ExportMode, PackExporter};
use crate::log_warn;
use crate::modules::members::PackSummary;
use crate::shared::errors::{AppError, AppResult};

/// JSON array written one element at a time.
///
/// `[` is written on open and `]` only on finalize, so the file of an
/// interrupted run is not valid JSON until it is resumed or rebuilt.
pub struct JsonArrayExporter {
    path: PathBuf,
    writer: BufWriter<File>,
    has_entries: bool,
    finalized: bool,
    recovered: Vec<PackSummary>,
}

impl JsonArrayExporter {
    pub fn open(path: &Path, mode: ExportMode) -> AppResult<Self> {
        let (writer, recovered) = match mode {
            ExportMode::Fresh => (Self::start_fresh(path)?, Vec::new()),
            ExportMode::Resume => Self::reopen(path)?,
        };

        Ok(Self {
            path: path.to_path_buf(),
            writer,
            has_entries: !recovered.is_empty(),
            finalized: false,
            recovered,
        })
    }

    /// Complete entries kept from an earlier run, in file order
    pub fn recovered(&self) -> &[PackSummary] {
        &self.recovered
    }

    fn start_fresh(path: &Path) -> AppResult<BufWriter<File>> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(b"[\n")?;
        sync(&mut writer)?;
        Ok(writer)
    }

    /// Reopen the array left by an earlier run.
    ///
    /// Everything after the last complete entry is cut off: a torn entry, a
    /// dangling separator or the closing `]` of a finalized run.
    fn reopen(path: &Path) -> AppResult<(BufWriter<File>, Vec<PackSummary>)> {
        let existing = match fs::read(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        let Some((end, packs)) = complete_entries(&existing) else {
            if !existing.iter().all(u8::is_ascii_whitespace) {
                log_warn!(
                    "{} does not hold a JSON array; starting it over",
                    path.display()
                );
            }
            return Ok((Self::start_fresh(path)?, Vec::new()));
        };

        if packs.is_empty() {
            return Ok((Self::start_fresh(path)?, packs));
        }

        let tail: Vec<u8> = existing[end..]
            .iter()
            .copied()
            .filter(|b| !b.is_ascii_whitespace())
            .collect();
        if !tail.is_empty() && tail != b"]" {
            log_warn!(
                "Dropping an incomplete entry after {} packs in {}",
                packs.len(),
                path.display()
            );
        }

        let file = OpenOptions::new().append(true).open(path)?;
        file.set_len(end as u64)?;
        file.sync_data()?;
        Ok((BufWriter::new(file), packs))
    }
}

/// Byte offset just past the last complete array element, with the elements.
/// `None` when `bytes` does not open a JSON array.
fn complete_entries(bytes: &[u8]) -> Option<(usize, Vec<PackSummary>)> {
    let open = skip_whitespace(bytes, 0);
    if bytes.get(open) != Some(&b'[') {
        return None;
    }

    let mut end = open + 1;
    let mut packs = Vec::new();
    loop {
        let mut next = skip_whitespace(bytes, end);
        if !packs.is_empty() {
            if bytes.get(next) != Some(&b',') {
                break;
            }
            next = skip_whitespace(bytes, next + 1);
        }

        let mut stream =
            serde_json::Deserializer::from_slice(&bytes[next..]).into_iter::<PackSummary>();
        match stream.next() {
            Some(Ok(pack)) => {
                end = next + stream.byte_offset();
                packs.push(pack);
            }
            _ => break,
        }
    }
    Some((end, packs))
}

fn skip_whitespace(bytes: &[u8], from: usize) -> usize {
    from + bytes[from.min(bytes.len())..]
        .iter()
        .take_while(|b| b.is_ascii_whitespace())
        .count()
}

impl PackExporter for JsonArrayExporter {
    fn path(&self) -> &Path {
        &self.path
    }

    fn append_pack(&mut self, pack: &PackSummary) -> AppResult<()> {
        if self.finalized {
            return Err(AppError::IoError(format!(
                "{} is already finalized",
                self.path.display()
            )));
        }

        if self.has_entries {
            self.writer.write_all(b",\n")?;
        }
        serde_json::to_writer_pretty(&mut self.writer, pack)?;
        sync(&mut self.writer)?;
        self.has_entries = true;
        Ok(())
    }

    fn finalize(&mut self) -> AppResult<()> {
        if self.finalized {
            return Ok(());
        }
        self.writer.write_all(b"\n]\n")?;
        sync(&mut self.writer)?;
        self.finalized = true;
        Ok(())
    }
}

fn sync(writer: &mut BufWriter<File>) -> io::Result<()> {
    writer.flush()?;
    writer.get_ref().sync_data()
}
