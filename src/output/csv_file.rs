//! CSV file sink
//!
//! Appends one `Id,Name,"Price"` line per product. A header line is written
//! only when the file is created by this sink.

use crate::crawler::{Product, CSV_HEADER};
use crate::output::traits::{OutputError, OutputResult, ProductSink};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// Appends product records to a text file
pub struct CsvFileSink {
    path: PathBuf,
    writer: Mutex<Option<BufWriter<File>>>,
}

impl CsvFileSink {
    /// Opens (or creates) the output file for appending
    pub fn open(path: &Path) -> OutputResult<Self> {
        if path.as_os_str().is_empty() || path.to_string_lossy().trim().is_empty() {
            return Err(OutputError::BadPath(path.display().to_string()));
        }

        let header_needed = !path.exists();
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let mut writer = BufWriter::new(file);

        if header_needed {
            writeln!(writer, "{}", CSV_HEADER)?;
        }

        Ok(Self {
            path: path.to_path_buf(),
            writer: Mutex::new(Some(writer)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProductSink for CsvFileSink {
    fn write_product(&self, product: &Product) -> OutputResult<()> {
        let mut guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);

        match guard.as_mut() {
            Some(writer) => writeln!(writer, "{}", product)?,
            None => tracing::warn!(
                "Output file {} already closed, dropping product {}",
                self.path.display(),
                product.id()
            ),
        }

        Ok(())
    }

    fn close(&self) -> OutputResult<()> {
        let writer = self
            .writer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(mut writer) = writer {
            writer.flush()?;
        }

        Ok(())
    }
}
