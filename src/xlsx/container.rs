//! Incremental OPC container writing.
//!
//! An XLSX document is a ZIP archive of named parts. The workbook assembler
//! appends parts one at a time and never rewrites a flushed part, so this
//! wrapper enforces the one-open-part discipline on top of [`ZipWriter`]:
//! a part must be ended before the next one begins, and sealing is terminal.

use std::io::{Seek, Write};

use zip::CompressionMethod;
use zip::write::{SimpleFileOptions, ZipWriter};

use crate::common::{Error, Result};

/// Streaming writer for the document container.
///
/// Parts are deflated; bytes handed to [`Container::write`] go straight to
/// the underlying sink's current entry.
pub(crate) struct Container<W: Write + Seek> {
    zip: ZipWriter<W>,
    open_part: Option<String>,
}

impl<W: Write + Seek> Container<W> {
    /// Create a container over the given sink.
    pub(crate) fn new(writer: W) -> Self {
        Self {
            zip: ZipWriter::new(writer),
            open_part: None,
        }
    }

    /// Begin a new named part.
    ///
    /// Fails if another part is still open.
    pub(crate) fn begin_part(&mut self, path: &str) -> Result<()> {
        if let Some(open) = &self.open_part {
            return Err(Error::Zip(format!(
                "cannot begin part '{path}': part '{open}' is still open"
            )));
        }
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        self.zip.start_file(path, options)?;
        self.open_part = Some(path.to_string());
        Ok(())
    }

    /// Append bytes to the currently open part.
    pub(crate) fn write(&mut self, bytes: &[u8]) -> Result<()> {
        if self.open_part.is_none() {
            return Err(Error::Zip("no part open for writing".to_string()));
        }
        self.zip.write_all(bytes)?;
        Ok(())
    }

    /// End the currently open part.
    ///
    /// The entry itself is finalized lazily by the archive when the next
    /// part begins or the container is sealed.
    pub(crate) fn end_part(&mut self) -> Result<()> {
        if self.open_part.take().is_none() {
            return Err(Error::Zip("no part open to end".to_string()));
        }
        Ok(())
    }

    /// Write a complete part in one call.
    pub(crate) fn write_part(&mut self, path: &str, content: &[u8]) -> Result<()> {
        self.begin_part(path)?;
        self.write(content)?;
        self.end_part()
    }

    /// Finalize the archive and return the inner sink.
    ///
    /// Fails if a part is still open.
    pub(crate) fn seal(self) -> Result<W> {
        if let Some(open) = &self.open_part {
            return Err(Error::Zip(format!(
                "cannot seal container: part '{open}' is still open"
            )));
        }
        let writer = self.zip.finish()?;
        Ok(writer)
    }
}
