// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Write access to a stored weight archive.

use crate::ArchiveError;
use std::collections::HashSet;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Writes entries into a new archive without compression.
///
/// Entries are buffered by the zip writer; call [`finish`](Self::finish) to
/// write the central directory. Dropping the writer without finishing
/// leaves an unreadable file.
pub struct StoreZipWriter {
    path: PathBuf,
    inner: ZipWriter<File>,
    entries: Vec<(String, u64)>,
    seen: HashSet<String>,
}

impl StoreZipWriter {
    /// Creates (or truncates) the archive at `path`.
    ///
    /// # Errors
    /// Returns [`ArchiveError::Io`] if the file cannot be created.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, ArchiveError> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path).map_err(|source| ArchiveError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(Self {
            path,
            inner: ZipWriter::new(file),
            entries: Vec::new(),
            seen: HashSet::new(),
        })
    }

    /// Appends a stored entry named `name` holding `bytes`.
    ///
    /// # Errors
    /// Returns [`ArchiveError::DuplicateEntry`] if `name` was already
    /// written, or an I/O / zip error if writing fails.
    pub fn write_file(&mut self, name: &str, bytes: &[u8]) -> Result<(), ArchiveError> {
        if !self.seen.insert(name.to_string()) {
            return Err(ArchiveError::DuplicateEntry(name.to_string()));
        }
        let options = FileOptions::default()
            .compression_method(CompressionMethod::Stored)
            .large_file(bytes.len() as u64 >= u32::MAX as u64);
        self.inner.start_file(name, options)?;
        self.inner.write_all(bytes).map_err(|source| ArchiveError::Io {
            path: self.path.clone(),
            source,
        })?;
        self.entries.push((name.to_string(), bytes.len() as u64));
        tracing::debug!(entry = name, bytes = bytes.len(), "wrote archive entry");
        Ok(())
    }

    /// Returns `(name, size)` for every entry written so far.
    ///
    /// The CRC-32 and data offset of each entry are computed by the zip
    /// writer and stored in the central directory; read them back with
    /// [`StoreZipReader::entry_info`](crate::StoreZipReader::entry_info).
    pub fn entries(&self) -> &[(String, u64)] {
        &self.entries
    }

    /// Writes the central directory and closes the file.
    ///
    /// # Errors
    /// Returns [`ArchiveError::Zip`] if the directory cannot be written.
    pub fn finish(mut self) -> Result<(), ArchiveError> {
        self.inner.finish()?;
        tracing::info!(
            path = %self.path.display(),
            entries = self.entries.len(),
            "finished weight archive"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StoreZipReader;

    #[test]
    fn test_entries_are_tracked() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = StoreZipWriter::create(dir.path().join("w.bin")).unwrap();
        writer.write_file("a.weight", &[0u8; 16]).unwrap();
        writer.write_file("b.weight", &[0u8; 4]).unwrap();
        assert_eq!(
            writer.entries(),
            &[("a.weight".to_string(), 16), ("b.weight".to_string(), 4)]
        );
        writer.finish().unwrap();
    }

    #[test]
    fn test_duplicate_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = StoreZipWriter::create(dir.path().join("w.bin")).unwrap();
        writer.write_file("a.weight", &[1, 2, 3, 4]).unwrap();
        assert!(matches!(
            writer.write_file("a.weight", &[5]),
            Err(ArchiveError::DuplicateEntry(_))
        ));
        writer.finish().unwrap();
    }

    #[test]
    fn test_entries_are_stored_uncompressed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("w.bin");
        let mut writer = StoreZipWriter::create(&path).unwrap();
        let payload: Vec<u8> = (0..=255u8).cycle().take(4096).collect();
        writer.write_file("fc.weight", &payload).unwrap();
        writer.finish().unwrap();

        let file = File::open(&path).unwrap();
        let mut archive = zip::ZipArchive::new(file).unwrap();
        let entry = archive.by_name("fc.weight").unwrap();
        assert_eq!(entry.compression(), CompressionMethod::Stored);
        assert_eq!(entry.compressed_size(), 4096);
        drop(entry);

        let mut reader = StoreZipReader::open(&path).unwrap();
        assert_eq!(reader.read_to_vec("fc.weight").unwrap(), payload);
    }
}
