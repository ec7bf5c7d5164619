// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Read access to a stored weight archive.

use crate::ArchiveError;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use zip::ZipArchive;

/// Directory record of one archive entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInfo {
    pub name: String,
    pub size: u64,
    pub crc32: u32,
    /// Byte offset of the entry data from the start of the archive file.
    pub data_offset: u64,
}

/// An open weight archive.
///
/// The central directory is read once in [`open`](Self::open); entry data is
/// read on demand.
pub struct StoreZipReader {
    path: PathBuf,
    archive: ZipArchive<File>,
    names: Vec<String>,
    sizes: HashMap<String, u64>,
}

impl StoreZipReader {
    /// Opens the archive at `path` and indexes its entries.
    ///
    /// # Errors
    /// Returns [`ArchiveError::Io`] if the file cannot be opened and
    /// [`ArchiveError::Zip`] if it is not a readable zip container.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ArchiveError> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|source| ArchiveError::Io {
            path: path.clone(),
            source,
        })?;
        let mut archive = ZipArchive::new(file)?;

        let mut names = Vec::with_capacity(archive.len());
        let mut sizes = HashMap::with_capacity(archive.len());
        for i in 0..archive.len() {
            let entry = archive.by_index(i)?;
            if entry.compression() != zip::CompressionMethod::Stored {
                tracing::warn!(
                    entry = entry.name(),
                    method = ?entry.compression(),
                    "entry is compressed; reading through the decoder"
                );
            }
            names.push(entry.name().to_string());
            sizes.insert(entry.name().to_string(), entry.size());
        }

        tracing::info!(
            path = %path.display(),
            entries = names.len(),
            "opened weight archive"
        );

        Ok(Self {
            path,
            archive,
            names,
            sizes,
        })
    }

    /// Returns the path the archive was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the entry names in directory order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Returns `true` if an entry called `name` exists.
    pub fn contains(&self, name: &str) -> bool {
        self.sizes.contains_key(name)
    }

    /// Returns the uncompressed size of `name`, or `None` if absent.
    pub fn file_size(&self, name: &str) -> Option<u64> {
        self.sizes.get(name).copied()
    }

    /// Returns the directory record of entry `name`.
    ///
    /// # Errors
    /// [`ArchiveError::NotFound`] if the entry does not exist.
    pub fn entry_info(&mut self, name: &str) -> Result<EntryInfo, ArchiveError> {
        if !self.contains(name) {
            return Err(ArchiveError::NotFound(name.to_string()));
        }
        let entry = self.archive.by_name(name)?;
        Ok(EntryInfo {
            name: name.to_string(),
            size: entry.size(),
            crc32: entry.crc32(),
            data_offset: entry.data_start(),
        })
    }

    /// Reads entry `name` into `buf`, which must be exactly
    /// [`file_size`](Self::file_size) bytes long.
    ///
    /// # Errors
    /// - [`ArchiveError::NotFound`] if the entry does not exist.
    /// - [`ArchiveError::SizeMismatch`] if `buf` has the wrong length.
    /// - [`ArchiveError::Io`] / [`ArchiveError::Zip`] on read failure.
    pub fn read_file(&mut self, name: &str, buf: &mut [u8]) -> Result<(), ArchiveError> {
        let stored = self
            .file_size(name)
            .ok_or_else(|| ArchiveError::NotFound(name.to_string()))?;
        if stored != buf.len() as u64 {
            return Err(ArchiveError::SizeMismatch {
                name: name.to_string(),
                stored,
                buffer: buf.len(),
            });
        }

        let mut entry = self.archive.by_name(name)?;
        entry.read_exact(buf).map_err(|source| ArchiveError::Io {
            path: self.path.clone(),
            source,
        })?;
        tracing::debug!(entry = name, bytes = stored, "read archive entry");
        Ok(())
    }

    /// Reads entry `name` into a freshly allocated buffer.
    ///
    /// # Errors
    /// Same as [`read_file`](Self::read_file).
    pub fn read_to_vec(&mut self, name: &str) -> Result<Vec<u8>, ArchiveError> {
        let size = self
            .file_size(name)
            .ok_or_else(|| ArchiveError::NotFound(name.to_string()))?;
        let mut buf = vec![0u8; size as usize];
        self.read_file(name, &mut buf)?;
        Ok(buf)
    }

    /// Closes the archive, releasing the file handle.
    pub fn close(self) {
        tracing::debug!(path = %self.path.display(), "closed weight archive");
    }
}

impl std::fmt::Debug for StoreZipReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreZipReader")
            .field("path", &self.path)
            .field("entries", &self.names.len())
            .finish()
    }
}
