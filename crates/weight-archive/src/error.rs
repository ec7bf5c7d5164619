// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for the weight archive.

use std::path::PathBuf;

/// Errors that can occur while reading or writing a weight archive.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    /// Opening, creating or writing the archive file failed.
    #[error("archive I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The zip structure is malformed or could not be written.
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// No entry with this name exists in the archive.
    #[error("entry not found: {0}")]
    NotFound(String),

    /// The destination buffer does not match the stored entry size.
    #[error("size mismatch for entry {name}: stored {stored} bytes, buffer holds {buffer}")]
    SizeMismatch {
        name: String,
        stored: u64,
        buffer: usize,
    },

    /// An entry with this name was already written.
    #[error("duplicate entry: {0}")]
    DuplicateEntry(String),
}
