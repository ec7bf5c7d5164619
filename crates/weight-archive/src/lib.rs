// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # weight-archive
//!
//! Reads and writes the weight container shipped next to a graph
//! description: a zip file whose entries are all *stored* (no
//! compression), one entry per operator attribute, keyed
//! `"<operator>.<attribute>"`.
//!
//! Every failure is an [`ArchiveError`] value; nothing here panics on bad
//! input.

mod error;
mod reader;
mod writer;

pub use error::ArchiveError;
pub use reader::{EntryInfo, StoreZipReader};
pub use writer::StoreZipWriter;

/// Builds the archive key for attribute `attribute` of operator `operator`.
///
/// # Examples
/// ```
/// assert_eq!(weight_archive::entry_key("conv1", "weight"), "conv1.weight");
/// ```
pub fn entry_key(operator: &str, attribute: &str) -> String {
    format!("{operator}.{attribute}")
}
