// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Weight loading from the stored zip archive.
//!
//! [`WeightLoader`] provides two modes:
//!
//! 1. **File-backed**: opens `model.pnnx.bin` and reads each attribute's
//!    entry (`"<operator>.<attribute>"`) on demand.
//! 2. **Synthetic**: produces zero bytes of the declared size, for tests and
//!    for graphs whose weights are not at hand.

use crate::{RuntimeAttribute, RuntimeError};
use model_ir::{AttributeDef, OperatorDef};
use std::collections::BTreeMap;
use std::path::Path;
use weight_archive::{entry_key, StoreZipReader};

/// Reads operator attribute bytes from a weight archive.
pub struct WeightLoader {
    archive: Option<StoreZipReader>,
}

impl WeightLoader {
    /// Opens the archive at `path`.
    ///
    /// # Errors
    /// Returns [`RuntimeError::Archive`] if the file cannot be opened or is
    /// not a zip archive.
    pub fn open(path: &Path) -> Result<Self, RuntimeError> {
        let archive = StoreZipReader::open(path)?;
        tracing::info!(
            "weight loader: opened {} ({} entries)",
            path.display(),
            archive.names().len()
        );
        Ok(Self {
            archive: Some(archive),
        })
    }

    /// Opens the archive at `path`, or falls back to synthetic mode when the
    /// file is missing and `allow_synthetic` is set.
    pub fn new(path: &Path, allow_synthetic: bool) -> Result<Self, RuntimeError> {
        if path.exists() {
            return Self::open(path);
        }
        if !allow_synthetic {
            return Err(RuntimeError::WeightLoadError {
                operator: "init".into(),
                detail: format!("weight archive '{}' not found", path.display()),
            });
        }
        tracing::warn!(
            "weight loader: '{}' not found, using synthetic mode",
            path.display()
        );
        Ok(Self::synthetic())
    }

    /// Creates a loader in synthetic mode (no file needed).
    pub fn synthetic() -> Self {
        Self { archive: None }
    }

    /// Returns `true` if operating in file-backed mode.
    pub fn is_file_backed(&self) -> bool {
        self.archive.is_some()
    }

    /// Loads attribute `name` of `operator`.
    ///
    /// In file-backed mode the entry size must equal the size implied by the
    /// declared shape and type, when that size is known.
    pub fn load_attribute(
        &mut self,
        operator: &str,
        name: &str,
        def: &AttributeDef,
    ) -> Result<RuntimeAttribute, RuntimeError> {
        let fail = |detail: String| RuntimeError::WeightLoadError {
            operator: operator.to_string(),
            detail,
        };
        let expected = def.expected_bytes();

        let bytes = match &mut self.archive {
            Some(archive) => {
                let key = entry_key(operator, name);
                let stored = archive
                    .file_size(&key)
                    .ok_or_else(|| fail(format!("archive has no entry '{key}'")))?;
                let stored = usize::try_from(stored)
                    .map_err(|_| fail(format!("entry '{key}' is too large")))?;
                if let Some(expected) = expected.filter(|&e| e != stored) {
                    return Err(fail(format!(
                        "entry '{key}' holds {stored} bytes, declared shape {:?} {} needs {expected}",
                        def.shape, def.dtype
                    )));
                }
                let mut buf = vec![0u8; stored];
                archive.read_file(&key, &mut buf)?;
                buf
            }
            None => {
                let size = expected.ok_or_else(|| {
                    fail(format!(
                        "cannot size synthetic weight '{name}' of type {} and shape {:?}",
                        def.dtype, def.shape
                    ))
                })?;
                vec![0u8; size]
            }
        };

        Ok(RuntimeAttribute::new(bytes, def.shape.clone(), def.dtype))
    }

    /// Loads every attribute declared by `op`.
    pub fn load_operator_attributes(
        &mut self,
        op: &OperatorDef,
    ) -> Result<BTreeMap<String, RuntimeAttribute>, RuntimeError> {
        op.attrs
            .iter()
            .map(|(name, def)| Ok((name.clone(), self.load_attribute(&op.name, name, def)?)))
            .collect()
    }
}

impl std::fmt::Debug for WeightLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeightLoader")
            .field("archive", &self.archive.as_ref().map(|a| a.path()))
            .field("file_backed", &self.is_file_backed())
            .finish()
    }
}
