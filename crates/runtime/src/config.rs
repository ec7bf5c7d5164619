// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Runtime configuration loaded from TOML files or constructed programmatically.
//!
//! # TOML Format
//! ```toml
//! model_path = "./models/resnet18"
//! weights_path = "./models/resnet18/model.pnnx.bin"
//! num_threads = 4
//! allow_synthetic_weights = false
//! ```

use model_ir::ModelLoader;
use std::path::{Path, PathBuf};

/// Configuration for building a runtime graph.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RuntimeConfig {
    /// Path to the model directory holding `model.json`.
    pub model_path: PathBuf,
    /// Weight archive path (defaults to `model.pnnx.bin` in the model directory).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weights_path: Option<PathBuf>,
    /// Number of worker threads (defaults to number of online CPU cores).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_threads: Option<usize>,
    /// Use zero-filled weights when the archive is missing.
    #[serde(default)]
    pub allow_synthetic_weights: bool,
}

impl RuntimeConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, super::RuntimeError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            super::RuntimeError::ConfigError(format!(
                "cannot read config '{}': {e}",
                path.display()
            ))
        })?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, super::RuntimeError> {
        toml::from_str(toml_str).map_err(|e| {
            super::RuntimeError::ConfigError(format!("TOML parse error: {e}"))
        })
    }

    /// Serialises configuration to TOML.
    pub fn to_toml(&self) -> Result<String, super::RuntimeError> {
        toml::to_string_pretty(self).map_err(|e| {
            super::RuntimeError::ConfigError(format!("TOML serialise error: {e}"))
        })
    }

    /// Resolves the weight archive path.
    pub fn resolve_weights_path(&self) -> PathBuf {
        self.weights_path
            .clone()
            .unwrap_or_else(|| ModelLoader::weights_path(&self.model_path))
    }

    /// Resolves the number of worker threads.
    pub fn resolve_threads(&self) -> usize {
        self.num_threads.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
        })
    }

    /// Sizes the global rayon pool used by tensor kernels.
    ///
    /// The global pool can only be built once per process; later calls log
    /// a warning and leave it as it is.
    pub fn init_thread_pool(&self) {
        let threads = self.resolve_threads();
        match rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
        {
            Ok(()) => tracing::info!("thread pool: {threads} workers"),
            Err(e) => tracing::warn!("thread pool already initialized: {e}"),
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("./models/resnet18"),
            weights_path: None,
            num_threads: None,
            allow_synthetic_weights: false,
        }
    }
}
