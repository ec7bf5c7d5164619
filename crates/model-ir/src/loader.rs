// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Graph loading from a model directory.
//!
//! A model directory contains:
//! - `model.json`: the graph manifest (see [`GraphManifest`]).
//! - `model.pnnx.bin`: the stored zip archive with weight bytes.
//!
//! Only the manifest is read here. Weight bytes are pulled from the archive
//! by the runtime when it builds its operator attributes.

use crate::{graph, GraphManifest, ModelError, ModelGraph};
use std::path::{Path, PathBuf};

/// Default manifest filename.
pub const MANIFEST_FILE: &str = "model.json";

/// Default weight archive filename.
pub const WEIGHTS_FILE: &str = "model.pnnx.bin";

/// Loads a graph description from disk into a validated [`ModelGraph`].
///
/// # Example
/// ```no_run
/// use model_ir::ModelLoader;
/// use std::path::Path;
///
/// let graph = ModelLoader::load(Path::new("./models/resnet18")).unwrap();
/// println!("Loaded {} operators", graph.num_operators());
/// ```
pub struct ModelLoader;

impl ModelLoader {
    /// Loads and validates the graph in `model_dir`.
    ///
    /// Steps:
    /// 1. Parse `model.json` and validate the entries.
    /// 2. Build the [`ModelGraph`] and validate its edges.
    pub fn load(model_dir: &Path) -> Result<ModelGraph<graph::Validated>, ModelError> {
        let manifest = GraphManifest::from_file(&Self::manifest_path(model_dir))?;
        let graph = Self::from_manifest(manifest)?;
        tracing::info!(dir = %model_dir.display(), "{}", graph.summary());
        Ok(graph)
    }

    /// Validates an in-memory manifest into a graph.
    ///
    /// Useful for tests and for manifests generated on the fly.
    pub fn from_manifest(
        manifest: GraphManifest,
    ) -> Result<ModelGraph<graph::Validated>, ModelError> {
        manifest.validate()?;
        ModelGraph::from_manifest(manifest).validate()
    }

    /// Returns the manifest path inside `model_dir`.
    pub fn manifest_path(model_dir: &Path) -> PathBuf {
        model_dir.join(MANIFEST_FILE)
    }

    /// Returns the weight archive path inside `model_dir`.
    pub fn weights_path(model_dir: &Path) -> PathBuf {
        model_dir.join(WEIGHTS_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIAMOND: &str = r#"{
        "name": "diamond",
        "operands": [
            { "name": "x", "producer": "input", "consumers": ["left", "right"],
              "shape": [2, 3, 4, 4], "dtype": "f32" },
            { "name": "l", "producer": "left", "consumers": ["join"],
              "shape": [2, 3, 4, 4], "dtype": "f32" },
            { "name": "r", "producer": "right", "consumers": ["join"],
              "shape": [2, 3, 4, 4], "dtype": "f32" },
            { "name": "y", "producer": "join", "consumers": [],
              "shape": [2, 3, 4, 4], "dtype": "f32" }
        ],
        "operators": [
            { "name": "input", "type": "pnnx.Input", "output": "x" },
            { "name": "left", "type": "nn.ReLU", "inputs": ["x"], "output": "l" },
            { "name": "right", "type": "nn.Sigmoid", "inputs": ["x"], "output": "r" },
            { "name": "join", "type": "pnnx.Expression", "inputs": ["l", "r"], "output": "y",
              "params": { "expr": "add(@0,@1)" } }
        ]
    }"#;

    #[test]
    fn test_from_manifest() {
        let manifest = GraphManifest::from_json(DIAMOND).unwrap();
        let graph = ModelLoader::from_manifest(manifest).unwrap();
        assert_eq!(graph.num_operators(), 4);
        assert_eq!(graph.operand("x").unwrap().consumers, ["left", "right"]);
    }

    #[test]
    fn test_load_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(ModelLoader::manifest_path(dir.path()), DIAMOND).unwrap();
        let graph = ModelLoader::load(dir.path()).unwrap();
        assert_eq!(graph.name, "diamond");
        assert_eq!(
            ModelLoader::weights_path(dir.path()),
            dir.path().join("model.pnnx.bin")
        );
    }

    #[test]
    fn test_load_missing_manifest() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ModelLoader::load(dir.path()),
            Err(ModelError::ManifestReadError(_))
        ));
    }

    #[test]
    fn test_manifest_errors_come_first() {
        let mut manifest = GraphManifest::from_json(DIAMOND).unwrap();
        manifest.operators[2].name = "left".into();
        assert!(matches!(
            ModelLoader::from_manifest(manifest),
            Err(ModelError::InvalidOperator { .. })
        ));
    }
}
