// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # model-ir
//!
//! The graph description the runtime is built from.
//!
//! - [`OperatorDef`] / [`OperandDef`]: nodes and the named tensor slots
//!   between them, with declared shapes and element types.
//! - [`Parameter`]: a closed set of hyperparameter kinds.
//! - [`ModelGraph`]: the whole graph, with a **type-state pattern**
//!   (`Loaded` → `Validated`).
//! - [`ModelLoader`]: loads a graph from a JSON manifest.
//! - [`GraphManifest`]: the JSON graph descriptor.
//!
//! # Model Directory
//! - `model.json`: operands and operators.
//! - `model.pnnx.bin`: weight bytes in a stored zip archive.
//!
//! # Example
//! ```no_run
//! use model_ir::ModelLoader;
//! use std::path::Path;
//!
//! let graph = ModelLoader::load(Path::new("./models/resnet18")).unwrap();
//! println!("{}", graph.summary());
//! for op in graph.operators() {
//!     println!("  {}", op.summary());
//! }
//! ```

mod error;
pub mod graph;
mod loader;
mod manifest;
mod operator;
mod parameter;

pub use error::ModelError;
pub use graph::ModelGraph;
pub use loader::{ModelLoader, MANIFEST_FILE, WEIGHTS_FILE};
pub use manifest::GraphManifest;
pub use operator::{AttributeDef, OperandDef, OperatorDef};
pub use parameter::{Parameter, ParameterType};
