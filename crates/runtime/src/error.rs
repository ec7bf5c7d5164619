// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for the runtime graph.

use model_ir::ParameterType;
use tensor_core::DataType;

/// Errors that can occur while building, initializing or querying a
/// runtime graph.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// A tensor operation failed.
    #[error("tensor error: {0}")]
    Tensor(#[from] tensor_core::TensorError),

    /// The weight archive could not be opened or read.
    #[error("archive error: {0}")]
    Archive(#[from] weight_archive::ArchiveError),

    /// Graph loading failed.
    #[error("model error: {0}")]
    ModelError(#[from] model_ir::ModelError),

    /// Weight bytes for an operator attribute could not be loaded.
    #[error("weight loading failed for '{operator}': {detail}")]
    WeightLoadError { operator: String, detail: String },

    /// An operand's shape descriptor is unusable or disagrees with the
    /// storage already allocated for it.
    #[error("operand '{operand}': {detail}")]
    OperandShape { operand: String, detail: String },

    /// The runtime operator list does not line up with the graph
    /// description it is being initialized from.
    #[error("operator mismatch at position {position}: {detail}")]
    OperatorMismatch { position: usize, detail: String },

    /// A name lookup failed.
    #[error("no operator named '{0}'")]
    UnknownOperator(String),

    /// An operator or operand was added twice under the same name.
    #[error("duplicate name '{0}' in runtime graph")]
    DuplicateName(String),

    /// The operator has no parameter with this name.
    #[error("operator '{operator}' has no parameter '{name}'")]
    MissingParameter { operator: String, name: String },

    /// The parameter exists but holds a different kind of value.
    #[error("parameter '{name}' of operator '{operator}' is {actual}, expected {expected}")]
    ParameterType {
        operator: String,
        name: String,
        expected: ParameterType,
        actual: ParameterType,
    },

    /// The operator has no attribute with this name.
    #[error("operator '{operator}' has no attribute '{name}'")]
    MissingAttribute { operator: String, name: String },

    /// The attribute buffer was already taken by a releasing decode.
    #[error("weight buffer was already consumed by a previous decode")]
    WeightConsumed,

    /// The attribute buffer holds no bytes.
    #[error("weight buffer is empty")]
    EmptyWeight,

    /// The declared weight type cannot be decoded into the requested type.
    #[error("unknown weight type {declared} (requested {requested})")]
    UnknownWeightType {
        declared: DataType,
        requested: DataType,
    },

    /// The buffer length is not a whole number of elements.
    #[error("weight buffer of {len} bytes is not a multiple of the {elem_size}-byte element size")]
    WeightSizeMismatch { len: usize, elem_size: usize },

    /// The operator graph contains a cycle.
    #[error("cycle detected through operator '{0}'")]
    CyclicGraph(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),
}
