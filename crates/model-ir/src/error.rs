// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for graph loading and IR construction.

/// Errors that can occur when working with graph descriptions.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// The manifest file could not be read.
    #[error("failed to read manifest: {0}")]
    ManifestReadError(#[from] std::io::Error),

    /// The manifest JSON is malformed.
    #[error("failed to parse manifest: {0}")]
    ManifestParseError(#[from] serde_json::Error),

    /// An operator definition is invalid (unknown operand, bad attribute, ...).
    #[error("invalid operator '{operator}': {detail}")]
    InvalidOperator { operator: String, detail: String },

    /// An operand definition is invalid or inconsistent with its operators.
    #[error("invalid operand '{operand}': {detail}")]
    InvalidOperand { operand: String, detail: String },

    /// The graph as a whole is malformed.
    #[error("invalid model graph: {0}")]
    InvalidGraph(String),
}
