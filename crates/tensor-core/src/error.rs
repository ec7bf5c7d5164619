// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for tensor operations.

/// Errors that can occur during tensor operations.
///
/// All variants describe caller contract violations: bad shapes, sizes or
/// arguments. Nothing in the workspace retries after one of these.
#[derive(Debug, thiserror::Error)]
pub enum TensorError {
    /// A shape has the wrong number of axes or is otherwise unusable.
    #[error("invalid shape {dims:?}: {detail}")]
    InvalidShape { dims: Vec<usize>, detail: String },

    /// The number of elements supplied does not match what the operation needs.
    #[error("size mismatch in {op}: expected {expected} elements, got {actual}")]
    SizeMismatch {
        op: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Two tensors (or a tensor and an output buffer) have different shapes.
    #[error("incompatible shapes for {op}: {lhs:?} vs {rhs:?}")]
    ShapeMismatch {
        op: &'static str,
        lhs: [usize; 3],
        rhs: [usize; 3],
    },

    /// Broadcasting requires both operands to have the same channel count.
    #[error("channel mismatch for {op}: {lhs} vs {rhs}")]
    ChannelMismatch {
        op: &'static str,
        lhs: usize,
        rhs: usize,
    },

    /// Neither operand is a per-channel scalar, so the shapes cannot be broadcast.
    #[error("unsupported broadcast between {lhs:?} and {rhs:?}")]
    UnsupportedBroadcast { lhs: [usize; 3], rhs: [usize; 3] },

    /// Padding expects exactly `[top, bottom, left, right]`.
    #[error("padding expects 4 values (top, bottom, left, right), got {len}")]
    InvalidPadding { len: usize },

    /// Random distribution parameters are out of range.
    #[error("invalid distribution parameters: {0}")]
    InvalidDistribution(String),
}
