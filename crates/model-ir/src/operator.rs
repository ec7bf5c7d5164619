// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Operator and operand definitions.
//!
//! These are plain descriptions: no tensor storage and no weight bytes.
//! Weights live in the archive under `"<operator>.<attribute>"`; operand
//! storage is allocated by the runtime from the declared shapes.

use crate::Parameter;
use std::collections::BTreeMap;
use tensor_core::DataType;

/// A named tensor slot between one producer and any number of consumers.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OperandDef {
    /// Unique operand name.
    pub name: String,
    /// Name of the operator whose output this operand is.
    pub producer: String,
    /// Names of the operators that read this operand, in declaration order.
    #[serde(default)]
    pub consumers: Vec<String>,
    /// Declared shape: `[batch, item dims...]`.
    #[serde(default)]
    pub shape: Vec<i32>,
    /// Declared element type.
    #[serde(default)]
    pub dtype: DataType,
}

impl OperandDef {
    /// Returns the declared batch count, if any.
    pub fn batch(&self) -> Option<i32> {
        self.shape.first().copied()
    }

    /// Returns the declared per-item dimensions.
    pub fn item_shape(&self) -> &[i32] {
        self.shape.get(1..).unwrap_or(&[])
    }
}

/// Shape and element type of a persisted weight attribute.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AttributeDef {
    #[serde(default)]
    pub shape: Vec<i32>,
    #[serde(default)]
    pub dtype: DataType,
}

impl AttributeDef {
    /// Returns the number of bytes the declared shape and type occupy, or
    /// `None` if the type is unknown, a dimension is negative, or the size
    /// does not fit in `usize`.
    pub fn expected_bytes(&self) -> Option<usize> {
        let elem = self.dtype.size_bytes()?;
        self.shape.iter().try_fold(elem, |acc, &d| {
            usize::try_from(d).ok().and_then(|d| acc.checked_mul(d))
        })
    }
}

/// A single node of the graph.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OperatorDef {
    /// Unique operator name.
    pub name: String,
    /// Operator kind, e.g. `"nn.Conv2d"` or `"pnnx.Input"`.
    #[serde(rename = "type")]
    pub op_type: String,
    /// Input operand names, in positional order.
    #[serde(default)]
    pub inputs: Vec<String>,
    /// Output operand name; `None` for sinks.
    #[serde(default)]
    pub output: Option<String>,
    /// Hyperparameters.
    #[serde(default)]
    pub params: BTreeMap<String, Parameter>,
    /// Weight attributes. Bytes are fetched from the archive at build time.
    #[serde(default)]
    pub attrs: BTreeMap<String, AttributeDef>,
}

impl OperatorDef {
    /// Returns a one-line description for logs and [`crate::ModelGraph`]'s
    /// `Display`.
    pub fn summary(&self) -> String {
        format!(
            "{} ({}): {} in, {} out, {} params, {} attrs",
            self.name,
            self.op_type,
            self.inputs.len(),
            usize::from(self.output.is_some()),
            self.params.len(),
            self.attrs.len(),
        )
    }
}
