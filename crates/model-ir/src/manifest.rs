// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! JSON graph manifest parsing.
//!
//! The manifest (`model.json`) lists every operand and operator of the
//! graph. Weight bytes are not part of it; they live in the archive next to
//! it, keyed `"<operator>.<attribute>"`.
//!
//! # Format
//! ```json
//! {
//!   "name": "tiny-cnn",
//!   "operands": [
//!     { "name": "0", "producer": "input", "consumers": ["conv1"],
//!       "shape": [1, 3, 32, 32], "dtype": "f32" },
//!     ...
//!   ],
//!   "operators": [
//!     { "name": "input", "type": "pnnx.Input", "output": "0" },
//!     { "name": "conv1", "type": "nn.Conv2d", "inputs": ["0"], "output": "1",
//!       "params": { "stride": [1, 1] },
//!       "attrs": { "weight": { "shape": [8, 3, 3, 3], "dtype": "f32" } } },
//!     ...
//!   ]
//! }
//! ```

use crate::{ModelError, OperandDef, OperatorDef};
use std::collections::HashSet;
use std::path::Path;
use tensor_core::DataType;

/// Top-level graph manifest, deserialized from `model.json`.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct GraphManifest {
    /// Human-readable graph name.
    pub name: String,
    /// Operand definitions.
    #[serde(default)]
    pub operands: Vec<OperandDef>,
    /// Operator definitions, in declaration order.
    pub operators: Vec<OperatorDef>,
}

impl GraphManifest {
    /// Loads a manifest from a JSON file path.
    pub fn from_file(path: &Path) -> Result<Self, ModelError> {
        let content = std::fs::read_to_string(path)?;
        let manifest: Self = serde_json::from_str(&content)?;
        Ok(manifest)
    }

    /// Parses a manifest from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let manifest: Self = serde_json::from_str(json)?;
        Ok(manifest)
    }

    /// Serializes the manifest to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, ModelError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validates the manifest entries in isolation.
    ///
    /// Checks:
    /// - At least one operator is defined.
    /// - Operator names and operand names are unique.
    /// - Every attribute declares a known element type.
    ///
    /// Cross-references between operators and operands are checked by
    /// [`crate::ModelGraph::validate`].
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.operators.is_empty() {
            return Err(ModelError::InvalidGraph(
                "manifest contains no operators".into(),
            ));
        }

        let mut seen = HashSet::new();
        for op in &self.operators {
            if !seen.insert(op.name.as_str()) {
                return Err(ModelError::InvalidOperator {
                    operator: op.name.clone(),
                    detail: "duplicate operator name".into(),
                });
            }
            for (attr_name, attr) in &op.attrs {
                if attr.dtype == DataType::Unknown {
                    return Err(ModelError::InvalidOperator {
                        operator: op.name.clone(),
                        detail: format!("attribute '{attr_name}' has unknown dtype"),
                    });
                }
            }
        }

        let mut seen = HashSet::new();
        for operand in &self.operands {
            if !seen.insert(operand.name.as_str()) {
                return Err(ModelError::InvalidOperand {
                    operand: operand.name.clone(),
                    detail: "duplicate operand name".into(),
                });
            }
        }

        let total_attrs: usize = self.operators.iter().map(|op| op.attrs.len()).sum();
        tracing::debug!(
            name = %self.name,
            operators = self.operators.len(),
            operands = self.operands.len(),
            attributes = total_attrs,
            "manifest validated"
        );
        Ok(())
    }

    /// Returns every archive key the manifest's attributes refer to.
    pub fn weight_keys(&self) -> Vec<String> {
        self.operators
            .iter()
            .flat_map(|op| {
                op.attrs
                    .keys()
                    .map(move |attr| weight_archive::entry_key(&op.name, attr))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_manifest_json() -> &'static str {
        r#"{
            "name": "tiny-cnn",
            "operands": [
                { "name": "0", "producer": "input", "consumers": ["conv1"],
                  "shape": [1, 3, 8, 8], "dtype": "f32" },
                { "name": "1", "producer": "conv1", "consumers": ["output"],
                  "shape": [1, 4, 8, 8], "dtype": "f32" }
            ],
            "operators": [
                { "name": "input", "type": "pnnx.Input", "output": "0" },
                { "name": "conv1", "type": "nn.Conv2d", "inputs": ["0"], "output": "1",
                  "params": { "stride": [1, 1], "padding": [1, 1] },
                  "attrs": {
                      "weight": { "shape": [4, 3, 3, 3], "dtype": "f32" },
                      "bias": { "shape": [4], "dtype": "f32" }
                  } },
                { "name": "output", "type": "pnnx.Output", "inputs": ["1"] }
            ]
        }"#
    }

    #[test]
    fn test_parse_manifest() {
        let m = GraphManifest::from_json(sample_manifest_json()).unwrap();
        assert_eq!(m.name, "tiny-cnn");
        assert_eq!(m.operands.len(), 2);
        assert_eq!(m.operators.len(), 3);
        m.validate().unwrap();
    }

    #[test]
    fn test_weight_keys() {
        let m = GraphManifest::from_json(sample_manifest_json()).unwrap();
        assert_eq!(m.weight_keys(), vec!["conv1.bias", "conv1.weight"]);
        assert_eq!(
            m.weight_keys()[1],
            weight_archive::entry_key("conv1", "weight")
        );
    }

    #[test]
    fn test_json_roundtrip() {
        let m = GraphManifest::from_json(sample_manifest_json()).unwrap();
        let again = GraphManifest::from_json(&m.to_json().unwrap()).unwrap();
        assert_eq!(again.operators, m.operators);
        assert_eq!(again.operands, m.operands);
    }

    #[test]
    fn test_empty_operators() {
        let m = GraphManifest::from_json(r#"{ "name": "x", "operators": [] }"#).unwrap();
        assert!(matches!(m.validate(), Err(ModelError::InvalidGraph(_))));
    }

    #[test]
    fn test_duplicate_operator() {
        let mut m = GraphManifest::from_json(sample_manifest_json()).unwrap();
        m.operators[2].name = "conv1".into();
        assert!(matches!(
            m.validate(),
            Err(ModelError::InvalidOperator { .. })
        ));
    }

    #[test]
    fn test_duplicate_operand() {
        let mut m = GraphManifest::from_json(sample_manifest_json()).unwrap();
        m.operands[1].name = "0".into();
        assert!(matches!(m.validate(), Err(ModelError::InvalidOperand { .. })));
    }

    #[test]
    fn test_unknown_attribute_dtype() {
        let mut m = GraphManifest::from_json(sample_manifest_json()).unwrap();
        if let Some(attr) = m.operators[1].attrs.get_mut("bias") {
            attr.dtype = DataType::Unknown;
        }
        assert!(matches!(
            m.validate(),
            Err(ModelError::InvalidOperator { .. })
        ));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            GraphManifest::from_json("{ not json"),
            Err(ModelError::ManifestParseError(_))
        ));
    }
}
