// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Runtime operators: graph nodes with their parameters, weights and edges.

use crate::{OperandId, RuntimeAttribute, RuntimeError};
use model_ir::{Parameter, ParameterType};
use std::collections::BTreeMap;

/// Stable handle to an operator inside a [`crate::RuntimeGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OperatorId(pub(crate) usize);

impl OperatorId {
    /// Returns the arena index.
    pub fn index(self) -> usize {
        self.0
    }
}

/// A node of the runtime graph.
///
/// Edges are arena handles; the graph owns every operand and operator.
#[derive(Debug, Clone, Default)]
pub struct RuntimeOperator {
    /// Unique operator name.
    pub name: String,
    /// Operator kind, e.g. `"nn.Conv2d"`.
    pub op_type: String,
    /// Input operands keyed by the name of the operator producing them.
    pub input_operands: BTreeMap<String, OperandId>,
    /// Input operands in positional order.
    pub input_operands_seq: Vec<OperandId>,
    /// The operand this operator writes, if any.
    pub output_operand: Option<OperandId>,
    /// Names of downstream operators, in wiring order.
    pub output_names: Vec<String>,
    /// Downstream operators keyed by name.
    pub output_operators: BTreeMap<String, OperatorId>,
    /// Weight attributes.
    pub attributes: BTreeMap<String, RuntimeAttribute>,
    /// Hyperparameters.
    pub params: BTreeMap<String, Parameter>,
    /// Position in the execution order.
    pub start_time: Option<usize>,
    /// Execution position of the last consumer of this operator's output.
    pub end_time: Option<usize>,
    /// Step at which the scheduler released this operator's output.
    pub occur_end_time: Option<usize>,
    /// Set once the operator has run in the current pass.
    pub has_forward: bool,
}

impl RuntimeOperator {
    /// Creates an operator with no edges, weights or parameters.
    pub fn new(name: impl Into<String>, op_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            op_type: op_type.into(),
            ..Default::default()
        }
    }

    /// Returns `true` if an attribute called `name` exists.
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Returns `true` if a parameter called `name` exists.
    pub fn has_parameter(&self, name: &str) -> bool {
        self.params.contains_key(name)
    }

    /// Returns the attribute `name` for decoding.
    pub fn attribute_mut(&mut self, name: &str) -> Result<&mut RuntimeAttribute, RuntimeError> {
        let operator = &self.name;
        self.attributes
            .get_mut(name)
            .ok_or_else(|| RuntimeError::MissingAttribute {
                operator: operator.clone(),
                name: name.to_string(),
            })
    }

    /// Returns the raw parameter `name`.
    pub fn param(&self, name: &str) -> Result<&Parameter, RuntimeError> {
        self.params
            .get(name)
            .ok_or_else(|| RuntimeError::MissingParameter {
                operator: self.name.clone(),
                name: name.to_string(),
            })
    }

    pub fn param_bool(&self, name: &str) -> Result<bool, RuntimeError> {
        self.typed_param(name, ParameterType::Bool, Parameter::as_bool)
    }

    pub fn param_int(&self, name: &str) -> Result<i32, RuntimeError> {
        self.typed_param(name, ParameterType::Int, Parameter::as_int)
    }

    pub fn param_float(&self, name: &str) -> Result<f32, RuntimeError> {
        self.typed_param(name, ParameterType::Float, Parameter::as_float)
    }

    pub fn param_str(&self, name: &str) -> Result<&str, RuntimeError> {
        self.typed_param(name, ParameterType::String, Parameter::as_str)
    }

    pub fn param_int_array(&self, name: &str) -> Result<&[i32], RuntimeError> {
        self.typed_param(name, ParameterType::IntArray, Parameter::as_int_array)
    }

    pub fn param_float_array(&self, name: &str) -> Result<&[f32], RuntimeError> {
        self.typed_param(name, ParameterType::FloatArray, Parameter::as_float_array)
    }

    pub fn param_str_array(&self, name: &str) -> Result<&[String], RuntimeError> {
        self.typed_param(name, ParameterType::StringArray, Parameter::as_str_array)
    }

    fn typed_param<'a, T>(
        &'a self,
        name: &str,
        expected: ParameterType,
        read: impl FnOnce(&'a Parameter) -> Option<T>,
    ) -> Result<T, RuntimeError> {
        let param = self.param(name)?;
        read(param).ok_or_else(|| RuntimeError::ParameterType {
            operator: self.name.clone(),
            name: name.to_string(),
            expected,
            actual: param.kind(),
        })
    }

    /// Returns a one-line description for logs.
    pub fn summary(&self) -> String {
        format!(
            "{} ({}): {} in, {} out, {} attrs, {} params",
            self.name,
            self.op_type,
            self.input_operands_seq.len(),
            self.output_operators.len(),
            self.attributes.len(),
            self.params.len(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tensor_core::DataType;

    fn conv() -> RuntimeOperator {
        let mut op = RuntimeOperator::new("conv1", "nn.Conv2d");
        op.params.insert("stride".into(), Parameter::IntArray(vec![2, 2]));
        op.params.insert("groups".into(), Parameter::Int(1));
        op.params.insert("bias".into(), Parameter::Bool(true));
        op.params.insert("eps".into(), Parameter::Float(1e-5));
        op.params.insert("mode".into(), Parameter::String("zeros".into()));
        op.params.insert("scale".into(), Parameter::FloatArray(vec![0.5]));
        op.params.insert("names".into(), Parameter::StringArray(vec!["a".into()]));
        op.attributes.insert(
            "weight".into(),
            RuntimeAttribute::new(vec![0u8; 16], vec![4], DataType::Float32),
        );
        op
    }

    #[test]
    fn test_existence_checks() {
        let empty = RuntimeOperator::new("empty", "nn.Identity");
        assert!(!empty.has_attribute("weight"));
        assert!(!empty.has_parameter("stride"));

        let op = conv();
        assert!(op.has_attribute("weight"));
        assert!(!op.has_attribute("bias"));
        assert!(op.has_parameter("stride"));
        assert!(!op.has_parameter("padding"));
    }

    #[test]
    fn test_typed_params() {
        let op = conv();
        assert_eq!(op.param_int_array("stride").unwrap(), &[2, 2]);
        assert_eq!(op.param_int("groups").unwrap(), 1);
        assert!(op.param_bool("bias").unwrap());
        assert_eq!(op.param_float("eps").unwrap(), 1e-5);
        assert_eq!(op.param_str("mode").unwrap(), "zeros");
        assert_eq!(op.param_float_array("scale").unwrap(), &[0.5]);
        assert_eq!(op.param_str_array("names").unwrap(), &["a".to_string()]);
    }

    #[test]
    fn test_param_wrong_kind() {
        let op = conv();
        match op.param_int("stride") {
            Err(RuntimeError::ParameterType {
                expected, actual, ..
            }) => {
                assert_eq!(expected, ParameterType::Int);
                assert_eq!(actual, ParameterType::IntArray);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_param_missing() {
        let op = conv();
        assert!(matches!(
            op.param_float("momentum"),
            Err(RuntimeError::MissingParameter { .. })
        ));
    }

    #[test]
    fn test_attribute_mut_decodes() {
        let mut op = conv();
        let values = op.attribute_mut("weight").unwrap().get::<f32>(true).unwrap();
        assert_eq!(values, vec![0.0; 4]);
        assert!(op.attribute_mut("weight").unwrap().is_consumed());
        assert!(matches!(
            op.attribute_mut("bias"),
            Err(RuntimeError::MissingAttribute { .. })
        ));
    }
}
