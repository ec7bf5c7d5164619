// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Model graph: operators and the operands that connect them.
//!
//! # Type-State Pattern
//!
//! The graph transitions through states enforced at compile time:
//!
//! ```text
//! ModelGraph<Loaded>    : definitions parsed, references unchecked.
//!       │  .validate()
//!       ▼
//! ModelGraph<Validated> : every edge resolves, ready for the runtime.
//! ```
//!
//! The runtime graph builder only accepts `ModelGraph<Validated>`, so it
//! never has to handle a dangling operand reference.

use crate::{GraphManifest, ModelError, OperandDef, OperatorDef};
use std::collections::HashMap;
use std::fmt;

// ── Type-state markers ─────────────────────────────────────────────

/// Marker: graph has been loaded but not validated.
#[derive(Debug, Clone)]
pub struct Loaded;

/// Marker: graph has been validated and can be turned into a runtime graph.
#[derive(Debug, Clone)]
pub struct Validated;

/// Sealed trait for graph states.
pub trait GraphState: fmt::Debug + Clone {}
impl GraphState for Loaded {}
impl GraphState for Validated {}

// ── ModelGraph ─────────────────────────────────────────────────────

/// A graph of operators connected by named operands.
///
/// Operators keep their declaration order; the runtime mirrors it
/// position for position.
#[derive(Debug, Clone)]
pub struct ModelGraph<S: GraphState = Loaded> {
    /// Human-readable graph name.
    pub name: String,
    operators: Vec<OperatorDef>,
    operands: Vec<OperandDef>,
    operator_index: HashMap<String, usize>,
    operand_index: HashMap<String, usize>,
    _state: std::marker::PhantomData<S>,
}

// ── Loaded state ───────────────────────────────────────────────────

impl ModelGraph<Loaded> {
    /// Creates a new graph in the `Loaded` state.
    pub fn new(name: String, operands: Vec<OperandDef>, operators: Vec<OperatorDef>) -> Self {
        let operator_index = operators
            .iter()
            .enumerate()
            .map(|(i, op)| (op.name.clone(), i))
            .collect();
        let operand_index = operands
            .iter()
            .enumerate()
            .map(|(i, operand)| (operand.name.clone(), i))
            .collect();
        Self {
            name,
            operators,
            operands,
            operator_index,
            operand_index,
            _state: std::marker::PhantomData,
        }
    }

    /// Creates a `Loaded` graph from a parsed manifest.
    pub fn from_manifest(manifest: GraphManifest) -> Self {
        Self::new(manifest.name, manifest.operands, manifest.operators)
    }

    /// Validates the graph and transitions to the `Validated` state.
    ///
    /// # Checks
    /// - The graph has at least one operator.
    /// - Operator and operand names are unique.
    /// - Every operator input and output names a known operand.
    /// - An operator's output operand names that operator as producer, and
    ///   every input operand lists the operator among its consumers.
    /// - Every operand's producer and consumers exist and agree.
    pub fn validate(self) -> Result<ModelGraph<Validated>, ModelError> {
        if self.operators.is_empty() {
            return Err(ModelError::InvalidGraph(
                "model graph contains no operators".into(),
            ));
        }
        if self.operator_index.len() != self.operators.len() {
            return Err(ModelError::InvalidGraph(
                "operator names are not unique".into(),
            ));
        }
        if self.operand_index.len() != self.operands.len() {
            return Err(ModelError::InvalidGraph(
                "operand names are not unique".into(),
            ));
        }

        for op in &self.operators {
            self.check_operator_edges(op)?;
        }
        for operand in &self.operands {
            self.check_operand_edges(operand)?;
        }

        Ok(ModelGraph {
            name: self.name,
            operators: self.operators,
            operands: self.operands,
            operator_index: self.operator_index,
            operand_index: self.operand_index,
            _state: std::marker::PhantomData,
        })
    }

    fn check_operator_edges(&self, op: &OperatorDef) -> Result<(), ModelError> {
        for input in &op.inputs {
            let operand = self.operand(input).ok_or_else(|| ModelError::InvalidOperator {
                operator: op.name.clone(),
                detail: format!("input operand '{input}' is not defined"),
            })?;
            if !operand.consumers.contains(&op.name) {
                return Err(ModelError::InvalidOperand {
                    operand: input.clone(),
                    detail: format!("consumer '{}' is not listed", op.name),
                });
            }
        }

        if let Some(output) = &op.output {
            let operand = self.operand(output).ok_or_else(|| ModelError::InvalidOperator {
                operator: op.name.clone(),
                detail: format!("output operand '{output}' is not defined"),
            })?;
            if operand.producer != op.name {
                return Err(ModelError::InvalidOperand {
                    operand: output.clone(),
                    detail: format!(
                        "produced by '{}' but declares producer '{}'",
                        op.name, operand.producer
                    ),
                });
            }
        }
        Ok(())
    }

    fn check_operand_edges(&self, operand: &OperandDef) -> Result<(), ModelError> {
        let producer = self
            .operator(&operand.producer)
            .ok_or_else(|| ModelError::InvalidOperand {
                operand: operand.name.clone(),
                detail: format!("producer '{}' is not defined", operand.producer),
            })?;
        if producer.output.as_deref() != Some(operand.name.as_str()) {
            return Err(ModelError::InvalidOperand {
                operand: operand.name.clone(),
                detail: format!("producer '{}' does not output it", producer.name),
            });
        }

        for consumer in &operand.consumers {
            let op = self
                .operator(consumer)
                .ok_or_else(|| ModelError::InvalidOperand {
                    operand: operand.name.clone(),
                    detail: format!("consumer '{consumer}' is not defined"),
                })?;
            if !op.inputs.contains(&operand.name) {
                return Err(ModelError::InvalidOperand {
                    operand: operand.name.clone(),
                    detail: format!("consumer '{consumer}' does not read it"),
                });
            }
        }
        Ok(())
    }
}

// ── Validated state ────────────────────────────────────────────────

impl ModelGraph<Validated> {
    /// Returns the operators that read no operands (graph inputs).
    pub fn input_operators(&self) -> impl Iterator<Item = &OperatorDef> {
        self.operators.iter().filter(|op| op.inputs.is_empty())
    }

    /// Returns the operators whose output nobody consumes (graph outputs).
    pub fn output_operators(&self) -> impl Iterator<Item = &OperatorDef> {
        self.operators.iter().filter(|op| match &op.output {
            None => true,
            Some(name) => self
                .operand(name)
                .map_or(true, |operand| operand.consumers.is_empty()),
        })
    }

    /// Returns the total declared size of all weight attributes in bytes.
    pub fn total_weight_bytes(&self) -> usize {
        self.operators
            .iter()
            .flat_map(|op| op.attrs.values())
            .filter_map(|attr| attr.expected_bytes())
            .fold(0, usize::saturating_add)
    }

    /// Returns a summary string describing the graph.
    pub fn summary(&self) -> String {
        let total_weight_kb = self.total_weight_bytes() as f64 / 1024.0;
        format!(
            "Model '{}': {} operators, {} operands, {:.1} KB weights",
            self.name,
            self.num_operators(),
            self.operands.len(),
            total_weight_kb,
        )
    }
}

// ── Shared implementations ─────────────────────────────────────────

impl<S: GraphState> ModelGraph<S> {
    /// Returns the operators in declaration order.
    pub fn operators(&self) -> &[OperatorDef] {
        &self.operators
    }

    /// Returns the operands in declaration order.
    pub fn operands(&self) -> &[OperandDef] {
        &self.operands
    }

    /// Returns the number of operators.
    pub fn num_operators(&self) -> usize {
        self.operators.len()
    }

    /// Looks up an operator by name.
    pub fn operator(&self, name: &str) -> Option<&OperatorDef> {
        self.operator_index.get(name).map(|&i| &self.operators[i])
    }

    /// Looks up an operand by name.
    pub fn operand(&self, name: &str) -> Option<&OperandDef> {
        self.operand_index.get(name).map(|&i| &self.operands[i])
    }

    /// Returns the declaration position of an operator.
    pub fn operator_position(&self, name: &str) -> Option<usize> {
        self.operator_index.get(name).copied()
    }
}

impl<S: GraphState> fmt::Display for ModelGraph<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "ModelGraph '{}' ({} operators):",
            self.name,
            self.operators.len()
        )?;
        for op in &self.operators {
            writeln!(f, "  {}", op.summary())?;
        }
        Ok(())
    }
}
