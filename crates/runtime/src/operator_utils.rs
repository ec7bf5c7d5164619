// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Operand storage initialization passes.
//!
//! Both passes allocate on first visit and revalidate on every later one,
//! so running them repeatedly is harmless.

use crate::{BatchLayout, RuntimeError, RuntimeGraph};
use model_ir::{graph::Validated, ModelGraph};

/// Prepares the storage of every operator's input operands.
///
/// An operand read by several operators is visited once per consumer.
pub fn init_operator_input(graph: &mut RuntimeGraph) -> Result<(), RuntimeError> {
    let mut allocated = 0usize;
    for index in 0..graph.num_operators() {
        let inputs = graph.operators()[index].input_operands_seq.clone();
        for id in inputs {
            let operand = graph.operand_mut(id);
            let layout = operand.layout()?;
            if operand.init_storage(&layout)? {
                allocated += 1;
            }
        }
    }
    tracing::debug!(graph = %graph.name, allocated, "input operands initialized");
    Ok(())
}

/// Prepares the storage of every operator's output operand, taking the
/// shape descriptor from the matching operator of `ir`.
///
/// # Errors
/// [`RuntimeError::OperatorMismatch`] if the operator lists differ in
/// length, or an operator differs in name or in whether it has an output.
/// [`RuntimeError::OperandShape`] if a descriptor is unusable or disagrees
/// with existing storage.
pub fn init_operator_output(
    graph: &mut RuntimeGraph,
    ir: &ModelGraph<Validated>,
) -> Result<(), RuntimeError> {
    if graph.num_operators() != ir.num_operators() {
        return Err(RuntimeError::OperatorMismatch {
            position: graph.num_operators().min(ir.num_operators()),
            detail: format!(
                "runtime graph has {} operators, description has {}",
                graph.num_operators(),
                ir.num_operators()
            ),
        });
    }

    let mut allocated = 0usize;
    for (position, def) in ir.operators().iter().enumerate() {
        let op = &graph.operators()[position];
        if op.name != def.name {
            return Err(RuntimeError::OperatorMismatch {
                position,
                detail: format!("runtime operator '{}' vs '{}'", op.name, def.name),
            });
        }

        let target = match (op.output_operand, def.output.as_deref()) {
            (None, None) => continue,
            (Some(id), Some(operand_name)) => (id, operand_name),
            (runtime, declared) => {
                return Err(RuntimeError::OperatorMismatch {
                    position,
                    detail: format!(
                        "operator '{}' has output {} at runtime but {} in the description",
                        def.name,
                        if runtime.is_some() { "set" } else { "unset" },
                        declared.unwrap_or("none"),
                    ),
                });
            }
        };

        let (id, operand_name) = target;
        let operand_def = ir.operand(operand_name).ok_or_else(|| RuntimeError::OperandShape {
            operand: operand_name.to_string(),
            detail: "not declared in the graph description".into(),
        })?;

        let operand = graph.operand_mut(id);
        let layout = BatchLayout::parse(&operand.name, &operand_def.shape, operand_def.dtype)?;
        if operand.init_storage(&layout)? {
            allocated += 1;
        }
    }
    tracing::debug!(graph = %graph.name, allocated, "output operands initialized");
    Ok(())
}
