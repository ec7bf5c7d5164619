// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The runtime graph arena.
//!
//! Operators and operands live in two vectors owned by [`RuntimeGraph`] and
//! refer to each other through [`OperatorId`] / [`OperandId`] handles. An
//! operand shared by several consumers is stored once; each consumer only
//! holds its handle.

use crate::{OperandId, OperatorId, RuntimeError, RuntimeOperand, RuntimeOperator};
use std::collections::HashMap;

/// Operators and operands of one loaded network.
#[derive(Debug, Clone, Default)]
pub struct RuntimeGraph {
    /// Graph name.
    pub name: String,
    operators: Vec<RuntimeOperator>,
    operands: Vec<RuntimeOperand>,
    operator_index: HashMap<String, OperatorId>,
    operand_index: HashMap<String, OperandId>,
    execution_order: Vec<OperatorId>,
}

impl RuntimeGraph {
    /// Creates an empty graph.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    // ── Construction ───────────────────────────────────────────────

    /// Adds an operator and returns its handle.
    ///
    /// # Errors
    /// Returns [`RuntimeError::DuplicateName`] if the name is taken.
    pub fn add_operator(&mut self, operator: RuntimeOperator) -> Result<OperatorId, RuntimeError> {
        if self.operator_index.contains_key(&operator.name) {
            return Err(RuntimeError::DuplicateName(operator.name));
        }
        let id = OperatorId(self.operators.len());
        self.operator_index.insert(operator.name.clone(), id);
        self.operators.push(operator);
        Ok(id)
    }

    /// Adds an operand and returns its handle.
    ///
    /// # Errors
    /// Returns [`RuntimeError::DuplicateName`] if the name is taken.
    pub fn add_operand(&mut self, operand: RuntimeOperand) -> Result<OperandId, RuntimeError> {
        if self.operand_index.contains_key(&operand.name) {
            return Err(RuntimeError::DuplicateName(operand.name));
        }
        let id = OperandId(self.operands.len());
        self.operand_index.insert(operand.name.clone(), id);
        self.operands.push(operand);
        Ok(id)
    }

    /// Makes `operand` the output of `producer`.
    pub fn set_output(&mut self, producer: OperatorId, operand: OperandId) {
        self.operators[producer.0].output_operand = Some(operand);
    }

    /// Wires `operand` from `producer` into `consumer`.
    ///
    /// The consumer records the operand under the producer's name and at
    /// the end of its positional input list; the producer records the
    /// consumer as a downstream operator.
    pub fn link(&mut self, producer: OperatorId, consumer: OperatorId, operand: OperandId) {
        let producer_name = self.operators[producer.0].name.clone();
        let consumer_name = self.operators[consumer.0].name.clone();

        let downstream = &mut self.operators[consumer.0];
        downstream.input_operands.insert(producer_name, operand);
        downstream.input_operands_seq.push(operand);

        let upstream = &mut self.operators[producer.0];
        if upstream
            .output_operators
            .insert(consumer_name.clone(), consumer)
            .is_none()
        {
            upstream.output_names.push(consumer_name);
        }
    }

    // ── Access ─────────────────────────────────────────────────────

    /// Returns all operators in insertion order.
    pub fn operators(&self) -> &[RuntimeOperator] {
        &self.operators
    }

    /// Returns all operands in insertion order.
    pub fn operands(&self) -> &[RuntimeOperand] {
        &self.operands
    }

    pub fn num_operators(&self) -> usize {
        self.operators.len()
    }

    pub fn num_operands(&self) -> usize {
        self.operands.len()
    }

    /// Returns the operator behind `id`.
    ///
    /// # Panics
    /// Panics if `id` belongs to another graph.
    pub fn operator(&self, id: OperatorId) -> &RuntimeOperator {
        &self.operators[id.0]
    }

    /// Returns the operator behind `id` mutably.
    ///
    /// # Panics
    /// Panics if `id` belongs to another graph.
    pub fn operator_mut(&mut self, id: OperatorId) -> &mut RuntimeOperator {
        &mut self.operators[id.0]
    }

    /// Returns the operand behind `id`.
    ///
    /// # Panics
    /// Panics if `id` belongs to another graph.
    pub fn operand(&self, id: OperandId) -> &RuntimeOperand {
        &self.operands[id.0]
    }

    /// Returns the operand behind `id` mutably.
    ///
    /// # Panics
    /// Panics if `id` belongs to another graph.
    pub fn operand_mut(&mut self, id: OperandId) -> &mut RuntimeOperand {
        &mut self.operands[id.0]
    }

    /// Looks up an operator handle by name.
    pub fn operator_id(&self, name: &str) -> Option<OperatorId> {
        self.operator_index.get(name).copied()
    }

    /// Looks up an operand handle by name (the producer's name).
    pub fn operand_id(&self, name: &str) -> Option<OperandId> {
        self.operand_index.get(name).copied()
    }

    /// Looks up an operator by name.
    ///
    /// # Errors
    /// Returns [`RuntimeError::UnknownOperator`] if there is none.
    pub fn operator_by_name(&self, name: &str) -> Result<&RuntimeOperator, RuntimeError> {
        self.operator_id(name)
            .map(|id| self.operator(id))
            .ok_or_else(|| RuntimeError::UnknownOperator(name.to_string()))
    }

    /// Mutable variant of [`operator_by_name`](Self::operator_by_name).
    pub fn operator_by_name_mut(
        &mut self,
        name: &str,
    ) -> Result<&mut RuntimeOperator, RuntimeError> {
        let id = self
            .operator_id(name)
            .ok_or_else(|| RuntimeError::UnknownOperator(name.to_string()))?;
        Ok(self.operator_mut(id))
    }

    /// Returns the handles of operators that read no operands.
    pub fn input_operators(&self) -> Vec<OperatorId> {
        self.ids()
            .filter(|id| self.operators[id.0].input_operands_seq.is_empty())
            .collect()
    }

    /// Returns the handles of operators with no downstream operator.
    pub fn output_operators(&self) -> Vec<OperatorId> {
        self.ids()
            .filter(|id| self.operators[id.0].output_operators.is_empty())
            .collect()
    }

    /// Returns the order computed by the last
    /// [`build_execution_order`](Self::build_execution_order), or an empty
    /// slice if it has not run.
    pub fn execution_order(&self) -> &[OperatorId] {
        &self.execution_order
    }

    fn ids(&self) -> impl Iterator<Item = OperatorId> {
        (0..self.operators.len()).map(OperatorId)
    }

    // ── Scheduling bookkeeping ─────────────────────────────────────

    /// Sorts the operators topologically along `output_operators` edges.
    ///
    /// The walk is depth-first, starting from the input operators and then
    /// from any operator not yet reached. Each operator's `start_time` is
    /// set to its execution position, and `end_time` to the latest
    /// position among its consumers (its own if it has none).
    ///
    /// # Errors
    /// Returns [`RuntimeError::CyclicGraph`] if the edges form a cycle.
    pub fn build_execution_order(&mut self) -> Result<Vec<OperatorId>, RuntimeError> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Unvisited,
            OnStack,
            Done,
        }

        let mut marks = vec![Mark::Unvisited; self.operators.len()];
        let mut post_order = Vec::with_capacity(self.operators.len());
        let roots = self.input_operators().into_iter().chain(self.ids());

        for root in roots {
            if marks[root.0] != Mark::Unvisited {
                continue;
            }
            // (operator, downstream operators still to visit)
            let mut stack: Vec<(OperatorId, Vec<OperatorId>)> = Vec::new();
            marks[root.0] = Mark::OnStack;
            stack.push((root, self.children(root)));

            while let Some((current, pending)) = stack.last_mut() {
                match pending.pop() {
                    Some(next) => match marks[next.0] {
                        Mark::Unvisited => {
                            marks[next.0] = Mark::OnStack;
                            let children = self.children(next);
                            stack.push((next, children));
                        }
                        Mark::OnStack => {
                            return Err(RuntimeError::CyclicGraph(
                                self.operators[next.0].name.clone(),
                            ));
                        }
                        Mark::Done => {}
                    },
                    None => {
                        let finished = *current;
                        marks[finished.0] = Mark::Done;
                        post_order.push(finished);
                        stack.pop();
                    }
                }
            }
        }

        post_order.reverse();
        let order = post_order;

        for (position, id) in order.iter().enumerate() {
            self.operators[id.0].start_time = Some(position);
        }
        for id in &order {
            let own = self.operators[id.0].start_time;
            let last_consumer = self.operators[id.0]
                .output_operators
                .values()
                .filter_map(|c| self.operators[c.0].start_time)
                .max();
            self.operators[id.0].end_time = last_consumer.or(own);
        }

        tracing::debug!(graph = %self.name, operators = order.len(), "execution order built");
        self.execution_order = order.clone();
        Ok(order)
    }

    /// Clears every operator's run flag and release marker.
    pub fn reset_forward_flags(&mut self) {
        for op in &mut self.operators {
            op.has_forward = false;
            op.occur_end_time = None;
        }
    }

    /// Downstream operators of `id`, reversed so that popping yields them in
    /// name order.
    fn children(&self, id: OperatorId) -> Vec<OperatorId> {
        self.operators[id.0]
            .output_operators
            .values()
            .rev()
            .copied()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tensor_core::DataType;

    /// input → {left, right} → join
    fn diamond() -> RuntimeGraph {
        let mut g = RuntimeGraph::new("diamond");
        let input = g.add_operator(RuntimeOperator::new("input", "pnnx.Input")).unwrap();
        let left = g.add_operator(RuntimeOperator::new("left", "nn.ReLU")).unwrap();
        let right = g.add_operator(RuntimeOperator::new("right", "nn.Sigmoid")).unwrap();
        let join = g.add_operator(RuntimeOperator::new("join", "pnnx.Expression")).unwrap();

        let x = g
            .add_operand(RuntimeOperand::new("input", vec![1, 3, 4, 4], DataType::Float32))
            .unwrap();
        let l = g
            .add_operand(RuntimeOperand::new("left", vec![1, 3, 4, 4], DataType::Float32))
            .unwrap();
        let r = g
            .add_operand(RuntimeOperand::new("right", vec![1, 3, 4, 4], DataType::Float32))
            .unwrap();

        g.set_output(input, x);
        g.set_output(left, l);
        g.set_output(right, r);
        g.link(input, left, x);
        g.link(input, right, x);
        g.link(left, join, l);
        g.link(right, join, r);
        g
    }

    #[test]
    fn test_wiring() {
        let g = diamond();
        let join = g.operator_by_name("join").unwrap();
        assert_eq!(join.input_operands_seq.len(), 2);
        assert_eq!(
            join.input_operands.keys().collect::<Vec<_>>(),
            ["left", "right"]
        );
        let input = g.operator_by_name("input").unwrap();
        assert_eq!(input.output_names, ["left", "right"]);
        assert_eq!(input.output_operand, g.operand_id("input"));
        assert!(g.operator_by_name("nope").is_err());
    }

    #[test]
    fn test_duplicate_names() {
        let mut g = diamond();
        assert!(matches!(
            g.add_operator(RuntimeOperator::new("left", "nn.ReLU")),
            Err(RuntimeError::DuplicateName(_))
        ));
        assert!(matches!(
            g.add_operand(RuntimeOperand::new("left", vec![1, 1], DataType::Float32)),
            Err(RuntimeError::DuplicateName(_))
        ));
    }

    #[test]
    fn test_inputs_and_outputs() {
        let g = diamond();
        assert_eq!(g.input_operators(), vec![g.operator_id("input").unwrap()]);
        assert_eq!(g.output_operators(), vec![g.operator_id("join").unwrap()]);
    }

    #[test]
    fn test_execution_order_diamond() {
        let mut g = diamond();
        let order = g.build_execution_order().unwrap();
        let names: Vec<_> = order.iter().map(|&id| g.operator(id).name.as_str()).collect();
        assert_eq!(names.len(), 4);
        assert_eq!(names[0], "input");
        assert_eq!(names[3], "join");
        assert_eq!(g.execution_order(), order.as_slice());

        let pos = |name: &str| g.operator_by_name(name).unwrap().start_time.unwrap();
        assert_eq!(pos("input"), 0);
        assert_eq!(pos("join"), 3);

        let input = g.operator_by_name("input").unwrap();
        let last_branch = pos("left").max(pos("right"));
        assert_eq!(input.end_time, Some(last_branch));
        assert_eq!(g.operator_by_name("left").unwrap().end_time, Some(3));
        assert_eq!(g.operator_by_name("join").unwrap().end_time, Some(3));
    }

    #[test]
    fn test_execution_order_respects_edges() {
        let mut g = diamond();
        let order = g.build_execution_order().unwrap();
        for (i, &id) in order.iter().enumerate() {
            for child in g.operator(id).output_operators.values() {
                let j = order.iter().position(|c| c == child).unwrap();
                assert!(i < j);
            }
        }
    }

    #[test]
    fn test_cycle_detected() {
        let mut g = diamond();
        let join = g.operator_id("join").unwrap();
        let left = g.operator_id("left").unwrap();
        let out = g
            .add_operand(RuntimeOperand::new("join", vec![1, 3, 4, 4], DataType::Float32))
            .unwrap();
        g.set_output(join, out);
        g.link(join, left, out);
        assert!(matches!(
            g.build_execution_order(),
            Err(RuntimeError::CyclicGraph(_))
        ));
    }

    #[test]
    fn test_reset_forward_flags() {
        let mut g = diamond();
        for id in [g.operator_id("left").unwrap(), g.operator_id("join").unwrap()] {
            let op = g.operator_mut(id);
            op.has_forward = true;
            op.occur_end_time = Some(2);
        }
        g.reset_forward_flags();
        assert!(g.operators().iter().all(|op| !op.has_forward));
        assert!(g.operators().iter().all(|op| op.occur_end_time.is_none()));
    }
}
