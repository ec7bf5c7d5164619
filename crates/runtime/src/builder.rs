// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Construction of a [`RuntimeGraph`] from a validated graph description.
//!
//! ```text
//! ModelGraph<Validated> + WeightLoader
//!     │  GraphBuilder::build()
//!     ▼
//! RuntimeGraph (operators, operands, edges)
//!     │  init_operator_input / init_operator_output
//!     ▼
//! RuntimeGraph (storage allocated)
//!     │  build_execution_order()
//!     ▼
//! RuntimeGraph (start/end times assigned)
//! ```
//!
//! [`RuntimeGraph::from_config`] runs the whole pipeline.

use crate::operator_utils::{init_operator_input, init_operator_output};
use crate::{
    RuntimeConfig, RuntimeError, RuntimeGraph, RuntimeOperand, RuntimeOperator, WeightLoader,
};
use model_ir::{graph::Validated, ModelGraph, ModelLoader, OperandDef};

/// Turns a [`ModelGraph`] into a wired [`RuntimeGraph`].
#[derive(Debug)]
pub struct GraphBuilder<'a> {
    ir: &'a ModelGraph<Validated>,
    weights: WeightLoader,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(ir: &'a ModelGraph<Validated>, weights: WeightLoader) -> Self {
        Self { ir, weights }
    }

    /// Builds the runtime graph.
    ///
    /// Steps:
    /// 1. Create one operator per description entry, in order, with its
    ///    parameters and weight attributes.
    /// 2. Create one operand per produced output, named after its producer.
    /// 3. Link every operator input to its producer.
    ///
    /// No operand storage is allocated here.
    pub fn build(mut self) -> Result<RuntimeGraph, RuntimeError> {
        let ir = self.ir;
        let mut graph = RuntimeGraph::new(ir.name.clone());

        for def in ir.operators() {
            let mut op = RuntimeOperator::new(def.name.clone(), def.op_type.clone());
            op.params = def.params.clone();
            op.attributes = self.weights.load_operator_attributes(def)?;
            graph.add_operator(op)?;
        }

        for def in ir.operators() {
            let Some(output) = def.output.as_deref() else {
                continue;
            };
            let operand_def = Self::operand_def(ir, output)?;
            let producer = Self::operator_id(&graph, &def.name)?;
            let operand = graph.add_operand(RuntimeOperand::new(
                def.name.clone(),
                operand_def.shape.clone(),
                operand_def.dtype,
            ))?;
            graph.set_output(producer, operand);
        }

        for def in ir.operators() {
            let consumer = Self::operator_id(&graph, &def.name)?;
            for input in &def.inputs {
                let producer_name = &Self::operand_def(ir, input)?.producer;
                let producer = Self::operator_id(&graph, producer_name)?;
                let operand =
                    graph
                        .operand_id(producer_name)
                        .ok_or_else(|| RuntimeError::OperandShape {
                            operand: input.clone(),
                            detail: format!("producer '{producer_name}' has no output operand"),
                        })?;
                graph.link(producer, consumer, operand);
            }
        }

        tracing::info!(
            "runtime graph '{}': {} operators, {} operands, weights {}",
            graph.name,
            graph.num_operators(),
            graph.num_operands(),
            if self.weights.is_file_backed() { "from archive" } else { "synthetic" },
        );
        Ok(graph)
    }

    fn operand_def<'g>(
        ir: &'g ModelGraph<Validated>,
        name: &str,
    ) -> Result<&'g OperandDef, RuntimeError> {
        ir.operand(name).ok_or_else(|| RuntimeError::OperandShape {
            operand: name.to_string(),
            detail: "not declared in the graph description".into(),
        })
    }

    fn operator_id(graph: &RuntimeGraph, name: &str) -> Result<crate::OperatorId, RuntimeError> {
        graph
            .operator_id(name)
            .ok_or_else(|| RuntimeError::UnknownOperator(name.to_string()))
    }
}

impl RuntimeGraph {
    /// Loads, builds and initializes a graph as described by `config`.
    ///
    /// Steps:
    /// 1. Load and validate the graph description from `model_path`.
    /// 2. Open the weight archive (or fall back to synthetic weights).
    /// 3. Build the runtime graph.
    /// 4. Run both storage initialization passes.
    /// 5. Compute the execution order.
    pub fn from_config(config: &RuntimeConfig) -> Result<Self, RuntimeError> {
        let ir = ModelLoader::load(&config.model_path)?;
        let weights = WeightLoader::new(
            &config.resolve_weights_path(),
            config.allow_synthetic_weights,
        )?;

        let mut graph = GraphBuilder::new(&ir, weights).build()?;
        init_operator_input(&mut graph)?;
        init_operator_output(&mut graph, &ir)?;
        graph.build_execution_order()?;
        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model_ir::GraphManifest;
    use tensor_core::DataType;

    const CHAIN: &str = r#"{
        "name": "chain",
        "operands": [
            { "name": "in0", "producer": "input", "consumers": ["fc"],
              "shape": [1, 8], "dtype": "f32" },
            { "name": "fc_out", "producer": "fc", "consumers": ["act"],
              "shape": [1, 4], "dtype": "f32" },
            { "name": "act_out", "producer": "act", "consumers": ["output"],
              "shape": [1, 4], "dtype": "f32" }
        ],
        "operators": [
            { "name": "input", "type": "pnnx.Input", "output": "in0" },
            { "name": "fc", "type": "nn.Linear", "inputs": ["in0"], "output": "fc_out",
              "params": { "in_features": 8, "out_features": 4, "bias": true },
              "attrs": { "weight": { "shape": [4, 8], "dtype": "f32" },
                         "bias": { "shape": [4], "dtype": "f32" } } },
            { "name": "act", "type": "nn.ReLU", "inputs": ["fc_out"], "output": "act_out" },
            { "name": "output", "type": "pnnx.Output", "inputs": ["act_out"] }
        ]
    }"#;

    fn ir() -> ModelGraph<Validated> {
        ModelLoader::from_manifest(GraphManifest::from_json(CHAIN).unwrap()).unwrap()
    }

    #[test]
    fn test_build_wires_operators() {
        let ir = ir();
        let graph = GraphBuilder::new(&ir, WeightLoader::synthetic()).build().unwrap();
        assert_eq!(graph.num_operators(), 4);
        assert_eq!(graph.num_operands(), 3);

        let fc = graph.operator_by_name("fc").unwrap();
        assert_eq!(fc.op_type, "nn.Linear");
        assert_eq!(fc.param_int("out_features").unwrap(), 4);
        assert!(fc.param_bool("bias").unwrap());
        assert_eq!(fc.attributes["weight"].weight_data.len(), 4 * 8 * 4);
        assert_eq!(fc.input_operands.keys().collect::<Vec<_>>(), ["input"]);
        assert_eq!(fc.output_names, ["act"]);

        let out = graph.operand(fc.output_operand.unwrap());
        assert_eq!(out.name, "fc");
        assert_eq!(out.shapes, vec![1, 4]);
        assert_eq!(out.dtype, DataType::Float32);

        let sink = graph.operator_by_name("output").unwrap();
        assert!(sink.output_operand.is_none());
        assert_eq!(graph.output_operators(), vec![graph.operator_id("output").unwrap()]);
    }

    #[test]
    fn test_build_rejects_oversized_attribute() {
        let mut manifest = GraphManifest::from_json(CHAIN).unwrap();
        manifest.operators[1]
            .attrs
            .get_mut("weight")
            .unwrap()
            .shape = vec![65536, 65536, 65536, 65536];
        let ir = ModelLoader::from_manifest(manifest).unwrap();
        assert!(matches!(
            GraphBuilder::new(&ir, WeightLoader::synthetic()).build(),
            Err(RuntimeError::WeightLoadError { .. })
        ));
    }

    #[test]
    fn test_from_config_synthetic() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(ModelLoader::manifest_path(dir.path()), CHAIN).unwrap();

        let config = RuntimeConfig {
            model_path: dir.path().to_path_buf(),
            allow_synthetic_weights: true,
            ..Default::default()
        };
        let graph = RuntimeGraph::from_config(&config).unwrap();

        let names: Vec<_> = graph
            .execution_order()
            .iter()
            .map(|&id| graph.operator(id).name.as_str())
            .collect();
        assert_eq!(names, ["input", "fc", "act", "output"]);
        assert!(graph.operands().iter().all(|o| o.is_initialized()));
        let act = graph.operand(graph.operand_id("act").unwrap());
        assert_eq!(act.datas[0].shapes(), [1, 1, 4]);
    }

    #[test]
    fn test_from_config_requires_weights() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(ModelLoader::manifest_path(dir.path()), CHAIN).unwrap();

        let config = RuntimeConfig {
            model_path: dir.path().to_path_buf(),
            allow_synthetic_weights: false,
            ..Default::default()
        };
        assert!(matches!(
            RuntimeGraph::from_config(&config),
            Err(RuntimeError::WeightLoadError { .. })
        ));
    }
}
