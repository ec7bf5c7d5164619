// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Integration tests: model directory on disk to initialized runtime graph.
//!
//! These tests write a manifest and a weight archive to a temporary
//! directory, then exercise the complete flow through all four crates:
//! manifest loading → weight archive reads → graph building → storage
//! initialization → execution order.

use model_ir::{GraphManifest, ModelLoader};
use runtime::{
    init_operator_input, init_operator_output, GraphBuilder, RuntimeConfig, RuntimeError,
    RuntimeGraph, WeightLoader,
};
use std::path::Path;
use tensor_core::{tensor_element_add, Tensor};
use weight_archive::{entry_key, StoreZipWriter};

// ── Helpers ────────────────────────────────────────────────────

/// A small residual block:
///
/// ```text
/// input ─► conv ─► relu ─► add ─► output
///   └──────────────────────┘
/// ```
fn residual_manifest() -> serde_json::Value {
    serde_json::json!({
        "name": "residual",
        "operands": [
            { "name": "x", "producer": "input", "consumers": ["conv", "add"],
              "shape": [2, 4, 8, 8], "dtype": "f32" },
            { "name": "c", "producer": "conv", "consumers": ["relu"],
              "shape": [2, 4, 8, 8], "dtype": "f32" },
            { "name": "r", "producer": "relu", "consumers": ["add"],
              "shape": [2, 4, 8, 8], "dtype": "f32" },
            { "name": "y", "producer": "add", "consumers": ["output"],
              "shape": [2, 4, 8, 8], "dtype": "f32" }
        ],
        "operators": [
            { "name": "input", "type": "pnnx.Input", "output": "x" },
            { "name": "conv", "type": "nn.Conv2d", "inputs": ["x"], "output": "c",
              "params": {
                  "in_channels": 4, "out_channels": 4,
                  "kernel_size": [1, 1], "stride": [1, 1],
                  "padding_mode": "zeros", "bias": true
              },
              "attrs": {
                  "weight": { "shape": [4, 4, 1, 1], "dtype": "f32" },
                  "bias": { "shape": [4], "dtype": "f32" }
              } },
            { "name": "relu", "type": "nn.ReLU", "inputs": ["c"], "output": "r" },
            { "name": "add", "type": "pnnx.Expression", "inputs": ["r", "x"], "output": "y",
              "params": { "expr": "add(@0,@1)" } },
            { "name": "output", "type": "pnnx.Output", "inputs": ["y"] }
        ]
    })
}

fn conv_weight() -> Vec<f32> {
    (0..16).map(|i| i as f32 * 0.25).collect()
}

fn conv_bias() -> Vec<f32> {
    vec![0.1, 0.2, 0.3, 0.4]
}

fn f32_bytes(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// Writes `model.json` and `model.pnnx.bin` into `dir`.
fn write_model(dir: &Path) {
    let manifest = residual_manifest().to_string();
    std::fs::write(ModelLoader::manifest_path(dir), manifest).unwrap();

    let mut writer = StoreZipWriter::create(ModelLoader::weights_path(dir)).unwrap();
    writer
        .write_file(&entry_key("conv", "weight"), &f32_bytes(&conv_weight()))
        .unwrap();
    writer
        .write_file(&entry_key("conv", "bias"), &f32_bytes(&conv_bias()))
        .unwrap();
    writer.finish().unwrap();
}

fn names(graph: &RuntimeGraph) -> Vec<&str> {
    graph
        .execution_order()
        .iter()
        .map(|&id| graph.operator(id).name.as_str())
        .collect()
}

// ── End-to-end ─────────────────────────────────────────────────

#[test]
fn test_build_and_initialize_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    write_model(dir.path());

    let ir = ModelLoader::load(dir.path()).unwrap();
    let weights = WeightLoader::open(&ModelLoader::weights_path(dir.path())).unwrap();
    assert!(weights.is_file_backed());
    let mut graph = GraphBuilder::new(&ir, weights).build().unwrap();

    // Two full passes: the second only revalidates.
    for _ in 0..2 {
        init_operator_input(&mut graph).unwrap();
        init_operator_output(&mut graph, &ir).unwrap();
    }

    for operand in graph.operands() {
        assert_eq!(operand.datas.len(), 2, "operand {}", operand.name);
        for t in &operand.datas {
            assert_eq!(t.shapes(), [4, 8, 8]);
        }
    }

    let order = graph.build_execution_order().unwrap();
    assert_eq!(order.len(), 5);
    assert_eq!(names(&graph), ["input", "conv", "relu", "add", "output"]);
}

#[test]
fn test_weights_decode_from_archive() {
    let dir = tempfile::tempdir().unwrap();
    write_model(dir.path());

    let ir = ModelLoader::load(dir.path()).unwrap();
    let weights = WeightLoader::open(&ModelLoader::weights_path(dir.path())).unwrap();
    let mut graph = GraphBuilder::new(&ir, weights).build().unwrap();

    let conv = graph.operator_by_name_mut("conv").unwrap();
    assert!(conv.has_attribute("weight"));
    assert!(conv.has_parameter("kernel_size"));
    assert_eq!(conv.param_int_array("kernel_size").unwrap(), &[1, 1]);
    assert_eq!(conv.param_str("padding_mode").unwrap(), "zeros");

    let bias = conv.attribute_mut("bias").unwrap().get::<f32>(false).unwrap();
    assert_eq!(bias, conv_bias());

    let weight = conv.attribute_mut("weight").unwrap();
    assert_eq!(weight.shape, vec![4, 4, 1, 1]);
    assert_eq!(weight.get::<f32>(true).unwrap(), conv_weight());
    assert!(weight.weight_data.is_empty());
    assert!(matches!(
        weight.get::<f32>(true),
        Err(RuntimeError::WeightConsumed)
    ));
}

#[test]
fn test_topology() {
    let dir = tempfile::tempdir().unwrap();
    write_model(dir.path());

    let config = RuntimeConfig {
        model_path: dir.path().to_path_buf(),
        ..Default::default()
    };
    let graph = RuntimeGraph::from_config(&config).unwrap();

    let input = graph.operator_by_name("input").unwrap();
    assert_eq!(input.output_names, ["conv", "add"]);

    let add = graph.operator_by_name("add").unwrap();
    assert_eq!(add.input_operands.keys().collect::<Vec<_>>(), ["input", "relu"]);
    let relu_out = graph.operand_id("relu").unwrap();
    let input_out = graph.operand_id("input").unwrap();
    assert_eq!(add.input_operands_seq, vec![relu_out, input_out]);

    // `input` is live until `add` runs.
    let add_pos = add.start_time.unwrap();
    assert_eq!(input.end_time, Some(add_pos));
    assert_eq!(graph.input_operators(), vec![graph.operator_id("input").unwrap()]);
    assert_eq!(graph.output_operators(), vec![graph.operator_id("output").unwrap()]);
}

#[test]
fn test_operand_storage_is_usable() {
    let dir = tempfile::tempdir().unwrap();
    write_model(dir.path());

    let config = RuntimeConfig {
        model_path: dir.path().to_path_buf(),
        ..Default::default()
    };
    let mut graph = RuntimeGraph::from_config(&config).unwrap();

    let x = graph.operand_id("input").unwrap();
    let r = graph.operand_id("relu").unwrap();
    graph.operand_mut(x).datas[0].fill(1.0);
    graph.operand_mut(r).datas[0].fill(2.0);

    let sum: Tensor<f32> = tensor_element_add(
        &graph.operand(r).datas[0],
        &graph.operand(x).datas[0],
    )
    .unwrap();
    assert_eq!(sum.shapes(), [4, 8, 8]);
    assert!(sum.as_slice().iter().all(|&v| v == 3.0));
}

// ── Failure paths ──────────────────────────────────────────────

#[test]
fn test_missing_archive_entry() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        ModelLoader::manifest_path(dir.path()),
        residual_manifest().to_string(),
    )
    .unwrap();
    let mut writer = StoreZipWriter::create(ModelLoader::weights_path(dir.path())).unwrap();
    writer
        .write_file(&entry_key("conv", "weight"), &f32_bytes(&conv_weight()))
        .unwrap();
    writer.finish().unwrap();

    let config = RuntimeConfig {
        model_path: dir.path().to_path_buf(),
        ..Default::default()
    };
    assert!(matches!(
        RuntimeGraph::from_config(&config),
        Err(RuntimeError::WeightLoadError { .. })
    ));
}

#[test]
fn test_invalid_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let mut manifest: GraphManifest =
        serde_json::from_value(residual_manifest()).unwrap();
    manifest.operators.clear();
    std::fs::write(
        ModelLoader::manifest_path(dir.path()),
        manifest.to_json().unwrap(),
    )
    .unwrap();

    let config = RuntimeConfig {
        model_path: dir.path().to_path_buf(),
        allow_synthetic_weights: true,
        ..Default::default()
    };
    assert!(matches!(
        RuntimeGraph::from_config(&config),
        Err(RuntimeError::ModelError(_))
    ));
}

#[test]
fn test_config_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    write_model(dir.path());

    let config = RuntimeConfig {
        model_path: dir.path().to_path_buf(),
        num_threads: Some(2),
        ..Default::default()
    };
    let path = dir.path().join("runtime.toml");
    std::fs::write(&path, config.to_toml().unwrap()).unwrap();

    let loaded = RuntimeConfig::from_file(&path).unwrap();
    assert_eq!(loaded, config);
    let graph = RuntimeGraph::from_config(&loaded).unwrap();
    assert_eq!(graph.name, "residual");
}
