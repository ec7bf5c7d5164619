// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Example: build and initialize a runtime graph.
//!
//! With a TOML config path as the first argument the graph is loaded from
//! disk; otherwise a small synthetic network is built in memory.
//!
//! ```bash
//! cargo run -p runtime --example graph_init
//! cargo run -p runtime --example graph_init -- runtime.toml
//! ```

use model_ir::{GraphManifest, ModelLoader};
use runtime::{
    init_operator_input, init_operator_output, GraphBuilder, RuntimeConfig, RuntimeGraph,
    WeightLoader,
};
use std::path::Path;

const DEMO: &str = r#"{
    "name": "demo",
    "operands": [
        { "name": "x", "producer": "input", "consumers": ["conv", "pool"],
          "shape": [1, 3, 32, 32], "dtype": "f32" },
        { "name": "c", "producer": "conv", "consumers": ["cat"],
          "shape": [1, 8, 16, 16], "dtype": "f32" },
        { "name": "p", "producer": "pool", "consumers": ["cat"],
          "shape": [1, 3, 16, 16], "dtype": "f32" },
        { "name": "y", "producer": "cat", "consumers": [],
          "shape": [1, 11, 16, 16], "dtype": "f32" }
    ],
    "operators": [
        { "name": "input", "type": "pnnx.Input", "output": "x" },
        { "name": "conv", "type": "nn.Conv2d", "inputs": ["x"], "output": "c",
          "params": { "kernel_size": [3, 3], "stride": [2, 2], "padding": [1, 1] },
          "attrs": { "weight": { "shape": [8, 3, 3, 3], "dtype": "f32" } } },
        { "name": "pool", "type": "nn.MaxPool2d", "inputs": ["x"], "output": "p",
          "params": { "kernel_size": [2, 2] } },
        { "name": "cat", "type": "torch.cat", "inputs": ["c", "p"], "output": "y",
          "params": { "dim": 0 } }
    ]
}"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter("debug")
        .init();

    let graph = match std::env::args().nth(1) {
        Some(path) => {
            let config = RuntimeConfig::from_file(Path::new(&path))?;
            config.init_thread_pool();
            RuntimeGraph::from_config(&config)?
        }
        None => {
            let ir = ModelLoader::from_manifest(GraphManifest::from_json(DEMO)?)?;
            println!("{ir}");
            let mut graph = GraphBuilder::new(&ir, WeightLoader::synthetic()).build()?;
            init_operator_input(&mut graph)?;
            init_operator_output(&mut graph, &ir)?;
            graph.build_execution_order()?;
            graph
        }
    };

    println!("\nExecution order of '{}':", graph.name);
    println!("{:<4} {:<40} {:>6} {:>6}", "#", "Operator", "Start", "End");
    println!("{}", "-".repeat(60));
    for &id in graph.execution_order() {
        let op = graph.operator(id);
        println!(
            "{:<4} {:<40} {:>6} {:>6}",
            id.index(),
            op.summary(),
            op.start_time.map_or("-".into(), |t| t.to_string()),
            op.end_time.map_or("-".into(), |t| t.to_string()),
        );
    }

    println!("\nOperands:");
    for operand in graph.operands() {
        let item = operand.datas.first().map(|t| t.shapes());
        println!(
            "  {:<12} batch {} item {:?}",
            operand.name,
            operand.datas.len(),
            item
        );
    }

    Ok(())
}
