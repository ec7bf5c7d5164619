// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # runtime
//!
//! The in-memory graph a network runs on.
//!
//! The runtime takes:
//! - A validated `ModelGraph` from `model-ir`.
//! - A weight archive read through `weight-archive`.
//!
//! And builds a [`RuntimeGraph`]: an arena of [`RuntimeOperator`]s and
//! [`RuntimeOperand`]s connected by [`OperatorId`] / [`OperandId`] handles,
//! with operand storage allocated as `tensor-core` tensors and an execution
//! order computed from the edges.
//!
//! # Pipeline
//! ```text
//! RuntimeConfig → ModelGraph<Validated> → GraphBuilder → RuntimeGraph
//!               → init_operator_input / init_operator_output
//!               → build_execution_order
//! ```

mod attribute;
mod builder;
mod config;
mod error;
mod graph;
mod operand;
mod operator;
pub mod operator_utils;
mod weight_loader;

pub use attribute::{RuntimeAttribute, WeightElement};
pub use builder::GraphBuilder;
pub use config::RuntimeConfig;
pub use error::RuntimeError;
pub use graph::RuntimeGraph;
pub use operand::{BatchLayout, OperandId, RuntimeOperand};
pub use operator::{OperatorId, RuntimeOperator};
pub use operator_utils::{init_operator_input, init_operator_output};
pub use weight_loader::WeightLoader;
