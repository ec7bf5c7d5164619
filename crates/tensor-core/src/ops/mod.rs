// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Free functions over pairs of tensors.
//!
//! Broadcasting is deliberately narrow: two tensors either share a shape
//! or one of them is a per-channel scalar (`rows == cols == 1`) with the
//! same channel count. General NumPy-style broadcasting is not supported.

mod broadcast_op;
mod compare_op;
mod create_op;
mod elementwise_op;

pub use broadcast_op::tensor_broadcast;
pub use compare_op::{tensor_is_same, DEFAULT_SAME_THRESHOLD};
pub use create_op::{tensor_clone, tensor_create};
pub use elementwise_op::{
    tensor_element_add, tensor_element_add_into, tensor_element_multiply,
    tensor_element_multiply_into,
};
