// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # tensor-core
//!
//! Dense three-axis tensors and the arithmetic used between graph operators.
//!
//! This crate provides:
//! - [`Tensor`]: a `(channels, rows, cols)` tensor backed by a column-major
//!   `ndarray`, plus [`TensorView`] / [`TensorViewMut`] over caller memory.
//! - [`Shape`]: the canonical (squeezed) 1–3 axis shape.
//! - [`DataType`]: element types a graph description can declare.
//! - Free functions for equality, creation, per-channel broadcasting and
//!   element-wise add/multiply.
//!
//! # Layout
//! Storage is column-major within each channel while the logical contract
//! callers see is row-major. [`Tensor::reshape`] with `row_major = false`
//! only relabels the physical buffer; [`Tensor::review`] (and
//! `reshape(.., true)`) moves elements so the row-major sequence survives.

mod dtype;
mod error;
mod ops;
mod shape;
mod tensor;

pub use dtype::DataType;
pub use error::TensorError;
pub use ops::{
    tensor_broadcast, tensor_clone, tensor_create, tensor_element_add, tensor_element_add_into,
    tensor_element_multiply, tensor_element_multiply_into, tensor_is_same,
    DEFAULT_SAME_THRESHOLD,
};
pub use shape::{Shape, MAX_RANK};
pub use tensor::{Element, Tensor, TensorBase, TensorView, TensorViewMut};
