// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Tensor factory and clone.

use crate::{Element, Tensor, TensorError};

/// Creates a zero-filled tensor from a 1–3 axis shape.
///
/// # Errors
/// Returns [`TensorError::InvalidShape`] for an empty shape or more than
/// three axes.
pub fn tensor_create<A: Element>(dims: &[usize]) -> Result<Tensor<A>, TensorError> {
    Tensor::from_shape(dims)
}

/// Returns a deep copy of `tensor` backed by new storage.
pub fn tensor_clone<A: Element>(tensor: &Tensor<A>) -> Tensor<A> {
    tensor.clone()
}
