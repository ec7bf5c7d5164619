// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Per-channel scalar broadcasting.

use crate::{Element, Tensor, TensorError};
use std::borrow::Cow;

/// Resolves two tensors to a common shape.
///
/// - Equal shapes: both inputs are returned borrowed.
/// - One side is a per-channel scalar (`rows == cols == 1`): that side is
///   expanded to the other side's `rows × cols` plane, replicating each
///   channel's value. The other side stays borrowed.
///
/// # Errors
/// - [`TensorError::ChannelMismatch`] if the channel counts differ.
/// - [`TensorError::UnsupportedBroadcast`] for any other shape pair.
///
/// # Examples
/// ```
/// use tensor_core::{tensor_broadcast, Tensor};
/// let a: Tensor<f32> = Tensor::new(3, 8, 8);
/// let b: Tensor<f32> = Tensor::new(3, 1, 1);
/// let (a2, b2) = tensor_broadcast(&a, &b).unwrap();
/// assert_eq!(a2.shapes(), b2.shapes());
/// ```
pub fn tensor_broadcast<'a, A: Element>(
    a: &'a Tensor<A>,
    b: &'a Tensor<A>,
) -> Result<(Cow<'a, Tensor<A>>, Cow<'a, Tensor<A>>), TensorError> {
    let (lhs, rhs) = (a.shapes(), b.shapes());
    if lhs == rhs {
        return Ok((Cow::Borrowed(a), Cow::Borrowed(b)));
    }
    if lhs[0] != rhs[0] {
        return Err(TensorError::ChannelMismatch {
            op: "broadcast",
            lhs: lhs[0],
            rhs: rhs[0],
        });
    }

    if is_channel_scalar(b) {
        Ok((Cow::Borrowed(a), Cow::Owned(expand(b, a.rows(), a.cols()))))
    } else if is_channel_scalar(a) {
        Ok((Cow::Owned(expand(a, b.rows(), b.cols())), Cow::Borrowed(b)))
    } else {
        Err(TensorError::UnsupportedBroadcast { lhs, rhs })
    }
}

fn is_channel_scalar<A: Element>(t: &Tensor<A>) -> bool {
    t.rows() == 1 && t.cols() == 1
}

fn expand<A: Element>(scalar: &Tensor<A>, rows: usize, cols: usize) -> Tensor<A> {
    let mut expanded = Tensor::new(scalar.channels(), rows, cols);
    for c in 0..scalar.channels() {
        expanded.slice_mut(c).fill(scalar.at(c, 0, 0));
    }
    expanded
}
