// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Approximate tensor equality.

use crate::{Element, Tensor};

/// Default tolerance for [`tensor_is_same`].
pub const DEFAULT_SAME_THRESHOLD: f32 = 1e-5;

/// Returns `true` if `a` and `b` have the same canonical shape and every
/// pair of elements differs by less than `threshold`.
///
/// # Examples
/// ```
/// use tensor_core::{tensor_is_same, Tensor, DEFAULT_SAME_THRESHOLD};
/// let mut a: Tensor<f32> = Tensor::new(2, 3, 3);
/// a.fill(1.0);
/// let b = a.clone();
/// assert!(tensor_is_same(&a, &b, DEFAULT_SAME_THRESHOLD));
/// ```
pub fn tensor_is_same<A: Element>(a: &Tensor<A>, b: &Tensor<A>, threshold: A) -> bool {
    if a.raw_shapes() != b.raw_shapes() {
        return false;
    }
    a.as_slice().iter().zip(b.as_slice()).all(|(&x, &y)| {
        let diff = if x > y { x - y } else { y - x };
        diff < threshold
    })
}
