// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Element-wise addition and multiplication.
//!
//! The `_into` forms write into a pre-allocated output so that operator
//! kernels can reuse operand storage between runs.

use crate::ops::tensor_broadcast;
use crate::{Element, Tensor, TensorError};
use std::borrow::Cow;

/// Returns `a + b`, broadcasting a per-channel scalar side if needed.
///
/// # Errors
/// Propagates broadcast errors from [`tensor_broadcast`].
pub fn tensor_element_add<A: Element>(
    a: &Tensor<A>,
    b: &Tensor<A>,
) -> Result<Tensor<A>, TensorError> {
    apply("add", a, b, |x, y| x + y)
}

/// Writes `a + b` into `output`.
///
/// # Errors
/// Propagates broadcast errors, and returns [`TensorError::ShapeMismatch`]
/// if `output` does not have the resolved shape.
pub fn tensor_element_add_into<A: Element>(
    a: &Tensor<A>,
    b: &Tensor<A>,
    output: &mut Tensor<A>,
) -> Result<(), TensorError> {
    apply_into("add", a, b, output, |x, y| x + y)
}

/// Returns `a * b`, broadcasting a per-channel scalar side if needed.
///
/// # Errors
/// Propagates broadcast errors from [`tensor_broadcast`].
pub fn tensor_element_multiply<A: Element>(
    a: &Tensor<A>,
    b: &Tensor<A>,
) -> Result<Tensor<A>, TensorError> {
    apply("multiply", a, b, |x, y| x * y)
}

/// Writes `a * b` into `output`.
///
/// # Errors
/// Propagates broadcast errors, and returns [`TensorError::ShapeMismatch`]
/// if `output` does not have the resolved shape.
pub fn tensor_element_multiply_into<A: Element>(
    a: &Tensor<A>,
    b: &Tensor<A>,
    output: &mut Tensor<A>,
) -> Result<(), TensorError> {
    apply_into("multiply", a, b, output, |x, y| x * y)
}

/// Broadcasts `a` and `b` and checks that the results line up.
fn resolve<'a, A: Element>(
    op: &'static str,
    a: &'a Tensor<A>,
    b: &'a Tensor<A>,
) -> Result<(Cow<'a, Tensor<A>>, Cow<'a, Tensor<A>>), TensorError> {
    let (lhs, rhs) = tensor_broadcast(a, b)?;
    if lhs.shapes() != rhs.shapes() {
        return Err(TensorError::ShapeMismatch {
            op,
            lhs: lhs.shapes(),
            rhs: rhs.shapes(),
        });
    }
    Ok((lhs, rhs))
}

fn apply<A, F>(op: &'static str, a: &Tensor<A>, b: &Tensor<A>, f: F) -> Result<Tensor<A>, TensorError>
where
    A: Element,
    F: Fn(A, A) -> A,
{
    let (lhs, rhs) = resolve(op, a, b)?;
    let [channels, rows, cols] = lhs.shapes();
    let mut output = Tensor::new(channels, rows, cols);
    zip_into(lhs.as_slice(), rhs.as_slice(), output.as_mut_slice(), f);
    Ok(output)
}

fn apply_into<A, F>(
    op: &'static str,
    a: &Tensor<A>,
    b: &Tensor<A>,
    output: &mut Tensor<A>,
    f: F,
) -> Result<(), TensorError>
where
    A: Element,
    F: Fn(A, A) -> A,
{
    let (lhs, rhs) = resolve(op, a, b)?;
    if output.shapes() != lhs.shapes() {
        return Err(TensorError::ShapeMismatch {
            op,
            lhs: lhs.shapes(),
            rhs: output.shapes(),
        });
    }
    zip_into(lhs.as_slice(), rhs.as_slice(), output.as_mut_slice(), f);
    Ok(())
}

fn zip_into<A: Copy, F: Fn(A, A) -> A>(lhs: &[A], rhs: &[A], out: &mut [A], f: F) {
    for ((o, &x), &y) in out.iter_mut().zip(lhs).zip(rhs) {
        *o = f(x, y);
    }
}
