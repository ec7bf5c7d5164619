// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Operands: named tensor slots shared between operators.
//!
//! An operand starts **uninitialized** (no tensors). The first
//! initialization pass allocates one zeroed tensor per batch item; every
//! later pass only checks that the allocated tensors still match the
//! descriptor. Storage is never reallocated once it exists.

use crate::RuntimeError;
use tensor_core::{DataType, Shape, Tensor};

/// Stable handle to an operand inside a [`crate::RuntimeGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OperandId(pub(crate) usize);

impl OperandId {
    /// Returns the arena index.
    pub fn index(self) -> usize {
        self.0
    }
}

/// A parsed `[batch, item dims...]` shape descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchLayout {
    /// Number of tensors in the batch.
    pub batch: usize,
    /// `[channels, rows, cols]` of each tensor.
    pub item: [usize; 3],
}

impl BatchLayout {
    /// Parses a descriptor declared for operand `operand`.
    ///
    /// The element type must be `f32`, the batch at least one, and the item
    /// shape 1–3 positive dimensions.
    ///
    /// # Errors
    /// Returns [`RuntimeError::OperandShape`] describing the first problem.
    pub fn parse(operand: &str, shapes: &[i32], dtype: DataType) -> Result<Self, RuntimeError> {
        let fail = |detail: String| RuntimeError::OperandShape {
            operand: operand.to_string(),
            detail,
        };

        if dtype != DataType::Float32 {
            return Err(fail(format!("element type {dtype} is not supported, expected f32")));
        }
        let Some((&batch, item)) = shapes.split_first() else {
            return Err(fail("shape descriptor is empty".into()));
        };
        if batch < 1 {
            return Err(fail(format!("batch size must be at least 1, got {batch}")));
        }
        if let Some(&bad) = item.iter().find(|&&d| d < 1) {
            return Err(fail(format!("dimension {bad} in {shapes:?} is not positive")));
        }

        let dims: Vec<usize> = item.iter().map(|&d| d as usize).collect();
        let item = Shape::triple_of(&dims).map_err(|e| fail(e.to_string()))?;
        Ok(Self {
            batch: batch as usize,
            item,
        })
    }
}

/// A named slot holding one tensor per batch item.
///
/// The name is that of the operator producing the operand; consumers key
/// their input map by it.
#[derive(Debug, Clone)]
pub struct RuntimeOperand {
    /// Producer operator name.
    pub name: String,
    /// Declared shape: `[batch, item dims...]`.
    pub shapes: Vec<i32>,
    /// Declared element type.
    pub dtype: DataType,
    /// One tensor per batch item, empty until initialized.
    pub datas: Vec<Tensor<f32>>,
}

impl RuntimeOperand {
    /// Creates an uninitialized operand.
    pub fn new(name: impl Into<String>, shapes: Vec<i32>, dtype: DataType) -> Self {
        Self {
            name: name.into(),
            shapes,
            dtype,
            datas: Vec::new(),
        }
    }

    /// Returns `true` once storage has been allocated.
    pub fn is_initialized(&self) -> bool {
        !self.datas.is_empty()
    }

    /// Parses this operand's own descriptor.
    pub fn layout(&self) -> Result<BatchLayout, RuntimeError> {
        BatchLayout::parse(&self.name, &self.shapes, self.dtype)
    }

    /// Allocates storage for `layout` or, if storage already exists,
    /// checks it against `layout`.
    ///
    /// Returns `true` if tensors were allocated by this call.
    ///
    /// # Errors
    /// Returns [`RuntimeError::OperandShape`] if existing storage has a
    /// different batch count or item shape.
    pub fn init_storage(&mut self, layout: &BatchLayout) -> Result<bool, RuntimeError> {
        let [channels, rows, cols] = layout.item;
        if self.datas.is_empty() {
            self.datas = (0..layout.batch)
                .map(|_| Tensor::new(channels, rows, cols))
                .collect();
            tracing::debug!(
                operand = %self.name,
                batch = layout.batch,
                item = ?layout.item,
                "allocated operand storage"
            );
            return Ok(true);
        }

        if self.datas.len() != layout.batch {
            return Err(RuntimeError::OperandShape {
                operand: self.name.clone(),
                detail: format!(
                    "holds {} tensors but descriptor declares batch {}",
                    self.datas.len(),
                    layout.batch
                ),
            });
        }
        if let Some((i, t)) = self
            .datas
            .iter()
            .enumerate()
            .find(|(_, t)| t.shapes() != layout.item)
        {
            return Err(RuntimeError::OperandShape {
                operand: self.name.clone(),
                detail: format!(
                    "tensor {i} has shape {:?} but descriptor declares {:?}",
                    t.shapes(),
                    layout.item
                ),
            });
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_parse() {
        let l = BatchLayout::parse("x", &[4, 3, 32, 32], DataType::Float32).unwrap();
        assert_eq!(l.batch, 4);
        assert_eq!(l.item, [3, 32, 32]);

        let l = BatchLayout::parse("x", &[1, 64, 10], DataType::Float32).unwrap();
        assert_eq!(l.item, [1, 64, 10]);

        let l = BatchLayout::parse("x", &[2, 10], DataType::Float32).unwrap();
        assert_eq!(l.item, [1, 1, 10]);
    }

    #[test]
    fn test_layout_rejects_bad_descriptors() {
        let bad: &[(&[i32], DataType)] = &[
            (&[], DataType::Float32),
            (&[1], DataType::Float32),
            (&[0, 3, 4], DataType::Float32),
            (&[1, 3, -1], DataType::Float32),
            (&[1, 2, 3, 4, 5], DataType::Float32),
            (&[1, 3, 4], DataType::Int8),
        ];
        for (shapes, dtype) in bad {
            assert!(
                matches!(
                    BatchLayout::parse("x", shapes, *dtype),
                    Err(RuntimeError::OperandShape { .. })
                ),
                "{shapes:?} {dtype} should be rejected"
            );
        }
    }

    #[test]
    fn test_first_init_allocates() {
        let mut operand = RuntimeOperand::new("conv", vec![3, 3, 32, 32], DataType::Float32);
        assert!(!operand.is_initialized());
        let layout = operand.layout().unwrap();
        assert!(operand.init_storage(&layout).unwrap());
        assert_eq!(operand.datas.len(), 3);
        for t in &operand.datas {
            assert_eq!(t.shapes(), [3, 32, 32]);
            assert!(t.as_slice().iter().all(|&x| x == 0.0));
        }
    }

    #[test]
    fn test_second_init_revalidates_without_reallocating() {
        let mut operand = RuntimeOperand::new("conv", vec![2, 4, 8], DataType::Float32);
        let layout = operand.layout().unwrap();
        operand.init_storage(&layout).unwrap();
        operand.datas[1].fill(7.0);

        assert!(!operand.init_storage(&layout).unwrap());
        assert!(operand.datas[1].as_slice().iter().all(|&x| x == 7.0));
    }

    #[test]
    fn test_changed_descriptor_is_rejected() {
        let mut operand = RuntimeOperand::new("conv", vec![2, 4, 8], DataType::Float32);
        operand.init_storage(&operand.layout().unwrap()).unwrap();

        let wider = BatchLayout::parse("conv", &[2, 4, 16], DataType::Float32).unwrap();
        assert!(matches!(
            operand.init_storage(&wider),
            Err(RuntimeError::OperandShape { .. })
        ));

        let bigger_batch = BatchLayout::parse("conv", &[3, 4, 8], DataType::Float32).unwrap();
        assert!(matches!(
            operand.init_storage(&bigger_batch),
            Err(RuntimeError::OperandShape { .. })
        ));
        assert_eq!(operand.datas.len(), 2);
    }
}
