// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Canonical tensor shapes.
//!
//! Every [`crate::Tensor`] is physically a `(channels, rows, cols)` cube.
//! Its user-facing shape drops leading unit axes:
//!
//! ```text
//! channels == 1 && rows == 1  →  [cols]
//! channels == 1               →  [rows, cols]
//! otherwise                   →  [channels, rows, cols]
//! ```

use crate::TensorError;
use std::fmt;

/// Maximum number of axes a tensor shape may have.
pub const MAX_RANK: usize = 3;

/// The canonical (squeezed) 1–3 axis shape of a tensor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Shape {
    dims: Vec<usize>,
}

impl Shape {
    /// Builds the canonical shape of a `(channels, rows, cols)` cube.
    ///
    /// # Examples
    /// ```
    /// use tensor_core::Shape;
    /// assert_eq!(Shape::canonical(1, 1, 8).dims(), &[8]);
    /// assert_eq!(Shape::canonical(1, 4, 8).dims(), &[4, 8]);
    /// assert_eq!(Shape::canonical(3, 4, 8).dims(), &[3, 4, 8]);
    /// ```
    pub fn canonical(channels: usize, rows: usize, cols: usize) -> Self {
        let dims = if channels == 1 && rows == 1 {
            vec![cols]
        } else if channels == 1 {
            vec![rows, cols]
        } else {
            vec![channels, rows, cols]
        };
        Self { dims }
    }

    /// Builds a canonical shape from 1–3 dimensions.
    ///
    /// Missing leading axes are treated as 1, so `[1, 8]` canonicalises to
    /// `[8]`.
    ///
    /// # Errors
    /// Returns [`TensorError::InvalidShape`] for an empty slice or more than
    /// three dimensions.
    pub fn new(dims: &[usize]) -> Result<Self, TensorError> {
        let [channels, rows, cols] = Self::triple_of(dims)?;
        Ok(Self::canonical(channels, rows, cols))
    }

    /// Left-pads 1–3 dimensions with ones into a `[channels, rows, cols]`
    /// triple.
    ///
    /// # Errors
    /// Returns [`TensorError::InvalidShape`] for an empty slice or more than
    /// three dimensions.
    pub fn triple_of(dims: &[usize]) -> Result<[usize; 3], TensorError> {
        if dims.is_empty() || dims.len() > MAX_RANK {
            return Err(TensorError::InvalidShape {
                dims: dims.to_vec(),
                detail: format!("expected 1 to {MAX_RANK} dimensions"),
            });
        }
        let mut triple = [1usize; 3];
        triple[MAX_RANK - dims.len()..].copy_from_slice(dims);
        Ok(triple)
    }

    /// Returns the element count of a `[channels, rows, cols]` triple.
    ///
    /// # Errors
    /// Returns [`TensorError::InvalidShape`] if the count overflows `usize`.
    pub fn element_count(triple: [usize; 3]) -> Result<usize, TensorError> {
        triple
            .iter()
            .try_fold(1usize, |acc, &d| acc.checked_mul(d))
            .ok_or_else(|| TensorError::InvalidShape {
                dims: triple.to_vec(),
                detail: "element count overflows usize".into(),
            })
    }

    /// Returns the dimensions as a slice.
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Returns the number of dimensions (1, 2 or 3).
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Returns the total number of elements.
    pub fn num_elements(&self) -> usize {
        self.dims.iter().product()
    }

    /// Returns the `[channels, rows, cols]` triple this shape describes.
    pub fn to_triple(&self) -> [usize; 3] {
        let mut triple = [1usize; 3];
        triple[MAX_RANK - self.dims.len()..].copy_from_slice(&self.dims);
        triple
    }

    /// Computes row-major (C-order) strides over the full
    /// `[channels, rows, cols]` triple.
    ///
    /// The logical position of element `(c, r, col)` is
    /// `c * strides[0] + r * strides[1] + col * strides[2]`.
    pub fn strides(&self) -> [usize; 3] {
        let [_, rows, cols] = self.to_triple();
        [rows * cols, cols, 1]
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, d) in self.dims.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{d}")?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_squeeze() {
        assert_eq!(Shape::canonical(1, 1, 5).dims(), &[5]);
        assert_eq!(Shape::canonical(1, 3, 5).dims(), &[3, 5]);
        assert_eq!(Shape::canonical(2, 1, 5).dims(), &[2, 1, 5]);
        assert_eq!(Shape::canonical(2, 3, 5).dims(), &[2, 3, 5]);
    }

    #[test]
    fn test_new_pads_and_squeezes() {
        assert_eq!(Shape::new(&[1, 8]).unwrap().dims(), &[8]);
        assert_eq!(Shape::new(&[1, 1, 8]).unwrap().dims(), &[8]);
        assert_eq!(Shape::new(&[4, 8]).unwrap().dims(), &[4, 8]);
        assert_eq!(Shape::new(&[2, 4, 8]).unwrap().rank(), 3);
    }

    #[test]
    fn test_new_rejects_bad_rank() {
        assert!(Shape::new(&[]).is_err());
        assert!(Shape::new(&[1, 2, 3, 4]).is_err());
    }

    #[test]
    fn test_triple_and_strides() {
        let s = Shape::new(&[3, 4]).unwrap();
        assert_eq!(s.to_triple(), [1, 3, 4]);
        assert_eq!(s.strides(), [12, 4, 1]);
        assert_eq!(s.num_elements(), 12);
    }

    #[test]
    fn test_element_count_overflow() {
        assert_eq!(Shape::element_count([2, 3, 4]).unwrap(), 24);
        assert!(matches!(
            Shape::element_count([usize::MAX, 2, 1]),
            Err(TensorError::InvalidShape { .. })
        ));
    }

    #[test]
    fn test_display() {
        let s = Shape::canonical(2, 3, 4);
        assert_eq!(format!("{s}"), "[2, 3, 4]");
    }
}
