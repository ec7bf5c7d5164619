// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Core tensor type and view abstractions.
//!
//! # Memory Layout
//! A tensor is a `(channels, rows, cols)` cube stored as an `ndarray`
//! array of dimension `(rows, cols, channels)` in column-major (Fortran)
//! order:
//!
//! ```text
//! physical offset = row + col * rows + channel * rows * cols
//! ```
//!
//! Row is the fastest-varying physical index and channel the slowest, so
//! each channel is a contiguous column-major matrix. Callers, however,
//! usually think in logical row-major order (`channel, row, col`). The
//! `row_major` flags on [`Tensor::fill_from`], [`Tensor::reshape`] and
//! [`Tensor::flatten`] select which of the two orders an operation preserves.

use crate::{Shape, TensorError};
use ndarray::{
    s, Array3, ArrayBase, ArrayView2, ArrayView3, ArrayViewMut2, ArrayViewMut3, Axis, Data,
    DataMut, Ix3, OwnedRepr, RawData, ShapeBuilder, ViewRepr,
};
use rand::distributions::uniform::SampleUniform;
use rand::distributions::{Distribution, Uniform};
use rand::Rng;
use rand_distr::{Normal, StandardNormal};
use rayon::prelude::*;
use std::fmt;

/// Numeric element types a tensor can hold.
pub trait Element:
    num_traits::Num + Copy + PartialOrd + fmt::Debug + fmt::Display + Send + Sync + 'static
{
}

impl<T> Element for T where
    T: num_traits::Num + Copy + PartialOrd + fmt::Debug + fmt::Display + Send + Sync + 'static
{
}

/// A `(channels, rows, cols)` tensor over some `ndarray` storage `S`.
///
/// Use the aliases rather than this type directly:
/// - [`Tensor`] owns its buffer and supports every operation.
/// - [`TensorView`] / [`TensorViewMut`] borrow caller memory. They never
///   reallocate, so padding, reshaping and reviewing are unavailable on them.
pub struct TensorBase<S>
where
    S: RawData,
{
    data: ArrayBase<S, Ix3>,
    raw_shapes: Shape,
}

/// An owned tensor. `f32` is the element type used by the runtime.
pub type Tensor<T = f32> = TensorBase<OwnedRepr<T>>;

/// A read-only tensor over borrowed memory.
pub type TensorView<'a, T = f32> = TensorBase<ViewRepr<&'a T>>;

/// A mutable tensor over borrowed memory; writes land in the caller's buffer.
pub type TensorViewMut<'a, T = f32> = TensorBase<ViewRepr<&'a mut T>>;

/// Builds the column-major physical array for a `[channels, rows, cols]` triple.
fn physical<A>(values: Vec<A>, [channels, rows, cols]: [usize; 3]) -> Result<Array3<A>, TensorError> {
    let actual = values.len();
    Array3::from_shape_vec((rows, cols, channels).f(), values).map_err(|_| {
        TensorError::SizeMismatch {
            op: "layout",
            expected: channels.saturating_mul(rows).saturating_mul(cols),
            actual,
        }
    })
}

// ── Shape queries (any storage) ────────────────────────────────────

impl<A, S> TensorBase<S>
where
    S: RawData<Elem = A>,
{
    /// Returns the total number of elements.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the tensor holds no elements.
    pub fn is_empty(&self) -> bool {
        self.data.len() == 0
    }

    /// Returns the number of rows.
    pub fn rows(&self) -> usize {
        self.data.dim().0
    }

    /// Returns the number of columns.
    pub fn cols(&self) -> usize {
        self.data.dim().1
    }

    /// Returns the number of channels.
    pub fn channels(&self) -> usize {
        self.data.dim().2
    }

    /// Returns the physical `[channels, rows, cols]` triple.
    pub fn shapes(&self) -> [usize; 3] {
        let (rows, cols, channels) = self.data.dim();
        [channels, rows, cols]
    }

    /// Returns the canonical (squeezed) shape, 1 to 3 axes.
    pub fn raw_shapes(&self) -> &[usize] {
        debug_assert!((1..=crate::shape::MAX_RANK).contains(&self.raw_shapes.rank()));
        self.raw_shapes.dims()
    }

    /// Returns the canonical shape descriptor.
    pub fn shape(&self) -> &Shape {
        &self.raw_shapes
    }
}

// ── Read access ────────────────────────────────────────────────────

impl<A, S> TensorBase<S>
where
    S: Data<Elem = A>,
    A: Element,
{
    /// Returns the element at `(channel, row, col)`.
    ///
    /// # Panics
    /// Panics if any coordinate is out of bounds.
    pub fn at(&self, channel: usize, row: usize, col: usize) -> A {
        self.data[[row, col, channel]]
    }

    /// Returns one channel as a `rows × cols` matrix view.
    ///
    /// # Panics
    /// Panics if `channel >= self.channels()`.
    pub fn slice(&self, channel: usize) -> ArrayView2<'_, A> {
        self.data.index_axis(Axis(2), channel)
    }

    /// Returns the underlying `(rows, cols, channels)` array view.
    pub fn data(&self) -> ArrayView3<'_, A> {
        self.data.view()
    }

    /// Returns the physical buffer in storage order.
    pub fn as_slice(&self) -> &[A] {
        self.data
            .as_slice_memory_order()
            .expect("tensor storage is always contiguous")
    }

    /// Copies the elements into a new owned tensor with the same shape.
    pub fn to_owned(&self) -> Tensor<A> {
        TensorBase {
            data: self.data.to_owned(),
            raw_shapes: self.raw_shapes.clone(),
        }
    }

    /// Returns the elements in logical row-major `(channel, row, col)` order.
    pub fn to_row_major_vec(&self) -> Vec<A> {
        let [channels, rows, cols] = self.shapes();
        let mut out = Vec::with_capacity(self.size());
        for c in 0..channels {
            for r in 0..rows {
                for col in 0..cols {
                    out.push(self.data[[r, col, c]]);
                }
            }
        }
        out
    }

    /// Logs every channel as a row-major matrix at `info` level.
    pub fn show(&self) {
        for c in 0..self.channels() {
            tracing::info!("channel {c}:\n{}", self.slice(c));
        }
    }
}

// ── Write access ───────────────────────────────────────────────────

impl<A, S> TensorBase<S>
where
    S: DataMut<Elem = A>,
    A: Element,
{
    /// Returns a mutable reference to the element at `(channel, row, col)`.
    ///
    /// # Panics
    /// Panics if any coordinate is out of bounds.
    pub fn at_mut(&mut self, channel: usize, row: usize, col: usize) -> &mut A {
        &mut self.data[[row, col, channel]]
    }

    /// Returns one channel as a mutable `rows × cols` matrix view.
    ///
    /// # Panics
    /// Panics if `channel >= self.channels()`.
    pub fn slice_mut(&mut self, channel: usize) -> ArrayViewMut2<'_, A> {
        self.data.index_axis_mut(Axis(2), channel)
    }

    /// Returns the physical buffer in storage order, mutably.
    pub fn as_mut_slice(&mut self) -> &mut [A] {
        self.data
            .as_slice_memory_order_mut()
            .expect("tensor storage is always contiguous")
    }

    /// Returns the physical buffer starting at `offset`.
    ///
    /// # Panics
    /// Panics if `offset > self.size()`.
    pub fn as_mut_slice_from(&mut self, offset: usize) -> &mut [A] {
        &mut self.as_mut_slice()[offset..]
    }

    /// Sets every element to `value`.
    pub fn fill(&mut self, value: A) {
        self.data.fill(value);
    }

    /// Copies `values` into the tensor.
    ///
    /// With `row_major == true` the values are read in logical
    /// `(channel, row, col)` order and each channel's row-major block is
    /// redistributed into the column-major slice. Otherwise they are copied
    /// straight into physical storage order.
    ///
    /// # Errors
    /// Returns [`TensorError::SizeMismatch`] if `values.len() != self.size()`.
    pub fn fill_from(&mut self, values: &[A], row_major: bool) -> Result<(), TensorError> {
        if values.len() != self.size() {
            return Err(TensorError::SizeMismatch {
                op: "fill",
                expected: self.size(),
                actual: values.len(),
            });
        }
        if self.is_empty() {
            return Ok(());
        }
        if row_major {
            let [_, rows, cols] = self.shapes();
            for (c, block) in values.chunks(rows * cols).enumerate() {
                let mut plane = self.data.index_axis_mut(Axis(2), c);
                for r in 0..rows {
                    for col in 0..cols {
                        plane[[r, col]] = block[r * cols + col];
                    }
                }
            }
        } else {
            self.as_mut_slice().copy_from_slice(values);
        }
        Ok(())
    }

    /// Sets every element to one.
    pub fn ones(&mut self) {
        self.fill(A::one());
    }

    /// Sets every element to zero.
    pub fn zeros(&mut self) {
        self.fill(A::zero());
    }

    /// Applies `op` to every element in place. No ordering is guaranteed.
    pub fn transform<F>(&mut self, op: F)
    where
        F: Fn(A) -> A,
    {
        self.data.mapv_inplace(op);
    }

    /// Fills the tensor with independent samples from `U[min, max)`.
    ///
    /// # Errors
    /// Returns [`TensorError::InvalidDistribution`] unless `min < max` and
    /// both the bounds and their difference are finite.
    pub fn randu(&mut self, min: A, max: A) -> Result<(), TensorError>
    where
        A: SampleUniform + num_traits::Float,
    {
        self.randu_with(&mut rand::thread_rng(), min, max)
    }

    /// Like [`randu`](Self::randu) with a caller-supplied generator.
    pub fn randu_with<R>(&mut self, rng: &mut R, min: A, max: A) -> Result<(), TensorError>
    where
        R: Rng + ?Sized,
        A: SampleUniform + num_traits::Float,
    {
        if !(min < max) {
            return Err(TensorError::InvalidDistribution(format!(
                "uniform range requires min < max, got [{min}, {max})"
            )));
        }
        if !min.is_finite() || !max.is_finite() || !(max - min).is_finite() {
            return Err(TensorError::InvalidDistribution(format!(
                "uniform range must be finite, got [{min}, {max})"
            )));
        }
        let dist = Uniform::<A>::new(min, max);
        for x in self.data.iter_mut() {
            *x = dist.sample(rng);
        }
        Ok(())
    }

    /// Fills the tensor with independent samples from `N(mean, std²)`.
    ///
    /// # Errors
    /// Returns [`TensorError::InvalidDistribution`] for a negative or
    /// non-finite standard deviation.
    pub fn randn(&mut self, mean: A, std: A) -> Result<(), TensorError>
    where
        A: num_traits::Float,
        StandardNormal: Distribution<A>,
    {
        self.randn_with(&mut rand::thread_rng(), mean, std)
    }

    /// Like [`randn`](Self::randn) with a caller-supplied generator.
    pub fn randn_with<R>(&mut self, rng: &mut R, mean: A, std: A) -> Result<(), TensorError>
    where
        R: Rng + ?Sized,
        A: num_traits::Float,
        StandardNormal: Distribution<A>,
    {
        let dist = Normal::new(mean, std)
            .map_err(|e| TensorError::InvalidDistribution(e.to_string()))?;
        for x in self.data.iter_mut() {
            *x = dist.sample(rng);
        }
        Ok(())
    }
}

// ── Owned tensors ──────────────────────────────────────────────────

impl<A: Element> Tensor<A> {
    /// Creates a zero-filled tensor of `channels × rows × cols`.
    ///
    /// # Examples
    /// ```
    /// use tensor_core::Tensor;
    /// let t: Tensor<f32> = Tensor::new(3, 224, 224);
    /// assert_eq!(t.size(), 3 * 224 * 224);
    /// assert_eq!(t.raw_shapes(), &[3, 224, 224]);
    /// ```
    pub fn new(channels: usize, rows: usize, cols: usize) -> Self {
        Self {
            data: Array3::zeros((rows, cols, channels).f()),
            raw_shapes: Shape::canonical(channels, rows, cols),
        }
    }

    /// Creates a zero-filled vector of `size` elements.
    pub fn with_size(size: usize) -> Self {
        Self::new(1, 1, size)
    }

    /// Creates a zero-filled single-channel matrix.
    pub fn matrix(rows: usize, cols: usize) -> Self {
        Self::new(1, rows, cols)
    }

    /// Creates a zero-filled tensor from a 1–3 axis shape.
    ///
    /// # Errors
    /// Returns [`TensorError::InvalidShape`] for an empty shape, more than
    /// three axes, or an element count that overflows `usize`.
    pub fn from_shape(dims: &[usize]) -> Result<Self, TensorError> {
        let triple = Shape::triple_of(dims)?;
        Shape::element_count(triple)?;
        let [channels, rows, cols] = triple;
        Ok(Self::new(channels, rows, cols))
    }

    /// Creates a tensor of shape `dims` and fills it from `values`
    /// (see [`fill_from`](Self::fill_from) for the `row_major` flag).
    pub fn from_values(dims: &[usize], values: &[A], row_major: bool) -> Result<Self, TensorError> {
        let mut tensor = Self::from_shape(dims)?;
        tensor.fill_from(values, row_major)?;
        Ok(tensor)
    }

    /// Grows the tensor by `pads = [top, bottom, left, right]`, filling the
    /// new border with `value`. Channels are unchanged.
    ///
    /// # Errors
    /// Returns [`TensorError::InvalidPadding`] unless `pads` has 4 entries.
    pub fn padding(&mut self, pads: &[usize], value: A) -> Result<(), TensorError> {
        let &[top, bottom, left, right] = pads else {
            return Err(TensorError::InvalidPadding { len: pads.len() });
        };
        let [channels, rows, cols] = self.shapes();
        let padded_rows = rows + top + bottom;
        let padded_cols = cols + left + right;

        let mut padded = Array3::from_elem((padded_rows, padded_cols, channels).f(), value);
        padded
            .slice_mut(s![top..top + rows, left..left + cols, ..])
            .assign(&self.data);

        self.data = padded;
        self.raw_shapes = Shape::canonical(channels, padded_rows, padded_cols);
        Ok(())
    }

    /// Changes the shape to `dims` (1–3 axes, same element count).
    ///
    /// With `row_major == false` the physical buffer is relabelled as is,
    /// which preserves physical order but not logical row-major order. With
    /// `row_major == true` the tensor is [reviewed](Self::review) so the
    /// logical row-major sequence survives the reshape.
    ///
    /// # Errors
    /// Returns [`TensorError::InvalidShape`] for a bad rank and
    /// [`TensorError::SizeMismatch`] if the element count differs.
    pub fn reshape(&mut self, dims: &[usize], row_major: bool) -> Result<(), TensorError> {
        let target = self.checked_target("reshape", dims)?;
        if row_major {
            self.review_into(target);
            return Ok(());
        }
        let empty = Array3::zeros((0, 0, 0).f());
        let buffer = std::mem::replace(&mut self.data, empty).into_raw_vec();
        self.data = physical(buffer, target)?;
        self.raw_shapes = Shape::canonical(target[0], target[1], target[2]);
        Ok(())
    }

    /// Reshapes to a single axis of `size()` elements.
    pub fn flatten(&mut self, row_major: bool) -> Result<(), TensorError> {
        let size = self.size();
        self.reshape(&[size], row_major)
    }

    /// Re-lays the tensor out as `dims` while preserving logical row-major
    /// order.
    ///
    /// The whole tensor is read as one row-major sequence over
    /// `(channel, row, col)` and that same sequence is written into the new
    /// shape, again row-major, then stored back column-major per channel.
    /// Destination channels are filled in parallel; each one only writes its
    /// own contiguous plane.
    ///
    /// # Errors
    /// Returns [`TensorError::InvalidShape`] for a bad rank and
    /// [`TensorError::SizeMismatch`] if the element count differs.
    pub fn review(&mut self, dims: &[usize]) -> Result<(), TensorError> {
        let target = self.checked_target("review", dims)?;
        self.review_into(target);
        Ok(())
    }

    /// Mutable access to the physical buffer starting at `offset`.
    ///
    /// Alias of [`as_mut_slice_from`](Self::as_mut_slice_from) kept for
    /// kernels that address raw storage.
    pub fn raw_ptr(&mut self, offset: usize) -> &mut [A] {
        self.as_mut_slice_from(offset)
    }

    fn checked_target(&self, op: &'static str, dims: &[usize]) -> Result<[usize; 3], TensorError> {
        let target = Shape::triple_of(dims)?;
        let count = Shape::element_count(target)?;
        if count != self.size() {
            return Err(TensorError::SizeMismatch {
                op,
                expected: self.size(),
                actual: count,
            });
        }
        Ok(target)
    }

    fn review_into(&mut self, target: [usize; 3]) {
        let [dst_channels, dst_rows, dst_cols] = target;
        let [_, src_rows, _] = self.shapes();
        let [src_plane, src_cols, _] = self.raw_shapes.strides();
        let dst_plane = dst_rows * dst_cols;

        let mut reviewed = vec![A::zero(); self.size()];
        if dst_plane > 0 {
            let src = self.as_slice();
            reviewed
                .par_chunks_mut(dst_plane)
                .enumerate()
                .for_each(|(dst_ch, plane)| {
                    for dst_col in 0..dst_cols {
                        for dst_row in 0..dst_rows {
                            let pos = dst_ch * dst_plane + dst_row * dst_cols + dst_col;
                            let src_ch = pos / src_plane;
                            let src_row = (pos % src_plane) / src_cols;
                            let src_col = pos % src_cols;
                            plane[dst_row + dst_col * dst_rows] =
                                src[src_row + src_col * src_rows + src_ch * src_plane];
                        }
                    }
                });
        }

        self.data = Array3::from_shape_vec((dst_rows, dst_cols, dst_channels).f(), reviewed)
            .expect("reviewed buffer matches target size");
        self.raw_shapes = Shape::canonical(dst_channels, dst_rows, dst_cols);
    }
}

impl<A: Element> Clone for Tensor<A> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            raw_shapes: self.raw_shapes.clone(),
        }
    }
}

// ── Views over caller memory ───────────────────────────────────────

impl<'a, A: Element> TensorView<'a, A> {
    /// Wraps `values` (physical column-major order) as a tensor of shape
    /// `dims` without copying.
    ///
    /// # Errors
    /// Returns [`TensorError::InvalidShape`] for a bad rank and
    /// [`TensorError::SizeMismatch`] if `values.len()` differs from the
    /// shape's element count.
    pub fn from_slice(values: &'a [A], dims: &[usize]) -> Result<Self, TensorError> {
        let [channels, rows, cols] = view_triple(values.len(), dims)?;
        let data = ArrayView3::from_shape((rows, cols, channels).f(), values).map_err(|_| {
            TensorError::SizeMismatch {
                op: "view",
                expected: channels.saturating_mul(rows).saturating_mul(cols),
                actual: values.len(),
            }
        })?;
        Ok(Self {
            data,
            raw_shapes: Shape::canonical(channels, rows, cols),
        })
    }
}

impl<'a, A: Element> TensorViewMut<'a, A> {
    /// Wraps `values` (physical column-major order) as a mutable tensor of
    /// shape `dims` without copying. Writes go straight to `values`.
    ///
    /// # Errors
    /// Same as [`TensorView::from_slice`].
    pub fn from_slice(values: &'a mut [A], dims: &[usize]) -> Result<Self, TensorError> {
        let len = values.len();
        let [channels, rows, cols] = view_triple(len, dims)?;
        let data = ArrayViewMut3::from_shape((rows, cols, channels).f(), values).map_err(|_| {
            TensorError::SizeMismatch {
                op: "view",
                expected: channels.saturating_mul(rows).saturating_mul(cols),
                actual: len,
            }
        })?;
        Ok(Self {
            data,
            raw_shapes: Shape::canonical(channels, rows, cols),
        })
    }
}

fn view_triple(len: usize, dims: &[usize]) -> Result<[usize; 3], TensorError> {
    let triple = Shape::triple_of(dims)?;
    let expected = Shape::element_count(triple)?;
    if expected != len {
        return Err(TensorError::SizeMismatch {
            op: "view",
            expected,
            actual: len,
        });
    }
    Ok(triple)
}

// ── Flat indexing and formatting ───────────────────────────────────

impl<A, S> std::ops::Index<usize> for TensorBase<S>
where
    S: Data<Elem = A>,
    A: Element,
{
    type Output = A;

    /// Element at physical `offset`.
    fn index(&self, offset: usize) -> &A {
        &self.as_slice()[offset]
    }
}

impl<A, S> std::ops::IndexMut<usize> for TensorBase<S>
where
    S: DataMut<Elem = A>,
    A: Element,
{
    fn index_mut(&mut self, offset: usize) -> &mut A {
        &mut self.as_mut_slice()[offset]
    }
}

impl<A, S> fmt::Debug for TensorBase<S>
where
    S: Data<Elem = A>,
    A: Element,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tensor")
            .field("shape", &self.raw_shapes)
            .field("size", &self.size())
            .finish()
    }
}

impl<A, S> fmt::Display for TensorBase<S>
where
    S: Data<Elem = A>,
    A: Element,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in 0..self.channels() {
            writeln!(f, "channel {c}:")?;
            writeln!(f, "{}", self.slice(c))?;
        }
        Ok(())
    }
}
