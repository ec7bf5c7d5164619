// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Persisted weight attributes and their typed decode.

use crate::RuntimeError;
use tensor_core::DataType;

/// Element types a weight buffer can be decoded into.
///
/// Only `f32` is implemented; decode is gated on the declared
/// [`DataType`] matching [`WeightElement::DATA_TYPE`] exactly.
pub trait WeightElement: Copy + Sized {
    /// Declared type this element decodes from.
    const DATA_TYPE: DataType;

    /// Decodes one element from exactly `size_of::<Self>()` little-endian bytes.
    fn from_le_slice(bytes: &[u8]) -> Self;
}

impl WeightElement for f32 {
    const DATA_TYPE: DataType = DataType::Float32;

    fn from_le_slice(bytes: &[u8]) -> Self {
        f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
    }
}

/// Raw weight bytes for one operator attribute, plus declared shape and type.
///
/// A releasing [`get`](Self::get) takes the buffer out and marks the
/// attribute consumed; decoding it again is [`RuntimeError::WeightConsumed`].
#[derive(Debug, Clone, Default)]
pub struct RuntimeAttribute {
    /// Raw little-endian bytes.
    pub weight_data: Vec<u8>,
    /// Declared shape.
    pub shape: Vec<i32>,
    /// Declared element type.
    pub dtype: DataType,
    consumed: bool,
}

impl RuntimeAttribute {
    /// Creates an attribute holding `weight_data`.
    pub fn new(weight_data: Vec<u8>, shape: Vec<i32>, dtype: DataType) -> Self {
        Self {
            weight_data,
            shape,
            dtype,
            consumed: false,
        }
    }

    /// Returns `true` once a releasing decode has taken the buffer.
    pub fn is_consumed(&self) -> bool {
        self.consumed
    }

    /// Decodes the buffer into `T`s in buffer order.
    ///
    /// With `release == true` the raw buffer is dropped afterwards and the
    /// attribute is marked consumed; otherwise it is left untouched.
    ///
    /// # Errors
    /// - [`RuntimeError::WeightConsumed`] after a previous releasing decode.
    /// - [`RuntimeError::EmptyWeight`] if there are no bytes.
    /// - [`RuntimeError::UnknownWeightType`] if the declared type is unknown
    ///   or is not `T`'s type.
    /// - [`RuntimeError::WeightSizeMismatch`] if the length is not a
    ///   multiple of `size_of::<T>()`.
    ///
    /// # Examples
    /// ```
    /// use runtime::RuntimeAttribute;
    /// use tensor_core::DataType;
    ///
    /// let mut attr = RuntimeAttribute::new(1.5f32.to_le_bytes().to_vec(), vec![1], DataType::Float32);
    /// assert_eq!(attr.get::<f32>(false).unwrap(), vec![1.5]);
    /// ```
    pub fn get<T: WeightElement>(&mut self, release: bool) -> Result<Vec<T>, RuntimeError> {
        if self.consumed {
            return Err(RuntimeError::WeightConsumed);
        }
        if self.weight_data.is_empty() {
            return Err(RuntimeError::EmptyWeight);
        }
        if self.dtype == DataType::Unknown {
            return Err(RuntimeError::UnknownWeightType {
                declared: self.dtype,
                requested: T::DATA_TYPE,
            });
        }
        let elem_size = std::mem::size_of::<T>();
        if self.weight_data.len() % elem_size != 0 {
            return Err(RuntimeError::WeightSizeMismatch {
                len: self.weight_data.len(),
                elem_size,
            });
        }
        if self.dtype != T::DATA_TYPE {
            return Err(RuntimeError::UnknownWeightType {
                declared: self.dtype,
                requested: T::DATA_TYPE,
            });
        }

        let values = self
            .weight_data
            .chunks_exact(elem_size)
            .map(T::from_le_slice)
            .collect();

        if release {
            self.weight_data = Vec::new();
            self.consumed = true;
        }
        Ok(values)
    }
}
