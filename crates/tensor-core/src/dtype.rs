// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Element data types declared by graph operands and attributes.

/// Enumerates the element types a graph description can declare.
///
/// The numbering follows the PNNX type codes so that descriptors exported
/// by the converter map one-to-one. Only [`DataType::Float32`] is backed by
/// runtime tensors and weight decoding; the rest are carried as declared
/// metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
pub enum DataType {
    /// Type not declared or not recognised.
    #[default]
    #[serde(rename = "unknown")]
    Unknown,
    /// 32-bit IEEE 754 floating point.
    #[serde(rename = "f32", alias = "float32")]
    Float32,
    /// 64-bit IEEE 754 floating point.
    #[serde(rename = "f64", alias = "float64")]
    Float64,
    /// 16-bit IEEE 754 floating point.
    #[serde(rename = "f16", alias = "float16")]
    Float16,
    /// 32-bit signed integer.
    #[serde(rename = "i32", alias = "int32")]
    Int32,
    /// 64-bit signed integer.
    #[serde(rename = "i64", alias = "int64")]
    Int64,
    /// 16-bit signed integer.
    #[serde(rename = "i16", alias = "int16")]
    Int16,
    /// 8-bit signed integer (quantised weights).
    #[serde(rename = "i8", alias = "int8")]
    Int8,
    /// 8-bit unsigned integer.
    #[serde(rename = "u8", alias = "uint8")]
    UInt8,
}

impl DataType {
    /// Returns the size of a single element in bytes, or `None` for
    /// [`DataType::Unknown`].
    pub fn size_bytes(self) -> Option<usize> {
        match self {
            DataType::Unknown => None,
            DataType::Float32 | DataType::Int32 => Some(4),
            DataType::Float64 | DataType::Int64 => Some(8),
            DataType::Float16 | DataType::Int16 => Some(2),
            DataType::Int8 | DataType::UInt8 => Some(1),
        }
    }

    /// Maps a PNNX numeric type code onto a data type.
    ///
    /// Unrecognised codes map to [`DataType::Unknown`].
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => DataType::Float32,
            2 => DataType::Float64,
            3 => DataType::Float16,
            4 => DataType::Int32,
            5 => DataType::Int64,
            6 => DataType::Int16,
            7 => DataType::Int8,
            8 => DataType::UInt8,
            _ => DataType::Unknown,
        }
    }

    /// Returns the PNNX numeric type code.
    pub fn code(self) -> i32 {
        match self {
            DataType::Unknown => 0,
            DataType::Float32 => 1,
            DataType::Float64 => 2,
            DataType::Float16 => 3,
            DataType::Int32 => 4,
            DataType::Int64 => 5,
            DataType::Int16 => 6,
            DataType::Int8 => 7,
            DataType::UInt8 => 8,
        }
    }

    /// Returns a human-readable label for this data type.
    pub fn as_str(self) -> &'static str {
        match self {
            DataType::Unknown => "unknown",
            DataType::Float32 => "f32",
            DataType::Float64 => "f64",
            DataType::Float16 => "f16",
            DataType::Int32 => "i32",
            DataType::Int64 => "i64",
            DataType::Int16 => "i16",
            DataType::Int8 => "i8",
            DataType::UInt8 => "u8",
        }
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
