// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Operator hyperparameters.
//!
//! A [`Parameter`] is one value from an operator's configuration dictionary
//! (kernel size, stride, activation name, ...). The set of kinds is closed;
//! reading a parameter as the wrong kind yields `None` rather than a
//! coerced value.
//!
//! In JSON a parameter is written untagged:
//!
//! ```text
//! null         → Unknown
//! true         → Bool
//! 3            → Int
//! 0.5          → Float
//! "relu"       → String
//! [1, 2]       → IntArray
//! [0.5, 1.5]   → FloatArray
//! ["a", "b"]   → StringArray
//! ```

use std::fmt;

/// The kind of a [`Parameter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterType {
    Unknown,
    Bool,
    Int,
    Float,
    String,
    IntArray,
    FloatArray,
    StringArray,
}

impl ParameterType {
    /// Returns a human-readable label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::String => "string",
            Self::IntArray => "int[]",
            Self::FloatArray => "float[]",
            Self::StringArray => "string[]",
        }
    }
}

impl fmt::Display for ParameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single operator hyperparameter.
///
/// Variant order matters for untagged deserialization: integers are tried
/// before floats, so `3` is an `Int` and `3.0` a `Float`.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum Parameter {
    #[default]
    Unknown,
    Bool(bool),
    Int(i32),
    Float(f32),
    String(String),
    IntArray(Vec<i32>),
    FloatArray(Vec<f32>),
    StringArray(Vec<String>),
}

impl Parameter {
    /// Returns the kind tag of this parameter.
    pub fn kind(&self) -> ParameterType {
        match self {
            Self::Unknown => ParameterType::Unknown,
            Self::Bool(_) => ParameterType::Bool,
            Self::Int(_) => ParameterType::Int,
            Self::Float(_) => ParameterType::Float,
            Self::String(_) => ParameterType::String,
            Self::IntArray(_) => ParameterType::IntArray,
            Self::FloatArray(_) => ParameterType::FloatArray,
            Self::StringArray(_) => ParameterType::StringArray,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_int_array(&self) -> Option<&[i32]> {
        match self {
            Self::IntArray(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_float_array(&self) -> Option<&[f32]> {
        match self {
            Self::FloatArray(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str_array(&self) -> Option<&[String]> {
        match self {
            Self::StringArray(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => f.write_str("?"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::String(v) => write!(f, "{v:?}"),
            Self::IntArray(v) => write!(f, "{v:?}"),
            Self::FloatArray(v) => write!(f, "{v:?}"),
            Self::StringArray(v) => write!(f, "{v:?}"),
        }
    }
}
