// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Layer type tags and their code/name tables.
//!
//! Exported model tables identify layers by a family plus a small integer
//! code. The tables live here as pure functions on the enums so that
//! loaders and reporting tools share one mapping.

use std::fmt;

/// The two layer families: parametric compute and pointwise/structural transforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerFamily {
    Linear,
    Nonlinear,
}

impl fmt::Display for LayerFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Linear => "linear",
            Self::Nonlinear => "nonlinear",
        })
    }
}

/// Parametric compute layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinearLayerType {
    /// Dense matrix-vector multiply.
    Linear,
    Conv,
    /// Depthwise convolution.
    DwConv,
    /// Element-wise merge of two branches.
    Residual,
    Batchnorm,
    /// Transposed convolution.
    TrConv,
    /// Grouped convolution.
    NgConv,
    /// Vector dot-product.
    Vdp,
    /// Vector add.
    Vadd,
    /// General matrix-matrix multiply (`M×K · K×N`).
    Gemm,
}

impl LinearLayerType {
    /// All linear layer types, in code order.
    pub const ALL: [Self; 10] = [
        Self::Linear,
        Self::Conv,
        Self::DwConv,
        Self::Residual,
        Self::Batchnorm,
        Self::TrConv,
        Self::NgConv,
        Self::Vdp,
        Self::Vadd,
        Self::Gemm,
    ];

    /// Looks up a type by its numeric code (`0` = Linear … `9` = GEMM).
    pub fn from_code(code: i32) -> Option<Self> {
        usize::try_from(code)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
    }

    /// Returns the numeric code of this type.
    pub fn code(&self) -> i32 {
        *self as i32
    }

    /// Parses a layer type name, accepting the display names and common aliases.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "linear" | "mvm" | "fc" | "dense" => Some(Self::Linear),
            "conv" | "conv2d" => Some(Self::Conv),
            "dwconv" | "depthwise" | "depthwise_conv" => Some(Self::DwConv),
            "residual" | "element_sum" | "add" => Some(Self::Residual),
            "batchnorm" | "bn" | "batch_norm" => Some(Self::Batchnorm),
            "trconv" | "deconv" | "transposed_conv" => Some(Self::TrConv),
            "ngconv" | "group_conv" | "grouped_conv" => Some(Self::NgConv),
            "vdp" | "dot" => Some(Self::Vdp),
            "vadd" => Some(Self::Vadd),
            "gemm" | "mmm" | "matmul" => Some(Self::Gemm),
            _ => None,
        }
    }

    /// Returns the display name used in exported model tables.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Linear => "Linear",
            Self::Conv => "CONV",
            Self::DwConv => "DWCONV",
            Self::Residual => "Residual",
            Self::Batchnorm => "Batchnorm",
            Self::TrConv => "TRCONV",
            Self::NgConv => "NGCONV",
            Self::Vdp => "VDP",
            Self::Vadd => "VADD",
            Self::Gemm => "GEMM",
        }
    }
}

impl fmt::Display for LinearLayerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pointwise and structural transforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NonlinearLayerType {
    Relu,
    Tanh,
    Sigmoid,
    Pooling,
    Softmax1d,
    Softmax2d,
}

impl NonlinearLayerType {
    /// All nonlinear layer types, in code order.
    pub const ALL: [Self; 6] = [
        Self::Relu,
        Self::Tanh,
        Self::Sigmoid,
        Self::Pooling,
        Self::Softmax1d,
        Self::Softmax2d,
    ];

    /// Looks up a type by its numeric code (`0` = relu … `5` = softmax2d).
    pub fn from_code(code: i32) -> Option<Self> {
        usize::try_from(code)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
    }

    /// Returns the numeric code of this type.
    pub fn code(&self) -> i32 {
        *self as i32
    }

    /// Parses a layer type name, accepting the display names and common aliases.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "relu" => Some(Self::Relu),
            "tanh" => Some(Self::Tanh),
            "sigmoid" => Some(Self::Sigmoid),
            "pooling" | "pool" | "maxpool" | "avgpool" => Some(Self::Pooling),
            "softmax1d" | "softmax" => Some(Self::Softmax1d),
            "softmax2d" => Some(Self::Softmax2d),
            _ => None,
        }
    }

    /// Returns the display name used in exported model tables.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Relu => "relu",
            Self::Tanh => "tanh",
            Self::Sigmoid => "sigmoid",
            Self::Pooling => "pooling",
            Self::Softmax1d => "softmax1d",
            Self::Softmax2d => "softmax2d",
        }
    }

    /// Returns `true` for the element-wise activation functions.
    pub fn is_activation(&self) -> bool {
        matches!(self, Self::Relu | Self::Tanh | Self::Sigmoid)
    }
}

impl fmt::Display for NonlinearLayerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A layer type tag from either family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerType {
    Linear(LinearLayerType),
    Nonlinear(NonlinearLayerType),
}

impl LayerType {
    /// Returns the family this type belongs to.
    pub fn family(&self) -> LayerFamily {
        match self {
            Self::Linear(_) => LayerFamily::Linear,
            Self::Nonlinear(_) => LayerFamily::Nonlinear,
        }
    }

    /// Looks up a type by family and numeric code.
    pub fn from_code(family: LayerFamily, code: i32) -> Option<Self> {
        match family {
            LayerFamily::Linear => LinearLayerType::from_code(code).map(Self::Linear),
            LayerFamily::Nonlinear => NonlinearLayerType::from_code(code).map(Self::Nonlinear),
        }
    }

    /// Parses a name from either family; linear names are tried first.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        LinearLayerType::from_str_loose(s)
            .map(Self::Linear)
            .or_else(|| NonlinearLayerType::from_str_loose(s).map(Self::Nonlinear))
    }

    /// Returns the display name of the underlying type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Linear(t) => t.as_str(),
            Self::Nonlinear(t) => t.as_str(),
        }
    }
}

impl From<LinearLayerType> for LayerType {
    fn from(t: LinearLayerType) -> Self {
        Self::Linear(t)
    }
}

impl From<NonlinearLayerType> for LayerType {
    fn from(t: NonlinearLayerType) -> Self {
        Self::Nonlinear(t)
    }
}

impl fmt::Display for LayerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
