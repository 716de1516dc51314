// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The raw parameter bag a loader fills in for every layer.

/// Raw shape parameters for a single layer.
///
/// Which fields are meaningful depends on the layer variant; see
/// [`crate::Layer::from_feature`] for the mapping. Values are kept signed
/// so that malformed input survives construction and is reported by
/// validation instead of being silently clamped.
///
/// The short parameter codes used by exported model tables (`IC`, `OC`,
/// `FS`, ...) are accepted as aliases when deserializing.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(default)]
pub struct LayerFeature {
    /// Input channel count (also the generic "first dimension").
    #[serde(alias = "IC")]
    pub input_channels: i32,
    /// Output channel count (also the generic "second dimension").
    #[serde(alias = "OC")]
    pub output_channels: i32,
    /// Spatial extent of the (square) input feature map.
    #[serde(alias = "FS")]
    pub feature_size: i32,
    /// Spatial extent of the (square) kernel.
    #[serde(alias = "KS")]
    pub kernel_size: i32,
    #[serde(alias = "STR")]
    pub stride: i32,
    /// Whether the layer is followed by relu, or relu and pooling.
    #[serde(alias = "RP")]
    pub relu_or_pooling: i32,
    /// Index of the layer appended onto this one (second residual branch).
    #[serde(alias = "APD")]
    pub appending_index: i32,
    /// Zero padding of a transposed convolution.
    #[serde(alias = "PAD")]
    pub padding: i32,
    /// Group count of a grouped convolution.
    #[serde(alias = "GRP")]
    pub groups: i32,
    /// First residual branch.
    #[serde(alias = "SRC")]
    pub source_index: i32,
}

impl LayerFeature {
    /// Bag for a convolution-shaped layer.
    pub fn conv(
        input_channels: i32,
        output_channels: i32,
        feature_size: i32,
        kernel_size: i32,
        stride: i32,
    ) -> Self {
        Self {
            input_channels,
            output_channels,
            feature_size,
            kernel_size,
            stride,
            ..Self::default()
        }
    }

    /// Bag for a layer described by a channel count and a feature size.
    pub fn feature_map(channels: i32, feature_size: i32) -> Self {
        Self {
            input_channels: channels,
            feature_size,
            ..Self::default()
        }
    }

    /// Bag for a layer described by a single vector dimension.
    pub fn vector(dimension: i32) -> Self {
        Self {
            input_channels: dimension,
            ..Self::default()
        }
    }
}
