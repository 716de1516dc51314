// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Activation shapes exchanged between neighbouring layers.

use std::fmt;

/// The shape of the activation a layer consumes or produces.
///
/// Feature maps are square: `size` is both height and width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationShape {
    FeatureMap { channels: usize, size: usize },
    Vector { len: usize },
    Matrix { rows: usize, cols: usize },
}

impl ActivationShape {
    /// Returns the total number of elements, saturating at `usize::MAX`.
    pub fn num_elements(&self) -> usize {
        match *self {
            Self::FeatureMap { channels, size } => {
                channels.saturating_mul(size).saturating_mul(size)
            }
            Self::Vector { len } => len,
            Self::Matrix { rows, cols } => rows.saturating_mul(cols),
        }
    }

    /// Returns the spatial size for feature maps, `None` otherwise.
    pub fn spatial_size(&self) -> Option<usize> {
        match *self {
            Self::FeatureMap { size, .. } => Some(size),
            _ => None,
        }
    }

    /// Returns `true` if an activation of this shape can be fed into a
    /// layer expecting `input`.
    ///
    /// Shapes must be equal, except that anything may be flattened into a
    /// vector holding the same number of elements.
    pub fn feeds(&self, input: &ActivationShape) -> bool {
        if self == input {
            return true;
        }
        matches!(input, Self::Vector { len } if *len == self.num_elements())
    }

    /// Returns `true` if two activations can be concatenated along channels.
    pub fn concatenates_with(&self, other: &ActivationShape) -> bool {
        match (self.spatial_size(), other.spatial_size()) {
            (Some(a), Some(b)) => a == b,
            _ => self.feeds(other),
        }
    }
}

impl fmt::Display for ActivationShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FeatureMap { channels, size } => write!(f, "[{channels}, {size}, {size}]"),
            Self::Vector { len } => write!(f, "[{len}]"),
            Self::Matrix { rows, cols } => write!(f, "[{rows}, {cols}]"),
        }
    }
}
