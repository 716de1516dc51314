// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Aggregate layer and parameter counts of a model.

use layer_ir::{Layer, LayerFamily};

/// Summary counts derived from a model's current nodes.
///
/// Always recomputed from the graph; never stored incrementally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct ModelParam {
    pub linear_layers: usize,
    pub nonlinear_layers: usize,
    /// Sum of every layer's own parameter count, saturating at `u64::MAX`.
    pub param_nums: u64,
}

impl ModelParam {
    /// Computes the counts over a set of layers.
    pub fn from_layers<'a>(layers: impl IntoIterator<Item = &'a Layer>) -> Self {
        layers
            .into_iter()
            .fold(Self::default(), |mut acc, layer| {
                match layer.family() {
                    LayerFamily::Linear => acc.linear_layers += 1,
                    LayerFamily::Nonlinear => acc.nonlinear_layers += 1,
                }
                acc.param_nums = acc.param_nums.saturating_add(layer.param_count());
                acc
            })
    }

    /// Total number of layers counted.
    pub fn total_layers(&self) -> usize {
        self.linear_layers + self.nonlinear_layers
    }

    /// Estimated weight storage in bytes at `bytes_per_param` bytes each.
    pub fn weight_bytes(&self, bytes_per_param: u64) -> u64 {
        self.param_nums.saturating_mul(bytes_per_param)
    }
}
