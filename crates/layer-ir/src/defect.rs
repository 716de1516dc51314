// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Defects a layer's own fields can exhibit.

/// A single well-formedness problem found in a layer's stored fields.
///
/// Defects are findings, not failures: a layer collects all of them so
/// that exploration tools see the full list in one pass.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, thiserror::Error)]
pub enum FeatureDefect {
    /// A shape parameter that must be positive is zero or negative.
    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: i32 },

    /// The kernel does not fit inside the input feature map.
    #[error("kernel_size {kernel} exceeds feature_size {feature}")]
    KernelExceedsFeature { kernel: i32, feature: i32 },

    #[error("padding must not be negative, got {value}")]
    NegativePadding { value: i32 },

    /// Padding of a transposed convolution must be smaller than its kernel.
    #[error("padding {padding} must be smaller than kernel_size {kernel}")]
    PaddingTooLarge { padding: i32, kernel: i32 },

    /// The group count does not evenly divide a channel count.
    #[error("groups {groups} does not divide {field} {value}")]
    GroupsNotDividing {
        groups: i32,
        field: &'static str,
        value: i32,
    },

    /// A residual merge names the same layer for both branches.
    #[error("residual branches both reference layer {index}")]
    IdenticalSources { index: i32 },

    #[error("residual branch index must not be negative, got {value}")]
    NegativeSource { value: i32 },

    /// The layer's output would have no elements.
    #[error("layer produces an empty output")]
    EmptyOutput,
}

/// Pushes a [`FeatureDefect::NonPositive`] for every named field that is `<= 0`.
pub(crate) fn require_positive(defects: &mut Vec<FeatureDefect>, fields: &[(&'static str, i32)]) {
    for &(field, value) in fields {
        if value <= 0 {
            defects.push(FeatureDefect::NonPositive { field, value });
        }
    }
}

/// Pushes a [`FeatureDefect::KernelExceedsFeature`] when both values are
/// positive and the kernel is larger than the feature map.
pub(crate) fn require_kernel_fits(defects: &mut Vec<FeatureDefect>, kernel: i32, feature: i32) {
    if kernel > 0 && feature > 0 && kernel > feature {
        defects.push(FeatureDefect::KernelExceedsFeature { kernel, feature });
    }
}
