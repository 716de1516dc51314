// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # layer-ir
//!
//! Layer nodes for the accelerator graph IR and their shape contracts.
//!
//! This crate provides:
//! - [`LayerFeature`] — the raw, loader-facing bag of shape parameters.
//! - [`LinearLayerType`] / [`NonlinearLayerType`] — the layer type tags, with
//!   their numeric codes and display names.
//! - [`Layer`] — a named node whose payload is the closed sum type
//!   [`LayerKind`], one variant per concrete layer.
//! - [`FeatureDefect`] — every way a layer's own fields can be malformed.
//! - [`ActivationShape`] — what a layer consumes and produces, used by the
//!   model graph to check neighbouring layers against each other.
//!
//! # Design Goals
//! - Layers are immutable once built; there are no setters.
//! - Validation never panics and never errors: it reports defects.
//! - The bag constructor and the explicit constructors are interchangeable.
//!
//! # Example
//! ```
//! use layer_ir::{Layer, LayerFeature, LayerType, LinearLayerType};
//!
//! let explicit = Layer::conv("conv1", 3, 16, 32, 3, 1);
//! let bagged = Layer::from_feature(
//!     "conv1",
//!     LayerType::Linear(LinearLayerType::Conv),
//!     LayerFeature::conv(3, 16, 32, 3, 1),
//! );
//! assert_eq!(explicit.check_features(), bagged.check_features());
//! assert_eq!(explicit.param_count(), 3 * 16 * 3 * 3);
//! ```

mod defect;
mod error;
mod feature;
mod kind;
mod layer;
mod shape;

pub use defect::FeatureDefect;
pub use error::LayerError;
pub use feature::LayerFeature;
pub use kind::{LayerFamily, LayerType, LinearLayerType, NonlinearLayerType};
pub use layer::{
    Activation, BatchnormSpec, ConvSpec, DwConvSpec, GemmSpec, Layer, LayerKind, LinearSpec,
    NgConvSpec, PoolingSpec, ResidualSpec, Softmax1dSpec, Softmax2dSpec, TrConvSpec, VectorSpec,
};
pub use shape::ActivationShape;
