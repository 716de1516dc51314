// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for layer construction.

use crate::LayerFamily;

/// Errors that can occur when building a [`crate::Layer`] from loader input.
///
/// Shape problems are not errors: a layer with bad fields is still built
/// and reports its defects through [`crate::Layer::feature_defects`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayerError {
    /// A numeric layer type code does not name any known layer.
    #[error("unknown {family} layer type code {code}")]
    UnknownLayerType { family: LayerFamily, code: i32 },

    /// A layer type name could not be recognised.
    #[error("unrecognised layer type '{0}'")]
    UnknownLayerName(String),
}
