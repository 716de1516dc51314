// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for model construction.
//!
//! Only structural mistakes are errors. Shape problems are collected by
//! [`crate::Model::check_model`] into a [`crate::ValidationReport`].

use crate::NodeId;

/// Errors that can occur when building a model graph.
///
/// A failed call leaves the model exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// A layer with this name already exists in the model.
    #[error("duplicate layer name '{name}'")]
    DuplicateName { name: String },

    /// An edge endpoint does not refer to an existing node.
    #[error("unknown node {id}")]
    UnknownNode { id: NodeId },

    #[error("self-loop on node {id}")]
    SelfLoop { id: NodeId },

    /// The edge would close a path back to one of its ancestors.
    #[error("edge {from} -> {to} would create a cycle")]
    Cycle { from: NodeId, to: NodeId },

    /// The validation configuration could not be read or parsed.
    #[error("configuration error: {0}")]
    Config(String),
}
