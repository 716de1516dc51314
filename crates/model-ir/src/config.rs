// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Validation configuration loaded from TOML files or constructed programmatically.
//!
//! # TOML Format
//! ```toml
//! check_features = true
//! check_residual_sources = true
//! check_flow_types = false
//! check_edge_shapes = true
//! max_violations = 50
//! ```
//!
//! Missing keys fall back to [`CheckConfig::default`], which enables every
//! check and collects every violation.

use crate::ModelError;
use std::path::Path;

/// Selects which checks [`crate::Model::check_model_with`] runs.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CheckConfig {
    /// Validate each layer's own fields.
    pub check_features: bool,
    /// Validate that residual branch indices exist and match in shape.
    pub check_residual_sources: bool,
    /// Validate that each edge's flow tag fits its endpoints.
    pub check_flow_types: bool,
    /// Validate producer/consumer shape compatibility across each edge.
    pub check_edge_shapes: bool,
    /// Stop collecting once this many violations were found.
    pub max_violations: Option<usize>,
}

impl CheckConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ModelError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ModelError::Config(format!("cannot read config '{}': {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ModelError> {
        toml::from_str(toml_str)
            .map_err(|e| ModelError::Config(format!("TOML parse error: {e}")))
    }

    /// Serialises configuration to TOML.
    pub fn to_toml(&self) -> Result<String, ModelError> {
        toml::to_string_pretty(self)
            .map_err(|e| ModelError::Config(format!("TOML serialise error: {e}")))
    }

    /// Only the per-layer field checks; no cross-node checks.
    pub fn features_only() -> Self {
        Self {
            check_residual_sources: false,
            check_flow_types: false,
            check_edge_shapes: false,
            ..Self::default()
        }
    }

    /// Returns `true` once `found` violations reach the configured cap.
    pub(crate) fn is_saturated(&self, found: usize) -> bool {
        self.max_violations.is_some_and(|max| found >= max)
    }
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            check_features: true,
            check_residual_sources: true,
            check_flow_types: true,
            check_edge_shapes: true,
            max_violations: None,
        }
    }
}
