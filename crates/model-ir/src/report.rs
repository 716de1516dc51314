// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Validation reports produced by [`crate::Model::check_model`].

use crate::{EdgeId, NodeId};
use std::fmt;

/// What a violation is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Location {
    Node(NodeId),
    Edge(EdgeId),
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node(id) => write!(f, "node {id}"),
            Self::Edge(id) => write!(f, "edge {id}"),
        }
    }
}

/// The check that produced a violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// A layer's own fields are malformed.
    Feature,
    /// A residual branch index is dangling or shape-incompatible.
    ResidualSource,
    /// An edge's flow tag does not fit its endpoints.
    FlowType,
    /// The producer's output cannot feed the consumer's input.
    ShapeMismatch,
}

/// A single finding of a validation pass.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Violation {
    pub location: Location,
    pub kind: ViolationKind,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.message)
    }
}

/// Every violation found by one validation pass, in discovery order.
///
/// Nodes are checked before edges, each in index order.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct ValidationReport {
    violations: Vec<Violation>,
}

impl ValidationReport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, location: Location, kind: ViolationKind, message: String) {
        self.violations.push(Violation {
            location,
            kind,
            message,
        });
    }

    /// Returns `true` when no violations were found.
    pub fn is_ok(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn iter(&self) -> impl Iterator<Item = &Violation> {
        self.violations.iter()
    }

    /// Violations attached to node `id`.
    pub fn for_node(&self, id: NodeId) -> impl Iterator<Item = &Violation> {
        self.iter()
            .filter(move |v| v.location == Location::Node(id))
    }

    /// Violations attached to edge `id`.
    pub fn for_edge(&self, id: EdgeId) -> impl Iterator<Item = &Violation> {
        self.iter()
            .filter(move |v| v.location == Location::Edge(id))
    }

    /// Number of violations of the given kind.
    pub fn count_kind(&self, kind: ViolationKind) -> usize {
        self.iter().filter(|v| v.kind == kind).count()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_ok() {
            return writeln!(f, "ok: no violations");
        }
        writeln!(f, "{} violations:", self.violations.len())?;
        for v in &self.violations {
            writeln!(f, "  {v}")?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a ValidationReport {
    type Item = &'a Violation;
    type IntoIter = std::slice::Iter<'a, Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.iter()
    }
}
