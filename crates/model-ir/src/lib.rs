// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # model-ir
//!
//! A typed, validated DAG of neural-network layers, consumed as an
//! intermediate representation by accelerator exploration and compilation
//! tools.
//!
//! - [`Model`] — owns the layers (from `layer-ir`) and the typed edges
//!   between them. Structural mistakes (unknown node, self-loop, cycle,
//!   duplicate name) are rejected at the call that makes them.
//! - [`FlowType`] — the dataflow tag on each edge.
//! - [`ValidationReport`] — every shape and dataflow finding of one
//!   [`Model::check_model`] pass, keyed by node or edge.
//! - [`ModelParam`] — layer and parameter counts, recomputed on demand.
//! - [`CheckConfig`] — which checks to run, loadable from TOML.
//!
//! # Example
//! ```
//! use layer_ir::Layer;
//! use model_ir::{FlowType, Model, ModelType};
//!
//! let mut model = Model::new("tiny-cnn", ModelType::Cnn);
//! let conv = model.add_layer(Layer::conv("conv1", 3, 16, 32, 3, 1)).unwrap();
//! let relu = model.add_layer(Layer::relu("relu1", 16, 32)).unwrap();
//! let pool = model.add_layer(Layer::pooling("pool1", 16, 32, 2, 2)).unwrap();
//! model.add_edge(conv, relu, FlowType::Conv).unwrap();
//! model.add_edge(relu, pool, FlowType::Downsample).unwrap();
//!
//! let report = model.check_model();
//! assert!(report.is_ok());
//! assert_eq!(model.param().param_nums, 3 * 16 * 3 * 3);
//! ```

mod config;
mod error;
mod flow;
pub mod graph;
mod param;
pub mod report;

pub use config::CheckConfig;
pub use error::ModelError;
pub use flow::{FlowType, ModelType};
pub use graph::{Edge, EdgeId, Model, NodeId};
pub use param::ModelParam;
pub use report::{Location, ValidationReport, Violation, ViolationKind};
