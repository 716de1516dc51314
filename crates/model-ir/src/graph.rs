// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Model graph: layers connected by typed dataflow edges.
//!
//! # Structure
//!
//! ```text
//! layers:   [ conv1 ][ relu1 ][ pool1 ]      arena, NodeId = position
//! edges:    [ 0 -> 1 conv ][ 1 -> 2 downsample ]   EdgeId = position
//! outgoing: [ [0], [1], [] ]                 per-node edge ids
//! incoming: [ [], [0], [1] ]
//! ```
//!
//! Nodes and edges are only ever appended, so ids are stable. Every edge
//! insertion is checked for cycles before it is applied, which keeps the
//! graph acyclic at all times.

use crate::report::{Location, ViolationKind};
use crate::{CheckConfig, FlowType, ModelError, ModelParam, ModelType, ValidationReport};
use layer_ir::{Layer, LayerKind};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::fmt;

/// Stable index of a layer within its model.
pub type NodeId = usize;

/// Stable index of an edge within its model.
pub type EdgeId = usize;

/// A directed dataflow edge from a producer layer to a consumer layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub struct Edge {
    pub source: NodeId,
    pub target: NodeId,
    pub flow: FlowType,
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {} [{}]", self.source, self.target, self.flow)
    }
}

/// A neural network as a DAG of layers.
///
/// The model owns its layers; callers only ever receive shared references.
/// It has no interior mutability, so a fully built model may be validated
/// from several threads at once.
#[derive(Debug, Clone)]
pub struct Model {
    name: String,
    model_type: ModelType,
    layers: Vec<Layer>,
    edges: Vec<Edge>,
    outgoing: Vec<Vec<EdgeId>>,
    incoming: Vec<Vec<EdgeId>>,
    names: HashMap<String, NodeId>,
}

impl Model {
    /// Creates an empty model.
    pub fn new(name: impl Into<String>, model_type: ModelType) -> Self {
        Self {
            name: name.into(),
            model_type,
            layers: Vec::new(),
            edges: Vec::new(),
            outgoing: Vec::new(),
            incoming: Vec::new(),
            names: HashMap::new(),
        }
    }

    // ── Construction ───────────────────────────────────────────────

    /// Inserts a layer as a new node and returns its index.
    ///
    /// # Errors
    /// [`ModelError::DuplicateName`] if a layer with the same name exists.
    pub fn add_layer(&mut self, layer: Layer) -> Result<NodeId, ModelError> {
        if self.names.contains_key(layer.name()) {
            tracing::warn!(
                model = %self.name,
                layer = layer.name(),
                "rejected duplicate layer name"
            );
            return Err(ModelError::DuplicateName {
                name: layer.name().to_string(),
            });
        }

        let id = self.layers.len();
        let layer = layer.with_index(id);
        tracing::debug!(
            model = %self.name,
            id,
            layer = layer.name(),
            kind = %layer.layer_type(),
            "added layer"
        );

        self.names.insert(layer.name().to_string(), id);
        self.layers.push(layer);
        self.outgoing.push(Vec::new());
        self.incoming.push(Vec::new());
        Ok(id)
    }

    /// Connects `from` to `to` with a typed dataflow edge.
    ///
    /// # Errors
    /// - [`ModelError::UnknownNode`] if either endpoint does not exist.
    /// - [`ModelError::SelfLoop`] if `from == to`.
    /// - [`ModelError::Cycle`] if `to` already reaches `from`.
    pub fn add_edge(
        &mut self,
        from: NodeId,
        to: NodeId,
        flow: FlowType,
    ) -> Result<EdgeId, ModelError> {
        for id in [from, to] {
            if id >= self.layers.len() {
                tracing::warn!(
                    model = %self.name,
                    from,
                    to,
                    id,
                    "rejected edge to unknown node"
                );
                return Err(ModelError::UnknownNode { id });
            }
        }
        if from == to {
            tracing::warn!(model = %self.name, id = from, "rejected self-loop");
            return Err(ModelError::SelfLoop { id: from });
        }
        if self.reaches(to, from) {
            tracing::warn!(model = %self.name, from, to, "rejected edge closing a cycle");
            return Err(ModelError::Cycle { from, to });
        }

        let id = self.edges.len();
        self.edges.push(Edge {
            source: from,
            target: to,
            flow,
        });
        self.outgoing[from].push(id);
        self.incoming[to].push(id);
        tracing::debug!(model = %self.name, id, from, to, %flow, "added edge");
        Ok(id)
    }

    /// Returns `true` if a directed path leads from `start` to `goal`.
    ///
    /// Depth-first, O(V + E).
    fn reaches(&self, start: NodeId, goal: NodeId) -> bool {
        let mut visited = vec![false; self.layers.len()];
        let mut stack = vec![start];
        while let Some(node) = stack.pop() {
            if node == goal {
                return true;
            }
            if std::mem::replace(&mut visited[node], true) {
                continue;
            }
            stack.extend(
                self.outgoing[node]
                    .iter()
                    .map(|&e| self.edges[e].target)
                    .filter(|&t| !visited[t]),
            );
        }
        false
    }

    // ── Introspection ──────────────────────────────────────────────

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn model_type(&self) -> ModelType {
        self.model_type
    }

    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Layers in insertion order; a layer's position is its [`NodeId`].
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, id: NodeId) -> Option<&Layer> {
        self.layers.get(id)
    }

    /// Looks up a layer by its unique name.
    pub fn layer_by_name(&self, name: &str) -> Option<&Layer> {
        self.names.get(name).map(|&id| &self.layers[id])
    }

    /// Edges in insertion order; an edge's position is its [`EdgeId`].
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id)
    }

    /// Nodes fed by `id`, in edge insertion order.
    pub fn successors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.outgoing
            .get(id)
            .into_iter()
            .flatten()
            .map(|&e| self.edges[e].target)
    }

    /// Nodes feeding `id`, in edge insertion order.
    pub fn predecessors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.incoming
            .get(id)
            .into_iter()
            .flatten()
            .map(|&e| self.edges[e].source)
    }

    /// Node ids ordered so that every producer precedes its consumers.
    ///
    /// Among ready nodes the lowest index comes first, so the order is
    /// deterministic and equals insertion order for a chain.
    pub fn topological_order(&self) -> Vec<NodeId> {
        let mut in_degree: Vec<usize> = self.incoming.iter().map(Vec::len).collect();
        let mut ready: BinaryHeap<Reverse<NodeId>> = in_degree
            .iter()
            .enumerate()
            .filter(|&(_, &d)| d == 0)
            .map(|(id, _)| Reverse(id))
            .collect();

        let mut order = Vec::with_capacity(self.layers.len());
        while let Some(Reverse(node)) = ready.pop() {
            order.push(node);
            for &e in &self.outgoing[node] {
                let target = self.edges[e].target;
                in_degree[target] -= 1;
                if in_degree[target] == 0 {
                    ready.push(Reverse(target));
                }
            }
        }
        order
    }

    /// Computes layer and parameter counts from the current nodes.
    pub fn param(&self) -> ModelParam {
        ModelParam::from_layers(&self.layers)
    }

    /// Returns a summary string describing the model.
    pub fn summary(&self) -> String {
        let param = self.param();
        format!(
            "Model '{}' ({}): {} layers ({} linear, {} nonlinear), {} edges, {} params",
            self.name,
            self.model_type,
            self.num_layers(),
            param.linear_layers,
            param.nonlinear_layers,
            self.num_edges(),
            param.param_nums,
        )
    }

    // ── Validation ─────────────────────────────────────────────────

    /// Validates every node and every edge with all checks enabled.
    pub fn check_model(&self) -> ValidationReport {
        self.check_model_with(&CheckConfig::default())
    }

    /// Validates every node, then every edge, collecting all violations.
    ///
    /// # Checks
    /// - Node: the layer's own fields are well-formed.
    /// - Node: residual branch indices exist and produce the merged shape.
    /// - Edge: the flow tag fits the producer and consumer variants.
    /// - Edge: the producer's output can feed the consumer's input.
    ///
    /// Never fails and never mutates the model.
    pub fn check_model_with(&self, config: &CheckConfig) -> ValidationReport {
        let mut pass = Pass {
            config,
            report: ValidationReport::new(),
        };

        for (id, layer) in self.layers.iter().enumerate() {
            if pass.is_full() {
                break;
            }
            if config.check_features {
                for defect in layer.feature_defects() {
                    pass.record(
                        Location::Node(id),
                        ViolationKind::Feature,
                        format!("{}: {defect}", layer.name()),
                    );
                }
            }
            if config.check_residual_sources {
                if let LayerKind::Residual(spec) = layer.kind() {
                    self.check_residual_sources(id, layer, &spec.sources, &mut pass);
                }
            }
        }

        for (id, edge) in self.edges.iter().enumerate() {
            if pass.is_full() {
                break;
            }
            let producer = &self.layers[edge.source];
            let consumer = &self.layers[edge.target];

            if config.check_flow_types {
                if let Err(message) = edge.flow.admits(producer, consumer) {
                    pass.record(Location::Edge(id), ViolationKind::FlowType, message);
                }
            }
            if config.check_edge_shapes {
                // Malformed endpoints have already been reported on the node.
                if let (Some(output), Some(input)) =
                    (producer.output_shape(), consumer.input_shape())
                {
                    let fits = match edge.flow {
                        FlowType::Concat => output.concatenates_with(&input),
                        _ => output.feeds(&input),
                    };
                    if !fits {
                        pass.record(
                            Location::Edge(id),
                            ViolationKind::ShapeMismatch,
                            format!(
                                "{} output {output} does not fit {} input {input}",
                                producer.name(),
                                consumer.name(),
                            ),
                        );
                    }
                }
            }
        }

        let report = pass.report;
        if report.is_ok() {
            tracing::info!(
                model = %self.name,
                layers = self.num_layers(),
                edges = self.num_edges(),
                "model is well-formed"
            );
        } else {
            tracing::info!(model = %self.name, violations = report.len(), "model has violations");
        }
        report
    }

    fn check_residual_sources(
        &self,
        id: NodeId,
        layer: &Layer,
        sources: &[i32; 2],
        pass: &mut Pass<'_>,
    ) {
        let expected = layer.output_shape();
        // Negative indices are reported as feature defects.
        for source in sources.iter().filter_map(|&s| usize::try_from(s).ok()) {
            let message = if source == id {
                Some(format!("{}: residual branch references itself", layer.name()))
            } else if let Some(branch) = self.layers.get(source) {
                match (branch.output_shape(), expected) {
                    (Some(actual), Some(expected)) if actual != expected => Some(format!(
                        "{}: branch {source} ({}) outputs {actual}, expected {expected}",
                        layer.name(),
                        branch.name(),
                    )),
                    _ => None,
                }
            } else {
                Some(format!(
                    "{}: residual branch {source} does not exist",
                    layer.name()
                ))
            };
            if let Some(message) = message {
                pass.record(Location::Node(id), ViolationKind::ResidualSource, message);
            }
        }
    }
}

/// State of one validation pass.
struct Pass<'a> {
    config: &'a CheckConfig,
    report: ValidationReport,
}

impl Pass<'_> {
    fn is_full(&self) -> bool {
        self.config.is_saturated(self.report.len())
    }

    fn record(&mut self, location: Location, kind: ViolationKind, message: String) {
        if !self.is_full() {
            self.report.push(location, kind, message);
        }
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Model '{}' ({}, {} layers, {} edges):",
            self.name,
            self.model_type,
            self.layers.len(),
            self.edges.len()
        )?;
        for layer in &self.layers {
            writeln!(f, "  {}", layer.summary())?;
        }
        for edge in &self.edges {
            writeln!(f, "  {edge}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Helper: conv → relu → pool chain with the given relu channel count.
    fn chain(relu_channels: i32) -> Model {
        let mut m = Model::new("chain", ModelType::Cnn);
        let c = m.add_layer(Layer::conv("conv1", 3, 16, 32, 3, 1)).unwrap();
        let r = m.add_layer(Layer::relu("relu1", relu_channels, 32)).unwrap();
        let p = m.add_layer(Layer::pooling("pool1", 16, 32, 2, 2)).unwrap();
        m.add_edge(c, r, FlowType::Conv).unwrap();
        m.add_edge(r, p, FlowType::Downsample).unwrap();
        m
    }

    #[test]
    fn test_add_layer_assigns_indices() {
        let m = chain(16);
        let ids: Vec<_> = m.layers().iter().map(|l| l.index()).collect();
        assert_eq!(ids, vec![Some(0), Some(1), Some(2)]);
        assert_eq!(m.layer(1).unwrap().name(), "relu1");
        assert_eq!(m.layer_by_name("pool1").unwrap().index(), Some(2));
        assert!(m.layer(3).is_none());
    }

    #[test]
    fn test_duplicate_name() {
        let mut m = chain(16);
        let err = m.add_layer(Layer::relu("relu1", 16, 32)).unwrap_err();
        assert_eq!(
            err,
            ModelError::DuplicateName {
                name: "relu1".into()
            }
        );
        assert_eq!(m.num_layers(), 3);
    }

    #[test]
    fn test_unknown_node_and_self_loop() {
        let mut m = chain(16);
        assert_eq!(
            m.add_edge(0, 7, FlowType::Conv),
            Err(ModelError::UnknownNode { id: 7 })
        );
        assert_eq!(
            m.add_edge(9, 0, FlowType::Conv),
            Err(ModelError::UnknownNode { id: 9 })
        );
        assert_eq!(
            m.add_edge(1, 1, FlowType::Conv),
            Err(ModelError::SelfLoop { id: 1 })
        );
        assert_eq!(m.num_edges(), 2);
    }

    /// Collects formatted log output for assertions.
    #[derive(Clone, Default)]
    struct LogBuffer(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_every_rejection_logs_a_warning() {
        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .finish();

        let mut m = chain(16);
        tracing::subscriber::with_default(subscriber, || {
            assert!(m.add_edge(0, 7, FlowType::Conv).is_err());
            assert!(m.add_edge(1, 1, FlowType::Conv).is_err());
            assert!(m.add_edge(2, 0, FlowType::Conv).is_err());
            assert!(m.add_layer(Layer::relu("relu1", 16, 32)).is_err());
        });

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert_eq!(output.matches("WARN").count(), 4, "{output}");
        for message in [
            "rejected edge to unknown node",
            "rejected self-loop",
            "rejected edge closing a cycle",
            "rejected duplicate layer name",
        ] {
            assert!(output.contains(message), "missing '{message}' in {output}");
        }
    }

    #[test]
    fn test_cycle_rejected_and_graph_unchanged() {
        let mut m = chain(16);
        let before = m.check_model();
        assert_eq!(
            m.add_edge(2, 0, FlowType::Concat),
            Err(ModelError::Cycle { from: 2, to: 0 })
        );
        assert_eq!(m.num_edges(), 2);
        assert_eq!(m.successors(2).count(), 0);
        assert_eq!(m.check_model(), before);
    }

    #[test]
    fn test_cycle_iff_edge_points_to_ancestor() {
        const N: usize = 5;
        for from in 0..N {
            for to in 0..N {
                if from == to {
                    continue;
                }
                let mut m = Model::new("line", ModelType::Mlp);
                for i in 0..N {
                    m.add_layer(Layer::vadd(format!("v{i}"), 8)).unwrap();
                }
                for i in 0..N - 1 {
                    m.add_edge(i, i + 1, FlowType::Linear).unwrap();
                }
                let result = m.add_edge(from, to, FlowType::Linear);
                if to < from {
                    assert_eq!(result, Err(ModelError::Cycle { from, to }));
                    assert_eq!(m.num_edges(), N - 1);
                } else {
                    assert_eq!(result, Ok(N - 1));
                }
            }
        }
    }

    #[test]
    fn test_diamond_is_acyclic() {
        let mut m = Model::new("diamond", ModelType::Cnn);
        for name in ["a", "b", "c", "d"] {
            m.add_layer(Layer::relu(name, 4, 4)).unwrap();
        }
        m.add_edge(0, 1, FlowType::Concat).unwrap();
        m.add_edge(0, 2, FlowType::Concat).unwrap();
        m.add_edge(1, 3, FlowType::Concat).unwrap();
        m.add_edge(2, 3, FlowType::Concat).unwrap();
        assert!(m.add_edge(3, 0, FlowType::Concat).is_err());
        assert!(m.add_edge(1, 2, FlowType::Concat).is_ok());
        assert!(m.add_edge(2, 1, FlowType::Concat).is_err());
    }

    #[test]
    fn test_neighbours() {
        let m = chain(16);
        assert_eq!(m.successors(0).collect::<Vec<_>>(), vec![1]);
        assert_eq!(m.predecessors(2).collect::<Vec<_>>(), vec![1]);
        assert_eq!(m.predecessors(0).count(), 0);
        assert_eq!(m.successors(42).count(), 0);
        assert_eq!(m.edge(1).unwrap().flow, FlowType::Downsample);
    }

    #[test]
    fn test_topological_order() {
        let mut m = Model::new("topo", ModelType::Cnn);
        for name in ["a", "b", "c", "d"] {
            m.add_layer(Layer::relu(name, 4, 4)).unwrap();
        }
        m.add_edge(3, 1, FlowType::Concat).unwrap();
        m.add_edge(1, 0, FlowType::Concat).unwrap();
        m.add_edge(2, 0, FlowType::Concat).unwrap();
        let order = m.topological_order();
        assert_eq!(order, vec![2, 3, 1, 0]);
        assert_eq!(chain(16).topological_order(), vec![0, 1, 2]);
    }

    #[test]
    fn test_param_counts_track_insertions() {
        let mut m = Model::new("p", ModelType::Cnn);
        let layers = [
            Layer::conv("c", 3, 16, 32, 3, 1),
            Layer::relu("r", 16, 32),
            Layer::batchnorm("bn", 16, 32),
            Layer::softmax1d("s", 10),
            Layer::gemm("g", 2, 3, 4),
        ];
        for (i, layer) in layers.into_iter().enumerate() {
            m.add_layer(layer).unwrap();
            let p = m.param();
            assert_eq!(p.linear_layers + p.nonlinear_layers, i + 1);
            assert_eq!(p.total_layers(), m.num_layers());
        }
        let p = m.param();
        assert_eq!(p.linear_layers, 3);
        assert_eq!(p.nonlinear_layers, 2);
        assert_eq!(p.param_nums, 432 + 32 + 12);
    }

    #[test]
    fn test_check_chain_ok() {
        let report = chain(16).check_model();
        assert!(report.is_ok(), "{report}");
    }

    #[test]
    fn test_check_channel_mismatch() {
        let report = chain(8).check_model();
        assert!(!report.is_ok());
        let on_edge0: Vec<_> = report.for_edge(0).collect();
        assert_eq!(on_edge0.len(), 1);
        assert_eq!(on_edge0[0].kind, ViolationKind::ShapeMismatch);
        assert!(on_edge0[0].message.contains("[16, 32, 32]"));
        // relu1 (8 channels) also cannot feed pool1 (16 channels).
        assert_eq!(report.for_edge(1).count(), 1);
    }

    #[test]
    fn test_check_collects_node_and_edge_violations() {
        let mut m = Model::new("bad", ModelType::Cnn);
        m.add_layer(Layer::conv("c", 0, 16, 32, 3, 0)).unwrap();
        m.add_layer(Layer::relu("r", 16, 32)).unwrap();
        m.add_edge(0, 1, FlowType::Softmax).unwrap();
        let report = m.check_model();
        assert_eq!(report.count_kind(ViolationKind::Feature), 2);
        assert_eq!(report.count_kind(ViolationKind::FlowType), 1);
        // Malformed producer: shape check skipped.
        assert_eq!(report.count_kind(ViolationKind::ShapeMismatch), 0);
        // Nodes come first.
        assert_eq!(report.violations()[0].location, Location::Node(0));
        assert_eq!(report.violations()[2].location, Location::Edge(0));
    }

    #[test]
    fn test_residual_sources() {
        let mut m = Model::new("res", ModelType::Cnn);
        m.add_layer(Layer::conv("c1", 16, 16, 8, 3, 1)).unwrap();
        m.add_layer(Layer::conv("c2", 16, 16, 8, 3, 1)).unwrap();
        m.add_layer(Layer::conv("c3", 16, 32, 8, 3, 1)).unwrap();
        m.add_layer(Layer::residual("ok", 16, 8, 0, 1)).unwrap();
        m.add_layer(Layer::residual("wide", 16, 8, 0, 2)).unwrap();
        m.add_layer(Layer::residual("dangling", 16, 8, 0, 42)).unwrap();
        m.add_layer(Layer::residual("selfish", 16, 8, 6, 0)).unwrap();
        m.add_edge(0, 1, FlowType::Conv).unwrap();
        m.add_edge(0, 3, FlowType::Skipcon).unwrap();
        m.add_edge(1, 3, FlowType::Skipcon).unwrap();

        let report = m.check_model();
        assert_eq!(report.for_node(3).count(), 0);
        assert_eq!(report.for_node(4).count(), 1);
        assert!(report.for_node(5).any(|v| v.message.contains("does not exist")));
        assert!(report.for_node(6).any(|v| v.message.contains("references itself")));
        assert_eq!(report.count_kind(ViolationKind::ResidualSource), 3);
        assert_eq!(report.len(), 3);
    }

    #[test]
    fn test_concat_checks_spatial_size_only() {
        let mut m = Model::new("cat", ModelType::Cnn);
        m.add_layer(Layer::conv("a", 3, 16, 8, 3, 1)).unwrap();
        m.add_layer(Layer::conv("b", 48, 32, 8, 3, 1)).unwrap();
        m.add_layer(Layer::conv("c", 48, 32, 4, 3, 1)).unwrap();
        m.add_edge(0, 1, FlowType::Concat).unwrap();
        m.add_edge(0, 2, FlowType::Concat).unwrap();
        let report = m.check_model();
        assert_eq!(report.for_edge(0).count(), 0);
        assert_eq!(report.for_edge(1).count(), 1);
    }

    #[test]
    fn test_flatten_into_linear() {
        let mut m = Model::new("mlp-head", ModelType::Cnn);
        m.add_layer(Layer::pooling("pool", 16, 8, 2, 2)).unwrap();
        m.add_layer(Layer::linear("fc", 16 * 4 * 4, 10)).unwrap();
        m.add_layer(Layer::softmax1d("sm", 10)).unwrap();
        m.add_edge(0, 1, FlowType::Downsample).unwrap();
        m.add_edge(1, 2, FlowType::Softmax).unwrap();
        // downsample needs a pooling consumer or strided conv producer.
        let report = m.check_model();
        assert_eq!(report.len(), 1);
        assert_eq!(report.violations()[0].kind, ViolationKind::FlowType);
        assert_eq!(report.violations()[0].location, Location::Edge(0));
    }

    #[test]
    fn test_check_config_toggles() {
        let m = chain(8);
        let off = CheckConfig {
            check_edge_shapes: false,
            ..CheckConfig::default()
        };
        assert!(m.check_model_with(&off).is_ok());

        let capped = CheckConfig {
            max_violations: Some(1),
            ..CheckConfig::default()
        };
        assert_eq!(m.check_model_with(&capped).len(), 1);
        assert_eq!(m.check_model().len(), 2);
    }

    #[test]
    fn test_features_only_config() {
        let mut m = Model::new("f", ModelType::Cnn);
        m.add_layer(Layer::relu("r", 0, 4)).unwrap();
        m.add_layer(Layer::softmax1d("s", 4)).unwrap();
        m.add_edge(0, 1, FlowType::Conv).unwrap();
        let report = m.check_model_with(&CheckConfig::features_only());
        assert_eq!(report.len(), 1);
        assert_eq!(report.violations()[0].kind, ViolationKind::Feature);
    }

    #[test]
    fn test_summary_and_display() {
        let m = chain(16);
        let s = m.summary();
        assert!(s.contains("Model 'chain' (CNN)"));
        assert!(s.contains("3 layers (1 linear, 2 nonlinear)"));
        assert!(s.contains("2 edges"));
        let d = format!("{m}");
        assert!(d.contains("conv1"));
        assert!(d.contains("1 -> 2 [downsample]"));
    }

    #[test]
    fn test_model_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Model>();
    }
}
