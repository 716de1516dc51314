// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Model and dataflow tags.

use layer_ir::{ActivationShape, Layer, LayerKind};
use std::fmt;

/// The architecture family of a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelType {
    Mlp,
    Cnn,
    Rnn,
    Lstm,
    Attention,
}

impl ModelType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mlp => "MLP",
            Self::Cnn => "CNN",
            Self::Rnn => "RNN",
            Self::Lstm => "LSTM",
            Self::Attention => "ATTENTION",
        }
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The kind of dataflow an edge carries from producer to consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowType {
    /// Into or out of a convolution.
    Conv,
    /// Into or out of a dense or vector/matrix op.
    Linear,
    /// Input to an element-wise activation.
    Activate,
    /// Spatial reduction: into a pooling layer or out of a strided convolution.
    Downsample,
    Batchnorm,
    /// Skip connection into a residual merge.
    Skipcon,
    /// Channel concatenation.
    Concat,
    /// Input to a softmax.
    Softmax,
}

impl FlowType {
    pub const ALL: [Self; 8] = [
        Self::Conv,
        Self::Linear,
        Self::Activate,
        Self::Downsample,
        Self::Batchnorm,
        Self::Skipcon,
        Self::Concat,
        Self::Softmax,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Conv => "conv",
            Self::Linear => "linear",
            Self::Activate => "activate",
            Self::Downsample => "downsample",
            Self::Batchnorm => "batchnorm",
            Self::Skipcon => "skipcon",
            Self::Concat => "concat",
            Self::Softmax => "softmax",
        }
    }

    /// Checks that this flow tag fits the producer and consumer variants.
    ///
    /// Returns a description of the mismatch on failure.
    pub fn admits(&self, producer: &Layer, consumer: &Layer) -> Result<(), String> {
        let p = producer.kind();
        let c = consumer.kind();
        let ok = match self {
            Self::Conv => p.is_convolution() || c.is_convolution(),
            Self::Linear => is_dense(p) || is_dense(c),
            Self::Activate => c.is_activation(),
            Self::Downsample => {
                matches!(c, LayerKind::Pooling(_))
                    || (p.is_convolution() && p.stride().is_some_and(|s| s > 1))
            }
            Self::Batchnorm => {
                matches!(p, LayerKind::Batchnorm(_)) || matches!(c, LayerKind::Batchnorm(_))
            }
            Self::Skipcon => {
                matches!(c, LayerKind::Residual(_) | LayerKind::Vadd(_))
                    && !matches!(producer.output_shape(), Some(ActivationShape::Matrix { .. }))
            }
            Self::Concat => true,
            Self::Softmax => c.is_softmax(),
        };
        if ok {
            Ok(())
        } else {
            Err(format!(
                "'{}' flow does not fit {} ({}) -> {} ({})",
                self,
                producer.name(),
                producer.layer_type(),
                consumer.name(),
                consumer.layer_type(),
            ))
        }
    }
}

fn is_dense(kind: &LayerKind) -> bool {
    matches!(
        kind,
        LayerKind::Linear(_) | LayerKind::Gemm(_) | LayerKind::Vdp(_) | LayerKind::Vadd(_)
    )
}

impl fmt::Display for FlowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
