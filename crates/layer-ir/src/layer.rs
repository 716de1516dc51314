// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Layer nodes and their per-variant shape contracts.
//!
//! A [`Layer`] is a name, an optional graph index and a [`LayerKind`]
//! payload. Every concrete layer stores only the fields it needs, so the
//! compiler checks that validation, shape inference and parameter
//! counting cover every variant.
//!
//! Layers can be built two ways that must agree:
//! - [`Layer::from_feature`] takes the generic [`LayerFeature`] bag that a
//!   loader produces from an exported model table.
//! - The explicit constructors ([`Layer::conv`], [`Layer::relu`], ...) take
//!   named arguments for direct construction.

use crate::defect::{require_kernel_fits, require_positive};
use crate::{
    ActivationShape, FeatureDefect, LayerError, LayerFamily, LayerFeature, LayerType,
    LinearLayerType, NonlinearLayerType,
};
use std::fmt;

// ── Variant payloads ───────────────────────────────────────────────

/// Dense matrix-vector multiply: `x_dimension` inputs to `y_dimension` outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LinearSpec {
    pub x_dimension: i32,
    pub y_dimension: i32,
}

impl LinearSpec {
    fn defects(&self) -> Vec<FeatureDefect> {
        let mut d = Vec::new();
        require_positive(
            &mut d,
            &[("x_dimension", self.x_dimension), ("y_dimension", self.y_dimension)],
        );
        d
    }
}

/// Standard convolution with same-padding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ConvSpec {
    pub input_channel: i32,
    pub output_channel: i32,
    pub feature_size: i32,
    pub kernel_size: i32,
    pub stride: i32,
}

impl ConvSpec {
    fn defects(&self) -> Vec<FeatureDefect> {
        let mut d = Vec::new();
        require_positive(
            &mut d,
            &[
                ("input_channel", self.input_channel),
                ("output_channel", self.output_channel),
                ("feature_size", self.feature_size),
                ("kernel_size", self.kernel_size),
                ("stride", self.stride),
            ],
        );
        require_kernel_fits(&mut d, self.kernel_size, self.feature_size);
        d
    }
}

/// Depthwise convolution: one filter per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DwConvSpec {
    pub channel: i32,
    pub feature_size: i32,
    pub kernel_size: i32,
    pub stride: i32,
}

impl DwConvSpec {
    fn defects(&self) -> Vec<FeatureDefect> {
        let mut d = Vec::new();
        require_positive(
            &mut d,
            &[
                ("channel", self.channel),
                ("feature_size", self.feature_size),
                ("kernel_size", self.kernel_size),
                ("stride", self.stride),
            ],
        );
        require_kernel_fits(&mut d, self.kernel_size, self.feature_size);
        d
    }
}

/// Element-wise merge of two branches.
///
/// `sources` are the graph indices of the two layers being merged. Whether
/// they exist and match this layer's shape can only be checked by the
/// owning model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ResidualSpec {
    pub channel: i32,
    pub feature_size: i32,
    pub sources: [i32; 2],
}

impl ResidualSpec {
    fn defects(&self) -> Vec<FeatureDefect> {
        let mut d = Vec::new();
        require_positive(
            &mut d,
            &[("channel", self.channel), ("feature_size", self.feature_size)],
        );
        for &value in &self.sources {
            if value < 0 {
                d.push(FeatureDefect::NegativeSource { value });
            }
        }
        if self.sources[0] >= 0 && self.sources[0] == self.sources[1] {
            d.push(FeatureDefect::IdenticalSources {
                index: self.sources[0],
            });
        }
        d
    }

    /// Returns the branch indices as node ids, skipping negative ones.
    pub fn source_ids(&self) -> impl Iterator<Item = usize> + '_ {
        self.sources.iter().filter_map(|&s| usize::try_from(s).ok())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BatchnormSpec {
    pub channel: i32,
    pub feature_size: i32,
}

impl BatchnormSpec {
    fn defects(&self) -> Vec<FeatureDefect> {
        let mut d = Vec::new();
        require_positive(
            &mut d,
            &[("channel", self.channel), ("feature_size", self.feature_size)],
        );
        d
    }
}

/// Transposed convolution.
///
/// Output size is `(feature_size - 1) * stride - 2 * padding + kernel_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TrConvSpec {
    pub input_channel: i32,
    pub output_channel: i32,
    pub feature_size: i32,
    pub kernel_size: i32,
    pub stride: i32,
    pub padding: i32,
}

impl TrConvSpec {
    fn output_size(&self) -> i64 {
        (i64::from(self.feature_size) - 1) * i64::from(self.stride)
            - 2 * i64::from(self.padding)
            + i64::from(self.kernel_size)
    }

    fn defects(&self) -> Vec<FeatureDefect> {
        let mut d = Vec::new();
        require_positive(
            &mut d,
            &[
                ("input_channel", self.input_channel),
                ("output_channel", self.output_channel),
                ("feature_size", self.feature_size),
                ("kernel_size", self.kernel_size),
                ("stride", self.stride),
            ],
        );
        if self.padding < 0 {
            d.push(FeatureDefect::NegativePadding {
                value: self.padding,
            });
        } else if self.kernel_size > 0 && self.padding >= self.kernel_size {
            d.push(FeatureDefect::PaddingTooLarge {
                padding: self.padding,
                kernel: self.kernel_size,
            });
        }
        if d.is_empty() && self.output_size() <= 0 {
            d.push(FeatureDefect::EmptyOutput);
        }
        d
    }
}

/// Grouped convolution: `groups` must divide both channel counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct NgConvSpec {
    pub input_channel: i32,
    pub output_channel: i32,
    pub feature_size: i32,
    pub kernel_size: i32,
    pub stride: i32,
    pub groups: i32,
}

impl NgConvSpec {
    fn defects(&self) -> Vec<FeatureDefect> {
        let mut d = Vec::new();
        require_positive(
            &mut d,
            &[
                ("input_channel", self.input_channel),
                ("output_channel", self.output_channel),
                ("feature_size", self.feature_size),
                ("kernel_size", self.kernel_size),
                ("stride", self.stride),
                ("groups", self.groups),
            ],
        );
        require_kernel_fits(&mut d, self.kernel_size, self.feature_size);
        if self.groups > 0 {
            for (field, value) in [
                ("input_channel", self.input_channel),
                ("output_channel", self.output_channel),
            ] {
                if value > 0 && value % self.groups != 0 {
                    d.push(FeatureDefect::GroupsNotDividing {
                        groups: self.groups,
                        field,
                        value,
                    });
                }
            }
        }
        d
    }
}

/// Payload of the single-dimension vector ops (VDP, VADD).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct VectorSpec {
    pub dimension: i32,
}

impl VectorSpec {
    fn defects(&self) -> Vec<FeatureDefect> {
        let mut d = Vec::new();
        require_positive(&mut d, &[("dimension", self.dimension)]);
        d
    }
}

/// General matrix-matrix multiply, `M×K · K×N`.
///
/// Both operands share the single stored `k`, so inner-dimension agreement
/// holds by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GemmSpec {
    pub m: i32,
    pub k: i32,
    pub n: i32,
}

impl GemmSpec {
    fn defects(&self) -> Vec<FeatureDefect> {
        let mut d = Vec::new();
        require_positive(&mut d, &[("m", self.m), ("k", self.k), ("n", self.n)]);
        d
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PoolingSpec {
    pub channel: i32,
    pub feature_size: i32,
    pub kernel_size: i32,
    pub stride: i32,
}

impl PoolingSpec {
    fn defects(&self) -> Vec<FeatureDefect> {
        let mut d = Vec::new();
        require_positive(
            &mut d,
            &[
                ("channel", self.channel),
                ("feature_size", self.feature_size),
                ("kernel_size", self.kernel_size),
                ("stride", self.stride),
            ],
        );
        require_kernel_fits(&mut d, self.kernel_size, self.feature_size);
        d
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Softmax1dSpec {
    pub dimension: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Softmax2dSpec {
    pub row: i32,
    pub col: i32,
}

/// Element-wise activation over a `channel × feature_size²` feature map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Activation {
    pub channel: i32,
    pub feature_size: i32,
}

impl Activation {
    fn defects(&self) -> Vec<FeatureDefect> {
        let mut d = Vec::new();
        require_positive(
            &mut d,
            &[("channel", self.channel), ("feature_size", self.feature_size)],
        );
        d
    }
}

// ── LayerKind ──────────────────────────────────────────────────────

/// The concrete layer variant together with its shape payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum LayerKind {
    Linear(LinearSpec),
    Conv(ConvSpec),
    DwConv(DwConvSpec),
    Residual(ResidualSpec),
    Batchnorm(BatchnormSpec),
    TrConv(TrConvSpec),
    NgConv(NgConvSpec),
    Vdp(VectorSpec),
    Vadd(VectorSpec),
    Gemm(GemmSpec),
    Pooling(PoolingSpec),
    Softmax1d(Softmax1dSpec),
    Softmax2d(Softmax2dSpec),
    Relu(Activation),
    Tanh(Activation),
    Sigmoid(Activation),
}

/// Converts a validated, positive field to a dimension.
fn dim(v: i32) -> usize {
    usize::try_from(v).unwrap_or(0)
}

/// Same-padding output size: `ceil(feature_size / stride)`.
fn same_padded(feature_size: i32, stride: i32) -> usize {
    dim(feature_size).div_ceil(dim(stride))
}

/// Saturating product of parameter factors.
fn product(factors: &[u64]) -> u64 {
    factors.iter().fold(1, |acc, &f| acc.saturating_mul(f))
}

fn feature_map(channels: i32, size: usize) -> ActivationShape {
    ActivationShape::FeatureMap {
        channels: dim(channels),
        size,
    }
}

impl LayerKind {
    /// Builds the payload for `layer_type` from a feature bag.
    pub fn from_feature(layer_type: LayerType, f: LayerFeature) -> Self {
        let activation = Activation {
            channel: f.input_channels,
            feature_size: f.feature_size,
        };
        match layer_type {
            LayerType::Linear(t) => match t {
                LinearLayerType::Linear => Self::Linear(LinearSpec {
                    x_dimension: f.input_channels,
                    y_dimension: f.output_channels,
                }),
                LinearLayerType::Conv => Self::Conv(ConvSpec {
                    input_channel: f.input_channels,
                    output_channel: f.output_channels,
                    feature_size: f.feature_size,
                    kernel_size: f.kernel_size,
                    stride: f.stride,
                }),
                LinearLayerType::DwConv => Self::DwConv(DwConvSpec {
                    channel: f.input_channels,
                    feature_size: f.feature_size,
                    kernel_size: f.kernel_size,
                    stride: f.stride,
                }),
                LinearLayerType::Residual => Self::Residual(ResidualSpec {
                    channel: f.input_channels,
                    feature_size: f.feature_size,
                    sources: [f.source_index, f.appending_index],
                }),
                LinearLayerType::Batchnorm => Self::Batchnorm(BatchnormSpec {
                    channel: f.input_channels,
                    feature_size: f.feature_size,
                }),
                LinearLayerType::TrConv => Self::TrConv(TrConvSpec {
                    input_channel: f.input_channels,
                    output_channel: f.output_channels,
                    feature_size: f.feature_size,
                    kernel_size: f.kernel_size,
                    stride: f.stride,
                    padding: f.padding,
                }),
                LinearLayerType::NgConv => Self::NgConv(NgConvSpec {
                    input_channel: f.input_channels,
                    output_channel: f.output_channels,
                    feature_size: f.feature_size,
                    kernel_size: f.kernel_size,
                    stride: f.stride,
                    groups: f.groups,
                }),
                LinearLayerType::Vdp => Self::Vdp(VectorSpec {
                    dimension: f.input_channels,
                }),
                LinearLayerType::Vadd => Self::Vadd(VectorSpec {
                    dimension: f.input_channels,
                }),
                LinearLayerType::Gemm => Self::Gemm(GemmSpec {
                    m: f.input_channels,
                    k: f.feature_size,
                    n: f.output_channels,
                }),
            },
            LayerType::Nonlinear(t) => match t {
                NonlinearLayerType::Relu => Self::Relu(activation),
                NonlinearLayerType::Tanh => Self::Tanh(activation),
                NonlinearLayerType::Sigmoid => Self::Sigmoid(activation),
                NonlinearLayerType::Pooling => Self::Pooling(PoolingSpec {
                    channel: f.input_channels,
                    feature_size: f.feature_size,
                    kernel_size: f.kernel_size,
                    stride: f.stride,
                }),
                NonlinearLayerType::Softmax1d => Self::Softmax1d(Softmax1dSpec {
                    dimension: f.input_channels,
                }),
                NonlinearLayerType::Softmax2d => Self::Softmax2d(Softmax2dSpec {
                    row: f.input_channels,
                    col: f.output_channels,
                }),
            },
        }
    }

    /// Rebuilds the feature bag this payload would be read from.
    ///
    /// `relu_or_pooling` is not carried by any payload and always comes
    /// back as 0. Fields a variant does not read are likewise zeroed.
    pub fn to_feature(&self) -> LayerFeature {
        match *self {
            Self::Linear(s) => LayerFeature {
                input_channels: s.x_dimension,
                output_channels: s.y_dimension,
                ..LayerFeature::default()
            },
            Self::Conv(s) => LayerFeature::conv(
                s.input_channel,
                s.output_channel,
                s.feature_size,
                s.kernel_size,
                s.stride,
            ),
            Self::DwConv(s) => LayerFeature {
                kernel_size: s.kernel_size,
                stride: s.stride,
                ..LayerFeature::feature_map(s.channel, s.feature_size)
            },
            Self::Residual(s) => LayerFeature {
                source_index: s.sources[0],
                appending_index: s.sources[1],
                ..LayerFeature::feature_map(s.channel, s.feature_size)
            },
            Self::Batchnorm(s) => LayerFeature::feature_map(s.channel, s.feature_size),
            Self::TrConv(s) => LayerFeature {
                padding: s.padding,
                ..LayerFeature::conv(
                    s.input_channel,
                    s.output_channel,
                    s.feature_size,
                    s.kernel_size,
                    s.stride,
                )
            },
            Self::NgConv(s) => LayerFeature {
                groups: s.groups,
                ..LayerFeature::conv(
                    s.input_channel,
                    s.output_channel,
                    s.feature_size,
                    s.kernel_size,
                    s.stride,
                )
            },
            Self::Vdp(s) | Self::Vadd(s) => LayerFeature::vector(s.dimension),
            Self::Gemm(s) => LayerFeature {
                input_channels: s.m,
                feature_size: s.k,
                output_channels: s.n,
                ..LayerFeature::default()
            },
            Self::Pooling(s) => LayerFeature {
                kernel_size: s.kernel_size,
                stride: s.stride,
                ..LayerFeature::feature_map(s.channel, s.feature_size)
            },
            Self::Softmax1d(s) => LayerFeature::vector(s.dimension),
            Self::Softmax2d(s) => LayerFeature {
                input_channels: s.row,
                output_channels: s.col,
                ..LayerFeature::default()
            },
            Self::Relu(a) | Self::Tanh(a) | Self::Sigmoid(a) => {
                LayerFeature::feature_map(a.channel, a.feature_size)
            }
        }
    }

    /// Returns the type tag of this variant.
    pub fn layer_type(&self) -> LayerType {
        match self {
            Self::Linear(_) => LinearLayerType::Linear.into(),
            Self::Conv(_) => LinearLayerType::Conv.into(),
            Self::DwConv(_) => LinearLayerType::DwConv.into(),
            Self::Residual(_) => LinearLayerType::Residual.into(),
            Self::Batchnorm(_) => LinearLayerType::Batchnorm.into(),
            Self::TrConv(_) => LinearLayerType::TrConv.into(),
            Self::NgConv(_) => LinearLayerType::NgConv.into(),
            Self::Vdp(_) => LinearLayerType::Vdp.into(),
            Self::Vadd(_) => LinearLayerType::Vadd.into(),
            Self::Gemm(_) => LinearLayerType::Gemm.into(),
            Self::Pooling(_) => NonlinearLayerType::Pooling.into(),
            Self::Softmax1d(_) => NonlinearLayerType::Softmax1d.into(),
            Self::Softmax2d(_) => NonlinearLayerType::Softmax2d.into(),
            Self::Relu(_) => NonlinearLayerType::Relu.into(),
            Self::Tanh(_) => NonlinearLayerType::Tanh.into(),
            Self::Sigmoid(_) => NonlinearLayerType::Sigmoid.into(),
        }
    }

    /// Lists every defect in this payload's own fields.
    pub fn defects(&self) -> Vec<FeatureDefect> {
        match self {
            Self::Linear(s) => s.defects(),
            Self::Conv(s) => s.defects(),
            Self::DwConv(s) => s.defects(),
            Self::Residual(s) => s.defects(),
            Self::Batchnorm(s) => s.defects(),
            Self::TrConv(s) => s.defects(),
            Self::NgConv(s) => s.defects(),
            Self::Vdp(s) | Self::Vadd(s) => s.defects(),
            Self::Gemm(s) => s.defects(),
            Self::Pooling(s) => s.defects(),
            Self::Softmax1d(s) => {
                let mut d = Vec::new();
                require_positive(&mut d, &[("dimension", s.dimension)]);
                d
            }
            Self::Softmax2d(s) => {
                let mut d = Vec::new();
                require_positive(&mut d, &[("row", s.row), ("col", s.col)]);
                d
            }
            Self::Relu(a) | Self::Tanh(a) | Self::Sigmoid(a) => a.defects(),
        }
    }

    /// Returns `true` for the convolution variants.
    pub fn is_convolution(&self) -> bool {
        matches!(
            self,
            Self::Conv(_) | Self::DwConv(_) | Self::TrConv(_) | Self::NgConv(_)
        )
    }

    /// Returns `true` for the element-wise activations.
    pub fn is_activation(&self) -> bool {
        matches!(self, Self::Relu(_) | Self::Tanh(_) | Self::Sigmoid(_))
    }

    /// Returns `true` for either softmax variant.
    pub fn is_softmax(&self) -> bool {
        matches!(self, Self::Softmax1d(_) | Self::Softmax2d(_))
    }

    /// Returns the stride of strided variants.
    pub fn stride(&self) -> Option<i32> {
        match self {
            Self::Conv(s) => Some(s.stride),
            Self::DwConv(s) => Some(s.stride),
            Self::TrConv(s) => Some(s.stride),
            Self::NgConv(s) => Some(s.stride),
            Self::Pooling(s) => Some(s.stride),
            _ => None,
        }
    }

    // Shape and parameter methods assume `defects()` is empty.

    fn input_shape(&self) -> ActivationShape {
        match *self {
            Self::Linear(s) => ActivationShape::Vector {
                len: dim(s.x_dimension),
            },
            Self::Conv(s) => feature_map(s.input_channel, dim(s.feature_size)),
            Self::DwConv(s) => feature_map(s.channel, dim(s.feature_size)),
            Self::Residual(s) => feature_map(s.channel, dim(s.feature_size)),
            Self::Batchnorm(s) => feature_map(s.channel, dim(s.feature_size)),
            Self::TrConv(s) => feature_map(s.input_channel, dim(s.feature_size)),
            Self::NgConv(s) => feature_map(s.input_channel, dim(s.feature_size)),
            Self::Vdp(s) | Self::Vadd(s) => ActivationShape::Vector {
                len: dim(s.dimension),
            },
            Self::Gemm(s) => ActivationShape::Matrix {
                rows: dim(s.m),
                cols: dim(s.k),
            },
            Self::Pooling(s) => feature_map(s.channel, dim(s.feature_size)),
            Self::Softmax1d(s) => ActivationShape::Vector {
                len: dim(s.dimension),
            },
            Self::Softmax2d(s) => ActivationShape::Matrix {
                rows: dim(s.row),
                cols: dim(s.col),
            },
            Self::Relu(a) | Self::Tanh(a) | Self::Sigmoid(a) => {
                feature_map(a.channel, dim(a.feature_size))
            }
        }
    }

    fn output_shape(&self) -> ActivationShape {
        match *self {
            Self::Linear(s) => ActivationShape::Vector {
                len: dim(s.y_dimension),
            },
            Self::Conv(s) => feature_map(s.output_channel, same_padded(s.feature_size, s.stride)),
            Self::DwConv(s) => feature_map(s.channel, same_padded(s.feature_size, s.stride)),
            Self::TrConv(s) => feature_map(
                s.output_channel,
                usize::try_from(s.output_size()).unwrap_or(0),
            ),
            Self::NgConv(s) => {
                feature_map(s.output_channel, same_padded(s.feature_size, s.stride))
            }
            Self::Vdp(_) => ActivationShape::Vector { len: 1 },
            Self::Gemm(s) => ActivationShape::Matrix {
                rows: dim(s.m),
                cols: dim(s.n),
            },
            Self::Pooling(s) => feature_map(
                s.channel,
                dim(s.feature_size - s.kernel_size) / dim(s.stride) + 1,
            ),
            Self::Residual(_)
            | Self::Batchnorm(_)
            | Self::Vadd(_)
            | Self::Softmax1d(_)
            | Self::Softmax2d(_)
            | Self::Relu(_)
            | Self::Tanh(_)
            | Self::Sigmoid(_) => self.input_shape(),
        }
    }

    fn param_count(&self) -> u64 {
        let p = |v: i32| u64::try_from(v).unwrap_or(0);
        match *self {
            Self::Linear(s) => product(&[p(s.x_dimension), p(s.y_dimension)]),
            Self::Conv(s) => product(&[
                p(s.input_channel),
                p(s.output_channel),
                p(s.kernel_size),
                p(s.kernel_size),
            ]),
            Self::DwConv(s) => product(&[p(s.channel), p(s.kernel_size), p(s.kernel_size)]),
            Self::Batchnorm(s) => 2 * p(s.channel),
            Self::TrConv(s) => product(&[
                p(s.input_channel),
                p(s.output_channel),
                p(s.kernel_size),
                p(s.kernel_size),
            ]),
            Self::NgConv(s) => product(&[
                p(s.input_channel) / p(s.groups),
                p(s.output_channel),
                p(s.kernel_size),
                p(s.kernel_size),
            ]),
            Self::Vdp(s) => p(s.dimension),
            Self::Gemm(s) => product(&[p(s.k), p(s.n)]),
            Self::Residual(_)
            | Self::Vadd(_)
            | Self::Pooling(_)
            | Self::Softmax1d(_)
            | Self::Softmax2d(_)
            | Self::Relu(_)
            | Self::Tanh(_)
            | Self::Sigmoid(_) => 0,
        }
    }
}

// ── Layer ──────────────────────────────────────────────────────────

/// A named node of the layer graph.
///
/// The index is `None` until the layer is inserted into a model, which
/// assigns it once. Layers expose no setters.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Layer {
    name: String,
    index: Option<usize>,
    kind: LayerKind,
}

impl Layer {
    /// Creates an unindexed layer from an already-built payload.
    pub fn new(name: impl Into<String>, kind: LayerKind) -> Self {
        Self {
            name: name.into(),
            index: None,
            kind,
        }
    }

    /// Builds a layer from a loader's feature bag.
    ///
    /// # Field mapping
    /// | Type | Fields read |
    /// |---|---|
    /// | Linear | `x = input_channels`, `y = output_channels` |
    /// | CONV, TRCONV, NGCONV | channels, `feature_size`, `kernel_size`, `stride` (+ `padding` / `groups`) |
    /// | DWCONV, pooling | `channel = input_channels`, `feature_size`, `kernel_size`, `stride` |
    /// | Residual | `channel = input_channels`, `feature_size`, branches `(source_index, appending_index)` |
    /// | Batchnorm, activations | `channel = input_channels`, `feature_size` |
    /// | VDP, VADD, softmax1d | `dimension = input_channels` |
    /// | GEMM | `m = input_channels`, `k = feature_size`, `n = output_channels` |
    /// | softmax2d | `row = input_channels`, `col = output_channels` |
    pub fn from_feature(
        name: impl Into<String>,
        layer_type: LayerType,
        feature: LayerFeature,
    ) -> Self {
        Self::new(name, LayerKind::from_feature(layer_type, feature))
    }

    /// Builds a layer from a family and a numeric type code.
    pub fn from_codes(
        name: impl Into<String>,
        family: LayerFamily,
        code: i32,
        feature: LayerFeature,
    ) -> Result<Self, LayerError> {
        let layer_type = LayerType::from_code(family, code)
            .ok_or(LayerError::UnknownLayerType { family, code })?;
        Ok(Self::from_feature(name, layer_type, feature))
    }

    /// Builds a layer from a type name such as `"CONV"` or `"relu"`.
    pub fn from_type_name(
        name: impl Into<String>,
        type_name: &str,
        feature: LayerFeature,
    ) -> Result<Self, LayerError> {
        let layer_type = LayerType::from_str_loose(type_name)
            .ok_or_else(|| LayerError::UnknownLayerName(type_name.to_string()))?;
        Ok(Self::from_feature(name, layer_type, feature))
    }

    pub fn linear(name: impl Into<String>, x_dimension: i32, y_dimension: i32) -> Self {
        Self::new(
            name,
            LayerKind::Linear(LinearSpec {
                x_dimension,
                y_dimension,
            }),
        )
    }

    pub fn conv(
        name: impl Into<String>,
        input_channel: i32,
        output_channel: i32,
        feature_size: i32,
        kernel_size: i32,
        stride: i32,
    ) -> Self {
        Self::new(
            name,
            LayerKind::Conv(ConvSpec {
                input_channel,
                output_channel,
                feature_size,
                kernel_size,
                stride,
            }),
        )
    }

    pub fn dwconv(
        name: impl Into<String>,
        channel: i32,
        feature_size: i32,
        kernel_size: i32,
        stride: i32,
    ) -> Self {
        Self::new(
            name,
            LayerKind::DwConv(DwConvSpec {
                channel,
                feature_size,
                kernel_size,
                stride,
            }),
        )
    }

    /// A residual merge of the layers at graph indices `first` and `second`.
    pub fn residual(
        name: impl Into<String>,
        channel: i32,
        feature_size: i32,
        first: i32,
        second: i32,
    ) -> Self {
        Self::new(
            name,
            LayerKind::Residual(ResidualSpec {
                channel,
                feature_size,
                sources: [first, second],
            }),
        )
    }

    pub fn batchnorm(name: impl Into<String>, channel: i32, feature_size: i32) -> Self {
        Self::new(
            name,
            LayerKind::Batchnorm(BatchnormSpec {
                channel,
                feature_size,
            }),
        )
    }

    pub fn trconv(
        name: impl Into<String>,
        input_channel: i32,
        output_channel: i32,
        feature_size: i32,
        kernel_size: i32,
        stride: i32,
        padding: i32,
    ) -> Self {
        Self::new(
            name,
            LayerKind::TrConv(TrConvSpec {
                input_channel,
                output_channel,
                feature_size,
                kernel_size,
                stride,
                padding,
            }),
        )
    }

    pub fn ngconv(
        name: impl Into<String>,
        input_channel: i32,
        output_channel: i32,
        feature_size: i32,
        kernel_size: i32,
        stride: i32,
        groups: i32,
    ) -> Self {
        Self::new(
            name,
            LayerKind::NgConv(NgConvSpec {
                input_channel,
                output_channel,
                feature_size,
                kernel_size,
                stride,
                groups,
            }),
        )
    }

    pub fn vdp(name: impl Into<String>, dimension: i32) -> Self {
        Self::new(name, LayerKind::Vdp(VectorSpec { dimension }))
    }

    pub fn vadd(name: impl Into<String>, dimension: i32) -> Self {
        Self::new(name, LayerKind::Vadd(VectorSpec { dimension }))
    }

    /// An `m×k · k×n` matrix multiply.
    pub fn gemm(name: impl Into<String>, m: i32, k: i32, n: i32) -> Self {
        Self::new(name, LayerKind::Gemm(GemmSpec { m, k, n }))
    }

    pub fn pooling(
        name: impl Into<String>,
        channel: i32,
        feature_size: i32,
        kernel_size: i32,
        stride: i32,
    ) -> Self {
        Self::new(
            name,
            LayerKind::Pooling(PoolingSpec {
                channel,
                feature_size,
                kernel_size,
                stride,
            }),
        )
    }

    pub fn softmax1d(name: impl Into<String>, dimension: i32) -> Self {
        Self::new(name, LayerKind::Softmax1d(Softmax1dSpec { dimension }))
    }

    pub fn softmax2d(name: impl Into<String>, row: i32, col: i32) -> Self {
        Self::new(name, LayerKind::Softmax2d(Softmax2dSpec { row, col }))
    }

    pub fn relu(name: impl Into<String>, channel: i32, feature_size: i32) -> Self {
        Self::new(name, LayerKind::Relu(Activation { channel, feature_size }))
    }

    pub fn tanh(name: impl Into<String>, channel: i32, feature_size: i32) -> Self {
        Self::new(name, LayerKind::Tanh(Activation { channel, feature_size }))
    }

    pub fn sigmoid(name: impl Into<String>, channel: i32, feature_size: i32) -> Self {
        Self::new(name, LayerKind::Sigmoid(Activation { channel, feature_size }))
    }

    /// Returns this layer with its graph index assigned.
    ///
    /// Called by the owning model on insertion; once a model owns the
    /// layer only shared references are handed out.
    pub fn with_index(self, index: usize) -> Self {
        Self {
            index: Some(index),
            ..self
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Position of this layer in its owning model, if inserted.
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn kind(&self) -> &LayerKind {
        &self.kind
    }

    pub fn layer_type(&self) -> LayerType {
        self.kind.layer_type()
    }

    pub fn family(&self) -> LayerFamily {
        self.layer_type().family()
    }

    /// Returns `true` if this layer belongs to the linear family.
    pub fn is_linear(&self) -> bool {
        self.family() == LayerFamily::Linear
    }

    /// Lists every defect in this layer's own fields.
    pub fn feature_defects(&self) -> Vec<FeatureDefect> {
        self.kind.defects()
    }

    /// Returns `true` if this layer's own fields are well-formed.
    pub fn check_features(&self) -> bool {
        self.feature_defects().is_empty()
    }

    /// Shape of the activation this layer consumes, if well-formed.
    pub fn input_shape(&self) -> Option<ActivationShape> {
        self.check_features().then(|| self.kind.input_shape())
    }

    /// Shape of the activation this layer produces, if well-formed.
    pub fn output_shape(&self) -> Option<ActivationShape> {
        self.check_features().then(|| self.kind.output_shape())
    }

    /// Number of stored parameters (weights) this layer contributes.
    ///
    /// Malformed layers contribute zero. Counts too large for `u64`
    /// saturate at `u64::MAX`.
    pub fn param_count(&self) -> u64 {
        if self.check_features() {
            self.kind.param_count()
        } else {
            0
        }
    }

    /// Rebuilds the feature bag describing this layer.
    ///
    /// The `relu_or_pooling` field is not preserved.
    pub fn to_feature(&self) -> LayerFeature {
        self.kind.to_feature()
    }

    /// Returns a concise summary string for display.
    pub fn summary(&self) -> String {
        let index = self
            .index
            .map_or_else(|| "-".to_string(), |i| i.to_string());
        match (self.input_shape(), self.output_shape()) {
            (Some(input), Some(output)) => format!(
                "[{index}] {} ({}): in {input}, out {output}, {} params",
                self.name,
                self.layer_type(),
                self.param_count(),
            ),
            _ => format!(
                "[{index}] {} ({}): malformed, {} defects",
                self.name,
                self.layer_type(),
                self.feature_defects().len(),
            ),
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Small grid covering non-positive and positive values.
    const GRID: [i32; 4] = [-1, 0, 1, 3];

    fn linear_type(t: LinearLayerType) -> LayerType {
        LayerType::Linear(t)
    }

    fn nonlinear_type(t: NonlinearLayerType) -> LayerType {
        LayerType::Nonlinear(t)
    }

    #[test]
    fn test_conv_paths_agree() {
        for ic in GRID {
            for oc in GRID {
                for fs in GRID {
                    for ks in GRID {
                        for st in GRID {
                            let explicit = Layer::conv("c", ic, oc, fs, ks, st);
                            let bagged = Layer::from_feature(
                                "c",
                                linear_type(LinearLayerType::Conv),
                                LayerFeature::conv(ic, oc, fs, ks, st),
                            );
                            assert_eq!(explicit, bagged);
                            assert_eq!(explicit.check_features(), bagged.check_features());
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_every_variant_round_trips_through_feature() {
        let layers = [
            Layer::linear("a", 4, 5),
            Layer::conv("a", 3, 16, 32, 3, 1),
            Layer::dwconv("a", 16, 32, 3, 2),
            Layer::residual("a", 16, 32, 1, 3),
            Layer::batchnorm("a", 16, 32),
            Layer::trconv("a", 16, 8, 8, 4, 2, 1),
            Layer::ngconv("a", 16, 32, 8, 3, 1, 4),
            Layer::vdp("a", 64),
            Layer::vadd("a", 64),
            Layer::gemm("a", 4, 8, 16),
            Layer::pooling("a", 16, 32, 2, 2),
            Layer::softmax1d("a", 10),
            Layer::softmax2d("a", 4, 10),
            Layer::relu("a", 16, 32),
            Layer::tanh("a", 16, 32),
            Layer::sigmoid("a", 16, 32),
        ];
        for layer in layers {
            let rebuilt = Layer::from_feature("a", layer.layer_type(), layer.to_feature());
            assert_eq!(rebuilt, layer, "{}", layer.layer_type());
            assert!(layer.check_features(), "{}", layer.layer_type());
        }
    }

    #[test]
    fn test_single_nonpositive_field_fails_every_variant() {
        // (type, well-formed bag, setters that break one load-bearing field)
        type Breaker = fn(&mut LayerFeature, i32);
        let ic: Breaker = |f, v| f.input_channels = v;
        let oc: Breaker = |f, v| f.output_channels = v;
        let fs: Breaker = |f, v| f.feature_size = v;
        let ks: Breaker = |f, v| f.kernel_size = v;
        let st: Breaker = |f, v| f.stride = v;
        let grp: Breaker = |f, v| f.groups = v;

        let conv = LayerFeature::conv(4, 8, 8, 3, 1);
        let map = LayerFeature {
            kernel_size: 2,
            stride: 2,
            ..LayerFeature::feature_map(4, 8)
        };
        let cases: Vec<(LayerType, LayerFeature, Vec<Breaker>)> = vec![
            (linear_type(LinearLayerType::Linear), conv, vec![ic, oc]),
            (linear_type(LinearLayerType::Conv), conv, vec![ic, oc, fs, ks, st]),
            (linear_type(LinearLayerType::DwConv), map, vec![ic, fs, ks, st]),
            (
                linear_type(LinearLayerType::Residual),
                LayerFeature {
                    source_index: 0,
                    appending_index: 1,
                    ..map
                },
                vec![ic, fs],
            ),
            (linear_type(LinearLayerType::Batchnorm), map, vec![ic, fs]),
            (linear_type(LinearLayerType::TrConv), conv, vec![ic, oc, fs, ks, st]),
            (
                linear_type(LinearLayerType::NgConv),
                LayerFeature { groups: 2, ..conv },
                vec![ic, oc, fs, ks, st, grp],
            ),
            (linear_type(LinearLayerType::Vdp), conv, vec![ic]),
            (linear_type(LinearLayerType::Vadd), conv, vec![ic]),
            (linear_type(LinearLayerType::Gemm), conv, vec![ic, fs, oc]),
            (nonlinear_type(NonlinearLayerType::Pooling), map, vec![ic, fs, ks, st]),
            (nonlinear_type(NonlinearLayerType::Softmax1d), conv, vec![ic]),
            (nonlinear_type(NonlinearLayerType::Softmax2d), conv, vec![ic, oc]),
            (nonlinear_type(NonlinearLayerType::Relu), map, vec![ic, fs]),
            (nonlinear_type(NonlinearLayerType::Tanh), map, vec![ic, fs]),
            (nonlinear_type(NonlinearLayerType::Sigmoid), map, vec![ic, fs]),
        ];

        for (layer_type, good, breakers) in cases {
            assert!(
                Layer::from_feature("ok", layer_type, good).check_features(),
                "{layer_type} should be valid"
            );
            for breaker in breakers {
                for bad in [0, -1, -7] {
                    let mut f = good;
                    breaker(&mut f, bad);
                    let layer = Layer::from_feature("bad", layer_type, f);
                    assert!(!layer.check_features(), "{layer_type} accepted {f:?}");
                    assert!(layer.feature_defects().iter().any(|d| matches!(
                        d,
                        FeatureDefect::NonPositive { value, .. } if *value == bad
                    )));
                }
            }
        }
    }

    #[test]
    fn test_kernel_larger_than_feature() {
        let layer = Layer::conv("c", 3, 16, 2, 3, 1);
        assert_eq!(
            layer.feature_defects(),
            vec![FeatureDefect::KernelExceedsFeature { kernel: 3, feature: 2 }]
        );
        assert!(!Layer::dwconv("d", 3, 2, 3, 1).check_features());
        assert!(!Layer::pooling("p", 3, 2, 3, 1).check_features());
        assert!(Layer::pooling("p", 3, 3, 3, 1).check_features());
    }

    #[test]
    fn test_defects_are_all_collected() {
        let layer = Layer::conv("c", 0, -2, 32, 3, 0);
        assert_eq!(layer.feature_defects().len(), 3);
    }

    #[test]
    fn test_residual_sources() {
        assert!(Layer::residual("r", 16, 32, 0, 2).check_features());
        assert_eq!(
            Layer::residual("r", 16, 32, 2, 2).feature_defects(),
            vec![FeatureDefect::IdenticalSources { index: 2 }]
        );
        assert_eq!(
            Layer::residual("r", 16, 32, -1, 2).feature_defects(),
            vec![FeatureDefect::NegativeSource { value: -1 }]
        );
    }

    #[test]
    fn test_trconv_rules() {
        let layer = Layer::trconv("t", 16, 8, 8, 4, 2, 1);
        // (8 - 1) * 2 - 2 + 4 = 16
        assert_eq!(
            layer.output_shape(),
            Some(ActivationShape::FeatureMap { channels: 8, size: 16 })
        );
        assert_eq!(layer.param_count(), 16 * 8 * 4 * 4);

        assert_eq!(
            Layer::trconv("t", 16, 8, 8, 3, 2, 3).feature_defects(),
            vec![FeatureDefect::PaddingTooLarge { padding: 3, kernel: 3 }]
        );
        assert_eq!(
            Layer::trconv("t", 16, 8, 8, 3, 2, -1).feature_defects(),
            vec![FeatureDefect::NegativePadding { value: -1 }]
        );
        // (1 - 1) * 1 - 4 + 3 = -1
        assert_eq!(
            Layer::trconv("t", 16, 8, 1, 3, 1, 2).feature_defects(),
            vec![FeatureDefect::EmptyOutput]
        );
    }

    #[test]
    fn test_ngconv_rules() {
        let layer = Layer::ngconv("g", 16, 32, 8, 3, 1, 4);
        assert!(layer.check_features());
        assert_eq!(layer.param_count(), 16 / 4 * 32 * 3 * 3);

        let bad = Layer::ngconv("g", 16, 30, 8, 3, 1, 4);
        assert_eq!(
            bad.feature_defects(),
            vec![FeatureDefect::GroupsNotDividing {
                groups: 4,
                field: "output_channel",
                value: 30,
            }]
        );
    }

    #[test]
    fn test_shapes() {
        let conv = Layer::conv("c", 3, 16, 32, 3, 1);
        assert_eq!(
            conv.input_shape(),
            Some(ActivationShape::FeatureMap { channels: 3, size: 32 })
        );
        assert_eq!(
            conv.output_shape(),
            Some(ActivationShape::FeatureMap { channels: 16, size: 32 })
        );
        assert_eq!(
            Layer::conv("c", 3, 16, 32, 3, 2).output_shape(),
            Some(ActivationShape::FeatureMap { channels: 16, size: 16 })
        );
        assert_eq!(
            Layer::conv("c", 3, 16, 7, 3, 2).output_shape(),
            Some(ActivationShape::FeatureMap { channels: 16, size: 4 })
        );
        assert_eq!(
            Layer::pooling("p", 16, 32, 2, 2).output_shape(),
            Some(ActivationShape::FeatureMap { channels: 16, size: 16 })
        );
        assert_eq!(
            Layer::gemm("g", 4, 8, 16).output_shape(),
            Some(ActivationShape::Matrix { rows: 4, cols: 16 })
        );
        assert_eq!(
            Layer::vdp("v", 64).output_shape(),
            Some(ActivationShape::Vector { len: 1 })
        );
        assert_eq!(Layer::relu("r", 0, 32).output_shape(), None);
    }

    #[test]
    fn test_param_counts() {
        assert_eq!(Layer::conv("c", 3, 16, 32, 3, 1).param_count(), 3 * 16 * 9);
        assert_eq!(Layer::linear("l", 128, 10).param_count(), 1280);
        assert_eq!(Layer::dwconv("d", 16, 32, 3, 1).param_count(), 16 * 9);
        assert_eq!(Layer::batchnorm("b", 16, 32).param_count(), 32);
        assert_eq!(Layer::gemm("g", 4, 8, 16).param_count(), 128);
        assert_eq!(Layer::relu("r", 16, 32).param_count(), 0);
        assert_eq!(Layer::pooling("p", 16, 32, 2, 2).param_count(), 0);
        assert_eq!(Layer::softmax1d("s", 10).param_count(), 0);
        // Malformed layers contribute nothing.
        assert_eq!(Layer::conv("c", 3, 16, 2, 3, 1).param_count(), 0);
    }

    #[test]
    fn test_param_count_saturates_at_field_limits() {
        let max = i32::MAX;
        let conv = Layer::conv("c", max, max, max, max, 1);
        assert!(conv.check_features());
        assert_eq!(conv.param_count(), u64::MAX);
        assert_eq!(Layer::trconv("t", max, max, max, max, 1, 0).param_count(), u64::MAX);
        assert_eq!(Layer::ngconv("g", max, max, max, max, 1, 1).param_count(), u64::MAX);
        assert_eq!(Layer::dwconv("d", max, max, max, 1).param_count(), u64::MAX);
        // Products that still fit are exact.
        assert_eq!(
            Layer::linear("l", max, max).param_count(),
            u64::try_from(max).unwrap().pow(2)
        );
        assert!(conv.summary().ends_with(&format!("{} params", u64::MAX)));
    }

    #[test]
    fn test_to_feature_zeroes_relu_or_pooling() {
        let bag = LayerFeature {
            relu_or_pooling: 1,
            ..LayerFeature::conv(3, 16, 32, 3, 1)
        };
        let layer = Layer::from_feature("c", LinearLayerType::Conv.into(), bag);
        let rebuilt = layer.to_feature();
        assert_eq!(rebuilt.relu_or_pooling, 0);
        assert_eq!(rebuilt, LayerFeature { relu_or_pooling: 0, ..bag });
    }

    #[test]
    fn test_from_codes() {
        let layer = Layer::from_codes(
            "c",
            LayerFamily::Linear,
            1,
            LayerFeature::conv(3, 16, 32, 3, 1),
        )
        .unwrap();
        assert_eq!(layer, Layer::conv("c", 3, 16, 32, 3, 1));

        let err = Layer::from_codes("x", LayerFamily::Nonlinear, 9, LayerFeature::default())
            .unwrap_err();
        assert_eq!(
            err,
            LayerError::UnknownLayerType {
                family: LayerFamily::Nonlinear,
                code: 9,
            }
        );
        assert_eq!(err.to_string(), "unknown nonlinear layer type code 9");
    }

    #[test]
    fn test_from_type_name() {
        let layer =
            Layer::from_type_name("r", "relu", LayerFeature::feature_map(16, 32)).unwrap();
        assert_eq!(layer, Layer::relu("r", 16, 32));
        assert!(Layer::from_type_name("x", "lstm", LayerFeature::default()).is_err());
    }

    #[test]
    fn test_index_assignment() {
        let layer = Layer::relu("r", 16, 32);
        assert_eq!(layer.index(), None);
        let layer = layer.with_index(4);
        assert_eq!(layer.index(), Some(4));
        assert_eq!(layer.name(), "r");
    }

    #[test]
    fn test_family() {
        assert!(Layer::gemm("g", 1, 2, 3).is_linear());
        assert!(!Layer::softmax2d("s", 2, 3).is_linear());
        assert_eq!(Layer::tanh("t", 1, 1).family(), LayerFamily::Nonlinear);
    }

    #[test]
    fn test_summary() {
        let s = Layer::conv("conv1", 3, 16, 32, 3, 1).with_index(0).summary();
        assert!(s.contains("[0]"));
        assert!(s.contains("conv1 (CONV)"));
        assert!(s.contains("432 params"));

        let s = Layer::relu("r", 0, 0).summary();
        assert!(s.contains("[-]"));
        assert!(s.contains("2 defects"));
    }

    #[test]
    fn test_serde_roundtrip() {
        let layer = Layer::ngconv("g", 16, 32, 8, 3, 1, 4).with_index(2);
        let json = serde_json::to_string(&layer).unwrap();
        let back: Layer = serde_json::from_str(&json).unwrap();
        assert_eq!(back, layer);
    }
}
