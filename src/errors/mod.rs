use thiserror::Error;
mod ops;
pub use self::ops::*;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TensorError {
    #[error("数据长度为{len}，与形状{shape:?}不符")]
    DataShapeMismatch { len: usize, shape: Vec<usize> },
    // 张量二元运算
    #[error(
        "形状不一致，故无法{operator}：第一个张量的形状为{tensor1_shape:?}，第二个张量的形状为{tensor2_shape:?}"
    )]
    OperatorError {
        operator: Operator,
        tensor1_shape: Vec<usize>,
        tensor2_shape: Vec<usize>,
    },
    #[error("张量列表为空")]
    EmptyList,
    #[error("需要{expected}维张量，实际为{got}维")]
    RankMismatch { expected: usize, got: usize },
    #[error("维度{axis}超出张量的维数{ndim}")]
    AxisOutOfRange { axis: usize, ndim: usize },
    #[error("区间[{start}, {end})超出维度{axis}的长度{len}")]
    RangeOutOfBounds {
        axis: usize,
        start: usize,
        end: usize,
        len: usize,
    },
}
