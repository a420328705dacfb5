/*
 * @Description  : 模型层的错误类型
 */

use thiserror::Error;

use super::group::GroupKind;
use crate::data::DataError;
use crate::nn::GraphError;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error(transparent)]
    Data(#[from] DataError),
    #[error("配置无效：{0}")]
    InvalidConfig(String),
    /// 损失出现 NaN/Inf 时立即失败，由外部训练循环决定如何恢复
    #[error("损失`{name}`不是有限值：{value}")]
    NonFiniteLoss { name: &'static str, value: f32 },
    #[error("本轮迭代已经执行过{0}参数组的更新")]
    UpdateAlreadyApplied(GroupKind),
    #[error("{what}数量不一致：期望{expected}，实际{got}")]
    BatchMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },
}
