//! 数据准备错误类型定义

use thiserror::Error;

/// 词表与批次构建相关错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataError {
    /// 批次为空
    #[error("批次为空")]
    EmptyBatch,

    /// 样本的条件向量维度不一致
    #[error("条件向量维度不一致: 期望 {expected}, 实际 {got}（第 {index} 个样本）")]
    InconsistentCondition {
        index: usize,
        expected: usize,
        got: usize,
    },

    /// 标签越界
    #[error("{kind} 标签越界: {label} >= {size}（第 {index} 个样本）")]
    LabelOutOfRange {
        kind: &'static str,
        index: usize,
        label: usize,
        size: usize,
    },

    /// 输入序列为空
    #[error("第 {0} 个样本的输入序列为空")]
    EmptySequence(usize),
}
