/*
 * @Description  : Var 形状变换扩展 trait
 */

use crate::nn::nodes::raw_node::{Concat, IndexSelect, Narrow, NodeType, Select, Stack};
use crate::nn::{GraphError, Var};

/// 形状变换扩展 trait
///
/// 这些操作只搬运数据，梯度会原路放回父节点的对应位置。
pub trait VarShapeOps: Sized {
    /// 沿已有维度`axis`拼接
    fn concat(vars: &[&Self], axis: usize) -> Result<Self, GraphError>;

    /// 沿新维度`axis`堆叠（形状须相同）
    fn stack(vars: &[&Self], axis: usize) -> Result<Self, GraphError>;

    /// 沿`axis`截取`[start, start + len)`
    fn narrow(&self, axis: usize, start: usize, len: usize) -> Result<Self, GraphError>;

    /// 沿`axis`取第`index`个切片（该维度被移除）
    fn select(&self, axis: usize, index: usize) -> Result<Self, GraphError>;

    /// 沿`axis`按`indices`重新取切片
    fn index_select(&self, axis: usize, indices: &[usize]) -> Result<Self, GraphError>;
}

impl VarShapeOps for Var {
    fn concat(vars: &[&Self], axis: usize) -> Result<Self, GraphError> {
        Self::op(NodeType::Concat(Concat::new(axis)), vars)
    }

    fn stack(vars: &[&Self], axis: usize) -> Result<Self, GraphError> {
        Self::op(NodeType::Stack(Stack::new(axis)), vars)
    }

    fn narrow(&self, axis: usize, start: usize, len: usize) -> Result<Self, GraphError> {
        Self::op(NodeType::Narrow(Narrow::new(axis, start, len)), &[self])
    }

    fn select(&self, axis: usize, index: usize) -> Result<Self, GraphError> {
        Self::op(NodeType::Select(Select::new(axis, index)), &[self])
    }

    fn index_select(&self, axis: usize, indices: &[usize]) -> Result<Self, GraphError> {
        Self::op(
            NodeType::IndexSelect(IndexSelect::new(axis, indices.to_vec())),
            &[self],
        )
    }
}
