use std::fmt;

use super::NodeId;
use super::raw_node::{NodeType, TraitNode};
use crate::nn::GraphError;
use crate::tensor::Tensor;

/// 图中节点的统一句柄：原始节点 + 值 + 梯度
///
/// 图是即时（define-by-run）构建的：节点创建时即由父节点的值算出自身的值，
/// 因此非叶子节点的值总是存在。梯度只在参数节点上累积。
pub(in crate::nn) struct NodeHandle {
    id: NodeId,
    name: String,
    raw_node: NodeType,
    value: Tensor,
    grad: Option<Tensor>,
}

impl NodeHandle {
    pub(in crate::nn) fn new(id: NodeId, name: String, raw_node: NodeType, value: Tensor) -> Self {
        Self {
            id,
            name,
            raw_node,
            value,
            grad: None,
        }
    }

    pub(in crate::nn) const fn id(&self) -> NodeId {
        self.id
    }

    pub(in crate::nn) fn name(&self) -> &str {
        &self.name
    }

    pub(in crate::nn) const fn raw_node(&self) -> &NodeType {
        &self.raw_node
    }

    pub(in crate::nn) fn type_name(&self) -> &'static str {
        self.raw_node.type_name()
    }

    pub(in crate::nn) const fn is_parameter(&self) -> bool {
        matches!(self.raw_node, NodeType::Parameter(_))
    }

    pub(in crate::nn) const fn is_input(&self) -> bool {
        matches!(self.raw_node, NodeType::Input(_))
    }

    pub(in crate::nn) const fn value(&self) -> &Tensor {
        &self.value
    }

    /// 只有叶子节点（输入/参数）的值允许被手动设置，且形状不可改变
    pub(in crate::nn) fn set_value(&mut self, value: &Tensor) -> Result<(), GraphError> {
        if !self.is_parameter() && !self.is_input() {
            return Err(GraphError::InvalidOperation(format!(
                "{self}的值只能通过前向传播计算得到，不能直接设置"
            )));
        }
        if value.shape() != self.value.shape() {
            return Err(GraphError::ShapeMismatch {
                expected: self.value.shape().to_vec(),
                got: value.shape().to_vec(),
                message: format!("{self}的新值形状与原值不一致"),
            });
        }
        self.value = value.clone();
        Ok(())
    }

    pub(in crate::nn) const fn grad(&self) -> Option<&Tensor> {
        self.grad.as_ref()
    }

    pub(in crate::nn) fn set_grad(&mut self, grad: Option<Tensor>) {
        self.grad = grad;
    }

    /// 在已有梯度上累加
    pub(in crate::nn) fn accumulate_grad(&mut self, grad: &Tensor) {
        self.grad = Some(match self.grad.take() {
            Some(existing) => &existing + grad,
            None => grad.clone(),
        });
    }

    pub(in crate::nn) fn clear_grad(&mut self) {
        self.grad = None;
    }
}

impl fmt::Display for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "节点[id={}, name={}, type={}]",
            self.id,
            self.name,
            self.type_name()
        )
    }
}
