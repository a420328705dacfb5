/*
 * @Description  : Var 损失函数扩展 trait
 *
 * 目标值均为常量（Tensor 或下标），保存在损失节点内部，不进入计算图。
 */

use crate::nn::nodes::raw_node::{
    BceLoss, MaskedCrossEntropy, MultiLabelSoftMargin, NodeType, SoftmaxCrossEntropy,
};
use crate::nn::{GraphError, Var};
use crate::tensor::Tensor;

/// 损失函数扩展 trait
///
/// # 使用示例
/// ```ignore
/// let d_loss = d_real.bce_loss(&Tensor::ones(&[batch, 1]))?;
/// let da_loss = da_logits.softmax_cross_entropy(&labels)?;
/// ```
pub trait VarLossOps {
    /// 二元交叉熵（输入为概率），对全部元素取平均
    fn bce_loss(&self, target: &Tensor) -> Result<Var, GraphError>;

    /// Softmax 交叉熵（输入为 logits [batch, classes]），对批次取平均
    fn softmax_cross_entropy(&self, labels: &[usize]) -> Result<Var, GraphError>;

    /// 多标签软间隔损失（输入为 logits，目标为 multi-hot）
    fn multi_label_soft_margin(&self, target: &Tensor) -> Result<Var, GraphError>;

    /// 序列交叉熵（输入为 logits [batch, steps, vocab]），只统计有效位置
    fn masked_cross_entropy(
        &self,
        targets: &[Vec<usize>],
        lengths: &[usize],
    ) -> Result<Var, GraphError>;
}

impl VarLossOps for Var {
    fn bce_loss(&self, target: &Tensor) -> Result<Var, GraphError> {
        Self::op(NodeType::BceLoss(BceLoss::new(target.clone())?), &[self])
    }

    fn softmax_cross_entropy(&self, labels: &[usize]) -> Result<Var, GraphError> {
        Self::op(
            NodeType::SoftmaxCrossEntropy(SoftmaxCrossEntropy::new(labels.to_vec())),
            &[self],
        )
    }

    fn multi_label_soft_margin(&self, target: &Tensor) -> Result<Var, GraphError> {
        Self::op(
            NodeType::MultiLabelSoftMargin(MultiLabelSoftMargin::new(target.clone())),
            &[self],
        )
    }

    fn masked_cross_entropy(
        &self,
        targets: &[Vec<usize>],
        lengths: &[usize],
    ) -> Result<Var, GraphError> {
        Self::op(
            NodeType::MaskedCrossEntropy(MaskedCrossEntropy::new(
                targets.to_vec(),
                lengths.to_vec(),
            )?),
            &[self],
        )
    }
}
