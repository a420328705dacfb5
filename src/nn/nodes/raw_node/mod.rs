mod loss;
mod ops;

pub(in crate::nn) use loss::*;
pub(in crate::nn) use ops::*;

use enum_dispatch::enum_dispatch;

use crate::nn::GraphError;
use crate::tensor::Tensor;

#[enum_dispatch]
pub(in crate::nn) enum NodeType {
    // 叶子节点
    Input(Input),
    Parameter(Parameter),
    // 逐元素运算
    Add(Add),
    Subtract(Subtract),
    Multiply(Multiply),
    Divide(Divide),
    ScalarMultiply(ScalarMultiply),
    // 矩阵与归约
    MatMul(MatMul),
    Sum(Sum),
    // 激活
    Tanh(Tanh),
    Sigmoid(Sigmoid),
    Exp(Exp),
    Clamp(Clamp),
    Softmax(Softmax),
    // 形状
    Concat(Concat),
    Narrow(Narrow),
    Select(Select),
    Stack(Stack),
    IndexSelect(IndexSelect),
    // 损失
    BceLoss(BceLoss),
    SoftmaxCrossEntropy(SoftmaxCrossEntropy),
    MultiLabelSoftMargin(MultiLabelSoftMargin),
    MaskedCrossEntropy(MaskedCrossEntropy),
}

#[enum_dispatch(NodeType)]
pub(in crate::nn) trait TraitNode {
    fn type_name(&self) -> &'static str;

    /// 根据父节点的值计算本节点的值（父节点的值按创建时传入的顺序排列）
    fn calc_value(&self, parents: &[&Tensor]) -> Result<Tensor, GraphError>;

    /// VJP：给定本节点的上游梯度，返回对每个父节点的梯度（顺序与父节点一致）
    fn calc_grads(
        &self,
        parents: &[&Tensor],
        value: &Tensor,
        upstream: &Tensor,
    ) -> Result<Vec<Tensor>, GraphError>;
}

/// 父节点数量校验
pub(in crate::nn) fn expect_parents(
    parents: &[&Tensor],
    count: usize,
    type_name: &str,
) -> Result<(), GraphError> {
    if parents.len() != count {
        return Err(GraphError::InvalidOperation(format!(
            "{type_name}节点需要{count}个父节点，实际为{}个",
            parents.len()
        )));
    }
    Ok(())
}

/// 从`[1, 1]`上游梯度中取出标量（损失节点使用）
pub(in crate::nn) fn upstream_scalar(upstream: &Tensor, type_name: &str) -> Result<f32, GraphError> {
    upstream.get_data_number().ok_or_else(|| {
        GraphError::ComputationError(format!(
            "{type_name}的上游梯度应为标量，实际形状为{:?}",
            upstream.shape()
        ))
    })
}
