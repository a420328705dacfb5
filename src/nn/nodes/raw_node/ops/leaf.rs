use crate::nn::GraphError;
use crate::nn::nodes::raw_node::TraitNode;
use crate::tensor::Tensor;

/// 输入节点：保存外部数据（常量），不参与梯度计算
pub(in crate::nn) struct Input;

/// 参数节点：可训练的叶子节点，反向传播时在其上累积梯度
pub(in crate::nn) struct Parameter;

impl TraitNode for Input {
    fn type_name(&self) -> &'static str {
        "Input"
    }

    fn calc_value(&self, _parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        Err(GraphError::InvalidOperation(
            "Input节点的值只能由外部设置".to_string(),
        ))
    }

    fn calc_grads(
        &self,
        _parents: &[&Tensor],
        _value: &Tensor,
        _upstream: &Tensor,
    ) -> Result<Vec<Tensor>, GraphError> {
        Ok(Vec::new())
    }
}

impl TraitNode for Parameter {
    fn type_name(&self) -> &'static str {
        "Parameter"
    }

    fn calc_value(&self, _parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        Err(GraphError::InvalidOperation(
            "Parameter节点的值只能由初始化或优化器设置".to_string(),
        ))
    }

    fn calc_grads(
        &self,
        _parents: &[&Tensor],
        _value: &Tensor,
        _upstream: &Tensor,
    ) -> Result<Vec<Tensor>, GraphError> {
        Ok(Vec::new())
    }
}
