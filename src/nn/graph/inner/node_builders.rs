/*
 * @Description  : GraphInner 节点创建
 */

use super::super::error::GraphError;
use super::GraphInner;
use crate::nn::NodeId;
use crate::nn::nodes::raw_node::{Input, NodeType, Parameter, TraitNode};
use crate::tensor::Tensor;

impl GraphInner {
    /// 输入节点（常量，不参与梯度计算）
    pub(in crate::nn) fn new_input_node(
        &mut self,
        value: &Tensor,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        self.register_node(NodeType::Input(Input), &[], value.clone(), name)
    }

    /// 参数节点（可训练，常驻于图中）
    pub(in crate::nn) fn new_parameter_node(
        &mut self,
        value: &Tensor,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        if !value.is_all_finite() {
            return Err(GraphError::InvalidOperation(
                "参数节点的初始值包含非有限数".to_string(),
            ));
        }
        self.register_node(NodeType::Parameter(Parameter), &[], value.clone(), name)
    }

    /// 运算节点：立即根据父节点的当前值计算自身的值
    pub(in crate::nn) fn new_op_node(
        &mut self,
        raw_node: NodeType,
        parents: &[NodeId],
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        let value = {
            let parent_values = self.parent_values(parents)?;
            raw_node.calc_value(&parent_values)?
        };
        self.register_node(raw_node, parents, value, name)
    }
}
