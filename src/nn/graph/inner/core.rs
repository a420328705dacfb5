/*
 * @Description  : GraphInner 核心操作
 */

use super::super::error::GraphError;
use super::GraphInner;
use crate::nn::NodeId;
use crate::nn::nodes::NodeHandle;
use crate::nn::nodes::raw_node::{NodeType, TraitNode};
use crate::tensor::Tensor;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::HashMap;

impl GraphInner {
    // ========== 创建 ==========

    /// 创建一个随机种子来自系统熵的计算图
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// 创建一个带固定种子的计算图（确保可重复性）
    pub fn new_with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            nodes: HashMap::new(),
            backward_edges: HashMap::new(),
            parameter_ids: Vec::new(),
            named_nodes: HashMap::new(),
            next_id: 0,
            rng,
            frozen_parameters: None,
            backward_pass_count: 0,
        }
    }

    /// 设置/重置图的随机种子
    pub fn set_seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    // ========== 基础访问器 ==========

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// 所有参数节点（按创建顺序）
    pub fn parameter_ids(&self) -> &[NodeId] {
        &self.parameter_ids
    }

    pub const fn backward_pass_count(&self) -> u64 {
        self.backward_pass_count
    }

    pub(in crate::nn) fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    pub(in crate::nn) fn get_node(&self, id: NodeId) -> Result<&NodeHandle, GraphError> {
        self.nodes.get(&id).ok_or(GraphError::NodeNotFound(id))
    }

    pub(in crate::nn) fn get_node_mut(&mut self, id: NodeId) -> Result<&mut NodeHandle, GraphError> {
        self.nodes.get_mut(&id).ok_or(GraphError::NodeNotFound(id))
    }

    pub fn get_node_value(&self, id: NodeId) -> Result<&Tensor, GraphError> {
        Ok(self.get_node(id)?.value())
    }

    pub fn get_node_grad(&self, id: NodeId) -> Result<Option<&Tensor>, GraphError> {
        Ok(self.get_node(id)?.grad())
    }

    pub fn get_node_name(&self, id: NodeId) -> Result<&str, GraphError> {
        Ok(self.get_node(id)?.name())
    }

    pub fn is_parameter(&self, id: NodeId) -> Result<bool, GraphError> {
        Ok(self.get_node(id)?.is_parameter())
    }

    /// 设置叶子节点（Input/Parameter）的值，形状必须与原值一致
    pub fn set_node_value(&mut self, id: NodeId, value: &Tensor) -> Result<(), GraphError> {
        self.get_node_mut(id)?.set_value(value)
    }

    /// 直接覆盖参数梯度（梯度裁剪使用）
    pub fn set_node_grad(&mut self, id: NodeId, grad: Option<Tensor>) -> Result<(), GraphError> {
        let node = self.get_node_mut(id)?;
        if !node.is_parameter() {
            return Err(GraphError::InvalidOperation(format!(
                "只有参数节点可以设置梯度，{node}不是参数节点"
            )));
        }
        if let Some(g) = &grad {
            if g.shape() != node.value().shape() {
                return Err(GraphError::ShapeMismatch {
                    expected: node.value().shape().to_vec(),
                    got: g.shape().to_vec(),
                    message: format!("{node}的梯度形状必须与值一致"),
                });
            }
        }
        node.set_grad(grad);
        Ok(())
    }

    pub(in crate::nn) fn parents_of(&self, id: NodeId) -> &[NodeId] {
        self.backward_edges.get(&id).map_or(&[], Vec::as_slice)
    }

    // ========== 节点登记 ==========

    /// 登记一个新节点。`value`须已由调用方计算好（叶子节点）或由 raw 节点算出（运算节点）
    pub(in crate::nn::graph) fn register_node(
        &mut self,
        raw_node: NodeType,
        parents: &[NodeId],
        value: Tensor,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        if let Some(name) = name {
            if self.named_nodes.contains_key(name) {
                return Err(GraphError::DuplicateNodeName(name.to_string()));
            }
        }

        let id = NodeId(self.next_id);
        self.next_id += 1;

        let node_name = name.map_or_else(
            || format!("{}_{}", raw_node.type_name().to_lowercase(), id.get()),
            str::to_string,
        );
        let handle = NodeHandle::new(id, node_name, raw_node, value);

        if handle.is_parameter() {
            self.parameter_ids.push(id);
        }
        if let Some(name) = name {
            self.named_nodes.insert(name.to_string(), id);
        }
        if !parents.is_empty() {
            self.backward_edges.insert(id, parents.to_vec());
        }
        self.nodes.insert(id, handle);
        Ok(id)
    }

    /// 父节点在前向计算时看到的值
    pub(in crate::nn::graph) fn parent_values(&self, parents: &[NodeId]) -> Result<Vec<&Tensor>, GraphError> {
        parents.iter().map(|&p| self.get_node_value(p)).collect()
    }

    // ========== 参数快照 ==========

    /// 冻结当前全部参数的值
    ///
    /// 之后的反向传播读取快照中的参数值，使得同一次前向结果上先后进行的多次更新
    /// 都基于前向时刻的参数求梯度。`release_transient`会清除快照。
    pub fn freeze_parameters(&mut self) {
        let snapshot = self
            .parameter_ids
            .iter()
            .filter_map(|id| self.nodes.get(id).map(|n| (*id, n.value().clone())))
            .collect();
        self.frozen_parameters = Some(snapshot);
    }

    pub const fn has_frozen_parameters(&self) -> bool {
        self.frozen_parameters.is_some()
    }

    /// 反向传播时读取的节点值：冻结的参数读快照，其余读当前值
    pub(in crate::nn::graph) fn value_for_backward(&self, id: NodeId) -> Result<&Tensor, GraphError> {
        if let Some(frozen) = self.frozen_parameters.as_ref().and_then(|m| m.get(&id)) {
            return Ok(frozen);
        }
        self.get_node_value(id)
    }

    // ========== 释放 ==========

    /// 释放全部非参数节点，并清除参数快照
    ///
    /// 已释放节点的 `Var` 再次使用会得到 `NodeNotFound`。
    pub fn release_transient(&mut self) {
        self.nodes.retain(|_, node| node.is_parameter());
        self.backward_edges.clear();
        let nodes = &self.nodes;
        self.named_nodes.retain(|_, id| nodes.contains_key(id));
        self.frozen_parameters = None;
    }

    // ========== 梯度 ==========

    /// 清空全部参数的梯度
    pub fn zero_grad(&mut self) {
        for id in &self.parameter_ids {
            if let Some(node) = self.nodes.get_mut(id) {
                node.clear_grad();
            }
        }
    }

    /// 清空指定参数的梯度
    pub fn zero_grad_of(&mut self, ids: &[NodeId]) -> Result<(), GraphError> {
        for &id in ids {
            self.get_node_mut(id)?.clear_grad();
        }
        Ok(())
    }
}
