/*
 * @Description  : GraphInner VJP 反向传播
 *
 * 反向传播只把梯度累积到“目标参数”上：中间节点的梯度保存在局部表中，
 * 与目标参数之间没有路径的节点直接跳过。这样不同参数组之间的梯度互不泄漏。
 */

use super::super::error::GraphError;
use super::GraphInner;
use crate::nn::NodeId;
use crate::nn::nodes::raw_node::TraitNode;
use crate::tensor::Tensor;
use std::collections::{HashMap, HashSet};

impl GraphInner {
    // ========== VJP 反向传播核心 ==========

    /// 对全部参数反向传播，返回损失的标量值
    pub fn backward(&mut self, loss: NodeId) -> Result<f32, GraphError> {
        let targets = self.parameter_ids.clone();
        self.backward_for(loss, &targets)
    }

    /// 只对`targets`中的参数反向传播并累积梯度，返回损失的标量值
    ///
    /// 目标之外的参数梯度保持不变；与损失无关的目标参数也保持不变。
    pub fn backward_for(&mut self, loss: NodeId, targets: &[NodeId]) -> Result<f32, GraphError> {
        let loss_value = self.get_node_value(loss)?;
        let loss_scalar = loss_value.get_data_number().ok_or_else(|| {
            GraphError::InvalidOperation(format!(
                "反向传播要求损失为标量 [1, 1]，但得到 {:?}",
                loss_value.shape()
            ))
        })?;

        let target_set: HashSet<NodeId> = targets.iter().copied().collect();
        for id in &target_set {
            if !self.is_parameter(*id)? {
                return Err(GraphError::InvalidOperation(format!(
                    "反向传播的目标{}不是参数节点",
                    self.get_node(*id)?
                )));
            }
        }

        let grads = self.backward_vjp_core(loss, &target_set)?;
        for (id, grad) in grads {
            if target_set.contains(&id) {
                self.get_node_mut(id)?.accumulate_grad(&grad);
            }
        }

        self.backward_pass_count += 1;
        Ok(loss_scalar)
    }

    /// 计算 loss 对所有相关节点的梯度（不修改图）
    fn backward_vjp_core(
        &self,
        loss: NodeId,
        targets: &HashSet<NodeId>,
    ) -> Result<HashMap<NodeId, Tensor>, GraphError> {
        // 父节点在前、子节点在后
        let order = self.topological_sort_backward(loss);

        // 只有能到达某个目标参数的节点才需要梯度
        let mut relevant: HashSet<NodeId> = HashSet::new();
        for &id in &order {
            if targets.contains(&id) || self.parents_of(id).iter().any(|p| relevant.contains(p)) {
                relevant.insert(id);
            }
        }

        let mut grads: HashMap<NodeId, Tensor> = HashMap::new();
        if !relevant.contains(&loss) {
            return Ok(grads);
        }
        grads.insert(loss, Tensor::ones(self.get_node_value(loss)?.shape()));

        for &id in order.iter().rev() {
            let parents = self.parents_of(id);
            if parents.is_empty() || !relevant.contains(&id) {
                continue;
            }
            let Some(upstream) = grads.remove(&id) else {
                continue;
            };

            let node = self.get_node(id)?;
            let parent_values = parents
                .iter()
                .map(|&p| self.value_for_backward(p))
                .collect::<Result<Vec<_>, _>>()?;
            let parent_grads = node
                .raw_node()
                .calc_grads(&parent_values, node.value(), &upstream)?;

            for (&parent, grad) in parents.iter().zip(parent_grads) {
                if !relevant.contains(&parent) {
                    continue;
                }
                match grads.get_mut(&parent) {
                    Some(existing) => *existing = &*existing + &grad,
                    None => {
                        grads.insert(parent, grad);
                    }
                }
            }
        }

        Ok(grads)
    }

    /// 从 loss 出发沿反向边做迭代式 DFS，返回后序（父节点先于子节点）
    fn topological_sort_backward(&self, loss: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut visited = HashSet::new();
        let mut stack = vec![(loss, false)];

        while let Some((id, expanded)) = stack.pop() {
            if expanded {
                order.push(id);
                continue;
            }
            if !visited.insert(id) {
                continue;
            }
            stack.push((id, true));
            for &parent in self.parents_of(id) {
                if !visited.contains(&parent) {
                    stack.push((parent, false));
                }
            }
        }
        order
    }
}
