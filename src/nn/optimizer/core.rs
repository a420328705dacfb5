/*
 * @Description  : Optimizer API - PyTorch 风格
 *
 * 核心特性：
 * - Optimizer 持有 Rc<RefCell<GraphInner>> 引用
 * - params 存储 Vec<Var>，一个优化器只更新自己绑定的参数
 * - minimize 只对绑定的参数反向传播，不会给其他参数留下梯度
 */

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::nn::graph::GraphInner;
use crate::nn::{Graph, GraphError, NodeId, Var};
use crate::tensor::Tensor;

/// Optimizer trait（PyTorch 风格）
///
/// # 使用示例
/// ```ignore
/// let mut optimizer = Adam::new(&graph, &model.parameters(), 0.001);
///
/// optimizer.zero_grad()?;
/// loss.backward_for(optimizer.params())?;
/// optimizer.step()?;
///
/// // 或者一步完成
/// let loss_val = optimizer.minimize(&loss)?;
/// ```
pub trait Optimizer {
    /// 清零所有绑定参数的梯度
    fn zero_grad(&mut self) -> Result<(), GraphError>;

    /// 更新参数（只更新 Optimizer 绑定的参数，没有梯度的参数跳过）
    fn step(&mut self) -> Result<(), GraphError>;

    /// 一步完成训练：zero_grad → backward_for(绑定参数) → step
    fn minimize(&mut self, loss: &Var) -> Result<f32, GraphError>;

    /// 获取学习率
    fn learning_rate(&self) -> f32;

    /// 设置学习率
    fn set_learning_rate(&mut self, lr: f32);

    /// 重置累积状态（如 Adam 的动量）
    fn reset(&mut self);
}

/// Adam 优化器（PyTorch 风格）
///
/// Adam: Adaptive Moment Estimation
/// - m = β1 * m + (1 - β1) * g
/// - v = β2 * v + (1 - β2) * g²
/// - θ = θ - α * `m_hat` / (√`v_hat` + ε)
pub struct Adam {
    graph: Rc<RefCell<GraphInner>>,
    params: Vec<Var>,
    lr: f32,
    /// β1 (一阶矩衰减)
    beta1: f32,
    /// β2 (二阶矩衰减)
    beta2: f32,
    /// 数值稳定项
    epsilon: f32,
    /// 一阶矩估计（按 `NodeId` 索引）
    m: HashMap<NodeId, Tensor>,
    /// 二阶矩估计（按 `NodeId` 索引）
    v: HashMap<NodeId, Tensor>,
    /// 时间步
    t: usize,
}

impl Adam {
    /// 创建新的 Adam 优化器（β1=0.9, β2=0.999, ε=1e-8）
    pub fn new(graph: &Graph, params: &[Var], lr: f32) -> Self {
        Self::new_with_config(graph, params, lr, 0.9, 0.999, 1e-8)
    }

    /// 创建带完整配置的 Adam 优化器
    pub fn new_with_config(
        graph: &Graph,
        params: &[Var],
        lr: f32,
        beta1: f32,
        beta2: f32,
        epsilon: f32,
    ) -> Self {
        Self {
            graph: graph.inner_rc(),
            params: params.to_vec(),
            lr,
            beta1,
            beta2,
            epsilon,
            m: HashMap::new(),
            v: HashMap::new(),
            t: 0,
        }
    }

    /// 获取优化器绑定的参数列表
    pub fn params(&self) -> &[Var] {
        &self.params
    }

    /// 获取指定参数的一阶矩 m
    pub fn get_momentum(&self, param: &Var) -> Option<&Tensor> {
        self.m.get(&param.node_id())
    }

    /// 获取指定参数的二阶矩 v
    pub fn get_velocity(&self, param: &Var) -> Option<&Tensor> {
        self.v.get(&param.node_id())
    }

    pub const fn timestep(&self) -> usize {
        self.t
    }
}

impl Optimizer for Adam {
    fn zero_grad(&mut self) -> Result<(), GraphError> {
        let ids = self.params.iter().map(Var::node_id).collect::<Vec<_>>();
        self.graph.borrow_mut().zero_grad_of(&ids)
    }

    fn step(&mut self) -> Result<(), GraphError> {
        self.t += 1;
        let bias_correction1 = 1.0 - self.beta1.powi(self.t as i32);
        let bias_correction2 = 1.0 - self.beta2.powi(self.t as i32);

        let mut g = self.graph.borrow_mut();
        for param in &self.params {
            let node_id = param.node_id();
            let Some(grad) = g.get_node_grad(node_id)?.cloned() else {
                continue;
            };
            let current = g.get_node_value(node_id)?.clone();

            // 更新一阶矩与二阶矩
            let m_prev = self
                .m
                .remove(&node_id)
                .unwrap_or_else(|| Tensor::zeros(grad.shape()));
            let v_prev = self
                .v
                .remove(&node_id)
                .unwrap_or_else(|| Tensor::zeros(grad.shape()));
            let m = &m_prev * self.beta1 + &grad * (1.0 - self.beta1);
            let v = &v_prev * self.beta2 + &(&grad * &grad) * (1.0 - self.beta2);

            // 偏差修正
            let m_hat = &m / bias_correction1;
            let v_hat = &v / bias_correction2;
            let denom = v_hat.sqrt() + self.epsilon;
            let new_value = &current - &(&(&m_hat / &denom) * self.lr);

            g.set_node_value(node_id, &new_value)?;
            self.m.insert(node_id, m);
            self.v.insert(node_id, v);
        }
        Ok(())
    }

    fn minimize(&mut self, loss: &Var) -> Result<f32, GraphError> {
        self.zero_grad()?;
        let loss_val = loss.backward_for(&self.params)?;
        self.step()?;
        Ok(loss_val)
    }

    fn learning_rate(&self) -> f32 {
        self.lr
    }

    fn set_learning_rate(&mut self, lr: f32) {
        self.lr = lr;
    }

    fn reset(&mut self) {
        self.m.clear();
        self.v.clear();
        self.t = 0;
    }
}
