/*
 * @Description  : Graph 句柄（用户级 API）
 */

use super::error::GraphError;
use super::inner::GraphInner;
use crate::nn::NodeId;
use crate::nn::var::{Init, Var};
use crate::tensor::Tensor;
use std::cell::RefCell;
use std::rc::Rc;

/// Graph - 计算图句柄（PyTorch 风格用户 API）
///
/// # 设计原则
/// - 是 `Rc<RefCell<GraphInner>>` 的薄封装
/// - Clone 语义：多个 Graph 引用同一个 GraphInner
/// - 创建的 Var 自动持有图引用
#[derive(Clone)]
pub struct Graph {
    inner: Rc<RefCell<GraphInner>>,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph {
    // ==================== 创建 ====================

    /// 创建新图
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(GraphInner::new())),
        }
    }

    /// 创建带种子的图（用于确定性训练）
    pub fn new_with_seed(seed: u64) -> Self {
        Self {
            inner: Rc::new(RefCell::new(GraphInner::new_with_seed(seed))),
        }
    }

    /// 从现有 Rc 创建句柄
    pub(crate) const fn from_rc(inner: Rc<RefCell<GraphInner>>) -> Self {
        Self { inner }
    }

    /// 获取内部 GraphInner 的不可变引用
    pub fn inner(&self) -> std::cell::Ref<'_, GraphInner> {
        self.inner.borrow()
    }

    /// 获取内部 GraphInner 的可变引用
    pub fn inner_mut(&self) -> std::cell::RefMut<'_, GraphInner> {
        self.inner.borrow_mut()
    }

    /// 获取内部 Rc
    pub(crate) fn inner_rc(&self) -> Rc<RefCell<GraphInner>> {
        Rc::clone(&self.inner)
    }

    /// 检查两个句柄是否指向同一个图
    pub fn same_as(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// 将 NodeId 包装成 Var
    pub fn wrap_node_id(&self, node_id: NodeId) -> Var {
        Var::new(node_id, Rc::clone(&self.inner))
    }

    // ==================== 创建变量 ====================

    /// 创建输入节点并设置数据
    pub fn input(&self, data: &Tensor) -> Result<Var, GraphError> {
        let node_id = self.inner.borrow_mut().new_input_node(data, None)?;
        Ok(self.wrap_node_id(node_id))
    }

    /// 创建命名输入节点
    pub fn input_named(&self, data: &Tensor, name: &str) -> Result<Var, GraphError> {
        let node_id = self.inner.borrow_mut().new_input_node(data, Some(name))?;
        Ok(self.wrap_node_id(node_id))
    }

    /// 创建参数节点（初始化使用图的 RNG）
    pub fn parameter(&self, shape: &[usize], init: Init, name: &str) -> Result<Var, GraphError> {
        let mut g = self.inner.borrow_mut();
        let init_data = init.generate_with_rng(shape, g.rng_mut());
        let node_id = g.new_parameter_node(&init_data, Some(name))?;
        Ok(Var::new(node_id, Rc::clone(&self.inner)))
    }

    /// 创建零张量输入
    pub fn zeros(&self, shape: &[usize]) -> Result<Var, GraphError> {
        self.input(&Tensor::zeros(shape))
    }

    /// 从图的 RNG 采样一个正态分布常量输入
    pub fn normal(&self, mean: f32, std: f32, shape: &[usize]) -> Result<Var, GraphError> {
        let mut g = self.inner.borrow_mut();
        let data = Tensor::normal_with_rng(mean, std, shape, g.rng_mut());
        let node_id = g.new_input_node(&data, None)?;
        Ok(Var::new(node_id, Rc::clone(&self.inner)))
    }

    /// 从图的 RNG 采样一个`[0, 1)`区间的均匀分布随机数
    pub fn uniform_sample(&self) -> f32 {
        use rand::Rng;
        self.inner.borrow_mut().rng_mut().r#gen::<f32>()
    }

    // ==================== 执行 ====================

    /// 清空全部参数梯度
    pub fn zero_grad(&self) {
        self.inner.borrow_mut().zero_grad();
    }

    /// 冻结当前参数值，之后的反向传播基于该快照
    pub fn freeze_parameters(&self) {
        self.inner.borrow_mut().freeze_parameters();
    }

    /// 释放全部临时（非参数）节点
    pub fn release_transient(&self) {
        self.inner.borrow_mut().release_transient();
    }

    pub fn node_count(&self) -> usize {
        self.inner.borrow().node_count()
    }

    /// 所有参数节点（按创建顺序）
    pub fn parameters(&self) -> Vec<Var> {
        let ids = self.inner.borrow().parameter_ids().to_vec();
        ids.into_iter().map(|id| self.wrap_node_id(id)).collect()
    }
}
