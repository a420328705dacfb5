/*
 * @Description  : Var - 变量句柄，支持算子重载和链式调用
 */

use super::graph::GraphInner;
use super::nodes::raw_node::{Add as AddNode, Divide, Multiply, NodeType, ScalarMultiply, Subtract};
use super::{GraphError, NodeId};
use crate::tensor::Tensor;
use rand::rngs::StdRng;
use std::cell::RefCell;
use std::ops::{Add, Div, Mul, Neg, Sub};
use std::rc::Rc;

// ==================== Init 枚举 ====================

/// 参数初始化策略
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Init {
    /// 常数初始化
    Constant(f32),
    /// 全零
    Zeros,
    /// 正态分布
    Normal { mean: f32, std: f32 },
    /// Xavier/Glorot 初始化（适用于 Sigmoid/Tanh）
    Xavier,
}

impl Init {
    /// 生成初始化后的 Tensor（使用指定的 RNG）
    pub fn generate_with_rng(&self, shape: &[usize], rng: &mut StdRng) -> Tensor {
        match self {
            Self::Constant(v) => Tensor::full(*v, shape),
            Self::Zeros => Tensor::zeros(shape),
            Self::Normal { mean, std } => Tensor::normal_with_rng(*mean, *std, shape, rng),
            Self::Xavier => {
                let (fan_in, fan_out) = (shape[0], shape.get(1).copied().unwrap_or(1));
                let std = (2.0 / (fan_in + fan_out) as f32).sqrt();
                Tensor::normal_with_rng(0.0, std, shape, rng)
            }
        }
    }
}

// ==================== Var 结构 ====================

/// 变量句柄 - 携带图引用，支持算子重载和链式调用
///
/// # 设计原则
/// - 持有 `Rc<RefCell<GraphInner>>` 引用，实现算子重载
/// - Clone 语义（非 Copy），开销极低（Rc clone）
/// - 图是即时求值的，创建 Var 时其值已经算好
///
/// # 使用示例
/// ```ignore
/// let graph = Graph::new_with_seed(0);
/// let x = graph.input(&features)?;
/// let h = x.matmul(&w)?.tanh();
/// let z = &h + &b;
/// let loss = z.bce_loss(&target)?;
/// loss.backward()?;
/// ```
#[derive(Clone)]
pub struct Var {
    id: NodeId,
    graph: Rc<RefCell<GraphInner>>,
}

impl std::fmt::Debug for Var {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Var").field("id", &self.id).finish()
    }
}

impl Var {
    pub(crate) const fn new(id: NodeId, graph: Rc<RefCell<GraphInner>>) -> Self {
        Self { id, graph }
    }

    pub const fn node_id(&self) -> NodeId {
        self.id
    }

    pub(crate) const fn graph(&self) -> &Rc<RefCell<GraphInner>> {
        &self.graph
    }

    /// 检查两个 Var 是否来自同一个 Graph
    pub fn same_graph(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.graph, &other.graph)
    }

    /// 获取 Var 所属的 Graph handle
    pub fn get_graph(&self) -> super::graph::Graph {
        super::graph::Graph::from_rc(Rc::clone(&self.graph))
    }

    pub(crate) fn check_same_graph(&self, other: &Self, op: &str) -> Result<(), GraphError> {
        if self.same_graph(other) {
            Ok(())
        } else {
            Err(GraphError::InvalidOperation(format!(
                "不能对来自不同 Graph 的 Var 进行{op}"
            )))
        }
    }

    /// 以`parents`为父节点创建运算节点（内部使用）
    pub(in crate::nn) fn op(raw_node: NodeType, parents: &[&Self]) -> Result<Self, GraphError> {
        let first = parents.first().ok_or_else(|| {
            GraphError::InvalidOperation("运算节点至少需要1个父节点".to_string())
        })?;
        for other in &parents[1..] {
            first.check_same_graph(other, "运算")?;
        }
        let ids = parents.iter().map(|v| v.id).collect::<Vec<_>>();
        let id = first.graph.borrow_mut().new_op_node(raw_node, &ids, None)?;
        Ok(Self::new(id, Rc::clone(&first.graph)))
    }

    // ==================== 执行 ====================

    /// 对图中全部参数反向传播，返回 loss 的标量值
    pub fn backward(&self) -> Result<f32, GraphError> {
        self.graph.borrow_mut().backward(self.id)
    }

    /// 只对`params`反向传播，返回 loss 的标量值
    pub fn backward_for(&self, params: &[Self]) -> Result<f32, GraphError> {
        let ids = params.iter().map(|p| p.id).collect::<Vec<_>>();
        self.graph.borrow_mut().backward_for(self.id, &ids)
    }

    // ==================== 值访问和设置 ====================

    /// 获取节点的值（克隆的 Tensor）
    pub fn value(&self) -> Result<Tensor, GraphError> {
        Ok(self.graph.borrow().get_node_value(self.id)?.clone())
    }

    /// 节点值的形状
    pub fn shape(&self) -> Result<Vec<usize>, GraphError> {
        Ok(self.graph.borrow().get_node_value(self.id)?.shape().to_vec())
    }

    /// 设置叶子节点的值
    pub fn set_value(&self, value: &Tensor) -> Result<(), GraphError> {
        self.graph.borrow_mut().set_node_value(self.id, value)
    }

    /// 获取标量值（要求是 [1, 1] Tensor）
    pub fn item(&self) -> Result<f32, GraphError> {
        self.graph
            .borrow()
            .get_node_value(self.id)?
            .get_data_number()
            .ok_or_else(|| GraphError::InvalidOperation("Tensor 不是标量".to_string()))
    }

    /// 获取节点的梯度
    pub fn grad(&self) -> Result<Option<Tensor>, GraphError> {
        Ok(self.graph.borrow().get_node_grad(self.id)?.cloned())
    }

    pub fn name(&self) -> Result<String, GraphError> {
        Ok(self.graph.borrow().get_node_name(self.id)?.to_string())
    }

    // ==================== 安全版本（返回 Result）====================

    /// 安全的加法（支持广播）
    pub fn try_add(&self, other: &Self) -> Result<Self, GraphError> {
        self.check_same_graph(other, "加法")?;
        Self::op(NodeType::Add(AddNode), &[self, other])
    }

    /// 安全的减法（支持广播）
    pub fn try_sub(&self, other: &Self) -> Result<Self, GraphError> {
        self.check_same_graph(other, "减法")?;
        Self::op(NodeType::Subtract(Subtract), &[self, other])
    }

    /// 安全的元素级乘法（支持广播）
    pub fn try_mul(&self, other: &Self) -> Result<Self, GraphError> {
        self.check_same_graph(other, "乘法")?;
        Self::op(NodeType::Multiply(Multiply), &[self, other])
    }

    /// 安全的元素级除法（支持广播）
    pub fn try_div(&self, other: &Self) -> Result<Self, GraphError> {
        self.check_same_graph(other, "除法")?;
        Self::op(NodeType::Divide(Divide), &[self, other])
    }

    /// 数乘：factor * self
    pub fn try_scale(&self, factor: f32) -> Result<Self, GraphError> {
        Self::op(NodeType::ScalarMultiply(ScalarMultiply::new(factor)), &[self])
    }
}

// ==================== 算子重载 ====================

macro_rules! impl_var_binary_op {
    ($trait:ident, $method:ident, $try_method:ident, $msg:literal) => {
        impl $trait for &Var {
            type Output = Var;

            fn $method(self, other: &Var) -> Var {
                self.$try_method(other).expect($msg)
            }
        }

        impl $trait for Var {
            type Output = Self;

            fn $method(self, other: Self) -> Self {
                (&self).$method(&other)
            }
        }

        impl $trait<Var> for &Var {
            type Output = Var;

            fn $method(self, other: Var) -> Var {
                self.$method(&other)
            }
        }

        impl $trait<&Self> for Var {
            type Output = Self;

            fn $method(self, other: &Self) -> Self {
                (&self).$method(other)
            }
        }
    };
}

impl_var_binary_op!(Add, add, try_add, "Var 加法失败");
impl_var_binary_op!(Sub, sub, try_sub, "Var 减法失败");
impl_var_binary_op!(Mul, mul, try_mul, "Var 乘法失败");
impl_var_binary_op!(Div, div, try_div, "Var 除法失败");

// 数乘
impl Mul<f32> for &Var {
    type Output = Var;

    fn mul(self, factor: f32) -> Var {
        self.try_scale(factor).expect("Var 数乘失败")
    }
}

impl Mul<f32> for Var {
    type Output = Self;

    fn mul(self, factor: f32) -> Self {
        &self * factor
    }
}

// Neg for &Var（实现为 -1 * self）
impl Neg for &Var {
    type Output = Var;

    fn neg(self) -> Var {
        self * -1.0
    }
}

impl Neg for Var {
    type Output = Self;

    fn neg(self) -> Self {
        -&self
    }
}
