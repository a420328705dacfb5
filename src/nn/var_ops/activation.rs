/*
 * @Description  : Var 激活函数扩展 trait
 *
 * 提供激活函数的链式调用支持，用户需 import 此 trait 后才能使用。
 */

use crate::nn::nodes::raw_node::{Clamp, Exp, NodeType, Sigmoid, Softmax, Tanh};
use crate::nn::{GraphError, Var};

/// 激活函数扩展 trait
///
/// - `sigmoid()`: Sigmoid 激活
/// - `tanh()`: Tanh 激活
/// - `exp()`: 指数
/// - `softmax()`: Softmax 激活（沿最后一维归一化）
/// - `clamp(min, max)`: 截断
pub trait VarActivationOps {
    /// Sigmoid 激活：1 / (1 + exp(-x))
    fn sigmoid(&self) -> Var;

    /// Tanh 激活
    fn tanh(&self) -> Var;

    /// 逐元素 exp(x)
    fn exp(&self) -> Var;

    /// 沿最后一维计算 softmax
    fn softmax(&self) -> Var;

    /// 截断到`[min, max]`，区间外梯度为0
    fn clamp(&self, min: f32, max: f32) -> Result<Var, GraphError>;
}

impl VarActivationOps for Var {
    fn sigmoid(&self) -> Var {
        Self::op(NodeType::Sigmoid(Sigmoid), &[self]).expect("创建 Sigmoid 节点失败")
    }

    fn tanh(&self) -> Var {
        Self::op(NodeType::Tanh(Tanh), &[self]).expect("创建 Tanh 节点失败")
    }

    fn exp(&self) -> Var {
        Self::op(NodeType::Exp(Exp), &[self]).expect("创建 Exp 节点失败")
    }

    fn softmax(&self) -> Var {
        Self::op(NodeType::Softmax(Softmax), &[self]).expect("创建 Softmax 节点失败")
    }

    fn clamp(&self, min: f32, max: f32) -> Result<Var, GraphError> {
        Self::op(NodeType::Clamp(Clamp::new(min, max)?), &[self])
    }
}
