/*
 * @Description  : Var 矩阵运算与归约扩展 trait
 */

use crate::nn::nodes::raw_node::{MatMul, NodeType, Sum};
use crate::nn::{GraphError, Var};

/// 矩阵运算扩展 trait
///
/// # 使用示例
/// ```ignore
/// let y = x.matmul(&w)?;
/// let row_sums = y.sum_axis(1)?;
/// ```
pub trait VarMatrixOps {
    /// 矩阵乘法：self [m, k] @ other [k, n] = [m, n]
    fn matmul(&self, other: &Var) -> Result<Var, GraphError>;

    /// 沿`axis`求和（保留该维度）
    fn sum_axis(&self, axis: usize) -> Result<Var, GraphError>;

    /// 全部元素求和，输出 [1, 1]
    fn sum_all(&self) -> Result<Var, GraphError>;

    /// 全部元素取平均，输出 [1, 1]
    fn mean_all(&self) -> Result<Var, GraphError>;
}

impl VarMatrixOps for Var {
    fn matmul(&self, other: &Var) -> Result<Var, GraphError> {
        self.check_same_graph(other, "矩阵乘法")?;
        Self::op(NodeType::MatMul(MatMul), &[self, other])
    }

    fn sum_axis(&self, axis: usize) -> Result<Var, GraphError> {
        Self::op(NodeType::Sum(Sum::new(Some(axis))), &[self])
    }

    fn sum_all(&self) -> Result<Var, GraphError> {
        Self::op(NodeType::Sum(Sum::new(None)), &[self])
    }

    fn mean_all(&self) -> Result<Var, GraphError> {
        let count = self.shape()?.iter().product::<usize>();
        self.sum_all()?.try_scale(1.0 / count as f32)
    }
}
