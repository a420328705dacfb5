/*
 * @Description  : 张量的四则运算（支持 numpy 风格的双向广播）
 *
 * 运算符重载在形状不兼容时会 panic，需要可恢复错误时请使用 `zip_with`。
 */

use ndarray::Zip;
use std::ops::{Add, Div, Mul, Neg, Sub};

use crate::errors::{Operator, TensorError};
use crate::tensor::Tensor;

/// 计算两个形状广播后的形状，不兼容时返回 None
pub(crate) fn broadcast_shape(a: &[usize], b: &[usize]) -> Option<Vec<usize>> {
    let rank = a.len().max(b.len());
    let (offset_a, offset_b) = (rank - a.len(), rank - b.len());
    (0..rank)
        .map(|i| {
            let da = if i >= offset_a { a[i - offset_a] } else { 1 };
            let db = if i >= offset_b { b[i - offset_b] } else { 1 };
            match (da, db) {
                _ if da == db => Some(da),
                (1, _) => Some(db),
                (_, 1) => Some(da),
                _ => None,
            }
        })
        .collect()
}

impl Tensor {
    /// 逐元素二元运算（双向广播）
    pub fn zip_with(
        &self,
        other: &Self,
        operator: Operator,
        f: impl Fn(f32, f32) -> f32,
    ) -> Result<Self, TensorError> {
        let mismatch = || TensorError::OperatorError {
            operator,
            tensor1_shape: self.shape().to_vec(),
            tensor2_shape: other.shape().to_vec(),
        };
        let shape = broadcast_shape(self.shape(), other.shape()).ok_or_else(mismatch)?;
        let a = self.data().broadcast(shape.as_slice()).ok_or_else(mismatch)?;
        let b = other.data().broadcast(shape.as_slice()).ok_or_else(mismatch)?;
        let data = Zip::from(a).and(b).map_collect(|&x, &y| f(x, y));
        Ok(Self::from_array(data))
    }

    /// 逐元素映射
    pub fn map(&self, f: impl Fn(f32) -> f32) -> Self {
        Self::from_array(self.data().mapv(f))
    }
}

macro_rules! impl_binary_op {
    ($trait:ident, $method:ident, $operator:expr, $op:tt) => {
        impl $trait for &Tensor {
            type Output = Tensor;

            fn $method(self, other: &Tensor) -> Tensor {
                match self.zip_with(other, $operator, |a, b| a $op b) {
                    Ok(tensor) => tensor,
                    Err(e) => panic!("{e}"),
                }
            }
        }

        impl $trait for Tensor {
            type Output = Tensor;

            fn $method(self, other: Tensor) -> Tensor {
                &self $op &other
            }
        }

        impl $trait<&Tensor> for Tensor {
            type Output = Tensor;

            fn $method(self, other: &Tensor) -> Tensor {
                &self $op other
            }
        }

        impl $trait<Tensor> for &Tensor {
            type Output = Tensor;

            fn $method(self, other: Tensor) -> Tensor {
                self $op &other
            }
        }

        // 与纯数的运算
        impl $trait<f32> for &Tensor {
            type Output = Tensor;

            fn $method(self, scalar: f32) -> Tensor {
                self.map(|a| a $op scalar)
            }
        }

        impl $trait<f32> for Tensor {
            type Output = Tensor;

            fn $method(self, scalar: f32) -> Tensor {
                &self $op scalar
            }
        }
    };
}

impl_binary_op!(Add, add, Operator::Add, +);
impl_binary_op!(Sub, sub, Operator::Sub, -);
impl_binary_op!(Mul, mul, Operator::Mul, *);
impl_binary_op!(Div, div, Operator::Div, /);

impl Mul<&Tensor> for f32 {
    type Output = Tensor;

    fn mul(self, tensor: &Tensor) -> Tensor {
        tensor * self
    }
}

impl Neg for &Tensor {
    type Output = Tensor;

    fn neg(self) -> Tensor {
        self.map(|a| -a)
    }
}

impl Neg for Tensor {
    type Output = Self;

    fn neg(self) -> Self {
        -&self
    }
}
