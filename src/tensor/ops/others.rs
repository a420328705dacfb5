use ndarray::{Axis, Ix2};

use crate::errors::{Operator, TensorError};
use crate::tensor::Tensor;

impl Tensor {
    pub fn exp(&self) -> Self {
        self.map(f32::exp)
    }

    pub fn tanh(&self) -> Self {
        self.map(f32::tanh)
    }

    /// 数值稳定的 sigmoid
    pub fn sigmoid(&self) -> Self {
        self.map(|x| {
            if x >= 0.0 {
                1.0 / (1.0 + (-x).exp())
            } else {
                let e = x.exp();
                e / (1.0 + e)
            }
        })
    }

    pub fn sqrt(&self) -> Self {
        self.map(f32::sqrt)
    }

    pub fn clamp(&self, min: f32, max: f32) -> Self {
        self.map(|x| x.clamp(min, max))
    }

    /// 2维矩阵乘法：`[n, k] @ [k, m] = [n, m]`
    pub fn mat_mul(&self, other: &Self) -> Result<Self, TensorError> {
        let a = self
            .data()
            .view()
            .into_dimensionality::<Ix2>()
            .map_err(|_| TensorError::RankMismatch {
                expected: 2,
                got: self.dimension(),
            })?;
        let b = other
            .data()
            .view()
            .into_dimensionality::<Ix2>()
            .map_err(|_| TensorError::RankMismatch {
                expected: 2,
                got: other.dimension(),
            })?;
        if a.ncols() != b.nrows() {
            return Err(TensorError::OperatorError {
                operator: Operator::MatMul,
                tensor1_shape: self.shape().to_vec(),
                tensor2_shape: other.shape().to_vec(),
            });
        }
        Ok(Self::from_array(a.dot(&b).into_dyn()))
    }

    /// 2维矩阵转置
    pub fn transpose(&self) -> Self {
        Self::from_array(self.data().t().to_owned())
    }

    /// 沿`axis`求和并保留该维度（长度变为1）
    pub fn sum_axis_keepdims(&self, axis: usize) -> Result<Self, TensorError> {
        self.check_axis(axis)?;
        Ok(Self::from_array(
            self.data().sum_axis(Axis(axis)).insert_axis(Axis(axis)),
        ))
    }

    pub fn sum(&self) -> f32 {
        self.data().sum()
    }

    pub fn mean(&self) -> f32 {
        if self.size() == 0 {
            0.0
        } else {
            self.sum() / self.size() as f32
        }
    }

    /// 沿最后一维做 softmax
    pub fn softmax_last_axis(&self) -> Self {
        let axis = Axis(self.dimension().saturating_sub(1));
        let max = self
            .data()
            .map_axis(axis, |lane| {
                lane.fold(f32::NEG_INFINITY, |m, &x| m.max(x))
            })
            .insert_axis(axis);
        let exp = (self.data() - &max).mapv(f32::exp);
        let sum = exp.sum_axis(axis).insert_axis(axis);
        Self::from_array(&exp / &sum)
    }

    /// 沿最后一维做 log-softmax
    pub fn log_softmax_last_axis(&self) -> Self {
        let axis = Axis(self.dimension().saturating_sub(1));
        let max = self
            .data()
            .map_axis(axis, |lane| {
                lane.fold(f32::NEG_INFINITY, |m, &x| m.max(x))
            })
            .insert_axis(axis);
        let shifted = self.data() - &max;
        let log_sum = shifted
            .mapv(f32::exp)
            .sum_axis(axis)
            .mapv(f32::ln)
            .insert_axis(axis);
        Self::from_array(&shifted - &log_sum)
    }

    /// 每行最大值的下标（最后一维）
    pub fn argmax_last_axis(&self) -> Vec<usize> {
        let axis = Axis(self.dimension().saturating_sub(1));
        self.data()
            .map_axis(axis, |lane| {
                lane.iter()
                    .enumerate()
                    .fold((0, f32::NEG_INFINITY), |(best, max), (i, &x)| {
                        if x > max { (i, x) } else { (best, max) }
                    })
                    .0
            })
            .iter()
            .copied()
            .collect()
    }

    /// 把广播后的梯度归约回`shape`（对被广播的维度求和）
    pub fn reduce_to_shape(&self, shape: &[usize]) -> Result<Self, TensorError> {
        let mut data = self.data().clone();
        while data.ndim() > shape.len() {
            data = data.sum_axis(Axis(0));
        }
        for (axis, &dim) in shape.iter().enumerate() {
            if dim == 1 && data.shape()[axis] != 1 {
                data = data.sum_axis(Axis(axis)).insert_axis(Axis(axis));
            }
        }
        if data.shape() != shape {
            return Err(TensorError::OperatorError {
                operator: Operator::ReduceToShape,
                tensor1_shape: self.shape().to_vec(),
                tensor2_shape: shape.to_vec(),
            });
        }
        Ok(Self::from_array(data))
    }

    /// 把张量广播成`shape`（用于求和节点的反向传播）
    pub fn broadcast_to(&self, shape: &[usize]) -> Result<Self, TensorError> {
        let view = self
            .data()
            .broadcast(shape)
            .ok_or_else(|| TensorError::OperatorError {
                operator: Operator::Add,
                tensor1_shape: self.shape().to_vec(),
                tensor2_shape: shape.to_vec(),
            })?;
        Ok(Self::from_array(view.to_owned()))
    }

    pub(crate) fn check_axis(&self, axis: usize) -> Result<(), TensorError> {
        if axis >= self.dimension() {
            return Err(TensorError::AxisOutOfRange {
                axis,
                ndim: self.dimension(),
            });
        }
        Ok(())
    }
}
