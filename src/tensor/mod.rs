use ndarray::{Array, ArrayD, IxDyn};
use rand::Rng;
use rand::rngs::StdRng;
use std::ops::{Index, IndexMut};

use crate::errors::TensorError;

mod ops {
    pub mod arith;
    pub mod others;
}

mod shape;

#[cfg(test)]
mod tests;

/// 定义张量的结构体。其可以是标量、向量、矩阵或更高维度的数组。
/// 注：只要通Tensor初始化的都是张量（即使标量也是张量）；
/// 而通常意义上的数字（类型为usize、i32、f64等）就只是纯数（number），在这里不被认为是张量。
///
/// 本 crate 中常见的形状约定：
/// - 批数据：`[batch, features]`
/// - 序列数据：`[batch, seq_len, vocab]`
/// - 标量损失：`[1, 1]`
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    data: ArrayD<f32>,
}

impl Tensor {
    /// 创建一个张量，`data`的长度必须和`shape`中所有元素的乘积相等，否则panic。
    /// 需要可恢复错误时请使用[`Tensor::try_new`]。
    pub fn new(data: &[f32], shape: &[usize]) -> Self {
        match Self::try_new(data, shape) {
            Ok(tensor) => tensor,
            Err(e) => panic!("{e}"),
        }
    }

    /// `new`的可失败版本
    pub fn try_new(data: &[f32], shape: &[usize]) -> Result<Self, TensorError> {
        let data = Array::from_shape_vec(IxDyn(shape), data.to_vec()).map_err(|_| {
            TensorError::DataShapeMismatch {
                len: data.len(),
                shape: shape.to_vec(),
            }
        })?;
        Ok(Self { data })
    }

    pub(crate) const fn from_array(data: ArrayD<f32>) -> Self {
        Self { data }
    }

    pub fn zeros(shape: &[usize]) -> Self {
        Self {
            data: ArrayD::zeros(IxDyn(shape)),
        }
    }

    pub fn ones(shape: &[usize]) -> Self {
        Self::full(1.0, shape)
    }

    pub fn full(value: f32, shape: &[usize]) -> Self {
        Self {
            data: ArrayD::from_elem(IxDyn(shape), value),
        }
    }

    /// 创建形状为`[1, 1]`的标量张量
    pub fn scalar(value: f32) -> Self {
        Self::full(value, &[1, 1])
    }

    /// 按`indices`构建 one-hot 矩阵，形状为`[indices.len(), depth]`。
    /// 越界的索引对应全零行。
    pub fn one_hot(indices: &[usize], depth: usize) -> Self {
        let mut data = ArrayD::zeros(IxDyn(&[indices.len(), depth]));
        for (row, &idx) in indices.iter().enumerate() {
            if idx < depth {
                data[[row, idx].as_slice()] = 1.0;
            }
        }
        Self { data }
    }

    /// 使用指定的 RNG 创建服从正态分布的随机张量（Box-Muller 变换）
    pub fn normal_with_rng(mean: f32, std_dev: f32, shape: &[usize], rng: &mut StdRng) -> Self {
        let data_len = shape.iter().product::<usize>();
        let mut data = Vec::with_capacity(data_len);

        while data.len() < data_len {
            let u1: f32 = rng.r#gen();
            let u2: f32 = rng.r#gen();
            let r = (-2.0 * u1.ln()).sqrt();
            let theta = 2.0 * std::f32::consts::PI * u2;
            let z0 = mean + std_dev * r * theta.cos();
            let z1 = mean + std_dev * r * theta.sin();

            if z0.is_finite() {
                data.push(z0);
            }
            if data.len() < data_len && z1.is_finite() {
                data.push(z1);
            }
        }

        Self::new(&data, shape)
    }

    /// 使用指定的 RNG 创建均匀分布于`[min, max)`的随机张量
    pub fn uniform_with_rng(min: f32, max: f32, shape: &[usize], rng: &mut StdRng) -> Self {
        let data = (0..shape.iter().product::<usize>())
            .map(|_| rng.gen_range(min..max))
            .collect::<Vec<_>>();
        Self::new(&data, shape)
    }
}

// 属性
impl Tensor {
    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    pub fn dimension(&self) -> usize {
        self.data.ndim()
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub const fn data(&self) -> &ArrayD<f32> {
        &self.data
    }

    /// 按行优先顺序导出全部元素
    pub fn to_vec(&self) -> Vec<f32> {
        self.data.iter().copied().collect()
    }

    /// 若张量只含1个元素，则返回该元素
    pub fn get_data_number(&self) -> Option<f32> {
        if self.size() == 1 {
            self.data.iter().next().copied()
        } else {
            None
        }
    }

    pub fn is_all_finite(&self) -> bool {
        self.data.iter().all(|x| x.is_finite())
    }

    pub fn has_nan(&self) -> bool {
        self.data.iter().any(|x| x.is_nan())
    }

    /// 所有元素的平方和（用于梯度范数）
    pub fn squared_norm(&self) -> f32 {
        self.data.iter().map(|x| x * x).sum()
    }

    pub fn is_all_zero(&self) -> bool {
        self.data.iter().all(|&x| x == 0.0)
    }
}

impl<const N: usize> Index<[usize; N]> for Tensor {
    type Output = f32;

    fn index(&self, index: [usize; N]) -> &f32 {
        &self.data[index.as_slice()]
    }
}

impl<const N: usize> IndexMut<[usize; N]> for Tensor {
    fn index_mut(&mut self, index: [usize; N]) -> &mut f32 {
        &mut self.data[index.as_slice()]
    }
}
