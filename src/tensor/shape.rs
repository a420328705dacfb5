/*
 * @Description  : 张量的形状类操作：拼接、堆叠、切片、选取，以及它们反向传播时用到的“回填”操作
 */

use ndarray::{Axis, Slice};

use crate::errors::{Operator, TensorError};
use crate::tensor::Tensor;

impl Tensor {
    /// 沿已有维度`axis`拼接
    pub fn concat(tensors: &[&Self], axis: usize) -> Result<Self, TensorError> {
        let first = tensors.first().ok_or(TensorError::EmptyList)?;
        first.check_axis(axis)?;
        let views = tensors.iter().map(|t| t.data().view()).collect::<Vec<_>>();
        let data = ndarray::concatenate(Axis(axis), &views).map_err(|_| {
            TensorError::OperatorError {
                operator: Operator::Concat,
                tensor1_shape: first.shape().to_vec(),
                tensor2_shape: tensors
                    .iter()
                    .map(|t| t.shape().to_vec())
                    .find(|s| s.as_slice() != first.shape())
                    .unwrap_or_default(),
            }
        })?;
        Ok(Self::from_array(data))
    }

    /// 沿新维度`axis`堆叠（所有张量形状须一致）
    pub fn stack(tensors: &[&Self], axis: usize) -> Result<Self, TensorError> {
        let first = tensors.first().ok_or(TensorError::EmptyList)?;
        if axis > first.dimension() {
            return Err(TensorError::AxisOutOfRange {
                axis,
                ndim: first.dimension() + 1,
            });
        }
        let views = tensors.iter().map(|t| t.data().view()).collect::<Vec<_>>();
        let data =
            ndarray::stack(Axis(axis), &views).map_err(|_| TensorError::OperatorError {
                operator: Operator::Stack,
                tensor1_shape: first.shape().to_vec(),
                tensor2_shape: tensors
                    .iter()
                    .map(|t| t.shape().to_vec())
                    .find(|s| s.as_slice() != first.shape())
                    .unwrap_or_default(),
            })?;
        Ok(Self::from_array(data))
    }

    /// 沿`axis`截取`[start, start + len)`
    pub fn narrow(&self, axis: usize, start: usize, len: usize) -> Result<Self, TensorError> {
        self.check_range(axis, start, start + len)?;
        Ok(Self::from_array(
            self.data()
                .slice_axis(Axis(axis), Slice::from(start..start + len))
                .to_owned(),
        ))
    }

    /// 沿`axis`取第`index`个切片（该维度被移除）
    pub fn select(&self, axis: usize, index: usize) -> Result<Self, TensorError> {
        self.check_range(axis, index, index + 1)?;
        Ok(Self::from_array(
            self.data().index_axis(Axis(axis), index).to_owned(),
        ))
    }

    /// 沿`axis`按`indices`重新取切片（可用于排序/重排批次）
    pub fn index_select(&self, axis: usize, indices: &[usize]) -> Result<Self, TensorError> {
        self.check_axis(axis)?;
        let len = self.shape()[axis];
        if let Some(&bad) = indices.iter().find(|&&i| i >= len) {
            return Err(TensorError::RangeOutOfBounds {
                axis,
                start: bad,
                end: bad + 1,
                len,
            });
        }
        Ok(Self::from_array(self.data().select(Axis(axis), indices)))
    }

    /// `narrow`的反向：把`part`放回形状为`shape`的零张量的对应区间
    pub(crate) fn embed_narrow(
        part: &Self,
        shape: &[usize],
        axis: usize,
        start: usize,
    ) -> Result<Self, TensorError> {
        let mut full = Self::zeros(shape);
        full.check_range(axis, start, start + part.shape()[axis])?;
        full.data
            .slice_axis_mut(Axis(axis), Slice::from(start..start + part.shape()[axis]))
            .assign(part.data());
        Ok(full)
    }

    /// `select`的反向：把`part`放回形状为`shape`的零张量的第`index`个切片
    pub(crate) fn embed_select(
        part: &Self,
        shape: &[usize],
        axis: usize,
        index: usize,
    ) -> Result<Self, TensorError> {
        let mut full = Self::zeros(shape);
        full.check_range(axis, index, index + 1)?;
        full.data.index_axis_mut(Axis(axis), index).assign(part.data());
        Ok(full)
    }

    /// `index_select`的反向：按`indices`把各切片累加回原位置
    pub(crate) fn scatter_add(
        part: &Self,
        shape: &[usize],
        axis: usize,
        indices: &[usize],
    ) -> Result<Self, TensorError> {
        let mut full = Self::zeros(shape);
        for (k, &src) in indices.iter().enumerate() {
            full.check_range(axis, src, src + 1)?;
            let slice = part.data().index_axis(Axis(axis), k);
            let mut target = full.data.index_axis_mut(Axis(axis), src);
            target += &slice;
        }
        Ok(full)
    }

    fn check_range(&self, axis: usize, start: usize, end: usize) -> Result<(), TensorError> {
        self.check_axis(axis)?;
        let len = self.shape()[axis];
        if start >= end || end > len {
            return Err(TensorError::RangeOutOfBounds {
                axis,
                start,
                end,
                len,
            });
        }
        Ok(())
    }
}
