/*
 * @Description  : 形状类节点：拼接、切片、选取、堆叠、按索引重排
 *
 * 这些节点只搬运数据，反向传播时把上游梯度“放回”父节点中对应的位置。
 */

use crate::nn::GraphError;
use crate::nn::nodes::raw_node::{TraitNode, expect_parents};
use crate::tensor::Tensor;

/// 沿已有维度拼接任意多个父节点
pub(in crate::nn) struct Concat {
    axis: usize,
}

impl Concat {
    pub(in crate::nn) const fn new(axis: usize) -> Self {
        Self { axis }
    }
}

/// 沿`axis`截取`[start, start + len)`
pub(in crate::nn) struct Narrow {
    axis: usize,
    start: usize,
    len: usize,
}

impl Narrow {
    pub(in crate::nn) const fn new(axis: usize, start: usize, len: usize) -> Self {
        Self { axis, start, len }
    }
}

/// 沿`axis`取第`index`个切片，该维度被移除
pub(in crate::nn) struct Select {
    axis: usize,
    index: usize,
}

impl Select {
    pub(in crate::nn) const fn new(axis: usize, index: usize) -> Self {
        Self { axis, index }
    }
}

/// 沿新维度堆叠形状相同的父节点
pub(in crate::nn) struct Stack {
    axis: usize,
}

impl Stack {
    pub(in crate::nn) const fn new(axis: usize) -> Self {
        Self { axis }
    }
}

/// 沿`axis`按索引重新取切片（索引可重复）
pub(in crate::nn) struct IndexSelect {
    axis: usize,
    indices: Vec<usize>,
}

impl IndexSelect {
    pub(in crate::nn) const fn new(axis: usize, indices: Vec<usize>) -> Self {
        Self { axis, indices }
    }
}

impl TraitNode for Concat {
    fn type_name(&self) -> &'static str {
        "Concat"
    }

    fn calc_value(&self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        if parents.is_empty() {
            return Err(GraphError::InvalidOperation(
                "Concat节点至少需要1个父节点".to_string(),
            ));
        }
        Ok(Tensor::concat(parents, self.axis)?)
    }

    fn calc_grads(
        &self,
        parents: &[&Tensor],
        _value: &Tensor,
        upstream: &Tensor,
    ) -> Result<Vec<Tensor>, GraphError> {
        let mut offset = 0;
        let mut grads = Vec::with_capacity(parents.len());
        for parent in parents {
            let len = parent.shape()[self.axis];
            grads.push(upstream.narrow(self.axis, offset, len)?);
            offset += len;
        }
        Ok(grads)
    }
}

impl TraitNode for Narrow {
    fn type_name(&self) -> &'static str {
        "Narrow"
    }

    fn calc_value(&self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        expect_parents(parents, 1, self.type_name())?;
        Ok(parents[0].narrow(self.axis, self.start, self.len)?)
    }

    fn calc_grads(
        &self,
        parents: &[&Tensor],
        _value: &Tensor,
        upstream: &Tensor,
    ) -> Result<Vec<Tensor>, GraphError> {
        Ok(vec![Tensor::embed_narrow(
            upstream,
            parents[0].shape(),
            self.axis,
            self.start,
        )?])
    }
}

impl TraitNode for Select {
    fn type_name(&self) -> &'static str {
        "Select"
    }

    fn calc_value(&self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        expect_parents(parents, 1, self.type_name())?;
        Ok(parents[0].select(self.axis, self.index)?)
    }

    fn calc_grads(
        &self,
        parents: &[&Tensor],
        _value: &Tensor,
        upstream: &Tensor,
    ) -> Result<Vec<Tensor>, GraphError> {
        Ok(vec![Tensor::embed_select(
            upstream,
            parents[0].shape(),
            self.axis,
            self.index,
        )?])
    }
}

impl TraitNode for Stack {
    fn type_name(&self) -> &'static str {
        "Stack"
    }

    fn calc_value(&self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        if parents.is_empty() {
            return Err(GraphError::InvalidOperation(
                "Stack节点至少需要1个父节点".to_string(),
            ));
        }
        Ok(Tensor::stack(parents, self.axis)?)
    }

    fn calc_grads(
        &self,
        parents: &[&Tensor],
        _value: &Tensor,
        upstream: &Tensor,
    ) -> Result<Vec<Tensor>, GraphError> {
        (0..parents.len())
            .map(|i| upstream.select(self.axis, i).map_err(GraphError::from))
            .collect()
    }
}

impl TraitNode for IndexSelect {
    fn type_name(&self) -> &'static str {
        "IndexSelect"
    }

    fn calc_value(&self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        expect_parents(parents, 1, self.type_name())?;
        Ok(parents[0].index_select(self.axis, &self.indices)?)
    }

    fn calc_grads(
        &self,
        parents: &[&Tensor],
        _value: &Tensor,
        upstream: &Tensor,
    ) -> Result<Vec<Tensor>, GraphError> {
        Ok(vec![Tensor::scatter_add(
            upstream,
            parents[0].shape(),
            self.axis,
            &self.indices,
        )?])
    }
}
