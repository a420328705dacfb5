use crate::nn::GraphError;
use crate::nn::nodes::raw_node::{TraitNode, expect_parents};
use crate::tensor::Tensor;

/// 求和节点
///
/// - `axis = Some(a)`：沿第 a 维求和并保留该维度（长度变为1）
/// - `axis = None`：对全部元素求和，输出形状为`[1, 1]`
pub(in crate::nn) struct Sum {
    axis: Option<usize>,
}

impl Sum {
    pub(in crate::nn) const fn new(axis: Option<usize>) -> Self {
        Self { axis }
    }
}

impl TraitNode for Sum {
    fn type_name(&self) -> &'static str {
        "Sum"
    }

    fn calc_value(&self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        expect_parents(parents, 1, self.type_name())?;
        match self.axis {
            Some(axis) => Ok(parents[0].sum_axis_keepdims(axis)?),
            None => Ok(Tensor::scalar(parents[0].sum())),
        }
    }

    fn calc_grads(
        &self,
        parents: &[&Tensor],
        _value: &Tensor,
        upstream: &Tensor,
    ) -> Result<Vec<Tensor>, GraphError> {
        let shape = parents[0].shape();
        match self.axis {
            Some(_) => Ok(vec![upstream.broadcast_to(shape)?]),
            None => {
                let g = upstream.get_data_number().ok_or_else(|| {
                    GraphError::ComputationError(format!(
                        "Sum节点的上游梯度应为标量，实际形状为{:?}",
                        upstream.shape()
                    ))
                })?;
                Ok(vec![Tensor::full(g, shape)])
            }
        }
    }
}
