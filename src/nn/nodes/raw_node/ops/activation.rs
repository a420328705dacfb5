/*
 * @Description  : 逐元素激活节点以及沿最后一维的 Softmax
 */

use crate::nn::GraphError;
use crate::nn::nodes::raw_node::{TraitNode, expect_parents};
use crate::tensor::Tensor;

/// Tanh 激活：backward 为 upstream * (1 - tanh²)
pub(in crate::nn) struct Tanh;

/// Sigmoid 激活：backward 为 upstream * σ * (1 - σ)
pub(in crate::nn) struct Sigmoid;

/// 指数：backward 为 upstream * exp(x)
pub(in crate::nn) struct Exp;

/// 截断到`[min, max]`，区间外的梯度为0
pub(in crate::nn) struct Clamp {
    min: f32,
    max: f32,
}

impl Clamp {
    pub(in crate::nn) fn new(min: f32, max: f32) -> Result<Self, GraphError> {
        if min > max || !min.is_finite() || !max.is_finite() {
            return Err(GraphError::InvalidOperation(format!(
                "Clamp节点的区间[{min}, {max}]无效"
            )));
        }
        Ok(Self { min, max })
    }
}

/// 沿最后一维的 Softmax
///
/// backward: dx = y * (dy - Σ(dy * y))
pub(in crate::nn) struct Softmax;

impl TraitNode for Tanh {
    fn type_name(&self) -> &'static str {
        "Tanh"
    }

    fn calc_value(&self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        expect_parents(parents, 1, self.type_name())?;
        Ok(parents[0].tanh())
    }

    fn calc_grads(
        &self,
        _parents: &[&Tensor],
        value: &Tensor,
        upstream: &Tensor,
    ) -> Result<Vec<Tensor>, GraphError> {
        let local_grad = value.map(|y| 1.0 - y * y);
        Ok(vec![upstream * &local_grad])
    }
}

impl TraitNode for Sigmoid {
    fn type_name(&self) -> &'static str {
        "Sigmoid"
    }

    fn calc_value(&self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        expect_parents(parents, 1, self.type_name())?;
        Ok(parents[0].sigmoid())
    }

    fn calc_grads(
        &self,
        _parents: &[&Tensor],
        value: &Tensor,
        upstream: &Tensor,
    ) -> Result<Vec<Tensor>, GraphError> {
        let local_grad = value.map(|y| y * (1.0 - y));
        Ok(vec![upstream * &local_grad])
    }
}

impl TraitNode for Exp {
    fn type_name(&self) -> &'static str {
        "Exp"
    }

    fn calc_value(&self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        expect_parents(parents, 1, self.type_name())?;
        Ok(parents[0].exp())
    }

    fn calc_grads(
        &self,
        _parents: &[&Tensor],
        value: &Tensor,
        upstream: &Tensor,
    ) -> Result<Vec<Tensor>, GraphError> {
        Ok(vec![upstream * value])
    }
}

impl TraitNode for Clamp {
    fn type_name(&self) -> &'static str {
        "Clamp"
    }

    fn calc_value(&self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        expect_parents(parents, 1, self.type_name())?;
        Ok(parents[0].clamp(self.min, self.max))
    }

    fn calc_grads(
        &self,
        parents: &[&Tensor],
        _value: &Tensor,
        upstream: &Tensor,
    ) -> Result<Vec<Tensor>, GraphError> {
        let (min, max) = (self.min, self.max);
        let mask = parents[0].map(|x| if (min..=max).contains(&x) { 1.0 } else { 0.0 });
        Ok(vec![upstream * &mask])
    }
}

impl TraitNode for Softmax {
    fn type_name(&self) -> &'static str {
        "Softmax"
    }

    fn calc_value(&self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        expect_parents(parents, 1, self.type_name())?;
        if parents[0].dimension() == 0 {
            return Err(GraphError::InvalidOperation(
                "Softmax节点的输入至少需要1维".to_string(),
            ));
        }
        Ok(parents[0].softmax_last_axis())
    }

    fn calc_grads(
        &self,
        _parents: &[&Tensor],
        value: &Tensor,
        upstream: &Tensor,
    ) -> Result<Vec<Tensor>, GraphError> {
        let last_axis = value.dimension() - 1;
        let dot = (upstream * value).sum_axis_keepdims(last_axis)?;
        Ok(vec![value * &(upstream - &dot)])
    }
}
