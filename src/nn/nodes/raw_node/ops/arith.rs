/*
 * @Description  : 逐元素二元运算节点（支持广播）
 *
 * 广播时，反向传播的梯度需要沿被广播的维度求和，归约回父节点的形状。
 */

use crate::errors::Operator;
use crate::nn::GraphError;
use crate::nn::nodes::raw_node::{TraitNode, expect_parents};
use crate::tensor::Tensor;

/// 加法：a + b
pub(in crate::nn) struct Add;

/// 减法：a - b
pub(in crate::nn) struct Subtract;

/// 逐元素乘法：a * b
pub(in crate::nn) struct Multiply;

/// 逐元素除法：a / b
pub(in crate::nn) struct Divide;

/// 数乘：factor * a
pub(in crate::nn) struct ScalarMultiply {
    factor: f32,
}

impl ScalarMultiply {
    pub(in crate::nn) const fn new(factor: f32) -> Self {
        Self { factor }
    }
}

impl TraitNode for Add {
    fn type_name(&self) -> &'static str {
        "Add"
    }

    fn calc_value(&self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        expect_parents(parents, 2, self.type_name())?;
        Ok(parents[0].zip_with(parents[1], Operator::Add, |a, b| a + b)?)
    }

    fn calc_grads(
        &self,
        parents: &[&Tensor],
        _value: &Tensor,
        upstream: &Tensor,
    ) -> Result<Vec<Tensor>, GraphError> {
        Ok(vec![
            upstream.reduce_to_shape(parents[0].shape())?,
            upstream.reduce_to_shape(parents[1].shape())?,
        ])
    }
}

impl TraitNode for Subtract {
    fn type_name(&self) -> &'static str {
        "Subtract"
    }

    fn calc_value(&self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        expect_parents(parents, 2, self.type_name())?;
        Ok(parents[0].zip_with(parents[1], Operator::Sub, |a, b| a - b)?)
    }

    fn calc_grads(
        &self,
        parents: &[&Tensor],
        _value: &Tensor,
        upstream: &Tensor,
    ) -> Result<Vec<Tensor>, GraphError> {
        Ok(vec![
            upstream.reduce_to_shape(parents[0].shape())?,
            (-upstream).reduce_to_shape(parents[1].shape())?,
        ])
    }
}

impl TraitNode for Multiply {
    fn type_name(&self) -> &'static str {
        "Multiply"
    }

    fn calc_value(&self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        expect_parents(parents, 2, self.type_name())?;
        Ok(parents[0].zip_with(parents[1], Operator::Mul, |a, b| a * b)?)
    }

    fn calc_grads(
        &self,
        parents: &[&Tensor],
        _value: &Tensor,
        upstream: &Tensor,
    ) -> Result<Vec<Tensor>, GraphError> {
        let (a, b) = (parents[0], parents[1]);
        Ok(vec![
            (upstream * b).reduce_to_shape(a.shape())?,
            (upstream * a).reduce_to_shape(b.shape())?,
        ])
    }
}

impl TraitNode for Divide {
    fn type_name(&self) -> &'static str {
        "Divide"
    }

    fn calc_value(&self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        expect_parents(parents, 2, self.type_name())?;
        Ok(parents[0].zip_with(parents[1], Operator::Div, |a, b| a / b)?)
    }

    fn calc_grads(
        &self,
        parents: &[&Tensor],
        value: &Tensor,
        upstream: &Tensor,
    ) -> Result<Vec<Tensor>, GraphError> {
        let (a, b) = (parents[0], parents[1]);
        // d(a/b)/da = 1/b，d(a/b)/db = -(a/b)/b
        let grad_a = upstream / b;
        let grad_b = -(upstream * value) / b;
        Ok(vec![
            grad_a.reduce_to_shape(a.shape())?,
            grad_b.reduce_to_shape(b.shape())?,
        ])
    }
}

impl TraitNode for ScalarMultiply {
    fn type_name(&self) -> &'static str {
        "ScalarMultiply"
    }

    fn calc_value(&self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        expect_parents(parents, 1, self.type_name())?;
        Ok(parents[0] * self.factor)
    }

    fn calc_grads(
        &self,
        _parents: &[&Tensor],
        _value: &Tensor,
        upstream: &Tensor,
    ) -> Result<Vec<Tensor>, GraphError> {
        Ok(vec![upstream * self.factor])
    }
}
