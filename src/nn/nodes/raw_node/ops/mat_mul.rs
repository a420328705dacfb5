use crate::nn::GraphError;
use crate::nn::nodes::raw_node::{TraitNode, expect_parents};
use crate::tensor::Tensor;

/// 矩阵乘法节点：`[n, k] @ [k, m] = [n, m]`
///
/// backward:
/// - dL/dA = dL/dC @ Bᵀ
/// - dL/dB = Aᵀ @ dL/dC
pub(in crate::nn) struct MatMul;

impl TraitNode for MatMul {
    fn type_name(&self) -> &'static str {
        "MatMul"
    }

    fn calc_value(&self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        expect_parents(parents, 2, self.type_name())?;
        Ok(parents[0].mat_mul(parents[1])?)
    }

    fn calc_grads(
        &self,
        parents: &[&Tensor],
        _value: &Tensor,
        upstream: &Tensor,
    ) -> Result<Vec<Tensor>, GraphError> {
        let (a, b) = (parents[0], parents[1]);
        Ok(vec![
            upstream.mat_mul(&b.transpose())?,
            a.transpose().mat_mul(upstream)?,
        ])
    }
}
