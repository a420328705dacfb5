use crate::errors::Operator;
use crate::nn::GraphError;
use crate::nn::nodes::raw_node::{TraitNode, expect_parents, upstream_scalar};
use crate::tensor::Tensor;

/// 二元交叉熵损失节点（输入为已经过 sigmoid 的概率）
///
/// ## 输入
/// - 父节点 0: 概率 p，任意形状
/// - 目标 t 与 p 形状相同，作为常量保存在节点内
///
/// ## 输出
/// - 标量 L = mean(-(t·ln p + (1-t)·ln(1-p)))
///
/// 为避免 ln(0)，对数值下限截断到 -100
pub(in crate::nn) struct BceLoss {
    target: Tensor,
}

const LOG_FLOOR: f32 = -100.0;

impl BceLoss {
    pub(in crate::nn) fn new(target: Tensor) -> Result<Self, GraphError> {
        if target.data().iter().any(|&t| !(0.0..=1.0).contains(&t)) {
            return Err(GraphError::InvalidOperation(
                "BceLoss的目标值必须位于[0, 1]区间".to_string(),
            ));
        }
        Ok(Self { target })
    }

    fn check_shape(&self, prob: &Tensor) -> Result<(), GraphError> {
        if prob.shape() != self.target.shape() {
            return Err(GraphError::ShapeMismatch {
                expected: self.target.shape().to_vec(),
                got: prob.shape().to_vec(),
                message: "BceLoss的预测值与目标值形状必须相同".to_string(),
            });
        }
        Ok(())
    }
}

impl TraitNode for BceLoss {
    fn type_name(&self) -> &'static str {
        "BceLoss"
    }

    fn calc_value(&self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        expect_parents(parents, 1, self.type_name())?;
        let prob = parents[0];
        self.check_shape(prob)?;

        let total: f32 = prob
            .data()
            .iter()
            .zip(self.target.data().iter())
            .map(|(&p, &t)| {
                let log_p = p.ln().max(LOG_FLOOR);
                let log_1mp = (1.0 - p).ln().max(LOG_FLOOR);
                -(t * log_p + (1.0 - t) * log_1mp)
            })
            .sum();
        Ok(Tensor::scalar(total / prob.size() as f32))
    }

    fn calc_grads(
        &self,
        parents: &[&Tensor],
        _value: &Tensor,
        upstream: &Tensor,
    ) -> Result<Vec<Tensor>, GraphError> {
        let up = upstream_scalar(upstream, self.type_name())?;
        let prob = parents[0];
        let n = prob.size() as f32;
        // dL/dp = (p - t) / (p(1-p)) / N
        let grad = prob
            .zip_with(&self.target, Operator::Sub, |p, t| {
                up * (p - t) / (p * (1.0 - p)).max(1e-12) / n
            })?;
        Ok(vec![grad])
    }
}
