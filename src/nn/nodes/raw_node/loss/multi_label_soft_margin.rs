use crate::nn::GraphError;
use crate::nn::nodes::raw_node::{TraitNode, expect_parents, upstream_scalar};
use crate::tensor::Tensor;

/// 多标签软间隔损失节点
///
/// ## 输入
/// - 父节点 0: logits `[batch, num_labels]`
/// - 目标: 同形状的 multi-hot 张量（常量）
///
/// ## 输出
/// ```text
/// L = mean_b( -1/C · Σ_c [ t·logσ(x) + (1-t)·logσ(-x) ] )
/// ```
/// 梯度：∂L/∂x = (σ(x) - t) / (B·C)
pub(in crate::nn) struct MultiLabelSoftMargin {
    target: Tensor,
}

impl MultiLabelSoftMargin {
    pub(in crate::nn) const fn new(target: Tensor) -> Self {
        Self { target }
    }
}

/// 数值稳定的 logσ(x) = -ln(1 + e^{-x})
fn log_sigmoid(x: f32) -> f32 {
    if x >= 0.0 {
        -(-x).exp().ln_1p()
    } else {
        x - x.exp().ln_1p()
    }
}

impl TraitNode for MultiLabelSoftMargin {
    fn type_name(&self) -> &'static str {
        "MultiLabelSoftMargin"
    }

    fn calc_value(&self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        expect_parents(parents, 1, self.type_name())?;
        let logits = parents[0];
        if logits.dimension() != 2 || logits.shape() != self.target.shape() {
            return Err(GraphError::ShapeMismatch {
                expected: self.target.shape().to_vec(),
                got: logits.shape().to_vec(),
                message: "MultiLabelSoftMargin的logits与目标形状必须相同且为2维".to_string(),
            });
        }

        let total: f32 = logits
            .data()
            .iter()
            .zip(self.target.data().iter())
            .map(|(&x, &t)| -(t * log_sigmoid(x) + (1.0 - t) * log_sigmoid(-x)))
            .sum();
        // 先对类别取平均，再对批次取平均，等价于对全部元素取平均
        Ok(Tensor::scalar(total / logits.size() as f32))
    }

    fn calc_grads(
        &self,
        parents: &[&Tensor],
        _value: &Tensor,
        upstream: &Tensor,
    ) -> Result<Vec<Tensor>, GraphError> {
        let up = upstream_scalar(upstream, self.type_name())?;
        let logits = parents[0];
        let n = logits.size() as f32;
        let grad = &(&logits.sigmoid() - &self.target) * (up / n);
        Ok(vec![grad])
    }
}
