use crate::nn::GraphError;
use crate::nn::nodes::raw_node::{TraitNode, expect_parents, upstream_scalar};
use crate::tensor::Tensor;

/// Softmax + CrossEntropy 融合损失节点（类别标签以下标给出）
///
/// ## 输入
/// - 父节点 0: logits `[batch, num_classes]`
/// - 标签: 每个样本的类别下标，作为常量保存在节点内
///
/// ## 输出
/// - 标量 L = mean_b(-log softmax(x_b)[label_b])
///
/// 梯度：∂L/∂x = (softmax(x) - onehot(label)) / batch
pub(in crate::nn) struct SoftmaxCrossEntropy {
    labels: Vec<usize>,
}

impl SoftmaxCrossEntropy {
    pub(in crate::nn) const fn new(labels: Vec<usize>) -> Self {
        Self { labels }
    }

    fn check_logits(&self, logits: &Tensor) -> Result<(), GraphError> {
        let shape = logits.shape();
        if shape.len() != 2 || shape[0] != self.labels.len() {
            return Err(GraphError::ShapeMismatch {
                expected: vec![self.labels.len(), shape.last().copied().unwrap_or(0)],
                got: shape.to_vec(),
                message: "SoftmaxCrossEntropy的logits应为[batch, num_classes]".to_string(),
            });
        }
        if let Some(&bad) = self.labels.iter().find(|&&l| l >= shape[1]) {
            return Err(GraphError::InvalidOperation(format!(
                "SoftmaxCrossEntropy的标签{bad}超出类别数{}",
                shape[1]
            )));
        }
        Ok(())
    }
}

impl TraitNode for SoftmaxCrossEntropy {
    fn type_name(&self) -> &'static str {
        "SoftmaxCrossEntropy"
    }

    fn calc_value(&self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        expect_parents(parents, 1, self.type_name())?;
        let logits = parents[0];
        self.check_logits(logits)?;

        let log_probs = logits.log_softmax_last_axis();
        let total: f32 = self
            .labels
            .iter()
            .enumerate()
            .map(|(b, &label)| -log_probs[[b, label]])
            .sum();
        Ok(Tensor::scalar(total / self.labels.len() as f32))
    }

    fn calc_grads(
        &self,
        parents: &[&Tensor],
        _value: &Tensor,
        upstream: &Tensor,
    ) -> Result<Vec<Tensor>, GraphError> {
        let up = upstream_scalar(upstream, self.type_name())?;
        let logits = parents[0];
        let mut grad = logits.softmax_last_axis();
        for (b, &label) in self.labels.iter().enumerate() {
            grad[[b, label]] -= 1.0;
        }
        Ok(vec![grad * (up / self.labels.len() as f32)])
    }
}
