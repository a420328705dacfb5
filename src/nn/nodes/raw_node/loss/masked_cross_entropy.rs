use crate::nn::GraphError;
use crate::nn::nodes::raw_node::{TraitNode, expect_parents, upstream_scalar};
use crate::tensor::Tensor;

/// 按长度掩码的序列交叉熵节点
///
/// ## 输入
/// - 父节点 0: logits `[batch, steps, vocab]`
/// - 目标词序列与每条序列的有效长度（常量）
///
/// 位置`(b, t)`有效当且仅当 `t < length_b`；`length_b`不得超过`steps`和`targets_b.len()`。
/// 输出为所有有效位置上 -log softmax 的平均值；没有有效位置时输出0，梯度也为0。
pub(in crate::nn) struct MaskedCrossEntropy {
    targets: Vec<Vec<usize>>,
    lengths: Vec<usize>,
}

impl MaskedCrossEntropy {
    pub(in crate::nn) fn new(targets: Vec<Vec<usize>>, lengths: Vec<usize>) -> Result<Self, GraphError> {
        if targets.len() != lengths.len() {
            return Err(GraphError::InvalidOperation(format!(
                "MaskedCrossEntropy的目标序列数{}与长度数{}不一致",
                targets.len(),
                lengths.len()
            )));
        }
        Ok(Self { targets, lengths })
    }

    /// 所有有效位置`(b, t, 目标词)`，调用前须已通过 [`Self::check_logits`]
    fn valid_positions(&self) -> Vec<(usize, usize, usize)> {
        self.targets
            .iter()
            .zip(&self.lengths)
            .enumerate()
            .flat_map(|(b, (target, &len))| {
                target[..len].iter().enumerate().map(move |(t, &w)| (b, t, w))
            })
            .collect()
    }

    fn check_logits(&self, logits: &Tensor) -> Result<(), GraphError> {
        let shape = logits.shape();
        if shape.len() != 3 || shape[0] != self.targets.len() {
            return Err(GraphError::ShapeMismatch {
                expected: vec![self.targets.len(), shape.get(1).copied().unwrap_or(0), shape.get(2).copied().unwrap_or(0)],
                got: shape.to_vec(),
                message: "MaskedCrossEntropy的logits应为[batch, steps, vocab]".to_string(),
            });
        }
        let steps = shape[1];
        for (b, (target, &len)) in self.targets.iter().zip(&self.lengths).enumerate() {
            if len > steps || len > target.len() {
                return Err(GraphError::ShapeMismatch {
                    expected: vec![len],
                    got: vec![steps.min(target.len())],
                    message: format!(
                        "MaskedCrossEntropy第{b}条序列的长度{len}超过logits步数{steps}或目标长度{}",
                        target.len()
                    ),
                });
            }
        }
        let vocab = shape[2];
        if let Some((_, _, w)) = self.valid_positions().into_iter().find(|&(_, _, w)| w >= vocab) {
            return Err(GraphError::InvalidOperation(format!(
                "MaskedCrossEntropy的目标词{w}超出词表大小{vocab}"
            )));
        }
        Ok(())
    }
}

impl TraitNode for MaskedCrossEntropy {
    fn type_name(&self) -> &'static str {
        "MaskedCrossEntropy"
    }

    fn calc_value(&self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        expect_parents(parents, 1, self.type_name())?;
        let logits = parents[0];
        self.check_logits(logits)?;

        let positions = self.valid_positions();
        if positions.is_empty() {
            return Ok(Tensor::scalar(0.0));
        }
        let log_probs = logits.log_softmax_last_axis();
        let total: f32 = positions.iter().map(|&(b, t, w)| -log_probs[[b, t, w]]).sum();
        Ok(Tensor::scalar(total / positions.len() as f32))
    }

    fn calc_grads(
        &self,
        parents: &[&Tensor],
        _value: &Tensor,
        upstream: &Tensor,
    ) -> Result<Vec<Tensor>, GraphError> {
        let up = upstream_scalar(upstream, self.type_name())?;
        let logits = parents[0];
        let positions = self.valid_positions();
        let mut grad = Tensor::zeros(logits.shape());
        if positions.is_empty() {
            return Ok(vec![grad]);
        }

        let probs = logits.softmax_last_axis();
        let scale = up / positions.len() as f32;
        let vocab = logits.shape()[2];
        for &(b, t, w) in &positions {
            for v in 0..vocab {
                grad[[b, t, v]] = probs[[b, t, v]] * scale;
            }
            grad[[b, t, w]] -= scale;
        }
        Ok(vec![grad])
    }
}
