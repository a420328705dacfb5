/*
 * @Description  : 基于 tanh Rnn 单元的序列编码器与解码器
 *
 * 编码器：多层双向，按长度掩码（超出长度的时间步保持隐藏状态不变），
 *        输入是 [batch, len, vocab] 的 one-hot 或 softmax 软 one-hot 序列，因此生成文本可以可微地重新编码。
 * 解码器：潜变量经 Linear + tanh 得到初始隐藏状态；每步输入为上一个词的 one-hot（可拼接条件向量）。
 */

use crate::data::Vocabulary;
use crate::nn::{
    Graph, GraphError, Linear, Module, Rnn, Var, VarActivationOps, VarShapeOps,
};
use crate::tensor::Tensor;

use super::seq::{DecoderOutput, EncoderOutput, SequenceDecoder, SequenceEncoder};

// ==================== 编码器 ====================

/// 多层双向 Rnn 编码器
#[derive(Debug)]
pub struct RnnEncoder {
    /// 每层的（正向, 反向）单元
    layers: Vec<(Rnn, Rnn)>,
    input_size: usize,
    hidden_size: usize,
}

impl RnnEncoder {
    pub fn new(
        graph: &Graph,
        input_size: usize,
        hidden_size: usize,
        n_layers: usize,
        name: &str,
    ) -> Result<Self, GraphError> {
        if n_layers == 0 {
            return Err(GraphError::InvalidOperation(format!(
                "编码器`{name}`至少需要1层"
            )));
        }
        let mut layers = Vec::with_capacity(n_layers);
        for layer in 0..n_layers {
            let layer_input = if layer == 0 { input_size } else { 2 * hidden_size };
            let fwd = Rnn::new(graph, layer_input, hidden_size, &format!("{name}_l{layer}_fwd"))?;
            let bwd = Rnn::new(graph, layer_input, hidden_size, &format!("{name}_l{layer}_bwd"))?;
            layers.push((fwd, bwd));
        }
        Ok(Self {
            layers,
            input_size,
            hidden_size,
        })
    }

    pub fn n_layers(&self) -> usize {
        self.layers.len()
    }

    pub const fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    fn check_lengths(lengths: &[usize], batch: usize, max_len: usize) -> Result<(), GraphError> {
        if lengths.len() != batch {
            return Err(GraphError::DimensionMismatch {
                expected: batch,
                got: lengths.len(),
                message: "序列长度的个数与批大小不一致".to_string(),
            });
        }
        if lengths.windows(2).any(|w| w[0] < w[1]) {
            return Err(GraphError::InvalidOperation(format!(
                "编码器要求序列长度按降序排列，实际为{lengths:?}"
            )));
        }
        if let Some(&bad) = lengths.iter().find(|&&l| l == 0 || l > max_len) {
            return Err(GraphError::InvalidOperation(format!(
                "序列长度{bad}不在[1, {max_len}]内"
            )));
        }
        Ok(())
    }
}

/// 第`t`步的掩码 [batch, 1]：长度大于 t 的样本为1
fn step_mask(lengths: &[usize], t: usize) -> Tensor {
    let data = lengths
        .iter()
        .map(|&len| if t < len { 1.0 } else { 0.0 })
        .collect::<Vec<_>>();
    Tensor::new(&data, &[lengths.len(), 1])
}

/// h ← h + mask · (candidate − h)
fn masked_update(hidden: &Var, candidate: &Var, mask: &Var) -> Result<Var, GraphError> {
    hidden.try_add(&candidate.try_sub(hidden)?.try_mul(mask)?)
}

/// 单方向展开，返回每步输出与最终隐藏状态
fn run_direction(
    cell: &Rnn,
    inputs: &[Var],
    masks: &[Var],
    initial: &Var,
    reverse: bool,
) -> Result<(Vec<Var>, Var), GraphError> {
    let steps: Vec<usize> = if reverse {
        (0..inputs.len()).rev().collect()
    } else {
        (0..inputs.len()).collect()
    };
    let mut hidden = initial.clone();
    let mut outputs: Vec<Option<Var>> = vec![None; inputs.len()];
    for t in steps {
        let candidate = cell.step(&inputs[t], &hidden)?;
        hidden = masked_update(&hidden, &candidate, &masks[t])?;
        outputs[t] = Some(hidden.clone());
    }
    Ok((outputs.into_iter().flatten().collect(), hidden))
}

impl SequenceEncoder for RnnEncoder {
    fn encode(&self, seq: &Var, lengths: &[usize]) -> Result<EncoderOutput, GraphError> {
        let shape = seq.shape()?;
        if shape.len() != 3 || shape[2] != self.input_size {
            return Err(GraphError::ShapeMismatch {
                expected: vec![lengths.len(), lengths.first().copied().unwrap_or(0), self.input_size],
                got: shape,
                message: "编码器的输入应为 [batch, len, vocab]".to_string(),
            });
        }
        let (batch, max_len) = (shape[0], shape[1]);
        Self::check_lengths(lengths, batch, max_len)?;

        let graph = seq.get_graph();
        let masks = (0..max_len)
            .map(|t| graph.input(&step_mask(lengths, t)))
            .collect::<Result<Vec<_>, _>>()?;
        let initial = graph.zeros(&[batch, self.hidden_size])?;

        let mut inputs = (0..max_len)
            .map(|t| seq.select(1, t))
            .collect::<Result<Vec<_>, _>>()?;
        let mut final_hidden = Vec::with_capacity(2 * self.layers.len());
        for (fwd, bwd) in &self.layers {
            let (fwd_out, fwd_last) = run_direction(fwd, &inputs, &masks, &initial, false)?;
            let (bwd_out, bwd_last) = run_direction(bwd, &inputs, &masks, &initial, true)?;
            inputs = fwd_out
                .iter()
                .zip(&bwd_out)
                .map(|(f, b)| Var::concat(&[f, b], 1))
                .collect::<Result<Vec<_>, _>>()?;
            final_hidden.push(fwd_last);
            final_hidden.push(bwd_last);
        }

        Ok(EncoderOutput {
            outputs: inputs,
            final_hidden,
        })
    }

    fn output_size(&self) -> usize {
        self.hidden_size * self.layers.len() * 2
    }
}

impl Module for RnnEncoder {
    fn parameters(&self) -> Vec<Var> {
        self.layers
            .iter()
            .flat_map(|(fwd, bwd)| [fwd.parameters(), bwd.parameters()].concat())
            .collect()
    }
}

// ==================== 解码器 ====================

/// 单层 Rnn 解码器
#[derive(Debug)]
pub struct RnnDecoder {
    init: Linear,
    cell: Rnn,
    out: Linear,
    vocab_size: usize,
    condition_size: usize,
}

impl RnnDecoder {
    /// `condition_size`为0时解码器不接受条件向量
    pub fn new(
        graph: &Graph,
        latent_size: usize,
        hidden_size: usize,
        vocab_size: usize,
        condition_size: usize,
        name: &str,
    ) -> Result<Self, GraphError> {
        Ok(Self {
            init: Linear::new(graph, latent_size, hidden_size, true, &format!("{name}_init"))?,
            cell: Rnn::new(
                graph,
                vocab_size + condition_size,
                hidden_size,
                &format!("{name}_cell"),
            )?,
            out: Linear::new(graph, hidden_size, vocab_size, true, &format!("{name}_out"))?,
            vocab_size,
            condition_size,
        })
    }

    pub const fn vocab_size(&self) -> usize {
        self.vocab_size
    }

    pub const fn condition_size(&self) -> usize {
        self.condition_size
    }

    fn check_condition(&self, condition: Option<&Var>, batch: usize) -> Result<(), GraphError> {
        match (condition, self.condition_size) {
            (None, 0) => Ok(()),
            (Some(c), size) if size > 0 => {
                let shape = c.shape()?;
                if shape != [batch, size] {
                    return Err(GraphError::ShapeMismatch {
                        expected: vec![batch, size],
                        got: shape,
                        message: "解码器的条件向量形状不对".to_string(),
                    });
                }
                Ok(())
            }
            (None, size) => Err(GraphError::InvalidOperation(format!(
                "解码器需要维度为{size}的条件向量"
            ))),
            (Some(_), _) => Err(GraphError::InvalidOperation(
                "解码器不接受条件向量".to_string(),
            )),
        }
    }
}

/// 按第`row`行的概率分布取样（`u`为`[0, 1)`均匀随机数）
fn sample_row(probs: &Tensor, row: usize, u: f32) -> usize {
    let vocab = probs.shape()[1];
    let mut acc = 0.0;
    for j in 0..vocab {
        acc += probs[[row, j]];
        if u < acc {
            return j;
        }
    }
    vocab - 1
}

impl SequenceDecoder for RnnDecoder {
    fn decode(
        &self,
        driving: &[Vec<usize>],
        vocab: &Vocabulary,
        initial_hidden: &Var,
        condition: Option<&Var>,
        generation: bool,
        random_sample: bool,
    ) -> Result<DecoderOutput, GraphError> {
        let batch = driving.len();
        let steps = driving.first().map_or(0, Vec::len);
        if batch == 0 || steps == 0 {
            return Err(GraphError::InvalidOperation(
                "解码器的驱动序列不能为空".to_string(),
            ));
        }
        if driving.iter().any(|d| d.len() != steps) {
            return Err(GraphError::InvalidOperation(
                "驱动序列须补齐到相同长度".to_string(),
            ));
        }
        self.check_condition(condition, batch)?;

        let graph = initial_hidden.get_graph();
        let mut hidden = self.init.forward(initial_hidden)?.tanh();
        let mut prev = vec![vocab.sos_id(); batch];
        let mut step_logits = Vec::with_capacity(steps);
        let mut predicted_ids = vec![Vec::with_capacity(steps); batch];

        for t in 0..steps {
            let one_hot = graph.input(&Tensor::one_hot(&prev, self.vocab_size))?;
            let x = match condition {
                Some(c) => Var::concat(&[&one_hot, c], 1)?,
                None => one_hot,
            };
            hidden = self.cell.step(&x, &hidden)?;
            let logits = self.out.forward(&hidden)?;

            let predicted = if random_sample {
                let probs = logits.value()?.softmax_last_axis();
                (0..batch)
                    .map(|row| sample_row(&probs, row, graph.uniform_sample()))
                    .collect::<Vec<_>>()
            } else {
                logits.value()?.argmax_last_axis()
            };
            for (ids, &id) in predicted_ids.iter_mut().zip(&predicted) {
                ids.push(id);
            }

            prev = if generation {
                predicted
            } else {
                driving.iter().map(|d| d[t]).collect()
            };
            step_logits.push(logits);
        }

        let logits = Var::stack(&step_logits.iter().collect::<Vec<_>>(), 1)?;
        let decoded_words = predicted_ids
            .iter()
            .map(|ids| vocab.decode_until_eos(ids))
            .collect();
        Ok(DecoderOutput {
            logits,
            decoded_words,
        })
    }
}

impl Module for RnnDecoder {
    fn parameters(&self) -> Vec<Var> {
        [
            self.init.parameters(),
            self.cell.parameters(),
            self.out.parameters(),
        ]
        .concat()
    }
}
