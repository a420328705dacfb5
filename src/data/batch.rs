//! 样本与批次
//!
//! 批次内的样本按输入序列长度**稳定**降序排列（编码器要求长度降序），
//! 序列用 `PAD` 补齐到批内最大长度。

use super::error::DataError;
use super::vocab::Vocabulary;
use crate::tensor::Tensor;

/// 一条对话样本
#[derive(Debug, Clone, PartialEq)]
pub struct Example {
    /// 输入语句（空白分词）
    pub input: String,
    /// 目标回复
    pub target: String,
    /// 条件向量（对话行为 + 槽值的特征编码），长度为 `d_size`
    pub condition: Vec<f32>,
    /// 对话行为标签
    pub dialogue_act: usize,
    /// 槽值标签（multi-hot 中为1的下标）
    pub slot_values: Vec<usize>,
}

/// 已排序、已补齐的批次
#[derive(Debug, Clone)]
pub struct Batch {
    input_ids: Vec<Vec<usize>>,
    input_lengths: Vec<usize>,
    target_ids: Vec<Vec<usize>>,
    target_lengths: Vec<usize>,
    conditions: Tensor,
    da_labels: Vec<usize>,
    sv_targets: Tensor,
    /// 排序后第 i 个样本在原输入中的位置
    order: Vec<usize>,
}

fn pad_to(mut ids: Vec<usize>, len: usize, pad: usize) -> Vec<usize> {
    ids.resize(len, pad);
    ids
}

impl Batch {
    /// 由样本构建批次
    ///
    /// 条件向量维度必须一致；`dialogue_act < da_size`，每个槽值下标 `< sv_size`。
    pub fn from_examples(
        examples: &[Example],
        vocab: &Vocabulary,
        da_size: usize,
        sv_size: usize,
    ) -> Result<Self, DataError> {
        let first = examples.first().ok_or(DataError::EmptyBatch)?;
        let d_size = first.condition.len();

        for (index, example) in examples.iter().enumerate() {
            if example.condition.len() != d_size {
                return Err(DataError::InconsistentCondition {
                    index,
                    expected: d_size,
                    got: example.condition.len(),
                });
            }
            if example.dialogue_act >= da_size {
                return Err(DataError::LabelOutOfRange {
                    kind: "dialogue_act",
                    index,
                    label: example.dialogue_act,
                    size: da_size,
                });
            }
            if let Some(&label) = example.slot_values.iter().find(|&&s| s >= sv_size) {
                return Err(DataError::LabelOutOfRange {
                    kind: "slot_value",
                    index,
                    label,
                    size: sv_size,
                });
            }
            if example.input.split_whitespace().next().is_none() {
                return Err(DataError::EmptySequence(index));
            }
        }

        let encoded = examples
            .iter()
            .map(|e| (vocab.encode(&e.input), vocab.encode(&e.target)))
            .collect::<Vec<_>>();

        // 稳定排序：长度相同的样本保持原有顺序
        let mut order = (0..examples.len()).collect::<Vec<_>>();
        order.sort_by(|&a, &b| encoded[b].0.len().cmp(&encoded[a].0.len()));

        let max_input = encoded.iter().map(|(i, _)| i.len()).max().unwrap_or(0);
        let max_target = encoded.iter().map(|(_, t)| t.len()).max().unwrap_or(0);
        let pad = vocab.pad_id();

        let batch_size = examples.len();
        let mut input_ids = Vec::with_capacity(batch_size);
        let mut input_lengths = Vec::with_capacity(batch_size);
        let mut target_ids = Vec::with_capacity(batch_size);
        let mut target_lengths = Vec::with_capacity(batch_size);
        let mut conditions = Vec::with_capacity(batch_size * d_size);
        let mut da_labels = Vec::with_capacity(batch_size);
        let mut sv_targets = Tensor::zeros(&[batch_size, sv_size]);

        for (row, &src) in order.iter().enumerate() {
            let (input, target) = &encoded[src];
            input_lengths.push(input.len());
            target_lengths.push(target.len());
            input_ids.push(pad_to(input.clone(), max_input, pad));
            target_ids.push(pad_to(target.clone(), max_target, pad));

            let example = &examples[src];
            conditions.extend_from_slice(&example.condition);
            da_labels.push(example.dialogue_act);
            for &slot in &example.slot_values {
                sv_targets[[row, slot]] = 1.0;
            }
        }

        Ok(Self {
            input_ids,
            input_lengths,
            target_ids,
            target_lengths,
            conditions: Tensor::new(&conditions, &[batch_size, d_size]),
            da_labels,
            sv_targets,
            order,
        })
    }

    pub fn len(&self) -> usize {
        self.da_labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.da_labels.is_empty()
    }

    /// 补齐后的输入序列
    pub fn input_ids(&self) -> &[Vec<usize>] {
        &self.input_ids
    }

    /// 输入序列的有效长度（含 EOS），降序
    pub fn input_lengths(&self) -> &[usize] {
        &self.input_lengths
    }

    /// 补齐后的目标序列
    pub fn target_ids(&self) -> &[Vec<usize>] {
        &self.target_ids
    }

    pub fn target_lengths(&self) -> &[usize] {
        &self.target_lengths
    }

    /// 条件向量 [batch, d_size]
    pub const fn conditions(&self) -> &Tensor {
        &self.conditions
    }

    pub fn da_labels(&self) -> &[usize] {
        &self.da_labels
    }

    /// 槽值 multi-hot [batch, sv_size]
    pub const fn sv_targets(&self) -> &Tensor {
        &self.sv_targets
    }

    pub fn order(&self) -> &[usize] {
        &self.order
    }

    /// 输入序列的 one-hot 编码 [batch, max_len, vocab_size]，补齐位置全为0
    pub fn input_one_hot(&self, vocab_size: usize) -> Tensor {
        let max_len = self.input_ids.first().map_or(0, Vec::len);
        let mut one_hot = Tensor::zeros(&[self.len(), max_len, vocab_size]);
        for (b, (ids, &len)) in self.input_ids.iter().zip(&self.input_lengths).enumerate() {
            for (t, &id) in ids.iter().take(len).enumerate() {
                if id < vocab_size {
                    one_hot[[b, t, id]] = 1.0;
                }
            }
        }
        one_hot
    }
}
