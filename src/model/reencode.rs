/*
 * @Description  : 生成文本的重新编码（判别器的 fake 输入）
 *
 * 步骤：softmax → 按解码句子统计长度（至少为1）→ 按长度稳定降序重排 → 截断到新的最大长度 → 重新跑一遍编码器。
 * 整条路径保持可微，生成器的对抗损失经由 softmax 传回解码器。
 */

use tracing::warn;

use super::error::ModelError;
use super::seq::SequenceEncoder;
use crate::data::EOS_TOKEN;
use crate::nn::{Var, VarActivationOps, VarShapeOps};

/// 重新编码所需的（已排序、已截断）输入
#[derive(Debug)]
pub struct SortedSoftBatch {
    /// softmax 后的软 one-hot 序列 [batch, max_len, vocab]
    pub soft_tokens: Var,
    /// 排序后的有效长度（降序）
    pub lengths: Vec<usize>,
    /// 排序后第 i 行对应的原始行号
    pub order: Vec<usize>,
}

/// 重新编码的结果
#[derive(Debug)]
pub struct ReEncoded {
    /// 编码器表示 [batch, H]，行顺序与 [`SortedSoftBatch::order`] 一致
    pub representation: Var,
    pub batch: SortedSoftBatch,
}

/// 每个解码句子在第一个 EOS 之前的词数，截断到`[1, max_len]`
pub fn effective_lengths(decoded_words: &[String], max_len: usize) -> Vec<usize> {
    decoded_words
        .iter()
        .enumerate()
        .map(|(row, sentence)| {
            let count = sentence
                .split_whitespace()
                .take_while(|w| *w != EOS_TOKEN)
                .count();
            if count == 0 {
                warn!(row, "生成的句子为空，按长度1重新编码");
            }
            count.clamp(1, max_len.max(1))
        })
        .collect()
}

/// 生成文本的重新编码器
pub struct GeneratedTextReEncoder;

impl GeneratedTextReEncoder {
    /// 把解码器 logits [batch, T, vocab] 和解码句子整理成编码器可接受的批次
    pub fn prepare(logits: &Var, decoded_words: &[String]) -> Result<SortedSoftBatch, ModelError> {
        let shape = logits.shape()?;
        if shape.len() != 3 {
            return Err(ModelError::BatchMismatch {
                what: "解码器 logits 的维数",
                expected: 3,
                got: shape.len(),
            });
        }
        let (batch, steps) = (shape[0], shape[1]);
        if decoded_words.len() != batch {
            return Err(ModelError::BatchMismatch {
                what: "解码句子",
                expected: batch,
                got: decoded_words.len(),
            });
        }

        let probs = logits.softmax();
        let raw_lengths = effective_lengths(decoded_words, steps);

        // 稳定排序：长度相同的行保持原顺序
        let mut order = (0..batch).collect::<Vec<_>>();
        order.sort_by(|&a, &b| raw_lengths[b].cmp(&raw_lengths[a]));
        let lengths = order.iter().map(|&i| raw_lengths[i]).collect::<Vec<_>>();
        let max_len = lengths.first().copied().unwrap_or(1);

        let soft_tokens = probs.index_select(0, &order)?.narrow(1, 0, max_len)?;
        Ok(SortedSoftBatch {
            soft_tokens,
            lengths,
            order,
        })
    }

    /// 整理并重新编码，得到判别器的 fake 输入
    pub fn reencode<E: SequenceEncoder>(
        encoder: &E,
        logits: &Var,
        decoded_words: &[String],
    ) -> Result<ReEncoded, ModelError> {
        let batch = Self::prepare(logits, decoded_words)?;
        let representation = encoder
            .encode(&batch.soft_tokens, &batch.lengths)?
            .representation()?;
        Ok(ReEncoded {
            representation,
            batch,
        })
    }
}
