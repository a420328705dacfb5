/*
 * @Description  : 序列编码器/解码器的接口
 *
 * 模型只通过这两个 trait 使用编码器和解码器，内部结构由实现方决定。
 * 本 crate 自带的实现见 [`super::rnn`]。
 */

use crate::data::Vocabulary;
use crate::nn::{GraphError, Module, Var, VarShapeOps};

/// 编码结果
#[derive(Debug)]
pub struct EncoderOutput {
    /// 每个时间步的输出 [batch, hidden × 方向数]
    pub outputs: Vec<Var>,
    /// 各层各方向的最终隐藏状态 [batch, hidden]，按 层0正向、层0反向、层1正向…… 排列
    pub final_hidden: Vec<Var>,
}

impl EncoderOutput {
    /// 把全部最终隐藏状态沿特征维拼接，得到编码器表示 [batch, hidden × 层数 × 方向数]
    pub fn representation(&self) -> Result<Var, GraphError> {
        if self.final_hidden.is_empty() {
            return Err(GraphError::InvalidOperation(
                "编码器没有返回最终隐藏状态".to_string(),
            ));
        }
        let hidden = self.final_hidden.iter().collect::<Vec<_>>();
        Var::concat(&hidden, 1)
    }
}

/// 解码结果
#[derive(Debug)]
pub struct DecoderOutput {
    /// 每步的词表 logits [batch, steps, vocab]
    pub logits: Var,
    /// 解码得到的句子（到第一个 EOS 为止）
    pub decoded_words: Vec<String>,
}

/// 序列编码器
pub trait SequenceEncoder: Module {
    /// 编码 [batch, len, vocab] 的（软）one-hot 序列
    ///
    /// `lengths`须按降序排列，且每个长度都在`[1, len]`内。
    fn encode(&self, seq: &Var, lengths: &[usize]) -> Result<EncoderOutput, GraphError>;

    /// [`EncoderOutput::representation`] 的维度
    fn output_size(&self) -> usize;
}

/// 序列解码器
pub trait SequenceDecoder: Module {
    /// 从`initial_hidden`（潜变量）出发解码，步数等于`driving`的（补齐后）长度
    ///
    /// - `generation = false`：以`driving`作为上一步的输入（teacher forcing）
    /// - `generation = true`：以模型自己上一步的预测作为输入
    /// - `random_sample`：按 softmax 概率采样，否则取 argmax
    fn decode(
        &self,
        driving: &[Vec<usize>],
        vocab: &Vocabulary,
        initial_hidden: &Var,
        condition: Option<&Var>,
        generation: bool,
        random_sample: bool,
    ) -> Result<DecoderOutput, GraphError>;
}
