/*
 * @Description  : CVAE-GAN 的超参数配置
 */

use serde::{Deserialize, Serialize};

use super::error::ModelError;
use crate::data::Batch;

/// 解码器的驱动方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecoderKind {
    /// 以目标序列驱动，并把条件向量送入每一步
    Sclstm,
    /// 以输入序列驱动，不使用条件向量
    Plain,
}

impl DecoderKind {
    /// 驱动解码器的序列及其长度，也是重构损失的目标
    pub fn driving_sequence(self, batch: &Batch) -> (&[Vec<usize>], &[usize]) {
        match self {
            Self::Sclstm => (batch.target_ids(), batch.target_lengths()),
            Self::Plain => (batch.input_ids(), batch.input_lengths()),
        }
    }
}

/// 模型与训练的超参数
///
/// 词表、条件向量和标签的维度没有合理的默认值（默认为0），
/// 必须由调用方给出，否则 [`CvaeGanConfig::validate`] 会报错。
///
/// # 使用示例
/// ```ignore
/// let config = CvaeGanConfig::from_json_str(r#"{"vocab_size": 50, "d_size": 6, "da_size": 3, "sv_size": 5}"#)?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CvaeGanConfig {
    pub dec_type: DecoderKind,
    pub hidden_size: usize,
    pub vocab_size: usize,
    pub latent_size: usize,
    /// 条件向量维度
    pub d_size: usize,
    pub da_size: usize,
    pub sv_size: usize,
    /// 重参数化采样的噪声缩放（0 表示直接取均值）
    pub std: f32,
    pub n_layers: usize,
    /// Core 参数组的学习率
    pub lr: f32,
    /// 判别器的学习率
    pub d_lr: f32,
    /// 生成器的学习率
    pub g_lr: f32,
    /// 每个子模块梯度范数的上限
    pub clip: f32,
    /// KL 权重从0线性增长到1所需的步数（0 表示始终为1）
    pub full_kl_step: u64,
    /// 不为1时解码器按概率采样而不是取 argmax
    pub overgen: usize,
    /// 对 log 方差的截断区间，默认不截断
    pub logvar_clamp: Option<(f32, f32)>,
}

impl Default for CvaeGanConfig {
    fn default() -> Self {
        Self {
            dec_type: DecoderKind::Sclstm,
            hidden_size: 100,
            vocab_size: 0,
            latent_size: 16,
            d_size: 0,
            da_size: 0,
            sv_size: 0,
            std: 1.0,
            n_layers: 1,
            lr: 0.001,
            d_lr: 0.002,
            g_lr: 0.002,
            clip: 5.0,
            full_kl_step: 5000,
            overgen: 1,
            logvar_clamp: None,
        }
    }
}

impl CvaeGanConfig {
    /// 从 JSON 解析并校验，缺省字段取默认值
    pub fn from_json_str(json: &str) -> Result<Self, ModelError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| ModelError::InvalidConfig(format!("JSON 解析失败：{e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        let sizes = [
            ("hidden_size", self.hidden_size),
            ("vocab_size", self.vocab_size),
            ("latent_size", self.latent_size),
            ("d_size", self.d_size),
            ("da_size", self.da_size),
            ("sv_size", self.sv_size),
            ("n_layers", self.n_layers),
            ("overgen", self.overgen),
        ];
        if let Some((name, _)) = sizes.iter().find(|(_, size)| *size == 0) {
            return Err(ModelError::InvalidConfig(format!("`{name}`必须大于0")));
        }

        for (name, rate) in [("lr", self.lr), ("d_lr", self.d_lr), ("g_lr", self.g_lr)] {
            if !(rate.is_finite() && rate > 0.0) {
                return Err(ModelError::InvalidConfig(format!(
                    "学习率`{name}`必须为正数，实际为{rate}"
                )));
            }
        }
        if !(self.clip.is_finite() && self.clip > 0.0) {
            return Err(ModelError::InvalidConfig(format!(
                "`clip`必须为正数，实际为{}",
                self.clip
            )));
        }
        if !(self.std.is_finite() && self.std >= 0.0) {
            return Err(ModelError::InvalidConfig(format!(
                "`std`必须为非负数，实际为{}",
                self.std
            )));
        }
        if let Some((min, max)) = self.logvar_clamp {
            if !(min.is_finite() && max.is_finite() && min < max) {
                return Err(ModelError::InvalidConfig(format!(
                    "`logvar_clamp`区间[{min}, {max}]无效"
                )));
            }
        }
        Ok(())
    }

    /// 解码器是否按概率采样
    pub const fn random_sample(&self) -> bool {
        self.overgen != 1
    }

    /// 编码器表示的维度：hidden × 层数 × 2（双向）
    pub const fn encoder_output_size(&self) -> usize {
        self.hidden_size * self.n_layers * 2
    }
}
