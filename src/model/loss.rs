/*
 * @Description  : 损失组合：重构 + 退火 KL + 辅助任务 + 对抗
 */

use super::config::DecoderKind;
use super::cvae_gan::ForwardOutput;
use super::error::ModelError;
use super::latent::LatentDistribution;
use crate::data::Batch;
use crate::nn::{GraphError, Var, VarActivationOps, VarLossOps, VarMatrixOps};
use crate::tensor::Tensor;

/// 两个对角高斯分布之间的闭式 KL(q‖p)，每个样本一个值 [batch, 1]
///
/// KL = -0.5 · Σ [1 + (logσ²_q − logσ²_p) − (μ_p − μ_q)² / σ²_p − σ²_q / σ²_p]
pub fn gaussian_kld(
    posterior: &LatentDistribution,
    prior: &LatentDistribution,
) -> Result<Var, GraphError> {
    let one = posterior.mean.get_graph().input(&Tensor::scalar(1.0))?;
    let prior_var = prior.log_var.exp();
    let mean_diff = prior.mean.try_sub(&posterior.mean)?;
    let inner = one
        .try_add(&posterior.log_var.try_sub(&prior.log_var)?)?
        .try_sub(&mean_diff.try_mul(&mean_diff)?.try_div(&prior_var)?)?
        .try_sub(&posterior.log_var.exp().try_div(&prior_var)?)?;
    inner.sum_axis(1)?.try_scale(-0.5)
}

/// KL 退火权重：min(global_step / full_kl_step, 1)，`full_kl_step`为0时恒为1
pub fn kl_weight(global_step: u64, full_kl_step: u64) -> f32 {
    if full_kl_step == 0 {
        return 1.0;
    }
    (global_step as f64 / full_kl_step as f64).min(1.0) as f32
}

/// 判别器损失：BCE(D_real, 1) + BCE(D_fake, 0)
pub fn discriminator_loss(d_real: &Var, d_fake: &Var) -> Result<Var, GraphError> {
    let real = d_real.bce_loss(&Tensor::ones(&d_real.shape()?))?;
    let fake = d_fake.bce_loss(&Tensor::zeros(&d_fake.shape()?))?;
    real.try_add(&fake)
}

/// 生成器损失：BCE(D_fake, 1)
///
/// 使用饱和形式，生成器直接最大化判别器把生成文本判为真实的概率。
pub fn generator_loss(d_fake: &Var) -> Result<Var, GraphError> {
    d_fake.bce_loss(&Tensor::ones(&d_fake.shape()?))
}

/// 检查标量损失是否有限，返回其值
pub fn ensure_finite(name: &'static str, loss: &Var) -> Result<f32, ModelError> {
    let value = loss.item()?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ModelError::NonFiniteLoss { name, value })
    }
}

/// 一次迭代的各项损失（标量 Var，仍在图上，可反向传播）
#[derive(Debug, Clone)]
pub struct LossBundle {
    pub rc: Var,
    pub kl: Var,
    pub da: Var,
    pub sv: Var,
    pub kl_weight: f32,
    /// rc + kl_weight · kl + da + sv
    pub total: Var,
}

/// [`LossBundle`] 的数值
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LossValues {
    pub rc: f32,
    pub kl: f32,
    pub da: f32,
    pub sv: f32,
    pub kl_weight: f32,
    pub total: f32,
}

impl LossBundle {
    /// 读取各项数值，任何一项不是有限值都立即报错
    pub fn values(&self) -> Result<LossValues, ModelError> {
        Ok(LossValues {
            rc: ensure_finite("rc", &self.rc)?,
            kl: ensure_finite("kl", &self.kl)?,
            da: ensure_finite("da", &self.da)?,
            sv: ensure_finite("sv", &self.sv)?,
            kl_weight: self.kl_weight,
            total: ensure_finite("total", &self.total)?,
        })
    }
}

/// 组合 Core 参数组的损失
///
/// 重构损失以解码器的驱动序列为目标（见 [`DecoderKind::driving_sequence`]）。
pub struct LossComposer {
    full_kl_step: u64,
    dec_type: DecoderKind,
}

impl LossComposer {
    pub const fn new(full_kl_step: u64, dec_type: DecoderKind) -> Self {
        Self {
            full_kl_step,
            dec_type,
        }
    }

    /// `global_step`由外部训练循环维护并传入
    pub fn compose(
        &self,
        output: &ForwardOutput,
        batch: &Batch,
        global_step: u64,
    ) -> Result<LossBundle, ModelError> {
        let (targets, lengths) = self.dec_type.driving_sequence(batch);
        let rc = output.decoder.logits.masked_cross_entropy(targets, lengths)?;
        let kl = gaussian_kld(&output.posterior, &output.prior)?.mean_all()?;
        let da = output
            .auxiliary
            .da_logits
            .softmax_cross_entropy(batch.da_labels())?;
        let sv = output
            .auxiliary
            .sv_logits
            .multi_label_soft_margin(batch.sv_targets())?;
        let weight = kl_weight(global_step, self.full_kl_step);

        let total = rc
            .try_add(&kl.try_scale(weight)?)?
            .try_add(&da)?
            .try_add(&sv)?;
        Ok(LossBundle {
            rc,
            kl,
            da,
            sv,
            kl_weight: weight,
            total,
        })
    }
}
