/*
 * @Description  : 对话生成的 CVAE-GAN 模型
 *
 * # 主要组件
 *
 * - [`LatentEncoder`]/[`PriorNetwork`]/[`LatentSampler`]: 后验、先验与重参数化采样
 * - [`AuxiliaryPredictors`]: 对话行为/槽值的辅助预测头
 * - [`Discriminator`] 与 [`GeneratedTextReEncoder`]: 区分真实输入与重新编码的生成文本
 * - [`LossComposer`]: 重构 + 退火 KL + 辅助任务 + 对抗损失
 * - [`TrainingOrchestrator`]: 三个参数组（Core / Discriminator / Generator）的交替更新
 *
 * # 使用示例
 * ```ignore
 * let graph = Graph::new_with_seed(42);
 * let model = CvaeGan::new(&graph, config, vocab)?;
 * let mut trainer = TrainingOrchestrator::new(model);
 * for (step, batch) in batches.iter().enumerate() {
 *     let mut iteration = trainer.begin(batch, step as u64)?;
 *     iteration.update_core()?;
 *     iteration.update_discriminator()?;
 *     iteration.update_generator()?;
 *     let report = iteration.finish()?;
 * }
 * ```
 */

mod auxiliary;
mod config;
mod cvae_gan;
mod error;
mod group;
mod latent;
mod loss;
mod observer;
mod reencode;
mod rnn;
mod seq;
mod trainer;

#[cfg(test)]
mod tests;

pub use auxiliary::{AuxiliaryOutput, AuxiliaryPredictors, Discriminator};
pub use config::{CvaeGanConfig, DecoderKind};
pub use cvae_gan::{CvaeGan, ForwardMode, ForwardOutput};
pub use error::ModelError;
pub use group::{GroupKind, ParameterGroup};
pub use latent::{LatentDistribution, LatentEncoder, LatentSampler, PriorNetwork, sample_gaussian};
pub use loss::{
    LossBundle, LossComposer, LossValues, discriminator_loss, ensure_finite, gaussian_kld,
    generator_loss, kl_weight,
};
pub use observer::{ForwardObserver, LatentFeatureCollector};
pub use reencode::{GeneratedTextReEncoder, ReEncoded, SortedSoftBatch, effective_lengths};
pub use rnn::{RnnDecoder, RnnEncoder};
pub use seq::{DecoderOutput, EncoderOutput, SequenceDecoder, SequenceEncoder};
pub use trainer::{Iteration, IterationReport, TrainingOrchestrator, UpdateReport};
