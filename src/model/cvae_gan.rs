/*
 * @Description  : CVAE-GAN 模型：编码 → 后验/先验 → 采样 → 辅助预测 & 解码 → 生成文本重新编码 → 判别
 */

use tracing::{debug, info};

use super::auxiliary::{AuxiliaryOutput, AuxiliaryPredictors, Discriminator};
use super::config::{CvaeGanConfig, DecoderKind};
use super::error::ModelError;
use super::group::{GroupKind, ParameterGroup};
use super::latent::{LatentDistribution, LatentEncoder, LatentSampler, PriorNetwork};
use super::observer::ForwardObserver;
use super::reencode::{GeneratedTextReEncoder, SortedSoftBatch};
use super::rnn::{RnnDecoder, RnnEncoder};
use super::seq::{DecoderOutput, SequenceDecoder, SequenceEncoder};
use crate::data::{Batch, Vocabulary};
use crate::nn::{Graph, Linear, Module, Var};

/// 一次前向传播的模式
///
/// 采样来源由调用方显式传入，模型本身不保存“当前模式”。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForwardMode {
    /// 从先验（而不是后验）采样潜变量
    pub use_prior: bool,
    /// 解码器以自己的预测作为下一步输入
    pub generation: bool,
}

impl ForwardMode {
    /// 训练：后验采样 + teacher forcing
    pub const TRAIN: Self = Self {
        use_prior: false,
        generation: false,
    };
    /// 生成：先验采样 + 自回归解码
    pub const GENERATE: Self = Self {
        use_prior: true,
        generation: true,
    };
}

/// 前向传播的全部中间结果，行顺序与输入批次一致（重新编码部分除外）
#[derive(Debug)]
pub struct ForwardOutput {
    /// 真实输入的编码器表示 [batch, H]
    pub representation: Var,
    pub posterior: LatentDistribution,
    pub prior: LatentDistribution,
    /// 采样得到的潜变量 [batch, latent_size]
    pub z: Var,
    pub auxiliary: AuxiliaryOutput,
    pub decoder: DecoderOutput,
    /// 判别器对真实输入的输出 [batch, 1]
    pub d_real: Var,
    /// 判别器对重新编码的生成文本的输出 [batch, 1]，行顺序见`reencoded.order`
    pub d_fake: Var,
    pub reencoded: SortedSoftBatch,
}

/// CVAE-GAN 模型
///
/// 所有参数都创建在同一张图上；编码器与解码器通过 [`SequenceEncoder`]/[`SequenceDecoder`] 注入，
/// 默认使用本 crate 的 Rnn 实现。
///
/// # 使用示例
/// ```ignore
/// let graph = Graph::new_with_seed(42);
/// let model = CvaeGan::new(&graph, config, vocab)?;
/// let output = model.forward(&batch, ForwardMode::TRAIN)?;
/// ```
pub struct CvaeGan<E = RnnEncoder, D = RnnDecoder> {
    graph: Graph,
    config: CvaeGanConfig,
    vocab: Vocabulary,
    enc: E,
    dec: D,
    /// 潜变量 → 条件向量空间的特征变换
    feat: Linear,
    latent_encoder: LatentEncoder,
    prior: PriorNetwork,
    auxiliary: AuxiliaryPredictors,
    discriminator: Discriminator,
    sampler: LatentSampler,
}

impl CvaeGan<RnnEncoder, RnnDecoder> {
    /// 使用 Rnn 编码器/解码器创建模型
    pub fn new(graph: &Graph, config: CvaeGanConfig, vocab: Vocabulary) -> Result<Self, ModelError> {
        config.validate()?;
        let enc = RnnEncoder::new(
            graph,
            config.vocab_size,
            config.hidden_size,
            config.n_layers,
            "enc",
        )?;
        let condition_size = match config.dec_type {
            DecoderKind::Sclstm => config.d_size,
            DecoderKind::Plain => 0,
        };
        let dec = RnnDecoder::new(
            graph,
            config.latent_size,
            config.hidden_size,
            config.vocab_size,
            condition_size,
            "dec",
        )?;
        Self::with_collaborators(graph, config, vocab, enc, dec)
    }
}

impl<E: SequenceEncoder, D: SequenceDecoder> CvaeGan<E, D> {
    /// 使用自定义的编码器/解码器创建模型（两者须创建在`graph`上）
    pub fn with_collaborators(
        graph: &Graph,
        config: CvaeGanConfig,
        vocab: Vocabulary,
        enc: E,
        dec: D,
    ) -> Result<Self, ModelError> {
        config.validate()?;
        if vocab.len() > config.vocab_size {
            return Err(ModelError::InvalidConfig(format!(
                "词表有{}个词，超过了`vocab_size`={}",
                vocab.len(),
                config.vocab_size
            )));
        }

        let repr_size = enc.output_size();
        let latent = config.latent_size;
        let model = Self {
            graph: graph.clone(),
            feat: Linear::new(graph, latent, config.d_size, true, "feat")?,
            latent_encoder: LatentEncoder::new(
                graph,
                repr_size,
                config.d_size,
                latent,
                config.logvar_clamp,
            )?,
            prior: PriorNetwork::new(graph, config.d_size, latent, config.logvar_clamp)?,
            auxiliary: AuxiliaryPredictors::new(graph, latent, config.da_size, config.sv_size)?,
            discriminator: Discriminator::new(graph, repr_size)?,
            sampler: LatentSampler::new(config.std),
            enc,
            dec,
            vocab,
            config,
        };
        info!(
            dec_type = ?model.config.dec_type,
            hidden = model.config.hidden_size,
            latent,
            vocab = model.config.vocab_size,
            parameters = model.graph.parameters().len(),
            "CVAE-GAN 模型创建完成"
        );
        Ok(model)
    }

    fn check_batch(&self, batch: &Batch) -> Result<(), ModelError> {
        let cond_width = batch.conditions().shape()[1];
        if cond_width != self.config.d_size {
            return Err(ModelError::BatchMismatch {
                what: "条件向量维度",
                expected: self.config.d_size,
                got: cond_width,
            });
        }
        let sv_width = batch.sv_targets().shape()[1];
        if sv_width != self.config.sv_size {
            return Err(ModelError::BatchMismatch {
                what: "槽值维度",
                expected: self.config.sv_size,
                got: sv_width,
            });
        }
        Ok(())
    }

    /// 前向传播
    ///
    /// 产生的中间节点留在图中，直到调用方执行 [`Graph::release_transient`]；
    /// 反复前向而不释放会让图持续增长。训练时由 [`crate::model::Iteration`] 负责释放，
    /// [`Self::generate`] 在返回前自行释放。
    pub fn forward(&self, batch: &Batch, mode: ForwardMode) -> Result<ForwardOutput, ModelError> {
        self.check_batch(batch)?;
        let graph = &self.graph;

        // 1. 编码真实输入，判别器给出 D_real
        let input = graph.input(&batch.input_one_hot(self.config.vocab_size))?;
        let representation = self
            .enc
            .encode(&input, batch.input_lengths())?
            .representation()?;
        let d_real = self.discriminator.forward(&representation)?;

        // 2. 后验与先验都要算，`use_prior`只决定采样来源
        let cond = graph.input(batch.conditions())?;
        let posterior = self.latent_encoder.forward(&representation, &cond)?;
        let prior = self.prior.forward(&cond)?;
        let z = self.sampler.sample(&posterior, &prior, mode.use_prior)?;

        // 3. 辅助预测与解码
        let auxiliary = self.auxiliary.forward(&z)?;
        let (driving, _) = self.config.dec_type.driving_sequence(batch);
        let condition = match self.config.dec_type {
            DecoderKind::Sclstm => Some(&cond),
            DecoderKind::Plain => None,
        };
        let decoder = self.dec.decode(
            driving,
            &self.vocab,
            &z,
            condition,
            mode.generation,
            self.config.random_sample(),
        )?;

        // 4. 生成文本重新编码，判别器给出 D_fake
        let reencoded =
            GeneratedTextReEncoder::reencode(&self.enc, &decoder.logits, &decoder.decoded_words)?;
        let d_fake = self.discriminator.forward(&reencoded.representation)?;
        debug!(
            batch = batch.len(),
            use_prior = mode.use_prior,
            generation = mode.generation,
            nodes = graph.node_count(),
            "前向传播完成"
        );

        Ok(ForwardOutput {
            representation,
            posterior,
            prior,
            z,
            auxiliary,
            decoder,
            d_real,
            d_fake,
            reencoded: reencoded.batch,
        })
    }

    /// 前向传播后调用观察者，节点释放的约定同 [`Self::forward`]
    pub fn forward_observed(
        &self,
        batch: &Batch,
        mode: ForwardMode,
        observer: &mut dyn ForwardObserver,
    ) -> Result<ForwardOutput, ModelError> {
        let output = self.forward(batch, mode)?;
        observer.observe(batch, &output)?;
        Ok(output)
    }

    /// 从先验采样并自回归解码，返回生成的句子（按批次内的排序）
    ///
    /// 结束后释放图中的全部临时节点。
    pub fn generate(&self, batch: &Batch) -> Result<Vec<String>, ModelError> {
        let result = self
            .forward(batch, ForwardMode::GENERATE)
            .map(|output| output.decoder.decoded_words);
        self.graph.release_transient();
        result
    }

    /// 把潜变量映射回条件向量空间 [batch, d_size]
    pub fn project_condition(&self, z: &Var) -> Result<Var, ModelError> {
        Ok(self.feat.forward(z)?)
    }

    // ==================== 参数组 ====================

    /// Core：编码器、解码器、特征变换、识别网络、先验网络两层、两个辅助头
    pub fn core_group(&self) -> ParameterGroup {
        ParameterGroup::new(GroupKind::Core)
            .with("enc", self.enc.parameters())
            .with("dec", self.dec.parameters())
            .with("feat", self.feat.parameters())
            .with("recog", self.latent_encoder.parameters())
            .with("fc", self.prior.fc().parameters())
            .with("prior", self.prior.prior().parameters())
            .with("pred_da", self.auxiliary.pred_da().parameters())
            .with("pred_sv", self.auxiliary.pred_sv().parameters())
    }

    /// Discriminator：只有判别器
    pub fn discriminator_group(&self) -> ParameterGroup {
        ParameterGroup::new(GroupKind::Discriminator).with("D1", self.discriminator.parameters())
    }

    /// Generator：解码器与先验网络，与 Core 共享同一批参数节点
    pub fn generator_group(&self) -> ParameterGroup {
        ParameterGroup::new(GroupKind::Generator)
            .with("dec", self.dec.parameters())
            .with("fc", self.prior.fc().parameters())
            .with("prior", self.prior.prior().parameters())
    }

    // ==================== 访问器 ====================

    pub const fn graph(&self) -> &Graph {
        &self.graph
    }

    pub const fn config(&self) -> &CvaeGanConfig {
        &self.config
    }

    pub const fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    pub const fn encoder(&self) -> &E {
        &self.enc
    }

    pub const fn decoder(&self) -> &D {
        &self.dec
    }

    pub const fn sampler(&self) -> &LatentSampler {
        &self.sampler
    }
}
