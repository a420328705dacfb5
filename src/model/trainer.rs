/*
 * @Description  : 训练调度：三个参数组各自的优化器与交替更新
 *
 * 每轮迭代：begin（前向 + 全部损失）→ 任意顺序地执行 update_core / update_discriminator / update_generator
 * （每个至多一次，可跳过）→ finish。损失只存在于 [`Iteration`] 中，更新只能通过它发起。
 *
 * 每次更新：只对本组参数反向传播 → 每个子模块分别裁剪梯度 → 本组优化器 step → 清空本组梯度。
 * 迭代开始时冻结参数快照，先执行的更新不会改变后续更新所用的梯度。
 */

use tracing::{debug, info};

use super::cvae_gan::{CvaeGan, ForwardMode, ForwardOutput};
use super::error::ModelError;
use super::group::{GroupKind, ParameterGroup};
use super::loss::{
    LossBundle, LossComposer, LossValues, discriminator_loss, ensure_finite, generator_loss,
};
use super::observer::ForwardObserver;
use super::rnn::{RnnDecoder, RnnEncoder};
use super::seq::{SequenceDecoder, SequenceEncoder};
use crate::data::Batch;
use crate::nn::{Adam, Optimizer, Var};

/// 一次参数组更新的记录
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateReport {
    pub kind: GroupKind,
    pub loss: f32,
    /// 各子模块裁剪前的梯度范数
    pub clip_norms: Vec<(String, f32)>,
}

/// 一轮迭代的记录
#[derive(Debug, Clone, PartialEq)]
pub struct IterationReport {
    pub global_step: u64,
    pub losses: LossValues,
    pub d_loss: f32,
    pub g_loss: f32,
    pub updates: Vec<UpdateReport>,
}

/// 训练调度器：持有模型、三个参数组及其优化器
pub struct TrainingOrchestrator<E = RnnEncoder, D = RnnDecoder> {
    model: CvaeGan<E, D>,
    core: ParameterGroup,
    discriminator: ParameterGroup,
    generator: ParameterGroup,
    core_optimizer: Adam,
    d_optimizer: Adam,
    g_optimizer: Adam,
    composer: LossComposer,
    clip: f32,
    iterations: u64,
}

impl<E: SequenceEncoder, D: SequenceDecoder> TrainingOrchestrator<E, D> {
    pub fn new(model: CvaeGan<E, D>) -> Self {
        let graph = model.graph().clone();
        let config = model.config().clone();
        let core = model.core_group();
        let discriminator = model.discriminator_group();
        let generator = model.generator_group();
        info!(
            core = core.parameters().len(),
            discriminator = discriminator.parameters().len(),
            generator = generator.parameters().len(),
            lr = config.lr,
            d_lr = config.d_lr,
            g_lr = config.g_lr,
            clip = config.clip,
            "训练调度器创建完成"
        );
        Self {
            core_optimizer: Adam::new(&graph, &core.parameters(), config.lr),
            d_optimizer: Adam::new(&graph, &discriminator.parameters(), config.d_lr),
            g_optimizer: Adam::new(&graph, &generator.parameters(), config.g_lr),
            composer: LossComposer::new(config.full_kl_step, config.dec_type),
            clip: config.clip,
            core,
            discriminator,
            generator,
            model,
            iterations: 0,
        }
    }

    /// 开始一轮迭代：前向传播并计算全部损失
    ///
    /// `global_step`由外部训练循环维护，只用于 KL 退火。
    pub fn begin(&mut self, batch: &Batch, global_step: u64) -> Result<Iteration<'_, E, D>, ModelError> {
        self.begin_inner(batch, global_step, None)
    }

    /// 同 [`Self::begin`]，前向传播后调用观察者
    pub fn begin_observed(
        &mut self,
        batch: &Batch,
        global_step: u64,
        observer: &mut dyn ForwardObserver,
    ) -> Result<Iteration<'_, E, D>, ModelError> {
        self.begin_inner(batch, global_step, Some(observer))
    }

    fn begin_inner(
        &mut self,
        batch: &Batch,
        global_step: u64,
        observer: Option<&mut dyn ForwardObserver>,
    ) -> Result<Iteration<'_, E, D>, ModelError> {
        let graph = self.model.graph().clone();
        graph.release_transient();
        graph.zero_grad();
        graph.freeze_parameters();

        let prepared = self.prepare(batch, global_step, observer);
        match prepared {
            Ok((output, losses, d_loss, g_loss)) => {
                self.iterations += 1;
                Ok(Iteration {
                    trainer: self,
                    global_step,
                    output,
                    losses,
                    d_loss,
                    g_loss,
                    applied: Vec::with_capacity(3),
                    updates: Vec::with_capacity(3),
                })
            }
            Err(e) => {
                graph.release_transient();
                Err(e)
            }
        }
    }

    fn prepare(
        &self,
        batch: &Batch,
        global_step: u64,
        observer: Option<&mut dyn ForwardObserver>,
    ) -> Result<(ForwardOutput, LossBundle, Var, Var), ModelError> {
        let output = match observer {
            Some(observer) => self.model.forward_observed(batch, ForwardMode::TRAIN, observer)?,
            None => self.model.forward(batch, ForwardMode::TRAIN)?,
        };
        let losses = self.composer.compose(&output, batch, global_step)?;
        let d_loss = discriminator_loss(&output.d_real, &output.d_fake)?;
        let g_loss = generator_loss(&output.d_fake)?;
        Ok((output, losses, d_loss, g_loss))
    }

    /// 生成（先验采样 + 自回归解码）
    pub fn generate(&self, batch: &Batch) -> Result<Vec<String>, ModelError> {
        self.model.generate(batch)
    }

    pub const fn model(&self) -> &CvaeGan<E, D> {
        &self.model
    }

    pub fn into_model(self) -> CvaeGan<E, D> {
        self.model
    }

    pub const fn group(&self, kind: GroupKind) -> &ParameterGroup {
        match kind {
            GroupKind::Core => &self.core,
            GroupKind::Discriminator => &self.discriminator,
            GroupKind::Generator => &self.generator,
        }
    }

    pub const fn optimizer(&self, kind: GroupKind) -> &Adam {
        match kind {
            GroupKind::Core => &self.core_optimizer,
            GroupKind::Discriminator => &self.d_optimizer,
            GroupKind::Generator => &self.g_optimizer,
        }
    }

    /// 已开始的迭代轮数
    pub const fn iterations(&self) -> u64 {
        self.iterations
    }

    pub const fn clip(&self) -> f32 {
        self.clip
    }
}

/// 一轮迭代：持有本轮的前向结果与损失，结束（drop）时释放图中的临时节点
pub struct Iteration<'a, E: SequenceEncoder, D: SequenceDecoder> {
    trainer: &'a mut TrainingOrchestrator<E, D>,
    global_step: u64,
    output: ForwardOutput,
    losses: LossBundle,
    d_loss: Var,
    g_loss: Var,
    applied: Vec<GroupKind>,
    updates: Vec<UpdateReport>,
}

impl<E: SequenceEncoder, D: SequenceDecoder> Iteration<'_, E, D> {
    pub const fn output(&self) -> &ForwardOutput {
        &self.output
    }

    pub const fn losses(&self) -> &LossBundle {
        &self.losses
    }

    pub const fn global_step(&self) -> u64 {
        self.global_step
    }

    pub fn loss_values(&self) -> Result<LossValues, ModelError> {
        self.losses.values()
    }

    pub fn d_loss(&self) -> Result<f32, ModelError> {
        ensure_finite("d_loss", &self.d_loss)
    }

    pub fn g_loss(&self) -> Result<f32, ModelError> {
        ensure_finite("g_loss", &self.g_loss)
    }

    /// 更新 Core 参数组（损失为 rc + kl_weight·kl + da + sv）
    pub fn update_core(&mut self) -> Result<UpdateReport, ModelError> {
        self.apply(GroupKind::Core)
    }

    /// 更新判别器（损失为 BCE(D_real, 1) + BCE(D_fake, 0)）
    pub fn update_discriminator(&mut self) -> Result<UpdateReport, ModelError> {
        self.apply(GroupKind::Discriminator)
    }

    /// 更新生成器（损失为 BCE(D_fake, 1)）
    pub fn update_generator(&mut self) -> Result<UpdateReport, ModelError> {
        self.apply(GroupKind::Generator)
    }

    pub fn applied(&self) -> &[GroupKind] {
        &self.applied
    }

    fn apply(&mut self, kind: GroupKind) -> Result<UpdateReport, ModelError> {
        if self.applied.contains(&kind) {
            return Err(ModelError::UpdateAlreadyApplied(kind));
        }
        let (name, loss) = match kind {
            GroupKind::Core => ("total", &self.losses.total),
            GroupKind::Discriminator => ("d_loss", &self.d_loss),
            GroupKind::Generator => ("g_loss", &self.g_loss),
        };
        let loss_value = ensure_finite(name, loss)?;

        let trainer = &mut *self.trainer;
        let (group, optimizer) = match kind {
            GroupKind::Core => (&trainer.core, &mut trainer.core_optimizer),
            GroupKind::Discriminator => (&trainer.discriminator, &mut trainer.d_optimizer),
            GroupKind::Generator => (&trainer.generator, &mut trainer.g_optimizer),
        };

        group.zero_grad()?;
        loss.backward_for(&group.parameters())?;
        let clip_norms = group.clip_each(trainer.clip)?;
        optimizer.step()?;
        group.zero_grad()?;

        debug!(group = %kind, loss = loss_value, ?clip_norms, "参数组更新完成");
        self.applied.push(kind);
        let report = UpdateReport {
            kind,
            loss: loss_value,
            clip_norms,
        };
        self.updates.push(report.clone());
        Ok(report)
    }

    /// 结束本轮迭代并返回记录
    pub fn finish(mut self) -> Result<IterationReport, ModelError> {
        Ok(IterationReport {
            global_step: self.global_step,
            losses: self.losses.values()?,
            d_loss: ensure_finite("d_loss", &self.d_loss)?,
            g_loss: ensure_finite("g_loss", &self.g_loss)?,
            updates: std::mem::take(&mut self.updates),
        })
    }
}

impl<E: SequenceEncoder, D: SequenceDecoder> Drop for Iteration<'_, E, D> {
    fn drop(&mut self) {
        self.trainer.model.graph().release_transient();
    }
}
