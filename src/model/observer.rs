/*
 * @Description  : 前向传播的观察者
 *
 * 训练/推断路径不依赖观察者；需要收集中间特征（例如做潜空间可视化）时，
 * 调用方传入一个实现了 [`ForwardObserver`] 的对象，每次前向传播后被调用一次。
 */

use std::collections::BTreeMap;

use super::cvae_gan::ForwardOutput;
use super::error::ModelError;
use crate::data::Batch;

pub trait ForwardObserver {
    fn observe(&mut self, batch: &Batch, output: &ForwardOutput) -> Result<(), ModelError>;
}

/// 按对话行为标签收集先验均值
#[derive(Debug, Default, Clone)]
pub struct LatentFeatureCollector {
    by_dialogue_act: BTreeMap<usize, Vec<Vec<f32>>>,
}

impl LatentFeatureCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// 某个对话行为下收集到的特征
    pub fn features(&self, dialogue_act: usize) -> &[Vec<f32>] {
        self.by_dialogue_act
            .get(&dialogue_act)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn dialogue_acts(&self) -> impl Iterator<Item = usize> + '_ {
        self.by_dialogue_act.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.by_dialogue_act.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.by_dialogue_act.clear();
    }
}

impl ForwardObserver for LatentFeatureCollector {
    fn observe(&mut self, batch: &Batch, output: &ForwardOutput) -> Result<(), ModelError> {
        let means = output.prior.mean.value()?;
        let latent_size = means.shape()[1];
        for (row, &da) in batch.da_labels().iter().enumerate() {
            let feature = (0..latent_size).map(|j| means[[row, j]]).collect();
            self.by_dialogue_act.entry(da).or_default().push(feature);
        }
        Ok(())
    }
}
