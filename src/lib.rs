//! # cvae_gan
//!
//! 用于对话回复生成的条件变分自编码器 + 生成对抗网络（CVAE-GAN），
//! 附带对话行为、槽值两个辅助分类任务。
//!
//! 数值部分建立在一个即时求值的自动微分图之上（[`nn::Graph`]/[`nn::Var`]），
//! 张量由 ndarray 承载（[`tensor::Tensor`]）。
//!
//! - [`data`]: 词表与批次
//! - [`model`]: 模型、损失与训练调度

pub mod data;
pub mod errors;
pub mod model;
pub mod nn;
pub mod tensor;
pub mod utils;
