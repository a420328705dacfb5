//! 数据准备模块
//!
//! 提供词表与批次构建功能。数据集的读取不在本 crate 的范围内，
//! 调用方自行构造 [`Example`]。
//!
//! # 主要组件
//!
//! - [`Vocabulary`]: 单词与下标的双向映射，保留 `PAD`/`SOS`/`EOS`/`UNK`
//! - [`Example`]: 一条对话样本（输入、目标、条件向量、对话行为、槽值）
//! - [`Batch`]: 按输入长度降序排列并补齐的批次
//! - [`DataError`]: 数据准备错误类型
//!
//! # 使用示例
//!
//! ```ignore
//! use cvae_gan::data::{Batch, Example, Vocabulary};
//!
//! let vocab = Vocabulary::from_sentences(examples.iter().flat_map(|e| [e.input.as_str(), e.target.as_str()]));
//! let batch = Batch::from_examples(&examples, &vocab, da_size, sv_size)?;
//! ```

mod batch;
pub mod error;
mod vocab;

#[cfg(test)]
mod tests;

pub use batch::{Batch, Example};
pub use error::DataError;
pub use vocab::{
    EOS_ID, EOS_TOKEN, PAD_ID, PAD_TOKEN, SOS_ID, SOS_TOKEN, UNK_ID, UNK_TOKEN, Vocabulary,
};
