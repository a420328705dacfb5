//! 词表：单词与下标的双向映射
//!
//! 下标 0..4 固定保留给 `PAD`、`SOS`、`EOS`、`UNK`。

use std::collections::HashMap;

pub const PAD_TOKEN: &str = "PAD_token";
pub const SOS_TOKEN: &str = "SOS_token";
pub const EOS_TOKEN: &str = "EOS_token";
pub const UNK_TOKEN: &str = "UNK_token";

pub const PAD_ID: usize = 0;
pub const SOS_ID: usize = 1;
pub const EOS_ID: usize = 2;
pub const UNK_ID: usize = 3;

/// 单词与下标的双向映射
#[derive(Debug, Clone)]
pub struct Vocabulary {
    word2index: HashMap<String, usize>,
    index2word: Vec<String>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::new()
    }
}

impl Vocabulary {
    /// 只含 4 个保留词的词表
    pub fn new() -> Self {
        let mut vocab = Self {
            word2index: HashMap::new(),
            index2word: Vec::new(),
        };
        for word in [PAD_TOKEN, SOS_TOKEN, EOS_TOKEN, UNK_TOKEN] {
            vocab.add_word(word);
        }
        vocab
    }

    /// 由若干句子（空白分词）构建词表
    pub fn from_sentences<'a>(sentences: impl IntoIterator<Item = &'a str>) -> Self {
        let mut vocab = Self::new();
        for sentence in sentences {
            vocab.add_sentence(sentence);
        }
        vocab
    }

    /// 添加单词并返回其下标（已存在则返回原下标）
    pub fn add_word(&mut self, word: &str) -> usize {
        if let Some(&index) = self.word2index.get(word) {
            return index;
        }
        let index = self.index2word.len();
        self.word2index.insert(word.to_string(), index);
        self.index2word.push(word.to_string());
        index
    }

    pub fn add_sentence(&mut self, sentence: &str) {
        for word in sentence.split_whitespace() {
            self.add_word(word);
        }
    }

    pub fn len(&self) -> usize {
        self.index2word.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index2word.is_empty()
    }

    /// 单词的下标，未登录词返回 `UNK`
    pub fn index_of(&self, word: &str) -> usize {
        self.word2index
            .get(word)
            .copied()
            .unwrap_or_else(|| self.unk_id())
    }

    pub fn word_of(&self, index: usize) -> Option<&str> {
        self.index2word.get(index).map(String::as_str)
    }

    /// 把句子编码为下标序列，末尾追加 `EOS`
    pub fn encode(&self, sentence: &str) -> Vec<usize> {
        sentence
            .split_whitespace()
            .map(|w| self.index_of(w))
            .chain(std::iter::once(self.eos_id()))
            .collect()
    }

    /// 把下标序列还原为句子，遇到第一个 `EOS` 即停止；`PAD`/`SOS` 被跳过
    pub fn decode_until_eos(&self, indices: &[usize]) -> String {
        indices
            .iter()
            .take_while(|&&i| i != self.eos_id())
            .filter(|&&i| i != self.pad_id() && i != self.sos_id())
            .map(|&i| self.word_of(i).unwrap_or(UNK_TOKEN))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub const fn pad_id(&self) -> usize {
        PAD_ID
    }

    pub const fn sos_id(&self) -> usize {
        SOS_ID
    }

    pub const fn eos_id(&self) -> usize {
        EOS_ID
    }

    pub const fn unk_id(&self) -> usize {
        UNK_ID
    }
}
