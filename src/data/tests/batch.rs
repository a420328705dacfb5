//! 批次构建单元测试

use super::example;
use crate::assert_err;
use crate::data::{Batch, DataError, EOS_ID, PAD_ID, Vocabulary};

fn vocab() -> Vocabulary {
    Vocabulary::from_sentences([
        "a b c d",
        "x y",
        "p q r",
        "hello there friend",
    ])
}

#[test]
fn test_batch_sorted_by_input_length() {
    let vocab = vocab();
    let examples = vec![
        example("x y", "a", 0, &[1]),
        example("a b c d", "b c", 1, &[0, 2]),
        example("p q", "x", 2, &[]),
        example("p q r", "y", 0, &[3]),
    ];
    let batch = Batch::from_examples(&examples, &vocab, 3, 4).unwrap();

    // 1. 长度（含 EOS）降序，长度相同保持原顺序
    assert_eq!(batch.input_lengths(), &[5, 4, 3, 3]);
    assert_eq!(batch.order(), &[1, 3, 0, 2]);

    // 2. 标签与条件随样本一起重排
    assert_eq!(batch.da_labels(), &[1, 0, 0, 2]);
    assert_eq!(batch.conditions().shape(), &[4, 3]);
    assert_eq!(batch.conditions()[[0, 0]], 1.0);
    assert_eq!(&batch.sv_targets().to_vec()[..4], &[1.0, 0.0, 1.0, 0.0]);
    assert_eq!(batch.sv_targets()[[1, 3]], 1.0);

    // 3. 补齐
    assert!(batch.input_ids().iter().all(|ids| ids.len() == 5));
    assert_eq!(batch.input_ids()[2], vec![vocab.index_of("x"), vocab.index_of("y"), EOS_ID, PAD_ID, PAD_ID]);
    assert_eq!(batch.target_lengths(), &[3, 2, 2, 2]);
}

#[test]
fn test_batch_input_one_hot() {
    let vocab = vocab();
    let examples = vec![example("a b", "c", 0, &[]), example("x", "y", 0, &[])];
    let batch = Batch::from_examples(&examples, &vocab, 1, 1).unwrap();
    let one_hot = batch.input_one_hot(vocab.len());

    assert_eq!(one_hot.shape(), &[2, 3, vocab.len()]);
    assert_eq!(one_hot[[0, 0, vocab.index_of("a")]], 1.0);
    assert_eq!(one_hot[[0, 2, EOS_ID]], 1.0);
    // 补齐位置全为0
    assert_eq!(one_hot.select(0, 1).unwrap().select(0, 2).unwrap().sum(), 0.0);
    assert_eq!(one_hot.sum(), 5.0);
}

#[test]
fn test_batch_errors() {
    let vocab = vocab();

    // 1. 空批次
    assert_err!(Batch::from_examples(&[], &vocab, 3, 4), DataError::EmptyBatch);

    // 2. 标签越界
    let bad_da = vec![example("a", "b", 5, &[])];
    assert_err!(
        Batch::from_examples(&bad_da, &vocab, 3, 4),
        DataError::LabelOutOfRange { kind: "dialogue_act", .. }
    );
    let bad_sv = vec![example("a", "b", 0, &[4])];
    assert_err!(
        Batch::from_examples(&bad_sv, &vocab, 3, 4),
        DataError::LabelOutOfRange { kind: "slot_value", .. }
    );

    // 3. 条件向量维度不一致
    let mut uneven = vec![example("a", "b", 0, &[]), example("x", "y", 0, &[])];
    uneven[1].condition.push(0.0);
    assert_err!(
        Batch::from_examples(&uneven, &vocab, 3, 4),
        DataError::InconsistentCondition { index: 1, .. }
    );

    // 4. 空输入
    let empty = vec![example("  ", "b", 0, &[])];
    assert_err!(Batch::from_examples(&empty, &vocab, 3, 4), DataError::EmptySequence(0));
}
