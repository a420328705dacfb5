/*
 * 端到端集成测试：构建批次 → 前向传播 → 组合损失 → 三个参数组依次更新
 *
 * 验收标准：
 *   1. 各输出形状正确
 *   2. 各项损失非负且有限，KL 退火权重在 [0, 1] 内
 *   3. 一轮完整更新后参数仍为有限值，临时节点全部释放
 */

use cvae_gan::data::{Batch, Example, Vocabulary};
use cvae_gan::model::{CvaeGan, CvaeGanConfig, ForwardMode, GroupKind, TrainingOrchestrator};
use cvae_gan::nn::Graph;
use tracing_subscriber::EnvFilter;

const DIALOGUES: [(&str, &str, usize, &[usize]); 4] = [
    ("i need a cheap hotel", "the alpha hotel is cheap", 0, &[0, 1]),
    ("where is it", "it is in the north", 1, &[2]),
    ("book it for two nights please", "booked for two nights", 2, &[3, 4]),
    ("thanks", "you are welcome", 1, &[]),
];

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn build() -> (Graph, CvaeGan, Batch) {
    let vocab = Vocabulary::from_sentences(DIALOGUES.iter().flat_map(|(i, t, _, _)| [*i, *t]));
    let examples = DIALOGUES
        .iter()
        .map(|&(input, target, da, slots)| Example {
            input: input.to_string(),
            target: target.to_string(),
            condition: (0..6)
                .map(|j| if j == da || j == 3 + slots.len() % 3 { 1.0 } else { 0.0 })
                .collect(),
            dialogue_act: da,
            slot_values: slots.to_vec(),
        })
        .collect::<Vec<_>>();
    let batch = Batch::from_examples(&examples, &vocab, 3, 5).unwrap();

    let config = CvaeGanConfig {
        hidden_size: 12,
        vocab_size: 50,
        latent_size: 8,
        d_size: 6,
        da_size: 3,
        sv_size: 5,
        full_kl_step: 100,
        ..CvaeGanConfig::default()
    };
    let graph = Graph::new_with_seed(2024);
    let model = CvaeGan::new(&graph, config, vocab).unwrap();
    (graph, model, batch)
}

#[test]
fn test_forward_shapes() {
    init_logging();
    let (_graph, model, batch) = build();
    let output = model.forward(&batch, ForwardMode::TRAIN).unwrap();

    let logits = output.decoder.logits.shape().unwrap();
    assert_eq!(logits[0], 4);
    assert!(logits[1] <= 10);
    assert_eq!(logits[2], 50);
    assert_eq!(output.auxiliary.da_logits.shape().unwrap(), vec![4, 3]);
    assert_eq!(output.auxiliary.sv_logits.shape().unwrap(), vec![4, 5]);
    assert_eq!(output.posterior.mean.shape().unwrap(), vec![4, 8]);
    assert_eq!(output.prior.log_var.shape().unwrap(), vec![4, 8]);
    assert_eq!(output.d_fake.shape().unwrap(), vec![4, 1]);
}

#[test]
fn test_training_iteration() {
    init_logging();
    let (graph, model, batch) = build();
    let mut trainer = TrainingOrchestrator::new(model);

    for step in [0, 50, 200] {
        let mut iteration = trainer.begin(&batch, step).unwrap();
        let losses = iteration.loss_values().unwrap();
        for value in [losses.rc, losses.kl, losses.da, losses.sv, losses.total] {
            assert!(value.is_finite() && value >= 0.0);
        }
        assert!((0.0..=1.0).contains(&losses.kl_weight));
        assert!(iteration.d_loss().unwrap() >= 0.0);
        assert!(iteration.g_loss().unwrap() >= 0.0);

        iteration.update_core().unwrap();
        iteration.update_discriminator().unwrap();
        iteration.update_generator().unwrap();
        let report = iteration.finish().unwrap();
        assert_eq!(report.updates.len(), 3);
        assert_eq!(report.updates[1].kind, GroupKind::Discriminator);
    }

    assert_eq!(trainer.iterations(), 3);
    assert_eq!(graph.node_count(), graph.parameters().len());
    for param in graph.parameters() {
        assert!(param.value().unwrap().to_vec().iter().all(|x| x.is_finite()));
    }

    let generated = trainer.generate(&batch).unwrap();
    assert_eq!(generated.len(), 4);
}
