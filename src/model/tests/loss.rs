use approx::assert_abs_diff_eq;

use super::{tiny_config, tiny_model, tiny_vocab};
use crate::assert_err;
use crate::data::{Batch, Example};
use crate::model::{
    CvaeGan, CvaeGanConfig, DecoderKind, ForwardMode, LossComposer, ModelError,
    discriminator_loss, ensure_finite, generator_loss, kl_weight,
};
use crate::nn::{Graph, GraphError, VarLossOps};
use crate::tensor::Tensor;

#[test]
fn test_kl_weight_schedule() {
    assert_eq!(kl_weight(0, 100), 0.0);
    assert_abs_diff_eq!(kl_weight(25, 100), 0.25, epsilon = 1e-7);
    assert_abs_diff_eq!(kl_weight(99, 100), 0.99, epsilon = 1e-7);
    assert_eq!(kl_weight(100, 100), 1.0);
    assert_eq!(kl_weight(5000, 100), 1.0);
    // full_kl_step 为0时不做退火
    assert_eq!(kl_weight(0, 0), 1.0);

    // 单调不减
    let weights = (0..300).map(|step| kl_weight(step, 128)).collect::<Vec<_>>();
    assert!(weights.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn test_adversarial_losses() {
    let graph = Graph::new_with_seed(0);
    let half = graph.input(&Tensor::full(0.5, &[3, 1])).unwrap();
    let ln2 = std::f32::consts::LN_2;

    let d_loss = discriminator_loss(&half, &half).unwrap();
    assert_abs_diff_eq!(d_loss.item().unwrap(), 2.0 * ln2, epsilon = 1e-5);
    let g_loss = generator_loss(&half).unwrap();
    assert_abs_diff_eq!(g_loss.item().unwrap(), ln2, epsilon = 1e-5);

    // 判别器完全正确时损失接近0，生成器损失很大
    let real = graph.input(&Tensor::full(0.999, &[3, 1])).unwrap();
    let fake = graph.input(&Tensor::full(0.001, &[3, 1])).unwrap();
    assert!(discriminator_loss(&real, &fake).unwrap().item().unwrap() < 0.01);
    assert!(generator_loss(&fake).unwrap().item().unwrap() > 6.0);
}

#[test]
fn test_ensure_finite() {
    let graph = Graph::new_with_seed(0);
    let ok = graph.input(&Tensor::scalar(1.5)).unwrap();
    assert_eq!(ensure_finite("rc", &ok).unwrap(), 1.5);
    let nan = graph.input(&Tensor::scalar(f32::NAN)).unwrap();
    assert_err!(ensure_finite("rc", &nan), ModelError::NonFiniteLoss { name: "rc", .. });
    let inf = graph.input(&Tensor::scalar(f32::INFINITY)).unwrap();
    assert_err!(ensure_finite("kl", &inf), ModelError::NonFiniteLoss { name: "kl", .. });
}

#[test]
fn test_compose_core_losses() {
    let (_graph, model, batch) = tiny_model(11, tiny_config());
    let output = model.forward(&batch, ForwardMode::TRAIN).unwrap();

    let losses = LossComposer::new(10, DecoderKind::Sclstm).compose(&output, &batch, 4).unwrap();
    let values = losses.values().unwrap();
    assert!(values.rc >= 0.0 && values.kl >= 0.0 && values.da >= 0.0 && values.sv >= 0.0);
    assert_abs_diff_eq!(values.kl_weight, 0.4, epsilon = 1e-6);
    assert_abs_diff_eq!(
        values.total,
        values.rc + 0.4 * values.kl + values.da + values.sv,
        epsilon = 1e-4
    );

    // 超过 full_kl_step 后权重为1
    let losses = LossComposer::new(10, DecoderKind::Sclstm).compose(&output, &batch, 50).unwrap();
    assert_eq!(losses.kl_weight, 1.0);
}

#[test]
fn test_compose_plain_decoder_scores_input_sequence() {
    // 输入很短、目标很长：Plain 解码器的步数只等于输入长度
    let vocab = tiny_vocab();
    let examples = [("goodbye", "there is a cheap place", 0), ("bye", "bye", 2)].map(
        |(input, target, da)| Example {
            input: input.to_string(),
            target: target.to_string(),
            condition: vec![1.0, 0.0, 0.5],
            dialogue_act: da,
            slot_values: vec![],
        },
    );
    let batch = Batch::from_examples(&examples, &vocab, 3, 4).unwrap();
    assert_eq!(batch.target_lengths(), &[6, 2]);

    let config = CvaeGanConfig {
        dec_type: DecoderKind::Plain,
        ..tiny_config()
    };
    let graph = Graph::new_with_seed(12);
    let model = CvaeGan::new(&graph, config, vocab).unwrap();
    let output = model.forward(&batch, ForwardMode::TRAIN).unwrap();
    assert_eq!(output.decoder.logits.shape().unwrap()[1], 2);

    let losses = LossComposer::new(10, DecoderKind::Plain)
        .compose(&output, &batch, 0)
        .unwrap();
    let expected = output
        .decoder
        .logits
        .masked_cross_entropy(batch.input_ids(), batch.input_lengths())
        .unwrap()
        .item()
        .unwrap();
    assert_abs_diff_eq!(losses.values().unwrap().rc, expected, epsilon = 1e-6);

    // 以目标序列为准时长度超出 logits 步数，必须报错而不是只算前缀
    assert_err!(
        LossComposer::new(10, DecoderKind::Sclstm).compose(&output, &batch, 0),
        ModelError::Graph(GraphError::ShapeMismatch { .. })
    );
}
