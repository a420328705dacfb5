mod loss;

use crate::data::{Batch, Example, Vocabulary};
use crate::model::{CvaeGan, CvaeGanConfig};
use crate::nn::Graph;

const PAIRS: [(&str, &str, usize, &[usize]); 4] = [
    ("i want cheap food", "there is a cheap place", 0, &[0, 2]),
    ("phone number please", "the number is five", 1, &[1]),
    ("goodbye", "bye", 2, &[]),
    ("what area is it", "it is north", 1, &[3]),
];

pub(super) fn tiny_config() -> CvaeGanConfig {
    CvaeGanConfig {
        hidden_size: 6,
        vocab_size: 30,
        latent_size: 4,
        d_size: 3,
        da_size: 3,
        sv_size: 4,
        full_kl_step: 10,
        ..CvaeGanConfig::default()
    }
}

pub(super) fn tiny_vocab() -> Vocabulary {
    Vocabulary::from_sentences(PAIRS.iter().flat_map(|(i, t, _, _)| [*i, *t]))
}

pub(super) fn tiny_batch(vocab: &Vocabulary) -> Batch {
    let examples = PAIRS
        .iter()
        .map(|&(input, target, da, slots)| Example {
            input: input.to_string(),
            target: target.to_string(),
            condition: vec![da as f32 / 2.0, slots.len() as f32 / 2.0, 1.0],
            dialogue_act: da,
            slot_values: slots.to_vec(),
        })
        .collect::<Vec<_>>();
    Batch::from_examples(&examples, vocab, 3, 4).unwrap()
}

pub(super) fn tiny_model(seed: u64, config: CvaeGanConfig) -> (Graph, CvaeGan, Batch) {
    let graph = Graph::new_with_seed(seed);
    let vocab = tiny_vocab();
    let batch = tiny_batch(&vocab);
    let model = CvaeGan::new(&graph, config, vocab).unwrap();
    (graph, model, batch)
}
