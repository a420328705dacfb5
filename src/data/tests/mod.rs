mod batch;

use crate::data::Example;

pub(super) fn example(input: &str, target: &str, da: usize, slots: &[usize]) -> Example {
    Example {
        input: input.to_string(),
        target: target.to_string(),
        condition: vec![da as f32, slots.len() as f32, 1.0],
        dialogue_act: da,
        slot_values: slots.to_vec(),
    }
}
