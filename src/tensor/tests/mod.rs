mod arith;
mod shape;

use crate::tensor::Tensor;

/// 逐元素比较（允许`eps`误差）
fn assert_close(actual: &Tensor, expected: &[f32], eps: f32) {
    let data = actual.to_vec();
    assert_eq!(data.len(), expected.len(), "元素个数不一致");
    for (i, (a, e)) in data.iter().zip(expected).enumerate() {
        assert!((a - e).abs() < eps, "第{i}个元素：{a} != {e}");
    }
}
