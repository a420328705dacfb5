mod graph_backward;
mod graph_basic;
mod layer_rnn;
mod node_activation;
mod node_shape;
mod optimizer;

use crate::nn::{Graph, GraphError, Init, Var};
use crate::tensor::Tensor;

/// 逐元素比较张量与期望值
pub(super) fn assert_tensor_close(actual: &Tensor, expected: &[f32], eps: f32) {
    let actual = actual.to_vec();
    assert_eq!(actual.len(), expected.len(), "元素个数不一致");
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert!(
            (a - e).abs() <= eps,
            "第{i}个元素不一致：实际{a}，期望{e}（容差{eps}）"
        );
    }
}

/// 有限差分梯度检验
///
/// 以`value`初始化一个参数 p，比较`build(p)`得到的标量损失对 p 的解析梯度与中心差分梯度。
pub(super) fn check_gradient<F>(value: &Tensor, build: F, tolerance: f32)
where
    F: Fn(&Graph, &Var) -> Result<Var, GraphError>,
{
    let graph = Graph::new_with_seed(0);
    let param = graph
        .parameter(value.shape(), Init::Zeros, "p")
        .unwrap();
    param.set_value(value).unwrap();

    let loss = build(&graph, &param).unwrap();
    loss.backward_for(&[param.clone()]).unwrap();
    let analytic = param.grad().unwrap().unwrap();
    graph.release_transient();

    let h = 1e-2;
    let base = value.to_vec();
    let mut numeric = Vec::with_capacity(base.len());
    for i in 0..base.len() {
        let mut plus = base.clone();
        plus[i] += h;
        param.set_value(&Tensor::new(&plus, value.shape())).unwrap();
        let f_plus = build(&graph, &param).unwrap().item().unwrap();

        let mut minus = base.clone();
        minus[i] -= h;
        param.set_value(&Tensor::new(&minus, value.shape())).unwrap();
        let f_minus = build(&graph, &param).unwrap().item().unwrap();

        graph.release_transient();
        numeric.push((f_plus - f_minus) / (2.0 * h));
    }
    param.set_value(value).unwrap();

    assert_tensor_close(&analytic, &numeric, tolerance);
}
