use super::{assert_tensor_close, check_gradient};
use crate::assert_err;
use crate::nn::{Graph, GraphError, VarActivationOps, VarMatrixOps};
use crate::tensor::Tensor;

fn sample() -> Tensor {
    Tensor::new(&[0.3, -1.2, 2.0, 0.0, -0.4, 1.1], &[2, 3])
}

#[test]
fn test_node_tanh_gradient() {
    check_gradient(&sample(), |_, p| p.tanh().sum_all(), 1e-2);
}

#[test]
fn test_node_sigmoid_gradient() {
    check_gradient(&sample(), |_, p| p.sigmoid().sum_all(), 1e-2);
}

#[test]
fn test_node_exp_gradient() {
    check_gradient(&sample(), |_, p| (&p.exp() * 0.1).sum_all(), 1e-2);
}

#[test]
fn test_node_softmax_value_and_gradient() {
    let graph = Graph::new_with_seed(0);
    let x = graph.input(&Tensor::new(&[1.0, 2.0, 3.0, 0.0, 0.0, 0.0], &[2, 3])).unwrap();
    let y = x.softmax().value().unwrap();

    // 1. 每行和为1，第二行均匀分布
    let row_sums = y.sum_axis_keepdims(1).unwrap();
    assert_tensor_close(&row_sums, &[1.0, 1.0], 1e-6);
    assert_tensor_close(&y.select(0, 1).unwrap(), &[1.0 / 3.0; 3], 1e-6);

    // 2. 梯度：用加权和避免恒等于常数的损失
    let weights = Tensor::new(&[0.5, -1.0, 2.0, 1.5, 0.2, -0.7], &[2, 3]);
    check_gradient(
        &sample(),
        move |g, p| {
            let w = g.input(&weights)?;
            p.softmax().try_mul(&w)?.sum_all()
        },
        1e-2,
    );
}

#[test]
fn test_node_clamp() {
    let graph = Graph::new_with_seed(0);
    let x = graph.input(&Tensor::new(&[-5.0, 0.5, 5.0], &[1, 3])).unwrap();

    // 1. 前向截断
    let y = x.clamp(-1.0, 1.0).unwrap();
    assert_tensor_close(&y.value().unwrap(), &[-1.0, 0.5, 1.0], 1e-6);

    // 2. 区间外梯度为0
    check_gradient(
        &Tensor::new(&[-5.0, 0.5, 5.0], &[1, 3]),
        |_, p| p.clamp(-1.0, 1.0)?.sum_all(),
        1e-3,
    );

    // 3. 无效区间
    assert_err!(x.clamp(1.0, -1.0), GraphError::InvalidOperation(_));
}
