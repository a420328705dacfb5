use approx::assert_abs_diff_eq;

use super::assert_tensor_close;
use crate::assert_err;
use crate::nn::{Graph, GraphError, Init, VarMatrixOps};
use crate::tensor::Tensor;

#[test]
fn test_backward_linear() {
    let graph = Graph::new_with_seed(0);

    // 1. y = sum(x @ w + b)
    let x = graph.input(&Tensor::new(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3])).unwrap();
    let w = graph.parameter(&[3, 1], Init::Zeros, "w").unwrap();
    let b = graph.parameter(&[1, 1], Init::Zeros, "b").unwrap();
    w.set_value(&Tensor::new(&[0.1, 0.2, 0.3], &[3, 1])).unwrap();
    b.set_value(&Tensor::new(&[0.5], &[1, 1])).unwrap();
    let y = x.matmul(&w).unwrap().try_add(&b).unwrap().sum_all().unwrap();

    // 2. 反向传播返回损失值：(1.4 + 0.5) + (3.2 + 0.5) = 5.6
    let loss = y.backward().unwrap();
    assert_abs_diff_eq!(loss, 5.6, epsilon = 1e-5);

    // 3. dy/dw = xᵀ @ 1 = 列和；dy/db = batch（广播后归约）
    assert_tensor_close(&w.grad().unwrap().unwrap(), &[5.0, 7.0, 9.0], 1e-6);
    assert_tensor_close(&b.grad().unwrap().unwrap(), &[2.0], 1e-6);

    // 4. 输入节点没有梯度
    assert_eq!(x.grad().unwrap(), None);
}

#[test]
fn test_backward_for_restricts_targets() {
    let graph = Graph::new_with_seed(0);
    let a = graph.parameter(&[1, 2], Init::Constant(2.0), "a").unwrap();
    let b = graph.parameter(&[1, 2], Init::Constant(3.0), "b").unwrap();
    let loss = (&a * &b).sum_all().unwrap();

    // 1. 只对 a 求梯度，b 保持无梯度
    loss.backward_for(&[a.clone()]).unwrap();
    assert_tensor_close(&a.grad().unwrap().unwrap(), &[3.0, 3.0], 1e-6);
    assert_eq!(b.grad().unwrap(), None);

    // 2. 再次反向传播会累加
    loss.backward_for(&[a.clone()]).unwrap();
    assert_tensor_close(&a.grad().unwrap().unwrap(), &[6.0, 6.0], 1e-6);

    // 3. 清零
    graph.zero_grad();
    assert_eq!(a.grad().unwrap(), None);
}

#[test]
fn test_backward_unrelated_target_untouched() {
    let graph = Graph::new_with_seed(0);
    let a = graph.parameter(&[1, 1], Init::Constant(1.0), "a").unwrap();
    let unrelated = graph.parameter(&[1, 1], Init::Constant(1.0), "unrelated").unwrap();
    let loss = (&a * 3.0).sum_all().unwrap();

    loss.backward_for(&[a.clone(), unrelated.clone()]).unwrap();
    assert_tensor_close(&a.grad().unwrap().unwrap(), &[3.0], 1e-6);
    assert_eq!(unrelated.grad().unwrap(), None);
}

#[test]
fn test_backward_diamond_accumulates() {
    let graph = Graph::new_with_seed(0);
    let a = graph.parameter(&[1, 3], Init::Zeros, "a").unwrap();
    a.set_value(&Tensor::new(&[1.0, -2.0, 0.5], &[1, 3])).unwrap();

    // y = sum(a * a + a)，dy/da = 2a + 1
    let loss = (&(&a * &a) + &a).sum_all().unwrap();
    loss.backward().unwrap();
    assert_tensor_close(&a.grad().unwrap().unwrap(), &[3.0, -3.0, 2.0], 1e-6);
}

#[test]
fn test_backward_uses_frozen_parameters() {
    let graph = Graph::new_with_seed(0);
    let w = graph.parameter(&[1, 2], Init::Zeros, "w").unwrap();
    w.set_value(&Tensor::new(&[1.0, 2.0], &[1, 2])).unwrap();

    // 1. 冻结后构建损失，再修改参数值
    graph.freeze_parameters();
    let loss = (&w * &w).sum_all().unwrap();
    w.set_value(&Tensor::new(&[10.0, 20.0], &[1, 2])).unwrap();

    // 2. 梯度按前向时刻的参数值计算：2 * [1, 2]
    loss.backward_for(&[w.clone()]).unwrap();
    assert_tensor_close(&w.grad().unwrap().unwrap(), &[2.0, 4.0], 1e-6);

    // 3. release_transient 清除快照
    graph.release_transient();
    assert!(!graph.inner().has_frozen_parameters());
}

#[test]
fn test_backward_requires_scalar_loss() {
    let graph = Graph::new_with_seed(0);
    let w = graph.parameter(&[2, 2], Init::Zeros, "w").unwrap();
    let y = &w * 2.0;
    assert_err!(y.backward(), GraphError::InvalidOperation(msg) if msg.contains("标量"));
}

#[test]
fn test_backward_target_must_be_parameter() {
    let graph = Graph::new_with_seed(0);
    let x = graph.input(&Tensor::ones(&[1, 1])).unwrap();
    let loss = (&x * 2.0).sum_all().unwrap();
    assert_err!(
        loss.backward_for(&[x.clone()]),
        GraphError::InvalidOperation(msg) if msg.contains("不是参数节点")
    );
}
