use approx::assert_abs_diff_eq;

use super::assert_tensor_close;
use crate::assert_err;
use crate::nn::{Adam, Graph, GraphError, Init, Optimizer, VarMatrixOps, clip_grad_norm, grad_norm};
use crate::tensor::Tensor;

#[test]
fn test_adam_learning_rate_modification() {
    let graph = Graph::new_with_seed(0);
    let w = graph.parameter(&[2, 2], Init::Zeros, "w").unwrap();
    let mut adam = Adam::new(&graph, &[w], 0.001);
    assert_eq!(adam.learning_rate(), 0.001);

    adam.set_learning_rate(0.0001);
    assert_eq!(adam.learning_rate(), 0.0001);
}

#[test]
fn test_adam_update() {
    // 初始值: w=2, loss = 3w => 梯度恒为3
    // Adam更新 (beta1=0.9, beta2=0.999, eps=1e-8, lr=0.1):
    //   m_1 = 0.3, v_1 = 0.009
    //   m_hat = 3.0, v_hat = 9.0
    //   w_1 = 2 - 0.1 * 3 / (3 + 1e-8) ≈ 1.9
    let graph = Graph::new_with_seed(0);
    let w = graph.parameter(&[1, 1], Init::Constant(2.0), "w").unwrap();
    let mut adam = Adam::new(&graph, &[w.clone()], 0.1);

    let loss = (&w * 3.0).sum_all().unwrap();
    let loss_val = adam.minimize(&loss).unwrap();
    assert_abs_diff_eq!(loss_val, 6.0, epsilon = 1e-6);
    assert_abs_diff_eq!(w.item().unwrap(), 1.9, epsilon = 1e-5);
    assert_eq!(adam.timestep(), 1);

    // 第二步：梯度不变时，m_hat / sqrt(v_hat) 仍为1，再走 lr
    graph.release_transient();
    let loss = (&w * 3.0).sum_all().unwrap();
    adam.minimize(&loss).unwrap();
    assert_abs_diff_eq!(w.item().unwrap(), 1.8, epsilon = 1e-5);
    assert!(adam.get_momentum(&w).is_some());
    assert!(adam.get_velocity(&w).is_some());
}

#[test]
fn test_adam_only_updates_bound_params() {
    let graph = Graph::new_with_seed(0);
    let a = graph.parameter(&[1, 2], Init::Constant(1.0), "a").unwrap();
    let b = graph.parameter(&[1, 2], Init::Constant(1.0), "b").unwrap();
    let mut adam = Adam::new(&graph, &[a.clone()], 0.1);

    let loss = (&a * &b).sum_all().unwrap();
    adam.minimize(&loss).unwrap();

    // a 被更新，b 保持不变且没有梯度
    assert_tensor_close(&a.value().unwrap(), &[0.9, 0.9], 1e-5);
    assert_tensor_close(&b.value().unwrap(), &[1.0, 1.0], 0.0);
    assert_eq!(b.grad().unwrap(), None);
}

#[test]
fn test_adam_skips_params_without_grad() {
    let graph = Graph::new_with_seed(0);
    let a = graph.parameter(&[1, 1], Init::Constant(1.0), "a").unwrap();
    let mut adam = Adam::new(&graph, &[a.clone()], 0.1);
    adam.step().unwrap();
    assert_abs_diff_eq!(a.item().unwrap(), 1.0);
    assert!(adam.get_momentum(&a).is_none());

    adam.reset();
    assert_eq!(adam.timestep(), 0);
}

#[test]
fn test_clip_grad_norm() {
    let graph = Graph::new_with_seed(0);
    let a = graph.parameter(&[1, 2], Init::Zeros, "a").unwrap();
    let b = graph.parameter(&[1, 1], Init::Zeros, "b").unwrap();
    let x = graph.input(&Tensor::new(&[3.0, 0.0], &[1, 2])).unwrap();
    let y = graph.input(&Tensor::new(&[4.0], &[1, 1])).unwrap();

    // 梯度：a -> [3, 0]，b -> [4]，整体范数为5
    let loss = (&a * &x).sum_all().unwrap().try_add(&(&b * &y).sum_all().unwrap()).unwrap();
    loss.backward().unwrap();
    let params = [a.clone(), b.clone()];
    assert_abs_diff_eq!(grad_norm(&params).unwrap(), 5.0, epsilon = 1e-6);

    // 1. 超过阈值：整体缩放，返回裁剪前的范数
    let before = clip_grad_norm(&params, 1.0).unwrap();
    assert_abs_diff_eq!(before, 5.0, epsilon = 1e-6);
    assert_abs_diff_eq!(grad_norm(&params).unwrap(), 1.0, epsilon = 1e-5);
    assert_tensor_close(&a.grad().unwrap().unwrap(), &[0.6, 0.0], 1e-5);

    // 2. 未超过阈值：不变
    let before = clip_grad_norm(&params, 10.0).unwrap();
    assert_abs_diff_eq!(before, 1.0, epsilon = 1e-5);
    assert_tensor_close(&b.grad().unwrap().unwrap(), &[0.8], 1e-5);

    // 3. 非法阈值
    assert_err!(clip_grad_norm(&params, 0.0), GraphError::InvalidOperation(_));
}

#[test]
fn test_clip_grad_norm_without_grads() {
    let graph = Graph::new_with_seed(0);
    let a = graph.parameter(&[2, 2], Init::Zeros, "a").unwrap();
    assert_abs_diff_eq!(clip_grad_norm(&[a.clone()], 1.0).unwrap(), 0.0);
    assert_eq!(a.grad().unwrap(), None);
}
