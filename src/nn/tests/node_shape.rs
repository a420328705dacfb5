use super::{assert_tensor_close, check_gradient};
use crate::assert_err;
use crate::nn::{Graph, GraphError, Var, VarActivationOps, VarMatrixOps, VarShapeOps};
use crate::tensor::Tensor;

fn weights(shape: &[usize]) -> Tensor {
    let n = shape.iter().product::<usize>();
    let data = (0..n).map(|i| (i as f32 * 0.37).sin()).collect::<Vec<_>>();
    Tensor::new(&data, shape)
}

#[test]
fn test_node_concat_and_narrow() {
    let graph = Graph::new_with_seed(0);
    let a = graph.input(&Tensor::new(&[1.0, 2.0, 3.0, 4.0], &[2, 2])).unwrap();
    let b = graph.input(&Tensor::new(&[5.0, 6.0], &[2, 1])).unwrap();

    // 1. 沿第1维拼接
    let c = Var::concat(&[&a, &b], 1).unwrap();
    assert_eq!(c.shape().unwrap(), vec![2, 3]);
    assert_tensor_close(&c.value().unwrap(), &[1.0, 2.0, 5.0, 3.0, 4.0, 6.0], 1e-6);

    // 2. 截取回来
    let back = c.narrow(1, 2, 1).unwrap();
    assert_tensor_close(&back.value().unwrap(), &[5.0, 6.0], 1e-6);

    // 3. 越界
    assert_err!(c.narrow(1, 2, 2), GraphError::Tensor(_));
}

#[test]
fn test_node_concat_gradient() {
    let w = weights(&[2, 3]);
    check_gradient(
        &Tensor::new(&[0.2, -0.3, 0.4, 0.1], &[2, 2]),
        move |g, p| {
            let other = g.input(&Tensor::new(&[1.0, -1.0], &[2, 1]))?;
            let c = Var::concat(&[p, &other], 1)?.tanh();
            c.try_mul(&g.input(&w)?)?.sum_all()
        },
        1e-2,
    );
}

#[test]
fn test_node_narrow_select_gradient() {
    let value = Tensor::new(&[0.5, -0.2, 0.8, 1.0, -1.5, 0.3], &[2, 3]);
    check_gradient(
        &value,
        |_, p| {
            let left = p.narrow(1, 0, 2)?.tanh().sum_all()?;
            let row = p.select(0, 1)?;
            let right = row.sigmoid().sum_all()?;
            left.try_add(&right)
        },
        1e-2,
    );
}

#[test]
fn test_node_stack_and_select() {
    let graph = Graph::new_with_seed(0);
    let a = graph.input(&Tensor::new(&[1.0, 2.0], &[1, 2])).unwrap();
    let b = graph.input(&Tensor::new(&[3.0, 4.0], &[1, 2])).unwrap();

    // 1. 沿新的第1维堆叠：[1, 2] x 2 -> [1, 2, 2]
    let s = Var::stack(&[&a, &b], 1).unwrap();
    assert_eq!(s.shape().unwrap(), vec![1, 2, 2]);
    assert_tensor_close(&s.select(1, 1).unwrap().value().unwrap(), &[3.0, 4.0], 1e-6);

    // 2. 形状不同无法堆叠
    let c = graph.input(&Tensor::zeros(&[2, 2])).unwrap();
    assert_err!(Var::stack(&[&a, &c], 0), GraphError::Tensor(_));
}

#[test]
fn test_node_stack_gradient() {
    let w = weights(&[2, 2, 3]);
    check_gradient(
        &Tensor::new(&[0.1, 0.2, 0.3, -0.1, -0.2, -0.3], &[2, 3]),
        move |g, p| {
            let other = p.tanh();
            let s = Var::stack(&[p, &other], 1)?;
            s.try_mul(&g.input(&w)?)?.sum_all()
        },
        1e-2,
    );
}

#[test]
fn test_node_index_select() {
    let graph = Graph::new_with_seed(0);
    let x = graph
        .input(&Tensor::new(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[3, 2]))
        .unwrap();

    // 1. 重排并允许重复
    let y = x.index_select(0, &[2, 0, 2]).unwrap();
    assert_tensor_close(&y.value().unwrap(), &[5.0, 6.0, 1.0, 2.0, 5.0, 6.0], 1e-6);

    // 2. 越界
    assert_err!(x.index_select(0, &[3]), GraphError::Tensor(_));

    // 3. 梯度按下标累加回原位置
    let w = weights(&[3, 2]);
    check_gradient(
        &Tensor::new(&[0.1, 0.2, 0.3, 0.4, 0.5, 0.6], &[3, 2]),
        move |g, p| {
            let y = p.index_select(0, &[2, 0, 2])?;
            y.try_mul(&g.input(&w)?)?.sum_all()
        },
        1e-2,
    );
}

#[test]
fn test_node_sum_axis() {
    let graph = Graph::new_with_seed(0);
    let x = graph
        .input(&Tensor::new(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]))
        .unwrap();
    let rows = x.sum_axis(1).unwrap();
    assert_eq!(rows.shape().unwrap(), vec![2, 1]);
    assert_tensor_close(&rows.value().unwrap(), &[6.0, 15.0], 1e-6);

    let w = weights(&[1, 3]);
    check_gradient(
        &Tensor::new(&[0.1, 0.2, 0.3, 0.4, 0.5, 0.6], &[2, 3]),
        move |g, p| {
            let cols = p.tanh().sum_axis(0)?;
            cols.try_mul(&g.input(&w)?)?.sum_all()
        },
        1e-2,
    );
}
