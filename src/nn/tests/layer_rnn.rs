use super::check_gradient;
use crate::nn::{Graph, Module, Rnn, VarMatrixOps};
use crate::tensor::Tensor;

#[test]
fn test_rnn_step_shape_and_range() {
    let graph = Graph::new_with_seed(3);
    let cell = Rnn::new(&graph, 4, 6, "cell").unwrap();
    assert_eq!(cell.parameters().len(), 3);
    assert_eq!((cell.input_size(), cell.hidden_size()), (4, 6));

    let x = graph.normal(0.0, 1.0, &[2, 4]).unwrap();
    let mut h = graph.zeros(&[2, 6]).unwrap();
    for _ in 0..3 {
        h = cell.step(&x, &h).unwrap();
    }
    let value = h.value().unwrap();
    assert_eq!(value.shape(), &[2, 6]);
    assert!(value.to_vec().iter().all(|v| v.abs() < 1.0));
}

#[test]
fn test_rnn_gradient_through_time() {
    // 对输入做梯度检验：展开3步后的隐藏状态之和
    check_gradient(
        &Tensor::new(&[0.2, -0.4, 0.6, 0.1, 0.3, -0.5], &[2, 3]),
        |g, p| {
            let cell = Rnn::new(g, 3, 2, &format!("cell_{}", g.node_count()))?;
            // 每次构建都使用相同的确定性权重
            for (k, param) in cell.parameters().iter().enumerate() {
                let shape = param.shape()?;
                let n = shape.iter().product::<usize>();
                let data = (0..n)
                    .map(|i| ((i + k * 5) as f32 * 0.61).sin() * 0.5)
                    .collect::<Vec<_>>();
                param.set_value(&Tensor::new(&data, &shape))?;
            }
            let mut h = g.zeros(&[2, 2])?;
            for _ in 0..3 {
                h = cell.step(p, &h)?;
            }
            h.sum_all()
        },
        1e-2,
    );
}
