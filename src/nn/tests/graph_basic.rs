use crate::assert_err;
use crate::nn::{Graph, GraphError, Init, VarActivationOps};
use crate::tensor::Tensor;

#[test]
fn test_graph_eager_value() {
    let graph = Graph::new_with_seed(0);

    // 1. 节点创建时值即已计算
    let x = graph.input(&Tensor::new(&[0.0, 1.0, -1.0, 2.0], &[2, 2])).unwrap();
    let y = x.tanh();
    let expected = [0.0, 1.0f32.tanh(), (-1.0f32).tanh(), 2.0f32.tanh()];
    assert_eq!(y.value().unwrap().to_vec(), expected.to_vec());
    assert_eq!(y.shape().unwrap(), vec![2, 2]);
}

#[test]
fn test_graph_node_naming() {
    let graph = Graph::new_with_seed(0);

    // 1. 显式命名
    let w = graph.parameter(&[2, 2], Init::Zeros, "w").unwrap();
    assert_eq!(w.name().unwrap(), "w");

    // 2. 自动命名：类型名小写 + id
    let t = w.tanh();
    assert_eq!(t.name().unwrap(), format!("tanh_{}", t.node_id().get()));

    // 3. 名称重复
    assert_err!(
        graph.parameter(&[1, 1], Init::Zeros, "w"),
        GraphError::DuplicateNodeName(name) if name == "w"
    );
}

#[test]
fn test_graph_set_value_only_on_leaf() {
    let graph = Graph::new_with_seed(0);
    let x = graph.input(&Tensor::zeros(&[2, 2])).unwrap();
    let y = x.sigmoid();

    // 1. 运算节点不能手动设置值
    assert_err!(
        y.set_value(&Tensor::zeros(&[2, 2])),
        GraphError::InvalidOperation(msg) if msg.contains("不能直接设置")
    );

    // 2. 叶子节点的新值形状必须一致
    assert_err!(
        x.set_value(&Tensor::zeros(&[3, 2])),
        GraphError::ShapeMismatch { .. }
    );
    x.set_value(&Tensor::ones(&[2, 2])).unwrap();
    assert_eq!(x.value().unwrap(), Tensor::ones(&[2, 2]));
}

#[test]
fn test_graph_release_transient() {
    let graph = Graph::new_with_seed(0);
    let w = graph.parameter(&[2, 3], Init::Xavier, "w").unwrap();
    let x = graph.input(&Tensor::ones(&[2, 3])).unwrap();
    let y = &x * &w;
    assert_eq!(graph.node_count(), 3);

    // 1. 释放后只剩参数节点
    graph.release_transient();
    assert_eq!(graph.node_count(), 1);
    assert!(w.value().is_ok());

    // 2. 已释放节点再使用会报错
    assert_err!(y.value(), GraphError::NodeNotFound(id) if *id == y.node_id());
    assert_err!(x.try_scale(2.0), GraphError::NodeNotFound(_));
}

#[test]
fn test_graph_seed_reproducible() {
    let a = Graph::new_with_seed(42);
    let b = Graph::new_with_seed(42);
    let wa = a.parameter(&[4, 4], Init::Xavier, "w").unwrap();
    let wb = b.parameter(&[4, 4], Init::Xavier, "w").unwrap();
    assert_eq!(wa.value().unwrap(), wb.value().unwrap());

    let na = a.normal(0.0, 1.0, &[3, 2]).unwrap();
    let nb = b.normal(0.0, 1.0, &[3, 2]).unwrap();
    assert_eq!(na.value().unwrap(), nb.value().unwrap());
}

#[test]
fn test_graph_parameters_in_creation_order() {
    let graph = Graph::new_with_seed(0);
    let a = graph.parameter(&[1, 1], Init::Zeros, "a").unwrap();
    let b = graph.parameter(&[1, 1], Init::Zeros, "b").unwrap();
    let ids = graph.parameters().iter().map(|p| p.node_id()).collect::<Vec<_>>();
    assert_eq!(ids, vec![a.node_id(), b.node_id()]);
}
