use super::assert_close;
use crate::errors::TensorError;
use crate::tensor::Tensor;

#[test]
fn test_concat_and_stack() {
    let a = Tensor::new(&[1., 2., 3., 4.], &[2, 2]);
    let b = Tensor::new(&[5., 6.], &[2, 1]);
    let c = Tensor::concat(&[&a, &b], 1).unwrap();
    assert_eq!(c.shape(), &[2, 3]);
    assert_close(&c, &[1., 2., 5., 3., 4., 6.], 1e-6);

    let s = Tensor::stack(&[&a, &a, &a], 1).unwrap();
    assert_eq!(s.shape(), &[2, 3, 2]);
    assert_eq!(s[[1, 2, 0]], 3.);

    assert_eq!(Tensor::concat(&[], 0).unwrap_err(), TensorError::EmptyList);
    assert!(Tensor::stack(&[&a, &b], 0).is_err());
}

#[test]
fn test_narrow_and_select() {
    let a = Tensor::new(&[1., 2., 3., 4., 5., 6.], &[2, 3]);
    assert_close(&a.narrow(1, 1, 2).unwrap(), &[2., 3., 5., 6.], 1e-6);
    assert_close(&a.select(0, 1).unwrap(), &[4., 5., 6.], 1e-6);
    assert_eq!(a.select(1, 0).unwrap().shape(), &[2]);

    assert_eq!(
        a.narrow(1, 2, 2).unwrap_err(),
        TensorError::RangeOutOfBounds {
            axis: 1,
            start: 2,
            end: 4,
            len: 3
        }
    );
    assert_eq!(
        a.select(2, 0).unwrap_err(),
        TensorError::AxisOutOfRange { axis: 2, ndim: 2 }
    );
}

#[test]
fn test_index_select_and_scatter_add() {
    let a = Tensor::new(&[1., 2., 3., 4., 5., 6.], &[3, 2]);
    let picked = a.index_select(0, &[2, 0, 2]).unwrap();
    assert_close(&picked, &[5., 6., 1., 2., 5., 6.], 1e-6);
    assert!(a.index_select(0, &[3]).is_err());

    // 重复索引的梯度会累加
    let back = Tensor::scatter_add(&Tensor::ones(&[3, 2]), &[3, 2], 0, &[2, 0, 2]).unwrap();
    assert_close(&back, &[1., 1., 0., 0., 2., 2.], 1e-6);
}

#[test]
fn test_embed_narrow_and_select() {
    let part = Tensor::new(&[7., 8.], &[2, 1]);
    let full = Tensor::embed_narrow(&part, &[2, 3], 1, 2).unwrap();
    assert_close(&full, &[0., 0., 7., 0., 0., 8.], 1e-6);

    let row = Tensor::new(&[1., 1., 1.], &[3]);
    let full = Tensor::embed_select(&row, &[2, 3], 0, 1).unwrap();
    assert_close(&full, &[0., 0., 0., 1., 1., 1.], 1e-6);
}
