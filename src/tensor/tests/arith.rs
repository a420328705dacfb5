use super::assert_close;
use crate::errors::{Operator, TensorError};
use crate::tensor::Tensor;

#[test]
fn test_new_and_try_new() {
    let tensor = Tensor::new(&[1., 2., 3., 4., 5., 6.], &[2, 3]);
    assert_eq!(tensor.shape(), &[2, 3]);
    assert_eq!(tensor[[1, 2]], 6.);

    let err = Tensor::try_new(&[1., 2., 3.], &[2, 2]).unwrap_err();
    assert_eq!(
        err,
        TensorError::DataShapeMismatch {
            len: 3,
            shape: vec![2, 2]
        }
    );
}

#[test]
fn test_add_sub_with_broadcast() {
    let a = Tensor::new(&[1., 2., 3., 4., 5., 6.], &[2, 3]);
    let bias = Tensor::new(&[10., 20., 30.], &[1, 3]);
    assert_close(&(&a + &bias), &[11., 22., 33., 14., 25., 36.], 1e-6);

    let column = Tensor::new(&[1., 2.], &[2, 1]);
    assert_close(&(&a - &column), &[0., 1., 2., 2., 3., 4.], 1e-6);
}

#[test]
fn test_mul_div_scalar() {
    let a = Tensor::new(&[2., 4., 6.], &[1, 3]);
    assert_close(&(&a * 0.5), &[1., 2., 3.], 1e-6);
    assert_close(&(&a / 2.), &[1., 2., 3.], 1e-6);
    assert_close(&(2.0 * &a), &[4., 8., 12.], 1e-6);
    assert_close(&(-&a), &[-2., -4., -6.], 1e-6);
}

#[test]
fn test_zip_with_shape_mismatch() {
    let a = Tensor::zeros(&[2, 3]);
    let b = Tensor::zeros(&[3, 2]);
    let err = a.zip_with(&b, Operator::Mul, |x, y| x * y).unwrap_err();
    assert_eq!(
        err,
        TensorError::OperatorError {
            operator: Operator::Mul,
            tensor1_shape: vec![2, 3],
            tensor2_shape: vec![3, 2],
        }
    );
}

#[test]
#[should_panic]
fn test_add_incompatible_shapes_panics() {
    let _ = Tensor::zeros(&[2, 3]) + Tensor::zeros(&[4, 3]);
}

#[test]
fn test_reduce_to_shape() {
    let grad = Tensor::ones(&[4, 3]);
    let reduced = grad.reduce_to_shape(&[1, 3]).unwrap();
    assert_close(&reduced, &[4., 4., 4.], 1e-6);
    assert!(grad.reduce_to_shape(&[2, 3]).is_err());
}
