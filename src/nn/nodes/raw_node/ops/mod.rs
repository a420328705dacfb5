mod activation;
mod arith;
mod leaf;
mod mat_mul;
mod shape;
mod sum;

pub(in crate::nn) use activation::{Clamp, Exp, Sigmoid, Softmax, Tanh};
pub(in crate::nn) use arith::{Add, Divide, Multiply, ScalarMultiply, Subtract};
pub(in crate::nn) use leaf::{Input, Parameter};
pub(in crate::nn) use mat_mul::MatMul;
pub(in crate::nn) use shape::{Concat, IndexSelect, Narrow, Select, Stack};
pub(in crate::nn) use sum::Sum;
