/*
 * @Description  : 优化器模块，实现 PyTorch 风格的梯度优化算法与梯度裁剪
 */

mod clip;
mod core;

pub use clip::{clip_grad_norm, grad_norm};
pub use core::{Adam, Optimizer};
