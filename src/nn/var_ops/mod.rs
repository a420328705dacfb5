/*
 * @Description  : Var 扩展 trait 模块
 *
 * 按功能领域组织 Var 的扩展方法，用户按需 import。
 *
 * # 模块结构
 * - `activation`: 激活函数（tanh, sigmoid, exp, softmax, clamp）
 * - `loss`: 损失函数（bce, 交叉熵, 多标签软间隔, 按长度掩码的序列交叉熵）
 * - `matrix`: 矩阵运算与归约（matmul, sum）
 * - `shape`: 形状变换（concat, narrow, select, stack, index_select）
 *
 * # 使用示例
 * ```ignore
 * use cvae_gan::nn::{Var, VarActivationOps, VarLossOps, VarMatrixOps, VarShapeOps};
 *
 * let h = x.matmul(&w)?.tanh();
 * let loss = h.softmax_cross_entropy(&labels)?;
 * let (mu, logvar) = (h.narrow(1, 0, k)?, h.narrow(1, k, k)?);
 * ```
 */

mod activation;
mod loss;
mod matrix;
mod shape;

pub use activation::VarActivationOps;
pub use loss::VarLossOps;
pub use matrix::VarMatrixOps;
pub use shape::VarShapeOps;
