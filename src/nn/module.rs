/*
 * @Description  : Module trait 定义
 */

use super::Var;

/// 模块 trait
///
/// # 设计原则
/// - `forward()` **不是** trait 方法（签名各异）
/// - `new()` **不是** trait 方法（参数各异）
/// - `parameters()` 返回 `Vec<Var>`（签名一致，放入 trait）
/// - 由于 Var 携带图引用，`forward()` 不需要 `&Graph` 参数
///
/// # 使用示例
///
/// ```ignore
/// struct Head {
///     hidden: Linear,
///     out: Linear,
/// }
///
/// impl Module for Head {
///     fn parameters(&self) -> Vec<Var> {
///         [self.hidden.parameters(), self.out.parameters()].concat()
///     }
/// }
/// ```
pub trait Module {
    /// 获取所有可训练参数
    ///
    /// 优化器据此知道要更新哪些参数，参数组也据此划分。
    fn parameters(&self) -> Vec<Var>;

    /// 获取参数张量个数
    fn num_params(&self) -> usize {
        self.parameters().len()
    }

    /// 获取标量参数总数
    fn num_scalars(&self) -> usize {
        self.parameters()
            .iter()
            .filter_map(|p| p.shape().ok())
            .map(|s| s.iter().product::<usize>())
            .sum()
    }
}
