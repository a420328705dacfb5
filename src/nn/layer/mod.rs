/*
 * @Description  : Layer 模块 - 组合节点构建常见网络结构
 *
 * Layer 不是新的抽象层，只是持有参数的语法糖。
 */

mod linear;
mod rnn;

pub use linear::Linear;
pub use rnn::Rnn;
