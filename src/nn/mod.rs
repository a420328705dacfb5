/*
 * @Description  : 负责神经网络（neural network）的构建：即时求值的计算图、层、优化器
 */

mod graph;
pub mod layer;
mod module;
mod nodes;
pub mod optimizer;
mod var;
mod var_ops;

pub use graph::{Graph, GraphError, GraphInner};
pub use layer::{Linear, Rnn};
pub use module::Module;
pub use nodes::NodeId;
pub use optimizer::{Adam, Optimizer, clip_grad_norm, grad_norm};
pub use var::{Init, Var};
pub use var_ops::{VarActivationOps, VarLossOps, VarMatrixOps, VarShapeOps};

#[cfg(test)]
mod tests;
