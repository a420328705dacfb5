/*
 * @Description  : GraphInner 计算图的底层实现
 *
 * 图是“即时求值”的：节点在创建时就根据父节点的值算出自己的值。
 * 参数节点在整个训练过程中常驻，其余节点都是临时的，由`release_transient`统一释放。
 *
 * 各 impl 块分散在子模块中：
 * - core.rs: 基础访问、节点登记、参数快照、临时节点释放
 * - backward.rs: 限定目标参数的 VJP 反向传播
 * - node_builders.rs: new_*_node
 */

mod backward;
mod core;
mod node_builders;

use crate::nn::NodeId;
use crate::nn::nodes::NodeHandle;
use crate::tensor::Tensor;
use rand::rngs::StdRng;
use std::collections::HashMap;

/// 图的完整定义（核心实现）
///
/// 用户通常通过 `Graph` 句柄使用此结构，需要时可通过 `graph.inner()` 访问底层操作。
pub struct GraphInner {
    pub(in crate::nn::graph) nodes: HashMap<NodeId, NodeHandle>,
    /// 反向边：child_id -> parent_ids（顺序即`calc_value`收到的父节点顺序）
    pub(in crate::nn::graph) backward_edges: HashMap<NodeId, Vec<NodeId>>,
    /// 所有参数节点，按创建顺序
    pub(in crate::nn::graph) parameter_ids: Vec<NodeId>,
    /// 显式命名节点：name -> id
    pub(in crate::nn::graph) named_nodes: HashMap<String, NodeId>,
    pub(in crate::nn::graph) next_id: u64,
    /// 图级别的随机数生成器（参数初始化、重参数化采样、解码采样）
    pub(in crate::nn::graph) rng: StdRng,
    /// 参数值快照：存在时，反向传播读取快照中的参数值而非当前值
    pub(in crate::nn::graph) frozen_parameters: Option<HashMap<NodeId, Tensor>>,
    /// 已完成的反向传播次数
    pub(in crate::nn::graph) backward_pass_count: u64,
}

impl Default for GraphInner {
    fn default() -> Self {
        Self::new()
    }
}
