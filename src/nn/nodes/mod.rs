/*
 * @Description  : 计算图节点：NodeId、NodeHandle 以及各类原始节点（raw_node）
 */

pub(in crate::nn) mod raw_node;

mod node_handle;

pub(in crate::nn) use node_handle::NodeHandle;

use std::fmt;

/// 节点 ID（在同一张图内唯一，且单调递增）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(in crate::nn) u64);

impl NodeId {
    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
