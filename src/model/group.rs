/*
 * @Description  : 参数组：按子模块分段、绑定到一个优化器的参数集合
 *
 * Core 与 Generator 两组共享解码器和先验网络的参数。共享是按 NodeId 引用同一个参数节点，
 * 两个优化器都会更新这些权重。
 */

use std::collections::HashSet;
use std::fmt;

use tracing::warn;

use crate::nn::{GraphError, NodeId, Var, clip_grad_norm, grad_norm};

/// 裁剪前范数超过阈值这么多倍时打印警告
const HEAVY_CLIP_RATIO: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupKind {
    Core,
    Discriminator,
    Generator,
}

impl fmt::Display for GroupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Core => "Core",
            Self::Discriminator => "Discriminator",
            Self::Generator => "Generator",
        };
        write!(f, "{name}")
    }
}

/// 有序的（子模块名, 参数列表）集合
#[derive(Clone)]
pub struct ParameterGroup {
    kind: GroupKind,
    entries: Vec<(String, Vec<Var>)>,
}

impl fmt::Debug for ParameterGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = self.entries.iter().map(|(n, _)| n.as_str()).collect::<Vec<_>>();
        f.debug_struct("ParameterGroup")
            .field("kind", &self.kind)
            .field("entries", &names)
            .finish()
    }
}

impl ParameterGroup {
    pub const fn new(kind: GroupKind) -> Self {
        Self {
            kind,
            entries: Vec::new(),
        }
    }

    /// 追加一个子模块的参数
    pub fn with(mut self, name: &str, params: Vec<Var>) -> Self {
        self.entries.push((name.to_string(), params));
        self
    }

    pub const fn kind(&self) -> GroupKind {
        self.kind
    }

    pub fn entries(&self) -> &[(String, Vec<Var>)] {
        &self.entries
    }

    pub fn entry_names(&self) -> Vec<&str> {
        self.entries.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// 全部参数（按子模块顺序，去重）
    pub fn parameters(&self) -> Vec<Var> {
        let mut seen = HashSet::new();
        self.entries
            .iter()
            .flat_map(|(_, params)| params)
            .filter(|p| seen.insert(p.node_id()))
            .cloned()
            .collect()
    }

    pub fn node_ids(&self) -> HashSet<NodeId> {
        self.entries
            .iter()
            .flat_map(|(_, params)| params.iter().map(Var::node_id))
            .collect()
    }

    pub fn contains(&self, param: &Var) -> bool {
        self.entries
            .iter()
            .any(|(_, params)| params.iter().any(|p| p.node_id() == param.node_id()))
    }

    /// 整组梯度的 L2 范数
    pub fn grad_norm(&self) -> Result<f32, GraphError> {
        grad_norm(&self.parameters())
    }

    /// 对每个子模块分别做梯度裁剪，返回各子模块裁剪前的范数
    pub fn clip_each(&self, max_norm: f32) -> Result<Vec<(String, f32)>, GraphError> {
        let mut norms = Vec::with_capacity(self.entries.len());
        for (name, params) in &self.entries {
            let norm = clip_grad_norm(params, max_norm)?;
            if norm > max_norm * HEAVY_CLIP_RATIO {
                warn!(group = %self.kind, entry = %name, norm, max_norm, "梯度范数远超裁剪阈值");
            }
            norms.push((name.clone(), norm));
        }
        Ok(norms)
    }

    /// 清空本组全部参数的梯度
    pub fn zero_grad(&self) -> Result<(), GraphError> {
        let Some(first) = self.entries.iter().flat_map(|(_, p)| p).next() else {
            return Ok(());
        };
        let ids = self.node_ids().into_iter().collect::<Vec<_>>();
        first.get_graph().inner_mut().zero_grad_of(&ids)
    }
}
