/*
 * @Description  : 辅助预测头与判别器
 */

use crate::nn::{Graph, GraphError, Linear, Module, Var, VarActivationOps};

/// 辅助预测头的输出
#[derive(Debug, Clone)]
pub struct AuxiliaryOutput {
    /// 对话行为 logits [batch, da_size]
    pub da_logits: Var,
    /// 槽值 logits [batch, sv_size]
    pub sv_logits: Var,
}

/// 从潜变量预测对话行为与槽值的两个独立线性头
#[derive(Debug)]
pub struct AuxiliaryPredictors {
    pred_da: Linear,
    pred_sv: Linear,
}

impl AuxiliaryPredictors {
    pub fn new(
        graph: &Graph,
        latent_size: usize,
        da_size: usize,
        sv_size: usize,
    ) -> Result<Self, GraphError> {
        Ok(Self {
            pred_da: Linear::new(graph, latent_size, da_size, true, "pred_da")?,
            pred_sv: Linear::new(graph, latent_size, sv_size, true, "pred_sv")?,
        })
    }

    pub fn forward(&self, z: &Var) -> Result<AuxiliaryOutput, GraphError> {
        Ok(AuxiliaryOutput {
            da_logits: self.pred_da.forward(z)?,
            sv_logits: self.pred_sv.forward(z)?,
        })
    }

    pub const fn pred_da(&self) -> &Linear {
        &self.pred_da
    }

    pub const fn pred_sv(&self) -> &Linear {
        &self.pred_sv
    }
}

impl Module for AuxiliaryPredictors {
    fn parameters(&self) -> Vec<Var> {
        [self.pred_da.parameters(), self.pred_sv.parameters()].concat()
    }
}

/// 判别器：编码器表示 → Linear → sigmoid，输出“是真实输入”的概率 [batch, 1]
#[derive(Debug)]
pub struct Discriminator {
    d1: Linear,
}

impl Discriminator {
    pub fn new(graph: &Graph, repr_size: usize) -> Result<Self, GraphError> {
        Ok(Self {
            d1: Linear::new(graph, repr_size, 1, true, "D1")?,
        })
    }

    pub fn forward(&self, repr: &Var) -> Result<Var, GraphError> {
        Ok(self.d1.forward(repr)?.sigmoid())
    }
}

impl Module for Discriminator {
    fn parameters(&self) -> Vec<Var> {
        self.d1.parameters()
    }
}
