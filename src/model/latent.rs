/*
 * @Description  : 潜变量部分：识别网络（后验）、先验网络、重参数化采样
 */

use crate::nn::{
    Graph, GraphError, Linear, Module, Var, VarActivationOps, VarShapeOps,
};

/// 对角高斯分布的参数，均为 [batch, latent_size]
#[derive(Debug, Clone)]
pub struct LatentDistribution {
    pub mean: Var,
    pub log_var: Var,
}

impl LatentDistribution {
    /// 把 [batch, 2·latent] 的输出沿特征维对半切分为（均值, log 方差）
    fn split(stats: &Var, latent_size: usize, clamp: Option<(f32, f32)>) -> Result<Self, GraphError> {
        let mean = stats.narrow(1, 0, latent_size)?;
        let log_var = stats.narrow(1, latent_size, latent_size)?;
        let log_var = match clamp {
            Some((min, max)) => log_var.clamp(min, max)?,
            None => log_var,
        };
        Ok(Self { mean, log_var })
    }
}

fn check_width(x: &Var, width: usize, what: &str) -> Result<usize, GraphError> {
    let shape = x.shape()?;
    if shape.len() != 2 || shape[1] != width {
        return Err(GraphError::ShapeMismatch {
            expected: vec![shape.first().copied().unwrap_or(0), width],
            got: shape,
            message: format!("{what}的形状应为 [batch, {width}]"),
        });
    }
    Ok(shape[0])
}

// ==================== 识别网络 ====================

/// 识别网络：concat(编码器表示, 条件向量) → Linear → (μ_q, logσ²_q)
#[derive(Debug)]
pub struct LatentEncoder {
    recog: Linear,
    repr_size: usize,
    cond_size: usize,
    latent_size: usize,
    logvar_clamp: Option<(f32, f32)>,
}

impl LatentEncoder {
    pub fn new(
        graph: &Graph,
        repr_size: usize,
        cond_size: usize,
        latent_size: usize,
        logvar_clamp: Option<(f32, f32)>,
    ) -> Result<Self, GraphError> {
        Ok(Self {
            recog: Linear::new(graph, repr_size + cond_size, 2 * latent_size, true, "recog")?,
            repr_size,
            cond_size,
            latent_size,
            logvar_clamp,
        })
    }

    /// 计算后验分布
    pub fn forward(&self, repr: &Var, cond: &Var) -> Result<LatentDistribution, GraphError> {
        let batch = check_width(repr, self.repr_size, "编码器表示")?;
        let cond_batch = check_width(cond, self.cond_size, "条件向量")?;
        if batch != cond_batch {
            return Err(GraphError::ShapeMismatch {
                expected: vec![batch, self.cond_size],
                got: vec![cond_batch, self.cond_size],
                message: "编码器表示与条件向量的批大小不一致".to_string(),
            });
        }
        let stats = self.recog.forward(&Var::concat(&[repr, cond], 1)?)?;
        LatentDistribution::split(&stats, self.latent_size, self.logvar_clamp)
    }

    pub const fn recog(&self) -> &Linear {
        &self.recog
    }
}

impl Module for LatentEncoder {
    fn parameters(&self) -> Vec<Var> {
        self.recog.parameters()
    }
}

// ==================== 先验网络 ====================

/// 先验网络：条件向量 → Linear → tanh → Linear → (μ_p, logσ²_p)
///
/// 中间层维度为 2·latent_size。推断时只有条件向量，两层结构让先验有足够的表达力去逼近后验。
#[derive(Debug)]
pub struct PriorNetwork {
    fc: Linear,
    prior: Linear,
    cond_size: usize,
    latent_size: usize,
    logvar_clamp: Option<(f32, f32)>,
}

impl PriorNetwork {
    pub fn new(
        graph: &Graph,
        cond_size: usize,
        latent_size: usize,
        logvar_clamp: Option<(f32, f32)>,
    ) -> Result<Self, GraphError> {
        Ok(Self {
            fc: Linear::new(graph, cond_size, 2 * latent_size, true, "fc")?,
            prior: Linear::new(graph, 2 * latent_size, 2 * latent_size, true, "prior")?,
            cond_size,
            latent_size,
            logvar_clamp,
        })
    }

    /// 计算先验分布
    pub fn forward(&self, cond: &Var) -> Result<LatentDistribution, GraphError> {
        check_width(cond, self.cond_size, "条件向量")?;
        let hidden = self.fc.forward(cond)?.tanh();
        let stats = self.prior.forward(&hidden)?;
        LatentDistribution::split(&stats, self.latent_size, self.logvar_clamp)
    }

    pub const fn fc(&self) -> &Linear {
        &self.fc
    }

    pub const fn prior(&self) -> &Linear {
        &self.prior
    }
}

impl Module for PriorNetwork {
    fn parameters(&self) -> Vec<Var> {
        [self.fc.parameters(), self.prior.parameters()].concat()
    }
}

// ==================== 采样 ====================

/// 重参数化采样：z = μ + std_scale · ε · exp(0.5 · logσ²)，ε ~ N(0, 1)
///
/// ε 从图的 RNG 逐元素独立抽取，带种子的图可以复现采样结果。
pub fn sample_gaussian(mean: &Var, log_var: &Var, std_scale: f32) -> Result<Var, GraphError> {
    let shape = mean.shape()?;
    let log_var_shape = log_var.shape()?;
    if shape != log_var_shape {
        return Err(GraphError::ShapeMismatch {
            expected: shape,
            got: log_var_shape,
            message: "均值与 log 方差的形状须一致".to_string(),
        });
    }
    let epsilon = mean.get_graph().normal(0.0, 1.0, &shape)?;
    let std = log_var.try_scale(0.5)?.exp();
    mean.try_add(&epsilon.try_mul(&std)?.try_scale(std_scale)?)
}

/// 在先验与后验之间切换的采样器
///
/// 两个分布都由调用方先算好，`use_prior`只决定从哪一个采样。
#[derive(Debug, Clone, Copy)]
pub struct LatentSampler {
    std_scale: f32,
}

impl LatentSampler {
    pub const fn new(std_scale: f32) -> Self {
        Self { std_scale }
    }

    pub const fn std_scale(&self) -> f32 {
        self.std_scale
    }

    pub fn sample(
        &self,
        posterior: &LatentDistribution,
        prior: &LatentDistribution,
        use_prior: bool,
    ) -> Result<Var, GraphError> {
        let source = if use_prior { prior } else { posterior };
        sample_gaussian(&source.mean, &source.log_var, self.std_scale)
    }
}
