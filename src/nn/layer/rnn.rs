/*
 * @Description  : Rnn 单元（循环神经网络单步）
 *
 * 公式: h_t = tanh(x_t @ W_ih + h_{t-1} @ W_hh + b_h)
 *
 * - input: [batch, input_size]
 * - hidden: [batch, hidden_size]
 * - W_ih: [input_size, hidden_size]
 * - W_hh: [hidden_size, hidden_size]
 * - b_h: [1, hidden_size]
 */

use crate::nn::{Graph, GraphError, Init, Module, Var, VarActivationOps, VarMatrixOps};

/// Rnn 单元
///
/// 不持有隐藏状态：调用方逐时间步传入上一步的隐藏状态，
/// 在即时求值的图上展开即得到完整的时间序列计算。
///
/// # 使用示例
/// ```ignore
/// let cell = Rnn::new(&graph, 10, 20, "enc_fwd")?;
/// let mut h = graph.zeros(&[batch, 20])?;
/// for x_t in &inputs {
///     h = cell.step(x_t, &h)?;
/// }
/// ```
#[derive(Debug)]
pub struct Rnn {
    w_ih: Var,
    w_hh: Var,
    b_h: Var,
    input_size: usize,
    hidden_size: usize,
}

impl Rnn {
    pub fn new(
        graph: &Graph,
        input_size: usize,
        hidden_size: usize,
        name: &str,
    ) -> Result<Self, GraphError> {
        if input_size == 0 || hidden_size == 0 {
            return Err(GraphError::InvalidOperation(format!(
                "Rnn层`{name}`的维度不能为0：input={input_size}, hidden={hidden_size}"
            )));
        }
        let w_ih = graph.parameter(
            &[input_size, hidden_size],
            Init::Xavier,
            &format!("{name}_W_ih"),
        )?;
        let w_hh = graph.parameter(
            &[hidden_size, hidden_size],
            Init::Xavier,
            &format!("{name}_W_hh"),
        )?;
        let b_h = graph.parameter(&[1, hidden_size], Init::Zeros, &format!("{name}_b_h"))?;

        Ok(Self {
            w_ih,
            w_hh,
            b_h,
            input_size,
            hidden_size,
        })
    }

    /// 单步前向：返回新的隐藏状态 [batch, hidden_size]
    pub fn step(&self, x: &Var, hidden: &Var) -> Result<Var, GraphError> {
        let pre = x
            .matmul(&self.w_ih)?
            .try_add(&hidden.matmul(&self.w_hh)?)?
            .try_add(&self.b_h)?;
        Ok(pre.tanh())
    }

    pub const fn input_size(&self) -> usize {
        self.input_size
    }

    pub const fn hidden_size(&self) -> usize {
        self.hidden_size
    }
}

impl Module for Rnn {
    fn parameters(&self) -> Vec<Var> {
        vec![self.w_ih.clone(), self.w_hh.clone(), self.b_h.clone()]
    }
}
