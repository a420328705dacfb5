/*
 * @Description  : 梯度范数与梯度裁剪
 *
 * 语义与 PyTorch 的 `clip_grad_norm_` 一致：把一组参数的梯度视作一个整体向量，
 * 若其 L2 范数超过`max_norm`，则整体按 max_norm / (norm + 1e-6) 缩放。
 */

use crate::nn::{GraphError, Var};

const CLIP_EPS: f32 = 1e-6;

/// 一组参数梯度的整体 L2 范数（没有梯度的参数不计入）
pub fn grad_norm(params: &[Var]) -> Result<f32, GraphError> {
    let mut squared = 0.0f32;
    for param in params {
        if let Some(grad) = param.grad()? {
            squared += grad.squared_norm();
        }
    }
    Ok(squared.sqrt())
}

/// 把一组参数的梯度整体裁剪到范数不超过`max_norm`，返回裁剪前的范数
pub fn clip_grad_norm(params: &[Var], max_norm: f32) -> Result<f32, GraphError> {
    if !(max_norm > 0.0) {
        return Err(GraphError::InvalidOperation(format!(
            "梯度裁剪阈值必须为正数，实际为{max_norm}"
        )));
    }

    let total_norm = grad_norm(params)?;
    if total_norm > max_norm {
        let scale = max_norm / (total_norm + CLIP_EPS);
        for param in params {
            if let Some(grad) = param.grad()? {
                let graph = param.graph();
                graph
                    .borrow_mut()
                    .set_node_grad(param.node_id(), Some(&grad * scale))?;
            }
        }
    }
    Ok(total_norm)
}
