use std::fmt::{self, Display};

/// 张量的运算符（用于错误提示）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
    MatMul,
    Concat,
    Stack,
    ReduceToShape,
}
impl Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let operation_name = match self {
            Self::Add => "相加",
            Self::Sub => "相减",
            Self::Mul => "相乘",
            Self::Div => "相除",
            Self::MatMul => "矩阵相乘",
            Self::Concat => "拼接",
            Self::Stack => "堆叠",
            Self::ReduceToShape => "归约到目标形状",
        };
        write!(f, "{operation_name}")
    }
}
