mod bce_loss;
mod masked_cross_entropy;
mod multi_label_soft_margin;
mod softmax_cross_entropy;

pub(in crate::nn) use bce_loss::BceLoss;
pub(in crate::nn) use masked_cross_entropy::MaskedCrossEntropy;
pub(in crate::nn) use multi_label_soft_margin::MultiLabelSoftMargin;
pub(in crate::nn) use softmax_cross_entropy::SoftmaxCrossEntropy;
