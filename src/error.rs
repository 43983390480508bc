use std::fmt;

/// A strategy function a [`crate::LinearModel`] needs before it can train or predict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    Activation,
    Loss,
    LossGradient,
    Regularization,
    RegularizationGradient,
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Binding::Activation => "activation",
            Binding::Loss => "loss",
            Binding::LossGradient => "loss gradient",
            Binding::Regularization => "regularization",
            Binding::RegularizationGradient => "regularization gradient",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    #[error("invalid data: {0}")]
    InvalidData(String),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("invalid shape: {0}")]
    InvalidShape(String),
    #[error("missing binding: model has no {0} function")]
    MissingBinding(Binding),
    #[error("model is not fitted; call fit before predict")]
    NotFitted,
}

pub type Result<T> = std::result::Result<T, Error>;
