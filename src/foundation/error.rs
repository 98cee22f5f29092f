pub type StripResult<T> = Result<T, StripError>;

#[derive(thiserror::Error, Debug)]
pub enum StripError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("filter error: {0}")]
    Filter(String),

    #[error("render error: {0}")]
    Render(String),

    #[error("encode error: {0}")]
    Encode(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StripError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn filter(msg: impl Into<String>) -> Self {
        Self::Filter(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }
}
