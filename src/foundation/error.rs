pub type TimemaskResult<T> = Result<T, TimemaskError>;

#[derive(thiserror::Error, Debug)]
pub enum TimemaskError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("geometry mismatch: {0}")]
    GeometryMismatch(String),

    #[error("index {index} out of range for frame buffer of size {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("serialization error: {0}")]
    Serde(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TimemaskError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn geometry(msg: impl Into<String>) -> Self {
        Self::GeometryMismatch(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    pub fn is_geometry_mismatch(&self) -> bool {
        matches!(self, Self::GeometryMismatch(_))
    }
}
