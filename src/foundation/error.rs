pub type MirrorResult<T> = Result<T, MirrorError>;

#[derive(thiserror::Error, Debug)]
pub enum MirrorError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("camera permission denied: {0}")]
    PermissionDenied(String),

    #[error("no supported recording format: {0}")]
    NoSupportedFormat(String),

    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    #[error("encode error: {0}")]
    Encode(String),

    #[error("playback error: {0}")]
    Playback(String),

    #[error("serialization error: {0}")]
    Serde(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MirrorError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn permission_denied(msg: impl Into<String>) -> Self {
        Self::PermissionDenied(msg.into())
    }

    pub fn no_supported_format(msg: impl Into<String>) -> Self {
        Self::NoSupportedFormat(msg.into())
    }

    pub fn dimension_mismatch(msg: impl Into<String>) -> Self {
        Self::DimensionMismatch(msg.into())
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    pub fn playback(msg: impl Into<String>) -> Self {
        Self::Playback(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Whether the session can continue in a degraded mode after this error.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::PermissionDenied(_))
    }
}
