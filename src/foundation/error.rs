/// Convenience alias used across the crate.
pub type MemeResult<T> = Result<T, MemeError>;

/// Errors surfaced by configuration loading, resource decoding and export.
///
/// The compositor itself recovers from every resource failure locally; these variants only reach
/// callers from the I/O edges (settings files, encoders, explicit decode calls).
#[derive(thiserror::Error, Debug)]
pub enum MemeError {
    /// Invalid configuration or settings value.
    #[error("validation error: {0}")]
    Validation(String),

    /// Font bytes could not be read, registered or shaped.
    #[error("font error: {0}")]
    Font(String),

    /// Background or output image could not be decoded, rasterized or encoded.
    #[error("image error: {0}")]
    Image(String),

    /// JSON (de)serialization failure.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level failure.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MemeError {
    /// Build a [`MemeError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`MemeError::Font`].
    pub fn font(msg: impl Into<String>) -> Self {
        Self::Font(msg.into())
    }

    /// Build a [`MemeError::Image`].
    pub fn image(msg: impl Into<String>) -> Self {
        Self::Image(msg.into())
    }

    /// Build a [`MemeError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}
