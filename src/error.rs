use thiserror::Error;

/// Reasons a generation request is refused. No partial cloud is produced
/// when one of these is returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenerationError {
    /// Missing or contradictory generation parameters
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Nothing to sample from: no vertices, or an empty mesh set
    #[error("mesh contains no usable geometry")]
    EmptyGeometry,

    /// A requested count is above the configured particle ceiling
    #[error("{requested} particles requested, limit is {limit}")]
    CeilingExceeded { requested: usize, limit: usize },

    /// Input the distribution math can't work with
    #[error("degenerate input: {0}")]
    DegenerateInput(String),

    /// The caller's cancellation signal fired mid-request
    #[error("generation cancelled")]
    Cancelled,

    /// The mesh loader couldn't produce the requested model
    #[error("failed to load mesh {key}: {message}")]
    Load { key: String, message: String },
}

pub type GenerationResult<T> = Result<T, GenerationError>;
