use thiserror::Error;

#[derive(Error, Debug)]
pub enum FirError {
    #[error("Too many coefficients ({count}), filter must be at most {max}")]
    TooManyCoefficients { count: usize, max: usize },

    #[error("Coefficient list is empty")]
    EmptyCoefficients,

    #[error("Invalid coefficient: {0}")]
    InvalidCoefficient(String),

    #[error("Block of {len} samples exceeds maximum of {max}")]
    BlockTooLarge { len: usize, max: usize },

    #[error("Filter length {len} exceeds maximum of {max}")]
    FilterTooLong { len: usize, max: usize },

    #[error("Input has {input} samples but output has {output}")]
    BufferMismatch { input: usize, output: usize },

    #[error("Coefficient update queue is full")]
    UpdateQueueFull,

    #[error("Audio device error: {0}")]
    AudioDevice(String),

    #[error("Audio stream error: {0}")]
    AudioStream(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, FirError>;
