#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("Not enough bytes")]
    NotEnoughData { actual: usize, minimum: usize },

    /// A datagram did not have the fixed size required by its wire form.
    #[error("invalid datagram length {actual}, expected {expected}")]
    InvalidLength { actual: usize, expected: usize },

    #[error("unsupported frame envelope version {0}")]
    UnsupportedVersion(u8),

    /// Declared frame length is larger than the frame buffer.
    #[error("frame length {0} exceeds frame capacity")]
    FrameLength(usize),

    /// An encoded record was empty and would read as end of stream.
    #[error("refusing to send an empty datagram")]
    EmptyDatagram,

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Wav(#[from] hound::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
