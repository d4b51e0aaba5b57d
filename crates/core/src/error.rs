use ward_types::{BedId, TextError};

#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("network error: {0}")]
    Transport(String),
    #[error("ward API returned HTTP {status}")]
    Status { status: u16 },
    #[error("failed to decode ward API response: {0}")]
    Decode(String),
    /// The ward API answered `success: false`. The message is surfaced verbatim.
    #[error("{0}")]
    Rejected(String),
    #[error("bed {bed_id} has status {status} but occupant data disagrees")]
    InconsistentBed { bed_id: BedId, status: String },
    #[error("invalid bed status: {0}")]
    InvalidStatus(String),
    #[error("text error: {0}")]
    Text(#[from] TextError),
}

pub type BoardResult<T> = std::result::Result<T, BoardError>;
