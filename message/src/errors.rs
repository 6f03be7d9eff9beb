use thiserror::Error;

/// Structural codec errors. Any of these drops the offending frame without
/// mutating node state; none of them affects node health.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MessageError {
    #[error("unsupported message version {0}")]
    UnsupportedVersion(u64),

    #[error("payload is empty")]
    EmptyPayload,

    #[error("invalid payload length")]
    InvalidPayloadLength,

    #[error("wrong or malformed payload type")]
    WrongPayloadType,

    #[error("unexpected end of data")]
    UnexpectedEof,

    #[error("varint is malformed or exceeds 64 bits")]
    InvalidVarint,

    #[error("{0} trailing bytes after the message frame")]
    TrailingBytes(usize),
}

pub type MessageResult<T> = Result<T, MessageError>;
