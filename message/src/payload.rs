use crate::{
    errors::{MessageError, MessageResult},
    varint::{read_varint, write_varint},
};
use serde::{Deserialize, Serialize};

/// Known payload type tags. The interior structure of these payloads is
/// consumed upstream of this core; the codec only dispatches on the tag and
/// carries the body through opaquely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u64)]
pub enum PayloadType {
    SignedTransaction = 0,
    Milestone = 1,
    UnsignedData = 2,
    SignedData = 3,
    Indexation = 4,
}

/// Tagged union of the payload region of a message.
///
/// A tag unknown to this node version decodes into [`Payload::Unsupported`],
/// preserving the raw bytes so the enclosing message remains structurally
/// valid and can be kept around or relayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Payload {
    SignedTransaction(Vec<u8>),
    Milestone(Vec<u8>),
    UnsignedData(Vec<u8>),
    SignedData(Vec<u8>),
    Indexation(Vec<u8>),
    Unsupported { payload_type: u64, data: Vec<u8> },
}

impl Payload {
    pub fn payload_type(&self) -> u64 {
        match self {
            Payload::SignedTransaction(_) => PayloadType::SignedTransaction as u64,
            Payload::Milestone(_) => PayloadType::Milestone as u64,
            Payload::UnsignedData(_) => PayloadType::UnsignedData as u64,
            Payload::SignedData(_) => PayloadType::SignedData as u64,
            Payload::Indexation(_) => PayloadType::Indexation as u64,
            Payload::Unsupported { payload_type, .. } => *payload_type,
        }
    }

    /// Decodes a standalone payload region (type tag plus body). An empty
    /// region is [`MessageError::EmptyPayload`]; inside a message frame the
    /// enclosing decoder reports it as an invalid payload length instead.
    pub fn from_bytes(bytes: &[u8]) -> MessageResult<Self> {
        if bytes.is_empty() {
            return Err(MessageError::EmptyPayload);
        }
        let (tag, read) = match read_varint(bytes) {
            Ok(decoded) => decoded,
            Err(_) => return Err(MessageError::WrongPayloadType),
        };
        let body = bytes[read..].to_vec();
        Ok(match tag {
            t if t == PayloadType::SignedTransaction as u64 => Payload::SignedTransaction(body),
            t if t == PayloadType::Milestone as u64 => Payload::Milestone(body),
            t if t == PayloadType::UnsignedData as u64 => Payload::UnsignedData(body),
            t if t == PayloadType::SignedData as u64 => Payload::SignedData(body),
            t if t == PayloadType::Indexation as u64 => Payload::Indexation(body),
            unknown => Payload::Unsupported { payload_type: unknown, data: body },
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let body = match self {
            Payload::SignedTransaction(body)
            | Payload::Milestone(body)
            | Payload::UnsignedData(body)
            | Payload::SignedData(body)
            | Payload::Indexation(body) => body,
            Payload::Unsupported { data, .. } => data,
        };
        let mut bytes = Vec::with_capacity(10 + body.len());
        write_varint(self.payload_type(), &mut bytes);
        bytes.extend_from_slice(body);
        bytes
    }
}
