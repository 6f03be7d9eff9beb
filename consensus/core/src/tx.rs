use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};
use std::str::{self, FromStr};

pub const TRANSACTION_ID_SIZE: usize = 32;

/// The 256-bit identity of a transaction in the Tangle.
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash, Default, Serialize, Deserialize)]
pub struct TransactionId([u8; TRANSACTION_ID_SIZE]);

impl TransactionId {
    pub const fn from_bytes(bytes: [u8; TRANSACTION_ID_SIZE]) -> Self {
        Self(bytes)
    }

    /// Builds an id from a u64, padded with zeros. Handy for deterministic
    /// graph construction in tests and simulations.
    pub const fn from_u64(word: u64) -> Self {
        let mut bytes = [0u8; TRANSACTION_ID_SIZE];
        let word_bytes = word.to_le_bytes();
        let mut i = 0;
        while i < 8 {
            bytes[i] = word_bytes[i];
            i += 1;
        }
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; TRANSACTION_ID_SIZE] {
        &self.0
    }
}

impl AsRef<[u8]> for TransactionId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; TRANSACTION_ID_SIZE]> for TransactionId {
    fn from(bytes: [u8; TRANSACTION_ID_SIZE]) -> Self {
        Self(bytes)
    }
}

impl Display for TransactionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut hex = [0u8; TRANSACTION_ID_SIZE * 2];
        faster_hex::hex_encode(&self.0, &mut hex).expect("the output buffer is exactly twice the input size");
        f.write_str(str::from_utf8(&hex).expect("hex is always valid UTF-8"))
    }
}

impl Debug for TransactionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

impl FromStr for TransactionId {
    type Err = faster_hex::Error;

    fn from_str(id_str: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; TRANSACTION_ID_SIZE];
        faster_hex::hex_decode(id_str.as_bytes(), &mut bytes)?;
        Ok(TransactionId(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::TransactionId;
    use std::str::FromStr;

    #[test]
    fn test_transaction_id_basics() {
        let id_str = "8e40af02265360d59f4ecf9ae9ebf8f00a3118408f5a9cdcbcc9c0f93642f3af";
        let id = TransactionId::from_str(id_str).unwrap();
        assert_eq!(id_str, id.to_string());

        let id2 = TransactionId::from_str(id_str).unwrap();
        assert_eq!(id, id2);

        let id3 = TransactionId::from_str("8e40af02265360d59f4ecf9ae9ebf8f00a3118408f5a9cdcbcc9c0f93642f3ab").unwrap();
        assert_ne!(id2, id3);

        assert!(TransactionId::from_str("8e40af0226536").is_err());
    }

    #[test]
    fn test_from_u64_is_deterministic() {
        assert_eq!(TransactionId::from_u64(7), TransactionId::from_u64(7));
        assert_ne!(TransactionId::from_u64(7), TransactionId::from_u64(8));
    }
}
