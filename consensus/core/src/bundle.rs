use crate::tx::TransactionId;

/// A solidified bundle as handed over by the solidification pipeline.
///
/// The validation predicates are computed upstream (signature checks, strict
/// semantics, past-cone validity) and carried here as plain flags; the tip
/// selection engine only reads them.
#[derive(Debug, Clone)]
pub struct Bundle {
    tail: TransactionId,
    transactions: Vec<TransactionId>,
    valid: bool,
    strict_semantics: bool,
    invalid_past_cone: bool,
    spam_source: bool,
}

impl Bundle {
    /// A bundle with all predicates in their passing state. The upstream
    /// pipeline downgrades flags via the `mark_*` mutators before dispatch.
    pub fn new(tail: TransactionId, transactions: Vec<TransactionId>) -> Self {
        Self { tail, transactions, valid: true, strict_semantics: true, invalid_past_cone: false, spam_source: false }
    }

    pub fn tail(&self) -> TransactionId {
        self.tail
    }

    pub fn transactions(&self) -> &[TransactionId] {
        &self.transactions
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn valid_strict_semantics(&self) -> bool {
        self.strict_semantics
    }

    pub fn is_invalid_past_cone(&self) -> bool {
        self.invalid_past_cone
    }

    /// Whether the issuer of this bundle is flagged as a high-rate spam source.
    pub fn is_spam_source(&self) -> bool {
        self.spam_source
    }

    pub fn mark_invalid(&mut self) {
        self.valid = false;
    }

    pub fn mark_lax_semantics(&mut self) {
        self.strict_semantics = false;
    }

    pub fn mark_invalid_past_cone(&mut self) {
        self.invalid_past_cone = true;
    }

    pub fn mark_spam_source(&mut self) {
        self.spam_source = true;
    }
}
