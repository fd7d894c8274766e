//! # Core Domain Entities
//!
//! Identifiers used by the uniqueness checker.
//!
//! - **Transactions**: `TransactionId` (32-byte hash, hex rendered)
//! - **States**: `StateRef` (one output of a transaction)
//! - **Partitioning**: `HoldingIdentity` (the checker instance a request targets)

use crate::errors::ParseError;
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::fmt;
use std::str::FromStr;

/// A 32-byte hash (SHA-256).
pub type Hash = [u8; 32];

/// Milliseconds since UNIX epoch.
pub type Timestamp = u64;

/// Identifier of a transaction, unique per logical ledger.
#[derive(
    Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, SerializeDisplay, DeserializeFromStr,
)]
pub struct TransactionId(pub Hash);

impl TransactionId {
    /// Reserved all-zero id. Never a well-formed transaction id.
    pub const ZERO: TransactionId = TransactionId([0u8; 32]);

    /// Derives an id by hashing arbitrary content.
    pub fn digest(content: &[u8]) -> Self {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(content);
        Self(hasher.finalize().into())
    }

    /// Returns the raw bytes.
    pub fn as_bytes(&self) -> &Hash {
        &self.0
    }

    /// Returns true for the reserved zero id.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// Reference to output `index` of this transaction.
    pub fn output(&self, index: u32) -> StateRef {
        StateRef::new(*self, index)
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Short form keeps log lines readable.
        write!(f, "TransactionId({})", &hex::encode(self.0)[..12])
    }
}

impl FromStr for TransactionId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(digits).map_err(|e| ParseError::InvalidHex(e.to_string()))?;
        let hash: Hash = bytes
            .as_slice()
            .try_into()
            .map_err(|_| ParseError::InvalidLength {
                actual: bytes.len(),
            })?;
        Ok(Self(hash))
    }
}

impl From<Hash> for TransactionId {
    fn from(hash: Hash) -> Self {
        Self(hash)
    }
}

/// Reference to one output of a transaction.
///
/// The unit of double-spend tracking. Rendered as `"<txId>:<index>"`.
#[derive(
    Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, SerializeDisplay, DeserializeFromStr,
)]
pub struct StateRef {
    /// Transaction that created the state.
    pub tx_id: TransactionId,
    /// Position of the state among that transaction's outputs.
    pub index: u32,
}

impl StateRef {
    pub fn new(tx_id: TransactionId, index: u32) -> Self {
        Self { tx_id, index }
    }
}

impl fmt::Display for StateRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.tx_id, self.index)
    }
}

impl FromStr for StateRef {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (tx_part, index_part) = s
            .rsplit_once(':')
            .ok_or_else(|| ParseError::MissingIndex(s.to_string()))?;
        let tx_id = tx_part.parse::<TransactionId>()?;
        let index = index_part
            .parse::<u32>()
            .map_err(|_| ParseError::InvalidIndex(index_part.to_string()))?;
        Ok(Self { tx_id, index })
    }
}

/// The logical checker instance (partition/tenant) a request targets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingIdentity {
    /// X.500 name of the notary virtual node.
    pub x500_name: String,
    /// Membership group the identity belongs to.
    pub group_id: String,
}

impl HoldingIdentity {
    pub fn new(x500_name: impl Into<String>, group_id: impl Into<String>) -> Self {
        Self {
            x500_name: x500_name.into(),
            group_id: group_id.into(),
        }
    }
}

impl fmt::Display for HoldingIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.x500_name, self.group_id)
    }
}
