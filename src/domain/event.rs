use serde::Deserialize;
use std::fmt;

#[derive(Debug, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Payment,
    CreateAccount,
    PathPaymentStrictSend,
    PathPaymentStrictReceive,
    AccountMerge,
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    Native,
    CreditAlphanum4,
    CreditAlphanum12,
    #[serde(other)]
    Other,
}

/// One operation record observed on the account's payment stream.
///
/// Mirrors the wire shape Horizon emits; fields that only exist for plain
/// payments (`from`, `to`, `amount`, `asset_type`) are optional because the
/// stream also carries create-account, merge and path-payment records.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct PaymentEvent {
    #[serde(rename = "type")]
    pub kind: OperationKind,
    #[serde(default)]
    pub asset_type: Option<AssetKind>,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    /// Exact decimal string as reported by the ledger.
    #[serde(default)]
    pub amount: Option<String>,
    pub paging_token: String,
    #[serde(default)]
    pub transaction_successful: bool,
}

/// Resume position on the payment stream.
///
/// `Now` is the sentinel for "only events after process start"; anything
/// else is an opaque paging token handed back by the stream.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Cursor {
    Now,
    Token(String),
}

impl Cursor {
    pub fn as_str(&self) -> &str {
        match self {
            Cursor::Now => "now",
            Cursor::Token(token) => token,
        }
    }

    /// Parses a persisted cursor value. Empty input means no cursor was
    /// ever saved, which maps to the `Now` sentinel.
    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed == "now" {
            Cursor::Now
        } else {
            Cursor::Token(trimmed.to_string())
        }
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
