use super::stellar::keypair::Keypair;
use super::stellar::{strkey, xdr};
use crate::domain::event::Cursor;
use crate::domain::ports::{LedgerGateway, PaymentStream};
use crate::domain::submission::{AccountState, SubmissionOutcome};
use crate::error::{ForwarderError, Result};
use crate::interfaces::sse;
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::StatusCode;
use reqwest::header::ACCEPT;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Deserialize;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

const READ_TIMEOUT: Duration = Duration::from_secs(30);
const SUBMIT_TIMEOUT: Duration = Duration::from_secs(60);
/// Validity window offered to the ledger on every transaction.
const TX_VALIDITY: Duration = Duration::from_secs(60);

/// Ledger gateway over a Horizon server.
///
/// Owns the distributor keypair: transactions are built, signed and
/// submitted here, and every failure is folded into the closed
/// [`SubmissionOutcome`] classification the dispatcher works with.
pub struct HorizonGateway {
    client: reqwest::Client,
    base_url: String,
    keypair: Keypair,
    network_id: [u8; 32],
}

#[derive(Deserialize)]
struct AccountRecord {
    sequence: String,
}

#[derive(Deserialize)]
struct FeeStats {
    last_ledger_base_fee: String,
}

#[derive(Deserialize)]
struct SubmitResponse {
    #[serde(default)]
    successful: bool,
}

#[derive(Deserialize, Default)]
struct ErrorBody {
    #[serde(default)]
    extras: Option<Extras>,
}

#[derive(Deserialize, Default)]
struct Extras {
    #[serde(default)]
    result_codes: Option<ResultCodes>,
}

#[derive(Deserialize, Default)]
struct ResultCodes {
    #[serde(default)]
    transaction: Option<String>,
    #[serde(default)]
    operations: Vec<String>,
}

impl HorizonGateway {
    pub fn new(
        base_url: &str,
        keypair: Keypair,
        network_passphrase: &str,
    ) -> Result<Self> {
        // No client-wide timeout: the same client carries the unbounded
        // SSE stream. The finite calls set per-request timeouts instead.
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            keypair,
            network_id: xdr::network_id(network_passphrase),
        })
    }

    fn build_envelope(
        &self,
        source: &AccountState,
        destination: &str,
        amount: Decimal,
        fee_per_op: u32,
    ) -> Result<String> {
        let destination_key = strkey::decode_public(destination)?;
        let amount_stroops = to_stroops(amount)?;
        let sequence = source
            .sequence
            .checked_add(1)
            .ok_or_else(|| ForwarderError::LedgerError("sequence number overflow".to_string()))?;
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| ForwarderError::LedgerError(e.to_string()))?
            .as_secs();

        let tx = xdr::payment_tx(&xdr::PaymentParams {
            source: self.keypair.public_key(),
            sequence,
            destination: &destination_key,
            amount_stroops,
            fee: fee_per_op,
            min_time: 0,
            max_time: now + TX_VALIDITY.as_secs(),
        });
        let payload = xdr::signature_payload(&self.network_id, &tx);
        let signature = self.keypair.sign(&payload);
        Ok(BASE64.encode(xdr::envelope(&tx, self.keypair.hint(), &signature)))
    }
}

#[async_trait]
impl LedgerGateway for HorizonGateway {
    async fn load_account(&self, address: &str) -> Result<AccountState> {
        let record: AccountRecord = self
            .client
            .get(format!("{}/accounts/{address}", self.base_url))
            .timeout(READ_TIMEOUT)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        let sequence = record
            .sequence
            .parse::<i64>()
            .map_err(|e| ForwarderError::LedgerError(format!("bad sequence number: {e}")))?;
        Ok(AccountState {
            address: address.to_string(),
            sequence,
        })
    }

    async fn base_fee(&self) -> Result<u32> {
        let stats: FeeStats = self
            .client
            .get(format!("{}/fee_stats", self.base_url))
            .timeout(READ_TIMEOUT)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        stats
            .last_ledger_base_fee
            .parse::<u32>()
            .map_err(|e| ForwarderError::LedgerError(format!("bad base fee: {e}")))
    }

    async fn submit_payment(
        &self,
        source: &AccountState,
        destination: &str,
        amount: Decimal,
        fee_per_op: u32,
    ) -> SubmissionOutcome {
        let envelope = match self.build_envelope(source, destination, amount, fee_per_op) {
            Ok(envelope) => envelope,
            Err(e) => return SubmissionOutcome::Rejected(e.to_string()),
        };

        let response = self
            .client
            .post(format!("{}/transactions", self.base_url))
            .form(&[("tx", envelope.as_str())])
            .timeout(SUBMIT_TIMEOUT)
            .send()
            .await;

        match response {
            Err(e) if e.is_timeout() => SubmissionOutcome::Timeout,
            Err(e) => SubmissionOutcome::Rejected(e.to_string()),
            Ok(response) => {
                let status = response.status();
                if status == StatusCode::GATEWAY_TIMEOUT {
                    return SubmissionOutcome::Timeout;
                }
                let body = response.text().await.unwrap_or_default();
                if status.is_success() {
                    match serde_json::from_str::<SubmitResponse>(&body) {
                        Ok(submit) if submit.successful => SubmissionOutcome::Accepted,
                        _ => SubmissionOutcome::Rejected(body),
                    }
                } else {
                    classify_rejection(&body)
                }
            }
        }
    }

    async fn open_payment_stream(&self, address: &str, cursor: &Cursor) -> Result<PaymentStream> {
        let response = self
            .client
            .get(format!("{}/accounts/{address}/payments", self.base_url))
            .query(&[("cursor", cursor.as_str()), ("order", "asc")])
            .header(ACCEPT, "text/event-stream")
            .send()
            .await?
            .error_for_status()?;
        Ok(sse::payment_records(response.bytes_stream()))
    }
}

/// Maps Horizon's `extras.result_codes` taxonomy onto the closed outcome
/// set. Anything unrecognized keeps the raw body as its diagnostic.
fn classify_rejection(body: &str) -> SubmissionOutcome {
    let codes = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.extras)
        .and_then(|e| e.result_codes)
        .unwrap_or_default();

    match codes.transaction.as_deref() {
        Some("tx_bad_seq") => SubmissionOutcome::BadSequence,
        Some("tx_too_late") => SubmissionOutcome::TooLate,
        Some("tx_insufficient_fee") => SubmissionOutcome::FeeTooLow,
        Some("tx_failed") if codes.operations.first().map(String::as_str) == Some("op_underfunded") => {
            SubmissionOutcome::Underfunded
        }
        _ => SubmissionOutcome::Rejected(body.trim().to_string()),
    }
}

fn to_stroops(amount: Decimal) -> Result<i64> {
    (amount * Decimal::from(10_000_000u32))
        .trunc()
        .to_i64()
        .ok_or_else(|| ForwarderError::LedgerError(format!("amount out of range: {amount}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn error_body(transaction: &str, operations: &[&str]) -> String {
        let operations = operations
            .iter()
            .map(|op| format!("\"{op}\""))
            .collect::<Vec<_>>()
            .join(",");
        format!(
            r#"{{"type":"https://stellar.org/horizon-errors/transaction_failed",
                 "title":"Transaction Failed","status":400,
                 "extras":{{"result_codes":{{"transaction":"{transaction}","operations":[{operations}]}}}}}}"#
        )
    }

    #[test]
    fn test_classifies_bad_sequence() {
        assert_eq!(
            classify_rejection(&error_body("tx_bad_seq", &[])),
            SubmissionOutcome::BadSequence
        );
    }

    #[test]
    fn test_classifies_too_late() {
        assert_eq!(
            classify_rejection(&error_body("tx_too_late", &[])),
            SubmissionOutcome::TooLate
        );
    }

    #[test]
    fn test_classifies_insufficient_fee() {
        assert_eq!(
            classify_rejection(&error_body("tx_insufficient_fee", &[])),
            SubmissionOutcome::FeeTooLow
        );
    }

    #[test]
    fn test_classifies_underfunded() {
        assert_eq!(
            classify_rejection(&error_body("tx_failed", &["op_underfunded"])),
            SubmissionOutcome::Underfunded
        );
    }

    #[test]
    fn test_other_operation_failures_are_rejections() {
        let body = error_body("tx_failed", &["op_no_destination"]);
        assert_eq!(
            classify_rejection(&body),
            SubmissionOutcome::Rejected(body.trim().to_string())
        );
    }

    #[test]
    fn test_unparseable_body_is_a_rejection() {
        assert_eq!(
            classify_rejection("<html>bad gateway</html>"),
            SubmissionOutcome::Rejected("<html>bad gateway</html>".to_string())
        );
    }

    #[test]
    fn test_to_stroops() {
        assert_eq!(to_stroops(dec!(25)).unwrap(), 250_000_000);
        assert_eq!(to_stroops(dec!(0.0000001)).unwrap(), 1);
        assert_eq!(to_stroops(dec!(0.00000019)).unwrap(), 1);
    }

    #[test]
    fn test_envelope_is_base64_and_stable() {
        let seed = strkey::encode_seed(&[3u8; 32]);
        let keypair = Keypair::from_secret_seed(&seed).unwrap();
        let destination = strkey::encode_public(&[4u8; 32]);
        let gateway = HorizonGateway::new(
            "https://horizon.example.org",
            keypair,
            "Test SDF Network ; September 2015",
        )
        .unwrap();
        let source = AccountState {
            address: gateway.keypair.address(),
            sequence: 7,
        };

        let envelope = gateway
            .build_envelope(&source, &destination, dec!(25), 100)
            .unwrap();
        let decoded = BASE64.decode(envelope.as_bytes()).unwrap();
        // ENVELOPE_TYPE_TX tag, 136-byte body, one decorated signature.
        assert_eq!(decoded.len(), 216);
        assert_eq!(&decoded[..4], [0, 0, 0, 2]);
    }
}
