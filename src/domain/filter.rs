use super::event::{AssetKind, OperationKind, PaymentEvent};
use rust_decimal::Decimal;
use std::str::FromStr;

/// Decides which observed events trigger a forward.
///
/// An event qualifies iff it is a plain payment, settled successfully, in
/// the native asset, addressed to the distributor from some other account,
/// and at least `min_incoming` large. The distributor's own outbound
/// forwards come back on the same stream as incoming records, so the
/// source check is what breaks the feedback loop.
#[derive(Debug, Clone)]
pub struct EventFilter {
    distributor: String,
    min_incoming: Decimal,
}

impl EventFilter {
    pub fn new(distributor: String, min_incoming: Decimal) -> Self {
        Self {
            distributor,
            min_incoming,
        }
    }

    /// Returns the parsed incoming amount when the event qualifies.
    pub fn qualify(&self, event: &PaymentEvent) -> Option<Decimal> {
        if event.kind != OperationKind::Payment {
            return None;
        }
        if !event.transaction_successful {
            return None;
        }
        if event.asset_type != Some(AssetKind::Native) {
            return None;
        }
        if event.to.as_deref() != Some(self.distributor.as_str()) {
            return None;
        }
        if event.from.as_deref() == Some(self.distributor.as_str()) {
            return None;
        }

        let incoming = Decimal::from_str(event.amount.as_deref()?).ok()?;
        if incoming < self.min_incoming {
            return None;
        }
        Some(incoming)
    }
}
