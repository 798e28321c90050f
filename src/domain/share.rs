use rust_decimal::Decimal;

/// Smallest representable unit of the native asset is 1e-7 (one stroop).
pub const NATIVE_SCALE: u32 = 7;

/// Computes the forwarded share of an incoming amount.
///
/// Truncates toward zero at stroop resolution so the forwarded amount can
/// never exceed `incoming * fraction`. A result of zero (or less) means
/// nothing should be forwarded.
pub fn forward_share(incoming: Decimal, fraction: Decimal) -> Decimal {
    (incoming * fraction).trunc_with_scale(NATIVE_SCALE)
}
