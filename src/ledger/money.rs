use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds to cents with midpoints moving away from zero (0.005 -> 0.01).
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// `round_half_up(total * fraction)`.
pub fn share_of(total: Decimal, fraction: Decimal) -> Decimal {
    round_half_up(total * fraction)
}
