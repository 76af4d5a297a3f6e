//! Subscription fee quote shown to partners during customer consultations.

use serde::{Deserialize, Serialize};

/// Annual interest applied to every subscription plan.
pub const ANNUAL_RATE: f64 = 0.112;
pub const MIN_TERM_MONTHS: u32 = 12;
pub const MAX_TERM_MONTHS: u32 = 60;
/// Largest quote the calculator accepts, in KRW.
pub const MAX_QUOTE_AMOUNT: u64 = 1_000_000_000;
/// Monthly payments are truncated to this unit.
const PAYMENT_UNIT: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct QuoteRequest {
    pub amount: u64,
    pub months: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SubscriptionQuote {
    pub amount: u64,
    pub months: u32,
    pub annual_rate: f64,
    pub monthly_payment: u64,
    pub total_payment: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuoteError {
    #[error("amount {amount} exceeds the 1,000,000,000 won limit")]
    AmountTooLarge { amount: u64 },
    #[error("term of {months} months is outside 12 to 60 months")]
    TermOutOfRange { months: u32 },
}

/// Level monthly payment (principal plus interest) for `amount` over `months`,
/// truncated to 100 won.
pub fn monthly_payment(amount: u64, months: u32) -> Result<u64, QuoteError> {
    if amount > MAX_QUOTE_AMOUNT {
        return Err(QuoteError::AmountTooLarge { amount });
    }
    if !(MIN_TERM_MONTHS..=MAX_TERM_MONTHS).contains(&months) {
        return Err(QuoteError::TermOutOfRange { months });
    }

    let rate = ANNUAL_RATE / 12.0;
    // `months` is bounded above, so the cast cannot truncate.
    let growth = (1.0 + rate).powi(months as i32);
    let raw = amount as f64 * rate * growth / (growth - 1.0);
    let whole = raw.floor() as u64;
    Ok(whole / PAYMENT_UNIT * PAYMENT_UNIT)
}

pub fn quote(request: QuoteRequest) -> Result<SubscriptionQuote, QuoteError> {
    let monthly = monthly_payment(request.amount, request.months)?;
    Ok(SubscriptionQuote {
        amount: request.amount,
        months: request.months,
        annual_rate: ANNUAL_RATE,
        monthly_payment: monthly,
        total_payment: monthly * u64::from(request.months),
    })
}
