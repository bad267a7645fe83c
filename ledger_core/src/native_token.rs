use thiserror::Error;

pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

const SOL_DECIMALS: usize = 9;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("amount is empty")]
    Empty,
    #[error("'{0}' is negative")]
    Negative(String),
    #[error("'{0}' is not a decimal SOL amount")]
    Malformed(String),
    #[error("'{0}' has more than 9 decimal places")]
    TooPrecise(String),
    #[error("'{0}' SOL does not fit in a lamport balance")]
    Overflow(String),
}

/// Parse a decimal SOL amount such as `"0.2"` or `"15"` into lamports.
///
/// The conversion is exact: no floating point, no rounding. Signs,
/// exponents, `NaN` and sub-lamport precision are rejected.
pub fn sol_to_lamports(amount: &str) -> Result<u64, AmountError> {
    let amount = amount.trim();
    if amount.is_empty() {
        return Err(AmountError::Empty);
    }
    if amount.starts_with('-') {
        return Err(AmountError::Negative(amount.to_string()));
    }

    let (whole, fraction) = amount.split_once('.').unwrap_or((amount, ""));
    let digits_only = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !digits_only(whole) || !digits_only(fraction) {
        return Err(AmountError::Malformed(amount.to_string()));
    }
    if fraction.len() > SOL_DECIMALS {
        return Err(AmountError::TooPrecise(amount.to_string()));
    }

    let overflow = || AmountError::Overflow(amount.to_string());
    let whole: u64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| overflow())?
    };
    let fraction: u64 = if fraction.is_empty() {
        0
    } else {
        // At most nine digits, always fits.
        let digits: u64 = fraction.parse().map_err(|_| overflow())?;
        digits * 10u64.pow((SOL_DECIMALS - fraction.len()) as u32)
    };

    whole
        .checked_mul(LAMPORTS_PER_SOL)
        .and_then(|l| l.checked_add(fraction))
        .ok_or_else(overflow)
}

/// Lamports as SOL, for display only.
pub fn lamports_to_sol(lamports: u64) -> f64 {
    lamports as f64 / LAMPORTS_PER_SOL as f64
}
