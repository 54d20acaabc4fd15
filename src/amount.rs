use crate::error::CostReportError;
use bigdecimal::{BigDecimal, RoundingMode, ToPrimitive, Zero};
use std::str::FromStr;

pub fn parse_amount(amount: &str) -> Result<BigDecimal, CostReportError> {
    Ok(BigDecimal::from_str(amount.trim())?)
}

/// Share of `total` in percent, rounded half-to-even to one decimal place.
/// Zero when `total` is not positive.
pub fn percentage_of(part: &BigDecimal, total: &BigDecimal) -> BigDecimal {
    if *total <= BigDecimal::zero() {
        return BigDecimal::zero();
    }
    ((part * BigDecimal::from(100)) / total).with_scale_round(1, RoundingMode::HalfEven)
}

pub fn to_f64(amount: &BigDecimal) -> Result<f64, CostReportError> {
    amount.to_f64().ok_or(CostReportError::ToPrimitive)
}

/// `$1,234.56`, cents rounded half-to-even.
pub fn format_usd(amount: &BigDecimal) -> String {
    let text = amount.with_scale_round(2, RoundingMode::HalfEven).to_string();
    let (sign, digits) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text.as_str()),
    };
    let (whole, fraction) = digits.split_once('.').unwrap_or((digits, "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    format!("{}${}.{}", sign, grouped, fraction)
}
