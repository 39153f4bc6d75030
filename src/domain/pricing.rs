use super::money::Rupees;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Price the customer pays for a visit.
///
/// An availed subscription session makes the visit free; otherwise the
/// discount is taken off the list price, never going below zero.
pub fn final_price(list_price: Rupees, discount: Rupees, subscription_availed: bool) -> Rupees {
    if subscription_availed {
        return Rupees::ZERO;
    }
    list_price.saturating_sub(discount)
}

/// Amount saved against the list price, if the visit is discounted but not free.
pub fn savings(list_price: Rupees, final_price: Rupees) -> Option<Rupees> {
    if final_price.is_zero() || final_price >= list_price {
        None
    } else {
        Some(list_price.saturating_sub(final_price))
    }
}

/// Discount entered on the booking form, bounded by the list price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiscountField {
    value: Rupees,
    max: Rupees,
}

impl DiscountField {
    pub fn new(max: Rupees) -> Self {
        Self {
            value: Rupees::ZERO,
            max,
        }
    }

    pub fn value(&self) -> Rupees {
        self.value
    }

    pub fn max(&self) -> Rupees {
        self.max
    }

    /// Applies raw text typed into the discount field.
    ///
    /// Only the leading whole number counts ("12.7" is 12, "50abc" is 50) and
    /// text that does not start with one reads as zero. Returns `false` and
    /// keeps the previous value when the number falls outside `[0, max]`.
    pub fn apply(&mut self, input: &str) -> bool {
        self.set(leading_whole_number(input))
    }

    pub fn set(&mut self, value: Decimal) -> bool {
        match Rupees::new(value) {
            Ok(discount) if discount <= self.max => {
                self.value = discount;
                true
            }
            _ => false,
        }
    }
}

fn leading_whole_number(input: &str) -> Decimal {
    let text = input.trim_start();
    let (negative, unsigned) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let end = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());
    let digits = &unsigned[..end];
    if digits.is_empty() {
        return Decimal::ZERO;
    }
    // Too many digits for a Decimal: still out of range either way.
    let magnitude = Decimal::from_str(digits).unwrap_or(Decimal::MAX);
    if negative { -magnitude } else { magnitude }
}
