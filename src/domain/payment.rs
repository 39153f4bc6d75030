use super::money::Rupees;
use super::visit::{CreateVisitRequest, OwnerContact};
use crate::error::{BookingError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// How the visit is paid for, as recorded by the backend.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum PaymentType {
    /// Nothing collected now; staff collect after the service.
    After,
    /// Full amount collected up front.
    Advance,
    /// Part collected now, the remainder later.
    Partial,
}

impl fmt::Display for PaymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PaymentType::After => "after",
            PaymentType::Advance => "advance",
            PaymentType::Partial => "partial",
        };
        f.write_str(name)
    }
}

/// The three choices offered when a visit needs paying for.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum PaymentOption {
    PayInFull,
    PayPartial,
    PayLater,
}

/// Payment sub-record stored with the visit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    pub payment_type: PaymentType,
    pub amount: Rupees,
    pub paid_at: Option<DateTime<Utc>>,
    pub is_paid: bool,
    pub remaining_amount: Rupees,
    pub is_remaining_paid: bool,
    #[serde(rename = "razorpay_payment_id", skip_serializing_if = "Option::is_none", default)]
    pub gateway_payment_id: Option<String>,
    #[serde(rename = "razorpay_order_id", skip_serializing_if = "Option::is_none", default)]
    pub gateway_order_id: Option<String>,
    #[serde(rename = "razorpay_signature", skip_serializing_if = "Option::is_none", default)]
    pub gateway_signature: Option<String>,
}

impl PaymentRecord {
    /// Nothing collected yet; the whole price is still owed.
    pub fn deferred(payment_type: PaymentType, final_price: Rupees) -> Self {
        Self {
            payment_type,
            amount: Rupees::ZERO,
            paid_at: None,
            is_paid: false,
            remaining_amount: final_price,
            is_remaining_paid: false,
            gateway_payment_id: None,
            gateway_order_id: None,
            gateway_signature: None,
        }
    }

    /// Money collected through the gateway, backed by its transaction proof.
    pub fn collected(
        payment_type: PaymentType,
        paid_now: Rupees,
        remaining: Rupees,
        transaction: &TransactionInfo,
        paid_at: DateTime<Utc>,
    ) -> Self {
        Self {
            payment_type,
            amount: paid_now,
            paid_at: Some(paid_at),
            is_paid: !paid_now.is_zero(),
            remaining_amount: remaining,
            is_remaining_paid: remaining.is_zero(),
            gateway_payment_id: Some(transaction.payment_id.clone()),
            gateway_order_id: Some(transaction.order_id.clone()),
            gateway_signature: Some(transaction.signature.clone()),
        }
    }
}

/// Advance collected now and remainder collected later.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PartialSplit {
    advance: Rupees,
    remaining: Rupees,
}

impl PartialSplit {
    pub fn new(advance: Rupees, remaining: Rupees, total: Rupees) -> Result<Self> {
        if advance.is_zero() {
            return Err(BookingError::Validation(
                "Advance amount must be greater than zero".to_string(),
            ));
        }
        if advance.checked_add(remaining)? != total {
            return Err(BookingError::Validation(format!(
                "Advance ₹{advance} and remaining ₹{remaining} must add up to ₹{total}"
            )));
        }
        Ok(Self { advance, remaining })
    }

    /// Half now, rounded to the rupee, and the rest later.
    pub fn suggested(total: Rupees) -> Self {
        let advance = total.half_rounded();
        Self {
            advance,
            remaining: total.saturating_sub(advance),
        }
    }

    pub fn advance(&self) -> Rupees {
        self.advance
    }

    pub fn remaining(&self) -> Rupees {
        self.remaining
    }
}

/// Text shown in the checkout for a given payment type.
pub fn checkout_description(payment_type: PaymentType, paid_now: Rupees, remaining: Rupees) -> String {
    match payment_type {
        PaymentType::Advance => "Full Payment".to_string(),
        PaymentType::Partial => {
            format!("Partial Payment (₹{paid_now} now, ₹{remaining} later)")
        }
        PaymentType::After => "Payment After Service".to_string(),
    }
}

/// Signed proof of a successful gateway payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionInfo {
    #[serde(rename = "razorpay_payment_id")]
    pub payment_id: String,
    #[serde(rename = "razorpay_order_id")]
    pub order_id: String,
    #[serde(rename = "razorpay_signature")]
    pub signature: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayErrorKind {
    #[error("Payment cancelled")]
    Cancelled,
    #[error("{description} ({code})")]
    Failed { code: String, description: String },
    #[error("Could not create payment order: {0}")]
    OrderRejected(String),
    #[error("Payment gateway unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderNotes {
    pub pet_id: String,
    pub visit_type: String,
    pub payment_type: PaymentType,
}

/// Order the gateway must know about before checkout opens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub receipt: String,
    pub amount: Rupees,
    pub notes: OrderNotes,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderHandle {
    pub id: String,
}

/// Everything the checkout needs to collect a payment.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutRequest {
    pub order: OrderHandle,
    pub amount: Rupees,
    pub description: String,
    pub prefill: OwnerContact,
}

/// Body of the "verify payment" call: gateway proof plus the visit to save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifyPaymentRequest {
    #[serde(flatten)]
    pub transaction: TransactionInfo,
    #[serde(rename = "visitData")]
    pub visit: CreateVisitRequest,
}
