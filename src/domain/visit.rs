use super::money::Rupees;
use super::payment::PaymentRecord;
use super::pricing;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Service being booked, as listed by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisitPurposeDetails {
    #[serde(rename = "_id")]
    pub id: String,
    pub price: Rupees,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OwnerContact {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscribedPet {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub owner: Option<OwnerContact>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRef {
    #[serde(rename = "_id")]
    pub id: String,
}

/// Prepaid grooming bundle attached to a pet, if the backend has one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionDetails {
    #[serde(rename = "numberOfGroomings", default)]
    pub remaining_sessions: u32,
    #[serde(rename = "planId", default)]
    pub plan: Option<PlanRef>,
    #[serde(rename = "petId", default)]
    pub pet: Option<SubscribedPet>,
}

impl SubscriptionDetails {
    pub fn plan_id(&self) -> Option<&str> {
        self.plan.as_ref().map(|plan| plan.id.as_str())
    }

    pub fn owner(&self) -> Option<&OwnerContact> {
        self.pet.as_ref().and_then(|pet| pet.owner.as_ref())
    }

    pub fn pet_name(&self) -> Option<&str> {
        self.pet
            .as_ref()
            .map(|pet| pet.name.as_str())
            .filter(|name| !name.is_empty())
    }

    pub fn has_sessions(&self) -> bool {
        self.remaining_sessions > 0
    }
}

/// One-line card: pet, owner and sessions left.
impl fmt::Display for SubscriptionDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Active subscription")?;
        if let Some(pet) = self.pet_name() {
            write!(f, " for {pet}")?;
        }
        if let Some(owner) = self.owner().filter(|owner| !owner.name.is_empty()) {
            write!(f, " (owner {})", owner.name)?;
        }
        write!(f, ": Number of Groomings left: {}", self.remaining_sessions)
    }
}

/// A visit as entered on the form, before it has been saved.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftVisit {
    pub pet_id: String,
    pub visit_type_id: String,
    pub discount: Rupees,
    pub subscription_availed: bool,
    pub plan_id: Option<String>,
    pub full_price: Rupees,
    pub final_price: Rupees,
}

impl DraftVisit {
    pub fn new(
        pet_id: &str,
        purpose: &VisitPurposeDetails,
        discount: Rupees,
        subscription_availed: bool,
        plan_id: Option<String>,
    ) -> Self {
        Self {
            pet_id: pet_id.trim().to_string(),
            visit_type_id: purpose.id.trim().to_string(),
            discount,
            subscription_availed,
            plan_id,
            full_price: purpose.price,
            final_price: pricing::final_price(purpose.price, discount, subscription_availed),
        }
    }

    pub fn requires_payment(&self) -> bool {
        !self.subscription_availed && !self.final_price.is_zero()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitDetails {
    pub full_price: Rupees,
    pub final_price: Rupees,
    pub payment: PaymentRecord,
}

/// Body of the "create grooming visit" call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVisitRequest {
    pub pet_id: String,
    #[serde(rename = "visitType")]
    pub visit_type_id: String,
    pub discount: Rupees,
    pub is_subscription_availed: bool,
    pub plan_id: Option<String>,
    pub details: VisitDetails,
}

impl CreateVisitRequest {
    pub fn from_draft(draft: &DraftVisit, payment: PaymentRecord) -> Self {
        Self {
            pet_id: draft.pet_id.clone(),
            visit_type_id: draft.visit_type_id.clone(),
            discount: draft.discount,
            is_subscription_availed: draft.subscription_availed,
            plan_id: draft.plan_id.clone(),
            details: VisitDetails {
                full_price: draft.full_price,
                final_price: draft.final_price,
                payment,
            },
        }
    }
}

/// Success flag and message returned by backend write calls.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BackendAck {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

impl BackendAck {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}
