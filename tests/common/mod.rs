#![allow(dead_code)]

use petcare_booking::application::booking::BookingSession;
use petcare_booking::domain::money::Rupees;
use petcare_booking::domain::visit::{
    OwnerContact, PlanRef, SubscribedPet, SubscriptionDetails, VisitPurposeDetails,
};
use petcare_booking::infrastructure::in_memory::{InMemoryGateway, InMemoryVisitBackend};
use rust_decimal::Decimal;

pub const PET_ID: &str = "pet-42";
pub const VISIT_TYPE: &str = "visit-grooming";

pub fn rupees(value: Decimal) -> Rupees {
    Rupees::new(value).unwrap()
}

pub fn grooming(price: Decimal) -> VisitPurposeDetails {
    VisitPurposeDetails {
        id: VISIT_TYPE.to_string(),
        price: rupees(price),
    }
}

pub fn subscription(sessions: u32) -> SubscriptionDetails {
    SubscriptionDetails {
        remaining_sessions: sessions,
        plan: Some(PlanRef {
            id: "plan-gold".to_string(),
        }),
        pet: Some(SubscribedPet {
            name: "Bruno".to_string(),
            owner: Some(OwnerContact {
                name: "Asha Rao".to_string(),
                email: "asha@example.com".to_string(),
                phone: "9845012345".to_string(),
            }),
        }),
    }
}

/// A booking wired to in-memory ports, with handles to inspect them.
pub struct Harness {
    pub booking: BookingSession,
    pub backend: InMemoryVisitBackend,
    pub gateway: InMemoryGateway,
}

pub fn harness(pet_id: &str, price: Decimal) -> Harness {
    harness_with_gateway(pet_id, price, InMemoryGateway::approving())
}

pub fn harness_with_gateway(pet_id: &str, price: Decimal, gateway: InMemoryGateway) -> Harness {
    let backend = InMemoryVisitBackend::new();
    let booking = BookingSession::new(
        pet_id,
        grooming(price),
        Box::new(backend.clone()),
        Box::new(gateway.clone()),
    );
    Harness {
        booking,
        backend,
        gateway,
    }
}
