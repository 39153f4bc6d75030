use crate::domain::payment::{
    CheckoutRequest, GatewayErrorKind, OrderHandle, OrderRequest, TransactionInfo,
    VerifyPaymentRequest,
};
use crate::domain::ports::{PaymentGateway, VisitBackend};
use crate::domain::visit::{BackendAck, CreateVisitRequest, SubscriptionDetails};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct BackendState {
    subscriptions: HashMap<(String, String), SubscriptionDetails>,
    visits: Vec<CreateVisitRequest>,
    verifications: Vec<VerifyPaymentRequest>,
    save_rejection: Option<String>,
    verify_rejection: Option<String>,
    subscription_lookups: usize,
    calls: usize,
}

/// A backend held entirely in memory.
///
/// Used by the CLI's offline mode and by tests. Clones share state, so a test
/// can keep a handle and inspect what the booking flow sent.
#[derive(Default, Clone)]
pub struct InMemoryVisitBackend {
    state: Arc<RwLock<BackendState>>,
}

impl InMemoryVisitBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_subscription(
        &self,
        pet_id: &str,
        visit_type_id: &str,
        details: SubscriptionDetails,
    ) {
        let mut state = self.state.write().await;
        state
            .subscriptions
            .insert((pet_id.to_string(), visit_type_id.to_string()), details);
    }

    /// Makes every later save report `success: false` with `message`.
    pub async fn reject_saves(&self, message: &str) {
        self.state.write().await.save_rejection = Some(message.to_string());
    }

    pub async fn accept_saves(&self) {
        self.state.write().await.save_rejection = None;
    }

    pub async fn reject_verification(&self, message: &str) {
        self.state.write().await.verify_rejection = Some(message.to_string());
    }

    pub async fn accept_verification(&self) {
        self.state.write().await.verify_rejection = None;
    }

    pub async fn visits(&self) -> Vec<CreateVisitRequest> {
        self.state.read().await.visits.clone()
    }

    pub async fn verifications(&self) -> Vec<VerifyPaymentRequest> {
        self.state.read().await.verifications.clone()
    }

    pub async fn subscription_lookups(&self) -> usize {
        self.state.read().await.subscription_lookups
    }

    /// Number of backend calls of any kind.
    pub async fn call_count(&self) -> usize {
        self.state.read().await.calls
    }
}

#[async_trait]
impl VisitBackend for InMemoryVisitBackend {
    async fn subscription_for(
        &self,
        pet_id: &str,
        visit_type_id: &str,
    ) -> Result<Option<SubscriptionDetails>> {
        let mut state = self.state.write().await;
        state.calls += 1;
        state.subscription_lookups += 1;
        Ok(state
            .subscriptions
            .get(&(pet_id.to_string(), visit_type_id.to_string()))
            .cloned())
    }

    async fn create_grooming_visit(&self, visit: &CreateVisitRequest) -> Result<BackendAck> {
        let mut state = self.state.write().await;
        state.calls += 1;
        if let Some(message) = &state.save_rejection {
            return Ok(BackendAck::rejected(message.clone()));
        }
        state.visits.push(visit.clone());
        Ok(BackendAck::ok("Grooming visit created"))
    }

    async fn verify_payment(&self, request: &VerifyPaymentRequest) -> Result<BackendAck> {
        let mut state = self.state.write().await;
        state.calls += 1;
        state.verifications.push(request.clone());
        match &state.verify_rejection {
            Some(message) => Ok(BackendAck::rejected(message.clone())),
            None => Ok(BackendAck::ok("Payment verified")),
        }
    }
}

#[derive(Default)]
struct GatewayState {
    failure: Option<GatewayErrorKind>,
    orders: Vec<OrderRequest>,
    checkouts: Vec<CheckoutRequest>,
}

/// A gateway that settles every checkout itself.
///
/// Either approves with generated transaction ids or fails with a fixed error.
#[derive(Default, Clone)]
pub struct InMemoryGateway {
    state: Arc<RwLock<GatewayState>>,
}

impl InMemoryGateway {
    pub fn approving() -> Self {
        Self::default()
    }

    pub fn failing(kind: GatewayErrorKind) -> Self {
        Self {
            state: Arc::new(RwLock::new(GatewayState {
                failure: Some(kind),
                ..Default::default()
            })),
        }
    }

    pub async fn set_failure(&self, failure: Option<GatewayErrorKind>) {
        self.state.write().await.failure = failure;
    }

    pub async fn orders(&self) -> Vec<OrderRequest> {
        self.state.read().await.orders.clone()
    }

    pub async fn checkouts(&self) -> Vec<CheckoutRequest> {
        self.state.read().await.checkouts.clone()
    }
}

#[async_trait]
impl PaymentGateway for InMemoryGateway {
    async fn create_order(
        &self,
        order: &OrderRequest,
    ) -> std::result::Result<OrderHandle, GatewayErrorKind> {
        let mut state = self.state.write().await;
        state.orders.push(order.clone());
        Ok(OrderHandle {
            id: format!("order_offline_{}", state.orders.len()),
        })
    }

    async fn open_checkout(
        &self,
        checkout: &CheckoutRequest,
    ) -> std::result::Result<TransactionInfo, GatewayErrorKind> {
        let mut state = self.state.write().await;
        state.checkouts.push(checkout.clone());
        if let Some(kind) = &state.failure {
            return Err(kind.clone());
        }
        let n = state.checkouts.len();
        Ok(TransactionInfo {
            payment_id: format!("pay_offline_{n}"),
            order_id: checkout.order.id.clone(),
            signature: format!("offline_signature_{n}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::money::Rupees;
    use crate::domain::payment::{OrderNotes, PaymentType};
    use crate::domain::visit::OwnerContact;
    use rust_decimal_macros::dec;

    fn order() -> OrderRequest {
        OrderRequest {
            receipt: "pet_grooming_pet-1".to_string(),
            amount: Rupees::new(dec!(300)).unwrap(),
            notes: OrderNotes {
                pet_id: "pet-1".to_string(),
                visit_type: "vt-1".to_string(),
                payment_type: PaymentType::Advance,
            },
        }
    }

    #[tokio::test]
    async fn test_in_memory_subscription_lookup() {
        let backend = InMemoryVisitBackend::new();
        let details = SubscriptionDetails {
            remaining_sessions: 4,
            plan: None,
            pet: None,
        };
        backend.add_subscription("pet-1", "vt-1", details.clone()).await;

        let found = backend.subscription_for("pet-1", "vt-1").await.unwrap();
        assert_eq!(found, Some(details));
        assert!(backend.subscription_for("pet-2", "vt-1").await.unwrap().is_none());
        assert_eq!(backend.subscription_lookups().await, 2);
    }

    #[tokio::test]
    async fn test_in_memory_gateway_approves_with_order_id() {
        let gateway = InMemoryGateway::approving();
        let handle = gateway.create_order(&order()).await.unwrap();
        let checkout = CheckoutRequest {
            order: handle.clone(),
            amount: Rupees::new(dec!(300)).unwrap(),
            description: "Full Payment".to_string(),
            prefill: OwnerContact::default(),
        };

        let tx = gateway.open_checkout(&checkout).await.unwrap();
        assert_eq!(tx.order_id, handle.id);
        assert_eq!(gateway.checkouts().await.len(), 1);
    }

    #[tokio::test]
    async fn test_in_memory_gateway_failure() {
        let gateway = InMemoryGateway::failing(GatewayErrorKind::Cancelled);
        let handle = gateway.create_order(&order()).await.unwrap();
        let checkout = CheckoutRequest {
            order: handle,
            amount: Rupees::new(dec!(300)).unwrap(),
            description: "Full Payment".to_string(),
            prefill: OwnerContact::default(),
        };
        assert_eq!(
            gateway.open_checkout(&checkout).await,
            Err(GatewayErrorKind::Cancelled)
        );
    }
}
