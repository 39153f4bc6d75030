use super::payment::{
    CheckoutRequest, GatewayErrorKind, OrderHandle, OrderRequest, TransactionInfo,
    VerifyPaymentRequest,
};
use super::visit::{BackendAck, CreateVisitRequest, SubscriptionDetails};
use crate::error::Result;
use async_trait::async_trait;

/// Backend endpoints the booking flow reads from and writes to.
#[async_trait]
pub trait VisitBackend: Send + Sync {
    async fn subscription_for(
        &self,
        pet_id: &str,
        visit_type_id: &str,
    ) -> Result<Option<SubscriptionDetails>>;
    async fn create_grooming_visit(&self, visit: &CreateVisitRequest) -> Result<BackendAck>;
    async fn verify_payment(&self, request: &VerifyPaymentRequest) -> Result<BackendAck>;
}

/// Third-party payment collection.
///
/// Checkout is awaited as a single result instead of success/error callbacks.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_order(
        &self,
        order: &OrderRequest,
    ) -> std::result::Result<OrderHandle, GatewayErrorKind>;
    async fn open_checkout(
        &self,
        checkout: &CheckoutRequest,
    ) -> std::result::Result<TransactionInfo, GatewayErrorKind>;
}

pub type VisitBackendBox = Box<dyn VisitBackend>;
pub type PaymentGatewayBox = Box<dyn PaymentGateway>;
