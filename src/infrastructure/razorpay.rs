use super::http::read_envelope;
use crate::config::AppConfig;
use crate::domain::money::Rupees;
use crate::domain::payment::{
    CheckoutRequest, GatewayErrorKind, OrderHandle, OrderNotes, OrderRequest, TransactionInfo,
};
use crate::domain::ports::PaymentGateway;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutPrefill {
    pub name: String,
    pub email: String,
    pub contact: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutTheme {
    pub color: String,
}

/// Options handed to the Razorpay checkout widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutOptions {
    pub key: String,
    /// Amount in paise.
    pub amount: u64,
    pub currency: String,
    pub name: String,
    pub description: String,
    pub order_id: String,
    pub prefill: CheckoutPrefill,
    pub theme: CheckoutTheme,
}

/// The hosted checkout UI. Whatever drives it reports back the signed ids.
#[async_trait]
pub trait CheckoutWidget: Send + Sync {
    async fn collect(&self, options: &CheckoutOptions) -> Result<TransactionInfo, GatewayErrorKind>;
}

pub type CheckoutWidgetBox = Box<dyn CheckoutWidget>;

#[derive(Debug, Serialize)]
struct CreateOrderBody<'a> {
    amount: u64,
    currency: &'a str,
    receipt: &'a str,
    notes: &'a OrderNotes,
}

/// Razorpay integration: orders are created through the backend, payment
/// is collected by the checkout widget.
pub struct RazorpayGateway {
    client: Client,
    create_order_url: String,
    key_id: String,
    business_name: String,
    theme_color: String,
    currency: String,
    widget: CheckoutWidgetBox,
}

impl RazorpayGateway {
    pub fn new(config: &AppConfig, widget: CheckoutWidgetBox) -> Self {
        Self {
            client: Client::new(),
            create_order_url: config.endpoint_url(&config.endpoints.create_order),
            key_id: config.razorpay_key_id.clone(),
            business_name: config.business_name.clone(),
            theme_color: config.theme_color.clone(),
            currency: config.currency.clone(),
            widget,
        }
    }

    fn paise(amount: Rupees) -> Result<u64, GatewayErrorKind> {
        amount
            .to_paise()
            .map_err(|e| GatewayErrorKind::OrderRejected(e.user_message()))
    }

    pub fn checkout_options(
        &self,
        checkout: &CheckoutRequest,
    ) -> Result<CheckoutOptions, GatewayErrorKind> {
        Ok(CheckoutOptions {
            key: self.key_id.clone(),
            amount: Self::paise(checkout.amount)?,
            currency: self.currency.clone(),
            name: self.business_name.clone(),
            description: checkout.description.clone(),
            order_id: checkout.order.id.clone(),
            prefill: CheckoutPrefill {
                name: checkout.prefill.name.clone(),
                email: checkout.prefill.email.clone(),
                contact: checkout.prefill.phone.clone(),
            },
            theme: CheckoutTheme {
                color: self.theme_color.clone(),
            },
        })
    }
}

#[async_trait]
impl PaymentGateway for RazorpayGateway {
    async fn create_order(&self, order: &OrderRequest) -> Result<OrderHandle, GatewayErrorKind> {
        let body = CreateOrderBody {
            amount: Self::paise(order.amount)?,
            currency: &self.currency,
            receipt: &order.receipt,
            notes: &order.notes,
        };
        debug!(receipt = %order.receipt, amount = body.amount, "creating payment order");

        let resp = self
            .client
            .post(&self.create_order_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayErrorKind::Unavailable(e.to_string()))?;
        let envelope = read_envelope::<OrderHandle>(resp)
            .await
            .map_err(|e| GatewayErrorKind::Unavailable(e.user_message()))?;

        match envelope.data {
            Some(handle) if envelope.success => Ok(handle),
            _ => {
                let message = envelope
                    .message
                    .unwrap_or_else(|| "order was not created".to_string());
                warn!(%message, "payment order rejected");
                Err(GatewayErrorKind::OrderRejected(message))
            }
        }
    }

    async fn open_checkout(
        &self,
        checkout: &CheckoutRequest,
    ) -> Result<TransactionInfo, GatewayErrorKind> {
        let options = self.checkout_options(checkout)?;
        self.widget.collect(&options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::visit::OwnerContact;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::sync::{Arc, Mutex};

    #[derive(Default, Clone)]
    struct RecordingWidget {
        seen: Arc<Mutex<Vec<CheckoutOptions>>>,
    }

    #[async_trait]
    impl CheckoutWidget for RecordingWidget {
        async fn collect(
            &self,
            options: &CheckoutOptions,
        ) -> Result<TransactionInfo, GatewayErrorKind> {
            self.seen.lock().unwrap().push(options.clone());
            Ok(TransactionInfo {
                payment_id: "pay_1".to_string(),
                order_id: options.order_id.clone(),
                signature: "sig_1".to_string(),
            })
        }
    }

    fn checkout() -> CheckoutRequest {
        CheckoutRequest {
            order: OrderHandle {
                id: "order_42".to_string(),
            },
            amount: Rupees::new(dec!(249.5)).unwrap(),
            description: "Partial Payment (₹249.5 now, ₹250 later)".to_string(),
            prefill: OwnerContact {
                name: "Asha".to_string(),
                email: "asha@example.com".to_string(),
                phone: "9845000000".to_string(),
            },
        }
    }

    #[test]
    fn test_checkout_options() {
        let mut config = AppConfig::default();
        config.razorpay_key_id = "rzp_test_key".to_string();
        let gateway = RazorpayGateway::new(&config, Box::new(RecordingWidget::default()));

        let options = gateway.checkout_options(&checkout()).unwrap();
        assert_eq!(options.key, "rzp_test_key");
        assert_eq!(options.amount, 24950);
        assert_eq!(options.currency, "INR");
        assert_eq!(options.name, "Pet Grooming Service");
        assert_eq!(options.order_id, "order_42");
        assert_eq!(options.prefill.contact, "9845000000");
        assert_eq!(options.theme.color, "#3399cc");
    }

    #[test]
    fn test_unrepresentable_amount_is_rejected() {
        let gateway = RazorpayGateway::new(&AppConfig::default(), Box::new(RecordingWidget::default()));
        let mut request = checkout();
        request.amount = Rupees::new(Decimal::MAX).unwrap();

        assert!(matches!(
            gateway.checkout_options(&request),
            Err(GatewayErrorKind::OrderRejected(_))
        ));
    }

    #[tokio::test]
    async fn test_open_checkout_delegates_to_widget() {
        let widget = RecordingWidget::default();
        let gateway = RazorpayGateway::new(&AppConfig::default(), Box::new(widget.clone()));

        let tx = gateway.open_checkout(&checkout()).await.unwrap();
        assert_eq!(tx.order_id, "order_42");
        assert_eq!(widget.seen.lock().unwrap().len(), 1);
    }
}
