use crate::config::AppConfig;
use crate::domain::payment::VerifyPaymentRequest;
use crate::domain::ports::VisitBackend;
use crate::domain::visit::{BackendAck, CreateVisitRequest, SubscriptionDetails};
use crate::error::{BookingError, Result};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

/// Response wrapper every backend endpoint uses.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiEnvelope<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
}

/// Reads a JSON envelope, turning an unreadable error body into `BookingError::Backend`.
pub(crate) async fn read_envelope<T: DeserializeOwned>(resp: Response) -> Result<ApiEnvelope<T>> {
    let status = resp.status();
    let body = resp.text().await?;
    match serde_json::from_str::<ApiEnvelope<T>>(&body) {
        Ok(envelope) => Ok(envelope),
        Err(_) if !status.is_success() => Err(BookingError::Backend {
            status: status.as_u16(),
            message: body,
        }),
        Err(e) => Err(BookingError::Json(e)),
    }
}

/// `VisitBackend` over the booking backend's JSON API.
pub struct HttpVisitBackend {
    client: Client,
    subscription_url: String,
    grooming_visit_url: String,
    verify_payment_url: String,
}

impl HttpVisitBackend {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    pub fn with_client(client: Client, config: &AppConfig) -> Self {
        Self {
            client,
            subscription_url: config.endpoint_url(&config.endpoints.subscription),
            grooming_visit_url: config.endpoint_url(&config.endpoints.grooming_visit),
            verify_payment_url: config.endpoint_url(&config.endpoints.verify_payment),
        }
    }

    async fn post_for_ack<B: serde::Serialize + Sync>(&self, url: &str, body: &B) -> Result<BackendAck> {
        debug!(url, "posting to backend");
        let resp = self.client.post(url).json(body).send().await?;
        let envelope: ApiEnvelope<serde_json::Value> = read_envelope(resp).await?;
        Ok(BackendAck {
            success: envelope.success,
            message: envelope.message,
        })
    }
}

#[async_trait]
impl VisitBackend for HttpVisitBackend {
    async fn subscription_for(
        &self,
        pet_id: &str,
        visit_type_id: &str,
    ) -> Result<Option<SubscriptionDetails>> {
        let resp = self
            .client
            .get(&self.subscription_url)
            .query(&[("petId", pet_id), ("visitType", visit_type_id)])
            .send()
            .await?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let status = resp.status();
        let envelope: ApiEnvelope<SubscriptionDetails> = read_envelope(resp).await?;
        if !status.is_success() {
            return Err(BookingError::Backend {
                status: status.as_u16(),
                message: envelope
                    .message
                    .unwrap_or_else(|| "Failed to load subscription".to_string()),
            });
        }
        Ok(envelope.data)
    }

    async fn create_grooming_visit(&self, visit: &CreateVisitRequest) -> Result<BackendAck> {
        self.post_for_ack(&self.grooming_visit_url, visit).await
    }

    async fn verify_payment(&self, request: &VerifyPaymentRequest) -> Result<BackendAck> {
        self.post_for_ack(&self.verify_payment_url, request).await
    }
}
