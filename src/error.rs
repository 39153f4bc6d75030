use crate::domain::payment::GatewayErrorKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Payment gateway error: {0}")]
    Gateway(GatewayErrorKind),
    #[error("Payment verification failed: {0}")]
    Verification(String),
    #[error("Failed to save visit: {0}")]
    Persist(String),
    #[error("Backend returned status {status}: {message}")]
    Backend { status: u16, message: String },
    #[error("Invalid booking state: {0}")]
    InvalidState(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BookingError {
    /// Text shown to the person operating the booking form.
    ///
    /// Gateway errors are passed through verbatim; everything else carries
    /// the message the backend or the validator produced.
    pub fn user_message(&self) -> String {
        match self {
            BookingError::Validation(msg) => msg.clone(),
            BookingError::Gateway(kind) => kind.to_string(),
            BookingError::Verification(msg) => msg.clone(),
            BookingError::Persist(msg) => msg.clone(),
            BookingError::InvalidState(msg) => msg.clone(),
            BookingError::Backend { message, .. } => message.clone(),
            other => format!("An error occurred: {other}"),
        }
    }
}

impl From<GatewayErrorKind> for BookingError {
    fn from(kind: GatewayErrorKind) -> Self {
        BookingError::Gateway(kind)
    }
}

pub type Result<T> = std::result::Result<T, BookingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_passes_gateway_text_through() {
        let err = BookingError::from(GatewayErrorKind::Failed {
            code: "BAD_REQUEST_ERROR".to_string(),
            description: "Card declined".to_string(),
        });
        assert_eq!(err.user_message(), "Card declined (BAD_REQUEST_ERROR)");
    }

    #[test]
    fn test_user_message_wraps_transport_errors() {
        let err = BookingError::Io(std::io::Error::other("connection reset"));
        assert_eq!(
            err.user_message(),
            "An error occurred: IO error: connection reset"
        );
    }
}
